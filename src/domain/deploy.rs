//! 部署相关领域模型

use chrono::{DateTime, Utc};
use serde::Serialize;

/// 部署结果汇总状态
#[derive(Clone, Debug, Serialize, PartialEq)]
#[serde(rename_all = "snake_case")]
pub enum DeployStatus {
    /// 所有步骤成功
    Success,
    /// 至少一个步骤失败或被跳过
    Failed,
}

impl DeployStatus {
    /// 转换为字符串
    pub fn as_str(&self) -> &'static str {
        match self {
            DeployStatus::Success => "success",
            DeployStatus::Failed => "failed",
        }
    }
}

/// 部署阶段
#[derive(Clone, Copy, Debug, Serialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum Phase {
    Stop,
    Update,
    Start,
}

impl Phase {
    pub fn as_str(&self) -> &'static str {
        match self {
            Phase::Stop => "stop",
            Phase::Update => "update",
            Phase::Start => "start",
        }
    }
}

/// 步骤状态
#[derive(Clone, Debug, Serialize, PartialEq)]
#[serde(rename_all = "snake_case")]
pub enum StageStatus {
    Pending,
    Running,
    Success,
    Failed,
    Skipped,
}

/// 单个部署步骤（某个 stack 的 stop/start，或一次 git 更新）
#[derive(Clone, Debug, Serialize)]
pub struct DeployStage {
    /// 步骤标识 (e.g., "stop:web", "update", "start:web")
    pub name: String,
    /// 显示名称 (e.g., "Stop web", "Git Pull")
    pub display_name: String,
    /// 所属阶段
    pub phase: Phase,
    /// 操作对象（stack 名称或源码目录）
    pub target: String,
    /// 开始时间
    pub started_at: Option<DateTime<Utc>>,
    /// 结束时间
    pub finished_at: Option<DateTime<Utc>>,
    /// 持续时间（毫秒）
    pub duration_ms: Option<i64>,
    /// 步骤状态
    pub status: StageStatus,
    /// 附加信息（失败原因等）
    pub message: Option<String>,
}

impl DeployStage {
    /// 创建新的待执行步骤
    pub fn new(phase: Phase, target: &str, display_name: &str) -> Self {
        let name = match phase {
            Phase::Update => phase.as_str().to_string(),
            _ => format!("{}:{}", phase.as_str(), target),
        };
        Self {
            name,
            display_name: display_name.to_string(),
            phase,
            target: target.to_string(),
            started_at: None,
            finished_at: None,
            duration_ms: None,
            status: StageStatus::Pending,
            message: None,
        }
    }

    /// 开始执行步骤
    pub fn start(&mut self) {
        self.started_at = Some(Utc::now());
        self.status = StageStatus::Running;
    }

    /// 完成步骤
    pub fn finish(&mut self, success: bool, message: Option<String>) {
        let now = Utc::now();
        self.finished_at = Some(now);
        self.status = if success {
            StageStatus::Success
        } else {
            StageStatus::Failed
        };
        self.message = message;
        if let Some(started) = self.started_at {
            self.duration_ms = Some((now - started).num_milliseconds());
        }
    }

    /// 跳过步骤
    pub fn skip(&mut self, reason: Option<String>) {
        self.status = StageStatus::Skipped;
        self.message = reason;
    }

    pub fn succeeded(&self) -> bool {
        self.status == StageStatus::Success
    }
}

/// 一次部署的结果记录
#[derive(Clone, Debug, Serialize)]
pub struct OutcomeReport {
    /// GitHub delivery ID
    pub delivery: String,
    /// 本次部署的 stack（按计划顺序）
    pub stacks: Vec<String>,
    /// 汇总状态
    pub status: DeployStatus,
    /// 按执行顺序排列的步骤
    pub stages: Vec<DeployStage>,
}

impl OutcomeReport {
    pub fn new(delivery: &str, stacks: Vec<String>, stages: Vec<DeployStage>) -> Self {
        let status = if stages.iter().all(DeployStage::succeeded) {
            DeployStatus::Success
        } else {
            DeployStatus::Failed
        };
        Self {
            delivery: delivery.to_string(),
            stacks,
            status,
            stages,
        }
    }

    /// 某个阶段的全部步骤
    pub fn phase(&self, phase: Phase) -> impl Iterator<Item = &DeployStage> {
        self.stages.iter().filter(move |s| s.phase == phase)
    }

    /// 失败的步骤数
    pub fn failures(&self) -> usize {
        self.stages
            .iter()
            .filter(|s| s.status == StageStatus::Failed)
            .count()
    }
}
