//! 部署编排
//!
//! stop → update → start 三个阶段严格按顺序执行：
//! - 某个 stack 停止失败不影响其他 stack，也不影响它自己的启动
//! - git 更新只执行一次，失败后仍然启动所有 stack（使用当前源码）
//! - 没有回滚和重试，结果只通过日志和返回的报告体现

pub mod context;

use std::fmt::Display;
use std::future::Future;
use std::path::Path;
use tracing::{error, info, warn};

use crate::domain::{DeployStage, OutcomeReport, Phase, StageStatus};
use crate::services::resolver::DeploymentPlan;
use crate::state::registry;

pub use context::DeployContext;

/// 执行部署计划
///
/// 仅在计划非空时调用
pub async fn execute(
    ctx: &DeployContext,
    plan: &DeploymentPlan<'_>,
    source_root: &Path,
) -> OutcomeReport {
    let names = plan.names();
    info!(stacks = ?names, "Restarting stacks");

    // 记录每个 stack 当前的实际状态
    for stack in plan.stacks() {
        let current = registry::refresh(stack, ctx.compose.as_ref(), &ctx.cancel).await;
        info!(
            stack = %current.name,
            exists = current.exists,
            members = current.members.len(),
            running = current.running_count(),
            "Stack state before restart"
        );
    }

    let mut stages = Vec::with_capacity(plan.len() * 2 + 1);

    // Phase 1: stop
    for stack in plan.stacks() {
        let stage = DeployStage::new(Phase::Stop, &stack.name, &format!("Stop {}", stack.name));
        stages.push(run_step(ctx, stage, ctx.compose.stop(stack, &ctx.cancel)).await);
    }

    // Phase 2: update（只执行一次）
    let root = source_root.display().to_string();
    info!(dir = %root, "Updating git repository");
    let stage = DeployStage::new(Phase::Update, &root, "Git Pull");
    stages.push(run_step(ctx, stage, ctx.updater.update(source_root, &ctx.cancel)).await);

    // Phase 3: start（与 stop 结果无关）
    for stack in plan.stacks() {
        let stage = DeployStage::new(Phase::Start, &stack.name, &format!("Start {}", stack.name));
        stages.push(run_step(ctx, stage, ctx.compose.start(stack, &ctx.cancel)).await);
    }

    let report = OutcomeReport::new(&ctx.delivery, names, stages);
    log_summary(&report);
    report
}

/// 执行单个步骤并记录结果
///
/// 已取消时不再发起新的外部调用
async fn run_step<E, F>(ctx: &DeployContext, mut stage: DeployStage, step: F) -> DeployStage
where
    E: Display,
    F: Future<Output = Result<(), E>>,
{
    if ctx.is_cancelled() {
        warn!(
            phase = stage.phase.as_str(),
            target = %stage.target,
            "Request cancelled, skipping step"
        );
        stage.skip(Some("cancelled".to_string()));
        return stage;
    }

    stage.start();
    match step.await {
        Ok(()) => {
            stage.finish(true, None);
            match stage.phase {
                Phase::Stop => {
                    info!(stack = %stage.target, "Successfully stopped stack")
                }
                Phase::Update => {
                    info!(dir = %stage.target, "Git repository updated")
                }
                Phase::Start => {
                    info!(stack = %stage.target, "Successfully restarted stack")
                }
            }
        }
        Err(e) => {
            let message = e.to_string();
            match stage.phase {
                Phase::Stop => {
                    error!(stack = %stage.target, error = %message, "Failed to stop stack")
                }
                Phase::Update => {
                    error!(dir = %stage.target, error = %message, "Failed to update git repository, starting stacks with current files")
                }
                Phase::Start => {
                    error!(stack = %stage.target, error = %message, "Failed to start stack")
                }
            }
            stage.finish(false, Some(message));
        }
    }
    stage
}

/// 打印阶段汇总
fn log_summary(report: &OutcomeReport) {
    for stage in &report.stages {
        let duration = stage
            .duration_ms
            .map(|d| format!("{}ms", d))
            .unwrap_or_else(|| "-".to_string());
        let status_icon = match stage.status {
            StageStatus::Success => "✓",
            StageStatus::Failed => "✗",
            StageStatus::Skipped => "⊘",
            StageStatus::Running => "⟳",
            StageStatus::Pending => "○",
        };
        tracing::debug!(
            "{} {} ({})",
            status_icon,
            stage.display_name,
            duration
        );
    }

    info!(
        status = report.status.as_str(),
        failures = report.failures(),
        "Deployment finished"
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{DeployStatus, Stack};
    use crate::services::resolver::resolve;
    use crate::testing::{CallLog, RecordingCompose, RecordingUpdater};
    use std::path::PathBuf;
    use std::sync::Arc;
    use tokio_util::sync::CancellationToken;

    fn stacks(names: &[&str]) -> Vec<Stack> {
        names
            .iter()
            .map(|n| {
                Stack::new(
                    PathBuf::from(format!("/nonexistent/infra/{}/docker-compose.yml", n)),
                    true,
                )
            })
            .collect()
    }

    fn context(compose: RecordingCompose, updater: RecordingUpdater) -> DeployContext {
        DeployContext::new(
            "delivery-1",
            Arc::new(compose),
            Arc::new(updater),
            CancellationToken::new(),
        )
    }

    fn root() -> PathBuf {
        PathBuf::from("/nonexistent/infra")
    }

    #[tokio::test]
    async fn test_single_stack_order() {
        let log = CallLog::default();
        let ctx = context(
            RecordingCompose::with_log(log.clone()),
            RecordingUpdater::with_log(log.clone()),
        );
        let stacks = stacks(&["a"]);
        let plan = resolve(&["a/docker-compose.yml"], &stacks);

        let report = execute(&ctx, &plan, &root()).await;

        assert_eq!(
            log.entries(),
            vec!["stop:a", "update:/nonexistent/infra", "start:a"]
        );
        assert_eq!(report.status, DeployStatus::Success);
        assert_eq!(report.stacks, vec!["a"]);
        assert_eq!(report.stages.len(), 3);
    }

    #[tokio::test]
    async fn test_stop_failure_is_isolated() {
        let log = CallLog::default();
        let ctx = context(
            RecordingCompose::with_log(log.clone()).failing_stop("a"),
            RecordingUpdater::with_log(log.clone()),
        );
        let stacks = stacks(&["a", "b"]);
        let plan = resolve(&["a/docker-compose.yml", "b/docker-compose.yml"], &stacks);

        let report = execute(&ctx, &plan, &root()).await;

        assert_eq!(
            log.entries(),
            vec![
                "stop:a",
                "stop:b",
                "update:/nonexistent/infra",
                "start:a",
                "start:b"
            ]
        );
        let stops: Vec<&StageStatus> = report.phase(Phase::Stop).map(|s| &s.status).collect();
        assert_eq!(stops, vec![&StageStatus::Failed, &StageStatus::Success]);
        assert!(report.phase(Phase::Start).all(|s| s.succeeded()));
        assert_eq!(report.status, DeployStatus::Failed);
        assert_eq!(report.failures(), 1);
    }

    #[tokio::test]
    async fn test_update_runs_once_and_failure_still_starts() {
        let log = CallLog::default();
        let ctx = context(
            RecordingCompose::with_log(log.clone()),
            RecordingUpdater::with_log(log.clone()).failing(),
        );
        let stacks = stacks(&["a", "b", "c"]);
        let plan = resolve(
            &[
                "c/docker-compose.yml",
                "a/docker-compose.yml",
                "b/docker-compose.yml",
            ],
            &stacks,
        );

        let report = execute(&ctx, &plan, &root()).await;

        let entries = log.entries();
        assert_eq!(entries.iter().filter(|c| c.starts_with("update:")).count(), 1);
        assert_eq!(
            entries,
            vec![
                "stop:c",
                "stop:a",
                "stop:b",
                "update:/nonexistent/infra",
                "start:c",
                "start:a",
                "start:b"
            ]
        );

        let update: Vec<&DeployStage> = report.phase(Phase::Update).collect();
        assert_eq!(update.len(), 1);
        assert_eq!(update[0].status, StageStatus::Failed);
        assert!(update[0].message.as_deref().unwrap().contains("git"));
        assert!(report.phase(Phase::Start).all(|s| s.succeeded()));
    }

    #[tokio::test]
    async fn test_start_failure_is_reported_not_retried() {
        let log = CallLog::default();
        let ctx = context(
            RecordingCompose::with_log(log.clone()).failing_start("a"),
            RecordingUpdater::with_log(log.clone()),
        );
        let stacks = stacks(&["a"]);
        let plan = resolve(&["a/docker-compose.yml"], &stacks);

        let report = execute(&ctx, &plan, &root()).await;

        assert_eq!(
            log.entries()
                .iter()
                .filter(|c| c.as_str() == "start:a")
                .count(),
            1
        );
        let start: Vec<&DeployStage> = report.phase(Phase::Start).collect();
        assert_eq!(start[0].status, StageStatus::Failed);
        assert_eq!(report.status, DeployStatus::Failed);
    }

    #[tokio::test]
    async fn test_cancelled_request_issues_no_calls() {
        let log = CallLog::default();
        let ctx = context(
            RecordingCompose::with_log(log.clone()),
            RecordingUpdater::with_log(log.clone()),
        );
        ctx.cancel.cancel();
        let stacks = stacks(&["a"]);
        let plan = resolve(&["a/docker-compose.yml"], &stacks);

        let report = execute(&ctx, &plan, &root()).await;

        assert!(log.entries().is_empty());
        assert!(report
            .stages
            .iter()
            .all(|s| s.status == StageStatus::Skipped));
    }

    #[derive(Clone, Default)]
    struct Captured(Arc<std::sync::Mutex<Vec<u8>>>);

    impl std::io::Write for Captured {
        fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }

    #[tokio::test]
    async fn test_delivery_comes_from_request_span() {
        use tracing::Instrument;

        let captured = Captured::default();
        let writer = captured.clone();
        let subscriber = tracing_subscriber::fmt()
            .with_ansi(false)
            .with_writer(move || writer.clone())
            .finish();
        let _default = tracing::subscriber::set_default(subscriber);

        let ctx = context(RecordingCompose::new(), RecordingUpdater::default());
        let stacks = stacks(&["a"]);
        let plan = resolve(&["a/docker-compose.yml"], &stacks);

        execute(&ctx, &plan, &root())
            .instrument(tracing::info_span!("github", delivery = "delivery-1"))
            .await;

        let text = String::from_utf8(captured.0.lock().unwrap().clone()).unwrap();
        let lines: Vec<&str> = text.lines().filter(|l| !l.trim().is_empty()).collect();
        assert!(lines.iter().any(|l| l.contains("Deployment finished")));
        for line in lines {
            assert_eq!(line.matches("delivery-1").count(), 1, "{}", line);
        }
    }
}
