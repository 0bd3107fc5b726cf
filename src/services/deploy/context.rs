//! 部署上下文
//!
//! 单次 webhook 请求的执行上下文：delivery ID、外部服务和取消令牌

use std::sync::Arc;
use tokio_util::sync::CancellationToken;

use crate::infra::{ComposeBackend, SourceUpdater};
use crate::state::AppState;

/// 部署执行上下文
#[derive(Clone)]
pub struct DeployContext {
    /// GitHub delivery ID，写入结果报告（日志中由请求 span 携带）
    pub delivery: String,
    /// compose 后端
    pub compose: Arc<dyn ComposeBackend>,
    /// 源码更新
    pub updater: Arc<dyn SourceUpdater>,
    /// 取消令牌
    pub cancel: CancellationToken,
}

impl DeployContext {
    pub fn new(
        delivery: impl Into<String>,
        compose: Arc<dyn ComposeBackend>,
        updater: Arc<dyn SourceUpdater>,
        cancel: CancellationToken,
    ) -> Self {
        Self {
            delivery: delivery.into(),
            compose,
            updater,
            cancel,
        }
    }

    /// 从应用状态创建
    pub fn from_state(state: &AppState, delivery: &str, cancel: CancellationToken) -> Self {
        Self::new(
            delivery,
            state.compose.clone(),
            state.updater.clone(),
            cancel,
        )
    }

    /// 检查是否被取消
    pub fn is_cancelled(&self) -> bool {
        self.cancel.is_cancelled()
    }
}
