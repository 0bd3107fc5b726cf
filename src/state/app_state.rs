//! 应用状态

use chrono::{DateTime, Utc};
use std::path::Path;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;

use crate::infra::{ComposeBackend, SourceUpdater};

use super::registry::StackRegistry;

/// 应用状态
///
/// 启动后只读，所有请求通过 `Arc<AppState>` 并发共享
pub struct AppState {
    // ========== 核心配置 ==========
    /// GitHub webhook 密钥（None 时拒绝所有请求）
    pub webhook_secret: Option<String>,
    /// 已配置的 stack
    pub registry: StackRegistry,
    /// 服务启动时间
    pub started_at: DateTime<Utc>,

    // ========== 外部服务 ==========
    /// compose 后端
    pub compose: Arc<dyn ComposeBackend>,
    /// 源码更新
    pub updater: Arc<dyn SourceUpdater>,

    /// 进程级 shutdown token，每个请求使用它的子 token
    pub shutdown: CancellationToken,
}

impl AppState {
    /// 创建新的应用状态
    pub fn new(
        webhook_secret: Option<String>,
        registry: StackRegistry,
        compose: Arc<dyn ComposeBackend>,
        updater: Arc<dyn SourceUpdater>,
    ) -> Self {
        Self {
            webhook_secret,
            registry,
            started_at: Utc::now(),
            compose,
            updater,
            shutdown: CancellationToken::new(),
        }
    }

    /// git 工作目录
    pub fn source_root(&self) -> &Path {
        self.registry.root()
    }

    /// 为单个请求创建取消令牌
    pub fn request_token(&self) -> CancellationToken {
        self.shutdown.child_token()
    }
}
