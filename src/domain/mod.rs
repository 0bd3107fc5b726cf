//! 领域模型模块
//!
//! 纯数据结构，不依赖 axum/tokio

pub mod deploy;
pub mod event;
pub mod stack;

// Re-exports for convenience
pub use deploy::{DeployStage, DeployStatus, OutcomeReport, Phase, StageStatus};
pub use event::{PushEvent, WebhookKind};
pub use stack::{Stack, StackMember};
