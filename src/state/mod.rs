//! 运行时状态模块
//!
//! 管理应用状态和 stack 注册表

pub mod app_state;
pub mod registry;

pub use app_state::AppState;
pub use registry::StackRegistry;
