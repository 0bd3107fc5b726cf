//! 基础设施模块
//!
//! 封装外部依赖（docker compose、git、监听器等）

pub mod command;
pub mod compose;
pub mod git;
pub mod listener;

pub use command::{CommandError, CommandRunner};
pub use compose::{ComposeBackend, ComposeError, DockerCompose};
pub use git::{GitUpdater, SourceUpdater, UpdateError};
pub use listener::{Listener, ListenerProvider, TcpListenerProvider};
