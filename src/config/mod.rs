//! 配置模块
//!
//! 环境变量解析与 stack 配置文件加载

pub mod env;
pub mod stacks;

pub use env::EnvConfig;
pub use stacks::{ConfigError, LoadedConfig};
