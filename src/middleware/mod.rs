//! 请求校验
//!
//! webhook header 的前置检查

pub mod webhook;

pub use webhook::GithubHeaders;
