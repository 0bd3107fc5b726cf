//! 服务层模块
//!
//! 包含核心业务逻辑：签名校验、事件过滤、stack 解析和部署编排

pub mod deploy;
pub mod filter;
pub mod resolver;
pub mod signature;
