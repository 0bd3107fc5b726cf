//! 环境变量配置加载

use std::env;
use tracing::warn;

/// 环境配置
#[derive(Clone, Debug)]
pub struct EnvConfig {
    /// GitHub webhook 密钥，未配置时所有签名校验都失败
    pub webhook_secret: Option<String>,
    /// 服务监听端口
    pub port: u16,
    /// 对外公布的基础 URL（如反向代理地址）
    pub public_url: Option<String>,
}

impl EnvConfig {
    /// 从环境变量加载配置
    pub fn from_env() -> Self {
        // Secret - 支持通用名称兼容
        let webhook_secret = load_with_fallback("GITHUB_WEBHOOK_SECRET", "WEBHOOK_SECRET")
            .filter(|s| !s.is_empty());
        if webhook_secret.is_none() {
            warn!("GITHUB_WEBHOOK_SECRET is not set, every webhook delivery will be rejected");
        }

        let port = parse_port(env::var("PORT").ok().as_deref());

        let public_url = env::var("PUBLIC_URL")
            .ok()
            .map(|v| v.trim_end_matches('/').to_string())
            .filter(|s| !s.is_empty());

        Self {
            webhook_secret,
            port,
            public_url,
        }
    }
}

/// 解析监听端口，无效值告警后使用默认端口
fn parse_port(value: Option<&str>) -> u16 {
    match value.map(str::trim).filter(|v| !v.is_empty()) {
        None => constants::DEFAULT_PORT,
        Some(raw) => raw.parse().unwrap_or_else(|_| {
            warn!(
                value = raw,
                default = constants::DEFAULT_PORT,
                "Invalid PORT, using default"
            );
            constants::DEFAULT_PORT
        }),
    }
}

/// 加载环境变量，支持 fallback
fn load_with_fallback(primary: &str, fallback: &str) -> Option<String> {
    env::var(primary).ok().or_else(|| env::var(fallback).ok())
}

/// 常量
pub mod constants {
    /// 默认监听端口
    pub const DEFAULT_PORT: u16 = 9876;

    /// 配置文件名
    pub const CONFIG_FILE_NAME: &str = ".restart-compose.yaml";

    /// webhook body 上限（GitHub 单次 payload 最大 25 MB）
    pub const MAX_BODY_BYTES: usize = 25 * 1024 * 1024;

    /// compose project 标签
    pub const COMPOSE_PROJECT_LABEL: &str = "com.docker.compose.project";

    /// compose service 标签
    pub const COMPOSE_SERVICE_LABEL: &str = "com.docker.compose.service";

    /// 版本号
    pub const VERSION: &str = env!("CARGO_PKG_VERSION");
}
