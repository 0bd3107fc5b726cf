//! GitHub webhook header 校验
//!
//! 提供 `GithubHeaders` extractor。检查顺序是固定的：
//! Content-Type → X-GitHub-Delivery → X-Hub-Signature-256，
//! 任何一步失败都直接结束请求，不会读取 body

use axum::{
    async_trait,
    extract::FromRequestParts,
    http::{header, header::HeaderMap, request::Parts},
};

use crate::error::ApiError;

pub const DELIVERY_HEADER: &str = "x-github-delivery";
pub const EVENT_HEADER: &str = "x-github-event";
pub const SIGNATURE_HEADER: &str = "x-hub-signature-256";

/// 通过校验的 webhook header
#[derive(Debug, Clone)]
pub struct GithubHeaders {
    /// delivery ID，后续所有日志都带上它
    pub delivery: String,
    /// 原始签名（可能带 `sha256=` 前缀）
    pub signature: String,
    /// 事件类型原始值，签名校验通过后才解析
    pub event: String,
}

#[async_trait]
impl<S> FromRequestParts<S> for GithubHeaders
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        GithubHeaders::from_headers(&parts.headers)
    }
}

impl GithubHeaders {
    pub fn from_headers(headers: &HeaderMap) -> Result<Self, ApiError> {
        let content_type = header_str(headers, header::CONTENT_TYPE.as_str());
        if !is_json(content_type) {
            tracing::warn!(content_type = content_type, "Rejected webhook with invalid content type");
            return Err(ApiError::bad_request("Content-Type must be application/json"));
        }

        let delivery = header_str(headers, DELIVERY_HEADER);
        if delivery.is_empty() {
            tracing::warn!("Missing X-GitHub-Delivery header");
            return Err(ApiError::bad_request("Missing X-GitHub-Delivery header"));
        }

        let signature = header_str(headers, SIGNATURE_HEADER);
        if signature.is_empty() {
            tracing::warn!(delivery = delivery, "Missing X-Hub-Signature-256 header");
            return Err(ApiError::unauthorized());
        }

        Ok(Self {
            delivery: delivery.to_string(),
            signature: signature.to_string(),
            event: header_str(headers, EVENT_HEADER).to_string(),
        })
    }
}

/// 读取 header，缺失或不是合法 ASCII 都视为空
fn header_str<'a>(headers: &'a HeaderMap, name: &str) -> &'a str {
    headers
        .get(name)
        .and_then(|v| v.to_str().ok())
        .map(str::trim)
        .unwrap_or_default()
}

/// 只比较 media type，忽略 charset 等参数
fn is_json(content_type: &str) -> bool {
    content_type
        .split(';')
        .next()
        .map(|media| media.trim().eq_ignore_ascii_case("application/json"))
        .unwrap_or(false)
}
