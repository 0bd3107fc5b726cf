//! GitHub webhook 入口
//!
//! POST /github：校验 → 过滤 → 解析 stack → 停止 / 更新 / 启动

use axum::{
    body::{to_bytes, Body, HttpBody},
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::post,
    Json, Router,
};
use std::sync::Arc;
use tracing::{info, warn, Instrument};

use crate::config::env::constants::MAX_BODY_BYTES;
use crate::domain::{PushEvent, WebhookKind};
use crate::error::{ApiError, ApiResult};
use crate::middleware::GithubHeaders;
use crate::services::deploy::{self, DeployContext};
use crate::services::filter::{self, Decision};
use crate::services::resolver;
use crate::services::signature;
use crate::state::AppState;

/// 创建 webhook 路由，其他方法由 axum 返回 405
pub fn router() -> Router<Arc<AppState>> {
    Router::new().route("/github", post(github_webhook))
}

async fn github_webhook(
    State(state): State<Arc<AppState>>,
    headers: GithubHeaders,
    body: Body,
) -> ApiResult<Response> {
    let span = tracing::info_span!("github", delivery = %headers.delivery);
    handle(state, headers, body).instrument(span).await
}

async fn handle(state: Arc<AppState>, headers: GithubHeaders, body: Body) -> ApiResult<Response> {
    let declared = body.size_hint().lower();
    let body = to_bytes(body, MAX_BODY_BYTES).await.map_err(|e| {
        if declared > MAX_BODY_BYTES as u64 {
            warn!(size = declared, limit = MAX_BODY_BYTES, "Webhook payload exceeds size limit");
            ApiError::internal("Request body exceeds size limit")
        } else {
            tracing::error!(error = %e, "Failed to read request body");
            ApiError::internal("Failed to read request body")
        }
    })?;

    let Some(secret) = state.webhook_secret.as_deref() else {
        warn!("Webhook secret is not configured, rejecting request");
        return Err(ApiError::forbidden());
    };
    if !signature::verify_signature(secret, &body, &headers.signature) {
        warn!("Invalid webhook signature");
        return Err(ApiError::forbidden());
    }

    let Some(kind) = WebhookKind::parse(&headers.event) else {
        warn!(event = %headers.event, "Unsupported webhook event");
        return Err(ApiError::bad_request(format!(
            "Unsupported event type: {}",
            headers.event
        )));
    };

    info!(event = kind.as_str(), "Received GitHub webhook");

    if kind == WebhookKind::Ping {
        return Ok(StatusCode::OK.into_response());
    }

    let event = PushEvent::from_slice(&body).map_err(|e| {
        warn!(error = %e, "Failed to parse push payload");
        ApiError::bad_request(format!("Invalid push payload: {}", e))
    })?;

    if let Decision::Ignore(reason) = filter::accept(&event) {
        info!(
            git_ref = %event.git_ref,
            default_branch = %event.default_branch,
            reason = reason.as_str(),
            "Ignoring push"
        );
        return Ok(StatusCode::NO_CONTENT.into_response());
    }

    let plan = resolver::resolve(&event.changed_paths, state.registry.stacks());
    if plan.is_empty() {
        info!(changed = event.changed_paths.len(), "No configured stack affected");
        return Ok(StatusCode::NO_CONTENT.into_response());
    }

    // 客户端断开时 handler future 被丢弃，guard 随之取消剩余步骤
    let cancel = state.request_token();
    let _guard = cancel.clone().drop_guard();
    let ctx = DeployContext::from_state(&state, &headers.delivery, cancel);

    let report = deploy::execute(&ctx, &plan, state.source_root()).await;
    Ok((StatusCode::OK, Json(report)).into_response())
}
