//! 健康检查 API
//!
//! 包含 /ping, /health 端点，均无需认证

use axum::{extract::State, response::IntoResponse, routing::get, Json, Router};
use serde::Serialize;
use std::sync::Arc;

use crate::config::env::constants::VERSION;
use crate::state::AppState;

/// stack 摘要（用于 health 端点）
#[derive(Debug, Serialize)]
struct StackSummary {
    name: String,
    path: String,
    exists: bool,
}

/// 健康检查响应
#[derive(Debug, Serialize)]
struct HealthResponse {
    status: &'static str,
    service: &'static str,
    version: &'static str,
    timestamp: String,
    started_at: String,
    stacks: Vec<StackSummary>,
}

/// 创建健康检查路由
pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/ping", get(ping))
        .route("/health", get(health_check))
}

/// GET /ping
async fn ping() -> &'static str {
    "pong"
}

/// 健康检查 - 返回版本和已配置的 stack
///
/// GET /health
async fn health_check(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let stacks = state
        .registry
        .stacks()
        .iter()
        .map(|s| StackSummary {
            name: s.name.clone(),
            path: s.compose_file.display().to_string(),
            exists: s.exists,
        })
        .collect();

    Json(HealthResponse {
        status: "ok",
        service: "restart-compose",
        version: VERSION,
        timestamp: chrono::Utc::now().to_rfc3339(),
        started_at: state.started_at.to_rfc3339(),
        stacks,
    })
}
