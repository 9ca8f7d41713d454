//! MCP transport and tool handlers / MCP 传输层与工具处理

pub mod mcp;
pub mod tools;

use axum::{extract::State, Json};
use serde_json::{json, Value};
use std::sync::Arc;

use crate::state::AppState;

/// GET /api/health - 健康检查
pub async fn health_check(State(state): State<Arc<AppState>>) -> Json<Value> {
    Json(json!({
        "status": "ok",
        "version": env!("CARGO_PKG_VERSION"),
        "build_time": env!("BUILD_TIME"),
        "records": state.registry.len(),
        "synced": state.repo_path().is_some(),
        "last_synced": state.last_synced(),
    }))
}
