//! Ping Handler
//!
//! 健康检查，同时报告分析后端是否可达

use axum::{extract::State, Json};
use serde::Serialize;
use std::sync::Arc;

use crate::infrastructure::http::state::AppState;

/// Ping 响应
#[derive(Serialize)]
pub struct PingResponse {
    pub status: &'static str,
    pub version: &'static str,
    pub backend_reachable: bool,
    pub polling_corpora: usize,
}

/// Ping endpoint - 健康检查
pub async fn ping(State(state): State<Arc<AppState>>) -> Json<PingResponse> {
    Json(PingResponse {
        status: "ok",
        version: env!("CARGO_PKG_VERSION"),
        backend_reachable: state.source.health_check().await,
        polling_corpora: state.polling.polling_corpora().len(),
    })
}
