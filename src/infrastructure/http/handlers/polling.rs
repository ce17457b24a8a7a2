//! Polling Handlers - 轮询控制

use axum::{
    extract::{Path, State},
    Json,
};
use std::sync::Arc;

use crate::infrastructure::http::dto::{ApiResponse, CorpusRequest, PollingListDto, PollingStatusDto};
use crate::infrastructure::http::error::ApiError;
use crate::infrastructure::http::state::AppState;

fn status_of(state: &AppState, corpus_id: &str) -> PollingStatusDto {
    PollingStatusDto {
        corpus_id: corpus_id.to_string(),
        polling: state.polling.is_polling(corpus_id),
        active_task_count: state.polling.active_task_count(corpus_id),
    }
}

/// 开始轮询
///
/// 清空时通过 WebSocket 推送 CorpusDrained 事件
pub async fn start_polling(
    State(state): State<Arc<AppState>>,
    Json(req): Json<CorpusRequest>,
) -> Result<Json<ApiResponse<PollingStatusDto>>, ApiError> {
    let corpus_id = req
        .corpus_id()
        .ok_or_else(|| ApiError::BadRequest("corpus_id cannot be empty".to_string()))?
        .to_string();

    let events = state.event_publisher.clone();
    let drained_corpus = corpus_id.clone();
    state
        .polling
        .start_polling(
            &corpus_id,
            Some(Box::new(move || events.publish_corpus_drained(&drained_corpus))),
        )
        .await;

    Ok(Json(ApiResponse::success(status_of(&state, &corpus_id))))
}

/// 停止轮询
pub async fn stop_polling(
    State(state): State<Arc<AppState>>,
    Json(req): Json<CorpusRequest>,
) -> Result<Json<ApiResponse<PollingStatusDto>>, ApiError> {
    let corpus_id = req
        .corpus_id()
        .ok_or_else(|| ApiError::BadRequest("corpus_id cannot be empty".to_string()))?;

    state.polling.stop_polling(corpus_id);

    Ok(Json(ApiResponse::success(status_of(&state, corpus_id))))
}

/// 查询轮询状态
pub async fn polling_status(
    State(state): State<Arc<AppState>>,
    Path(corpus_id): Path<String>,
) -> Json<ApiResponse<PollingStatusDto>> {
    Json(ApiResponse::success(status_of(&state, &corpus_id)))
}

/// 列出正在轮询的语料库
pub async fn list_polling(State(state): State<Arc<AppState>>) -> Json<ApiResponse<PollingListDto>> {
    Json(ApiResponse::success(PollingListDto {
        corpora: state.polling.polling_corpora(),
    }))
}
