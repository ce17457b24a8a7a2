//! Task Handlers - 任务快照读取

use axum::{
    extract::{Path, State},
    Json,
};
use std::sync::Arc;

use crate::application::TaskListResponse;
use crate::infrastructure::http::dto::{ApiResponse, CorpusTasksDto, TaskDto};
use crate::infrastructure::http::error::ApiError;
use crate::infrastructure::http::state::AppState;

/// 语料库的任务快照
pub async fn corpus_tasks(
    State(state): State<Arc<AppState>>,
    Path(corpus_id): Path<String>,
) -> Json<ApiResponse<CorpusTasksDto>> {
    let tasks: Vec<TaskDto> = state
        .store
        .entries_for_corpus(&corpus_id)
        .into_iter()
        .map(TaskDto::from)
        .collect();

    Json(ApiResponse::success(CorpusTasksDto {
        active_task_count: state.polling.active_task_count(&corpus_id),
        corpus_id,
        tasks,
    }))
}

/// 文本当前跟踪的任务
pub async fn text_task(
    State(state): State<Arc<AppState>>,
    Path(text_id): Path<String>,
) -> Result<Json<ApiResponse<TaskDto>>, ApiError> {
    let task = state
        .store
        .get(&text_id)
        .ok_or_else(|| ApiError::NotFound(format!("No tracked task for text: {}", text_id)))?;

    Ok(Json(ApiResponse::success(TaskDto::from(task))))
}

/// 直接读取后端的任务列表（不写入存储）
pub async fn backend_tasks(
    State(state): State<Arc<AppState>>,
    Path(corpus_id): Path<String>,
) -> Result<Json<ApiResponse<TaskListResponse>>, ApiError> {
    let response = state.source.list_corpus_tasks(&corpus_id).await?;
    Ok(Json(ApiResponse::success(response)))
}
