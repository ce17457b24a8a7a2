//! Data Transfer Objects

use serde::{Deserialize, Serialize};

use crate::domain::TrackedTask;

// ============================================================================
// 统一响应结构
// ============================================================================

/// 统一 API 响应格式
#[derive(Debug, Serialize)]
pub struct ApiResponse<T: Serialize> {
    pub errno: i32,
    pub error: String,
    pub data: Option<T>,
}

impl<T: Serialize> ApiResponse<T> {
    /// 成功响应
    pub fn success(data: T) -> Self {
        Self {
            errno: 0,
            error: String::new(),
            data: Some(data),
        }
    }
}

// ============================================================================
// Polling DTOs
// ============================================================================

#[derive(Debug, Deserialize)]
pub struct CorpusRequest {
    pub corpus_id: String,
}

impl CorpusRequest {
    /// 去除首尾空白后的语料库 ID，空则返回 None
    pub fn corpus_id(&self) -> Option<&str> {
        let id = self.corpus_id.trim();
        (!id.is_empty()).then_some(id)
    }
}

#[derive(Debug, Serialize)]
pub struct PollingStatusDto {
    pub corpus_id: String,
    pub polling: bool,
    pub active_task_count: usize,
}

#[derive(Debug, Serialize)]
pub struct PollingListDto {
    pub corpora: Vec<String>,
}

// ============================================================================
// Task DTOs
// ============================================================================

#[derive(Debug, Serialize)]
pub struct TaskDto {
    pub task_id: String,
    pub corpus_id: String,
    pub text_id: String,
    pub progress: u8,
    pub stage: String,
    pub message: String,
    pub status: String,
    pub updated_at: String,
}

impl From<TrackedTask> for TaskDto {
    fn from(task: TrackedTask) -> Self {
        Self {
            task_id: task.task_id,
            corpus_id: task.corpus_id,
            text_id: task.text_id,
            progress: task.progress,
            stage: task.stage,
            message: task.message,
            status: task.status.as_str().to_string(),
            updated_at: task.updated_at.to_rfc3339(),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct CorpusTasksDto {
    pub corpus_id: String,
    pub active_task_count: usize,
    pub tasks: Vec<TaskDto>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_corpus_request_trims() {
        let req = CorpusRequest {
            corpus_id: "  c1 ".to_string(),
        };
        assert_eq!(req.corpus_id(), Some("c1"));

        let empty = CorpusRequest {
            corpus_id: "   ".to_string(),
        };
        assert_eq!(empty.corpus_id(), None);
    }

    #[test]
    fn test_success_envelope() {
        let json = serde_json::to_value(ApiResponse::success(PollingListDto { corpora: vec![] }))
            .unwrap();
        assert_eq!(json["errno"], 0);
        assert_eq!(json["error"], "");
        assert!(json["data"]["corpora"].as_array().unwrap().is_empty());
    }
}
