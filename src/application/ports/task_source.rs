//! Task Source Port - 后端任务列表
//!
//! 定义读取语料库后台任务列表的抽象接口，具体实现在 infrastructure/adapters 层

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::domain::TaskRecord;

/// 任务源错误
#[derive(Debug, Error)]
pub enum TaskSourceError {
    #[error("Network error: {0}")]
    NetworkError(String),

    #[error("Request timeout")]
    Timeout,

    #[error("Service error: {0}")]
    ServiceError(String),

    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    #[error("Invalid backend URL: {0}")]
    InvalidUrl(String),
}

/// 任务列表响应
///
/// 与后端 `{success, data, message?}` 信封一致
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TaskListResponse {
    pub success: bool,
    #[serde(default)]
    pub data: Vec<TaskRecord>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl TaskListResponse {
    pub fn ok(data: Vec<TaskRecord>) -> Self {
        Self {
            success: true,
            data,
            message: None,
        }
    }

    pub fn rejected(message: impl Into<String>) -> Self {
        Self {
            success: false,
            data: Vec::new(),
            message: Some(message.into()),
        }
    }
}

/// Task Source Port
///
/// 返回语料库当前已知的全部任务（任意状态），由调用方轮询
#[async_trait]
pub trait TaskSourcePort: Send + Sync {
    async fn list_corpus_tasks(&self, corpus_id: &str) -> Result<TaskListResponse, TaskSourceError>;

    /// 检查后端是否可用
    async fn health_check(&self) -> bool {
        true
    }
}
