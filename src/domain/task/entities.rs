//! Task Context - Entities

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::message::{split_stage_message, STALE_TASK_MESSAGE};
use super::value_objects::TaskStatus;

/// 后端任务记录
///
/// 由分析后端拥有，本服务只读
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskRecord {
    /// 任务 ID
    pub id: String,
    /// 任务所处理的文本 ID（没有文本的任务不会被跟踪）
    #[serde(default)]
    pub text_id: Option<String>,
    /// 所属语料库 ID（线上记录不一定携带）
    #[serde(default)]
    pub corpus_id: Option<String>,
    pub status: TaskStatus,
    /// 进度百分比 0-100
    #[serde(default)]
    pub progress: u8,
    #[serde(default)]
    pub message: Option<String>,
}

impl TaskRecord {
    pub fn new(id: impl Into<String>, text_id: impl Into<String>, status: TaskStatus) -> Self {
        Self {
            id: id.into(),
            text_id: Some(text_id.into()),
            corpus_id: None,
            status,
            progress: 0,
            message: None,
        }
    }

    pub fn with_progress(mut self, progress: u8) -> Self {
        self.progress = progress.min(100);
        self
    }

    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = Some(message.into());
        self
    }
}

/// UI 状态存储中跟踪的任务
///
/// 不变量:
/// - 每个 text_id 在存储中至多一条
/// - 仅在所属语料库轮询期间（或完成后的短暂停留期）存在
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrackedTask {
    pub task_id: String,
    pub corpus_id: String,
    pub text_id: String,
    pub progress: u8,
    pub stage: String,
    pub message: String,
    pub status: TaskStatus,
    pub updated_at: DateTime<Utc>,
}

impl TrackedTask {
    /// 从活动任务记录构建快照，stage 由消息解析
    pub fn from_active(corpus_id: &str, text_id: &str, record: &TaskRecord) -> Self {
        let (stage, message) = split_stage_message(record.message.as_deref());
        Self {
            task_id: record.id.clone(),
            corpus_id: corpus_id.to_string(),
            text_id: text_id.to_string(),
            progress: record.progress,
            stage,
            message,
            status: record.status,
            updated_at: Utc::now(),
        }
    }

    /// 从终态任务记录构建快照，进度固定为 100
    pub fn from_terminal(corpus_id: &str, text_id: &str, record: &TaskRecord) -> Self {
        let fallback = match record.status {
            TaskStatus::Failed => "Failed",
            _ => "Completed",
        };
        let message = record
            .message
            .clone()
            .filter(|m| !m.is_empty())
            .unwrap_or_else(|| fallback.to_string());

        Self {
            task_id: record.id.clone(),
            corpus_id: corpus_id.to_string(),
            text_id: text_id.to_string(),
            progress: 100,
            stage: record.status.as_str().to_string(),
            message,
            status: record.status,
            updated_at: Utc::now(),
        }
    }

    /// 进度停滞时本地判定的失败快照（后端状态不变）
    pub fn stalled(corpus_id: &str, text_id: &str, record: &TaskRecord) -> Self {
        Self {
            task_id: record.id.clone(),
            corpus_id: corpus_id.to_string(),
            text_id: text_id.to_string(),
            progress: record.progress,
            stage: TaskStatus::Failed.as_str().to_string(),
            message: STALE_TASK_MESSAGE.to_string(),
            status: TaskStatus::Failed,
            updated_at: Utc::now(),
        }
    }

    pub fn is_active(&self) -> bool {
        self.status.is_active()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_record_deserializes_camel_case() {
        let json = r#"{"id":"t1","textId":"x","status":"processing","progress":40,"message":"usas: tagging"}"#;
        let record: TaskRecord = serde_json::from_str(json).unwrap();
        assert_eq!(record.text_id.as_deref(), Some("x"));
        assert_eq!(record.progress, 40);
        assert_eq!(record.corpus_id, None);
    }

    #[test]
    fn test_record_without_text_id() {
        let json = r#"{"id":"t1","status":"pending"}"#;
        let record: TaskRecord = serde_json::from_str(json).unwrap();
        assert!(record.text_id.is_none());
        assert_eq!(record.progress, 0);
    }

    #[test]
    fn test_from_active_parses_stage() {
        let record = TaskRecord::new("t1", "x", TaskStatus::Processing)
            .with_progress(30)
            .with_message("mipvu: scanning");
        let tracked = TrackedTask::from_active("c1", "x", &record);
        assert_eq!(tracked.stage, "mipvu");
        assert_eq!(tracked.message, "scanning");
        assert_eq!(tracked.progress, 30);
        assert!(tracked.is_active());
    }

    #[test]
    fn test_from_terminal_fallback_messages() {
        let done = TaskRecord::new("t1", "x", TaskStatus::Completed).with_progress(80);
        let tracked = TrackedTask::from_terminal("c1", "x", &done);
        assert_eq!(tracked.progress, 100);
        assert_eq!(tracked.stage, "completed");
        assert_eq!(tracked.message, "Completed");

        let failed = TaskRecord::new("t2", "y", TaskStatus::Failed);
        let tracked = TrackedTask::from_terminal("c1", "y", &failed);
        assert_eq!(tracked.stage, "failed");
        assert_eq!(tracked.message, "Failed");
    }

    #[test]
    fn test_stalled_snapshot() {
        let record = TaskRecord::new("t1", "x", TaskStatus::Processing).with_progress(40);
        let tracked = TrackedTask::stalled("c1", "x", &record);
        assert_eq!(tracked.status, TaskStatus::Failed);
        assert_eq!(tracked.message, STALE_TASK_MESSAGE);
        assert_eq!(tracked.progress, 40);
    }
}
