//! Scripted Task Source - 不依赖后端的任务源
//!
//! 按语料库保存当前任务列表，也可以排队一次性响应（任务列表、拒绝、网络错误），
//! 用于测试和脱离后端运行

use async_trait::async_trait;
use dashmap::DashMap;
use std::collections::VecDeque;
use std::time::Duration;

use crate::application::ports::{TaskListResponse, TaskSourceError, TaskSourcePort};
use crate::domain::TaskRecord;

#[derive(Debug, Clone)]
enum Scripted {
    Tasks(Vec<TaskRecord>),
    Rejected(String),
    Error(String),
}

/// 脚本化任务源
#[derive(Default)]
pub struct ScriptedTaskSource {
    /// corpus_id -> 当前任务列表（队列为空时返回）
    current: DashMap<String, Vec<TaskRecord>>,
    /// corpus_id -> 排队的一次性响应
    queued: DashMap<String, VecDeque<Scripted>>,
    /// corpus_id -> 调用次数
    calls: DashMap<String, usize>,
    latency: Option<Duration>,
}

impl ScriptedTaskSource {
    pub fn new() -> Self {
        Self::default()
    }

    /// 每次请求在返回前等待 `latency`
    pub fn with_latency(latency: Duration) -> Self {
        Self {
            latency: Some(latency),
            ..Self::default()
        }
    }

    /// 设置语料库的当前任务列表
    pub fn set_tasks(&self, corpus_id: &str, tasks: Vec<TaskRecord>) {
        self.current.insert(corpus_id.to_string(), tasks);
    }

    /// 排队一次任务列表响应
    pub fn push_tasks(&self, corpus_id: &str, tasks: Vec<TaskRecord>) {
        self.push(corpus_id, Scripted::Tasks(tasks));
    }

    /// 排队一次 success=false 响应
    pub fn push_rejection(&self, corpus_id: &str, message: impl Into<String>) {
        self.push(corpus_id, Scripted::Rejected(message.into()));
    }

    /// 排队一次网络错误
    pub fn push_error(&self, corpus_id: &str, message: impl Into<String>) {
        self.push(corpus_id, Scripted::Error(message.into()));
    }

    pub fn call_count(&self, corpus_id: &str) -> usize {
        self.calls.get(corpus_id).map(|c| *c).unwrap_or(0)
    }

    fn push(&self, corpus_id: &str, step: Scripted) {
        self.queued
            .entry(corpus_id.to_string())
            .or_default()
            .push_back(step);
    }

    fn next_step(&self, corpus_id: &str) -> Scripted {
        let queued = self
            .queued
            .get_mut(corpus_id)
            .and_then(|mut queue| queue.pop_front());

        queued.unwrap_or_else(|| {
            Scripted::Tasks(
                self.current
                    .get(corpus_id)
                    .map(|tasks| tasks.clone())
                    .unwrap_or_default(),
            )
        })
    }
}

#[async_trait]
impl TaskSourcePort for ScriptedTaskSource {
    async fn list_corpus_tasks(&self, corpus_id: &str) -> Result<TaskListResponse, TaskSourceError> {
        *self.calls.entry(corpus_id.to_string()).or_insert(0) += 1;

        if let Some(latency) = self.latency {
            tokio::time::sleep(latency).await;
        }

        match self.next_step(corpus_id) {
            Scripted::Tasks(tasks) => Ok(TaskListResponse::ok(tasks)),
            Scripted::Rejected(message) => Ok(TaskListResponse::rejected(message)),
            Scripted::Error(message) => Err(TaskSourceError::NetworkError(message)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::TaskStatus;

    #[tokio::test]
    async fn test_queued_responses_before_current() {
        let source = ScriptedTaskSource::new();
        source.set_tasks("c1", vec![TaskRecord::new("t2", "y", TaskStatus::Pending)]);
        source.push_tasks("c1", vec![TaskRecord::new("t1", "x", TaskStatus::Pending)]);
        source.push_error("c1", "boom");

        let first = source.list_corpus_tasks("c1").await.unwrap();
        assert_eq!(first.data[0].id, "t1");
        assert!(source.list_corpus_tasks("c1").await.is_err());
        let third = source.list_corpus_tasks("c1").await.unwrap();
        assert_eq!(third.data[0].id, "t2");
        assert_eq!(source.call_count("c1"), 3);
    }

    #[tokio::test]
    async fn test_unknown_corpus_is_empty() {
        let source = ScriptedTaskSource::new();
        let response = source.list_corpus_tasks("nope").await.unwrap();
        assert!(response.success);
        assert!(response.data.is_empty());
    }

    #[tokio::test]
    async fn test_rejection() {
        let source = ScriptedTaskSource::new();
        source.push_rejection("c1", "locked");
        let response = source.list_corpus_tasks("c1").await.unwrap();
        assert!(!response.success);
        assert_eq!(response.message.as_deref(), Some("locked"));
    }
}
