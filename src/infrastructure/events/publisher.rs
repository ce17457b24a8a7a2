//! Event Publisher Implementation
//!
//! 任务存储变更的 WebSocket 事件推送

use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tokio::sync::broadcast;

use crate::domain::TrackedTask;

/// 存储事件类型
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "event", content = "data")]
pub enum StoreEvent {
    /// 任务快照写入
    TaskUpdated { task: TrackedTask },
    /// 任务快照移除
    TaskRemoved { corpus_id: String, text_id: String },
    /// 语料库活动任务清空
    CorpusDrained { corpus_id: String },
}

/// 事件发布器
pub struct EventPublisher {
    channel: broadcast::Sender<StoreEvent>,
}

impl EventPublisher {
    pub fn new() -> Self {
        Self::with_capacity(256)
    }

    pub fn with_capacity(capacity: usize) -> Self {
        let (tx, _) = broadcast::channel(capacity);
        Self { channel: tx }
    }

    pub fn arc(self) -> Arc<Self> {
        Arc::new(self)
    }

    /// 订阅存储事件
    pub fn subscribe(&self) -> broadcast::Receiver<StoreEvent> {
        self.channel.subscribe()
    }

    pub fn publish_task_updated(&self, task: &TrackedTask) {
        self.publish(StoreEvent::TaskUpdated { task: task.clone() });
    }

    pub fn publish_task_removed(&self, corpus_id: &str, text_id: &str) {
        self.publish(StoreEvent::TaskRemoved {
            corpus_id: corpus_id.to_string(),
            text_id: text_id.to_string(),
        });
    }

    pub fn publish_corpus_drained(&self, corpus_id: &str) {
        self.publish(StoreEvent::CorpusDrained {
            corpus_id: corpus_id.to_string(),
        });
    }

    fn publish(&self, event: StoreEvent) {
        if let Err(e) = self.channel.send(event) {
            tracing::trace!(error = %e, "Failed to publish store event (no receivers)");
        }
    }
}

impl Default for EventPublisher {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_subscriber_receives_events() {
        let publisher = EventPublisher::new();
        let mut rx = publisher.subscribe();

        publisher.publish_corpus_drained("c1");

        match rx.recv().await.unwrap() {
            StoreEvent::CorpusDrained { corpus_id } => assert_eq!(corpus_id, "c1"),
            other => panic!("unexpected event: {:?}", other),
        }
    }

    #[test]
    fn test_publish_without_subscribers_is_silent() {
        let publisher = EventPublisher::new();
        publisher.publish_task_removed("c1", "x");
    }

    #[test]
    fn test_event_wire_format() {
        let event = StoreEvent::TaskRemoved {
            corpus_id: "c1".to_string(),
            text_id: "x".to_string(),
        };
        let json = serde_json::to_value(&event).unwrap();
        assert_eq!(json["event"], "TaskRemoved");
        assert_eq!(json["data"]["text_id"], "x");
    }
}
