//! In-Memory Task Store Implementation

use dashmap::DashMap;
use std::sync::Arc;

use crate::application::ports::TaskStorePort;
use crate::domain::TrackedTask;
use crate::infrastructure::events::EventPublisher;

/// 内存任务存储
pub struct InMemoryTaskStore {
    /// text_id -> TrackedTask
    tasks: DashMap<String, TrackedTask>,
    /// 写入时推送变更事件
    events: Option<Arc<EventPublisher>>,
}

impl InMemoryTaskStore {
    pub fn new() -> Self {
        Self {
            tasks: DashMap::new(),
            events: None,
        }
    }

    pub fn with_events(events: Arc<EventPublisher>) -> Self {
        Self {
            tasks: DashMap::new(),
            events: Some(events),
        }
    }

    pub fn arc(self) -> Arc<Self> {
        Arc::new(self)
    }

    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }
}

impl Default for InMemoryTaskStore {
    fn default() -> Self {
        Self::new()
    }
}

impl TaskStorePort for InMemoryTaskStore {
    fn get(&self, text_id: &str) -> Option<TrackedTask> {
        self.tasks.get(text_id).map(|t| t.clone())
    }

    /// 先写入再发布，订阅方收到事件时回读即可看到新快照
    fn upsert(&self, task: TrackedTask) {
        match &self.events {
            Some(events) => {
                self.tasks.insert(task.text_id.clone(), task.clone());
                events.publish_task_updated(&task);
            }
            None => {
                self.tasks.insert(task.text_id.clone(), task);
            }
        }
    }

    fn remove(&self, text_id: &str) -> Option<TrackedTask> {
        let (_, task) = self.tasks.remove(text_id)?;
        if let Some(events) = &self.events {
            events.publish_task_removed(&task.corpus_id, &task.text_id);
        }
        Some(task)
    }

    fn entries_for_corpus(&self, corpus_id: &str) -> Vec<TrackedTask> {
        let mut entries: Vec<TrackedTask> = self
            .tasks
            .iter()
            .filter(|t| t.corpus_id == corpus_id)
            .map(|t| t.clone())
            .collect();
        entries.sort_by(|a, b| a.text_id.cmp(&b.text_id));
        entries
    }

    fn remove_corpus(&self, corpus_id: &str) -> usize {
        let text_ids: Vec<String> = self
            .tasks
            .iter()
            .filter(|t| t.corpus_id == corpus_id)
            .map(|t| t.key().clone())
            .collect();

        let mut removed = 0;
        for text_id in text_ids {
            // 收集与删除之间可能被其他语料库的任务替换
            let taken = self
                .tasks
                .remove_if(&text_id, |_, task| task.corpus_id == corpus_id);
            if let Some((_, task)) = taken {
                if let Some(events) = &self.events {
                    events.publish_task_removed(&task.corpus_id, &task.text_id);
                }
                removed += 1;
            }
        }

        if removed > 0 {
            tracing::debug!(corpus_id = %corpus_id, removed = removed, "Corpus tasks removed");
        }
        removed
    }
}
