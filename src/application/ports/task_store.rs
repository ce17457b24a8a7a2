//! Task Store Port - UI 状态存储
//!
//! 以 text_id 为键保存最新的任务快照，供 UI 渲染进度。
//! 轮询期间 TaskPollingService 是唯一写入方，所有写入都按 corpus_id / task_id 限定范围。

use crate::domain::TrackedTask;

/// Task Store Port
pub trait TaskStorePort: Send + Sync {
    /// 获取文本当前跟踪的任务
    fn get(&self, text_id: &str) -> Option<TrackedTask>;

    /// 写入任务快照（同一 text_id 覆盖）
    fn upsert(&self, task: TrackedTask);

    /// 移除文本的任务快照
    fn remove(&self, text_id: &str) -> Option<TrackedTask>;

    /// 获取语料库的所有任务快照
    fn entries_for_corpus(&self, corpus_id: &str) -> Vec<TrackedTask>;

    /// 移除语料库的所有任务快照，返回移除数量
    fn remove_corpus(&self, corpus_id: &str) -> usize;
}
