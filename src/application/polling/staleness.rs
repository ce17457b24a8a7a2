//! Staleness Tracker - 进度停滞检测
//!
//! 记录每个 `"<corpus_id>:<text_id>"` 最近一次进度变化的时间点，
//! 进度在阈值时间内没有变化的任务被视为已停止

use dashmap::DashMap;
use std::time::Duration;
use tokio::time::Instant;

/// 观测结果
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Staleness {
    Fresh,
    Stalled,
}

#[derive(Debug, Clone, Copy)]
struct ProgressMark {
    progress: u8,
    at: Instant,
}

/// 进度停滞跟踪器
pub struct StalenessTracker {
    threshold: Duration,
    marks: DashMap<String, ProgressMark>,
}

impl StalenessTracker {
    pub fn new(threshold: Duration) -> Self {
        Self {
            threshold,
            marks: DashMap::new(),
        }
    }

    pub fn key(corpus_id: &str, text_id: &str) -> String {
        format!("{}:{}", corpus_id, text_id)
    }

    /// 记录一次进度观测
    ///
    /// 进度与上次记录相同且间隔严格大于阈值时返回 `Stalled` 并丢弃记录；
    /// 进度变化（或首次观测）时刷新记录
    pub fn observe(&self, corpus_id: &str, text_id: &str, progress: u8, now: Instant) -> Staleness {
        let key = Self::key(corpus_id, text_id);
        let previous = self.marks.get(&key).map(|mark| *mark);

        if let Some(mark) = previous {
            if mark.progress == progress {
                if now.saturating_duration_since(mark.at) > self.threshold {
                    self.marks.remove(&key);
                    return Staleness::Stalled;
                }
                return Staleness::Fresh;
            }
        }

        self.marks.insert(key, ProgressMark { progress, at: now });
        Staleness::Fresh
    }

    /// 清除语料库的所有记录，返回清除数量
    pub fn purge_corpus(&self, corpus_id: &str) -> usize {
        let prefix = format!("{}:", corpus_id);
        let before = self.marks.len();
        self.marks.retain(|key, _| !key.starts_with(&prefix));
        before - self.marks.len()
    }

    pub fn len(&self) -> usize {
        self.marks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.marks.is_empty()
    }
}
