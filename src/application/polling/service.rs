//! Task Polling Service - 后台任务轮询与协调
//!
//! 每个语料库一个独立的轮询循环：定期拉取后端任务列表，协调进 UI 状态存储，
//! 检测进度停滞，并在活动任务清空时触发一次完成回调。

use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use std::collections::HashSet;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::time::{Instant, MissedTickBehavior};
use tokio_util::sync::CancellationToken;

use super::staleness::{Staleness, StalenessTracker};
use crate::application::ports::{TaskSourcePort, TaskStorePort};
use crate::domain::{TaskRecord, TrackedTask};

/// 活动任务清空时调用的回调
pub type CompletionCallback = Box<dyn FnOnce() + Send + Sync + 'static>;

/// 轮询参数
#[derive(Debug, Clone)]
pub struct PollingSettings {
    /// 轮询间隔
    pub poll_interval: Duration,
    /// 进度停滞判定阈值
    pub stale_threshold: Duration,
    /// 全部完成后任务快照的保留时间
    pub completion_linger: Duration,
}

impl Default for PollingSettings {
    fn default() -> Self {
        Self {
            poll_interval: Duration::from_millis(500),
            stale_threshold: Duration::from_millis(30_000),
            completion_linger: Duration::from_millis(1_500),
        }
    }
}

/// 一个轮询生命周期
struct PollingHandle {
    /// 每次启动分配新的 generation，用于丢弃停止后才返回的请求结果
    generation: u64,
    cancel: CancellationToken,
}

/// 任务轮询服务
pub struct TaskPollingService {
    source: Arc<dyn TaskSourcePort>,
    store: Arc<dyn TaskStorePort>,
    settings: PollingSettings,
    /// corpus_id -> 轮询句柄（存在即表示正在轮询）
    handles: DashMap<String, PollingHandle>,
    /// corpus_id -> 完成回调（后注册的覆盖先注册的）
    callbacks: DashMap<String, CompletionCallback>,
    /// corpus_id -> 上次检查时是否有活动任务
    had_active: DashMap<String, bool>,
    staleness: StalenessTracker,
    next_generation: AtomicU64,
}

impl TaskPollingService {
    pub fn new(
        source: Arc<dyn TaskSourcePort>,
        store: Arc<dyn TaskStorePort>,
        settings: PollingSettings,
    ) -> Arc<Self> {
        Arc::new(Self {
            staleness: StalenessTracker::new(settings.stale_threshold),
            source,
            store,
            settings,
            handles: DashMap::new(),
            callbacks: DashMap::new(),
            had_active: DashMap::new(),
            next_generation: AtomicU64::new(1),
        })
    }

    /// 开始轮询语料库
    ///
    /// 已在轮询时：替换回调（如果提供）并立即额外轮询一次。
    /// 否则：记录回调，预置"有活动任务"标记，注册轮询循环并立即轮询一次。
    pub async fn start_polling(self: &Arc<Self>, corpus_id: &str, on_complete: Option<CompletionCallback>) {
        let started = match self.handles.entry(corpus_id.to_string()) {
            Entry::Occupied(_) => None,
            Entry::Vacant(vacant) => {
                let generation = self.next_generation.fetch_add(1, Ordering::Relaxed);
                let cancel = CancellationToken::new();
                vacant.insert(PollingHandle {
                    generation,
                    cancel: cancel.clone(),
                });
                Some((generation, cancel))
            }
        };

        if let Some(callback) = on_complete {
            self.callbacks.insert(corpus_id.to_string(), callback);
        }

        match started {
            None => {
                tracing::debug!(corpus_id = %corpus_id, "Already polling, refreshing immediately");
            }
            Some((generation, cancel)) => {
                self.had_active.insert(corpus_id.to_string(), true);
                self.spawn_loop(corpus_id.to_string(), cancel);
                tracing::info!(
                    corpus_id = %corpus_id,
                    generation = generation,
                    interval_ms = self.settings.poll_interval.as_millis() as u64,
                    "Polling started"
                );
            }
        }

        self.poll(corpus_id).await;
    }

    /// 停止轮询语料库（幂等）
    pub fn stop_polling(&self, corpus_id: &str) {
        if let Some((_, handle)) = self.handles.remove(corpus_id) {
            handle.cancel.cancel();
            tracing::info!(
                corpus_id = %corpus_id,
                generation = handle.generation,
                "Polling stopped"
            );
        }
        self.callbacks.remove(corpus_id);

        let purged = self.staleness.purge_corpus(corpus_id);
        if purged > 0 {
            tracing::debug!(corpus_id = %corpus_id, purged = purged, "Staleness records purged");
        }
    }

    pub fn is_polling(&self, corpus_id: &str) -> bool {
        self.handles.contains_key(corpus_id)
    }

    /// 正在轮询的语料库
    pub fn polling_corpora(&self) -> Vec<String> {
        let mut corpora: Vec<String> = self.handles.iter().map(|h| h.key().clone()).collect();
        corpora.sort();
        corpora
    }

    /// 语料库在存储中的活动任务数（不发起网络请求）
    pub fn active_task_count(&self, corpus_id: &str) -> usize {
        self.store
            .entries_for_corpus(corpus_id)
            .iter()
            .filter(|task| task.is_active())
            .count()
    }

    /// 停止所有轮询
    pub fn shutdown(&self) {
        for corpus_id in self.polling_corpora() {
            self.stop_polling(&corpus_id);
        }
    }

    fn generation_of(&self, corpus_id: &str) -> Option<u64> {
        self.handles.get(corpus_id).map(|h| h.generation)
    }

    fn spawn_loop(self: &Arc<Self>, corpus_id: String, cancel: CancellationToken) {
        let service = Arc::clone(self);
        let period = self.settings.poll_interval;

        tokio::spawn(async move {
            // 立即轮询由 start_polling 负责，循环从一个间隔之后开始
            let mut ticker = tokio::time::interval_at(Instant::now() + period, period);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

            loop {
                tokio::select! {
                    _ = cancel.cancelled() => break,
                    _ = ticker.tick() => service.poll(&corpus_id).await,
                }
            }

            tracing::debug!(corpus_id = %corpus_id, "Polling loop exited");
        });
    }

    /// 单次轮询
    ///
    /// 拉取失败或后端返回 success=false 时只记录日志，不修改任何状态，下一个间隔自动重试。
    /// 请求返回时若该语料库已停止（或已重新启动），结果被丢弃。
    pub(crate) async fn poll(&self, corpus_id: &str) {
        let Some(generation) = self.generation_of(corpus_id) else {
            tracing::debug!(corpus_id = %corpus_id, "Not polling, skipping tick");
            return;
        };

        let response = match self.source.list_corpus_tasks(corpus_id).await {
            Ok(response) if response.success => response,
            Ok(response) => {
                tracing::warn!(
                    corpus_id = %corpus_id,
                    message = ?response.message,
                    "Task list request rejected by backend"
                );
                return;
            }
            Err(e) => {
                tracing::warn!(corpus_id = %corpus_id, error = %e, "Failed to fetch task list");
                return;
            }
        };

        if self.generation_of(corpus_id) != Some(generation) {
            tracing::debug!(
                corpus_id = %corpus_id,
                generation = generation,
                "Polling stopped while request was in flight, discarding result"
            );
            return;
        }

        self.reconcile(corpus_id, &response.data);
    }

    /// 将一次任务列表协调进存储
    ///
    /// 未知状态的记录不写入存储，但其 text_id 仍算作后端在报告
    fn reconcile(&self, corpus_id: &str, tasks: &[TaskRecord]) {
        let now = Instant::now();
        let active: Vec<&TaskRecord> = tasks.iter().filter(|t| t.status.is_active()).collect();
        let finished: Vec<&TaskRecord> = tasks.iter().filter(|t| t.status.is_terminal()).collect();
        let unknown = tasks.len() - active.len() - finished.len();

        tracing::debug!(
            corpus_id = %corpus_id,
            active = active.len(),
            finished = finished.len(),
            unknown = unknown,
            "Reconciling task list"
        );

        for task in &active {
            let Some(text_id) = task.text_id.as_deref() else {
                continue;
            };
            self.track_active(corpus_id, text_id, task, now);
        }

        for task in &finished {
            let Some(text_id) = task.text_id.as_deref() else {
                continue;
            };
            self.finalize(corpus_id, text_id, task);
        }

        self.remove_vanished(corpus_id, tasks);

        let had_active = self
            .had_active
            .get(corpus_id)
            .map(|flag| *flag)
            .unwrap_or(false);

        if active.is_empty() && had_active {
            self.drain(corpus_id);
        } else if !active.is_empty() {
            self.had_active.insert(corpus_id.to_string(), true);
        }
    }

    fn track_active(&self, corpus_id: &str, text_id: &str, task: &TaskRecord, now: Instant) {
        if self.staleness.observe(corpus_id, text_id, task.progress, now) == Staleness::Stalled {
            tracing::warn!(
                corpus_id = %corpus_id,
                text_id = %text_id,
                task_id = %task.id,
                progress = task.progress,
                threshold_ms = self.settings.stale_threshold.as_millis() as u64,
                "Task progress stalled, marking as failed"
            );
            self.store.upsert(TrackedTask::stalled(corpus_id, text_id, task));
            return;
        }

        // 同一文本上较早的活动任务不能覆盖较新任务的展示状态
        let should_write = match self.store.get(text_id) {
            None => true,
            Some(existing) => existing.task_id == task.id || existing.status.is_terminal(),
        };

        if should_write {
            self.store.upsert(TrackedTask::from_active(corpus_id, text_id, task));
        } else {
            tracing::debug!(
                corpus_id = %corpus_id,
                text_id = %text_id,
                task_id = %task.id,
                "Another active task is tracked for this text, skipping"
            );
        }
    }

    /// 只收尾正在跟踪的任务，不接管从未以活动状态见过的任务
    fn finalize(&self, corpus_id: &str, text_id: &str, task: &TaskRecord) {
        let Some(existing) = self.store.get(text_id) else {
            return;
        };
        if existing.corpus_id != corpus_id || existing.task_id != task.id {
            return;
        }

        self.store.upsert(TrackedTask::from_terminal(corpus_id, text_id, task));
        tracing::debug!(
            corpus_id = %corpus_id,
            text_id = %text_id,
            task_id = %task.id,
            status = %task.status,
            "Task finished"
        );
    }

    /// 后端不再报告的文本从存储中移除
    fn remove_vanished(&self, corpus_id: &str, tasks: &[TaskRecord]) {
        let reported: HashSet<&str> = tasks.iter().filter_map(|t| t.text_id.as_deref()).collect();

        for entry in self.store.entries_for_corpus(corpus_id) {
            if !reported.contains(entry.text_id.as_str()) {
                self.store.remove(&entry.text_id);
                tracing::debug!(
                    corpus_id = %corpus_id,
                    text_id = %entry.text_id,
                    "Task no longer reported by backend, removed"
                );
            }
        }
    }

    /// 活动任务清空：延迟清理快照，触发回调，停止轮询
    fn drain(&self, corpus_id: &str) {
        tracing::info!(corpus_id = %corpus_id, "All tasks finished");

        let store = Arc::clone(&self.store);
        let linger = self.settings.completion_linger;
        let sweep_corpus = corpus_id.to_string();
        tokio::spawn(async move {
            tokio::time::sleep(linger).await;
            let removed = store.remove_corpus(&sweep_corpus);
            tracing::debug!(corpus_id = %sweep_corpus, removed = removed, "Finished tasks swept");
        });

        if let Some((_, callback)) = self.callbacks.remove(corpus_id) {
            callback();
        }

        self.stop_polling(corpus_id);
        self.had_active.remove(corpus_id);
    }
}
