//! Polling - 后台任务轮询
//!
//! - service: TaskPollingService，按语料库管理轮询生命周期
//! - staleness: 进度停滞检测

mod service;
mod staleness;

pub use service::{CompletionCallback, PollingSettings, TaskPollingService};
pub use staleness::{Staleness, StalenessTracker};
