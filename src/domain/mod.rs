//! Domain Layer - 领域层
//!
//! 后台任务上下文:
//! - TaskRecord: 后端任务记录（只读）
//! - TrackedTask: UI 状态存储中的任务快照

pub mod task;

pub use task::{
    split_stage_message, TaskRecord, TaskStatus, TrackedTask, DEFAULT_ACTIVE_MESSAGE,
    DEFAULT_STAGE, STALE_TASK_MESSAGE,
};
