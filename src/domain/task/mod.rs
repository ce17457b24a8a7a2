//! Task Context - 后台任务限界上下文
//!
//! 职责:
//! - 后端任务记录的线上格式
//! - UI 侧跟踪的任务快照
//! - 任务消息中 stage 的解析

mod entities;
mod message;
mod value_objects;

pub use entities::{TaskRecord, TrackedTask};
pub use message::{split_stage_message, DEFAULT_ACTIVE_MESSAGE, DEFAULT_STAGE, STALE_TASK_MESSAGE};
pub use value_objects::TaskStatus;
