//! Memory Layer - In-Memory State Management
//!
//! 实现 TaskStore，保存供 UI 渲染的任务快照

mod task_store;

pub use task_store::InMemoryTaskStore;
