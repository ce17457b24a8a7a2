//! Backend Adapter - 分析后端任务列表客户端

mod http_task_client;
mod scripted_task_source;

pub use http_task_client::{HttpTaskClient, HttpTaskClientConfig};
pub use scripted_task_source::ScriptedTaskSource;
