//! Application Ports - 出站端口定义
//!
//! 定义应用层与基础设施层的抽象接口

mod task_source;
mod task_store;

pub use task_source::{TaskListResponse, TaskSourceError, TaskSourcePort};
pub use task_store::TaskStorePort;
