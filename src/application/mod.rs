//! 应用层 - 用例编排
//!
//! 包含：
//! - ports: 六边形架构端口定义（TaskSource、TaskStore）
//! - polling: 后台任务轮询与协调服务

pub mod polling;
pub mod ports;

pub use polling::{CompletionCallback, PollingSettings, TaskPollingService};
pub use ports::{TaskListResponse, TaskSourceError, TaskSourcePort, TaskStorePort};
