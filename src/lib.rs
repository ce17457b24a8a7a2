//! corpus-poller - 语料库后台任务轮询服务
//!
//! 架构设计: Hexagonal Architecture
//!
//! 领域层 (domain/):
//! - Task Context: 后端任务记录、UI 任务快照、stage 解析
//!
//! 应用层 (application/):
//! - Ports: 端口定义（TaskSource, TaskStore）
//! - Polling: TaskPollingService 与进度停滞检测
//!
//! 基础设施层 (infrastructure/):
//! - Adapters: HTTP 后端客户端、脚本化任务源
//! - Memory: 内存任务存储
//! - Events: 存储变更事件发布
//! - HTTP: RESTful API + WebSocket

pub mod application;
pub mod config;
pub mod domain;
pub mod infrastructure;

pub use config::{load_config, AppConfig};
