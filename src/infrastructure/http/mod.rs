//! HTTP Layer - RESTful API + WebSocket
//!
//! 面向 UI 的轮询控制接口与任务快照读取接口

pub mod dto;
pub mod error;
pub mod handlers;
pub mod middleware;
pub mod routes;
pub mod server;
pub mod state;

pub use error::ApiError;
pub use routes::create_routes;
pub use server::HttpServer;
pub use state::AppState;
