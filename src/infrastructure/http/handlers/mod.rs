//! HTTP Handlers

mod ping;
mod polling;
mod tasks;
mod websocket;

pub use ping::*;
pub use polling::*;
pub use tasks::*;
pub use websocket::*;
