//! Events - 存储变更事件推送

mod publisher;

pub use publisher::{EventPublisher, StoreEvent};
