//! Application State

use std::sync::Arc;

use crate::application::{TaskPollingService, TaskSourcePort, TaskStorePort};
use crate::infrastructure::events::EventPublisher;

/// 应用状态
pub struct AppState {
    pub polling: Arc<TaskPollingService>,
    pub store: Arc<dyn TaskStorePort>,
    pub source: Arc<dyn TaskSourcePort>,
    pub event_publisher: Arc<EventPublisher>,
}

impl AppState {
    pub fn new(
        polling: Arc<TaskPollingService>,
        store: Arc<dyn TaskStorePort>,
        source: Arc<dyn TaskSourcePort>,
        event_publisher: Arc<EventPublisher>,
    ) -> Self {
        Self {
            polling,
            store,
            source,
            event_publisher,
        }
    }
}
