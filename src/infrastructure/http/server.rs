//! HTTP Server
//!
//! 组装中间件并提供服务，关闭信号到达后优雅退出

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use axum::extract::DefaultBodyLimit;
use axum::{middleware, Router};
use http::header::{AUTHORIZATION, CONTENT_TYPE};
use tokio::net::TcpListener;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use super::middleware::error_logging_middleware;
use super::routes::create_routes;
use super::state::AppState;
use crate::config::ServerConfig;

/// 请求体只有语料库 ID
const MAX_BODY_BYTES: usize = 64 * 1024;

pub struct HttpServer {
    config: ServerConfig,
    state: Arc<AppState>,
}

impl HttpServer {
    pub fn new(config: ServerConfig, state: AppState) -> Self {
        Self {
            config,
            state: Arc::new(state),
        }
    }

    /// UI 与服务不同源，放开 CORS
    fn router(&self) -> Router {
        let cors = CorsLayer::new()
            .allow_origin(Any)
            .allow_methods(Any)
            .allow_headers([AUTHORIZATION, CONTENT_TYPE])
            .max_age(Duration::from_secs(3600));

        create_routes()
            .layer(DefaultBodyLimit::max(MAX_BODY_BYTES))
            .layer(middleware::from_fn(error_logging_middleware))
            .layer(TraceLayer::new_for_http())
            .layer(cors)
            .with_state(Arc::clone(&self.state))
    }

    /// 绑定配置中的地址并运行，直到 `shutdown` 完成
    pub async fn run_with_shutdown<F>(self, shutdown: F) -> Result<(), std::io::Error>
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let listener = TcpListener::bind(self.config.addr()).await?;
        self.serve(listener, shutdown).await
    }

    /// 在已绑定的监听器上运行
    pub async fn serve<F>(self, listener: TcpListener, shutdown: F) -> Result<(), std::io::Error>
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let local_addr = listener.local_addr()?;
        tracing::info!(addr = %local_addr, "Corpus poller HTTP API listening");

        axum::serve(listener, self.router())
            .with_graceful_shutdown(shutdown)
            .await?;

        tracing::info!(addr = %local_addr, "Corpus poller HTTP API stopped");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::{PollingSettings, TaskPollingService};
    use crate::infrastructure::adapters::ScriptedTaskSource;
    use crate::infrastructure::events::EventPublisher;
    use crate::infrastructure::memory::InMemoryTaskStore;
    use tokio::sync::oneshot;

    #[tokio::test]
    async fn test_serves_ping_and_shuts_down() {
        let source = Arc::new(ScriptedTaskSource::new());
        let store = Arc::new(InMemoryTaskStore::new());
        let polling = TaskPollingService::new(source.clone(), store.clone(), PollingSettings::default());
        let state = AppState::new(polling, store, source, EventPublisher::new().arc());
        let server = HttpServer::new(ServerConfig::default(), state);

        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let (stop_tx, stop_rx) = oneshot::channel::<()>();
        let handle = tokio::spawn(server.serve(listener, async {
            let _ = stop_rx.await;
        }));

        let body: serde_json::Value = reqwest::get(format!("http://{}/api/ping", addr))
            .await
            .unwrap()
            .json()
            .await
            .unwrap();
        assert_eq!(body["status"], "ok");
        assert_eq!(body["backend_reachable"], true);
        assert_eq!(body["polling_corpora"], 0);

        stop_tx.send(()).unwrap();
        handle.await.unwrap().unwrap();
    }
}
