//! HTTP Routes
//!
//! API Endpoints:
//! - /api/ping                         GET   健康检查
//! - /api/polling/start                POST  开始轮询语料库
//! - /api/polling/stop                 POST  停止轮询语料库
//! - /api/polling/status/{corpus_id}   GET   轮询状态与活动任务数
//! - /api/polling/list                 GET   正在轮询的语料库
//! - /api/tasks/corpus/{corpus_id}     GET   语料库的任务快照
//! - /api/tasks/text/{text_id}         GET   文本当前跟踪的任务
//! - /api/backend/tasks/{corpus_id}    GET   后端原始任务列表
//! - /ws/events                        WS    全部存储事件
//! - /ws/corpus/{corpus_id}            WS    单个语料库的存储事件

use axum::{
    routing::{get, post},
    Router,
};
use std::sync::Arc;

use super::handlers;
use super::state::AppState;

/// 创建所有路由
pub fn create_routes() -> Router<Arc<AppState>> {
    Router::new()
        .nest("/api", api_routes())
        .route("/ws/events", get(handlers::events_websocket_handler))
        .route("/ws/corpus/:corpus_id", get(handlers::corpus_websocket_handler))
}

/// API 路由
fn api_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/ping", get(handlers::ping))
        .nest("/polling", polling_routes())
        .nest("/tasks", task_routes())
        .route("/backend/tasks/:corpus_id", get(handlers::backend_tasks))
}

/// Polling 路由
fn polling_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/start", post(handlers::start_polling))
        .route("/stop", post(handlers::stop_polling))
        .route("/status/:corpus_id", get(handlers::polling_status))
        .route("/list", get(handlers::list_polling))
}

/// Task 路由
fn task_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/text/:text_id", get(handlers::text_task))
        .route("/corpus/:corpus_id", get(handlers::corpus_tasks))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::{PollingSettings, TaskPollingService};
    use crate::domain::{TaskRecord, TaskStatus};
    use crate::infrastructure::adapters::ScriptedTaskSource;
    use crate::infrastructure::events::EventPublisher;
    use crate::infrastructure::memory::InMemoryTaskStore;
    use axum::body::{to_bytes, Body};
    use axum::http::{Request, StatusCode};
    use tower::util::ServiceExt;

    fn test_app() -> (Router, Arc<ScriptedTaskSource>) {
        let source = Arc::new(ScriptedTaskSource::new());
        let events = EventPublisher::new().arc();
        let store = Arc::new(InMemoryTaskStore::with_events(events.clone()));
        let polling = TaskPollingService::new(source.clone(), store.clone(), PollingSettings::default());
        let state = AppState::new(polling, store, source.clone(), events);
        (create_routes().with_state(Arc::new(state)), source)
    }

    async fn body_json(response: axum::response::Response) -> serde_json::Value {
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    fn post_json(uri: &str, body: serde_json::Value) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri(uri)
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    fn get(uri: &str) -> Request<Body> {
        Request::builder().uri(uri).body(Body::empty()).unwrap()
    }

    #[tokio::test]
    async fn test_start_status_and_tasks() {
        let (app, source) = test_app();
        source.set_tasks(
            "c1",
            vec![TaskRecord::new("t1", "x", TaskStatus::Processing)
                .with_progress(25)
                .with_message("keyness: scoring")],
        );

        let response = app
            .clone()
            .oneshot(post_json("/api/polling/start", serde_json::json!({"corpus_id": "c1"})))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let json = body_json(response).await;
        assert_eq!(json["errno"], 0);
        assert_eq!(json["data"]["polling"], true);
        assert_eq!(json["data"]["active_task_count"], 1);

        let json = body_json(app.clone().oneshot(get("/api/tasks/corpus/c1")).await.unwrap()).await;
        assert_eq!(json["data"]["tasks"][0]["stage"], "keyness");
        assert_eq!(json["data"]["tasks"][0]["progress"], 25);

        let json = body_json(app.clone().oneshot(get("/api/tasks/text/x")).await.unwrap()).await;
        assert_eq!(json["data"]["task_id"], "t1");

        let json = body_json(app.clone().oneshot(get("/api/polling/list")).await.unwrap()).await;
        assert_eq!(json["data"]["corpora"][0], "c1");

        let response = app
            .clone()
            .oneshot(post_json("/api/polling/stop", serde_json::json!({"corpus_id": "c1"})))
            .await
            .unwrap();
        let json = body_json(response).await;
        assert_eq!(json["data"]["polling"], false);
    }

    #[tokio::test]
    async fn test_empty_corpus_id_rejected() {
        let (app, _) = test_app();
        let response = app
            .oneshot(post_json("/api/polling/start", serde_json::json!({"corpus_id": " "})))
            .await
            .unwrap();
        let json = body_json(response).await;
        assert_eq!(json["errno"], 400);
    }

    #[tokio::test]
    async fn test_unknown_text_is_not_found() {
        let (app, _) = test_app();
        let json = body_json(app.oneshot(get("/api/tasks/text/nope")).await.unwrap()).await;
        assert_eq!(json["errno"], 404);
    }

    #[tokio::test]
    async fn test_status_of_idle_corpus() {
        let (app, _) = test_app();
        let json = body_json(app.oneshot(get("/api/polling/status/c9")).await.unwrap()).await;
        assert_eq!(json["data"]["polling"], false);
        assert_eq!(json["data"]["active_task_count"], 0);
    }

    #[tokio::test]
    async fn test_backend_passthrough_reports_failures() {
        let (app, source) = test_app();
        source.push_error("c1", "connection refused");
        let json = body_json(app.oneshot(get("/api/backend/tasks/c1")).await.unwrap()).await;
        assert_eq!(json["errno"], 503);
    }
}
