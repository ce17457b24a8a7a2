//! WebSocket Handler - 任务存储事件推送

use axum::{
    extract::{
        ws::{Message, WebSocket, WebSocketUpgrade},
        Path, State,
    },
    response::IntoResponse,
};
use futures_util::{SinkExt, StreamExt};
use std::sync::Arc;
use tokio::sync::broadcast::error::RecvError;

use crate::infrastructure::events::StoreEvent;
use crate::infrastructure::http::state::AppState;

/// 全部语料库的事件
pub async fn events_websocket_handler(
    ws: WebSocketUpgrade,
    State(state): State<Arc<AppState>>,
) -> impl IntoResponse {
    ws.on_upgrade(move |socket| handle_socket(socket, None, state))
}

/// 单个语料库的事件
pub async fn corpus_websocket_handler(
    ws: WebSocketUpgrade,
    Path(corpus_id): Path<String>,
    State(state): State<Arc<AppState>>,
) -> impl IntoResponse {
    ws.on_upgrade(move |socket| handle_socket(socket, Some(corpus_id), state))
}

fn event_corpus(event: &StoreEvent) -> &str {
    match event {
        StoreEvent::TaskUpdated { task } => &task.corpus_id,
        StoreEvent::TaskRemoved { corpus_id, .. } => corpus_id,
        StoreEvent::CorpusDrained { corpus_id } => corpus_id,
    }
}

async fn handle_socket(socket: WebSocket, corpus_filter: Option<String>, state: Arc<AppState>) {
    let (mut sender, mut receiver) = socket.split();
    let mut event_rx = state.event_publisher.subscribe();

    tracing::info!(corpus_id = ?corpus_filter, "WebSocket connected");

    let filter = corpus_filter.clone();
    let forward_task = tokio::spawn(async move {
        loop {
            let event = match event_rx.recv().await {
                Ok(event) => event,
                Err(RecvError::Lagged(skipped)) => {
                    tracing::warn!(skipped = skipped, "WebSocket subscriber lagged, events dropped");
                    continue;
                }
                Err(RecvError::Closed) => break,
            };

            if let Some(corpus_id) = &filter {
                if event_corpus(&event) != corpus_id {
                    continue;
                }
            }

            let msg = match serde_json::to_string(&event) {
                Ok(json) => Message::Text(json),
                Err(e) => {
                    tracing::error!(error = %e, "Failed to serialize event");
                    continue;
                }
            };

            if let Err(e) = sender.send(msg).await {
                tracing::debug!(error = %e, "Failed to send WebSocket message");
                break;
            }
        }
    });

    // 接收客户端消息（心跳）
    let receive_task = tokio::spawn(async move {
        while let Some(msg) = receiver.next().await {
            match msg {
                Ok(Message::Close(_)) => {
                    tracing::debug!("WebSocket closed by client");
                    break;
                }
                Err(e) => {
                    tracing::debug!(error = %e, "WebSocket error");
                    break;
                }
                _ => {}
            }
        }
    });

    // 等待任一任务完成
    tokio::select! {
        _ = forward_task => {}
        _ = receive_task => {}
    }

    tracing::info!(corpus_id = ?corpus_filter, "WebSocket disconnected");
}
