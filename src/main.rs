//! corpus-poller - 语料库后台任务轮询服务
//!
//! - Application: TaskPollingService
//! - Infrastructure: backend adapters, memory store, events, http

use std::sync::Arc;

use corpus_poller::application::{TaskPollingService, TaskSourcePort};
use corpus_poller::config::{load_config, print_config, BackendMode};
use corpus_poller::infrastructure::adapters::{HttpTaskClient, HttpTaskClientConfig, ScriptedTaskSource};
use corpus_poller::infrastructure::events::EventPublisher;
use corpus_poller::infrastructure::http::{AppState, HttpServer};
use corpus_poller::infrastructure::memory::InMemoryTaskStore;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // 加载配置（优先级：环境变量 > 配置文件 > 默认值）
    let config = load_config().map_err(|e| anyhow::anyhow!("Failed to load config: {}", e))?;

    // 初始化日志
    let log_filter = format!(
        "{},corpus_poller={},tower_http=debug",
        config.log.level, config.log.level
    );
    let subscriber = tracing_subscriber::fmt().with_env_filter(
        tracing_subscriber::EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&log_filter)),
    );
    if config.log.json {
        subscriber.json().init();
    } else {
        subscriber.init();
    }

    tracing::info!("corpus-poller - 语料库后台任务轮询服务");
    print_config(&config);

    // 任务源
    let source: Arc<dyn TaskSourcePort> = match config.backend.mode {
        BackendMode::Http => {
            let client_config = HttpTaskClientConfig::new(config.backend.url.clone())
                .with_timeout(config.backend.timeout_secs);
            Arc::new(HttpTaskClient::new(client_config)?)
        }
        BackendMode::Fake => {
            tracing::warn!("Backend mode is 'fake', no analysis backend will be contacted");
            Arc::new(ScriptedTaskSource::new())
        }
    };

    if !source.health_check().await {
        tracing::warn!(url = %config.backend.url, "Analysis backend is not reachable yet");
    }

    // 事件发布器与任务存储
    let event_publisher = EventPublisher::new().arc();
    let store = InMemoryTaskStore::with_events(event_publisher.clone()).arc();

    let polling = TaskPollingService::new(source.clone(), store.clone(), config.polling.settings());

    // 启动时轮询的语料库
    for corpus_id in &config.polling.watch {
        let events = event_publisher.clone();
        let drained = corpus_id.clone();
        polling
            .start_polling(
                corpus_id,
                Some(Box::new(move || {
                    tracing::info!(corpus_id = %drained, "Watched corpus has no active tasks");
                    events.publish_corpus_drained(&drained);
                })),
            )
            .await;
    }

    // 创建 HTTP 服务器
    let state = AppState::new(polling.clone(), store, source, event_publisher);
    let server = HttpServer::new(config.server.clone(), state);

    // 启动服务器（带优雅关闭）
    server
        .run_with_shutdown(async {
            if let Err(e) = tokio::signal::ctrl_c().await {
                tracing::error!(error = %e, "Failed to listen for ctrl-c");
                std::future::pending::<()>().await;
            }
            tracing::info!("Received shutdown signal");
        })
        .await?;

    polling.shutdown();
    tracing::info!("Shutdown complete");

    Ok(())
}
