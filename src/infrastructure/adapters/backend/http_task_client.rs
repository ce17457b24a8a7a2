//! HTTP Task Client - 调用分析后端的任务列表接口
//!
//! 实现 TaskSourcePort trait
//!
//! 后端 API:
//! GET http://localhost:8000/api/corpus/{corpus_id}/tasks
//! Response: {"success": true, "data": [TaskRecord...], "message": "..."}  (JSON)

use async_trait::async_trait;
use reqwest::{Client, Url};
use std::time::Duration;

use crate::application::ports::{TaskListResponse, TaskSourceError, TaskSourcePort};

/// HTTP 任务客户端配置
#[derive(Debug, Clone)]
pub struct HttpTaskClientConfig {
    /// 后端基础 URL
    pub base_url: String,
    /// 请求超时时间（秒）
    pub timeout_secs: u64,
}

impl Default for HttpTaskClientConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:8000".to_string(),
            timeout_secs: 10,
        }
    }
}

impl HttpTaskClientConfig {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            ..Default::default()
        }
    }

    pub fn with_timeout(mut self, secs: u64) -> Self {
        self.timeout_secs = secs;
        self
    }
}

/// HTTP 任务客户端
pub struct HttpTaskClient {
    client: Client,
    base_url: Url,
}

impl HttpTaskClient {
    pub fn new(config: HttpTaskClientConfig) -> Result<Self, TaskSourceError> {
        let base_url = Url::parse(&config.base_url)
            .map_err(|e| TaskSourceError::InvalidUrl(format!("{}: {}", config.base_url, e)))?;
        if base_url.cannot_be_a_base() {
            return Err(TaskSourceError::InvalidUrl(config.base_url));
        }

        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| TaskSourceError::NetworkError(e.to_string()))?;

        Ok(Self { client, base_url })
    }

    /// 在基础 URL 的路径后追加段，每段单独百分号编码
    fn endpoint(&self, segments: &[&str]) -> Result<Url, TaskSourceError> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| TaskSourceError::InvalidUrl(self.base_url.to_string()))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    /// 语料库 ID 作为单个路径段，`/`、`?`、`#` 不会改变请求目标
    fn tasks_url(&self, corpus_id: &str) -> Result<Url, TaskSourceError> {
        self.endpoint(&["api", "corpus", corpus_id, "tasks"])
    }
}

#[async_trait]
impl TaskSourcePort for HttpTaskClient {
    async fn list_corpus_tasks(&self, corpus_id: &str) -> Result<TaskListResponse, TaskSourceError> {
        let url = self.tasks_url(corpus_id)?;
        tracing::trace!(url = %url, "Fetching corpus tasks");

        let response = self.client.get(url).send().await.map_err(|e| {
            if e.is_timeout() {
                TaskSourceError::Timeout
            } else if e.is_connect() {
                TaskSourceError::NetworkError(format!("Cannot connect to backend: {}", e))
            } else {
                TaskSourceError::NetworkError(e.to_string())
            }
        })?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            return Err(TaskSourceError::ServiceError(format!(
                "HTTP {}: {}",
                status, error_text
            )));
        }

        let body = response
            .json::<TaskListResponse>()
            .await
            .map_err(|e| TaskSourceError::InvalidResponse(e.to_string()))?;

        tracing::trace!(
            corpus_id = %corpus_id,
            success = body.success,
            tasks = body.data.len(),
            "Corpus tasks fetched"
        );
        Ok(body)
    }

    async fn health_check(&self) -> bool {
        let Ok(url) = self.endpoint(&["health"]) else {
            return false;
        };
        match self
            .client
            .get(url)
            .timeout(Duration::from_secs(5))
            .send()
            .await
        {
            Ok(response) => response.status().is_success(),
            Err(_) => false,
        }
    }
}
