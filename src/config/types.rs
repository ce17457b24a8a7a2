//! Configuration Types
//!
//! 定义所有配置结构体

use serde::Deserialize;
use std::time::Duration;

use crate::application::PollingSettings;

/// 应用主配置
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AppConfig {
    /// 服务器配置
    #[serde(default)]
    pub server: ServerConfig,

    /// 分析后端配置
    #[serde(default)]
    pub backend: BackendConfig,

    /// 轮询配置
    #[serde(default)]
    pub polling: PollingConfig,

    /// 日志配置
    #[serde(default)]
    pub log: LogConfig,
}

/// 服务器配置
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    /// 监听地址
    #[serde(default = "default_host")]
    pub host: String,

    /// 监听端口
    #[serde(default = "default_port")]
    pub port: u16,
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    5070
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

impl ServerConfig {
    /// 获取服务器地址
    pub fn addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

/// 任务源类型
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BackendMode {
    /// 通过 HTTP 调用分析后端
    #[default]
    Http,
    /// 不连接后端，使用内存任务源
    Fake,
}

/// 分析后端配置
#[derive(Debug, Clone, Deserialize)]
pub struct BackendConfig {
    /// 后端基础 URL
    #[serde(default = "default_backend_url")]
    pub url: String,

    /// 请求超时时间（秒）
    #[serde(default = "default_backend_timeout")]
    pub timeout_secs: u64,

    #[serde(default)]
    pub mode: BackendMode,
}

fn default_backend_url() -> String {
    "http://localhost:8000".to_string()
}

fn default_backend_timeout() -> u64 {
    10
}

impl Default for BackendConfig {
    fn default() -> Self {
        Self {
            url: default_backend_url(),
            timeout_secs: default_backend_timeout(),
            mode: BackendMode::default(),
        }
    }
}

/// 轮询配置
#[derive(Debug, Clone, Deserialize)]
pub struct PollingConfig {
    /// 轮询间隔（毫秒）
    #[serde(default = "default_interval_ms")]
    pub interval_ms: u64,

    /// 进度停滞判定阈值（毫秒）
    #[serde(default = "default_stale_threshold_ms")]
    pub stale_threshold_ms: u64,

    /// 全部完成后快照保留时间（毫秒）
    #[serde(default = "default_linger_ms")]
    pub linger_ms: u64,

    /// 启动时开始轮询的语料库
    #[serde(default)]
    pub watch: Vec<String>,
}

fn default_interval_ms() -> u64 {
    500
}

fn default_stale_threshold_ms() -> u64 {
    30_000
}

fn default_linger_ms() -> u64 {
    1_500
}

impl Default for PollingConfig {
    fn default() -> Self {
        Self {
            interval_ms: default_interval_ms(),
            stale_threshold_ms: default_stale_threshold_ms(),
            linger_ms: default_linger_ms(),
            watch: Vec::new(),
        }
    }
}

impl PollingConfig {
    pub fn settings(&self) -> PollingSettings {
        PollingSettings {
            poll_interval: Duration::from_millis(self.interval_ms),
            stale_threshold: Duration::from_millis(self.stale_threshold_ms),
            completion_linger: Duration::from_millis(self.linger_ms),
        }
    }
}

/// 日志配置
#[derive(Debug, Clone, Deserialize)]
pub struct LogConfig {
    /// 日志级别
    #[serde(default = "default_log_level")]
    pub level: String,

    /// 是否启用 JSON 格式
    #[serde(default)]
    pub json: bool,
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            json: false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = AppConfig::default();
        assert_eq!(config.server.port, 5070);
        assert_eq!(config.backend.url, "http://localhost:8000");
        assert_eq!(config.backend.mode, BackendMode::Http);
        assert_eq!(config.polling.interval_ms, 500);
        assert!(config.polling.watch.is_empty());
    }

    #[test]
    fn test_polling_settings_match_defaults() {
        let settings = PollingConfig::default().settings();
        let defaults = PollingSettings::default();
        assert_eq!(settings.poll_interval, defaults.poll_interval);
        assert_eq!(settings.stale_threshold, defaults.stale_threshold);
        assert_eq!(settings.completion_linger, defaults.completion_linger);
    }

    #[test]
    fn test_server_addr() {
        assert_eq!(ServerConfig::default().addr(), "0.0.0.0:5070");
    }
}
