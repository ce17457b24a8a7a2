//! Configuration Loader
//!
//! 合并顺序：内置默认值 < `config` / `config.local` 文件 < `CORPUS_POLLER_*` 环境变量

use config::{Config, Environment, File};
use std::path::Path;
use thiserror::Error;

use super::types::{AppConfig, BackendMode};

#[derive(Debug, Error)]
pub enum ConfigError {
    /// 配置源读取失败（文件缺失、格式错误等）
    #[error("Cannot read configuration sources: {0}")]
    Source(#[from] config::ConfigError),

    /// 合并后的配置无法映射到 AppConfig
    #[error("Configuration does not match the expected shape: {0}")]
    Shape(String),

    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

/// 不带扩展名，由 config crate 按已知格式探测
const DEFAULT_FILES: &[&str] = &["config", "config.local"];

const ENV_PREFIX: &str = "CORPUS_POLLER";

/// 加载应用配置
///
/// # 环境变量示例
/// - `CORPUS_POLLER_SERVER__PORT=8080`
/// - `CORPUS_POLLER_BACKEND__URL=http://analysis:8000`
/// - `CORPUS_POLLER_POLLING__WATCH=brown,bnc-baby`
pub fn load_config() -> Result<AppConfig, ConfigError> {
    load_config_from_path(None)
}

/// `explicit_file` 给出时只读取该文件，且文件必须存在
pub fn load_config_from_path(explicit_file: Option<&Path>) -> Result<AppConfig, ConfigError> {
    let defaults = AppConfig::default();

    let mut builder = Config::builder()
        .set_default("server.host", defaults.server.host)?
        .set_default("server.port", defaults.server.port)?
        .set_default("backend.url", defaults.backend.url)?
        .set_default("backend.timeout_secs", defaults.backend.timeout_secs)?
        .set_default("backend.mode", "http")?
        .set_default("polling.interval_ms", defaults.polling.interval_ms)?
        .set_default("polling.stale_threshold_ms", defaults.polling.stale_threshold_ms)?
        .set_default("polling.linger_ms", defaults.polling.linger_ms)?
        .set_default("polling.watch", Vec::<String>::new())?
        .set_default("log.level", defaults.log.level)?
        .set_default("log.json", defaults.log.json)?;

    builder = match explicit_file {
        Some(path) => builder.add_source(File::from(path).required(true)),
        None => DEFAULT_FILES.iter().fold(builder, |b, name| {
            b.add_source(File::with_name(name).required(false))
        }),
    };

    let merged = builder
        .add_source(
            Environment::with_prefix(ENV_PREFIX)
                .prefix_separator("_")
                .separator("__")
                .list_separator(",")
                .with_list_parse_key("polling.watch")
                .try_parsing(true),
        )
        .build()?;

    let app_config: AppConfig = merged
        .try_deserialize()
        .map_err(|e| ConfigError::Shape(e.to_string()))?;

    validate(&app_config)?;
    Ok(app_config)
}

fn invalid(reason: &str) -> ConfigError {
    ConfigError::Invalid(reason.to_string())
}

fn validate(config: &AppConfig) -> Result<(), ConfigError> {
    if config.server.port == 0 {
        return Err(invalid("server.port must be non-zero"));
    }
    if config.backend.mode == BackendMode::Http && config.backend.url.trim().is_empty() {
        return Err(invalid("backend.url is required when backend.mode = \"http\""));
    }
    if config.polling.interval_ms == 0 {
        return Err(invalid("polling.interval_ms must be positive"));
    }
    if config.polling.stale_threshold_ms == 0 || config.polling.linger_ms == 0 {
        return Err(invalid("polling.stale_threshold_ms and polling.linger_ms must be positive"));
    }
    if config.polling.watch.iter().any(|id| id.trim().is_empty()) {
        return Err(invalid("polling.watch contains a blank corpus id"));
    }
    Ok(())
}

/// 启动时输出生效的配置
pub fn print_config(config: &AppConfig) {
    tracing::info!(
        addr = %config.server.addr(),
        backend_url = %config.backend.url,
        backend_mode = ?config.backend.mode,
        backend_timeout_secs = config.backend.timeout_secs,
        "Server and backend settings"
    );
    tracing::info!(
        interval_ms = config.polling.interval_ms,
        stale_threshold_ms = config.polling.stale_threshold_ms,
        linger_ms = config.polling.linger_ms,
        watch = ?config.polling.watch,
        "Polling settings"
    );
    tracing::info!(level = %config.log.level, json = config.log.json, "Log settings");
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_defaults_are_valid() {
        assert!(validate(&AppConfig::default()).is_ok());
    }

    #[test]
    fn test_zero_port_rejected() {
        let mut config = AppConfig::default();
        config.server.port = 0;
        assert!(matches!(validate(&config), Err(ConfigError::Invalid(_))));
    }

    #[test]
    fn test_empty_backend_url_only_matters_for_http() {
        let mut config = AppConfig::default();
        config.backend.url = String::new();
        assert!(validate(&config).is_err());

        config.backend.mode = BackendMode::Fake;
        assert!(validate(&config).is_ok());
    }

    #[test]
    fn test_zero_interval_rejected() {
        let mut config = AppConfig::default();
        config.polling.interval_ms = 0;
        assert!(validate(&config).is_err());
    }

    #[test]
    fn test_blank_watch_entry_rejected() {
        let mut config = AppConfig::default();
        config.polling.watch = vec!["c1".to_string(), " ".to_string()];
        assert!(validate(&config).is_err());
    }

    #[test]
    fn test_load_from_file() {
        let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
        writeln!(
            file,
            r#"
[backend]
url = "http://analysis:9000"
mode = "fake"

[polling]
interval_ms = 250
watch = ["brown", "lob"]
"#
        )
        .unwrap();

        let config = load_config_from_path(Some(file.path())).unwrap();
        assert_eq!(config.backend.url, "http://analysis:9000");
        assert_eq!(config.backend.mode, BackendMode::Fake);
        assert_eq!(config.polling.interval_ms, 250);
        assert_eq!(config.polling.stale_threshold_ms, 30_000);
        assert_eq!(config.polling.watch, vec!["brown", "lob"]);
        assert_eq!(config.server.port, 5070);
    }

    #[test]
    fn test_missing_required_file_fails() {
        let result = load_config_from_path(Some(Path::new("/nonexistent/corpus-poller.toml")));
        assert!(matches!(result, Err(ConfigError::Source(_))));
    }
}
