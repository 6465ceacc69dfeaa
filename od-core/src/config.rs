//! Application configuration management.
//!
//! Handles loading, saving, and accessing application configuration including
//! the backend API URL, assistant completion API settings, job polling, and
//! logging preferences. Configuration is persisted as TOML on disk, with a
//! small set of environment-variable overrides matching the original
//! dashboard's env wiring.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tokio::sync::RwLock;

use crate::constants;
use crate::error::{OdError, OdResult};
use crate::platform::Platform;

/// Top-level application configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// Backend API connection settings.
    #[serde(default)]
    pub backend: BackendConfig,

    /// Assistant completion API settings.
    #[serde(default)]
    pub assistant: AssistantConfig,

    /// Local store settings.
    #[serde(default)]
    pub store: StoreConfig,

    /// Logging settings.
    #[serde(default)]
    pub logging: LoggingConfig,

    /// Transcript-job polling settings.
    #[serde(default)]
    pub polling: PollingConfig,

    /// Desktop notification settings.
    #[serde(default)]
    pub notifications: NotificationConfig,
}

/// Backend API connection configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BackendConfig {
    /// Base URL of the backend REST API (e.g. "https://api.example.com/api/v1").
    #[serde(default)]
    pub base_url: String,

    /// API request timeout in milliseconds.
    #[serde(default = "default_api_timeout")]
    pub timeout_ms: u64,

    /// Whether to accept self-signed TLS certificates from the backend.
    #[serde(default)]
    pub accept_invalid_certs: bool,
}

/// Assistant completion API configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AssistantConfig {
    /// Base URL of the completion API.
    #[serde(default = "default_completion_api_base")]
    pub api_base: String,

    /// API key for the completion API. Usually supplied via the
    /// OPSDECK_COMPLETION_API_KEY environment variable rather than the
    /// config file.
    #[serde(default)]
    pub api_key: String,

    /// Model identifier sent with completion requests.
    #[serde(default = "default_completion_model")]
    pub model: String,

    /// System prompt prepended to every assistant conversation. When empty,
    /// no system message is sent.
    #[serde(default)]
    pub system_prompt: String,
}

/// Local store configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoreConfig {
    /// Path to the SQLite store file. If empty, uses the default location.
    #[serde(default)]
    pub path: String,

    /// Enable WAL (Write-Ahead Logging) mode.
    #[serde(default = "default_true")]
    pub wal_mode: bool,

    /// Maximum number of connections in the pool.
    #[serde(default = "default_pool_size")]
    pub pool_size: u32,

    /// Run integrity check on startup.
    #[serde(default = "default_true")]
    pub integrity_check_on_startup: bool,
}

/// Logging configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level: trace, debug, info, warn, error.
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Directory for log files. If empty, uses the default location.
    #[serde(default)]
    pub directory: String,

    /// Enable JSON structured logging for the file output.
    #[serde(default)]
    pub json_output: bool,
}

/// Transcript-job polling configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PollingConfig {
    /// Fixed interval between status polls, in seconds. There is no
    /// backoff: tracked jobs are checked at this cadence until they hit a
    /// terminal status.
    #[serde(default = "default_poll_interval")]
    pub interval_secs: u64,
}

/// Desktop notification configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NotificationConfig {
    /// Whether desktop notifications are shown at all.
    #[serde(default = "default_true")]
    pub enabled: bool,

    /// Notify when a transcript parse job finishes.
    #[serde(default = "default_true")]
    pub notify_job_events: bool,

    /// Notify when the session expires and a new sign-in is needed.
    #[serde(default = "default_true")]
    pub notify_session_expired: bool,
}

// Default value functions for serde

fn default_api_timeout() -> u64 {
    constants::DEFAULT_API_TIMEOUT_MS
}

fn default_true() -> bool {
    true
}

fn default_pool_size() -> u32 {
    4
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_poll_interval() -> u64 {
    constants::DEFAULT_POLL_INTERVAL_SECS
}

fn default_completion_model() -> String {
    constants::DEFAULT_COMPLETION_MODEL.to_string()
}

fn default_completion_api_base() -> String {
    constants::DEFAULT_COMPLETION_API_BASE.to_string()
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            backend: BackendConfig::default(),
            assistant: AssistantConfig::default(),
            store: StoreConfig::default(),
            logging: LoggingConfig::default(),
            polling: PollingConfig::default(),
            notifications: NotificationConfig::default(),
        }
    }
}

impl Default for BackendConfig {
    fn default() -> Self {
        Self {
            base_url: String::new(),
            timeout_ms: default_api_timeout(),
            accept_invalid_certs: false,
        }
    }
}

impl Default for AssistantConfig {
    fn default() -> Self {
        Self {
            api_base: default_completion_api_base(),
            api_key: String::new(),
            model: default_completion_model(),
            system_prompt: String::new(),
        }
    }
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            path: String::new(),
            wal_mode: true,
            pool_size: default_pool_size(),
            integrity_check_on_startup: true,
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            directory: String::new(),
            json_output: false,
        }
    }
}

impl Default for PollingConfig {
    fn default() -> Self {
        Self {
            interval_secs: default_poll_interval(),
        }
    }
}

impl Default for NotificationConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            notify_job_events: true,
            notify_session_expired: true,
        }
    }
}

impl AppConfig {
    /// Load configuration from the default config file path, then apply
    /// environment overrides.
    pub fn load_default() -> OdResult<Self> {
        let path = Self::default_config_path()?;
        let mut config = if path.exists() {
            Self::load_from_file(&path)?
        } else {
            Self::default()
        };
        config.apply_env_overrides();
        Ok(config)
    }

    /// Load configuration from a specific file path (no env overrides).
    pub fn load_from_file(path: &Path) -> OdResult<Self> {
        let contents = std::fs::read_to_string(path)?;
        let config: AppConfig = toml::from_str(&contents)?;
        Ok(config)
    }

    /// Apply environment-variable overrides. The original dashboard took
    /// its backend base URL and completion API key from the environment;
    /// the same contract is honored here.
    pub fn apply_env_overrides(&mut self) {
        if let Ok(url) = std::env::var(constants::ENV_API_BASE_URL) {
            if !url.trim().is_empty() {
                self.backend.base_url = Self::sanitize_base_url(&url);
            }
        }
        if let Ok(key) = std::env::var(constants::ENV_COMPLETION_API_KEY) {
            if !key.trim().is_empty() {
                self.assistant.api_key = key.trim().to_string();
            }
        }
    }

    /// Save configuration to the default config file path.
    pub fn save_default(&self) -> OdResult<()> {
        let path = Self::default_config_path()?;
        self.save_to_file(&path)
    }

    /// Save configuration to a specific file path.
    pub fn save_to_file(&self, path: &Path) -> OdResult<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let contents = toml::to_string_pretty(self)
            .map_err(|e| OdError::Config(format!("failed to serialize config: {e}")))?;
        std::fs::write(path, contents)?;
        Ok(())
    }

    /// Get the default configuration file path.
    pub fn default_config_path() -> OdResult<PathBuf> {
        let config_dir = Platform::config_dir()?;
        Ok(config_dir.join("config.toml"))
    }

    /// Get the effective store path, using the configured path or the default.
    pub fn effective_store_path(&self) -> OdResult<PathBuf> {
        if self.store.path.is_empty() {
            let data_dir = Platform::data_dir()?;
            Ok(data_dir.join("opsdeck.db"))
        } else {
            Ok(PathBuf::from(&self.store.path))
        }
    }

    /// Get the effective log directory, using the configured path or the default.
    pub fn effective_log_dir(&self) -> OdResult<PathBuf> {
        if self.logging.directory.is_empty() {
            let data_dir = Platform::data_dir()?;
            Ok(data_dir.join("logs"))
        } else {
            Ok(PathBuf::from(&self.logging.directory))
        }
    }

    /// Whether the backend connection is configured.
    pub fn is_backend_configured(&self) -> bool {
        !self.backend.base_url.is_empty()
    }

    /// Sanitize a backend base URL: trim whitespace and quotes, default the
    /// scheme to https, strip trailing slashes.
    pub fn sanitize_base_url(url: &str) -> String {
        let trimmed = url.trim().trim_matches('"').trim();
        if trimmed.is_empty() {
            return String::new();
        }

        let with_scheme = if trimmed.starts_with("http://") || trimmed.starts_with("https://") {
            trimmed.to_string()
        } else {
            format!("https://{trimmed}")
        };

        with_scheme.trim_end_matches('/').to_string()
    }
}

/// Thread-safe configuration holder for shared access across services.
#[derive(Clone)]
pub struct ConfigHandle {
    inner: Arc<RwLock<AppConfig>>,
}

impl ConfigHandle {
    /// Create a new configuration handle.
    pub fn new(config: AppConfig) -> Self {
        Self {
            inner: Arc::new(RwLock::new(config)),
        }
    }

    /// Read the configuration.
    pub async fn read(&self) -> tokio::sync::RwLockReadGuard<'_, AppConfig> {
        self.inner.read().await
    }

    /// Write/update the configuration.
    pub async fn write(&self) -> tokio::sync::RwLockWriteGuard<'_, AppConfig> {
        self.inner.write().await
    }

    /// Save the current configuration to disk.
    pub async fn save(&self) -> OdResult<()> {
        let config = self.inner.read().await;
        config.save_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = AppConfig::default();
        assert_eq!(config.backend.timeout_ms, 15_000);
        assert_eq!(config.polling.interval_secs, 5);
        assert_eq!(config.assistant.model, "gpt-3.5-turbo");
        assert!(config.store.wal_mode);
        assert!(!config.is_backend_configured());
    }

    #[test]
    fn test_sanitize_base_url() {
        assert_eq!(
            AppConfig::sanitize_base_url("api.example.com"),
            "https://api.example.com"
        );
        assert_eq!(
            AppConfig::sanitize_base_url("http://localhost:3000/"),
            "http://localhost:3000"
        );
        assert_eq!(
            AppConfig::sanitize_base_url("  \"https://api.example.com/v1/\"  "),
            "https://api.example.com/v1"
        );
        assert_eq!(AppConfig::sanitize_base_url("   "), "");
    }

    #[test]
    fn test_roundtrip_toml() {
        let config = AppConfig::default();
        let serialized = toml::to_string_pretty(&config).unwrap();
        let deserialized: AppConfig = toml::from_str(&serialized).unwrap();
        assert_eq!(deserialized.backend.timeout_ms, config.backend.timeout_ms);
        assert_eq!(deserialized.polling.interval_secs, config.polling.interval_secs);
    }

    #[test]
    fn test_save_and_load() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("config.toml");

        let mut config = AppConfig::default();
        config.backend.base_url = "https://api.example.com/api/v1".into();
        config.save_to_file(&path).unwrap();

        let loaded = AppConfig::load_from_file(&path).unwrap();
        assert_eq!(loaded.backend.base_url, "https://api.example.com/api/v1");
        assert!(loaded.is_backend_configured());
    }
}
