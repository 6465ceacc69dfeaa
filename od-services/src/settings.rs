//! Settings service for application configuration persistence.
//!
//! Wraps the ConfigHandle to provide typed accessors for all configuration
//! sections: backend, assistant, polling, notifications, and logging.

use tracing::{debug, info};
use od_core::config::{AppConfig, ConfigHandle};
use od_core::error::OdResult;

use crate::service::{Service, ServiceState};

/// Service for managing application settings.
///
/// Wraps the ConfigHandle to provide a service-compatible interface
/// for reading and writing application settings with typed accessors.
/// Settings are persisted to a TOML configuration file.
pub struct SettingsService {
    state: ServiceState,
    config: ConfigHandle,
}

impl SettingsService {
    /// Create a new SettingsService.
    pub fn new(config: ConfigHandle) -> Self {
        Self {
            state: ServiceState::Created,
            config,
        }
    }

    /// Get the config handle for direct access.
    pub fn config(&self) -> &ConfigHandle {
        &self.config
    }

    // ─── Backend settings ───────────────────────────────────────────────

    /// Get the backend base URL.
    pub async fn base_url(&self) -> String {
        self.config.read().await.backend.base_url.clone()
    }

    /// Set the backend base URL (sanitized).
    pub async fn set_base_url(&self, url: String) {
        let mut config = self.config.write().await;
        config.backend.base_url = AppConfig::sanitize_base_url(&url);
        debug!("backend base url updated");
    }

    /// Get the API timeout in milliseconds.
    pub async fn api_timeout_ms(&self) -> u64 {
        self.config.read().await.backend.timeout_ms
    }

    /// Set the API timeout in milliseconds.
    pub async fn set_api_timeout_ms(&self, ms: u64) {
        let mut config = self.config.write().await;
        config.backend.timeout_ms = ms;
    }

    /// Whether self-signed TLS certificates are accepted.
    pub async fn accept_invalid_certs(&self) -> bool {
        self.config.read().await.backend.accept_invalid_certs
    }

    /// Set whether to accept self-signed TLS certificates.
    pub async fn set_accept_invalid_certs(&self, accept: bool) {
        let mut config = self.config.write().await;
        config.backend.accept_invalid_certs = accept;
    }

    /// Whether the backend connection is configured.
    pub async fn is_backend_configured(&self) -> bool {
        self.config.read().await.is_backend_configured()
    }

    // ─── Assistant settings ─────────────────────────────────────────────

    /// Get the completion API base URL.
    pub async fn assistant_api_base(&self) -> String {
        self.config.read().await.assistant.api_base.clone()
    }

    /// Set the completion API base URL.
    pub async fn set_assistant_api_base(&self, url: String) {
        let mut config = self.config.write().await;
        config.assistant.api_base = url;
    }

    /// Get the completion model identifier.
    pub async fn assistant_model(&self) -> String {
        self.config.read().await.assistant.model.clone()
    }

    /// Set the completion model identifier.
    pub async fn set_assistant_model(&self, model: String) {
        let mut config = self.config.write().await;
        config.assistant.model = model;
    }

    /// Get the assistant system prompt.
    pub async fn system_prompt(&self) -> String {
        self.config.read().await.assistant.system_prompt.clone()
    }

    /// Set the assistant system prompt.
    pub async fn set_system_prompt(&self, prompt: String) {
        let mut config = self.config.write().await;
        config.assistant.system_prompt = prompt;
    }

    /// Whether a completion API key is configured. The key itself is not
    /// exposed through the settings surface.
    pub async fn has_assistant_api_key(&self) -> bool {
        !self.config.read().await.assistant.api_key.is_empty()
    }

    /// Set the completion API key.
    pub async fn set_assistant_api_key(&self, key: String) {
        let mut config = self.config.write().await;
        config.assistant.api_key = key;
    }

    // ─── Polling settings ───────────────────────────────────────────────

    /// Get the fixed job-poll interval in seconds.
    pub async fn poll_interval_secs(&self) -> u64 {
        self.config.read().await.polling.interval_secs
    }

    /// Set the job-poll interval in seconds. A zero interval is clamped
    /// to one second.
    pub async fn set_poll_interval_secs(&self, secs: u64) {
        let mut config = self.config.write().await;
        config.polling.interval_secs = secs.max(1);
    }

    // ─── Notification settings ──────────────────────────────────────────

    /// Whether desktop notifications are enabled.
    pub async fn notifications_enabled(&self) -> bool {
        self.config.read().await.notifications.enabled
    }

    /// Set whether desktop notifications are enabled.
    pub async fn set_notifications_enabled(&self, enabled: bool) {
        let mut config = self.config.write().await;
        config.notifications.enabled = enabled;
    }

    /// Whether job-event notifications are enabled.
    pub async fn notify_job_events(&self) -> bool {
        self.config.read().await.notifications.notify_job_events
    }

    /// Set whether to notify on job events.
    pub async fn set_notify_job_events(&self, enabled: bool) {
        let mut config = self.config.write().await;
        config.notifications.notify_job_events = enabled;
    }

    /// Whether session-expired notifications are enabled.
    pub async fn notify_session_expired(&self) -> bool {
        self.config.read().await.notifications.notify_session_expired
    }

    /// Set whether to notify on session expiry.
    pub async fn set_notify_session_expired(&self, enabled: bool) {
        let mut config = self.config.write().await;
        config.notifications.notify_session_expired = enabled;
    }

    // ─── Logging settings ───────────────────────────────────────────────

    /// Get the log level.
    pub async fn log_level(&self) -> String {
        self.config.read().await.logging.level.clone()
    }

    /// Set the log level.
    pub async fn set_log_level(&self, level: String) {
        let mut config = self.config.write().await;
        config.logging.level = level;
    }

    /// Whether JSON structured logging is enabled.
    pub async fn json_logging(&self) -> bool {
        self.config.read().await.logging.json_output
    }

    /// Set whether to use JSON structured logging.
    pub async fn set_json_logging(&self, json: bool) {
        let mut config = self.config.write().await;
        config.logging.json_output = json;
    }

    // ─── Persistence ────────────────────────────────────────────────────

    /// Save the current configuration to disk.
    pub async fn save(&self) -> OdResult<()> {
        self.config.save().await?;
        debug!("settings saved");
        Ok(())
    }

    /// Export all settings as a JSON value. The completion API key is
    /// blanked before export.
    pub async fn export_as_json(&self) -> serde_json::Value {
        let mut config = self.config.read().await.clone();
        config.assistant.api_key = String::new();
        serde_json::to_value(&config).unwrap_or(serde_json::Value::Null)
    }
}

impl Service for SettingsService {
    fn name(&self) -> &str { "settings" }
    fn state(&self) -> ServiceState { self.state }
    fn init(&mut self) -> OdResult<()> {
        self.state = ServiceState::Running;
        info!("settings service initialized");
        Ok(())
    }
    fn shutdown(&mut self) -> OdResult<()> {
        self.state = ServiceState::Stopped;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_config() -> ConfigHandle {
        ConfigHandle::new(AppConfig::default())
    }

    #[test]
    fn test_settings_service_name() {
        let svc = SettingsService::new(make_config());
        assert_eq!(svc.name(), "settings");
    }

    #[tokio::test]
    async fn test_base_url_sanitized() {
        let svc = SettingsService::new(make_config());
        assert!(svc.base_url().await.is_empty());
        assert!(!svc.is_backend_configured().await);

        svc.set_base_url("api.example.com/api/v1/".into()).await;
        assert_eq!(svc.base_url().await, "https://api.example.com/api/v1");
        assert!(svc.is_backend_configured().await);
    }

    #[tokio::test]
    async fn test_poll_interval_clamped() {
        let svc = SettingsService::new(make_config());
        assert_eq!(svc.poll_interval_secs().await, 5);

        svc.set_poll_interval_secs(0).await;
        assert_eq!(svc.poll_interval_secs().await, 1);

        svc.set_poll_interval_secs(30).await;
        assert_eq!(svc.poll_interval_secs().await, 30);
    }

    #[tokio::test]
    async fn test_notification_toggles() {
        let svc = SettingsService::new(make_config());
        assert!(svc.notify_job_events().await);
        svc.set_notify_job_events(false).await;
        assert!(!svc.notify_job_events().await);

        assert!(svc.notify_session_expired().await);
        svc.set_notify_session_expired(false).await;
        assert!(!svc.notify_session_expired().await);
    }

    #[tokio::test]
    async fn test_assistant_settings() {
        let svc = SettingsService::new(make_config());
        assert_eq!(svc.assistant_model().await, "gpt-3.5-turbo");
        assert!(!svc.has_assistant_api_key().await);

        svc.set_assistant_model("gpt-4".into()).await;
        svc.set_assistant_api_key("sk-test".into()).await;
        assert_eq!(svc.assistant_model().await, "gpt-4");
        assert!(svc.has_assistant_api_key().await);
    }

    #[tokio::test]
    async fn test_export_blanks_api_key() {
        let svc = SettingsService::new(make_config());
        svc.set_assistant_api_key("sk-secret".into()).await;

        let json = svc.export_as_json().await;
        assert!(json.is_object());
        assert_eq!(json["assistant"]["api_key"], "");
        assert!(json.get("backend").is_some());
    }
}
