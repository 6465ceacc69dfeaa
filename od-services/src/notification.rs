//! Desktop notifications for background events.
//!
//! Long-running commands keep polling parse jobs while the user is away,
//! so completions, failures, and session expiry surface as native
//! notifications instead of scrolling past in the log. The service
//! subscribes to the app bus on init and reacts to job and session
//! events on its own.

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;

use od_core::config::ConfigHandle;
#[allow(unused_imports)]
use od_core::error::OdError;
use od_core::error::OdResult;
use tracing::{debug, info, warn};

use crate::event_bus::{AppEvent, EventBus};
use crate::service::{Service, ServiceState};

/// Notification category for grouping.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotificationCategory {
    /// A transcript-parse job finished.
    JobCompleted,
    /// A transcript-parse job failed.
    JobFailed,
    /// The signed-in session expired.
    SessionExpired,
    /// Anything else worth surfacing.
    General,
}

/// The notification emitter, shared between the service and its bus
/// bridge task. Respects the global enable flag plus the per-category
/// toggles from configuration.
#[derive(Clone)]
pub struct Notifier {
    config: ConfigHandle,
    enabled: Arc<AtomicBool>,
    delivered: Arc<AtomicUsize>,
}

impl Notifier {
    fn new(config: ConfigHandle) -> Self {
        Self {
            config,
            enabled: Arc::new(AtomicBool::new(true)),
            delivered: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// Notify that a transcript-parse job finished.
    pub async fn notify_job_completed(&self, meeting_id: i64, job_id: &str) -> OdResult<()> {
        if !self.should_notify_jobs().await {
            return Ok(());
        }

        self.show_notification(
            "Transcript ready",
            &format!("Parse job {job_id} for meeting {meeting_id} completed"),
            NotificationCategory::JobCompleted,
        )?;

        debug!("job completed notification: {job_id}");
        Ok(())
    }

    /// Notify that a transcript-parse job failed.
    pub async fn notify_job_failed(
        &self,
        meeting_id: i64,
        job_id: &str,
        error: &str,
    ) -> OdResult<()> {
        if !self.should_notify_jobs().await {
            return Ok(());
        }

        self.show_notification(
            "Transcript parse failed",
            &format!("Job {job_id} for meeting {meeting_id}: {error}"),
            NotificationCategory::JobFailed,
        )?;

        debug!("job failed notification: {job_id}");
        Ok(())
    }

    /// Notify that the session expired and a new sign-in is needed.
    pub async fn notify_session_expired(&self) -> OdResult<()> {
        if !self.is_enabled() {
            return Ok(());
        }

        let config = self.config.read().await;
        if !config.notifications.notify_session_expired {
            return Ok(());
        }
        drop(config);

        self.show_notification(
            "Session expired",
            "Your session could not be refreshed. Sign in again to continue.",
            NotificationCategory::SessionExpired,
        )?;

        debug!("session expired notification shown");
        Ok(())
    }

    /// Show a generic notification.
    pub fn notify(&self, title: &str, body: &str) -> OdResult<()> {
        if !self.is_enabled() {
            return Ok(());
        }

        self.show_notification(title, body, NotificationCategory::General)
    }

    /// Set whether notifications are globally enabled.
    pub fn set_enabled(&self, enabled: bool) {
        self.enabled.store(enabled, Ordering::SeqCst);
        debug!("notifications {}", if enabled { "enabled" } else { "disabled" });
    }

    /// Whether notifications are globally enabled.
    pub fn is_enabled(&self) -> bool {
        self.enabled.load(Ordering::SeqCst)
    }

    /// Number of notifications actually delivered (past all gates).
    pub fn delivered_count(&self) -> usize {
        self.delivered.load(Ordering::SeqCst)
    }

    /// Whether job-event notifications should be shown right now.
    async fn should_notify_jobs(&self) -> bool {
        if !self.is_enabled() {
            return false;
        }

        let config = self.config.read().await;
        config.notifications.enabled && config.notifications.notify_job_events
    }

    /// Actually show the native notification.
    fn show_notification(
        &self,
        title: &str,
        body: &str,
        _category: NotificationCategory,
    ) -> OdResult<()> {
        #[cfg(not(any(test, feature = "test-notifications")))]
        {
            notify_rust::Notification::new()
                .summary(title)
                .body(body)
                .appname("OpsDeck")
                .show()
                .map_err(|e| OdError::Notification(e.to_string()))?;
        }

        let _ = (title, body);
        self.delivered.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

/// Service that turns app-bus events into desktop notifications.
pub struct NotificationService {
    state: ServiceState,
    notifier: Notifier,
    bus: EventBus,
    bridge: Option<tokio::task::JoinHandle<()>>,
}

impl NotificationService {
    /// Create a new NotificationService.
    pub fn new(config: ConfigHandle, bus: EventBus) -> Self {
        Self {
            state: ServiceState::Created,
            notifier: Notifier::new(config),
            bus,
            bridge: None,
        }
    }

    /// A handle for emitting notifications directly.
    pub fn notifier(&self) -> Notifier {
        self.notifier.clone()
    }

    /// Set whether notifications are globally enabled.
    pub fn set_enabled(&self, enabled: bool) {
        self.notifier.set_enabled(enabled);
    }

    /// Whether notifications are globally enabled.
    pub fn is_enabled(&self) -> bool {
        self.notifier.is_enabled()
    }

    /// Number of notifications actually delivered.
    pub fn delivered_count(&self) -> usize {
        self.notifier.delivered_count()
    }

    /// React to job and session events from the app bus.
    fn spawn_bridge(&mut self) {
        let mut events = self.bus.subscribe();
        let notifier = self.notifier.clone();

        self.bridge = Some(tokio::spawn(async move {
            while let Ok(event) = events.recv().await {
                let result = match event {
                    AppEvent::JobCompleted { job_id, meeting_id } => {
                        notifier.notify_job_completed(meeting_id, &job_id).await
                    }
                    AppEvent::JobFailed {
                        job_id,
                        meeting_id,
                        error,
                    } => notifier.notify_job_failed(meeting_id, &job_id, &error).await,
                    AppEvent::SessionExpired => notifier.notify_session_expired().await,
                    _ => Ok(()),
                };
                if let Err(e) = result {
                    warn!("failed to show notification: {e}");
                }
            }
        }));
    }
}

impl Service for NotificationService {
    fn name(&self) -> &str {
        "notification"
    }

    fn state(&self) -> ServiceState {
        self.state
    }

    fn init(&mut self) -> OdResult<()> {
        self.spawn_bridge();
        self.state = ServiceState::Running;
        info!("notification service initialized");
        Ok(())
    }

    fn shutdown(&mut self) -> OdResult<()> {
        if let Some(bridge) = self.bridge.take() {
            bridge.abort();
        }
        self.state = ServiceState::Stopped;
        Ok(())
    }
}
