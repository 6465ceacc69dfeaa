//! Typed event bus for intra-service communication.
//!
//! Uses tokio broadcast channels to decouple services from one another.
//! Any service can emit events without knowing who is listening, and any
//! number of subscribers can independently consume events.

use std::sync::Arc;
use tokio::sync::broadcast;
use tracing::debug;

/// All application-level event types that flow through the event bus.
#[derive(Debug, Clone)]
pub enum AppEvent {
    /// A user signed in.
    SignedIn { email: String },
    /// The user signed out deliberately.
    SignedOut,
    /// Tokens were silently refreshed.
    SessionRefreshed,
    /// The session ended because a refresh failed or the backend kept
    /// rejecting a refreshed token.
    SessionExpired,
    /// A transcript-parse job is now being tracked and polled.
    JobTracked { job_id: String, meeting_id: i64 },
    /// A tracked job finished successfully.
    JobCompleted { job_id: String, meeting_id: i64 },
    /// A tracked job failed.
    JobFailed {
        job_id: String,
        meeting_id: i64,
        error: String,
    },
    /// The assistant produced a reply.
    AssistantReply { user_id: i64 },
}

/// Application-wide event bus backed by a tokio broadcast channel.
///
/// Designed for fan-out delivery: every subscriber gets every event.
/// Slow subscribers that fall behind receive a `Lagged` error and may
/// miss events, which is acceptable for presentation-driven consumers.
#[derive(Clone)]
pub struct EventBus {
    sender: Arc<broadcast::Sender<AppEvent>>,
}

impl EventBus {
    /// Create a new EventBus with the given channel capacity.
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self {
            sender: Arc::new(sender),
        }
    }

    /// Subscribe to receive application events.
    pub fn subscribe(&self) -> broadcast::Receiver<AppEvent> {
        self.sender.subscribe()
    }

    /// Emit an event to all subscribers.
    pub fn emit(&self, event: AppEvent) {
        let label = event_label(&event);
        match self.sender.send(event) {
            Ok(count) => {
                debug!("event_bus: emitted {label} to {count} subscriber(s)");
            }
            Err(_) => {
                debug!("event_bus: no subscribers for {label}");
            }
        }
    }

    /// Get the current number of active subscribers.
    pub fn subscriber_count(&self) -> usize {
        self.sender.receiver_count()
    }
}

/// Human-readable label for an event (for logging).
fn event_label(event: &AppEvent) -> &'static str {
    match event {
        AppEvent::SignedIn { .. } => "SignedIn",
        AppEvent::SignedOut => "SignedOut",
        AppEvent::SessionRefreshed => "SessionRefreshed",
        AppEvent::SessionExpired => "SessionExpired",
        AppEvent::JobTracked { .. } => "JobTracked",
        AppEvent::JobCompleted { .. } => "JobCompleted",
        AppEvent::JobFailed { .. } => "JobFailed",
        AppEvent::AssistantReply { .. } => "AssistantReply",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_event_bus_emit_receive() {
        let bus = EventBus::new(16);
        let mut rx = bus.subscribe();

        bus.emit(AppEvent::SignedIn {
            email: "ada@example.com".into(),
        });

        match rx.recv().await.unwrap() {
            AppEvent::SignedIn { email } => assert_eq!(email, "ada@example.com"),
            _ => panic!("unexpected event type"),
        }
    }

    #[tokio::test]
    async fn test_event_bus_multiple_subscribers() {
        let bus = EventBus::new(16);
        let mut rx1 = bus.subscribe();
        let mut rx2 = bus.subscribe();

        assert_eq!(bus.subscriber_count(), 2);

        bus.emit(AppEvent::JobCompleted {
            job_id: "j-1".into(),
            meeting_id: 4,
        });

        for rx in [&mut rx1, &mut rx2] {
            match rx.recv().await.unwrap() {
                AppEvent::JobCompleted { job_id, meeting_id } => {
                    assert_eq!(job_id, "j-1");
                    assert_eq!(meeting_id, 4);
                }
                _ => panic!("unexpected event type"),
            }
        }
    }

    #[tokio::test]
    async fn test_event_bus_no_subscribers() {
        let bus = EventBus::new(16);
        // Should not panic even with no subscribers
        bus.emit(AppEvent::SessionExpired);
        assert_eq!(bus.subscriber_count(), 0);
    }

    #[test]
    fn test_event_labels() {
        assert_eq!(event_label(&AppEvent::SignedOut), "SignedOut");
        assert_eq!(
            event_label(&AppEvent::JobFailed {
                job_id: String::new(),
                meeting_id: 0,
                error: String::new(),
            }),
            "JobFailed"
        );
    }
}
