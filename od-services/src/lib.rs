//! OpsDeck Services - Business logic and service layer.
//!
//! This crate provides the service trait, service registry for dependency
//! injection, and the concrete service implementations:
//! - Session (sign-in, sign-out, restore, proactive token refresh)
//! - Job polling (fixed-interval transcript-parse polling, resume on start)
//! - Assistant (chat history + completion API + exchange persistence)
//! - Notifications (desktop notifications for job and session events)
//! - Settings persistence (typed accessors over the TOML config)
//! - Event bus (typed intra-service communication)

pub mod assistant;
pub mod event_bus;
pub mod jobs;
pub mod notification;
pub mod registry;
pub mod service;
pub mod session;
pub mod settings;

// Re-export key types
pub use assistant::AssistantService;
pub use event_bus::{AppEvent, EventBus};
pub use jobs::{JobPollerService, JobStatus, JobStatusSource};
pub use notification::{NotificationService, Notifier};
pub use registry::ServiceRegistry;
pub use service::{Service, ServiceState};
pub use session::SessionService;
pub use settings::SettingsService;
