//! Shared test utilities for integration tests.

use chrono::Utc;
use od_core::config::{AppConfig, ConfigHandle, StoreConfig};
use od_models::{Database, Session, SessionUser, TokenSet};
use od_services::event_bus::EventBus;
use tempfile::TempDir;

/// Create a temporary store with full schema and migrations applied.
/// Returns the Database and the TempDir (must be held alive for the duration of the test).
pub fn create_test_db() -> (Database, TempDir) {
    let dir = TempDir::new().expect("failed to create temp dir");
    let path = dir.path().join("test.db");
    let config = StoreConfig::default();
    let db = Database::init(&path, &config).expect("failed to init test store");
    (db, dir)
}

/// Create a ConfigHandle wrapping a default config.
pub fn create_test_config_handle() -> ConfigHandle {
    ConfigHandle::new(AppConfig::default())
}

/// Create an EventBus with a small buffer suitable for tests.
pub fn create_test_event_bus() -> EventBus {
    EventBus::new(64)
}

/// A session fixture with tokens that expire an hour from now.
pub fn test_session(email: &str) -> Session {
    Session {
        user: SessionUser {
            id: 1,
            name: "Test User".into(),
            email: email.into(),
            role: "admin".into(),
        },
        tokens: TokenSet {
            access_token: "access-1".into(),
            refresh_token: "refresh-1".into(),
            token_expires: Utc::now().timestamp_millis() + 3_600_000,
        },
    }
}
