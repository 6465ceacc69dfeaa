//! Integration tests for service coordination.
//!
//! Tests EventBus publish/subscribe, SessionService restore and sign-out,
//! SettingsService persistence, AssistantService local history, and
//! ServiceRegistry lifecycle.

mod common;

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use od_api::TokenManager;
use od_core::error::{OdError, OdResult};
use od_models::store;
use od_services::event_bus::AppEvent;
use od_services::jobs::{JobStatus, JobStatusSource};
use od_services::registry::ServiceRegistry;
use od_services::assistant::AssistantService;
use od_services::session::SessionService;
use od_services::settings::SettingsService;

struct PendingSource;

#[async_trait]
impl JobStatusSource for PendingSource {
    async fn status(&self, _meeting_id: i64, _job_id: &str) -> OdResult<JobStatus> {
        Ok(JobStatus {
            status: "pending".into(),
            error: None,
        })
    }
}

// ---- EventBus publish/subscribe ----

#[tokio::test]
async fn event_bus_single_subscriber_receives_event() {
    let bus = common::create_test_event_bus();
    let mut rx = bus.subscribe();

    bus.emit(AppEvent::SignedIn {
        email: "admin@example.com".into(),
    });

    let event = rx.recv().await.unwrap();
    match event {
        AppEvent::SignedIn { email } => assert_eq!(email, "admin@example.com"),
        _ => panic!("expected SignedIn event"),
    }
}

#[tokio::test]
async fn event_bus_multiple_subscribers_all_receive() {
    let bus = common::create_test_event_bus();
    let mut rx1 = bus.subscribe();
    let mut rx2 = bus.subscribe();
    let mut rx3 = bus.subscribe();

    assert_eq!(bus.subscriber_count(), 3);

    bus.emit(AppEvent::JobCompleted {
        job_id: "job-42".into(),
        meeting_id: 7,
    });

    for rx in [&mut rx1, &mut rx2, &mut rx3] {
        let event = rx.recv().await.unwrap();
        match event {
            AppEvent::JobCompleted { job_id, meeting_id } => {
                assert_eq!(job_id, "job-42");
                assert_eq!(meeting_id, 7);
            }
            _ => panic!("all subscribers should receive the same event"),
        }
    }
}

// ---- SessionService ----

#[tokio::test]
async fn session_restore_installs_stored_tokens() {
    let (db, _dir) = common::create_test_db();
    let bus = common::create_test_event_bus();
    let tokens = Arc::new(TokenManager::new());

    {
        let conn = db.conn().unwrap();
        store::save_session(&conn, &common::test_session("restore@example.com")).unwrap();
    }

    let svc = SessionService::new(db, bus, Arc::clone(&tokens));
    let user = svc.restore().await.unwrap().expect("session should restore");

    assert_eq!(user.email, "restore@example.com");
    assert_eq!(tokens.access_token().await.as_deref(), Some("access-1"));
    assert!(svc.current_user().await.is_some());
    assert!(svc.require_session().await.is_ok());
}

#[tokio::test]
async fn session_restore_with_empty_store_is_none() {
    let (db, _dir) = common::create_test_db();
    let svc = SessionService::new(
        db,
        common::create_test_event_bus(),
        Arc::new(TokenManager::new()),
    );

    assert!(svc.restore().await.unwrap().is_none());
    match svc.require_session().await {
        Err(OdError::NotSignedIn(_)) => {}
        other => panic!("expected NotSignedIn, got {other:?}"),
    }
}

#[tokio::test]
async fn session_sign_out_clears_everything() {
    let (db, _dir) = common::create_test_db();
    let bus = common::create_test_event_bus();
    let mut rx = bus.subscribe();
    let tokens = Arc::new(TokenManager::new());

    {
        let conn = db.conn().unwrap();
        store::save_session(&conn, &common::test_session("out@example.com")).unwrap();
    }

    let svc = SessionService::new(db.clone(), bus, Arc::clone(&tokens));
    svc.restore().await.unwrap();
    svc.sign_out().await.unwrap();

    assert!(tokens.access_token().await.is_none());
    assert!(svc.current_user().await.is_none());
    let conn = db.conn().unwrap();
    assert!(store::load_session(&conn).unwrap().is_none());

    let event = rx.recv().await.unwrap();
    assert!(matches!(event, AppEvent::SignedOut));
}

// ---- SettingsService ----

#[tokio::test]
async fn settings_round_trip_through_config_handle() {
    let config = common::create_test_config_handle();
    let svc = SettingsService::new(config.clone());

    svc.set_base_url("backend.example.com/api/v1".into()).await;
    svc.set_poll_interval_secs(12).await;

    // Changes are visible through the shared handle.
    let snapshot = config.read().await;
    assert_eq!(snapshot.backend.base_url, "https://backend.example.com/api/v1");
    assert_eq!(snapshot.polling.interval_secs, 12);
}

// ---- AssistantService local history ----

#[tokio::test]
async fn assistant_local_history_reads_logged_exchanges() {
    let (db, _dir) = common::create_test_db();
    let svc = AssistantService::new(
        db.clone(),
        common::create_test_config_handle(),
        common::create_test_event_bus(),
    );

    {
        let conn = db.conn().unwrap();
        store::log_exchange(&conn, 3, "what changed?", "two meetings moved").unwrap();
        store::log_exchange(&conn, 3, "who moved them?", "alice").unwrap();
        store::log_exchange(&conn, 9, "other user", "other answer").unwrap();
    }

    let history = svc.local_history(3).unwrap();
    assert_eq!(history.len(), 2);
    assert_eq!(history[0].question, "what changed?");

    assert_eq!(svc.clear_local_history(3).unwrap(), 2);
    assert!(svc.local_history(3).unwrap().is_empty());
}

// ---- ServiceRegistry lifecycle ----

#[tokio::test]
async fn registry_initializes_and_shuts_down_all_services() {
    let (db, _dir) = common::create_test_db();
    let mut registry = ServiceRegistry::new(
        common::create_test_config_handle(),
        db,
        Arc::new(TokenManager::new()),
    );
    registry.register_all(Arc::new(PendingSource), Duration::from_secs(5));
    assert_eq!(registry.service_count(), 5);

    registry.init_all().await.unwrap();
    for (name, _state, healthy) in registry.health_check().await {
        assert!(healthy, "service {name} failed to start");
    }

    registry.shutdown_all().await.unwrap();
    for (_name, _state, healthy) in registry.health_check().await {
        assert!(!healthy);
    }
}

#[tokio::test]
async fn registry_api_client_accessor_errors_until_set() {
    let (db, _dir) = common::create_test_db();
    let registry = ServiceRegistry::new(
        common::create_test_config_handle(),
        db,
        Arc::new(TokenManager::new()),
    );

    match registry.api_client().await {
        Err(OdError::ServiceNotInitialized(_)) => {}
        other => panic!("expected ServiceNotInitialized, got {other:?}"),
    }
}
