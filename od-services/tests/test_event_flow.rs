//! End-to-end event flow integration tests.
//!
//! Tests the token refresh pipeline (TokenManager -> session bridge ->
//! store persistence -> AppEvent) and the job poller pipeline (scripted
//! status source -> store updates -> terminal AppEvent).

mod common;

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use chrono::Utc;
use od_api::token::RefreshTokens;
use od_api::TokenManager;
use od_core::error::{OdError, OdResult};
use od_models::store;
use od_models::TokenSet;
use od_services::event_bus::AppEvent;
use od_services::jobs::{JobPollerService, JobStatus, JobStatusSource};
use od_services::notification::NotificationService;
use od_services::service::Service;
use od_services::session::SessionService;

// ---- Refresh pipeline ----

struct StubRefresher {
    fail: bool,
}

#[async_trait]
impl RefreshTokens for StubRefresher {
    async fn refresh(&self, _refresh_token: &str) -> OdResult<TokenSet> {
        if self.fail {
            return Err(OdError::TokenRefresh("refresh token rejected".into()));
        }
        Ok(TokenSet {
            access_token: "access-2".into(),
            refresh_token: "refresh-2".into(),
            token_expires: Utc::now().timestamp_millis() + 3_600_000,
        })
    }
}

#[tokio::test]
async fn e2e_refreshed_tokens_are_persisted_and_republished() {
    let (db, _dir) = common::create_test_db();
    let bus = common::create_test_event_bus();
    let mut rx = bus.subscribe();
    let tokens = Arc::new(TokenManager::new());

    {
        let conn = db.conn().unwrap();
        store::save_session(&conn, &common::test_session("bridge@example.com")).unwrap();
    }

    let mut svc = SessionService::new(db.clone(), bus, Arc::clone(&tokens));
    svc.init().unwrap();
    svc.restore().await.unwrap();

    let refreshed = tokens
        .refreshed_token("access-1", &StubRefresher { fail: false })
        .await
        .unwrap();
    assert_eq!(refreshed, "access-2");

    // The bridge persists the new tokens before republishing.
    let event = rx.recv().await.unwrap();
    assert!(matches!(event, AppEvent::SessionRefreshed));

    let conn = db.conn().unwrap();
    let stored = store::load_session(&conn).unwrap().unwrap();
    assert_eq!(stored.tokens.access_token, "access-2");
    assert_eq!(stored.tokens.refresh_token, "refresh-2");
    assert_eq!(
        svc.current_user().await.unwrap().email,
        "bridge@example.com"
    );

    svc.shutdown().unwrap();
}

#[tokio::test]
async fn e2e_failed_refresh_expires_session_everywhere() {
    let (db, _dir) = common::create_test_db();
    let bus = common::create_test_event_bus();
    let mut rx = bus.subscribe();
    let tokens = Arc::new(TokenManager::new());

    {
        let conn = db.conn().unwrap();
        store::save_session(&conn, &common::test_session("expired@example.com")).unwrap();
    }

    let mut svc = SessionService::new(db.clone(), bus, Arc::clone(&tokens));
    svc.init().unwrap();
    svc.restore().await.unwrap();

    let err = tokens
        .refreshed_token("access-1", &StubRefresher { fail: true })
        .await
        .unwrap_err();
    assert!(matches!(err, OdError::TokenRefresh(_)));

    let event = rx.recv().await.unwrap();
    assert!(matches!(event, AppEvent::SessionExpired));

    assert!(tokens.access_token().await.is_none());
    assert!(svc.current_user().await.is_none());
    let conn = db.conn().unwrap();
    assert!(store::load_session(&conn).unwrap().is_none());

    svc.shutdown().unwrap();
}

// ---- Job poller pipeline ----

/// Returns a scripted sequence of statuses, repeating the last one.
struct ScriptedSource {
    script: Mutex<Vec<JobStatus>>,
    polls: AtomicUsize,
}

impl ScriptedSource {
    fn new(statuses: &[(&str, Option<&str>)]) -> Self {
        let script = statuses
            .iter()
            .rev()
            .map(|(status, error)| JobStatus {
                status: status.to_string(),
                error: error.map(String::from),
            })
            .collect();
        Self {
            script: Mutex::new(script),
            polls: AtomicUsize::new(0),
        }
    }
}

#[async_trait]
impl JobStatusSource for ScriptedSource {
    async fn status(&self, _meeting_id: i64, _job_id: &str) -> OdResult<JobStatus> {
        self.polls.fetch_add(1, Ordering::SeqCst);
        let mut script = self.script.lock().unwrap();
        let next = if script.len() > 1 {
            script.pop().unwrap()
        } else {
            script.last().cloned().unwrap()
        };
        Ok(next)
    }
}

#[tokio::test(start_paused = true)]
async fn e2e_poller_tracks_until_completion() {
    let (db, _dir) = common::create_test_db();
    let bus = common::create_test_event_bus();
    let mut rx = bus.subscribe();

    let source = Arc::new(ScriptedSource::new(&[
        ("processing", None),
        ("processing", None),
        ("completed", None),
    ]));
    let mut svc = JobPollerService::new(
        db.clone(),
        bus,
        Arc::clone(&source) as Arc<dyn JobStatusSource>,
        Duration::from_secs(5),
    );
    svc.init().unwrap();

    let job = svc.track(12, "srv-job-1").await.unwrap();
    match rx.recv().await.unwrap() {
        AppEvent::JobTracked { job_id, meeting_id } => {
            assert_eq!(job_id, "srv-job-1");
            assert_eq!(meeting_id, 12);
        }
        other => panic!("expected JobTracked, got {other:?}"),
    }

    // Paused time auto-advances through the fixed 5s ticks.
    match rx.recv().await.unwrap() {
        AppEvent::JobCompleted { job_id, meeting_id } => {
            assert_eq!(job_id, "srv-job-1");
            assert_eq!(meeting_id, 12);
        }
        other => panic!("expected JobCompleted, got {other:?}"),
    }

    assert_eq!(source.polls.load(Ordering::SeqCst), 3);

    // Terminal status was persisted and the job left the active set.
    let conn = db.conn().unwrap();
    let stored = store::find_job(&conn, &job.id).unwrap().unwrap();
    assert_eq!(stored.status, "completed");
    assert!(store::active_jobs(&conn).unwrap().is_empty());

    svc.shutdown().unwrap();
}

#[tokio::test(start_paused = true)]
async fn e2e_poller_emits_failure_with_error_text() {
    let (db, _dir) = common::create_test_db();
    let bus = common::create_test_event_bus();
    let mut rx = bus.subscribe();

    let source = Arc::new(ScriptedSource::new(&[(
        "failed",
        Some("transcript was empty"),
    )]));
    let mut svc = JobPollerService::new(db, bus, source, Duration::from_secs(5));
    svc.init().unwrap();

    svc.track(3, "srv-job-2").await.unwrap();
    rx.recv().await.unwrap(); // JobTracked

    match rx.recv().await.unwrap() {
        AppEvent::JobFailed {
            job_id,
            meeting_id,
            error,
        } => {
            assert_eq!(job_id, "srv-job-2");
            assert_eq!(meeting_id, 3);
            assert_eq!(error, "transcript was empty");
        }
        other => panic!("expected JobFailed, got {other:?}"),
    }

    svc.shutdown().unwrap();
}

#[tokio::test(start_paused = true)]
async fn e2e_poller_resumes_stored_jobs() {
    let (db, _dir) = common::create_test_db();
    let bus = common::create_test_event_bus();
    let mut rx = bus.subscribe();

    // A job tracked by a previous run, still pending.
    {
        let conn = db.conn().unwrap();
        let now = Utc::now().timestamp_millis();
        store::upsert_job(
            &conn,
            &od_models::ParseJob {
                id: "local-1".into(),
                meeting_id: 20,
                job_id: "srv-job-3".into(),
                status: "pending".into(),
                created_at: now,
                updated_at: now,
            },
        )
        .unwrap();
    }

    let source = Arc::new(ScriptedSource::new(&[("completed", None)]));
    let mut svc = JobPollerService::new(db, bus, source, Duration::from_secs(5));
    svc.init().unwrap();

    assert_eq!(svc.resume().await.unwrap(), 1);
    assert_eq!(svc.active_polls(), 1);

    match rx.recv().await.unwrap() {
        AppEvent::JobCompleted { job_id, meeting_id } => {
            assert_eq!(job_id, "srv-job-3");
            assert_eq!(meeting_id, 20);
        }
        other => panic!("expected JobCompleted, got {other:?}"),
    }

    svc.shutdown().unwrap();
}

// ---- Bus to desktop notification ----

#[tokio::test]
async fn e2e_job_events_reach_the_notification_path() {
    let bus = common::create_test_event_bus();
    let mut notifications =
        NotificationService::new(common::create_test_config_handle(), bus.clone());
    notifications.init().unwrap();

    bus.emit(AppEvent::JobCompleted {
        job_id: "srv-job-9".into(),
        meeting_id: 7,
    });
    bus.emit(AppEvent::JobFailed {
        job_id: "srv-job-10".into(),
        meeting_id: 7,
        error: "transcript was empty".into(),
    });
    bus.emit(AppEvent::SessionExpired);

    // The bridge task drains the bus on its own schedule.
    for _ in 0..200 {
        if notifications.delivered_count() == 3 {
            break;
        }
        tokio::time::sleep(Duration::from_millis(5)).await;
    }
    assert_eq!(notifications.delivered_count(), 3);

    notifications.shutdown().unwrap();
}

#[tokio::test]
async fn e2e_disabled_job_notifications_are_skipped() {
    let mut cfg = od_core::config::AppConfig::default();
    cfg.notifications.notify_job_events = false;
    let config = od_core::config::ConfigHandle::new(cfg);

    let bus = common::create_test_event_bus();
    let mut notifications = NotificationService::new(config, bus.clone());
    notifications.init().unwrap();

    bus.emit(AppEvent::JobCompleted {
        job_id: "srv-job-11".into(),
        meeting_id: 8,
    });
    // SessionExpired is still on, so the bridge having handled it proves
    // the job event before it was gated rather than still queued.
    bus.emit(AppEvent::SessionExpired);

    for _ in 0..200 {
        if notifications.delivered_count() >= 1 {
            break;
        }
        tokio::time::sleep(Duration::from_millis(5)).await;
    }
    assert_eq!(notifications.delivered_count(), 1);

    notifications.shutdown().unwrap();
}
