//! Transcript-parse job polling service.
//!
//! The browser app polled each started parse job on a fixed 5-second timer
//! and kept the job ids in local storage so a reload resumed polling. The
//! service keeps that shape: tracked jobs live in the local store, each job
//! gets its own fixed-interval poll task, and tasks stop on a terminal
//! status or service shutdown.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use chrono::Utc;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};
use uuid::Uuid;

use od_api::ApiClient;
use od_core::constants::job_status;
use od_core::error::OdResult;
use od_models::store;
use od_models::{Database, ParseJob};

use crate::event_bus::{AppEvent, EventBus};
use crate::service::{Service, ServiceState};

/// Status snapshot for a polled job.
#[derive(Debug, Clone)]
pub struct JobStatus {
    pub status: String,
    pub error: Option<String>,
}

/// Where job statuses come from.
///
/// Split out as a trait so poll timing can be exercised without a network.
#[async_trait]
pub trait JobStatusSource: Send + Sync + 'static {
    async fn status(&self, meeting_id: i64, job_id: &str) -> OdResult<JobStatus>;
}

#[async_trait]
impl JobStatusSource for ApiClient {
    async fn status(&self, meeting_id: i64, job_id: &str) -> OdResult<JobStatus> {
        let resp = self.transcript_parse_status(meeting_id, job_id).await?;
        Ok(JobStatus {
            status: resp.status,
            error: resp.error,
        })
    }
}

/// Service polling tracked transcript-parse jobs at a fixed interval.
pub struct JobPollerService {
    state: ServiceState,
    db: Database,
    bus: EventBus,
    source: Arc<dyn JobStatusSource>,
    interval: Duration,
    tasks: Arc<Mutex<HashMap<String, JoinHandle<()>>>>,
}

impl JobPollerService {
    pub fn new(
        db: Database,
        bus: EventBus,
        source: Arc<dyn JobStatusSource>,
        interval: Duration,
    ) -> Self {
        Self {
            state: ServiceState::Created,
            db,
            bus,
            source,
            interval,
            tasks: Arc::new(Mutex::new(HashMap::new())),
        }
    }

    /// Start tracking a backend job and begin polling it.
    pub async fn track(&self, meeting_id: i64, job_id: &str) -> OdResult<ParseJob> {
        let now = Utc::now().timestamp_millis();
        let job = ParseJob {
            id: Uuid::new_v4().to_string(),
            meeting_id,
            job_id: job_id.to_string(),
            status: job_status::PENDING.to_string(),
            created_at: now,
            updated_at: now,
        };

        {
            let conn = self.db.conn()?;
            store::upsert_job(&conn, &job)?;
        }

        self.bus.emit(AppEvent::JobTracked {
            job_id: job.job_id.clone(),
            meeting_id,
        });
        self.spawn_poll(job.clone());
        info!("tracking parse job {} for meeting {meeting_id}", job.job_id);
        Ok(job)
    }

    /// Resume polling for every non-terminal job in the store.
    pub async fn resume(&self) -> OdResult<usize> {
        let jobs = {
            let conn = self.db.conn()?;
            store::active_jobs(&conn)?
        };

        let count = jobs.len();
        for job in jobs {
            debug!("resuming poll for job {}", job.job_id);
            self.spawn_poll(job);
        }
        if count > 0 {
            info!("resumed polling for {count} tracked job(s)");
        }
        Ok(count)
    }

    /// Stop polling a job without touching its stored status.
    pub fn stop(&self, local_id: &str) {
        if let Ok(mut tasks) = self.tasks.lock() {
            if let Some(handle) = tasks.remove(local_id) {
                handle.abort();
            }
        }
    }

    /// Number of jobs currently being polled.
    pub fn active_polls(&self) -> usize {
        self.tasks.lock().map(|t| t.len()).unwrap_or(0)
    }

    fn spawn_poll(&self, mut job: ParseJob) {
        let db = self.db.clone();
        let bus = self.bus.clone();
        let source = Arc::clone(&self.source);
        let tasks = Arc::clone(&self.tasks);
        let interval = self.interval;
        let local_id = job.id.clone();

        let handle = tokio::spawn(async move {
            let mut ticker = tokio::time::interval(interval);
            // The first tick fires immediately; skip it so polls are
            // spaced a full interval from tracking time.
            ticker.tick().await;

            loop {
                ticker.tick().await;

                let snapshot = match source.status(job.meeting_id, &job.job_id).await {
                    Ok(snapshot) => snapshot,
                    Err(e) if e.is_auth_fatal() => {
                        warn!("stopping poll for job {}: {e}", job.job_id);
                        break;
                    }
                    Err(e) => {
                        // Transient failure: keep the fixed cadence.
                        warn!("poll failed for job {}: {e}", job.job_id);
                        continue;
                    }
                };

                if snapshot.status != job.status {
                    job.status = snapshot.status.clone();
                    match db.conn() {
                        Ok(conn) => {
                            if let Err(e) = store::set_job_status(&conn, &job.id, &job.status) {
                                warn!("failed to persist job status: {e}");
                            }
                        }
                        Err(e) => warn!("failed to persist job status: {e}"),
                    }
                }

                if job_status::is_terminal(&snapshot.status) {
                    if snapshot.status == job_status::COMPLETED {
                        bus.emit(AppEvent::JobCompleted {
                            job_id: job.job_id.clone(),
                            meeting_id: job.meeting_id,
                        });
                    } else {
                        bus.emit(AppEvent::JobFailed {
                            job_id: job.job_id.clone(),
                            meeting_id: job.meeting_id,
                            error: snapshot.error.unwrap_or_else(|| "parse failed".into()),
                        });
                    }
                    break;
                }
            }

            if let Ok(mut tasks) = tasks.lock() {
                tasks.remove(&job.id);
            }
        });

        if let Ok(mut tasks) = self.tasks.lock() {
            tasks.insert(local_id, handle);
        }
    }
}

impl Service for JobPollerService {
    fn name(&self) -> &str {
        "jobs"
    }

    fn state(&self) -> ServiceState {
        self.state
    }

    fn init(&mut self) -> OdResult<()> {
        self.state = ServiceState::Running;
        info!("job poller initialized (interval {:?})", self.interval);
        Ok(())
    }

    fn shutdown(&mut self) -> OdResult<()> {
        if let Ok(mut tasks) = self.tasks.lock() {
            for (_, handle) in tasks.drain() {
                handle.abort();
            }
        }
        self.state = ServiceState::Stopped;
        Ok(())
    }
}
