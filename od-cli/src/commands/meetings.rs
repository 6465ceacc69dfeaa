//! Meeting commands, including transcript-parse job tracking.

use std::sync::Arc;
use std::time::Duration;

use clap::Subcommand;
use comfy_table::{modifiers::UTF8_ROUND_CORNERS, presets::UTF8_FULL, ContentArrangement, Table};
use console::style;
use indicatif::{ProgressBar, ProgressStyle};

use od_core::config::ConfigHandle;
use od_core::error::OdResult;
use od_models::{store, MeetingPayload};
use od_services::{AppEvent, EventBus, JobPollerService, NotificationService, Service};
use crate::OutputFormat;

#[derive(Subcommand)]
pub enum MeetingsAction {
    /// List all meetings.
    List {
        /// Filter by status (scheduled, completed, cancelled).
        #[arg(short, long)]
        status: Option<String>,
    },
    /// Get details for a specific meeting.
    Get {
        /// Meeting id.
        id: i64,
    },
    /// Create a new meeting.
    Create {
        #[arg(long)]
        title: String,
        #[arg(long)]
        description: String,
        /// Google Meet id (lowercase letters, digits, dashes).
        #[arg(long)]
        meet_id: String,
        #[arg(long)]
        team_id: i64,
        #[arg(long)]
        organizer_id: i64,
        /// ISO-8601 start time.
        #[arg(long)]
        start: String,
        /// ISO-8601 end time.
        #[arg(long)]
        end: String,
    },
    /// Update an existing meeting.
    Update {
        /// Meeting id.
        id: i64,
        #[arg(long)]
        title: String,
        #[arg(long)]
        description: String,
        #[arg(long)]
        meet_id: String,
        #[arg(long)]
        team_id: i64,
        #[arg(long)]
        organizer_id: i64,
        #[arg(long)]
        start: String,
        #[arg(long)]
        end: String,
        #[arg(long)]
        status: Option<String>,
    },
    /// Delete a meeting.
    Delete {
        /// Meeting id.
        id: i64,
    },
    /// Start parsing a meeting's transcript.
    Parse {
        /// Meeting id.
        id: i64,
        /// Stay attached and poll until the job finishes.
        #[arg(short, long)]
        watch: bool,
    },
    /// Check the status of a transcript-parse job.
    ParseStatus {
        /// Meeting id.
        id: i64,
        /// Backend job id.
        job_id: String,
    },
    /// List locally tracked parse jobs.
    Jobs {
        /// Also show finished jobs.
        #[arg(long)]
        all: bool,
    },
    /// Resume polling all tracked jobs until they finish.
    Watch,
}

pub async fn run(
    config: ConfigHandle,
    action: MeetingsAction,
    format: OutputFormat,
) -> OdResult<()> {
    // The local job list never needs a live session.
    if let MeetingsAction::Jobs { all } = action {
        let db = super::init_database(&config).await?;
        return list_jobs(&db, all, format);
    }

    let (db, session) = super::open_session(&config).await?;
    session.require_session().await?;
    let api = super::create_api_client(&config, Arc::clone(session.tokens())).await?;
    session.ensure_fresh(&api).await?;

    let result = dispatch(&config, &db, &api, action, format).await;
    super::flush_session(&db, session.tokens()).await?;
    result
}

async fn dispatch(
    config: &ConfigHandle,
    db: &od_models::Database,
    api: &od_api::ApiClient,
    action: MeetingsAction,
    format: OutputFormat,
) -> OdResult<()> {
    match action {
        MeetingsAction::List { status } => {
            let mut meetings = api.list_meetings().await?;
            if let Some(ref wanted) = status {
                meetings.retain(|m| {
                    m.status
                        .as_deref()
                        .map(|s| s.eq_ignore_ascii_case(wanted))
                        .unwrap_or(false)
                });
            }

            match format {
                OutputFormat::Json => {
                    println!("{}", serde_json::to_string_pretty(&meetings).unwrap_or_default());
                }
                OutputFormat::Text => {
                    if meetings.is_empty() {
                        println!("No meetings found.");
                        return Ok(());
                    }

                    let mut table = Table::new();
                    table
                        .load_preset(UTF8_FULL)
                        .apply_modifier(UTF8_ROUND_CORNERS)
                        .set_content_arrangement(ContentArrangement::Dynamic);
                    table.set_header(vec!["Id", "Title", "Start", "Status", "Team", "Organizer"]);

                    for m in &meetings {
                        table.add_row(vec![
                            m.id.map(|id| id.to_string()).unwrap_or_else(|| "-".into()),
                            super::truncate(&m.title, 35),
                            m.start_time.clone().unwrap_or_else(|| "-".into()),
                            m.status.clone().unwrap_or_else(|| "-".into()),
                            m.team
                                .as_ref()
                                .map(|t| t.name.clone())
                                .unwrap_or_else(|| "-".into()),
                            m.organizer
                                .as_ref()
                                .map(|o| o.full_name())
                                .unwrap_or_else(|| "-".into()),
                        ]);
                    }

                    println!("{table}");
                    println!("\n{} meeting(s)", meetings.len());
                }
            }
        }
        MeetingsAction::Get { id } => {
            let m = api.get_meeting(id).await?;
            match format {
                OutputFormat::Json => {
                    println!("{}", serde_json::to_string_pretty(&m).unwrap_or_default());
                }
                OutputFormat::Text => {
                    println!("{}", style("Meeting Details").bold().underlined());
                    println!("  Title:       {}", m.title);
                    println!("  Description: {}", m.description);
                    if let Some(ref meet_id) = m.google_meet_id {
                        println!("  Meet id:     {meet_id}");
                    }
                    println!("  Start:       {}", m.start_time.as_deref().unwrap_or("-"));
                    println!("  End:         {}", m.end_time.as_deref().unwrap_or("-"));
                    println!("  Status:      {}", m.status.as_deref().unwrap_or("-"));
                    if let Some(ref team) = m.team {
                        println!("  Team:        {}", team.name);
                    }
                    if let Some(ref organizer) = m.organizer {
                        println!("  Organizer:   {}", organizer.full_name());
                    }
                    if let Some(ref url) = m.recording_url {
                        println!("  Recording:   {url}");
                    }
                }
            }
        }
        MeetingsAction::Create {
            title,
            description,
            meet_id,
            team_id,
            organizer_id,
            start,
            end,
        } => {
            let payload = MeetingPayload {
                title,
                description,
                google_meet_id: meet_id,
                team_id,
                organizer_id,
                start_time: start,
                end_time: end,
                status: None,
                meeting_type: None,
            };
            let m = api.create_meeting(&payload).await?;
            println!(
                "{} Created meeting \"{}\" (id {})",
                style("OK").green().bold(),
                m.title,
                m.id.unwrap_or_default()
            );
        }
        MeetingsAction::Update {
            id,
            title,
            description,
            meet_id,
            team_id,
            organizer_id,
            start,
            end,
            status,
        } => {
            let payload = MeetingPayload {
                title,
                description,
                google_meet_id: meet_id,
                team_id,
                organizer_id,
                start_time: start,
                end_time: end,
                status,
                meeting_type: None,
            };
            let m = api.update_meeting(id, &payload).await?;
            println!(
                "{} Updated meeting \"{}\" (id {id})",
                style("OK").green().bold(),
                m.title
            );
        }
        MeetingsAction::Delete { id } => {
            api.delete_meeting(id).await?;
            println!("{} Deleted meeting {id}", style("OK").green().bold());
        }
        MeetingsAction::Parse { id, watch } => {
            let started = api.start_transcript_parse(id).await?;
            println!(
                "{} Parse started for meeting {id} (job {})",
                style("OK").green().bold(),
                started.job_id
            );

            if watch {
                watch_jobs(config, db, api, Some((id, started.job_id))).await?;
            } else {
                println!(
                    "Track it with `opsdeck meetings parse-status {id} {}` or `opsdeck meetings watch`.",
                    started.job_id
                );
                // Record the job locally so `watch` can resume it later.
                let now = chrono::Utc::now().timestamp_millis();
                let conn = db.conn()?;
                store::upsert_job(
                    &conn,
                    &od_models::ParseJob {
                        id: uuid::Uuid::new_v4().to_string(),
                        meeting_id: id,
                        job_id: started.job_id.clone(),
                        status: od_core::constants::job_status::PENDING.to_string(),
                        created_at: now,
                        updated_at: now,
                    },
                )?;
            }
        }
        MeetingsAction::ParseStatus { id, job_id } => {
            let status = api.transcript_parse_status(id, &job_id).await?;
            match format {
                OutputFormat::Json => {
                    println!("{}", serde_json::to_string_pretty(&status).unwrap_or_default());
                }
                OutputFormat::Text => {
                    println!("  Job:    {}", status.job_id);
                    println!("  Status: {}", render_status(&status.status));
                    if let Some(ref error) = status.error {
                        println!("  Error:  {error}");
                    }
                }
            }
        }
        MeetingsAction::Jobs { .. } => unreachable!("handled before session setup"),
        MeetingsAction::Watch => {
            watch_jobs(config, db, api, None).await?;
        }
    }

    Ok(())
}

/// Poll tracked jobs until they all finish (or Ctrl+C).
///
/// When `track_first` is set, that job is tracked before resuming, so
/// `parse --watch` and plain `watch` share one loop.
async fn watch_jobs(
    config: &ConfigHandle,
    db: &od_models::Database,
    api: &od_api::ApiClient,
    track_first: Option<(i64, String)>,
) -> OdResult<()> {
    let interval = config.read().await.polling.interval_secs;
    let bus = EventBus::new(64);
    let mut rx = bus.subscribe();

    // Desktop notifications for completions while the user is tabbed away
    let mut notifications = NotificationService::new(config.clone(), bus.clone());
    notifications.init()?;

    let mut poller = JobPollerService::new(
        db.clone(),
        bus,
        Arc::new(api.clone()),
        Duration::from_secs(interval),
    );
    poller.init()?;

    if let Some((meeting_id, job_id)) = track_first {
        poller.track(meeting_id, &job_id).await?;
    }
    poller.resume().await?;

    if poller.active_polls() == 0 {
        println!("No tracked jobs to watch.");
        notifications.shutdown()?;
        return Ok(());
    }

    let spinner = ProgressBar::new_spinner();
    spinner.set_style(
        ProgressStyle::with_template("{spinner} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner()),
    );
    spinner.enable_steady_tick(Duration::from_millis(120));
    spinner.set_message(format!(
        "watching {} job(s), polling every {interval}s (Ctrl+C to detach)",
        poller.active_polls()
    ));

    loop {
        tokio::select! {
            event = rx.recv() => {
                match event {
                    Ok(AppEvent::JobCompleted { job_id, meeting_id }) => {
                        spinner.println(format!(
                            "{} Job {job_id} for meeting {meeting_id} completed",
                            style("OK").green().bold()
                        ));
                    }
                    Ok(AppEvent::JobFailed { job_id, meeting_id, error }) => {
                        spinner.println(format!(
                            "{} Job {job_id} for meeting {meeting_id} failed: {error}",
                            style("FAIL").red().bold()
                        ));
                    }
                    Ok(_) => {}
                    Err(_) => break,
                }
                if poller.active_polls() == 0 {
                    break;
                }
                spinner.set_message(format!(
                    "watching {} job(s), polling every {interval}s (Ctrl+C to detach)",
                    poller.active_polls()
                ));
            }
            _ = tokio::signal::ctrl_c() => {
                spinner.println("Detached; jobs stay tracked and resume with `opsdeck meetings watch`.");
                break;
            }
        }
    }

    spinner.finish_and_clear();
    poller.shutdown()?;
    notifications.shutdown()?;
    Ok(())
}

fn list_jobs(db: &od_models::Database, all: bool, format: OutputFormat) -> OdResult<()> {
    let conn = db.conn()?;
    let jobs = if all {
        store::all_jobs(&conn)?
    } else {
        store::active_jobs(&conn)?
    };

    match format {
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(&jobs).unwrap_or_default());
        }
        OutputFormat::Text => {
            if jobs.is_empty() {
                println!("No tracked parse jobs.");
                return Ok(());
            }

            let mut table = Table::new();
            table
                .load_preset(UTF8_FULL)
                .apply_modifier(UTF8_ROUND_CORNERS)
                .set_content_arrangement(ContentArrangement::Dynamic);
            table.set_header(vec!["Job", "Meeting", "Status", "Tracked"]);

            for job in &jobs {
                let tracked = chrono::DateTime::from_timestamp_millis(job.created_at)
                    .map(|dt| dt.format("%Y-%m-%d %H:%M").to_string())
                    .unwrap_or_else(|| "-".into());
                table.add_row(vec![
                    job.job_id.clone(),
                    job.meeting_id.to_string(),
                    render_status(&job.status),
                    tracked,
                ]);
            }

            println!("{table}");
        }
    }

    Ok(())
}

fn render_status(status: &str) -> String {
    match status {
        "completed" => style(status).green().to_string(),
        "failed" => style(status).red().to_string(),
        "processing" => style(status).yellow().to_string(),
        _ => status.to_string(),
    }
}
