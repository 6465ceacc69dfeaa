//! Local store management commands.

use clap::Subcommand;
use comfy_table::{modifiers::UTF8_ROUND_CORNERS, presets::UTF8_FULL, ContentArrangement, Table};
use console::style;
use dialoguer::Confirm;

use od_core::config::ConfigHandle;
use od_core::error::OdResult;
use od_models::store;
use crate::OutputFormat;

#[derive(Subcommand)]
pub enum DbAction {
    /// Show store statistics.
    Stats,
    /// Run an integrity check.
    Check,
    /// Reset the store (WARNING: destroys all local data).
    Reset,
    /// Remove finished transcript jobs older than the given age.
    Prune {
        /// Only remove jobs older than this many days.
        #[arg(long, default_value = "7")]
        older_than_days: u32,
    },
    /// Show the store file path.
    Path,
}

pub async fn run(config: ConfigHandle, action: DbAction, format: OutputFormat) -> OdResult<()> {
    let db_path = config.read().await.effective_store_path()?;

    match action {
        DbAction::Stats => {
            let db = super::init_database(&config).await?;
            let stats = db.stats()?;

            let file_size = std::fs::metadata(&db_path).ok().map(|m| m.len());

            // WAL and SHM sidecar files, present when WAL mode is on
            let wal_path = db_path.with_extension("db-wal");
            let wal_size = std::fs::metadata(&wal_path).ok().map(|m| m.len());
            let shm_path = db_path.with_extension("db-shm");
            let shm_size = std::fs::metadata(&shm_path).ok().map(|m| m.len());

            let conn = db.conn()?;
            let journal_mode: String = conn
                .query_row("PRAGMA journal_mode", [], |row| row.get(0))
                .unwrap_or_else(|_| "unknown".to_string());

            let page_size: i64 = conn
                .query_row("PRAGMA page_size", [], |row| row.get(0))
                .unwrap_or(0);

            let page_count: i64 = conn
                .query_row("PRAGMA page_count", [], |row| row.get(0))
                .unwrap_or(0);

            let freelist_count: i64 = conn
                .query_row("PRAGMA freelist_count", [], |row| row.get(0))
                .unwrap_or(0);

            match format {
                OutputFormat::Json => {
                    println!("{}", serde_json::json!({
                        "path": db_path.display().to_string(),
                        "tables": {
                            "sessions": stats.sessions,
                            "parse_jobs": stats.parse_jobs,
                            "assistant_exchanges": stats.assistant_exchanges,
                        },
                        "file_size_bytes": file_size,
                        "wal_size_bytes": wal_size,
                        "journal_mode": journal_mode,
                        "page_size": page_size,
                        "page_count": page_count,
                        "freelist_count": freelist_count,
                    }));
                }
                OutputFormat::Text => {
                    println!("{}", style("Store Statistics").bold().underlined());
                    println!("  Path:          {}", db_path.display());
                    println!("  Journal mode:  {}", journal_mode);
                    println!();

                    let mut table = Table::new();
                    table
                        .load_preset(UTF8_FULL)
                        .apply_modifier(UTF8_ROUND_CORNERS)
                        .set_content_arrangement(ContentArrangement::Dynamic);

                    table.set_header(vec!["Table", "Row Count"]);
                    table.add_row(vec!["sessions".to_string(), stats.sessions.to_string()]);
                    table.add_row(vec!["parse_jobs".to_string(), stats.parse_jobs.to_string()]);
                    table.add_row(vec![
                        "assistant_exchanges".to_string(),
                        stats.assistant_exchanges.to_string(),
                    ]);

                    println!("{table}");

                    println!();
                    println!("{}", style("Storage").bold().underlined());
                    if let Some(size) = file_size {
                        println!("  Store file:    {}", super::format_bytes(size));
                    }
                    if let Some(size) = wal_size {
                        println!("  WAL file:      {}", super::format_bytes(size));
                    }
                    if let Some(size) = shm_size {
                        println!("  SHM file:      {}", super::format_bytes(size));
                    }
                    let total_size =
                        file_size.unwrap_or(0) + wal_size.unwrap_or(0) + shm_size.unwrap_or(0);
                    if total_size > 0 {
                        println!("  Total:         {}", super::format_bytes(total_size));
                    }

                    println!();
                    println!("{}", style("Internals").bold().underlined());
                    println!("  Page size:     {} bytes", page_size);
                    println!("  Page count:    {}", page_count);
                    println!("  Free pages:    {}", freelist_count);
                    if freelist_count > 0 {
                        let wasted = freelist_count * page_size;
                        println!(
                            "  Reclaimable:   {} (run VACUUM to reclaim)",
                            super::format_bytes(wasted as u64)
                        );
                    }
                }
            }
        }
        DbAction::Check => {
            println!("  {} Running integrity check...", style("...").dim());
            let db = super::init_database(&config).await?;

            let conn = db.conn()?;
            let quick_result: String = conn
                .query_row("PRAGMA quick_check", [], |row| row.get(0))
                .unwrap_or_else(|_| "error".to_string());

            if quick_result == "ok" {
                println!("  {} Quick check passed.", style("OK").green().bold());
            } else {
                println!(
                    "  {} Quick check issue: {}",
                    style("WARN").yellow().bold(),
                    quick_result
                );
            }

            match db.run_integrity_check() {
                Ok(()) => {
                    println!(
                        "  {} Full integrity check passed.",
                        style("OK").green().bold()
                    );
                }
                Err(e) => {
                    println!(
                        "  {} Integrity check failed: {}",
                        style("FAIL").red().bold(),
                        e
                    );
                }
            }
        }
        DbAction::Reset => {
            println!(
                "  {} This will delete ALL local data: the saved session, tracked jobs and assistant history.",
                style("WARNING").red().bold()
            );
            println!("  Store: {}", db_path.display());

            let confirmed = Confirm::new()
                .with_prompt("  Are you sure you want to reset the store?")
                .default(false)
                .interact()
                .unwrap_or(false);

            if !confirmed {
                println!("  Reset cancelled.");
                return Ok(());
            }

            let db = super::init_database(&config).await?;
            db.reset()?;
            println!("  {} Store reset complete.", style("OK").green().bold());
        }
        DbAction::Prune { older_than_days } => {
            let db = super::init_database(&config).await?;
            let age_ms = i64::from(older_than_days) * 24 * 60 * 60 * 1000;
            let cutoff = chrono::Utc::now().timestamp_millis() - age_ms;
            let conn = db.conn()?;
            let removed = store::prune_finished_jobs(&conn, cutoff)?;

            match format {
                OutputFormat::Json => {
                    println!(
                        "{}",
                        serde_json::json!({ "removed": removed, "older_than_days": older_than_days })
                    );
                }
                OutputFormat::Text => {
                    println!(
                        "  {} Removed {} finished job(s) older than {} day(s).",
                        style("OK").green().bold(),
                        removed,
                        older_than_days
                    );
                }
            }
        }
        DbAction::Path => match format {
            OutputFormat::Json => {
                println!("{}", serde_json::json!({"path": db_path.display().to_string()}));
            }
            OutputFormat::Text => {
                println!("{}", db_path.display());
            }
        },
    }

    Ok(())
}
