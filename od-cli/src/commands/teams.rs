//! Team commands.

use std::sync::Arc;

use clap::Subcommand;
use comfy_table::{modifiers::UTF8_ROUND_CORNERS, presets::UTF8_FULL, ContentArrangement, Table};
use console::style;

use od_core::config::ConfigHandle;
use od_core::error::OdResult;
use od_models::TeamPayload;
use crate::OutputFormat;

#[derive(Subcommand)]
pub enum TeamsAction {
    /// List all teams.
    List {
        /// Only show active teams.
        #[arg(long)]
        active: bool,
    },
    /// Get details for a specific team.
    Get {
        /// Team id.
        id: i64,
    },
    /// Create a new team.
    Create {
        #[arg(long)]
        name: String,
        #[arg(long)]
        description: String,
        #[arg(long)]
        code: String,
        /// Create the team as inactive.
        #[arg(long)]
        inactive: bool,
    },
    /// Update an existing team.
    Update {
        /// Team id.
        id: i64,
        #[arg(long)]
        name: String,
        #[arg(long)]
        description: String,
        #[arg(long)]
        code: String,
        #[arg(long)]
        inactive: bool,
    },
    /// Delete a team.
    Delete {
        /// Team id.
        id: i64,
    },
}

pub async fn run(config: ConfigHandle, action: TeamsAction, format: OutputFormat) -> OdResult<()> {
    let (db, session) = super::open_session(&config).await?;
    session.require_session().await?;
    let api = super::create_api_client(&config, Arc::clone(session.tokens())).await?;
    session.ensure_fresh(&api).await?;

    let result = dispatch(&api, action, format).await;
    super::flush_session(&db, session.tokens()).await?;
    result
}

async fn dispatch(
    api: &od_api::ApiClient,
    action: TeamsAction,
    format: OutputFormat,
) -> OdResult<()> {
    match action {
        TeamsAction::List { active } => {
            let mut teams = api.list_teams().await?;
            if active {
                teams.retain(|t| t.is_active);
            }

            match format {
                OutputFormat::Json => {
                    println!("{}", serde_json::to_string_pretty(&teams).unwrap_or_default());
                }
                OutputFormat::Text => {
                    if teams.is_empty() {
                        println!("No teams found.");
                        return Ok(());
                    }

                    let mut table = Table::new();
                    table
                        .load_preset(UTF8_FULL)
                        .apply_modifier(UTF8_ROUND_CORNERS)
                        .set_content_arrangement(ContentArrangement::Dynamic);
                    table.set_header(vec!["Id", "Name", "Code", "Description", "Active", "Members"]);

                    for t in &teams {
                        table.add_row(vec![
                            t.id.to_string(),
                            super::truncate(&t.name, 30),
                            t.code.clone(),
                            super::truncate(&t.description, 40),
                            if t.is_active { "yes" } else { "no" }.to_string(),
                            t.members.len().to_string(),
                        ]);
                    }

                    println!("{table}");
                    println!("\n{} team(s)", teams.len());
                }
            }
        }
        TeamsAction::Get { id } => {
            let team = api.get_team(id).await?;
            match format {
                OutputFormat::Json => {
                    println!("{}", serde_json::to_string_pretty(&team).unwrap_or_default());
                }
                OutputFormat::Text => {
                    println!("{}", style("Team Details").bold().underlined());
                    println!("  Id:          {}", team.id);
                    println!("  Name:        {}", team.name);
                    println!("  Code:        {}", team.code);
                    println!("  Description: {}", team.description);
                    println!("  Active:      {}", if team.is_active { "yes" } else { "no" });
                    if let Some(ref created) = team.created_at {
                        println!("  Created:     {created}");
                    }

                    if !team.members.is_empty() {
                        println!();
                        println!("{}", style("Members").bold().underlined());
                        for m in &team.members {
                            let role = m
                                .role
                                .as_ref()
                                .and_then(|r| r.name.as_deref())
                                .unwrap_or("-");
                            println!("  - {} ({role})", m.full_name());
                        }
                    }
                }
            }
        }
        TeamsAction::Create {
            name,
            description,
            code,
            inactive,
        } => {
            let payload = TeamPayload {
                name,
                description,
                code,
                is_active: !inactive,
            };
            let team = api.create_team(&payload).await?;
            println!(
                "{} Created team {} (id {})",
                style("OK").green().bold(),
                team.name,
                team.id
            );
        }
        TeamsAction::Update {
            id,
            name,
            description,
            code,
            inactive,
        } => {
            let payload = TeamPayload {
                name,
                description,
                code,
                is_active: !inactive,
            };
            let team = api.update_team(id, &payload).await?;
            println!(
                "{} Updated team {} (id {})",
                style("OK").green().bold(),
                team.name,
                team.id
            );
        }
        TeamsAction::Delete { id } => {
            api.delete_team(id).await?;
            println!("{} Deleted team {id}", style("OK").green().bold());
        }
    }

    Ok(())
}
