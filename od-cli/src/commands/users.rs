//! User commands.

use std::sync::Arc;

use clap::Subcommand;
use comfy_table::{modifiers::UTF8_ROUND_CORNERS, presets::UTF8_FULL, ContentArrangement, Table};
use console::style;

use od_core::config::ConfigHandle;
use od_core::error::OdResult;
use od_models::UserPayload;
use crate::OutputFormat;

#[derive(Subcommand)]
pub enum UsersAction {
    /// List all users.
    List {
        /// Filter by a case-insensitive substring of name or email.
        #[arg(short, long)]
        search: Option<String>,
    },
    /// Get details for a specific user.
    Get {
        /// User id.
        id: i64,
    },
    /// Create a new user.
    Create {
        #[arg(long)]
        email: String,
        #[arg(long)]
        password: String,
        #[arg(long)]
        first_name: String,
        #[arg(long)]
        last_name: String,
        /// Phone in international format, e.g. +15551234567.
        #[arg(long)]
        phone: String,
        #[arg(long)]
        team_id: i64,
        #[arg(long)]
        role_id: Option<i64>,
        #[arg(long)]
        status_id: Option<i64>,
    },
    /// Update an existing user.
    Update {
        /// User id.
        id: i64,
        #[arg(long)]
        email: String,
        /// New password; omit to keep the current one.
        #[arg(long)]
        password: Option<String>,
        #[arg(long)]
        first_name: String,
        #[arg(long)]
        last_name: String,
        #[arg(long)]
        phone: String,
        #[arg(long)]
        team_id: i64,
        #[arg(long)]
        role_id: Option<i64>,
        #[arg(long)]
        status_id: Option<i64>,
    },
    /// Delete a user.
    Delete {
        /// User id.
        id: i64,
    },
}

pub async fn run(config: ConfigHandle, action: UsersAction, format: OutputFormat) -> OdResult<()> {
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
    action: UsersAction,
    format: OutputFormat,
) -> OdResult<()> {
    match action {
        UsersAction::List { search } => {
            let mut users = api.list_users().await?;
            if let Some(ref term) = search {
                let needle = term.to_lowercase();
                users.retain(|u| {
                    u.full_name().to_lowercase().contains(&needle)
                        || u.email.to_lowercase().contains(&needle)
                });
            }

            match format {
                OutputFormat::Json => {
                    println!("{}", serde_json::to_string_pretty(&users).unwrap_or_default());
                }
                OutputFormat::Text => {
                    if users.is_empty() {
                        println!("No users found.");
                        return Ok(());
                    }

                    let mut table = Table::new();
                    table
                        .load_preset(UTF8_FULL)
                        .apply_modifier(UTF8_ROUND_CORNERS)
                        .set_content_arrangement(ContentArrangement::Dynamic);
                    table.set_header(vec!["Id", "Name", "Email", "Phone", "Role", "Team"]);

                    for u in &users {
                        table.add_row(vec![
                            u.id.map(|id| id.to_string()).unwrap_or_else(|| "-".into()),
                            super::truncate(&u.full_name(), 30),
                            u.email.clone(),
                            u.phone_number.clone().unwrap_or_else(|| "-".into()),
                            u.role_name().unwrap_or("-").to_string(),
                            u.team
                                .as_ref()
                                .and_then(|t| t.name.clone())
                                .unwrap_or_else(|| "-".into()),
                        ]);
                    }

                    println!("{table}");
                    println!("\n{} user(s)", users.len());
                }
            }
        }
        UsersAction::Get { id } => {
            let user = api.get_user(id).await?;
            match format {
                OutputFormat::Json => {
                    println!("{}", serde_json::to_string_pretty(&user).unwrap_or_default());
                }
                OutputFormat::Text => {
                    println!("{}", style("User Details").bold().underlined());
                    println!("  Name:   {}", user.full_name());
                    println!("  Email:  {}", user.email);
                    if let Some(ref phone) = user.phone_number {
                        println!("  Phone:  {phone}");
                    }
                    println!("  Role:   {}", user.role_name().unwrap_or("-"));
                    if let Some(ref team) = user.team {
                        println!(
                            "  Team:   {} ({})",
                            team.name.as_deref().unwrap_or("-"),
                            team.code.as_deref().unwrap_or("-")
                        );
                    }
                }
            }
        }
        UsersAction::Create {
            email,
            password,
            first_name,
            last_name,
            phone,
            team_id,
            role_id,
            status_id,
        } => {
            let payload = UserPayload {
                email,
                password: Some(password),
                first_name,
                last_name,
                phone_number: phone,
                team_id,
                role_id,
                status_id,
            };
            let user = api.create_user(&payload).await?;
            println!(
                "{} Created user {} ({})",
                style("OK").green().bold(),
                user.full_name(),
                user.email
            );
        }
        UsersAction::Update {
            id,
            email,
            password,
            first_name,
            last_name,
            phone,
            team_id,
            role_id,
            status_id,
        } => {
            let payload = UserPayload {
                email,
                password,
                first_name,
                last_name,
                phone_number: phone,
                team_id,
                role_id,
                status_id,
            };
            let user = api.update_user(id, &payload).await?;
            println!(
                "{} Updated user {} ({})",
                style("OK").green().bold(),
                user.full_name(),
                user.email
            );
        }
        UsersAction::Delete { id } => {
            api.delete_user(id).await?;
            println!("{} Deleted user {id}", style("OK").green().bold());
        }
    }

    Ok(())
}
