//! WhatsApp message commands (read-only).

use std::sync::Arc;

use clap::Subcommand;
use comfy_table::{modifiers::UTF8_ROUND_CORNERS, presets::UTF8_FULL, ContentArrangement, Table};
use console::style;

use od_api::WhatsappFilter;
use od_core::config::ConfigHandle;
use od_core::error::OdResult;
use crate::OutputFormat;

#[derive(Subcommand)]
pub enum WhatsappAction {
    /// List messages, newest as the backend returns them.
    List {
        /// Case-insensitive search over content, sender, and group name.
        #[arg(short, long)]
        search: Option<String>,
        /// Filter by delivery status (received, sent, read...).
        #[arg(long)]
        status: Option<String>,
        /// Only group messages.
        #[arg(long)]
        group: bool,
        /// Only direct messages.
        #[arg(long)]
        direct: bool,
        /// Only messages the analysis flagged (actions/questions/decisions).
        #[arg(long)]
        flagged: bool,
    },
    /// Show one message in full.
    Get {
        /// Message id.
        id: i64,
    },
}

pub async fn run(
    config: ConfigHandle,
    action: WhatsappAction,
    format: OutputFormat,
) -> OdResult<()> {
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
    action: WhatsappAction,
    format: OutputFormat,
) -> OdResult<()> {
    match action {
        WhatsappAction::List {
            search,
            status,
            group,
            direct,
            flagged,
        } => {
            let filter = WhatsappFilter {
                search,
                status,
                group: match (group, direct) {
                    (true, false) => Some(true),
                    (false, true) => Some(false),
                    _ => None,
                },
            };
            let mut messages = api.filtered_whatsapp_messages(&filter).await?;
            if flagged {
                messages.retain(|m| m.has_flags());
            }

            match format {
                OutputFormat::Json => {
                    println!("{}", serde_json::to_string_pretty(&messages).unwrap_or_default());
                }
                OutputFormat::Text => {
                    if messages.is_empty() {
                        println!("No messages found.");
                        return Ok(());
                    }

                    let mut table = Table::new();
                    table
                        .load_preset(UTF8_FULL)
                        .apply_modifier(UTF8_ROUND_CORNERS)
                        .set_content_arrangement(ContentArrangement::Dynamic);
                    table.set_header(vec!["Id", "From", "Content", "Status", "Group", "Flags"]);

                    for m in &messages {
                        let flags = [
                            (m.contains_action_items, "A"),
                            (m.contains_questions, "Q"),
                            (m.contains_decisions, "D"),
                        ]
                        .iter()
                        .filter(|(set, _)| *set)
                        .map(|(_, tag)| *tag)
                        .collect::<Vec<_>>()
                        .join("");

                        table.add_row(vec![
                            m.id.to_string(),
                            super::truncate(m.sender(), 22),
                            super::truncate(&m.content, 45),
                            m.status.clone(),
                            m.group_name.clone().unwrap_or_else(|| "-".into()),
                            if flags.is_empty() { "-".into() } else { flags },
                        ]);
                    }

                    println!("{table}");
                    println!("\n{} message(s)", messages.len());
                }
            }
        }
        WhatsappAction::Get { id } => {
            let messages = api.list_whatsapp_messages().await?;
            match messages.into_iter().find(|m| m.id == id) {
                Some(m) => match format {
                    OutputFormat::Json => {
                        println!("{}", serde_json::to_string_pretty(&m).unwrap_or_default());
                    }
                    OutputFormat::Text => {
                        println!("{}", style("Message").bold().underlined());
                        println!("  From:      {} ({})", m.sender(), m.from_number);
                        println!("  To:        {}", m.to_number);
                        println!("  Type:      {}", m.message_type);
                        println!("  Status:    {}", m.status);
                        println!("  Time:      {}", m.timestamp);
                        if m.is_group_message {
                            println!(
                                "  Group:     {}",
                                m.group_name.as_deref().unwrap_or("-")
                            );
                        }
                        if let Some(ref url) = m.media_url {
                            println!(
                                "  Media:     {url} ({})",
                                m.media_type.as_deref().unwrap_or("unknown")
                            );
                        }
                        if m.has_flags() {
                            println!(
                                "  Analysis:  actions={} questions={} decisions={}",
                                m.contains_action_items, m.contains_questions, m.contains_decisions
                            );
                        }
                        println!();
                        println!("{}", m.content);
                    }
                },
                None => {
                    println!("{} Message not found: {id}", style("ERROR").red().bold());
                }
            }
        }
    }

    Ok(())
}
