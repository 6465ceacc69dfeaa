//! Assistant chat commands.

use std::sync::Arc;

use clap::Subcommand;
use console::style;

use od_core::config::ConfigHandle;
use od_core::error::OdResult;
use od_services::{AssistantService, EventBus};
use crate::OutputFormat;

#[derive(Subcommand)]
pub enum ChatAction {
    /// Ask the assistant a question.
    Ask {
        /// The question text.
        question: Vec<String>,
    },
    /// Show the conversation history from the backend.
    History,
    /// Show the locally logged exchanges.
    Local,
    /// Clear the local exchange log.
    Clear,
}

pub async fn run(config: ConfigHandle, action: ChatAction, format: OutputFormat) -> OdResult<()> {
    let (db, session) = super::open_session(&config).await?;
    let user = session.require_session().await?;
    let assistant = AssistantService::new(db.clone(), config.clone(), EventBus::new(16));

    match action {
        ChatAction::Ask { question } => {
            let question = question.join(" ");
            if question.trim().is_empty() {
                println!("{} Empty question.", style("ERROR").red().bold());
                return Ok(());
            }

            let api = super::create_api_client(&config, Arc::clone(session.tokens())).await?;
            session.ensure_fresh(&api).await?;
            let completion = super::create_completion_client(&config).await?;

            let answer = assistant.ask(&api, &completion, user.id, &question).await;
            super::flush_session(&db, session.tokens()).await?;
            let answer = answer?;

            match format {
                OutputFormat::Json => {
                    println!(
                        "{}",
                        serde_json::to_string_pretty(&serde_json::json!({
                            "question": question,
                            "answer": answer,
                        }))
                        .unwrap_or_default()
                    );
                }
                OutputFormat::Text => {
                    println!("{} {question}", style("you:").bold());
                    println!("{} {answer}", style("assistant:").cyan().bold());
                }
            }
        }
        ChatAction::History => {
            let api = super::create_api_client(&config, Arc::clone(session.tokens())).await?;
            session.ensure_fresh(&api).await?;
            let history = api.chatbot_history(user.id).await;
            super::flush_session(&db, session.tokens()).await?;
            print_history(&history?, format);
        }
        ChatAction::Local => {
            let history = assistant.local_history(user.id)?;
            print_history(&history, format);
        }
        ChatAction::Clear => {
            let removed = assistant.clear_local_history(user.id)?;
            println!(
                "{} Cleared {removed} local exchange(s).",
                style("OK").green().bold()
            );
        }
    }

    Ok(())
}

fn print_history(history: &[od_models::ChatExchange], format: OutputFormat) {
    match format {
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(history).unwrap_or_default());
        }
        OutputFormat::Text => {
            if history.is_empty() {
                println!("No exchanges yet.");
                return;
            }
            for x in history {
                if let Some(ref when) = x.created_at {
                    println!("{}", style(when).dim());
                }
                println!("{} {}", style("you:").bold(), x.question);
                println!("{} {}", style("assistant:").cyan().bold(), x.answer);
                println!();
            }
        }
    }
}
