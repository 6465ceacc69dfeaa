//! Profile command: show the signed-in user's full account record.

use std::sync::Arc;

use console::style;

use od_core::config::ConfigHandle;
use od_core::error::OdResult;
use crate::OutputFormat;

pub async fn run(config: ConfigHandle, format: OutputFormat) -> OdResult<()> {
    let (db, session) = super::open_session(&config).await?;
    let user = session.require_session().await?;
    let api = super::create_api_client(&config, Arc::clone(session.tokens())).await?;
    session.ensure_fresh(&api).await?;

    let fetched = api.get_user(user.id).await;
    super::flush_session(&db, session.tokens()).await?;
    let profile = fetched?;

    match format {
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(&profile).unwrap_or_default());
        }
        OutputFormat::Text => {
            println!("{}", style("Profile").bold().underlined());
            println!("  Name:   {} {}", profile.first_name, profile.last_name);
            println!("  Email:  {}", profile.email);
            if let Some(phone) = &profile.phone_number {
                println!("  Phone:  {phone}");
            }
            if let Some(name) = profile.role.as_ref().and_then(|r| r.name.as_deref()) {
                println!("  Role:   {name}");
            }
            if let Some(name) = profile.status.as_ref().and_then(|s| s.name.as_deref()) {
                println!("  Status: {name}");
            }
            if let Some(team) = &profile.team {
                let name = team.name.as_deref().unwrap_or("(unnamed)");
                match &team.code {
                    Some(code) => println!("  Team:   {name} [{code}]"),
                    None => println!("  Team:   {name}"),
                }
            }
        }
    }

    Ok(())
}
