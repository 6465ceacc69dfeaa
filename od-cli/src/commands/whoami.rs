//! Current-session command.

use console::style;

use od_core::config::ConfigHandle;
use od_core::error::OdResult;
use crate::OutputFormat;

/// Run the whoami command.
pub async fn run(config: ConfigHandle, format: OutputFormat) -> OdResult<()> {
    let (_db, session) = super::open_session(&config).await?;

    match session.current_user().await {
        Some(user) => {
            let needs_refresh = session.tokens().needs_refresh().await;
            match format {
                OutputFormat::Json => {
                    println!(
                        "{}",
                        serde_json::to_string_pretty(&serde_json::json!({
                            "id": user.id,
                            "name": user.name,
                            "email": user.email,
                            "role": user.role,
                            "token_near_expiry": needs_refresh,
                        }))
                        .unwrap_or_default()
                    );
                }
                OutputFormat::Text => {
                    println!("{}", style("Session").bold().underlined());
                    println!("  Name:   {}", user.name);
                    println!("  Email:  {}", user.email);
                    println!("  Role:   {}", user.role);
                    println!("  Id:     {}", user.id);
                    if needs_refresh {
                        println!(
                            "  Token:  {}",
                            style("near expiry (will refresh on next request)").yellow()
                        );
                    }
                }
            }
        }
        None => {
            println!("Not signed in. Run `opsdeck login` first.");
        }
    }

    Ok(())
}
