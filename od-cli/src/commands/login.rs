//! Sign-in command.

use std::sync::Arc;

use console::style;
use dialoguer::{Input, Password};

use od_core::config::ConfigHandle;
use od_core::error::OdResult;

/// Run the login command.
pub async fn run(
    config: ConfigHandle,
    email: Option<String>,
    password: Option<String>,
) -> OdResult<()> {
    let (db, session) = super::open_session(&config).await?;

    if let Some(user) = session.current_user().await {
        println!(
            "{} Already signed in as {} ({}). Run `opsdeck logout` first.",
            style("ERROR").red().bold(),
            user.name,
            user.email
        );
        return Ok(());
    }

    let email = match email {
        Some(email) => email,
        None => Input::new()
            .with_prompt("Email")
            .interact_text()
            .map_err(|e| od_core::error::OdError::Internal(e.to_string()))?,
    };
    let password = match password {
        Some(password) => password,
        None => Password::new()
            .with_prompt("Password")
            .interact()
            .map_err(|e| od_core::error::OdError::Internal(e.to_string()))?,
    };

    let api = super::create_api_client(&config, Arc::clone(session.tokens())).await?;
    match session.sign_in(&api, &email, &password).await {
        Ok(user) => {
            println!(
                "{} Signed in as {} ({}, {})",
                style("OK").green().bold(),
                user.name,
                user.email,
                user.role
            );
        }
        Err(e) => {
            println!("{} Sign-in failed: {e}", style("ERROR").red().bold());
        }
    }

    super::flush_session(&db, session.tokens()).await?;
    Ok(())
}
