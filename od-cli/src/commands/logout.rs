//! Sign-out command.

use console::style;

use od_core::config::ConfigHandle;
use od_core::error::OdResult;

/// Run the logout command.
pub async fn run(config: ConfigHandle) -> OdResult<()> {
    let (_db, session) = super::open_session(&config).await?;

    match session.current_user().await {
        Some(user) => {
            session.sign_out().await?;
            println!(
                "{} Signed out {} ({}).",
                style("OK").green().bold(),
                user.name,
                user.email
            );
        }
        None => {
            println!("Not signed in.");
        }
    }

    Ok(())
}
