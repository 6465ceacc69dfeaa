//! CLI command implementations.

pub mod analytics;
pub mod chat;
pub mod db;
pub mod login;
pub mod logout;
pub mod logs;
pub mod meetings;
pub mod profile;
pub mod settings;
pub mod teams;
pub mod users;
pub mod whatsapp;
pub mod whoami;

use std::sync::Arc;

use od_api::{ApiClient, CompletionClient, TokenManager};
use od_core::config::ConfigHandle;
use od_core::error::OdResult;
use od_models::{store, Database};
use od_services::{EventBus, SessionService};

/// Helper to initialize the local store from config.
pub async fn init_database(config: &ConfigHandle) -> OdResult<Database> {
    let cfg = config.read().await;
    let path = cfg.effective_store_path()?;
    Database::init(&path, &cfg.store)
}

/// Helper to create an API client from config.
pub async fn create_api_client(
    config: &ConfigHandle,
    tokens: Arc<TokenManager>,
) -> OdResult<ApiClient> {
    let backend = config.read().await.backend.clone();
    ApiClient::new(&backend, tokens)
}

/// Helper to create a completion client from config.
pub async fn create_completion_client(config: &ConfigHandle) -> OdResult<CompletionClient> {
    let assistant = config.read().await.assistant.clone();
    CompletionClient::new(&assistant)
}

/// Build the session stack for a one-shot command: the local store plus a
/// session service with the persisted session restored into a fresh token
/// manager.
pub async fn open_session(config: &ConfigHandle) -> OdResult<(Database, SessionService)> {
    let db = init_database(config).await?;
    let session = SessionService::new(db.clone(), EventBus::new(16), Arc::new(TokenManager::new()));
    session.restore().await?;
    Ok((db, session))
}

/// Persist the token manager's final state back to the store.
///
/// One-shot commands call this after their API work so a mid-command
/// silent refresh (or a forced sign-out after a failed one) survives the
/// process exit.
pub async fn flush_session(db: &Database, tokens: &TokenManager) -> OdResult<()> {
    let conn = db.conn()?;
    match tokens.current().await {
        Some(tokens) => {
            store::update_session_tokens(&conn, &tokens)?;
        }
        None => {
            store::clear_session(&conn)?;
        }
    }
    Ok(())
}

/// Format a byte count as a human-readable string.
pub fn format_bytes(bytes: u64) -> String {
    if bytes < 1024 {
        format!("{} B", bytes)
    } else if bytes < 1024 * 1024 {
        format!("{:.1} KB", bytes as f64 / 1024.0)
    } else if bytes < 1024 * 1024 * 1024 {
        format!("{:.1} MB", bytes as f64 / (1024.0 * 1024.0))
    } else {
        format!("{:.2} GB", bytes as f64 / (1024.0 * 1024.0 * 1024.0))
    }
}

/// Truncate a string to a maximum number of characters, appending an
/// ellipsis if truncated. Cuts on char boundaries so multibyte content
/// (emoji, accents) never splits a code point.
pub fn truncate(s: &str, max_len: usize) -> String {
    let char_boundary = |n: usize| s.char_indices().nth(n).map_or(s.len(), |(i, _)| i);

    if s.chars().count() <= max_len {
        s.to_string()
    } else if max_len > 3 {
        format!("{}...", &s[..char_boundary(max_len - 3)])
    } else {
        s[..char_boundary(max_len)].to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_truncate_ascii() {
        assert_eq!(truncate("short", 45), "short");
        assert_eq!(truncate("abcdefghij", 8), "abcde...");
        assert_eq!(truncate("abc", 2), "ab");
    }

    #[test]
    fn test_truncate_multibyte_content() {
        let msg = "🎉🎉🎉🎉🎉🎉🎉🎉🎉🎉🎉🎉🎉🎉🎉🎉🎉🎉🎉🎉 release shipped, drinks on Friday 🍻🍻🍻";
        let cut = truncate(msg, 45);
        assert!(cut.ends_with("..."));
        assert_eq!(cut.chars().count(), 45);

        assert_eq!(truncate("héllo wörld", 45), "héllo wörld");
        assert_eq!(truncate("ééééé", 4), "é...");
    }

    #[test]
    fn test_format_bytes() {
        assert_eq!(format_bytes(512), "512 B");
        assert_eq!(format_bytes(2048), "2.0 KB");
        assert_eq!(format_bytes(5 * 1024 * 1024), "5.0 MB");
    }
}
