//! Local store schema definitions and table creation.
//!
//! The store holds only client-side state: the cached session, tracked
//! transcript-parse jobs, and a local log of assistant exchanges. All
//! business entities stay on the backend.

use rusqlite::Connection;
use tracing::info;

use od_core::error::{OdError, OdResult};

/// Create all store tables and indexes if they do not exist.
pub fn create_tables(conn: &Connection) -> OdResult<()> {
    conn.execute_batch(SCHEMA_SQL)
        .map_err(|e| OdError::Store(format!("failed to create schema: {e}")))?;
    info!("store schema verified");
    Ok(())
}

/// Drop all tables (used for store reset).
pub fn drop_tables(conn: &Connection) -> OdResult<()> {
    conn.execute_batch(
        "DROP TABLE IF EXISTS session;
         DROP TABLE IF EXISTS parse_jobs;
         DROP TABLE IF EXISTS assistant_log;
         DROP TABLE IF EXISTS schema_version;",
    )
    .map_err(|e| OdError::Store(format!("failed to drop tables: {e}")))?;
    Ok(())
}

/// Complete SQL schema for all tables.
const SCHEMA_SQL: &str = r#"
-- Schema version tracking
CREATE TABLE IF NOT EXISTS schema_version (
    version INTEGER NOT NULL
);

-- Cached session (single row). The browser app kept this in a signed
-- cookie; the CLI keeps it in the local store under the user's data dir.
CREATE TABLE IF NOT EXISTS session (
    id              INTEGER PRIMARY KEY CHECK (id = 1),
    user_id         INTEGER NOT NULL,
    name            TEXT NOT NULL,
    email           TEXT NOT NULL,
    role            TEXT NOT NULL,
    access_token    TEXT NOT NULL,
    refresh_token   TEXT NOT NULL,
    token_expires   INTEGER NOT NULL,
    updated_at      INTEGER NOT NULL
);

-- Tracked transcript-parse jobs (the local-storage analog): reloaded on
-- startup so polling resumes across restarts.
CREATE TABLE IF NOT EXISTS parse_jobs (
    id              TEXT PRIMARY KEY,
    meeting_id      INTEGER NOT NULL,
    job_id          TEXT NOT NULL,
    status          TEXT NOT NULL,
    created_at      INTEGER NOT NULL,
    updated_at      INTEGER NOT NULL
);

CREATE INDEX IF NOT EXISTS idx_parse_jobs_status ON parse_jobs(status);
CREATE INDEX IF NOT EXISTS idx_parse_jobs_meeting ON parse_jobs(meeting_id);

-- Local copy of assistant exchanges, newest last.
CREATE TABLE IF NOT EXISTS assistant_log (
    id              INTEGER PRIMARY KEY AUTOINCREMENT,
    user_id         INTEGER NOT NULL,
    question        TEXT NOT NULL,
    answer          TEXT NOT NULL,
    created_at      INTEGER NOT NULL
);

CREATE INDEX IF NOT EXISTS idx_assistant_log_user ON assistant_log(user_id);
"#;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_and_drop() {
        let conn = Connection::open_in_memory().unwrap();
        create_tables(&conn).unwrap();

        // Creating twice is a no-op.
        create_tables(&conn).unwrap();

        drop_tables(&conn).unwrap();
        create_tables(&conn).unwrap();
    }

    #[test]
    fn test_session_single_row_constraint() {
        let conn = Connection::open_in_memory().unwrap();
        create_tables(&conn).unwrap();

        conn.execute(
            "INSERT INTO session (id, user_id, name, email, role, access_token, refresh_token, token_expires, updated_at)
             VALUES (1, 1, 'a', 'a@b.c', 'admin', 't', 'r', 0, 0)",
            [],
        )
        .unwrap();

        let err = conn.execute(
            "INSERT INTO session (id, user_id, name, email, role, access_token, refresh_token, token_expires, updated_at)
             VALUES (2, 2, 'b', 'b@b.c', 'user', 't', 'r', 0, 0)",
            [],
        );
        assert!(err.is_err());
    }
}
