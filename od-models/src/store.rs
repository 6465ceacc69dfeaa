//! Typed queries over the local store.
//!
//! All queries use parameterized SQL and take a `&Connection` so they can
//! run inside or outside a transaction.

use chrono::Utc;
use rusqlite::{params, Connection};

use od_core::error::{OdError, OdResult};

use crate::models::chatbot::ChatExchange;
use crate::models::meeting::ParseJob;
use crate::models::session::{Session, SessionUser, TokenSet};

// ─── Session ────────────────────────────────────────────────────────────────

/// Persist the session, replacing any previous one. Single-row table.
pub fn save_session(conn: &Connection, session: &Session) -> OdResult<()> {
    conn.execute(
        "INSERT INTO session (id, user_id, name, email, role, access_token, refresh_token, token_expires, updated_at)
         VALUES (1, ?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)
         ON CONFLICT(id) DO UPDATE SET
            user_id = excluded.user_id,
            name = excluded.name,
            email = excluded.email,
            role = excluded.role,
            access_token = excluded.access_token,
            refresh_token = excluded.refresh_token,
            token_expires = excluded.token_expires,
            updated_at = excluded.updated_at",
        params![
            session.user.id,
            session.user.name,
            session.user.email,
            session.user.role,
            session.tokens.access_token,
            session.tokens.refresh_token,
            session.tokens.token_expires,
            Utc::now().timestamp_millis(),
        ],
    )
    .map_err(|e| OdError::Store(e.to_string()))?;
    Ok(())
}

/// Load the cached session, if one exists.
pub fn load_session(conn: &Connection) -> OdResult<Option<Session>> {
    match conn.query_row("SELECT * FROM session WHERE id = 1", [], |row| {
        Ok(Session {
            user: SessionUser {
                id: row.get("user_id")?,
                name: row.get("name")?,
                email: row.get("email")?,
                role: row.get("role")?,
            },
            tokens: TokenSet {
                access_token: row.get("access_token")?,
                refresh_token: row.get("refresh_token")?,
                token_expires: row.get("token_expires")?,
            },
        })
    }) {
        Ok(session) => Ok(Some(session)),
        Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
        Err(e) => Err(OdError::Store(e.to_string())),
    }
}

/// Update just the token pair of the cached session (after a refresh).
pub fn update_session_tokens(conn: &Connection, tokens: &TokenSet) -> OdResult<()> {
    conn.execute(
        "UPDATE session SET access_token = ?1, refresh_token = ?2, token_expires = ?3, updated_at = ?4
         WHERE id = 1",
        params![
            tokens.access_token,
            tokens.refresh_token,
            tokens.token_expires,
            Utc::now().timestamp_millis(),
        ],
    )
    .map_err(|e| OdError::Store(e.to_string()))?;
    Ok(())
}

/// Remove the cached session (sign-out or forced expiry).
pub fn clear_session(conn: &Connection) -> OdResult<()> {
    conn.execute("DELETE FROM session", [])
        .map_err(|e| OdError::Store(e.to_string()))?;
    Ok(())
}

// ─── Parse jobs ─────────────────────────────────────────────────────────────

/// Insert or update a tracked transcript-parse job.
pub fn upsert_job(conn: &Connection, job: &ParseJob) -> OdResult<()> {
    conn.execute(
        "INSERT INTO parse_jobs (id, meeting_id, job_id, status, created_at, updated_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6)
         ON CONFLICT(id) DO UPDATE SET
            job_id = excluded.job_id,
            status = excluded.status,
            updated_at = excluded.updated_at",
        params![
            job.id,
            job.meeting_id,
            job.job_id,
            job.status,
            job.created_at,
            job.updated_at,
        ],
    )
    .map_err(|e| OdError::Store(e.to_string()))?;
    Ok(())
}

/// List jobs still worth polling (status not terminal).
pub fn active_jobs(conn: &Connection) -> OdResult<Vec<ParseJob>> {
    let mut stmt = conn
        .prepare(
            "SELECT * FROM parse_jobs WHERE status NOT IN ('completed', 'failed')
             ORDER BY created_at ASC",
        )
        .map_err(|e| OdError::Store(e.to_string()))?;

    let jobs = stmt
        .query_map([], ParseJob::from_row)
        .map_err(|e| OdError::Store(e.to_string()))?
        .filter_map(|r| r.ok())
        .collect();

    Ok(jobs)
}

/// List all tracked jobs, newest first.
pub fn all_jobs(conn: &Connection) -> OdResult<Vec<ParseJob>> {
    let mut stmt = conn
        .prepare("SELECT * FROM parse_jobs ORDER BY created_at DESC")
        .map_err(|e| OdError::Store(e.to_string()))?;

    let jobs = stmt
        .query_map([], ParseJob::from_row)
        .map_err(|e| OdError::Store(e.to_string()))?
        .filter_map(|r| r.ok())
        .collect();

    Ok(jobs)
}

/// Find a tracked job by its local id.
pub fn find_job(conn: &Connection, id: &str) -> OdResult<Option<ParseJob>> {
    match conn.query_row(
        "SELECT * FROM parse_jobs WHERE id = ?1",
        [id],
        ParseJob::from_row,
    ) {
        Ok(job) => Ok(Some(job)),
        Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
        Err(e) => Err(OdError::Store(e.to_string())),
    }
}

/// Record a status change for a tracked job.
pub fn set_job_status(conn: &Connection, id: &str, status: &str) -> OdResult<()> {
    conn.execute(
        "UPDATE parse_jobs SET status = ?1, updated_at = ?2 WHERE id = ?3",
        params![status, Utc::now().timestamp_millis(), id],
    )
    .map_err(|e| OdError::Store(e.to_string()))?;
    Ok(())
}

/// Stop tracking a job.
pub fn remove_job(conn: &Connection, id: &str) -> OdResult<usize> {
    conn.execute("DELETE FROM parse_jobs WHERE id = ?1", [id])
        .map_err(|e| OdError::Store(e.to_string()))
}

/// Delete jobs that reached a terminal status before the given cutoff.
pub fn prune_finished_jobs(conn: &Connection, older_than_ms: i64) -> OdResult<usize> {
    conn.execute(
        "DELETE FROM parse_jobs
         WHERE status IN ('completed', 'failed') AND updated_at < ?1",
        [older_than_ms],
    )
    .map_err(|e| OdError::Store(e.to_string()))
}

// ─── Assistant log ──────────────────────────────────────────────────────────

/// Append an exchange to the local assistant log.
pub fn log_exchange(conn: &Connection, user_id: i64, question: &str, answer: &str) -> OdResult<()> {
    conn.execute(
        "INSERT INTO assistant_log (user_id, question, answer, created_at)
         VALUES (?1, ?2, ?3, ?4)",
        params![user_id, question, answer, Utc::now().timestamp_millis()],
    )
    .map_err(|e| OdError::Store(e.to_string()))?;
    Ok(())
}

/// Load the most recent exchanges for a user, oldest first.
pub fn recent_exchanges(conn: &Connection, user_id: i64, limit: i64) -> OdResult<Vec<ChatExchange>> {
    let mut stmt = conn
        .prepare(
            "SELECT user_id, question, answer, created_at FROM
                (SELECT * FROM assistant_log WHERE user_id = ?1
                 ORDER BY created_at DESC, id DESC LIMIT ?2)
             ORDER BY created_at ASC, id ASC",
        )
        .map_err(|e| OdError::Store(e.to_string()))?;

    let rows = stmt
        .query_map(params![user_id, limit], |row| {
            let created_ms: i64 = row.get("created_at")?;
            Ok(ChatExchange {
                id: None,
                user_id: row.get("user_id")?,
                kind: None,
                question: row.get("question")?,
                answer: row.get("answer")?,
                created_at: chrono::DateTime::from_timestamp_millis(created_ms)
                    .map(|dt| dt.to_rfc3339()),
            })
        })
        .map_err(|e| OdError::Store(e.to_string()))?
        .filter_map(|r| r.ok())
        .collect();

    Ok(rows)
}

/// Clear the assistant log for a user.
pub fn clear_exchanges(conn: &Connection, user_id: i64) -> OdResult<usize> {
    conn.execute("DELETE FROM assistant_log WHERE user_id = ?1", [user_id])
        .map_err(|e| OdError::Store(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::migrations;
    use crate::schema;

    fn setup_db() -> Connection {
        let conn = Connection::open_in_memory().unwrap();
        schema::create_tables(&conn).unwrap();
        migrations::run_migrations(&conn).unwrap();
        conn
    }

    fn session() -> Session {
        Session {
            user: SessionUser {
                id: 7,
                name: "Ada".into(),
                email: "ada@example.com".into(),
                role: "admin".into(),
            },
            tokens: TokenSet {
                access_token: "access-1".into(),
                refresh_token: "refresh-1".into(),
                token_expires: 1_750_000_000_000,
            },
        }
    }

    fn job(id: &str, status: &str) -> ParseJob {
        ParseJob {
            id: id.into(),
            meeting_id: 11,
            job_id: format!("srv-{id}"),
            status: status.into(),
            created_at: 1_000,
            updated_at: 1_000,
        }
    }

    #[test]
    fn test_session_round_trip() {
        let conn = setup_db();
        assert!(load_session(&conn).unwrap().is_none());

        save_session(&conn, &session()).unwrap();
        let loaded = load_session(&conn).unwrap().unwrap();
        assert_eq!(loaded, session());
    }

    #[test]
    fn test_session_single_row() {
        let conn = setup_db();
        save_session(&conn, &session()).unwrap();

        let mut second = session();
        second.user.email = "other@example.com".into();
        save_session(&conn, &second).unwrap();

        let count: i64 = conn
            .query_row("SELECT COUNT(*) FROM session", [], |r| r.get(0))
            .unwrap();
        assert_eq!(count, 1);
        assert_eq!(
            load_session(&conn).unwrap().unwrap().user.email,
            "other@example.com"
        );
    }

    #[test]
    fn test_update_session_tokens() {
        let conn = setup_db();
        save_session(&conn, &session()).unwrap();

        let new_tokens = TokenSet {
            access_token: "access-2".into(),
            refresh_token: "refresh-2".into(),
            token_expires: 1_760_000_000_000,
        };
        update_session_tokens(&conn, &new_tokens).unwrap();

        let loaded = load_session(&conn).unwrap().unwrap();
        assert_eq!(loaded.tokens, new_tokens);
        assert_eq!(loaded.user.id, 7);
    }

    #[test]
    fn test_clear_session() {
        let conn = setup_db();
        save_session(&conn, &session()).unwrap();
        clear_session(&conn).unwrap();
        assert!(load_session(&conn).unwrap().is_none());
    }

    #[test]
    fn test_job_tracking() {
        let conn = setup_db();
        upsert_job(&conn, &job("a", "pending")).unwrap();
        upsert_job(&conn, &job("b", "completed")).unwrap();

        let active = active_jobs(&conn).unwrap();
        assert_eq!(active.len(), 1);
        assert_eq!(active[0].id, "a");

        assert_eq!(all_jobs(&conn).unwrap().len(), 2);
    }

    #[test]
    fn test_set_job_status() {
        let conn = setup_db();
        upsert_job(&conn, &job("a", "pending")).unwrap();
        set_job_status(&conn, "a", "processing").unwrap();
        assert_eq!(find_job(&conn, "a").unwrap().unwrap().status, "processing");

        set_job_status(&conn, "a", "completed").unwrap();
        assert!(active_jobs(&conn).unwrap().is_empty());
    }

    #[test]
    fn test_remove_job() {
        let conn = setup_db();
        upsert_job(&conn, &job("a", "pending")).unwrap();
        assert_eq!(remove_job(&conn, "a").unwrap(), 1);
        assert!(find_job(&conn, "a").unwrap().is_none());
    }

    #[test]
    fn test_prune_finished_jobs() {
        let conn = setup_db();
        let mut done = job("a", "completed");
        done.updated_at = 500;
        upsert_job(&conn, &done).unwrap();
        upsert_job(&conn, &job("b", "pending")).unwrap();

        // upsert keeps the inserted updated_at for new rows
        conn.execute("UPDATE parse_jobs SET updated_at = 500 WHERE id = 'a'", [])
            .unwrap();

        assert_eq!(prune_finished_jobs(&conn, 1_000).unwrap(), 1);
        assert_eq!(all_jobs(&conn).unwrap().len(), 1);
    }

    #[test]
    fn test_assistant_log() {
        let conn = setup_db();
        log_exchange(&conn, 7, "first?", "no").unwrap();
        log_exchange(&conn, 7, "second?", "yes").unwrap();
        log_exchange(&conn, 8, "other user", "n/a").unwrap();

        let rows = recent_exchanges(&conn, 7, 10).unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].question, "first?");
        assert_eq!(rows[1].question, "second?");

        assert_eq!(clear_exchanges(&conn, 7).unwrap(), 2);
        assert!(recent_exchanges(&conn, 7, 10).unwrap().is_empty());
    }
}
