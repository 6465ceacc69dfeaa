//! Versioned local-store migrations.
//!
//! Migrations run sequentially from the current stored version to the latest.
//! Each migration is an idempotent SQL script.

use rusqlite::Connection;
use tracing::{info, warn};

use od_core::constants::STORE_SCHEMA_VERSION;
use od_core::error::{OdError, OdResult};

/// Run all pending migrations on the store.
pub fn run_migrations(conn: &Connection) -> OdResult<()> {
    let current_version = get_schema_version(conn)?;

    if current_version >= STORE_SCHEMA_VERSION {
        info!("store schema is up to date (version {current_version})");
        return Ok(());
    }

    info!("running migrations from version {current_version} to {STORE_SCHEMA_VERSION}");

    for version in (current_version + 1)..=STORE_SCHEMA_VERSION {
        run_migration(conn, version)?;
    }

    set_schema_version(conn, STORE_SCHEMA_VERSION)?;
    info!("migrations complete, schema at version {STORE_SCHEMA_VERSION}");
    Ok(())
}

/// Get the current schema version from the store.
fn get_schema_version(conn: &Connection) -> OdResult<i32> {
    let count: i64 = conn
        .query_row("SELECT COUNT(*) FROM schema_version", [], |row| row.get(0))
        .map_err(|e| OdError::Store(e.to_string()))?;

    if count == 0 {
        // First run - set version to 0
        conn.execute("INSERT INTO schema_version (version) VALUES (0)", [])
            .map_err(|e| OdError::Store(e.to_string()))?;
        return Ok(0);
    }

    conn.query_row("SELECT version FROM schema_version LIMIT 1", [], |row| {
        row.get(0)
    })
    .map_err(|e| OdError::Store(e.to_string()))
}

/// Set the schema version in the store.
fn set_schema_version(conn: &Connection, version: i32) -> OdResult<()> {
    conn.execute("UPDATE schema_version SET version = ?1", [version])
        .map_err(|e| OdError::Store(e.to_string()))?;
    Ok(())
}

/// Run a specific migration version.
fn run_migration(conn: &Connection, version: i32) -> OdResult<()> {
    info!("applying migration version {version}");

    match version {
        1 => migration_v1(conn),
        _ => {
            warn!("unknown migration version {version}, skipping");
            Ok(())
        }
    }
}

/// Migration v1: initial schema is created by schema::create_tables.
/// Nothing to seed; tracked state starts empty.
fn migration_v1(_conn: &Connection) -> OdResult<()> {
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema;

    #[test]
    fn test_migrations_on_fresh_store() {
        let conn = Connection::open_in_memory().unwrap();
        schema::create_tables(&conn).unwrap();
        run_migrations(&conn).unwrap();

        let version = get_schema_version(&conn).unwrap();
        assert_eq!(version, STORE_SCHEMA_VERSION);
    }

    #[test]
    fn test_migrations_idempotent() {
        let conn = Connection::open_in_memory().unwrap();
        schema::create_tables(&conn).unwrap();
        run_migrations(&conn).unwrap();
        run_migrations(&conn).unwrap(); // Should be a no-op
    }
}
