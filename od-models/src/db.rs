//! Local store initialization, connection pooling, and lifecycle management.
//!
//! Uses SQLite in WAL mode with r2d2 connection pooling.
//! Runs integrity checks on startup and applies versioned migrations.

use std::path::Path;
use std::sync::Arc;

use r2d2::Pool;
use r2d2_sqlite::SqliteConnectionManager;
use rusqlite::Connection;
use tracing::{error, info, warn};

use od_core::config::StoreConfig;
use od_core::error::{OdError, OdResult};

use crate::migrations;
use crate::schema;

/// Type alias for the SQLite connection pool.
pub type DbPool = Pool<SqliteConnectionManager>;

/// Local store wrapper providing initialization, pooling, and lifecycle
/// management.
#[derive(Clone)]
pub struct Database {
    pool: Arc<DbPool>,
}

impl Database {
    /// Initialize the store at the given path with the provided configuration.
    ///
    /// This:
    /// 1. Creates the store file and parent directories if needed
    /// 2. Enables WAL mode for concurrent read/write
    /// 3. Sets up connection pooling
    /// 4. Runs integrity checks if configured
    /// 5. Creates the schema tables
    /// 6. Runs pending migrations
    pub fn init(db_path: &Path, config: &StoreConfig) -> OdResult<Self> {
        if let Some(parent) = db_path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        info!("initializing local store at {}", db_path.display());

        let manager = SqliteConnectionManager::file(db_path);
        let pool = Pool::builder()
            .max_size(config.pool_size)
            .connection_customizer(Box::new(ConnectionCustomizer {
                wal_mode: config.wal_mode,
            }))
            .build(manager)
            .map_err(|e| OdError::Pool(e.to_string()))?;

        let db = Self {
            pool: Arc::new(pool),
        };

        if config.integrity_check_on_startup {
            db.run_integrity_check()?;
        }

        {
            let conn = db.conn()?;
            schema::create_tables(&conn)?;
            migrations::run_migrations(&conn)?;
        }

        info!("local store initialized successfully");
        Ok(db)
    }

    /// Get a connection from the pool.
    pub fn conn(&self) -> OdResult<r2d2::PooledConnection<SqliteConnectionManager>> {
        self.pool.get().map_err(|e| OdError::Pool(e.to_string()))
    }

    /// Run a SQLite integrity check.
    pub fn run_integrity_check(&self) -> OdResult<()> {
        let conn = self.conn()?;
        let result: String = conn
            .query_row("PRAGMA integrity_check", [], |row| row.get(0))
            .map_err(|e| OdError::Store(e.to_string()))?;

        if result != "ok" {
            error!("store integrity check failed: {result}");
            return Err(OdError::IntegrityCheck(result));
        }

        info!("store integrity check passed");
        Ok(())
    }

    /// Execute a function within a store transaction.
    pub fn transaction<T, F>(&self, f: F) -> OdResult<T>
    where
        F: FnOnce(&Connection) -> OdResult<T>,
    {
        let mut conn = self.conn()?;
        let tx = conn
            .transaction()
            .map_err(|e| OdError::Store(e.to_string()))?;

        let result = f(&tx)?;

        tx.commit().map_err(|e| OdError::Store(e.to_string()))?;

        Ok(result)
    }

    /// Get store statistics (row counts per table).
    pub fn stats(&self) -> OdResult<StoreStats> {
        let conn = self.conn()?;

        let count = |table: &str| -> OdResult<i64> {
            let sql = format!("SELECT COUNT(*) FROM {table}");
            conn.query_row(&sql, [], |row| row.get(0))
                .map_err(|e| OdError::Store(e.to_string()))
        };

        Ok(StoreStats {
            sessions: count("session").unwrap_or(0),
            parse_jobs: count("parse_jobs").unwrap_or(0),
            assistant_exchanges: count("assistant_log").unwrap_or(0),
        })
    }

    /// Reset the store by dropping and recreating all tables.
    pub fn reset(&self) -> OdResult<()> {
        warn!("resetting local store - cached session and tracked jobs will be lost");
        let conn = self.conn()?;
        schema::drop_tables(&conn)?;
        schema::create_tables(&conn)?;
        migrations::run_migrations(&conn)?;
        info!("store reset complete");
        Ok(())
    }
}

/// Store row count statistics.
#[derive(Debug, Clone)]
pub struct StoreStats {
    pub sessions: i64,
    pub parse_jobs: i64,
    pub assistant_exchanges: i64,
}

impl std::fmt::Display for StoreStats {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "sessions={}, parse_jobs={}, assistant_exchanges={}",
            self.sessions, self.parse_jobs, self.assistant_exchanges
        )
    }
}

/// r2d2 connection customizer that applies PRAGMA settings.
#[derive(Debug)]
struct ConnectionCustomizer {
    wal_mode: bool,
}

impl r2d2::CustomizeConnection<Connection, rusqlite::Error> for ConnectionCustomizer {
    fn on_acquire(&self, conn: &mut Connection) -> Result<(), rusqlite::Error> {
        if self.wal_mode {
            conn.execute_batch("PRAGMA journal_mode=WAL;")?;
        }

        conn.execute_batch(
            "PRAGMA synchronous=NORMAL;
             PRAGMA temp_store=MEMORY;
             PRAGMA busy_timeout=5000;
             PRAGMA foreign_keys=ON;",
        )?;

        Ok(())
    }
}
