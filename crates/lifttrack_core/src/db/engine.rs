//! Process-wide storage engine handle.
//!
//! # Responsibility
//! - Build the connection pool for the configured backing store at startup.
//! - Run schema initialization and issue sessions against it.
//!
//! # Invariants
//! - Every pooled connection has `foreign_keys=ON` and the configured busy
//!   timeout; file stores run in WAL mode.
//! - Each session owns its own pooled connection; concurrent sessions are
//!   arbitrated by SQLite locking, not by the engine.
//! - All connections of one in-memory engine share a single private database.

use super::migrations::apply_migrations;
use super::session::{Session, SessionMode};
use super::{StorageError, StorageResult};
use crate::config::{StorageConfig, StorageTarget};
use log::{error, info};
use r2d2::{ManageConnection, Pool, PooledConnection};
use r2d2_sqlite::SqliteConnectionManager;
use rusqlite::Connection;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{Duration, Instant};

pub(super) type DbConnection = PooledConnection<SqliteConnectionManager>;

static MEMORY_DB_COUNTER: AtomicU64 = AtomicU64::new(0);

/// Long-lived storage handle, constructed explicitly and injected into callers.
pub struct Engine {
    target: StorageTarget,
    pool: Pool<SqliteConnectionManager>,
}

impl std::fmt::Debug for Engine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Engine")
            .field("target", &self.target)
            .field("pool_size", &self.pool.max_size())
            .finish()
    }
}

impl Engine {
    /// Opens the configured backing store.
    ///
    /// Does not create tables; call [`Engine::initialize_schema`] for that.
    ///
    /// # Errors
    /// - `StorageError::Unreachable` when the store cannot be opened or read.
    /// - `StorageError::Pool` when the connection pool cannot be built.
    ///
    /// # Side effects
    /// - Emits `db_open` logging events with duration and status.
    pub fn connect(config: &StorageConfig) -> StorageResult<Self> {
        let started_at = Instant::now();
        let mode = config.target.mode();
        info!("event=db_open module=db status=start mode={mode}");

        let manager = connection_manager(config);

        // One direct connection first, so a bad target fails fast instead of
        // making the pool retry until its timeout.
        if let Err(err) = manager.connect() {
            error!(
                "event=db_open module=db status=error mode={mode} duration_ms={} error_code=db_unreachable error={}",
                started_at.elapsed().as_millis(),
                err
            );
            return Err(StorageError::Unreachable {
                target: config.target.clone(),
                source: err,
            });
        }

        let pool = Pool::builder()
            .max_size(config.pool_size.max(1))
            .connection_timeout(config.busy_timeout)
            // Recycling every connection at once would discard an in-memory store.
            .max_lifetime(None)
            .idle_timeout(None)
            .build(manager)
            .map_err(|err| {
                error!(
                    "event=db_open module=db status=error mode={mode} duration_ms={} error_code=db_pool_failed error={}",
                    started_at.elapsed().as_millis(),
                    err
                );
                StorageError::Pool(err)
            })?;

        info!(
            "event=db_open module=db status=ok mode={mode} pool_size={} duration_ms={}",
            pool.max_size(),
            started_at.elapsed().as_millis()
        );
        Ok(Self {
            target: config.target.clone(),
            pool,
        })
    }

    /// Opens a private in-memory store with default settings.
    pub fn connect_in_memory() -> StorageResult<Self> {
        Self::connect(&StorageConfig::in_memory())
    }

    pub fn target(&self) -> &StorageTarget {
        &self.target
    }

    /// Ensures every declared table, index and trigger exists; safe to call
    /// repeatedly.
    ///
    /// # Errors
    /// - `StorageError::UnsupportedSchemaVersion` for a newer database.
    /// - `StorageError::IncompatibleSchema` when an existing table does not
    ///   match its declaration.
    pub fn initialize_schema(&self) -> StorageResult<()> {
        let started_at = Instant::now();
        let mut conn = self.connection()?;

        match apply_migrations(&mut conn) {
            Ok(version) => {
                info!(
                    "event=schema_init module=db status=ok version={version} duration_ms={}",
                    started_at.elapsed().as_millis()
                );
                Ok(())
            }
            Err(err) => {
                error!(
                    "event=schema_init module=db status=error duration_ms={} error={}",
                    started_at.elapsed().as_millis(),
                    err
                );
                Err(err)
            }
        }
    }

    /// Starts a scoped unit-of-work on its own pooled connection.
    ///
    /// The transaction is deferred: it takes a read lock on first read and a
    /// write lock on first write. The session must be committed explicitly;
    /// dropping it rolls back.
    pub fn open_session(&self) -> StorageResult<Session> {
        Session::begin(self.connection()?, SessionMode::Deferred)
    }

    /// Starts a unit-of-work that takes the write lock up front.
    ///
    /// Waits up to the busy timeout for other writers, instead of failing
    /// later when a read lock cannot be upgraded.
    pub fn open_write_session(&self) -> StorageResult<Session> {
        Session::begin(self.connection()?, SessionMode::Immediate)
    }

    fn connection(&self) -> StorageResult<DbConnection> {
        self.pool.get().map_err(StorageError::Pool)
    }
}

fn connection_manager(config: &StorageConfig) -> SqliteConnectionManager {
    let busy_timeout = config.busy_timeout;
    match &config.target {
        StorageTarget::File(path) => SqliteConnectionManager::file(path)
            .with_init(move |conn| init_connection(conn, busy_timeout, true)),
        StorageTarget::Memory => {
            let n = MEMORY_DB_COUNTER.fetch_add(1, Ordering::Relaxed);
            let uri = format!(
                "file:lifttrack_mem_{}_{n}?mode=memory&cache=shared",
                std::process::id()
            );
            SqliteConnectionManager::file(uri)
                .with_init(move |conn| init_connection(conn, busy_timeout, false))
        }
    }
}

fn init_connection(
    conn: &mut Connection,
    busy_timeout: Duration,
    write_ahead_log: bool,
) -> rusqlite::Result<()> {
    conn.execute_batch("PRAGMA foreign_keys = ON;")?;
    conn.busy_timeout(busy_timeout)?;
    // Both pragmas read the file header, so a non-database file fails here.
    if write_ahead_log {
        conn.query_row("PRAGMA journal_mode = WAL;", [], |row| row.get::<_, String>(0))?;
    } else {
        conn.query_row("PRAGMA schema_version;", [], |row| row.get::<_, i64>(0))?;
    }
    Ok(())
}
