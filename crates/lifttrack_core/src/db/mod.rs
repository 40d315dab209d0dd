//! SQLite engine, scoped sessions and schema bootstrap.
//!
//! # Responsibility
//! - Own the single long-lived storage engine handle (a connection pool)
//!   for a process.
//! - Hand out independent scoped units-of-work that never auto-commit.
//! - Create declared tables and reject incompatible existing ones.
//!
//! # Invariants
//! - Schema version is tracked via `PRAGMA user_version`.
//! - A session that is not committed is rolled back when released.
//! - Isolation between sessions is left to SQLite locking.
//! - Storage failures are surfaced as `StorageError` and never retried.

use crate::config::StorageTarget;
use std::error::Error;
use std::fmt::{Display, Formatter};

mod engine;
pub mod migrations;
mod session;

pub use engine::Engine;
pub use session::Session;

pub type StorageResult<T> = Result<T, StorageError>;

#[derive(Debug)]
pub enum StorageError {
    /// The configured backing store could not be opened or read.
    Unreachable {
        target: StorageTarget,
        source: rusqlite::Error,
    },
    Sqlite(rusqlite::Error),
    /// No pooled connection could be obtained.
    Pool(r2d2::Error),
    UnsupportedSchemaVersion {
        db_version: u32,
        latest_supported: u32,
    },
    /// An existing table does not match its declared mapping.
    IncompatibleSchema { table: &'static str, detail: String },
}

impl Display for StorageError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Unreachable { target, source } => {
                write!(f, "storage {target} is unreachable: {source}")
            }
            Self::Sqlite(err) => write!(f, "{err}"),
            Self::Pool(err) => write!(f, "connection pool error: {err}"),
            Self::UnsupportedSchemaVersion {
                db_version,
                latest_supported,
            } => write!(
                f,
                "database schema version {db_version} is newer than supported {latest_supported}"
            ),
            Self::IncompatibleSchema { table, detail } => {
                write!(f, "existing table `{table}` is incompatible: {detail}")
            }
        }
    }
}

impl Error for StorageError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Unreachable { source, .. } => Some(source),
            Self::Sqlite(err) => Some(err),
            Self::Pool(err) => Some(err),
            Self::UnsupportedSchemaVersion { .. } | Self::IncompatibleSchema { .. } => None,
        }
    }
}

impl From<rusqlite::Error> for StorageError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Sqlite(value)
    }
}
