//! Scoped unit-of-work over a pooled connection.
//!
//! # Invariants
//! - A session always runs inside one explicit transaction.
//! - Only `commit` persists; every other exit path rolls back.
//! - The connection returns to the pool when the session is released.

use super::engine::DbConnection;
use super::StorageResult;
use log::{debug, warn};
use rusqlite::Connection;
use std::time::Instant;

/// How a session's transaction acquires locks.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(super) enum SessionMode {
    Deferred,
    Immediate,
}

impl SessionMode {
    fn begin_sql(self) -> &'static str {
        match self {
            Self::Deferred => "BEGIN DEFERRED;",
            Self::Immediate => "BEGIN IMMEDIATE;",
        }
    }
}

/// Unit-of-work bound to an [`Engine`](super::Engine).
///
/// Each session owns one pooled connection for its whole lifetime and
/// releases it when committed, rolled back or dropped.
pub struct Session {
    conn: DbConnection,
    started_at: Instant,
}

impl Session {
    pub(super) fn begin(conn: DbConnection, mode: SessionMode) -> StorageResult<Self> {
        if !conn.is_autocommit() {
            // Left open by a panic during an earlier release.
            conn.execute_batch("ROLLBACK;")?;
        }
        conn.execute_batch(mode.begin_sql())?;
        debug!("event=session_open module=db status=ok mode={mode:?}");
        Ok(Self {
            conn,
            started_at: Instant::now(),
        })
    }

    /// Connection scoped to this unit-of-work, for repositories.
    pub fn connection(&self) -> &Connection {
        &self.conn
    }

    /// Persists all staged work and releases the session.
    ///
    /// On failure the transaction is rolled back during release and the
    /// error is returned.
    pub fn commit(self) -> StorageResult<()> {
        self.conn.execute_batch("COMMIT;")?;
        debug!(
            "event=session_commit module=db status=ok duration_ms={}",
            self.started_at.elapsed().as_millis()
        );
        Ok(())
    }

    /// Discards all staged work and releases the session.
    pub fn rollback(self) -> StorageResult<()> {
        self.conn.execute_batch("ROLLBACK;")?;
        debug!(
            "event=session_rollback module=db status=ok reason=explicit duration_ms={}",
            self.started_at.elapsed().as_millis()
        );
        Ok(())
    }
}

impl Drop for Session {
    fn drop(&mut self) {
        if self.conn.is_autocommit() {
            return;
        }
        match self.conn.execute_batch("ROLLBACK;") {
            Ok(()) => debug!(
                "event=session_rollback module=db status=ok reason=release duration_ms={}",
                self.started_at.elapsed().as_millis()
            ),
            Err(err) => warn!(
                "event=session_rollback module=db status=error reason=release error={}",
                err
            ),
        }
    }
}
