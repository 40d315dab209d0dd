//! Schema migration registry and compatibility checks.
//!
//! # Responsibility
//! - Register schema migrations in strictly increasing order.
//! - Apply pending migrations atomically.
//! - Compare existing tables with their declared mapping before touching them.
//!
//! # Invariants
//! - `version` values must remain monotonic.
//! - Applied migration version is mirrored to `PRAGMA user_version`.
//! - Migration SQL is idempotent DDL, so replaying it restores dropped
//!   tables, indexes and triggers.

use crate::db::{StorageError, StorageResult};
use crate::model::exercise::{TableDef, TABLES};
use rusqlite::{Connection, OptionalExtension, TransactionBehavior};

#[derive(Debug, Clone, Copy)]
struct Migration {
    version: u32,
    sql: &'static str,
}

const MIGRATIONS: &[Migration] = &[Migration {
    version: 1,
    sql: include_str!("0001_init.sql"),
}];

/// Returns the latest migration version known by this binary.
pub fn latest_version() -> u32 {
    MIGRATIONS.last().map_or(0, |migration| migration.version)
}

/// Applies pending migrations and returns the resulting schema version.
///
/// # Errors
/// - `UnsupportedSchemaVersion` when the database is newer than this binary.
/// - `IncompatibleSchema` when a declared table already exists with a
///   different shape; nothing is written in that case.
pub fn apply_migrations(conn: &mut Connection) -> StorageResult<u32> {
    // Write lock up front: a concurrent initializer waits on the busy timeout
    // instead of failing on a read-to-write lock upgrade.
    let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;
    let current_version = current_user_version(&tx)?;
    let latest = latest_version();

    if current_version > latest {
        return Err(StorageError::UnsupportedSchemaVersion {
            db_version: current_version,
            latest_supported: latest,
        });
    }

    let mut any_missing = false;
    for table in TABLES {
        if object_exists(&tx, "table", table.name)? {
            verify_table(&tx, table)?;
        } else {
            any_missing = true;
        }
        for index in table.indexes {
            if !object_exists(&tx, "index", index.name)? {
                any_missing = true;
            }
        }
        for trigger in table.triggers {
            if !object_exists(&tx, "trigger", trigger.name)? {
                any_missing = true;
            }
        }
    }

    if current_version == latest && !any_missing {
        return Ok(current_version);
    }

    for migration in MIGRATIONS {
        if migration.version <= current_version && !any_missing {
            continue;
        }

        tx.execute_batch(migration.sql)?;
        tx.execute_batch(&format!("PRAGMA user_version = {};", migration.version))?;
    }
    tx.commit()?;

    Ok(latest)
}

fn current_user_version(conn: &Connection) -> StorageResult<u32> {
    let version = conn.query_row("PRAGMA user_version;", [], |row| row.get::<_, u32>(0))?;
    Ok(version)
}

fn object_exists(conn: &Connection, kind: &str, name: &str) -> StorageResult<bool> {
    let found = conn
        .query_row(
            "SELECT 1 FROM sqlite_master WHERE type = ?1 AND name = ?2;",
            [kind, name],
            |row| row.get::<_, i64>(0),
        )
        .optional()?;
    Ok(found.is_some())
}

#[derive(Debug)]
struct ExistingColumn {
    name: String,
    declared_type: String,
    not_null: bool,
    primary_key: bool,
}

fn existing_columns(conn: &Connection, table: &str) -> StorageResult<Vec<ExistingColumn>> {
    let mut stmt = conn.prepare("SELECT name, type, \"notnull\", pk FROM pragma_table_info(?1);")?;
    let rows = stmt.query_map([table], |row| {
        Ok(ExistingColumn {
            name: row.get(0)?,
            declared_type: row.get(1)?,
            not_null: row.get::<_, i64>(2)? != 0,
            primary_key: row.get::<_, i64>(3)? != 0,
        })
    })?;

    let mut columns = Vec::new();
    for column in rows {
        columns.push(column?);
    }
    Ok(columns)
}

fn verify_table(conn: &Connection, table: &TableDef) -> StorageResult<()> {
    let existing = existing_columns(conn, table.name)?;
    let incompatible = |detail: String| StorageError::IncompatibleSchema {
        table: table.name,
        detail,
    };

    for declared in table.columns {
        let Some(found) = existing.iter().find(|column| column.name == declared.name) else {
            return Err(incompatible(format!("missing column `{}`", declared.name)));
        };

        if !found.declared_type.eq_ignore_ascii_case(declared.kind.as_sql()) {
            return Err(incompatible(format!(
                "column `{}` has type `{}`, expected `{}`",
                declared.name,
                found.declared_type,
                declared.kind.as_sql()
            )));
        }

        if found.primary_key != declared.primary_key {
            return Err(incompatible(format!(
                "column `{}` primary key mismatch",
                declared.name
            )));
        }

        // SQLite reports INTEGER PRIMARY KEY as nullable; the rowid alias never is.
        if !declared.primary_key && found.not_null == declared.nullable {
            return Err(incompatible(format!(
                "column `{}` nullability mismatch (expected {})",
                declared.name,
                if declared.nullable { "NULL" } else { "NOT NULL" }
            )));
        }
    }

    Ok(())
}
