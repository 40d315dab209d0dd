//! Exercise entity and its storage mapping.
//!
//! # Responsibility
//! - Define the persisted `Exercise` shape.
//! - Declare table columns, nullability and indexes for schema checks.
//!
//! # Invariants
//! - `id` is assigned by storage and never changes afterwards.
//! - `name` and `category` are never null.
//! - `created_at` is written once on insert; `updated_at` stays `None`
//!   until the first mutation.

use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};

/// Store-assigned identity of an exercise row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ExerciseId(pub i64);

impl ExerciseId {
    pub fn get(self) -> i64 {
        self.0
    }
}

impl Display for ExerciseId {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Persisted exercise record.
///
/// Timestamps are Unix epoch milliseconds produced by the storage layer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Exercise {
    pub id: ExerciseId,
    pub name: String,
    /// Coarse muscle group, e.g. `Chest` or `Legs`.
    pub category: String,
    /// Fine-grained target muscle.
    pub specific_target: Option<String>,
    /// Movement mechanics, e.g. `Compound` or `Isolation`.
    pub mechanics: Option<String>,
    pub exercise_type: Option<String>,
    /// Reserved for future use.
    pub description: Option<String>,
    pub created_at: i64,
    pub updated_at: Option<i64>,
}

/// Column storage class as declared in SQLite DDL.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnType {
    Integer,
    Text,
}

impl ColumnType {
    pub fn as_sql(self) -> &'static str {
        match self {
            Self::Integer => "INTEGER",
            Self::Text => "TEXT",
        }
    }
}

/// Declared column of a mapped table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ColumnDef {
    pub name: &'static str,
    pub kind: ColumnType,
    pub nullable: bool,
    pub primary_key: bool,
}

/// Declared secondary index of a mapped table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IndexDef {
    pub name: &'static str,
    pub column: &'static str,
}

/// Declared storage-side trigger of a mapped table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TriggerDef {
    pub name: &'static str,
    /// What the trigger maintains, for diagnostics.
    pub maintains: &'static str,
}

/// Declared relational mapping of one entity.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TableDef {
    pub name: &'static str,
    pub columns: &'static [ColumnDef],
    pub indexes: &'static [IndexDef],
    pub triggers: &'static [TriggerDef],
}

impl TableDef {
    pub fn column(&self, name: &str) -> Option<&ColumnDef> {
        self.columns.iter().find(|column| column.name == name)
    }
}

const fn column(
    name: &'static str,
    kind: ColumnType,
    nullable: bool,
    primary_key: bool,
) -> ColumnDef {
    ColumnDef {
        name,
        kind,
        nullable,
        primary_key,
    }
}

/// Storage mapping for [`Exercise`].
pub const EXERCISE_TABLE: TableDef = TableDef {
    name: "exercises",
    columns: &[
        column("id", ColumnType::Integer, false, true),
        column("name", ColumnType::Text, false, false),
        column("category", ColumnType::Text, false, false),
        column("specific_target", ColumnType::Text, true, false),
        column("mechanics", ColumnType::Text, true, false),
        column("exercise_type", ColumnType::Text, true, false),
        column("description", ColumnType::Text, true, false),
        column("created_at", ColumnType::Integer, false, false),
        column("updated_at", ColumnType::Integer, true, false),
    ],
    indexes: &[IndexDef {
        name: "ix_exercises_name",
        column: "name",
    }],
    triggers: &[
        TriggerDef {
            name: "exercises_identity_immutable",
            maintains: "id and created_at never change",
        },
        TriggerDef {
            name: "exercises_touch_updated_at",
            maintains: "updated_at is set on every mutation",
        },
    ],
};

/// All tables owned by the core schema, in creation order.
pub const TABLES: &[TableDef] = &[EXERCISE_TABLE];
