//! Exercise repository contracts and SQLite implementation.
//!
//! # Responsibility
//! - Provide CRUD APIs over the `exercises` table.
//! - Keep SQL details inside the core persistence boundary.
//!
//! # Invariants
//! - `id`, `created_at` and `updated_at` are never written from here;
//!   storage defaults and triggers own them.
//! - Read paths reject invalid persisted state instead of masking it.

use crate::db::StorageError;
use crate::model::exercise::{Exercise, ExerciseId};
use crate::transfer::ExerciseCreate;
use rusqlite::types::Value;
use rusqlite::{params, params_from_iter, Connection, Row};
use std::error::Error;
use std::fmt::{Display, Formatter};

const EXERCISE_COLUMNS: &str = "id,
    name,
    category,
    specific_target,
    mechanics,
    exercise_type,
    description,
    created_at,
    updated_at";

pub type RepoResult<T> = Result<T, RepoError>;

/// Repository error for exercise persistence and query operations.
#[derive(Debug)]
pub enum RepoError {
    Storage(StorageError),
    NotFound(ExerciseId),
    InvalidData(String),
}

impl Display for RepoError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Storage(err) => write!(f, "{err}"),
            Self::NotFound(id) => write!(f, "exercise not found: {id}"),
            Self::InvalidData(message) => {
                write!(f, "invalid persisted exercise data: {message}")
            }
        }
    }
}

impl Error for RepoError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Storage(err) => Some(err),
            Self::NotFound(_) | Self::InvalidData(_) => None,
        }
    }
}

impl From<StorageError> for RepoError {
    fn from(value: StorageError) -> Self {
        Self::Storage(value)
    }
}

impl From<rusqlite::Error> for RepoError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Storage(StorageError::Sqlite(value))
    }
}

/// Query options for listing exercises.
#[derive(Debug, Clone, Default)]
pub struct ExerciseListQuery {
    /// Exact category match.
    pub category: Option<String>,
    pub limit: Option<u32>,
    pub offset: u32,
}

/// Repository interface for exercise CRUD operations.
pub trait ExerciseRepository {
    fn create_exercise(&self, input: &ExerciseCreate) -> RepoResult<Exercise>;
    fn get_exercise(&self, id: ExerciseId) -> RepoResult<Option<Exercise>>;
    fn list_exercises(&self, query: &ExerciseListQuery) -> RepoResult<Vec<Exercise>>;
    /// Replaces every mutable field of an existing exercise.
    fn update_exercise(&self, id: ExerciseId, input: &ExerciseCreate) -> RepoResult<Exercise>;
    fn delete_exercise(&self, id: ExerciseId) -> RepoResult<()>;
    /// Removes every exercise and returns how many rows were deleted.
    fn delete_all_exercises(&self) -> RepoResult<usize>;
    fn count_exercises(&self) -> RepoResult<u64>;
}

/// SQLite-backed exercise repository.
pub struct SqliteExerciseRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteExerciseRepository<'conn> {
    pub fn new(conn: &'conn Connection) -> Self {
        Self { conn }
    }
}

impl ExerciseRepository for SqliteExerciseRepository<'_> {
    fn create_exercise(&self, input: &ExerciseCreate) -> RepoResult<Exercise> {
        let mut stmt = self.conn.prepare_cached(&format!(
            "INSERT INTO exercises (
                name,
                category,
                specific_target,
                mechanics,
                exercise_type,
                description
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6)
            RETURNING {EXERCISE_COLUMNS};"
        ))?;

        let mut rows = stmt.query(params![
            input.name.as_str(),
            input.category.as_str(),
            input.specific_target.as_deref(),
            input.mechanics.as_deref(),
            input.exercise_type.as_deref(),
            input.description.as_deref(),
        ])?;

        if let Some(row) = rows.next()? {
            return parse_exercise_row(row);
        }

        Err(RepoError::InvalidData(
            "insert into exercises returned no row".to_string(),
        ))
    }

    fn get_exercise(&self, id: ExerciseId) -> RepoResult<Option<Exercise>> {
        let mut stmt = self
            .conn
            .prepare_cached(&format!("SELECT {EXERCISE_COLUMNS} FROM exercises WHERE id = ?1;"))?;

        let mut rows = stmt.query([id.get()])?;
        if let Some(row) = rows.next()? {
            return Ok(Some(parse_exercise_row(row)?));
        }

        Ok(None)
    }

    fn list_exercises(&self, query: &ExerciseListQuery) -> RepoResult<Vec<Exercise>> {
        let mut sql = format!("SELECT {EXERCISE_COLUMNS} FROM exercises WHERE 1 = 1");
        let mut bind_values: Vec<Value> = Vec::new();

        if let Some(category) = &query.category {
            sql.push_str(" AND category = ?");
            bind_values.push(Value::Text(category.clone()));
        }

        sql.push_str(" ORDER BY id ASC");

        if let Some(limit) = query.limit {
            sql.push_str(" LIMIT ?");
            bind_values.push(Value::Integer(i64::from(limit)));
            if query.offset > 0 {
                sql.push_str(" OFFSET ?");
                bind_values.push(Value::Integer(i64::from(query.offset)));
            }
        } else if query.offset > 0 {
            sql.push_str(" LIMIT -1 OFFSET ?");
            bind_values.push(Value::Integer(i64::from(query.offset)));
        }

        let mut stmt = self.conn.prepare(&sql)?;
        let mut rows = stmt.query(params_from_iter(bind_values))?;
        let mut exercises = Vec::new();

        while let Some(row) = rows.next()? {
            exercises.push(parse_exercise_row(row)?);
        }

        Ok(exercises)
    }

    fn update_exercise(&self, id: ExerciseId, input: &ExerciseCreate) -> RepoResult<Exercise> {
        let changed = self.conn.execute(
            "UPDATE exercises
             SET
                name = ?1,
                category = ?2,
                specific_target = ?3,
                mechanics = ?4,
                exercise_type = ?5,
                description = ?6
             WHERE id = ?7;",
            params![
                input.name.as_str(),
                input.category.as_str(),
                input.specific_target.as_deref(),
                input.mechanics.as_deref(),
                input.exercise_type.as_deref(),
                input.description.as_deref(),
                id.get(),
            ],
        )?;

        if changed == 0 {
            return Err(RepoError::NotFound(id));
        }

        self.get_exercise(id)?.ok_or(RepoError::NotFound(id))
    }

    fn delete_exercise(&self, id: ExerciseId) -> RepoResult<()> {
        let changed = self
            .conn
            .execute("DELETE FROM exercises WHERE id = ?1;", [id.get()])?;

        if changed == 0 {
            return Err(RepoError::NotFound(id));
        }

        Ok(())
    }

    fn delete_all_exercises(&self) -> RepoResult<usize> {
        let removed = self.conn.execute("DELETE FROM exercises;", [])?;
        Ok(removed)
    }

    fn count_exercises(&self) -> RepoResult<u64> {
        let count = self
            .conn
            .query_row("SELECT COUNT(*) FROM exercises;", [], |row| row.get::<_, i64>(0))?;
        u64::try_from(count)
            .map_err(|_| RepoError::InvalidData(format!("negative exercise count `{count}`")))
    }
}

fn parse_exercise_row(row: &Row<'_>) -> RepoResult<Exercise> {
    let id: i64 = row.get("id")?;

    let name: Option<String> = row.get("name")?;
    let name = name.ok_or_else(|| {
        RepoError::InvalidData(format!("null name for exercise {id} in exercises.name"))
    })?;

    let category: Option<String> = row.get("category")?;
    let category = category.ok_or_else(|| {
        RepoError::InvalidData(format!(
            "null category for exercise {id} in exercises.category"
        ))
    })?;

    let created_at: Option<i64> = row.get("created_at")?;
    let created_at = created_at.ok_or_else(|| {
        RepoError::InvalidData(format!(
            "null created_at for exercise {id} in exercises.created_at"
        ))
    })?;

    Ok(Exercise {
        id: ExerciseId(id),
        name,
        category,
        specific_target: row.get("specific_target")?,
        mechanics: row.get("mechanics")?,
        exercise_type: row.get("exercise_type")?,
        description: row.get("description")?,
        created_at,
        updated_at: row.get("updated_at")?,
    })
}
