//! Baseline seeding of the exercise catalog.
//!
//! # Responsibility
//! - Replace the whole `exercises` table with a static dataset.
//! - Report how many records were seeded.
//!
//! # Invariants
//! - Deletion and every insert commit as one unit or not at all.
//! - Records are inserted in dataset order.
//! - Reseeding assigns new ids; existing rows are never merged or upserted.
//! - Concurrent seeding of one store is not supported; callers serialize.

use crate::db::{Engine, StorageError};
use crate::repo::exercise_repo::{ExerciseRepository, RepoError, SqliteExerciseRepository};
use crate::transfer::ExerciseCreate;
use log::{error, info};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::time::Instant;

pub mod dataset;

/// Outcome of one successful seeding run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SeedReport {
    /// Rows removed by the reset step.
    pub removed: usize,
    /// Rows inserted from the dataset.
    pub seeded: usize,
}

#[derive(Debug)]
pub enum SeedError {
    /// Schema setup, session or commit failure.
    Storage(StorageError),
    /// Removing the previous baseline failed.
    Clear(RepoError),
    /// Inserting one dataset record failed.
    Record {
        index: usize,
        name: String,
        source: RepoError,
    },
}

impl Display for SeedError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Storage(err) => write!(f, "seeding failed: {err}"),
            Self::Clear(err) => write!(f, "seeding failed while clearing exercises: {err}"),
            Self::Record {
                index,
                name,
                source,
            } => write!(
                f,
                "seeding failed at record {index} (`{name}`): {source}"
            ),
        }
    }
}

impl Error for SeedError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Storage(err) => Some(err),
            Self::Clear(err) => Some(err),
            Self::Record { source, .. } => Some(source),
        }
    }
}

impl From<StorageError> for SeedError {
    fn from(value: StorageError) -> Self {
        Self::Storage(value)
    }
}

/// Full replace-load of exercise baselines through an injected engine.
pub struct Seeder<'e> {
    engine: &'e Engine,
}

impl<'e> Seeder<'e> {
    pub fn new(engine: &'e Engine) -> Self {
        Self { engine }
    }

    /// Resets the `exercises` table to exactly `records`.
    ///
    /// An empty dataset is valid and leaves the table empty.
    ///
    /// # Errors
    /// Any failure rolls back the deletion and all inserts before returning.
    ///
    /// # Side effects
    /// - Emits `seed` logging events with counts, duration and status.
    pub fn seed(&self, records: &[ExerciseCreate]) -> Result<SeedReport, SeedError> {
        let started_at = Instant::now();
        info!(
            "event=seed module=seed status=start records={}",
            records.len()
        );

        match self.replace_all(records) {
            Ok(report) => {
                info!(
                    "event=seed module=seed status=ok removed={} seeded={} duration_ms={}",
                    report.removed,
                    report.seeded,
                    started_at.elapsed().as_millis()
                );
                Ok(report)
            }
            Err(err) => {
                error!(
                    "event=seed module=seed status=error duration_ms={} error={}",
                    started_at.elapsed().as_millis(),
                    err
                );
                Err(err)
            }
        }
    }

    fn replace_all(&self, records: &[ExerciseCreate]) -> Result<SeedReport, SeedError> {
        self.engine.initialize_schema()?;

        // Returning early drops the session, which rolls back.
        let session = self.engine.open_write_session()?;
        let repo = SqliteExerciseRepository::new(session.connection());

        let removed = repo.delete_all_exercises().map_err(SeedError::Clear)?;
        for (index, record) in records.iter().enumerate() {
            repo.create_exercise(record)
                .map_err(|source| SeedError::Record {
                    index,
                    name: record.name.clone(),
                    source,
                })?;
        }

        session.commit()?;

        Ok(SeedReport {
            removed,
            seeded: records.len(),
        })
    }
}
