//! Exercise use-case service.
//!
//! # Responsibility
//! - Accept untyped payloads, validate them, and persist through a repository.
//! - Return `ExerciseRead` output shapes to callers.
//!
//! # Invariants
//! - Payloads are validated before any storage call is made.
//! - The service never commits; the session owning the repository does.

use crate::model::exercise::ExerciseId;
use crate::repo::exercise_repo::{ExerciseListQuery, ExerciseRepository, RepoError};
use crate::transfer::{ExerciseCreate, ExerciseRead, ValidationError};
use serde_json::Value;
use std::error::Error;
use std::fmt::{Display, Formatter};

pub type ServiceResult<T> = Result<T, ServiceError>;

#[derive(Debug)]
pub enum ServiceError {
    Validation(ValidationError),
    Repo(RepoError),
}

impl Display for ServiceError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Validation(err) => write!(f, "{err}"),
            Self::Repo(err) => write!(f, "{err}"),
        }
    }
}

impl Error for ServiceError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Validation(err) => Some(err),
            Self::Repo(err) => Some(err),
        }
    }
}

impl From<ValidationError> for ServiceError {
    fn from(value: ValidationError) -> Self {
        Self::Validation(value)
    }
}

impl From<RepoError> for ServiceError {
    fn from(value: RepoError) -> Self {
        Self::Repo(value)
    }
}

/// Use-case service wrapper for exercise CRUD operations.
pub struct ExerciseService<R: ExerciseRepository> {
    repo: R,
}

impl<R: ExerciseRepository> ExerciseService<R> {
    pub fn new(repo: R) -> Self {
        Self { repo }
    }

    /// Creates an exercise from an already validated input.
    pub fn create(&self, input: &ExerciseCreate) -> ServiceResult<ExerciseRead> {
        let exercise = self.repo.create_exercise(input)?;
        Ok(exercise.into())
    }

    /// Validates a decoded request payload and creates the exercise.
    pub fn create_from_payload(&self, payload: &Value) -> ServiceResult<ExerciseRead> {
        let input = ExerciseCreate::from_value(payload)?;
        self.create(&input)
    }

    pub fn get(&self, id: ExerciseId) -> ServiceResult<Option<ExerciseRead>> {
        let exercise = self.repo.get_exercise(id)?;
        Ok(exercise.map(ExerciseRead::from))
    }

    pub fn list(&self, query: &ExerciseListQuery) -> ServiceResult<Vec<ExerciseRead>> {
        let exercises = self.repo.list_exercises(query)?;
        Ok(exercises.into_iter().map(ExerciseRead::from).collect())
    }

    /// Validates a payload and replaces the mutable fields of `id`.
    ///
    /// Returns `RepoError::NotFound` unchanged when `id` does not exist.
    pub fn update_from_payload(&self, id: ExerciseId, payload: &Value) -> ServiceResult<ExerciseRead> {
        let input = ExerciseCreate::from_value(payload)?;
        let exercise = self.repo.update_exercise(id, &input)?;
        Ok(exercise.into())
    }

    pub fn delete(&self, id: ExerciseId) -> ServiceResult<()> {
        self.repo.delete_exercise(id)?;
        Ok(())
    }

    pub fn count(&self) -> ServiceResult<u64> {
        Ok(self.repo.count_exercises()?)
    }
}
