//! Core persistence layer for the LiftTrack exercise catalog.
//!
//! Defines the `Exercise` entity and its table mapping, boundary transfer
//! shapes, the storage engine with scoped sessions, and baseline seeding.

pub mod config;
pub mod db;
pub mod logging;
pub mod model;
pub mod repo;
pub mod seed;
pub mod service;
pub mod transfer;

pub use config::{ConfigError, StorageConfig, StorageTarget};
pub use db::{Engine, Session, StorageError, StorageResult};
pub use logging::{default_log_level, init_logging, logging_status, LoggingConfig, LoggingError};
pub use model::exercise::{Exercise, ExerciseId, EXERCISE_TABLE};
pub use repo::exercise_repo::{
    ExerciseListQuery, ExerciseRepository, RepoError, RepoResult, SqliteExerciseRepository,
};
pub use seed::dataset::{default_dataset, load_dataset, parse_dataset, DatasetError};
pub use seed::{SeedError, SeedReport, Seeder};
pub use service::exercise_service::{ExerciseService, ServiceError, ServiceResult};
pub use transfer::{ExerciseCreate, ExerciseRead, FieldIssue, FieldIssueKind, ValidationError};

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
