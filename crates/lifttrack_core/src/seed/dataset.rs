//! Seed dataset decoding.
//!
//! Datasets are JSON arrays of exercise objects; each element is validated
//! with the same rules as [`ExerciseCreate`].

use crate::transfer::{ExerciseCreate, ValidationError};
use serde_json::Value;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::path::{Path, PathBuf};

const DEFAULT_DATASET: &str = include_str!("../../data/exercises.json");

#[derive(Debug)]
pub enum DatasetError {
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    Json(serde_json::Error),
    /// Top-level JSON value is not an array.
    NotArray,
    Record {
        index: usize,
        source: ValidationError,
    },
}

impl Display for DatasetError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Io { path, source } => {
                write!(f, "failed to read dataset `{}`: {source}", path.display())
            }
            Self::Json(err) => write!(f, "dataset is not valid JSON: {err}"),
            Self::NotArray => write!(f, "dataset must be a JSON array of exercises"),
            Self::Record { index, source } => write!(f, "dataset record {index}: {source}"),
        }
    }
}

impl Error for DatasetError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Io { source, .. } => Some(source),
            Self::Json(err) => Some(err),
            Self::NotArray => None,
            Self::Record { source, .. } => Some(source),
        }
    }
}

/// Decodes and validates a JSON dataset, preserving record order.
pub fn parse_dataset(json: &str) -> Result<Vec<ExerciseCreate>, DatasetError> {
    let value: Value = serde_json::from_str(json).map_err(DatasetError::Json)?;
    let Value::Array(items) = value else {
        return Err(DatasetError::NotArray);
    };

    items
        .iter()
        .enumerate()
        .map(|(index, item)| {
            ExerciseCreate::from_value(item).map_err(|source| DatasetError::Record { index, source })
        })
        .collect()
}

/// Reads and validates a dataset file.
pub fn load_dataset(path: impl AsRef<Path>) -> Result<Vec<ExerciseCreate>, DatasetError> {
    let path = path.as_ref();
    let json = std::fs::read_to_string(path).map_err(|source| DatasetError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    parse_dataset(&json)
}

/// Baseline catalog bundled with the binary.
pub fn default_dataset() -> Result<Vec<ExerciseCreate>, DatasetError> {
    parse_dataset(DEFAULT_DATASET)
}
