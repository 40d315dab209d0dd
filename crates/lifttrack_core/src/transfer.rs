//! Transfer shapes validated at the system boundary.
//!
//! # Responsibility
//! - Validate untyped payloads into `ExerciseCreate`.
//! - Convert stored `Exercise` records into `ExerciseRead`.
//!
//! # Invariants
//! - Validation never coerces: a wrong-typed field is an error, not a cast.
//! - Every offending field is reported, not only the first one.
//! - Unknown keys are ignored.

use crate::model::exercise::{Exercise, ExerciseId};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::error::Error;
use std::fmt::{Display, Formatter};

const REQUIRED_FIELDS: [&str; 2] = ["name", "category"];
const OPTIONAL_FIELDS: [&str; 4] = [
    "specific_target",
    "mechanics",
    "exercise_type",
    "description",
];

/// Why a single field was rejected.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldIssueKind {
    Missing,
    InvalidType {
        expected: &'static str,
        found: &'static str,
    },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldIssue {
    pub field: &'static str,
    pub kind: FieldIssueKind,
}

impl Display for FieldIssue {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match &self.kind {
            FieldIssueKind::Missing => write!(f, "`{}` is required", self.field),
            FieldIssueKind::InvalidType { expected, found } => {
                write!(f, "`{}` must be {expected}, got {found}", self.field)
            }
        }
    }
}

/// Rejection of a transfer payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    /// Payload is not a JSON object.
    NotAnObject { found: &'static str },
    /// One or more fields are missing or of the wrong type.
    Fields(Vec<FieldIssue>),
}

impl ValidationError {
    /// Names of the offending fields, in declaration order.
    pub fn fields(&self) -> Vec<&'static str> {
        match self {
            Self::NotAnObject { .. } => Vec::new(),
            Self::Fields(issues) => issues.iter().map(|issue| issue.field).collect(),
        }
    }
}

impl Display for ValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NotAnObject { found } => {
                write!(f, "exercise payload must be an object, got {found}")
            }
            Self::Fields(issues) => {
                write!(f, "invalid exercise payload: ")?;
                for (position, issue) in issues.iter().enumerate() {
                    if position > 0 {
                        write!(f, "; ")?;
                    }
                    write!(f, "{issue}")?;
                }
                Ok(())
            }
        }
    }
}

impl Error for ValidationError {}

/// Input shape for a new exercise: every field except identity and timestamps.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "Value")]
pub struct ExerciseCreate {
    pub name: String,
    pub category: String,
    pub specific_target: Option<String>,
    pub mechanics: Option<String>,
    pub exercise_type: Option<String>,
    pub description: Option<String>,
}

impl ExerciseCreate {
    /// Builds an input with only the required fields set.
    pub fn new(name: impl Into<String>, category: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            category: category.into(),
            specific_target: None,
            mechanics: None,
            exercise_type: None,
            description: None,
        }
    }

    /// Validates an arbitrary decoded payload.
    pub fn from_value(value: &Value) -> Result<Self, ValidationError> {
        match value {
            Value::Object(map) => Self::from_mapping(map),
            other => Err(ValidationError::NotAnObject {
                found: json_kind(other),
            }),
        }
    }

    /// Validates a field-name to value mapping.
    ///
    /// # Errors
    /// - `ValidationError::Fields` listing each missing required field and
    ///   each field whose value is not a string (`null` is accepted for
    ///   optional fields only).
    pub fn from_mapping(map: &Map<String, Value>) -> Result<Self, ValidationError> {
        let mut issues = Vec::new();

        let [name, category] = REQUIRED_FIELDS.map(|field| required_text(map, field, &mut issues));
        let [specific_target, mechanics, exercise_type, description] =
            OPTIONAL_FIELDS.map(|field| optional_text(map, field, &mut issues));

        match (name, category) {
            (Some(name), Some(category)) if issues.is_empty() => Ok(Self {
                name,
                category,
                specific_target,
                mechanics,
                exercise_type,
                description,
            }),
            _ => Err(ValidationError::Fields(issues)),
        }
    }
}

impl TryFrom<Value> for ExerciseCreate {
    type Error = ValidationError;

    fn try_from(value: Value) -> Result<Self, Self::Error> {
        Self::from_value(&value)
    }
}

/// Output shape of a stored exercise, including read-only identity and timestamps.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExerciseRead {
    pub id: ExerciseId,
    pub name: String,
    pub category: String,
    pub specific_target: Option<String>,
    pub mechanics: Option<String>,
    pub exercise_type: Option<String>,
    pub description: Option<String>,
    pub created_at: i64,
    pub updated_at: Option<i64>,
}

impl From<&Exercise> for ExerciseRead {
    fn from(exercise: &Exercise) -> Self {
        Self {
            id: exercise.id,
            name: exercise.name.clone(),
            category: exercise.category.clone(),
            specific_target: exercise.specific_target.clone(),
            mechanics: exercise.mechanics.clone(),
            exercise_type: exercise.exercise_type.clone(),
            description: exercise.description.clone(),
            created_at: exercise.created_at,
            updated_at: exercise.updated_at,
        }
    }
}

impl From<Exercise> for ExerciseRead {
    fn from(exercise: Exercise) -> Self {
        Self {
            id: exercise.id,
            name: exercise.name,
            category: exercise.category,
            specific_target: exercise.specific_target,
            mechanics: exercise.mechanics,
            exercise_type: exercise.exercise_type,
            description: exercise.description,
            created_at: exercise.created_at,
            updated_at: exercise.updated_at,
        }
    }
}

fn required_text(
    map: &Map<String, Value>,
    field: &'static str,
    issues: &mut Vec<FieldIssue>,
) -> Option<String> {
    match map.get(field) {
        None => {
            issues.push(FieldIssue {
                field,
                kind: FieldIssueKind::Missing,
            });
            None
        }
        Some(Value::String(text)) => Some(text.clone()),
        Some(other) => {
            issues.push(invalid_type(field, other));
            None
        }
    }
}

fn optional_text(
    map: &Map<String, Value>,
    field: &'static str,
    issues: &mut Vec<FieldIssue>,
) -> Option<String> {
    match map.get(field) {
        None | Some(Value::Null) => None,
        Some(Value::String(text)) => Some(text.clone()),
        Some(other) => {
            issues.push(invalid_type(field, other));
            None
        }
    }
}

fn invalid_type(field: &'static str, value: &Value) -> FieldIssue {
    FieldIssue {
        field,
        kind: FieldIssueKind::InvalidType {
            expected: "a string",
            found: json_kind(value),
        },
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
