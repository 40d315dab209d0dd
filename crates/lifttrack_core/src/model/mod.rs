//! Domain model for the exercise catalog.
//!
//! # Responsibility
//! - Define the canonical `Exercise` record used by storage and services.
//! - Declare how that record maps onto relational storage.
//!
//! # Invariants
//! - Every stored exercise is identified by a store-assigned `ExerciseId`.
//! - The model has no relationships; each record is flat and self-contained.

pub mod exercise;
