//! Core use-case services.
//!
//! # Responsibility
//! - Orchestrate transfer-shape validation and repository calls into
//!   use-case level APIs for an outer API layer.
//! - Keep callers decoupled from storage details.

pub mod exercise_service;
