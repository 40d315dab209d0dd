//! Repository layer abstractions and persistence implementations.
//!
//! # Responsibility
//! - Define use-case oriented data access contracts.
//! - Isolate SQLite query details from service and seeding orchestration.
//!
//! # Invariants
//! - Repositories only accept validated transfer shapes for writes.
//! - Repository APIs return semantic errors (`NotFound`) in addition to
//!   storage errors.
//! - Repositories never commit; the owning session decides.

pub mod exercise_repo;
