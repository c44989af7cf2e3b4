//! Employee domain model.
//!
//! # Responsibility
//! - Define canonical data structures used by core business logic.
//!
//! # Invariants
//! - Records are identified by (`full_name`, `birth_date`).
//! - Records are never mutated or deleted after persistence.

pub mod employee;
