//! Repository layer abstractions and persistence implementations.
//!
//! # Responsibility
//! - Define use-case oriented data access contracts.
//! - Isolate SQLite query details from service orchestration.
//!
//! # Invariants
//! - Repositories only operate on connections whose schema exists.
//! - Repository APIs return semantic errors (`DuplicateKey`) in addition to
//!   DB transport errors.

pub mod employee_repo;
