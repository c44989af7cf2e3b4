//! Core domain logic for staffdb.
//! This crate is the single source of truth for employee storage invariants.

pub mod config;
pub mod db;
pub mod export;
pub mod generator;
pub mod logging;
pub mod model;
pub mod repo;
pub mod service;

pub use config::{ConfigError, StaffConfig};
pub use export::{CriteriaReport, ExportError, ExportOutcome, ExportTargets};
pub use generator::{EmployeeGenerator, FIXED_PATTERN_BATCH, FIXED_PATTERN_SURNAME};
pub use logging::{default_log_level, init_logging, log_startup, logging_status};
pub use model::employee::{Employee, EmployeeValidationError, Gender};
pub use repo::employee_repo::{
    BulkInsertReport, CriteriaQuery, EmployeeRepository, ListedEmployee, RepoError, RepoResult,
    SqliteEmployeeRepository, CRITERIA_LIMIT_MAX,
};
pub use service::employee_service::{BulkLoadReport, EmployeeService};

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
