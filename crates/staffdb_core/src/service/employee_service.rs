//! Employee use-case service.
//!
//! # Responsibility
//! - Provide stable entry points for the command dispatcher.
//! - Delegate persistence to repository implementations.
//!
//! # Invariants
//! - Service APIs never bypass repository persistence contracts.
//! - Service layer remains storage-agnostic.

use crate::export::{run_criteria_export, CriteriaReport, ExportTargets};
use crate::generator::EmployeeGenerator;
use crate::model::employee::Employee;
use crate::repo::employee_repo::{
    BulkInsertReport, CriteriaQuery, EmployeeRepository, ListedEmployee, RepoResult,
};
use log::info;
use rand::Rng;
use std::time::Instant;

/// Use-case service wrapper for employee operations.
pub struct EmployeeService<R: EmployeeRepository> {
    repo: R,
}

/// Result of a generate-and-load run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BulkLoadReport {
    /// Records produced in memory, fixed-pattern batch included.
    pub generated: usize,
    pub insert: BulkInsertReport,
}

impl<R: EmployeeRepository> EmployeeService<R> {
    /// Creates a service using the provided repository implementation.
    pub fn new(repo: R) -> Self {
        Self { repo }
    }

    /// Validates raw input and inserts one employee.
    ///
    /// # Errors
    /// - `Validation` for a malformed date or unknown gender.
    /// - `DuplicateKey` when the name/birth date pair already exists.
    pub fn create_employee(
        &self,
        full_name: &str,
        birth_date: &str,
        gender: &str,
    ) -> RepoResult<Employee> {
        let employee = Employee::parse(full_name, birth_date, gender)?;
        self.repo.insert_one(&employee)?;
        Ok(employee)
    }

    /// Generates `count` random records (+ the fixed-pattern batch) and
    /// bulk-inserts them in one commit.
    pub fn generate_bulk_data<G: Rng>(&mut self, count: usize, rng: G) -> RepoResult<BulkLoadReport> {
        let started_at = Instant::now();
        let employees = EmployeeGenerator::new(rng).generate_bulk(count)?;
        info!(
            "event=bulk_generate module=service status=ok generated={} duration_ms={}",
            employees.len(),
            started_at.elapsed().as_millis()
        );

        let insert = self.repo.bulk_insert(&employees)?;
        Ok(BulkLoadReport {
            generated: employees.len(),
            insert,
        })
    }

    /// Lists distinct employees ordered by name and birth date.
    pub fn list_sorted(&self) -> RepoResult<Vec<ListedEmployee>> {
        self.repo.fetch_all_sorted()
    }

    /// Runs the fixed-pattern criteria query and exports its artifacts.
    pub fn export_fixed_pattern(&self, targets: &ExportTargets) -> RepoResult<CriteriaReport> {
        self.export_criteria(&CriteriaQuery::fixed_pattern(), targets)
    }

    /// Runs an arbitrary criteria query and exports its artifacts.
    pub fn export_criteria(
        &self,
        query: &CriteriaQuery,
        targets: &ExportTargets,
    ) -> RepoResult<CriteriaReport> {
        run_criteria_export(&self.repo, query, targets)
    }

    /// Runs index/statistics/compaction maintenance.
    pub fn optimize(&self) -> RepoResult<()> {
        self.repo.optimize()
    }

    /// Number of stored employees.
    pub fn count(&self) -> RepoResult<u64> {
        self.repo.count()
    }
}
