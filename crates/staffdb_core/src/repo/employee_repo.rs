//! Employee repository contracts and SQLite implementation.
//!
//! # Responsibility
//! - Provide insert, listing, criteria and maintenance APIs over `employees`.
//! - Keep SQL details inside the core persistence boundary.
//!
//! # Invariants
//! - `insert_one` is strict: a duplicate (`full_name`, `birth_date`) fails
//!   with `DuplicateKey`.
//! - `bulk_insert` is lenient: duplicates are skipped, never reported as
//!   errors, and the whole batch commits once.
//! - Stored `age` is the calendar-aware age on the day of the write.
//! - Read paths reject invalid persisted rows instead of masking them.

use crate::db::DbError;
use crate::generator::FIXED_PATTERN_SURNAME;
use crate::model::employee::{Employee, EmployeeValidationError, Gender};
use chrono::{Local, NaiveDate};
use log::{error, info};
use rusqlite::{params, Connection, Row};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::time::Instant;

/// Upper bound applied to every criteria query limit.
pub const CRITERIA_LIMIT_MAX: u32 = 1000;

const EMPLOYEES_TABLE: &str = "employees";
const GENDER_NAME_INDEX: &str = "idx_gender_full_name";

const OPTIMIZE_STEPS: &[(&str, &str)] = &[
    (
        "create_index",
        "CREATE INDEX IF NOT EXISTS idx_gender_full_name ON employees(gender, full_name);",
    ),
    ("analyze", "ANALYZE;"),
    ("pragma_optimize", "PRAGMA optimize;"),
    ("vacuum", "VACUUM;"),
];

pub type RepoResult<T> = Result<T, RepoError>;

/// Repository error for employee persistence and query operations.
#[derive(Debug)]
pub enum RepoError {
    Validation(EmployeeValidationError),
    Db(DbError),
    /// Single insert hit the (`full_name`, `birth_date`) uniqueness constraint.
    DuplicateKey {
        full_name: String,
        birth_date: String,
    },
    MissingRequiredTable(&'static str),
    InvalidData(String),
}

impl Display for RepoError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Validation(err) => write!(f, "{err}"),
            Self::Db(err) => write!(f, "{err}"),
            Self::DuplicateKey {
                full_name,
                birth_date,
            } => write!(
                f,
                "employee `{full_name}` born {birth_date} already exists"
            ),
            Self::MissingRequiredTable(table) => {
                write!(f, "required table `{table}` is missing; create the schema first")
            }
            Self::InvalidData(message) => write!(f, "invalid persisted employee data: {message}"),
        }
    }
}

impl Error for RepoError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Validation(err) => Some(err),
            Self::Db(err) => Some(err),
            Self::DuplicateKey { .. } => None,
            Self::MissingRequiredTable(_) => None,
            Self::InvalidData(_) => None,
        }
    }
}

impl From<EmployeeValidationError> for RepoError {
    fn from(value: EmployeeValidationError) -> Self {
        Self::Validation(value)
    }
}

impl From<DbError> for RepoError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<rusqlite::Error> for RepoError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Db(DbError::Sqlite(value))
    }
}

/// Criteria for [`EmployeeRepository::fetch_by_criteria`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CriteriaQuery {
    /// Exact gender match.
    pub gender: Gender,
    /// Literal `full_name` prefix. Matched with SQLite `LIKE`, so ASCII case is ignored.
    pub name_prefix: String,
    /// Maximum rows; clamped to [`CRITERIA_LIMIT_MAX`].
    pub limit: u32,
}

impl CriteriaQuery {
    /// Male employees carrying the fixed-pattern surname, up to the cap.
    pub fn fixed_pattern() -> Self {
        Self {
            gender: Gender::Male,
            name_prefix: FIXED_PATTERN_SURNAME.to_string(),
            limit: CRITERIA_LIMIT_MAX,
        }
    }
}

/// Row returned by the sorted listing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListedEmployee {
    pub employee: Employee,
    /// Plain year difference; see [`Employee::year_difference_age`].
    pub listed_age: i32,
}

/// Outcome counters of one bulk insert.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BulkInsertReport {
    pub submitted: usize,
    pub inserted: usize,
    /// Duplicates within the batch or against existing rows.
    pub skipped: usize,
}

/// Repository interface for employee storage.
pub trait EmployeeRepository {
    /// Inserts one record and commits immediately.
    fn insert_one(&self, employee: &Employee) -> RepoResult<()>;
    /// Inserts a batch in one transaction, skipping duplicates.
    fn bulk_insert(&mut self, employees: &[Employee]) -> RepoResult<BulkInsertReport>;
    /// Lists distinct records ordered by `full_name`, `birth_date`.
    fn fetch_all_sorted(&self) -> RepoResult<Vec<ListedEmployee>>;
    /// Returns matching records in storage order.
    fn fetch_by_criteria(&self, query: &CriteriaQuery) -> RepoResult<Vec<Employee>>;
    /// Rebuilds the lookup index, refreshes statistics and compacts the file.
    fn optimize(&self) -> RepoResult<()>;
    /// Number of stored rows.
    fn count(&self) -> RepoResult<u64>;
}

/// SQLite-backed employee repository.
pub struct SqliteEmployeeRepository<'conn> {
    conn: &'conn mut Connection,
}

impl<'conn> SqliteEmployeeRepository<'conn> {
    /// Constructs a repository over a connection whose schema exists.
    ///
    /// # Errors
    /// - `MissingRequiredTable("employees")` before the schema is created.
    pub fn try_new(conn: &'conn mut Connection) -> RepoResult<Self> {
        if !table_exists(conn, EMPLOYEES_TABLE)? {
            return Err(RepoError::MissingRequiredTable(EMPLOYEES_TABLE));
        }
        Ok(Self { conn })
    }
}

impl EmployeeRepository for SqliteEmployeeRepository<'_> {
    fn insert_one(&self, employee: &Employee) -> RepoResult<()> {
        let birth_date = employee.birth_date_iso();
        let age = employee.age_on(today());

        let result = self.conn.execute(
            "INSERT INTO employees (full_name, birth_date, gender, age)
             VALUES (?1, ?2, ?3, ?4);",
            params![
                employee.full_name.as_str(),
                birth_date.as_str(),
                employee.gender.as_str(),
                age,
            ],
        );

        match result {
            Ok(_) => {
                info!("event=employee_insert module=repo status=ok");
                Ok(())
            }
            Err(err) if is_unique_violation(&err) => {
                info!("event=employee_insert module=repo status=duplicate");
                Err(RepoError::DuplicateKey {
                    full_name: employee.full_name.clone(),
                    birth_date,
                })
            }
            Err(err) => {
                error!(
                    "event=employee_insert module=repo status=error error={}",
                    err
                );
                Err(err.into())
            }
        }
    }

    fn bulk_insert(&mut self, employees: &[Employee]) -> RepoResult<BulkInsertReport> {
        let started_at = Instant::now();
        let today = today();
        let mut report = BulkInsertReport {
            submitted: employees.len(),
            ..BulkInsertReport::default()
        };

        let tx = self.conn.transaction()?;
        {
            let mut stmt = tx.prepare_cached(
                "INSERT OR IGNORE INTO employees (full_name, birth_date, gender, age)
                 VALUES (?1, ?2, ?3, ?4);",
            )?;

            for employee in employees {
                let changed = stmt.execute(params![
                    employee.full_name.as_str(),
                    employee.birth_date_iso(),
                    employee.gender.as_str(),
                    employee.age_on(today),
                ])?;
                report.inserted += changed;
            }
        }
        tx.commit()?;

        report.skipped = report.submitted - report.inserted;
        info!(
            "event=bulk_insert module=repo status=ok submitted={} inserted={} skipped={} duration_ms={}",
            report.submitted,
            report.inserted,
            report.skipped,
            started_at.elapsed().as_millis()
        );
        Ok(report)
    }

    fn fetch_all_sorted(&self) -> RepoResult<Vec<ListedEmployee>> {
        let today = today();
        let mut stmt = self.conn.prepare(
            "SELECT DISTINCT full_name, birth_date, gender
             FROM employees
             ORDER BY full_name, birth_date;",
        )?;

        let mut rows = stmt.query([])?;
        let mut listed = Vec::new();
        while let Some(row) = rows.next()? {
            let employee = parse_employee_row(row)?;
            let listed_age = employee.year_difference_age(today);
            listed.push(ListedEmployee {
                employee,
                listed_age,
            });
        }

        Ok(listed)
    }

    fn fetch_by_criteria(&self, query: &CriteriaQuery) -> RepoResult<Vec<Employee>> {
        let limit = normalize_criteria_limit(query.limit);
        if limit == 0 {
            return Ok(Vec::new());
        }

        let mut stmt = self.conn.prepare(
            "SELECT full_name, birth_date, gender
             FROM employees
             WHERE gender = ?1
               AND full_name LIKE ?2 ESCAPE '\\'
             LIMIT ?3;",
        )?;

        let pattern = prefix_like_pattern(&query.name_prefix);
        let mut rows = stmt.query(params![query.gender.as_str(), pattern, i64::from(limit)])?;
        let mut employees = Vec::new();
        while let Some(row) = rows.next()? {
            employees.push(parse_employee_row(row)?);
        }

        Ok(employees)
    }

    fn optimize(&self) -> RepoResult<()> {
        let started_at = Instant::now();
        info!("event=db_optimize module=repo status=start");

        for (step, sql) in OPTIMIZE_STEPS {
            if let Err(err) = self.conn.execute_batch(sql) {
                error!(
                    "event=db_optimize module=repo status=error step={} duration_ms={} error={}",
                    step,
                    started_at.elapsed().as_millis(),
                    err
                );
                return Err(err.into());
            }
        }

        info!(
            "event=db_optimize module=repo status=ok index={} duration_ms={}",
            GENDER_NAME_INDEX,
            started_at.elapsed().as_millis()
        );
        Ok(())
    }

    fn count(&self) -> RepoResult<u64> {
        let count: i64 = self
            .conn
            .query_row("SELECT COUNT(*) FROM employees;", [], |row| row.get(0))?;
        u64::try_from(count)
            .map_err(|_| RepoError::InvalidData(format!("negative row count `{count}`")))
    }
}

/// Clamps a criteria limit to [`CRITERIA_LIMIT_MAX`].
pub fn normalize_criteria_limit(limit: u32) -> u32 {
    limit.min(CRITERIA_LIMIT_MAX)
}

fn prefix_like_pattern(prefix: &str) -> String {
    let mut pattern = String::with_capacity(prefix.len() + 1);
    for ch in prefix.chars() {
        if matches!(ch, '%' | '_' | '\\') {
            pattern.push('\\');
        }
        pattern.push(ch);
    }
    pattern.push('%');
    pattern
}

fn parse_employee_row(row: &Row<'_>) -> RepoResult<Employee> {
    let full_name: String = row.get("full_name")?;
    let birth_date: String = row.get("birth_date")?;
    let gender_text: String = row.get("gender")?;

    let gender = Gender::parse(&gender_text).ok_or_else(|| {
        RepoError::InvalidData(format!(
            "invalid gender `{gender_text}` in employees.gender"
        ))
    })?;

    Employee::new(full_name, &birth_date, gender).map_err(|_| {
        RepoError::InvalidData(format!(
            "invalid birth date `{birth_date}` in employees.birth_date"
        ))
    })
}

fn is_unique_violation(err: &rusqlite::Error) -> bool {
    match err {
        rusqlite::Error::SqliteFailure(inner, _) => {
            inner.extended_code == rusqlite::ffi::SQLITE_CONSTRAINT_UNIQUE
        }
        _ => false,
    }
}

fn table_exists(conn: &Connection, table: &str) -> RepoResult<bool> {
    let exists: i64 = conn.query_row(
        "SELECT EXISTS(
            SELECT 1
            FROM sqlite_master
            WHERE type = 'table' AND name = ?1
        );",
        [table],
        |row| row.get(0),
    )?;
    Ok(exists == 1)
}

fn today() -> NaiveDate {
    Local::now().date_naive()
}

#[cfg(test)]
mod tests {
    use super::{normalize_criteria_limit, prefix_like_pattern, CRITERIA_LIMIT_MAX};

    #[test]
    fn prefix_pattern_escapes_like_wildcards() {
        assert_eq!(prefix_like_pattern("Fedorov"), "Fedorov%");
        assert_eq!(prefix_like_pattern("50%_a\\b"), "50\\%\\_a\\\\b%");
    }

    #[test]
    fn criteria_limit_is_capped() {
        assert_eq!(normalize_criteria_limit(10), 10);
        assert_eq!(normalize_criteria_limit(5000), CRITERIA_LIMIT_MAX);
    }
}
