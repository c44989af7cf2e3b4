//! Criteria query timing and file export.
//!
//! # Responsibility
//! - Run one criteria query and measure its wall-clock duration.
//! - Append the measurement to the performance log.
//! - Overwrite the numbered result file when rows matched.
//!
//! # Invariants
//! - The performance log is appended on every run, including empty results.
//! - The result file is written only for a non-empty result set.
//! - File failures are reported in [`CriteriaReport`], never propagated.

use crate::model::employee::Employee;
use crate::repo::employee_repo::{CriteriaQuery, EmployeeRepository, RepoResult};
use chrono::{Local, NaiveDateTime};
use log::{error, info, warn};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::fs::{self, File, OpenOptions};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";
const ENTRY_SEPARATOR_WIDTH: usize = 40;

pub type ExportResult<T> = Result<T, ExportError>;

/// File-system failure while writing an export artifact.
#[derive(Debug)]
pub enum ExportError {
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
}

impl Display for ExportError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Io { path, source } => {
                write!(f, "failed to write `{}`: {source}", path.display())
            }
        }
    }
}

impl Error for ExportError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Io { source, .. } => Some(source),
        }
    }
}

/// Destination files for one criteria export run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportTargets {
    /// Append-only timing log.
    pub performance_log: PathBuf,
    /// Overwritten numbered result listing.
    pub results: PathBuf,
}

/// What happened to one export artifact.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExportOutcome {
    Written(PathBuf),
    /// Nothing to write (empty result set).
    Skipped,
    Failed(String),
}

/// Summary of a criteria export run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CriteriaReport {
    pub matched: usize,
    /// Duration of the query call only.
    pub elapsed: Duration,
    pub performance_log: ExportOutcome,
    pub result_file: ExportOutcome,
}

/// Runs `query`, times it and writes both export artifacts.
///
/// # Errors
/// - Returns repository errors from the query itself. File failures are
///   captured in the returned report instead.
pub fn run_criteria_export<R: EmployeeRepository + ?Sized>(
    repo: &R,
    query: &CriteriaQuery,
    targets: &ExportTargets,
) -> RepoResult<CriteriaReport> {
    let started_at = Instant::now();
    let employees = repo.fetch_by_criteria(query)?;
    let elapsed = started_at.elapsed();

    info!(
        "event=criteria_query module=export status=ok gender={} prefix_len={} limit={} matched={} elapsed_ms={}",
        query.gender,
        query.name_prefix.len(),
        query.limit,
        employees.len(),
        elapsed.as_millis()
    );

    let measured_at = Local::now().naive_local();
    let performance_log =
        match append_performance_entry(&targets.performance_log, measured_at, elapsed) {
            Ok(()) => ExportOutcome::Written(targets.performance_log.clone()),
            Err(err) => {
                error!("event=export_perf_log module=export status=error error={err}");
                ExportOutcome::Failed(err.to_string())
            }
        };

    let result_file = if employees.is_empty() {
        warn!("event=export_results module=export status=skipped reason=empty_result");
        ExportOutcome::Skipped
    } else {
        match write_results(&targets.results, &employees) {
            Ok(()) => ExportOutcome::Written(targets.results.clone()),
            Err(err) => {
                error!("event=export_results module=export status=error error={err}");
                ExportOutcome::Failed(err.to_string())
            }
        }
    };

    Ok(CriteriaReport {
        matched: employees.len(),
        elapsed,
        performance_log,
        result_file,
    })
}

/// Formats one performance log entry, separator line included.
pub fn format_performance_entry(measured_at: NaiveDateTime, elapsed: Duration) -> String {
    format!(
        "Performance measurements at {}\nQuery time: {:.4} sec\n{}\n",
        measured_at.format(TIMESTAMP_FORMAT),
        elapsed.as_secs_f64(),
        "-".repeat(ENTRY_SEPARATOR_WIDTH)
    )
}

/// Formats one result line with a 1-based sequence number.
pub fn format_result_line(sequence: usize, employee: &Employee) -> String {
    format!(
        "{sequence}. Name: {}, Birth Date: {}, Gender: {}",
        employee.full_name,
        employee.birth_date_iso(),
        employee.gender
    )
}

/// Appends one timing entry, creating parent directories when missing.
pub fn append_performance_entry(
    path: &Path,
    measured_at: NaiveDateTime,
    elapsed: Duration,
) -> ExportResult<()> {
    ensure_parent_dir(path)?;
    let mut file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .map_err(|source| io_error(path, source))?;
    file.write_all(format_performance_entry(measured_at, elapsed).as_bytes())
        .map_err(|source| io_error(path, source))?;
    Ok(())
}

/// Overwrites `path` with one numbered line per employee.
pub fn write_results(path: &Path, employees: &[Employee]) -> ExportResult<()> {
    ensure_parent_dir(path)?;
    let file = File::create(path).map_err(|source| io_error(path, source))?;
    let mut writer = BufWriter::new(file);
    for (index, employee) in employees.iter().enumerate() {
        writeln!(writer, "{}", format_result_line(index + 1, employee))
            .map_err(|source| io_error(path, source))?;
    }
    writer.flush().map_err(|source| io_error(path, source))?;
    Ok(())
}

fn ensure_parent_dir(path: &Path) -> ExportResult<()> {
    match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => {
            fs::create_dir_all(parent).map_err(|source| io_error(parent, source))
        }
        _ => Ok(()),
    }
}

fn io_error(path: &Path, source: std::io::Error) -> ExportError {
    ExportError::Io {
        path: path.to_path_buf(),
        source,
    }
}

#[cfg(test)]
mod tests {
    use super::{format_performance_entry, format_result_line};
    use crate::model::employee::{Employee, Gender};
    use chrono::NaiveDate;
    use std::time::Duration;

    #[test]
    fn performance_entry_has_four_decimals_and_separator() {
        let measured_at = NaiveDate::from_ymd_opt(2024, 3, 9)
            .unwrap()
            .and_hms_opt(8, 5, 7)
            .unwrap();
        let entry = format_performance_entry(measured_at, Duration::from_micros(12_345));

        let lines: Vec<_> = entry.lines().collect();
        assert_eq!(lines[0], "Performance measurements at 2024-03-09 08:05:07");
        assert_eq!(lines[1], "Query time: 0.0123 sec");
        assert_eq!(lines[2], "-".repeat(40));
        assert!(entry.ends_with('\n'));
    }

    #[test]
    fn result_line_is_numbered() {
        let employee = Employee::new("Fedorov Ivan Petrovich", "1985-07-15", Gender::Male).unwrap();
        assert_eq!(
            format_result_line(3, &employee),
            "3. Name: Fedorov Ivan Petrovich, Birth Date: 1985-07-15, Gender: Male"
        );
    }
}
