use rusqlite::Connection;
use staffdb_core::db::{create_schema, open_db_in_memory};
use staffdb_core::export::run_criteria_export;
use staffdb_core::{
    CriteriaQuery, Employee, EmployeeRepository, EmployeeService, ExportOutcome, ExportTargets,
    Gender, SqliteEmployeeRepository,
};
use std::fs;
use std::path::Path;

fn ready_conn() -> Connection {
    let mut conn = open_db_in_memory().unwrap();
    create_schema(&mut conn).unwrap();
    conn
}

fn targets_in(dir: &Path) -> ExportTargets {
    ExportTargets {
        performance_log: dir.join("perf").join("query_performance.txt"),
        results: dir.join("employees_f_male.txt"),
    }
}

#[test]
fn empty_table_logs_timing_but_writes_no_result_file() {
    let dir = tempfile::tempdir().unwrap();
    let targets = targets_in(dir.path());
    let mut conn = ready_conn();
    let service = EmployeeService::new(SqliteEmployeeRepository::try_new(&mut conn).unwrap());

    let report = service.export_fixed_pattern(&targets).unwrap();

    assert_eq!(report.matched, 0);
    assert_eq!(report.result_file, ExportOutcome::Skipped);
    assert_eq!(
        report.performance_log,
        ExportOutcome::Written(targets.performance_log.clone())
    );
    assert!(!targets.results.exists());

    let log = fs::read_to_string(&targets.performance_log).unwrap();
    let lines: Vec<_> = log.lines().collect();
    assert_eq!(lines.len(), 3);
    assert!(lines[0].starts_with("Performance measurements at "));
    assert!(lines[1].starts_with("Query time: "));
    assert!(lines[1].ends_with(" sec"));
    let seconds = lines[1]
        .trim_start_matches("Query time: ")
        .trim_end_matches(" sec");
    assert_eq!(seconds.split('.').nth(1).map(str::len), Some(4));
    assert_eq!(lines[2], "-".repeat(40));
}

#[test]
fn matches_are_written_numbered_and_log_is_appended() {
    let dir = tempfile::tempdir().unwrap();
    let targets = targets_in(dir.path());
    let mut conn = ready_conn();
    let mut repo = SqliteEmployeeRepository::try_new(&mut conn).unwrap();
    repo.bulk_insert(&[
        Employee::new("Fedorov Ivan Petrovich", "1985-07-15", Gender::Male).unwrap(),
        Employee::new("Ivanov Petr Sergeevich", "1980-01-01", Gender::Male).unwrap(),
        Employee::new("Fedorov Max Nikolaevich", "1999-02-03", Gender::Male).unwrap(),
    ])
    .unwrap();
    fs::write(&targets.results, "stale content\n").unwrap();

    let query = CriteriaQuery::fixed_pattern();
    run_criteria_export(&repo, &query, &targets).unwrap();
    let report = run_criteria_export(&repo, &query, &targets).unwrap();

    assert_eq!(report.matched, 2);
    assert_eq!(report.result_file, ExportOutcome::Written(targets.results.clone()));

    let results = fs::read_to_string(&targets.results).unwrap();
    assert_eq!(
        results,
        "1. Name: Fedorov Ivan Petrovich, Birth Date: 1985-07-15, Gender: Male\n\
         2. Name: Fedorov Max Nikolaevich, Birth Date: 1999-02-03, Gender: Male\n"
    );

    let log = fs::read_to_string(&targets.performance_log).unwrap();
    assert_eq!(log.matches("Performance measurements at ").count(), 2);
}

#[test]
fn result_file_failure_is_reported_not_raised() {
    let dir = tempfile::tempdir().unwrap();
    let blocked = dir.path().join("results_dir");
    fs::create_dir(&blocked).unwrap();
    let targets = ExportTargets {
        performance_log: dir.path().join("query_performance.txt"),
        results: blocked.clone(),
    };

    let mut conn = ready_conn();
    let repo = SqliteEmployeeRepository::try_new(&mut conn).unwrap();
    repo.insert_one(&Employee::new("Fedorov Ivan Petrovich", "1985-07-15", Gender::Male).unwrap())
        .unwrap();

    let report = run_criteria_export(&repo, &CriteriaQuery::fixed_pattern(), &targets).unwrap();

    assert_eq!(report.matched, 1);
    assert!(matches!(report.result_file, ExportOutcome::Failed(_)));
    assert_eq!(
        report.performance_log,
        ExportOutcome::Written(targets.performance_log.clone())
    );
    assert!(blocked.is_dir());
}

#[test]
fn performance_log_failure_still_writes_results() {
    let dir = tempfile::tempdir().unwrap();
    let blocked = dir.path().join("perf_dir");
    fs::create_dir(&blocked).unwrap();
    let targets = ExportTargets {
        performance_log: blocked,
        results: dir.path().join("employees_f_male.txt"),
    };

    let mut conn = ready_conn();
    let repo = SqliteEmployeeRepository::try_new(&mut conn).unwrap();
    repo.insert_one(&Employee::new("Fedorov Ivan Petrovich", "1985-07-15", Gender::Male).unwrap())
        .unwrap();

    let report = run_criteria_export(&repo, &CriteriaQuery::fixed_pattern(), &targets).unwrap();

    assert!(matches!(report.performance_log, ExportOutcome::Failed(_)));
    assert_eq!(report.result_file, ExportOutcome::Written(targets.results.clone()));
}
