//! staffdb command dispatcher.
//!
//! # Responsibility
//! - Map a numeric mode selector to one core use-case.
//! - Print operator-facing results; diagnostics go to the rolling log.

use clap::Parser;
use log::error;
use rusqlite::Connection;
use staffdb_core::db::{create_schema, open_db, SCHEMA_VERSION};
use staffdb_core::{
    init_logging, log_startup, EmployeeService, ExportOutcome, SqliteEmployeeRepository,
    StaffConfig,
};
use std::error::Error;
use std::process::ExitCode;

const USAGE: &str = "Usage: staffdb <mode> [params]
  1                            create schema
  2 <full_name> <YYYY-MM-DD> <Male|Female>
                               insert one employee
  3                            list all employees sorted by name and birth date
  4                            generate and bulk insert employees
  5                            run criteria query and export results
  6                            optimize database";

/// Employee directory over an embedded SQLite store.
#[derive(Parser, Debug)]
#[command(name = "staffdb")]
#[command(about = "Employee records in an embedded SQLite store")]
#[command(version)]
struct Args {
    /// Operation mode (1-6)
    mode: String,

    /// Mode parameters
    #[arg(trailing_var_arg = true, allow_hyphen_values = true)]
    params: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Command {
    CreateSchema,
    Insert {
        full_name: String,
        birth_date: String,
        gender: String,
    },
    List,
    BulkLoad,
    Criteria,
    Optimize,
}

impl Command {
    fn mode(&self) -> &'static str {
        match self {
            Self::CreateSchema => "create_schema",
            Self::Insert { .. } => "insert",
            Self::List => "list",
            Self::BulkLoad => "bulk_load",
            Self::Criteria => "criteria",
            Self::Optimize => "optimize",
        }
    }
}

fn parse_command(mode: &str, params: &[String]) -> Option<Command> {
    match (mode.trim(), params) {
        ("1", []) => Some(Command::CreateSchema),
        ("2", [full_name, birth_date, gender]) => Some(Command::Insert {
            full_name: full_name.clone(),
            birth_date: birth_date.clone(),
            gender: gender.clone(),
        }),
        ("3", []) => Some(Command::List),
        ("4", []) => Some(Command::BulkLoad),
        ("5", []) => Some(Command::Criteria),
        ("6", []) => Some(Command::Optimize),
        _ => None,
    }
}

/// Why argument handling stopped before running a command.
#[derive(Debug)]
enum ArgsError {
    /// `--help` / `--version`: clap prints to stdout and exits 0.
    Informational(clap::Error),
    /// Missing, unknown or miscounted mode arguments.
    Usage,
}

fn command_from_args<I, T>(argv: I) -> Result<Command, ArgsError>
where
    I: IntoIterator<Item = T>,
    T: Into<std::ffi::OsString> + Clone,
{
    let args = match Args::try_parse_from(argv) {
        Ok(args) => args,
        Err(err) if !err.use_stderr() => return Err(ArgsError::Informational(err)),
        Err(_) => return Err(ArgsError::Usage),
    };
    parse_command(&args.mode, &args.params).ok_or(ArgsError::Usage)
}

fn main() -> ExitCode {
    let command = match command_from_args(std::env::args_os()) {
        Ok(command) => command,
        Err(ArgsError::Informational(err)) => err.exit(),
        Err(ArgsError::Usage) => {
            eprintln!("Invalid mode or missing parameters.");
            eprintln!("{USAGE}");
            return ExitCode::FAILURE;
        }
    };

    let config = match StaffConfig::from_env() {
        Ok(config) => config,
        Err(err) => {
            eprintln!("configuration error: {err}");
            return ExitCode::FAILURE;
        }
    };

    if let Err(err) = init_logging(&config.log_level, &config.log_dir) {
        eprintln!("warning: file logging disabled: {err}");
    }
    log_startup(&config, command.mode());

    match run(command, &config) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            error!("event=command module=cli status=error error={err}");
            eprintln!("error: {err}");
            ExitCode::FAILURE
        }
    }
}

fn run(command: Command, config: &StaffConfig) -> Result<(), Box<dyn Error>> {
    let mut conn = open_db(&config.db_path)?;

    if command == Command::CreateSchema {
        create_schema(&mut conn)?;
        println!("Schema ready (version {SCHEMA_VERSION}).");
        return Ok(());
    }

    run_with_service(command, config, &mut conn)
}

fn run_with_service(
    command: Command,
    config: &StaffConfig,
    conn: &mut Connection,
) -> Result<(), Box<dyn Error>> {
    let repo = SqliteEmployeeRepository::try_new(conn)?;
    let mut service = EmployeeService::new(repo);

    match command {
        // Handled in `run` before the repository borrows the connection.
        Command::CreateSchema => {}
        Command::Insert {
            full_name,
            birth_date,
            gender,
        } => {
            let employee = service.create_employee(&full_name, &birth_date, &gender)?;
            println!(
                "Created employee {}, {}, {}",
                employee.full_name,
                employee.birth_date_iso(),
                employee.gender
            );
        }
        Command::List => {
            for row in service.list_sorted()? {
                println!(
                    "{}, {}, {}, {} years",
                    row.employee.full_name,
                    row.employee.birth_date_iso(),
                    row.employee.gender,
                    row.listed_age
                );
            }
        }
        Command::BulkLoad => {
            let report =
                service.generate_bulk_data(config.bulk_record_count, rand::thread_rng())?;
            println!("Generated {} employee records.", report.generated);
            println!(
                "Inserted {}, skipped {} duplicates.",
                report.insert.inserted, report.insert.skipped
            );
            println!("Stored employees: {}", service.count()?);
        }
        Command::Criteria => {
            let report = service.export_fixed_pattern(&config.export_targets())?;
            match &report.performance_log {
                ExportOutcome::Written(path) => {
                    println!("Performance calculations exported to {}", path.display())
                }
                ExportOutcome::Skipped => {}
                ExportOutcome::Failed(message) => {
                    println!("An error occurred while exporting performance data: {message}")
                }
            }
            match &report.result_file {
                ExportOutcome::Written(path) => {
                    println!("Data has been exported to {}", path.display())
                }
                ExportOutcome::Skipped => println!("No employees found matching the criteria."),
                ExportOutcome::Failed(message) => {
                    println!("An error occurred while exporting data: {message}")
                }
            }
        }
        Command::Optimize => {
            service.optimize()?;
            println!("Optimized database");
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::{command_from_args, parse_command, ArgsError, Command};

    fn strings(values: &[&str]) -> Vec<String> {
        values.iter().map(|value| value.to_string()).collect()
    }

    #[test]
    fn parameterless_modes_reject_extra_arguments() {
        assert_eq!(parse_command("1", &[]), Some(Command::CreateSchema));
        assert_eq!(parse_command("6", &[]), Some(Command::Optimize));
        assert_eq!(parse_command("3", &strings(&["extra"])), None);
    }

    #[test]
    fn insert_mode_requires_exactly_three_parameters() {
        let params = strings(&["Ivanov Ivan Ivanovich", "1985-07-15", "Male"]);
        assert_eq!(
            parse_command("2", &params),
            Some(Command::Insert {
                full_name: "Ivanov Ivan Ivanovich".to_string(),
                birth_date: "1985-07-15".to_string(),
                gender: "Male".to_string(),
            })
        );
        assert_eq!(parse_command("2", &params[..2]), None);
    }

    #[test]
    fn missing_mode_maps_to_usage_error() {
        assert!(matches!(
            command_from_args(["staffdb"]),
            Err(ArgsError::Usage)
        ));
    }

    #[test]
    fn help_and_version_stay_informational() {
        for flag in ["--help", "--version"] {
            match command_from_args(["staffdb", flag]) {
                Err(ArgsError::Informational(err)) => assert!(!err.use_stderr()),
                other => panic!("unexpected result for {flag}: {other:?}"),
            }
        }
    }

    #[test]
    fn argv_is_mapped_to_commands() {
        assert_eq!(
            command_from_args(["staffdb", "5"]).unwrap(),
            Command::Criteria
        );
        assert!(matches!(
            command_from_args(["staffdb", "9"]),
            Err(ArgsError::Usage)
        ));
        assert!(matches!(
            command_from_args(["staffdb", "2", "Ivanov Ivan Ivanovich"]),
            Err(ArgsError::Usage)
        ));
    }

    #[test]
    fn commands_have_log_labels() {
        assert_eq!(Command::BulkLoad.mode(), "bulk_load");
        assert_eq!(Command::CreateSchema.mode(), "create_schema");
    }

    #[test]
    fn unknown_mode_is_rejected() {
        assert_eq!(parse_command("7", &[]), None);
        assert_eq!(parse_command("", &[]), None);
    }
}
