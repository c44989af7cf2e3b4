//! Runtime configuration for staffdb.
//!
//! Defaults mirror the historical file names so existing databases and
//! exports keep working; every field can be overridden from `STAFFDB_*`
//! environment variables.

use crate::export::ExportTargets;
use crate::logging::default_log_level;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::path::PathBuf;

pub const ENV_DB_PATH: &str = "STAFFDB_DB_PATH";
pub const ENV_LOG_DIR: &str = "STAFFDB_LOG_DIR";
pub const ENV_LOG_LEVEL: &str = "STAFFDB_LOG_LEVEL";
pub const ENV_PERF_LOG: &str = "STAFFDB_PERF_LOG";
pub const ENV_RESULTS_PATH: &str = "STAFFDB_RESULTS_PATH";
pub const ENV_BULK_COUNT: &str = "STAFFDB_BULK_COUNT";

const DEFAULT_DB_FILE: &str = "employees.db";
const DEFAULT_LOG_DIR: &str = "logs";
const DEFAULT_PERF_LOG_FILE: &str = "query_performance.txt";
const DEFAULT_RESULTS_FILE: &str = "employees_f_male.txt";
const DEFAULT_BULK_COUNT: usize = 1_000_000;

/// Invalid configuration value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    InvalidValue { key: &'static str, value: String },
}

impl Display for ConfigError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidValue { key, value } => write!(f, "invalid value `{value}` for {key}"),
        }
    }
}

impl Error for ConfigError {}

/// Main configuration for a staffdb process.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StaffConfig {
    /// SQLite database file.
    pub db_path: PathBuf,
    /// Directory for rolling diagnostic logs. Must be absolute.
    pub log_dir: PathBuf,
    /// `trace|debug|info|warn|error`
    pub log_level: String,
    /// Append-only query timing log.
    pub performance_log_path: PathBuf,
    /// Criteria result listing, overwritten on each run.
    pub results_path: PathBuf,
    /// Random records generated by a bulk load (fixed batch not included).
    pub bulk_record_count: usize,
}

impl Default for StaffConfig {
    fn default() -> Self {
        let cwd = std::env::current_dir().unwrap_or_else(|_| PathBuf::from("."));
        Self {
            db_path: PathBuf::from(DEFAULT_DB_FILE),
            log_dir: cwd.join(DEFAULT_LOG_DIR),
            log_level: default_log_level().to_string(),
            performance_log_path: PathBuf::from(DEFAULT_PERF_LOG_FILE),
            results_path: PathBuf::from(DEFAULT_RESULTS_FILE),
            bulk_record_count: DEFAULT_BULK_COUNT,
        }
    }
}

impl StaffConfig {
    /// Create a new config builder
    pub fn builder() -> StaffConfigBuilder {
        StaffConfigBuilder::default()
    }

    /// Defaults overridden by process environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Defaults overridden by values returned from `lookup`.
    ///
    /// Blank values are ignored.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let get = |key: &str| {
            lookup(key)
                .map(|value| value.trim().to_string())
                .filter(|value| !value.is_empty())
        };

        let mut builder = Self::builder();
        if let Some(value) = get(ENV_DB_PATH) {
            builder = builder.db_path(value);
        }
        if let Some(value) = get(ENV_LOG_DIR) {
            builder = builder.log_dir(value);
        }
        if let Some(value) = get(ENV_LOG_LEVEL) {
            builder = builder.log_level(value);
        }
        if let Some(value) = get(ENV_PERF_LOG) {
            builder = builder.performance_log_path(value);
        }
        if let Some(value) = get(ENV_RESULTS_PATH) {
            builder = builder.results_path(value);
        }
        if let Some(value) = get(ENV_BULK_COUNT) {
            let count = value
                .replace('_', "")
                .parse::<usize>()
                .map_err(|_| ConfigError::InvalidValue {
                    key: ENV_BULK_COUNT,
                    value: value.clone(),
                })?;
            builder = builder.bulk_record_count(count);
        }

        Ok(builder.build())
    }

    /// Export destinations for the criteria pipeline.
    pub fn export_targets(&self) -> ExportTargets {
        ExportTargets {
            performance_log: self.performance_log_path.clone(),
            results: self.results_path.clone(),
        }
    }
}

/// Builder for StaffConfig
#[derive(Default)]
pub struct StaffConfigBuilder {
    config: StaffConfig,
}

impl StaffConfigBuilder {
    pub fn db_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.config.db_path = path.into();
        self
    }

    pub fn log_dir(mut self, path: impl Into<PathBuf>) -> Self {
        self.config.log_dir = path.into();
        self
    }

    pub fn log_level(mut self, level: impl Into<String>) -> Self {
        self.config.log_level = level.into();
        self
    }

    pub fn performance_log_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.config.performance_log_path = path.into();
        self
    }

    pub fn results_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.config.results_path = path.into();
        self
    }

    pub fn bulk_record_count(mut self, count: usize) -> Self {
        self.config.bulk_record_count = count;
        self
    }

    pub fn build(self) -> StaffConfig {
        self.config
    }
}

#[cfg(test)]
mod tests {
    use super::{ConfigError, StaffConfig, ENV_BULK_COUNT, ENV_DB_PATH, ENV_RESULTS_PATH};
    use std::collections::HashMap;
    use std::path::PathBuf;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(key, value)| (key.to_string(), value.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn defaults_use_historical_file_names() {
        let config = StaffConfig::from_lookup(|_| None).unwrap();
        assert_eq!(config.db_path, PathBuf::from("employees.db"));
        assert_eq!(config.results_path, PathBuf::from("employees_f_male.txt"));
        assert_eq!(
            config.performance_log_path,
            PathBuf::from("query_performance.txt")
        );
        assert_eq!(config.bulk_record_count, 1_000_000);
        assert!(config.log_dir.is_absolute());
    }

    #[test]
    fn env_values_override_defaults_and_blanks_are_ignored() {
        let config = StaffConfig::from_lookup(lookup_from(&[
            (ENV_DB_PATH, "/tmp/staff.db"),
            (ENV_RESULTS_PATH, "   "),
            (ENV_BULK_COUNT, "10_000"),
        ]))
        .unwrap();

        assert_eq!(config.db_path, PathBuf::from("/tmp/staff.db"));
        assert_eq!(config.results_path, PathBuf::from("employees_f_male.txt"));
        assert_eq!(config.bulk_record_count, 10_000);
    }

    #[test]
    fn invalid_bulk_count_is_rejected() {
        let err = StaffConfig::from_lookup(lookup_from(&[(ENV_BULK_COUNT, "lots")])).unwrap_err();
        assert_eq!(
            err,
            ConfigError::InvalidValue {
                key: ENV_BULK_COUNT,
                value: "lots".to_string()
            }
        );
    }
}
