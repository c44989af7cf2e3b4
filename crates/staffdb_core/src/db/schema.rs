//! `employees` schema creation.
//!
//! # Invariants
//! - Creation is idempotent: `CREATE TABLE IF NOT EXISTS` plus a version
//!   stamp that is only ever raised to `SCHEMA_VERSION`.
//! - A database stamped with a newer version is rejected untouched.

use crate::db::{DbError, DbResult};
use log::info;
use rusqlite::Connection;

/// Schema version written to `PRAGMA user_version`.
pub const SCHEMA_VERSION: u32 = 1;

const EMPLOYEES_SQL: &str = include_str!("employees.sql");

/// Creates the `employees` table and its uniqueness constraint if absent.
///
/// # Errors
/// - `UnsupportedSchemaVersion` when the file was created by a newer build.
/// - `Sqlite` on any statement failure; the transaction is rolled back.
pub fn create_schema(conn: &mut Connection) -> DbResult<()> {
    let current_version = schema_version(conn)?;
    if current_version > SCHEMA_VERSION {
        return Err(DbError::UnsupportedSchemaVersion {
            db_version: current_version,
            latest_supported: SCHEMA_VERSION,
        });
    }

    let tx = conn.transaction()?;
    tx.execute_batch(EMPLOYEES_SQL)?;
    if current_version < SCHEMA_VERSION {
        tx.execute_batch(&format!("PRAGMA user_version = {SCHEMA_VERSION};"))?;
    }
    tx.commit()?;

    info!(
        "event=schema_create module=db status=ok from_version={} to_version={}",
        current_version, SCHEMA_VERSION
    );
    Ok(())
}

/// Reads `PRAGMA user_version`.
pub fn schema_version(conn: &Connection) -> DbResult<u32> {
    let version = conn.query_row("PRAGMA user_version;", [], |row| row.get::<_, u32>(0))?;
    Ok(version)
}
