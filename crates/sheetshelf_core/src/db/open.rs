//! Connection bootstrap for the preferences database.
//!
//! # Invariants
//! - Returned connections have migrations fully applied.
//! - Every open attempt emits exactly one terminal `db_open` event.

use super::migrations::apply_migrations;
use super::{DbError, DbResult};
use log::{error, info};
use rusqlite::Connection;
use std::path::Path;
use std::time::{Duration, Instant};

/// Location reported for in-memory databases.
pub const MEMORY_LOCATION: &str = ":memory:";

/// Opens (or creates) the preferences database file and migrates it.
///
/// Parent directories are not created; callers own the data directory layout.
pub fn open_db(path: impl AsRef<Path>) -> DbResult<Connection> {
    let path = path.as_ref();
    open_with(&path.display().to_string(), || Connection::open(path))
}

/// Opens a private in-memory preferences database. Used by tests.
pub fn open_db_in_memory() -> DbResult<Connection> {
    open_with(MEMORY_LOCATION, Connection::open_in_memory)
}

fn open_with(
    location: &str,
    connect: impl FnOnce() -> rusqlite::Result<Connection>,
) -> DbResult<Connection> {
    let started_at = Instant::now();
    let mode = if location == MEMORY_LOCATION { "memory" } else { "file" };
    info!("event=db_open module=db status=start mode={mode}");

    let result = connect()
        .map_err(|err| DbError::at(location, err))
        .and_then(|mut conn| {
            conn.busy_timeout(Duration::from_secs(5))
                .map_err(|err| DbError::at(location, err))?;
            apply_migrations(&mut conn, location)?;
            Ok(conn)
        });

    match &result {
        Ok(_) => info!(
            "event=db_open module=db status=ok mode={mode} duration_ms={}",
            started_at.elapsed().as_millis()
        ),
        Err(err) => error!(
            "event=db_open module=db status=error mode={mode} duration_ms={} error_code={} error={}",
            started_at.elapsed().as_millis(),
            error_code(err),
            err
        ),
    }
    result
}

fn error_code(err: &DbError) -> &'static str {
    match err {
        DbError::Open { .. } => "db_open_failed",
        DbError::NewerSchema { .. } => "db_schema_too_new",
        DbError::Statement(_) => "db_migration_failed",
    }
}
