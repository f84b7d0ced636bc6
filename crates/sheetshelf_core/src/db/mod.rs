//! SQLite bootstrap for the preferences database.
//!
//! # Responsibility
//! - Open and configure the SQLite connection that backs `PrefsStore`.
//! - Apply schema migrations before any preference is read or written.
//!
//! # Invariants
//! - Schema version is tracked via `PRAGMA user_version`.
//! - A database written by a newer binary is refused, never downgraded.
//! - Open-time errors name the database location; statement errors do not.

use std::error::Error;
use std::fmt::{Display, Formatter};

pub mod migrations;
mod open;

pub use open::{open_db, open_db_in_memory, MEMORY_LOCATION};

pub type DbResult<T> = Result<T, DbError>;

/// Preferences database failure.
#[derive(Debug)]
pub enum DbError {
    /// The database at `location` could not be opened or configured.
    Open {
        location: String,
        source: rusqlite::Error,
    },
    /// The file at `location` carries a schema this build cannot read.
    NewerSchema {
        location: String,
        found: u32,
        supported: u32,
    },
    /// A statement against an open database failed.
    Statement(rusqlite::Error),
}

impl DbError {
    /// Attaches `location` to an error raised while bootstrapping.
    pub(crate) fn at(location: &str, source: rusqlite::Error) -> Self {
        Self::Open {
            location: location.to_string(),
            source,
        }
    }
}

impl Display for DbError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Open { location, source } => {
                write!(f, "cannot open preferences at `{location}`: {source}")
            }
            Self::NewerSchema {
                location,
                found,
                supported,
            } => write!(
                f,
                "preferences at `{location}` use schema {found}; this build reads up to {supported}"
            ),
            Self::Statement(err) => write!(f, "preferences query failed: {err}"),
        }
    }
}

impl Error for DbError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Open { source, .. } => Some(source),
            Self::Statement(err) => Some(err),
            Self::NewerSchema { .. } => None,
        }
    }
}

impl From<rusqlite::Error> for DbError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Statement(value)
    }
}
