//! Repository layer for sheets and attachments.
//!
//! # Responsibility
//! - Map sheet names to directories and keep the persisted name list.
//! - Store instrument-tagged attachment files inside a sheet directory.
//!
//! # Invariants
//! - Every name is validated before it is joined onto the storage root.
//! - Filesystem failures are returned as values, never panics.
//! - No operation is transactional; a failed write may leave partial state.

pub mod attachment_repo;
mod fs_tree;
pub mod sheet_repo;

use crate::db::DbError;
use crate::model::name::NameValidationError;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::io;
use std::path::{Path, PathBuf};

pub use fs_tree::{DeleteReport, FailedEntry};

pub type RepoResult<T> = Result<T, RepoError>;

/// Error taxonomy shared by sheet and attachment operations.
#[derive(Debug)]
pub enum RepoError {
    /// Blank name, or a name that cannot be used as a path component.
    InvalidName(NameValidationError),
    /// Delete target does not exist.
    NotFound(String),
    /// Stream read/write, directory or delete error.
    Io {
        op: &'static str,
        path: PathBuf,
        source: io::Error,
    },
    /// Recursive delete removed some entries but not all.
    PartialFailure(DeleteReport),
    /// Preferences database error.
    Prefs(DbError),
    /// Persisted record cannot be decoded.
    InvalidData(String),
}

impl RepoError {
    pub(crate) fn io(op: &'static str, path: impl AsRef<Path>, source: io::Error) -> Self {
        Self::Io {
            op,
            path: path.as_ref().to_path_buf(),
            source,
        }
    }

    /// Stable machine-readable code for FFI envelopes and log lines.
    pub fn code(&self) -> &'static str {
        match self {
            Self::InvalidName(_) => "invalid_name",
            Self::NotFound(_) => "not_found",
            Self::Io { .. } => "io_failure",
            Self::PartialFailure(_) => "partial_failure",
            Self::Prefs(_) => "prefs_failure",
            Self::InvalidData(_) => "invalid_data",
        }
    }
}

impl Display for RepoError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidName(err) => write!(f, "{err}"),
            Self::NotFound(target) => write!(f, "not found: {target}"),
            Self::Io { op, path, source } => {
                write!(f, "{op} failed for `{}`: {source}", path.display())
            }
            Self::PartialFailure(report) => write!(
                f,
                "deleted {} entries but {} could not be removed",
                report.removed,
                report.failed.len()
            ),
            Self::Prefs(err) => write!(f, "{err}"),
            Self::InvalidData(message) => write!(f, "invalid persisted data: {message}"),
        }
    }
}

impl Error for RepoError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::InvalidName(err) => Some(err),
            Self::Io { source, .. } => Some(source),
            Self::Prefs(err) => Some(err),
            Self::NotFound(_) | Self::PartialFailure(_) | Self::InvalidData(_) => None,
        }
    }
}

impl From<NameValidationError> for RepoError {
    fn from(value: NameValidationError) -> Self {
        Self::InvalidName(value)
    }
}

impl From<DbError> for RepoError {
    fn from(value: DbError) -> Self {
        Self::Prefs(value)
    }
}
