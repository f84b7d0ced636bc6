//! Data directory layout and resolution.
//!
//! # Invariants
//! - Sheets, the preferences database and logs all live under one data dir.
//! - Resolution order: explicit value, then `SHEETSHELF_DATA_DIR`, then a
//!   temp-dir fallback.

use std::path::{Path, PathBuf};

/// Environment variable overriding the data directory.
pub const DATA_DIR_ENV: &str = "SHEETSHELF_DATA_DIR";

const SHEETS_DIR_NAME: &str = "sheets";
const PREFS_DB_FILE_NAME: &str = "sheetshelf.sqlite3";
const LOG_DIR_NAME: &str = "logs";
const FALLBACK_DIR_NAME: &str = "sheetshelf";

/// Resolved on-disk layout of one library.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LibraryPaths {
    data_dir: PathBuf,
}

impl LibraryPaths {
    pub fn new(data_dir: impl Into<PathBuf>) -> Self {
        Self {
            data_dir: data_dir.into(),
        }
    }

    /// Resolves the data dir from an explicit value or the environment.
    ///
    /// Blank values are ignored at every step.
    pub fn resolve(explicit: Option<&str>) -> Self {
        let from_env = std::env::var(DATA_DIR_ENV).ok();
        let chosen = [explicit, from_env.as_deref()]
            .into_iter()
            .flatten()
            .map(str::trim)
            .find(|value| !value.is_empty());

        match chosen {
            Some(value) => Self::new(value),
            None => Self::new(std::env::temp_dir().join(FALLBACK_DIR_NAME)),
        }
    }

    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }

    /// Root under which each sheet gets one directory.
    pub fn sheets_root(&self) -> PathBuf {
        self.data_dir.join(SHEETS_DIR_NAME)
    }

    pub fn prefs_db_path(&self) -> PathBuf {
        self.data_dir.join(PREFS_DB_FILE_NAME)
    }

    pub fn log_dir(&self) -> PathBuf {
        self.data_dir.join(LOG_DIR_NAME)
    }

    /// Creates the data dir and sheets root.
    pub fn ensure_dirs(&self) -> std::io::Result<()> {
        std::fs::create_dir_all(self.sheets_root())
    }
}
