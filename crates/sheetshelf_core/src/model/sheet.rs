//! Sheet record.

use serde::Serialize;
use std::path::PathBuf;

/// One named collection backed by one directory under the storage root.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Sheet {
    /// Trimmed display name; also the directory name.
    pub name: String,
    /// Absolute or root-relative directory path.
    pub path: PathBuf,
}

/// Disagreement between the persisted name list and the directory tree.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct IndexDrift {
    /// Listed names whose directory no longer exists, in list order.
    pub missing_folders: Vec<String>,
    /// Directories with no list entry, sorted by name.
    pub unlisted_folders: Vec<String>,
    /// Directories whose names are not valid sheet names, sorted. Reported
    /// only; repair never adopts them.
    pub invalid_folders: Vec<String>,
}

impl IndexDrift {
    /// True when the list matches every usable directory. Invalid folders
    /// do not count, since no repair can resolve them.
    pub fn is_clean(&self) -> bool {
        self.missing_folders.is_empty() && self.unlisted_folders.is_empty()
    }
}
