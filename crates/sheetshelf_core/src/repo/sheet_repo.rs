//! Sheet repository contracts and filesystem implementation.
//!
//! # Responsibility
//! - Create and delete one directory per sheet under the storage root.
//! - Persist the ordered sheet name list as a JSON array in `PrefsStore`.
//! - Detect and repair drift between the name list and the directory tree.
//!
//! # Invariants
//! - List order is insertion order; duplicates are allowed and map to the
//!   same directory.
//! - `delete_sheet` drops the list entry even when the directory could only
//!   be partially removed.
//! - For drift repair the directory tree is authoritative, restricted to
//!   folders whose names are valid sheet names as-is. Other folders are
//!   reported and left alone, so repair reaches a fixed point.

use super::fs_tree::{delete_tree, EntryRemover, StdRemover};
use super::{RepoError, RepoResult};
use crate::model::name::{normalize_sheet_name, NameKind};
use crate::model::sheet::{IndexDrift, Sheet};
use crate::prefs::PrefsStore;
use log::{error, info, warn};
use std::collections::HashSet;
use std::fs;
use std::io;
use std::path::PathBuf;
use std::time::Instant;

/// Preference group holding the sheet list.
pub const SHEET_PREFS_STORE: &str = "SheetPrefs";
/// Key of the JSON-encoded sheet name list.
pub const SHEET_LIST_KEY: &str = "SheetList";

/// Repository interface for sheet lifecycle operations.
pub trait SheetRepository {
    fn list_sheets(&self) -> RepoResult<Vec<String>>;
    fn create_sheet(&self, name: &str) -> RepoResult<Sheet>;
    fn delete_sheet(&self, name: &str) -> RepoResult<()>;
    fn check_drift(&self) -> RepoResult<IndexDrift>;
    fn repair_index(&self) -> RepoResult<IndexDrift>;
}

/// Filesystem-backed sheet repository.
pub struct FsSheetRepository<P: PrefsStore> {
    root: PathBuf,
    prefs: P,
    remover: Box<dyn EntryRemover>,
}

/// Directories under the storage root, split by name validity.
struct FolderScan {
    sheets: Vec<String>,
    invalid: Vec<String>,
}

impl<P: PrefsStore> FsSheetRepository<P> {
    /// Creates a repository rooted at `root`. The root is created lazily.
    pub fn new(root: impl Into<PathBuf>, prefs: P) -> Self {
        Self {
            root: root.into(),
            prefs,
            remover: Box::new(StdRemover),
        }
    }

    #[cfg(test)]
    pub(crate) fn with_remover(mut self, remover: impl EntryRemover + 'static) -> Self {
        self.remover = Box::new(remover);
        self
    }

    fn load_names(&self) -> RepoResult<Vec<String>> {
        let Some(raw) = self.prefs.get_string(SHEET_LIST_KEY)? else {
            return Ok(Vec::new());
        };
        let names: Option<Vec<String>> = serde_json::from_str(&raw).map_err(|err| {
            RepoError::InvalidData(format!("`{SHEET_LIST_KEY}` is not a JSON string array: {err}"))
        })?;
        Ok(names.unwrap_or_default())
    }

    fn save_names(&self, names: &[String]) -> RepoResult<()> {
        let raw = serde_json::to_string(names).map_err(|err| {
            RepoError::InvalidData(format!("cannot encode `{SHEET_LIST_KEY}`: {err}"))
        })?;
        self.prefs.put_string(SHEET_LIST_KEY, &raw)?;
        Ok(())
    }

    fn scan_folders(&self) -> RepoResult<FolderScan> {
        let mut scan = FolderScan {
            sheets: Vec::new(),
            invalid: Vec::new(),
        };
        let entries = match fs::read_dir(&self.root) {
            Ok(entries) => entries,
            Err(err) if err.kind() == io::ErrorKind::NotFound => return Ok(scan),
            Err(err) => return Err(RepoError::io("read_dir", &self.root, err)),
        };

        for entry in entries {
            let entry = entry.map_err(|err| RepoError::io("read_dir", &self.root, err))?;
            let file_type = entry
                .file_type()
                .map_err(|err| RepoError::io("stat", entry.path(), err))?;
            if !file_type.is_dir() {
                continue;
            }
            match entry.file_name().into_string() {
                Ok(name) if is_canonical_sheet_name(&name) => scan.sheets.push(name),
                Ok(name) => scan.invalid.push(name),
                Err(raw) => scan.invalid.push(raw.to_string_lossy().into_owned()),
            }
        }
        scan.sheets.sort();
        scan.invalid.sort();
        if !scan.invalid.is_empty() {
            warn!(
                "event=sheet_scan module=repo status=skip reason=invalid_folder_name count={}",
                scan.invalid.len()
            );
        }
        Ok(scan)
    }

    fn folder_exists(&self, name: &str) -> bool {
        is_canonical_sheet_name(name) && self.root.join(name).is_dir()
    }
}

/// A folder is only a sheet when `create_sheet` and `delete_sheet` would
/// address it by exactly this name.
fn is_canonical_sheet_name(name: &str) -> bool {
    normalize_sheet_name(name).is_ok_and(|valid| valid == name)
}

impl<P: PrefsStore> SheetRepository for FsSheetRepository<P> {
    fn list_sheets(&self) -> RepoResult<Vec<String>> {
        self.load_names()
    }

    fn create_sheet(&self, name: &str) -> RepoResult<Sheet> {
        let started_at = Instant::now();
        let name = normalize_sheet_name(name).inspect_err(|err| {
            info!(
                "event=sheet_create module=repo status=rejected kind={}",
                err.kind().label()
            );
        })?;
        let path = self.root.join(&name);

        fs::create_dir_all(&path).map_err(|err| {
            error!(
                "event=sheet_create module=repo status=error error_code=create_dir_failed error={}",
                err
            );
            RepoError::io("create_dir", &path, err)
        })?;

        let mut names = self.load_names()?;
        names.push(name.clone());
        self.save_names(&names)?;

        info!(
            "event=sheet_create module=repo status=ok name_len={} sheet_count={} duration_ms={}",
            name.chars().count(),
            names.len(),
            started_at.elapsed().as_millis()
        );
        Ok(Sheet { name, path })
    }

    fn delete_sheet(&self, name: &str) -> RepoResult<()> {
        let started_at = Instant::now();
        let name = normalize_sheet_name(name)?;
        let path = self.root.join(&name);

        let mut names = self.load_names()?;
        let position = names.iter().position(|listed| *listed == name);
        let on_disk = fs::symlink_metadata(&path).is_ok();

        if position.is_none() && !on_disk {
            return Err(RepoError::NotFound(format!(
                "{} `{name}`",
                NameKind::Sheet.label()
            )));
        }

        let report = if on_disk {
            delete_tree(&path, self.remover.as_ref())
        } else {
            warn!("event=sheet_delete module=repo status=drift reason=folder_missing");
            Default::default()
        };

        if let Some(position) = position {
            names.remove(position);
            self.save_names(&names)?;
        } else {
            warn!("event=sheet_delete module=repo status=drift reason=unlisted_folder");
        }

        if !report.is_complete() {
            error!(
                "event=sheet_delete module=repo status=error error_code=partial_failure removed={} failed={} duration_ms={}",
                report.removed,
                report.failed.len(),
                started_at.elapsed().as_millis()
            );
            return Err(RepoError::PartialFailure(report));
        }

        info!(
            "event=sheet_delete module=repo status=ok removed={} duration_ms={}",
            report.removed,
            started_at.elapsed().as_millis()
        );
        Ok(())
    }

    fn check_drift(&self) -> RepoResult<IndexDrift> {
        let names = self.load_names()?;
        let scan = self.scan_folders()?;

        let listed: HashSet<&str> = names.iter().map(String::as_str).collect();
        let mut missing_folders: Vec<String> = Vec::new();
        for name in &names {
            if !self.folder_exists(name) && !missing_folders.contains(name) {
                missing_folders.push(name.clone());
            }
        }
        let unlisted_folders = scan
            .sheets
            .into_iter()
            .filter(|folder| !listed.contains(folder.as_str()))
            .collect();

        Ok(IndexDrift {
            missing_folders,
            unlisted_folders,
            invalid_folders: scan.invalid,
        })
    }

    fn repair_index(&self) -> RepoResult<IndexDrift> {
        let drift = self.check_drift()?;
        if drift.is_clean() {
            return Ok(drift);
        }

        let missing: HashSet<&str> = drift.missing_folders.iter().map(String::as_str).collect();
        let mut names = self.load_names()?;
        names.retain(|name| !missing.contains(name.as_str()));
        names.extend(drift.unlisted_folders.iter().cloned());
        self.save_names(&names)?;

        info!(
            "event=sheet_index_repair module=repo status=ok dropped={} adopted={} ignored={}",
            drift.missing_folders.len(),
            drift.unlisted_folders.len(),
            drift.invalid_folders.len()
        );
        Ok(drift)
    }
}

#[cfg(test)]
mod tests {
    use super::{FsSheetRepository, SheetRepository, SHEET_LIST_KEY, SHEET_PREFS_STORE};
    use crate::db::open_db_in_memory;
    use crate::prefs::{PrefsStore, SqlitePrefsStore};
    use crate::repo::fs_tree::DenyFileNamed;
    use crate::repo::attachment_repo::{AttachmentStore, FsAttachmentStore};
    use crate::repo::RepoError;

    #[test]
    fn null_record_reads_as_empty_list() {
        let dir = tempfile::tempdir().unwrap();
        let conn = open_db_in_memory().unwrap();
        let prefs = SqlitePrefsStore::new(&conn, SHEET_PREFS_STORE);
        prefs.put_string(SHEET_LIST_KEY, "null").unwrap();

        let repo = FsSheetRepository::new(dir.path(), &prefs);
        assert!(repo.list_sheets().unwrap().is_empty());
    }

    #[test]
    fn corrupt_record_is_reported_not_reset() {
        let dir = tempfile::tempdir().unwrap();
        let conn = open_db_in_memory().unwrap();
        let prefs = SqlitePrefsStore::new(&conn, SHEET_PREFS_STORE);
        prefs.put_string(SHEET_LIST_KEY, "{\"a\":1}").unwrap();

        let repo = FsSheetRepository::new(dir.path(), &prefs);
        let err = repo.list_sheets().unwrap_err();
        assert!(matches!(err, RepoError::InvalidData(_)));
        assert_eq!(err.code(), "invalid_data");
        assert_eq!(
            prefs.get_string(SHEET_LIST_KEY).unwrap().as_deref(),
            Some("{\"a\":1}")
        );
    }

    #[test]
    fn list_is_written_as_json_array() {
        let dir = tempfile::tempdir().unwrap();
        let conn = open_db_in_memory().unwrap();
        let prefs = SqlitePrefsStore::new(&conn, SHEET_PREFS_STORE);
        let repo = FsSheetRepository::new(dir.path(), &prefs);

        repo.create_sheet("Canon").unwrap();
        repo.create_sheet("  Gymnopédie ").unwrap();

        assert_eq!(
            prefs.get_string(SHEET_LIST_KEY).unwrap().as_deref(),
            Some("[\"Canon\",\"Gymnopédie\"]")
        );
    }

    #[test]
    fn delete_with_locked_file_still_drops_list_entry() {
        let dir = tempfile::tempdir().unwrap();
        let conn = open_db_in_memory().unwrap();
        let prefs = SqlitePrefsStore::new(&conn, SHEET_PREFS_STORE);
        let repo = FsSheetRepository::new(dir.path(), &prefs)
            .with_remover(DenyFileNamed("Drums_groove.pdf"));
        let store = FsAttachmentStore::new(dir.path());

        let sheet = repo.create_sheet("Take Five").unwrap();
        store
            .add_attachment("Take Five", "Piano", &mut &b"keys"[..], "chart.pdf")
            .unwrap();
        store
            .add_attachment("Take Five", "Drums", &mut &b"beat"[..], "groove.pdf")
            .unwrap();

        let err = repo.delete_sheet("Take Five").unwrap_err();
        let RepoError::PartialFailure(report) = &err else {
            panic!("expected partial failure, got {err:?}");
        };
        assert_eq!(err.code(), "partial_failure");
        assert_eq!(report.removed, 1);
        // The locked file plus its non-empty parent.
        assert_eq!(report.failed.len(), 2);

        assert!(repo.list_sheets().unwrap().is_empty());
        assert!(!sheet.path.join("Piano_chart.pdf").exists());
        assert!(sheet.path.join("Drums_groove.pdf").exists());
    }
}
