//! Attachment store contracts and filesystem implementation.
//!
//! # Responsibility
//! - List, add and remove instrument-tagged files inside one sheet directory.
//!
//! # Invariants
//! - Stored filename is `instrument_fileName` (see `model::attachment`).
//! - `add_attachment` overwrites an existing file of the same composed name.
//! - A failed copy is not rolled back: a truncated destination file may
//!   remain and will show up in `list_attachments`.
//! - Listing order follows directory enumeration and is not stable.

use super::{RepoError, RepoResult};
use crate::model::attachment::{compose_stored_name, Attachment, INSTRUMENT_SEPARATOR};
use crate::model::name::{normalize_sheet_name, validate_component, NameKind};
use log::{error, info, warn};
use std::fs::{self, File};
use std::io::{self, Read, Write};
use std::path::{Path, PathBuf};
use std::time::Instant;

/// Store interface for attachments scoped by sheet name.
pub trait AttachmentStore {
    fn list_attachments(&self, sheet: &str) -> RepoResult<Vec<Attachment>>;
    fn add_attachment(
        &self,
        sheet: &str,
        instrument: &str,
        source: &mut dyn Read,
        file_name: &str,
    ) -> RepoResult<Attachment>;
    fn remove_attachment(&self, sheet: &str, instrument: &str, file_name: &str) -> RepoResult<()>;
}

/// Filesystem-backed attachment store sharing the sheet storage root.
pub struct FsAttachmentStore {
    root: PathBuf,
}

impl FsAttachmentStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    fn sheet_dir(&self, sheet: &str) -> RepoResult<PathBuf> {
        let sheet = normalize_sheet_name(sheet)?;
        Ok(self.root.join(sheet))
    }
}

fn composed_name(instrument: &str, file_name: &str) -> RepoResult<String> {
    validate_component(NameKind::Instrument, instrument)?;
    validate_component(NameKind::FileName, file_name)?;
    Ok(compose_stored_name(instrument, file_name))
}

impl AttachmentStore for FsAttachmentStore {
    fn list_attachments(&self, sheet: &str) -> RepoResult<Vec<Attachment>> {
        let dir = self.sheet_dir(sheet)?;
        let entries = match fs::read_dir(&dir) {
            Ok(entries) => entries,
            Err(err) if err.kind() == io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(err) => return Err(RepoError::io("read_dir", &dir, err)),
        };

        let mut attachments = Vec::new();
        for entry in entries {
            let entry = entry.map_err(|err| RepoError::io("read_dir", &dir, err))?;
            let size_bytes = entry
                .metadata()
                .map_err(|err| RepoError::io("stat", entry.path(), err))?
                .len();
            let stored_name = entry.file_name().to_string_lossy().into_owned();
            attachments.push(Attachment::from_stored_name(stored_name, size_bytes));
        }
        Ok(attachments)
    }

    fn add_attachment(
        &self,
        sheet: &str,
        instrument: &str,
        source: &mut dyn Read,
        file_name: &str,
    ) -> RepoResult<Attachment> {
        let started_at = Instant::now();
        let dir = self.sheet_dir(sheet)?;
        let stored_name = composed_name(instrument, file_name)?;
        if instrument.contains(INSTRUMENT_SEPARATOR) {
            warn!("event=attachment_add module=repo status=warn reason=instrument_contains_separator");
        }

        // Tolerates a sheet listed by name whose folder went missing.
        fs::create_dir_all(&dir).map_err(|err| RepoError::io("create_dir", &dir, err))?;

        let path = dir.join(&stored_name);
        let size_bytes = copy_into(source, &path).map_err(|err| {
            error!(
                "event=attachment_add module=repo status=error error_code=copy_failed duration_ms={} error={}",
                started_at.elapsed().as_millis(),
                err
            );
            err
        })?;

        info!(
            "event=attachment_add module=repo status=ok size_bytes={} duration_ms={}",
            size_bytes,
            started_at.elapsed().as_millis()
        );
        Ok(Attachment {
            instrument: Some(instrument.to_string()),
            file_name: file_name.to_string(),
            stored_name,
            size_bytes,
        })
    }

    fn remove_attachment(&self, sheet: &str, instrument: &str, file_name: &str) -> RepoResult<()> {
        let dir = self.sheet_dir(sheet)?;
        let stored_name = composed_name(instrument, file_name)?;
        let path = dir.join(&stored_name);

        match fs::symlink_metadata(&path) {
            Ok(_) => {}
            Err(err) if err.kind() == io::ErrorKind::NotFound => {
                return Err(RepoError::NotFound(format!("attachment `{stored_name}`")));
            }
            Err(err) => return Err(RepoError::io("stat", &path, err)),
        }

        fs::remove_file(&path).map_err(|err| {
            error!(
                "event=attachment_remove module=repo status=error error_code=remove_failed error={}",
                err
            );
            RepoError::io("remove_file", &path, err)
        })?;

        info!("event=attachment_remove module=repo status=ok");
        Ok(())
    }
}

/// Streams `source` into a freshly truncated file at `path`.
///
/// Both handles are dropped on every return path.
fn copy_into(source: &mut dyn Read, path: &Path) -> RepoResult<u64> {
    let mut file = File::create(path).map_err(|err| RepoError::io("create_file", path, err))?;
    let copied = io::copy(source, &mut file).map_err(|err| RepoError::io("copy", path, err))?;
    file.flush().map_err(|err| RepoError::io("flush", path, err))?;
    Ok(copied)
}

#[cfg(test)]
mod tests {
    use super::{AttachmentStore, FsAttachmentStore};
    use crate::repo::RepoError;
    use std::fs;
    use std::io::{self, Read};

    /// Yields `limit` bytes, then fails.
    struct FailingReader {
        remaining: usize,
    }

    impl Read for FailingReader {
        fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
            if self.remaining == 0 {
                return Err(io::Error::new(io::ErrorKind::BrokenPipe, "source closed"));
            }
            let n = self.remaining.min(buf.len());
            buf[..n].fill(b'%');
            self.remaining -= n;
            Ok(n)
        }
    }

    #[test]
    fn failed_copy_leaves_truncated_file() {
        let dir = tempfile::tempdir().unwrap();
        let store = FsAttachmentStore::new(dir.path());

        let mut reader = FailingReader { remaining: 5 };
        let err = store
            .add_attachment("Etude", "Piano", &mut reader, "etude.pdf")
            .unwrap_err();
        assert!(matches!(err, RepoError::Io { op: "copy", .. }));
        assert_eq!(err.code(), "io_failure");

        let leftover = fs::read(dir.path().join("Etude").join("Piano_etude.pdf")).unwrap();
        assert_eq!(leftover, b"%%%%%");
    }

    #[test]
    fn list_of_missing_sheet_folder_is_empty() {
        let dir = tempfile::tempdir().unwrap();
        let store = FsAttachmentStore::new(dir.path());
        assert!(store.list_attachments("Nowhere").unwrap().is_empty());
    }

    #[test]
    fn remove_missing_file_is_not_found() {
        let dir = tempfile::tempdir().unwrap();
        let store = FsAttachmentStore::new(dir.path());
        let err = store
            .remove_attachment("Etude", "Piano", "missing.pdf")
            .unwrap_err();
        assert!(matches!(err, RepoError::NotFound(_)));
    }

    #[test]
    fn remove_that_cannot_unlink_is_io_failure() {
        let dir = tempfile::tempdir().unwrap();
        let store = FsAttachmentStore::new(dir.path());
        // A directory squatting on the composed name cannot be unlinked.
        let squatter = dir.path().join("Etude").join("Piano_x.pdf");
        fs::create_dir_all(&squatter).unwrap();

        let err = store.remove_attachment("Etude", "Piano", "x.pdf").unwrap_err();
        assert!(matches!(
            err,
            RepoError::Io { op: "remove_file", ref path, .. } if *path == squatter
        ));
        assert_eq!(err.code(), "io_failure");
        assert!(squatter.is_dir());
    }
}
