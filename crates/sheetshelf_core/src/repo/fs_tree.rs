//! Depth-first recursive delete that keeps going after failures.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

/// One entry that could not be removed.
#[derive(Debug)]
pub struct FailedEntry {
    pub path: PathBuf,
    pub error: io::Error,
}

/// Outcome of a recursive delete.
#[derive(Debug, Default)]
pub struct DeleteReport {
    /// Files and directories actually removed.
    pub removed: usize,
    pub failed: Vec<FailedEntry>,
}

impl DeleteReport {
    pub fn is_complete(&self) -> bool {
        self.failed.is_empty()
    }

    fn record(&mut self, path: &Path, result: io::Result<()>) {
        match result {
            Ok(()) => self.removed += 1,
            // Gone already; nothing left to remove.
            Err(err) if err.kind() == io::ErrorKind::NotFound => {}
            Err(error) => self.failed.push(FailedEntry {
                path: path.to_path_buf(),
                error,
            }),
        }
    }
}

/// Removal primitives, split out so tests can force failures.
pub(crate) trait EntryRemover {
    fn remove_file(&self, path: &Path) -> io::Result<()>;
    fn remove_dir(&self, path: &Path) -> io::Result<()>;
}

pub(crate) struct StdRemover;

impl EntryRemover for StdRemover {
    fn remove_file(&self, path: &Path) -> io::Result<()> {
        fs::remove_file(path)
    }

    fn remove_dir(&self, path: &Path) -> io::Result<()> {
        fs::remove_dir(path)
    }
}

/// Refuses to remove files with one exact name.
#[cfg(test)]
pub(crate) struct DenyFileNamed(pub &'static str);

#[cfg(test)]
impl EntryRemover for DenyFileNamed {
    fn remove_file(&self, path: &Path) -> io::Result<()> {
        if path.file_name().and_then(|n| n.to_str()) == Some(self.0) {
            return Err(io::Error::new(
                io::ErrorKind::PermissionDenied,
                "simulated denial",
            ));
        }
        fs::remove_file(path)
    }

    fn remove_dir(&self, path: &Path) -> io::Result<()> {
        fs::remove_dir(path)
    }
}

/// Deletes `root` and everything below it.
///
/// Children are removed before their parent. A failing child does not stop
/// its siblings; the parent directory removal is still attempted and will
/// itself fail when the directory is not empty. Symlinks are removed, never
/// followed.
pub(crate) fn delete_tree(root: &Path, remover: &dyn EntryRemover) -> DeleteReport {
    let mut report = DeleteReport::default();
    visit(root, remover, &mut report);
    report
}

fn visit(path: &Path, remover: &dyn EntryRemover, report: &mut DeleteReport) {
    let metadata = match fs::symlink_metadata(path) {
        Ok(metadata) => metadata,
        Err(err) => {
            report.record(path, Err(err));
            return;
        }
    };

    if !metadata.is_dir() {
        report.record(path, remover.remove_file(path));
        return;
    }

    match fs::read_dir(path) {
        Ok(entries) => {
            for entry in entries {
                match entry {
                    Ok(entry) => visit(&entry.path(), remover, report),
                    Err(err) => report.record(path, Err(err)),
                }
            }
        }
        Err(err) => {
            report.record(path, Err(err));
            return;
        }
    }

    report.record(path, remover.remove_dir(path));
}

#[cfg(test)]
mod tests {
    use super::{delete_tree, DenyFileNamed, StdRemover};
    use std::fs;

    #[test]
    fn removes_nested_tree() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path().join("Sheet");
        fs::create_dir_all(root.join("nested")).unwrap();
        fs::write(root.join("Piano_a.pdf"), b"a").unwrap();
        fs::write(root.join("nested").join("b"), b"b").unwrap();

        let report = delete_tree(&root, &StdRemover);
        assert!(report.is_complete());
        assert_eq!(report.removed, 4);
        assert!(!root.exists());
    }

    #[test]
    fn failing_child_does_not_stop_siblings() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path().join("Sheet");
        fs::create_dir_all(&root).unwrap();
        fs::write(root.join("Piano_a.pdf"), b"a").unwrap();
        fs::write(root.join("Drums_b.pdf"), b"b").unwrap();
        fs::write(root.join("Bass_c.pdf"), b"c").unwrap();

        let report = delete_tree(&root, &DenyFileNamed("Drums_b.pdf"));

        assert!(!report.is_complete());
        assert_eq!(report.removed, 2);
        // The locked file plus the non-empty directory itself.
        assert_eq!(report.failed.len(), 2);
        assert!(root.join("Drums_b.pdf").exists());
        assert!(!root.join("Piano_a.pdf").exists());
        assert!(!root.join("Bass_c.pdf").exists());
    }

    #[test]
    fn missing_root_removes_nothing_and_fails_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let report = delete_tree(&dir.path().join("absent"), &StdRemover);
        assert_eq!(report.removed, 0);
        assert!(report.is_complete());
    }
}
