//! Import boundary for externally picked files.
//!
//! # Responsibility
//! - Describe what the core needs from a picked file: a byte stream and an
//!   optional display name.
//! - Resolve a display name when the picker does not supply one.
//!
//! # Invariants
//! - Resolved names are best effort; they are neither unique nor sanitized.
//!   The attachment store validates them before use.

use std::fs::File;
use std::io::{self, Cursor, Read};
use std::path::PathBuf;

/// MIME filter the upload picker applies.
pub const PDF_MIME_TYPE: &str = "application/pdf";

/// A picked file, as seen by the core.
pub trait ContentSource {
    /// Opaque reference (URI or path) used for the fallback display name.
    fn reference(&self) -> &str;

    /// Name metadata exposed by the source, if any.
    fn display_name(&self) -> Option<String> {
        None
    }

    /// Opens a fresh byte stream over the content.
    fn open(&self) -> io::Result<Box<dyn Read + '_>>;
}

/// Picks the name metadata when present and non-blank, else the trailing
/// path segment of the reference.
pub fn resolve_display_name(source: &dyn ContentSource) -> Option<String> {
    if let Some(name) = source.display_name() {
        if !name.trim().is_empty() {
            return Some(name);
        }
    }
    last_path_segment(source.reference())
}

fn last_path_segment(reference: &str) -> Option<String> {
    let path = match reference.split_once("://") {
        Some((_, rest)) => rest.split(['?', '#']).next().unwrap_or(rest),
        None => reference,
    };
    path.rsplit(['/', '\\'])
        .find(|segment| !segment.is_empty())
        .map(str::to_string)
}

/// Content read from a local file path.
#[derive(Debug, Clone)]
pub struct FileContentSource {
    path: PathBuf,
    reference: String,
    display_name: Option<String>,
}

impl FileContentSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let reference = path.to_string_lossy().into_owned();
        Self {
            path,
            reference,
            display_name: None,
        }
    }

    /// Overrides the file's own name, e.g. with picker metadata.
    pub fn with_display_name(mut self, display_name: Option<String>) -> Self {
        self.display_name = display_name;
        self
    }
}

impl ContentSource for FileContentSource {
    fn reference(&self) -> &str {
        &self.reference
    }

    fn display_name(&self) -> Option<String> {
        self.display_name.clone().or_else(|| {
            self.path
                .file_name()
                .map(|name| name.to_string_lossy().into_owned())
        })
    }

    fn open(&self) -> io::Result<Box<dyn Read + '_>> {
        Ok(Box::new(File::open(&self.path)?))
    }
}

/// In-memory content handed over by a host that already read the bytes.
#[derive(Debug, Clone)]
pub struct BytesContentSource {
    reference: String,
    display_name: Option<String>,
    bytes: Vec<u8>,
}

impl BytesContentSource {
    pub fn new(reference: impl Into<String>, display_name: Option<String>, bytes: Vec<u8>) -> Self {
        Self {
            reference: reference.into(),
            display_name,
            bytes,
        }
    }
}

impl ContentSource for BytesContentSource {
    fn reference(&self) -> &str {
        &self.reference
    }

    fn display_name(&self) -> Option<String> {
        self.display_name.clone()
    }

    fn open(&self) -> io::Result<Box<dyn Read + '_>> {
        Ok(Box::new(Cursor::new(self.bytes.as_slice())))
    }
}
