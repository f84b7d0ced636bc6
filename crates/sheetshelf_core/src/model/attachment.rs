//! Attachment record and on-disk filename encoding.
//!
//! # Invariants
//! - Stored filename is `instrument + "_" + file_name`.
//! - Parsing splits at the first `_`. An instrument that itself contains `_`
//!   therefore does not round-trip: `"Bass_2" + "_" + "a.pdf"` parses back as
//!   instrument `Bass`, file `2_a.pdf`. This is a known limitation of the
//!   encoding and is kept as-is.

use serde::Serialize;

/// Separator between instrument tag and display file name.
pub const INSTRUMENT_SEPARATOR: char = '_';

/// Instruments offered by the upload picker. Not enforced by the store, so
/// files tagged with other labels (e.g. Korean `피아노`) list the same way.
pub const DEFAULT_INSTRUMENTS: &[&str] = &["Piano", "Drums", "Bass", "Guitar"];

/// One instrument-tagged file inside a sheet directory.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Attachment {
    /// `None` when the stored filename carries no separator.
    pub instrument: Option<String>,
    /// Display file name as supplied at import time.
    pub file_name: String,
    /// Actual filename inside the sheet directory.
    pub stored_name: String,
    pub size_bytes: u64,
}

impl Attachment {
    /// Builds a record from a stored filename.
    pub fn from_stored_name(stored_name: impl Into<String>, size_bytes: u64) -> Self {
        let stored_name = stored_name.into();
        let (instrument, file_name) = parse_stored_name(&stored_name);
        Self {
            instrument,
            file_name,
            stored_name,
            size_bytes,
        }
    }
}

/// Composes the on-disk filename for an attachment.
pub fn compose_stored_name(instrument: &str, file_name: &str) -> String {
    format!("{instrument}{INSTRUMENT_SEPARATOR}{file_name}")
}

/// Splits a stored filename at the first separator.
///
/// Returns `(None, whole)` when there is no separator.
pub fn parse_stored_name(stored_name: &str) -> (Option<String>, String) {
    match stored_name.split_once(INSTRUMENT_SEPARATOR) {
        Some((instrument, file_name)) => (Some(instrument.to_string()), file_name.to_string()),
        None => (None, stored_name.to_string()),
    }
}
