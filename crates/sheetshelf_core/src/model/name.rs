//! Path component validation for user-supplied names.
//!
//! Sheet names become directory names and attachment names become file
//! names, so anything that could address a different path is rejected.

use once_cell::sync::Lazy;
use regex::Regex;
use std::error::Error;
use std::fmt::{Display, Formatter};

static FORBIDDEN_CHAR_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"[/\\<>:"|?*\x00-\x1F\x7F]"#).expect("valid forbidden char regex")
});

/// Which kind of name failed validation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NameKind {
    Sheet,
    Instrument,
    FileName,
}

impl NameKind {
    pub fn label(self) -> &'static str {
        match self {
            Self::Sheet => "sheet name",
            Self::Instrument => "instrument",
            Self::FileName => "file name",
        }
    }
}

/// Name validation failure.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NameValidationError {
    /// Empty or whitespace-only.
    Blank(NameKind),
    /// `.` or `..`.
    Reserved { kind: NameKind, value: String },
    /// Contains a path separator, control or platform-reserved character.
    ForbiddenCharacter {
        kind: NameKind,
        value: String,
        character: char,
    },
}

impl NameValidationError {
    pub fn kind(&self) -> NameKind {
        match self {
            Self::Blank(kind) => *kind,
            Self::Reserved { kind, .. } | Self::ForbiddenCharacter { kind, .. } => *kind,
        }
    }
}

impl Display for NameValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Blank(kind) => write!(f, "{} must not be blank", kind.label()),
            Self::Reserved { kind, value } => {
                write!(f, "{} `{value}` is reserved", kind.label())
            }
            Self::ForbiddenCharacter {
                kind,
                value,
                character,
            } => write!(
                f,
                "{} `{value}` contains forbidden character {character:?}",
                kind.label()
            ),
        }
    }
}

impl Error for NameValidationError {}

/// Checks that `value` can be used verbatim as a single path component.
///
/// Does not trim; callers decide whether surrounding whitespace is significant.
pub fn validate_component(kind: NameKind, value: &str) -> Result<(), NameValidationError> {
    if value.trim().is_empty() {
        return Err(NameValidationError::Blank(kind));
    }
    if value == "." || value == ".." {
        return Err(NameValidationError::Reserved {
            kind,
            value: value.to_string(),
        });
    }
    if let Some(found) = FORBIDDEN_CHAR_RE.find(value) {
        let character = found.as_str().chars().next().unwrap_or_default();
        return Err(NameValidationError::ForbiddenCharacter {
            kind,
            value: value.to_string(),
            character,
        });
    }
    Ok(())
}

/// Trims a sheet name and validates the result.
pub fn normalize_sheet_name(raw: &str) -> Result<String, NameValidationError> {
    let trimmed = raw.trim();
    validate_component(NameKind::Sheet, trimmed)?;
    Ok(trimmed.to_string())
}
