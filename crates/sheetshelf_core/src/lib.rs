//! Storage core for the SheetShelf sheet-music library.
//! This crate is the single source of truth for naming and storage rules.

pub mod config;
pub mod db;
pub mod logging;
pub mod model;
pub mod prefs;
pub mod repo;
pub mod service;
pub mod source;

pub use config::{LibraryPaths, DATA_DIR_ENV};
pub use logging::{default_log_level, init_logging, logging_status, LoggingError};
pub use model::attachment::{
    compose_stored_name, parse_stored_name, Attachment, DEFAULT_INSTRUMENTS,
};
pub use model::name::{NameKind, NameValidationError};
pub use model::sheet::{IndexDrift, Sheet};
pub use prefs::{PrefsStore, SqlitePrefsStore};
pub use repo::attachment_repo::{AttachmentStore, FsAttachmentStore};
pub use repo::sheet_repo::{
    FsSheetRepository, SheetRepository, SHEET_LIST_KEY, SHEET_PREFS_STORE,
};
pub use repo::{DeleteReport, FailedEntry, RepoError, RepoResult};
pub use service::sheet_service::SheetService;
pub use source::{
    resolve_display_name, BytesContentSource, ContentSource, FileContentSource, PDF_MIME_TYPE,
};

/// Minimal health-check API for host integration.
pub fn ping() -> &'static str {
    "pong"
}

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
