//! FFI use-case API for Flutter-facing calls.
//!
//! # Responsibility
//! - Expose the sheet library screens' calls to Dart via FRB.
//! - Turn every core outcome into an envelope the UI can show as a toast.
//!
//! # Invariants
//! - Exported functions must not panic across FFI boundary.
//! - Each call opens its own preferences connection; no connection is shared.
//! - The data directory is fixed for the process once first resolved.

use sheetshelf_core::db::open_db;
use sheetshelf_core::{
    core_version as core_version_inner, init_logging as init_logging_inner, ping as ping_inner,
    Attachment, BytesContentSource, ContentSource, FileContentSource, FsAttachmentStore,
    FsSheetRepository, IndexDrift, LibraryPaths, RepoError, RepoResult, SheetService,
    SqlitePrefsStore, DEFAULT_INSTRUMENTS, PDF_MIME_TYPE, SHEET_PREFS_STORE,
};
use std::sync::OnceLock;

static LIBRARY_PATHS: OnceLock<LibraryPaths> = OnceLock::new();

type FfiSheetService<'conn> =
    SheetService<FsSheetRepository<SqlitePrefsStore<'conn>>, FsAttachmentStore>;

/// Minimal health-check API for FRB smoke integration.
///
/// # FFI contract
/// - Sync call, non-blocking.
/// - Never throws; always returns a UTF-8 string.
#[flutter_rust_bridge::frb(sync)]
pub fn ping() -> String {
    ping_inner().to_owned()
}

/// Expose core crate version through FFI.
#[flutter_rust_bridge::frb(sync)]
pub fn core_version() -> String {
    core_version_inner().to_owned()
}

/// Initializes Rust core logging once per process.
///
/// Input semantics:
/// - `level`: one of `trace|debug|info|warn|error` (case-insensitive).
/// - `log_dir`: absolute directory path where rolling logs are written.
///
/// # FFI contract
/// - Safe to call repeatedly with the same `level + log_dir`.
/// - Returns empty string on success and error message on failure.
#[flutter_rust_bridge::frb(sync)]
pub fn init_logging(level: String, log_dir: String) -> String {
    match init_logging_inner(&level, log_dir.trim()) {
        Ok(()) => String::new(),
        Err(err) => err.to_string(),
    }
}

/// Pins the app-private data directory for this process.
///
/// Must be called before the first sheet call; otherwise
/// `SHEETSHELF_DATA_DIR` or a temp-dir fallback is used.
///
/// # FFI contract
/// - Idempotent for the same directory.
/// - Returns empty string on success and error message on failure.
#[flutter_rust_bridge::frb(sync)]
pub fn configure_data_dir(data_dir: String) -> String {
    let trimmed = data_dir.trim();
    if trimmed.is_empty() {
        return "data_dir cannot be empty".to_string();
    }
    let requested = LibraryPaths::new(trimmed);
    let active = LIBRARY_PATHS.get_or_init(|| requested.clone());
    if *active != requested {
        return format!(
            "data dir already set to `{}`; refusing to switch to `{}`",
            active.data_dir().display(),
            requested.data_dir().display()
        );
    }
    String::new()
}

/// Instruments offered by the upload picker.
#[flutter_rust_bridge::frb(sync)]
pub fn default_instruments() -> Vec<String> {
    DEFAULT_INSTRUMENTS.iter().map(|name| name.to_string()).collect()
}

/// MIME filter for the system file picker.
#[flutter_rust_bridge::frb(sync)]
pub fn picker_mime_type() -> String {
    PDF_MIME_TYPE.to_string()
}

/// Generic action response envelope.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActionResponse {
    /// Whether operation succeeded.
    pub ok: bool,
    /// Stable error code (`invalid_name|not_found|io_failure|...`) on failure.
    pub error_code: Option<String>,
    /// Human-readable message for the toast.
    pub message: String,
}

impl ActionResponse {
    fn success(message: impl Into<String>) -> Self {
        Self {
            ok: true,
            error_code: None,
            message: message.into(),
        }
    }

    fn failure(op: &str, err: &FfiError) -> Self {
        Self {
            ok: false,
            error_code: Some(err.code().to_string()),
            message: format!("{op} failed: {err}"),
        }
    }
}

/// Sheet list for the sheet manager screen.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SheetListResponse {
    pub ok: bool,
    /// Names in display order; empty on failure.
    pub names: Vec<String>,
    pub message: String,
}

/// One row of the upload screen list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AttachmentItem {
    /// Empty when the stored filename has no instrument prefix.
    pub instrument: String,
    pub file_name: String,
    pub stored_name: String,
    pub size_bytes: u64,
}

/// Attachment list for the upload screen.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AttachmentListResponse {
    pub ok: bool,
    pub items: Vec<AttachmentItem>,
    pub message: String,
}

/// Result of a drift check or repair.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DriftResponse {
    pub ok: bool,
    pub missing_folders: Vec<String>,
    pub unlisted_folders: Vec<String>,
    /// Folders that cannot be sheets; never adopted by repair.
    pub invalid_folders: Vec<String>,
    pub message: String,
}

/// Lists sheet names.
///
/// # FFI contract
/// - Sync call, disk-backed.
/// - Never panics.
#[flutter_rust_bridge::frb(sync)]
pub fn sheet_list() -> SheetListResponse {
    match with_sheet_service(|service| service.list_sheets()) {
        Ok(names) => SheetListResponse {
            ok: true,
            message: format!("{} sheet(s).", names.len()),
            names,
        },
        Err(err) => SheetListResponse {
            ok: false,
            names: Vec::new(),
            message: format!("sheet_list failed: {err}"),
        },
    }
}

/// Creates a sheet and its folder.
#[flutter_rust_bridge::frb(sync)]
pub fn sheet_create(name: String) -> ActionResponse {
    match with_sheet_service(|service| service.create_sheet(&name)) {
        Ok(sheet) => ActionResponse::success(format!("Sheet `{}` created.", sheet.name)),
        Err(err) => ActionResponse::failure("sheet_create", &err),
    }
}

/// Deletes a sheet folder with every attachment and drops it from the list.
///
/// # FFI contract
/// - A partially deleted folder still drops the list entry and returns
///   `error_code = partial_failure`.
#[flutter_rust_bridge::frb(sync)]
pub fn sheet_delete(name: String) -> ActionResponse {
    match with_sheet_service(|service| service.delete_sheet(&name)) {
        Ok(()) => ActionResponse::success("Sheet folder deleted."),
        Err(err) => ActionResponse::failure("sheet_delete", &err),
    }
}

/// Reports disagreement between the sheet list and the folders on disk.
#[flutter_rust_bridge::frb(sync)]
pub fn sheet_check_drift() -> DriftResponse {
    drift_response("sheet_check_drift", with_sheet_service(|s| s.check_drift()))
}

/// Rebuilds the sheet list from the folders on disk.
#[flutter_rust_bridge::frb(sync)]
pub fn sheet_repair_index() -> DriftResponse {
    drift_response("sheet_repair_index", with_sheet_service(|s| s.repair_index()))
}

/// Lists attachments of one sheet.
#[flutter_rust_bridge::frb(sync)]
pub fn attachment_list(sheet: String) -> AttachmentListResponse {
    match with_sheet_service(|service| service.open_sheet(&sheet)) {
        Ok(attachments) => AttachmentListResponse {
            ok: true,
            message: format!("{} file(s).", attachments.len()),
            items: attachments.into_iter().map(to_attachment_item).collect(),
        },
        Err(err) => AttachmentListResponse {
            ok: false,
            items: Vec::new(),
            message: format!("attachment_list failed: {err}"),
        },
    }
}

/// Copies a picked file, given by a readable local path, into a sheet.
///
/// Input semantics:
/// - `display_name`: picker name metadata; when `None` or blank, the last
///   segment of `source_path` is used.
#[flutter_rust_bridge::frb(sync)]
pub fn attachment_add(
    sheet: String,
    instrument: String,
    source_path: String,
    display_name: Option<String>,
) -> ActionResponse {
    let picked = FileContentSource::new(source_path).with_display_name(display_name);
    import_response(&sheet, &instrument, &picked)
}

/// Stores picked file bytes handed over by the host into a sheet.
#[flutter_rust_bridge::frb(sync)]
pub fn attachment_add_bytes(
    sheet: String,
    instrument: String,
    reference: String,
    display_name: Option<String>,
    bytes: Vec<u8>,
) -> ActionResponse {
    let picked = BytesContentSource::new(reference, display_name, bytes);
    import_response(&sheet, &instrument, &picked)
}

/// Deletes one attachment by its instrument and display file name.
#[flutter_rust_bridge::frb(sync)]
pub fn attachment_remove(sheet: String, instrument: String, file_name: String) -> ActionResponse {
    match with_sheet_service(|service| service.remove_attachment(&sheet, &instrument, &file_name))
    {
        Ok(()) => ActionResponse::success("File deleted."),
        Err(err) => ActionResponse::failure("attachment_remove", &err),
    }
}

/// Failure before or inside a service call.
#[derive(Debug)]
enum FfiError {
    Setup(String),
    Repo(RepoError),
}

impl FfiError {
    fn code(&self) -> &'static str {
        match self {
            Self::Setup(_) => "setup_failure",
            Self::Repo(err) => err.code(),
        }
    }
}

impl std::fmt::Display for FfiError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Setup(message) => write!(f, "{message}"),
            Self::Repo(err) => write!(f, "{err}"),
        }
    }
}

fn import_response(sheet: &str, instrument: &str, picked: &dyn ContentSource) -> ActionResponse {
    match with_sheet_service(|service| service.import_attachment(sheet, instrument, picked)) {
        Ok(attachment) => ActionResponse::success(format!(
            "File saved to `{sheet}` as `{}`.",
            attachment.stored_name
        )),
        Err(err) => ActionResponse::failure("attachment_add", &err),
    }
}

fn drift_response(op: &str, result: Result<IndexDrift, FfiError>) -> DriftResponse {
    match result {
        Ok(drift) => DriftResponse {
            ok: true,
            message: if drift.is_clean() && drift.invalid_folders.is_empty() {
                "Sheet list matches folders.".to_string()
            } else {
                format!(
                    "{} missing folder(s), {} unlisted folder(s), {} ignored folder(s).",
                    drift.missing_folders.len(),
                    drift.unlisted_folders.len(),
                    drift.invalid_folders.len()
                )
            },
            missing_folders: drift.missing_folders,
            unlisted_folders: drift.unlisted_folders,
            invalid_folders: drift.invalid_folders,
        },
        Err(err) => DriftResponse {
            ok: false,
            missing_folders: Vec::new(),
            unlisted_folders: Vec::new(),
            invalid_folders: Vec::new(),
            message: format!("{op} failed: {err}"),
        },
    }
}

fn resolve_library_paths() -> &'static LibraryPaths {
    LIBRARY_PATHS.get_or_init(|| LibraryPaths::resolve(None))
}

fn with_sheet_service<T>(
    f: impl FnOnce(&FfiSheetService<'_>) -> RepoResult<T>,
) -> Result<T, FfiError> {
    let paths = resolve_library_paths();
    paths
        .ensure_dirs()
        .map_err(|err| FfiError::Setup(format!("data dir setup failed: {err}")))?;
    let conn = open_db(paths.prefs_db_path())
        .map_err(|err| FfiError::Setup(format!("prefs DB open failed: {err}")))?;
    let root = paths.sheets_root();
    let service = SheetService::new(
        FsSheetRepository::new(&root, SqlitePrefsStore::new(&conn, SHEET_PREFS_STORE)),
        FsAttachmentStore::new(&root),
    );
    f(&service).map_err(FfiError::Repo)
}

fn to_attachment_item(attachment: Attachment) -> AttachmentItem {
    AttachmentItem {
        instrument: attachment.instrument.unwrap_or_default(),
        file_name: attachment.file_name,
        stored_name: attachment.stored_name,
        size_bytes: attachment.size_bytes,
    }
}
