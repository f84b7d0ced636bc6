//! Command-line front end for a SheetShelf library.
//!
//! # Responsibility
//! - Drive the same sheet and attachment operations the mobile screens use.
//! - Print plain text by default and JSON with `--json`.

use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use log::info;
use serde::Serialize;
use sheetshelf_core::db::open_db;
use sheetshelf_core::{
    default_log_level, init_logging, Attachment, FileContentSource, FsAttachmentStore,
    FsSheetRepository, IndexDrift, LibraryPaths, SheetService, SqlitePrefsStore, DATA_DIR_ENV,
    DEFAULT_INSTRUMENTS, SHEET_PREFS_STORE,
};

#[derive(Parser, Debug)]
#[command(name = "sheetshelf", version, about = "Organize sheet-music PDFs by piece and instrument")]
struct Cli {
    /// Library data directory (sheets, preferences database, logs).
    #[arg(long, env = DATA_DIR_ENV)]
    data_dir: Option<String>,

    /// Log level written to `<data-dir>/logs`.
    #[arg(long)]
    log_level: Option<String>,

    /// Emit JSON instead of text.
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// List sheet names in display order.
    Sheets,
    /// Create a sheet and its folder.
    Create { name: String },
    /// Delete a sheet folder with all its files.
    Delete { name: String },
    /// List files stored in a sheet.
    Files { sheet: String },
    /// Copy a PDF into a sheet under an instrument tag.
    Add {
        sheet: String,
        /// Instrument tag, e.g. one of `instruments`.
        instrument: String,
        file: PathBuf,
        /// Stored display name; defaults to the source file name.
        #[arg(long)]
        name: Option<String>,
    },
    /// Remove one file from a sheet.
    Remove {
        sheet: String,
        instrument: String,
        file_name: String,
    },
    /// Show the default instrument tags.
    Instruments,
    /// Compare the sheet list with folders on disk; `--repair` rebuilds it.
    Doctor {
        #[arg(long)]
        repair: bool,
    },
}

#[derive(Debug, Serialize)]
struct Outcome {
    ok: bool,
    message: String,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    let paths = LibraryPaths::resolve(cli.data_dir.as_deref());
    paths
        .ensure_dirs()
        .with_context(|| format!("failed to prepare {}", paths.data_dir().display()))?;

    let level = cli.log_level.as_deref().unwrap_or(default_log_level());
    let log_dir = absolute(&paths.log_dir())?;
    init_logging(level, &log_dir).context("failed to start logging")?;
    info!("event=cli_start module=cli status=ok");

    let conn = open_db(paths.prefs_db_path()).context("failed to open preferences database")?;
    let root = paths.sheets_root();
    let service = SheetService::new(
        FsSheetRepository::new(&root, SqlitePrefsStore::new(&conn, SHEET_PREFS_STORE)),
        FsAttachmentStore::new(&root),
    );

    match cli.command {
        Command::Sheets => {
            let names = service.list_sheets()?;
            print_list(cli.json, &names, |name| name.clone())
        }
        Command::Create { name } => {
            let sheet = service.create_sheet(&name)?;
            print_outcome(cli.json, format!("created sheet `{}`", sheet.name))
        }
        Command::Delete { name } => {
            service
                .delete_sheet(&name)
                .with_context(|| format!("failed to delete sheet `{}`", name.trim()))?;
            print_outcome(cli.json, format!("deleted sheet `{}`", name.trim()))
        }
        Command::Files { sheet } => {
            let attachments = service.open_sheet(&sheet)?;
            print_list(cli.json, &attachments, describe_attachment)
        }
        Command::Add {
            sheet,
            instrument,
            file,
            name,
        } => {
            let picked = FileContentSource::new(&file).with_display_name(name);
            let attachment = service.import_attachment(&sheet, &instrument, &picked)?;
            print_outcome(cli.json, format!("stored `{}`", attachment.stored_name))
        }
        Command::Remove {
            sheet,
            instrument,
            file_name,
        } => {
            service.remove_attachment(&sheet, &instrument, &file_name)?;
            print_outcome(cli.json, format!("removed `{instrument}_{file_name}`"))
        }
        Command::Instruments => print_list(cli.json, DEFAULT_INSTRUMENTS, |name| name.to_string()),
        Command::Doctor { repair } => {
            let drift = if repair {
                service.repair_index()?
            } else {
                service.check_drift()?
            };
            print_drift(cli.json, &drift, repair)
        }
    }
}

fn absolute(path: &Path) -> Result<PathBuf> {
    if path.is_absolute() {
        return Ok(path.to_path_buf());
    }
    let cwd = std::env::current_dir().context("failed to read current directory")?;
    Ok(cwd.join(path))
}

fn describe_attachment(attachment: &Attachment) -> String {
    match attachment.instrument.as_deref() {
        Some(instrument) => format!(
            "{instrument}\t{}\t{} bytes",
            attachment.file_name, attachment.size_bytes
        ),
        None => format!("-\t{}\t{} bytes", attachment.file_name, attachment.size_bytes),
    }
}

fn print_list<T: Serialize>(json: bool, items: &[T], line: impl Fn(&T) -> String) -> Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(items)?);
        return Ok(());
    }
    for item in items {
        println!("{}", line(item));
    }
    Ok(())
}

fn print_outcome(json: bool, message: String) -> Result<()> {
    if json {
        let outcome = Outcome { ok: true, message };
        println!("{}", serde_json::to_string(&outcome)?);
    } else {
        println!("{message}");
    }
    Ok(())
}

fn print_drift(json: bool, drift: &IndexDrift, repaired: bool) -> Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(drift)?);
        return Ok(());
    }
    for name in &drift.invalid_folders {
        println!("ignored folder: {name}");
    }
    if drift.is_clean() {
        println!("sheet list matches folders");
        return Ok(());
    }
    let verb = if repaired { "dropped" } else { "missing folder" };
    for name in &drift.missing_folders {
        println!("{verb}: {name}");
    }
    let verb = if repaired { "adopted" } else { "unlisted folder" };
    for name in &drift.unlisted_folders {
        println!("{verb}: {name}");
    }
    if !repaired {
        bail!("sheet list is out of sync; rerun with --repair");
    }
    Ok(())
}
