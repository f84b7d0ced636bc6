use sheetshelf_core::db::open_db_in_memory;
use sheetshelf_core::{
    AttachmentStore, FsAttachmentStore, FsSheetRepository, PrefsStore, RepoError,
    SheetRepository, SqlitePrefsStore, SHEET_LIST_KEY, SHEET_PREFS_STORE,
};
use std::fs;
use std::path::PathBuf;
use tempfile::TempDir;

fn sheets_root(dir: &TempDir) -> PathBuf {
    dir.path().join("sheets")
}

#[test]
fn blank_names_are_rejected_and_list_is_unchanged() {
    let dir = tempfile::tempdir().unwrap();
    let conn = open_db_in_memory().unwrap();
    let repo = FsSheetRepository::new(
        sheets_root(&dir),
        SqlitePrefsStore::new(&conn, SHEET_PREFS_STORE),
    );

    for raw in ["", "   "] {
        let err = repo.create_sheet(raw).unwrap_err();
        assert!(matches!(err, RepoError::InvalidName(_)));
    }
    assert!(repo.list_sheets().unwrap().is_empty());
    assert!(!sheets_root(&dir).exists());
}

#[test]
fn create_adds_name_and_folder() {
    let dir = tempfile::tempdir().unwrap();
    let conn = open_db_in_memory().unwrap();
    let repo = FsSheetRepository::new(
        sheets_root(&dir),
        SqlitePrefsStore::new(&conn, SHEET_PREFS_STORE),
    );

    let sheet = repo.create_sheet("  Clair de Lune ").unwrap();
    assert_eq!(sheet.name, "Clair de Lune");
    assert_eq!(sheet.path, sheets_root(&dir).join("Clair de Lune"));
    assert!(sheet.path.is_dir());
    assert_eq!(repo.list_sheets().unwrap(), vec!["Clair de Lune"]);
}

#[test]
fn duplicate_create_keeps_two_entries_and_one_folder() {
    let dir = tempfile::tempdir().unwrap();
    let conn = open_db_in_memory().unwrap();
    let repo = FsSheetRepository::new(
        sheets_root(&dir),
        SqlitePrefsStore::new(&conn, SHEET_PREFS_STORE),
    );

    repo.create_sheet("X").unwrap();
    repo.create_sheet("X").unwrap();

    assert_eq!(repo.list_sheets().unwrap(), vec!["X", "X"]);
    let folders = fs::read_dir(sheets_root(&dir)).unwrap().count();
    assert_eq!(folders, 1);
}

#[test]
fn list_preserves_insertion_order() {
    let dir = tempfile::tempdir().unwrap();
    let conn = open_db_in_memory().unwrap();
    let repo = FsSheetRepository::new(
        sheets_root(&dir),
        SqlitePrefsStore::new(&conn, SHEET_PREFS_STORE),
    );

    for name in ["Zeta", "Alpha", "Mu"] {
        repo.create_sheet(name).unwrap();
    }
    assert_eq!(repo.list_sheets().unwrap(), vec!["Zeta", "Alpha", "Mu"]);
}

#[test]
fn list_survives_reopening_the_database() {
    let dir = tempfile::tempdir().unwrap();
    let db_path = dir.path().join("prefs.sqlite3");
    {
        let conn = sheetshelf_core::db::open_db(&db_path).unwrap();
        let repo = FsSheetRepository::new(
            sheets_root(&dir),
            SqlitePrefsStore::new(&conn, SHEET_PREFS_STORE),
        );
        repo.create_sheet("Nocturne").unwrap();
    }

    let conn = sheetshelf_core::db::open_db(&db_path).unwrap();
    let repo = FsSheetRepository::new(
        sheets_root(&dir),
        SqlitePrefsStore::new(&conn, SHEET_PREFS_STORE),
    );
    assert_eq!(repo.list_sheets().unwrap(), vec!["Nocturne"]);
}

#[test]
fn delete_removes_folder_attachments_and_entry() {
    let dir = tempfile::tempdir().unwrap();
    let conn = open_db_in_memory().unwrap();
    let repo = FsSheetRepository::new(
        sheets_root(&dir),
        SqlitePrefsStore::new(&conn, SHEET_PREFS_STORE),
    );
    let store = FsAttachmentStore::new(sheets_root(&dir));

    let sheet = repo.create_sheet("X").unwrap();
    store
        .add_attachment("X", "Piano", &mut &b"piano"[..], "song.pdf")
        .unwrap();
    store
        .add_attachment("X", "Drums", &mut &b"drums"[..], "song.pdf")
        .unwrap();

    repo.delete_sheet("X").unwrap();

    assert!(!sheet.path.exists());
    assert!(repo.list_sheets().unwrap().is_empty());
}

#[test]
fn delete_drops_only_first_duplicate_entry() {
    let dir = tempfile::tempdir().unwrap();
    let conn = open_db_in_memory().unwrap();
    let repo = FsSheetRepository::new(
        sheets_root(&dir),
        SqlitePrefsStore::new(&conn, SHEET_PREFS_STORE),
    );

    repo.create_sheet("X").unwrap();
    repo.create_sheet("Y").unwrap();
    repo.create_sheet("X").unwrap();

    repo.delete_sheet("X").unwrap();
    assert_eq!(repo.list_sheets().unwrap(), vec!["Y", "X"]);
}

#[test]
fn delete_unknown_sheet_is_not_found() {
    let dir = tempfile::tempdir().unwrap();
    let conn = open_db_in_memory().unwrap();
    let repo = FsSheetRepository::new(
        sheets_root(&dir),
        SqlitePrefsStore::new(&conn, SHEET_PREFS_STORE),
    );

    let err = repo.delete_sheet("Ghost").unwrap_err();
    assert!(matches!(err, RepoError::NotFound(_)));
}

#[test]
fn delete_listed_sheet_with_missing_folder_drops_entry() {
    let dir = tempfile::tempdir().unwrap();
    let conn = open_db_in_memory().unwrap();
    let repo = FsSheetRepository::new(
        sheets_root(&dir),
        SqlitePrefsStore::new(&conn, SHEET_PREFS_STORE),
    );

    let sheet = repo.create_sheet("Gone").unwrap();
    fs::remove_dir(&sheet.path).unwrap();

    repo.delete_sheet("Gone").unwrap();
    assert!(repo.list_sheets().unwrap().is_empty());
}

#[test]
fn delete_rejects_traversal_names() {
    let dir = tempfile::tempdir().unwrap();
    let conn = open_db_in_memory().unwrap();
    let root = sheets_root(&dir);
    fs::create_dir_all(&root).unwrap();
    let outside = dir.path().join("keep.txt");
    fs::write(&outside, b"keep").unwrap();
    let repo = FsSheetRepository::new(&root, SqlitePrefsStore::new(&conn, SHEET_PREFS_STORE));

    for name in ["..", "../keep.txt", "a/b"] {
        let err = repo.delete_sheet(name).unwrap_err();
        assert!(matches!(err, RepoError::InvalidName(_)), "{name}");
    }
    assert!(outside.exists());
}

#[test]
fn check_drift_reports_both_directions() {
    let dir = tempfile::tempdir().unwrap();
    let conn = open_db_in_memory().unwrap();
    let root = sheets_root(&dir);
    let repo = FsSheetRepository::new(&root, SqlitePrefsStore::new(&conn, SHEET_PREFS_STORE));

    repo.create_sheet("Kept").unwrap();
    let vanished = repo.create_sheet("Vanished").unwrap();
    fs::remove_dir(&vanished.path).unwrap();
    fs::create_dir(root.join("Stray B")).unwrap();
    fs::create_dir(root.join("Stray A")).unwrap();
    fs::write(root.join("not-a-sheet.txt"), b"").unwrap();

    let drift = repo.check_drift().unwrap();
    assert_eq!(drift.missing_folders, vec!["Vanished"]);
    assert_eq!(drift.unlisted_folders, vec!["Stray A", "Stray B"]);
    assert!(!drift.is_clean());

    // Checking never mutates the list.
    assert_eq!(repo.list_sheets().unwrap(), vec!["Kept", "Vanished"]);
}

#[test]
fn repair_index_follows_the_directory_tree() {
    let dir = tempfile::tempdir().unwrap();
    let conn = open_db_in_memory().unwrap();
    let root = sheets_root(&dir);
    let repo = FsSheetRepository::new(&root, SqlitePrefsStore::new(&conn, SHEET_PREFS_STORE));

    repo.create_sheet("Kept").unwrap();
    let vanished = repo.create_sheet("Vanished").unwrap();
    repo.create_sheet("Kept").unwrap();
    fs::remove_dir(&vanished.path).unwrap();
    fs::create_dir(root.join("Adopted")).unwrap();

    let repaired = repo.repair_index().unwrap();
    assert_eq!(repaired.missing_folders, vec!["Vanished"]);
    assert_eq!(repaired.unlisted_folders, vec!["Adopted"]);
    assert_eq!(repo.list_sheets().unwrap(), vec!["Kept", "Kept", "Adopted"]);
    assert!(repo.check_drift().unwrap().is_clean());
}

#[test]
fn repair_index_ignores_folders_that_are_not_sheet_names() {
    let dir = tempfile::tempdir().unwrap();
    let conn = open_db_in_memory().unwrap();
    let root = sheets_root(&dir);
    let prefs = SqlitePrefsStore::new(&conn, SHEET_PREFS_STORE);
    let repo = FsSheetRepository::new(&root, &prefs);

    repo.create_sheet("Kept").unwrap();
    fs::create_dir(root.join(" Padded")).unwrap();
    fs::create_dir(root.join("a:b")).unwrap();
    // A list written by an older build may already name one of them.
    prefs
        .put_string(SHEET_LIST_KEY, r#"["Kept"," Padded"]"#)
        .unwrap();

    let first = repo.repair_index().unwrap();
    assert_eq!(first.missing_folders, vec![" Padded"]);
    assert!(first.unlisted_folders.is_empty());
    assert_eq!(first.invalid_folders, vec![" Padded", "a:b"]);
    assert_eq!(repo.list_sheets().unwrap(), vec!["Kept"]);

    for _ in 0..2 {
        let again = repo.repair_index().unwrap();
        assert!(again.is_clean());
        assert_eq!(again.invalid_folders, vec![" Padded", "a:b"]);
        assert_eq!(repo.list_sheets().unwrap(), vec!["Kept"]);
    }

    assert!(root.join(" Padded").is_dir());
    assert!(root.join("a:b").is_dir());
}

#[test]
fn check_drift_on_fresh_library_is_clean() {
    let dir = tempfile::tempdir().unwrap();
    let conn = open_db_in_memory().unwrap();
    let repo = FsSheetRepository::new(
        sheets_root(&dir),
        SqlitePrefsStore::new(&conn, SHEET_PREFS_STORE),
    );
    assert!(repo.check_drift().unwrap().is_clean());
    assert!(repo.repair_index().unwrap().is_clean());
}
