//! Sheet library use-case service.
//!
//! # Invariants
//! - Service calls never bypass repository name validation.
//! - Import resolves the display name before any file is touched.

use crate::model::attachment::Attachment;
use crate::model::name::{NameKind, NameValidationError};
use crate::model::sheet::{IndexDrift, Sheet};
use crate::repo::attachment_repo::AttachmentStore;
use crate::repo::sheet_repo::SheetRepository;
use crate::repo::{RepoError, RepoResult};
use crate::source::{resolve_display_name, ContentSource};

/// Facade over one sheet repository and its attachment store.
pub struct SheetService<R: SheetRepository, S: AttachmentStore> {
    sheets: R,
    attachments: S,
}

impl<R: SheetRepository, S: AttachmentStore> SheetService<R, S> {
    pub fn new(sheets: R, attachments: S) -> Self {
        Self {
            sheets,
            attachments,
        }
    }

    /// Sheet names in display order.
    pub fn list_sheets(&self) -> RepoResult<Vec<String>> {
        self.sheets.list_sheets()
    }

    pub fn create_sheet(&self, name: &str) -> RepoResult<Sheet> {
        self.sheets.create_sheet(name)
    }

    /// Deletes the sheet directory with all attachments and drops the name.
    pub fn delete_sheet(&self, name: &str) -> RepoResult<()> {
        self.sheets.delete_sheet(name)
    }

    /// Attachments of one sheet, in unspecified order.
    pub fn open_sheet(&self, name: &str) -> RepoResult<Vec<Attachment>> {
        self.attachments.list_attachments(name)
    }

    /// Imports a picked file under `instrument`.
    ///
    /// # Contract
    /// - Display name comes from [`resolve_display_name`].
    /// - A source that yields no usable name is `InvalidName`.
    /// - Open/read failures of the source are `Io`.
    pub fn import_attachment(
        &self,
        sheet: &str,
        instrument: &str,
        source: &dyn ContentSource,
    ) -> RepoResult<Attachment> {
        let file_name = resolve_display_name(source)
            .ok_or(NameValidationError::Blank(NameKind::FileName))?;
        let mut reader = source
            .open()
            .map_err(|err| RepoError::io("open_source", source.reference(), err))?;
        self.attachments
            .add_attachment(sheet, instrument, &mut *reader, &file_name)
    }

    pub fn remove_attachment(
        &self,
        sheet: &str,
        instrument: &str,
        file_name: &str,
    ) -> RepoResult<()> {
        self.attachments
            .remove_attachment(sheet, instrument, file_name)
    }

    pub fn check_drift(&self) -> RepoResult<IndexDrift> {
        self.sheets.check_drift()
    }

    pub fn repair_index(&self) -> RepoResult<IndexDrift> {
        self.sheets.repair_index()
    }
}
