//! Use-case services.
//!
//! # Responsibility
//! - Combine sheet repository and attachment store into the calls a screen
//!   makes: list/create/delete sheets, open a sheet, import a picked file.
//! - Keep FFI and CLI layers free of storage details.

pub mod sheet_service;
