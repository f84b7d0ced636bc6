//! Domain model for sheets and their instrument attachments.
//!
//! # Responsibility
//! - Define the records returned to UI callers.
//! - Own naming rules: which strings may become path components and how an
//!   attachment's on-disk filename is composed and parsed.
//!
//! # Invariants
//! - Every name that reaches the filesystem has passed `validate_component`.
//! - A sheet name is stored trimmed.

pub mod attachment;
pub mod name;
pub mod sheet;
