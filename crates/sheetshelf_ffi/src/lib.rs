//! Flutter bridge for the SheetShelf storage core.
//!
//! Generated FRB glue is not checked in; `api` is the hand-written surface
//! the generator reads.

pub mod api;
