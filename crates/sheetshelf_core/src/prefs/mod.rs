//! Flat application-scoped key-value preferences.
//!
//! # Responsibility
//! - Store small string records grouped by a store name, the way a mobile
//!   platform's shared preferences file does.
//! - Keep SQL details out of the sheet repository.
//!
//! # Invariants
//! - `(store, key)` identifies at most one record.
//! - A stored SQL `NULL` reads back the same as a missing record.

use crate::db::{DbError, DbResult};
use rusqlite::{params, Connection, OptionalExtension};

/// Key-value contract used by repositories that persist small records.
pub trait PrefsStore {
    /// Returns the value for `key`, or `None` when missing or null.
    fn get_string(&self, key: &str) -> DbResult<Option<String>>;
    /// Inserts or replaces the value for `key`.
    fn put_string(&self, key: &str, value: &str) -> DbResult<()>;
}

/// SQLite-backed preference store scoped to one store name.
pub struct SqlitePrefsStore<'conn> {
    conn: &'conn Connection,
    store: String,
}

impl<'conn> SqlitePrefsStore<'conn> {
    /// Binds a store name to a migrated connection.
    pub fn new(conn: &'conn Connection, store: impl Into<String>) -> Self {
        Self {
            conn,
            store: store.into(),
        }
    }
}

impl PrefsStore for SqlitePrefsStore<'_> {
    fn get_string(&self, key: &str) -> DbResult<Option<String>> {
        let value = self
            .conn
            .query_row(
                "SELECT value FROM prefs WHERE store = ?1 AND key = ?2;",
                params![self.store, key],
                |row| row.get::<_, Option<String>>(0),
            )
            .optional()
            .map_err(DbError::from)?;
        Ok(value.flatten())
    }

    fn put_string(&self, key: &str, value: &str) -> DbResult<()> {
        self.conn.execute(
            "INSERT INTO prefs (store, key, value) VALUES (?1, ?2, ?3)
             ON CONFLICT (store, key) DO UPDATE SET
                value = excluded.value,
                updated_at = (strftime('%s', 'now') * 1000);",
            params![self.store, key, value],
        )?;
        Ok(())
    }
}

impl<P: PrefsStore + ?Sized> PrefsStore for &P {
    fn get_string(&self, key: &str) -> DbResult<Option<String>> {
        (**self).get_string(key)
    }

    fn put_string(&self, key: &str, value: &str) -> DbResult<()> {
        (**self).put_string(key, value)
    }
}
