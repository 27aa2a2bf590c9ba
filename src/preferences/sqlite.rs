//! SQLite-backed preference store.
//!
//! A single database file holds the `user_preferences` table. Upserts are one
//! `INSERT ... ON CONFLICT DO UPDATE ... RETURNING` statement, so concurrent
//! writers for the same user can never both take the insert path.

use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard};

use rusqlite::{Connection, OptionalExtension, Row, params};
use tracing::debug;

use super::schema::{apply_schema, read_schema_version};
use super::store::PreferenceStore;
use super::types::{PreferenceRecord, PreferenceUpdate, now_epoch_secs};
use crate::error::{NotifyError, Result};

const SELECT_COLUMNS: &str = "user_id, email_enabled, sms_enabled, email, phone_number";

/// SQLite-backed [`PreferenceStore`].
///
/// Thread-safe via an internal `Mutex<Connection>`; every statement is
/// serialized through it.
pub struct SqlitePreferenceStore {
    path: Option<PathBuf>,
    conn: Mutex<Connection>,
}

impl SqlitePreferenceStore {
    /// Open (or create) the database at `path`, applying the schema.
    pub fn open(path: &Path) -> Result<Self> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }
        let conn = Connection::open(path)?;
        apply_schema(&conn)?;
        debug!("opened preference store at {}", path.display());
        Ok(Self {
            path: Some(path.to_path_buf()),
            conn: Mutex::new(conn),
        })
    }

    /// Open a private in-memory database. Contents vanish on drop.
    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        apply_schema(&conn)?;
        Ok(Self {
            path: None,
            conn: Mutex::new(conn),
        })
    }

    /// Database file path, `None` for in-memory stores.
    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    /// Read the schema version stamp.
    pub fn schema_version(&self) -> Result<Option<u32>> {
        let conn = self.lock()?;
        Ok(read_schema_version(&conn)?)
    }

    /// Number of stored records.
    pub fn count(&self) -> Result<usize> {
        let conn = self.lock()?;
        let n: i64 = conn.query_row("SELECT COUNT(*) FROM user_preferences", [], |row| {
            row.get(0)
        })?;
        Ok(usize::try_from(n).unwrap_or(0))
    }

    /// List up to `limit` records ordered by `user_id`.
    pub fn list(&self, limit: usize) -> Result<Vec<PreferenceRecord>> {
        let conn = self.lock()?;
        let limit = i64::try_from(limit).unwrap_or(i64::MAX);
        let mut stmt = conn.prepare(&format!(
            "SELECT {SELECT_COLUMNS} FROM user_preferences ORDER BY user_id LIMIT ?1"
        ))?;
        let rows = stmt.query_map(params![limit], row_to_record)?;

        let mut records = Vec::new();
        for r in rows {
            records.push(r?);
        }
        Ok(records)
    }

    fn lock(&self) -> Result<MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|e| NotifyError::Storage(format!("connection lock poisoned: {e}")))
    }
}

impl PreferenceStore for SqlitePreferenceStore {
    fn get(&self, user_id: i64) -> Result<Option<PreferenceRecord>> {
        let conn = self.lock()?;
        let record = conn
            .query_row(
                &format!("SELECT {SELECT_COLUMNS} FROM user_preferences WHERE user_id = ?1"),
                params![user_id],
                row_to_record,
            )
            .optional()?;
        Ok(record)
    }

    fn upsert(&self, user_id: i64, update: &PreferenceUpdate) -> Result<PreferenceRecord> {
        let conn = self.lock()?;
        let now = now_epoch_secs();
        let record = conn.query_row(
            &format!(
                "INSERT INTO user_preferences \
                 (user_id, email_enabled, sms_enabled, email, phone_number, created_at, updated_at) \
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?6) \
                 ON CONFLICT(user_id) DO UPDATE SET \
                 email_enabled = excluded.email_enabled, \
                 sms_enabled = excluded.sms_enabled, \
                 email = excluded.email, \
                 phone_number = excluded.phone_number, \
                 updated_at = excluded.updated_at \
                 RETURNING {SELECT_COLUMNS}"
            ),
            params![
                user_id,
                update.email_enabled,
                update.sms_enabled,
                update.email,
                update.phone_number,
                now
            ],
            row_to_record,
        )?;
        Ok(record)
    }
}

fn row_to_record(row: &Row<'_>) -> rusqlite::Result<PreferenceRecord> {
    Ok(PreferenceRecord {
        user_id: row.get(0)?,
        email_enabled: row.get(1)?,
        sms_enabled: row.get(2)?,
        email: row.get(3)?,
        phone_number: row.get(4)?,
    })
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
