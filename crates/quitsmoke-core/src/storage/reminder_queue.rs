//! SQLite-backed reminder queue.
//!
//! Reminders are stored until they fall due; a host loop calls
//! [`ReminderQueue::take_due`] and delivers whatever comes back.

use std::path::Path;

use chrono::{DateTime, Utc};
use rusqlite::{params, Connection, Row};

use super::database::{decode_time, encode_time};
use super::{database_path, migrations};
use crate::error::{SchedulingError, StorageError};
use crate::reminders::{Reminder, ReminderScheduler};

fn reminder_row(row: &Row<'_>) -> rusqlite::Result<(String, String, String, String)> {
    Ok((row.get(0)?, row.get(1)?, row.get(2)?, row.get(3)?))
}

pub struct ReminderQueue {
    conn: Connection,
    enabled: bool,
}

impl ReminderQueue {
    /// Open the queue inside the default database file.
    ///
    /// `enabled` is what [`ReminderScheduler::request_permission`] reports.
    ///
    /// # Errors
    /// Returns an error if the database cannot be opened or migrated.
    pub fn open(enabled: bool) -> Result<Self, StorageError> {
        Self::open_at(&database_path()?, enabled)
    }

    /// # Errors
    /// Returns an error if the database cannot be opened or migrated.
    pub fn open_at(path: &Path, enabled: bool) -> Result<Self, StorageError> {
        let conn = Connection::open(path).map_err(|source| StorageError::OpenFailed {
            path: path.to_path_buf(),
            source,
        })?;
        migrations::migrate(&conn)?;
        Ok(Self { conn, enabled })
    }

    /// # Errors
    /// Returns an error if the schema cannot be created.
    pub fn open_memory(enabled: bool) -> Result<Self, StorageError> {
        let conn = Connection::open_in_memory()?;
        migrations::migrate(&conn)?;
        Ok(Self { conn, enabled })
    }

    fn query(&self, sql: &str, at: Option<DateTime<Utc>>) -> Result<Vec<Reminder>, StorageError> {
        let mut stmt = self.conn.prepare(sql)?;
        let rows = match at {
            Some(at) => stmt
                .query_map(params![encode_time(at)], reminder_row)?
                .collect::<Result<Vec<_>, _>>()?,
            None => stmt
                .query_map([], reminder_row)?
                .collect::<Result<Vec<_>, _>>()?,
        };
        rows.into_iter()
            .map(|(id, title, body, trigger_at)| {
                Ok(Reminder {
                    id,
                    title,
                    body,
                    trigger_at: decode_time("reminders", &trigger_at)?,
                })
            })
            .collect()
    }

    /// Remove and return every reminder due at or before `now`.
    ///
    /// # Errors
    /// Returns an error if the queue cannot be read or updated.
    pub fn take_due(&mut self, now: DateTime<Utc>) -> Result<Vec<Reminder>, StorageError> {
        let tx = self.conn.unchecked_transaction()?;
        let due = self.query(
            "SELECT id, title, body, trigger_at FROM reminders
             WHERE trigger_at <= ?1 ORDER BY trigger_at",
            Some(now),
        )?;
        tx.execute(
            "DELETE FROM reminders WHERE trigger_at <= ?1",
            params![encode_time(now)],
        )?;
        tx.commit()?;
        Ok(due)
    }
}

impl ReminderScheduler for ReminderQueue {
    fn request_permission(&mut self) -> Result<bool, SchedulingError> {
        Ok(self.enabled)
    }

    fn schedule(&mut self, reminder: &Reminder) -> Result<(), SchedulingError> {
        if !self.enabled {
            return Err(SchedulingError::PermissionDenied);
        }
        self.conn
            .execute(
                "INSERT OR REPLACE INTO reminders (id, title, body, trigger_at)
                 VALUES (?1, ?2, ?3, ?4)",
                params![
                    reminder.id,
                    reminder.title,
                    reminder.body,
                    encode_time(reminder.trigger_at),
                ],
            )
            .map_err(|e| SchedulingError::Rejected {
                id: reminder.id.clone(),
                message: e.to_string(),
            })?;
        Ok(())
    }

    fn cancel(&mut self, id: &str) -> Result<(), SchedulingError> {
        self.conn
            .execute("DELETE FROM reminders WHERE id = ?1", params![id])?;
        Ok(())
    }

    fn cancel_all(&mut self) -> Result<(), SchedulingError> {
        self.conn.execute("DELETE FROM reminders", [])?;
        Ok(())
    }

    fn pending(&self) -> Result<Vec<Reminder>, SchedulingError> {
        Ok(self.query(
            "SELECT id, title, body, trigger_at FROM reminders ORDER BY trigger_at",
            None,
        )?)
    }
}
