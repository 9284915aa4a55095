//! SQLite-based record storage.
//!
//! Provides persistent storage for:
//! - The active quit record
//! - Earned achievements
//! - Key-value store for application state (first-launch flag)

use std::path::Path;

use chrono::{DateTime, SecondsFormat, Utc};
use rusqlite::{params, Connection, OptionalExtension, Row};
use uuid::Uuid;

use super::{database_path, migrations, RecordStore, SettingsStore};
use crate::error::StorageError;
use crate::model::{Achievement, AchievementKind, QuitRecord};

const FIRST_LAUNCH_KEY: &str = "first_launch";

/// Timestamps are stored in a fixed-width UTC form so that text ordering
/// matches time ordering.
pub(crate) fn encode_time(at: DateTime<Utc>) -> String {
    at.to_rfc3339_opts(SecondsFormat::Micros, true)
}

pub(crate) fn decode_time(table: &'static str, raw: &str) -> Result<DateTime<Utc>, StorageError> {
    DateTime::parse_from_rfc3339(raw)
        .map(|t| t.with_timezone(&Utc))
        .map_err(|e| StorageError::Corrupt {
            table,
            message: format!("bad timestamp '{raw}': {e}"),
        })
}

fn decode_uuid(table: &'static str, raw: &str) -> Result<Uuid, StorageError> {
    Uuid::parse_str(raw).map_err(|e| StorageError::Corrupt {
        table,
        message: format!("bad id '{raw}': {e}"),
    })
}

struct RecordRow {
    id: String,
    start_date: String,
    cigarettes_per_day: u32,
    price_per_pack: f64,
    cigarettes_per_pack: u32,
    currency: String,
    goal: String,
    created_at: String,
    updated_at: String,
}

impl RecordRow {
    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get(0)?,
            start_date: row.get(1)?,
            cigarettes_per_day: row.get(2)?,
            price_per_pack: row.get(3)?,
            cigarettes_per_pack: row.get(4)?,
            currency: row.get(5)?,
            goal: row.get(6)?,
            created_at: row.get(7)?,
            updated_at: row.get(8)?,
        })
    }

    fn decode(self) -> Result<QuitRecord, StorageError> {
        const TABLE: &str = "quit_records";
        Ok(QuitRecord {
            id: decode_uuid(TABLE, &self.id)?,
            start_date: decode_time(TABLE, &self.start_date)?,
            cigarettes_per_day: self.cigarettes_per_day,
            price_per_pack: self.price_per_pack,
            cigarettes_per_pack: self.cigarettes_per_pack,
            currency: self.currency,
            goal: self.goal,
            created_at: decode_time(TABLE, &self.created_at)?,
            updated_at: decode_time(TABLE, &self.updated_at)?,
        })
    }
}

struct AchievementRow {
    id: String,
    kind: String,
    title: String,
    detail: String,
    icon_name: String,
    achieved_date: String,
}

impl AchievementRow {
    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get(0)?,
            kind: row.get(1)?,
            title: row.get(2)?,
            detail: row.get(3)?,
            icon_name: row.get(4)?,
            achieved_date: row.get(5)?,
        })
    }

    fn decode(self) -> Result<Achievement, StorageError> {
        const TABLE: &str = "achievements";
        let kind = AchievementKind::parse(&self.kind).ok_or_else(|| StorageError::Corrupt {
            table: TABLE,
            message: format!("unknown achievement type '{}'", self.kind),
        })?;
        Ok(Achievement {
            id: decode_uuid(TABLE, &self.id)?,
            kind,
            title: self.title,
            detail: self.detail,
            icon_name: self.icon_name,
            achieved_date: decode_time(TABLE, &self.achieved_date)?,
        })
    }
}

/// SQLite database for the quit record and achievements.
pub struct Database {
    conn: Connection,
}

impl Database {
    /// Get a reference to the underlying SQLite connection.
    pub fn conn(&self) -> &Connection {
        &self.conn
    }

    /// Open the database at `~/.config/quitsmoke/quitsmoke.db`.
    ///
    /// Creates the database file and schema if they don't exist.
    ///
    /// # Errors
    /// Returns an error if the database cannot be opened or migrated.
    pub fn open() -> Result<Self, StorageError> {
        Self::open_at(&database_path()?)
    }

    /// Open (or create) the database at an explicit path.
    ///
    /// # Errors
    /// Returns an error if the database cannot be opened or migrated.
    pub fn open_at(path: &Path) -> Result<Self, StorageError> {
        let conn = Connection::open(path).map_err(|source| StorageError::OpenFailed {
            path: path.to_path_buf(),
            source,
        })?;
        let db = Self { conn };
        db.migrate()?;
        Ok(db)
    }

    /// Open an in-memory database.
    ///
    /// # Errors
    /// Returns an error if the schema cannot be created.
    pub fn open_memory() -> Result<Self, StorageError> {
        let conn = Connection::open_in_memory()?;
        let db = Self { conn };
        db.migrate()?;
        Ok(db)
    }

    fn migrate(&self) -> Result<(), StorageError> {
        migrations::migrate(&self.conn)?;
        Ok(())
    }

    /// Get a value from the kv store.
    pub fn kv_get(&self, key: &str) -> Result<Option<String>, StorageError> {
        let value = self
            .conn
            .query_row("SELECT value FROM kv WHERE key = ?1", params![key], |row| {
                row.get::<_, String>(0)
            })
            .optional()?;
        Ok(value)
    }

    /// Set a value in the kv store.
    pub fn kv_set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        self.conn.execute(
            "INSERT OR REPLACE INTO kv (key, value) VALUES (?1, ?2)",
            params![key, value],
        )?;
        Ok(())
    }
}

impl RecordStore for Database {
    fn active_record(&self) -> Result<Option<QuitRecord>, StorageError> {
        let row = self
            .conn
            .query_row(
                "SELECT id, start_date, cigarettes_per_day, price_per_pack, cigarettes_per_pack,
                        currency, goal, created_at, updated_at
                 FROM quit_records
                 ORDER BY updated_at DESC
                 LIMIT 1",
                [],
                RecordRow::from_row,
            )
            .optional()?;
        row.map(RecordRow::decode).transpose()
    }

    fn save_record(&mut self, record: &QuitRecord) -> Result<(), StorageError> {
        self.conn.execute(
            "INSERT INTO quit_records (id, start_date, cigarettes_per_day, price_per_pack,
                                       cigarettes_per_pack, currency, goal, created_at, updated_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)
             ON CONFLICT(id) DO UPDATE SET
                start_date = excluded.start_date,
                cigarettes_per_day = excluded.cigarettes_per_day,
                price_per_pack = excluded.price_per_pack,
                cigarettes_per_pack = excluded.cigarettes_per_pack,
                currency = excluded.currency,
                goal = excluded.goal,
                updated_at = excluded.updated_at",
            params![
                record.id.to_string(),
                encode_time(record.start_date),
                record.cigarettes_per_day,
                record.price_per_pack,
                record.cigarettes_per_pack,
                record.currency,
                record.goal,
                encode_time(record.created_at),
                encode_time(record.updated_at),
            ],
        )?;
        Ok(())
    }

    fn delete_all_records(&mut self) -> Result<(), StorageError> {
        self.conn.execute("DELETE FROM quit_records", [])?;
        Ok(())
    }

    fn list_achievements(&self) -> Result<Vec<Achievement>, StorageError> {
        let mut stmt = self.conn.prepare(
            "SELECT id, type, title, detail, icon_name, achieved_date
             FROM achievements
             ORDER BY achieved_date DESC, rowid DESC",
        )?;
        let rows = stmt
            .query_map([], AchievementRow::from_row)?
            .collect::<Result<Vec<_>, _>>()?;
        rows.into_iter().map(AchievementRow::decode).collect()
    }

    fn append_achievement(&mut self, achievement: &Achievement) -> Result<(), StorageError> {
        self.conn.execute(
            "INSERT OR IGNORE INTO achievements (id, type, title, detail, icon_name, achieved_date)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
            params![
                achievement.id.to_string(),
                achievement.kind.as_str(),
                achievement.title,
                achievement.detail,
                achievement.icon_name,
                encode_time(achievement.achieved_date),
            ],
        )?;
        Ok(())
    }

    fn delete_all_achievements(&mut self) -> Result<(), StorageError> {
        self.conn.execute("DELETE FROM achievements", [])?;
        Ok(())
    }
}

impl SettingsStore for Database {
    fn is_first_launch(&self) -> Result<bool, StorageError> {
        Ok(self
            .kv_get(FIRST_LAUNCH_KEY)?
            .map(|v| v != "false")
            .unwrap_or(true))
    }

    fn set_first_launch(&mut self, first_launch: bool) -> Result<(), StorageError> {
        self.kv_set(FIRST_LAUNCH_KEY, if first_launch { "true" } else { "false" })
    }
}
