//! Persistence collaborators.
//!
//! The tracker talks to storage only through [`RecordStore`] and
//! [`SettingsStore`]. [`Database`] is the SQLite implementation used by the
//! CLI; [`MemoryStore`] keeps everything in process.

mod config;
pub mod database;
mod memory;
pub mod migrations;
pub mod reminder_queue;

pub use config::{Config, DefaultsConfig, NotificationsConfig, TrackerConfig};
pub use database::Database;
pub use memory::MemoryStore;
pub use reminder_queue::ReminderQueue;

use std::path::PathBuf;

use crate::error::StorageError;
use crate::model::{Achievement, QuitRecord};

/// Storage for the quit record and its achievements.
pub trait RecordStore {
    /// The active record, if setup has been completed.
    fn active_record(&self) -> Result<Option<QuitRecord>, StorageError>;

    /// Insert or overwrite the record with the same id.
    fn save_record(&mut self, record: &QuitRecord) -> Result<(), StorageError>;

    fn delete_all_records(&mut self) -> Result<(), StorageError>;

    /// All achievements, newest `achieved_date` first.
    fn list_achievements(&self) -> Result<Vec<Achievement>, StorageError>;

    /// Append an achievement. Appending a title that is already stored is a
    /// no-op, so retries are safe.
    fn append_achievement(&mut self, achievement: &Achievement) -> Result<(), StorageError>;

    fn delete_all_achievements(&mut self) -> Result<(), StorageError>;
}

/// The persisted first-launch flag.
pub trait SettingsStore {
    /// `true` until setup has been completed at least once.
    fn is_first_launch(&self) -> Result<bool, StorageError>;

    fn set_first_launch(&mut self, first_launch: bool) -> Result<(), StorageError>;
}

/// Returns `~/.config/quitsmoke[-dev]/` based on QUITSMOKE_ENV.
///
/// Set QUITSMOKE_ENV=dev to use development data directory.
///
/// # Errors
/// Returns an error if creating the directory fails.
pub fn data_dir() -> std::io::Result<PathBuf> {
    let base_dir = dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".config");

    let env = std::env::var("QUITSMOKE_ENV").unwrap_or_else(|_| "production".to_string());

    let dir = if env == "dev" {
        base_dir.join("quitsmoke-dev")
    } else {
        base_dir.join("quitsmoke")
    };

    std::fs::create_dir_all(&dir)?;
    Ok(dir)
}

/// Path of the SQLite database file.
///
/// # Errors
/// See [`data_dir`].
pub fn database_path() -> Result<PathBuf, StorageError> {
    Ok(data_dir()?.join("quitsmoke.db"))
}
