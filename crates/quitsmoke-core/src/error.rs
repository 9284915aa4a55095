//! Core error types for quitsmoke-core.
//!
//! Validation failures block a state transition outright. Storage failures
//! are reported but never corrupt in-memory state. Scheduling failures are
//! logged and surfaced as events only.

use std::path::PathBuf;

use chrono::{DateTime, Utc};
use thiserror::Error;

/// Errors surfaced by [`TrackerController`](crate::TrackerController) operations.
#[derive(Error, Debug)]
pub enum TrackerError {
    /// The quit start date lies in the future.
    #[error("Invalid start date: {start} is after the current time {now}")]
    InvalidStartDate {
        start: DateTime<Utc>,
        now: DateTime<Utc>,
    },

    /// Consumption or price settings are out of range.
    #[error("Invalid settings: {0}")]
    InvalidSettings(#[from] ValidationError),

    /// Persistence failed. In-memory state is kept and the write is retried.
    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),
}

impl TrackerError {
    /// Whether repeating the same call later may succeed.
    pub fn is_retryable(&self) -> bool {
        match self {
            TrackerError::Storage(e) => e.is_retryable(),
            TrackerError::InvalidStartDate { .. } | TrackerError::InvalidSettings(_) => false,
        }
    }
}

/// Validation errors for user-supplied settings.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ValidationError {
    /// Value is zero or negative where a positive value is required
    #[error("'{field}' must be positive, got {value}")]
    NotPositive { field: &'static str, value: String },

    /// Value exceeds the accepted upper bound
    #[error("'{field}' must be at most {max}, got {value}")]
    TooLarge {
        field: &'static str,
        max: u32,
        value: u32,
    },

    /// Value is NaN or infinite
    #[error("'{field}' must be a finite number")]
    NotFinite { field: &'static str },
}

/// Persistence errors.
#[derive(Error, Debug)]
pub enum StorageError {
    /// Failed to open database connection
    #[error("Failed to open database at {path}: {source}")]
    OpenFailed {
        path: PathBuf,
        #[source]
        source: rusqlite::Error,
    },

    /// Query execution failed
    #[error("Query failed: {0}")]
    QueryFailed(String),

    /// Database is locked
    #[error("Database is locked")]
    Locked,

    /// A stored row could not be decoded
    #[error("Corrupt row in '{table}': {message}")]
    Corrupt { table: &'static str, message: String },

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl StorageError {
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            StorageError::Locked | StorageError::QueryFailed(_) | StorageError::Io(_)
        )
    }
}

/// Reminder scheduling errors. Never fatal to a record write.
#[derive(Error, Debug)]
pub enum SchedulingError {
    /// The user refused notification permission
    #[error("Notification permission denied")]
    PermissionDenied,

    /// The backend refused a single reminder
    #[error("Reminder '{id}' rejected: {message}")]
    Rejected { id: String, message: String },

    /// The backend itself failed
    #[error("Reminder backend failed: {0}")]
    Backend(String),
}

/// Configuration-specific errors.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Failed to load configuration
    #[error("Failed to load configuration from {path}: {message}")]
    LoadFailed { path: PathBuf, message: String },

    /// Failed to save configuration
    #[error("Failed to save configuration to {path}: {message}")]
    SaveFailed { path: PathBuf, message: String },

    /// Unknown dot-path key
    #[error("Unknown configuration key: {0}")]
    UnknownKey(String),

    /// Invalid configuration value
    #[error("Invalid configuration value for '{key}': {message}")]
    InvalidValue { key: String, message: String },

    /// Data directory could not be prepared
    #[error("Data directory unavailable: {0}")]
    DataDir(#[from] std::io::Error),
}

impl From<rusqlite::Error> for StorageError {
    fn from(err: rusqlite::Error) -> Self {
        match &err {
            rusqlite::Error::SqliteFailure(e, _msg) => {
                if e.code == rusqlite::ErrorCode::DatabaseLocked
                    || e.code == rusqlite::ErrorCode::DatabaseBusy
                {
                    StorageError::Locked
                } else {
                    StorageError::QueryFailed(err.to_string())
                }
            }
            _ => StorageError::QueryFailed(err.to_string()),
        }
    }
}

impl From<StorageError> for SchedulingError {
    fn from(err: StorageError) -> Self {
        SchedulingError::Backend(err.to_string())
    }
}

impl From<rusqlite::Error> for SchedulingError {
    fn from(err: rusqlite::Error) -> Self {
        SchedulingError::Backend(err.to_string())
    }
}
