//! # QuitSmoke Core Library
//!
//! Business logic for the QuitSmoke quit-smoking tracker. Every operation is
//! available through the standalone `quitsmoke` CLI; hosts are thin layers
//! over this crate.
//!
//! ## Architecture
//!
//! - **Stats**: pure functions deriving elapsed time, cigarettes avoided and
//!   money saved from the quit record
//! - **Achievements**: declarative milestone ladders with ratchet detection
//! - **Tracker**: the controller that owns state, persists it, and keeps the
//!   reminders in sync; plus a tokio ticker for periodic recompute
//! - **Storage**: SQLite persistence and TOML configuration
//!
//! ## Key Components
//!
//! - [`TrackerController`]: orchestrates every state change
//! - [`Database`]: record, achievement and flag persistence
//! - [`Config`]: application configuration management
//! - [`ReminderScheduler`]: notification backend trait

pub mod achievements;
pub mod clock;
pub mod error;
pub mod events;
pub mod health;
pub mod model;
pub mod reminders;
pub mod stats;
pub mod storage;
pub mod tracker;

pub use achievements::{catalogue, detect_new, CatalogueEntry, Milestone, MILESTONES};
pub use clock::{Clock, FixedClock, SystemClock};
pub use error::{ConfigError, SchedulingError, StorageError, TrackerError, ValidationError};
pub use events::Event;
pub use health::{health_timeline, HealthMilestone, HealthProgress, TimeUnit, HEALTH_MILESTONES};
pub use model::{Achievement, AchievementKind, NewAchievement, QuitRecord, QuitSettings};
pub use reminders::{plan_reminders, MemoryScheduler, Reminder, ReminderScheduler};
pub use stats::{compute_stats, elapsed, statistics_for, ElapsedTime, Statistics};
pub use storage::{
    Config, Database, DefaultsConfig, MemoryStore, RecordStore, ReminderQueue, SettingsStore,
};
pub use tracker::{SharedTracker, TrackerController, TrackerState};
