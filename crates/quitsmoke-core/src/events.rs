use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::model::Achievement;
use crate::stats::Statistics;

/// Every state change in the tracker produces an Event.
/// Hosts render them; nothing inside the core consumes them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Event {
    RecordCreated {
        record_id: Uuid,
        start_date: DateTime<Utc>,
        at: DateTime<Utc>,
    },
    RecordUpdated {
        record_id: Uuid,
        start_date: DateTime<Utc>,
        at: DateTime<Utc>,
    },
    StatisticsUpdated {
        statistics: Statistics,
        at: DateTime<Utc>,
    },
    AchievementUnlocked {
        achievement: Achievement,
    },
    RemindersScheduled {
        ids: Vec<String>,
        at: DateTime<Utc>,
    },
    /// A reminder could not be registered. The record change still stands.
    ReminderFailed {
        message: String,
        at: DateTime<Utc>,
    },
    /// A previously failed write went through.
    StorageRecovered {
        at: DateTime<Utc>,
    },
    TrackerReset {
        at: DateTime<Utc>,
    },
}
