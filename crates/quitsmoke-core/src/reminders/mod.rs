//! Local motivational reminders.
//!
//! The tracker plans a fixed pair of reminders relative to the quit start and
//! hands them to a [`ReminderScheduler`]. Delivery is the scheduler's job.

mod memory;

pub use memory::MemoryScheduler;

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use crate::error::SchedulingError;
use crate::model::QuitRecord;

pub const ONE_DAY_REMINDER_ID: &str = "quitsmoke.one_day";
pub const ONE_WEEK_REMINDER_ID: &str = "quitsmoke.one_week";

/// A one-shot local notification.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Reminder {
    pub id: String,
    pub title: String,
    pub body: String,
    pub trigger_at: DateTime<Utc>,
}

/// Notification backend.
///
/// Scheduling with an id that is already pending replaces the old reminder.
pub trait ReminderScheduler {
    /// Ask the platform for permission to deliver notifications.
    fn request_permission(&mut self) -> Result<bool, SchedulingError>;

    fn schedule(&mut self, reminder: &Reminder) -> Result<(), SchedulingError>;

    fn cancel(&mut self, id: &str) -> Result<(), SchedulingError>;

    fn cancel_all(&mut self) -> Result<(), SchedulingError>;

    /// Reminders not yet delivered, soonest first.
    fn pending(&self) -> Result<Vec<Reminder>, SchedulingError>;
}

/// Reminders to register for `record`, skipping any whose trigger has passed.
pub fn plan_reminders(record: &QuitRecord, now: DateTime<Utc>) -> Vec<Reminder> {
    let candidates = [
        Reminder {
            id: ONE_DAY_REMINDER_ID.to_string(),
            title: "禁煙1日達成！".to_string(),
            body: format!(
                "素晴らしい！あなたは既に{}本のタバコを吸わずに済みました。この調子で続けましょう！",
                record.cigarettes_per_day
            ),
            trigger_at: record.start_date + Duration::days(1),
        },
        Reminder {
            id: ONE_WEEK_REMINDER_ID.to_string(),
            title: "禁煙1週間達成！".to_string(),
            body: "一週間続けられました！あなたの体は既に回復し始めています。".to_string(),
            trigger_at: record.start_date + Duration::days(7),
        },
    ];

    candidates
        .into_iter()
        .filter(|r| r.trigger_at > now)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::QuitSettings;
    use chrono::TimeZone;

    fn record_started(start: DateTime<Utc>) -> QuitRecord {
        QuitRecord::new(&QuitSettings::defaults_at(start), start)
    }

    #[test]
    fn fresh_record_gets_both_reminders() {
        let start = Utc.with_ymd_and_hms(2025, 3, 2, 9, 0, 0).unwrap();
        let plan = plan_reminders(&record_started(start), start);
        let ids: Vec<&str> = plan.iter().map(|r| r.id.as_str()).collect();
        assert_eq!(ids, vec![ONE_DAY_REMINDER_ID, ONE_WEEK_REMINDER_ID]);
        assert_eq!(plan[0].trigger_at, start + Duration::days(1));
        assert!(plan[0].body.contains("20本"));
    }

    #[test]
    fn past_triggers_are_skipped() {
        let start = Utc.with_ymd_and_hms(2025, 3, 2, 9, 0, 0).unwrap();
        let record = record_started(start);

        let plan = plan_reminders(&record, start + Duration::days(3));
        assert_eq!(plan.len(), 1);
        assert_eq!(plan[0].id, ONE_WEEK_REMINDER_ID);

        // Trigger exactly at now is not in the future.
        assert!(plan_reminders(&record, start + Duration::days(7)).is_empty());
    }
}
