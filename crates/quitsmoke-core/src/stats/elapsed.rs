//! Elapsed time since the quit start.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Whole units elapsed since the quit start.
///
/// The three fields are independent totals, not a days/hours/minutes
/// breakdown: 26 hours is `{days: 1, hours: 26, minutes: 1560}`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ElapsedTime {
    pub days: i64,
    pub hours: i64,
    pub minutes: i64,
}

impl ElapsedTime {
    pub fn zero() -> Self {
        Self::default()
    }
}

/// Whole days, hours and minutes between `start` and `now`.
///
/// Each unit is clamped at zero, so a start date after `now` (clock skew,
/// a race with an edit) reads as "just started".
pub fn elapsed(start: DateTime<Utc>, now: DateTime<Utc>) -> ElapsedTime {
    let span = now.signed_duration_since(start);
    ElapsedTime {
        days: span.num_days().max(0),
        hours: span.num_hours().max(0),
        minutes: span.num_minutes().max(0),
    }
}
