//! The quit record and the user-editable settings it is built from.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::{TrackerError, ValidationError};

pub const DEFAULT_CIGARETTES_PER_DAY: u32 = 20;
pub const DEFAULT_PRICE_PER_PACK: f64 = 500.0;
pub const DEFAULT_CIGARETTES_PER_PACK: u32 = 20;
pub const DEFAULT_CURRENCY: &str = "¥";
pub const DEFAULT_GOAL: &str = "健康的な生活を取り戻す";

/// Upper bound for both per-day and per-pack counts.
pub const MAX_CIGARETTE_COUNT: u32 = 100;

/// User-editable tracking settings.
///
/// Everything a user can change on a [`QuitRecord`]. Validated as a unit
/// before any state transition.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QuitSettings {
    pub start_date: DateTime<Utc>,
    pub cigarettes_per_day: u32,
    pub price_per_pack: f64,
    pub cigarettes_per_pack: u32,
    pub currency: String,
    pub goal: String,
}

impl QuitSettings {
    /// Default consumption settings with the quit date set to `now`.
    pub fn defaults_at(now: DateTime<Utc>) -> Self {
        Self {
            start_date: now,
            cigarettes_per_day: DEFAULT_CIGARETTES_PER_DAY,
            price_per_pack: DEFAULT_PRICE_PER_PACK,
            cigarettes_per_pack: DEFAULT_CIGARETTES_PER_PACK,
            currency: DEFAULT_CURRENCY.to_string(),
            goal: DEFAULT_GOAL.to_string(),
        }
    }

    /// Same settings with a different start date.
    pub fn with_start_date(mut self, start_date: DateTime<Utc>) -> Self {
        self.start_date = start_date;
        self
    }

    /// Check every field against `now`.
    ///
    /// # Errors
    /// Returns [`TrackerError::InvalidStartDate`] for a future start date and
    /// [`TrackerError::InvalidSettings`] for out-of-range counts or price.
    pub fn validate(&self, now: DateTime<Utc>) -> Result<(), TrackerError> {
        if self.start_date > now {
            return Err(TrackerError::InvalidStartDate {
                start: self.start_date,
                now,
            });
        }
        validate_count("cigarettes_per_day", self.cigarettes_per_day)?;
        validate_count("cigarettes_per_pack", self.cigarettes_per_pack)?;
        if !self.price_per_pack.is_finite() {
            return Err(ValidationError::NotFinite {
                field: "price_per_pack",
            }
            .into());
        }
        if self.price_per_pack <= 0.0 {
            return Err(ValidationError::NotPositive {
                field: "price_per_pack",
                value: self.price_per_pack.to_string(),
            }
            .into());
        }
        Ok(())
    }
}

fn validate_count(field: &'static str, value: u32) -> Result<(), ValidationError> {
    if value == 0 {
        return Err(ValidationError::NotPositive {
            field,
            value: value.to_string(),
        });
    }
    if value > MAX_CIGARETTE_COUNT {
        return Err(ValidationError::TooLarge {
            field,
            max: MAX_CIGARETTE_COUNT,
            value,
        });
    }
    Ok(())
}

/// The single active tracking record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QuitRecord {
    pub id: Uuid,
    pub start_date: DateTime<Utc>,
    pub cigarettes_per_day: u32,
    pub price_per_pack: f64,
    pub cigarettes_per_pack: u32,
    pub currency: String,
    pub goal: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl QuitRecord {
    /// Create a fresh record from already-validated settings.
    pub fn new(settings: &QuitSettings, now: DateTime<Utc>) -> Self {
        Self {
            id: Uuid::new_v4(),
            start_date: settings.start_date,
            cigarettes_per_day: settings.cigarettes_per_day,
            price_per_pack: settings.price_per_pack,
            cigarettes_per_pack: settings.cigarettes_per_pack,
            currency: settings.currency.clone(),
            goal: settings.goal.clone(),
            created_at: now,
            updated_at: now,
        }
    }

    /// Overwrite the editable fields and touch `updated_at`.
    ///
    /// `id` and `created_at` are kept. `updated_at` never moves backwards.
    pub fn apply(&mut self, settings: &QuitSettings, now: DateTime<Utc>) {
        self.start_date = settings.start_date;
        self.cigarettes_per_day = settings.cigarettes_per_day;
        self.price_per_pack = settings.price_per_pack;
        self.cigarettes_per_pack = settings.cigarettes_per_pack;
        self.currency = settings.currency.clone();
        self.goal = settings.goal.clone();
        self.updated_at = self.updated_at.max(now);
    }

    pub fn settings(&self) -> QuitSettings {
        QuitSettings {
            start_date: self.start_date,
            cigarettes_per_day: self.cigarettes_per_day,
            price_per_pack: self.price_per_pack,
            cigarettes_per_pack: self.cigarettes_per_pack,
            currency: self.currency.clone(),
            goal: self.goal.clone(),
        }
    }
}
