//! Cigarettes avoided and money saved.
//!
//! Always derived from the current settings applied across the whole elapsed
//! span. Editing the price today re-prices every day since the quit start;
//! there is no per-day ledger.

use serde::{Deserialize, Serialize};

use super::elapsed::ElapsedTime;
use crate::error::ValidationError;

/// Snapshot of derived statistics.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Statistics {
    pub elapsed: ElapsedTime,
    pub cigarettes_avoided: i64,
    pub money_saved: f64,
}

impl Statistics {
    pub fn zero() -> Self {
        Self::default()
    }

    pub fn days_since_quit(&self) -> i64 {
        self.elapsed.days
    }
}

/// `days * per_day` cigarettes and their cost at `price_per_pack / per_pack`.
///
/// Negative `days` count as zero.
///
/// # Errors
/// Returns [`ValidationError::NotPositive`] if `cigarettes_per_pack` is zero.
pub fn compute_stats(
    days: i64,
    cigarettes_per_day: u32,
    price_per_pack: f64,
    cigarettes_per_pack: u32,
) -> Result<(i64, f64), ValidationError> {
    if cigarettes_per_pack == 0 {
        return Err(ValidationError::NotPositive {
            field: "cigarettes_per_pack",
            value: "0".into(),
        });
    }
    let cigarettes_avoided = days.max(0) * i64::from(cigarettes_per_day);
    let price_per_cigarette = price_per_pack / f64::from(cigarettes_per_pack);
    let money_saved = cigarettes_avoided as f64 * price_per_cigarette;
    Ok((cigarettes_avoided, money_saved))
}

/// Full statistics snapshot for an elapsed span.
///
/// # Errors
/// See [`compute_stats`].
pub fn statistics_for(
    elapsed: ElapsedTime,
    cigarettes_per_day: u32,
    price_per_pack: f64,
    cigarettes_per_pack: u32,
) -> Result<Statistics, ValidationError> {
    let (cigarettes_avoided, money_saved) = compute_stats(
        elapsed.days,
        cigarettes_per_day,
        price_per_pack,
        cigarettes_per_pack,
    )?;
    Ok(Statistics {
        elapsed,
        cigarettes_avoided,
        money_saved,
    })
}
