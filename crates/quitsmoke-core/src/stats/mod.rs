//! Statistics derived from the quit record.
//!
//! Both submodules are pure: time comes in as arguments, never from a clock.

mod elapsed;
mod savings;

pub use elapsed::{elapsed, ElapsedTime};
pub use savings::{compute_stats, statistics_for, Statistics};
