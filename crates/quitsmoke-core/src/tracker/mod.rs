//! Tracker orchestration: the controller and its background ticker.

mod controller;
mod ticker;

pub use controller::{TrackerController, TrackerState};
pub use ticker::{lock, run_ticker, shared, SharedTracker};
