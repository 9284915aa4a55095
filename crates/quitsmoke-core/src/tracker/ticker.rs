//! Periodic recompute driver.
//!
//! The controller is synchronous and owns a SQLite connection, so each tick
//! runs on the blocking pool behind a mutex. Host commands and ticks are
//! serialized by the same lock. Each tick re-reads the store first, so
//! writes from other processes sharing the database are picked up.

use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

use tokio::sync::{mpsc, watch};
use tokio::time::MissedTickBehavior;
use tracing::{debug, error, warn};

use super::TrackerController;
use crate::clock::Clock;
use crate::events::Event;
use crate::reminders::ReminderScheduler;
use crate::storage::{RecordStore, SettingsStore};

pub type SharedTracker<S, N, C> = Arc<Mutex<TrackerController<S, N, C>>>;

pub fn shared<S, N, C>(tracker: TrackerController<S, N, C>) -> SharedTracker<S, N, C> {
    Arc::new(Mutex::new(tracker))
}

/// Lock the tracker, recovering from a poisoned mutex.
///
/// A panic mid-operation leaves the controller's in-memory state consistent
/// up to the last completed assignment; the next recompute repairs the rest.
pub fn lock<S, N, C>(tracker: &SharedTracker<S, N, C>) -> MutexGuard<'_, TrackerController<S, N, C>> {
    tracker.lock().unwrap_or_else(|poisoned| {
        warn!("tracker mutex poisoned, recovering");
        poisoned.into_inner()
    })
}

/// Recompute every `period` until `shutdown` flips to `true` or its sender
/// is dropped. The first tick fires immediately.
///
/// Events from each tick are forwarded to `events`; a closed receiver stops
/// the ticker as well.
pub async fn run_ticker<S, N, C>(
    tracker: SharedTracker<S, N, C>,
    period: Duration,
    events: mpsc::UnboundedSender<Event>,
    mut shutdown: watch::Receiver<bool>,
) where
    S: RecordStore + SettingsStore + Send + 'static,
    N: ReminderScheduler + Send + 'static,
    C: Clock + 'static,
{
    let mut interval = tokio::time::interval(period);
    interval.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
        tokio::select! {
            _ = interval.tick() => {}
            changed = shutdown.changed() => {
                if changed.is_err() || *shutdown.borrow() {
                    debug!("ticker shutting down");
                    return;
                }
                continue;
            }
        }

        let handle = Arc::clone(&tracker);
        let outcome = tokio::task::spawn_blocking(move || {
            let mut tracker = lock(&handle);
            if let Err(e) = tracker.reload() {
                warn!(error = %e, "reload failed, keeping in-memory state");
            }
            tracker.recompute()
        })
        .await;

        match outcome {
            Ok(Ok(batch)) => {
                debug!(events = batch.len(), "tick");
                for event in batch {
                    if events.send(event).is_err() {
                        debug!("event receiver closed, stopping ticker");
                        return;
                    }
                }
            }
            Ok(Err(e)) => warn!(error = %e, "recompute failed"),
            Err(e) => error!(error = %e, "recompute task panicked"),
        }
    }
}
