//! Tracker controller.
//!
//! Owns the quit record, the derived statistics and the achievement list, and
//! is the only writer to the store and the reminder scheduler.
//!
//! ## State Transitions
//!
//! ```text
//! Uninitialized -- save_new_record --> Active
//! Active        -- update_record   --> Active
//! Active        -- recompute       --> Active
//! Active        -- reset           --> Uninitialized
//! ```
//!
//! Every write path validates first and mutates nothing on a validation
//! error. Storage failures after validation keep the in-memory change, queue
//! the write, and retry it on the next save or recompute.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::achievements::{self, detect_new, CatalogueEntry};
use crate::clock::Clock;
use crate::error::{StorageError, TrackerError};
use crate::events::Event;
use crate::health::{health_timeline, HealthProgress};
use crate::model::{Achievement, QuitRecord, QuitSettings};
use crate::reminders::{plan_reminders, ReminderScheduler};
use crate::stats::{elapsed, statistics_for, Statistics};
use crate::storage::{DefaultsConfig, RecordStore, SettingsStore};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TrackerState {
    Uninitialized,
    Active,
}

/// Writes that have been applied in memory but not yet to the store.
#[derive(Debug, Default)]
struct PendingWrites {
    /// Wipe records and achievements before anything else.
    clear_store: bool,
    record: bool,
    first_launch: Option<bool>,
    achievements: Vec<Achievement>,
    /// The last flush attempt failed.
    failed: bool,
}

impl PendingWrites {
    fn is_empty(&self) -> bool {
        !self.clear_store
            && !self.record
            && self.first_launch.is_none()
            && self.achievements.is_empty()
    }
}

pub struct TrackerController<S, N, C> {
    store: S,
    scheduler: N,
    clock: C,
    defaults: DefaultsConfig,
    record: Option<QuitRecord>,
    settings: QuitSettings,
    statistics: Statistics,
    /// Newest first.
    achievements: Vec<Achievement>,
    first_launch: bool,
    pending: PendingWrites,
}

/// What the store currently holds.
#[derive(Debug, Default)]
struct StoredState {
    first_launch: bool,
    record: Option<QuitRecord>,
    achievements: Vec<Achievement>,
}

impl<S, N, C> TrackerController<S, N, C>
where
    S: RecordStore + SettingsStore,
    N: ReminderScheduler,
    C: Clock,
{
    /// An uninitialized controller that has not looked at the store.
    pub fn new(store: S, scheduler: N, clock: C, defaults: DefaultsConfig) -> Self {
        let settings = defaults.settings_at(clock.now());
        Self {
            store,
            scheduler,
            clock,
            defaults,
            record: None,
            settings,
            statistics: Statistics::zero(),
            achievements: Vec::new(),
            first_launch: true,
            pending: PendingWrites::default(),
        }
    }

    /// Start up from whatever the store holds.
    ///
    /// Read failures are logged and leave the controller uninitialized, so
    /// the host can still show the setup flow.
    pub fn load(store: S, scheduler: N, clock: C, defaults: DefaultsConfig) -> Self {
        let mut tracker = Self::new(store, scheduler, clock, defaults);
        match tracker.read_store() {
            Ok(stored) => {
                tracker.adopt(stored);
                info!(
                    active = tracker.record.is_some(),
                    achievements = tracker.achievements.len(),
                    "loaded tracker state"
                );
            }
            Err(e) => {
                warn!(error = %e, "failed to load stored record, starting uninitialized");
                tracker.adopt(StoredState {
                    first_launch: true,
                    ..StoredState::default()
                });
            }
        }
        if let Err(e) = tracker.recompute() {
            warn!(error = %e, "initial recompute failed");
        }
        tracker
    }

    /// Re-read the record, achievements and first-launch flag written by
    /// other handles on the same store.
    ///
    /// Skipped while this controller has unflushed writes, which take
    /// precedence over what the store holds.
    ///
    /// # Errors
    /// Returns the read failure; in-memory state is left untouched.
    pub fn reload(&mut self) -> Result<(), StorageError> {
        if !self.pending.is_empty() {
            debug!("writes pending, keeping in-memory state");
            return Ok(());
        }
        let stored = self.read_store()?;
        if stored.record != self.record || stored.first_launch != self.first_launch {
            info!(
                active = stored.record.is_some(),
                first_launch = stored.first_launch,
                "store changed by another handle"
            );
        }
        self.adopt(stored);
        Ok(())
    }

    fn read_store(&self) -> Result<StoredState, StorageError> {
        let first_launch = self.store.is_first_launch()?;
        if first_launch {
            return Ok(StoredState {
                first_launch,
                ..StoredState::default()
            });
        }
        Ok(StoredState {
            first_launch,
            record: self.store.active_record()?,
            achievements: self.store.list_achievements()?,
        })
    }

    fn adopt(&mut self, stored: StoredState) {
        self.settings = match stored.record.as_ref() {
            Some(record) => record.settings(),
            None => self.defaults.settings_at(self.clock.now()),
        };
        self.record = stored.record;
        self.achievements = stored.achievements;
        self.first_launch = stored.first_launch;
    }

    // ── Queries ──────────────────────────────────────────────────────

    pub fn state(&self) -> TrackerState {
        if self.record.is_some() {
            TrackerState::Active
        } else {
            TrackerState::Uninitialized
        }
    }

    pub fn record(&self) -> Option<&QuitRecord> {
        self.record.as_ref()
    }

    /// Current settings: the record's when active, defaults otherwise.
    pub fn settings(&self) -> &QuitSettings {
        &self.settings
    }

    pub fn statistics(&self) -> &Statistics {
        &self.statistics
    }

    /// Newest first.
    pub fn achievements(&self) -> &[Achievement] {
        &self.achievements
    }

    pub fn is_first_launch(&self) -> bool {
        self.first_launch
    }

    /// Whether some write is still waiting to reach the store.
    pub fn has_pending_writes(&self) -> bool {
        !self.pending.is_empty()
    }

    pub fn health_timeline(&self) -> Vec<HealthProgress> {
        health_timeline(&self.statistics.elapsed)
    }

    pub fn catalogue(&self) -> Vec<CatalogueEntry> {
        achievements::catalogue(&self.settings.currency, &self.achievements)
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn scheduler(&self) -> &N {
        &self.scheduler
    }

    pub fn scheduler_mut(&mut self) -> &mut N {
        &mut self.scheduler
    }

    pub fn now(&self) -> DateTime<Utc> {
        self.clock.now()
    }

    // ── Commands ─────────────────────────────────────────────────────

    /// Complete first-run setup with `settings`.
    ///
    /// Replaces any existing record and clears all achievements.
    ///
    /// # Errors
    /// Validation errors leave everything untouched. A storage error means
    /// the new record is active in memory and its write will be retried.
    pub fn save_new_record(&mut self, settings: QuitSettings) -> Result<Vec<Event>, TrackerError> {
        let now = self.clock.now();
        settings.validate(now)?;

        let record = QuitRecord::new(&settings, now);
        info!(record_id = %record.id, start_date = %record.start_date, "creating quit record");

        let mut events = vec![Event::RecordCreated {
            record_id: record.id,
            start_date: record.start_date,
            at: now,
        }];

        self.record = Some(record);
        self.settings = settings;
        self.achievements.clear();
        self.first_launch = false;
        self.pending = PendingWrites {
            clear_store: true,
            record: true,
            first_launch: Some(false),
            ..PendingWrites::default()
        };

        self.commit(now, &mut events)?;
        Ok(events)
    }

    /// Apply edited settings to the active record.
    ///
    /// Without an active record this behaves like [`Self::save_new_record`].
    ///
    /// # Errors
    /// See [`Self::save_new_record`].
    pub fn update_record(&mut self, settings: QuitSettings) -> Result<Vec<Event>, TrackerError> {
        let now = self.clock.now();
        settings.validate(now)?;

        let Some(record) = self.record.as_mut() else {
            return self.save_new_record(settings);
        };
        record.apply(&settings, now);
        info!(record_id = %record.id, start_date = %record.start_date, "updated quit record");

        let mut events = vec![Event::RecordUpdated {
            record_id: record.id,
            start_date: record.start_date,
            at: now,
        }];

        self.settings = settings;
        self.pending.record = true;

        self.commit(now, &mut events)?;
        Ok(events)
    }

    /// Recompute statistics and achievements for the clock's current time.
    ///
    /// # Errors
    /// See [`Self::recompute_at`].
    pub fn recompute(&mut self) -> Result<Vec<Event>, TrackerError> {
        let now = self.clock.now();
        self.recompute_at(now)
    }

    /// Recompute statistics and achievements as of `now`, persisting any
    /// newly crossed milestones and retrying earlier failed writes.
    ///
    /// # Errors
    /// Returns [`TrackerError::Storage`] if a write fails; the new
    /// achievements are kept in memory and retried.
    pub fn recompute_at(&mut self, now: DateTime<Utc>) -> Result<Vec<Event>, TrackerError> {
        let mut events = Vec::new();
        self.derive(now, &mut events)?;
        self.flush(now, &mut events)?;
        Ok(events)
    }

    /// Delete the record and every achievement, cancel reminders, and go
    /// back to default settings.
    ///
    /// # Errors
    /// Returns [`TrackerError::Storage`] if the store could not be wiped;
    /// the controller is still reset in memory and the wipe is retried.
    pub fn reset(&mut self) -> Result<Vec<Event>, TrackerError> {
        let now = self.clock.now();
        info!("resetting all tracker data");

        self.record = None;
        self.achievements.clear();
        self.settings = self.defaults.settings_at(now);
        self.first_launch = true;
        self.pending = PendingWrites {
            clear_store: true,
            record: false,
            first_launch: Some(true),
            ..PendingWrites::default()
        };

        let mut events = vec![Event::TrackerReset { at: now }];
        if let Err(e) = self.scheduler.cancel_all() {
            warn!(error = %e, "failed to cancel reminders during reset");
            events.push(Event::ReminderFailed {
                message: e.to_string(),
                at: now,
            });
        }

        self.derive(now, &mut events)?;
        self.flush(now, &mut events)?;
        Ok(events)
    }

    // ── Internal ─────────────────────────────────────────────────────

    /// Recompute, reschedule, then persist. Reminders are rescheduled even
    /// when the store write fails.
    fn commit(&mut self, now: DateTime<Utc>, events: &mut Vec<Event>) -> Result<(), TrackerError> {
        self.derive(now, events)?;
        self.reschedule(now, events);
        self.flush(now, events)?;
        Ok(())
    }

    /// In-memory half of a recompute: statistics plus milestone detection.
    fn derive(&mut self, now: DateTime<Utc>, events: &mut Vec<Event>) -> Result<(), TrackerError> {
        let Some(record) = self.record.as_ref() else {
            self.statistics = Statistics::zero();
            events.push(Event::StatisticsUpdated {
                statistics: self.statistics,
                at: now,
            });
            return Ok(());
        };

        self.statistics = statistics_for(
            elapsed(record.start_date, now),
            record.cigarettes_per_day,
            record.price_per_pack,
            record.cigarettes_per_pack,
        )?;
        debug!(
            days = self.statistics.elapsed.days,
            cigarettes_avoided = self.statistics.cigarettes_avoided,
            money_saved = self.statistics.money_saved,
            "statistics recomputed"
        );
        events.push(Event::StatisticsUpdated {
            statistics: self.statistics,
            at: now,
        });

        for found in detect_new(&self.statistics, &record.currency, &self.achievements) {
            let achievement = found.into_achievement(now);
            info!(title = %achievement.title, kind = %achievement.kind, "achievement unlocked");
            self.achievements.insert(0, achievement.clone());
            self.pending.achievements.push(achievement.clone());
            events.push(Event::AchievementUnlocked { achievement });
        }
        Ok(())
    }

    /// Push every pending write to the store, in order, stopping at the
    /// first failure. Whatever did not make it stays pending.
    fn flush(&mut self, now: DateTime<Utc>, events: &mut Vec<Event>) -> Result<(), StorageError> {
        if self.pending.is_empty() {
            return Ok(());
        }
        let retrying = self.pending.failed;
        match self.try_flush() {
            Ok(()) => {
                self.pending.failed = false;
                if retrying {
                    info!("pending writes reached the store");
                    events.push(Event::StorageRecovered { at: now });
                }
                Ok(())
            }
            Err(e) => {
                self.pending.failed = true;
                warn!(error = %e, retryable = e.is_retryable(), "storage write failed, will retry");
                Err(e)
            }
        }
    }

    fn try_flush(&mut self) -> Result<(), StorageError> {
        if self.pending.clear_store {
            self.store.delete_all_records()?;
            self.store.delete_all_achievements()?;
            self.pending.clear_store = false;
        }
        if self.pending.record {
            if let Some(record) = self.record.as_ref() {
                self.store.save_record(record)?;
            }
            self.pending.record = false;
        }
        if let Some(first_launch) = self.pending.first_launch {
            self.store.set_first_launch(first_launch)?;
            self.pending.first_launch = None;
        }
        while let Some(achievement) = self.pending.achievements.first() {
            self.store.append_achievement(achievement)?;
            self.pending.achievements.remove(0);
        }
        Ok(())
    }

    /// Replace all pending reminders with the plan for the current record.
    /// Failures are logged and reported as events only.
    ///
    /// Old reminders are cancelled even when permission is refused; they
    /// were planned from a start date that no longer applies.
    fn reschedule(&mut self, now: DateTime<Utc>, events: &mut Vec<Event>) {
        let Some(record) = self.record.as_ref() else {
            return;
        };
        let mut report = |message: String| {
            warn!(%message, "reminder scheduling failed");
            events.push(Event::ReminderFailed { message, at: now });
        };

        if let Err(e) = self.scheduler.cancel_all() {
            report(e.to_string());
        }
        match self.scheduler.request_permission() {
            Ok(true) => {}
            Ok(false) => {
                report("notification permission denied".to_string());
                return;
            }
            Err(e) => {
                report(e.to_string());
                return;
            }
        }

        let mut ids = Vec::new();
        for reminder in plan_reminders(record, now) {
            match self.scheduler.schedule(&reminder) {
                Ok(()) => ids.push(reminder.id),
                Err(e) => report(e.to_string()),
            }
        }
        events.push(Event::RemindersScheduled { ids, at: now });
    }
}
