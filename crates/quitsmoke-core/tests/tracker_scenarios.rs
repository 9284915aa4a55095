//! End-to-end tracker scenarios.
//!
//! Drives the controller through setup, edits, timer ticks, storage failures
//! and reset, against both the in-memory and the SQLite stores.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use chrono::{DateTime, Duration, TimeZone, Utc};
use quitsmoke_core::storage::DefaultsConfig;
use quitsmoke_core::{
    Achievement, Database, Event, FixedClock, MemoryScheduler, MemoryStore, QuitRecord,
    QuitSettings, RecordStore, ReminderQueue, ReminderScheduler, SettingsStore, StorageError,
    TrackerController, TrackerError, TrackerState,
};

// ============================================================================
// Test Helpers
// ============================================================================

fn now() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2025, 6, 15, 8, 30, 0).unwrap()
}

fn settings(start: DateTime<Utc>) -> QuitSettings {
    QuitSettings {
        start_date: start,
        cigarettes_per_day: 20,
        price_per_pack: 500.0,
        cigarettes_per_pack: 20,
        currency: "¥".to_string(),
        goal: "健康的な生活を取り戻す".to_string(),
    }
}

fn titles(achievements: &[Achievement]) -> Vec<&str> {
    achievements.iter().map(|a| a.title.as_str()).collect()
}

fn unlocked(events: &[Event]) -> Vec<&str> {
    events
        .iter()
        .filter_map(|e| match e {
            Event::AchievementUnlocked { achievement } => Some(achievement.title.as_str()),
            _ => None,
        })
        .collect()
}

/// Memory store whose writes fail while `failing` is set.
#[derive(Clone, Default)]
struct FlakyStore {
    inner: MemoryStore,
    failing: Arc<AtomicBool>,
}

impl FlakyStore {
    fn check(&self) -> Result<(), StorageError> {
        if self.failing.load(Ordering::SeqCst) {
            Err(StorageError::Locked)
        } else {
            Ok(())
        }
    }
}

impl RecordStore for FlakyStore {
    fn active_record(&self) -> Result<Option<QuitRecord>, StorageError> {
        self.inner.active_record()
    }

    fn save_record(&mut self, record: &QuitRecord) -> Result<(), StorageError> {
        self.check()?;
        self.inner.save_record(record)
    }

    fn delete_all_records(&mut self) -> Result<(), StorageError> {
        self.check()?;
        self.inner.delete_all_records()
    }

    fn list_achievements(&self) -> Result<Vec<Achievement>, StorageError> {
        self.inner.list_achievements()
    }

    fn append_achievement(&mut self, achievement: &Achievement) -> Result<(), StorageError> {
        self.check()?;
        self.inner.append_achievement(achievement)
    }

    fn delete_all_achievements(&mut self) -> Result<(), StorageError> {
        self.check()?;
        self.inner.delete_all_achievements()
    }
}

impl SettingsStore for FlakyStore {
    fn is_first_launch(&self) -> Result<bool, StorageError> {
        self.inner.is_first_launch()
    }

    fn set_first_launch(&mut self, first_launch: bool) -> Result<(), StorageError> {
        self.check()?;
        self.inner.set_first_launch(first_launch)
    }
}

/// Store that says a record exists but cannot decode it.
#[derive(Default)]
struct UnreadableStore;

impl UnreadableStore {
    fn corrupt(table: &'static str) -> StorageError {
        StorageError::Corrupt {
            table,
            message: "invalid timestamp".to_string(),
        }
    }
}

impl RecordStore for UnreadableStore {
    fn active_record(&self) -> Result<Option<QuitRecord>, StorageError> {
        Err(Self::corrupt("quit_records"))
    }

    fn save_record(&mut self, _record: &QuitRecord) -> Result<(), StorageError> {
        Ok(())
    }

    fn delete_all_records(&mut self) -> Result<(), StorageError> {
        Ok(())
    }

    fn list_achievements(&self) -> Result<Vec<Achievement>, StorageError> {
        Err(Self::corrupt("achievements"))
    }

    fn append_achievement(&mut self, _achievement: &Achievement) -> Result<(), StorageError> {
        Ok(())
    }

    fn delete_all_achievements(&mut self) -> Result<(), StorageError> {
        Ok(())
    }
}

impl SettingsStore for UnreadableStore {
    fn is_first_launch(&self) -> Result<bool, StorageError> {
        Ok(false)
    }

    fn set_first_launch(&mut self, _first_launch: bool) -> Result<(), StorageError> {
        Ok(())
    }
}

// ============================================================================
// Setup and Statistics
// ============================================================================

#[test]
fn test_setup_eight_days_ago() {
    let clock = FixedClock::new(now());
    let mut tracker = TrackerController::load(
        MemoryStore::new(),
        MemoryScheduler::new(),
        clock,
        DefaultsConfig::default(),
    );

    let events = tracker
        .save_new_record(settings(now() - Duration::days(8)))
        .unwrap();

    let stats = tracker.statistics();
    assert_eq!(stats.elapsed.days, 8);
    assert_eq!(stats.cigarettes_avoided, 160);
    assert!((stats.money_saved - 4000.0).abs() < 1e-9);

    assert_eq!(
        unlocked(&events),
        vec!["1日達成", "3日達成", "1週間達成", "1,000¥節約", "100本達成"]
    );
    assert_eq!(
        titles(tracker.achievements()),
        vec!["100本達成", "1,000¥節約", "1週間達成", "3日達成", "1日達成"]
    );
    assert!(!titles(tracker.achievements()).contains(&"1ヶ月達成"));

    // Both reminder triggers are in the past.
    assert!(tracker.scheduler().pending().unwrap().is_empty());
}

#[test]
fn test_statistics_follow_settings_retroactively() {
    let clock = FixedClock::new(now());
    let mut tracker = TrackerController::load(
        MemoryStore::new(),
        MemoryScheduler::new(),
        clock,
        DefaultsConfig::default(),
    );
    tracker
        .save_new_record(settings(now() - Duration::days(10)))
        .unwrap();

    let mut edited = settings(now() - Duration::days(10));
    edited.cigarettes_per_day = 10;
    edited.price_per_pack = 600.0;
    tracker.update_record(edited).unwrap();

    assert_eq!(tracker.statistics().cigarettes_avoided, 100);
    assert!((tracker.statistics().money_saved - 3000.0).abs() < 1e-9);
}

#[test]
fn test_money_titles_embed_currency() {
    let clock = FixedClock::new(now());
    let mut tracker = TrackerController::load(
        MemoryStore::new(),
        MemoryScheduler::new(),
        clock,
        DefaultsConfig::default(),
    );
    let mut dollars = settings(now() - Duration::days(3));
    dollars.currency = "$".to_string();
    tracker.save_new_record(dollars).unwrap();

    assert!(titles(tracker.achievements()).contains(&"1,000$節約"));
}

// ============================================================================
// Validation
// ============================================================================

#[test]
fn test_future_start_date_leaves_state_unchanged() {
    let clock = FixedClock::new(now());
    let mut tracker = TrackerController::load(
        MemoryStore::new(),
        MemoryScheduler::new(),
        clock,
        DefaultsConfig::default(),
    );
    tracker
        .save_new_record(settings(now() - Duration::days(2)))
        .unwrap();
    let before = tracker.record().cloned();

    let result = tracker.update_record(settings(now() + Duration::hours(1)));
    assert!(matches!(result, Err(TrackerError::InvalidStartDate { .. })));
    assert_eq!(tracker.record().cloned(), before);
    assert_eq!(tracker.store().active_record().unwrap(), before);
}

#[test]
fn test_zero_pack_size_rejected() {
    let clock = FixedClock::new(now());
    let mut tracker = TrackerController::load(
        MemoryStore::new(),
        MemoryScheduler::new(),
        clock,
        DefaultsConfig::default(),
    );
    let mut bad = settings(now());
    bad.cigarettes_per_pack = 0;

    let err = tracker.save_new_record(bad).unwrap_err();
    assert!(matches!(err, TrackerError::InvalidSettings(_)));
    assert_eq!(tracker.state(), TrackerState::Uninitialized);
}

// ============================================================================
// Ratchet and Reset
// ============================================================================

#[test]
fn test_moving_start_forward_keeps_achievements() {
    let clock = FixedClock::new(now());
    let mut tracker = TrackerController::load(
        MemoryStore::new(),
        MemoryScheduler::new(),
        clock.clone(),
        DefaultsConfig::default(),
    );
    tracker
        .save_new_record(settings(now() - Duration::days(35)))
        .unwrap();
    assert!(titles(tracker.achievements()).contains(&"1ヶ月達成"));
    let earned = tracker.achievements().len();

    tracker
        .update_record(settings(now() - Duration::days(1)))
        .unwrap();
    assert_eq!(tracker.statistics().elapsed.days, 1);
    assert_eq!(tracker.achievements().len(), earned);

    // Re-crossing a recorded milestone does not duplicate it.
    clock.advance(Duration::days(3));
    let events = tracker.recompute().unwrap();
    assert!(unlocked(&events).is_empty());
    assert_eq!(tracker.achievements().len(), earned);
}

#[test]
fn test_reset_then_setup_starts_from_scratch() {
    let clock = FixedClock::new(now());
    let mut tracker = TrackerController::load(
        MemoryStore::new(),
        MemoryScheduler::new(),
        clock,
        DefaultsConfig::default(),
    );
    tracker
        .save_new_record(settings(now() - Duration::days(40)))
        .unwrap();

    let events = tracker.reset().unwrap();
    assert!(matches!(events[0], Event::TrackerReset { .. }));
    assert!(tracker.record().is_none());
    assert_eq!(tracker.statistics().cigarettes_avoided, 0);
    assert!(tracker.is_first_launch());

    tracker.save_new_record(settings(now())).unwrap();
    assert!(tracker.achievements().is_empty());
    assert_eq!(tracker.scheduler().pending().unwrap().len(), 2);
}

// ============================================================================
// Storage Failures
// ============================================================================

#[test]
fn test_failed_writes_are_retried_on_recompute() {
    let clock = FixedClock::new(now());
    let store = FlakyStore::default();
    let failing = Arc::clone(&store.failing);
    let mut tracker = TrackerController::load(
        store,
        MemoryScheduler::new(),
        clock.clone(),
        DefaultsConfig::default(),
    );

    failing.store(true, Ordering::SeqCst);
    let err = tracker
        .save_new_record(settings(now() - Duration::days(1)))
        .unwrap_err();
    assert!(err.is_retryable());

    // In-memory state moved on anyway.
    assert_eq!(tracker.state(), TrackerState::Active);
    assert_eq!(titles(tracker.achievements()), vec!["1日達成"]);
    assert!(tracker.has_pending_writes());
    assert!(tracker.store().active_record().unwrap().is_none());

    failing.store(false, Ordering::SeqCst);
    clock.advance(Duration::minutes(1));
    let events = tracker.recompute().unwrap();
    assert!(events
        .iter()
        .any(|e| matches!(e, Event::StorageRecovered { .. })));
    assert!(!tracker.has_pending_writes());
    assert_eq!(
        tracker.store().active_record().unwrap().as_ref(),
        tracker.record()
    );
    assert_eq!(titles(&tracker.store().list_achievements().unwrap()), vec!["1日達成"]);
    assert!(!tracker.store().is_first_launch().unwrap());
}

#[test]
fn test_unreadable_store_starts_uninitialized() {
    let clock = FixedClock::new(now());
    let tracker = TrackerController::load(
        UnreadableStore,
        MemoryScheduler::new(),
        clock,
        DefaultsConfig::default(),
    );

    assert_eq!(tracker.state(), TrackerState::Uninitialized);
    assert!(tracker.is_first_launch());
    assert!(tracker.achievements().is_empty());
    assert_eq!(tracker.statistics().cigarettes_avoided, 0);

    let settings = tracker.settings();
    assert_eq!(settings.start_date, now());
    assert_eq!(settings.cigarettes_per_day, 20);
    assert_eq!(settings.cigarettes_per_pack, 20);
    assert_eq!(settings.currency, "¥");
}

// ============================================================================
// SQLite Persistence
// ============================================================================

#[test]
fn test_sqlite_state_survives_restart() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("quitsmoke.db");
    let clock = FixedClock::new(now());

    {
        let mut tracker = TrackerController::load(
            Database::open_at(&path).unwrap(),
            ReminderQueue::open_at(&path, true).unwrap(),
            clock.clone(),
            DefaultsConfig::default(),
        );
        assert!(tracker.is_first_launch());
        tracker
            .save_new_record(settings(now() - Duration::days(3)))
            .unwrap();
    }

    clock.advance(Duration::days(4));
    let tracker = TrackerController::load(
        Database::open_at(&path).unwrap(),
        ReminderQueue::open_at(&path, true).unwrap(),
        clock,
        DefaultsConfig::default(),
    );
    assert!(!tracker.is_first_launch());
    assert_eq!(tracker.state(), TrackerState::Active);
    assert_eq!(tracker.statistics().elapsed.days, 7);
    assert!(titles(tracker.achievements()).contains(&"1週間達成"));

    let reminders = tracker.scheduler().pending().unwrap();
    assert_eq!(reminders.len(), 1);
    assert_eq!(reminders[0].trigger_at, now() + Duration::days(4));
}

#[test]
fn test_sqlite_reset_restores_first_launch() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("quitsmoke.db");
    let clock = FixedClock::new(now());

    let mut tracker = TrackerController::load(
        Database::open_at(&path).unwrap(),
        ReminderQueue::open_at(&path, true).unwrap(),
        clock.clone(),
        DefaultsConfig::default(),
    );
    tracker
        .save_new_record(settings(now() - Duration::days(2)))
        .unwrap();
    tracker.reset().unwrap();
    drop(tracker);

    let tracker = TrackerController::load(
        Database::open_at(&path).unwrap(),
        ReminderQueue::open_at(&path, true).unwrap(),
        clock,
        DefaultsConfig::default(),
    );
    assert!(tracker.is_first_launch());
    assert!(tracker.record().is_none());
    assert!(tracker.achievements().is_empty());
    assert!(tracker.scheduler().pending().unwrap().is_empty());
}

#[test]
fn test_sqlite_denied_reschedule_clears_old_reminders() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("quitsmoke.db");
    let clock = FixedClock::new(now());

    {
        let mut tracker = TrackerController::load(
            Database::open_at(&path).unwrap(),
            ReminderQueue::open_at(&path, true).unwrap(),
            clock.clone(),
            DefaultsConfig::default(),
        );
        tracker.save_new_record(settings(now())).unwrap();
        assert_eq!(tracker.scheduler().pending().unwrap().len(), 2);
    }

    // Notifications switched off in between.
    let mut tracker = TrackerController::load(
        Database::open_at(&path).unwrap(),
        ReminderQueue::open_at(&path, false).unwrap(),
        clock,
        DefaultsConfig::default(),
    );
    let events = tracker
        .update_record(settings(now() - Duration::days(3)))
        .unwrap();

    assert!(events
        .iter()
        .any(|e| matches!(e, Event::ReminderFailed { .. })));
    assert!(tracker.scheduler().pending().unwrap().is_empty());
    assert!(tracker
        .scheduler_mut()
        .take_due(now() + Duration::days(30))
        .unwrap()
        .is_empty());
}

// ============================================================================
// Shared Database
// ============================================================================

fn open_sqlite(
    path: &std::path::Path,
    clock: &FixedClock,
) -> TrackerController<Database, ReminderQueue, FixedClock> {
    TrackerController::load(
        Database::open_at(path).unwrap(),
        ReminderQueue::open_at(path, true).unwrap(),
        clock.clone(),
        DefaultsConfig::default(),
    )
}

#[test]
fn test_reset_from_another_handle_is_picked_up() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("quitsmoke.db");
    let clock = FixedClock::new(now());

    let mut watcher = open_sqlite(&path, &clock);
    watcher
        .save_new_record(settings(now() - Duration::hours(23)))
        .unwrap();
    assert!(watcher.achievements().is_empty());

    let mut other = open_sqlite(&path, &clock);
    assert_eq!(other.state(), TrackerState::Active);
    other.reset().unwrap();

    // The watcher would cross one day here if it still held the record.
    clock.advance(Duration::hours(2));
    watcher.reload().unwrap();
    let events = watcher.recompute().unwrap();

    assert!(unlocked(&events).is_empty());
    assert_eq!(watcher.state(), TrackerState::Uninitialized);
    assert!(watcher.is_first_launch());
    assert_eq!(watcher.statistics().cigarettes_avoided, 0);

    let store = watcher.store();
    assert!(store.active_record().unwrap().is_none());
    assert!(store.list_achievements().unwrap().is_empty());
    assert!(store.is_first_launch().unwrap());
}

#[test]
fn test_update_from_another_handle_is_picked_up() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("quitsmoke.db");
    let clock = FixedClock::new(now());

    let mut watcher = open_sqlite(&path, &clock);
    watcher.save_new_record(settings(now())).unwrap();

    let mut other = open_sqlite(&path, &clock);
    let mut moved = settings(now() - Duration::days(3));
    moved.currency = "$".to_string();
    other.update_record(moved).unwrap();
    assert_eq!(
        titles(other.achievements()),
        vec!["1,000$節約", "3日達成", "1日達成"]
    );

    clock.advance(Duration::minutes(1));
    watcher.reload().unwrap();
    let events = watcher.recompute().unwrap();

    assert!(unlocked(&events).is_empty());
    assert_eq!(watcher.settings().currency, "$");
    assert_eq!(watcher.statistics().elapsed.days, 3);
    assert_eq!(titles(watcher.achievements()), titles(other.achievements()));
    assert_eq!(watcher.store().list_achievements().unwrap().len(), 3);
}
