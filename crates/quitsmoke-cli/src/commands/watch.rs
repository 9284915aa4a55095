//! Foreground loop: periodic recompute plus reminder delivery.

use std::sync::Arc;
use std::time::Duration;

use clap::Args;
use quitsmoke_core::tracker::{lock, run_ticker, shared, SharedTracker};
use quitsmoke_core::{
    Config, Database, Event, Reminder, ReminderQueue, Statistics, SystemClock,
};
use tokio::sync::{mpsc, watch};
use tracing::{info, warn};

use super::{format_money, open_tracker};

type Shared = SharedTracker<Database, ReminderQueue, SystemClock>;

#[derive(Args)]
pub struct WatchArgs {
    /// Seconds between recomputes (default: tracker.recompute_interval_secs)
    #[arg(long)]
    pub interval: Option<u64>,
    /// Print events as JSON lines
    #[arg(long)]
    pub json: bool,
}

pub fn run(args: WatchArgs) -> Result<(), Box<dyn std::error::Error>> {
    let config = Config::load()?;
    let period = args
        .interval
        .map(|secs| Duration::from_secs(secs.max(1)))
        .unwrap_or_else(|| config.recompute_interval());
    let notify = config.notifications.enabled;
    let tracker = shared(open_tracker(&config)?);

    let runtime = tokio::runtime::Runtime::new()?;
    runtime.block_on(watch_loop(tracker, period, notify, args.json))
}

async fn watch_loop(
    tracker: Shared,
    period: Duration,
    notify: bool,
    json: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    let (events_tx, mut events_rx) = mpsc::unbounded_channel();
    let (stop_tx, stop_rx) = watch::channel(false);
    let ticker = tokio::spawn(run_ticker(Arc::clone(&tracker), period, events_tx, stop_rx));

    let ctrl_c = tokio::signal::ctrl_c();
    tokio::pin!(ctrl_c);
    info!(period_secs = period.as_secs(), notify, "watching");

    loop {
        tokio::select! {
            event = events_rx.recv() => {
                let Some(event) = event else { break };
                if json {
                    println!("{}", serde_json::to_string(&event)?);
                }
                if let Event::StatisticsUpdated { statistics, .. } = &event {
                    let tick = poll_tracker(&tracker, notify).await?;
                    if !json {
                        println!("{}", statistics_line(statistics, &tick.currency));
                    }
                    for reminder in &tick.due {
                        print_reminder(reminder, json)?;
                    }
                } else if !json {
                    print_event(&event);
                }
            }
            _ = &mut ctrl_c => {
                info!("interrupted");
                break;
            }
        }
    }

    let _ = stop_tx.send(true);
    ticker.await?;
    Ok(())
}

/// What the loop needs from the tracker after a tick.
struct TickView {
    currency: String,
    due: Vec<Reminder>,
}

/// Read the display currency and drain due reminders under one lock, off
/// the runtime thread. Nothing is drained when notifications are off.
async fn poll_tracker(tracker: &Shared, notify: bool) -> Result<TickView, tokio::task::JoinError> {
    let handle = Arc::clone(tracker);
    tokio::task::spawn_blocking(move || {
        let mut guard = lock(&handle);
        let currency = guard.settings().currency.clone();
        if !notify {
            return TickView {
                currency,
                due: Vec::new(),
            };
        }
        let now = guard.now();
        let due = guard.scheduler_mut().take_due(now).unwrap_or_else(|e| {
            warn!(error = %e, "failed to read due reminders");
            Vec::new()
        });
        TickView { currency, due }
    })
    .await
}

fn statistics_line(statistics: &Statistics, currency: &str) -> String {
    let e = statistics.elapsed;
    format!(
        "{}d {:02}h {:02}m | {} cigarettes avoided | {} saved",
        e.days,
        e.hours % 24,
        e.minutes % 60,
        statistics.cigarettes_avoided,
        format_money(statistics.money_saved, currency)
    )
}

fn print_event(event: &Event) {
    match event {
        Event::AchievementUnlocked { achievement } => {
            println!(
                "Achievement unlocked: {} ({})",
                achievement.title, achievement.detail
            );
        }
        Event::StorageRecovered { .. } => println!("Pending changes saved"),
        _ => {}
    }
}

fn print_reminder(reminder: &Reminder, json: bool) -> Result<(), Box<dyn std::error::Error>> {
    if json {
        println!("{}", serde_json::to_string(reminder)?);
    } else {
        println!("[reminder] {}", reminder.title);
        println!("    {}", reminder.body);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration as ChronoDuration, Utc};
    use quitsmoke_core::storage::DefaultsConfig;
    use quitsmoke_core::{ElapsedTime, QuitSettings, ReminderScheduler, TrackerController};

    fn tracker_with_due_reminder(dir: &std::path::Path) -> Shared {
        let path = dir.join("quitsmoke.db");
        let mut controller = TrackerController::load(
            Database::open_at(&path).unwrap(),
            ReminderQueue::open_at(&path, true).unwrap(),
            SystemClock,
            DefaultsConfig::default(),
        );
        let mut settings = QuitSettings::defaults_at(Utc::now() - ChronoDuration::hours(1));
        settings.currency = "$".to_string();
        controller.save_new_record(settings).unwrap();
        let mut reminder = controller.scheduler().pending().unwrap().remove(0);
        reminder.id = "test.overdue".to_string();
        reminder.trigger_at = Utc::now() - ChronoDuration::minutes(1);
        controller.scheduler_mut().schedule(&reminder).unwrap();
        shared(controller)
    }

    #[test]
    fn statistics_line_wraps_hours_and_minutes() {
        let statistics = Statistics {
            elapsed: ElapsedTime {
                days: 1,
                hours: 26,
                minutes: 1565,
            },
            cigarettes_avoided: 21,
            money_saved: 525.9,
        };
        assert_eq!(
            statistics_line(&statistics, "¥"),
            "1d 02h 05m | 21 cigarettes avoided | 525¥ saved"
        );
    }

    #[tokio::test]
    async fn poll_reads_currency_and_drains_due_reminders() {
        let dir = tempfile::tempdir().unwrap();
        let tracker = tracker_with_due_reminder(dir.path());

        let tick = poll_tracker(&tracker, true).await.unwrap();
        assert_eq!(tick.currency, "$");
        assert_eq!(tick.due.len(), 1);
        assert_eq!(tick.due[0].id, "test.overdue");

        let again = poll_tracker(&tracker, true).await.unwrap();
        assert!(again.due.is_empty());
    }

    #[tokio::test]
    async fn poll_leaves_reminders_queued_when_notifications_are_off() {
        let dir = tempfile::tempdir().unwrap();
        let tracker = tracker_with_due_reminder(dir.path());

        let tick = poll_tracker(&tracker, false).await.unwrap();
        assert_eq!(tick.currency, "$");
        assert!(tick.due.is_empty());
        assert_eq!(lock(&tracker).scheduler().pending().unwrap().len(), 3);
    }
}
