pub mod achievements;
pub mod config;
pub mod health;
pub mod reminders;
pub mod reset;
pub mod setup;
pub mod status;
pub mod update;
pub mod watch;

use chrono::{DateTime, Local, NaiveDate, TimeZone, Utc};
use clap::Args;
use quitsmoke_core::storage::DefaultsConfig;
use quitsmoke_core::{
    Config, Database, Event, QuitSettings, ReminderQueue, SystemClock, TrackerController,
};

pub type CliTracker = TrackerController<Database, ReminderQueue, SystemClock>;

/// Open the tracker against the default database, honoring the config's
/// defaults and notification preference.
pub fn open_tracker(config: &Config) -> Result<CliTracker, Box<dyn std::error::Error>> {
    let store = Database::open()?;
    let queue = ReminderQueue::open(config.notifications.enabled)?;
    Ok(TrackerController::load(
        store,
        queue,
        SystemClock,
        config.defaults.clone(),
    ))
}

/// Accepts `YYYY-MM-DD` (local midnight) or an RFC 3339 timestamp.
pub fn parse_date(raw: &str) -> Result<DateTime<Utc>, String> {
    if let Ok(ts) = DateTime::parse_from_rfc3339(raw) {
        return Ok(ts.with_timezone(&Utc));
    }
    let date = NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .map_err(|_| format!("expected YYYY-MM-DD or RFC 3339, got '{raw}'"))?;
    let midnight = date
        .and_hms_opt(0, 0, 0)
        .ok_or_else(|| format!("invalid date '{raw}'"))?;
    Local
        .from_local_datetime(&midnight)
        .earliest()
        .map(|dt| dt.with_timezone(&Utc))
        .ok_or_else(|| format!("'{raw}' does not exist in the local timezone"))
}

/// Record fields shared by `setup` and `update`. Unset fields keep the base
/// value.
#[derive(Args, Debug, Default)]
pub struct SettingsArgs {
    /// Quit date: YYYY-MM-DD (local midnight) or RFC 3339
    #[arg(long, value_parser = parse_date)]
    pub start: Option<DateTime<Utc>>,
    /// Cigarettes smoked per day before quitting
    #[arg(long)]
    pub per_day: Option<u32>,
    /// Price of one pack
    #[arg(long)]
    pub price: Option<f64>,
    /// Cigarettes per pack
    #[arg(long)]
    pub per_pack: Option<u32>,
    /// Currency symbol
    #[arg(long)]
    pub currency: Option<String>,
    /// Personal goal
    #[arg(long)]
    pub goal: Option<String>,
}

impl SettingsArgs {
    pub fn apply_to(self, mut base: QuitSettings) -> QuitSettings {
        if let Some(start) = self.start {
            base.start_date = start;
        }
        if let Some(per_day) = self.per_day {
            base.cigarettes_per_day = per_day;
        }
        if let Some(price) = self.price {
            base.price_per_pack = price;
        }
        if let Some(per_pack) = self.per_pack {
            base.cigarettes_per_pack = per_pack;
        }
        if let Some(currency) = self.currency {
            base.currency = currency;
        }
        if let Some(goal) = self.goal {
            base.goal = goal;
        }
        base
    }
}

pub fn format_local(at: &DateTime<Utc>) -> String {
    at.with_timezone(&Local).format("%Y-%m-%d %H:%M").to_string()
}

/// Whole units, as shown on the dashboard.
pub fn format_money(amount: f64, currency: &str) -> String {
    format!("{}{currency}", amount.trunc() as i64)
}

pub fn print_events(events: &[Event], json: bool) -> Result<(), Box<dyn std::error::Error>> {
    if json {
        println!("{}", serde_json::to_string_pretty(events)?);
        return Ok(());
    }
    for event in events {
        match event {
            Event::RecordCreated { start_date, .. } => {
                println!("Quit record created (start {})", format_local(start_date));
            }
            Event::RecordUpdated { start_date, .. } => {
                println!("Quit record updated (start {})", format_local(start_date));
            }
            Event::AchievementUnlocked { achievement } => {
                println!(
                    "Achievement unlocked: {} ({})",
                    achievement.title, achievement.detail
                );
            }
            Event::RemindersScheduled { ids, .. } if !ids.is_empty() => {
                println!("Reminders scheduled: {}", ids.join(", "));
            }
            Event::ReminderFailed { message, .. } => {
                eprintln!("warning: reminders not scheduled: {message}");
            }
            Event::TrackerReset { .. } => println!("All tracker data deleted"),
            _ => {}
        }
    }
    Ok(())
}

/// Defaults for a fresh setup, starting now.
pub fn default_settings(defaults: &DefaultsConfig) -> QuitSettings {
    defaults.settings_at(Utc::now())
}
