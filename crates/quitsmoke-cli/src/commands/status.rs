use chrono::Local;
use clap::Args;
use quitsmoke_core::{Achievement, Config, QuitRecord, Statistics, TrackerState};
use serde::Serialize;

use super::{format_local, format_money, open_tracker};

const RECENT_ACHIEVEMENTS: usize = 3;

#[derive(Args)]
pub struct StatusArgs {
    /// Print as JSON
    #[arg(long)]
    pub json: bool,
}

#[derive(Serialize)]
struct StatusView<'a> {
    state: TrackerState,
    first_launch: bool,
    record: Option<&'a QuitRecord>,
    statistics: &'a Statistics,
    recent_achievements: &'a [Achievement],
}

pub fn run(args: StatusArgs) -> Result<(), Box<dyn std::error::Error>> {
    let config = Config::load()?;
    let tracker = open_tracker(&config)?;

    let achievements = tracker.achievements();
    let recent = &achievements[..achievements.len().min(RECENT_ACHIEVEMENTS)];

    if args.json {
        let view = StatusView {
            state: tracker.state(),
            first_launch: tracker.is_first_launch(),
            record: tracker.record(),
            statistics: tracker.statistics(),
            recent_achievements: recent,
        };
        println!("{}", serde_json::to_string_pretty(&view)?);
        return Ok(());
    }

    let Some(record) = tracker.record() else {
        println!("Not set up yet. Run `quitsmoke setup` to record your quit date.");
        return Ok(());
    };

    let stats = tracker.statistics();
    let elapsed = stats.elapsed;
    println!(
        "Quit since:          {}",
        format_local(&record.start_date)
    );
    println!(
        "Smoke-free:          {} days {} hours {} minutes",
        elapsed.days,
        elapsed.hours % 24,
        elapsed.minutes % 60
    );
    println!("Cigarettes avoided:  {}", stats.cigarettes_avoided);
    println!(
        "Money saved:         {}",
        format_money(stats.money_saved, &record.currency)
    );
    if !record.goal.is_empty() {
        println!("Goal:                {}", record.goal);
    }

    if !recent.is_empty() {
        println!();
        println!("Recent achievements:");
        for achievement in recent {
            println!(
                "  {}  {} ({})",
                achievement.achieved_date.with_timezone(&Local).format("%Y-%m-%d"),
                achievement.title,
                achievement.detail
            );
        }
    }
    Ok(())
}
