use clap::Args;
use quitsmoke_core::Config;

use super::{format_local, open_tracker};

#[derive(Args)]
pub struct AchievementsArgs {
    /// Include milestones not yet reached
    #[arg(long)]
    pub all: bool,
    /// Print as JSON
    #[arg(long)]
    pub json: bool,
}

pub fn run(args: AchievementsArgs) -> Result<(), Box<dyn std::error::Error>> {
    let config = Config::load()?;
    let tracker = open_tracker(&config)?;

    if args.all {
        let catalogue = tracker.catalogue();
        if args.json {
            println!("{}", serde_json::to_string_pretty(&catalogue)?);
            return Ok(());
        }
        for entry in &catalogue {
            let mark = if entry.earned.is_some() { "x" } else { " " };
            println!("[{mark}] {:<8} {} ({})", entry.kind, entry.title, entry.detail);
        }
        return Ok(());
    }

    let achievements = tracker.achievements();
    if args.json {
        println!("{}", serde_json::to_string_pretty(achievements)?);
        return Ok(());
    }
    if achievements.is_empty() {
        println!("No achievements yet.");
        return Ok(());
    }
    for achievement in achievements {
        println!(
            "{}  {} ({})",
            format_local(&achievement.achieved_date),
            achievement.title,
            achievement.detail
        );
    }
    Ok(())
}
