use clap::Args;
use quitsmoke_core::{Config, ReminderScheduler};

use super::{format_local, open_tracker};

#[derive(Args)]
pub struct RemindersArgs {
    /// Print as JSON
    #[arg(long)]
    pub json: bool,
}

pub fn run(args: RemindersArgs) -> Result<(), Box<dyn std::error::Error>> {
    let config = Config::load()?;
    let tracker = open_tracker(&config)?;
    let pending = tracker.scheduler().pending()?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&pending)?);
        return Ok(());
    }
    if pending.is_empty() {
        println!("No pending reminders.");
        return Ok(());
    }
    for reminder in &pending {
        println!(
            "{}  {}",
            format_local(&reminder.trigger_at),
            reminder.title
        );
        println!("    {}", reminder.body);
    }
    Ok(())
}
