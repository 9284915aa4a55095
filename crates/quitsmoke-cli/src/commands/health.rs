use clap::Args;
use quitsmoke_core::Config;

use super::open_tracker;

#[derive(Args)]
pub struct HealthArgs {
    /// Print as JSON
    #[arg(long)]
    pub json: bool,
}

pub fn run(args: HealthArgs) -> Result<(), Box<dyn std::error::Error>> {
    let config = Config::load()?;
    let tracker = open_tracker(&config)?;
    let timeline = tracker.health_timeline();

    if args.json {
        println!("{}", serde_json::to_string_pretty(&timeline)?);
        return Ok(());
    }

    for step in &timeline {
        if step.completed {
            println!("[x] {}: {}", step.title, step.description);
        } else {
            println!(
                "[ ] {}: {} (あと{})",
                step.title,
                step.description,
                step.remaining_label()
            );
        }
    }
    Ok(())
}
