use clap::Args;
use quitsmoke_core::Config;

use super::{open_tracker, print_events};

#[derive(Args)]
pub struct ResetArgs {
    /// Confirm deletion of the record and every achievement
    #[arg(long)]
    pub yes: bool,
}

pub fn run(args: ResetArgs) -> Result<(), Box<dyn std::error::Error>> {
    if !args.yes {
        return Err("reset deletes all data; pass --yes to confirm".into());
    }
    let config = Config::load()?;
    let mut tracker = open_tracker(&config)?;
    let events = tracker.reset()?;
    print_events(&events, false)
}
