use clap::Args;
use quitsmoke_core::Config;

use super::{open_tracker, print_events, SettingsArgs};

#[derive(Args)]
pub struct UpdateArgs {
    #[command(flatten)]
    pub settings: SettingsArgs,
    /// Print events as JSON
    #[arg(long)]
    pub json: bool,
}

pub fn run(args: UpdateArgs) -> Result<(), Box<dyn std::error::Error>> {
    let config = Config::load()?;
    let mut tracker = open_tracker(&config)?;

    let settings = args.settings.apply_to(tracker.settings().clone());
    let events = tracker.update_record(settings)?;
    print_events(&events, args.json)
}
