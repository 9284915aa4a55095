use clap::Args;
use quitsmoke_core::{Config, TrackerState};

use super::{default_settings, open_tracker, print_events, SettingsArgs};

#[derive(Args)]
pub struct SetupArgs {
    #[command(flatten)]
    pub settings: SettingsArgs,
    /// Replace an existing record and discard its achievements
    #[arg(long)]
    pub force: bool,
    /// Print events as JSON
    #[arg(long)]
    pub json: bool,
}

pub fn run(args: SetupArgs) -> Result<(), Box<dyn std::error::Error>> {
    let config = Config::load()?;
    let mut tracker = open_tracker(&config)?;

    if tracker.state() == TrackerState::Active && !args.force {
        return Err(
            "already set up; use `quitsmoke update` to edit or pass --force to start over".into(),
        );
    }

    let settings = args.settings.apply_to(default_settings(&config.defaults));
    let events = tracker.save_new_record(settings)?;
    print_events(&events, args.json)
}
