use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

mod commands;

#[derive(Parser)]
#[command(name = "quitsmoke", version, about = "QuitSmoke quit-smoking tracker CLI")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// First-time setup: quit date and smoking habits
    Setup(commands::setup::SetupArgs),
    /// Edit the active quit record
    Update(commands::update::UpdateArgs),
    /// Smoke-free time, cigarettes avoided and money saved
    Status(commands::status::StatusArgs),
    /// Unlocked achievements
    Achievements(commands::achievements::AchievementsArgs),
    /// Health recovery timeline
    Health(commands::health::HealthArgs),
    /// Pending motivational reminders
    Reminders(commands::reminders::RemindersArgs),
    /// Recompute periodically and deliver reminders until interrupted
    Watch(commands::watch::WatchArgs),
    /// Delete the quit record and all achievements
    Reset(commands::reset::ResetArgs),
    /// Configuration management
    Config {
        #[command(subcommand)]
        action: commands::config::ConfigAction,
    },
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn main() {
    init_tracing();

    let cli = Cli::parse();
    let result = match cli.command {
        Commands::Setup(args) => commands::setup::run(args),
        Commands::Update(args) => commands::update::run(args),
        Commands::Status(args) => commands::status::run(args),
        Commands::Achievements(args) => commands::achievements::run(args),
        Commands::Health(args) => commands::health::run(args),
        Commands::Reminders(args) => commands::reminders::run(args),
        Commands::Watch(args) => commands::watch::run(args),
        Commands::Reset(args) => commands::reset::run(args),
        Commands::Config { action } => commands::config::run(action),
    };

    if let Err(e) = result {
        eprintln!("error: {e}");
        std::process::exit(1);
    }
}
