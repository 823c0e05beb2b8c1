use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

mod commands;

#[derive(Parser)]
#[command(name = "habitquest-cli", version, about = "HabitQuest CLI")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Habit management and daily check-ins
    Habit {
        #[command(subcommand)]
        action: commands::habit::HabitAction,
    },
    /// Inventory and item effects
    Item {
        #[command(subcommand)]
        action: commands::item::ItemAction,
    },
    /// Level, points and streaks
    Status {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Achievement progress
    Achievements {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Configuration management
    Config {
        #[command(subcommand)]
        action: commands::config::ConfigAction,
    },
}

fn init_logging() {
    let filter = EnvFilter::try_from_env("HABITQUEST_LOG").unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn main() {
    init_logging();
    let cli = Cli::parse();
    let result = match cli.command {
        Commands::Habit { action } => commands::habit::run(action),
        Commands::Item { action } => commands::item::run(action),
        Commands::Status { json } => commands::status::run(json),
        Commands::Achievements { json } => commands::achievements::run(json),
        Commands::Config { action } => commands::config::run(action),
    };

    if let Err(e) = result {
        eprintln!("error: {e}");
        std::process::exit(1);
    }
}
