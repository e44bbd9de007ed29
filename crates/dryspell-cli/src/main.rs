use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

mod commands;

#[derive(Parser)]
#[command(name = "dryspell", version, about = "Dryspell sobriety tracker CLI")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Current attempt control
    Attempt {
        #[command(subcommand)]
        action: commands::attempt::AttemptAction,
    },
    /// Finalized record management
    Records {
        #[command(subcommand)]
        action: commands::records::RecordsAction,
    },
    /// Period statistics
    Stats(commands::stats::StatsArgs),
    /// Milestone tier for elapsed days
    Level(commands::level::LevelArgs),
    /// Configuration management
    Config {
        #[command(subcommand)]
        action: commands::config::ConfigAction,
    },
}

fn init_logging() {
    let filter = EnvFilter::try_from_env("DRYSPELL_LOG").unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn main() {
    init_logging();

    let cli = Cli::parse();
    let result = match cli.command {
        Commands::Attempt { action } => commands::attempt::run(action),
        Commands::Records { action } => commands::records::run(action),
        Commands::Stats(args) => commands::stats::run(args),
        Commands::Level(args) => commands::level::run(args),
        Commands::Config { action } => commands::config::run(action),
    };

    if let Err(e) = result {
        tracing::debug!("Command failed: {e:?}");
        eprintln!("error: {e}");
        std::process::exit(1);
    }
}
