//! CLI application for renaming NFS-e invoice PDFs.

mod commands;

use clap::{Parser, Subcommand};
use tracing::Level;
use tracing_subscriber::FmtSubscriber;

use commands::{config, inspect, rename};

/// NFS-e renamer - Copy invoice PDFs under canonical, collision-safe names
#[derive(Parser)]
#[command(name = "nfse")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Enable verbose output
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Path to config file
    #[arg(short, long, global = true)]
    config: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Rename every invoice PDF in a directory tree
    Rename(rename::RenameArgs),

    /// Show the fields and canonical name of a single invoice
    Inspect(inspect::InspectArgs),

    /// Manage configuration
    Config(config::ConfigArgs),
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Set up logging based on verbosity
    let level = match cli.verbose {
        0 => Level::WARN,
        1 => Level::INFO,
        2 => Level::DEBUG,
        _ => Level::TRACE,
    };

    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_target(false)
        .with_writer(std::io::stderr)
        .finish();

    tracing::subscriber::set_global_default(subscriber)?;

    // Execute command
    match cli.command {
        Commands::Rename(args) => rename::run(args, cli.config.as_deref()).await,
        Commands::Inspect(args) => inspect::run(args).await,
        Commands::Config(args) => config::run(args, cli.config.as_deref()).await,
    }
}
