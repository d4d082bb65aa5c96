//! LabKit CLI - Command-line interface for LAB archive tools

pub mod commands;
pub mod progress;

use clap::Parser;
use commands::Commands;
use tracing::Level;

#[derive(Parser)]
#[command(name = "labkit", version)]
#[command(about = "LabKit: LucasArts LAB archive packer and unpacker", long_about = None)]
struct Cli {
    /// Print debug diagnostics (and the archive listing when unpacking)
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

/// Run the LabKit CLI
pub fn run_cli() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Setup logging
    let level = if cli.verbose { Level::DEBUG } else { Level::WARN };
    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .init();

    cli.command.execute(cli.verbose)?;

    Ok(())
}
