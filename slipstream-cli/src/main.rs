//! Slipstream CLI - Command-line interface
//!
//! Provides command-line access to the Slipstream download server.

mod commands;

use clap::Parser;
use slipstream_core::tracing_setup::CliLogLevel;

#[derive(Parser)]
#[command(name = "slipstream")]
#[command(about = "A torrent download and streaming server")]
struct Cli {
    /// Console log verbosity
    #[arg(long, value_enum, default_value_t = CliLogLevel::Info)]
    log_level: CliLogLevel,

    #[command(subcommand)]
    command: commands::Commands,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    commands::handle_command(cli.command, cli.log_level).await?;

    Ok(())
}
