//! CLI command implementations

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use clap::Subcommand;
use slipstream_core::Config;
use slipstream_core::torrent::{SimulatedEngineFactory, magnet};
use slipstream_core::tracing_setup::{CliLogLevel, init_tracing};
use slipstream_web::run_server;

/// Available CLI commands
#[derive(Subcommand)]
pub enum Commands {
    /// Start the download and streaming server
    Serve {
        /// Host to bind to
        #[arg(long)]
        host: Option<String>,
        /// Port to bind to
        #[arg(short, long)]
        port: Option<u16>,
        /// Root directory for per-user downloads
        #[arg(long)]
        download_dir: Option<PathBuf>,
    },
    /// Validate a magnet link and print what it identifies
    Inspect {
        /// Magnet link to inspect
        magnet: String,
    },
}

/// Handle the CLI command
///
/// # Errors
/// Returns appropriate error based on the command that fails
pub async fn handle_command(command: Commands, log_level: CliLogLevel) -> anyhow::Result<()> {
    match command {
        Commands::Serve {
            host,
            port,
            download_dir,
        } => serve(host, port, download_dir, log_level).await,
        Commands::Inspect { magnet } => inspect_magnet(&magnet),
    }
}

/// Start the HTTP server with the simulated transfer backend.
///
/// Configuration comes from the environment, with any command-line flags
/// taking precedence.
async fn serve(
    host: Option<String>,
    port: Option<u16>,
    download_dir: Option<PathBuf>,
    log_level: CliLogLevel,
) -> anyhow::Result<()> {
    let mut config = Config::from_env();
    if let Some(host) = host {
        config.server.host = host;
    }
    if let Some(port) = port {
        config.server.port = port;
    }
    if let Some(dir) = download_dir {
        config.download.download_dir = dir;
    }

    init_tracing(log_level.as_tracing_level(), None)
        .map_err(|e| anyhow::anyhow!("failed to initialize tracing: {e}"))?;

    tracing::info!(
        "Starting server on {}:{}, downloads in {}",
        config.server.host,
        config.server.port,
        config.download.download_dir.display()
    );

    let factory = Arc::new(SimulatedEngineFactory::new(config.simulation.clone()));
    run_server(config, factory)
        .await
        .map_err(|e| anyhow::anyhow!("server error: {e}"))
}

/// Validate a magnet link and print its info hash and display name.
fn inspect_magnet(uri: &str) -> anyhow::Result<()> {
    magnet::validate_magnet(uri).context("magnet link is not valid")?;
    let info_hash = magnet::extract_info_hash(uri).context("magnet link is not valid")?;

    println!("Info hash: {info_hash}");
    match magnet::extract_display_name(uri) {
        Some(name) => println!("Name: {name}"),
        None => println!("Name: (not present)"),
    }

    Ok(())
}
