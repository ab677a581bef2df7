//! Centralized configuration for Slipstream.
//!
//! All tunable parameters and settings are defined here to avoid
//! hard-coded values scattered throughout the codebase.

use std::path::PathBuf;
use std::time::Duration;

/// Central configuration for all Slipstream components.
///
/// Groups related configuration settings into logical sections.
/// Supports environment variable overrides for runtime customization.
#[derive(Debug, Clone, Default)]
pub struct Config {
    pub server: ServerConfig,
    pub download: DownloadConfig,
    pub storage: StorageConfig,
    pub simulation: SimulationConfig,
}

/// HTTP server binding configuration.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Interface to bind the HTTP listener to
    pub host: String,
    /// TCP port for the HTTP listener
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 3000,
        }
    }
}

/// Download orchestration configuration.
///
/// Controls where downloads land, how long a request may stay in flight,
/// and the engine-level transfer policy handed to submissions.
#[derive(Debug, Clone)]
pub struct DownloadConfig {
    /// Base directory that per-user download directories are created under
    pub download_dir: PathBuf,
    /// Maximum time a download request may stay unresolved
    pub torrent_timeout: Duration,
    /// How long a completed job stays queryable before registry eviction
    pub grace_period: Duration,
    /// Maximum concurrent peer connections per transfer
    pub max_peer_connections: u32,
    /// Whether transfers request pieces sequentially (streaming-friendly)
    pub sequential: bool,
    /// Tracker announce URLs handed to every submission
    pub trackers: Vec<String>,
}

impl Default for DownloadConfig {
    fn default() -> Self {
        Self {
            download_dir: PathBuf::from("downloads"),
            torrent_timeout: Duration::from_secs(3000), // 50 minutes; slow swarms
            grace_period: Duration::from_secs(5),
            max_peer_connections: 100,
            sequential: true,
            trackers: default_trackers(),
        }
    }
}

/// Public trackers used to improve peer discovery for magnet submissions.
fn default_trackers() -> Vec<String> {
    [
        "udp://tracker.opentrackr.org:1337/announce",
        "udp://tracker.openbittorrent.com:6969/announce",
        "udp://open.stealth.si:80/announce",
        "udp://exodus.desync.com:6969/announce",
        "udp://tracker.torrent.eu.org:451/announce",
        "udp://explodie.org:6969/announce",
        "udp://tracker.moeking.me:6969/announce",
        "udp://tracker.tiny-vps.com:6969/announce",
        "udp://tracker.theoks.net:6969/announce",
        "udp://tracker.skyts.net:6969/announce",
    ]
    .into_iter()
    .map(String::from)
    .collect()
}

/// File delivery and disk I/O configuration.
#[derive(Debug, Clone)]
pub struct StorageConfig {
    /// Chunk size for streaming file reads
    pub stream_chunk_size: usize,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            stream_chunk_size: 65536, // 64 KiB
        }
    }
}

/// Simulated engine configuration for development and testing.
///
/// Controls the pacing and shape of the transfers the simulated engine
/// fabricates when no real protocol backend is wired in.
#[derive(Debug, Clone)]
pub struct SimulationConfig {
    /// Delay before the simulated engine reports metadata
    pub metadata_delay: Duration,
    /// Interval between simulated progress events
    pub progress_interval: Duration,
    /// Number of progress events emitted before completion
    pub progress_steps: u32,
    /// Size of the file the simulated engine materializes
    pub simulated_file_size: u64,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            metadata_delay: Duration::from_millis(500),
            progress_interval: Duration::from_millis(400),
            progress_steps: 20,
            simulated_file_size: 8 * 1024 * 1024, // 8 MiB
        }
    }
}

impl SimulationConfig {
    /// Creates a configuration with near-zero timings for fast tests.
    pub fn fast() -> Self {
        Self {
            metadata_delay: Duration::from_millis(1),
            progress_interval: Duration::from_millis(1),
            progress_steps: 4,
            simulated_file_size: 4096,
        }
    }
}

impl Config {
    /// Creates configuration with environment variable overrides.
    ///
    /// Allows runtime configuration via environment variables while
    /// maintaining sensible defaults.
    pub fn from_env() -> Self {
        let mut config = Self::default();

        if let Ok(host) = std::env::var("SLIPSTREAM_HOST") {
            config.server.host = host;
        }

        if let Ok(port) = std::env::var("SLIPSTREAM_PORT") {
            if let Ok(port) = port.parse::<u16>() {
                config.server.port = port;
            }
        }

        if let Ok(dir) = std::env::var("SLIPSTREAM_DOWNLOAD_DIR") {
            config.download.download_dir = PathBuf::from(dir);
        }

        if let Ok(timeout) = std::env::var("SLIPSTREAM_TORRENT_TIMEOUT") {
            if let Ok(seconds) = timeout.parse::<u64>() {
                config.download.torrent_timeout = Duration::from_secs(seconds);
            }
        }

        if let Ok(grace) = std::env::var("SLIPSTREAM_GRACE_PERIOD") {
            if let Ok(seconds) = grace.parse::<u64>() {
                config.download.grace_period = Duration::from_secs(seconds);
            }
        }

        if let Ok(max_peers) = std::env::var("SLIPSTREAM_MAX_PEERS") {
            if let Ok(count) = max_peers.parse::<u32>() {
                config.download.max_peer_connections = count;
            }
        }

        config
    }

    /// Creates a configuration optimized for testing.
    ///
    /// Short timeouts and grace periods so lifecycle tests finish quickly.
    pub fn for_testing() -> Self {
        let mut config = Self::default();
        config.download.torrent_timeout = Duration::from_millis(500);
        config.download.grace_period = Duration::from_millis(50);
        config.simulation = SimulationConfig::fast();
        config
    }
}
