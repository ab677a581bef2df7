//! Torrent download orchestration.
//!
//! The engine itself (trackers, peers, piece transfer) sits behind the
//! [`TorrentEngine`] trait; this module owns everything around it: magnet
//! validation, lazy engine initialization, the live job registry, and the
//! downloader that drives one submission from request to resolution.

pub mod adapter;
pub mod downloader;
pub mod engine;
pub mod magnet;
pub mod registry;
pub mod simulation;

use std::fmt;
use std::time::Duration;

pub use adapter::{EngineAdapter, EngineFactory};
pub use downloader::{DownloadOutcome, Downloader};
pub use engine::{
    EngineFile, EngineHandle, SubmitOptions, TorrentEngine, TorrentEvent, TorrentMetadata,
};
pub use magnet::validate_magnet;
pub use registry::{DownloadJob, DownloadRegistry, FileEntry, JobState};
pub use simulation::{SimulatedEngine, SimulatedEngineFactory};

/// SHA-1 hash identifying a unique torrent.
///
/// 20-byte hash of the info dictionary, used as the registry key and as the
/// identifier clients poll progress with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct InfoHash([u8; 20]);

impl InfoHash {
    /// Creates an InfoHash from a 20-byte SHA-1 hash.
    pub fn new(hash: [u8; 20]) -> Self {
        Self(hash)
    }

    /// Parses an InfoHash from its 40-digit hex representation.
    ///
    /// # Errors
    /// - `TorrentError::InvalidInfoHash` - Wrong length or non-hex input
    pub fn from_hex(s: &str) -> Result<Self, TorrentError> {
        let bytes = hex::decode(s).map_err(|_| TorrentError::InvalidInfoHash {
            value: s.to_string(),
        })?;
        let hash: [u8; 20] = bytes
            .try_into()
            .map_err(|_| TorrentError::InvalidInfoHash {
                value: s.to_string(),
            })?;
        Ok(Self(hash))
    }

    /// Returns a reference to the underlying 20-byte hash.
    pub fn as_bytes(&self) -> &[u8; 20] {
        &self.0
    }
}

impl fmt::Display for InfoHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", hex::encode(self.0))
    }
}

/// Errors that can occur during download orchestration.
///
/// Covers validation failures detected before any engine work, engine
/// lifecycle failures, and the timeout path.
#[derive(Debug, thiserror::Error)]
pub enum TorrentError {
    #[error("Invalid magnet link format: {reason}")]
    InvalidMagnet { reason: String },

    #[error("Invalid info hash: {value}")]
    InvalidInfoHash { value: String },

    #[error("Username is required")]
    UsernameRequired,

    #[error("Torrent service is not ready: {reason}")]
    NotReady { reason: String },

    #[error("Download request timed out after {timeout:?}")]
    Timeout { timeout: Duration },

    #[error("Download {info_hash} not found")]
    DownloadNotFound { info_hash: InfoHash },

    #[error("Torrent error: {message}")]
    Engine { message: String },

    #[error("Engine closed the event stream before a terminal event")]
    EngineShutdown,

    #[error("I/O error")]
    Io(#[from] std::io::Error),
}
