//! The torrent engine seam.
//!
//! The actual BitTorrent machinery (trackers, DHT, peer wire protocol,
//! piece verification) lives behind [`TorrentEngine`]. The orchestration
//! layer only ever sees a submission handle and the lifecycle events the
//! engine emits for it.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tokio::sync::mpsc;

use super::{InfoHash, TorrentError};

/// Engine-level policy for one submission.
///
/// These knobs are engine configuration, not orchestration logic; changing
/// them does not affect job semantics.
#[derive(Debug, Clone)]
pub struct SubmitOptions {
    /// Maximum concurrent peer connections for the transfer
    pub max_connections: u32,
    /// Request pieces in file order rather than rarest-first
    pub sequential: bool,
    /// Tracker announce URLs to use alongside any embedded in the magnet
    pub trackers: Vec<String>,
}

/// A single file within a torrent, as reported by the engine.
///
/// The path is relative to the submission's destination directory.
#[derive(Debug, Clone)]
pub struct EngineFile {
    pub path: PathBuf,
    pub length: u64,
}

/// Torrent metadata delivered once the engine has resolved the magnet.
#[derive(Debug, Clone)]
pub struct TorrentMetadata {
    pub info_hash: InfoHash,
    pub name: String,
    pub total_length: u64,
    pub files: Vec<EngineFile>,
}

/// Lifecycle events emitted by the engine for one submission.
///
/// Delivery is sequential per handle; events for different submissions may
/// interleave freely.
#[derive(Debug, Clone)]
pub enum TorrentEvent {
    /// Metadata became available; the file manifest is now known.
    Metadata(TorrentMetadata),
    /// Transfer progress as a fraction of total bytes, nominally in [0, 1].
    Progress { fraction: f64 },
    /// All pieces downloaded and verified.
    Done,
    /// Fatal transfer failure; no further events follow.
    Failed { message: String },
    /// Non-fatal condition worth logging (tracker errors, dead peers).
    Warning { message: String },
}

/// Handle to one in-progress transfer.
///
/// Dropping the handle abandons the orchestrator's view of the transfer;
/// the engine may keep running until told to remove it.
#[derive(Debug)]
pub struct EngineHandle {
    pub info_hash: InfoHash,
    pub events: mpsc::UnboundedReceiver<TorrentEvent>,
}

/// Capability the orchestration layer drives downloads through.
///
/// One engine instance serves the whole process; implementations must be
/// safe to share across concurrent submissions.
#[async_trait]
pub trait TorrentEngine: Send + Sync {
    /// Submits a magnet for download into `download_dir`.
    ///
    /// Returns a handle carrying the assigned info hash and the event
    /// stream for the transfer.
    ///
    /// # Errors
    /// - `TorrentError::InvalidMagnet` - Engine could not parse the magnet
    /// - `TorrentError::Engine` - Submission rejected by the engine
    async fn submit(
        &self,
        magnet: &str,
        download_dir: &Path,
        options: SubmitOptions,
    ) -> Result<EngineHandle, TorrentError>;

    /// Removes a transfer from the engine.
    ///
    /// With `remove_data` false the downloaded files stay on disk; this is
    /// the normal post-completion cleanup. Removing an unknown transfer is
    /// a no-op.
    ///
    /// # Errors
    /// - `TorrentError::Engine` - Engine failed to tear the transfer down
    async fn remove(&self, info_hash: InfoHash, remove_data: bool) -> Result<(), TorrentError>;
}
