//! Download orchestration: one submission from request to resolution.
//!
//! The downloader validates the request, prepares the per-owner directory,
//! submits to the engine, consumes lifecycle events into the registry, and
//! settles exactly once with a success manifest, an engine failure, or a
//! timeout. Event consumption is a plain sequential loop over the handle's
//! channel; the timeout wrapper is the only competing completion source,
//! and whichever side finishes first drops the receiver so late events go
//! nowhere.

use std::path::Path;
use std::sync::Arc;

use serde::Serialize;

use super::engine::{SubmitOptions, TorrentEvent, TorrentMetadata};
use super::registry::FileEntry;
use super::{DownloadRegistry, EngineAdapter, EngineHandle, InfoHash, TorrentEngine, TorrentError};
use crate::config::DownloadConfig;

/// Terminal result of a successful download call.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DownloadOutcome {
    pub info_hash: String,
    pub files: Vec<FileEntry>,
    pub download_path: std::path::PathBuf,
}

/// Drives download jobs against the shared engine.
#[derive(Clone)]
pub struct Downloader {
    adapter: Arc<EngineAdapter>,
    registry: DownloadRegistry,
    config: DownloadConfig,
}

impl Downloader {
    pub fn new(adapter: Arc<EngineAdapter>, registry: DownloadRegistry, config: DownloadConfig) -> Self {
        Self {
            adapter,
            registry,
            config,
        }
    }

    /// Handle to the live job registry shared with progress polling.
    pub fn registry(&self) -> &DownloadRegistry {
        &self.registry
    }

    /// Downloads a torrent into the owner's directory.
    ///
    /// Resolves once the engine reports completion, the engine reports a
    /// fatal error, or the configured timeout fires - whichever happens
    /// first. On timeout the job is evicted and the engine is told to
    /// abandon the transfer (keeping partial data on disk); its remaining
    /// events are discarded.
    ///
    /// # Errors
    /// - `TorrentError::NotReady` - Engine initialization failed
    /// - `TorrentError::InvalidMagnet` - Magnet failed validation
    /// - `TorrentError::UsernameRequired` - Empty or whitespace owner name
    /// - `TorrentError::Io` - Destination directory could not be created
    /// - `TorrentError::Timeout` - No terminal event within the budget
    /// - `TorrentError::Engine` - Engine-reported transfer failure
    pub async fn download(
        &self,
        magnet: &str,
        username: &str,
    ) -> Result<DownloadOutcome, TorrentError> {
        let engine = self.adapter.engine().await?;

        super::validate_magnet(magnet)?;

        let username = username.trim();
        if username.is_empty() {
            return Err(TorrentError::UsernameRequired);
        }

        let user_dir = self.config.download_dir.join(username);
        tokio::fs::create_dir_all(&user_dir).await?;

        let options = SubmitOptions {
            max_connections: self.config.max_peer_connections,
            sequential: self.config.sequential,
            trackers: self.config.trackers.clone(),
        };

        tracing::info!("Starting torrent download for user {username}");
        let mut handle = engine.submit(magnet, &user_dir, options).await?;
        let info_hash = handle.info_hash;

        let timeout = self.config.torrent_timeout;
        match tokio::time::timeout(timeout, self.drive(&engine, &mut handle, &user_dir)).await {
            Ok(outcome) => outcome,
            Err(_) => {
                tracing::error!("Download {info_hash} timed out after {timeout:?}");
                self.registry.remove(info_hash);
                if let Err(e) = engine.remove(info_hash, false).await {
                    tracing::warn!("Failed to abandon timed-out transfer {info_hash}: {e}");
                }
                Err(TorrentError::Timeout { timeout })
            }
        }
    }

    /// Consumes engine events for one submission until a terminal event.
    async fn drive(
        &self,
        engine: &Arc<dyn TorrentEngine>,
        handle: &mut EngineHandle,
        user_dir: &Path,
    ) -> Result<DownloadOutcome, TorrentError> {
        let info_hash = handle.info_hash;
        let mut manifest: Vec<FileEntry> = Vec::new();

        while let Some(event) = handle.events.recv().await {
            match event {
                TorrentEvent::Metadata(metadata) => {
                    tracing::info!(
                        "Received metadata for {info_hash}: {} ({} bytes, {} files)",
                        metadata.name,
                        metadata.total_length,
                        metadata.files.len()
                    );
                    manifest = build_manifest(&metadata, user_dir);
                    self.registry.create(info_hash, manifest.clone());
                }
                TorrentEvent::Progress { fraction } => {
                    self.registry.update_progress(info_hash, fraction * 100.0);
                }
                TorrentEvent::Done => {
                    if manifest.is_empty() {
                        // Engines deliver metadata before completion; an
                        // empty manifest here means that contract broke.
                        tracing::error!(
                            "Engine reported completion for {info_hash} without metadata"
                        );
                        self.registry.remove(info_hash);
                        return Err(TorrentError::Engine {
                            message: "completion reported before metadata".to_string(),
                        });
                    }
                    tracing::info!("Torrent download completed: {info_hash}");
                    self.registry.mark_complete(info_hash);
                    if let Err(e) = engine.remove(info_hash, false).await {
                        tracing::warn!("Failed to remove completed transfer {info_hash}: {e}");
                    }
                    self.registry
                        .remove_after(info_hash, self.config.grace_period);
                    return Ok(DownloadOutcome {
                        info_hash: info_hash.to_string(),
                        files: manifest,
                        download_path: user_dir.to_path_buf(),
                    });
                }
                TorrentEvent::Failed { message } => {
                    tracing::error!("Torrent error for {info_hash}: {message}");
                    self.registry.remove(info_hash);
                    return Err(TorrentError::Engine { message });
                }
                TorrentEvent::Warning { message } => {
                    tracing::warn!("Torrent warning for {info_hash}: {message}");
                }
            }
        }

        // The engine dropped the event stream without settling the job.
        self.registry.remove(info_hash);
        Err(TorrentError::EngineShutdown)
    }

    /// Progress percentage for an active or recently-completed job.
    ///
    /// # Errors
    /// - `TorrentError::DownloadNotFound` - Unknown info hash, or the grace
    ///   period has elapsed
    pub fn progress(&self, info_hash: InfoHash) -> Result<f64, TorrentError> {
        self.registry
            .progress(info_hash)
            .ok_or(TorrentError::DownloadNotFound { info_hash })
    }
}

/// Finalizes engine-reported files into per-owner absolute paths.
fn build_manifest(metadata: &TorrentMetadata, user_dir: &Path) -> Vec<FileEntry> {
    metadata
        .files
        .iter()
        .map(|file| FileEntry {
            name: file
                .path
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_else(|| metadata.name.clone()),
            path: user_dir.join(&file.path),
            size: file.length,
        })
        .collect()
}
