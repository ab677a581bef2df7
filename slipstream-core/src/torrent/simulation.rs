//! Simulated torrent engine for development and testing.
//!
//! Implements the [`TorrentEngine`] seam without any networking: metadata,
//! paced progress events, and a materialized file on disk. Failure and
//! stall modes let lifecycle tests drive the error and timeout paths of
//! the orchestrator deterministically.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use async_trait::async_trait;
use parking_lot::Mutex;
use rand::Rng;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

use super::engine::{EngineFile, EngineHandle, SubmitOptions, TorrentEvent, TorrentMetadata};
use super::{InfoHash, TorrentEngine, TorrentError, magnet};
use crate::config::SimulationConfig;

/// How a simulated transfer behaves after metadata is reported.
#[derive(Debug, Clone)]
enum Behavior {
    /// Paced progress events, file materialization, then `Done`.
    Normal,
    /// `Failed` with the given message instead of any progress.
    Fail(String),
    /// No terminal event; the transfer hangs until removed.
    Stall,
}

struct Transfer {
    task: JoinHandle<()>,
    file: PathBuf,
}

/// In-process stand-in for a real BitTorrent backend.
pub struct SimulatedEngine {
    config: SimulationConfig,
    behavior: Behavior,
    transfers: Mutex<HashMap<InfoHash, Transfer>>,
}

impl SimulatedEngine {
    pub fn new(config: SimulationConfig) -> Self {
        Self::with_behavior(config, Behavior::Normal)
    }

    /// Engine whose transfers fail with `message` right after metadata.
    pub fn failing(config: SimulationConfig, message: impl Into<String>) -> Self {
        Self::with_behavior(config, Behavior::Fail(message.into()))
    }

    /// Engine whose transfers never reach a terminal event.
    pub fn stalled(config: SimulationConfig) -> Self {
        Self::with_behavior(config, Behavior::Stall)
    }

    fn with_behavior(config: SimulationConfig, behavior: Behavior) -> Self {
        Self {
            config,
            behavior,
            transfers: Mutex::new(HashMap::new()),
        }
    }
}

#[async_trait]
impl TorrentEngine for SimulatedEngine {
    async fn submit(
        &self,
        magnet_uri: &str,
        download_dir: &Path,
        options: SubmitOptions,
    ) -> Result<EngineHandle, TorrentError> {
        let info_hash = magnet::extract_info_hash(magnet_uri)?;
        let name = magnet::extract_display_name(magnet_uri)
            .unwrap_or_else(|| format!("Torrent_{}", &info_hash.to_string()[..16]));

        tracing::debug!(
            "Simulated engine accepted {info_hash} ({name}), {} trackers, sequential={}",
            options.trackers.len(),
            options.sequential
        );

        let file = download_dir.join(&name);
        let (tx, rx) = mpsc::unbounded_channel();
        let task = tokio::spawn(run_transfer(
            self.config.clone(),
            self.behavior.clone(),
            info_hash,
            name,
            file.clone(),
            tx,
        ));

        // A resubmission of the same magnet replaces the previous transfer.
        if let Some(previous) = self
            .transfers
            .lock()
            .insert(info_hash, Transfer { task, file })
        {
            previous.task.abort();
        }

        Ok(EngineHandle {
            info_hash,
            events: rx,
        })
    }

    async fn remove(&self, info_hash: InfoHash, remove_data: bool) -> Result<(), TorrentError> {
        let transfer = self.transfers.lock().remove(&info_hash);
        if let Some(transfer) = transfer {
            transfer.task.abort();
            if remove_data {
                let _ = tokio::fs::remove_file(&transfer.file).await;
            }
            tracing::debug!("Simulated engine removed {info_hash} (remove_data={remove_data})");
        }
        Ok(())
    }
}

/// Drives one simulated transfer to its scripted outcome.
async fn run_transfer(
    config: SimulationConfig,
    behavior: Behavior,
    info_hash: InfoHash,
    name: String,
    file: PathBuf,
    tx: mpsc::UnboundedSender<TorrentEvent>,
) {
    tokio::time::sleep(config.metadata_delay).await;

    let metadata = TorrentMetadata {
        info_hash,
        name: name.clone(),
        total_length: config.simulated_file_size,
        files: vec![EngineFile {
            path: PathBuf::from(&name),
            length: config.simulated_file_size,
        }],
    };
    if tx.send(TorrentEvent::Metadata(metadata)).is_err() {
        return;
    }

    match behavior {
        Behavior::Fail(message) => {
            let _ = tx.send(TorrentEvent::Failed { message });
        }
        Behavior::Stall => {
            // Keep the event channel open without ever settling.
            std::future::pending::<()>().await;
        }
        Behavior::Normal => {
            let steps = config.progress_steps.max(1);
            for step in 1..=steps {
                let jitter_ms = {
                    let mut rng = rand::rng();
                    rng.random_range(0..=2)
                };
                tokio::time::sleep(config.progress_interval + std::time::Duration::from_millis(jitter_ms)).await;
                let fraction = f64::from(step) / f64::from(steps);
                if tx.send(TorrentEvent::Progress { fraction }).is_err() {
                    return;
                }
            }

            let content = vec![0u8; config.simulated_file_size as usize];
            if let Err(e) = tokio::fs::write(&file, content).await {
                let _ = tx.send(TorrentEvent::Failed {
                    message: format!("failed to write {}: {e}", file.display()),
                });
                return;
            }

            let _ = tx.send(TorrentEvent::Done);
        }
    }
}

/// Builds a [`SimulatedEngine`] for the engine adapter.
pub struct SimulatedEngineFactory {
    config: SimulationConfig,
    behavior: Behavior,
}

impl SimulatedEngineFactory {
    pub fn new(config: SimulationConfig) -> Self {
        Self {
            config,
            behavior: Behavior::Normal,
        }
    }

    /// Factory producing engines whose transfers fail after metadata.
    pub fn failing(config: SimulationConfig, message: impl Into<String>) -> Self {
        Self {
            config,
            behavior: Behavior::Fail(message.into()),
        }
    }

    /// Factory producing engines whose transfers never settle.
    pub fn stalled(config: SimulationConfig) -> Self {
        Self {
            config,
            behavior: Behavior::Stall,
        }
    }
}

#[async_trait]
impl super::adapter::EngineFactory for SimulatedEngineFactory {
    async fn build(&self) -> Result<Arc<dyn TorrentEngine>, TorrentError> {
        Ok(Arc::new(SimulatedEngine::with_behavior(
            self.config.clone(),
            self.behavior.clone(),
        )))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const MAGNET: &str =
        "magnet:?xt=urn:btih:0123456789abcdef0123456789abcdef01234567&dn=sample.bin";

    #[tokio::test]
    async fn test_events_arrive_in_lifecycle_order() {
        let dir = tempfile::tempdir().unwrap();
        let engine = SimulatedEngine::new(SimulationConfig::fast());
        let options = SubmitOptions {
            max_connections: 10,
            sequential: true,
            trackers: Vec::new(),
        };

        let mut handle = engine.submit(MAGNET, dir.path(), options).await.unwrap();
        assert_eq!(
            handle.info_hash.to_string(),
            "0123456789abcdef0123456789abcdef01234567"
        );

        let first = handle.events.recv().await.unwrap();
        let TorrentEvent::Metadata(metadata) = first else {
            panic!("expected metadata first, got {first:?}");
        };
        assert_eq!(metadata.name, "sample.bin");
        assert_eq!(metadata.files.len(), 1);

        let mut last_fraction = 0.0;
        loop {
            match handle.events.recv().await.unwrap() {
                TorrentEvent::Progress { fraction } => {
                    assert!(fraction >= last_fraction);
                    last_fraction = fraction;
                }
                TorrentEvent::Done => break,
                other => panic!("unexpected event {other:?}"),
            }
        }

        let written = dir.path().join("sample.bin");
        assert!(written.is_file());
    }

    #[tokio::test]
    async fn test_failing_engine_reports_error_after_metadata() {
        let dir = tempfile::tempdir().unwrap();
        let engine = SimulatedEngine::failing(SimulationConfig::fast(), "no peers");
        let options = SubmitOptions {
            max_connections: 10,
            sequential: true,
            trackers: Vec::new(),
        };

        let mut handle = engine.submit(MAGNET, dir.path(), options).await.unwrap();

        assert!(matches!(
            handle.events.recv().await.unwrap(),
            TorrentEvent::Metadata(_)
        ));
        match handle.events.recv().await.unwrap() {
            TorrentEvent::Failed { message } => assert_eq!(message, "no peers"),
            other => panic!("expected failure, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_invalid_magnet_rejected_at_submit() {
        let dir = tempfile::tempdir().unwrap();
        let engine = SimulatedEngine::new(SimulationConfig::fast());
        let options = SubmitOptions {
            max_connections: 10,
            sequential: true,
            trackers: Vec::new(),
        };

        let result = engine.submit("magnet:?dn=nohash", dir.path(), options).await;
        assert!(matches!(result, Err(TorrentError::InvalidMagnet { .. })));
    }
}
