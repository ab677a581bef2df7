//! Lazy, exactly-once initialization of the process-wide engine.
//!
//! The adapter owns the single [`TorrentEngine`] instance for the process
//! lifetime. Initialization is asynchronous and idempotent: concurrent
//! callers collapse into one in-flight attempt, and a failed attempt is
//! retried on the next use instead of wedging the service.

use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::Mutex;

use super::{TorrentEngine, TorrentError};

/// Builds the engine instance the adapter will own.
///
/// Separated from the adapter so production backends and the simulated
/// engine plug in the same way.
#[async_trait]
pub trait EngineFactory: Send + Sync {
    /// Constructs a new engine instance.
    ///
    /// # Errors
    /// - `TorrentError::NotReady` - Engine could not be constructed
    async fn build(&self) -> Result<Arc<dyn TorrentEngine>, TorrentError>;
}

/// Initialization state machine: `Uninitialized -> Ready | Failed`.
///
/// `Failed` is not terminal; the next `engine()` call retries the build.
enum EngineState {
    Uninitialized,
    Ready(Arc<dyn TorrentEngine>),
    Failed,
}

/// Owns the shared engine instance and guards its initialization.
pub struct EngineAdapter {
    factory: Arc<dyn EngineFactory>,
    state: Mutex<EngineState>,
}

impl EngineAdapter {
    pub fn new(factory: Arc<dyn EngineFactory>) -> Self {
        Self {
            factory,
            state: Mutex::new(EngineState::Uninitialized),
        }
    }

    /// Returns the ready engine, initializing it first if necessary.
    ///
    /// The state mutex is held across the build, so concurrent callers wait
    /// for the one in-flight attempt and then observe its outcome; no call
    /// ever proceeds against a missing engine.
    ///
    /// # Errors
    /// - `TorrentError::NotReady` - Engine construction failed; callers may
    ///   retry, which triggers a fresh build attempt
    pub async fn engine(&self) -> Result<Arc<dyn TorrentEngine>, TorrentError> {
        let mut state = self.state.lock().await;

        if let EngineState::Ready(engine) = &*state {
            return Ok(engine.clone());
        }

        tracing::info!("Initializing torrent engine");
        match self.factory.build().await {
            Ok(engine) => {
                *state = EngineState::Ready(engine.clone());
                tracing::info!("Torrent engine initialized");
                Ok(engine)
            }
            Err(e) => {
                *state = EngineState::Failed;
                tracing::error!("Torrent engine initialization failed: {e}");
                Err(TorrentError::NotReady {
                    reason: e.to_string(),
                })
            }
        }
    }

    /// Whether the engine has been initialized successfully.
    pub async fn is_ready(&self) -> bool {
        matches!(&*self.state.lock().await, EngineState::Ready(_))
    }
}
