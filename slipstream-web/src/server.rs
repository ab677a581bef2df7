//! Router construction and server bootstrap.

use std::sync::Arc;

use axum::Router;
use axum::routing::{get, post};
use slipstream_core::torrent::EngineFactory;
use slipstream_core::{Config, DownloadRegistry, Downloader, EngineAdapter, FileService};
use tower_http::cors::CorsLayer;

use crate::handlers::{download_progress, download_torrent, list_files, stream_file, view_file};

/// Shared state handed to every handler.
#[derive(Clone)]
pub struct AppState {
    pub downloader: Downloader,
    pub files: FileService,
}

impl AppState {
    /// Wires the orchestration core from configuration and an engine factory.
    pub fn new(config: &Config, factory: Arc<dyn EngineFactory>) -> Self {
        let adapter = Arc::new(EngineAdapter::new(factory));
        let registry = DownloadRegistry::new();
        let downloader = Downloader::new(adapter, registry, config.download.clone());
        let files = FileService::new(
            config.download.download_dir.clone(),
            config.storage.stream_chunk_size,
        );
        Self { downloader, files }
    }
}

/// Builds the API router.
pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/api/torrents/download", post(download_torrent))
        .route("/api/torrents/{info_hash}/progress", get(download_progress))
        .route("/api/files/list/{username}", get(list_files))
        .route("/api/files/stream/{*path}", get(stream_file))
        .route("/api/files/view/{*path}", get(view_file))
        .layer(CorsLayer::permissive())
        .with_state(state)
}

/// Runs the HTTP server until the process is stopped.
///
/// Creates the base download directory up front so the file endpoints have
/// a root to serve from even before the first download.
pub async fn run_server(
    config: Config,
    factory: Arc<dyn EngineFactory>,
) -> Result<(), Box<dyn std::error::Error>> {
    tokio::fs::create_dir_all(&config.download.download_dir).await?;

    let state = AppState::new(&config, factory);
    let app = build_router(state);

    let addr = format!("{}:{}", config.server.host, config.server.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!("Slipstream API listening on http://{addr}");
    axum::serve(listener, app).await?;
    Ok(())
}
