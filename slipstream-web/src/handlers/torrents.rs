//! Torrent download and progress endpoints.

use axum::Json;
use axum::extract::{Path, State};
use serde::{Deserialize, Serialize};
use slipstream_core::torrent::DownloadOutcome;
use slipstream_core::InfoHash;

use crate::error::ApiError;
use crate::server::AppState;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DownloadRequest {
    pub magnet_link: String,
    pub username: String,
}

#[derive(Debug, Serialize)]
pub struct ProgressResponse {
    pub progress: f64,
}

/// `POST /api/torrents/download` - launch a download and wait for it.
///
/// Resolves with the completed file manifest, or with the mapped error for
/// validation failures, engine failures, and timeouts.
pub async fn download_torrent(
    State(state): State<AppState>,
    Json(request): Json<DownloadRequest>,
) -> Result<Json<DownloadOutcome>, ApiError> {
    tracing::info!("Download requested by {}", request.username);
    let outcome = state
        .downloader
        .download(&request.magnet_link, &request.username)
        .await?;
    Ok(Json(outcome))
}

/// `GET /api/torrents/{info_hash}/progress` - poll a live job.
///
/// Unparseable identifiers are indistinguishable from unknown ones: both
/// report the download as not found.
pub async fn download_progress(
    State(state): State<AppState>,
    Path(info_hash): Path<String>,
) -> Result<Json<ProgressResponse>, ApiError> {
    let info_hash = InfoHash::from_hex(&info_hash)
        .map_err(|_| ApiError::not_found(format!("Download {info_hash} not found")))?;
    let progress = state.downloader.progress(info_hash)?;
    Ok(Json(ProgressResponse { progress }))
}
