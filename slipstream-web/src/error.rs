//! Mapping of core errors onto HTTP responses.

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::json;
use slipstream_core::{FileError, TorrentError};

/// An error ready to be returned from a handler.
///
/// Serializes as `{"message": ...}` with the mapped status code, matching
/// the error body shape of every endpoint.
#[derive(Debug)]
pub struct ApiError {
    pub status: StatusCode,
    pub message: String,
}

impl ApiError {
    pub fn not_found(message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::NOT_FOUND,
            message: message.into(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        if self.status.is_server_error() {
            tracing::error!("Request failed: {} {}", self.status, self.message);
        }
        (self.status, Json(json!({ "message": self.message }))).into_response()
    }
}

impl From<TorrentError> for ApiError {
    fn from(error: TorrentError) -> Self {
        let status = match &error {
            TorrentError::InvalidMagnet { .. }
            | TorrentError::InvalidInfoHash { .. }
            | TorrentError::UsernameRequired => StatusCode::BAD_REQUEST,
            TorrentError::NotReady { .. } => StatusCode::SERVICE_UNAVAILABLE,
            TorrentError::DownloadNotFound { .. } => StatusCode::NOT_FOUND,
            TorrentError::Timeout { .. } => StatusCode::GATEWAY_TIMEOUT,
            TorrentError::Engine { .. }
            | TorrentError::EngineShutdown
            | TorrentError::Io(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };
        Self {
            status,
            message: error.to_string(),
        }
    }
}

impl From<FileError> for ApiError {
    fn from(error: FileError) -> Self {
        let status = match &error {
            FileError::NotFound { .. } => StatusCode::NOT_FOUND,
            FileError::Io(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };
        Self {
            status,
            message: error.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_torrent_error_status_mapping() {
        let cases = [
            (
                TorrentError::InvalidMagnet {
                    reason: "missing magnet prefix".to_string(),
                },
                StatusCode::BAD_REQUEST,
            ),
            (TorrentError::UsernameRequired, StatusCode::BAD_REQUEST),
            (
                TorrentError::NotReady {
                    reason: "construction failed".to_string(),
                },
                StatusCode::SERVICE_UNAVAILABLE,
            ),
            (
                TorrentError::Timeout {
                    timeout: std::time::Duration::from_secs(1),
                },
                StatusCode::GATEWAY_TIMEOUT,
            ),
            (
                TorrentError::Engine {
                    message: "no peers".to_string(),
                },
                StatusCode::INTERNAL_SERVER_ERROR,
            ),
        ];

        for (error, expected) in cases {
            assert_eq!(ApiError::from(error).status, expected);
        }
    }

    #[test]
    fn test_file_not_found_maps_to_404() {
        let error = FileError::NotFound {
            path: "missing.bin".into(),
        };
        assert_eq!(ApiError::from(error).status, StatusCode::NOT_FOUND);
    }
}
