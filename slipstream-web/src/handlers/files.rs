//! File listing, byte-range streaming, and inline viewing endpoints.

use axum::Json;
use axum::body::Body;
use axum::extract::{Path, State};
use axum::http::{HeaderMap, StatusCode, header};
use axum::response::{IntoResponse, Response};
use serde_json::json;
use slipstream_core::files::FileInfo;

use crate::error::ApiError;
use crate::handlers::range::{RangeSpec, parse_range_header, resolve_range};
use crate::server::AppState;

/// `GET /api/files/list/{username}` - the user's download tree.
///
/// A user with no download directory gets an empty list, not an error.
pub async fn list_files(
    State(state): State<AppState>,
    Path(username): Path<String>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let files = state.files.list_user_files(&username).await?;
    Ok(Json(json!({ "files": files })))
}

/// `GET /api/files/stream/{*path}` - range-aware streaming.
///
/// With a `Range` header responds 206 with the requested byte window;
/// without one, 200 with the whole file. Either way the body is streamed
/// lazily off disk.
pub async fn stream_file(
    State(state): State<AppState>,
    Path(path): Path<String>,
    headers: HeaderMap,
) -> Result<Response, ApiError> {
    let info = state.files.file_info(&path).await?;

    match resolve_range(parse_range_header(&headers), info.size) {
        Ok(Some(spec)) => {
            tracing::debug!(
                "Streaming {path} bytes {}-{} of {}",
                spec.start,
                spec.end,
                info.size
            );
            let stream = state.files.open_stream(&path, spec.start, spec.length).await?;
            Ok(partial_response(&info, spec, Body::from_stream(stream)))
        }
        Ok(None) => {
            tracing::debug!("Streaming {path} in full ({} bytes)", info.size);
            let stream = state.files.open_stream(&path, 0, info.size).await?;
            Ok(full_response(&info, Body::from_stream(stream)))
        }
        Err(_) => Ok(unsatisfiable_response(info.size)),
    }
}

/// `GET /api/files/view/{*path}` - always the whole file.
///
/// Used for inline viewing where the client never seeks.
pub async fn view_file(
    State(state): State<AppState>,
    Path(path): Path<String>,
) -> Result<Response, ApiError> {
    let info = state.files.file_info(&path).await?;
    let stream = state.files.open_stream(&path, 0, info.size).await?;
    Ok(full_response(&info, Body::from_stream(stream)))
}

fn full_response(info: &FileInfo, body: Body) -> Response {
    Response::builder()
        .status(StatusCode::OK)
        .header(header::CONTENT_TYPE, info.mime_type.as_str())
        .header(header::CONTENT_LENGTH, info.size.to_string())
        .header(header::ACCEPT_RANGES, "bytes")
        .body(body)
        .unwrap_or_else(|_| StatusCode::INTERNAL_SERVER_ERROR.into_response())
}

fn partial_response(info: &FileInfo, spec: RangeSpec, body: Body) -> Response {
    Response::builder()
        .status(StatusCode::PARTIAL_CONTENT)
        .header(header::CONTENT_TYPE, info.mime_type.as_str())
        .header(header::CONTENT_LENGTH, spec.length.to_string())
        .header(
            header::CONTENT_RANGE,
            format!("bytes {}-{}/{}", spec.start, spec.end, info.size),
        )
        .header(header::ACCEPT_RANGES, "bytes")
        .body(body)
        .unwrap_or_else(|_| StatusCode::INTERNAL_SERVER_ERROR.into_response())
}

fn unsatisfiable_response(size: u64) -> Response {
    Response::builder()
        .status(StatusCode::RANGE_NOT_SATISFIABLE)
        .header(header::CONTENT_RANGE, format!("bytes */{size}"))
        .body(Body::empty())
        .unwrap_or_else(|_| StatusCode::INTERNAL_SERVER_ERROR.into_response())
}
