//! File listing and range-aware delivery of completed downloads.

pub mod service;

use std::path::PathBuf;

use serde::Serialize;

pub use service::FileService;

/// Errors from the file delivery path.
#[derive(Debug, thiserror::Error)]
pub enum FileError {
    #[error("File not found: {path}")]
    NotFound { path: PathBuf },

    #[error("I/O error")]
    Io(#[from] std::io::Error),
}

/// Per-request file metadata for the serving path.
///
/// Computed on demand and never cached; the size reflects the filesystem
/// object at read time.
#[derive(Debug, Clone)]
pub struct FileInfo {
    pub mime_type: String,
    pub size: u64,
}

/// Kind of a scanned directory entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum EntryKind {
    File,
    Directory,
}

/// One node in a user's file tree.
///
/// Paths are relative to the download root and are exactly what the
/// stream/view endpoints accept.
#[derive(Debug, Clone, Serialize)]
pub struct FsEntry {
    pub name: String,
    #[serde(rename = "type")]
    pub kind: EntryKind,
    pub size: u64,
    pub path: PathBuf,
    #[serde(rename = "mimeType", skip_serializing_if = "Option::is_none")]
    pub mime_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub children: Option<Vec<FsEntry>>,
}
