//! Slipstream Core - torrent download orchestration and file delivery
//!
//! This crate provides the building blocks behind the Slipstream HTTP API:
//! magnet validation, the torrent engine seam and its adapter, the live
//! download registry, the download orchestrator, and the range-aware file
//! service that streams completed downloads back to clients.

pub mod config;
pub mod files;
pub mod torrent;
pub mod tracing_setup;

// Re-export main types for convenient access
pub use config::Config;
pub use files::{FileError, FileInfo, FileService, FsEntry};
pub use torrent::{
    DownloadOutcome, DownloadRegistry, Downloader, EngineAdapter, InfoHash, TorrentEngine,
    TorrentError,
};
