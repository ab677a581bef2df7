//! HTTP request handlers.

pub mod files;
pub mod range;
pub mod torrents;

pub use files::{list_files, stream_file, view_file};
pub use torrents::{download_progress, download_torrent};
