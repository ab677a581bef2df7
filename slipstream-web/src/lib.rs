//! Slipstream Web - JSON API server
//!
//! Exposes the download orchestration and file delivery core over HTTP:
//! torrent submission and progress polling under `/api/torrents`, file
//! listing and byte-range streaming under `/api/files`.

pub mod error;
pub mod handlers;
pub mod server;

pub use server::{AppState, build_router, run_server};
