//! Torrent client abstraction.
//!
//! This module provides a `TorrentClient` trait covering the narrow
//! surface the retention engine needs: login, listing, server status,
//! deletions, and force-start.

mod qbittorrent;
mod types;

pub use qbittorrent::QBittorrentClient;
pub use types::*;
