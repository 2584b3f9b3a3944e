//! Types for torrent client operations.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors that can occur during torrent client operations.
#[derive(Debug, Error)]
pub enum ClientError {
    #[error("Connection failed: {0}")]
    ConnectionFailed(String),

    #[error("Authentication failed: {0}")]
    AuthenticationFailed(String),

    #[error("Session expired or unauthorized")]
    SessionExpired,

    #[error("API error: {0}")]
    ApiError(String),

    #[error("Request timeout")]
    Timeout,
}

impl ClientError {
    /// True for failures that a fresh login can recover from.
    pub fn is_auth(&self) -> bool {
        matches!(
            self,
            ClientError::SessionExpired | ClientError::AuthenticationFailed(_)
        )
    }
}

/// State of a torrent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TorrentState {
    /// Downloading from peers.
    Downloading,
    /// Seeding to peers.
    Seeding,
    /// Download or upload is paused.
    Paused,
    /// Checking file integrity.
    Checking,
    /// Queued for download.
    Queued,
    /// Stalled (no peers).
    Stalled,
    /// Error state.
    Error,
    /// Unknown state.
    Unknown,
}

impl TorrentState {
    /// Returns the string representation for log lines.
    pub fn as_str(&self) -> &'static str {
        match self {
            TorrentState::Downloading => "downloading",
            TorrentState::Seeding => "seeding",
            TorrentState::Paused => "paused",
            TorrentState::Checking => "checking",
            TorrentState::Queued => "queued",
            TorrentState::Stalled => "stalled",
            TorrentState::Error => "error",
            TorrentState::Unknown => "unknown",
        }
    }
}

/// Client-reported summary of a torrent, fetched fresh on every run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TorrentRecord {
    /// Info hash (lowercase hex). Stable identity across runs.
    pub hash: String,
    /// Torrent name.
    pub name: String,
    /// Category/label (empty when uncategorized).
    pub category: String,
    /// Current state.
    pub state: TorrentState,
    /// Download progress (0.0 - 1.0).
    pub progress: f64,
    /// Total size in bytes.
    pub size_bytes: u64,
    /// Uploaded bytes.
    pub uploaded_bytes: u64,
    /// Cumulative seeding time in seconds.
    pub seeding_time_secs: u64,
    /// Ratio (uploaded/downloaded).
    pub ratio: f64,
    /// Swarm popularity, when the client reports it.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub popularity: Option<f64>,
    /// ETA in seconds (Some(0) = complete, None = unknown).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub eta_secs: Option<u64>,
    /// Primary tracker URL (may be empty).
    pub tracker: String,
}

impl TorrentRecord {
    /// Lowercased category, the key used by rule and resolver lookups.
    pub fn category_key(&self) -> String {
        self.category.to_lowercase()
    }

    /// Total size in GB.
    pub fn size_gb(&self) -> f64 {
        self.size_bytes as f64 / crate::BYTES_PER_GB
    }

    /// Size still to download, in bytes.
    pub fn remaining_bytes(&self) -> f64 {
        self.size_bytes as f64 * (1.0 - self.progress).max(0.0)
    }
}

/// Server-side status reported by the client.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct ClientStatus {
    /// Free space on the client's download disk, in bytes.
    pub free_space_bytes: u64,
}

impl ClientStatus {
    /// Free space in GB.
    pub fn free_space_gb(&self) -> f64 {
        self.free_space_bytes as f64 / crate::BYTES_PER_GB
    }
}

/// Trait for torrent client backends.
#[async_trait]
pub trait TorrentClient: Send + Sync {
    /// Backend name for logging.
    fn name(&self) -> &str;

    /// Establish (or re-establish) a session with the client.
    async fn login(&self) -> Result<(), ClientError>;

    /// List all torrents known to the client.
    async fn list_torrents(&self) -> Result<Vec<TorrentRecord>, ClientError>;

    /// Fetch server-side status (free disk space).
    async fn status(&self) -> Result<ClientStatus, ClientError>;

    /// Delete a torrent. If `delete_files` is true, also delete its data.
    async fn delete(&self, hash: &str, delete_files: bool) -> Result<(), ClientError>;

    /// Force-start the given torrents (skip queueing and share limits).
    async fn force_start(&self, hashes: &[String]) -> Result<(), ClientError>;
}
