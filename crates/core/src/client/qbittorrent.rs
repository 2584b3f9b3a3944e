//! qBittorrent Web API v2 client implementation.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use tracing::debug;

use crate::config::LoginConfig;

use super::{ClientError, ClientStatus, TorrentClient, TorrentRecord, TorrentState};

/// qBittorrent considers ETAs at or above this value unknown.
const QB_ETA_INFINITY: i64 = 8_640_000;

/// qBittorrent client implementation.
///
/// Holds no explicit session token; the cookie jar carries the SID cookie
/// set by `login`. A 401/403 on any call surfaces as
/// [`ClientError::SessionExpired`] so the caller decides whether to
/// re-login and retry (see [`crate::retry`]).
pub struct QBittorrentClient {
    client: Client,
    config: LoginConfig,
}

impl QBittorrentClient {
    /// Create a new qBittorrent client.
    pub fn new(config: LoginConfig) -> Result<Self, ClientError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs as u64))
            .cookie_store(true)
            .build()
            .map_err(|e| ClientError::ConnectionFailed(e.to_string()))?;

        Ok(Self { client, config })
    }

    /// Get the base URL without trailing slash.
    fn base_url(&self) -> &str {
        self.config.address.trim_end_matches('/')
    }

    fn map_send_error(e: reqwest::Error) -> ClientError {
        if e.is_timeout() {
            ClientError::Timeout
        } else if e.is_connect() {
            ClientError::ConnectionFailed(e.to_string())
        } else {
            ClientError::ApiError(e.to_string())
        }
    }

    /// Make a GET request against the current session.
    async fn get(&self, endpoint: &str) -> Result<String, ClientError> {
        let url = format!("{}{}", self.base_url(), endpoint);
        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(Self::map_send_error)?;

        let status = response.status();
        if status.as_u16() == 401 || status.as_u16() == 403 {
            return Err(ClientError::SessionExpired);
        }
        if !status.is_success() {
            return Err(ClientError::ApiError(format!("HTTP {}", status)));
        }

        response
            .text()
            .await
            .map_err(|e| ClientError::ApiError(e.to_string()))
    }

    /// Make a POST request with form data against the current session.
    async fn post_form(
        &self,
        endpoint: &str,
        params: &[(&str, &str)],
    ) -> Result<String, ClientError> {
        let url = format!("{}{}", self.base_url(), endpoint);
        let response = self
            .client
            .post(&url)
            .form(params)
            .send()
            .await
            .map_err(Self::map_send_error)?;

        let status = response.status();
        if status.as_u16() == 401 || status.as_u16() == 403 {
            return Err(ClientError::SessionExpired);
        }
        if !status.is_success() {
            return Err(ClientError::ApiError(format!("HTTP {}", status)));
        }

        response
            .text()
            .await
            .map_err(|e| ClientError::ApiError(e.to_string()))
    }
}

/// qBittorrent torrent info response.
#[derive(Debug, Deserialize)]
struct QbTorrentInfo {
    hash: String,
    name: String,
    state: String,
    progress: f64,
    size: i64,
    uploaded: i64,
    ratio: f64,
    eta: i64,
    #[serde(default)]
    seeding_time: i64,
    #[serde(default)]
    popularity: Option<f64>,
    #[serde(default)]
    category: String,
    #[serde(default)]
    tracker: String,
}

impl QbTorrentInfo {
    fn into_record(self) -> TorrentRecord {
        let state = parse_qb_state(&self.state);
        TorrentRecord {
            hash: self.hash.to_lowercase(),
            name: self.name,
            category: self.category,
            state,
            progress: self.progress,
            size_bytes: self.size.max(0) as u64,
            uploaded_bytes: self.uploaded.max(0) as u64,
            seeding_time_secs: self.seeding_time.max(0) as u64,
            ratio: self.ratio.max(0.0),
            popularity: self.popularity.filter(|p| *p >= 0.0),
            eta_secs: parse_qb_eta(self.eta, self.progress),
            tracker: self.tracker,
        }
    }
}

/// Parse qBittorrent state string to TorrentState.
fn parse_qb_state(state: &str) -> TorrentState {
    match state {
        "downloading" | "forcedDL" | "metaDL" | "allocating" => TorrentState::Downloading,
        "uploading" | "forcedUP" => TorrentState::Seeding,
        "pausedDL" | "pausedUP" | "stoppedDL" | "stoppedUP" => TorrentState::Paused,
        "checkingDL" | "checkingUP" | "checkingResumeData" | "moving" => TorrentState::Checking,
        "queuedDL" | "queuedUP" => TorrentState::Queued,
        "stalledDL" | "stalledUP" => TorrentState::Stalled,
        "error" | "missingFiles" => TorrentState::Error,
        _ => TorrentState::Unknown,
    }
}

/// Map a reported ETA onto the record convention: Some(0) = complete,
/// None = unknown.
fn parse_qb_eta(eta: i64, progress: f64) -> Option<u64> {
    if progress >= 1.0 {
        Some(0)
    } else if eta < 0 || eta >= QB_ETA_INFINITY {
        None
    } else {
        Some(eta as u64)
    }
}

/// Relevant slice of the `/sync/maindata` response.
#[derive(Debug, Deserialize)]
struct QbMainData {
    #[serde(default)]
    server_state: QbServerState,
}

#[derive(Debug, Default, Deserialize)]
struct QbServerState {
    #[serde(default)]
    free_space_on_disk: i64,
}

#[async_trait]
impl TorrentClient for QBittorrentClient {
    fn name(&self) -> &str {
        "qbittorrent"
    }

    async fn login(&self) -> Result<(), ClientError> {
        let url = format!("{}/api/v2/auth/login", self.base_url());

        let params = [
            ("username", self.config.username.as_str()),
            ("password", self.config.password.as_str()),
        ];

        let response = self
            .client
            .post(&url)
            .form(&params)
            .send()
            .await
            .map_err(Self::map_send_error)?;

        let status = response.status();
        let body = response.text().await.unwrap_or_default();

        if body.contains("Ok.") {
            debug!("qBittorrent login successful");
            Ok(())
        } else if body.contains("Fails.") || status.as_u16() == 403 {
            Err(ClientError::AuthenticationFailed(
                "Invalid credentials".to_string(),
            ))
        } else {
            Err(ClientError::AuthenticationFailed(format!(
                "Unexpected response: {}",
                body.chars().take(100).collect::<String>()
            )))
        }
    }

    async fn list_torrents(&self) -> Result<Vec<TorrentRecord>, ClientError> {
        let response = self.get("/api/v2/torrents/info").await?;
        let torrents: Vec<QbTorrentInfo> = serde_json::from_str(&response)
            .map_err(|e| ClientError::ApiError(format!("Failed to parse response: {}", e)))?;

        Ok(torrents.into_iter().map(|t| t.into_record()).collect())
    }

    async fn status(&self) -> Result<ClientStatus, ClientError> {
        let response = self.get("/api/v2/sync/maindata").await?;
        let data: QbMainData = serde_json::from_str(&response)
            .map_err(|e| ClientError::ApiError(format!("Failed to parse response: {}", e)))?;

        Ok(ClientStatus {
            free_space_bytes: data.server_state.free_space_on_disk.max(0) as u64,
        })
    }

    async fn delete(&self, hash: &str, delete_files: bool) -> Result<(), ClientError> {
        let hash_lower = hash.to_lowercase();
        let delete_str = if delete_files { "true" } else { "false" };

        self.post_form(
            "/api/v2/torrents/delete",
            &[("hashes", &hash_lower), ("deleteFiles", delete_str)],
        )
        .await?;

        Ok(())
    }

    async fn force_start(&self, hashes: &[String]) -> Result<(), ClientError> {
        if hashes.is_empty() {
            return Ok(());
        }
        let joined = hashes.join("|").to_lowercase();

        self.post_form(
            "/api/v2/torrents/setForceStart",
            &[("hashes", &joined), ("value", "true")],
        )
        .await?;

        Ok(())
    }
}
