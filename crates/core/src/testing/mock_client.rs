//! Mock torrent client for testing.

use std::collections::HashSet;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::client::{ClientError, ClientStatus, TorrentClient, TorrentRecord};

/// Mock implementation of the TorrentClient trait.
///
/// Provides controllable behavior for engine and executor tests:
/// - Pre-populate torrents and the reported free space
/// - Record delete and force-start calls for assertions
/// - Simulate expired sessions and per-hash delete failures
#[derive(Debug, Default)]
pub struct MockTorrentClient {
    torrents: Arc<RwLock<Vec<TorrentRecord>>>,
    free_space_bytes: Arc<RwLock<u64>>,
    /// Recorded (hash, delete_files) pairs for successful deletes.
    deleted: Arc<RwLock<Vec<(String, bool)>>>,
    /// Recorded force-started hashes.
    forced: Arc<RwLock<Vec<String>>>,
    login_count: Arc<RwLock<u32>>,
    /// When true, list/status calls fail with SessionExpired until the
    /// next successful login.
    session_expired: Arc<RwLock<bool>>,
    /// When true, login attempts fail.
    fail_login: Arc<RwLock<bool>>,
    /// Hashes whose delete calls fail.
    fail_deletes: Arc<RwLock<HashSet<String>>>,
}

impl MockTorrentClient {
    pub fn new() -> Self {
        Self::default()
    }

    /// Pre-populate a torrent.
    pub async fn add_torrent(&self, record: TorrentRecord) {
        self.torrents.write().await.push(record);
    }

    /// Set the free space the status call reports.
    pub async fn set_free_space_gb(&self, gb: f64) {
        *self.free_space_bytes.write().await = (gb * crate::BYTES_PER_GB) as u64;
    }

    /// Invalidate the session; calls fail until the next login.
    pub async fn expire_session(&self) {
        *self.session_expired.write().await = true;
    }

    /// Make all login attempts fail.
    pub async fn fail_logins(&self) {
        *self.fail_login.write().await = true;
    }

    /// Make delete calls for `hash` fail.
    pub async fn fail_delete(&self, hash: &str) {
        self.fail_deletes.write().await.insert(hash.to_string());
    }

    /// Successful delete calls, in order.
    pub async fn deleted(&self) -> Vec<(String, bool)> {
        self.deleted.read().await.clone()
    }

    /// Force-started hashes, in order.
    pub async fn forced(&self) -> Vec<String> {
        self.forced.read().await.clone()
    }

    /// Number of login calls made.
    pub async fn login_count(&self) -> u32 {
        *self.login_count.read().await
    }

    async fn check_session(&self) -> Result<(), ClientError> {
        if *self.session_expired.read().await {
            Err(ClientError::SessionExpired)
        } else {
            Ok(())
        }
    }
}

#[async_trait]
impl TorrentClient for MockTorrentClient {
    fn name(&self) -> &str {
        "mock"
    }

    async fn login(&self) -> Result<(), ClientError> {
        *self.login_count.write().await += 1;
        if *self.fail_login.read().await {
            return Err(ClientError::AuthenticationFailed(
                "Invalid credentials".to_string(),
            ));
        }
        *self.session_expired.write().await = false;
        Ok(())
    }

    async fn list_torrents(&self) -> Result<Vec<TorrentRecord>, ClientError> {
        self.check_session().await?;
        let mut torrents = self.torrents.read().await.clone();
        torrents.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(torrents)
    }

    async fn status(&self) -> Result<ClientStatus, ClientError> {
        self.check_session().await?;
        Ok(ClientStatus {
            free_space_bytes: *self.free_space_bytes.read().await,
        })
    }

    async fn delete(&self, hash: &str, delete_files: bool) -> Result<(), ClientError> {
        self.check_session().await?;
        if self.fail_deletes.read().await.contains(hash) {
            return Err(ClientError::ApiError("HTTP 500".to_string()));
        }
        self.torrents.write().await.retain(|t| t.hash != hash);
        self.deleted
            .write()
            .await
            .push((hash.to_string(), delete_files));
        Ok(())
    }

    async fn force_start(&self, hashes: &[String]) -> Result<(), ClientError> {
        self.check_session().await?;
        self.forced.write().await.extend(hashes.iter().cloned());
        Ok(())
    }
}
