//! Ledger entry types.

use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum LedgerError {
    #[error("Failed to serialize ledger: {0}")]
    Serialize(#[from] serde_json::Error),

    #[error("Failed to write ledger to {path}: {source}")]
    Write {
        path: String,
        source: std::io::Error,
    },
}

/// Persisted accrual baseline for one torrent identity.
///
/// Invariant: `last_update >= first_seen`. A reported ratio below
/// `baseline_ratio` marks the entry stale (the torrent was re-added or
/// reset on the client side) and the entry is reinitialized.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize, Serialize)]
pub struct LedgerEntry {
    /// Epoch seconds of the first observation.
    pub first_seen: i64,
    /// Ratio at first observation; rate is measured against this.
    pub baseline_ratio: f64,
    /// Uploaded bytes at first observation.
    pub baseline_uploaded: u64,
    /// Epoch seconds of the most recent observation.
    pub last_update: i64,
}

impl LedgerEntry {
    /// Fresh entry for a torrent observed now.
    pub fn new(now: i64, ratio: f64, uploaded: u64) -> Self {
        Self {
            first_seen: now,
            baseline_ratio: ratio,
            baseline_uploaded: uploaded,
            last_update: now,
        }
    }
}
