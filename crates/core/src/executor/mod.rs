//! Removal executor.
//!
//! Applies (or, in dry-run, merely records) the removal decisions made
//! by the resolvers. A failure on one torrent never aborts the rest of
//! the batch, and a failed delete is never retried within the run.

mod report;

pub use report::format_line;

use tracing::{debug, error, info};

use crate::client::TorrentClient;
use crate::eligibility::EligibleTorrent;

/// Per-torrent outcome of the executor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RemovalOutcome {
    /// Dry-run: decision recorded, no deletion call issued.
    DryRun,
    /// Deletion call succeeded.
    Removed,
    /// Deletion call failed; the batch continued.
    Failed(String),
}

/// Everything the report needs about one removed torrent.
#[derive(Debug, Clone)]
pub struct RemovalEntry {
    pub hash: String,
    pub name: String,
    pub category: String,
    pub size_gb: f64,
    pub seeding_time_secs: u64,
    pub accrual_rate: f64,
    pub popularity: Option<f64>,
    pub eta_secs: Option<u64>,
    pub tracker: String,
    pub outcome: RemovalOutcome,
}

impl RemovalEntry {
    fn from_eligible(eligible: &EligibleTorrent, outcome: RemovalOutcome) -> Self {
        let t = &eligible.torrent;
        Self {
            hash: t.hash.clone(),
            name: t.name.clone(),
            category: t.category.clone(),
            size_gb: t.size_gb(),
            seeding_time_secs: t.seeding_time_secs,
            accrual_rate: eligible.accrual_rate,
            popularity: t.popularity,
            eta_secs: t.eta_secs,
            tracker: t.tracker.clone(),
            outcome,
        }
    }

    /// Fixed-width report line for this entry.
    pub fn format(&self) -> String {
        format_line(self)
    }
}

/// Report over one executed removal batch.
#[derive(Debug, Clone, Default)]
pub struct RemovalReport {
    pub dry_run: bool,
    pub entries: Vec<RemovalEntry>,
}

impl RemovalReport {
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Cumulative size of all decided removals in GB.
    pub fn total_size_gb(&self) -> f64 {
        self.entries.iter().map(|e| e.size_gb).sum()
    }

    pub fn removed_count(&self) -> usize {
        self.entries
            .iter()
            .filter(|e| e.outcome == RemovalOutcome::Removed)
            .count()
    }

    pub fn failed_count(&self) -> usize {
        self.entries
            .iter()
            .filter(|e| matches!(e.outcome, RemovalOutcome::Failed(_)))
            .count()
    }
}

/// Execute the removal decisions. Dry-run and live mode walk the same
/// list so both record identical decisions; only live mode issues
/// deletion calls (with the torrent's files).
pub async fn execute(
    client: &dyn TorrentClient,
    removals: &[EligibleTorrent],
    dry_run: bool,
) -> RemovalReport {
    let mut entries = Vec::with_capacity(removals.len());

    for eligible in removals {
        let torrent = &eligible.torrent;
        let outcome = if dry_run {
            info!(
                "Test mode enabled, would remove: {} ({})",
                torrent.name, torrent.hash
            );
            RemovalOutcome::DryRun
        } else {
            match client.delete(&torrent.hash, true).await {
                Ok(()) => {
                    debug!("Torrent {} successfully removed", torrent.hash);
                    RemovalOutcome::Removed
                }
                Err(e) => {
                    error!("Failed to remove torrent {}: {}", torrent.hash, e);
                    RemovalOutcome::Failed(e.to_string())
                }
            }
        };
        entries.push(RemovalEntry::from_eligible(eligible, outcome));
    }

    RemovalReport { dry_run, entries }
}
