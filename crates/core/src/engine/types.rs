//! Engine run types.

use thiserror::Error;

use crate::client::ClientError;
use crate::executor::RemovalReport;
use crate::ledger::LedgerError;

#[derive(Debug, Error)]
pub enum EngineError {
    #[error("Torrent client error: {0}")]
    Client(#[from] ClientError),

    #[error("Ledger error: {0}")]
    Ledger(#[from] LedgerError),

    #[error("Failed to probe free space on {path}: {source}")]
    FreeSpaceProbe {
        path: String,
        source: std::io::Error,
    },
}

/// Phases of one cleanup run, advanced strictly in order. A run aborts
/// before `Executed` on an unrecoverable authentication failure, leaving
/// the ledger as written during `LedgerUpdated`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum RunPhase {
    Idle,
    RulesLoaded,
    LedgerUpdated,
    EligibilityComputed,
    SpaceResolved,
    CountResolved,
    Executed,
    Reported,
}

impl RunPhase {
    pub fn as_str(&self) -> &'static str {
        match self {
            RunPhase::Idle => "idle",
            RunPhase::RulesLoaded => "rules_loaded",
            RunPhase::LedgerUpdated => "ledger_updated",
            RunPhase::EligibilityComputed => "eligibility_computed",
            RunPhase::SpaceResolved => "space_resolved",
            RunPhase::CountResolved => "count_resolved",
            RunPhase::Executed => "executed",
            RunPhase::Reported => "reported",
        }
    }
}

/// Summary of one cleanup run.
#[derive(Debug)]
pub struct CleanupSummary {
    /// Free space used for the deficit computation, in GB.
    pub free_gb: f64,
    /// Size still to be downloaded by active downloads, in GB.
    pub remaining_download_gb: f64,
    /// Deficit the space resolver was asked to cover, in GB.
    pub deficit_gb: f64,
    /// Eligible torrents after the filter.
    pub eligible_count: usize,
    /// Size freed (or to be freed) by the space resolver, in GB.
    pub space_freed_gb: f64,
    /// Executed removal decisions, space-driven then count-driven.
    pub report: RemovalReport,
}

/// Summary of one force-seed run.
#[derive(Debug)]
pub struct ForceSeedSummary {
    /// Hashes selected for force-start.
    pub hashes: Vec<String>,
    pub dry_run: bool,
}
