pub mod client;
pub mod config;
pub mod eligibility;
pub mod engine;
pub mod executor;
pub mod ledger;
pub mod logging;
pub mod resolver;
pub mod retry;
pub mod rules;
pub mod testing;

/// Accrual rates are expressed in ratio gained per week.
pub const SECONDS_PER_WEEK: u64 = 7 * 86_400;
pub const SECONDS_PER_DAY: u64 = 86_400;
pub const BYTES_PER_GB: f64 = 1024.0 * 1024.0 * 1024.0;

pub use client::{
    ClientError, ClientStatus, QBittorrentClient, TorrentClient, TorrentRecord, TorrentState,
};
pub use config::{load_config, load_config_from_str, validate_config, Config, ConfigError};
pub use eligibility::{filter_eligible, EligibleTorrent};
pub use engine::{
    compute_demand, run_cleanup, run_force_seed, CleanupSummary, EngineError, ForceSeedSummary,
    RunPhase, SpaceDemand,
};
pub use executor::{execute, RemovalEntry, RemovalOutcome, RemovalReport};
pub use ledger::{LedgerEntry, LedgerError, RatioLedger};
pub use logging::RunLog;
pub use resolver::{resolve_count, resolve_space, RemovalOrder, SpaceResolution};
pub use retry::{retry_once, RetryOutcome};
pub use rules::{BonusCatalog, BonusMode, BonusRule, CategoryRule, RuleCatalog};
