use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::PathBuf;

use crate::rules::{BonusCatalog, BonusRule, CategoryRule, RuleCatalog};

/// Root configuration. Required keys missing at load time fail fast,
/// before any network or ledger access.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Config {
    pub login: LoginConfig,
    pub cleanup: CleanupConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
    /// Per-category retention rules: `[category.<name>]` tables.
    #[serde(default)]
    pub category: HashMap<String, CategoryRule>,
    /// Ratio-bonus modifiers: `[[bonus]]` entries, applied in order.
    #[serde(default)]
    pub bonus: Vec<BonusRule>,
}

/// Client connection configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct LoginConfig {
    /// Base URL of the qBittorrent Web API, e.g. "http://localhost:8080".
    pub address: String,
    pub username: String,
    pub password: String,
    /// Request timeout in seconds (default: 30).
    #[serde(default = "default_timeout")]
    pub timeout_secs: u32,
}

fn default_timeout() -> u32 {
    30
}

/// Cleanup run configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct CleanupConfig {
    /// Categories considered by the space deficit resolver.
    #[serde(default)]
    pub categories_to_check_for_space: Vec<String>,
    /// Categories considered by the count cap resolver.
    #[serde(default)]
    pub categories_to_check_for_number: Vec<String>,
    /// Required free space on disk in GB.
    pub min_space_gb: f64,
    /// Required free space after active downloads complete, in GB.
    #[serde(default)]
    pub download_minspace_gb: Option<f64>,
    /// When set, free space is probed on this local path instead of
    /// trusting the client-reported value.
    #[serde(default)]
    pub drive_path: Option<PathBuf>,
    /// Count cap applied per category by the count resolver.
    pub max_torrents_for_categories: usize,
    /// Order count-cap removals by size instead of accrual rate.
    #[serde(default)]
    pub sort_count_removal_by_size: bool,
    /// Categories eligible for the force-seed run.
    #[serde(default)]
    pub categories_to_force_seed: Vec<String>,
    /// Name keywords selecting torrents for the force-seed run.
    #[serde(default)]
    pub trackers_to_force_seed: Vec<String>,
}

/// Logging configuration.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct LoggingConfig {
    /// Directory for the removal log and the ratio ledger. Defaults to
    /// the working directory.
    #[serde(default)]
    pub location: Option<PathBuf>,
    /// Enable debug-level diagnostics.
    #[serde(default)]
    pub debug: bool,
}

impl Config {
    /// Build the immutable rule catalog (lowercased category keys).
    pub fn rule_catalog(&self) -> RuleCatalog {
        RuleCatalog::new(self.category.clone())
    }

    /// Build the ordered bonus catalog.
    pub fn bonus_catalog(&self) -> BonusCatalog {
        BonusCatalog::new(self.bonus.clone())
    }

    /// Directory holding the removal log and ratio ledger.
    pub fn data_dir(&self) -> PathBuf {
        self.logging
            .location
            .clone()
            .unwrap_or_else(|| PathBuf::from("."))
    }

    /// Path of the persisted ratio ledger.
    pub fn ledger_path(&self) -> PathBuf {
        self.data_dir().join("ratio_ledger.json")
    }

    /// Lowercase the category lists once so all downstream lookups are
    /// plain equality.
    pub(crate) fn normalize(&mut self) {
        for list in [
            &mut self.cleanup.categories_to_check_for_space,
            &mut self.cleanup.categories_to_check_for_number,
            &mut self.cleanup.categories_to_force_seed,
        ] {
            for entry in list.iter_mut() {
                *entry = entry.trim().to_lowercase();
            }
        }
    }
}
