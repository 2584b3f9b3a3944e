//! Rule and bonus catalog types.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::client::TorrentRecord;

/// Retention thresholds for one category.
///
/// Every configured threshold must hold for a torrent to be
/// removal-eligible; absent thresholds are not checked.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct CategoryRule {
    /// Minimum seeding time in seconds.
    #[serde(default)]
    pub min_seed_time: Option<u64>,
    /// Minimum accrual rate (ratio per week) the torrent must have reached.
    #[serde(default)]
    pub min_ratio: Option<f64>,
    /// Minimum swarm popularity.
    #[serde(default)]
    pub min_popularity: Option<f64>,
    /// Allow-list of tracker substrings. When set, the torrent's tracker
    /// must match one entry.
    #[serde(default)]
    pub allowed_trackers: Option<Vec<String>>,
}

/// Immutable catalog of per-category rules, keyed case-insensitively.
#[derive(Debug, Clone, Default)]
pub struct RuleCatalog {
    rules: HashMap<String, CategoryRule>,
}

impl RuleCatalog {
    /// Build a catalog from configured rules. Keys are lowercased once
    /// here so lookups stay case-insensitive.
    pub fn new(rules: HashMap<String, CategoryRule>) -> Self {
        Self {
            rules: rules
                .into_iter()
                .map(|(k, v)| (k.to_lowercase(), v))
                .collect(),
        }
    }

    /// Look up the rule for a category. A category with no rule entry
    /// never yields removal candidates.
    pub fn lookup(&self, category: &str) -> Option<&CategoryRule> {
        self.rules.get(&category.to_lowercase())
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }
}

/// How a bonus value is applied to the ratio.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum BonusMode {
    #[default]
    Add,
    Multiply,
}

/// A ratio-bonus modifier matched against tracker or category.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct BonusRule {
    /// Matched as a case-insensitive substring of the tracker URL, or as
    /// a case-insensitive equality on the category.
    pub pattern: String,
    /// Bonus value.
    pub value: f64,
    /// Additive or multiplicative application.
    #[serde(default)]
    pub mode: BonusMode,
}

impl BonusRule {
    /// Whether this bonus applies to the given torrent.
    pub fn matches(&self, torrent: &TorrentRecord) -> bool {
        let pattern = self.pattern.to_lowercase();
        torrent.tracker.to_lowercase().contains(&pattern)
            || torrent.category.to_lowercase() == pattern
    }

    fn apply(&self, ratio: f64) -> f64 {
        match self.mode {
            BonusMode::Add => ratio + self.value,
            BonusMode::Multiply => ratio * self.value,
        }
    }
}

/// Ordered catalog of bonus rules. All matching rules apply, in catalog
/// order.
#[derive(Debug, Clone, Default)]
pub struct BonusCatalog {
    rules: Vec<BonusRule>,
}

impl BonusCatalog {
    pub fn new(rules: Vec<BonusRule>) -> Self {
        Self { rules }
    }

    /// Apply every matching bonus to the given ratio.
    pub fn adjust(&self, ratio: f64, torrent: &TorrentRecord) -> f64 {
        self.rules
            .iter()
            .filter(|r| r.matches(torrent))
            .fold(ratio, |acc, r| r.apply(acc))
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }
}
