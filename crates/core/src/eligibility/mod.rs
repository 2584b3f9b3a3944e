//! Eligibility filter: combines a torrent, its category rule, and its
//! ledger-derived accrual rate into a removal-eligible verdict.

use std::collections::HashMap;

use tracing::debug;

use crate::client::TorrentRecord;
use crate::rules::{CategoryRule, RuleCatalog};

/// A removal-eligible torrent together with its accrual rate, the value
/// both resolvers sort on.
#[derive(Debug, Clone)]
pub struct EligibleTorrent {
    pub torrent: TorrentRecord,
    /// Bonus-adjusted ratio gain in ratio per week.
    pub accrual_rate: f64,
}

/// Select the torrents that have earned removal under their category's
/// rule. `rates` maps info hash to the accrual rate computed during the
/// ledger update; a missing entry counts as no history (rate 0).
///
/// A torrent whose category has no rule entry is never eligible.
pub fn filter_eligible(
    torrents: &[TorrentRecord],
    rules: &RuleCatalog,
    rates: &HashMap<String, f64>,
) -> Vec<EligibleTorrent> {
    let mut eligible = Vec::new();

    for torrent in torrents {
        let Some(rule) = rules.lookup(&torrent.category) else {
            debug!("No rules for category: {}", torrent.category_key());
            continue;
        };

        let rate = rates.get(&torrent.hash).copied().unwrap_or(0.0);
        if satisfies(torrent, rule, rate) {
            debug!(
                "Torrent {} eligible for removal: category: {}, seed time: {}, rate: {:.3} R/W, tracker: {}",
                torrent.name,
                torrent.category_key(),
                torrent.seeding_time_secs,
                rate,
                torrent.tracker
            );
            eligible.push(EligibleTorrent {
                torrent: torrent.clone(),
                accrual_rate: rate,
            });
        }
    }

    eligible
}

/// All configured thresholds must hold; unconfigured checks are
/// vacuously true.
fn satisfies(torrent: &TorrentRecord, rule: &CategoryRule, accrual_rate: f64) -> bool {
    if let Some(min_seed_time) = rule.min_seed_time {
        if torrent.seeding_time_secs < min_seed_time {
            return false;
        }
    }

    if let Some(min_ratio) = rule.min_ratio {
        if accrual_rate < min_ratio {
            return false;
        }
    }

    if let Some(min_popularity) = rule.min_popularity {
        match torrent.popularity {
            Some(popularity) if popularity >= min_popularity => {}
            _ => return false,
        }
    }

    if let Some(allowed) = &rule.allowed_trackers {
        let tracker = torrent.tracker.to_lowercase();
        if !allowed
            .iter()
            .any(|entry| tracker.contains(&entry.to_lowercase()))
        {
            return false;
        }
    }

    true
}
