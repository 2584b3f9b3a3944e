//! Persisted ratio ledger and accrual-rate computation.

use std::collections::{BTreeMap, HashSet};
use std::fs;
use std::path::{Path, PathBuf};

use tracing::{debug, warn};

use crate::client::TorrentRecord;
use crate::rules::BonusCatalog;
use crate::SECONDS_PER_WEEK;

use super::types::{LedgerEntry, LedgerError};

/// Per-torrent accrual history, persisted as a JSON map from info hash to
/// [`LedgerEntry`].
///
/// The store is read once per run, updated in memory while rates are
/// computed, and written back with an atomic replace so a crash mid-write
/// can never leave a truncated file behind.
#[derive(Debug)]
pub struct RatioLedger {
    path: PathBuf,
    entries: BTreeMap<String, LedgerEntry>,
}

impl RatioLedger {
    /// Open the ledger at `path`. A missing or unparsable store yields an
    /// empty ledger with a logged warning; it never aborts the run.
    pub fn open(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let entries = match fs::read_to_string(&path) {
            Ok(raw) => parse_entries(&raw, &path),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                debug!("No ratio ledger at {}, starting empty", path.display());
                BTreeMap::new()
            }
            Err(e) => {
                warn!("Failed to read ratio ledger {}: {}", path.display(), e);
                BTreeMap::new()
            }
        };

        Self { path, entries }
    }

    /// Drop entries whose identity is absent from the current torrent
    /// list. Returns the number of pruned entries.
    pub fn prune(&mut self, live_hashes: &HashSet<String>) -> usize {
        let before = self.entries.len();
        self.entries.retain(|hash, _| live_hashes.contains(hash));
        let pruned = before - self.entries.len();
        if pruned > 0 {
            debug!("Pruned {} stale ledger entries", pruned);
        }
        pruned
    }

    /// Time-normalized, bonus-adjusted accrual rate in ratio per week.
    ///
    /// First observation of an identity creates its entry and returns 0.
    /// A ratio below the stored baseline reinitializes the entry (the
    /// rate never goes negative because of an external reset). Elapsed
    /// time under one second short-circuits to the raw current ratio.
    pub fn accrual_rate(
        &mut self,
        torrent: &TorrentRecord,
        bonuses: &BonusCatalog,
        now: i64,
    ) -> f64 {
        let entry = match self.entries.get_mut(&torrent.hash) {
            None => {
                self.entries.insert(
                    torrent.hash.clone(),
                    LedgerEntry::new(now, torrent.ratio, torrent.uploaded_bytes),
                );
                return 0.0;
            }
            Some(entry) => entry,
        };

        if torrent.ratio < entry.baseline_ratio {
            debug!(
                "Ratio reset for {} ({} < {}), reinitializing ledger entry",
                torrent.name, torrent.ratio, entry.baseline_ratio
            );
            *entry = LedgerEntry::new(now, torrent.ratio, torrent.uploaded_bytes);
            return 0.0;
        }

        entry.last_update = now;

        let elapsed = now - entry.first_seen;
        if elapsed < 1 {
            return torrent.ratio;
        }

        let adjusted = bonuses.adjust(torrent.ratio, torrent);
        let weeks = elapsed as f64 / SECONDS_PER_WEEK as f64;
        (adjusted - entry.baseline_ratio) / weeks
    }

    /// Persist the store. Writes a sibling temp file then renames it over
    /// the target.
    pub fn save(&self) -> Result<(), LedgerError> {
        let json = serde_json::to_string_pretty(&self.entries)?;

        let tmp = self.path.with_extension("json.tmp");
        fs::write(&tmp, &json).map_err(|source| LedgerError::Write {
            path: tmp.display().to_string(),
            source,
        })?;
        fs::rename(&tmp, &self.path).map_err(|source| LedgerError::Write {
            path: self.path.display().to_string(),
            source,
        })?;

        Ok(())
    }

    pub fn entry(&self, hash: &str) -> Option<&LedgerEntry> {
        self.entries.get(hash)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

/// Parse the persisted map, dropping individually corrupt entries rather
/// than failing the whole store.
fn parse_entries(raw: &str, path: &Path) -> BTreeMap<String, LedgerEntry> {
    let values: BTreeMap<String, serde_json::Value> = match serde_json::from_str(raw) {
        Ok(values) => values,
        Err(e) => {
            warn!(
                "Ratio ledger {} is unparsable ({}), starting empty",
                path.display(),
                e
            );
            return BTreeMap::new();
        }
    };

    let mut entries = BTreeMap::new();
    for (hash, value) in values {
        match serde_json::from_value::<LedgerEntry>(value) {
            Ok(entry) => {
                entries.insert(hash, entry);
            }
            Err(e) => {
                warn!("Dropping corrupt ledger entry for {}: {}", hash, e);
            }
        }
    }
    entries
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::TorrentState;
    use crate::rules::{BonusMode, BonusRule};
    use crate::SECONDS_PER_WEEK;
    use tempfile::TempDir;

    fn torrent(hash: &str, ratio: f64) -> TorrentRecord {
        TorrentRecord {
            hash: hash.into(),
            name: format!("torrent-{hash}"),
            category: "movies".into(),
            state: TorrentState::Seeding,
            progress: 1.0,
            size_bytes: 1024,
            uploaded_bytes: (ratio * 1024.0) as u64,
            seeding_time_secs: 0,
            ratio,
            popularity: None,
            eta_secs: Some(0),
            tracker: "https://tracker-a.example/announce".into(),
        }
    }

    fn ledger_in(dir: &TempDir) -> RatioLedger {
        RatioLedger::open(dir.path().join("ratio_ledger.json"))
    }

    #[test]
    fn test_first_observation_rate_is_zero() {
        let dir = TempDir::new().unwrap();
        let mut ledger = ledger_in(&dir);
        let rate = ledger.accrual_rate(&torrent("aaa", 1.5), &BonusCatalog::default(), 1000);
        assert_eq!(rate, 0.0);
        assert_eq!(ledger.entry("aaa").unwrap().baseline_ratio, 1.5);
    }

    #[test]
    fn test_rate_after_one_week() {
        let dir = TempDir::new().unwrap();
        let mut ledger = ledger_in(&dir);
        let bonuses = BonusCatalog::default();

        ledger.accrual_rate(&torrent("aaa", 1.0), &bonuses, 0);
        let rate = ledger.accrual_rate(&torrent("aaa", 1.5), &bonuses, SECONDS_PER_WEEK as i64);
        assert!((rate - 0.5).abs() < 1e-9);
    }

    #[test]
    fn test_rate_is_non_negative_for_non_decreasing_ratio() {
        let dir = TempDir::new().unwrap();
        let mut ledger = ledger_in(&dir);
        let bonuses = BonusCatalog::default();

        ledger.accrual_rate(&torrent("aaa", 1.0), &bonuses, 0);
        for (i, ratio) in [1.0, 1.0, 1.2, 1.7].iter().enumerate() {
            let now = (i as i64 + 1) * 86_400;
            let rate = ledger.accrual_rate(&torrent("aaa", *ratio), &bonuses, now);
            assert!(rate >= 0.0, "rate {} at step {}", rate, i);
        }
    }

    #[test]
    fn test_ratio_decrease_resets_baseline() {
        let dir = TempDir::new().unwrap();
        let mut ledger = ledger_in(&dir);
        let bonuses = BonusCatalog::default();

        ledger.accrual_rate(&torrent("aaa", 2.0), &bonuses, 0);
        // Torrent was re-added client-side; ratio fell below baseline.
        let rate = ledger.accrual_rate(&torrent("aaa", 0.1), &bonuses, 5000);
        assert_eq!(rate, 0.0);

        let entry = ledger.entry("aaa").unwrap();
        assert_eq!(entry.baseline_ratio, 0.1);
        assert_eq!(entry.first_seen, 5000);
    }

    #[test]
    fn test_sub_second_elapsed_returns_raw_ratio() {
        let dir = TempDir::new().unwrap();
        let mut ledger = ledger_in(&dir);
        let bonuses = BonusCatalog::default();

        ledger.accrual_rate(&torrent("aaa", 1.0), &bonuses, 100);
        let rate = ledger.accrual_rate(&torrent("aaa", 1.3), &bonuses, 100);
        assert!((rate - 1.3).abs() < 1e-9);
    }

    #[test]
    fn test_bonus_adjusts_rate() {
        let dir = TempDir::new().unwrap();
        let mut ledger = ledger_in(&dir);
        let bonuses = BonusCatalog::new(vec![BonusRule {
            pattern: "tracker-a".into(),
            value: 0.5,
            mode: BonusMode::Add,
        }]);

        ledger.accrual_rate(&torrent("aaa", 1.0), &bonuses, 0);
        let rate = ledger.accrual_rate(&torrent("aaa", 1.5), &bonuses, SECONDS_PER_WEEK as i64);
        // (1.5 + 0.5 - 1.0) / 1 week = 1.0
        assert!((rate - 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_save_and_reload_round_trip() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("ratio_ledger.json");

        let mut ledger = RatioLedger::open(&path);
        let bonuses = BonusCatalog::default();
        ledger.accrual_rate(&torrent("aaa", 1.0), &bonuses, 123);
        ledger.accrual_rate(&torrent("bbb", 0.25), &bonuses, 456);
        ledger.save().unwrap();

        let reloaded = RatioLedger::open(&path);
        assert_eq!(reloaded.len(), 2);
        assert_eq!(reloaded.entry("aaa"), ledger.entry("aaa"));
        assert_eq!(reloaded.entry("bbb"), ledger.entry("bbb"));
    }

    #[test]
    fn test_corrupt_store_starts_empty() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("ratio_ledger.json");
        fs::write(&path, "{ not json at all").unwrap();

        let ledger = RatioLedger::open(&path);
        assert!(ledger.is_empty());
    }

    #[test]
    fn test_corrupt_single_entry_is_dropped() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("ratio_ledger.json");
        fs::write(
            &path,
            r#"{
                "good": {"first_seen": 1, "baseline_ratio": 0.5, "baseline_uploaded": 10, "last_update": 2},
                "bad": {"first_seen": "not a number"}
            }"#,
        )
        .unwrap();

        let ledger = RatioLedger::open(&path);
        assert_eq!(ledger.len(), 1);
        assert!(ledger.entry("good").is_some());
        assert!(ledger.entry("bad").is_none());
    }

    #[test]
    fn test_prune_drops_absent_hashes() {
        let dir = TempDir::new().unwrap();
        let mut ledger = ledger_in(&dir);
        let bonuses = BonusCatalog::default();
        ledger.accrual_rate(&torrent("aaa", 1.0), &bonuses, 0);
        ledger.accrual_rate(&torrent("bbb", 1.0), &bonuses, 0);

        let live: HashSet<String> = ["aaa".to_string()].into_iter().collect();
        assert_eq!(ledger.prune(&live), 1);
        assert!(ledger.entry("aaa").is_some());
        assert!(ledger.entry("bbb").is_none());
    }

    #[test]
    fn test_save_leaves_no_temp_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("ratio_ledger.json");
        let mut ledger = RatioLedger::open(&path);
        ledger.accrual_rate(&torrent("aaa", 1.0), &BonusCatalog::default(), 0);
        ledger.save().unwrap();

        assert!(path.exists());
        let leftovers: Vec<_> = fs::read_dir(dir.path())
            .unwrap()
            .filter_map(|e| e.ok())
            .filter(|e| e.path() != path)
            .collect();
        assert!(leftovers.is_empty());
    }
}
