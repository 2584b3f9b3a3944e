//! Cleanup lifecycle integration tests.
//!
//! These tests drive full runs against the mock client:
//! - Dry-run and live parity of the removal decision
//! - Per-torrent failure isolation during execution
//! - Session expiry recovery and authentication abort
//! - Ledger corruption recovery and persistence across runs
//! - Count-cap trimming and force-seed selection

use std::fs;

use tempfile::TempDir;

use janitor_core::{
    load_config_from_str, run_cleanup, run_force_seed, validate_config, Config, EngineError,
    RemovalOutcome, RunLog, TorrentRecord, TorrentState,
    testing::MockTorrentClient,
    BYTES_PER_GB,
};

struct TestHarness {
    client: MockTorrentClient,
    config: Config,
    data_dir: TempDir,
}

impl TestHarness {
    /// Space-driven setup: movies category ruled on seed time only, so
    /// eligibility does not depend on ledger history.
    fn new() -> Self {
        Self::with_cleanup(
            r#"
categories_to_check_for_space = ["movies"]
min_space_gb = 20.0
max_torrents_for_categories = 100
"#,
        )
    }

    fn with_cleanup(cleanup_extra: &str) -> Self {
        let data_dir = TempDir::new().expect("Failed to create temp dir");
        let toml = format!(
            r#"
[login]
address = "http://localhost:8080"
username = "admin"
password = "secret"

[cleanup]
{cleanup_extra}

[logging]
location = "{}"

[category.movies]
min_seed_time = 1000
"#,
            data_dir.path().display()
        );
        let config = load_config_from_str(&toml).expect("Failed to parse config");
        validate_config(&config).expect("Config invalid");
        Self {
            client: MockTorrentClient::new(),
            config,
            data_dir,
        }
    }

    fn run_log(&self) -> RunLog {
        RunLog::open(&self.config.data_dir())
    }

    async fn seed_torrents(&self) {
        // Three seeded movies of 5, 10, and 15 GB.
        for (hash, gb) in [("aaa", 5.0), ("bbb", 10.0), ("ccc", 15.0)] {
            self.client.add_torrent(seeding(hash, "movies", gb)).await;
        }
        self.client.set_free_space_gb(5.0).await;
    }
}

fn seeding(hash: &str, category: &str, size_gb: f64) -> TorrentRecord {
    TorrentRecord {
        hash: hash.into(),
        name: format!("torrent-{hash}"),
        category: category.into(),
        state: TorrentState::Seeding,
        progress: 1.0,
        size_bytes: (size_gb * BYTES_PER_GB) as u64,
        uploaded_bytes: 0,
        seeding_time_secs: 50_000,
        ratio: 1.5,
        popularity: Some(0.7),
        eta_secs: Some(0),
        tracker: "https://tracker-a.example/announce".into(),
    }
}

#[tokio::test]
async fn test_dry_run_removes_nothing_but_reports() {
    let h = TestHarness::new();
    h.seed_torrents().await;
    let mut log = h.run_log();

    let summary = run_cleanup(&h.client, &h.config, true, &mut log)
        .await
        .expect("run failed");

    assert!(h.client.deleted().await.is_empty());
    assert!(!summary.report.entries.is_empty());
    assert!(summary
        .report
        .entries
        .iter()
        .all(|e| e.outcome == RemovalOutcome::DryRun));
    assert!(summary.report.dry_run);
    // The ledger is written even in dry-run.
    assert!(h.config.ledger_path().exists());
}

#[tokio::test]
async fn test_live_run_deletes_with_files() {
    let h = TestHarness::new();
    h.seed_torrents().await;
    let mut log = h.run_log();

    let summary = run_cleanup(&h.client, &h.config, false, &mut log)
        .await
        .expect("run failed");

    let deleted = h.client.deleted().await;
    assert_eq!(deleted.len(), summary.report.entries.len());
    assert!(deleted.iter().all(|(_, with_files)| *with_files));
    assert_eq!(summary.report.failed_count(), 0);
    // 15 GB deficit: rates tie, so the largest torrent goes first and
    // covers it alone.
    assert!((summary.space_freed_gb - 15.0).abs() < 1e-6);
}

#[tokio::test]
async fn test_dry_run_and_live_run_pick_the_same_torrents() {
    let dry = TestHarness::new();
    dry.seed_torrents().await;
    let mut dry_log = dry.run_log();
    let dry_summary = run_cleanup(&dry.client, &dry.config, true, &mut dry_log)
        .await
        .expect("dry run failed");

    let live = TestHarness::new();
    live.seed_torrents().await;
    let mut live_log = live.run_log();
    let live_summary = run_cleanup(&live.client, &live.config, false, &mut live_log)
        .await
        .expect("live run failed");

    let picked = |s: &janitor_core::CleanupSummary| {
        s.report
            .entries
            .iter()
            .map(|e| e.hash.clone())
            .collect::<Vec<_>>()
    };
    assert_eq!(picked(&dry_summary), picked(&live_summary));
}

#[tokio::test]
async fn test_failed_delete_does_not_abort_the_batch() {
    let h = TestHarness::new();
    h.seed_torrents().await;
    h.client.fail_delete("aaa").await;
    let mut log = h.run_log();

    let summary = run_cleanup(&h.client, &h.config, false, &mut log)
        .await
        .expect("run failed");

    assert_eq!(summary.report.failed_count(), 1);
    let deleted = h.client.deleted().await;
    assert!(deleted.iter().all(|(hash, _)| hash != "aaa"));
    assert!(!deleted.is_empty());
}

#[tokio::test]
async fn test_expired_session_triggers_one_relogin() {
    let h = TestHarness::new();
    h.seed_torrents().await;
    h.client.expire_session().await;
    let mut log = h.run_log();

    run_cleanup(&h.client, &h.config, true, &mut log)
        .await
        .expect("run failed");

    assert_eq!(h.client.login_count().await, 1);
}

#[tokio::test]
async fn test_auth_failure_aborts_before_any_deletion() {
    let h = TestHarness::new();
    h.seed_torrents().await;
    h.client.expire_session().await;
    h.client.fail_logins().await;
    let mut log = h.run_log();

    let err = run_cleanup(&h.client, &h.config, false, &mut log)
        .await
        .expect_err("run should abort");

    assert!(matches!(err, EngineError::Client(_)));
    assert!(h.client.deleted().await.is_empty());
    assert_eq!(h.client.login_count().await, 1);
}

#[tokio::test]
async fn test_corrupt_ledger_recovers_into_valid_store() {
    let h = TestHarness::new();
    h.seed_torrents().await;
    fs::write(h.config.ledger_path(), "{not json").expect("write failed");
    let mut log = h.run_log();

    run_cleanup(&h.client, &h.config, true, &mut log)
        .await
        .expect("run failed");

    let raw = fs::read_to_string(h.config.ledger_path()).expect("read failed");
    let parsed: serde_json::Value = serde_json::from_str(&raw).expect("ledger not valid JSON");
    assert_eq!(parsed.as_object().map(|m| m.len()), Some(3));
}

#[tokio::test]
async fn test_no_deficit_no_space_removals() {
    let h = TestHarness::new();
    h.seed_torrents().await;
    h.client.set_free_space_gb(100.0).await;
    let mut log = h.run_log();

    let summary = run_cleanup(&h.client, &h.config, false, &mut log)
        .await
        .expect("run failed");

    assert!(summary.report.is_empty());
    assert!(h.client.deleted().await.is_empty());
    assert_eq!(summary.space_freed_gb, 0.0);
}

#[tokio::test]
async fn test_count_cap_trims_category() {
    let h = TestHarness::with_cleanup(
        r#"
categories_to_check_for_number = ["movies"]
min_space_gb = 1.0
max_torrents_for_categories = 1
"#,
    );
    h.seed_torrents().await;
    h.client.set_free_space_gb(100.0).await;
    let mut log = h.run_log();

    let summary = run_cleanup(&h.client, &h.config, false, &mut log)
        .await
        .expect("run failed");

    assert_eq!(summary.report.entries.len(), 2);
    assert_eq!(h.client.deleted().await.len(), 2);
}

#[tokio::test]
async fn test_run_log_written_once_on_drop() {
    let h = TestHarness::new();
    h.seed_torrents().await;
    let mut log = h.run_log();

    run_cleanup(&h.client, &h.config, true, &mut log)
        .await
        .expect("run failed");
    let log_path = log.path().to_path_buf();
    drop(log);

    let contents = fs::read_to_string(&log_path).expect("log not written");
    assert!(contents.contains("TEST MODE"));
    assert!(contents.contains("Total torrents to remove:"));
    assert_eq!(contents.matches("TEST MODE").count(), 1);
}

#[tokio::test]
async fn test_clean_run_leaves_no_log_file() {
    let h = TestHarness::new();
    h.seed_torrents().await;
    h.client.set_free_space_gb(100.0).await;
    let log_dir = h.config.data_dir();
    let mut log = h.run_log();

    run_cleanup(&h.client, &h.config, false, &mut log)
        .await
        .expect("run failed");
    drop(log);

    assert!(!log_dir.join("deletelog.txt").exists());
}

#[tokio::test]
async fn test_force_seed_selects_by_category_and_keyword() {
    let h = TestHarness::with_cleanup(
        r#"
min_space_gb = 1.0
max_torrents_for_categories = 100
categories_to_force_seed = ["movies"]
trackers_to_force_seed = ["keeper"]
"#,
    );
    let mut keeper = seeding("aaa", "movies", 5.0);
    keeper.name = "A Keeper Release".into();
    h.client.add_torrent(keeper).await;
    h.client.add_torrent(seeding("bbb", "movies", 5.0)).await;
    h.client.add_torrent(seeding("ccc", "books", 5.0)).await;
    let mut log = h.run_log();

    let summary = run_force_seed(&h.client, &h.config, false, &mut log)
        .await
        .expect("run failed");

    assert_eq!(summary.hashes, vec!["aaa".to_string()]);
    assert_eq!(h.client.forced().await, vec!["aaa".to_string()]);
}

#[tokio::test]
async fn test_force_seed_dry_run_calls_nothing() {
    let h = TestHarness::with_cleanup(
        r#"
min_space_gb = 1.0
max_torrents_for_categories = 100
categories_to_force_seed = ["movies"]
"#,
    );
    h.client.add_torrent(seeding("aaa", "movies", 5.0)).await;
    let mut log = h.run_log();

    let summary = run_force_seed(&h.client, &h.config, true, &mut log)
        .await
        .expect("run failed");

    assert_eq!(summary.hashes.len(), 1);
    assert!(h.client.forced().await.is_empty());
}

#[tokio::test]
async fn test_second_run_accrues_from_persisted_baseline() {
    let h = TestHarness::new();
    h.seed_torrents().await;
    h.client.set_free_space_gb(100.0).await;
    let mut log = h.run_log();

    run_cleanup(&h.client, &h.config, true, &mut log)
        .await
        .expect("first run failed");
    let first = fs::read_to_string(h.config.ledger_path()).expect("read failed");

    run_cleanup(&h.client, &h.config, true, &mut log)
        .await
        .expect("second run failed");
    let second = fs::read_to_string(h.config.ledger_path()).expect("read failed");

    // Baselines persist: first_seen and baseline_ratio survive the
    // second observation unchanged.
    let parse = |raw: &str| serde_json::from_str::<serde_json::Value>(raw).unwrap();
    let (first, second) = (parse(&first), parse(&second));
    for hash in ["aaa", "bbb", "ccc"] {
        assert_eq!(first[hash]["first_seen"], second[hash]["first_seen"]);
        assert_eq!(first[hash]["baseline_ratio"], second[hash]["baseline_ratio"]);
    }
}