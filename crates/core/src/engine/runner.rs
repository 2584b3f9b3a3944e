//! The per-run pipeline.
//!
//! Drives a single cleanup (or force-seed) run through its phases:
//! rules, ledger update, eligibility, the two resolvers, execution,
//! report. Network calls get at most one retry, triggered only by an
//! authorization failure, after which the run aborts before any
//! deletion.

use std::collections::{HashMap, HashSet};

use chrono::Utc;
use tracing::{debug, info};

use crate::client::{ClientError, ClientStatus, TorrentClient, TorrentRecord};
use crate::config::Config;
use crate::eligibility::{filter_eligible, EligibleTorrent};
use crate::executor::execute;
use crate::ledger::RatioLedger;
use crate::logging::RunLog;
use crate::resolver::{resolve_count, resolve_space, RemovalOrder, SpaceResolution};
use crate::retry::retry_once;

use super::deficit::{compute_demand, local_free_space_gb};
use super::types::{CleanupSummary, EngineError, ForceSeedSummary, RunPhase};

fn advance(phase: RunPhase) {
    debug!("run phase: {}", phase.as_str());
}

/// Fetch server status and the torrent list, re-logging-in once on an
/// authorization failure.
async fn fetch_state(
    client: &dyn TorrentClient,
) -> Result<(ClientStatus, Vec<TorrentRecord>), ClientError> {
    retry_once(
        move || async move {
            let status = client.status().await?;
            let torrents = client.list_torrents().await?;
            Ok::<_, ClientError>((status, torrents))
        },
        |e: &ClientError| e.is_auth(),
        move || client.login(),
    )
    .await
    .into_result()
}

/// One cleanup run: decide which torrents have earned removal and
/// remove enough of them to satisfy the space deficit and the
/// per-category count caps.
pub async fn run_cleanup(
    client: &dyn TorrentClient,
    config: &Config,
    dry_run: bool,
    log: &mut RunLog,
) -> Result<CleanupSummary, EngineError> {
    advance(RunPhase::Idle);

    let rules = config.rule_catalog();
    let bonuses = config.bonus_catalog();
    advance(RunPhase::RulesLoaded);

    let (status, torrents) = fetch_state(client).await?;

    let free_gb = match &config.cleanup.drive_path {
        Some(path) => {
            local_free_space_gb(path).map_err(|source| EngineError::FreeSpaceProbe {
                path: path.display().to_string(),
                source,
            })?
        }
        None => status.free_space_gb(),
    };
    info!("Free space on disk: {:.2} GB", free_gb);

    // Ledger update: prune entries for vanished torrents, then observe
    // every current torrent exactly once.
    let mut ledger = RatioLedger::open(config.ledger_path());
    let live: HashSet<String> = torrents.iter().map(|t| t.hash.clone()).collect();
    ledger.prune(&live);

    let now = Utc::now().timestamp();
    let mut rates: HashMap<String, f64> = HashMap::with_capacity(torrents.len());
    for torrent in &torrents {
        rates.insert(
            torrent.hash.clone(),
            ledger.accrual_rate(torrent, &bonuses, now),
        );
    }
    ledger.save()?;
    advance(RunPhase::LedgerUpdated);

    let demand = compute_demand(
        free_gb,
        &torrents,
        config.cleanup.min_space_gb,
        config.cleanup.download_minspace_gb,
    );
    info!(
        "Free space after downloads: {:.2} GB",
        demand.free_gb - demand.remaining_download_gb
    );

    let eligible = filter_eligible(&torrents, &rules, &rates);
    advance(RunPhase::EligibilityComputed);

    let space = if demand.is_needed() {
        resolve_space(
            &eligible,
            &config.cleanup.categories_to_check_for_space,
            demand.deficit_gb(),
            RemovalOrder::ByAccrualRate,
        )
    } else {
        SpaceResolution::default()
    };
    if space.removed.is_empty() {
        info!("No torrents to remove based on space requirements.");
    }
    advance(RunPhase::SpaceResolved);

    let count_removals = resolve_count(
        &eligible,
        &config.cleanup.categories_to_check_for_number,
        config.cleanup.max_torrents_for_categories,
        config.cleanup.sort_count_removal_by_size,
    );
    advance(RunPhase::CountResolved);

    let mut removals: Vec<EligibleTorrent> = space.removed.clone();
    removals.extend(count_removals);

    let report = execute(client, &removals, dry_run).await;
    advance(RunPhase::Executed);

    if !report.is_empty() {
        log.line(format!(
            "{}Free: {:.2} GB, DLremain: {:.1} GB, Diskneed: {:.0} GB, Freed: {:.2} GB",
            if dry_run { "TEST MODE: " } else { "" },
            demand.free_gb,
            demand.remaining_download_gb,
            demand.deficit_gb(),
            space.freed_gb,
        ));
        log.line(format!("Total torrents to remove: {}", report.entries.len()));
        for entry in &report.entries {
            log.line(entry.format());
        }
    }
    advance(RunPhase::Reported);

    Ok(CleanupSummary {
        free_gb: demand.free_gb,
        remaining_download_gb: demand.remaining_download_gb,
        deficit_gb: demand.deficit_gb(),
        eligible_count: eligible.len(),
        space_freed_gb: space.freed_gb,
        report,
    })
}

/// One force-seed run: force-start the torrents in the configured
/// categories whose name matches one of the configured keywords.
pub async fn run_force_seed(
    client: &dyn TorrentClient,
    config: &Config,
    dry_run: bool,
    log: &mut RunLog,
) -> Result<ForceSeedSummary, EngineError> {
    let torrents = retry_once(
        move || async move { client.list_torrents().await },
        |e: &ClientError| e.is_auth(),
        move || client.login(),
    )
    .await
    .into_result()?;

    let categories = &config.cleanup.categories_to_force_seed;
    let keywords: Vec<String> = config
        .cleanup
        .trackers_to_force_seed
        .iter()
        .map(|k| k.trim().to_lowercase())
        .filter(|k| !k.is_empty())
        .collect();

    let hashes: Vec<String> = torrents
        .iter()
        .filter(|t| categories.contains(&t.category_key()))
        .filter(|t| {
            let name = t.name.to_lowercase();
            keywords.is_empty() || keywords.iter().any(|k| name.contains(k))
        })
        .inspect(|t| {
            debug!(
                "Torrent {} marked for force seeding in category: {}",
                t.name,
                t.category_key()
            );
        })
        .map(|t| t.hash.clone())
        .collect();

    if dry_run {
        info!("Test mode enabled, would force-start {} torrents", hashes.len());
    } else if !hashes.is_empty() {
        client.force_start(&hashes).await?;
    }

    if !hashes.is_empty() {
        log.line(format!(
            "{}Force-seeding {} torrents",
            if dry_run { "TEST MODE: " } else { "" },
            hashes.len()
        ));
    }

    Ok(ForceSeedSummary { hashes, dry_run })
}
