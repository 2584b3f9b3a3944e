//! Space deficit resolver.

use tracing::debug;

use crate::eligibility::EligibleTorrent;

use super::order::RemovalOrder;

/// Outcome of a space-driven selection.
#[derive(Debug, Clone, Default)]
pub struct SpaceResolution {
    /// Torrents chosen for removal, in removal order.
    pub removed: Vec<EligibleTorrent>,
    /// Cumulative size of the chosen torrents in GB. May fall short of
    /// the deficit when the eligible set is exhausted.
    pub freed_gb: f64,
}

/// Select a minimal-effort subset of eligible torrents whose freed size
/// covers `deficit_gb`, restricted to `categories` (lowercase keys).
///
/// Best-effort: when the restricted set cannot cover the deficit,
/// everything available is returned and the shortfall is the caller's to
/// report. A non-positive deficit is a no-op.
pub fn resolve_space(
    eligible: &[EligibleTorrent],
    categories: &[String],
    deficit_gb: f64,
    order: RemovalOrder,
) -> SpaceResolution {
    if deficit_gb <= 0.0 {
        return SpaceResolution::default();
    }

    let mut candidates: Vec<EligibleTorrent> = eligible
        .iter()
        .filter(|e| categories.contains(&e.torrent.category_key()))
        .cloned()
        .collect();
    order.sort(&mut candidates);

    let mut removed = Vec::new();
    let mut freed_gb = 0.0;

    for candidate in candidates {
        if freed_gb >= deficit_gb {
            break;
        }
        freed_gb += candidate.torrent.size_gb();
        removed.push(candidate);
    }

    if freed_gb < deficit_gb {
        debug!(
            "Eligible set exhausted: freed {:.2} GB of {:.2} GB needed",
            freed_gb, deficit_gb
        );
    }

    SpaceResolution { removed, freed_gb }
}
