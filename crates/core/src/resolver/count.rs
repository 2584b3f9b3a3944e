//! Count cap resolver.

use tracing::debug;

use crate::eligibility::EligibleTorrent;

use super::order::RemovalOrder;

/// Trim each over-populated category down to `max_per_category`.
///
/// Categories are processed independently; a torrent counted toward one
/// category's cap never affects another. Within a category the
/// `n - max` least-valuable entries are removed, ordered by accrual rate
/// or, when `sort_by_size` is set, by size.
pub fn resolve_count(
    eligible: &[EligibleTorrent],
    categories: &[String],
    max_per_category: usize,
    sort_by_size: bool,
) -> Vec<EligibleTorrent> {
    let order = if sort_by_size {
        RemovalOrder::BySize
    } else {
        RemovalOrder::ByAccrualRate
    };

    let mut removed = Vec::new();

    for category in categories {
        let mut in_category: Vec<EligibleTorrent> = eligible
            .iter()
            .filter(|e| &e.torrent.category_key() == category)
            .cloned()
            .collect();

        if in_category.len() <= max_per_category {
            debug!(
                "Category '{}' within limit ({} <= {})",
                category,
                in_category.len(),
                max_per_category
            );
            continue;
        }

        let excess = in_category.len() - max_per_category;
        order.sort(&mut in_category);
        removed.extend(in_category.into_iter().take(excess));
    }

    removed
}
