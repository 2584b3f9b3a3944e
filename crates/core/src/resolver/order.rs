//! Removal ordering policy.
//!
//! Both resolvers sort candidates into "remove first" order before
//! trimming. The ordering is an explicit value rather than a hard-coded
//! sort because it materially changes which torrents are chosen under
//! ties.

use std::cmp::Ordering;

use crate::eligibility::EligibleTorrent;

/// Comparator deciding which eligible torrent is removed first.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RemovalOrder {
    /// Least-efficient seeders first: ascending accrual rate, then
    /// descending size (free the most space per removal on ties),
    /// then name for determinism.
    ByAccrualRate,
    /// Smallest first: ascending size, then ascending accrual rate,
    /// then name.
    BySize,
}

impl RemovalOrder {
    pub fn compare(&self, a: &EligibleTorrent, b: &EligibleTorrent) -> Ordering {
        match self {
            RemovalOrder::ByAccrualRate => a
                .accrual_rate
                .total_cmp(&b.accrual_rate)
                .then_with(|| b.torrent.size_bytes.cmp(&a.torrent.size_bytes))
                .then_with(|| a.torrent.name.cmp(&b.torrent.name)),
            RemovalOrder::BySize => a
                .torrent
                .size_bytes
                .cmp(&b.torrent.size_bytes)
                .then_with(|| a.accrual_rate.total_cmp(&b.accrual_rate))
                .then_with(|| a.torrent.name.cmp(&b.torrent.name)),
        }
    }

    /// Sort candidates into remove-first order.
    pub fn sort(&self, candidates: &mut [EligibleTorrent]) {
        candidates.sort_by(|a, b| self.compare(a, b));
    }
}
