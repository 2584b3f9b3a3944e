//! Space-deficit computation.

use std::path::Path;

use crate::client::{TorrentRecord, TorrentState};
use crate::BYTES_PER_GB;

/// Required versus available space, both views.
#[derive(Debug, Clone, Copy, Default)]
pub struct SpaceDemand {
    /// Free space used for the computation, in GB.
    pub free_gb: f64,
    /// Size still to be downloaded by active downloads, in GB.
    pub remaining_download_gb: f64,
    /// Shortfall against the plain free-space floor.
    pub space_needed_gb: f64,
    /// Shortfall against the floor projected past active downloads.
    pub additional_needed_gb: f64,
}

impl SpaceDemand {
    /// The deficit handed to the space resolver.
    pub fn deficit_gb(&self) -> f64 {
        self.space_needed_gb.max(self.additional_needed_gb)
    }

    /// Whether the space resolver should run at all.
    pub fn is_needed(&self) -> bool {
        self.space_needed_gb > 0.0 || self.additional_needed_gb > 0.0
    }
}

/// Compute the demand from the current free space and torrent list.
///
/// `download_minspace_gb` guards space that active downloads will consume:
/// the projected free space is today's free space minus everything the
/// downloading torrents still have to fetch.
pub fn compute_demand(
    free_gb: f64,
    torrents: &[TorrentRecord],
    min_space_gb: f64,
    download_minspace_gb: Option<f64>,
) -> SpaceDemand {
    let remaining_download_gb = torrents
        .iter()
        .filter(|t| t.state == TorrentState::Downloading)
        .map(|t| t.remaining_bytes())
        .sum::<f64>()
        / BYTES_PER_GB;

    let space_needed_gb = (min_space_gb - free_gb).max(0.0);

    let additional_needed_gb = match download_minspace_gb {
        Some(minspace) => {
            let projected_free_gb = free_gb - remaining_download_gb;
            (minspace - projected_free_gb).max(0.0)
        }
        None => 0.0,
    };

    SpaceDemand {
        free_gb,
        remaining_download_gb,
        space_needed_gb,
        additional_needed_gb,
    }
}

/// Free space of the filesystem holding `path`, in GB.
pub fn local_free_space_gb(path: &Path) -> std::io::Result<f64> {
    fs2::available_space(path).map(|bytes| bytes as f64 / BYTES_PER_GB)
}
