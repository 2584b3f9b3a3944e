//! Removal report formatting.

use crate::SECONDS_PER_DAY;

use super::RemovalEntry;

const MAX_NAME_LENGTH: usize = 69;

/// One fixed-width report line per removed torrent.
pub fn format_line(entry: &RemovalEntry) -> String {
    let name = truncate_name(&entry.name);
    let size = format!("{:>10}", format!("{:.2} GB", entry.size_gb));
    let days = entry.seeding_time_secs as f64 / SECONDS_PER_DAY as f64;
    let seeding = format!("{:>11}", format!("{:.1} Days", days));
    let rate = format!("{:>11}", format!("{:.3} R/W", entry.accrual_rate));
    let popularity = format!("{:>6}", popularity_str(entry.popularity));
    let eta = format!("{:>7}", format!("{} ETA", eta_str(entry.eta_secs)));
    let tracker = tracker_slice(&entry.tracker);

    format!(
        "{:<69}  \t{} \t{} \t{} \t{} \t{} \t{} \t{}",
        name, entry.category, size, seeding, rate, popularity, eta, tracker
    )
}

/// Truncate to 69 characters with an ellipsis when longer.
fn truncate_name(name: &str) -> String {
    if name.chars().count() > MAX_NAME_LENGTH {
        let head: String = name.chars().take(MAX_NAME_LENGTH - 3).collect();
        format!("{head}...")
    } else {
        name.to_string()
    }
}

fn popularity_str(popularity: Option<f64>) -> String {
    match popularity {
        Some(p) => format!("{:.2} pop", p),
        None => "N/A".to_string(),
    }
}

/// Compact ETA: 0 means complete, None means unknown.
fn eta_str(eta_secs: Option<u64>) -> String {
    match eta_secs {
        None => "N/A".to_string(),
        Some(0) => "0s".to_string(),
        Some(s) if s < 3600 => format!("{}m", s / 60),
        Some(s) if s < 86_400 => format!("{}h", s / 3600),
        Some(s) => format!("{}d", s / 86_400),
    }
}

/// The informative middle of a tracker URL (characters 8-24), skipping
/// the scheme.
fn tracker_slice(tracker: &str) -> String {
    let slice: String = tracker.chars().skip(8).take(16).collect();
    if slice.is_empty() {
        "N/A".to_string()
    } else {
        slice
    }
}
