//! Persisted ratio-accrual ledger.
//!
//! Measures how efficiently a torrent is still being seeded: the ledger
//! keeps the ratio observed when a torrent was first seen and derives a
//! time-normalized "ratio per week" from the gain since then.

mod store;
mod types;

pub use store::RatioLedger;
pub use types::{LedgerEntry, LedgerError};
