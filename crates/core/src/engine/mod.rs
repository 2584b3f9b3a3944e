mod deficit;
mod runner;
mod types;

pub use deficit::{compute_demand, local_free_space_gb, SpaceDemand};
pub use runner::{run_cleanup, run_force_seed};
pub use types::{CleanupSummary, EngineError, ForceSeedSummary, RunPhase};
