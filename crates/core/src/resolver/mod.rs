//! Removal-selection algorithms.
//!
//! Two independent resolvers consume the eligible set: one frees enough
//! disk space to cover a deficit, the other trims over-populated
//! categories down to a count cap. Their results are concatenated by the
//! engine.

mod count;
mod order;
mod space;

pub use count::resolve_count;
pub use order::RemovalOrder;
pub use space::{resolve_space, SpaceResolution};
