//! Per-category retention rules and ratio-bonus modifiers.

mod types;

pub use types::*;
