//! Utilities for plot views

pub mod colors;
pub mod stats;

// Re-export commonly used items
pub use colors::{emphasis_color, ramp_color, NEUTRAL_GREY};
pub use stats::{calculate_quartiles, cumulative_distribution, BoxSummary, Summary};
