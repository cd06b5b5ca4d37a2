//! Chart views: the linked histogram plus the auxiliary statistic charts

pub mod chart;
pub mod heatmap;
pub mod histogram;
pub mod scatter;

// Utilities
pub mod utils;

// Re-exports
pub use chart::{bin_click_selection, ChartAdapter};
pub use heatmap::Heatmap;
pub use histogram::{Bin, Histogram};
pub use scatter::{Scatter, Scatter3d, ScatterPlot, ScatterPoint};
pub use utils::{BoxSummary, Summary};
