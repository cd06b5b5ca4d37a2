//! View adapters for the geospatial visualization workspace
//!
//! Each workspace owns one [`MapAdapter`], one [`TableAdapter`] and one
//! [`ChartAdapter`]. They subscribe to the workspace's selection engine and
//! translate every notification into calls on host-provided surfaces.

pub mod map;
pub mod plots;
pub mod surface;
pub mod tables;

pub use map::{Legend, LegendEntry, MapAdapter, ShapeStyle};
pub use plots::{Bin, BoxSummary, ChartAdapter, Heatmap, Histogram, Scatter3d, ScatterPlot, Summary};
pub use surface::{ChartSurface, MapSurface, ShapeHandle, TableRow, TableSurface};
pub use tables::TableAdapter;
