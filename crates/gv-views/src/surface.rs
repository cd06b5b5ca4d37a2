//! Rendering targets implemented by the host
//!
//! Adapters never draw themselves. They translate selection and settings
//! changes into calls on these surfaces, which the host backs with its map
//! widget, table widget and chart widget.

use egui::Color32;
use geo_types::{Geometry, Rect};

use crate::map::{Legend, ShapeStyle};
use crate::plots::heatmap::Heatmap;
use crate::plots::histogram::Histogram;
use crate::plots::scatter::{Scatter3d, ScatterPlot};
use crate::plots::utils::stats::{BoxSummary, Summary};

/// Opaque id of a shape in the host's overlay layer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ShapeHandle(pub u64);

/// Map widget with a single vector overlay
pub trait MapSurface: Send {
    /// Remove every shape of the overlay
    fn clear_overlay(&mut self);

    /// Add a shape on top of the overlay with its popup text
    fn add_shape(
        &mut self,
        geometry: &Geometry<f64>,
        style: &ShapeStyle,
        popup: &str,
    ) -> ShapeHandle;

    fn set_shape_style(&mut self, handle: ShapeHandle, style: &ShapeStyle);

    fn bring_to_front(&mut self, handle: ShapeHandle);

    fn fit_bounds(&mut self, bounds: Rect<f64>);

    fn set_legend(&mut self, legend: &Legend);

    /// Recompute the widget size after its container became visible
    fn invalidate_size(&mut self);
}

/// One rendered table row
#[derive(Debug, Clone, PartialEq)]
pub struct TableRow {
    /// `row-{index}`
    pub id: String,
    pub cells: Vec<String>,
}

/// Attribute table widget
pub trait TableSurface: Send {
    fn render(&mut self, header: &[String], rows: &[TableRow]);

    fn set_row_highlighted(&mut self, row_id: &str, highlighted: bool);

    fn scroll_into_view(&mut self, row_id: &str);

    fn set_highlight_color(&mut self, color: Color32);
}

/// Chart widget hosting the histogram and the auxiliary statistic charts
pub trait ChartSurface: Send {
    /// Draw the histogram bars with their initial colors
    fn render_histogram(&mut self, histogram: &Histogram, colors: &[Color32]);

    /// Recolor the bars, one color per bin
    fn restyle_bars(&mut self, colors: &[Color32]);

    fn show_stats(&mut self, summary: &Summary);

    /// `(value, cumulative probability)` points of one property
    fn render_cdf(&mut self, property: &str, points: &[(f64, f64)]);

    fn render_box_plot(&mut self, boxes: &[BoxSummary]);

    fn render_scatter(&mut self, plot: &ScatterPlot);

    fn render_heatmap(&mut self, heatmap: &Heatmap);

    fn render_scatter_3d(&mut self, plot: &Scatter3d);
}
