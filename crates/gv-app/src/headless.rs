//! Surfaces that log what they would draw, for running without a UI

use geo_types::{Geometry, Rect};
use gv_core::{Color32, WorkspaceId};
use gv_views::{
    BoxSummary, ChartSurface, Heatmap, Histogram, Legend, MapSurface, Scatter3d, ScatterPlot,
    ShapeHandle, ShapeStyle, Summary, TableRow, TableSurface,
};
use tracing::{debug, info};

use crate::views::{SurfaceFactory, WorkspaceSurfaces};

/// Factory for [`LogMap`], [`LogTable`] and [`LogChart`]
#[derive(Debug, Default)]
pub struct HeadlessSurfaces;

impl SurfaceFactory for HeadlessSurfaces {
    fn create(&self, workspace: WorkspaceId) -> WorkspaceSurfaces {
        WorkspaceSurfaces {
            map: Box::new(LogMap {
                workspace,
                next_handle: 0,
            }),
            table: Box::new(LogTable { workspace }),
            chart: Box::new(LogChart { workspace }),
        }
    }
}

pub struct LogMap {
    workspace: WorkspaceId,
    next_handle: u64,
}

impl MapSurface for LogMap {
    fn clear_overlay(&mut self) {
        self.next_handle = 0;
    }

    fn add_shape(
        &mut self,
        _geometry: &Geometry<f64>,
        _style: &ShapeStyle,
        _popup: &str,
    ) -> ShapeHandle {
        self.next_handle += 1;
        ShapeHandle(self.next_handle)
    }

    fn set_shape_style(&mut self, handle: ShapeHandle, style: &ShapeStyle) {
        debug!(workspace = %self.workspace, handle = handle.0, ?style, "map: restyle");
    }

    fn bring_to_front(&mut self, _handle: ShapeHandle) {}

    fn fit_bounds(&mut self, bounds: Rect<f64>) {
        info!(
            workspace = %self.workspace,
            ?bounds,
            shapes = self.next_handle,
            "map: overlay drawn"
        );
    }

    fn set_legend(&mut self, legend: &Legend) {
        let labels: Vec<&str> = legend.entries.iter().map(|e| e.label.as_str()).collect();
        info!(workspace = %self.workspace, title = %legend.title, ?labels, "map: legend");
    }

    fn invalidate_size(&mut self) {}
}

pub struct LogTable {
    workspace: WorkspaceId,
}

impl TableSurface for LogTable {
    fn render(&mut self, header: &[String], rows: &[TableRow]) {
        info!(workspace = %self.workspace, ?header, rows = rows.len(), "table: rendered");
    }

    fn set_row_highlighted(&mut self, row_id: &str, highlighted: bool) {
        debug!(workspace = %self.workspace, row_id, highlighted, "table: highlight");
    }

    fn scroll_into_view(&mut self, row_id: &str) {
        debug!(workspace = %self.workspace, row_id, "table: scroll");
    }

    fn set_highlight_color(&mut self, _color: Color32) {}
}

pub struct LogChart {
    workspace: WorkspaceId,
}

impl ChartSurface for LogChart {
    fn render_histogram(&mut self, histogram: &Histogram, _colors: &[Color32]) {
        let counts: Vec<usize> = histogram.bins.iter().map(|b| b.count()).collect();
        info!(
            workspace = %self.workspace,
            property = %histogram.property,
            ?counts,
            "chart: histogram"
        );
    }

    fn restyle_bars(&mut self, colors: &[Color32]) {
        let alphas: Vec<u8> = colors.iter().map(|c| c.a()).collect();
        debug!(workspace = %self.workspace, ?alphas, "chart: restyle");
    }

    fn show_stats(&mut self, summary: &Summary) {
        info!(
            workspace = %self.workspace,
            count = summary.count,
            min = summary.min,
            max = summary.max,
            mean = summary.mean,
            std_dev = summary.std_dev,
            "chart: statistics"
        );
    }

    fn render_cdf(&mut self, property: &str, points: &[(f64, f64)]) {
        info!(
            workspace = %self.workspace,
            property,
            points = points.len(),
            "chart: cumulative distribution"
        );
    }

    fn render_box_plot(&mut self, boxes: &[BoxSummary]) {
        for b in boxes {
            info!(
                workspace = %self.workspace,
                property = %b.property,
                min = b.min,
                q1 = b.q1,
                median = b.median,
                q3 = b.q3,
                max = b.max,
                "chart: box"
            );
        }
    }

    fn render_scatter(&mut self, plot: &ScatterPlot) {
        info!(
            workspace = %self.workspace,
            title = %plot.title(),
            points = plot.len(),
            "chart: scatter"
        );
    }

    fn render_heatmap(&mut self, heatmap: &Heatmap) {
        info!(
            workspace = %self.workspace,
            properties = ?heatmap.properties,
            rows = heatmap.features.len(),
            range = ?heatmap.value_range(),
            "chart: heatmap"
        );
    }

    fn render_scatter_3d(&mut self, plot: &Scatter3d) {
        info!(
            workspace = %self.workspace,
            axes = ?plot.axes,
            points = plot.len(),
            "chart: 3d scatter"
        );
    }
}
