//! Histogram chart adapter

use gv_core::{
    BinClickMode, Dataset, SelectionContext, SelectionSet, SelectionSubscriber, StyleSettings,
};
use parking_lot::Mutex;
use tracing::{debug, warn};

use super::heatmap::Heatmap;
use super::histogram::{Bin, Histogram};
use super::scatter::Scatter;
use super::utils::stats::{cumulative_distribution, BoxSummary, Summary};
use crate::surface::ChartSurface;

/// Selection that results from clicking `bin` under the given mode
pub fn bin_click_selection(bin: &Bin, mode: BinClickMode, selection: &SelectionSet) -> Vec<usize> {
    match mode {
        BinClickMode::Replace => bin.indices.clone(),
        BinClickMode::Additive => union(selection, &bin.indices),
        BinClickMode::Toggle => {
            let all_selected =
                !bin.indices.is_empty() && bin.indices.iter().all(|&i| selection.contains(i));
            if all_selected {
                selection.iter().filter(|i| !bin.indices.contains(i)).collect()
            } else {
                union(selection, &bin.indices)
            }
        }
    }
}

fn union(selection: &SelectionSet, indices: &[usize]) -> Vec<usize> {
    selection.iter().chain(indices.iter().copied()).collect()
}

struct ChartState {
    surface: Box<dyn ChartSurface>,
    histogram: Option<Histogram>,
    summary: Option<Summary>,
}

/// Drives the chart surface of one workspace
pub struct ChartAdapter {
    state: Mutex<ChartState>,
}

impl ChartAdapter {
    pub fn new(surface: Box<dyn ChartSurface>) -> Self {
        Self {
            state: Mutex::new(ChartState {
                surface,
                histogram: None,
                summary: None,
            }),
        }
    }

    /// Rebin `property` and redraw the histogram and its statistics panel.
    ///
    /// Returns `false` when the property has no numeric values.
    pub fn render(
        &self,
        dataset: &Dataset,
        property: &str,
        settings: &StyleSettings,
        selection: &SelectionSet,
    ) -> bool {
        let values = dataset.numeric_values(property);
        let Some(histogram) = Histogram::build(property, &values, settings.bin_count) else {
            warn!(property, "No numeric values to plot");
            return false;
        };

        let raw: Vec<f64> = values.iter().map(|(_, v)| *v).collect();
        let summary = Summary::from_values(&raw);

        let mut state = self.state.lock();
        state.surface.render_histogram(&histogram, &histogram.bar_colors(selection));
        if let Some(summary) = &summary {
            state.surface.show_stats(summary);
        }

        debug!(property, bins = histogram.len(), "Histogram rendered");
        state.histogram = Some(histogram);
        state.summary = summary;
        true
    }

    pub fn is_rendered(&self) -> bool {
        self.state.lock().histogram.is_some()
    }

    pub fn histogram(&self) -> Option<Histogram> {
        self.state.lock().histogram.clone()
    }

    pub fn summary(&self) -> Option<Summary> {
        self.state.lock().summary
    }

    /// New selection for a click on bar `bin`, `None` for an unknown bar
    pub fn bin_click(
        &self,
        bin: usize,
        mode: BinClickMode,
        selection: &SelectionSet,
    ) -> Option<Vec<usize>> {
        let state = self.state.lock();
        match state.histogram.as_ref().and_then(|h| h.bin(bin)) {
            Some(bin) => Some(bin_click_selection(bin, mode, selection)),
            None => {
                warn!(bin, "Click on unknown histogram bin");
                None
            }
        }
    }

    /// Union of the features of several bars, for a box or lasso selection.
    /// Unknown bars are skipped. `None` when no histogram is drawn.
    pub fn bins_union(&self, bins: &[usize]) -> Option<Vec<usize>> {
        let state = self.state.lock();
        let histogram = state.histogram.as_ref()?;

        let mut indices = Vec::new();
        for &bin in bins {
            match histogram.bin(bin) {
                Some(b) => indices.extend_from_slice(&b.indices),
                None => warn!(bin, "Selection over unknown histogram bin"),
            }
        }
        indices.sort_unstable();
        indices.dedup();
        Some(indices)
    }

    /// Plot the empirical CDF of `property`. Returns `false` if it has no numeric values.
    pub fn render_cdf(&self, dataset: &Dataset, property: &str) -> bool {
        let values: Vec<f64> = dataset
            .numeric_values(property)
            .into_iter()
            .map(|(_, v)| v)
            .collect();
        if values.is_empty() {
            return false;
        }

        let points = cumulative_distribution(&values);
        self.state.lock().surface.render_cdf(property, &points);
        true
    }

    /// Plot one box per numeric property; returns how many were drawn
    pub fn render_box_plot(&self, dataset: &Dataset) -> usize {
        let boxes: Vec<BoxSummary> = dataset
            .numeric_properties()
            .into_iter()
            .filter_map(|property| {
                let values: Vec<f64> = dataset
                    .numeric_values(&property)
                    .into_iter()
                    .map(|(_, v)| v)
                    .collect();
                BoxSummary::from_values(property, &values)
            })
            .collect();

        if !boxes.is_empty() {
            self.state.lock().surface.render_box_plot(&boxes);
        }
        boxes.len()
    }

    /// Scatter of `x` against `y`; returns the number of plotted points
    pub fn render_scatter(&self, dataset: &Dataset, x: &str, y: &str) -> usize {
        let plot = Scatter::build(dataset, [x, y]);
        self.state.lock().surface.render_scatter(&plot);
        debug!(x, y, points = plot.len(), "Scatter plot rendered");
        plot.len()
    }

    /// Heatmap of `properties` across every feature
    pub fn render_heatmap(&self, dataset: &Dataset, properties: &[String]) {
        let heatmap = Heatmap::build(dataset, properties);
        self.state.lock().surface.render_heatmap(&heatmap);
        debug!(columns = properties.len(), rows = heatmap.features.len(), "Heatmap rendered");
    }

    /// 3D scatter of three properties; returns the number of plotted points
    pub fn render_scatter_3d(&self, dataset: &Dataset, x: &str, y: &str, z: &str) -> usize {
        let plot = Scatter::build(dataset, [x, y, z]);
        self.state.lock().surface.render_scatter_3d(&plot);
        debug!(x, y, z, points = plot.len(), "3D scatter rendered");
        plot.len()
    }
}

impl SelectionSubscriber for ChartAdapter {
    fn on_selection_changed(&self, ctx: &SelectionContext<'_>) {
        let mut state = self.state.lock();
        let ChartState { surface, histogram, .. } = &mut *state;
        if let Some(histogram) = histogram {
            surface.restyle_bars(&histogram.bar_colors(ctx.selection));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bin(indices: &[usize]) -> Bin {
        Bin {
            start: 0.0,
            end: 1.0,
            indices: indices.to_vec(),
        }
    }

    fn sorted(mut v: Vec<usize>) -> Vec<usize> {
        v.sort_unstable();
        v.dedup();
        v
    }

    #[test]
    fn test_toggle_adds_then_removes() {
        let b = bin(&[2, 3]);
        let partial: SelectionSet = [0, 2].into_iter().collect();
        assert_eq!(sorted(bin_click_selection(&b, BinClickMode::Toggle, &partial)), vec![0, 2, 3]);

        let full: SelectionSet = [0, 2, 3].into_iter().collect();
        assert_eq!(sorted(bin_click_selection(&b, BinClickMode::Toggle, &full)), vec![0]);
    }

    #[test]
    fn test_additive_and_replace() {
        let b = bin(&[2, 3]);
        let full: SelectionSet = [0, 2, 3].into_iter().collect();
        assert_eq!(sorted(bin_click_selection(&b, BinClickMode::Additive, &full)), vec![0, 2, 3]);
        assert_eq!(sorted(bin_click_selection(&b, BinClickMode::Replace, &full)), vec![2, 3]);
    }

    #[test]
    fn test_empty_bin_toggle_is_noop() {
        let selection: SelectionSet = [1].into_iter().collect();
        assert_eq!(bin_click_selection(&bin(&[]), BinClickMode::Toggle, &selection), vec![1]);
    }
}
