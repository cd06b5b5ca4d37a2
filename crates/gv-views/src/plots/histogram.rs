//! Histogram binning with per-bin feature membership

use egui::Color32;
use gv_core::SelectionSet;
use serde::Serialize;

use super::utils::colors::emphasis_color;

/// One histogram bar
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Bin {
    pub start: f64,
    pub end: f64,
    /// Feature indices whose value falls in this bin
    pub indices: Vec<usize>,
}

impl Bin {
    pub fn count(&self) -> usize {
        self.indices.len()
    }

    /// Fraction of this bin's features that are selected, 0 for an empty bin
    pub fn selected_ratio(&self, selection: &SelectionSet) -> f32 {
        if self.indices.is_empty() {
            return 0.0;
        }
        let selected = self.indices.iter().filter(|&&i| selection.contains(i)).count();
        selected as f32 / self.indices.len() as f32
    }
}

/// Equal-width histogram of one numeric property
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Histogram {
    pub property: String,
    pub bins: Vec<Bin>,
}

impl Histogram {
    /// Bin `(index, value)` pairs into `bin_count` equal-width bins over `[min, max]`.
    ///
    /// Bin `i` covers `[min + i*w, min + (i+1)*w)`; the last bin also includes
    /// `max`. A degenerate range collapses to a single bin. Non-finite values
    /// are skipped, and `None` is returned if nothing remains.
    pub fn build(
        property: impl Into<String>,
        values: &[(usize, f64)],
        bin_count: usize,
    ) -> Option<Self> {
        let values: Vec<(usize, f64)> = values
            .iter()
            .copied()
            .filter(|(_, v)| v.is_finite())
            .collect();
        let min = values.iter().map(|(_, v)| *v).fold(f64::INFINITY, f64::min);
        let max = values.iter().map(|(_, v)| *v).fold(f64::NEG_INFINITY, f64::max);
        if values.is_empty() {
            return None;
        }

        let num_bins = if max > min { bin_count.max(1) } else { 1 };
        let bin_width = if max > min { (max - min) / num_bins as f64 } else { 0.0 };

        let edge = |i: usize| if i == num_bins { max } else { min + i as f64 * bin_width };
        let mut bins: Vec<Bin> = (0..num_bins)
            .map(|i| Bin {
                start: edge(i),
                end: edge(i + 1),
                indices: Vec::new(),
            })
            .collect();

        for (index, value) in values {
            let slot = Self::slot(&bins, value);
            bins[slot].indices.push(index);
        }

        Some(Self {
            property: property.into(),
            bins,
        })
    }

    fn slot(bins: &[Bin], value: f64) -> usize {
        let last = bins.len() - 1;
        let width = bins[0].end - bins[0].start;
        if width <= 0.0 {
            return 0;
        }

        let mut slot = (((value - bins[0].start) / width).floor().max(0.0) as usize).min(last);
        // Correct for floating point drift at the edges
        while slot > 0 && value < bins[slot].start {
            slot -= 1;
        }
        while slot < last && value >= bins[slot].end {
            slot += 1;
        }
        slot
    }

    pub fn len(&self) -> usize {
        self.bins.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bins.is_empty()
    }

    pub fn bin(&self, index: usize) -> Option<&Bin> {
        self.bins.get(index)
    }

    /// Bar colors emphasizing the selected share of each bin
    pub fn bar_colors(&self, selection: &SelectionSet) -> Vec<Color32> {
        self.bins
            .iter()
            .map(|bin| emphasis_color(bin.selected_ratio(selection)))
            .collect()
    }
}
