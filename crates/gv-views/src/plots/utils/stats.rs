//! Statistical utilities for plots

use serde::Serialize;

/// Summary statistics of a numeric property
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Summary {
    pub count: usize,
    pub min: f64,
    pub max: f64,
    pub mean: f64,
    /// Population standard deviation
    pub std_dev: f64,
}

impl Summary {
    /// `None` when there are no finite values
    pub fn from_values(values: &[f64]) -> Option<Self> {
        let finite: Vec<f64> = values.iter().copied().filter(|v| v.is_finite()).collect();
        if finite.is_empty() {
            return None;
        }

        let n = finite.len() as f64;
        let mean = finite.iter().sum::<f64>() / n;
        let variance = finite.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / n;

        Some(Self {
            count: finite.len(),
            min: finite.iter().copied().fold(f64::INFINITY, f64::min),
            max: finite.iter().copied().fold(f64::NEG_INFINITY, f64::max),
            mean,
            std_dev: variance.sqrt(),
        })
    }
}

/// Five-number summary of one property for a box plot
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BoxSummary {
    pub property: String,
    pub min: f64,
    pub q1: f64,
    pub median: f64,
    pub q3: f64,
    pub max: f64,
}

impl BoxSummary {
    pub fn from_values(property: impl Into<String>, values: &[f64]) -> Option<Self> {
        let sorted = sorted_finite(values);
        let (first, last) = (*sorted.first()?, *sorted.last()?);
        let (q1, median, q3) = calculate_quartiles(&sorted);

        Some(Self {
            property: property.into(),
            min: first,
            q1,
            median,
            q3,
            max: last,
        })
    }
}

fn sorted_finite(values: &[f64]) -> Vec<f64> {
    let mut sorted: Vec<f64> = values.iter().copied().filter(|v| v.is_finite()).collect();
    sorted.sort_by(f64::total_cmp);
    sorted
}

/// Calculate quartiles using linear interpolation
pub fn calculate_quartiles(values: &[f64]) -> (f64, f64, f64) {
    let sorted = sorted_finite(values);

    let n = sorted.len();
    if n == 0 {
        return (0.0, 0.0, 0.0);
    }

    let q1 = interpolate(&sorted, (n - 1) as f64 * 0.25);
    let q2 = interpolate(&sorted, (n - 1) as f64 * 0.5);
    let q3 = interpolate(&sorted, (n - 1) as f64 * 0.75);

    (q1, q2, q3)
}

fn interpolate(sorted: &[f64], idx: f64) -> f64 {
    let lower = idx.floor() as usize;
    let upper = idx.ceil() as usize;

    if lower == upper || upper >= sorted.len() {
        sorted[lower]
    } else {
        let fraction = idx - lower as f64;
        sorted[lower] * (1.0 - fraction) + sorted[upper] * fraction
    }
}

/// Empirical CDF: each sorted value paired with `(i + 1) / n`
pub fn cumulative_distribution(values: &[f64]) -> Vec<(f64, f64)> {
    let sorted = sorted_finite(values);
    let n = sorted.len() as f64;
    sorted
        .into_iter()
        .enumerate()
        .map(|(i, v)| (v, (i + 1) as f64 / n))
        .collect()
}
