//! Feature-by-property heatmap of every numeric property

use gv_core::{Dataset, PropertyValue};
use serde::Serialize;

/// Grid of numeric values, one row per feature and one column per property
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Heatmap {
    /// Column labels
    pub properties: Vec<String>,
    /// Row labels, `Feature 1` onwards
    pub features: Vec<String>,
    /// `cells[row][column]`; `None` where the feature has no numeric value
    pub cells: Vec<Vec<Option<f64>>>,
}

impl Heatmap {
    pub fn build(dataset: &Dataset, properties: &[String]) -> Self {
        let cells = dataset
            .features()
            .iter()
            .map(|feature| {
                properties
                    .iter()
                    .map(|p| {
                        feature
                            .property(p)
                            .and_then(PropertyValue::as_f64)
                            .filter(|v| v.is_finite())
                    })
                    .collect()
            })
            .collect();

        Self {
            properties: properties.to_vec(),
            features: dataset
                .features()
                .iter()
                .map(|f| format!("Feature {}", f.index() + 1))
                .collect(),
            cells,
        }
    }

    /// Smallest and largest cell, for the color scale
    pub fn value_range(&self) -> Option<(f64, f64)> {
        self.cells
            .iter()
            .flatten()
            .flatten()
            .fold(None, |acc, &v| match acc {
                None => Some((v, v)),
                Some((lo, hi)) => Some((lo.min(v), hi.max(v))),
            })
    }
}
