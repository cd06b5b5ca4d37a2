//! Imported feature data shared by every view of a workspace

use geo_types::Geometry;
use indexmap::IndexMap;
use std::fmt;

/// A single attribute value from the attribute table
#[derive(Debug, Clone, PartialEq)]
pub enum PropertyValue {
    Number(f64),
    Text(String),
    Bool(bool),
    Null,
}

impl PropertyValue {
    /// Numeric view of the value, used for coloring and binning
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            PropertyValue::Number(n) => Some(*n),
            _ => None,
        }
    }

    /// Lenient numeric parse that also accepts numeric text
    pub fn parse_f64(&self) -> Option<f64> {
        match self {
            PropertyValue::Number(n) => Some(*n),
            PropertyValue::Text(s) => s.trim().parse::<f64>().ok(),
            _ => None,
        }
    }

    pub fn is_number(&self) -> bool {
        matches!(self, PropertyValue::Number(_))
    }
}

impl fmt::Display for PropertyValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PropertyValue::Number(n) => write!(f, "{}", n),
            PropertyValue::Text(s) => f.write_str(s),
            PropertyValue::Bool(b) => write!(f, "{}", b),
            PropertyValue::Null => Ok(()),
        }
    }
}

/// Ordered property bag of a feature
pub type Properties = IndexMap<String, PropertyValue>;

/// One geometry + attribute record of an imported dataset
#[derive(Debug, Clone)]
pub struct Feature {
    index: usize,
    geometry: Geometry<f64>,
    properties: Properties,
}

impl Feature {
    pub fn index(&self) -> usize {
        self.index
    }

    pub fn geometry(&self) -> &Geometry<f64> {
        &self.geometry
    }

    pub fn properties(&self) -> &Properties {
        &self.properties
    }

    pub fn property(&self, name: &str) -> Option<&PropertyValue> {
        self.properties.get(name)
    }

    /// Whether the feature renders as a point marker rather than a shape
    pub fn is_point(&self) -> bool {
        matches!(self.geometry, Geometry::Point(_) | Geometry::MultiPoint(_))
    }
}

/// Minimum and maximum of a numeric property
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ValueRange {
    pub min: f64,
    pub max: f64,
}

impl ValueRange {
    /// Range over the finite values of an iterator, `None` if there are none
    pub fn from_values(values: impl IntoIterator<Item = f64>) -> Option<Self> {
        values
            .into_iter()
            .filter(|v| v.is_finite())
            .fold(None, |range, v| match range {
                None => Some(ValueRange { min: v, max: v }),
                Some(r) => Some(ValueRange {
                    min: r.min.min(v),
                    max: r.max.max(v),
                }),
            })
    }

    pub fn span(&self) -> f64 {
        self.max - self.min
    }
}

/// An imported feature collection. Feature indices are positional and never reassigned.
#[derive(Debug, Clone)]
pub struct Dataset {
    name: String,
    features: Vec<Feature>,
}

impl Dataset {
    /// Build a dataset, assigning each feature its position as index
    pub fn new(
        name: impl Into<String>,
        records: impl IntoIterator<Item = (Geometry<f64>, Properties)>,
    ) -> Self {
        let features = records
            .into_iter()
            .enumerate()
            .map(|(index, (geometry, properties))| Feature {
                index,
                geometry,
                properties,
            })
            .collect();

        Self {
            name: name.into(),
            features,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn len(&self) -> usize {
        self.features.len()
    }

    pub fn is_empty(&self) -> bool {
        self.features.is_empty()
    }

    pub fn features(&self) -> &[Feature] {
        &self.features
    }

    pub fn feature(&self, index: usize) -> Option<&Feature> {
        self.features.get(index)
    }

    /// Property names in attribute-table order, taken from the first feature
    pub fn property_names(&self) -> Vec<String> {
        self.features
            .first()
            .map(|f| f.properties.keys().cloned().collect())
            .unwrap_or_default()
    }

    /// Properties whose value in the first feature is numeric
    pub fn numeric_properties(&self) -> Vec<String> {
        self.features
            .first()
            .map(|f| {
                f.properties
                    .iter()
                    .filter(|(_, v)| v.is_number())
                    .map(|(k, _)| k.clone())
                    .collect()
            })
            .unwrap_or_default()
    }

    pub fn is_numeric_property(&self, name: &str) -> bool {
        self.features
            .first()
            .and_then(|f| f.property(name))
            .map(PropertyValue::is_number)
            .unwrap_or(false)
    }

    /// `(index, value)` pairs of a property, skipping non-numeric and NaN values
    pub fn numeric_values(&self, property: &str) -> Vec<(usize, f64)> {
        self.features
            .iter()
            .filter_map(|f| {
                f.property(property)
                    .and_then(PropertyValue::as_f64)
                    .filter(|v| v.is_finite())
                    .map(|v| (f.index, v))
            })
            .collect()
    }

    pub fn value_range(&self, property: &str) -> Option<ValueRange> {
        ValueRange::from_values(self.numeric_values(property).into_iter().map(|(_, v)| v))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::dataset;

    #[test]
    fn test_indices_are_positional() {
        let ds = dataset(&[1.0, 2.0, 3.0]);
        let indices: Vec<usize> = ds.features().iter().map(Feature::index).collect();
        assert_eq!(indices, vec![0, 1, 2]);
    }

    #[test]
    fn test_numeric_properties_follow_first_feature() {
        let ds = dataset(&[1.0, 2.0]);
        assert_eq!(ds.property_names(), vec!["Name", "P"]);
        assert_eq!(ds.numeric_properties(), vec!["P"]);
        assert!(!ds.is_numeric_property("Name"));
    }

    #[test]
    fn test_nan_excluded_from_range() {
        let ds = dataset(&[4.0, f64::NAN, -2.0]);
        assert_eq!(ds.numeric_values("P").len(), 2);
        assert_eq!(ds.value_range("P"), Some(ValueRange { min: -2.0, max: 4.0 }));
        assert_eq!(ds.value_range("Name"), None);
    }
}
