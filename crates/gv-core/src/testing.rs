//! Fixtures shared by unit tests

use crate::model::{Dataset, Properties, PropertyValue};
use geo_types::{point, Geometry};

/// Point dataset with a text `Name` and a numeric `P` property per value
pub fn dataset(values: &[f64]) -> Dataset {
    Dataset::new(
        "test",
        values.iter().enumerate().map(|(i, v)| {
            let mut props = Properties::new();
            props.insert("Name".to_string(), PropertyValue::Text(format!("f{}", i)));
            props.insert("P".to_string(), PropertyValue::Number(*v));
            (Geometry::Point(point!(x: i as f64, y: 0.0)), props)
        }),
    )
}
