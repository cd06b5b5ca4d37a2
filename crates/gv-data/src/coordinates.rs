//! Point synthesis for features that carry coordinates as attributes

use geo_types::Point;
use geojson::{Feature, JsonObject, JsonValue};
use tracing::debug;

use crate::DataError;

/// Candidate `(latitude, longitude)` column pairs, in priority order
pub const COORDINATE_FIELDS: [(&str, &str); 2] = [("Lat", "Long"), ("Y", "X")];

/// Column pair chosen to place geometry-less features
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CoordinateFields {
    pub lat: &'static str,
    pub lon: &'static str,
}

impl CoordinateFields {
    /// Point at the feature's coordinates, `None` if they are missing or out of bounds
    pub fn point(&self, properties: Option<&JsonObject>) -> Option<Point<f64>> {
        let properties = properties?;
        let lat = coordinate(properties.get(self.lat)?)?;
        let lon = coordinate(properties.get(self.lon)?)?;

        let in_bounds = (-90.0..=90.0).contains(&lat) && (-180.0..=180.0).contains(&lon);
        in_bounds.then(|| Point::new(lon, lat))
    }
}

fn coordinate(value: &JsonValue) -> Option<f64> {
    let parsed = match value {
        JsonValue::Number(n) => n.as_f64(),
        JsonValue::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    };
    parsed.filter(|v| v.is_finite())
}

fn display(properties: Option<&JsonObject>, field: &str) -> String {
    properties
        .and_then(|p| p.get(field))
        .map(|v| match v {
            JsonValue::String(s) => s.clone(),
            other => other.to_string(),
        })
        .unwrap_or_else(|| "missing".to_string())
}

/// Pick the column pair that places every geometry-less feature.
///
/// Returns `Ok(None)` when all features already have geometry. A pair is a
/// candidate when the first geometry-less feature carries both columns; the
/// first candidate that yields valid coordinates for every such feature wins.
pub fn resolve_fields(features: &[Feature]) -> Result<Option<CoordinateFields>, DataError> {
    let missing: Vec<(usize, Option<&JsonObject>)> = features
        .iter()
        .enumerate()
        .filter(|(_, f)| f.geometry.is_none())
        .map(|(i, f)| (i, f.properties.as_ref()))
        .collect();

    let Some(&(_, first)) = missing.first() else {
        return Ok(None);
    };

    let mut first_error = None;
    for (lat, lon) in COORDINATE_FIELDS {
        let has_pair = first.map(|p| p.contains_key(lat) && p.contains_key(lon)).unwrap_or(false);
        if !has_pair {
            continue;
        }

        let fields = CoordinateFields { lat, lon };
        match missing.iter().find(|(_, props)| fields.point(*props).is_none()) {
            None => {
                debug!(lat, lon, features = missing.len(), "Synthesizing point geometry");
                return Ok(Some(fields));
            }
            Some(&(index, props)) => {
                first_error.get_or_insert(DataError::InvalidCoordinates {
                    index,
                    lat_field: lat,
                    lon_field: lon,
                    lat: display(props, lat),
                    lon: display(props, lon),
                });
            }
        }
    }

    Err(first_error.unwrap_or(DataError::MissingCoordinateFields))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn feature(properties: JsonValue) -> Feature {
        Feature {
            bbox: None,
            geometry: None,
            id: None,
            properties: properties.as_object().cloned(),
            foreign_members: None,
        }
    }

    #[test]
    fn test_lat_long_preferred() {
        let features = vec![
            feature(json!({"Lat": 10.0, "Long": 20.0, "Y": 1.0, "X": 2.0})),
            feature(json!({"Lat": "-45.5", "Long": "170", "Y": 1.0, "X": 2.0})),
        ];
        let fields = resolve_fields(&features).unwrap().unwrap();
        assert_eq!(fields.lat, "Lat");

        let point = fields.point(features[1].properties.as_ref()).unwrap();
        assert_eq!((point.x(), point.y()), (170.0, -45.5));
    }

    #[test]
    fn test_falls_back_to_xy() {
        let features = vec![
            feature(json!({"Lat": 100.0, "Long": 20.0, "Y": 1.0, "X": 2.0})),
            feature(json!({"Lat": 10.0, "Long": 20.0, "Y": 3.0, "X": 4.0})),
        ];
        let fields = resolve_fields(&features).unwrap().unwrap();
        assert_eq!((fields.lat, fields.lon), ("Y", "X"));
    }

    #[test]
    fn test_invalid_coordinates_reported() {
        let features = vec![
            feature(json!({"Lat": 10.0, "Long": 20.0})),
            feature(json!({"Lat": "north", "Long": 20.0})),
        ];
        match resolve_fields(&features) {
            Err(DataError::InvalidCoordinates { index, lat, .. }) => {
                assert_eq!(index, 1);
                assert_eq!(lat, "north");
            }
            other => panic!("unexpected result: {:?}", other),
        }
    }

    #[test]
    fn test_missing_fields() {
        let features = vec![feature(json!({"name": "a"}))];
        assert!(matches!(resolve_fields(&features), Err(DataError::MissingCoordinateFields)));
    }

    #[test]
    fn test_no_synthesis_needed() {
        let mut f = feature(json!({}));
        f.geometry = Some(geojson::Geometry::new(geojson::Value::Point(vec![1.0, 2.0])));
        assert_eq!(resolve_fields(&[f]).unwrap(), None);
    }
}
