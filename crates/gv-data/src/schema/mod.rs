//! Conversion of decoded feature collections into datasets

use geo_types::Geometry;
use geojson::{FeatureCollection, JsonObject, JsonValue};
use gv_core::{Dataset, Properties, PropertyValue};
use tracing::{debug, info};

use crate::coordinates::resolve_fields;
use crate::DataError;

/// Map a JSON attribute onto the dataset's value model
pub fn property_value(value: &JsonValue) -> PropertyValue {
    match value {
        JsonValue::Null => PropertyValue::Null,
        JsonValue::Bool(b) => PropertyValue::Bool(*b),
        JsonValue::Number(n) => n
            .as_f64()
            .map(PropertyValue::Number)
            .unwrap_or(PropertyValue::Null),
        JsonValue::String(s) => PropertyValue::Text(s.clone()),
        other => PropertyValue::Text(other.to_string()),
    }
}

fn properties(object: Option<&JsonObject>) -> Properties {
    object
        .map(|o| o.iter().map(|(k, v)| (k.clone(), property_value(v))).collect())
        .unwrap_or_default()
}

/// Build a dataset from a decoded collection.
///
/// Features without geometry get a point synthesized from their coordinate
/// columns. Fails without producing anything if any feature cannot be placed.
pub fn dataset_from_collection(
    name: impl Into<String>,
    collection: FeatureCollection,
) -> Result<Dataset, DataError> {
    let name = name.into();
    if collection.features.is_empty() {
        return Err(DataError::EmptyDataset);
    }

    let fields = resolve_fields(&collection.features)?;

    let mut records = Vec::with_capacity(collection.features.len());
    for (index, feature) in collection.features.into_iter().enumerate() {
        let geometry = match feature.geometry {
            Some(geometry) => {
                Geometry::<f64>::try_from(geometry).map_err(|e| DataError::UnsupportedGeometry {
                    index,
                    reason: e.to_string(),
                })?
            }
            None => fields
                .and_then(|f| f.point(feature.properties.as_ref()))
                .map(Geometry::Point)
                .ok_or(DataError::MissingCoordinateFields)?,
        };
        records.push((geometry, properties(feature.properties.as_ref())));
    }

    let dataset = Dataset::new(name, records);
    debug!(properties = ?dataset.property_names(), "Dataset schema");
    info!(
        dataset = dataset.name(),
        features = dataset.len(),
        numeric = dataset.numeric_properties().len(),
        "Dataset built"
    );
    Ok(dataset)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parse_geojson;

    #[test]
    fn test_polygons_and_points() {
        let fc = parse_geojson(
            r#"{"type":"FeatureCollection","features":[
                {"type":"Feature",
                 "geometry":{"type":"Polygon","coordinates":[[[0,0],[1,0],[1,1],[0,0]]]},
                 "properties":{"name":"a","pop":12,"tags":[1,2]}},
                {"type":"Feature","geometry":{"type":"Point","coordinates":[5,5]},
                 "properties":{"name":"b","pop":null,"tags":[]}}
            ]}"#,
        )
        .unwrap();

        let dataset = dataset_from_collection("test", fc).unwrap();
        assert_eq!(dataset.len(), 2);
        assert_eq!(dataset.numeric_properties(), vec!["pop".to_string()]);
        assert!(!dataset.features()[0].is_point());
        assert!(dataset.features()[1].is_point());
        assert_eq!(dataset.features()[1].property("pop"), Some(&PropertyValue::Null));
        assert_eq!(
            dataset.features()[0].property("tags"),
            Some(&PropertyValue::Text("[1,2]".to_string()))
        );
    }

    #[test]
    fn test_points_synthesized_from_columns() {
        let fc = parse_geojson(
            r#"{"type":"FeatureCollection","features":[
                {"type":"Feature","geometry":null,"properties":{"Lat":51.5,"Long":-0.1,"P":1}},
                {"type":"Feature","geometry":null,"properties":{"Lat":"48.8","Long":"2.3","P":2}}
            ]}"#,
        )
        .unwrap();

        let dataset = dataset_from_collection("cities", fc).unwrap();
        match dataset.features()[1].geometry() {
            Geometry::Point(p) => assert_eq!((p.x(), p.y()), (2.3, 48.8)),
            other => panic!("expected point, got {:?}", other),
        }
    }

    #[test]
    fn test_invalid_coordinates_fail_import() {
        let fc = parse_geojson(
            r#"{"type":"FeatureCollection","features":[
                {"type":"Feature","geometry":null,"properties":{"Lat":95,"Long":0}},
                {"type":"Feature","geometry":null,"properties":{"Lat":"x","Long":0}}
            ]}"#,
        )
        .unwrap();

        assert!(matches!(
            dataset_from_collection("bad", fc),
            Err(DataError::InvalidCoordinates { index: 0, .. })
        ));
    }

    #[test]
    fn test_empty_collection_rejected() {
        let fc = parse_geojson(r#"{"type":"FeatureCollection","features":[]}"#).unwrap();
        assert!(matches!(dataset_from_collection("empty", fc), Err(DataError::EmptyDataset)));
    }
}
