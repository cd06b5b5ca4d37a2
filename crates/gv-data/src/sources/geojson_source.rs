//! GeoJSON input, for hosts that convert shapefiles before handing them over

use geojson::{Feature, FeatureCollection, GeoJson};

use crate::DataError;

/// Parse GeoJSON text into a feature collection.
///
/// A bare feature or geometry is wrapped into a single-feature collection.
pub fn parse_geojson(text: &str) -> Result<FeatureCollection, DataError> {
    let geojson: GeoJson = text
        .parse()
        .map_err(|e: geojson::Error| DataError::GeoJson(e.to_string()))?;

    Ok(match geojson {
        GeoJson::FeatureCollection(fc) => fc,
        GeoJson::Feature(feature) => single(feature),
        GeoJson::Geometry(geometry) => single(Feature {
            bbox: None,
            geometry: Some(geometry),
            id: None,
            properties: None,
            foreign_members: None,
        }),
    })
}

fn single(feature: Feature) -> FeatureCollection {
    FeatureCollection {
        bbox: None,
        features: vec![feature],
        foreign_members: None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_collection() {
        let fc = parse_geojson(
            r#"{"type":"FeatureCollection","features":[
                {"type":"Feature","geometry":{"type":"Point","coordinates":[1.0,2.0]},
                 "properties":{"a":1}},
                {"type":"Feature","geometry":null,"properties":{"Lat":3,"Long":4}}
            ]}"#,
        )
        .unwrap();
        assert_eq!(fc.features.len(), 2);
        assert!(fc.features[1].geometry.is_none());
    }

    #[test]
    fn test_bare_geometry_is_wrapped() {
        let fc = parse_geojson(r#"{"type":"Point","coordinates":[1.0,2.0]}"#).unwrap();
        assert_eq!(fc.features.len(), 1);
    }

    #[test]
    fn test_invalid_text() {
        assert!(matches!(parse_geojson("{not json"), Err(DataError::GeoJson(_))));
    }
}
