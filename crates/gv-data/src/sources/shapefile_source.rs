//! Shapefile decoding via the `shapefile` crate

use std::io::Cursor;

use anyhow::Context;
use async_trait::async_trait;
use geojson::{Feature, FeatureCollection, Geometry, JsonObject, JsonValue, Value};
use shapefile::dbase::{FieldValue, Record};
use shapefile::{Point, PolygonRing, Shape};
use tracing::{debug, info};

use super::{FeatureDecoder, ShapefilePair};
use crate::DataError;

/// Decodes `.shp`/`.dbf` byte pairs off the async runtime
#[derive(Debug, Clone, Copy, Default)]
pub struct ShapefileDecoder;

#[async_trait]
impl FeatureDecoder for ShapefileDecoder {
    async fn decode(&self, pair: ShapefilePair) -> anyhow::Result<FeatureCollection> {
        let name = pair.name.clone();
        let collection = tokio::task::spawn_blocking(move || decode_pair(&pair.shp, &pair.dbf))
            .await
            .map_err(DataError::from)??;

        info!(file = %name, features = collection.features.len(), "Shapefile decoded");
        Ok(collection)
    }

    fn decoder_name(&self) -> &str {
        "shapefile"
    }
}

/// Decode an in-memory shapefile pair into GeoJSON features
pub fn decode_pair(shp: &[u8], dbf: &[u8]) -> anyhow::Result<FeatureCollection> {
    let shape_reader = shapefile::ShapeReader::new(Cursor::new(shp.to_vec()))
        .map_err(|e| DataError::Shapefile(format!("Failed to read .shp: {}", e)))?;
    let dbase_reader = shapefile::dbase::Reader::new(Cursor::new(dbf.to_vec()))
        .map_err(|e| DataError::Shapefile(format!("Failed to read .dbf: {}", e)))?;
    let mut reader = shapefile::Reader::new(shape_reader, dbase_reader);

    let mut features = Vec::new();
    for (index, result) in reader.iter_shapes_and_records().enumerate() {
        let (shape, record) = result
            .map_err(|e| DataError::Shapefile(e.to_string()))
            .with_context(|| format!("reading feature {}", index))?;

        features.push(Feature {
            bbox: None,
            geometry: shape_to_geometry(&shape, index)?.map(Geometry::new),
            id: None,
            properties: Some(record_to_properties(record)),
            foreign_members: None,
        });
    }

    debug!(count = features.len(), "Read shapes and records");
    Ok(FeatureCollection {
        bbox: None,
        features,
        foreign_members: None,
    })
}

fn xy(p: &Point) -> Vec<f64> {
    vec![p.x, p.y]
}

/// Group polygon rings: each outer ring opens a polygon, inner rings attach to the last one
fn group_rings<P>(
    rings: &[PolygonRing<P>],
    coord: impl Fn(&P) -> Vec<f64>,
) -> Vec<Vec<Vec<Vec<f64>>>> {
    let mut polygons: Vec<Vec<Vec<Vec<f64>>>> = Vec::new();
    for ring in rings {
        let points: Vec<Vec<f64>> = ring.points().iter().map(&coord).collect();
        match ring {
            PolygonRing::Outer(_) => polygons.push(vec![points]),
            PolygonRing::Inner(_) => match polygons.last_mut() {
                Some(polygon) => polygon.push(points),
                None => polygons.push(vec![points]),
            },
        }
    }
    polygons
}

fn polygon_value(polygons: Vec<Vec<Vec<Vec<f64>>>>) -> Value {
    if polygons.len() == 1 {
        Value::Polygon(polygons.into_iter().next().unwrap_or_default())
    } else {
        Value::MultiPolygon(polygons)
    }
}

fn line_value(parts: Vec<Vec<Vec<f64>>>) -> Value {
    if parts.len() == 1 {
        Value::LineString(parts.into_iter().next().unwrap_or_default())
    } else {
        Value::MultiLineString(parts)
    }
}

fn shape_to_geometry(shape: &Shape, index: usize) -> Result<Option<Value>, DataError> {
    let value = match shape {
        Shape::NullShape => return Ok(None),
        Shape::Point(p) => Value::Point(xy(p)),
        Shape::PointM(p) => Value::Point(vec![p.x, p.y]),
        Shape::PointZ(p) => Value::Point(vec![p.x, p.y]),
        Shape::Multipoint(mp) => Value::MultiPoint(mp.points().iter().map(xy).collect()),
        Shape::MultipointM(mp) => {
            Value::MultiPoint(mp.points().iter().map(|p| vec![p.x, p.y]).collect())
        }
        Shape::MultipointZ(mp) => {
            Value::MultiPoint(mp.points().iter().map(|p| vec![p.x, p.y]).collect())
        }
        Shape::Polygon(poly) => polygon_value(group_rings(poly.rings(), xy)),
        Shape::PolygonM(poly) => polygon_value(group_rings(poly.rings(), |p| vec![p.x, p.y])),
        Shape::PolygonZ(poly) => polygon_value(group_rings(poly.rings(), |p| vec![p.x, p.y])),
        Shape::Polyline(line) => line_value(
            line.parts()
                .iter()
                .map(|part| part.iter().map(xy).collect())
                .collect(),
        ),
        Shape::PolylineM(line) => line_value(
            line.parts()
                .iter()
                .map(|part| part.iter().map(|p| vec![p.x, p.y]).collect())
                .collect(),
        ),
        Shape::PolylineZ(line) => line_value(
            line.parts()
                .iter()
                .map(|part| part.iter().map(|p| vec![p.x, p.y]).collect())
                .collect(),
        ),
        Shape::Multipatch(_) => {
            return Err(DataError::UnsupportedGeometry {
                index,
                reason: "multipatch shapes are not supported".to_string(),
            })
        }
    };
    Ok(Some(value))
}

fn number(n: f64) -> JsonValue {
    serde_json::Number::from_f64(n)
        .map(JsonValue::Number)
        .unwrap_or(JsonValue::Null)
}

fn field_to_json(value: FieldValue) -> JsonValue {
    match value {
        FieldValue::Character(Some(s)) => JsonValue::String(s.trim_end().to_string()),
        FieldValue::Numeric(Some(n)) => number(n),
        FieldValue::Float(Some(f)) => number(f as f64),
        FieldValue::Integer(i) => JsonValue::Number(i.into()),
        FieldValue::Double(d) => number(d),
        FieldValue::Currency(c) => number(c),
        FieldValue::Logical(Some(b)) => JsonValue::Bool(b),
        FieldValue::Date(Some(date)) => {
            JsonValue::String(format!("{:04}-{:02}-{:02}", date.year(), date.month(), date.day()))
        }
        FieldValue::Memo(s) => JsonValue::String(s),
        FieldValue::DateTime(dt) => JsonValue::String(format!(
            "{:04}-{:02}-{:02}",
            dt.date().year(),
            dt.date().month(),
            dt.date().day()
        )),
        FieldValue::Character(None)
        | FieldValue::Numeric(None)
        | FieldValue::Float(None)
        | FieldValue::Logical(None)
        | FieldValue::Date(None) => JsonValue::Null,
    }
}

fn record_to_properties(record: Record) -> JsonObject {
    record
        .into_iter()
        .map(|(name, value)| (name, field_to_json(value)))
        .collect()
}
