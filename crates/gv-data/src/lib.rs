//! Data import for the geospatial visualization workspace
//!
//! Raw inputs (a `.shp`/`.dbf` pair or GeoJSON text) are decoded into a
//! [`geojson::FeatureCollection`] and then converted into a
//! [`gv_core::Dataset`], synthesizing point geometry from coordinate
//! columns where the input carries none.

pub mod coordinates;
pub mod schema;
pub mod sources;

use thiserror::Error;
use tokio::task::JoinError;

// Re-exports
pub use schema::dataset_from_collection;
pub use sources::{parse_geojson, FeatureDecoder, ShapefileDecoder, ShapefilePair};

/// Errors that can occur while importing data
#[derive(Error, Debug)]
pub enum DataError {
    #[error("Please select both .shp and .dbf files")]
    MissingFiles,

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Error processing shapefile: {0}")]
    Shapefile(String),

    #[error("Invalid GeoJSON: {0}")]
    GeoJson(String),

    #[error("The file contains no features")]
    EmptyDataset,

    #[error("Cannot find latitude and longitude fields in the data")]
    MissingCoordinateFields,

    #[error("Invalid coordinates for feature {index}: {lat_field}={lat}, {lon_field}={lon}")]
    InvalidCoordinates {
        index: usize,
        lat_field: &'static str,
        lon_field: &'static str,
        lat: String,
        lon: String,
    },

    #[error("Unsupported geometry for feature {index}: {reason}")]
    UnsupportedGeometry { index: usize, reason: String },

    #[error("Join error: {0}")]
    Join(#[from] JoinError),
}
