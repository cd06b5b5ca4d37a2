//! Decoders turning raw input files into GeoJSON feature collections

pub mod geojson_source;
pub mod shapefile_source;

use std::path::Path;

use async_trait::async_trait;
use geojson::FeatureCollection;

use crate::DataError;

pub use geojson_source::parse_geojson;
pub use shapefile_source::ShapefileDecoder;

/// The geometry (`.shp`) and attribute table (`.dbf`) of a shapefile
#[derive(Debug, Clone)]
pub struct ShapefilePair {
    /// Display name, usually the `.shp` file name
    pub name: String,
    pub shp: Vec<u8>,
    pub dbf: Vec<u8>,
}

impl ShapefilePair {
    pub fn new(name: impl Into<String>, shp: Vec<u8>, dbf: Vec<u8>) -> Self {
        Self {
            name: name.into(),
            shp,
            dbf,
        }
    }

    /// Read both files. Either path missing is an input error.
    pub async fn read(shp: Option<&Path>, dbf: Option<&Path>) -> Result<Self, DataError> {
        let (shp, dbf) = match (shp, dbf) {
            (Some(shp), Some(dbf)) => (shp, dbf),
            _ => return Err(DataError::MissingFiles),
        };

        let (shp_bytes, dbf_bytes) = tokio::try_join!(tokio::fs::read(shp), tokio::fs::read(dbf))?;

        let name = shp
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or("unnamed.shp")
            .to_string();

        Ok(Self::new(name, shp_bytes, dbf_bytes))
    }
}

/// Trait for decoders producing a GeoJSON-like feature collection
#[async_trait]
pub trait FeatureDecoder: Send + Sync {
    /// Decode a shapefile pair
    async fn decode(&self, pair: ShapefilePair) -> anyhow::Result<FeatureCollection>;

    /// Decoder name, for logs
    fn decoder_name(&self) -> &str;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_read_requires_both_files() {
        let result = ShapefilePair::read(Some(Path::new("roads.shp")), None).await;
        assert!(matches!(result, Err(DataError::MissingFiles)));
    }

    #[tokio::test]
    async fn test_read_missing_file_is_io_error() {
        let result = ShapefilePair::read(
            Some(Path::new("/nonexistent/roads.shp")),
            Some(Path::new("/nonexistent/roads.dbf")),
        )
        .await;
        assert!(matches!(result, Err(DataError::Io(_))));
    }
}
