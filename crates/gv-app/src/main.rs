//! Headless entry point: import a file and log what each linked view draws

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{bail, Context, Result};
use gv_app::headless::HeadlessSurfaces;
use gv_app::{init_tracing, App, ImportSource};
use gv_core::{NoticeLevel, NoticeLog};
use tracing::{error, info};

fn source_from_args(args: &[String]) -> Result<ImportSource> {
    let path_with = |ext: &str| {
        args.iter().map(PathBuf::from).find(|p| {
            p.extension()
                .and_then(|e| e.to_str())
                .is_some_and(|e| e.eq_ignore_ascii_case(ext))
        })
    };

    if let Some(path) = path_with("geojson").or_else(|| path_with("json")) {
        let text = std::fs::read_to_string(&path)
            .with_context(|| format!("reading {}", path.display()))?;
        let name = path
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or("data.geojson")
            .to_string();
        return Ok(ImportSource::GeoJson { name, text });
    }

    let (shp, dbf) = (path_with("shp"), path_with("dbf"));
    if shp.is_none() && dbf.is_none() {
        bail!("usage: geovis <file.shp> <file.dbf> | <file.geojson>");
    }
    Ok(ImportSource::ShapefilePaths { shp, dbf })
}

#[tokio::main]
async fn main() -> Result<()> {
    init_tracing();

    let args: Vec<String> = std::env::args().skip(1).collect();
    let source = source_from_args(&args)?;

    let notices = Arc::new(NoticeLog::new());
    let mut app = App::new(Arc::new(HeadlessSurfaces), notices.clone());

    info!("Starting GeoVis");
    let imported = app.import(source).await;

    if imported.is_ok() {
        app.show_map()?;
        app.show_table()?;
        let _ = app.select_histogram_property(None);
        let _ = app.show_box_plot();
        info!(variables = ?app.variables()?, "Import complete");
    }

    for notice in notices.drain() {
        match notice.level {
            NoticeLevel::Error => error!("{}", notice.message),
            NoticeLevel::Info => info!("{}", notice.message),
        }
    }

    imported.map_err(Into::into)
}
