//! Application controller for the geospatial visualization workspace
//!
//! [`App`] ties the workspace store, the settings store and the view
//! adapters together. Hosts supply rendering surfaces through a
//! [`SurfaceFactory`] and user notices through a [`gv_core::Notifier`].

mod app;
mod error;
pub mod headless;
mod views;

pub use app::{load_dataset, App, ImportSource};
pub use error::{AppError, Result};
pub use views::{SurfaceFactory, WorkspaceSurfaces, WorkspaceViews};

use tracing_subscriber::EnvFilter;

/// Install the global `tracing` subscriber.
///
/// `RUST_LOG` overrides the default `info` level. Calling this twice is harmless.
pub fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let _ = tracing_subscriber::fmt().with_env_filter(filter).try_init();
}
