//! Core functionality for the geospatial visualization workspace
//!
//! This crate owns the data model, the per-workspace selection state and
//! the global style settings that every view adapter reads.

pub mod error;
pub mod events;
pub mod model;
pub mod notice;
pub mod settings;
pub mod state;
pub mod sync;

#[cfg(test)]
mod testing;

// Re-export commonly used types
pub use error::{SettingsError, WorkspaceError};
pub use events::EventBus;
pub use model::{Dataset, Feature, Properties, PropertyValue, ValueRange};
pub use notice::{Notice, NoticeLevel, NoticeLog, Notifier};
pub use settings::{
    BinClickMode, SelectionMode, SettingsDelta, SettingsForm, SettingsStore, StyleSettings,
    MAX_BIN_COUNT,
};
pub use state::{ImportState, ImportTicket, Workspace, WorkspaceId, WorkspaceStore};
pub use sync::{
    SelectionChange, SelectionContext, SelectionEngine, SelectionSet, SelectionSubscriber,
};

/// Color type used by settings and surfaces
pub use egui::Color32;
