//! Error types for workspace and settings operations

use thiserror::Error;

use crate::state::WorkspaceId;

/// Errors raised by the workspace store
#[derive(Error, Debug, Clone, PartialEq)]
pub enum WorkspaceError {
    #[error("Workspace {0} not found")]
    NotFound(WorkspaceId),

    #[error("The last remaining workspace cannot be closed")]
    LastWorkspace,

    #[error("An import is already in progress for workspace {0}")]
    ImportInProgress(WorkspaceId),

    #[error("Import ticket {ticket} is not the active import of workspace {workspace}")]
    StaleImport { workspace: WorkspaceId, ticket: u64 },

    #[error("Please import data first.")]
    NoDataset,

    #[error("Unknown property: {0}")]
    UnknownProperty(String),

    #[error("Property {0} is not numeric")]
    NonNumericProperty(String),
}

/// Errors raised when validating style settings
#[derive(Error, Debug, Clone, PartialEq)]
pub enum SettingsError {
    #[error("Invalid color for {field}: {value:?} (expected #rrggbb)")]
    InvalidColor { field: &'static str, value: String },

    #[error("Please enter a valid number for {field} (got {value:?})")]
    InvalidNumber { field: &'static str, value: String },

    #[error("{field} must be between {min} and {max} (got {value:?})")]
    OutOfRange {
        field: &'static str,
        value: String,
        min: f32,
        max: f32,
    },

    #[error("Unknown value for {field}: {value:?}")]
    UnknownKeyword { field: &'static str, value: String },

    #[error("Malformed settings: {0}")]
    Malformed(String),
}
