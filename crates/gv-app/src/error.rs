//! Application-level errors

use gv_core::{SettingsError, WorkspaceError};
use gv_data::DataError;
use thiserror::Error;

/// Errors surfaced by [`crate::App`] operations
#[derive(Error, Debug)]
pub enum AppError {
    #[error(transparent)]
    Workspace(#[from] WorkspaceError),

    #[error(transparent)]
    Settings(#[from] SettingsError),

    #[error(transparent)]
    Data(#[from] DataError),

    /// Failure reported by a feature decoder
    #[error(transparent)]
    Decode(anyhow::Error),

    #[error("No numeric properties found for {0}.")]
    NoNumericProperties(&'static str),

    #[error("At least {required} numeric properties are required for {plot}.")]
    NotEnoughNumericProperties { required: &'static str, plot: &'static str },
}

impl From<anyhow::Error> for AppError {
    fn from(err: anyhow::Error) -> Self {
        match err.downcast::<DataError>() {
            Ok(data) => AppError::Data(data),
            Err(other) => AppError::Decode(other),
        }
    }
}

pub type Result<T> = std::result::Result<T, AppError>;
