use std::path::PathBuf;
use thiserror::Error;

use momentic_core::data::DataError;
use momentic_core::features::FeatureError;
use momentic_core::{EngineError, SettingsError};

/// Errors from file-level orchestration.
#[derive(Debug, Error)]
pub enum RunError {
    #[error("settings error: {0}")]
    Settings(#[from] SettingsError),
    #[error("data error: {0}")]
    Data(#[from] DataError),
    #[error("feature error: {0}")]
    Feature(#[from] FeatureError),
    #[error("engine error: {0}")]
    Engine(#[from] EngineError),
    #[error("I/O error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("serialization error: {0}")]
    Serialize(#[from] serde_json::Error),
    #[error("invalid input: {0}")]
    InvalidInput(String),
}

impl RunError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        RunError::Io {
            path: path.into(),
            source,
        }
    }
}
