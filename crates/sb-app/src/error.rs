//! Error types for the sb-app service layer.

use std::path::PathBuf;

use sb_capabilities::CapabilityError;
use sb_model::ModelError;
use sb_validation::EngineError;

/// Application error type that wraps errors from the backend crates
/// and gives front-ends one error to report.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("Failed to load SBD file {path}: {source}")]
    SbdLoad { path: PathBuf, source: ModelError },

    #[error("Failed to load capability table {path}: {source}")]
    CapabilityLoad {
        path: PathBuf,
        source: CapabilityError,
    },

    #[error("Capability error: {0}")]
    Capability(#[from] CapabilityError),

    #[error("Validation engine error: {0}")]
    Engine(#[from] EngineError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

pub type AppResult<T> = Result<T, AppError>;
