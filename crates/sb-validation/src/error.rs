//! Invocation errors.
//!
//! These mean the engine was called incorrectly or the input violates a
//! structural invariant. They are never reported as validation issues.

use sb_capabilities::CapabilityError;
use sb_core::CoreError;
use sb_model::TelescopeType;
use thiserror::Error;

pub type EngineResult<T> = Result<T, EngineError>;

#[derive(Error, Debug)]
pub enum EngineError {
    #[error("Relevant context is missing required keys: {}", missing.join(", "))]
    MissingRelevantContext { missing: Vec<&'static str> },

    #[error("Relevant context value '{key}' is not a {expected}")]
    UnexpectedContextValue {
        key: &'static str,
        expected: &'static str,
    },

    #[error("Telescope must be set in the validation context")]
    MissingTelescope,

    /// The populated allocation does not match the telescope.
    #[error("{telescope} SBD must define {expected} and no other allocation")]
    AllocationMismatch {
        telescope: TelescopeType,
        expected: &'static str,
    },

    #[error("CSP configuration '{config_id}' has no {expected} section")]
    MissingCbf {
        config_id: String,
        expected: &'static str,
    },

    #[error("Zoom factor {zoom_factor} of spectral window {spw_id} is not supported for {telescope}")]
    UnsupportedZoom {
        telescope: TelescopeType,
        spw_id: u32,
        zoom_factor: u32,
    },

    #[error("Subarray beam scan sequences differ in length: {lengths:?}")]
    ScanSequenceMismatch { lengths: Vec<usize> },

    #[error("Pointed mosaic on target '{target_id}' has no offsets")]
    MissingMosaicOffsets { target_id: String },

    #[error("Coordinate error: {0}")]
    Coordinate(#[from] CoreError),

    #[error("Capability error: {0}")]
    Capability(#[from] CapabilityError),
}
