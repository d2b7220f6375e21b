//! Capability lookup errors.

use sb_model::{ArrayAssembly, ReceiverBand, TelescopeType};
use thiserror::Error;

use crate::parameter::SubarrayParameter;

/// Result type for capability lookups.
pub type CapabilityResult<T> = Result<T, CapabilityError>;

#[derive(Error, Debug)]
pub enum CapabilityError {
    /// Parameter name not known to the capability table.
    #[error("Unknown subarray parameter '{name}'")]
    UnknownParameter { name: String },

    #[error("Unknown array assembly '{name}'")]
    UnknownArrayAssembly { name: String },

    /// The table has no value for this combination.
    #[error("No {parameter} capability for {telescope} {array_assembly}")]
    Missing {
        telescope: TelescopeType,
        array_assembly: ArrayAssembly,
        parameter: SubarrayParameter,
    },

    #[error("No frequency range for receiver band {band}")]
    MissingBand { band: String },

    /// Band 5b without a sub-band, or a sub-band on any other band.
    #[error("Invalid sub-band selection for receiver band {band}: {what}")]
    InvalidSubband {
        band: ReceiverBand,
        what: &'static str,
    },

    /// Stored value cannot be used as requested (negative count, NaN, ...).
    #[error("Invalid {parameter} value {value}")]
    InvalidValue {
        parameter: SubarrayParameter,
        value: f64,
    },

    /// Capability table file failed consistency checks.
    #[error("Invalid capability table: {what}")]
    InvalidTable { what: String },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}
