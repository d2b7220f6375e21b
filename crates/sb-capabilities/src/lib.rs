//! sb-capabilities: telescope capability data for SBD validation.
//!
//! Provides:
//! - `CapabilityProvider` trait (per-array-assembly limits, band ranges)
//! - `CapabilityTable` with built-in values, loadable from YAML/JSON
//! - `CapabilityCache` + `CachedCapabilities` request-scoped memo
//!
//! # Example
//!
//! ```
//! use sb_capabilities::{CapabilityProvider, CapabilityTable};
//! use sb_model::ArrayAssembly;
//!
//! let table = CapabilityTable::default();
//! assert_eq!(table.available_fsps(ArrayAssembly::Aa1).unwrap(), 8);
//! ```

pub mod cache;
pub mod error;
pub mod parameter;
pub mod provider;
pub mod table;

pub use cache::{CachedCapabilities, CapabilityCache};
pub use error::{CapabilityError, CapabilityResult};
pub use parameter::SubarrayParameter;
pub use provider::{CapabilityProvider, FrequencyBand, parse_array_assembly};
pub use table::{
    BandRange, CapabilityTable, LowCapabilities, MidCapabilities, SubarrayCapabilities,
    SubbandRange,
};
