//! sb-core: stable foundation for the scheduling block validation engine.
//!
//! Contains:
//! - units (uom SI types + constructors, telescope hardware constants)
//! - numeric (Real, rounding and message formatting)
//! - sky (sexagesimal parsing and spherical geometry on ICRS positions)
//! - error (shared error types)

pub mod error;
pub mod numeric;
pub mod sky;
pub mod units;

// Re-exports: nice ergonomics for downstream crates
pub use error::{CoreError, CoreResult};
pub use numeric::*;
pub use sky::SkyPosition;
pub use units::*;
