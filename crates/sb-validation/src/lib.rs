//! sb-validation: scheduling block validation engine.
//!
//! Validators are plain functions from a [`ValidationContext`] to a list of
//! [`ValidationIssue`]s. Issues describe problems with the SBD; an
//! [`EngineError`] means the engine itself was invoked incorrectly.
//!
//! # Example
//!
//! ```
//! use sb_capabilities::CapabilityTable;
//! use sb_model::{ArrayAssembly, mid_sbd, populate_scan_sequences};
//! use sb_validation::validate_sbd;
//!
//! let mut sbd = mid_sbd();
//! populate_scan_sequences(&mut sbd, &[600_000]);
//!
//! let issues = validate_sbd(&sbd, ArrayAssembly::Aa1, &CapabilityTable::default()).unwrap();
//! assert!(issues.is_empty());
//! ```

pub mod csp;
pub mod error;
pub mod mccs;
pub mod model;
pub mod sbdefinition;
pub mod scan;
pub mod target;

pub use error::{EngineError, EngineResult};
pub use model::{
    ContextValue, ValidationContext, ValidationIssue, ValidationIssueLevel, Validator,
    check_relevant_context_contains, validate,
};
pub use sbdefinition::{validate_sbd, validate_sbdefinition};
