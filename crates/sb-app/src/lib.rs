//! Shared application service layer for SBD validation.
//!
//! Front-ends (the CLI today) go through this crate to load SBD files and
//! capability tables, run the engine, and get a `{valid, issues}` response.

pub mod batch;
pub mod error;
pub mod sbd_service;

pub use batch::{BatchOutcome, all_valid, validate_batch};
pub use error::{AppError, AppResult};
pub use sbd_service::{
    ValidationResponse, load_capabilities, load_sbd, validate, validate_file,
};
