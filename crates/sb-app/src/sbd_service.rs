//! SBD loading, capability loading and validation.

use std::path::Path;

use sb_capabilities::{CapabilityProvider, CapabilityTable};
use sb_model::{ArrayAssembly, SbDefinition};
use sb_validation::{ValidationIssue, validate_sbd};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{AppError, AppResult};

/// Outcome of validating one SBD.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValidationResponse {
    /// True iff there are no issues at all, warnings included.
    pub valid: bool,
    pub issues: Vec<ValidationIssue>,
}

impl ValidationResponse {
    pub fn from_issues(issues: Vec<ValidationIssue>) -> Self {
        Self {
            valid: issues.is_empty(),
            issues,
        }
    }

    pub fn error_count(&self) -> usize {
        self.issues.iter().filter(|issue| issue.is_error()).count()
    }

    pub fn warning_count(&self) -> usize {
        self.issues.len() - self.error_count()
    }
}

/// Load an SBD from a JSON or YAML file.
pub fn load_sbd(path: &Path) -> AppResult<SbDefinition> {
    sb_model::load(path).map_err(|source| AppError::SbdLoad {
        path: path.to_path_buf(),
        source,
    })
}

/// Built-in capabilities, or a capability table file when given.
pub fn load_capabilities(path: Option<&Path>) -> AppResult<CapabilityTable> {
    match path {
        Some(path) => {
            CapabilityTable::from_path(path).map_err(|source| AppError::CapabilityLoad {
                path: path.to_path_buf(),
                source,
            })
        }
        None => Ok(CapabilityTable::default()),
    }
}

/// Validate one SBD.
pub fn validate(
    sbd: &SbDefinition,
    array_assembly: ArrayAssembly,
    capabilities: &dyn CapabilityProvider,
) -> AppResult<ValidationResponse> {
    let issues = validate_sbd(sbd, array_assembly, capabilities)?;
    debug!(sbd_id = %sbd.sbd_id, issues = issues.len(), "SBD validated");
    Ok(ValidationResponse::from_issues(issues))
}

/// Load and validate one SBD file.
pub fn validate_file(
    path: &Path,
    array_assembly: ArrayAssembly,
    capabilities: &dyn CapabilityProvider,
) -> AppResult<ValidationResponse> {
    let sbd = load_sbd(path)?;
    validate(&sbd, array_assembly, capabilities)
}
