//! Parallel validation of many SBD files.

use std::path::PathBuf;

use rayon::prelude::*;
use sb_capabilities::{CachedCapabilities, CapabilityCache, CapabilityProvider};
use sb_model::ArrayAssembly;
use tracing::debug;

use crate::error::AppResult;
use crate::sbd_service::{ValidationResponse, validate_file};

/// Result for one file of a batch.
#[derive(Debug)]
pub struct BatchOutcome {
    pub path: PathBuf,
    pub result: AppResult<ValidationResponse>,
}

/// Validate every file in parallel.
///
/// All files share one request-scoped capability cache. Outcomes are
/// returned in input order; a failing file does not stop the others.
pub fn validate_batch<P>(
    paths: &[PathBuf],
    array_assembly: ArrayAssembly,
    capabilities: &P,
) -> Vec<BatchOutcome>
where
    P: CapabilityProvider,
{
    let cache = CapabilityCache::new();
    let cached = CachedCapabilities::new(capabilities, &cache);

    let outcomes: Vec<BatchOutcome> = paths
        .par_iter()
        .map(|path| BatchOutcome {
            path: path.clone(),
            result: validate_file(path, array_assembly, &cached),
        })
        .collect();

    debug!(
        files = outcomes.len(),
        cached_capabilities = cache.len(),
        "batch validated"
    );
    outcomes
}

/// Whether every file loaded and validated without issues.
pub fn all_valid(outcomes: &[BatchOutcome]) -> bool {
    outcomes
        .iter()
        .all(|outcome| matches!(&outcome.result, Ok(response) if response.valid))
}
