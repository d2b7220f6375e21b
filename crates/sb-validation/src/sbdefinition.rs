//! Whole-SBD validation: runs every entity validator in document order and
//! checks scans against the rest of the document.

use sb_capabilities::CapabilityProvider;
use sb_model::{
    ArrayAssembly, CspConfiguration, DishAllocation, SbDefinition, ScanDefinition, TelescopeType,
};
use tracing::{debug, debug_span};

use crate::csp::validate_csp_configuration;
use crate::error::{EngineError, EngineResult};
use crate::mccs::{self, validate_mccs_allocation};
use crate::model::{ContextValue, ValidationContext, ValidationIssue, prefix_issues, validate};
use crate::scan::{self, validate_tied_array_beams};
use crate::target::validate_target;

/// Validate an SBD against the capabilities of `array_assembly`.
pub fn validate_sbd(
    sbd: &SbDefinition,
    array_assembly: ArrayAssembly,
    capabilities: &dyn CapabilityProvider,
) -> EngineResult<Vec<ValidationIssue>> {
    let ctx = ValidationContext::new(sbd, capabilities)
        .with_telescope(sbd.telescope)
        .with_array_assembly(array_assembly);
    validate_sbdefinition(&ctx)
}

pub fn validate_sbdefinition(
    ctx: &ValidationContext<'_, SbDefinition>,
) -> EngineResult<Vec<ValidationIssue>> {
    let sbd = ctx.primary_entity;
    let span = debug_span!(
        "validate_sbdefinition",
        sbd_id = %sbd.sbd_id,
        telescope = %sbd.telescope,
        array_assembly = %ctx.array_assembly
    );
    let _guard = span.enter();

    check_allocation(sbd)?;
    // The document's own telescope decides which rules apply.
    let ctx = ctx.clone().with_telescope(sbd.telescope);

    let mut issues = Vec::new();

    for (index, target) in sbd.targets.iter().enumerate() {
        let target_ctx = ctx.child(target).with_source(format!("targets.{index}"));
        issues.extend(validate(&target_ctx, &[validate_target])?);
    }
    debug!(issues = issues.len(), "targets validated");

    for (index, config) in sbd.csp_configurations.iter().enumerate() {
        let csp_ctx = ctx
            .child(config)
            .with_source(format!("csp_configurations.{index}"));
        issues.extend(validate(&csp_ctx, &[validate_csp_configuration])?);
    }
    debug!(issues = issues.len(), "CSP configurations validated");

    if let Some(mccs) = &sbd.mccs_allocation {
        let mccs_ctx = ctx
            .child(mccs)
            .with_context(mccs::TARGETS, ContextValue::Targets(&sbd.targets))
            .with_context(
                mccs::CSP_CONFIGURATIONS,
                ContextValue::CspConfigurations(&sbd.csp_configurations),
            )
            .with_source("mccs_allocation");
        issues.extend(validate(&mccs_ctx, &[validate_mccs_allocation])?);
    }

    for (locator, scan) in scans(sbd) {
        issues.extend(validate_scan_references(&ctx, scan, &locator)?);
    }
    debug!(issues = issues.len(), "SBD validated");

    Ok(issues)
}

/// Exactly the allocation matching the telescope must be present.
fn check_allocation(sbd: &SbDefinition) -> EngineResult<()> {
    let (matches, expected) = match sbd.telescope {
        TelescopeType::SkaMid => (
            sbd.dish_allocations.is_some() && sbd.mccs_allocation.is_none(),
            "dish_allocations",
        ),
        TelescopeType::SkaLow => (
            sbd.mccs_allocation.is_some() && sbd.dish_allocations.is_none(),
            "mccs_allocation",
        ),
    };
    if matches {
        Ok(())
    } else {
        Err(EngineError::AllocationMismatch {
            telescope: sbd.telescope,
            expected,
        })
    }
}

/// Every scan in the document with its field path.
fn scans(sbd: &SbDefinition) -> Vec<(String, &ScanDefinition)> {
    let mut scans = Vec::new();
    if let Some(dish) = &sbd.dish_allocations {
        for (index, scan) in dish.scan_sequence.iter().enumerate() {
            scans.push((format!("dish_allocations.scan_sequence.{index}"), scan));
        }
    }
    if let Some(mccs) = &sbd.mccs_allocation {
        for (beam_index, beam) in mccs.subarray_beams.iter().enumerate() {
            for (index, scan) in beam.scan_sequence.iter().enumerate() {
                scans.push((
                    format!("mccs_allocation.subarray_beams.{beam_index}.scan_sequence.{index}"),
                    scan,
                ));
            }
        }
    }
    scans
}

fn validate_scan_references(
    ctx: &ValidationContext<'_, SbDefinition>,
    scan: &ScanDefinition,
    locator: &str,
) -> EngineResult<Vec<ValidationIssue>> {
    let sbd = ctx.primary_entity;
    let mut issues = Vec::new();

    let config = sbd.csp_configuration(&scan.csp_configuration_ref);
    if config.is_none() {
        issues.push(
            ValidationIssue::error(format!(
                "CSP configuration '{}' defined in scan definition '{}' does not exist in the SB",
                scan.csp_configuration_ref, scan.scan_definition_id
            ))
            .with_field(locator),
        );
    }

    let target = sbd.target(&scan.target_ref);
    if target.is_none() {
        issues.push(
            ValidationIssue::error(format!(
                "Target '{}' defined in scan definition '{}' does not exist in the SB",
                scan.target_ref, scan.scan_definition_id
            ))
            .with_field(locator),
        );
    }

    if let (Some(dish), Some((_, config))) = (&sbd.dish_allocations, config) {
        issues.extend(band_5_tuning_issue(dish, config, scan, locator));
    }

    if let (Some((target_index, target)), Some((_, config))) = (target, config) {
        let scan_ctx = ctx
            .child(scan)
            .with_context(scan::TARGET, ContextValue::Target(target))
            .with_context(scan::CSP_CONFIGURATION, ContextValue::CspConfiguration(config));
        issues.extend(prefix_issues(
            Some(format!("targets.{target_index}").as_str()),
            validate_tied_array_beams(&scan_ctx)?,
        ));
    }

    Ok(issues)
}

/// Band 5 LO tuning only makes sense with a band 5 receiver.
fn band_5_tuning_issue(
    dish: &DishAllocation,
    config: &CspConfiguration,
    scan: &ScanDefinition,
    locator: &str,
) -> Option<ValidationIssue> {
    let tuned = config
        .midcbf
        .as_ref()
        .is_some_and(|midcbf| midcbf.band_5_tuning.is_some());
    if !tuned || dish.receiver_band.is_band_5() {
        return None;
    }
    Some(
        ValidationIssue::error(format!(
            "Scan definition '{}' specifies CSP configuration with band_5_tuning but dish \
             configuration with receiver band {}",
            scan.scan_definition_id, dish.receiver_band
        ))
        .with_field(locator),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use sb_capabilities::CapabilityTable;
    use sb_model::{low_sbd, mid_sbd, populate_scan_sequences};

    #[test]
    fn builders_validate_cleanly() {
        let table = CapabilityTable::default();
        for mut sbd in [mid_sbd(), low_sbd()] {
            populate_scan_sequences(&mut sbd, &[60_000]);
            for aa in ArrayAssembly::ALL {
                assert!(validate_sbd(&sbd, aa, &table).unwrap().is_empty());
            }
        }
    }

    #[test]
    fn mid_sbd_with_mccs_allocation_is_an_invocation_error() {
        let table = CapabilityTable::default();
        let mut sbd = mid_sbd();
        sbd.mccs_allocation = low_sbd().mccs_allocation;
        assert!(matches!(
            validate_sbd(&sbd, ArrayAssembly::Aa05, &table),
            Err(EngineError::AllocationMismatch {
                telescope: TelescopeType::SkaMid,
                ..
            })
        ));
    }

    #[test]
    fn low_sbd_without_allocation_is_an_invocation_error() {
        let table = CapabilityTable::default();
        let mut sbd = low_sbd();
        sbd.mccs_allocation = None;
        assert!(validate_sbd(&sbd, ArrayAssembly::Aa05, &table).is_err());
    }

    #[test]
    fn dangling_references_are_issues() {
        let table = CapabilityTable::default();
        let mut sbd = mid_sbd();
        populate_scan_sequences(&mut sbd, &[60_000]);
        let scan = &mut sbd.dish_allocations.as_mut().unwrap().scan_sequence[0];
        scan.csp_configuration_ref = "csp-missing".to_string();
        scan.target_ref = "target-missing".to_string();

        let issues = validate_sbd(&sbd, ArrayAssembly::Aa05, &table).unwrap();
        assert_eq!(issues.len(), 2);
        assert_eq!(
            issues[0].message,
            "CSP configuration 'csp-missing' defined in scan definition 'scan-definition-00001' \
             does not exist in the SB"
        );
        assert_eq!(
            issues[1].message,
            "Target 'target-missing' defined in scan definition 'scan-definition-00001' does \
             not exist in the SB"
        );
        assert!(
            issues
                .iter()
                .all(|issue| issue.field.as_deref() == Some("dish_allocations.scan_sequence.0"))
        );
    }
}
