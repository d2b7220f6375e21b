//! SKA Low MCCS allocation checks.
//!
//! Subarray beams each carry their own scan sequence. Scan `k` of the
//! observation is the set of `k`-th scans of every beam (a scan slice), so
//! all sequences must have the same length.

use std::collections::BTreeSet;

use sb_core::{Frequency, format_real, hz, to_mhz};
use sb_model::{
    ArrayAssembly, CspConfiguration, MccsAllocation, ScanDefinition, SubarrayBeamConfiguration,
    TelescopeType, Target,
};
use tracing::debug;

use crate::csp::spw_bandwidth;
use crate::error::{EngineError, EngineResult};
use crate::model::{ValidationContext, ValidationIssue, check_relevant_context_contains};

pub const TARGETS: &str = "targets";
pub const CSP_CONFIGURATIONS: &str = "csp_configurations";

/// One scan slice: the `k`-th scan of every subarray beam, in beam order.
pub type ScanSlice<'a> = Vec<(&'a SubarrayBeamConfiguration, &'a ScanDefinition)>;

/// Regroup per-beam scan sequences scan-major.
pub fn scan_slices(mccs: &MccsAllocation) -> EngineResult<Vec<ScanSlice<'_>>> {
    let lengths: Vec<usize> = mccs
        .subarray_beams
        .iter()
        .map(|beam| beam.scan_sequence.len())
        .collect();
    let scan_count = lengths.first().copied().unwrap_or(0);
    if lengths.iter().any(|&len| len != scan_count) {
        return Err(EngineError::ScanSequenceMismatch { lengths });
    }

    Ok((0..scan_count)
        .map(|k| {
            mccs.subarray_beams
                .iter()
                .map(|beam| (beam, &beam.scan_sequence[k]))
                .collect()
        })
        .collect())
}

pub fn validate_mccs_allocation(
    ctx: &ValidationContext<'_, MccsAllocation>,
) -> EngineResult<Vec<ValidationIssue>> {
    check_relevant_context_contains(&[TARGETS, CSP_CONFIGURATIONS], ctx)?;
    let targets = ctx.targets(TARGETS)?;
    let csp_configurations = ctx.csp_configurations(CSP_CONFIGURATIONS)?;
    let mccs = ctx.primary_entity;
    let array_assembly = ctx.array_assembly;

    let slices = scan_slices(mccs)?;

    let mut issues = Vec::new();
    issues.extend(validate_subarray_beam_count(ctx)?);
    issues.extend(validate_substations(ctx)?);

    let available_pst = ctx
        .capabilities
        .number_pst_beams(TelescopeType::SkaLow, array_assembly)?;
    let available_bandwidth = ctx
        .capabilities
        .available_bandwidth(TelescopeType::SkaLow, array_assembly)?;

    for (index, slice) in slices.iter().enumerate() {
        let scan_number = index + 1;

        let pst_beams: usize = slice
            .iter()
            .filter_map(|(_, scan)| find_target(targets, &scan.target_ref))
            .map(|target| target.tied_array_beams.pst_beams.len())
            .sum();
        if pst_beams > available_pst as usize {
            issues.push(ValidationIssue::error(format!(
                "Number of PST beams, {pst_beams}, for scan {scan_number} exceeds allowed \
                 {available_pst} for {array_assembly}"
            )));
        }

        let durations: BTreeSet<u64> = slice.iter().map(|(_, scan)| scan.scan_duration_ms).collect();
        if durations.len() > 1 {
            issues.push(ValidationIssue::error(format!(
                "The scan durations for scan {scan_number} are not equal for all subarray beams"
            )));
        }

        let used = station_bandwidth(ctx, slice, csp_configurations)?;
        if used > available_bandwidth {
            issues.push(ValidationIssue::error(format!(
                "At least one station in scan {scan_number} is using more bandwidth ({} MHz) \
                 than is available ({} MHz) for array assembly {array_assembly}",
                format_real(to_mhz(used)),
                format_real(to_mhz(available_bandwidth)),
            )));
        }
    }

    debug!(
        beams = mccs.subarray_beams.len(),
        scans = slices.len(),
        issues = issues.len(),
        "MCCS allocation validated"
    );
    Ok(issues)
}

pub fn validate_subarray_beam_count(
    ctx: &ValidationContext<'_, MccsAllocation>,
) -> EngineResult<Vec<ValidationIssue>> {
    let beams = ctx.primary_entity.subarray_beams.len();
    let allowed = ctx.capabilities.number_subarray_beams(ctx.array_assembly)?;
    if beams > allowed as usize {
        return Ok(vec![
            ValidationIssue::error(format!(
                "Number of subarray beams, {beams}, exceeds allowed {allowed} for {}",
                ctx.array_assembly
            ))
            .with_field("subarray_beams"),
        ]);
    }
    Ok(vec![])
}

pub fn validate_substations(
    ctx: &ValidationContext<'_, MccsAllocation>,
) -> EngineResult<Vec<ValidationIssue>> {
    let allowed = ctx.capabilities.number_substations(ctx.array_assembly)?;
    let mut issues = Vec::new();
    for (index, beam) in ctx.primary_entity.subarray_beams.iter().enumerate() {
        let substations = substation_count(beam, ctx.array_assembly);
        if substations > allowed as usize {
            issues.push(
                ValidationIssue::error(format!(
                    "Maximum number of substations, {substations}, in subarray beam {} exceeds \
                     allowed {allowed} for {}",
                    beam.subarray_beam_id, ctx.array_assembly
                ))
                .with_field(format!("subarray_beams.{index}.apertures")),
            );
        }
    }
    Ok(issues)
}

/// Substations used by a beam. AA0.5 does not count whole stations
/// (`substation_id == 1`) as substations.
pub fn substation_count(beam: &SubarrayBeamConfiguration, array_assembly: ArrayAssembly) -> usize {
    match array_assembly {
        ArrayAssembly::Aa05 => beam
            .apertures
            .iter()
            .filter(|aperture| aperture.substation_id != 1)
            .count(),
        ArrayAssembly::Aa1 | ArrayAssembly::Aa2 => beam.apertures.len(),
    }
}

/// Bandwidth a station would need for one scan slice.
///
/// Conservative: every beam's bandwidth is multiplied by the largest
/// substation id used by any beam.
fn station_bandwidth(
    ctx: &ValidationContext<'_, MccsAllocation>,
    slice: &ScanSlice<'_>,
    csp_configurations: &[CspConfiguration],
) -> EngineResult<Frequency> {
    let mut beam_bandwidths = Vec::with_capacity(slice.len());
    for (_, scan) in slice {
        let Some(config) = find_csp_configuration(csp_configurations, &scan.csp_configuration_ref)
        else {
            continue;
        };
        let mut total = hz(0.0);
        for spw in config.correlation_spws() {
            total += spw_bandwidth(TelescopeType::SkaLow, spw, ctx.capabilities)?;
        }
        beam_bandwidths.push(total);
    }

    let beam_max_substations: Vec<u32> = slice
        .iter()
        .map(|(beam, _)| beam.max_substation_id())
        .collect();
    let max_substations = beam_max_substations.iter().copied().max().unwrap_or(0);

    let total: Frequency = beam_bandwidths.into_iter().fold(hz(0.0), |acc, bw| acc + bw);
    Ok(total * f64::from(max_substations))
}

fn find_target<'a>(targets: &'a [Target], target_id: &str) -> Option<&'a Target> {
    targets.iter().find(|target| target.target_id == target_id)
}

fn find_csp_configuration<'a>(
    configs: &'a [CspConfiguration],
    config_id: &str,
) -> Option<&'a CspConfiguration> {
    configs.iter().find(|config| config.config_id == config_id)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::ContextValue;
    use sb_capabilities::CapabilityTable;
    use sb_model::{Aperture, Beam, low_sbd, populate_scan_sequences};
    use sb_model::SbDefinition;

    fn run(sbd: &SbDefinition, array_assembly: ArrayAssembly) -> EngineResult<Vec<ValidationIssue>> {
        let table = CapabilityTable::default();
        let mccs = sbd.mccs_allocation.as_ref().unwrap();
        let ctx = ValidationContext::new(mccs, &table)
            .with_telescope(TelescopeType::SkaLow)
            .with_array_assembly(array_assembly)
            .with_context(TARGETS, ContextValue::Targets(&sbd.targets))
            .with_context(
                CSP_CONFIGURATIONS,
                ContextValue::CspConfigurations(&sbd.csp_configurations),
            );
        validate_mccs_allocation(&ctx)
    }

    fn two_beam_sbd() -> SbDefinition {
        let mut sbd = low_sbd();
        let mccs = sbd.mccs_allocation.as_mut().unwrap();
        let mut second = mccs.subarray_beams[0].clone();
        second.subarray_beam_id = 2;
        mccs.subarray_beams.push(second);
        populate_scan_sequences(&mut sbd, &[60_000]);
        sbd
    }

    fn aperture(station_id: u32, substation_id: u32) -> Aperture {
        Aperture {
            station_id,
            substation_id,
            weighting_key: "uniform".to_string(),
        }
    }

    #[test]
    fn builder_allocation_is_valid() {
        let mut sbd = low_sbd();
        populate_scan_sequences(&mut sbd, &[60_000, 120_000]);
        for aa in ArrayAssembly::ALL {
            assert!(run(&sbd, aa).unwrap().is_empty(), "{aa}");
        }
    }

    #[test]
    fn unequal_scan_sequences_are_an_invocation_error() {
        let mut sbd = two_beam_sbd();
        let mccs = sbd.mccs_allocation.as_mut().unwrap();
        let extra = mccs.subarray_beams[0].scan_sequence[0].clone();
        mccs.subarray_beams[0].scan_sequence.push(extra);

        match run(&sbd, ArrayAssembly::Aa1) {
            Err(EngineError::ScanSequenceMismatch { lengths }) => assert_eq!(lengths, vec![2, 1]),
            other => panic!("expected scan sequence mismatch, got {other:?}"),
        }
    }

    #[test]
    fn too_many_subarray_beams_for_aa05() {
        let sbd = two_beam_sbd();
        let issues = run(&sbd, ArrayAssembly::Aa05).unwrap();
        let beams: Vec<_> = issues
            .iter()
            .filter(|issue| issue.field.as_deref() == Some("subarray_beams"))
            .collect();
        assert_eq!(beams.len(), 1);
        assert_eq!(
            beams[0].message,
            "Number of subarray beams, 2, exceeds allowed 1 for AA0.5"
        );
    }

    #[test]
    fn aa05_ignores_whole_stations_when_counting_substations() {
        let mut sbd = low_sbd();
        let beam = &mut sbd.mccs_allocation.as_mut().unwrap().subarray_beams[0];
        beam.apertures.push(aperture(345, 2));
        assert_eq!(substation_count(beam, ArrayAssembly::Aa05), 1);
        assert_eq!(substation_count(beam, ArrayAssembly::Aa1), 5);

        let low_channels = sbd.csp_configurations[0].lowcbf.as_mut().unwrap();
        low_channels.correlation_spws[0].number_of_channels = 30;
        populate_scan_sequences(&mut sbd, &[60_000]);

        let issues = run(&sbd, ArrayAssembly::Aa05).unwrap();
        assert_eq!(issues.len(), 1);
        assert_eq!(
            issues[0].message,
            "Maximum number of substations, 1, in subarray beam 1 exceeds allowed 0 for AA0.5"
        );
        assert_eq!(issues[0].field.as_deref(), Some("subarray_beams.0.apertures"));

        assert!(run(&sbd, ArrayAssembly::Aa1).unwrap().is_empty());
    }

    #[test]
    fn pst_beams_are_summed_across_the_scan_slice() {
        let mut sbd = two_beam_sbd();
        let beam = Beam {
            beam_id: 1,
            beam_name: "pulsar".to_string(),
            beam_coordinate: sbd.targets[0].reference_coordinate.clone(),
        };
        sbd.targets[0].tied_array_beams.pst_beams = vec![beam];

        let issues = run(&sbd, ArrayAssembly::Aa1).unwrap();
        assert!(issues.iter().any(|issue| issue.message
            == "Number of PST beams, 2, for scan 1 exceeds allowed 1 for AA1"
            && issue.field.is_none()));
    }

    #[test]
    fn unequal_durations_in_a_slice() {
        let mut sbd = two_beam_sbd();
        let mccs = sbd.mccs_allocation.as_mut().unwrap();
        mccs.subarray_beams[1].scan_sequence[0].scan_duration_ms = 30_000;

        let issues = run(&sbd, ArrayAssembly::Aa2).unwrap();
        assert!(issues.iter().any(|issue| issue.message
            == "The scan durations for scan 1 are not equal for all subarray beams"));
    }

    #[test]
    fn station_bandwidth_scales_with_largest_substation_id() {
        let mut sbd = low_sbd();
        let beam = &mut sbd.mccs_allocation.as_mut().unwrap().subarray_beams[0];
        beam.apertures.push(aperture(345, 2));
        populate_scan_sequences(&mut sbd, &[60_000]);

        // 75 MHz x 2 substations > 75 MHz at AA1
        let issues = run(&sbd, ArrayAssembly::Aa1).unwrap();
        assert_eq!(issues.len(), 1);
        assert_eq!(
            issues[0].message,
            "At least one station in scan 1 is using more bandwidth (150.0 MHz) than is \
             available (75.0 MHz) for array assembly AA1"
        );

        // exactly at the AA2 limit
        assert!(run(&sbd, ArrayAssembly::Aa2).unwrap().is_empty());
    }

    #[test]
    fn unresolved_references_are_skipped() {
        let mut sbd = low_sbd();
        populate_scan_sequences(&mut sbd, &[60_000]);
        let scan = &mut sbd.mccs_allocation.as_mut().unwrap().subarray_beams[0].scan_sequence[0];
        scan.csp_configuration_ref = "missing".to_string();
        scan.target_ref = "missing".to_string();
        assert!(run(&sbd, ArrayAssembly::Aa05).unwrap().is_empty());
    }

    #[test]
    fn context_keys_are_required() {
        let table = CapabilityTable::default();
        let sbd = low_sbd();
        let mccs = sbd.mccs_allocation.as_ref().unwrap();
        let ctx = ValidationContext::new(mccs, &table).with_telescope(TelescopeType::SkaLow);
        match validate_mccs_allocation(&ctx) {
            Err(EngineError::MissingRelevantContext { missing }) => {
                assert_eq!(missing, vec![TARGETS, CSP_CONFIGURATIONS]);
            }
            other => panic!("expected missing context, got {other:?}"),
        }
    }
}
