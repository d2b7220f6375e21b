//! Tied-array beam placement against the half-power beamwidth.

use sb_capabilities::CapabilityProvider;
use sb_core::constants::{c, low_station_diameter, mid_dish_diameter};
use sb_core::{Angle, Frequency, Length, SkyPosition, small_angle};
use sb_model::{
    CorrelationSpwConfiguration, CspConfiguration, PointingKind, PointingParameters,
    ScanDefinition, TelescopeType, Target,
};

use crate::error::{EngineError, EngineResult};
use crate::model::{ValidationContext, ValidationIssue, check_relevant_context_contains};

pub const TARGET: &str = "target";
pub const CSP_CONFIGURATION: &str = "csp_configuration";

fn aperture_diameter(telescope: TelescopeType) -> Length {
    match telescope {
        TelescopeType::SkaMid => mid_dish_diameter(),
        TelescopeType::SkaLow => low_station_diameter(),
    }
}

/// Windows that set the beamwidth: the first Mid subband, or every Low window.
fn beamwidth_windows(
    telescope: TelescopeType,
    config: &CspConfiguration,
) -> &[CorrelationSpwConfiguration] {
    match telescope {
        TelescopeType::SkaMid => config
            .midcbf
            .as_ref()
            .and_then(|midcbf| midcbf.subbands.first())
            .map(|subband| subband.correlation_spws.as_slice())
            .unwrap_or_default(),
        TelescopeType::SkaLow => config
            .lowcbf
            .as_ref()
            .map(|lowcbf| lowcbf.correlation_spws.as_slice())
            .unwrap_or_default(),
    }
}

/// Highest frequency reached by the beamwidth windows, taking the
/// unzoomed channel width.
pub fn maximum_frequency(
    telescope: TelescopeType,
    config: &CspConfiguration,
    capabilities: &dyn CapabilityProvider,
) -> Option<Frequency> {
    let width = capabilities.channel_width(telescope);
    beamwidth_windows(telescope, config)
        .iter()
        .map(|spw| spw.centre() + width * (f64::from(spw.number_of_channels) / 2.0))
        .fold(None, |max: Option<Frequency>, high| match max {
            Some(current) if current >= high => Some(current),
            _ => Some(high),
        })
}

/// Half-power beamwidth `lambda / D` at frequency `f`.
pub fn half_power_beamwidth(telescope: TelescopeType, f: Frequency) -> Angle {
    let wavelength: Length = c() / f;
    small_angle(wavelength, aperture_diameter(telescope))
}

/// Pointing centre of the target: the reference coordinate, moved by the
/// first mosaic offset when a pointed mosaic is active.
pub fn pointing_centre(target: &Target) -> EngineResult<SkyPosition> {
    let reference = target.reference_coordinate.to_sky_position()?;
    let pattern = &target.pointing_pattern;
    if pattern.active != PointingKind::PointedMosaicParameters {
        return Ok(reference);
    }

    let offset = match pattern.active_parameters() {
        Some(PointingParameters::PointedMosaicParameters { offsets, units }) => {
            offsets.first().map(|offset| (offset, units))
        }
        _ => None,
    };
    let Some((offset, units)) = offset else {
        return Err(EngineError::MissingMosaicOffsets {
            target_id: target.target_id.clone(),
        });
    };
    Ok(reference.spherical_offsets_by(units.angle(offset.x), units.angle(offset.y)))
}

/// Every PST beam must lie within half the HPBW of the pointing centre.
pub fn validate_tied_array_beams(
    ctx: &ValidationContext<'_, ScanDefinition>,
) -> EngineResult<Vec<ValidationIssue>> {
    check_relevant_context_contains(&[TARGET, CSP_CONFIGURATION], ctx)?;
    let telescope = ctx.telescope()?;
    let target = ctx.target(TARGET)?;
    let config = ctx.csp_configuration(CSP_CONFIGURATION)?;

    let pst_beams = &target.tied_array_beams.pst_beams;
    if pst_beams.is_empty() {
        return Ok(vec![]);
    }
    let Some(f_max) = maximum_frequency(telescope, config, ctx.capabilities) else {
        return Ok(vec![]);
    };
    let limit = half_power_beamwidth(telescope, f_max) / 2.0;
    let centre = pointing_centre(target)?;

    let mut issues = Vec::new();
    for (index, beam) in pst_beams.iter().enumerate() {
        let position = beam.beam_coordinate.to_sky_position()?;
        if centre.separation(&position) > limit {
            issues.push(
                ValidationIssue::error(format!(
                    "Tied-array beam lies further from the target than half of the half-power \
                     beamwidth for CSP Config {}",
                    config.config_id
                ))
                .with_field(format!("tied_array_beams.pst_beams.{index}")),
            );
        }
    }
    Ok(issues)
}
