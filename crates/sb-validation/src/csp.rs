//! CSP configuration checks: spectral window placement, bandwidth and the
//! Mid FSP budget.

use sb_core::{Frequency, format_real, hz, to_hz, to_mhz};
use sb_model::{CorrelationSpwConfiguration, CspConfiguration, MidCbfConfiguration, TelescopeType};
use sb_capabilities::CapabilityProvider;
use tracing::debug;

use crate::error::{EngineError, EngineResult};
use crate::model::{
    ContextValue, ValidationContext, ValidationIssue, Validator, check_relevant_context_contains,
    validate,
};

const BAND: &str = "band";

/// Bandwidth of one correlation window.
///
/// Mid channels narrow by `2^zoom_factor`; Low only supports zoom factor 0.
pub fn spw_bandwidth(
    telescope: TelescopeType,
    spw: &CorrelationSpwConfiguration,
    capabilities: &dyn CapabilityProvider,
) -> EngineResult<Frequency> {
    let width = to_hz(capabilities.channel_width(telescope));
    let channel_width = match telescope {
        TelescopeType::SkaMid => width / 2f64.powi(spw.zoom_factor as i32),
        TelescopeType::SkaLow if spw.zoom_factor == 0 => width,
        TelescopeType::SkaLow => {
            return Err(EngineError::UnsupportedZoom {
                telescope,
                spw_id: spw.spw_id,
                zoom_factor: spw.zoom_factor,
            });
        }
    };
    Ok(hz(channel_width * f64::from(spw.number_of_channels)))
}

/// Lower and upper edge of a correlation window.
pub fn spw_edges(
    telescope: TelescopeType,
    spw: &CorrelationSpwConfiguration,
    capabilities: &dyn CapabilityProvider,
) -> EngineResult<(Frequency, Frequency)> {
    let half = spw_bandwidth(telescope, spw, capabilities)? / 2.0;
    Ok((spw.centre() - half, spw.centre() + half))
}

pub fn validate_csp_configuration(
    ctx: &ValidationContext<'_, CspConfiguration>,
) -> EngineResult<Vec<ValidationIssue>> {
    let issues = match ctx.telescope()? {
        TelescopeType::SkaMid => validate_mid_csp_configuration(ctx)?,
        TelescopeType::SkaLow => validate_low_csp_configuration(ctx)?,
    };
    debug!(
        config_id = %ctx.primary_entity.config_id,
        issues = issues.len(),
        "CSP configuration validated"
    );
    Ok(issues)
}

// ---------------------------------------------------------------------------
// Low

fn validate_low_csp_configuration(
    ctx: &ValidationContext<'_, CspConfiguration>,
) -> EngineResult<Vec<ValidationIssue>> {
    let config = ctx.primary_entity;
    let lowcbf = config.lowcbf.as_ref().ok_or_else(|| EngineError::MissingCbf {
        config_id: config.config_id.clone(),
        expected: "lowcbf",
    })?;

    const VALIDATORS: [Validator<CorrelationSpwConfiguration>; 3] = [
        validate_low_centre_frequency,
        validate_spw_bandwidth,
        validate_low_spw_window,
    ];

    let mut issues = Vec::new();
    for (index, spw) in lowcbf.correlation_spws.iter().enumerate() {
        let spw_ctx = ctx
            .child(spw)
            .with_source(format!("lowcbf.correlation_spws.{index}"));
        issues.extend(validate(&spw_ctx, &VALIDATORS)?);
    }
    Ok(issues)
}

pub fn validate_low_centre_frequency(
    ctx: &ValidationContext<'_, CorrelationSpwConfiguration>,
) -> EngineResult<Vec<ValidationIssue>> {
    let spw = ctx.primary_entity;
    let (min, max) = ctx
        .capabilities
        .global_frequency_bounds(TelescopeType::SkaLow)?;
    if spw.centre() < min || spw.centre() > max {
        return Ok(vec![centre_frequency_issue(spw, "the telescope capabilities")]);
    }
    Ok(vec![])
}

pub fn validate_low_spw_window(
    ctx: &ValidationContext<'_, CorrelationSpwConfiguration>,
) -> EngineResult<Vec<ValidationIssue>> {
    let spw = ctx.primary_entity;
    let (min, max) = ctx
        .capabilities
        .global_frequency_bounds(TelescopeType::SkaLow)?;
    let (low, high) = spw_edges(TelescopeType::SkaLow, spw, ctx.capabilities)?;
    if low < min || high > max {
        return Ok(vec![window_issue(spw)]);
    }
    Ok(vec![])
}

// ---------------------------------------------------------------------------
// Mid

fn validate_mid_csp_configuration(
    ctx: &ValidationContext<'_, CspConfiguration>,
) -> EngineResult<Vec<ValidationIssue>> {
    let config = ctx.primary_entity;
    let midcbf = config.midcbf.as_ref().ok_or_else(|| EngineError::MissingCbf {
        config_id: config.config_id.clone(),
        expected: "midcbf",
    })?;
    let band = ctx
        .capabilities
        .frequency_band(midcbf.frequency_band, midcbf.band5b_subband)?;

    const VALIDATORS: [Validator<CorrelationSpwConfiguration>; 3] = [
        validate_mid_centre_frequency,
        validate_spw_bandwidth,
        validate_mid_spw_window,
    ];

    // Only the first subband is supported.
    let Some(subband) = midcbf.subbands.first() else {
        return Ok(vec![]);
    };

    let mut issues = Vec::new();
    for (index, spw) in subband.correlation_spws.iter().enumerate() {
        let spw_ctx = ctx
            .child(spw)
            .with_context(BAND, ContextValue::Band(&band))
            .with_source(format!("midcbf.subbands.0.correlation_spws.{index}"));
        issues.extend(validate(&spw_ctx, &VALIDATORS)?);
    }

    issues.extend(validate_fsp_count(ctx, midcbf)?);
    Ok(issues)
}

pub fn validate_mid_centre_frequency(
    ctx: &ValidationContext<'_, CorrelationSpwConfiguration>,
) -> EngineResult<Vec<ValidationIssue>> {
    check_relevant_context_contains(&[BAND], ctx)?;
    let band = ctx.band(BAND)?;
    let spw = ctx.primary_entity;
    if !band.contains(spw.centre()) {
        return Ok(vec![centre_frequency_issue(spw, &band.band_id)]);
    }
    Ok(vec![])
}

pub fn validate_mid_spw_window(
    ctx: &ValidationContext<'_, CorrelationSpwConfiguration>,
) -> EngineResult<Vec<ValidationIssue>> {
    check_relevant_context_contains(&[BAND], ctx)?;
    let band = ctx.band(BAND)?;
    let spw = ctx.primary_entity;
    let (low, high) = spw_edges(TelescopeType::SkaMid, spw, ctx.capabilities)?;
    if !(band.contains(low) && band.contains(high)) {
        return Ok(vec![window_issue(spw)]);
    }
    Ok(vec![])
}

/// Number of frequency slices a window touches, given the slice grid offset.
pub fn fsps_for_window(
    low: Frequency,
    high: Frequency,
    offset: Frequency,
    slice_bandwidth: Frequency,
) -> u32 {
    let slice = to_hz(slice_bandwidth);
    let index = |f: Frequency| ((to_hz(f) - to_hz(offset) + slice / 2.0) / slice).floor();
    let count = index(high) - index(low) + 1.0;
    count.max(0.0) as u32
}

fn validate_fsp_count(
    ctx: &ValidationContext<'_, CspConfiguration>,
    midcbf: &MidCbfConfiguration,
) -> EngineResult<Vec<ValidationIssue>> {
    let Some(subband) = midcbf.subbands.first() else {
        return Ok(vec![]);
    };
    let offset = subband.frequency_slice_offset.to_frequency();
    let slice = ctx.capabilities.frequency_slice_bandwidth();

    let mut required = 0_u32;
    for spw in &subband.correlation_spws {
        let (low, high) = spw_edges(TelescopeType::SkaMid, spw, ctx.capabilities)?;
        required += fsps_for_window(low, high, offset, slice);
    }

    let available = ctx.capabilities.available_fsps(ctx.array_assembly)?;
    if required > available {
        return Ok(vec![
            ValidationIssue::error(format!(
                "Number of FSPs required for CSP configuration, {required}, is greater than the \
                 {available} FSPs available for array assembly {}",
                ctx.array_assembly
            ))
            .with_field("midcbf.subbands.0"),
        ]);
    }
    Ok(vec![])
}

// ---------------------------------------------------------------------------
// Shared

pub fn validate_spw_bandwidth(
    ctx: &ValidationContext<'_, CorrelationSpwConfiguration>,
) -> EngineResult<Vec<ValidationIssue>> {
    let telescope = ctx.telescope()?;
    let spw = ctx.primary_entity;
    let bandwidth = spw_bandwidth(telescope, spw, ctx.capabilities)?;
    let available = ctx
        .capabilities
        .available_bandwidth(telescope, ctx.array_assembly)?;

    if bandwidth > available {
        return Ok(vec![ValidationIssue::error(format!(
            "Bandwidth of spectral window {}, {} MHz, is outside of available bandwidth {} MHz for {} {}",
            spw.spw_id,
            format_real(to_mhz(bandwidth)),
            format_real(to_mhz(available)),
            telescope,
            ctx.array_assembly
        ))]);
    }
    Ok(vec![])
}

fn centre_frequency_issue(spw: &CorrelationSpwConfiguration, range: &str) -> ValidationIssue {
    ValidationIssue::error(format!(
        "Centre frequency of spectral window {}, {} Hz, is outside of {range}",
        spw.spw_id,
        format_real(spw.centre_frequency)
    ))
}

fn window_issue(spw: &CorrelationSpwConfiguration) -> ValidationIssue {
    ValidationIssue::error(format!(
        "Spectral window {} is outside allowed range",
        spw.spw_id
    ))
}
