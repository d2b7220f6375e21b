//! Target checks: source elevation at the site and PST beam budget.

use sb_core::{Angle, deg, format_real, round_to, to_deg};
use sb_model::{TelescopeType, Target};

use crate::error::EngineResult;
use crate::model::{ValidationContext, ValidationIssue, Validator, validate};

/// Geodetic latitude of the SKA Mid site, degrees.
pub const MID_SITE_LATITUDE_DEG: f64 = -30.712_925_24;
/// Geodetic latitude of the SKA Low site, degrees.
pub const LOW_SITE_LATITUDE_DEG: f64 = -26.824_722_08;

pub const MID_MIN_ELEVATION_DEG: f64 = 15.0;
pub const LOW_MIN_ELEVATION_DEG: f64 = 0.0;
pub const LOW_DEGRADED_ELEVATION_DEG: f64 = 45.0;

pub fn site_latitude(telescope: TelescopeType) -> Angle {
    match telescope {
        TelescopeType::SkaMid => deg(MID_SITE_LATITUDE_DEG),
        TelescopeType::SkaLow => deg(LOW_SITE_LATITUDE_DEG),
    }
}

/// Elevation at upper culmination: `90 - |latitude - declination|`.
pub fn maximum_elevation(telescope: TelescopeType, declination: Angle) -> Angle {
    let latitude = to_deg(site_latitude(telescope));
    deg(90.0 - (latitude - to_deg(declination)).abs())
}

pub fn validate_target(ctx: &ValidationContext<'_, Target>) -> EngineResult<Vec<ValidationIssue>> {
    const VALIDATORS: [Validator<Target>; 2] = [validate_target_elevation, validate_target_pst_beams];
    validate(ctx, &VALIDATORS)
}

pub fn validate_target_elevation(
    ctx: &ValidationContext<'_, Target>,
) -> EngineResult<Vec<ValidationIssue>> {
    let telescope = ctx.telescope()?;
    let position = ctx.primary_entity.reference_coordinate.to_sky_position()?;
    let elevation = to_deg(maximum_elevation(telescope, position.dec));

    let issue = match telescope {
        TelescopeType::SkaMid if elevation < MID_MIN_ELEVATION_DEG => Some(ValidationIssue::error(
            "Source never rises above 15 degrees",
        )),
        TelescopeType::SkaMid => None,
        TelescopeType::SkaLow if elevation < LOW_MIN_ELEVATION_DEG => Some(
            ValidationIssue::error("Source never rises above the horizon"),
        ),
        TelescopeType::SkaLow if elevation < LOW_DEGRADED_ELEVATION_DEG => {
            Some(ValidationIssue::warning(format!(
                "Maximum elevation ({} degrees) is less than 45 degrees - performance may be degraded",
                format_real(round_to(elevation, 2))
            )))
        }
        TelescopeType::SkaLow => None,
    };
    Ok(issue.into_iter().collect())
}

pub fn validate_target_pst_beams(
    ctx: &ValidationContext<'_, Target>,
) -> EngineResult<Vec<ValidationIssue>> {
    let telescope = ctx.telescope()?;
    let allowed = ctx
        .capabilities
        .number_pst_beams(telescope, ctx.array_assembly)?;
    let requested = ctx.primary_entity.tied_array_beams.pst_beams.len();

    if requested > allowed as usize {
        return Ok(vec![ValidationIssue::error(format!(
            "Number of PST beams on target, {requested}, exceeds allowed {allowed} for {}",
            ctx.array_assembly
        ))]);
    }
    Ok(vec![])
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::EngineError;
    use crate::model::ValidationIssueLevel;
    use sb_capabilities::CapabilityTable;
    use sb_model::{ArrayAssembly, Beam, ReferenceCoordinate, low_target, mid_target};

    fn with_dec(mut target: Target, dec: &str) -> Target {
        target.reference_coordinate = ReferenceCoordinate::icrs("10:00:00", dec);
        target
    }

    fn run(target: &Target, telescope: TelescopeType) -> Vec<ValidationIssue> {
        let table = CapabilityTable::default();
        let ctx = ValidationContext::new(target, &table).with_telescope(telescope);
        validate_target(&ctx).unwrap()
    }

    #[test]
    fn maximum_elevation_at_zenith_is_90() {
        let elevation = maximum_elevation(TelescopeType::SkaMid, deg(MID_SITE_LATITUDE_DEG));
        assert!((to_deg(elevation) - 90.0).abs() < 1e-12);
    }

    #[test]
    fn builder_targets_are_valid() {
        assert!(run(&mid_target(), TelescopeType::SkaMid).is_empty());
        assert!(run(&low_target(), TelescopeType::SkaLow).is_empty());
    }

    #[test]
    fn mid_northern_source_never_rises_above_15_degrees() {
        let issues = run(&with_dec(mid_target(), "+50:00:00"), TelescopeType::SkaMid);
        assert_eq!(issues.len(), 1);
        assert_eq!(issues[0].message, "Source never rises above 15 degrees");
        assert_eq!(issues[0].level, ValidationIssueLevel::Error);
        assert!(issues[0].field.is_none());
    }

    #[test]
    fn low_source_below_horizon() {
        let issues = run(&with_dec(low_target(), "+70:00:00"), TelescopeType::SkaLow);
        assert_eq!(issues.len(), 1);
        assert_eq!(issues[0].message, "Source never rises above the horizon");
    }

    #[test]
    fn low_low_elevation_warning_is_rounded() {
        let issues = run(&with_dec(low_target(), "+19:10:31.00"), TelescopeType::SkaLow);
        assert_eq!(issues.len(), 1);
        assert_eq!(issues[0].level, ValidationIssueLevel::Warning);
        assert_eq!(
            issues[0].message,
            "Maximum elevation (44.0 degrees) is less than 45 degrees - performance may be degraded"
        );
    }

    #[test]
    fn too_many_pst_beams() {
        let mut target = low_target();
        let beam = Beam {
            beam_id: 1,
            beam_name: "PST beam".to_string(),
            beam_coordinate: target.reference_coordinate.clone(),
        };
        target.tied_array_beams.pst_beams = vec![beam.clone(), beam];

        let table = CapabilityTable::default();
        let ctx = ValidationContext::new(&target, &table)
            .with_telescope(TelescopeType::SkaLow)
            .with_array_assembly(ArrayAssembly::Aa1);
        let issues = validate_target(&ctx).unwrap();
        assert_eq!(
            issues[0].message,
            "Number of PST beams on target, 2, exceeds allowed 1 for AA1"
        );

        let ctx = ctx.with_array_assembly(ArrayAssembly::Aa2);
        assert!(validate_target(&ctx).unwrap().is_empty());
    }

    #[test]
    fn telescope_is_required() {
        let table = CapabilityTable::default();
        let target = mid_target();
        let ctx = ValidationContext::new(&target, &table);
        assert!(matches!(
            validate_target(&ctx),
            Err(EngineError::MissingTelescope)
        ));
    }

    #[test]
    fn malformed_coordinate_is_an_invocation_error() {
        let table = CapabilityTable::default();
        let target = with_dec(mid_target(), "not a declination");
        let ctx = ValidationContext::new(&target, &table).with_telescope(TelescopeType::SkaMid);
        assert!(matches!(
            validate_target(&ctx),
            Err(EngineError::Coordinate(_))
        ));
    }
}
