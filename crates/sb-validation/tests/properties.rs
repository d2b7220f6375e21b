use proptest::prelude::*;
use sb_capabilities::CapabilityTable;
use sb_model::builders::{low_correlation_spw, mid_correlation_spw, mid_csp_configuration};
use sb_model::{
    ArrayAssembly, Beam, CspConfiguration, ReferenceCoordinate, SbDefinition, Target,
    TelescopeType, low_sbd, low_target, populate_scan_sequences,
};
use sb_validation::csp::validate_csp_configuration;
use sb_validation::target::{validate_target_elevation, validate_target_pst_beams};
use sb_validation::{ValidationContext, ValidationIssue, Validator, validate, validate_sbd};

fn low_with_channels(number_of_channels: u32) -> SbDefinition {
    let mut sbd = low_sbd();
    let mut spw = low_correlation_spw(1);
    spw.centre_frequency = 200.0e6;
    spw.number_of_channels = number_of_channels;
    sbd.csp_configurations[0].lowcbf.as_mut().unwrap().correlation_spws = vec![spw];
    populate_scan_sequences(&mut sbd, &[60_000]);
    sbd
}

fn bandwidth_issues(sbd: &SbDefinition, array_assembly: ArrayAssembly) -> usize {
    validate_sbd(sbd, array_assembly, &CapabilityTable::default())
        .unwrap()
        .iter()
        .filter(|issue| issue.message.starts_with("Bandwidth of spectral window"))
        .count()
}

#[test]
fn bandwidth_at_the_limit_passes() {
    // 96 x 781.25 kHz == 75 MHz
    assert_eq!(bandwidth_issues(&low_with_channels(96), ArrayAssembly::Aa05), 0);
    assert_eq!(bandwidth_issues(&low_with_channels(97), ArrayAssembly::Aa05), 1);
}

proptest! {
    #[test]
    fn low_bandwidth_issue_iff_strictly_above_available(channels in 1_u32..=384) {
        let expected = usize::from(channels > 96);
        prop_assert_eq!(bandwidth_issues(&low_with_channels(channels), ArrayAssembly::Aa1), expected);

        let expected = usize::from(channels > 192);
        prop_assert_eq!(bandwidth_issues(&low_with_channels(channels), ArrayAssembly::Aa2), expected);
    }

    #[test]
    fn target_issues_are_addressed_by_index(
        decs in proptest::collection::vec(-89.0_f64..89.0, 1..6),
    ) {
        let mut sbd = low_sbd();
        let template = sbd.targets[0].clone();
        sbd.targets = decs
            .iter()
            .enumerate()
            .map(|(index, dec)| {
                let mut target = template.clone();
                target.target_id = format!("target-{index}");
                target.reference_coordinate =
                    ReferenceCoordinate::icrs("12:00:00", format!("{dec:.4}"));
                target
            })
            .collect();

        let issues = validate_sbd(&sbd, ArrayAssembly::Aa05, &CapabilityTable::default()).unwrap();
        let mut previous = 0;
        for issue in &issues {
            let field = issue.field.as_deref().unwrap_or_default();
            let index: usize = field
                .strip_prefix("targets.")
                .and_then(|rest| rest.parse().ok())
                .expect("target issue addressed as targets.<i>");
            prop_assert!(index < decs.len());
            prop_assert!(index >= previous);
            previous = index;
        }
    }

    #[test]
    fn repeated_validation_is_identical(channels in 1_u32..=400, aa in 0_usize..3) {
        let sbd = low_with_channels(channels);
        let array_assembly = ArrayAssembly::ALL[aa];
        let table = CapabilityTable::default();
        prop_assert_eq!(
            validate_sbd(&sbd, array_assembly, &table).unwrap(),
            validate_sbd(&sbd, array_assembly, &table).unwrap()
        );
    }
}

fn mid_with_window(centre_frequency: f64, number_of_channels: u32) -> CspConfiguration {
    let mut config = mid_csp_configuration();
    let mut spw = mid_correlation_spw(1);
    spw.centre_frequency = centre_frequency;
    spw.number_of_channels = number_of_channels;
    config.midcbf.as_mut().unwrap().subbands[0].correlation_spws = vec![spw];
    config
}

fn mid_csp_issues(config: &CspConfiguration) -> Vec<ValidationIssue> {
    let table = CapabilityTable::default();
    let ctx = ValidationContext::new(config, &table)
        .with_telescope(TelescopeType::SkaMid)
        .with_array_assembly(ArrayAssembly::Aa2);
    validate(&ctx, &[validate_csp_configuration]).unwrap()
}

fn count_starting_with(issues: &[ValidationIssue], prefix: &str) -> usize {
    issues
        .iter()
        .filter(|issue| issue.message.starts_with(prefix))
        .count()
}

#[test]
fn mid_centre_frequency_on_band_edges_is_accepted() {
    // Band 1 spans 350 to 1050 MHz.
    for centre in [350.0e6, 1050.0e6] {
        let issues = mid_csp_issues(&mid_with_window(centre, 2));
        assert_eq!(count_starting_with(&issues, "Centre frequency"), 0, "{centre}");
        // Half the window still hangs over the edge.
        assert_eq!(count_starting_with(&issues, "Spectral window 1"), 1, "{centre}");
    }

    let issues = mid_csp_issues(&mid_with_window(349_999_999.0, 2));
    assert_eq!(count_starting_with(&issues, "Centre frequency"), 1);
    let issues = mid_csp_issues(&mid_with_window(1_050_000_001.0, 2));
    assert_eq!(count_starting_with(&issues, "Centre frequency"), 1);
}

#[test]
fn mid_window_edge_on_band_edge_is_accepted() {
    // Two 13.44 kHz channels put the edges 13.44 kHz either side of the centre.
    for centre in [350_013_440.0, 1_049_986_560.0] {
        assert!(mid_csp_issues(&mid_with_window(centre, 2)).is_empty(), "{centre}");

        let wider = mid_csp_issues(&mid_with_window(centre, 4));
        assert_eq!(count_starting_with(&wider, "Spectral window 1"), 1, "{centre}");
        assert_eq!(
            wider[0].field.as_deref(),
            Some("midcbf.subbands.0.correlation_spws.0")
        );
    }
}

fn low_target_with(dec: f64, pst_beams: usize) -> Target {
    let mut target = low_target();
    target.reference_coordinate = ReferenceCoordinate::icrs("12:00:00", format!("{dec:.4}"));
    target.tied_array_beams.pst_beams = (0..pst_beams)
        .map(|index| Beam {
            beam_id: index as u32 + 1,
            beam_name: format!("pst-{index}"),
            beam_coordinate: target.reference_coordinate.clone(),
        })
        .collect();
    target
}

proptest! {
    #[test]
    fn composed_validators_equal_separate_runs(
        dec in -89.0_f64..89.0,
        pst_beams in 0_usize..4,
        aa in 0_usize..3,
        source in prop::option::of("[a-z]{1,8}(\\.[0-9])?"),
    ) {
        let table = CapabilityTable::default();
        let target = low_target_with(dec, pst_beams);
        let mut ctx = ValidationContext::new(&target, &table)
            .with_telescope(TelescopeType::SkaLow)
            .with_array_assembly(ArrayAssembly::ALL[aa]);
        if let Some(source) = source {
            ctx = ctx.with_source(source);
        }

        let elevation: Validator<Target> = validate_target_elevation;
        let pst: Validator<Target> = validate_target_pst_beams;

        let composed = validate(&ctx, &[elevation, pst]).unwrap();
        let mut separate = validate(&ctx, &[elevation]).unwrap();
        separate.extend(validate(&ctx, &[pst]).unwrap());
        prop_assert_eq!(composed, separate);
    }
}
