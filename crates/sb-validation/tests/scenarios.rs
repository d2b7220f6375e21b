use sb_capabilities::{CachedCapabilities, CapabilityCache, CapabilityTable};
use sb_model::builders::mid_correlation_spw;
use sb_model::{
    ArrayAssembly, Beam, ReferenceCoordinate, SbDefinition, low_sbd, mid_sbd,
    populate_scan_sequences,
};
use sb_validation::{EngineError, ValidationIssueLevel, validate_sbd};

fn mid() -> SbDefinition {
    let mut sbd = mid_sbd();
    populate_scan_sequences(&mut sbd, &[600_000]);
    sbd
}

fn low() -> SbDefinition {
    let mut sbd = low_sbd();
    populate_scan_sequences(&mut sbd, &[600_000]);
    sbd
}

#[test]
fn low_target_culminating_at_44_degrees_warns() {
    let mut sbd = low();
    sbd.targets[0].reference_coordinate = ReferenceCoordinate::icrs("10:00:00", "+19:10:31.00");

    let issues = validate_sbd(&sbd, ArrayAssembly::Aa05, &CapabilityTable::default()).unwrap();
    assert_eq!(issues.len(), 1);
    assert_eq!(issues[0].level, ValidationIssueLevel::Warning);
    assert_eq!(issues[0].field.as_deref(), Some("targets.0"));
    assert_eq!(
        issues[0].message,
        "Maximum elevation (44.0 degrees) is less than 45 degrees - performance may be degraded"
    );
}

#[test]
fn mid_centre_frequency_of_100_hz_gives_two_errors() {
    let mut sbd = mid();
    let midcbf = sbd.csp_configurations[0].midcbf.as_mut().unwrap();
    midcbf.subbands[0].correlation_spws[0].centre_frequency = 100.0;

    let issues = validate_sbd(&sbd, ArrayAssembly::Aa05, &CapabilityTable::default()).unwrap();
    assert_eq!(issues.len(), 2);
    for issue in &issues {
        assert_eq!(issue.level, ValidationIssueLevel::Error);
        assert_eq!(
            issue.field.as_deref(),
            Some("csp_configurations.0.midcbf.subbands.0.correlation_spws.0")
        );
    }
    assert_eq!(
        issues[0].message,
        "Centre frequency of spectral window 1, 100.0 Hz, is outside of Band_1"
    );
    assert_eq!(issues[1].message, "Spectral window 1 is outside allowed range");
}

#[test]
fn five_windows_need_more_fsps_than_aa1_offers() {
    let mut sbd = mid();
    let midcbf = sbd.csp_configurations[0].midcbf.as_mut().unwrap();
    midcbf.subbands[0].correlation_spws = (1..=5).map(mid_correlation_spw).collect();

    let issues = validate_sbd(&sbd, ArrayAssembly::Aa1, &CapabilityTable::default()).unwrap();
    assert_eq!(issues.len(), 1);
    assert_eq!(
        issues[0].message,
        "Number of FSPs required for CSP configuration, 10, is greater than the 8 FSPs \
         available for array assembly AA1"
    );
    assert_eq!(
        issues[0].field.as_deref(),
        Some("csp_configurations.0.midcbf.subbands.0")
    );
}

#[test]
fn band_5_tuning_with_band_1_receiver_is_reported_per_scan() {
    let mut sbd = mid_sbd();
    populate_scan_sequences(&mut sbd, &[60_000, 120_000]);
    sbd.csp_configurations[0].midcbf.as_mut().unwrap().band_5_tuning = Some([6.5, 7.5]);

    let issues = validate_sbd(&sbd, ArrayAssembly::Aa05, &CapabilityTable::default()).unwrap();
    assert_eq!(issues.len(), 2);
    for (index, issue) in issues.iter().enumerate() {
        assert_eq!(
            issue.message,
            format!(
                "Scan definition 'scan-definition-0000{}' specifies CSP configuration with \
                 band_5_tuning but dish configuration with receiver band Band_1",
                index + 1
            )
        );
        assert_eq!(
            issue.field.as_deref(),
            Some(format!("dish_allocations.scan_sequence.{index}").as_str())
        );
    }
}

#[test]
fn unequal_beam_scan_sequences_abort_validation() {
    let mut sbd = low();
    let mccs = sbd.mccs_allocation.as_mut().unwrap();
    let mut second = mccs.subarray_beams[0].clone();
    second.subarray_beam_id = 2;
    second.scan_sequence.clear();
    mccs.subarray_beams.push(second);

    let result = validate_sbd(&sbd, ArrayAssembly::Aa1, &CapabilityTable::default());
    assert!(matches!(
        result,
        Err(EngineError::ScanSequenceMismatch { .. })
    ));
}

#[test]
fn mccs_issues_are_addressed_under_the_allocation() {
    let mut sbd = low();
    let mccs = sbd.mccs_allocation.as_mut().unwrap();
    let mut second = mccs.subarray_beams[0].clone();
    second.subarray_beam_id = 2;
    mccs.subarray_beams.push(second);

    let issues = validate_sbd(&sbd, ArrayAssembly::Aa05, &CapabilityTable::default()).unwrap();
    let fields: Vec<_> = issues.iter().map(|issue| issue.field.as_deref()).collect();
    assert_eq!(
        fields,
        vec![
            Some("mccs_allocation.subarray_beams"),
            Some("mccs_allocation"),
        ]
    );
}

#[test]
fn distant_pst_beam_is_reported_under_its_target() {
    let mut sbd = mid();
    sbd.targets[0].tied_array_beams.pst_beams = vec![Beam {
        beam_id: 1,
        beam_name: "off".to_string(),
        beam_coordinate: ReferenceCoordinate::icrs("21:08:47.92", "-80:00:00"),
    }];

    let issues = validate_sbd(&sbd, ArrayAssembly::Aa2, &CapabilityTable::default()).unwrap();
    assert_eq!(issues.len(), 1);
    assert_eq!(
        issues[0].field.as_deref(),
        Some("targets.0.tied_array_beams.pst_beams.0")
    );
    assert!(issues[0].message.ends_with("for CSP Config csp-configuration-00001"));
}

#[test]
fn validation_is_deterministic() {
    let mut sbd = mid();
    sbd.targets[0].reference_coordinate = ReferenceCoordinate::icrs("00:00:00", "+60:00:00");
    sbd.csp_configurations[0].midcbf.as_mut().unwrap().subbands[0].correlation_spws =
        (1..=5).map(mid_correlation_spw).collect();

    let table = CapabilityTable::default();
    let first = validate_sbd(&sbd, ArrayAssembly::Aa1, &table).unwrap();
    let second = validate_sbd(&sbd, ArrayAssembly::Aa1, &table).unwrap();
    assert_eq!(first.len(), 2);
    assert_eq!(first, second);
}

#[test]
fn adding_a_bad_target_only_adds_issues() {
    let table = CapabilityTable::default();
    let mut sbd = mid();
    sbd.csp_configurations[0].midcbf.as_mut().unwrap().subbands[0].correlation_spws[0]
        .centre_frequency = 100.0;
    let before = validate_sbd(&sbd, ArrayAssembly::Aa05, &table).unwrap();

    let mut bad = sbd.targets[0].clone();
    bad.target_id = "target-00002".to_string();
    bad.reference_coordinate = ReferenceCoordinate::icrs("00:00:00", "+60:00:00");
    sbd.targets.push(bad);
    let after = validate_sbd(&sbd, ArrayAssembly::Aa05, &table).unwrap();

    assert_eq!(after.len(), before.len() + 1);
    assert!(before.iter().all(|issue| after.contains(issue)));
    assert_eq!(after[0].field.as_deref(), Some("targets.1"));
}

#[test]
fn cached_provider_gives_identical_results() {
    let table = CapabilityTable::default();
    let cache = CapabilityCache::new();
    let cached = CachedCapabilities::new(&table, &cache);

    let mut sbd = low();
    sbd.csp_configurations[0].lowcbf.as_mut().unwrap().correlation_spws[0].number_of_channels =
        100;

    let direct = validate_sbd(&sbd, ArrayAssembly::Aa1, &table).unwrap();
    let via_cache = validate_sbd(&sbd, ArrayAssembly::Aa1, &cached).unwrap();
    assert_eq!(direct, via_cache);
    assert!(!cache.is_empty());
}
