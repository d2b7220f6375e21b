//! Canonical Mid and Low SBDs that pass validation at every array assembly.
//!
//! Tests and the CLI start from these and mutate the one field under test.

use crate::schema::*;

pub const MID_CSP_CONFIG_ID: &str = "csp-configuration-00001";
pub const LOW_CSP_CONFIG_ID: &str = "csp-configuration-00001";

/// Polaris Australis; culminates at about 32 degrees from the Mid site.
pub fn mid_target() -> Target {
    Target {
        target_id: "target-00001".to_string(),
        name: "Polaris Australis".to_string(),
        reference_coordinate: ReferenceCoordinate::icrs("21:08:47.92", "-88:57:22.9"),
        pointing_pattern: PointingPattern::default(),
        tied_array_beams: TiedArrayBeams::default(),
    }
}

/// Centaurus A; culminates at about 74 degrees from the Low site.
pub fn low_target() -> Target {
    Target {
        target_id: "target-00001".to_string(),
        name: "Centaurus A".to_string(),
        reference_coordinate: ReferenceCoordinate::icrs("13:25:27.6152", "-43:01:08.805"),
        pointing_pattern: PointingPattern::default(),
        tied_array_beams: TiedArrayBeams::default(),
    }
}

/// One Band 1 continuum window of 14880 channels centred on 450.00704 MHz.
pub fn mid_csp_configuration() -> CspConfiguration {
    CspConfiguration {
        config_id: MID_CSP_CONFIG_ID.to_string(),
        name: "Band 1 continuum".to_string(),
        midcbf: Some(MidCbfConfiguration {
            frequency_band: ReceiverBand::Band1,
            band5b_subband: None,
            band_5_tuning: None,
            subbands: vec![Subband {
                frequency_slice_offset: FrequencyValue::default(),
                correlation_spws: vec![mid_correlation_spw(1)],
            }],
        }),
        lowcbf: None,
    }
}

pub fn mid_correlation_spw(spw_id: u32) -> CorrelationSpwConfiguration {
    CorrelationSpwConfiguration {
        spw_id,
        logical_fsp_ids: vec![],
        zoom_factor: 0,
        centre_frequency: 450_007_040.0,
        number_of_channels: 14_880,
        channel_averaging_factor: 1,
        time_integration_factor: 1,
    }
}

/// One 75 MHz window (96 coarse channels) centred on 199.21875 MHz.
pub fn low_csp_configuration() -> CspConfiguration {
    CspConfiguration {
        config_id: LOW_CSP_CONFIG_ID.to_string(),
        name: "Low continuum".to_string(),
        midcbf: None,
        lowcbf: Some(LowCbfConfiguration {
            correlation_spws: vec![low_correlation_spw(1)],
        }),
    }
}

pub fn low_correlation_spw(spw_id: u32) -> CorrelationSpwConfiguration {
    CorrelationSpwConfiguration {
        spw_id,
        logical_fsp_ids: vec![],
        zoom_factor: 0,
        centre_frequency: 199_218_750.0,
        number_of_channels: 96,
        channel_averaging_factor: 1,
        time_integration_factor: 1,
    }
}

pub fn mid_sbd() -> SbDefinition {
    SbDefinition {
        sbd_id: "sbd-mid-00001".to_string(),
        telescope: TelescopeType::SkaMid,
        targets: vec![mid_target()],
        csp_configurations: vec![mid_csp_configuration()],
        dish_allocations: Some(DishAllocation {
            dish_allocation_id: "dish-allocation-00001".to_string(),
            selected_subarray_definition: "AA0.5".to_string(),
            dish_ids: ["SKA001", "SKA036", "SKA063", "SKA100"]
                .into_iter()
                .map(String::from)
                .collect(),
            receiver_band: ReceiverBand::Band1,
            scan_sequence: vec![],
        }),
        mccs_allocation: None,
    }
}

pub fn low_sbd() -> SbDefinition {
    SbDefinition {
        sbd_id: "sbd-low-00001".to_string(),
        telescope: TelescopeType::SkaLow,
        targets: vec![low_target()],
        csp_configurations: vec![low_csp_configuration()],
        dish_allocations: None,
        mccs_allocation: Some(MccsAllocation {
            mccs_allocation_id: "mccs-allocation-00001".to_string(),
            selected_subarray_definition: "AA0.5".to_string(),
            subarray_beams: vec![SubarrayBeamConfiguration {
                subarray_beam_id: 1,
                apertures: [345, 350, 352, 431]
                    .into_iter()
                    .map(|station_id| Aperture {
                        station_id,
                        substation_id: 1,
                        weighting_key: "uniform".to_string(),
                    })
                    .collect(),
                scan_sequence: vec![],
            }],
        }),
    }
}

/// Replace the scan sequences with one scan per target and duration,
/// all referencing the first CSP configuration. Low SBDs receive the same
/// sequence on every subarray beam.
pub fn populate_scan_sequences(sbd: &mut SbDefinition, durations_ms: &[u64]) {
    let csp_ref = sbd
        .csp_configurations
        .first()
        .map(|config| config.config_id.clone())
        .unwrap_or_default();

    let mut scans = Vec::new();
    for target in &sbd.targets {
        for &duration in durations_ms {
            scans.push(ScanDefinition {
                scan_definition_id: format!("scan-definition-{:05}", scans.len() + 1),
                scan_duration_ms: duration,
                target_ref: target.target_id.clone(),
                csp_configuration_ref: csp_ref.clone(),
                scan_intent: "Science".to_string(),
                pointing_correction: PointingCorrection::Maintain,
            });
        }
    }

    if let Some(dish) = sbd.dish_allocations.as_mut() {
        dish.scan_sequence = scans.clone();
    }
    if let Some(mccs) = sbd.mccs_allocation.as_mut() {
        for beam in &mut mccs.subarray_beams {
            beam.scan_sequence = scans.clone();
        }
    }
}
