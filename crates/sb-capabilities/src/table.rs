//! Static observatory capability table.
//!
//! `CapabilityTable::default()` carries the built-in values. A table file
//! (YAML or JSON, same shape) replaces them; sections missing from the file
//! fall back to the built-in values for that telescope.

use std::path::Path;

use sb_core::{Frequency, hz};
use sb_model::{ArrayAssembly, Band5bSubband, ReceiverBand, TelescopeType};
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::error::{CapabilityError, CapabilityResult};
use crate::parameter::SubarrayParameter;
use crate::provider::{CapabilityProvider, FrequencyBand};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct CapabilityTable {
    #[serde(default)]
    pub mid: MidCapabilities,
    #[serde(default)]
    pub low: LowCapabilities,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MidCapabilities {
    pub receiver_bands: Vec<BandRange>,
    #[serde(default)]
    pub band5b_subbands: Vec<SubbandRange>,
    pub array_assemblies: Vec<SubarrayCapabilities>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LowCapabilities {
    pub min_frequency_hz: f64,
    pub max_frequency_hz: f64,
    pub array_assemblies: Vec<SubarrayCapabilities>,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BandRange {
    pub rx_id: ReceiverBand,
    pub min_frequency_hz: f64,
    pub max_frequency_hz: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SubbandRange {
    pub sub_band: Band5bSubband,
    pub min_frequency_hz: f64,
    pub max_frequency_hz: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SubarrayCapabilities {
    pub array_assembly: ArrayAssembly,
    pub available_bandwidth_hz: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub number_fsps: Option<u32>,
    pub number_pst_beams: u32,
    pub number_pss_beams: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub number_subarray_beams: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub number_substations: Option<u32>,
}

impl SubarrayCapabilities {
    pub fn get(&self, parameter: SubarrayParameter) -> Option<f64> {
        match parameter {
            SubarrayParameter::AvailableBandwidthHz => Some(self.available_bandwidth_hz),
            SubarrayParameter::NumberFsps => self.number_fsps.map(f64::from),
            SubarrayParameter::NumberPstBeams => Some(f64::from(self.number_pst_beams)),
            SubarrayParameter::NumberPssBeams => Some(f64::from(self.number_pss_beams)),
            SubarrayParameter::NumberSubarrayBeams => self.number_subarray_beams.map(f64::from),
            SubarrayParameter::NumberSubstations => self.number_substations.map(f64::from),
        }
    }
}

const MHZ: f64 = 1.0e6;

fn band(rx_id: ReceiverBand, min_mhz: f64, max_mhz: f64) -> BandRange {
    BandRange {
        rx_id,
        min_frequency_hz: min_mhz * MHZ,
        max_frequency_hz: max_mhz * MHZ,
    }
}

fn subband(sub_band: Band5bSubband, min_mhz: f64, max_mhz: f64) -> SubbandRange {
    SubbandRange {
        sub_band,
        min_frequency_hz: min_mhz * MHZ,
        max_frequency_hz: max_mhz * MHZ,
    }
}

impl Default for MidCapabilities {
    fn default() -> Self {
        let mid = |array_assembly, number_fsps, number_pst_beams, number_pss_beams| {
            SubarrayCapabilities {
                array_assembly,
                available_bandwidth_hz: 800.0 * MHZ,
                number_fsps: Some(number_fsps),
                number_pst_beams,
                number_pss_beams,
                number_subarray_beams: None,
                number_substations: None,
            }
        };

        Self {
            receiver_bands: vec![
                band(ReceiverBand::Band1, 350.0, 1050.0),
                band(ReceiverBand::Band2, 950.0, 1760.0),
                band(ReceiverBand::Band3, 1650.0, 3050.0),
                band(ReceiverBand::Band4, 2800.0, 5180.0),
                band(ReceiverBand::Band5a, 4600.0, 8500.0),
                band(ReceiverBand::Band5b, 8300.0, 15400.0),
            ],
            band5b_subbands: vec![
                subband(Band5bSubband::One, 11000.0, 13500.0),
                subband(Band5bSubband::Two, 12900.0, 15400.0),
                subband(Band5bSubband::Three, 8300.0, 11100.0),
            ],
            array_assemblies: vec![
                mid(ArrayAssembly::Aa05, 4, 1, 0),
                mid(ArrayAssembly::Aa1, 8, 1, 0),
                mid(ArrayAssembly::Aa2, 26, 6, 384),
            ],
        }
    }
}

impl Default for LowCapabilities {
    fn default() -> Self {
        let low = |array_assembly,
                   bandwidth_mhz: f64,
                   number_pst_beams,
                   number_pss_beams,
                   number_subarray_beams,
                   number_substations| SubarrayCapabilities {
            array_assembly,
            available_bandwidth_hz: bandwidth_mhz * MHZ,
            number_fsps: None,
            number_pst_beams,
            number_pss_beams,
            number_subarray_beams: Some(number_subarray_beams),
            number_substations: Some(number_substations),
        };

        Self {
            min_frequency_hz: 50.0 * MHZ,
            max_frequency_hz: 350.0 * MHZ,
            array_assemblies: vec![
                low(ArrayAssembly::Aa05, 75.0, 1, 0, 1, 0),
                low(ArrayAssembly::Aa1, 75.0, 1, 0, 8, 720),
                low(ArrayAssembly::Aa2, 150.0, 4, 30, 8, 720),
            ],
        }
    }
}

impl CapabilityTable {
    /// Load a table file, choosing YAML or JSON from the extension.
    pub fn from_path(path: &Path) -> CapabilityResult<Self> {
        let content = std::fs::read_to_string(path)?;
        let is_json = path
            .extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| ext.eq_ignore_ascii_case("json"));
        let table: CapabilityTable = if is_json {
            serde_json::from_str(&content)?
        } else {
            serde_yaml::from_str(&content)?
        };
        table.check()?;
        warn!(
            path = %path.display(),
            "capability table file replaces built-in capability values"
        );
        Ok(table)
    }

    pub fn to_yaml(&self) -> CapabilityResult<String> {
        Ok(serde_yaml::to_string(self)?)
    }

    pub fn to_json(&self) -> CapabilityResult<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Consistency checks applied to loaded tables.
    pub fn check(&self) -> CapabilityResult<()> {
        let ranges = self
            .mid
            .receiver_bands
            .iter()
            .map(|b| (b.rx_id.to_string(), b.min_frequency_hz, b.max_frequency_hz))
            .chain(self.mid.band5b_subbands.iter().map(|s| {
                (
                    format!("Band5b subband {}", s.sub_band),
                    s.min_frequency_hz,
                    s.max_frequency_hz,
                )
            }))
            .chain(std::iter::once((
                "ska_low".to_string(),
                self.low.min_frequency_hz,
                self.low.max_frequency_hz,
            )));
        for (name, min, max) in ranges {
            if !(min.is_finite() && max.is_finite() && min < max) {
                return Err(CapabilityError::InvalidTable {
                    what: format!("frequency range of {name} must satisfy min < max"),
                });
            }
        }

        for (telescope, entries) in [
            (TelescopeType::SkaMid, &self.mid.array_assemblies),
            (TelescopeType::SkaLow, &self.low.array_assemblies),
        ] {
            for entry in entries {
                let bandwidth = entry.available_bandwidth_hz;
                if !bandwidth.is_finite() || bandwidth < 0.0 {
                    return Err(CapabilityError::InvalidTable {
                        what: format!(
                            "available bandwidth for {telescope} {} must be non-negative",
                            entry.array_assembly
                        ),
                    });
                }
            }
            for array_assembly in ArrayAssembly::ALL {
                let count = entries
                    .iter()
                    .filter(|entry| entry.array_assembly == array_assembly)
                    .count();
                if count > 1 {
                    return Err(CapabilityError::InvalidTable {
                        what: format!("{telescope} {array_assembly} is listed {count} times"),
                    });
                }
            }
        }
        Ok(())
    }

    fn assemblies(&self, telescope: TelescopeType) -> &[SubarrayCapabilities] {
        match telescope {
            TelescopeType::SkaMid => &self.mid.array_assemblies,
            TelescopeType::SkaLow => &self.low.array_assemblies,
        }
    }
}

impl CapabilityProvider for CapabilityTable {
    fn subarray_parameter(
        &self,
        telescope: TelescopeType,
        array_assembly: ArrayAssembly,
        parameter: SubarrayParameter,
    ) -> CapabilityResult<f64> {
        self.assemblies(telescope)
            .iter()
            .find(|entry| entry.array_assembly == array_assembly)
            .and_then(|entry| entry.get(parameter))
            .ok_or(CapabilityError::Missing {
                telescope,
                array_assembly,
                parameter,
            })
    }

    fn frequency_band(
        &self,
        band: ReceiverBand,
        subband: Option<Band5bSubband>,
    ) -> CapabilityResult<FrequencyBand> {
        match (band, subband) {
            (ReceiverBand::Band5b, Some(sub_band)) => self
                .mid
                .band5b_subbands
                .iter()
                .find(|range| range.sub_band == sub_band)
                .map(|range| FrequencyBand {
                    band_id: format!("Band5b subband {sub_band}"),
                    min: hz(range.min_frequency_hz),
                    max: hz(range.max_frequency_hz),
                })
                .ok_or_else(|| CapabilityError::MissingBand {
                    band: format!("Band5b subband {sub_band}"),
                }),
            (ReceiverBand::Band5b, None) => Err(CapabilityError::InvalidSubband {
                band,
                what: "band 5b requires a sub-band",
            }),
            (_, Some(_)) => Err(CapabilityError::InvalidSubband {
                band,
                what: "only band 5b has sub-bands",
            }),
            (_, None) => self
                .mid
                .receiver_bands
                .iter()
                .find(|range| range.rx_id == band)
                .map(|range| FrequencyBand {
                    band_id: band.rx_id().to_string(),
                    min: hz(range.min_frequency_hz),
                    max: hz(range.max_frequency_hz),
                })
                .ok_or_else(|| CapabilityError::MissingBand {
                    band: band.rx_id().to_string(),
                }),
        }
    }

    fn global_frequency_bounds(
        &self,
        telescope: TelescopeType,
    ) -> CapabilityResult<(Frequency, Frequency)> {
        match telescope {
            TelescopeType::SkaLow => Ok((
                hz(self.low.min_frequency_hz),
                hz(self.low.max_frequency_hz),
            )),
            TelescopeType::SkaMid => {
                let bands = &self.mid.receiver_bands;
                let min = bands.iter().map(|b| b.min_frequency_hz).reduce(f64::min);
                let max = bands.iter().map(|b| b.max_frequency_hz).reduce(f64::max);
                match (min, max) {
                    (Some(min), Some(max)) => Ok((hz(min), hz(max))),
                    _ => Err(CapabilityError::MissingBand {
                        band: "any Mid receiver band".to_string(),
                    }),
                }
            }
        }
    }
}
