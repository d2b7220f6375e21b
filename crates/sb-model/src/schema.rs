//! Scheduling Block Definition schema.

use std::fmt;
use std::str::FromStr;

use sb_core::{Angle, CoreResult, Frequency, SkyPosition, arcsec, deg, hz, rad};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum TelescopeType {
    #[serde(rename = "ska_mid")]
    SkaMid,
    #[serde(rename = "ska_low")]
    SkaLow,
}

impl TelescopeType {
    pub fn as_str(&self) -> &'static str {
        match self {
            TelescopeType::SkaMid => "ska_mid",
            TelescopeType::SkaLow => "ska_low",
        }
    }
}

impl fmt::Display for TelescopeType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Deployment capability tier the SBD is checked against.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
pub enum ArrayAssembly {
    #[default]
    #[serde(rename = "AA0.5")]
    Aa05,
    #[serde(rename = "AA1")]
    Aa1,
    #[serde(rename = "AA2")]
    Aa2,
}

impl ArrayAssembly {
    pub const ALL: [ArrayAssembly; 3] = [ArrayAssembly::Aa05, ArrayAssembly::Aa1, ArrayAssembly::Aa2];

    pub fn as_str(&self) -> &'static str {
        match self {
            ArrayAssembly::Aa05 => "AA0.5",
            ArrayAssembly::Aa1 => "AA1",
            ArrayAssembly::Aa2 => "AA2",
        }
    }
}

impl fmt::Display for ArrayAssembly {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ArrayAssembly {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ArrayAssembly::ALL
            .into_iter()
            .find(|aa| aa.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| format!("unknown array assembly '{s}' (expected AA0.5, AA1 or AA2)"))
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SbDefinition {
    pub sbd_id: String,
    pub telescope: TelescopeType,
    #[serde(default)]
    pub targets: Vec<Target>,
    #[serde(default)]
    pub csp_configurations: Vec<CspConfiguration>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dish_allocations: Option<DishAllocation>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mccs_allocation: Option<MccsAllocation>,
}

impl SbDefinition {
    /// Target referenced by `target_id`, with its position in `targets`.
    pub fn target(&self, target_id: &str) -> Option<(usize, &Target)> {
        self.targets
            .iter()
            .enumerate()
            .find(|(_, target)| target.target_id == target_id)
    }

    /// CSP configuration referenced by `config_id`, with its position.
    pub fn csp_configuration(&self, config_id: &str) -> Option<(usize, &CspConfiguration)> {
        self.csp_configurations
            .iter()
            .enumerate()
            .find(|(_, config)| config.config_id == config_id)
    }
}

// ---------------------------------------------------------------------------
// Targets

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Target {
    pub target_id: String,
    #[serde(default)]
    pub name: String,
    pub reference_coordinate: ReferenceCoordinate,
    #[serde(default)]
    pub pointing_pattern: PointingPattern,
    #[serde(default)]
    pub tied_array_beams: TiedArrayBeams,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "kind")]
pub enum ReferenceCoordinate {
    #[serde(rename = "icrs")]
    Icrs(IcrsCoordinates),
}

impl ReferenceCoordinate {
    pub fn icrs(ra_str: impl Into<String>, dec_str: impl Into<String>) -> Self {
        ReferenceCoordinate::Icrs(IcrsCoordinates {
            ra_str: ra_str.into(),
            dec_str: dec_str.into(),
        })
    }

    pub fn to_sky_position(&self) -> CoreResult<SkyPosition> {
        match self {
            ReferenceCoordinate::Icrs(icrs) => {
                SkyPosition::from_sexagesimal(&icrs.ra_str, &icrs.dec_str)
            }
        }
    }
}

/// ICRS position in sexagesimal notation: RA in hours, Dec in degrees.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct IcrsCoordinates {
    pub ra_str: String,
    pub dec_str: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct TiedArrayBeams {
    #[serde(default)]
    pub pst_beams: Vec<Beam>,
    #[serde(default)]
    pub pss_beams: Vec<Beam>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Beam {
    pub beam_id: u32,
    #[serde(default)]
    pub beam_name: String,
    pub beam_coordinate: ReferenceCoordinate,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum PointingKind {
    SinglePointParameters,
    FivePointParameters,
    PointedMosaicParameters,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PointingPattern {
    pub active: PointingKind,
    #[serde(default)]
    pub parameters: Vec<PointingParameters>,
}

impl Default for PointingPattern {
    fn default() -> Self {
        Self {
            active: PointingKind::SinglePointParameters,
            parameters: vec![PointingParameters::SinglePointParameters {
                offset_x_arcsec: 0.0,
                offset_y_arcsec: 0.0,
            }],
        }
    }
}

impl PointingPattern {
    /// Parameters of the active pointing kind, if present.
    pub fn active_parameters(&self) -> Option<&PointingParameters> {
        self.parameters
            .iter()
            .find(|parameters| parameters.kind() == self.active)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "kind")]
pub enum PointingParameters {
    SinglePointParameters {
        #[serde(default)]
        offset_x_arcsec: f64,
        #[serde(default)]
        offset_y_arcsec: f64,
    },
    FivePointParameters {
        offset_arcsec: f64,
    },
    PointedMosaicParameters {
        #[serde(default)]
        offsets: Vec<CoordinateOffset>,
        #[serde(default)]
        units: OffsetUnit,
    },
}

impl PointingParameters {
    pub fn kind(&self) -> PointingKind {
        match self {
            PointingParameters::SinglePointParameters { .. } => PointingKind::SinglePointParameters,
            PointingParameters::FivePointParameters { .. } => PointingKind::FivePointParameters,
            PointingParameters::PointedMosaicParameters { .. } => {
                PointingKind::PointedMosaicParameters
            }
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct CoordinateOffset {
    pub x: f64,
    pub y: f64,
}

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
pub enum OffsetUnit {
    #[serde(rename = "rad")]
    Radian,
    #[default]
    #[serde(rename = "deg")]
    Degree,
    #[serde(rename = "arcmin")]
    Arcminute,
    #[serde(rename = "arcsec")]
    Arcsecond,
}

impl OffsetUnit {
    pub fn angle(&self, value: f64) -> Angle {
        match self {
            OffsetUnit::Radian => rad(value),
            OffsetUnit::Degree => deg(value),
            OffsetUnit::Arcminute => arcsec(value * 60.0),
            OffsetUnit::Arcsecond => arcsec(value),
        }
    }
}

// ---------------------------------------------------------------------------
// CSP

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CspConfiguration {
    pub config_id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub midcbf: Option<MidCbfConfiguration>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lowcbf: Option<LowCbfConfiguration>,
}

impl CspConfiguration {
    /// All correlation windows in definition order, regardless of telescope.
    pub fn correlation_spws(&self) -> impl Iterator<Item = &CorrelationSpwConfiguration> {
        let mid = self
            .midcbf
            .iter()
            .flat_map(|midcbf| midcbf.subbands.iter())
            .flat_map(|subband| subband.correlation_spws.iter());
        let low = self
            .lowcbf
            .iter()
            .flat_map(|lowcbf| lowcbf.correlation_spws.iter());
        mid.chain(low)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct MidCbfConfiguration {
    pub frequency_band: ReceiverBand,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub band5b_subband: Option<Band5bSubband>,
    /// Band 5 LO tunings in GHz.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub band_5_tuning: Option<[f64; 2]>,
    #[serde(default)]
    pub subbands: Vec<Subband>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Subband {
    #[serde(default)]
    pub frequency_slice_offset: FrequencyValue,
    #[serde(default)]
    pub correlation_spws: Vec<CorrelationSpwConfiguration>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct LowCbfConfiguration {
    #[serde(default)]
    pub correlation_spws: Vec<CorrelationSpwConfiguration>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CorrelationSpwConfiguration {
    pub spw_id: u32,
    #[serde(default)]
    pub logical_fsp_ids: Vec<u32>,
    #[serde(default)]
    pub zoom_factor: u32,
    /// Hz
    pub centre_frequency: f64,
    pub number_of_channels: u32,
    #[serde(default = "default_factor")]
    pub channel_averaging_factor: u32,
    #[serde(default = "default_factor")]
    pub time_integration_factor: u32,
}

impl CorrelationSpwConfiguration {
    pub fn centre(&self) -> Frequency {
        hz(self.centre_frequency)
    }
}

fn default_factor() -> u32 {
    1
}

/// A `{value, unit}` frequency pair as written in SBD files.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct FrequencyValue {
    pub value: f64,
    pub unit: FrequencyUnit,
}

impl Default for FrequencyValue {
    fn default() -> Self {
        Self {
            value: 0.0,
            unit: FrequencyUnit::MHz,
        }
    }
}

impl FrequencyValue {
    pub fn to_frequency(&self) -> Frequency {
        let scale = match self.unit {
            FrequencyUnit::Hz => 1.0,
            FrequencyUnit::KHz => 1.0e3,
            FrequencyUnit::MHz => 1.0e6,
            FrequencyUnit::GHz => 1.0e9,
        };
        hz(self.value * scale)
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum FrequencyUnit {
    Hz,
    #[serde(rename = "kHz")]
    KHz,
    MHz,
    GHz,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum ReceiverBand {
    #[serde(rename = "1")]
    Band1,
    #[serde(rename = "2")]
    Band2,
    #[serde(rename = "3")]
    Band3,
    #[serde(rename = "4")]
    Band4,
    #[serde(rename = "5a")]
    Band5a,
    #[serde(rename = "5b")]
    Band5b,
}

impl ReceiverBand {
    pub const ALL: [ReceiverBand; 6] = [
        ReceiverBand::Band1,
        ReceiverBand::Band2,
        ReceiverBand::Band3,
        ReceiverBand::Band4,
        ReceiverBand::Band5a,
        ReceiverBand::Band5b,
    ];

    /// Receiver identifier as used by the observatory data (`Band_1`, `Band_5b`).
    pub fn rx_id(&self) -> &'static str {
        match self {
            ReceiverBand::Band1 => "Band_1",
            ReceiverBand::Band2 => "Band_2",
            ReceiverBand::Band3 => "Band_3",
            ReceiverBand::Band4 => "Band_4",
            ReceiverBand::Band5a => "Band_5a",
            ReceiverBand::Band5b => "Band_5b",
        }
    }

    pub fn is_band_5(&self) -> bool {
        matches!(self, ReceiverBand::Band5a | ReceiverBand::Band5b)
    }
}

impl fmt::Display for ReceiverBand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.rx_id())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub enum Band5bSubband {
    One,
    Two,
    Three,
}

impl Band5bSubband {
    pub fn number(&self) -> u8 {
        match self {
            Band5bSubband::One => 1,
            Band5bSubband::Two => 2,
            Band5bSubband::Three => 3,
        }
    }
}

impl TryFrom<u8> for Band5bSubband {
    type Error = String;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            1 => Ok(Band5bSubband::One),
            2 => Ok(Band5bSubband::Two),
            3 => Ok(Band5bSubband::Three),
            other => Err(format!("band 5b subband must be 1, 2 or 3, got {other}")),
        }
    }
}

impl From<Band5bSubband> for u8 {
    fn from(value: Band5bSubband) -> Self {
        value.number()
    }
}

impl fmt::Display for Band5bSubband {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.number())
    }
}

// ---------------------------------------------------------------------------
// Allocations and scans

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DishAllocation {
    pub dish_allocation_id: String,
    #[serde(default)]
    pub selected_subarray_definition: String,
    #[serde(default)]
    pub dish_ids: Vec<String>,
    pub receiver_band: ReceiverBand,
    #[serde(default)]
    pub scan_sequence: Vec<ScanDefinition>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct MccsAllocation {
    pub mccs_allocation_id: String,
    #[serde(default)]
    pub selected_subarray_definition: String,
    #[serde(default)]
    pub subarray_beams: Vec<SubarrayBeamConfiguration>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SubarrayBeamConfiguration {
    pub subarray_beam_id: u32,
    #[serde(default)]
    pub apertures: Vec<Aperture>,
    #[serde(default)]
    pub scan_sequence: Vec<ScanDefinition>,
}

impl SubarrayBeamConfiguration {
    /// Highest substation id among the beam's apertures, 0 for an empty beam.
    pub fn max_substation_id(&self) -> u32 {
        self.apertures
            .iter()
            .map(|aperture| aperture.substation_id)
            .max()
            .unwrap_or(0)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Aperture {
    pub station_id: u32,
    pub substation_id: u32,
    #[serde(default = "default_weighting_key")]
    pub weighting_key: String,
}

fn default_weighting_key() -> String {
    "uniform".to_string()
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ScanDefinition {
    pub scan_definition_id: String,
    pub scan_duration_ms: u64,
    pub target_ref: String,
    pub csp_configuration_ref: String,
    #[serde(default)]
    pub scan_intent: String,
    #[serde(default)]
    pub pointing_correction: PointingCorrection,
}

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "UPPERCASE")]
pub enum PointingCorrection {
    #[default]
    Maintain,
    Update,
    Reset,
}
