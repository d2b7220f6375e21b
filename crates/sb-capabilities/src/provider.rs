//! Capability provider trait.

use sb_core::constants::{LOW_STATION_CHANNEL_WIDTH_HZ, MID_CHANNEL_WIDTH_HZ};
use sb_core::{Frequency, hz};
use sb_model::{ArrayAssembly, Band5bSubband, ReceiverBand, TelescopeType};

use crate::error::{CapabilityError, CapabilityResult};
use crate::parameter::SubarrayParameter;

/// Frequency range of a receiver band or band 5b sub-band.
#[derive(Debug, Clone, PartialEq)]
pub struct FrequencyBand {
    /// `Band_1`, ... or `Band5b subband <n>`.
    pub band_id: String,
    pub min: Frequency,
    pub max: Frequency,
}

impl FrequencyBand {
    /// Inclusive containment.
    pub fn contains(&self, frequency: Frequency) -> bool {
        frequency >= self.min && frequency <= self.max
    }
}

/// Source of observatory capability data.
///
/// Implementations must be thread-safe (Send + Sync) so one provider can
/// serve a parallel batch of validations.
pub trait CapabilityProvider: Send + Sync {
    /// Raw value of a per-array-assembly limit.
    fn subarray_parameter(
        &self,
        telescope: TelescopeType,
        array_assembly: ArrayAssembly,
        parameter: SubarrayParameter,
    ) -> CapabilityResult<f64>;

    /// Frequency range of a Mid receiver band. Band 5b requires a sub-band
    /// and the sub-band range is returned.
    fn frequency_band(
        &self,
        band: ReceiverBand,
        subband: Option<Band5bSubband>,
    ) -> CapabilityResult<FrequencyBand>;

    /// Overall tunable range of the telescope.
    fn global_frequency_bounds(
        &self,
        telescope: TelescopeType,
    ) -> CapabilityResult<(Frequency, Frequency)>;

    /// Correlator channel width at zoom factor 0.
    fn channel_width(&self, telescope: TelescopeType) -> Frequency {
        match telescope {
            TelescopeType::SkaMid => hz(MID_CHANNEL_WIDTH_HZ),
            TelescopeType::SkaLow => hz(LOW_STATION_CHANNEL_WIDTH_HZ),
        }
    }

    fn frequency_slice_bandwidth(&self) -> Frequency {
        sb_core::constants::frequency_slice_bandwidth()
    }

    fn available_bandwidth(
        &self,
        telescope: TelescopeType,
        array_assembly: ArrayAssembly,
    ) -> CapabilityResult<Frequency> {
        self.subarray_parameter(
            telescope,
            array_assembly,
            SubarrayParameter::AvailableBandwidthHz,
        )
        .map(hz)
    }

    fn available_fsps(&self, array_assembly: ArrayAssembly) -> CapabilityResult<u32> {
        self.count(
            TelescopeType::SkaMid,
            array_assembly,
            SubarrayParameter::NumberFsps,
        )
    }

    fn number_pst_beams(
        &self,
        telescope: TelescopeType,
        array_assembly: ArrayAssembly,
    ) -> CapabilityResult<u32> {
        self.count(telescope, array_assembly, SubarrayParameter::NumberPstBeams)
    }

    fn number_pss_beams(
        &self,
        telescope: TelescopeType,
        array_assembly: ArrayAssembly,
    ) -> CapabilityResult<u32> {
        self.count(telescope, array_assembly, SubarrayParameter::NumberPssBeams)
    }

    fn number_subarray_beams(&self, array_assembly: ArrayAssembly) -> CapabilityResult<u32> {
        self.count(
            TelescopeType::SkaLow,
            array_assembly,
            SubarrayParameter::NumberSubarrayBeams,
        )
    }

    fn number_substations(&self, array_assembly: ArrayAssembly) -> CapabilityResult<u32> {
        self.count(
            TelescopeType::SkaLow,
            array_assembly,
            SubarrayParameter::NumberSubstations,
        )
    }

    /// A parameter that must hold a non-negative whole number.
    fn count(
        &self,
        telescope: TelescopeType,
        array_assembly: ArrayAssembly,
        parameter: SubarrayParameter,
    ) -> CapabilityResult<u32> {
        let value = self.subarray_parameter(telescope, array_assembly, parameter)?;
        if !value.is_finite() || value < 0.0 || value.fract() != 0.0 || value > u32::MAX as f64 {
            return Err(CapabilityError::InvalidValue { parameter, value });
        }
        Ok(value as u32)
    }
}

/// Parse an array assembly name as accepted by the capability service.
pub fn parse_array_assembly(name: &str) -> CapabilityResult<ArrayAssembly> {
    name.parse()
        .map_err(|_| CapabilityError::UnknownArrayAssembly {
            name: name.to_string(),
        })
}
