use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::CapabilityError;

/// Per-array-assembly limits published for each telescope.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SubarrayParameter {
    AvailableBandwidthHz,
    NumberFsps,
    NumberPstBeams,
    NumberPssBeams,
    NumberSubarrayBeams,
    NumberSubstations,
}

impl SubarrayParameter {
    pub const ALL: [SubarrayParameter; 6] = [
        SubarrayParameter::AvailableBandwidthHz,
        SubarrayParameter::NumberFsps,
        SubarrayParameter::NumberPstBeams,
        SubarrayParameter::NumberPssBeams,
        SubarrayParameter::NumberSubarrayBeams,
        SubarrayParameter::NumberSubstations,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            SubarrayParameter::AvailableBandwidthHz => "available_bandwidth_hz",
            SubarrayParameter::NumberFsps => "number_fsps",
            SubarrayParameter::NumberPstBeams => "number_pst_beams",
            SubarrayParameter::NumberPssBeams => "number_pss_beams",
            SubarrayParameter::NumberSubarrayBeams => "number_subarray_beams",
            SubarrayParameter::NumberSubstations => "number_substations",
        }
    }
}

impl fmt::Display for SubarrayParameter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for SubarrayParameter {
    type Err = CapabilityError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let query = s.trim();
        SubarrayParameter::ALL
            .into_iter()
            .find(|parameter| parameter.name() == query)
            .ok_or_else(|| CapabilityError::UnknownParameter {
                name: s.to_string(),
            })
    }
}
