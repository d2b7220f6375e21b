// sb-core/src/units.rs

use uom::si::f64::{
    Angle as UomAngle, Frequency as UomFrequency, Length as UomLength, Ratio as UomRatio,
    Velocity as UomVelocity,
};

// Public canonical unit types (SI, f64)
pub type Angle = UomAngle;
pub type Frequency = UomFrequency;
pub type Length = UomLength;
pub type Ratio = UomRatio;
pub type Velocity = UomVelocity;

#[inline]
pub fn hz(v: f64) -> Frequency {
    use uom::si::frequency::hertz;
    Frequency::new::<hertz>(v)
}

#[inline]
pub fn mhz(v: f64) -> Frequency {
    hz(v * 1.0e6)
}

#[inline]
pub fn m(v: f64) -> Length {
    use uom::si::length::meter;
    Length::new::<meter>(v)
}

#[inline]
pub fn rad(v: f64) -> Angle {
    use uom::si::angle::radian;
    Angle::new::<radian>(v)
}

#[inline]
pub fn deg(v: f64) -> Angle {
    rad(v.to_radians())
}

#[inline]
pub fn arcsec(v: f64) -> Angle {
    deg(v / 3600.0)
}

/// Frequency in hertz.
#[inline]
pub fn to_hz(f: Frequency) -> f64 {
    use uom::si::frequency::hertz;
    f.get::<hertz>()
}

/// Frequency in megahertz. Divides the hertz value directly so exact
/// binary fractions (78.125, 918.75) survive the conversion.
#[inline]
pub fn to_mhz(f: Frequency) -> f64 {
    to_hz(f) / 1.0e6
}

#[inline]
pub fn to_rad(a: Angle) -> f64 {
    use uom::si::angle::radian;
    a.get::<radian>()
}

#[inline]
pub fn to_deg(a: Angle) -> f64 {
    to_rad(a).to_degrees()
}

/// Angle of arc subtended by `length` at `baseline`, e.g. wavelength over
/// aperture diameter.
#[inline]
pub fn small_angle(length: Length, baseline: Length) -> Angle {
    use uom::si::ratio::ratio;
    let r: Ratio = length / baseline;
    rad(r.get::<ratio>())
}

pub mod constants {
    use super::*;

    pub const SPEED_OF_LIGHT_MPS: f64 = 299_792_458.0;

    /// SKA Mid dish diameter.
    pub const MID_DISH_DIAMETER_M: f64 = 15.0;
    /// SKA Low station diameter.
    pub const LOW_STATION_DIAMETER_M: f64 = 39.0;

    /// Mid correlator fine channel width at zoom factor 0.
    pub const MID_CHANNEL_WIDTH_HZ: f64 = 13_440.0;
    /// Low station (coarse) channel width.
    pub const LOW_STATION_CHANNEL_WIDTH_HZ: f64 = 781_250.0;

    /// Common sample rate for all receptor data streams after resampling
    /// and delay tracking; applies for every function mode except VLBI.
    pub const COMMON_SAMPLE_RATE_HZ: f64 = 220_200_960.0;
    pub const VCC_OVERSAMPLING_FACTOR: f64 = 10.0 / 9.0;

    #[inline]
    pub fn c() -> Velocity {
        use uom::si::velocity::meter_per_second;
        Velocity::new::<meter_per_second>(SPEED_OF_LIGHT_MPS)
    }

    /// Bandwidth of one frequency slice (one FSP coarse channel).
    #[inline]
    pub fn frequency_slice_bandwidth() -> Frequency {
        hz(COMMON_SAMPLE_RATE_HZ / VCC_OVERSAMPLING_FACTOR)
    }

    #[inline]
    pub fn mid_dish_diameter() -> Length {
        m(MID_DISH_DIAMETER_M)
    }

    #[inline]
    pub fn low_station_diameter() -> Length {
        m(LOW_STATION_DIAMETER_M)
    }
}
