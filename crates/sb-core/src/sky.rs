//! ICRS sky positions: sexagesimal parsing and spherical geometry.
//!
//! Right ascension strings are hours (`"05:23:34.6000"`), declination strings
//! are degrees (`"-69:45:22.000"`). Separators may be `:` or whitespace and
//! one to three components are accepted (`"12"`, `"12:30"`, `"12:30:00"`).

use std::f64::consts::TAU;

use crate::error::{CoreError, CoreResult};
use crate::numeric::ensure_finite;
use crate::units::{Angle, deg, rad, to_rad};

/// A position on the celestial sphere.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SkyPosition {
    pub ra: Angle,
    pub dec: Angle,
}

impl SkyPosition {
    pub fn new(ra: Angle, dec: Angle) -> Self {
        Self { ra, dec }
    }

    pub fn from_degrees(ra_deg: f64, dec_deg: f64) -> Self {
        Self::new(deg(ra_deg), deg(dec_deg))
    }

    /// Parse an ICRS position from sexagesimal strings.
    pub fn from_sexagesimal(ra_str: &str, dec_str: &str) -> CoreResult<Self> {
        Ok(Self::new(parse_hms(ra_str)?, parse_dms(dec_str)?))
    }

    /// Great-circle separation (Vincenty formula, stable at all distances).
    pub fn separation(&self, other: &SkyPosition) -> Angle {
        let (lon1, lat1) = (to_rad(self.ra), to_rad(self.dec));
        let (lon2, lat2) = (to_rad(other.ra), to_rad(other.dec));

        let (sdlon, cdlon) = (lon2 - lon1).sin_cos();
        let (slat1, clat1) = lat1.sin_cos();
        let (slat2, clat2) = lat2.sin_cos();

        let num1 = clat2 * sdlon;
        let num2 = clat1 * slat2 - slat1 * clat2 * cdlon;
        let denominator = slat1 * slat2 + clat1 * clat2 * cdlon;

        rad(num1.hypot(num2).atan2(denominator))
    }

    /// Position reached by moving `d_lon` east and `d_lat` north in the
    /// tangent frame centred on `self`.
    pub fn spherical_offsets_by(&self, d_lon: Angle, d_lat: Angle) -> SkyPosition {
        let (ra0, dec0) = (to_rad(self.ra), to_rad(self.dec));
        let (l, b) = (to_rad(d_lon), to_rad(d_lat));

        let (sdec0, cdec0) = dec0.sin_cos();
        let (sb, cb) = b.sin_cos();
        let (sl, cl) = l.sin_cos();

        let z = cb * cl * sdec0 + sb * cdec0;
        let x = cb * cl * cdec0 - sb * sdec0;
        let y = cb * sl;

        let dec = z.clamp(-1.0, 1.0).asin();
        let ra = (ra0 + y.atan2(x)).rem_euclid(TAU);

        SkyPosition::new(rad(ra), rad(dec))
    }
}

/// Parse an hour angle (`"hh:mm:ss.s"`) into an angle in `[0, 360)` degrees.
pub fn parse_hms(value: &str) -> CoreResult<Angle> {
    let hours = parse_sexagesimal(value, "right ascension")?;
    if !(0.0..24.0).contains(&hours) {
        return Err(CoreError::InvalidCoordinate {
            what: "right ascension",
            value: value.to_string(),
        });
    }
    Ok(deg(hours * 15.0))
}

/// Parse a signed degree value (`"+dd:mm:ss.s"`) into an angle in `[-90, 90]`.
pub fn parse_dms(value: &str) -> CoreResult<Angle> {
    let degrees = parse_sexagesimal(value, "declination")?;
    if degrees.abs() > 90.0 {
        return Err(CoreError::InvalidCoordinate {
            what: "declination",
            value: value.to_string(),
        });
    }
    Ok(deg(degrees))
}

fn parse_sexagesimal(value: &str, what: &'static str) -> CoreResult<f64> {
    let invalid = || CoreError::InvalidCoordinate {
        what,
        value: value.to_string(),
    };

    let trimmed = value.trim();
    let (negative, unsigned) = match trimmed.strip_prefix('-') {
        Some(rest) => (true, rest),
        None => (false, trimmed.strip_prefix('+').unwrap_or(trimmed)),
    };

    let parts: Vec<&str> = unsigned
        .split(|c: char| c == ':' || c.is_whitespace())
        .filter(|part| !part.is_empty())
        .collect();
    if parts.is_empty() || parts.len() > 3 {
        return Err(invalid());
    }

    let mut magnitude = 0.0;
    for (index, part) in parts.iter().enumerate() {
        let component: f64 = part.parse().map_err(|_| invalid())?;
        if component < 0.0 || (index > 0 && component >= 60.0) {
            return Err(invalid());
        }
        magnitude += component / 60f64.powi(index as i32);
    }
    let magnitude = ensure_finite(magnitude, what)?;

    Ok(if negative { -magnitude } else { magnitude })
}
