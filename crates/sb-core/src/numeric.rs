use crate::CoreError;

/// Floating point type used throughout system
pub type Real = f64;

pub fn ensure_finite(v: Real, what: &'static str) -> Result<Real, CoreError> {
    if v.is_finite() {
        Ok(v)
    } else {
        Err(CoreError::NonFinite { what, value: v })
    }
}

/// Round to a fixed number of decimal places.
pub fn round_to(v: Real, decimals: i32) -> Real {
    let scale = 10f64.powi(decimals);
    (v * scale).round() / scale
}

/// Shortest round-trip rendering that always keeps a fractional part
/// (`75.0`, `78.125`, `450007040.0`). Diagnostic messages use this so
/// whole numbers still read as measurements.
pub fn format_real(v: Real) -> String {
    format!("{v:?}")
}
