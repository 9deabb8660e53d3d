//! Numeric literal rendering.

/// Digits after the decimal point in fixture literals: 17 significant
/// digits, enough to round-trip every finite `f64`.
pub const LITERAL_PRECISION: usize = 16;

/// Digits after the decimal point in diagnostic comments.
pub const DIAGNOSTIC_PRECISION: usize = 6;

/// C-style scientific notation (`-1.5000e+03`) with a signed, two-digit
/// minimum exponent. Non-finite values render as `nan`, `inf`, `-inf`.
#[must_use]
pub fn format_scientific(value: f64, precision: usize) -> String {
    if value.is_nan() {
        return String::from("nan");
    }
    if value.is_infinite() {
        return String::from(if value > 0.0 { "inf" } else { "-inf" });
    }
    let rendered = format!("{value:.precision$e}");
    let Some((mantissa, exponent)) = rendered.split_once('e') else {
        return rendered;
    };
    let Ok(exponent) = exponent.parse::<i32>() else {
        return rendered;
    };
    let sign = if exponent < 0 { '-' } else { '+' };
    format!("{mantissa}e{sign}{:02}", exponent.unsigned_abs())
}

/// Full-precision C++ literal of type `scalar`.
#[must_use]
pub fn cpp_literal(value: f64, scalar: &str) -> String {
    if value.is_nan() {
        format!("std::numeric_limits<{scalar}>::quiet_NaN()")
    } else if value.is_infinite() {
        let sign = if value < 0.0 { "-" } else { "" };
        format!("{sign}std::numeric_limits<{scalar}>::infinity()")
    } else {
        format_scientific(value, LITERAL_PRECISION)
    }
}

/// Shortest round-tripping form, used for epsilons (`1e-12`).
#[must_use]
pub fn format_epsilon(value: f64) -> String {
    format!("{value:e}")
}
