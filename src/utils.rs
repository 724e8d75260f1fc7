//! Shared numeric helpers
//!
//! Every rate or average shown to the user goes through these so that a
//! zero or non-finite denominator yields `0` instead of `NaN`/`Infinity`.

use std::time::Duration;

/// `numerator / denominator`, or `0.0` when the result would not be finite
///
/// ```
/// use rig_testkit::utils::safe_ratio;
///
/// assert_eq!(safe_ratio(10.0, 4.0), 2.5);
/// assert_eq!(safe_ratio(10.0, 0.0), 0.0);
/// assert_eq!(safe_ratio(0.0, 0.0), 0.0);
/// ```
pub fn safe_ratio(numerator: f64, denominator: f64) -> f64 {
    if denominator == 0.0 {
        return 0.0;
    }
    let value = numerator / denominator;
    if value.is_finite() {
        value
    } else {
        0.0
    }
}

/// Events per second over `elapsed`, `0.0` when less than a millisecond
/// has elapsed
pub fn per_second(count: u64, elapsed: Duration) -> f64 {
    let millis = elapsed.as_millis();
    if millis == 0 {
        return 0.0;
    }
    safe_ratio(count as f64 * 1000.0, millis as f64)
}

/// Round half away from zero to the nearest integer, clamped to `u32`
pub fn round_u32(value: f64) -> u32 {
    if !value.is_finite() || value <= 0.0 {
        return 0;
    }
    value.round().min(u32::MAX as f64) as u32
}

/// Round to a fixed number of decimal places
pub fn round_to(value: f64, decimals: i32) -> f64 {
    let factor = 10f64.powi(decimals);
    (value * factor).round() / factor
}

/// Milliseconds as a float
pub fn as_millis_f64(duration: Duration) -> f64 {
    duration.as_nanos() as f64 / 1_000_000.0
}
