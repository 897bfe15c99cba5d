//! Rational timing types for exact step timing
//!
//! Pattern durations are `value / time_scale` seconds. Keeping them as
//! rationals means the per-tick accumulation and the step comparison never
//! drift, no matter how long the timer runs.

use num_rational::Ratio;
use num_traits::Zero;
use std::time::Duration;

/// Exact time in seconds
pub type Time = Ratio<u64>;

/// Helper to create Time from a ratio n/d
///
/// Panics if `d` is zero, like `Ratio::new`.
#[inline]
pub fn time(n: u64, d: u64) -> Time {
    Ratio::new(n, d)
}

/// Create Time from whole seconds
#[inline]
pub fn seconds(n: u64) -> Time {
    Ratio::from_integer(n)
}

/// Convert rational to f64 for reporting
#[inline]
pub fn to_f64(t: Time) -> f64 {
    *t.numer() as f64 / *t.denom() as f64
}

/// Convert f64 seconds to approximate Time (for user-entered durations)
/// Uses microsecond precision; negative and non-finite input gives zero
pub fn from_f64(f: f64) -> Time {
    let denom = 1_000_000u64;
    if !f.is_finite() || f <= 0.0 {
        return Ratio::from_integer(0);
    }
    let numer = (f * denom as f64).round() as u64;
    Ratio::new(numer, denom)
}

/// Convert rational seconds to a `std::time::Duration`, rounded down to the nanosecond
pub fn to_duration(t: Time) -> Duration {
    let nanos = (*t.numer() as u128 * 1_000_000_000) / *t.denom() as u128;
    let secs = (nanos / 1_000_000_000) as u64;
    let subsec = (nanos % 1_000_000_000) as u32;
    Duration::new(secs, subsec)
}

/// Greatest common divisor (Euclid). `gcd(a, 0) == a`.
pub fn gcd(a: u64, b: u64) -> u64 {
    let (mut a, mut b) = (a, b);
    while b != 0 {
        (a, b) = (b, a % b);
    }
    a
}

/// Left-to-right GCD over a sequence; `None` when the sequence is empty
pub fn gcd_all(values: &[u64]) -> Option<u64> {
    let (first, rest) = values.split_first()?;
    Some(rest.iter().fold(*first, |acc, &v| gcd(acc, v)))
}

/// Whether a time value is exactly zero
#[inline]
pub fn is_zero(t: Time) -> bool {
    t.is_zero()
}
