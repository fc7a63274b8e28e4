//! core::duration
//!
//! Rounding and display of elapsed times for command output.
//!
//! # Rounding
//!
//! [`round`] keeps roughly five significant digits: a 2 hour build does not
//! need its timing reported down to the millisecond, a 300µs git call does.
//! Above one hour the value is rounded to the nearest 10 seconds.
//!
//! # Display
//!
//! [`format_duration`] renders a duration the way build logs have always shown
//! them (`321ns`, `4.321µs`, `87.654ms`, `5m21.99s`, `1h12m0s`).
//!
//! # Example
//!
//! ```
//! use jobshell::core::duration::{format_duration, round};
//! use std::time::Duration;
//!
//! let elapsed = Duration::from_nanos(87_654_321);
//! assert_eq!(format_duration(round(elapsed)), "87.654ms");
//! ```

use std::fmt::Write;
use std::time::Duration;

const NANOS_PER_MICRO: u128 = 1_000;
const NANOS_PER_MILLI: u128 = 1_000_000;
const NANOS_PER_SEC: u128 = 1_000_000_000;

/// Round a duration to a precision that shrinks as its magnitude grows.
pub fn round(d: Duration) -> Duration {
    let step = if d < Duration::from_micros(100) {
        return d;
    } else if d < Duration::from_millis(1) {
        Duration::from_nanos(10)
    } else if d < Duration::from_millis(10) {
        Duration::from_nanos(100)
    } else if d < Duration::from_millis(100) {
        Duration::from_micros(1)
    } else if d < Duration::from_secs(1) {
        Duration::from_micros(10)
    } else if d < Duration::from_secs(10) {
        Duration::from_micros(100)
    } else if d < Duration::from_secs(100) {
        Duration::from_millis(1)
    } else if d < Duration::from_secs(3600) {
        Duration::from_millis(10)
    } else {
        Duration::from_secs(10)
    };
    round_to(d, step)
}

/// Round half away from zero to a multiple of `step`.
fn round_to(d: Duration, step: Duration) -> Duration {
    let nanos = d.as_nanos();
    let step = step.as_nanos();
    let remainder = nanos % step;
    let rounded = if remainder * 2 < step {
        nanos - remainder
    } else {
        nanos - remainder + step
    };
    Duration::from_nanos(u64::try_from(rounded).unwrap_or(u64::MAX))
}

/// Format a duration using the unit suffixes of build logs.
///
/// Sub-second values use a single unit (`ns`, `µs`, `ms`) with a trimmed
/// decimal fraction. Longer values are split into hours, minutes, and
/// seconds, omitting leading zero components.
pub fn format_duration(d: Duration) -> String {
    let nanos = d.as_nanos();
    if nanos == 0 {
        return "0s".to_string();
    }
    if nanos < NANOS_PER_MICRO {
        return format!("{nanos}ns");
    }
    if nanos < NANOS_PER_MILLI {
        return format!("{}µs", decimal(nanos, NANOS_PER_MICRO));
    }
    if nanos < NANOS_PER_SEC {
        return format!("{}ms", decimal(nanos, NANOS_PER_MILLI));
    }

    let total_secs = nanos / NANOS_PER_SEC;
    let hours = total_secs / 3600;
    let minutes = (total_secs % 3600) / 60;
    let seconds = nanos - (hours * 3600 + minutes * 60) * NANOS_PER_SEC;

    let mut out = String::new();
    if hours > 0 {
        let _ = write!(out, "{hours}h");
    }
    if hours > 0 || minutes > 0 {
        let _ = write!(out, "{minutes}m");
    }
    let _ = write!(out, "{}s", decimal(seconds, NANOS_PER_SEC));
    out
}

/// Render `value / unit` with trailing fractional zeros removed.
fn decimal(value: u128, unit: u128) -> String {
    let whole = value / unit;
    let fraction = value % unit;
    if fraction == 0 {
        return whole.to_string();
    }
    let width = unit.ilog10() as usize;
    let digits = format!("{fraction:0width$}");
    format!("{whole}.{}", digits.trim_end_matches('0'))
}
