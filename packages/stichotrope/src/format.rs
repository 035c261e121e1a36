//! Human-readable rendering of nanosecond durations.

const NANOS_PER_MILLI: u64 = 1_000_000;
const NANOS_PER_SECOND: u64 = 1_000_000_000;

/// Renders a nanosecond count in the largest unit that keeps the number human-scale.
///
/// Durations under a millisecond are shown as whole nanoseconds, durations under a second as
/// milliseconds and everything else as seconds, the latter two with two decimal places.
///
/// # Examples
///
/// ```
/// use stichotrope::format_duration_ns;
///
/// assert_eq!(format_duration_ns(500), "500 ns");
/// assert_eq!(format_duration_ns(1_500_000), "1.50 ms");
/// assert_eq!(format_duration_ns(1_500_000_000), "1.50 s");
/// ```
#[must_use]
pub fn format_duration_ns(nanos: u64) -> String {
    if nanos >= NANOS_PER_SECOND {
        format!("{:.2} s", nanos_to_seconds(nanos))
    } else if nanos >= NANOS_PER_MILLI {
        format!("{:.2} ms", nanos_to_millis(nanos))
    } else {
        format!("{nanos} ns")
    }
}

/// Converts nanoseconds to fractional milliseconds.
#[must_use]
#[expect(
    clippy::cast_precision_loss,
    reason = "derived display column, precision beyond 2^53 ns is irrelevant"
)]
pub(crate) fn nanos_to_millis(nanos: u64) -> f64 {
    nanos as f64 / 1e6
}

/// Converts nanoseconds to fractional seconds.
#[must_use]
#[expect(
    clippy::cast_precision_loss,
    reason = "derived display column, precision beyond 2^53 ns is irrelevant"
)]
pub(crate) fn nanos_to_seconds(nanos: u64) -> f64 {
    nanos as f64 / 1e9
}

/// The share of `whole` that `part` represents, in percent. Zero if `whole` is zero.
#[must_use]
#[expect(
    clippy::cast_precision_loss,
    reason = "display percentage, precision beyond 2^53 ns is irrelevant"
)]
pub(crate) fn percent_of(part: u64, whole: u64) -> f64 {
    if whole == 0 {
        return 0.0;
    }

    part as f64 * 100.0 / whole as f64
}
