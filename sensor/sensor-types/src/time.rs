//! Time types for emulated sensor streams.
//!
//! Simulation time is kept as integer nanoseconds so that rate gates compare
//! exact values instead of accumulating floating-point error.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Nanosecond-precision monotonic timestamp.
///
/// Measured from the start of the simulation, not from a wall-clock epoch.
///
/// # Example
///
/// ```
/// use sensor_types::Timestamp;
///
/// let ts = Timestamp::from_secs_f64(1.5);
/// assert!((ts.as_secs_f64() - 1.5).abs() < 1e-9);
///
/// let ts_nanos = Timestamp::from_nanos(1_500_000_000);
/// assert_eq!(ts, ts_nanos);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Timestamp {
    /// Nanoseconds since simulation start.
    nanos: u64,
}

impl Timestamp {
    /// Creates a timestamp from nanoseconds.
    #[must_use]
    pub const fn from_nanos(nanos: u64) -> Self {
        Self { nanos }
    }

    /// Creates a timestamp from seconds (floating point).
    ///
    /// Negative inputs clamp to zero.
    #[must_use]
    #[allow(clippy::cast_sign_loss, clippy::cast_possible_truncation)]
    pub fn from_secs_f64(secs: f64) -> Self {
        let nanos = (secs * 1e9).max(0.0).round() as u64;
        Self { nanos }
    }

    /// Returns the timestamp as nanoseconds.
    #[must_use]
    pub const fn as_nanos(self) -> u64 {
        self.nanos
    }

    /// Returns the timestamp as seconds (floating point).
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn as_secs_f64(self) -> f64 {
        self.nanos as f64 / 1e9
    }

    /// Returns the zero timestamp.
    #[must_use]
    pub const fn zero() -> Self {
        Self { nanos: 0 }
    }

    /// Checks if this is the zero timestamp.
    #[must_use]
    pub const fn is_zero(self) -> bool {
        self.nanos == 0
    }

    /// Adds a duration to this timestamp.
    ///
    /// Returns `None` on overflow.
    #[must_use]
    pub const fn checked_add(self, duration: Duration) -> Option<Self> {
        match self.nanos.checked_add(duration.as_nanos()) {
            Some(nanos) => Some(Self { nanos }),
            None => None,
        }
    }

    /// Adds a duration, saturating at the maximum representable time.
    #[must_use]
    pub const fn saturating_add(self, duration: Duration) -> Self {
        Self {
            nanos: self.nanos.saturating_add(duration.as_nanos()),
        }
    }

    /// Returns the time elapsed since `earlier`.
    ///
    /// Returns `None` if `earlier` is later than `self`.
    #[must_use]
    pub const fn checked_duration_since(self, earlier: Self) -> Option<Duration> {
        match self.nanos.checked_sub(earlier.nanos) {
            Some(nanos) => Some(Duration::from_nanos(nanos)),
            None => None,
        }
    }

    /// Returns the duration between two timestamps.
    ///
    /// Always returns a non-negative duration (absolute difference).
    #[must_use]
    pub const fn abs_diff(self, other: Self) -> Duration {
        Duration::from_nanos(self.nanos.abs_diff(other.nanos))
    }
}

/// A duration of time with nanosecond precision.
///
/// # Example
///
/// ```
/// use sensor_types::Duration;
///
/// let d = Duration::from_millis(20);
/// assert_eq!(d.as_nanos(), 20_000_000);
/// assert_eq!(Duration::from_rate_hz(50.0), Some(d));
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Duration {
    /// Duration in nanoseconds.
    nanos: u64,
}

impl Duration {
    /// Creates a duration from nanoseconds.
    #[must_use]
    pub const fn from_nanos(nanos: u64) -> Self {
        Self { nanos }
    }

    /// Creates a duration from milliseconds.
    #[must_use]
    pub const fn from_millis(millis: u64) -> Self {
        Self {
            nanos: millis * 1_000_000,
        }
    }

    /// Creates a duration from seconds (floating point).
    ///
    /// Negative and `NaN` inputs clamp to zero.
    #[must_use]
    #[allow(clippy::cast_sign_loss, clippy::cast_possible_truncation)]
    pub fn from_secs_f64(secs: f64) -> Self {
        let nanos = (secs * 1e9).max(0.0).round() as u64;
        Self { nanos }
    }

    /// Returns the period of a rate given in hertz.
    ///
    /// Returns `None` for non-positive or non-finite rates.
    #[must_use]
    pub fn from_rate_hz(hz: f64) -> Option<Self> {
        if hz.is_finite() && hz > 0.0 {
            Some(Self::from_secs_f64(1.0 / hz))
        } else {
            None
        }
    }

    /// Returns the duration as nanoseconds.
    #[must_use]
    pub const fn as_nanos(self) -> u64 {
        self.nanos
    }

    /// Returns the duration as seconds (floating point).
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn as_secs_f64(self) -> f64 {
        self.nanos as f64 / 1e9
    }

    /// Returns the zero duration.
    #[must_use]
    pub const fn zero() -> Self {
        Self { nanos: 0 }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn timestamp_from_secs_f64() {
        let ts = Timestamp::from_secs_f64(1.5);
        assert_eq!(ts.as_nanos(), 1_500_000_000);
        assert!((ts.as_secs_f64() - 1.5).abs() < 1e-9);
    }

    #[test]
    fn timestamp_negative_clamps() {
        assert!(Timestamp::from_secs_f64(-3.0).is_zero());
    }

    #[test]
    fn timestamp_checked_ops() {
        let ts = Timestamp::from_nanos(1000);
        let d = Duration::from_nanos(500);

        assert_eq!(ts.checked_add(d), Some(Timestamp::from_nanos(1500)));
        assert_eq!(Timestamp::from_nanos(u64::MAX).checked_add(d), None);
        assert_eq!(
            Timestamp::from_nanos(u64::MAX).saturating_add(d),
            Timestamp::from_nanos(u64::MAX)
        );
    }

    #[test]
    fn timestamp_duration_since() {
        let a = Timestamp::from_nanos(1000);
        let b = Timestamp::from_nanos(300);

        assert_eq!(a.checked_duration_since(b), Some(Duration::from_nanos(700)));
        assert_eq!(b.checked_duration_since(a), None);
        assert_eq!(b.abs_diff(a), Duration::from_nanos(700));
    }

    #[test]
    fn duration_conversions() {
        let d = Duration::from_millis(1500);
        assert_eq!(d.as_nanos(), 1_500_000_000);
        assert!((d.as_secs_f64() - 1.5).abs() < 1e-9);
        assert_eq!(Duration::from_secs_f64(0.005).as_nanos(), 5_000_000);
        assert_eq!(Duration::from_secs_f64(f64::NAN), Duration::zero());
    }

    #[test]
    fn rate_periods_round_to_whole_nanoseconds() {
        // 1/30 s is not representable; the period must not drift by truncation.
        assert_eq!(Duration::from_rate_hz(30.0).map(Duration::as_nanos), Some(33_333_333));
        assert_eq!(Duration::from_rate_hz(200.0).map(Duration::as_nanos), Some(5_000_000));
        assert_eq!(Duration::from_rate_hz(3.0).map(Duration::as_nanos), Some(333_333_333));
    }

    #[test]
    fn duration_from_rate() {
        assert_eq!(
            Duration::from_rate_hz(100.0),
            Some(Duration::from_millis(10))
        );
        assert_eq!(Duration::from_rate_hz(0.0), None);
        assert_eq!(Duration::from_rate_hz(-5.0), None);
        assert_eq!(Duration::from_rate_hz(f64::NAN), None);
    }
}
