//! Update-rate gating.
//!
//! Sensors run at their own configured rate no matter how often the caller
//! polls. A gate answers "is a new sample due?" for a given simulation time.
//!
//! When the caller polls more coarsely than the sensor rate, the missed
//! intervals are coalesced into a single sample. The schedule keeps its
//! phase: the next due time is advanced by whole intervals past `now`.

use sensor_types::{Duration, Timestamp};
use tracing::trace;

/// Fixed-interval gate with coalescing of missed intervals.
///
/// # Example
///
/// ```
/// use sensor_emu::rate::UpdateGate;
/// use sensor_types::{Duration, Timestamp};
///
/// let mut gate = UpdateGate::new(Duration::from_millis(10));
/// assert!(gate.poll(Timestamp::from_nanos(0)));            // first poll fires
/// assert!(!gate.poll(Timestamp::from_nanos(5_000_000)));   // too early
/// assert!(gate.poll(Timestamp::from_nanos(10_000_000)));   // exactly due
/// assert!(gate.poll(Timestamp::from_nanos(45_000_000)));   // late: one sample
/// assert_eq!(gate.missed(), 2);                            // 20 ms and 30 ms skipped
/// assert!(!gate.poll(Timestamp::from_nanos(49_000_000)));  // next due at 50 ms
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UpdateGate {
    interval: Duration,
    next_due: Option<Timestamp>,
    missed: u64,
}

impl UpdateGate {
    /// Creates a gate firing every `interval`.
    ///
    /// A zero interval fires on every poll.
    #[must_use]
    pub const fn new(interval: Duration) -> Self {
        Self {
            interval,
            next_due: None,
            missed: 0,
        }
    }

    /// Creates a gate from a rate in hertz.
    ///
    /// Returns `None` for non-positive or non-finite rates.
    #[must_use]
    pub fn from_rate_hz(hz: f64) -> Option<Self> {
        Duration::from_rate_hz(hz).map(Self::new)
    }

    /// Returns the configured interval.
    #[must_use]
    pub const fn interval(&self) -> Duration {
        self.interval
    }

    /// Returns the total number of intervals coalesced away so far.
    #[must_use]
    pub const fn missed(&self) -> u64 {
        self.missed
    }

    /// Returns the time at which the next sample is due, if scheduled.
    #[must_use]
    pub const fn next_due(&self) -> Option<Timestamp> {
        self.next_due
    }

    /// Clears the schedule so the next poll fires immediately.
    pub fn reset(&mut self) {
        self.next_due = None;
    }

    /// Returns `true` if a sample is due at `now`, and advances the schedule.
    pub fn poll(&mut self, now: Timestamp) -> bool {
        let Some(due) = self.next_due else {
            self.next_due = Some(now.saturating_add(self.interval));
            return true;
        };
        let Some(late) = now.checked_duration_since(due) else {
            return false;
        };

        let interval = self.interval.as_nanos();
        let skipped = late.as_nanos().checked_div(interval).unwrap_or(0);
        if skipped > 0 {
            self.missed += skipped;
            trace!(skipped, "coalesced missed sensor intervals");
        }
        let advance = Duration::from_nanos(interval.saturating_mul(skipped.saturating_add(1)));
        self.next_due = Some(due.saturating_add(advance));
        true
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    fn ms(millis: u64) -> Timestamp {
        Timestamp::from_nanos(millis * 1_000_000)
    }

    #[test]
    fn first_poll_fires() {
        let mut gate = UpdateGate::new(Duration::from_millis(10));
        assert!(gate.poll(ms(123)));
        assert_eq!(gate.next_due(), Some(ms(133)));
    }

    #[test]
    fn fires_once_per_interval_when_polled_fast() {
        let mut gate = UpdateGate::new(Duration::from_millis(10));
        let fired = (0..100).filter(|&t| gate.poll(ms(t))).count();
        assert_eq!(fired, 10);
        assert_eq!(gate.missed(), 0);
    }

    #[test]
    fn coarse_polling_coalesces() {
        let mut gate = UpdateGate::new(Duration::from_millis(10));
        assert!(gate.poll(ms(0)));
        // Polling every 35 ms: each poll yields exactly one sample.
        assert!(gate.poll(ms(35)));
        assert_eq!(gate.missed(), 2);
        assert_eq!(gate.next_due(), Some(ms(40)));
        assert!(gate.poll(ms(70)));
        assert_eq!(gate.missed(), 5);
        assert_eq!(gate.next_due(), Some(ms(80)));
    }

    #[test]
    fn schedule_keeps_phase() {
        let mut gate = UpdateGate::new(Duration::from_millis(10));
        assert!(gate.poll(ms(3)));
        assert!(gate.poll(ms(14)));
        assert_eq!(gate.next_due(), Some(ms(23)));
    }

    #[test]
    fn zero_interval_always_fires() {
        let mut gate = UpdateGate::new(Duration::zero());
        assert!(gate.poll(ms(0)));
        assert!(gate.poll(ms(0)));
        assert!(gate.poll(ms(1)));
        assert_eq!(gate.missed(), 0);
    }

    #[test]
    fn from_rate() {
        let gate = UpdateGate::from_rate_hz(200.0).unwrap();
        assert_eq!(gate.interval(), Duration::from_millis(5));
        assert!(UpdateGate::from_rate_hz(0.0).is_none());
    }

    #[test]
    fn reset_fires_immediately() {
        let mut gate = UpdateGate::new(Duration::from_millis(10));
        assert!(gate.poll(ms(0)));
        assert!(!gate.poll(ms(1)));
        gate.reset();
        assert!(gate.poll(ms(2)));
    }
}
