//! Monotonic time points for absolute-deadline waits.
//!
//! [`ConditionVariable::wait_until`](crate::ConditionVariable::wait_until)
//! takes its deadline against `CLOCK_MONOTONIC`, the clock the condition
//! variables are configured for at init. `MonotonicTimePoint` is that
//! deadline type: a normalized seconds/nanoseconds pair sampled from the
//! clock, with enough arithmetic to build `now + timeout` deadlines and
//! convert to the native `timespec` the wait consumes.

use std::ops::{Add, AddAssign, Sub, SubAssign};
use std::time::Duration;

/// Nanoseconds per second.
const NANOS_PER_SEC: i64 = 1_000_000_000;

/// A point on `CLOCK_MONOTONIC`.
///
/// Always normalized: `nanos` is in `0..1_000_000_000`. Seconds may be
/// negative after subtraction; the clock itself never produces them. Field
/// order makes the derived ordering compare seconds before nanoseconds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct MonotonicTimePoint {
    secs: i64,
    nanos: u32,
}

impl MonotonicTimePoint {
    /// Samples the current monotonic clock reading.
    ///
    /// The native return code is ignored: `CLOCK_MONOTONIC` is supported on
    /// every target this crate compiles for, so the call cannot fail.
    #[must_use]
    pub fn now() -> Self {
        // SAFETY: all-zero bytes is a valid timespec value.
        let mut ts: libc::timespec = unsafe { std::mem::zeroed() };
        // SAFETY: ts points to valid writable storage.
        unsafe { libc::clock_gettime(libc::CLOCK_MONOTONIC, &mut ts) };
        Self::from_timespec(ts)
    }

    /// Builds a time point from a native `timespec`, normalizing `tv_nsec`
    /// values outside `0..1_000_000_000` by carrying into the seconds.
    #[must_use]
    pub fn from_timespec(ts: libc::timespec) -> Self {
        let secs = i64::from(ts.tv_sec);
        let nanos = i64::from(ts.tv_nsec);
        let carry = nanos.div_euclid(NANOS_PER_SEC);
        Self {
            secs: secs + carry,
            nanos: nanos.rem_euclid(NANOS_PER_SEC) as u32,
        }
    }

    /// Converts to the absolute-deadline `timespec` the native timed wait
    /// consumes.
    #[must_use]
    pub fn to_timespec(self) -> libc::timespec {
        // SAFETY: all-zero bytes is a valid timespec value.
        let mut ts: libc::timespec = unsafe { std::mem::zeroed() };
        ts.tv_sec = self.secs as libc::time_t;
        ts.tv_nsec = self.nanos as libc::c_long;
        ts
    }

    /// Whole seconds of the reading.
    #[must_use]
    pub fn secs(self) -> i64 {
        self.secs
    }

    /// Nanosecond fraction, in `0..1_000_000_000`.
    #[must_use]
    pub fn subsec_nanos(self) -> u32 {
        self.nanos
    }

    /// `self + dur`, or `None` on overflow.
    #[must_use]
    pub fn checked_add(self, dur: Duration) -> Option<Self> {
        let secs = self.secs.checked_add(i64::try_from(dur.as_secs()).ok()?)?;
        let nanos = self.nanos + dur.subsec_nanos();
        if nanos >= NANOS_PER_SEC as u32 {
            Some(Self {
                secs: secs.checked_add(1)?,
                nanos: nanos - NANOS_PER_SEC as u32,
            })
        } else {
            Some(Self { secs, nanos })
        }
    }

    /// `self - dur`, or `None` on overflow.
    #[must_use]
    pub fn checked_sub(self, dur: Duration) -> Option<Self> {
        let mut secs = self.secs.checked_sub(i64::try_from(dur.as_secs()).ok()?)?;
        let sub = dur.subsec_nanos();
        let nanos = if self.nanos >= sub {
            self.nanos - sub
        } else {
            secs = secs.checked_sub(1)?;
            self.nanos + NANOS_PER_SEC as u32 - sub
        };
        Some(Self { secs, nanos })
    }

    /// Time elapsed from `earlier` to `self`, or zero if `earlier` is later.
    #[must_use]
    pub fn saturating_duration_since(self, earlier: Self) -> Duration {
        if self <= earlier {
            return Duration::ZERO;
        }
        let mut secs = self.secs - earlier.secs;
        let nanos = if self.nanos >= earlier.nanos {
            self.nanos - earlier.nanos
        } else {
            secs -= 1;
            self.nanos + NANOS_PER_SEC as u32 - earlier.nanos
        };
        Duration::new(secs as u64, nanos)
    }
}

impl Add<Duration> for MonotonicTimePoint {
    type Output = Self;

    /// # Panics
    ///
    /// Panics on overflow, as `std::time::Instant` does. Use
    /// [`MonotonicTimePoint::checked_add`] to handle it.
    fn add(self, rhs: Duration) -> Self {
        self.checked_add(rhs)
            .expect("overflow when adding duration to monotonic time point")
    }
}

impl AddAssign<Duration> for MonotonicTimePoint {
    fn add_assign(&mut self, rhs: Duration) {
        *self = *self + rhs;
    }
}

impl Sub<Duration> for MonotonicTimePoint {
    type Output = Self;

    /// # Panics
    ///
    /// Panics on overflow. Use [`MonotonicTimePoint::checked_sub`] to
    /// handle it.
    fn sub(self, rhs: Duration) -> Self {
        self.checked_sub(rhs)
            .expect("overflow when subtracting duration from monotonic time point")
    }
}

impl SubAssign<Duration> for MonotonicTimePoint {
    fn sub_assign(&mut self, rhs: Duration) {
        *self = *self - rhs;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn point(secs: i64, nanos: u32) -> MonotonicTimePoint {
        MonotonicTimePoint { secs, nanos }
    }

    fn raw_timespec(tv_sec: libc::time_t, tv_nsec: libc::c_long) -> libc::timespec {
        let mut ts: libc::timespec = unsafe { std::mem::zeroed() };
        ts.tv_sec = tv_sec;
        ts.tv_nsec = tv_nsec;
        ts
    }

    #[test]
    fn from_timespec_carries_excess_nanos_up() {
        let tp = MonotonicTimePoint::from_timespec(raw_timespec(10, 1_500_000_000));
        assert_eq!(tp.secs(), 11);
        assert_eq!(tp.subsec_nanos(), 500_000_000);
    }

    #[test]
    fn from_timespec_borrows_for_negative_nanos() {
        let tp = MonotonicTimePoint::from_timespec(raw_timespec(10, -1));
        assert_eq!(tp.secs(), 9);
        assert_eq!(tp.subsec_nanos(), 999_999_999);
    }

    #[test]
    fn ordering_compares_seconds_before_nanos() {
        assert!(point(5, 999_999_999) < point(6, 0));
        assert!(point(6, 1) > point(6, 0));
        assert_eq!(point(6, 0), point(6, 0));
    }

    #[test]
    fn add_carries_into_seconds() {
        let tp = point(1, 900_000_000) + Duration::from_millis(200);
        assert_eq!(tp.secs(), 2);
        assert_eq!(tp.subsec_nanos(), 100_000_000);
    }

    #[test]
    fn sub_borrows_from_seconds() {
        let tp = point(2, 100_000_000) - Duration::from_millis(200);
        assert_eq!(tp.secs(), 1);
        assert_eq!(tp.subsec_nanos(), 900_000_000);
    }

    #[test]
    fn add_then_sub_round_trips() {
        let base = point(100, 123_456_789);
        let dur = Duration::new(7, 987_654_321);
        assert_eq!(base + dur - dur, base);
    }

    #[test]
    fn checked_add_reports_overflow() {
        let tp = point(i64::MAX, 999_999_999);
        assert_eq!(tp.checked_add(Duration::from_nanos(1)), None);
        assert!(tp.checked_add(Duration::ZERO).is_some());
    }

    #[test]
    fn timespec_round_trip_preserves_normalized_values() {
        let tp = point(42, 7);
        let back = MonotonicTimePoint::from_timespec(tp.to_timespec());
        assert_eq!(back, tp);
    }

    #[test]
    fn now_is_non_decreasing() {
        let a = MonotonicTimePoint::now();
        let b = MonotonicTimePoint::now();
        assert!(b >= a, "monotonic clock went backwards: {a:?} -> {b:?}");
    }

    #[test]
    fn saturating_duration_since_clamps_to_zero() {
        let early = point(5, 0);
        let late = point(6, 500_000_000);
        assert_eq!(
            late.saturating_duration_since(early),
            Duration::new(1, 500_000_000)
        );
        assert_eq!(early.saturating_duration_since(late), Duration::ZERO);
    }
}
