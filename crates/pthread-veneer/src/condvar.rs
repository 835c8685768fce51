//! Condition variables bound to one mutex, waiting on the monotonic clock.

use std::cell::UnsafeCell;
use std::ffi::c_int;
use std::fmt;

use crate::Mutex;
use crate::platform;
use crate::time::MonotonicTimePoint;

/// A condition variable permanently paired with one [`Mutex`].
///
/// The pairing is fixed at construction: the borrow keeps the mutex alive for
/// as long as the condition variable exists, so the native requirement that
/// all concurrent waiters use the same mutex holds by construction rather
/// than by convention.
///
/// Timed waits measure their deadline against `CLOCK_MONOTONIC` (see
/// [`MonotonicTimePoint`]); the clock is configured when the native object is
/// initialized, so wall-clock adjustments never shorten or stretch a wait.
///
/// Every operation returns the native code unchanged: `0` on success,
/// otherwise an `errno`-style value such as [`libc::ETIMEDOUT`]. Wakeups may
/// be spurious; callers re-check their predicate around every wait.
pub struct ConditionVariable<'m> {
    raw: Box<UnsafeCell<libc::pthread_cond_t>>,
    mutex: &'m Mutex,
}

// SAFETY: the native condition variable synchronizes its own internals;
// every access to the inner cell goes through pthread calls built for
// cross-thread use.
unsafe impl Send for ConditionVariable<'_> {}
// SAFETY: as above.
unsafe impl Sync for ConditionVariable<'_> {}

impl<'m> ConditionVariable<'m> {
    /// Creates a condition variable tied to `mutex` for its whole lifetime,
    /// configured for monotonic-clock timed waits.
    #[must_use]
    pub fn new(mutex: &'m Mutex) -> Self {
        // SAFETY: all-zero bytes is an acceptable pre-init image; init
        // overwrites it before first use.
        let raw = Box::new(UnsafeCell::new(unsafe { std::mem::zeroed() }));
        // SAFETY: raw is heap-pinned writable storage, not yet initialized.
        unsafe { platform::cond_init_monotonic(raw.get()) };
        Self { raw, mutex }
    }

    /// Wakes at most one thread blocked in [`wait`](Self::wait) or
    /// [`wait_until`](Self::wait_until). A no-op with no waiters.
    pub fn notify_one(&self) -> c_int {
        // SAFETY: self.raw was initialized in new().
        unsafe { libc::pthread_cond_signal(self.raw.get()) }
    }

    /// Wakes every thread currently blocked on this condition variable.
    /// A no-op with no waiters.
    pub fn notify_all(&self) -> c_int {
        // SAFETY: self.raw was initialized in new().
        unsafe { libc::pthread_cond_broadcast(self.raw.get()) }
    }

    /// Atomically releases the paired mutex and blocks until notified, then
    /// re-acquires the mutex before returning.
    ///
    /// The calling thread must hold the paired mutex, as with the native API.
    pub fn wait(&self) -> c_int {
        // SAFETY: both natives were initialized by their constructors and are
        // heap-pinned; the caller holds the mutex per this method's contract.
        unsafe { libc::pthread_cond_wait(self.raw.get(), self.mutex.raw()) }
    }

    /// Like [`wait`](Self::wait), but gives up once the monotonic clock
    /// reaches `deadline`, returning [`libc::ETIMEDOUT`].
    ///
    /// A deadline already in the past times out without blocking. The paired
    /// mutex is re-acquired before returning in every case, timeout included.
    pub fn wait_until(&self, deadline: MonotonicTimePoint) -> c_int {
        let ts = deadline.to_timespec();
        // SAFETY: as in wait(); ts is a valid absolute timespec.
        unsafe { platform::cond_timedwait_monotonic(self.raw.get(), self.mutex.raw(), &ts) }
    }
}

impl fmt::Debug for ConditionVariable<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConditionVariable").finish_non_exhaustive()
    }
}

impl Drop for ConditionVariable<'_> {
    fn drop(&mut self) {
        // SAFETY: drop has exclusive access and the storage was initialized
        // in new(). No waiters may still be blocked here, the same contract
        // as the native API.
        unsafe { libc::pthread_cond_destroy(self.raw.get()) };
    }
}
