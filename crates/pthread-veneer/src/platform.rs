//! Target selection for monotonic condition-variable waits.
//!
//! Every supported target can block on `CLOCK_MONOTONIC`, but the entry point
//! differs. Bionic releases before L lack `pthread_condattr_setclock`, so they
//! ship the dedicated `pthread_cond_timedwait_monotonic_np` instead; glibc and
//! later bionic configure the clock on the condition variable at init time and
//! then use the plain `pthread_cond_timedwait`. Both splits live in this
//! module and nowhere else: construction picks the init routine, the timed
//! wait picks the wait routine, and the rest of the crate is branch-free.

use std::ffi::c_int;

#[cfg(not(any(target_os = "linux", target_os = "android")))]
compile_error!("pthread-veneer targets pthread platforms only (linux or android)");

/// True when monotonic timed waits must go through the pre-L bionic
/// `_monotonic_np` entry point instead of condattr clock selection. The
/// `cfg` guards on the functions below are this predicate; the named form
/// exists for the tests.
#[cfg(all(test, target_os = "linux"))]
const fn legacy_monotonic_timedwait() -> bool {
    cfg!(all(target_os = "android", feature = "bionic-pre-l"))
}

/// Initializes `cond` so timed waits measure against `CLOCK_MONOTONIC`.
///
/// Pre-L bionic cannot express the clock as a condattr; default-initialize
/// and let [`cond_timedwait_monotonic`] supply the clock instead.
///
/// # Safety
///
/// `cond` must point to writable storage for a `pthread_cond_t` that is not
/// currently initialized or in use, and that will not move afterwards.
#[cfg(all(target_os = "android", feature = "bionic-pre-l"))]
pub(crate) unsafe fn cond_init_monotonic(cond: *mut libc::pthread_cond_t) -> c_int {
    // SAFETY: caller guarantees cond is valid uninitialized storage.
    unsafe { libc::pthread_cond_init(cond, std::ptr::null()) }
}

/// Initializes `cond` so timed waits measure against `CLOCK_MONOTONIC`.
///
/// The clock is recorded in a condattr consumed by `pthread_cond_init`;
/// [`cond_timedwait_monotonic`] can then use the generic timed wait.
///
/// # Safety
///
/// `cond` must point to writable storage for a `pthread_cond_t` that is not
/// currently initialized or in use, and that will not move afterwards.
#[cfg(not(all(target_os = "android", feature = "bionic-pre-l")))]
pub(crate) unsafe fn cond_init_monotonic(cond: *mut libc::pthread_cond_t) -> c_int {
    // SAFETY: all-zero bytes is an acceptable pre-init image; condattr_init
    // overwrites it before use.
    let mut attr: libc::pthread_condattr_t = unsafe { std::mem::zeroed() };
    // SAFETY: attr points to valid writable storage.
    let mut rc = unsafe { libc::pthread_condattr_init(&mut attr) };
    if rc != 0 {
        return rc;
    }
    // SAFETY: attr was initialized above.
    rc = unsafe { libc::pthread_condattr_setclock(&mut attr, libc::CLOCK_MONOTONIC) };
    if rc == 0 {
        // SAFETY: caller guarantees cond is valid uninitialized storage; attr
        // is initialized and carries the monotonic clock.
        rc = unsafe { libc::pthread_cond_init(cond, &attr) };
    }
    // SAFETY: attr was initialized above and is destroyed exactly once.
    unsafe { libc::pthread_condattr_destroy(&mut attr) };
    rc
}

/// Blocks on `cond` until notified or until `CLOCK_MONOTONIC` reaches
/// `deadline` (absolute). Returns the native code, `ETIMEDOUT` on expiry.
///
/// # Safety
///
/// `cond` must have been initialized by [`cond_init_monotonic`], `mutex` must
/// be an initialized native mutex held by the calling thread, and both must
/// stay valid for the duration of the call.
#[cfg(all(target_os = "android", feature = "bionic-pre-l"))]
pub(crate) unsafe fn cond_timedwait_monotonic(
    cond: *mut libc::pthread_cond_t,
    mutex: *mut libc::pthread_mutex_t,
    deadline: &libc::timespec,
) -> c_int {
    // SAFETY: upheld by the caller per this function's contract.
    unsafe { libc::pthread_cond_timedwait_monotonic_np(cond, mutex, deadline) }
}

/// Blocks on `cond` until notified or until `CLOCK_MONOTONIC` reaches
/// `deadline` (absolute). Returns the native code, `ETIMEDOUT` on expiry.
///
/// The generic timed wait already measures against the monotonic clock
/// because [`cond_init_monotonic`] recorded it in the condattr.
///
/// # Safety
///
/// `cond` must have been initialized by [`cond_init_monotonic`], `mutex` must
/// be an initialized native mutex held by the calling thread, and both must
/// stay valid for the duration of the call.
#[cfg(not(all(target_os = "android", feature = "bionic-pre-l")))]
pub(crate) unsafe fn cond_timedwait_monotonic(
    cond: *mut libc::pthread_cond_t,
    mutex: *mut libc::pthread_mutex_t,
    deadline: &libc::timespec,
) -> c_int {
    // SAFETY: upheld by the caller per this function's contract.
    unsafe { libc::pthread_cond_timedwait(cond, mutex, deadline) }
}
