//! Scope-bound lock ownership over anything that can acquire and release.
//!
//! [`LockGuard`] is one generic guard rather than a family of per-lock
//! guards: it works against the small [`Lockable`] capability, acquires in
//! `new`, and releases on drop exactly when the acquisition succeeded. The
//! crate ships two lockables: the infallible [`Mutex`], and the fallible
//! [`RawMutexHandle`] for native mutexes owned outside Rust.

use std::fmt;
use std::marker::PhantomData;

use crate::Mutex;

/// A lock a [`LockGuard`] can hold for a scope.
///
/// `acquire` reports whether a matching `release` is owed. Infallible locks
/// always answer `true`; fallible ones answer `false` when the acquisition
/// did not take, and the guard then leaves the lock untouched on drop.
pub trait Lockable {
    /// Acquires the lock, returning `true` when a release is owed.
    fn acquire(&self) -> bool;

    /// Releases the lock. Called at most once, and only after an `acquire`
    /// that returned `true`.
    fn release(&self);
}

impl Lockable for Mutex {
    fn acquire(&self) -> bool {
        self.lock();
        true
    }

    fn release(&self) {
        self.unlock();
    }
}

/// A native mutex owned elsewhere (typically by C code), lockable by handle.
///
/// Acquisition is fallible: the native return code decides whether the guard
/// owes an unlock, so a refused acquisition (an error-checking mutex denying
/// a re-lock, for instance) never produces a stray unlock at guard teardown.
/// The raw pointer field keeps the handle confined to the creating thread.
#[derive(Debug)]
pub struct RawMutexHandle {
    ptr: *mut libc::pthread_mutex_t,
}

impl RawMutexHandle {
    /// Wraps a foreign `pthread_mutex_t`.
    ///
    /// # Safety
    ///
    /// `ptr` must point to an initialized native mutex that remains valid for
    /// the life of the handle and of every guard created from it.
    #[must_use]
    pub unsafe fn from_raw(ptr: *mut libc::pthread_mutex_t) -> Self {
        Self { ptr }
    }
}

impl Lockable for RawMutexHandle {
    fn acquire(&self) -> bool {
        // SAFETY: from_raw's caller guaranteed ptr is valid and initialized.
        unsafe { libc::pthread_mutex_lock(self.ptr) == 0 }
    }

    fn release(&self) {
        // SAFETY: as in acquire; only called after a successful lock.
        unsafe { libc::pthread_mutex_unlock(self.ptr) };
    }
}

/// Holds a [`Lockable`] for the enclosing scope.
///
/// Acquires in [`new`](Self::new) and releases when dropped, on every exit
/// path including early returns and unwinds, but only if the acquisition
/// succeeded. [`acquired`](Self::acquired) exposes that outcome.
#[must_use = "a LockGuard releases its lock as soon as it is dropped"]
pub struct LockGuard<'a, M: Lockable> {
    lock: &'a M,
    owed: bool,
    // pthread requires unlock on the thread that locked; keep the guard off
    // other threads.
    _not_send: PhantomData<*const ()>,
}

impl<'a, M: Lockable> LockGuard<'a, M> {
    /// Acquires `lock`, holding it until the guard drops.
    pub fn new(lock: &'a M) -> Self {
        let owed = lock.acquire();
        Self {
            lock,
            owed,
            _not_send: PhantomData,
        }
    }

    /// Whether the acquisition succeeded and a release is owed on drop.
    #[must_use]
    pub fn acquired(&self) -> bool {
        self.owed
    }
}

impl<M: Lockable> Drop for LockGuard<'_, M> {
    fn drop(&mut self) {
        if self.owed {
            self.lock.release();
        }
    }
}

impl<M: Lockable> fmt::Debug for LockGuard<'_, M> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LockGuard")
            .field("acquired", &self.owed)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;
    use std::panic::{self, AssertUnwindSafe};

    /// Test lockable that counts calls and can refuse acquisition.
    struct CountingLock {
        grant: bool,
        acquires: Cell<u32>,
        releases: Cell<u32>,
    }

    impl CountingLock {
        fn new(grant: bool) -> Self {
            Self {
                grant,
                acquires: Cell::new(0),
                releases: Cell::new(0),
            }
        }
    }

    impl Lockable for CountingLock {
        fn acquire(&self) -> bool {
            self.acquires.set(self.acquires.get() + 1);
            self.grant
        }

        fn release(&self) {
            self.releases.set(self.releases.get() + 1);
        }
    }

    #[test]
    fn releases_exactly_once_on_normal_exit() {
        let lock = CountingLock::new(true);
        {
            let guard = LockGuard::new(&lock);
            assert!(guard.acquired());
            assert_eq!(lock.releases.get(), 0, "release must wait for drop");
        }
        assert_eq!(lock.acquires.get(), 1);
        assert_eq!(lock.releases.get(), 1);
    }

    #[test]
    fn releases_on_early_return() {
        fn briefly(lock: &CountingLock, bail: bool) -> u32 {
            let _guard = LockGuard::new(lock);
            if bail {
                return 1;
            }
            0
        }

        let lock = CountingLock::new(true);
        assert_eq!(briefly(&lock, true), 1);
        assert_eq!(briefly(&lock, false), 0);
        assert_eq!(lock.acquires.get(), 2);
        assert_eq!(lock.releases.get(), 2, "both exit paths must release");
    }

    #[test]
    fn releases_during_unwind() {
        let lock = CountingLock::new(true);
        let outcome = panic::catch_unwind(AssertUnwindSafe(|| {
            let _guard = LockGuard::new(&lock);
            panic!("deliberate");
        }));
        assert!(outcome.is_err());
        assert_eq!(lock.releases.get(), 1, "unwind must still release");
    }

    #[test]
    fn failed_acquisition_owes_no_release() {
        let lock = CountingLock::new(false);
        {
            let guard = LockGuard::new(&lock);
            assert!(!guard.acquired());
        }
        assert_eq!(lock.acquires.get(), 1);
        assert_eq!(
            lock.releases.get(),
            0,
            "failed acquisition must not release on drop"
        );
    }

    #[test]
    fn mutex_acquisition_is_infallible() {
        let m = Mutex::new();
        let guard = LockGuard::new(&m);
        assert!(guard.acquired(), "Mutex locking always owes a release");
        drop(guard);
        // Free again after the guard.
        m.lock();
        m.unlock();
    }

    #[test]
    fn guards_nest_across_distinct_locks() {
        let outer = CountingLock::new(true);
        let inner = CountingLock::new(true);
        {
            let _a = LockGuard::new(&outer);
            let _b = LockGuard::new(&inner);
        }
        assert_eq!(outer.releases.get(), 1);
        assert_eq!(inner.releases.get(), 1);
    }
}
