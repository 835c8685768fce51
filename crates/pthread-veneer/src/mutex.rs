//! Mutual exclusion delegating to the native `pthread_mutex_t`.

use std::cell::UnsafeCell;
use std::fmt;

/// A mutex backed directly by one native `pthread_mutex_t`.
///
/// Construction initializes the native mutex with default attributes, and
/// [`lock`](Self::lock) / [`unlock`](Self::unlock) are straight call-throughs
/// whose return codes are ignored. Misuse therefore behaves exactly as the
/// underlying implementation behaves: re-locking from the holding thread or
/// unlocking from a non-holder is whatever the default mutex kind does, not
/// a Rust-level error. `unlock` must only be called by the thread currently
/// holding the lock.
///
/// The native object lives on the heap. POSIX requires a mutex to keep one
/// address once threads use it, and Rust values move, so the wrapper pins the
/// primitive behind a `Box` and stays freely movable itself.
///
/// For scope-bound locking, wrap a borrow in [`LockGuard`](crate::LockGuard)
/// rather than pairing the calls by hand.
pub struct Mutex {
    raw: Box<UnsafeCell<libc::pthread_mutex_t>>,
}

// SAFETY: the native mutex is itself the synchronization primitive; every
// access to the inner cell goes through pthread calls built for cross-thread
// use.
unsafe impl Send for Mutex {}
// SAFETY: as above.
unsafe impl Sync for Mutex {}

impl Mutex {
    /// Creates a mutex with default (non-recursive) attributes.
    #[must_use]
    pub fn new() -> Self {
        // SAFETY: all-zero bytes is an acceptable pre-init image;
        // pthread_mutex_init overwrites it before first use.
        let raw = Box::new(UnsafeCell::new(unsafe { std::mem::zeroed() }));
        // SAFETY: raw is heap-pinned writable storage; a null attribute
        // pointer selects the default mutex kind.
        unsafe { libc::pthread_mutex_init(raw.get(), std::ptr::null()) };
        Self { raw }
    }

    /// Blocks until the calling thread owns the mutex.
    pub fn lock(&self) {
        // SAFETY: self.raw was initialized in new() and stays valid and
        // pinned for the life of self.
        unsafe { libc::pthread_mutex_lock(self.raw.get()) };
    }

    /// Releases the mutex. Must be called by the thread that holds it.
    pub fn unlock(&self) {
        // SAFETY: as in lock().
        unsafe { libc::pthread_mutex_unlock(self.raw.get()) };
    }

    // TODO: add try_lock over pthread_mutex_trylock once a caller needs it.

    /// Raw handle for native calls that take the mutex directly.
    pub(crate) fn raw(&self) -> *mut libc::pthread_mutex_t {
        self.raw.get()
    }
}

impl Default for Mutex {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for Mutex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Mutex").finish_non_exhaustive()
    }
}

impl Drop for Mutex {
    fn drop(&mut self) {
        // SAFETY: drop has exclusive access and the storage was initialized
        // in new(). Destroying a mutex another thread still holds is
        // undefined, the same contract as the native API.
        unsafe { libc::pthread_mutex_destroy(self.raw.get()) };
    }
}
