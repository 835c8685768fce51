//! Scope-bound native threads: spawned at construction, joined at drop.

use std::fmt;
use std::io;
use std::thread::{self, JoinHandle};

use thiserror::Error;

/// Native thread creation failed.
///
/// Wraps the platform error reported for `pthread_create`, surfaced through
/// [`std::io::Error`]; most commonly `EAGAIN` under resource exhaustion.
#[derive(Debug, Error)]
#[error("native thread creation failed: {0}")]
pub struct SpawnError(#[from] io::Error);

/// A native thread that cannot outlive the value owning it.
///
/// The routine starts running immediately on a new thread; dropping the
/// `ScopedThread` blocks until the routine finishes. The routine's outcome,
/// including any panic, is discarded at join, so the drop guarantees
/// completion and nothing more. Chiefly a testing convenience for code that
/// needs real concurrency with a hard completion point.
///
/// The `'static` bound on the routine is what makes join-on-drop sound: an
/// owner can be leaked without its destructor ever running, so the routine
/// must not borrow the spawning stack. Workloads that need to borrow belong
/// in [`std::thread::scope`].
#[must_use = "dropping a ScopedThread immediately blocks until its routine finishes"]
pub struct ScopedThread {
    handle: Option<JoinHandle<()>>,
}

impl ScopedThread {
    /// Starts `routine` on a new native thread; the returned owner joins it
    /// when dropped.
    ///
    /// Creation is the one operation in this crate whose failure is surfaced
    /// rather than ignored.
    pub fn spawn<F>(routine: F) -> Result<Self, SpawnError>
    where
        F: FnOnce() + Send + 'static,
    {
        let handle = thread::Builder::new().spawn(routine)?;
        Ok(Self {
            handle: Some(handle),
        })
    }
}

impl Drop for ScopedThread {
    fn drop(&mut self) {
        if let Some(handle) = self.handle.take() {
            // The routine's outcome, panic payload included, is discarded;
            // drop only guarantees the thread has finished.
            let _ = handle.join();
        }
    }
}

impl fmt::Debug for ScopedThread {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ScopedThread").finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicBool, Ordering};
    use std::time::Duration;

    #[test]
    fn drop_joins_before_returning() {
        let finished = Arc::new(AtomicBool::new(false));
        let seen = Arc::clone(&finished);
        let t = ScopedThread::spawn(move || {
            thread::sleep(Duration::from_millis(50));
            seen.store(true, Ordering::Release);
        })
        .expect("spawn failed");

        drop(t);
        assert!(
            finished.load(Ordering::Acquire),
            "drop must not return before the routine finishes"
        );
    }

    #[test]
    fn panicking_routine_does_not_propagate_from_drop() {
        let t = ScopedThread::spawn(|| panic!("deliberate")).expect("spawn failed");
        // Must join and swallow the payload, not re-panic.
        drop(t);
    }

    #[test]
    fn spawn_error_reports_the_platform_error() {
        let err = SpawnError::from(io::Error::from_raw_os_error(libc::EAGAIN));
        let msg = err.to_string();
        assert!(
            msg.contains("native thread creation failed"),
            "unexpected message: {msg}"
        );
    }
}
