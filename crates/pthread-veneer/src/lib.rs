//! # pthread-veneer
//!
//! A thin RAII veneer over native pthread primitives: a [`Mutex`] and a
//! [`ConditionVariable`] that delegate straight to `pthread_mutex_*` and
//! `pthread_cond_*`, a generic [`LockGuard`] for scope-bound lock ownership,
//! and a [`ScopedThread`] joined at drop.
//!
//! The crate adds no scheduling, pooling, retries, or recovery on top of the
//! native calls. Condition-variable deadlines are measured against
//! `CLOCK_MONOTONIC` via [`MonotonicTimePoint`]; how that clock is selected
//! is the single piece of platform awareness (pre-L bionic lacks condattr
//! clock selection and uses a dedicated timed-wait entry point, everything
//! else configures the clock at init).
//!
//! Error posture: the notify/wait family hands back the native return code
//! uninterpreted, [`ScopedThread::spawn`] surfaces creation failure, and
//! every other native return code is ignored.

mod platform;

pub mod condvar;
pub mod guard;
pub mod mutex;
pub mod thread;
pub mod time;

pub use condvar::ConditionVariable;
pub use guard::{LockGuard, Lockable, RawMutexHandle};
pub use mutex::Mutex;
pub use thread::{ScopedThread, SpawnError};
pub use time::MonotonicTimePoint;
