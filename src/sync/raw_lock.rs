//! `InitLock`: a small blocking lock for one-time initialization.

use core::fmt;

#[cfg(not(loom))]
use crossbeam_utils::Backoff;

use super::primitives::{AtomicU32, Ordering};
use super::{wait_on_u32, wake_one_u32};

/// A blocking lock over a single 32-bit word.
///
/// Only the cold path of a lazy cell ever takes it, so it is tuned for the
/// case where the holder finishes quickly: waiters spin with backoff first and
/// only then park on the word.
///
/// # States
/// - 0: Unlocked
/// - 1: Locked, no waiters (likely)
/// - 2: Locked, waiters may be parked
pub struct InitLock {
    state: AtomicU32,
}

impl InitLock {
    const UNLOCKED: u32 = 0;
    const LOCKED: u32 = 1;
    const CONTENDED: u32 = 2;

    /// Creates a new unlocked lock.
    #[cfg(not(loom))]
    pub const fn new() -> Self {
        Self {
            state: AtomicU32::new(Self::UNLOCKED),
        }
    }

    /// Creates a new unlocked lock.
    #[cfg(loom)]
    pub fn new() -> Self {
        Self {
            state: AtomicU32::new(Self::UNLOCKED),
        }
    }

    /// Acquires the lock, blocking the current thread until it is available.
    #[inline]
    pub fn lock(&self) -> InitLockGuard<'_> {
        if self
            .state
            .compare_exchange(Self::UNLOCKED, Self::LOCKED, Ordering::Acquire, Ordering::Relaxed)
            .is_ok()
        {
            return InitLockGuard { lock: self };
        }
        self.lock_slow()
    }

    /// Attempts to acquire the lock without blocking.
    #[inline]
    pub fn try_lock(&self) -> Option<InitLockGuard<'_>> {
        self.state
            .compare_exchange(Self::UNLOCKED, Self::LOCKED, Ordering::Acquire, Ordering::Relaxed)
            .ok()
            .map(|_| InitLockGuard { lock: self })
    }

    /// Returns `true` if some thread currently holds the lock.
    ///
    /// The answer may be stale by the time the caller looks at it.
    #[inline]
    pub fn is_locked(&self) -> bool {
        self.state.load(Ordering::Relaxed) != Self::UNLOCKED
    }

    #[cold]
    fn lock_slow(&self) -> InitLockGuard<'_> {
        #[cfg(not(loom))]
        {
            let backoff = Backoff::new();
            while !backoff.is_completed() {
                if self.state.load(Ordering::Relaxed) == Self::UNLOCKED
                    && self
                        .state
                        .compare_exchange_weak(
                            Self::UNLOCKED,
                            Self::LOCKED,
                            Ordering::Acquire,
                            Ordering::Relaxed,
                        )
                        .is_ok()
                {
                    return InitLockGuard { lock: self };
                }
                backoff.snooze();
            }
        }

        // Acquiring as CONTENDED (not LOCKED) means our unlock will wake the
        // next parked thread, if any.
        while self.state.swap(Self::CONTENDED, Ordering::Acquire) != Self::UNLOCKED {
            wait_on_u32(&self.state, Self::CONTENDED);
        }
        InitLockGuard { lock: self }
    }

    #[inline]
    fn unlock(&self) {
        if self.state.swap(Self::UNLOCKED, Ordering::Release) == Self::CONTENDED {
            wake_one_u32(&self.state);
        }
    }
}

impl Default for InitLock {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for InitLock {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("InitLock")
            .field("locked", &self.is_locked())
            .finish()
    }
}

/// Releases the [`InitLock`] when dropped, including during unwinding.
#[must_use = "the lock is released as soon as the guard is dropped"]
pub struct InitLockGuard<'a> {
    lock: &'a InitLock,
}

impl Drop for InitLockGuard<'_> {
    fn drop(&mut self) {
        self.lock.unlock();
    }
}

impl fmt::Debug for InitLockGuard<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("InitLockGuard").finish_non_exhaustive()
    }
}
