//! `SharedInstance`: publishes exactly one value to every thread.
//!
//! The cell is an atomic pointer plus an [`InitLock`]. A null pointer means
//! nothing has been published yet.
//!
//! Reads take the fast path: one `Acquire` load and no lock. The first caller
//! to find the pointer null takes the lock, checks the pointer again (another
//! thread may have finished while it waited), runs the constructor, and
//! publishes the boxed value with a `Release` store. Any thread whose
//! `Acquire` load sees that pointer also sees every write the constructor made,
//! so a half-built value is never observable.
//!
//! A constructor that fails (returns `Err` or panics) publishes nothing. The
//! lock is released on the way out and the next caller runs its own
//! constructor.
//!
//! ```
//! use solo::SharedInstance;
//!
//! static NAMES: SharedInstance<Vec<&'static str>> = SharedInstance::new();
//!
//! let first = NAMES.get_or_init(|| vec!["a", "b"]);
//! let second = NAMES.get_or_init(|| unreachable!());
//! assert!(std::ptr::eq(first, second));
//! ```

mod lazy;

pub use lazy::{LazySharedInstance, TryLazySharedInstance};

use core::convert::Infallible;
use core::fmt;
use core::marker::PhantomData;
use core::ptr;

use crate::sync::primitives::{AtomicPtr, Ordering};
use crate::sync::InitLock;
use crate::trace::debug_event;

/// Snapshot of a cell's publication progress.
///
/// `Initializing` is only ever a momentary observation. The stable answers
/// are "published" and "not published".
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PublicationState {
    /// No value, and no constructor is running.
    Uninitialized,
    /// A constructor is running on some thread.
    Initializing,
    /// The value is published and will never change.
    Published,
}

/// A thread-safe cell holding at most one value for its whole life.
///
/// Unlike `std::sync::OnceLock`, there is no `take` or `set`. Once a value is
/// published the reference handed out stays valid and unchanged until the
/// cell is dropped, and a `static` cell is never dropped.
///
/// Calling `get_or_init` on the same cell from inside its own constructor
/// deadlocks.
pub struct SharedInstance<T> {
    ptr: AtomicPtr<T>,
    lock: InitLock,
    _marker: PhantomData<*const T>,
}

impl<T> SharedInstance<T> {
    /// Creates an empty cell.
    #[cfg(not(loom))]
    #[inline]
    pub const fn new() -> Self {
        Self {
            ptr: AtomicPtr::new(ptr::null_mut()),
            lock: InitLock::new(),
            _marker: PhantomData,
        }
    }

    /// Creates an empty cell.
    #[cfg(loom)]
    pub fn new() -> Self {
        Self {
            ptr: AtomicPtr::new(ptr::null_mut()),
            lock: InitLock::new(),
            _marker: PhantomData,
        }
    }

    /// Returns the published value, or `None` if nothing is published yet.
    ///
    /// Never blocks.
    #[inline]
    pub fn get(&self) -> Option<&T> {
        let ptr = self.ptr.load(Ordering::Acquire);
        // SAFETY: a non-null pointer was stored with `Release` after the value
        // was fully written, and our `Acquire` load synchronizes with that
        // store. The box is only freed in `Drop`, which needs `&mut self`.
        unsafe { ptr.as_ref() }
    }

    /// Returns `true` once a value has been published.
    #[inline]
    pub fn is_published(&self) -> bool {
        self.get().is_some()
    }

    /// Returns a snapshot of where the cell is in its lifecycle.
    pub fn state(&self) -> PublicationState {
        if self.is_published() {
            PublicationState::Published
        } else if self.lock.is_locked() {
            PublicationState::Initializing
        } else if self.is_published() {
            // Finished between the two loads above.
            PublicationState::Published
        } else {
            PublicationState::Uninitialized
        }
    }

    /// Returns the value, running `f` to create it if nothing is published.
    ///
    /// Across all threads, `f` of at most one successful caller ever runs to
    /// completion. Concurrent callers block until that value is published.
    ///
    /// # Panics
    ///
    /// If `f` panics, the panic propagates to this caller and the cell stays
    /// empty; a later call will try again.
    #[inline]
    pub fn get_or_init<F>(&self, f: F) -> &T
    where
        F: FnOnce() -> T,
    {
        match self.get_or_try_init(|| Ok::<T, Infallible>(f())) {
            Ok(value) => value,
            Err(never) => match never {},
        }
    }

    /// Returns the value, running the fallible `f` to create it if nothing is
    /// published.
    ///
    /// # Errors
    ///
    /// Returns the error from `f` unchanged. Nothing is published in that
    /// case, so the next caller runs its own constructor.
    #[inline]
    pub fn get_or_try_init<F, E>(&self, f: F) -> Result<&T, E>
    where
        F: FnOnce() -> Result<T, E>,
    {
        if let Some(value) = self.get() {
            return Ok(value);
        }
        self.initialize(f)
    }

    #[cold]
    fn initialize<F, E>(&self, f: F) -> Result<&T, E>
    where
        F: FnOnce() -> Result<T, E>,
    {
        let _guard = self.lock.lock();

        if let Some(value) = self.get() {
            return Ok(value);
        }

        let value = match f() {
            Ok(value) => value,
            Err(err) => {
                debug_event!(ty = core::any::type_name::<T>(), "shared instance constructor failed");
                return Err(err);
            }
        };

        let raw = Box::into_raw(Box::new(value));
        self.ptr.store(raw, Ordering::Release);
        debug_event!(ty = core::any::type_name::<T>(), "published shared instance");

        // SAFETY: `raw` came from `Box::into_raw` above and is now owned by
        // the cell, which outlives the returned borrow.
        Ok(unsafe { &*raw })
    }
}

impl<T> Default for SharedInstance<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: fmt::Debug> fmt::Debug for SharedInstance<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SharedInstance")
            .field("value", &self.get())
            .field("state", &self.state())
            .finish()
    }
}

impl<T> Drop for SharedInstance<T> {
    fn drop(&mut self) {
        let ptr = self.ptr.load(Ordering::Acquire);
        if !ptr.is_null() {
            // SAFETY: the pointer came from `Box::into_raw` in `initialize`, was
            // published once, and `&mut self` rules out outstanding borrows.
            drop(unsafe { Box::from_raw(ptr) });
        }
    }
}

// SAFETY: the cell owns its `T`, so moving the cell moves the `T`.
unsafe impl<T: Send> Send for SharedInstance<T> {}

// SAFETY: shared access hands out `&T` to many threads (needs `T: Sync`), and
// the value may be constructed on one thread and dropped on another (needs
// `T: Send`). All state transitions go through atomics and the lock.
unsafe impl<T: Send + Sync> Sync for SharedInstance<T> {}
