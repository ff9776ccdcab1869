//! Lazily constructed shared instances with a stored constructor.

use core::fmt;
use core::marker::PhantomData;
use core::ops::Deref;

use super::{PublicationState, SharedInstance};

/// A process-wide instance built by its stored constructor on first access.
///
/// This is the usual way to declare a singleton:
///
/// ```
/// use solo::LazySharedInstance;
///
/// struct Config {
///     retries: u32,
/// }
///
/// static CONFIG: LazySharedInstance<Config> = LazySharedInstance::new(|| Config { retries: 3 });
///
/// assert_eq!(CONFIG.get_instance().retries, 3);
/// assert!(std::ptr::eq(CONFIG.get_instance(), &*CONFIG));
/// ```
///
/// The constructor is `Fn` rather than `FnOnce` so that a panicking first
/// attempt can be retried by a later caller.
pub struct LazySharedInstance<T, F = fn() -> T> {
    cell: SharedInstance<T>,
    init: F,
}

impl<T, F> LazySharedInstance<T, F>
where
    F: Fn() -> T,
{
    /// Creates an unpublished instance that will be built by `init`.
    #[cfg(not(loom))]
    pub const fn new(init: F) -> Self {
        Self {
            cell: SharedInstance::new(),
            init,
        }
    }

    /// Creates an unpublished instance that will be built by `init`.
    #[cfg(loom)]
    pub fn new(init: F) -> Self {
        Self {
            cell: SharedInstance::new(),
            init,
        }
    }

    /// Returns the shared instance, constructing it on the first call.
    ///
    /// # Panics
    ///
    /// Propagates a panic from the constructor; the instance stays
    /// unpublished and the next call constructs again.
    #[inline]
    pub fn get_instance(&self) -> &T {
        self.cell.get_or_init(&self.init)
    }
}

impl<T, F> LazySharedInstance<T, F> {
    /// Returns the instance if it has already been published.
    #[inline]
    pub fn get(&self) -> Option<&T> {
        self.cell.get()
    }

    /// Returns `true` once the instance has been published.
    #[inline]
    pub fn is_published(&self) -> bool {
        self.cell.is_published()
    }

    /// Returns a snapshot of the publication state.
    pub fn state(&self) -> PublicationState {
        self.cell.state()
    }
}

impl<T, F> Deref for LazySharedInstance<T, F>
where
    F: Fn() -> T,
{
    type Target = T;

    #[inline]
    fn deref(&self) -> &T {
        self.get_instance()
    }
}

impl<T: Default> Default for LazySharedInstance<T> {
    fn default() -> Self {
        Self::new(T::default)
    }
}

impl<T: fmt::Debug, F> fmt::Debug for LazySharedInstance<T, F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LazySharedInstance")
            .field("cell", &self.cell)
            .finish_non_exhaustive()
    }
}

/// A process-wide instance whose stored constructor may fail.
///
/// A failed construction is reported to the caller that triggered it and
/// leaves the instance unpublished, so a later call tries again.
///
/// ```
/// use solo::TryLazySharedInstance;
///
/// fn load() -> Result<u16, std::num::ParseIntError> {
///     "8080".parse()
/// }
///
/// static PORT: TryLazySharedInstance<u16, std::num::ParseIntError> = TryLazySharedInstance::new(load);
///
/// assert_eq!(PORT.get_instance(), Ok(&8080));
/// ```
pub struct TryLazySharedInstance<T, E, F = fn() -> Result<T, E>> {
    cell: SharedInstance<T>,
    init: F,
    _error: PhantomData<fn() -> E>,
}

impl<T, E, F> TryLazySharedInstance<T, E, F>
where
    F: Fn() -> Result<T, E>,
{
    /// Creates an unpublished instance that will be built by `init`.
    #[cfg(not(loom))]
    pub const fn new(init: F) -> Self {
        Self {
            cell: SharedInstance::new(),
            init,
            _error: PhantomData,
        }
    }

    /// Creates an unpublished instance that will be built by `init`.
    #[cfg(loom)]
    pub fn new(init: F) -> Self {
        Self {
            cell: SharedInstance::new(),
            init,
            _error: PhantomData,
        }
    }

    /// Returns the shared instance, constructing it if it is not published.
    ///
    /// # Errors
    ///
    /// Returns the constructor's error to the caller that ran it. Nothing is
    /// cached, so the next call runs the constructor again.
    #[inline]
    pub fn get_instance(&self) -> Result<&T, E> {
        self.cell.get_or_try_init(&self.init)
    }
}

impl<T, E, F> TryLazySharedInstance<T, E, F> {
    /// Returns the instance if it has already been published.
    #[inline]
    pub fn get(&self) -> Option<&T> {
        self.cell.get()
    }

    /// Returns `true` once the instance has been published.
    #[inline]
    pub fn is_published(&self) -> bool {
        self.cell.is_published()
    }

    /// Returns a snapshot of the publication state.
    pub fn state(&self) -> PublicationState {
        self.cell.state()
    }
}

impl<T: fmt::Debug, E, F> fmt::Debug for TryLazySharedInstance<T, E, F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TryLazySharedInstance")
            .field("cell", &self.cell)
            .finish_non_exhaustive()
    }
}
