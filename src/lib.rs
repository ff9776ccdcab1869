//! # `solo` - Safe Lazy Publication of Shared Instances
//!
//! Process-wide values that are built once, on first use, by whichever thread
//! gets there first, and are then visible to every thread without locking.
//!
//! ## Guarantees
//!
//! - **Single construction**: for one cell, at most one constructor call ever
//!   completes successfully; its result is the only value the cell publishes.
//! - **Safe publication**: the value is written in full before its address is
//!   released to other threads (`Release` store / `Acquire` load), so no
//!   thread can observe a partially constructed instance.
//! - **Identity**: every caller receives a reference to the same object, not
//!   an equal copy.
//! - **Immutable handle**: there is no `set`, `take` or reset. Mutation of the
//!   value's own state is the value's business (use atomics or a lock inside
//!   it).
//! - **Retry on failure**: a constructor that returns `Err` or panics
//!   publishes nothing, and the next caller constructs again.
//!
//! ## Architecture
//!
//! 1. **`SharedInstance<T>`**: the publication cell. An atomic pointer (null
//!    while empty) and an [`InitLock`]. The warm path is one `Acquire` load.
//!    The cold path locks, re-checks, constructs and publishes.
//! 2. **`LazySharedInstance<T, F>`**: a cell plus its constructor, meant for
//!    `static` items. `TryLazySharedInstance` does the same for fallible
//!    constructors.
//! 3. **`InitLock`**: a three-state futex lock used only on the cold path.
//!
//! ## Example
//!
//! ```rust
//! use solo::LazySharedInstance;
//! use std::thread;
//!
//! static GREETING: LazySharedInstance<String> = LazySharedInstance::new(|| "hello".to_string());
//!
//! let handles: Vec<_> = (0..4)
//!     .map(|_| thread::spawn(|| GREETING.get_instance() as *const String as usize))
//!     .collect();
//!
//! let addrs: Vec<usize> = handles.into_iter().map(|h| h.join().unwrap()).collect();
//! assert!(addrs.windows(2).all(|w| w[0] == w[1]));
//! ```

#![warn(missing_docs, clippy::all, clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::must_use_candidate)]

pub mod instance;
#[cfg(not(loom))]
pub mod resource;
pub mod sync;
mod trace;

pub use instance::{LazySharedInstance, PublicationState, SharedInstance, TryLazySharedInstance};
#[cfg(not(loom))]
pub use resource::{get_instance, SingletonResource};
pub use sync::InitLock;

// Compile-time assertions for memory layout
#[cfg(not(loom))]
const _: () = {
    use core::mem;

    // The lock is a single word.
    assert!(mem::size_of::<InitLock>() == mem::size_of::<u32>());

    // A cell is a pointer plus the lock word (plus padding).
    assert!(mem::size_of::<SharedInstance<u64>>() <= mem::size_of::<usize>() * 2);

    // A lazy instance with a fn-pointer constructor adds exactly one pointer.
    assert!(
        mem::size_of::<LazySharedInstance<u64>>()
            == mem::size_of::<SharedInstance<u64>>() + mem::size_of::<fn() -> u64>()
    );
};
