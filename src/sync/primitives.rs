//! Atomic and scheduling primitives, swapped for `loom`'s under `--cfg loom`.

#[cfg(loom)]
pub(crate) use loom::sync::atomic::{AtomicPtr, AtomicU32};
#[cfg(loom)]
pub(crate) use loom::thread::yield_now;

#[cfg(not(loom))]
pub(crate) use core::sync::atomic::{AtomicPtr, AtomicU32};
#[cfg(all(not(loom), not(any(windows, target_os = "linux"))))]
pub(crate) use std::thread::yield_now;

pub(crate) use core::sync::atomic::Ordering;
