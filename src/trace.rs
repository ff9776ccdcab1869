//! Internal logging hooks.
//!
//! Forward to `tracing` when the `tracing` feature is enabled and expand to
//! nothing otherwise, so the hot path never pays for disabled logging.

#[cfg(feature = "tracing")]
macro_rules! debug_event {
    ($($arg:tt)*) => {
        ::tracing::debug!(target: "solo", $($arg)*)
    };
}

#[cfg(not(feature = "tracing"))]
macro_rules! debug_event {
    ($($arg:tt)*) => {};
}

#[cfg(feature = "tracing")]
macro_rules! info_event {
    ($($arg:tt)*) => {
        ::tracing::info!(target: "solo", $($arg)*)
    };
}

#[cfg(not(feature = "tracing"))]
macro_rules! info_event {
    ($($arg:tt)*) => {};
}

#[allow(unused_imports)]
pub(crate) use {debug_event, info_event};
