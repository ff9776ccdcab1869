//! Low-level blocking support for the publication slow path.
//!
//! Waiting is done on a 32-bit word: futex on Linux, `WaitOnAddress` on
//! Windows, and a yield loop everywhere else (and always under `loom`).

pub(crate) mod primitives;
pub mod raw_lock;

pub use raw_lock::{InitLock, InitLockGuard};

#[cfg_attr(all(windows, not(loom)), allow(unused_imports))]
use primitives::{AtomicU32, Ordering};

#[cfg(all(windows, not(loom)))]
use windows_sys::Win32::System::Threading::{WaitOnAddress, WakeByAddressSingle};

#[cfg(all(target_os = "linux", not(loom)))]
use libc::{SYS_futex, FUTEX_PRIVATE_FLAG, FUTEX_WAIT, FUTEX_WAKE};

#[cfg(all(target_os = "linux", not(loom)))]
#[inline]
fn futex_wait(addr: *const u32, expected: u32) {
    // SAFETY: `addr` points at a live `AtomicU32`; a spurious or interrupted
    // wait returns early and callers re-check the word.
    unsafe {
        libc::syscall(
            SYS_futex,
            addr,
            FUTEX_WAIT | FUTEX_PRIVATE_FLAG,
            expected,
            core::ptr::null::<libc::timespec>(),
        );
    }
}

#[cfg(all(target_os = "linux", not(loom)))]
#[inline]
fn futex_wake(addr: *const u32, count: i32) {
    // SAFETY: `addr` points at a live `AtomicU32`.
    unsafe {
        libc::syscall(SYS_futex, addr, FUTEX_WAKE | FUTEX_PRIVATE_FLAG, count);
    }
}

/// Wakes one thread waiting on the given address.
#[inline]
pub fn wake_one_u32(addr: &AtomicU32) {
    #[cfg(all(windows, not(loom)))]
    // SAFETY: `addr` is a valid, live address for the duration of the call.
    unsafe {
        WakeByAddressSingle(addr.as_ptr().cast());
    }
    #[cfg(all(target_os = "linux", not(loom)))]
    {
        futex_wake(addr.as_ptr(), 1);
    }
    #[cfg(any(loom, not(any(windows, target_os = "linux"))))]
    {
        let _ = addr;
    }
}

/// Blocks while the value at `addr` equals `expected`.
///
/// May return spuriously; callers must re-check the word in a loop.
#[inline]
pub fn wait_on_u32(addr: &AtomicU32, expected: u32) {
    #[cfg(all(windows, not(loom)))]
    // SAFETY: both pointers are valid for `size_of::<u32>()` bytes.
    unsafe {
        let expected_ptr = core::ptr::from_ref(&expected).cast();
        WaitOnAddress(addr.as_ptr().cast(), expected_ptr, core::mem::size_of::<u32>(), u32::MAX);
    }
    #[cfg(all(target_os = "linux", not(loom)))]
    {
        if addr.load(Ordering::Acquire) == expected {
            futex_wait(addr.as_ptr(), expected);
        }
    }
    #[cfg(any(loom, not(any(windows, target_os = "linux"))))]
    {
        if addr.load(Ordering::Acquire) == expected {
            primitives::yield_now();
        }
    }
}

#[cfg(all(test, not(loom)))]
mod tests;
