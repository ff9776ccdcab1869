use super::*;
use std::sync::atomic::AtomicUsize;
use std::sync::{Arc, Barrier};
use std::thread;
use std::time::Duration;

#[test]
fn test_init_lock_basic() {
    let lock = InitLock::new();
    assert!(!lock.is_locked());

    {
        let _guard = lock.lock();
        assert!(lock.is_locked());
        assert!(lock.try_lock().is_none());
    } // guard dropped, unlocked

    assert!(!lock.is_locked());
    assert!(lock.try_lock().is_some());
}

#[test]
fn test_init_lock_contention() {
    let lock = InitLock::new();
    let lock = &lock;

    thread::scope(|s| {
        s.spawn(move || {
            let guard = lock.lock();
            thread::sleep(Duration::from_millis(50));
            drop(guard);
        });

        s.spawn(move || {
            thread::sleep(Duration::from_millis(10));
            // Should block until first thread releases
            let guard = lock.lock();
            drop(guard);
        });
    });

    assert!(!lock.is_locked());
}

#[test]
fn test_init_lock_mutual_exclusion() {
    const THREADS: usize = 8;
    const ROUNDS: usize = 500;

    let lock = InitLock::new();
    let inside = AtomicUsize::new(0);
    let total = AtomicUsize::new(0);

    thread::scope(|s| {
        for _ in 0..THREADS {
            s.spawn(|| {
                for _ in 0..ROUNDS {
                    let _guard = lock.lock();
                    assert_eq!(inside.fetch_add(1, Ordering::SeqCst), 0);
                    total.fetch_add(1, Ordering::Relaxed);
                    thread::yield_now();
                    inside.fetch_sub(1, Ordering::SeqCst);
                }
            });
        }
    });

    assert_eq!(total.load(Ordering::Relaxed), THREADS * ROUNDS);
    assert!(!lock.is_locked());
}

#[test]
fn test_init_lock_released_on_panic() {
    let lock = InitLock::new();

    let result = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
        let _guard = lock.lock();
        panic!("holder panicked");
    }));

    assert!(result.is_err());
    assert!(!lock.is_locked());
    assert!(lock.try_lock().is_some());
}

#[test]
fn test_wait_on_u32_wake() {
    let flag = Arc::new(AtomicU32::new(0));
    let barrier = Arc::new(Barrier::new(2));
    let flag_thread = flag.clone();
    let barrier_thread = barrier.clone();

    let handle = thread::spawn(move || {
        barrier_thread.wait();
        while flag_thread.load(Ordering::SeqCst) == 0 {
            wait_on_u32(&flag_thread, 0);
        }
        flag_thread.load(Ordering::SeqCst)
    });

    barrier.wait();
    flag.store(1, Ordering::SeqCst);
    wake_one_u32(&flag);

    let value = handle.join().unwrap();
    assert_eq!(value, 1);
}
