//! Exhaustive interleaving checks of the publication protocol.
//!
//! Run with `cargo run -p xtask -- loom`.

#![cfg(loom)]

use loom::sync::atomic::{AtomicUsize, Ordering};
use loom::sync::Arc;
use loom::thread;
use solo::{PublicationState, SharedInstance};

#[test]
fn loom_two_racers_publish_once() {
    loom::model(|| {
        let cell = Arc::new(SharedInstance::new());
        let constructions = Arc::new(AtomicUsize::new(0));

        let handles: Vec<_> = (0..2_usize)
            .map(|i| {
                let cell = cell.clone();
                let constructions = constructions.clone();
                thread::spawn(move || {
                    let value = cell.get_or_init(|| {
                        constructions.fetch_add(1, Ordering::Relaxed);
                        vec![i; 4]
                    });
                    value as *const Vec<usize> as usize
                })
            })
            .collect();

        let addrs: Vec<usize> = handles.into_iter().map(|h| h.join().unwrap()).collect();

        assert_eq!(constructions.load(Ordering::Relaxed), 1);
        assert_eq!(addrs[0], addrs[1]);
        assert_eq!(cell.state(), PublicationState::Published);
    });
}

#[test]
fn loom_reader_sees_whole_value_or_nothing() {
    loom::model(|| {
        let cell: Arc<SharedInstance<(usize, usize)>> = Arc::new(SharedInstance::new());

        let writer = {
            let cell = cell.clone();
            thread::spawn(move || {
                cell.get_or_init(|| (7, 7));
            })
        };

        if let Some(&(a, b)) = cell.get() {
            assert_eq!((a, b), (7, 7));
        }

        writer.join().unwrap();
        assert_eq!(cell.get(), Some(&(7, 7)));
    });
}

#[test]
fn loom_failure_lets_the_other_thread_construct() {
    loom::model(|| {
        let cell: Arc<SharedInstance<u32>> = Arc::new(SharedInstance::new());

        let failing = {
            let cell = cell.clone();
            thread::spawn(move || {
                let _ = cell.get_or_try_init(|| Err::<u32, ()>(()));
            })
        };

        let value = cell.get_or_try_init(|| Ok::<u32, ()>(3)).copied();
        // Whether the other thread failed or found our value, ours stands.
        failing.join().unwrap();

        assert_eq!(value, Ok(3));
        assert_eq!(cell.get(), Some(&3));
    });
}
