#![cfg(not(loom))]

//! Kept alone in its own binary: nothing else here touches the singleton, so
//! the five threads below always race on the very first access.

use solo::resource::{construction_count, publication_state};
use solo::{get_instance, PublicationState, SingletonResource};
use std::collections::HashSet;
use std::sync::Barrier;
use std::thread;

#[test]
fn test_five_threads_one_construction() {
    assert_eq!(construction_count(), 0);
    assert_eq!(publication_state(), PublicationState::Uninitialized);

    let barrier = Barrier::new(5);
    let barrier = &barrier;

    let results: Vec<(usize, String, usize)> = thread::scope(|s| {
        let handles: Vec<_> = (1..=5)
            .map(|i| {
                s.spawn(move || {
                    barrier.wait();
                    let singleton = get_instance();
                    (
                        singleton as *const SingletonResource as usize,
                        singleton.do_something(i),
                        singleton.serial(),
                    )
                })
            })
            .collect();
        handles.into_iter().map(|h| h.join().unwrap()).collect()
    });

    assert_eq!(construction_count(), 1);
    assert_eq!(publication_state(), PublicationState::Published);

    let addrs: HashSet<usize> = results.iter().map(|(addr, _, _)| *addr).collect();
    assert_eq!(addrs.len(), 1);
    assert!(results.iter().all(|(_, _, serial)| *serial == 1));

    let outputs: Vec<&str> = results.iter().map(|(_, out, _)| out.as_str()).collect();
    assert_eq!(outputs, ["Log 1", "Log 2", "Log 3", "Log 4", "Log 5"]);
}
