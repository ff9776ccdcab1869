//! The demonstration singleton.
//!
//! `SingletonResource` can only be obtained through [`get_instance`]. Its
//! constructor has observable side effects (a process-wide construction
//! counter and an `info` log event) so callers can check that it ran once.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Instant;

use crate::instance::{LazySharedInstance, PublicationState};
use crate::trace::info_event;

/// Number of words in the payload built by the constructor.
pub const PAYLOAD_LEN: usize = 256;

static CONSTRUCTIONS: AtomicUsize = AtomicUsize::new(0);

static INSTANCE: LazySharedInstance<SingletonResource> =
    LazySharedInstance::new(SingletonResource::new);

/// A resource that is expensive enough to share and must exist only once.
#[derive(Debug)]
pub struct SingletonResource {
    serial: usize,
    created_at: Instant,
    payload: Box<[u64]>,
    checksum: u64,
}

impl SingletonResource {
    fn new() -> Self {
        let serial = CONSTRUCTIONS.fetch_add(1, Ordering::AcqRel) + 1;
        let payload: Box<[u64]> = (0..PAYLOAD_LEN as u64)
            .map(|i| i.wrapping_mul(0x9E37_79B9_7F4A_7C15) ^ serial as u64)
            .collect();
        let checksum = checksum(&payload);

        info_event!(serial, "singleton instance created");

        Self {
            serial,
            created_at: Instant::now(),
            payload,
            checksum,
        }
    }

    /// Formats a log line for the caller's request number.
    pub fn do_something(&self, i: i32) -> String {
        format!("Log {i}")
    }

    /// Which construction produced this instance. Always 1 for the published one.
    pub fn serial(&self) -> usize {
        self.serial
    }

    /// When the constructor finished building the payload.
    pub fn created_at(&self) -> Instant {
        self.created_at
    }

    /// Returns `true` if every field written by the constructor is visible and
    /// agrees with the others.
    pub fn is_consistent(&self) -> bool {
        self.serial > 0 && self.payload.len() == PAYLOAD_LEN && checksum(&self.payload) == self.checksum
    }
}

fn checksum(payload: &[u64]) -> u64 {
    payload
        .iter()
        .fold(0_u64, |acc, word| acc.rotate_left(5) ^ word)
}

/// Returns the process-wide [`SingletonResource`], constructing it on first use.
///
/// Safe to call from any thread, any number of times.
pub fn get_instance() -> &'static SingletonResource {
    INSTANCE.get_instance()
}

/// How many times the resource constructor has run in this process.
pub fn construction_count() -> usize {
    CONSTRUCTIONS.load(Ordering::Acquire)
}

/// Returns the publication state of the process-wide resource.
pub fn publication_state() -> PublicationState {
    INSTANCE.state()
}
