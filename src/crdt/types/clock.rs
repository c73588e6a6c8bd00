//! Thread-safe Lamport clock implementation for minting tokens.
//!
//! This module contains the LamportClock struct which hands out replica-scoped Lamport
//! timestamps. It is one of the token generators a `ReplicatedSet` can be built with.

use std::sync::atomic::{AtomicU64, Ordering as AtomicOrdering};

use crate::crdt::types::generator::TokenGenerator;
use crate::crdt::types::replica::ReplicaId;
use crate::crdt::types::timestamp::LamportTimestamp;

/// Highest counter a witnessed timestamp can move the clock to.
///
/// Remote counters above this are clamped, which leaves 2^63 local ticks of headroom no
/// matter what arrives through a merge.
pub const MAX_WITNESSED_COUNTER: u64 = u64::MAX >> 1;

/// A thread-safe clock for generating Lamport timestamps
#[derive(Debug)]
pub struct LamportClock {
    counter: AtomicU64,
    replica_id: ReplicaId,
}

impl LamportClock {
    /// Creates a new Lamport clock
    pub fn new(replica_id: ReplicaId) -> Self {
        LamportClock {
            counter: AtomicU64::new(0),
            replica_id,
        }
    }

    /// Generates the next timestamp for this replica, or `None` once the counter has
    /// reached `u64::MAX`.
    ///
    /// An exhausted clock stays exhausted: it never wraps around and re-mints a timestamp
    /// it has already handed out.
    pub fn try_tick(&self) -> Option<LamportTimestamp> {
        let previous = self
            .counter
            .fetch_update(AtomicOrdering::SeqCst, AtomicOrdering::SeqCst, |c| {
                c.checked_add(1)
            })
            .ok()?;

        Some(LamportTimestamp {
            counter: previous + 1,
            replica_id: self.replica_id,
        })
    }

    /// Generates the next timestamp for this replica
    ///
    /// # Panics
    ///
    /// When the counter is exhausted (see `try_tick`). Witnessed timestamps are clamped to
    /// `MAX_WITNESSED_COUNTER`, so this takes 2^63 local ticks.
    pub fn tick(&self) -> LamportTimestamp {
        self.try_tick()
            .unwrap_or_else(|| panic!("Lamport clock of replica {} exhausted", self.replica_id))
    }

    /// Updates the clock based on a received timestamp.
    ///
    /// Counters above `MAX_WITNESSED_COUNTER` advance the clock only to that bound.
    pub fn update(&self, received_timestamp: LamportTimestamp) {
        let witnessed = received_timestamp.counter.min(MAX_WITNESSED_COUNTER);
        // fetch_max never moves the counter backwards
        self.counter.fetch_max(witnessed, AtomicOrdering::SeqCst);
    }

    /// Gets the current counter value (for debugging)
    pub fn current_counter(&self) -> u64 {
        self.counter.load(AtomicOrdering::SeqCst)
    }

    /// Gets the replica ID
    pub fn replica_id(&self) -> ReplicaId {
        self.replica_id
    }
}

impl TokenGenerator for LamportClock {
    type Token = LamportTimestamp;

    fn generate(&self) -> LamportTimestamp {
        self.tick()
    }

    fn witness(&self, token: &LamportTimestamp) {
        self.update(*token);
    }
}
