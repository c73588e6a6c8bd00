//! Lamport timestamp used as an OR-Set token.
//!
//! A (counter, replica id) pair is unique across the whole system as long as every replica
//! owns a distinct id, which is all an OR-Set token needs.

use std::cmp::Ordering;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::crdt::types::replica::ReplicaId;

/// A Lamport timestamp, consisting of a logical counter and the originating replica's ID.
///
/// # Ordering
///
/// Timestamps are ordered first by counter, then by replica_id. Token ordering carries no
/// meaning for set membership; it only gives deterministic iteration in debug output.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct LamportTimestamp {
    /// The logical clock value when this timestamp was created
    pub counter: u64,
    /// The ID of the replica that created this timestamp
    pub replica_id: ReplicaId,
}

impl LamportTimestamp {
    /// Creates a timestamp from a counter and the originating replica's ID
    pub fn new(counter: u64, replica_id: ReplicaId) -> Self {
        LamportTimestamp {
            counter,
            replica_id,
        }
    }
}

impl PartialOrd for LamportTimestamp {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for LamportTimestamp {
    fn cmp(&self, other: &Self) -> Ordering {
        self.counter
            .cmp(&other.counter)
            .then_with(|| self.replica_id.cmp(&other.replica_id))
    }
}

impl fmt::Display for LamportTimestamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}@{}", self.counter, self.replica_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lamport_timestamp_ordering() {
        let ts1 = LamportTimestamp::new(1, 1);
        let ts2 = LamportTimestamp::new(1, 2);
        let ts3 = LamportTimestamp::new(2, 1);

        // Same counter, different replica_id
        assert!(ts1 < ts2);

        // Counter dominates replica id
        assert!(ts1 < ts3);
        assert!(ts2 < ts3);
    }

    #[test]
    fn test_timestamps_from_distinct_replicas_differ() {
        let a = LamportTimestamp::new(7, 1);
        let b = LamportTimestamp::new(7, 2);
        assert_ne!(a, b);
    }

    #[test]
    fn test_display() {
        assert_eq!(LamportTimestamp::new(3, 9).to_string(), "3@9");
    }
}
