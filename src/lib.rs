//! # OR-Set CRDT - Observed-Removed Set
//!
//! A Conflict-free Replicated Data Type (CRDT) implementation of a replicated set. Replicas
//! are mutated independently and merged in any order, any number of times, always converging
//! to the same membership.
//!
//! ## Features
//!
//! - **Conflict-free**: merge is commutative, associative and idempotent
//! - **Add-wins**: a remove only covers the observations it has seen, so a concurrent or later
//!   add keeps the element present
//! - **Causal comparison**: replicas can be ordered by history where one strictly contains the
//!   other
//! - **Injected uniqueness**: tokens come from a caller-supplied generator (random UUIDs,
//!   Lamport clocks, or any `Fn() -> T` closure)
//!
//! ## Limitations
//!
//! Removal tombstones are retained indefinitely; there is no compaction.
//!
//! ## Example
//!
//! ```rust
//! use crdt_orset::{RandomTokens, ReplicatedSet};
//!
//! let mut alice = ReplicatedSet::new(RandomTokens);
//! let mut bob = ReplicatedSet::new(RandomTokens);
//!
//! alice.add("milk");
//! bob.merge(&alice);
//! bob.remove(&"milk").unwrap();
//! alice.add("milk"); // concurrent re-add
//!
//! alice.merge(&bob);
//! bob.merge(&alice);
//! assert!(alice.exists(&"milk"));
//! assert_eq!(alice, bob);
//! ```

pub mod crdt;

// Re-export the main public API from the CRDT module
pub use crdt::{
    CausalOrder, Iter, LamportClock, LamportTimestamp, MAX_WITNESSED_COUNTER, OrSetError,
    RandomTokens, ReplicaId, ReplicaSnapshot, ReplicatedSet, Result, SharedReplica, TagHistory,
    TagSet, Token, TokenGenerator,
};
