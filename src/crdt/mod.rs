//! CRDT (Conflict-free Replicated Data Type) implementation module.
//!
//! This module contains the Observed-Removed Set and all of its supporting types: the
//! per-element tag history, the causal order verdict, and the token primitives.

pub mod error;
pub mod or_set;
pub mod order;
pub mod shared;
pub mod tag_set;
pub mod types;

// Re-export the main public API
pub use error::{OrSetError, Result};
pub use or_set::{Iter, ReplicaSnapshot, ReplicatedSet};
pub use order::CausalOrder;
pub use shared::SharedReplica;
pub use tag_set::{TagHistory, TagSet};
pub use types::{
    LamportClock, LamportTimestamp, MAX_WITNESSED_COUNTER, RandomTokens, ReplicaId, Token,
    TokenGenerator,
};
