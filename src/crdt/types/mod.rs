//! Token primitives for the OR-Set.
//!
//! This module contains the replica identifier, the Lamport timestamp/clock pair, and the
//! generator capability through which tags obtain fresh tokens.

pub mod clock;
pub mod generator;
pub mod random;
pub mod replica;
pub mod timestamp;

pub use clock::{LamportClock, MAX_WITNESSED_COUNTER};
pub use generator::{Token, TokenGenerator};
pub use random::RandomTokens;
pub use replica::ReplicaId;
pub use timestamp::LamportTimestamp;
