//! Replica identifier type.
//!
//! A replica is one independently mutated copy of a set. Replica ids only need to be
//! distinct when they are used to build Lamport-clock tokens.

/// A unique identifier for each replica in the distributed system.
///
/// Two replicas that mint tokens from `LamportClock`s must never share an id, otherwise
/// their tokens can collide and a remove on one replica would silently cover an add on
/// the other.
pub type ReplicaId = u64;
