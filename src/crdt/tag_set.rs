//! Per-element causal metadata for the OR-Set.
//!
//! A `TagSet` records every observation of an element as a fresh token, and every removal as
//! the set of observation tokens known at that moment. The element is present while some
//! observed token has not been removed, which gives add-wins behaviour: an add concurrent with
//! (or after) a remove mints a token the remove never saw.
//!
//! # Tombstones
//!
//! Removed tokens are kept forever. Sustained add/remove churn grows a `TagSet` without
//! bound; pruning requires a cross-replica garbage collection protocol that this crate does
//! not provide.

use std::collections::HashSet;
use std::fmt;
use std::hash::Hash;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::crdt::order::CausalOrder;
use crate::crdt::types::TokenGenerator;

/// Plain, serializable form of a tag set's history.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TagHistory<T: Eq + Hash> {
    pub observed: HashSet<T>,
    pub removed: HashSet<T>,
}

impl<T: Eq + Hash> Default for TagHistory<T> {
    fn default() -> Self {
        TagHistory {
            observed: HashSet::new(),
            removed: HashSet::new(),
        }
    }
}

/// Observed and removed tokens for one element on one replica.
pub struct TagSet<G: TokenGenerator> {
    generator: Arc<G>,
    observed: HashSet<G::Token>,
    removed: HashSet<G::Token>,
}

impl<G: TokenGenerator> TagSet<G> {
    /// Creates an empty tag set: nothing observed, nothing removed.
    pub fn new(generator: Arc<G>) -> Self {
        TagSet {
            generator,
            observed: HashSet::new(),
            removed: HashSet::new(),
        }
    }

    /// Rebuilds a tag set from an exported history.
    pub fn from_history(generator: Arc<G>, history: TagHistory<G::Token>) -> Self {
        TagSet {
            generator,
            observed: history.observed,
            removed: history.removed,
        }
    }

    /// Records an observation under a freshly minted token.
    pub fn observe(&mut self) {
        let token = self.generator.generate();
        self.observed.insert(token);
    }

    /// Removes every observation known so far.
    ///
    /// Tokens minted by later `observe` calls are not covered, so observing again after a
    /// remove makes the element present again.
    pub fn remove(&mut self) {
        self.removed.extend(self.observed.iter().cloned());
    }

    /// True iff `observed` is a strict superset of `removed`.
    pub fn exists(&self) -> bool {
        self.observed.len() > self.removed.len() && self.observed.is_superset(&self.removed)
    }

    /// Unions another replica's history for the same element into this one.
    pub fn merge(&mut self, other: &TagSet<G>) {
        self.absorb(other.observed.iter(), other.removed.iter());
    }

    /// Same as `merge`, for a history that arrived as plain data.
    pub fn merge_history(&mut self, history: &TagHistory<G::Token>) {
        self.absorb(history.observed.iter(), history.removed.iter());
    }

    fn absorb<'a>(
        &mut self,
        observed: impl Iterator<Item = &'a G::Token>,
        removed: impl Iterator<Item = &'a G::Token>,
    ) where
        G::Token: 'a,
    {
        for token in observed {
            if !self.observed.contains(token) {
                self.generator.witness(token);
                self.observed.insert(token.clone());
            }
        }
        for token in removed {
            if !self.removed.contains(token) {
                self.removed.insert(token.clone());
            }
        }
    }

    /// Deep copy with identical history, sharing the generator.
    pub fn replicate(&self) -> Self {
        TagSet {
            generator: Arc::clone(&self.generator),
            observed: self.observed.clone(),
            removed: self.removed.clone(),
        }
    }

    /// Causal partial order between two histories of the same element.
    ///
    /// `Prior` means `other` holds all of this history plus at least one further observation
    /// or removal. Identical histories and concurrently mutated ones both yield
    /// `ConcurrentOrEqual`.
    pub fn compare(&self, other: &TagSet<G>) -> CausalOrder {
        let observed_equal = self.observed == other.observed;
        let removed_equal = self.removed == other.removed;
        if observed_equal && removed_equal {
            return CausalOrder::ConcurrentOrEqual;
        }

        // At least one side differs here, so both subsets holding makes one of them proper.
        if self.observed.is_subset(&other.observed) && self.removed.is_subset(&other.removed) {
            return CausalOrder::Prior;
        }
        if other.observed.is_subset(&self.observed) && other.removed.is_subset(&self.removed) {
            return CausalOrder::Subsequent;
        }

        CausalOrder::ConcurrentOrEqual
    }

    /// Every observation token this replica knows of, removed or not.
    pub fn observed(&self) -> &HashSet<G::Token> {
        &self.observed
    }

    /// Observation tokens covered by a removal (the tombstones).
    pub fn removed(&self) -> &HashSet<G::Token> {
        &self.removed
    }

    /// Observed tokens that no removal has covered yet.
    pub fn live_tokens(&self) -> impl Iterator<Item = &G::Token> {
        self.observed
            .iter()
            .filter(move |token| !self.removed.contains(*token))
    }

    /// Total number of tokens retained, tombstones included.
    pub fn token_count(&self) -> usize {
        self.observed.len() + self.removed.len()
    }

    /// Copies both token sets into plain, serializable data.
    pub fn history(&self) -> TagHistory<G::Token> {
        TagHistory {
            observed: self.observed.clone(),
            removed: self.removed.clone(),
        }
    }
}

impl<G: TokenGenerator> Clone for TagSet<G> {
    fn clone(&self) -> Self {
        self.replicate()
    }
}

impl<G: TokenGenerator> PartialEq for TagSet<G> {
    fn eq(&self, other: &Self) -> bool {
        self.observed == other.observed && self.removed == other.removed
    }
}

impl<G: TokenGenerator> Eq for TagSet<G> {}

impl<G: TokenGenerator> fmt::Debug for TagSet<G> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TagSet")
            .field("observed", &self.observed)
            .field("removed", &self.removed)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crdt::types::{LamportClock, LamportTimestamp, RandomTokens};

    fn tags() -> TagSet<RandomTokens> {
        TagSet::new(Arc::new(RandomTokens))
    }

    #[test]
    fn test_new_tags_do_not_exist() {
        assert!(!tags().exists());
    }

    #[test]
    fn test_observed_tags_exist() {
        let mut t = tags();
        t.observe();
        assert!(t.exists());
    }

    #[test]
    fn test_observed_then_removed_does_not_exist() {
        let mut t = tags();
        t.observe();
        t.remove();
        assert!(!t.exists());
    }

    #[test]
    fn test_one_remove_covers_many_observations() {
        let mut t = tags();
        t.observe();
        t.observe();
        t.observe();
        t.remove();
        assert!(!t.exists());
        assert_eq!(t.live_tokens().count(), 0);
    }

    #[test]
    fn test_removing_more_than_observing_is_ok() {
        let mut t = tags();
        t.observe();
        t.remove();
        let after_one = t.clone();
        t.remove();
        t.remove();
        assert!(!t.exists());
        assert_eq!(t, after_one);
    }

    #[test]
    fn test_remove_without_observe_is_noop() {
        let mut t = tags();
        t.remove();
        assert!(!t.exists());
        assert!(t.removed().is_empty());
    }

    #[test]
    fn test_observe_after_remove_resurrects() {
        let mut t = tags();
        t.observe();
        t.observe();
        t.remove();
        t.remove();
        t.observe();
        assert!(t.exists());
        assert_eq!(t.live_tokens().count(), 1);
    }

    #[test]
    fn test_merge_keeps_unremoved_observation() {
        let mut t1 = tags();
        let mut t2 = tags();

        t1.observe();
        t2.observe();
        t2.remove();
        t1.merge(&t2);

        assert!(t1.exists());
    }

    #[test]
    fn test_removed_on_both_sides_stays_removed() {
        let mut t1 = tags();
        let mut t2 = tags();

        t1.observe();
        t2.observe();
        t1.remove();
        t2.remove();
        t1.merge(&t2);

        assert!(!t1.exists());
        assert_eq!(t1.token_count(), 4);
    }

    #[test]
    fn test_two_new_tags_are_equal() {
        let t1 = tags();
        let t2 = tags();
        assert_eq!(t1, t2);
        assert_eq!(t1.compare(&t2), CausalOrder::ConcurrentOrEqual);
    }

    #[test]
    fn test_replica_is_equal() {
        let mut t1 = tags();
        t1.observe();
        t1.observe();
        t1.remove();
        t1.observe();

        let t2 = t1.replicate();

        assert_eq!(t1, t2);
        assert_eq!(t1.compare(&t2), CausalOrder::ConcurrentOrEqual);
    }

    #[test]
    fn test_changed_replica_is_subsequent() {
        let mut t1 = tags();
        t1.observe();

        let mut t2 = t1.replicate();
        t2.observe();

        assert_eq!(t1.compare(&t2), CausalOrder::Prior);
        assert_eq!(t2.compare(&t1), CausalOrder::Subsequent);
    }

    #[test]
    fn test_removal_alone_orders_histories() {
        let mut t1 = tags();
        t1.observe();

        let mut t2 = t1.replicate();
        t2.remove();

        assert_eq!(t1.compare(&t2), CausalOrder::Prior);
        assert_eq!(t2.compare(&t1), CausalOrder::Subsequent);
    }

    #[test]
    fn test_both_changed_is_concurrent_but_not_equal() {
        let mut t1 = tags();
        t1.observe();

        let mut t2 = t1.replicate();
        t2.observe();
        t1.remove();

        assert_eq!(t1.compare(&t2), CausalOrder::ConcurrentOrEqual);
        assert_eq!(t2.compare(&t1), CausalOrder::ConcurrentOrEqual);
        assert_ne!(t1, t2);
    }

    #[test]
    fn test_merge_is_idempotent() {
        let mut t1 = tags();
        t1.observe();
        t1.remove();
        t1.observe();

        let snapshot = t1.clone();
        t1.merge(&snapshot);
        assert_eq!(t1, snapshot);
    }

    #[test]
    fn test_history_round_trip() {
        let mut t1 = tags();
        t1.observe();
        t1.remove();
        t1.observe();

        let rebuilt = TagSet::from_history(Arc::new(RandomTokens), t1.history());
        assert_eq!(rebuilt, t1);
        assert!(rebuilt.exists());
    }

    #[test]
    fn test_merge_witnesses_remote_tokens() {
        let local = Arc::new(LamportClock::new(1));
        let remote = Arc::new(LamportClock::new(2));

        let mut t1 = TagSet::new(Arc::clone(&local));
        let mut t2 = TagSet::new(remote);
        for _ in 0..5 {
            t2.observe();
        }

        t1.merge(&t2);
        t1.observe();

        assert!(t1.observed().contains(&LamportTimestamp::new(6, 1)));
        assert_eq!(local.current_counter(), 6);
    }

    #[test]
    fn test_deterministic_closure_generator() {
        use std::sync::atomic::{AtomicU32, Ordering};

        let next = Arc::new(AtomicU32::new(0));
        let counter = Arc::clone(&next);
        let generator = Arc::new(move || counter.fetch_add(1, Ordering::SeqCst));

        let mut t = TagSet::new(generator);
        t.observe();
        t.observe();

        assert_eq!(t.observed(), &HashSet::from([0, 1]));
        assert_eq!(next.load(Ordering::SeqCst), 2);
    }
}
