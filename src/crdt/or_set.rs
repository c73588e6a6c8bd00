//! Core OR-Set implementation.
//!
//! This module contains `ReplicatedSet`, a map from elements to their `TagSet`. Each replica
//! owns one and mutates it through `add`/`remove`/`merge`; merging any two replicas in any
//! order, any number of times, converges to the same state.

use std::collections::BTreeMap;
use std::collections::btree_map;
use std::fmt;
use std::hash::Hash;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::{debug, trace};

use crate::crdt::error::{OrSetError, Result};
use crate::crdt::order::CausalOrder;
use crate::crdt::tag_set::{TagHistory, TagSet};
use crate::crdt::types::TokenGenerator;

/// The Observed-Removed Set CRDT.
///
/// # Design
///
/// - One `TagSet` per element ever seen, kept forever (tombstones are never pruned)
/// - A single token generator shared by every `TagSet` of the replica
/// - Ordered backing map, so enumeration follows the element order
/// - Not internally synchronized: mutation needs `&mut self`. Wrap it in a
///   [`SharedReplica`](crate::SharedReplica) to share it between threads.
///
/// # Equality
///
/// `==` compares visible membership only. Two replicas can be `==` while `compare` reports
/// `ConcurrentOrEqual` because their hidden tag histories differ; use `same_history` for the
/// full check.
pub struct ReplicatedSet<E, G: TokenGenerator> {
    generator: Arc<G>,
    items: BTreeMap<E, TagSet<G>>,
}

/// Serializable view of a replica's full tag history.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReplicaSnapshot<E: Ord, T: Eq + Hash> {
    pub elements: BTreeMap<E, TagHistory<T>>,
}

impl<E, G> ReplicatedSet<E, G>
where
    E: Ord + Clone,
    G: TokenGenerator,
{
    /// Creates an empty replica minting tokens from `generator`.
    pub fn new(generator: G) -> Self {
        Self::with_shared_generator(Arc::new(generator))
    }

    /// Creates an empty replica over a generator that is already shared.
    pub fn with_shared_generator(generator: Arc<G>) -> Self {
        ReplicatedSet {
            generator,
            items: BTreeMap::new(),
        }
    }

    /// Rebuilds a replica from a snapshot.
    ///
    /// Every observed token in the snapshot is witnessed by `generator`.
    pub fn from_snapshot(generator: G, snapshot: ReplicaSnapshot<E, G::Token>) -> Self {
        let generator = Arc::new(generator);
        let items: BTreeMap<_, _> = snapshot
            .elements
            .into_iter()
            .map(|(element, history)| {
                for token in &history.observed {
                    generator.witness(token);
                }
                (element, TagSet::from_history(Arc::clone(&generator), history))
            })
            .collect();
        debug!(entries = items.len(), "rebuilt replica from snapshot");
        ReplicatedSet { generator, items }
    }

    /// The token generator shared by every tag set of this replica.
    pub fn generator(&self) -> &Arc<G> {
        &self.generator
    }

    /// Records an observation of `element`, creating its tag history if needed.
    pub fn add(&mut self, element: E) {
        self.entry(element).observe();
    }

    /// Removes every observation of `element` this replica knows about.
    ///
    /// # Errors
    ///
    /// `OrSetError::NeverObserved` if the element has no tag history here.
    pub fn remove(&mut self, element: &E) -> Result<()> {
        let tags = self
            .items
            .get_mut(element)
            .ok_or(OrSetError::NeverObserved)?;
        tags.remove();
        trace!(tombstones = tags.removed().len(), "removed element");
        Ok(())
    }

    /// Merges a remote replica's state into this one.
    ///
    /// Every element in the remote key space is merged, including elements currently
    /// absent there, so removals travel as well as additions.
    pub fn merge(&mut self, remote: &ReplicatedSet<E, G>) {
        let before = self.items.len();
        for (element, tags) in &remote.items {
            self.entry(element.clone()).merge(tags);
        }
        debug!(
            remote_entries = remote.items.len(),
            new_entries = self.items.len() - before,
            "merged remote replica"
        );
    }

    /// Merges a snapshot, typically one reconstructed from the wire.
    pub fn merge_snapshot(&mut self, snapshot: &ReplicaSnapshot<E, G::Token>) {
        let before = self.items.len();
        for (element, history) in &snapshot.elements {
            self.entry(element.clone()).merge_history(history);
        }
        debug!(
            remote_entries = snapshot.elements.len(),
            new_entries = self.items.len() - before,
            "merged replica snapshot"
        );
    }

    /// Tag history of `element`.
    ///
    /// # Errors
    ///
    /// `OrSetError::NotFound` if the element has no tag history here.
    pub fn tags(&self, element: &E) -> Result<&TagSet<G>> {
        self.items.get(element).ok_or(OrSetError::NotFound)
    }

    /// True iff `element` is currently present.
    pub fn exists(&self, element: &E) -> bool {
        self.items.get(element).is_some_and(TagSet::exists)
    }

    /// Lazily enumerates the present elements, in element order.
    ///
    /// Each call starts a fresh pass over the current state.
    pub fn iter(&self) -> Iter<'_, E, G> {
        Iter {
            inner: self.items.iter(),
        }
    }

    /// Number of present elements.
    pub fn len(&self) -> usize {
        self.iter().count()
    }

    /// True iff no element is currently present.
    pub fn is_empty(&self) -> bool {
        self.iter().next().is_none()
    }

    /// Number of elements with tag history, present or not.
    pub fn entry_count(&self) -> usize {
        self.items.len()
    }

    /// True iff `element` has tag history here, even if it is currently absent.
    pub fn contains_entry(&self, element: &E) -> bool {
        self.items.contains_key(element)
    }

    /// Deep copy with identical history, sharing the generator.
    pub fn replicate(&self) -> Self {
        ReplicatedSet {
            generator: Arc::clone(&self.generator),
            items: self
                .items
                .iter()
                .map(|(element, tags)| (element.clone(), tags.replicate()))
                .collect(),
        }
    }

    /// True iff both replicas hold exactly the same tag history for every element.
    pub fn same_history(&self, other: &ReplicatedSet<E, G>) -> bool {
        self.items == other.items
    }

    /// Copies the full tag history of every element into plain, serializable data.
    pub fn snapshot(&self) -> ReplicaSnapshot<E, G::Token> {
        ReplicaSnapshot {
            elements: self
                .items
                .iter()
                .map(|(element, tags)| (element.clone(), tags.history()))
                .collect(),
        }
    }

    /// Causal partial order between two replicas.
    ///
    /// A replica whose key set strictly contains the other's is subsequent to it. With equal
    /// key sets the per-element verdicts decide: all ordered pairs pointing one way give that
    /// direction, while a concurrent pair or pairs pointing both ways make the replicas
    /// concurrent. Differing key sets with no containment are concurrent.
    pub fn compare(&self, other: &ReplicatedSet<E, G>) -> CausalOrder {
        let ours_within_theirs = self.items.keys().all(|k| other.items.contains_key(k));
        let theirs_within_ours = other.items.keys().all(|k| self.items.contains_key(k));

        let order = match (ours_within_theirs, theirs_within_ours) {
            (true, false) => CausalOrder::Prior,
            (false, true) => CausalOrder::Subsequent,
            (false, false) => CausalOrder::ConcurrentOrEqual,
            (true, true) => self.compare_histories(other),
        };
        trace!(verdict = %order, "compared replicas");
        order
    }

    fn compare_histories(&self, other: &ReplicatedSet<E, G>) -> CausalOrder {
        let mut other_prior = 0usize;
        let mut self_prior = 0usize;

        // Same key sets, so both ordered maps walk the same elements in lockstep.
        for (ours, theirs) in self.items.values().zip(other.items.values()) {
            if ours == theirs {
                continue;
            }
            match ours.compare(theirs) {
                CausalOrder::ConcurrentOrEqual => return CausalOrder::ConcurrentOrEqual,
                CausalOrder::Subsequent => other_prior += 1,
                CausalOrder::Prior => self_prior += 1,
            }
            if other_prior > 0 && self_prior > 0 {
                return CausalOrder::ConcurrentOrEqual;
            }
        }

        if other_prior > 0 {
            CausalOrder::Subsequent
        } else if self_prior > 0 {
            CausalOrder::Prior
        } else {
            CausalOrder::ConcurrentOrEqual
        }
    }

    fn entry(&mut self, element: E) -> &mut TagSet<G> {
        let generator = &self.generator;
        self.items
            .entry(element)
            .or_insert_with(|| TagSet::new(Arc::clone(generator)))
    }
}

impl<E, G> Default for ReplicatedSet<E, G>
where
    E: Ord + Clone,
    G: TokenGenerator + Default,
{
    fn default() -> Self {
        Self::new(G::default())
    }
}

impl<E, G> Clone for ReplicatedSet<E, G>
where
    E: Ord + Clone,
    G: TokenGenerator,
{
    fn clone(&self) -> Self {
        self.replicate()
    }
}

impl<E, G> PartialEq for ReplicatedSet<E, G>
where
    E: Ord + Clone,
    G: TokenGenerator,
{
    /// Visible membership equality; see the type-level docs.
    fn eq(&self, other: &Self) -> bool {
        self.iter().eq(other.iter())
    }
}

impl<E, G> Eq for ReplicatedSet<E, G>
where
    E: Ord + Clone,
    G: TokenGenerator,
{
}

impl<E, G> Extend<E> for ReplicatedSet<E, G>
where
    E: Ord + Clone,
    G: TokenGenerator,
{
    fn extend<I: IntoIterator<Item = E>>(&mut self, elements: I) {
        for element in elements {
            self.add(element);
        }
    }
}

impl<E, G> fmt::Debug for ReplicatedSet<E, G>
where
    E: fmt::Debug,
    G: TokenGenerator,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map().entries(self.items.iter()).finish()
    }
}

/// Iterator over the present elements of a `ReplicatedSet`.
pub struct Iter<'a, E, G: TokenGenerator> {
    inner: btree_map::Iter<'a, E, TagSet<G>>,
}

impl<'a, E, G: TokenGenerator> Iterator for Iter<'a, E, G> {
    type Item = &'a E;

    fn next(&mut self) -> Option<&'a E> {
        self.inner
            .by_ref()
            .find(|(_, tags)| tags.exists())
            .map(|(element, _)| element)
    }
}

impl<'a, E, G> IntoIterator for &'a ReplicatedSet<E, G>
where
    E: Ord + Clone,
    G: TokenGenerator,
{
    type Item = &'a E;
    type IntoIter = Iter<'a, E, G>;

    fn into_iter(self) -> Iter<'a, E, G> {
        self.iter()
    }
}
