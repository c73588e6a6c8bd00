//! Lock-guarded handle for replicas touched from more than one thread.
//!
//! `ReplicatedSet` itself is single-writer. `SharedReplica` supplies the external mutual
//! exclusion around it: local mutations take the write lock, and merging from another
//! handle copies the remote state under its read lock before touching the local one.

use std::sync::Arc;

use parking_lot::RwLock;
use tracing::debug;

use crate::crdt::error::Result;
use crate::crdt::or_set::ReplicatedSet;
use crate::crdt::types::TokenGenerator;

/// Cloneable, thread-safe handle to one replica.
pub struct SharedReplica<E, G: TokenGenerator> {
    inner: Arc<RwLock<ReplicatedSet<E, G>>>,
}

impl<E, G> SharedReplica<E, G>
where
    E: Ord + Clone,
    G: TokenGenerator,
{
    /// Wraps `set` in a new lock; clones of the handle share it.
    pub fn new(set: ReplicatedSet<E, G>) -> Self {
        SharedReplica {
            inner: Arc::new(RwLock::new(set)),
        }
    }

    /// `ReplicatedSet::add` under the write lock.
    pub fn add(&self, element: E) {
        self.inner.write().add(element);
    }

    /// `ReplicatedSet::remove` under the write lock.
    pub fn remove(&self, element: &E) -> Result<()> {
        self.inner.write().remove(element)
    }

    /// `ReplicatedSet::exists` under the read lock.
    pub fn exists(&self, element: &E) -> bool {
        self.inner.read().exists(element)
    }

    /// Present elements at the time of the call.
    pub fn members(&self) -> Vec<E> {
        self.inner.read().iter().cloned().collect()
    }

    /// Copy of the current replica state, taken under the read lock.
    pub fn snapshot(&self) -> ReplicatedSet<E, G> {
        self.inner.read().replicate()
    }

    /// Merges another replica's current state into this one.
    ///
    /// The remote is copied first and its lock released before the local write lock is
    /// taken, so two handles merging from each other cannot deadlock.
    pub fn merge_from(&self, remote: &SharedReplica<E, G>) {
        if Arc::ptr_eq(&self.inner, &remote.inner) {
            debug!("skipping merge of replica with itself");
            return;
        }
        let copy = remote.snapshot();
        self.inner.write().merge(&copy);
    }

    /// Runs `f` with shared access to the replica.
    pub fn read<R>(&self, f: impl FnOnce(&ReplicatedSet<E, G>) -> R) -> R {
        f(&self.inner.read())
    }

    /// Runs `f` with exclusive access to the replica.
    pub fn write<R>(&self, f: impl FnOnce(&mut ReplicatedSet<E, G>) -> R) -> R {
        f(&mut self.inner.write())
    }
}

impl<E, G: TokenGenerator> Clone for SharedReplica<E, G> {
    fn clone(&self) -> Self {
        SharedReplica {
            inner: Arc::clone(&self.inner),
        }
    }
}
