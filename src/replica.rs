//! Replica-snapshot collaborator interface.
//!
//! Distribution monitoring needs to know, per content node, the minimum
//! replica count observed across that node's buckets. [`MinReplicaProvider`]
//! is the one concurrency-sensitive boundary of this crate: implementations
//! must be callable from any thread at any time after registration, without
//! external locking, and must return a fully consistent point-in-time
//! snapshot. Two calls need not observe the same snapshot.

use std::collections::HashMap;

use parking_lot::RwLock;

/// Thread-safe accessor for the per-node minimum replica snapshot.
pub trait MinReplicaProvider: Send + Sync {
    /// A consistent snapshot mapping node id to the minimum bucket replica
    /// count observed for that node. No ordering guarantee relative to
    /// concurrent mutation elsewhere.
    fn min_replica(&self) -> HashMap<u16, u32>;
}

/// Lock-protected [`MinReplicaProvider`] fed by observation callbacks.
#[derive(Debug, Default)]
pub struct MinReplicaTracker {
    counts: RwLock<HashMap<u16, u32>>,
}

impl MinReplicaTracker {
    /// Create an empty tracker.
    pub fn new() -> Self {
        MinReplicaTracker::default()
    }

    /// Record a replica count observed for one of `node`'s buckets, keeping
    /// the minimum.
    pub fn observe(&self, node: u16, replica_count: u32) {
        let mut counts = self.counts.write();
        counts
            .entry(node)
            .and_modify(|current| *current = (*current).min(replica_count))
            .or_insert(replica_count);
    }

    /// Forget all observations.
    pub fn clear(&self) {
        self.counts.write().clear();
    }
}

impl MinReplicaProvider for MinReplicaTracker {
    fn min_replica(&self) -> HashMap<u16, u32> {
        self.counts.read().clone()
    }
}
