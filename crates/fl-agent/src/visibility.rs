//! `VisibilityCache` — the entities one agent can currently see.
//!
//! # Ownership
//!
//! The world-state collaborator writes the cache as updates arrive
//! ([`sync`][VisibilityCache::sync], [`upsert`][VisibilityCache::upsert]).
//! Friends' schedulers may only [`remove`][VisibilityCache::remove] from it,
//! which is how cross-agent de-duplication works.  No caller ever performs a
//! read-modify-write across agents, so a concurrent map is all the
//! synchronisation needed: a stale read costs one wasted action, never a
//! corrupted entry.

use dashmap::DashMap;

use fl_core::{Candidate, EntityId};

/// Concurrent `EntityId → Candidate` map.
#[derive(Default, Debug)]
pub struct VisibilityCache {
    inner: DashMap<EntityId, Candidate>,
}

impl VisibilityCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the whole content with a fresh world snapshot.
    pub fn sync<I: IntoIterator<Item = Candidate>>(&self, candidates: I) {
        self.inner.clear();
        for c in candidates {
            self.inner.insert(c.id, c);
        }
    }

    /// Insert or update one entity.
    pub fn upsert(&self, candidate: Candidate) {
        self.inner.insert(candidate.id, candidate);
    }

    /// Forget one entity.  Returns `true` if it was present.
    pub fn remove(&self, id: EntityId) -> bool {
        self.inner.remove(&id).is_some()
    }

    pub fn get(&self, id: EntityId) -> Option<Candidate> {
        self.inner.get(&id).map(|e| e.value().clone())
    }

    pub fn contains(&self, id: EntityId) -> bool {
        self.inner.contains_key(&id)
    }

    /// Copy of every visible entity, ordered by id so repeated decisions over
    /// the same world state are deterministic.
    pub fn snapshot(&self) -> Vec<Candidate> {
        let mut out: Vec<Candidate> = self.inner.iter().map(|e| e.value().clone()).collect();
        out.sort_unstable_by_key(|c| c.id);
        out
    }

    pub fn len(&self) -> usize {
        self.inner.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }

    pub fn clear(&self) {
        self.inner.clear();
    }
}
