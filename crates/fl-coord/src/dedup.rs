//! Cross-agent de-duplication of perishable targets.
//!
//! When an agent is about to finish an entity, it deletes the entity from
//! every friend's visibility cache so they pick something else.  Kinds in
//! the cooperative set are never deleted: several agents hitting them is the
//! point.

use std::collections::HashSet;

use tracing::debug;

use fl_core::{AgentId, Candidate, EntityKind};

use crate::FriendSet;

#[derive(Clone, Debug)]
pub struct Deduplicator {
    friends:     FriendSet,
    cooperative: HashSet<EntityKind>,
}

impl Deduplicator {
    pub fn new(friends: FriendSet) -> Self {
        Self { friends, cooperative: HashSet::new() }
    }

    /// Kinds that must stay visible to every agent.
    pub fn with_cooperative<I>(mut self, kinds: I) -> Self
    where
        I: IntoIterator<Item = EntityKind>,
    {
        self.cooperative.extend(kinds);
        self
    }

    pub fn is_cooperative(&self, kind: &EntityKind) -> bool {
        self.cooperative.contains(kind)
    }

    pub fn friends(&self) -> &FriendSet {
        &self.friends
    }

    /// `me` is about to eliminate `target`: drop it from every friend's
    /// cache.  Returns how many caches actually held it.
    pub fn claim(&self, me: AgentId, target: &Candidate) -> usize {
        if self.is_cooperative(&target.kind) {
            return 0;
        }
        let removed = self
            .friends
            .handles(me)
            .iter()
            .filter(|h| h.visible().remove(target.id))
            .count();
        if removed > 0 {
            debug!(agent = %me, target = %target.id, kind = %target.kind, removed, "claimed target");
        }
        removed
    }

    /// [`claim`](Self::claim) for a batch; returns the total removals.
    pub fn claim_all<'a, I>(&self, me: AgentId, targets: I) -> usize
    where
        I: IntoIterator<Item = &'a Candidate>,
    {
        targets.into_iter().map(|t| self.claim(me, t)).sum()
    }
}
