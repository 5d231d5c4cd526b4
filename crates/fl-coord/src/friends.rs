//! `FriendSet` — non-owning references to peer agents.

use std::sync::{Arc, Weak};

use fl_agent::{AgentSlot, SharedHandle};
use fl_core::AgentId;

/// Peers an agent coordinates with.  May include the agent itself; every
/// operation skips its own id.
#[derive(Clone, Debug, Default)]
pub struct FriendSet {
    members: Vec<Weak<AgentSlot>>,
}

impl FriendSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_slots(slots: &[Arc<AgentSlot>]) -> Self {
        Self { members: slots.iter().map(Arc::downgrade).collect() }
    }

    pub fn push(&mut self, slot: &Arc<AgentSlot>) {
        self.members.push(Arc::downgrade(slot));
    }

    /// Declared members, including ones already dropped.
    pub fn len(&self) -> usize {
        self.members.len()
    }

    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    /// Slots still alive, excluding `me`.
    pub fn others(&self, me: AgentId) -> Vec<Arc<AgentSlot>> {
        self.members
            .iter()
            .filter_map(Weak::upgrade)
            .filter(|s| s.id() != me)
            .collect()
    }

    /// Current handles of live friends other than `me`.
    pub fn handles(&self, me: AgentId) -> Vec<SharedHandle> {
        self.others(me).iter().map(|s| s.current()).collect()
    }
}
