//! `AgentSlot` — the stable home of a swappable [`SharedHandle`].
//!
//! The scheduler owns the slot (`Arc<AgentSlot>`); friends hold
//! `Weak<AgentSlot>` references and read the *current* handle whenever they
//! need it, so a reconnect on one agent is transparently picked up by every
//! peer without re-wiring friend lists.

use parking_lot::RwLock;

use fl_core::{AgentId, Role};

use crate::{AgentIdentity, SharedHandle, ShardId};

pub struct AgentSlot {
    id:       AgentId,
    role:     Role,
    identity: AgentIdentity,
    shard:    RwLock<ShardId>,
    handle:   RwLock<SharedHandle>,
}

impl AgentSlot {
    pub fn new(handle: SharedHandle, identity: AgentIdentity, shard: ShardId) -> Self {
        Self {
            id: handle.id(),
            role: handle.role(),
            identity,
            shard: RwLock::new(shard),
            handle: RwLock::new(handle),
        }
    }

    #[inline]
    pub fn id(&self) -> AgentId {
        self.id
    }

    #[inline]
    pub fn role(&self) -> Role {
        self.role
    }

    pub fn identity(&self) -> &AgentIdentity {
        &self.identity
    }

    pub fn shard(&self) -> ShardId {
        self.shard.read().clone()
    }

    pub fn set_shard(&self, shard: ShardId) {
        *self.shard.write() = shard;
    }

    /// Clone of the handle currently in use.
    pub fn current(&self) -> SharedHandle {
        self.handle.read().clone()
    }

    /// Swap in `handle`, returning the one it replaces.
    pub fn replace(&self, handle: SharedHandle) -> SharedHandle {
        std::mem::replace(&mut *self.handle.write(), handle)
    }
}

impl std::fmt::Debug for AgentSlot {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AgentSlot")
            .field("id", &self.id)
            .field("role", &self.role)
            .field("character", &self.identity.character)
            .field("shard", &*self.shard.read())
            .finish()
    }
}
