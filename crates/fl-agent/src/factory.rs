//! Handle construction keyed by the closed [`Role`] set.
//!
//! The scheduler never matches on roles itself: every reconnect and shard
//! switch goes through one [`HandleFactory::build`] call.

use std::fmt;

use fl_core::{AgentId, Role};

use crate::{FactoryResult, SharedHandle};

/// Credentials of one logical agent.  Reused verbatim on every reconnect.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AgentIdentity {
    /// Stable id every handle built for this agent reports.
    pub agent:     AgentId,
    /// Account that owns the character.
    pub owner:     String,
    pub auth:      String,
    pub character: String,
}

impl AgentIdentity {
    pub fn new(
        agent:     AgentId,
        owner:     impl Into<String>,
        auth:      impl Into<String>,
        character: impl Into<String>,
    ) -> Self {
        Self { agent, owner: owner.into(), auth: auth.into(), character: character.into() }
    }
}

/// One world shard (`region` + `name`, e.g. `US I`).
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct ShardId {
    pub region: String,
    pub name:   String,
}

impl ShardId {
    pub fn new(region: impl Into<String>, name: impl Into<String>) -> Self {
        Self { region: region.into(), name: name.into() }
    }
}

impl fmt::Display for ShardId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.region, self.name)
    }
}

/// Builds fresh, unconnected handles.
///
/// The handle must report `identity.agent` as its id.  Implementations must
/// not connect: the caller calls
/// [`AgentHandle::connect`][crate::AgentHandle::connect] and interprets the
/// failure.  An error from `build` is treated as permanent.
pub trait HandleFactory: Send + Sync + 'static {
    fn build(
        &self,
        role:     Role,
        identity: &AgentIdentity,
        shard:    &ShardId,
    ) -> FactoryResult<SharedHandle>;
}
