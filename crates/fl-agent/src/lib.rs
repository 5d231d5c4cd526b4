//! `fl-agent` — the contract between the controller and one live agent.
//!
//! Everything the scheduler, combat and coordination layers know about an
//! agent goes through the [`AgentHandle`] trait.  The network client, world
//! decoding and pathfinding live behind it and are out of scope here.
//!
//! # Crate layout
//!
//! | Module         | Contents                                                  |
//! |----------------|-----------------------------------------------------------|
//! | [`handle`]     | `AgentHandle` trait, `SharedHandle`                       |
//! | [`action`]     | `Action` primitives, `Outcome`                            |
//! | [`pool`]       | `ResourcePool` (`current`, `max`)                         |
//! | [`visibility`] | `VisibilityCache` — concurrent per-agent entity map       |
//! | [`slot`]       | `AgentSlot` — swappable handle shared with friends        |
//! | [`factory`]    | `HandleFactory`, `AgentIdentity`, `ShardId`               |
//! | [`directory`]  | `EntityDirectory` (remote lookups), `StaticDirectory`     |
//! | [`mock`]       | `MockHandle`, `MockFactory` — scripted in-memory agents   |
//! | [`error`]      | `ActionError`, `ConnectError`, `FactoryError`, …          |

pub mod action;
pub mod directory;
pub mod error;
pub mod factory;
pub mod handle;
pub mod mock;
pub mod pool;
pub mod slot;
pub mod visibility;

#[cfg(test)]
mod tests;

pub use action::{Action, Outcome};
pub use directory::{DirectoryQuery, DirectoryRecord, EntityDirectory, StaticDirectory};
pub use error::{
    ActionError, ActionResult, ConnectError, DirectoryError, FactoryError, FactoryResult,
};
pub use factory::{AgentIdentity, HandleFactory, ShardId};
pub use handle::{AgentHandle, SharedHandle};
pub use mock::{MockFactory, MockHandle, MockHandleBuilder};
pub use pool::ResourcePool;
pub use slot::AgentSlot;
pub use visibility::VisibilityCache;
