//! `fl-core` — foundational types for the `rust_fleet` agent controller.
//!
//! This crate is a dependency of every other `fl-*` crate.  It has no `fl-*`
//! dependencies and only small external ones (`rand`, `serde`, `toml`,
//! `thiserror`).
//!
//! # What lives here
//!
//! | Module          | Contents                                              |
//! |-----------------|-------------------------------------------------------|
//! | [`ids`]         | `AgentId`, `EntityId`, `AbilityId`, `StrategyId`      |
//! | [`geo`]         | `Position`, planar distance                           |
//! | [`entity`]      | `EntityKind`, `Candidate`, `Stranger`                 |
//! | [`role`]        | `Role` (closed set of agent classes)                  |
//! | [`config`]      | `FleetConfig` and its sections, TOML loading          |
//! | [`rng`]         | `SimRng` (seeded, for synthetic worlds)               |
//! | [`error`]       | `FleetError`, `FleetResult`                           |
//!
//! # Feature flags
//!
//! | Flag    | Effect                                                     |
//! |---------|------------------------------------------------------------|
//! | `serde` | Adds `Serialize`/`Deserialize` to ids, positions and       |
//! |         | candidates (configuration types always derive them).       |

pub mod config;
pub mod entity;
pub mod error;
pub mod geo;
pub mod ids;
pub mod rng;
pub mod role;

#[cfg(test)]
mod tests;

// ── Re-exports ────────────────────────────────────────────────────────────────

pub use config::{
    DonationConfig, FleetConfig, FleetSection, ReconnectConfig, SchedulerConfig, SlotConflict,
};
pub use entity::{Candidate, EntityKind, Stranger};
pub use error::{FleetError, FleetResult};
pub use geo::Position;
pub use ids::{AbilityId, AgentId, EntityId, StrategyId};
pub use rng::SimRng;
pub use role::Role;
