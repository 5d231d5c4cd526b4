//! World-entity snapshots consumed by combat and coordination logic.
//!
//! A [`Candidate`] is a transient copy of what the world server last told us
//! about one entity.  It is rebuilt from the visibility cache every decision
//! and never persisted; flags such as `doomed_by_projectiles` are computed by
//! the world-state collaborator, not by this crate.

use std::fmt;

use crate::{EntityId, Position};

// ── EntityKind ────────────────────────────────────────────────────────────────

/// Application-defined entity type name (`"goo"`, `"bee"`, …).
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct EntityKind(pub String);

impl EntityKind {
    pub fn new(name: impl Into<String>) -> Self {
        EntityKind(name.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for EntityKind {
    fn from(s: &str) -> Self {
        EntityKind(s.to_owned())
    }
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

// ── Candidate ─────────────────────────────────────────────────────────────────

/// A world entity eligible to be acted upon this tick.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Candidate {
    pub id:       EntityId,
    pub kind:     EntityKind,
    pub position: Position,
    pub hp:       u32,
    pub max_hp:   u32,
    /// Experience awarded for the kill.  Negative for pets and summons, which
    /// must never be contested.
    pub xp:       i64,
    /// Somebody (friend or stranger) is already attacking it.
    pub targeted: bool,
    /// In-flight projectiles from others will kill it without our help.
    pub doomed_by_projectiles: bool,
    /// An environmental damage-over-time effect will kill it.
    pub doomed_by_burn: bool,
    /// Area effects do not damage it.
    pub immune: bool,
    /// Hitting it with an area effect can restore resource through
    /// equipment bonuses.
    pub harvestable: bool,
}

impl Candidate {
    /// A healthy, unclaimed candidate with neutral flags.  Tests and the demo
    /// world build on this with struct-update syntax.
    pub fn new(id: EntityId, kind: impl Into<EntityKind>, position: Position, hp: u32) -> Self {
        Self {
            id,
            kind: kind.into(),
            position,
            hp,
            max_hp: hp,
            xp: 1,
            targeted: false,
            doomed_by_projectiles: false,
            doomed_by_burn: false,
            immune: false,
            harvestable: false,
        }
    }

    /// `true` if anything already in motion will kill it.
    #[inline]
    pub fn is_doomed(&self) -> bool {
        self.doomed_by_projectiles || self.doomed_by_burn
    }
}

// ── Stranger ──────────────────────────────────────────────────────────────────

/// Another player visible to the agent.  Used to detect contested targets.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Stranger {
    pub name:     String,
    pub position: Position,
    /// Attack range of the other player.
    pub range:    f32,
    /// Party member, same owner, or allow-listed.
    pub friendly: bool,
}
