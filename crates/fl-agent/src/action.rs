//! Action primitives — what an agent can ask the world server to do.

use fl_core::{AbilityId, AgentId, EntityId, Position};

/// One request issued through [`AgentHandle::perform`][crate::AgentHandle::perform].
///
/// Each variant is a single network round-trip.  The world server is
/// authoritative; a successful return only means the request was accepted.
#[derive(Debug, Clone, PartialEq)]
pub enum Action {
    /// Walk towards `to`.  Pathfinding is the collaborator's concern.
    Move { to: Position },

    /// Basic attack on one entity.
    Attack { target: EntityId },

    /// One batched area-effect use.  Each target carries the amount of
    /// resource spent on it.
    AreaEffect {
        ability: AbilityId,
        targets: Vec<(EntityId, u32)>,
    },

    /// Transfer `amount` of resource to a friendly agent.
    Donate {
        ability: AbilityId,
        to:      AgentId,
        amount:  u32,
    },

    /// Use any other ability, optionally on a target.
    UseAbility {
        ability: AbilityId,
        target:  Option<EntityId>,
    },

    /// Offer `quantity` of `item` to another player.
    Trade {
        with:     String,
        item:     String,
        quantity: u32,
    },
}

impl Action {
    /// The ability whose cooldown gates this action, if any.
    pub fn ability(&self) -> Option<AbilityId> {
        match self {
            Action::AreaEffect { ability, .. }
            | Action::Donate { ability, .. }
            | Action::UseAbility { ability, .. } => Some(*ability),
            Action::Move { .. } | Action::Attack { .. } | Action::Trade { .. } => None,
        }
    }

    /// Resource the action spends up front.
    pub fn resource_cost(&self) -> u32 {
        match self {
            Action::AreaEffect { targets, .. } => targets.iter().map(|(_, c)| *c).sum(),
            Action::Donate { amount, .. } => *amount,
            _ => 0,
        }
    }

    /// Short label for logs.
    pub fn label(&self) -> &'static str {
        match self {
            Action::Move { .. }       => "move",
            Action::Attack { .. }     => "attack",
            Action::AreaEffect { .. } => "area_effect",
            Action::Donate { .. }     => "donate",
            Action::UseAbility { .. } => "use_ability",
            Action::Trade { .. }      => "trade",
        }
    }
}

/// What the world server acknowledged.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Outcome {
    /// Resource actually consumed.
    pub consumed: u32,
}
