//! Read-only combat snapshot taken at the start of one decision.

use fl_agent::{AgentHandle, ResourcePool};
use fl_core::{AgentId, Candidate, EntityKind, Position, Stranger};

/// Everything one combat decision reads from the agent.
///
/// Captured once per fire so every pass of the decision sees the same world,
/// even if the world-state collaborator updates the handle mid-decision.
#[derive(Clone, Debug)]
pub struct CombatContext {
    pub agent:         AgentId,
    pub position:      Position,
    pub range:         f32,
    pub pool:          ResourcePool,
    pub attack_damage: u32,
    pub harvest_value: f32,
    pub strangers:     Vec<Stranger>,
    /// Targets in range, of a wanted kind, not already doomed by projectiles.
    pub candidates:    Vec<Candidate>,
    /// Targets in range, of a wanted kind, that projectiles already in the
    /// air will finish.  Only contest denial looks at these.
    pub doomed:        Vec<Candidate>,
}

impl CombatContext {
    /// Snapshot `agent`, keeping candidates whose kind is in `kinds` (any
    /// kind when `kinds` is empty).
    pub fn capture(agent: &dyn AgentHandle, kinds: &[EntityKind]) -> Self {
        let position = agent.position();
        let range = agent.range();
        let (doomed, candidates): (Vec<Candidate>, Vec<Candidate>) = agent
            .visible()
            .snapshot()
            .into_iter()
            .filter(|c| kinds.is_empty() || kinds.contains(&c.kind))
            .filter(|c| position.within(c.position, range))
            .partition(|c| c.doomed_by_projectiles);

        Self {
            agent: agent.id(),
            position,
            range,
            pool: agent.pool(),
            attack_damage: agent.attack_damage(),
            harvest_value: agent.harvest_value(),
            strangers: agent.strangers(),
            candidates,
            doomed,
        }
    }

    /// `true` when a non-friendly player is close enough to contest our
    /// targets: within both ranges plus `margin`.
    pub fn contested(&self, margin: f32) -> bool {
        self.strangers
            .iter()
            .filter(|s| !s.friendly)
            .any(|s| self.position.within(s.position, self.range + s.range + margin))
    }
}
