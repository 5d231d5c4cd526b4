//! The `AgentHandle` trait — the seam between the controller and the world.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::watch;

use fl_core::{AbilityId, AgentId, Position, Role, Stranger};

use crate::{Action, ActionResult, ConnectError, Outcome, ResourcePool, VisibilityCache};

/// Reference-counted, type-erased handle.  This is what loops receive.
pub type SharedHandle = Arc<dyn AgentHandle>;

/// Connection, live state and action primitives for one controlled agent.
///
/// State getters are synchronous snapshots of whatever the world server last
/// pushed; they never block.  The only suspension points are [`perform`]
/// and [`connect`], each a network round-trip bounded by the transport's own
/// timeout.
///
/// A handle is bound to one connection.  After a disconnect the scheduler
/// discards it and builds a replacement through a
/// [`HandleFactory`][crate::HandleFactory]; nothing should hold on to an old
/// handle across reconnects except in-flight actions.
///
/// [`perform`]: Self::perform
/// [`connect`]: Self::connect
#[async_trait]
pub trait AgentHandle: Send + Sync + 'static {
    /// Logical agent identity, stable across reconnects.
    fn id(&self) -> AgentId;

    fn role(&self) -> Role;

    /// Character name, for logs and trade counterparts.
    fn name(&self) -> &str;

    /// Connected and done with the initial world sync.
    fn is_ready(&self) -> bool;

    fn is_connected(&self) -> bool;

    /// Time until `ability` can be used again; zero when ready.
    fn cooldown(&self, ability: AbilityId) -> Duration;

    /// `true` if the agent is ready and `ability` is off cooldown.
    fn can_use(&self, ability: AbilityId) -> bool {
        self.is_ready() && self.cooldown(ability).is_zero()
    }

    /// Mana-like resource spent by abilities.
    fn pool(&self) -> ResourcePool;

    /// Hit points, as a pool.
    fn health(&self) -> ResourcePool;

    fn position(&self) -> Position;

    /// Attack range in world units.
    fn range(&self) -> f32;

    /// Minimum damage of one basic attack.  Used to decide whether a hit is
    /// certainly lethal.
    fn attack_damage(&self) -> u32;

    /// Entities this agent can currently see.  Friends may delete from it.
    fn visible(&self) -> &VisibilityCache;

    /// Other players in view.
    fn strangers(&self) -> Vec<Stranger> {
        Vec::new()
    }

    /// Resource-restoring value of equipped items (0 when none).
    fn harvest_value(&self) -> f32 {
        0.0
    }

    /// A donation-granted boost is currently active.
    fn is_boosted(&self) -> bool {
        false
    }

    /// Issue one action.  Errors are transient from the scheduler's point of
    /// view.
    async fn perform(&self, action: Action) -> ActionResult<Outcome>;

    /// Open the connection and wait for the initial sync.
    async fn connect(&self) -> Result<(), ConnectError>;

    /// Close the connection.  Idempotent.
    fn disconnect(&self);

    /// Subscription to the connection flag.  Flips to `false` on disconnect.
    fn link(&self) -> watch::Receiver<bool>;
}
