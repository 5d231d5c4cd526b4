//! Scripted in-memory agents for tests and demos.
//!
//! [`MockHandle`] implements [`AgentHandle`] without any network: state is
//! set directly, every [`Action`] is recorded, and failures (action or
//! connect) are scripted in advance.  Cooldowns are tracked against
//! `tokio::time::Instant`, so a paused test runtime drives them on a virtual
//! clock.
//!
//! # Usage
//!
//! ```rust,ignore
//! let bot = MockHandle::builder(AgentId(0), Role::Mage)
//!     .pool(ResourcePool::new(400, 500))
//!     .range(120.0)
//!     .build();
//! bot.set_cooldown(ATTACK, Duration::from_millis(300));
//! bot.fail_next(ActionError::Rejected("too far".into()));
//! ```

use std::collections::{HashMap, VecDeque};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use parking_lot::Mutex;
use tokio::sync::watch;
use tokio::time::Instant;
use tracing::trace;

use fl_core::{AbilityId, AgentId, Position, Role, Stranger};

use crate::{
    Action, ActionError, ActionResult, AgentHandle, AgentIdentity, ConnectError, FactoryError,
    FactoryResult, HandleFactory, Outcome, ResourcePool, SharedHandle, ShardId, VisibilityCache,
};

// ── State ─────────────────────────────────────────────────────────────────────

struct MockState {
    ready:           bool,
    connected:       bool,
    ready_at:        HashMap<AbilityId, Instant>,
    cooldown_on_use: HashMap<AbilityId, Duration>,
    pool:            ResourcePool,
    health:          ResourcePool,
    position:        Position,
    range:           f32,
    attack_damage:   u32,
    attack_ability:  Option<AbilityId>,
    strangers:       Vec<Stranger>,
    harvest_value:   f32,
    boosted:         bool,
    performed:       Vec<Action>,
    failures:        VecDeque<ActionError>,
    fail_always:     Option<ActionError>,
    connect_results: VecDeque<Result<(), ConnectError>>,
    connect_calls:   usize,
    disconnects:     usize,
}

// ── MockHandle ────────────────────────────────────────────────────────────────

pub struct MockHandle {
    id:      AgentId,
    role:    Role,
    name:    String,
    latency: Duration,
    visible: VisibilityCache,
    link:    watch::Sender<bool>,
    state:   Mutex<MockState>,
}

impl MockHandle {
    pub fn builder(id: AgentId, role: Role) -> MockHandleBuilder {
        MockHandleBuilder::new(id, role)
    }

    // ── Scripting ─────────────────────────────────────────────────────────

    /// Put `ability` on cooldown for `remaining` from now.
    pub fn set_cooldown(&self, ability: AbilityId, remaining: Duration) {
        self.state.lock().ready_at.insert(ability, Instant::now() + remaining);
    }

    /// Every successful use of `ability` puts it on cooldown for `period`.
    pub fn set_cooldown_on_use(&self, ability: AbilityId, period: Duration) {
        self.state.lock().cooldown_on_use.insert(ability, period);
    }

    pub fn set_ready(&self, ready: bool) {
        self.state.lock().ready = ready;
    }

    pub fn set_pool(&self, pool: ResourcePool) {
        self.state.lock().pool = pool;
    }

    pub fn set_health(&self, health: ResourcePool) {
        self.state.lock().health = health;
    }

    pub fn set_position(&self, position: Position) {
        self.state.lock().position = position;
    }

    pub fn set_strangers(&self, strangers: Vec<Stranger>) {
        self.state.lock().strangers = strangers;
    }

    pub fn set_boosted(&self, boosted: bool) {
        self.state.lock().boosted = boosted;
    }

    /// Fail the next action with `error`.  Queued failures are consumed in
    /// order.
    pub fn fail_next(&self, error: ActionError) {
        self.state.lock().failures.push_back(error);
    }

    /// Fail every action with `error` until cleared with `None`.
    pub fn fail_always(&self, error: Option<ActionError>) {
        self.state.lock().fail_always = error;
    }

    /// Queue the result of the next `connect()` call.  Unscripted calls
    /// succeed.
    pub fn push_connect_result(&self, result: Result<(), ConnectError>) {
        self.state.lock().connect_results.push_back(result);
    }

    /// Drop the connection as if the server had closed it.
    pub fn simulate_disconnect(&self) {
        self.mark_disconnected();
    }

    /// Credit `amount` to the pool (capped at max).  Returns what fit.
    pub fn receive(&self, amount: u32) -> u32 {
        self.state.lock().pool.refill(amount)
    }

    // ── Inspection ────────────────────────────────────────────────────────

    /// Every action attempted so far, including failed ones.
    pub fn performed(&self) -> Vec<Action> {
        self.state.lock().performed.clone()
    }

    pub fn connect_calls(&self) -> usize {
        self.state.lock().connect_calls
    }

    /// How many times `disconnect()` was called on this handle.
    pub fn disconnect_calls(&self) -> usize {
        self.state.lock().disconnects
    }

    fn mark_disconnected(&self) {
        {
            let mut s = self.state.lock();
            s.connected = false;
            s.ready = false;
        }
        self.link.send_replace(false);
    }

    /// Apply the effects of an accepted action to local state.
    fn apply(&self, s: &mut MockState, action: &Action) -> ActionResult<Outcome> {
        let cost = action.resource_cost();
        if cost > s.pool.current {
            return Err(ActionError::InsufficientResource { needed: cost, available: s.pool.current });
        }
        s.pool.spend(cost);

        match action {
            Action::Attack { target } => {
                if let Some(mut c) = self.visible.get(*target) {
                    c.hp = c.hp.saturating_sub(s.attack_damage);
                    c.targeted = true;
                    if c.hp == 0 {
                        self.visible.remove(*target);
                    } else {
                        self.visible.upsert(c);
                    }
                }
            }
            Action::AreaEffect { targets, .. } => {
                for (id, _) in targets {
                    self.visible.remove(*id);
                }
            }
            Action::Move { to } => s.position = *to,
            _ => {}
        }

        let gate = match action {
            Action::Attack { .. } => s.attack_ability,
            other => other.ability(),
        };
        if let Some(ability) = gate {
            if let Some(period) = s.cooldown_on_use.get(&ability).copied() {
                s.ready_at.insert(ability, Instant::now() + period);
            }
        }
        Ok(Outcome { consumed: cost })
    }
}

#[async_trait]
impl AgentHandle for MockHandle {
    fn id(&self) -> AgentId {
        self.id
    }

    fn role(&self) -> Role {
        self.role
    }

    fn name(&self) -> &str {
        &self.name
    }

    fn is_ready(&self) -> bool {
        let s = self.state.lock();
        s.ready && s.connected
    }

    fn is_connected(&self) -> bool {
        self.state.lock().connected
    }

    fn cooldown(&self, ability: AbilityId) -> Duration {
        self.state
            .lock()
            .ready_at
            .get(&ability)
            .map(|at| at.saturating_duration_since(Instant::now()))
            .unwrap_or(Duration::ZERO)
    }

    fn pool(&self) -> ResourcePool {
        self.state.lock().pool
    }

    fn health(&self) -> ResourcePool {
        self.state.lock().health
    }

    fn position(&self) -> Position {
        self.state.lock().position
    }

    fn range(&self) -> f32 {
        self.state.lock().range
    }

    fn attack_damage(&self) -> u32 {
        self.state.lock().attack_damage
    }

    fn visible(&self) -> &VisibilityCache {
        &self.visible
    }

    fn strangers(&self) -> Vec<Stranger> {
        self.state.lock().strangers.clone()
    }

    fn harvest_value(&self) -> f32 {
        self.state.lock().harvest_value
    }

    fn is_boosted(&self) -> bool {
        self.state.lock().boosted
    }

    async fn perform(&self, action: Action) -> ActionResult<Outcome> {
        if !self.latency.is_zero() {
            tokio::time::sleep(self.latency).await;
        }

        let mut s = self.state.lock();
        s.performed.push(action.clone());
        trace!(agent = %self.id, action = action.label(), "mock perform");

        if !s.connected {
            return Err(ActionError::Disconnected);
        }
        if let Some(err) = s.failures.pop_front() {
            return Err(err);
        }
        if let Some(err) = s.fail_always.clone() {
            return Err(err);
        }
        if let Some(ability) = action.ability() {
            let remaining = s
                .ready_at
                .get(&ability)
                .map(|at| at.saturating_duration_since(Instant::now()))
                .unwrap_or(Duration::ZERO);
            if !remaining.is_zero() {
                return Err(ActionError::OnCooldown(ability));
            }
        }
        self.apply(&mut s, &action)
    }

    async fn connect(&self) -> Result<(), ConnectError> {
        if !self.latency.is_zero() {
            tokio::time::sleep(self.latency).await;
        }
        let result = {
            let mut s = self.state.lock();
            s.connect_calls += 1;
            let result = s.connect_results.pop_front().unwrap_or(Ok(()));
            if result.is_ok() {
                s.connected = true;
                s.ready = true;
            }
            result
        };
        if result.is_ok() {
            self.link.send_replace(true);
        }
        result
    }

    fn disconnect(&self) {
        self.state.lock().disconnects += 1;
        self.mark_disconnected();
    }

    fn link(&self) -> watch::Receiver<bool> {
        self.link.subscribe()
    }
}

// ── MockHandleBuilder ─────────────────────────────────────────────────────────

/// Fluent builder for [`MockHandle`].
///
/// Defaults: connected and ready, empty 0/0 pool, 100/100 health, map 0
/// origin, range 100, attack damage 10, no latency.
#[derive(Clone)]
pub struct MockHandleBuilder {
    id:             AgentId,
    role:           Role,
    name:           String,
    connected:      bool,
    pool:           ResourcePool,
    health:         ResourcePool,
    position:       Position,
    range:          f32,
    attack_damage:  u32,
    attack_ability: Option<AbilityId>,
    harvest_value:  f32,
    latency:        Duration,
}

impl MockHandleBuilder {
    pub fn new(id: AgentId, role: Role) -> Self {
        Self {
            id,
            role,
            name:           format!("agent{}", id.0),
            connected:      true,
            pool:           ResourcePool::default(),
            health:         ResourcePool::new(100, 100),
            position:       Position::new(0, 0.0, 0.0),
            range:          100.0,
            attack_damage:  10,
            attack_ability: None,
            harvest_value:  0.0,
            latency:        Duration::ZERO,
        }
    }

    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// Start connected (default) or waiting for `connect()`.
    pub fn connected(mut self, connected: bool) -> Self {
        self.connected = connected;
        self
    }

    pub fn pool(mut self, pool: ResourcePool) -> Self {
        self.pool = pool;
        self
    }

    pub fn health(mut self, health: ResourcePool) -> Self {
        self.health = health;
        self
    }

    pub fn position(mut self, position: Position) -> Self {
        self.position = position;
        self
    }

    pub fn range(mut self, range: f32) -> Self {
        self.range = range;
        self
    }

    pub fn attack_damage(mut self, damage: u32) -> Self {
        self.attack_damage = damage;
        self
    }

    /// Ability whose cooldown gates `Action::Attack`.
    pub fn attack_ability(mut self, ability: AbilityId) -> Self {
        self.attack_ability = Some(ability);
        self
    }

    pub fn harvest_value(mut self, value: f32) -> Self {
        self.harvest_value = value;
        self
    }

    /// Simulated round-trip for `perform` and `connect`.
    pub fn latency(mut self, latency: Duration) -> Self {
        self.latency = latency;
        self
    }

    pub fn build(self) -> Arc<MockHandle> {
        let (link, _) = watch::channel(self.connected);
        Arc::new(MockHandle {
            id:      self.id,
            role:    self.role,
            name:    self.name,
            latency: self.latency,
            visible: VisibilityCache::new(),
            link,
            state: Mutex::new(MockState {
                ready:           self.connected,
                connected:       self.connected,
                ready_at:        HashMap::new(),
                cooldown_on_use: HashMap::new(),
                pool:            self.pool,
                health:          self.health,
                position:        self.position,
                range:           self.range,
                attack_damage:   self.attack_damage,
                attack_ability:  self.attack_ability,
                strangers:       Vec::new(),
                harvest_value:   self.harvest_value,
                boosted:         false,
                performed:       Vec::new(),
                failures:        VecDeque::new(),
                fail_always:     None,
                connect_results: VecDeque::new(),
                connect_calls:   0,
                disconnects:     0,
            }),
        })
    }
}

// ── MockFactory ───────────────────────────────────────────────────────────────

/// A [`HandleFactory`] that stamps out [`MockHandle`]s from a template.
///
/// Built handles take their id from the identity, start disconnected, and
/// are kept so tests can inspect or script them.  Scripted connect results
/// are handed out one per build.
pub struct MockFactory {
    template:       MockHandleBuilder,
    supported:      Vec<Role>,
    connect_script: Mutex<VecDeque<Result<(), ConnectError>>>,
    built:          Mutex<Vec<(ShardId, Arc<MockHandle>)>>,
}

impl MockFactory {
    /// A factory supporting every role.
    pub fn new(template: MockHandleBuilder) -> Self {
        Self {
            template,
            supported:      Role::ALL.to_vec(),
            connect_script: Mutex::new(VecDeque::new()),
            built:          Mutex::new(Vec::new()),
        }
    }

    /// Restrict the roles this factory can build.
    pub fn supporting(mut self, roles: &[Role]) -> Self {
        self.supported = roles.to_vec();
        self
    }

    /// Queue connect results; the n-th built handle gets the n-th result.
    pub fn script_connects<I>(&self, results: I)
    where
        I: IntoIterator<Item = Result<(), ConnectError>>,
    {
        self.connect_script.lock().extend(results);
    }

    pub fn built(&self) -> Vec<Arc<MockHandle>> {
        self.built.lock().iter().map(|(_, h)| Arc::clone(h)).collect()
    }

    pub fn last_built(&self) -> Option<Arc<MockHandle>> {
        self.built.lock().last().map(|(_, h)| Arc::clone(h))
    }

    /// Shards requested so far, in build order.
    pub fn shards(&self) -> Vec<ShardId> {
        self.built.lock().iter().map(|(s, _)| s.clone()).collect()
    }
}

impl HandleFactory for MockFactory {
    fn build(
        &self,
        role:     Role,
        identity: &AgentIdentity,
        shard:    &ShardId,
    ) -> FactoryResult<SharedHandle> {
        if !self.supported.contains(&role) {
            return Err(FactoryError::UnsupportedRole(role));
        }
        let mut template = self.template.clone();
        template.id = identity.agent;
        template.role = role;
        let handle = template.name(identity.character.clone()).connected(false).build();
        if let Some(result) = self.connect_script.lock().pop_front() {
            handle.push_connect_result(result);
        }
        self.built.lock().push((shard.clone(), Arc::clone(&handle)));
        let shared: SharedHandle = handle;
        Ok(shared)
    }
}
