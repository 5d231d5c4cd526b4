//! `Strategist` — the per-agent loop scheduler.
//!
//! # Event loop
//!
//! One `Strategist` drives one agent on a single task.  Each pass of
//! [`Strategist::run_until`]:
//!
//! ```text
//!   ① Reconnect   — if Disconnected, start building + connecting a new handle
//!   ② Fire        — pop due timers; fire or skip every live registration
//!   ③ Notify      — flush buffered link / stop notices to the observer
//!   ④ Wait        — select! over (biased, in this order):
//!                     completions   → log, re-read registry, re-arm
//!                     reconnect     → swap handle / back off / give up
//!                     link lost     → Disconnected
//!                     commands      → apply / remove / change shard / stop
//!                     next timer, backoff expiry, run deadline
//! ```
//!
//! Registrations carry a generation number.  A timer or completion whose
//! generation no longer matches the registry is dropped, so removing and
//! re-applying a loop while it is in flight never yields two chains.

use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Duration;

use futures::future::BoxFuture;
use futures::stream::FuturesUnordered;
use futures::{FutureExt, StreamExt};
use tokio::sync::{mpsc, oneshot, watch};
use tokio::time::Instant;
use tracing::{debug, error, info, warn};

use fl_agent::{ActionResult, AgentSlot, ConnectError, FactoryError, HandleFactory, SharedHandle, ShardId};
use fl_core::{AgentId, FleetConfig, SlotConflict, StrategyId};
use fl_schedule::{Loop, LoopName, LoopSlot, ScheduleError, ScheduleResult, Strategy, TimerQueue};

use crate::{backoff_for, LinkState, SchedulerError, SchedulerObserver, SchedulerResult};

// ── Internal types ────────────────────────────────────────────────────────────

struct RegisteredLoop {
    lp:         Loop,
    owner:      StrategyId,
    generation: u64,
}

struct Completion {
    name:       LoopName,
    generation: u64,
    result:     ActionResult<()>,
}

enum ReconnectError {
    Factory(FactoryError),
    Connect(ConnectError),
}

type ReconnectFuture = BoxFuture<'static, Result<SharedHandle, ReconnectError>>;

/// Events raised outside the run loop, delivered at the next pass.
enum Notice {
    Link(LinkState, Duration),
    Stop(Duration),
}

pub(crate) enum Command {
    Apply(Arc<Strategy>, oneshot::Sender<ScheduleResult<()>>),
    Remove(StrategyId, oneshot::Sender<ScheduleResult<()>>),
    ChangeShard(ShardId, oneshot::Sender<ScheduleResult<()>>),
    Stop(oneshot::Sender<()>),
    Status(oneshot::Sender<StrategistStatus>),
}

/// Snapshot returned by [`StrategistHandle::status`].
#[derive(Clone, Debug)]
pub struct StrategistStatus {
    pub agent:   AgentId,
    pub shard:   ShardId,
    pub link:    LinkState,
    pub loops:   Vec<LoopName>,
    pub held:    Vec<StrategyId>,
    pub stopped: bool,
}

// ── Strategist ────────────────────────────────────────────────────────────────

/// Owns one agent's loop registry, timer queue and connection state.
///
/// Construct with [`StrategistBuilder`][crate::StrategistBuilder].  The
/// direct methods (`apply`, `remove`, `change_shard`, `stop`) are for the
/// owner of the value; once it runs on its own task, use the paired
/// [`StrategistHandle`].
pub struct Strategist {
    slot:     Arc<AgentSlot>,
    factory:  Arc<dyn HandleFactory>,
    config:   FleetConfig,

    registry: BTreeMap<LoopName, RegisteredLoop>,
    held:     Vec<Arc<Strategy>>,
    timers:   TimerQueue,
    in_flight: FuturesUnordered<BoxFuture<'static, Completion>>,
    next_generation: u64,

    link:      LinkState,
    link_rx:   Option<watch::Receiver<bool>>,
    reconnect: Option<ReconnectFuture>,
    /// A shard change is in progress; connect failures retry on the short
    /// fixed period.
    switching: bool,

    stopped:  bool,
    commands: mpsc::Receiver<Command>,
    commands_open: bool,
    notices:  Vec<Notice>,
    epoch:    Instant,
}

impl Strategist {
    pub(crate) fn new(
        slot:     Arc<AgentSlot>,
        factory:  Arc<dyn HandleFactory>,
        config:   FleetConfig,
        commands: mpsc::Receiver<Command>,
    ) -> Self {
        let handle = slot.current();
        let (link, link_rx) = if handle.is_connected() {
            (LinkState::Connected, Some(handle.link()))
        } else {
            (LinkState::Disconnected, None)
        };
        Self {
            slot,
            factory,
            config,
            registry: BTreeMap::new(),
            held: Vec::new(),
            timers: TimerQueue::new(),
            in_flight: FuturesUnordered::new(),
            next_generation: 0,
            link,
            link_rx,
            reconnect: None,
            switching: false,
            stopped: false,
            commands,
            commands_open: true,
            notices: Vec::new(),
            epoch: Instant::now(),
        }
    }

    // ── Accessors ─────────────────────────────────────────────────────────

    pub fn agent(&self) -> AgentId {
        self.slot.id()
    }

    pub fn slot(&self) -> &Arc<AgentSlot> {
        &self.slot
    }

    pub fn link_state(&self) -> LinkState {
        self.link
    }

    pub fn is_stopped(&self) -> bool {
        self.stopped
    }

    /// Registered loop names in `LoopName` order.
    pub fn loop_names(&self) -> Vec<LoopName> {
        self.registry.keys().copied().collect()
    }

    /// Held strategies in application order.
    pub fn held(&self) -> Vec<StrategyId> {
        self.held.iter().map(|s| s.id()).collect()
    }

    pub fn is_held(&self, id: StrategyId) -> bool {
        self.held.iter().any(|s| s.id() == id)
    }

    /// Which strategy currently owns `name`.
    pub fn owner_of(&self, name: LoopName) -> Option<StrategyId> {
        self.registry.get(&name).map(|r| r.owner)
    }

    /// Pending deadline of `name`; `None` while in flight or unregistered.
    pub fn next_fire(&self, name: LoopName) -> Option<Instant> {
        self.timers.deadline_of(name)
    }

    pub fn in_flight(&self) -> usize {
        self.in_flight.len()
    }

    pub fn status(&self) -> StrategistStatus {
        StrategistStatus {
            agent:   self.slot.id(),
            shard:   self.slot.shard(),
            link:    self.link,
            loops:   self.loop_names(),
            held:    self.held(),
            stopped: self.stopped,
        }
    }

    fn elapsed(&self) -> Duration {
        Instant::now().saturating_duration_since(self.epoch)
    }

    // ── Strategy lifecycle ────────────────────────────────────────────────

    /// Merge `strategy` into the registry and run its `on_apply` hook.
    ///
    /// * `Stop` slots unregister the name and cancel its timer.
    /// * A name already registered keeps its timer; only the definition is
    ///   replaced, so the next fire runs the new action on the old cadence.
    /// * A new name is registered and armed to fire immediately.
    ///
    /// Conflicts with names owned by another held strategy follow
    /// `scheduler.slot_conflict`.
    pub fn apply(&mut self, strategy: Arc<Strategy>) -> ScheduleResult<()> {
        if self.stopped {
            return Err(ScheduleError::Stopped);
        }
        let id = strategy.id();

        let conflicts: Vec<(LoopName, StrategyId)> = strategy
            .loops()
            .filter(|(_, slot)| matches!(slot, LoopSlot::Run(_)))
            .filter_map(|(name, _)| self.owner_of(name).map(|owner| (name, owner)))
            .filter(|(_, owner)| *owner != id)
            .collect();

        match self.config.scheduler.slot_conflict {
            SlotConflict::Overwrite => {}
            SlotConflict::Reject => {
                if let Some(&(name, owner)) = conflicts.first() {
                    return Err(ScheduleError::SlotTaken { name, owner });
                }
            }
            SlotConflict::RemovePrevious => {
                let mut owners: Vec<StrategyId> = conflicts.iter().map(|(_, o)| *o).collect();
                owners.sort_unstable();
                owners.dedup();
                for owner in owners {
                    if self.is_held(owner) {
                        self.remove(owner)?;
                    }
                }
            }
        }

        let now = Instant::now();
        for (name, slot) in strategy.loops() {
            match slot {
                LoopSlot::Stop => {
                    if self.registry.remove(&name).is_some() {
                        debug!(agent = %self.slot.id(), name = %name, "loop stopped");
                    }
                    self.timers.cancel(name);
                }
                LoopSlot::Run(lp) => match self.registry.get_mut(&name) {
                    Some(reg) => {
                        reg.lp = lp.clone();
                        reg.owner = id;
                    }
                    None => {
                        self.next_generation += 1;
                        let generation = self.next_generation;
                        self.registry.insert(name, RegisteredLoop { lp: lp.clone(), owner: id, generation });
                        self.timers.arm(now, name, generation);
                    }
                },
            }
        }

        if !self.is_held(id) {
            self.held.push(Arc::clone(&strategy));
        }
        strategy.on_apply(&self.slot.current());

        info!(
            agent = %self.slot.id(),
            strategy = strategy.label(),
            loops = self.registry.len(),
            "strategy applied"
        );
        Ok(())
    }

    /// Unregister every name `id` defines and run its `on_remove` hook.
    ///
    /// A name a later strategy overwrote is unregistered too; that strategy
    /// stays held without it.
    pub fn remove(&mut self, id: StrategyId) -> ScheduleResult<()> {
        let Some(pos) = self.held.iter().position(|s| s.id() == id) else {
            return Err(ScheduleError::NotHeld(id));
        };
        let strategy = self.held.remove(pos);

        for name in strategy.names() {
            self.registry.remove(&name);
            self.timers.cancel(name);
        }
        strategy.on_remove(&self.slot.current());

        info!(
            agent = %self.slot.id(),
            strategy = strategy.label(),
            loops = self.registry.len(),
            "strategy removed"
        );
        Ok(())
    }

    // ── Connection control ────────────────────────────────────────────────

    /// Reconnect the same agent on `shard`.  Connect failures during the
    /// switch retry every `reconnect.shard_switch_retry_ms`.
    pub fn change_shard(&mut self, shard: ShardId) -> ScheduleResult<()> {
        if self.stopped {
            return Err(ScheduleError::Stopped);
        }
        info!(agent = %self.slot.id(), from = %self.slot.shard(), to = %shard, "changing shard");
        self.slot.set_shard(shard);
        self.switching = true;
        self.link_rx = None;
        self.reconnect = None;
        self.slot.current().disconnect();
        self.set_link(LinkState::Disconnected);
        Ok(())
    }

    /// Stop scheduling for good.
    ///
    /// Drops the disconnect subscription, cancels every timer and any
    /// reconnect attempt, then disconnects the handle.  Actions already in
    /// flight run to completion but are not rescheduled.
    pub fn stop(&mut self) {
        if self.stopped {
            return;
        }
        self.slot.current().disconnect();
        if self.link != LinkState::PermanentlyFailed {
            self.set_link(LinkState::Disconnected);
        }
        self.halt();
        info!(agent = %self.slot.id(), in_flight = self.in_flight.len(), "strategist stopped");
    }

    fn halt(&mut self) {
        self.stopped = true;
        self.link_rx = None;
        self.reconnect = None;
        self.timers.clear();
        let at = self.elapsed();
        self.notices.push(Notice::Stop(at));
    }

    fn set_link(&mut self, state: LinkState) {
        if self.link == state {
            return;
        }
        debug!(agent = %self.slot.id(), from = %self.link, to = %state, "link state");
        self.link = state;
        let at = self.elapsed();
        self.notices.push(Notice::Link(state, at));
    }

    fn begin_reconnect(&mut self) {
        let factory = Arc::clone(&self.factory);
        let identity = self.slot.identity().clone();
        let shard = self.slot.shard();
        let role = self.slot.role();
        info!(agent = %self.slot.id(), shard = %shard, "reconnecting");

        self.set_link(LinkState::Reconnecting);
        self.reconnect = Some(
            async move {
                let handle = factory.build(role, &identity, &shard).map_err(ReconnectError::Factory)?;
                handle.connect().await.map_err(ReconnectError::Connect)?;
                Ok(handle)
            }
            .boxed(),
        );
    }

    fn finish_reconnect<O: SchedulerObserver>(
        &mut self,
        outcome:  Result<SharedHandle, ReconnectError>,
        observer: &mut O,
    ) {
        self.reconnect = None;
        let agent = self.slot.id();

        match outcome {
            Ok(handle) => {
                self.slot.replace(Arc::clone(&handle));
                self.link_rx = Some(handle.link());
                self.switching = false;
                self.set_link(LinkState::Connected);
                for strategy in &self.held {
                    strategy.on_apply(&handle);
                }
                info!(agent = %agent, shard = %self.slot.shard(), strategies = self.held.len(), "reconnected");
                self.flush(observer);
                observer.on_reattach(agent, &self.held(), self.elapsed());
            }
            Err(ReconnectError::Connect(e)) => {
                let wait = if self.switching {
                    Duration::from_millis(self.config.reconnect.shard_switch_retry_ms)
                } else {
                    backoff_for(e.reason(), &self.config.reconnect)
                };
                warn!(agent = %agent, error = %e, wait_ms = wait.as_millis() as u64, "connect failed");
                self.set_link(LinkState::Backoff { until: Instant::now() + wait });
            }
            Err(ReconnectError::Factory(e)) => {
                error!(agent = %agent, error = %e, "cannot build a replacement handle; giving up");
                self.set_link(LinkState::PermanentlyFailed);
                self.halt();
            }
        }
    }

    fn link_lost(&mut self) {
        warn!(agent = %self.slot.id(), "connection lost");
        self.link_rx = None;
        self.slot.current().disconnect();
        self.set_link(LinkState::Disconnected);
    }

    // ── Driver ────────────────────────────────────────────────────────────

    fn fire_due<O: SchedulerObserver>(&mut self, observer: &mut O) {
        let now = Instant::now();
        let agent = self.slot.id();
        let floor = self.config.scheduler.cooldown_floor();

        for entry in self.timers.pop_due(now) {
            let Some(reg) = self.registry.get(&entry.name) else { continue };
            if reg.generation != entry.generation || self.stopped {
                continue;
            }
            let handle = self.slot.current();
            let at = now.saturating_duration_since(self.epoch);

            if !handle.is_ready() {
                let delay = reg.lp.interval().next_delay(handle.as_ref(), floor);
                self.timers.arm(now + delay, entry.name, entry.generation);
                observer.on_skip(agent, entry.name, at);
                continue;
            }

            let name = entry.name;
            let generation = entry.generation;
            let action = reg.lp.fire(handle);
            self.in_flight.push(
                async move { Completion { name, generation, result: action.await } }.boxed(),
            );
            observer.on_fire(agent, name, at);
        }
    }

    fn complete<O: SchedulerObserver>(&mut self, done: Completion, observer: &mut O) {
        let agent = self.slot.id();
        if let Err(e) = &done.result {
            warn!(agent = %agent, name = %done.name, error = %e, "loop action failed");
        }
        observer.on_complete(agent, done.name, self.elapsed(), &done.result);

        if self.stopped {
            return;
        }
        let Some(reg) = self.registry.get(&done.name) else { return };
        if reg.generation != done.generation {
            return;
        }
        let delay = reg
            .lp
            .interval()
            .next_delay(self.slot.current().as_ref(), self.config.scheduler.cooldown_floor());
        self.timers.arm(Instant::now() + delay, done.name, done.generation);
        observer.on_reschedule(agent, done.name, delay);
    }

    fn command(&mut self, command: Command) {
        match command {
            Command::Apply(strategy, reply) => {
                let _ = reply.send(self.apply(strategy));
            }
            Command::Remove(id, reply) => {
                let _ = reply.send(self.remove(id));
            }
            Command::ChangeShard(shard, reply) => {
                let _ = reply.send(self.change_shard(shard));
            }
            Command::Stop(reply) => {
                self.stop();
                let _ = reply.send(());
            }
            Command::Status(reply) => {
                let _ = reply.send(self.status());
            }
        }
    }

    fn flush<O: SchedulerObserver>(&mut self, observer: &mut O) {
        let agent = self.slot.id();
        for notice in self.notices.drain(..) {
            match notice {
                Notice::Link(state, at) => observer.on_link(agent, state, at),
                Notice::Stop(at) => observer.on_stop(agent, at),
            }
        }
    }

    /// Drive until stopped and every in-flight action has completed.
    pub async fn run<O: SchedulerObserver>(&mut self, observer: &mut O) {
        self.run_until(None, observer).await;
    }

    /// Drive for `duration` of tokio time, or until stopped and drained.
    pub async fn run_for<O: SchedulerObserver>(&mut self, duration: Duration, observer: &mut O) {
        self.run_until(Some(Instant::now() + duration), observer).await;
    }

    pub async fn run_until<O: SchedulerObserver>(&mut self, deadline: Option<Instant>, observer: &mut O) {
        loop {
            if self.link == LinkState::Disconnected && !self.stopped && self.reconnect.is_none() {
                self.begin_reconnect();
            }
            self.fire_due(observer);
            self.flush(observer);

            if self.stopped && self.in_flight.is_empty() {
                break;
            }
            if deadline.is_some_and(|d| Instant::now() >= d) {
                break;
            }

            let next_timer = self.timers.next_deadline();
            let backoff = match self.link {
                LinkState::Backoff { until } if !self.stopped => Some(until),
                _ => None,
            };
            let watching = self.link.is_connected() && self.link_rx.is_some();

            tokio::select! {
                biased;

                Some(done) = self.in_flight.next(), if !self.in_flight.is_empty() => {
                    self.complete(done, observer);
                }
                outcome = attempt(&mut self.reconnect), if self.reconnect.is_some() => {
                    self.finish_reconnect(outcome, observer);
                }
                _ = lost(&mut self.link_rx), if watching => {
                    self.link_lost();
                }
                command = self.commands.recv(), if self.commands_open => match command {
                    Some(command) => self.command(command),
                    None => self.commands_open = false,
                },
                _ = sleep_opt(next_timer), if next_timer.is_some() => {}
                _ = sleep_opt(backoff), if backoff.is_some() => {
                    self.begin_reconnect();
                }
                _ = sleep_opt(deadline), if deadline.is_some() => {}
                else => break,
            }
        }
        self.flush(observer);
    }
}

// ── select! helpers ───────────────────────────────────────────────────────────

async fn sleep_opt(at: Option<Instant>) {
    match at {
        Some(at) => tokio::time::sleep_until(at).await,
        None => std::future::pending().await,
    }
}

async fn attempt(reconnect: &mut Option<ReconnectFuture>) -> Result<SharedHandle, ReconnectError> {
    match reconnect {
        Some(fut) => fut.await,
        None => std::future::pending().await,
    }
}

/// Resolves once the link flag reads `false` or its sender is gone.
async fn lost(link: &mut Option<watch::Receiver<bool>>) {
    let Some(rx) = link else {
        return std::future::pending().await;
    };
    loop {
        if !*rx.borrow_and_update() {
            return;
        }
        if rx.changed().await.is_err() {
            return;
        }
    }
}

// ── StrategistHandle ──────────────────────────────────────────────────────────

/// Cloneable command channel to a running [`Strategist`].
///
/// Every method fails with [`SchedulerError::Closed`] once the strategist's
/// task has exited.
#[derive(Clone, Debug)]
pub struct StrategistHandle {
    agent: AgentId,
    tx:    mpsc::Sender<Command>,
}

impl StrategistHandle {
    pub(crate) fn new(agent: AgentId, tx: mpsc::Sender<Command>) -> Self {
        Self { agent, tx }
    }

    pub fn agent(&self) -> AgentId {
        self.agent
    }

    async fn request<T>(
        &self,
        make: impl FnOnce(oneshot::Sender<T>) -> Command,
    ) -> SchedulerResult<T> {
        let (reply, rx) = oneshot::channel();
        self.tx.send(make(reply)).await.map_err(|_| SchedulerError::Closed)?;
        rx.await.map_err(|_| SchedulerError::Closed)
    }

    pub async fn apply(&self, strategy: Arc<Strategy>) -> SchedulerResult<()> {
        Ok(self.request(|reply| Command::Apply(strategy, reply)).await??)
    }

    pub async fn remove(&self, id: StrategyId) -> SchedulerResult<()> {
        Ok(self.request(|reply| Command::Remove(id, reply)).await??)
    }

    pub async fn change_shard(&self, shard: ShardId) -> SchedulerResult<()> {
        Ok(self.request(|reply| Command::ChangeShard(shard, reply)).await??)
    }

    pub async fn stop(&self) -> SchedulerResult<()> {
        self.request(Command::Stop).await
    }

    pub async fn status(&self) -> SchedulerResult<StrategistStatus> {
        self.request(Command::Status).await
    }
}

impl std::fmt::Debug for Command {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Command::Apply(..)       => "Apply",
            Command::Remove(..)      => "Remove",
            Command::ChangeShard(..) => "ChangeShard",
            Command::Stop(..)        => "Stop",
            Command::Status(..)      => "Status",
        };
        f.write_str(name)
    }
}
