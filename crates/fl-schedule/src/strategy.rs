//! Strategies: bundles of named loops plus lifecycle hooks.
//!
//! A [`Strategy`] is built once and shared as `Arc<Strategy>`.  Its identity
//! is the [`StrategyId`] allocated at construction, so two strategies with
//! identical loops are still distinct set members.  Behavior state lives
//! inside the loop closures; the strategy itself never changes.
//!
//! # Usage
//!
//! ```rust,ignore
//! let combat = Strategy::builder("combat")
//!     .run(LoopName::Attack, Loop::new(Interval::cooldown([ATTACK])?, |agent| async move {
//!         agent.perform(Action::Attack { target }).await.map(|_| ())
//!     }))
//!     .stop(LoopName::Move)
//!     .on_apply(|agent| info!(agent = %agent.id(), "combat on"))
//!     .build();
//! ```

use std::collections::BTreeMap;
use std::fmt;
use std::future::Future;
use std::sync::Arc;

use futures::future::BoxFuture;
use futures::FutureExt;

use fl_agent::{ActionResult, SharedHandle};
use fl_core::StrategyId;

use crate::{Interval, LoopName};

// ── Loop ──────────────────────────────────────────────────────────────────────

pub type LoopFuture = BoxFuture<'static, ActionResult<()>>;

/// The work a loop performs on each fire.  Receives the handle current at
/// fire time, so a reconnect is picked up on the next fire.
pub type LoopAction = Arc<dyn Fn(SharedHandle) -> LoopFuture + Send + Sync>;

/// Lifecycle hook run against the current handle.
pub type Hook = Arc<dyn Fn(&SharedHandle) + Send + Sync>;

/// One independently scheduled unit of repeated work.
#[derive(Clone)]
pub struct Loop {
    action:   LoopAction,
    interval: Interval,
}

impl Loop {
    pub fn new<F, Fut>(interval: Interval, action: F) -> Self
    where
        F: Fn(SharedHandle) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = ActionResult<()>> + Send + 'static,
    {
        Self { action: Arc::new(move |agent| action(agent).boxed()), interval }
    }

    pub fn interval(&self) -> &Interval {
        &self.interval
    }

    /// Same action, different cadence.
    pub fn with_interval(mut self, interval: Interval) -> Self {
        self.interval = interval;
        self
    }

    /// Start one execution.  The returned future owns everything it needs.
    pub fn fire(&self, agent: SharedHandle) -> LoopFuture {
        (self.action)(agent)
    }
}

impl fmt::Debug for Loop {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Loop").field("interval", &self.interval).finish_non_exhaustive()
    }
}

/// What a strategy says about one loop name.
#[derive(Clone, Debug)]
pub enum LoopSlot {
    Run(Loop),
    /// Unregister whatever runs under this name.
    Stop,
}

// ── Strategy ──────────────────────────────────────────────────────────────────

pub struct Strategy {
    id:        StrategyId,
    label:     String,
    loops:     BTreeMap<LoopName, LoopSlot>,
    on_apply:  Option<Hook>,
    on_remove: Option<Hook>,
}

impl Strategy {
    pub fn builder(label: impl Into<String>) -> StrategyBuilder {
        StrategyBuilder::new(label)
    }

    #[inline]
    pub fn id(&self) -> StrategyId {
        self.id
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    /// Slots in `LoopName` order.
    pub fn loops(&self) -> impl Iterator<Item = (LoopName, &LoopSlot)> {
        self.loops.iter().map(|(n, s)| (*n, s))
    }

    pub fn slot(&self, name: LoopName) -> Option<&LoopSlot> {
        self.loops.get(&name)
    }

    /// Every name this strategy defines, including `Stop` markers.
    pub fn names(&self) -> impl Iterator<Item = LoopName> + '_ {
        self.loops.keys().copied()
    }

    pub fn on_apply(&self, agent: &SharedHandle) {
        if let Some(hook) = &self.on_apply {
            hook(agent);
        }
    }

    pub fn on_remove(&self, agent: &SharedHandle) {
        if let Some(hook) = &self.on_remove {
            hook(agent);
        }
    }
}

impl fmt::Debug for Strategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Strategy")
            .field("id", &self.id)
            .field("label", &self.label)
            .field("loops", &self.loops.keys().collect::<Vec<_>>())
            .finish()
    }
}

// ── StrategyBuilder ───────────────────────────────────────────────────────────

pub struct StrategyBuilder {
    label:     String,
    loops:     BTreeMap<LoopName, LoopSlot>,
    on_apply:  Option<Hook>,
    on_remove: Option<Hook>,
}

impl StrategyBuilder {
    pub fn new(label: impl Into<String>) -> Self {
        Self { label: label.into(), loops: BTreeMap::new(), on_apply: None, on_remove: None }
    }

    /// Run `lp` under `name`.  A later call for the same name wins.
    pub fn run(mut self, name: LoopName, lp: Loop) -> Self {
        self.loops.insert(name, LoopSlot::Run(lp));
        self
    }

    /// Stop whatever runs under `name` when this strategy is applied.
    pub fn stop(mut self, name: LoopName) -> Self {
        self.loops.insert(name, LoopSlot::Stop);
        self
    }

    pub fn on_apply<F>(mut self, hook: F) -> Self
    where
        F: Fn(&SharedHandle) + Send + Sync + 'static,
    {
        self.on_apply = Some(Arc::new(hook));
        self
    }

    pub fn on_remove<F>(mut self, hook: F) -> Self
    where
        F: Fn(&SharedHandle) + Send + Sync + 'static,
    {
        self.on_remove = Some(Arc::new(hook));
        self
    }

    /// Replace the interval of every defined loop that has an entry in
    /// `cadences`.  Names the strategy does not define are ignored.
    pub fn cadences(mut self, cadences: &BTreeMap<LoopName, Interval>) -> Self {
        for (name, slot) in self.loops.iter_mut() {
            if let (LoopSlot::Run(lp), Some(interval)) = (slot, cadences.get(name)) {
                lp.interval = interval.clone();
            }
        }
        self
    }

    /// Allocate a fresh [`StrategyId`] and freeze the strategy.
    pub fn build(self) -> Arc<Strategy> {
        Arc::new(Strategy {
            id:        StrategyId::next(),
            label:     self.label,
            loops:     self.loops,
            on_apply:  self.on_apply,
            on_remove: self.on_remove,
        })
    }
}
