//! Scheduler observer trait for logging, recording and tests.

use std::time::Duration;

use fl_agent::ActionResult;
use fl_core::{AgentId, StrategyId};
use fl_schedule::LoopName;

use crate::LinkState;

/// Callbacks invoked by [`Strategist::run`][crate::Strategist::run] at key
/// points of every loop chain and link transition.
///
/// `at` is the time elapsed since the strategist was built, on the tokio
/// clock, so a paused test runtime yields exact values.
///
/// All methods have default no-op implementations so implementors only need
/// to override what they care about.
///
/// # Example: fire counter
///
/// ```rust,ignore
/// #[derive(Default)]
/// struct Counter(BTreeMap<LoopName, usize>);
///
/// impl SchedulerObserver for Counter {
///     fn on_fire(&mut self, _agent: AgentId, name: LoopName, _at: Duration) {
///         *self.0.entry(name).or_default() += 1;
///     }
/// }
/// ```
pub trait SchedulerObserver {
    /// A loop's action has been started.
    fn on_fire(&mut self, _agent: AgentId, _name: LoopName, _at: Duration) {}

    /// A loop was due but the agent was not ready; it is rescheduled without
    /// running.
    fn on_skip(&mut self, _agent: AgentId, _name: LoopName, _at: Duration) {}

    /// A loop's action finished, successfully or not.
    fn on_complete(
        &mut self,
        _agent:  AgentId,
        _name:   LoopName,
        _at:     Duration,
        _result: &ActionResult<()>,
    ) {}

    /// A loop was re-armed `delay` from now.
    fn on_reschedule(&mut self, _agent: AgentId, _name: LoopName, _delay: Duration) {}

    /// The connection moved to `state`.
    fn on_link(&mut self, _agent: AgentId, _state: LinkState, _at: Duration) {}

    /// Every held strategy's `on_apply` was re-run against a fresh handle.
    fn on_reattach(&mut self, _agent: AgentId, _strategies: &[StrategyId], _at: Duration) {}

    /// The strategist was stopped.
    fn on_stop(&mut self, _agent: AgentId, _at: Duration) {}
}

/// A [`SchedulerObserver`] that does nothing.
pub struct NoopObserver;

impl SchedulerObserver for NoopObserver {}
