//! Loop cadence: fixed periods and cooldown-driven delays.
//!
//! # Cadence model
//!
//! A loop is re-armed only after its action completes, so the delay is always
//! measured from completion, never from the previous fire:
//!
//! ```text
//! Fixed(d)        next_delay = d
//! Cooldown(set)   next_delay = max(floor, min over set of handle.cooldown(a))
//! ```
//!
//! The floor keeps a stale zero cooldown from turning into a tight loop.

use std::collections::BTreeSet;
use std::time::Duration;

use fl_agent::AgentHandle;
use fl_core::AbilityId;

use crate::{ScheduleError, ScheduleResult};

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Interval {
    /// Constant period after each completion.
    Fixed(Duration),
    /// Fire again when the first of these abilities comes off cooldown.
    /// Never empty; build through [`Interval::cooldown`].
    Cooldown(BTreeSet<AbilityId>),
}

impl Interval {
    pub fn fixed_ms(ms: u64) -> Self {
        Interval::Fixed(Duration::from_millis(ms))
    }

    /// Cooldown-driven interval over `abilities`.  Fails on an empty set.
    pub fn cooldown<I>(abilities: I) -> ScheduleResult<Self>
    where
        I: IntoIterator<Item = AbilityId>,
    {
        let set: BTreeSet<AbilityId> = abilities.into_iter().collect();
        if set.is_empty() {
            return Err(ScheduleError::EmptyCooldownSet);
        }
        Ok(Interval::Cooldown(set))
    }

    /// Delay before the next fire, queried against `handle` right now.
    pub fn next_delay(&self, handle: &dyn AgentHandle, floor: Duration) -> Duration {
        match self {
            Interval::Fixed(d) => *d,
            Interval::Cooldown(set) => cooldown_delay(floor, set.iter().map(|a| handle.cooldown(*a))),
        }
    }
}

/// `max(floor, min(cooldowns))`.  An empty iterator yields `floor`.
pub fn cooldown_delay<I>(floor: Duration, cooldowns: I) -> Duration
where
    I: IntoIterator<Item = Duration>,
{
    cooldowns.into_iter().min().map_or(floor, |d| d.max(floor))
}
