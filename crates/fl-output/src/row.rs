//! Plain data row types written by output backends.

use std::fmt;

use fl_schedule::LoopName;

/// What happened to a loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoopEvent {
    Fire,
    /// Due, but the agent was not ready.
    Skip,
    Ok,
    Failed,
    Reschedule,
}

impl LoopEvent {
    pub fn as_str(&self) -> &'static str {
        match self {
            LoopEvent::Fire       => "fire",
            LoopEvent::Skip       => "skip",
            LoopEvent::Ok         => "ok",
            LoopEvent::Failed     => "failed",
            LoopEvent::Reschedule => "reschedule",
        }
    }
}

impl fmt::Display for LoopEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One loop event of one agent.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoopEventRow {
    pub agent_id:  u32,
    /// Milliseconds since the agent's strategist was built.
    pub at_ms:     u64,
    pub loop_name: LoopName,
    pub event:     LoopEvent,
    /// Set for `Reschedule` only.
    pub delay_ms:  Option<u64>,
    /// Set for `Failed` only.
    pub error:     Option<String>,
}

/// One connection-level event: a link transition, a re-attach of held
/// strategies, or the final stop.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LinkEventRow {
    pub agent_id: u32,
    pub at_ms:    u64,
    pub event:    &'static str,
    pub detail:   String,
}
