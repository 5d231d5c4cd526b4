//! `OutputObserver<W>` — bridges `SchedulerObserver` to an `OutputWriter`.

use std::time::Duration;

use tokio::time::Instant;
use tracing::warn;

use fl_agent::ActionResult;
use fl_core::{AgentId, StrategyId};
use fl_schedule::LoopName;
use fl_sim::{LinkState, SchedulerObserver};

use crate::row::{LinkEventRow, LoopEvent, LoopEventRow};
use crate::writer::OutputWriter;
use crate::{OutputError, OutputResult};

/// Loop rows buffered before a write, unless configured otherwise.
pub const DEFAULT_BATCH: usize = 256;

/// A [`SchedulerObserver`] that records loop and link events to any
/// [`OutputWriter`] backend.
///
/// Loop events are buffered and written in batches; link events are rare
/// and written immediately.  The buffer is also drained when the strategist
/// stops.
///
/// Errors from the writer are stored internally because observer methods
/// have no return value.  After the run returns, check for errors with
/// [`take_error`][Self::take_error].
pub struct OutputObserver<W: OutputWriter> {
    writer:     W,
    batch:      usize,
    pending:    Vec<LoopEventRow>,
    last_at_ms: u64,
    last_error: Option<OutputError>,
}

impl<W: OutputWriter> OutputObserver<W> {
    pub fn new(writer: W) -> Self {
        Self::with_batch(writer, DEFAULT_BATCH)
    }

    /// Write loop events every `batch` rows (at least one).
    pub fn with_batch(writer: W, batch: usize) -> Self {
        Self {
            writer,
            batch:      batch.max(1),
            pending:    Vec::new(),
            last_at_ms: 0,
            last_error: None,
        }
    }

    /// Take the stored write error (if any).
    ///
    /// Returns `None` if all writes succeeded.
    pub fn take_error(&mut self) -> Option<OutputError> {
        self.last_error.take()
    }

    /// Write whatever is buffered and flush the backend.
    pub fn flush(&mut self) -> OutputResult<()> {
        self.drain()?;
        self.writer.flush()
    }

    /// Flush and unwrap the inner writer.
    pub fn into_writer(mut self) -> W {
        let result = self.drain();
        self.store_err(result);
        self.writer
    }

    fn drain(&mut self) -> OutputResult<()> {
        if self.pending.is_empty() {
            return Ok(());
        }
        let result = self.writer.write_loop_events(&self.pending);
        self.pending.clear();
        result
    }

    fn push(&mut self, row: LoopEventRow) {
        self.last_at_ms = row.at_ms;
        self.pending.push(row);
        if self.pending.len() >= self.batch {
            let result = self.drain();
            self.store_err(result);
        }
    }

    fn link_row(&mut self, agent: AgentId, at: Duration, event: &'static str, detail: String) {
        let row = LinkEventRow { agent_id: agent.0, at_ms: millis(at), event, detail };
        let result = self.writer.write_link_event(&row);
        self.store_err(result);
    }

    fn store_err(&mut self, result: OutputResult<()>) {
        if let Err(e) = result {
            // Keep only the first error.
            if self.last_error.is_none() {
                warn!(error = %e, "output write failed");
                self.last_error = Some(e);
            }
        }
    }
}

fn millis(d: Duration) -> u64 {
    d.as_millis() as u64
}

impl<W: OutputWriter> SchedulerObserver for OutputObserver<W> {
    fn on_fire(&mut self, agent: AgentId, name: LoopName, at: Duration) {
        self.push(LoopEventRow {
            agent_id:  agent.0,
            at_ms:     millis(at),
            loop_name: name,
            event:     LoopEvent::Fire,
            delay_ms:  None,
            error:     None,
        });
    }

    fn on_skip(&mut self, agent: AgentId, name: LoopName, at: Duration) {
        self.push(LoopEventRow {
            agent_id:  agent.0,
            at_ms:     millis(at),
            loop_name: name,
            event:     LoopEvent::Skip,
            delay_ms:  None,
            error:     None,
        });
    }

    fn on_complete(&mut self, agent: AgentId, name: LoopName, at: Duration, result: &ActionResult<()>) {
        let (event, error) = match result {
            Ok(())  => (LoopEvent::Ok, None),
            Err(e)  => (LoopEvent::Failed, Some(e.to_string())),
        };
        self.push(LoopEventRow {
            agent_id:  agent.0,
            at_ms:     millis(at),
            loop_name: name,
            event,
            delay_ms:  None,
            error,
        });
    }

    fn on_reschedule(&mut self, agent: AgentId, name: LoopName, delay: Duration) {
        // Always follows the completion it belongs to.
        let at_ms = self.last_at_ms;
        self.push(LoopEventRow {
            agent_id:  agent.0,
            at_ms,
            loop_name: name,
            event:     LoopEvent::Reschedule,
            delay_ms:  Some(millis(delay)),
            error:     None,
        });
    }

    fn on_link(&mut self, agent: AgentId, state: LinkState, at: Duration) {
        let detail = match state {
            LinkState::Backoff { until } => {
                format!("retry_in_ms={}", millis(until.saturating_duration_since(Instant::now())))
            }
            _ => String::new(),
        };
        self.link_row(agent, at, state.label(), detail);
    }

    fn on_reattach(&mut self, agent: AgentId, strategies: &[StrategyId], at: Duration) {
        self.link_row(agent, at, "reattached", format!("strategies={}", strategies.len()));
    }

    fn on_stop(&mut self, agent: AgentId, at: Duration) {
        self.link_row(agent, at, "stopped", String::new());
        let result = self.flush();
        self.store_err(result);
    }
}
