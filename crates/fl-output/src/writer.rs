//! The `OutputWriter` trait and its shared, cloneable wrapper.

use std::sync::Arc;

use parking_lot::Mutex;

use crate::{LinkEventRow, LoopEventRow, OutputResult};

/// Trait implemented by output backends.
///
/// All methods are infallible from the observer's perspective: errors are
/// stored internally and retrieved with
/// [`OutputObserver::take_error`][crate::OutputObserver::take_error].
pub trait OutputWriter {
    /// Write a batch of loop events.
    fn write_loop_events(&mut self, rows: &[LoopEventRow]) -> OutputResult<()>;

    /// Write one link event.
    fn write_link_event(&mut self, row: &LinkEventRow) -> OutputResult<()>;

    /// Push buffered rows to the underlying files without closing them.
    fn flush(&mut self) -> OutputResult<()>;

    /// Flush and close all underlying file handles.
    ///
    /// Idempotent: safe to call more than once.
    fn finish(&mut self) -> OutputResult<()>;
}

/// One writer shared by the observers of every agent in a fleet.
///
/// Each agent's observer runs on its own task, so the backend sits behind a
/// mutex; clones write to the same files.
pub struct SharedWriter<W: OutputWriter> {
    inner: Arc<Mutex<W>>,
}

impl<W: OutputWriter> SharedWriter<W> {
    pub fn new(writer: W) -> Self {
        Self { inner: Arc::new(Mutex::new(writer)) }
    }
}

impl<W: OutputWriter> Clone for SharedWriter<W> {
    fn clone(&self) -> Self {
        Self { inner: Arc::clone(&self.inner) }
    }
}

impl<W: OutputWriter> OutputWriter for SharedWriter<W> {
    fn write_loop_events(&mut self, rows: &[LoopEventRow]) -> OutputResult<()> {
        self.inner.lock().write_loop_events(rows)
    }

    fn write_link_event(&mut self, row: &LinkEventRow) -> OutputResult<()> {
        self.inner.lock().write_link_event(row)
    }

    fn flush(&mut self) -> OutputResult<()> {
        self.inner.lock().flush()
    }

    fn finish(&mut self) -> OutputResult<()> {
        self.inner.lock().finish()
    }
}
