//! `TimerQueue` — the one pending-fire queue of a scheduler.
//!
//! # Why this exists
//!
//! Each loop runs a self-rescheduling chain: fire, run, compute delay, arm.
//! Rather than give every chain its own sleeping task, a scheduler keeps all
//! pending fires in one ordered map and sleeps until the earliest deadline.
//! Cancelling a loop is then a map removal, and the whole schedule is driven
//! by `tokio::time`, which a paused test runtime advances deterministically.
//!
//! # Invariants
//!
//! * A name has at most one pending entry.  Arming it again moves it.
//! * Entries carry the registration generation they were armed for; the
//!   scheduler drops a due entry whose generation no longer matches.

use std::collections::{BTreeMap, HashMap};

use tokio::time::Instant;

use crate::LoopName;

/// One due fire.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct TimerEntry {
    pub name:       LoopName,
    pub generation: u64,
}

#[derive(Default, Debug)]
pub struct TimerQueue {
    inner: BTreeMap<Instant, Vec<TimerEntry>>,
    /// Reverse index so `cancel` and re-arming are O(log W).
    armed: HashMap<LoopName, Instant>,
}

impl TimerQueue {
    pub fn new() -> Self {
        Self::default()
    }

    /// Arm `name` to fire at `at`, replacing any pending fire for it.
    pub fn arm(&mut self, at: Instant, name: LoopName, generation: u64) {
        self.cancel(name);
        self.inner.entry(at).or_default().push(TimerEntry { name, generation });
        self.armed.insert(name, at);
    }

    /// Drop the pending fire for `name`.  Returns `true` if one existed.
    pub fn cancel(&mut self, name: LoopName) -> bool {
        let Some(at) = self.armed.remove(&name) else {
            return false;
        };
        if let Some(bucket) = self.inner.get_mut(&at) {
            bucket.retain(|e| e.name != name);
            if bucket.is_empty() {
                self.inner.remove(&at);
            }
        }
        true
    }

    /// Remove and return every entry due at or before `now`, earliest first.
    pub fn pop_due(&mut self, now: Instant) -> Vec<TimerEntry> {
        let mut due = Vec::new();
        while let Some(entry) = self.inner.first_entry() {
            if *entry.key() > now {
                break;
            }
            for e in entry.remove() {
                self.armed.remove(&e.name);
                due.push(e);
            }
        }
        due
    }

    /// The earliest pending deadline, or `None` if nothing is armed.
    pub fn next_deadline(&self) -> Option<Instant> {
        self.inner.keys().next().copied()
    }

    pub fn deadline_of(&self, name: LoopName) -> Option<Instant> {
        self.armed.get(&name).copied()
    }

    pub fn is_armed(&self, name: LoopName) -> bool {
        self.armed.contains_key(&name)
    }

    pub fn clear(&mut self) {
        self.inner.clear();
        self.armed.clear();
    }

    /// Number of pending fires.
    pub fn len(&self) -> usize {
        self.armed.len()
    }

    pub fn is_empty(&self) -> bool {
        self.armed.is_empty()
    }
}
