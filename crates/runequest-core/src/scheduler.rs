//! Deterministic virtual-time timer queue.
//!
//! The scheduler is the single source of truth for time inside the engine.
//! Every timer line (action progress, combat tick, respawns, autosave, chat
//! poll) is registered here and fires only when the owner pulls due timers
//! with [`Scheduler::pop_due`]. Nothing runs on its own thread.
//!
//! # Ordering
//!
//! Due timers pop in `(due time, registration order)` order. A repeating
//! timer keeps its identifier across periods, so it keeps its place among
//! timers due at the same instant.
//!
//! # Cancellation
//!
//! [`Scheduler::cancel`] removes the timer from the queue immediately. A
//! cancelled timer can never fire, even if it was due in the same
//! [`Scheduler::pop_due`] sweep.

use std::collections::{BTreeMap, BTreeSet};

/// Errors that can occur when registering timers.
#[derive(Debug, thiserror::Error)]
pub enum SchedulerError {
    /// A repeating timer with a zero period would fire forever.
    #[error("repeating timer period must be greater than zero")]
    ZeroPeriod,

    /// The timer identifier space is exhausted.
    #[error("timer id overflow")]
    IdOverflow,
}

/// Handle for a registered timer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct TimerId(u64);

impl core::fmt::Display for TimerId {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "timer#{}", self.0)
    }
}

/// A registered timer.
#[derive(Debug, Clone)]
struct Entry<K> {
    /// Virtual time at which the timer fires next.
    due_ms: u64,
    /// Repeat period, `None` for one-shot timers.
    period_ms: Option<u64>,
    /// Payload handed back on firing.
    kind: K,
}

/// A timer that has come due.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Fired<K> {
    /// The timer's handle.
    pub id: TimerId,
    /// The virtual time at which it fired.
    pub at_ms: u64,
    /// The payload it was registered with.
    pub kind: K,
}

/// Virtual-time timer queue keyed by payload type `K`.
#[derive(Debug, Clone)]
pub struct Scheduler<K> {
    /// Current virtual time.
    now_ms: u64,
    /// Next identifier to hand out.
    next_id: u64,
    /// Registered timers.
    timers: BTreeMap<TimerId, Entry<K>>,
    /// Firing order index.
    queue: BTreeSet<(u64, TimerId)>,
}

impl<K: Clone> Default for Scheduler<K> {
    fn default() -> Self {
        Self::new()
    }
}

impl<K: Clone> Scheduler<K> {
    /// An empty scheduler at virtual time 0.
    pub const fn new() -> Self {
        Self {
            now_ms: 0,
            next_id: 0,
            timers: BTreeMap::new(),
            queue: BTreeSet::new(),
        }
    }

    /// Current virtual time in milliseconds.
    pub const fn now_ms(&self) -> u64 {
        self.now_ms
    }

    /// Number of live timers.
    pub fn len(&self) -> usize {
        self.timers.len()
    }

    /// Whether no timer is registered.
    pub fn is_empty(&self) -> bool {
        self.timers.is_empty()
    }

    /// Whether `id` is still registered.
    pub fn is_scheduled(&self, id: TimerId) -> bool {
        self.timers.contains_key(&id)
    }

    /// Virtual time of the earliest pending timer.
    pub fn next_due_ms(&self) -> Option<u64> {
        self.queue.first().map(|&(due, _)| due)
    }

    /// Fire `kind` once, `delay_ms` from now.
    ///
    /// # Errors
    ///
    /// Returns [`SchedulerError::IdOverflow`] if no identifier is left.
    pub fn schedule_once(&mut self, delay_ms: u64, kind: K) -> Result<TimerId, SchedulerError> {
        self.insert(delay_ms, None, kind)
    }

    /// Fire `kind` every `period_ms`, first after one period.
    ///
    /// # Errors
    ///
    /// Returns [`SchedulerError::ZeroPeriod`] for a zero period.
    pub fn schedule_repeating(&mut self, period_ms: u64, kind: K) -> Result<TimerId, SchedulerError> {
        if period_ms == 0 {
            return Err(SchedulerError::ZeroPeriod);
        }
        self.insert(period_ms, Some(period_ms), kind)
    }

    fn insert(&mut self, delay_ms: u64, period_ms: Option<u64>, kind: K) -> Result<TimerId, SchedulerError> {
        let id = TimerId(self.next_id);
        self.next_id = self.next_id.checked_add(1).ok_or(SchedulerError::IdOverflow)?;
        let due_ms = self.now_ms.saturating_add(delay_ms);
        self.timers.insert(
            id,
            Entry {
                due_ms,
                period_ms,
                kind,
            },
        );
        self.queue.insert((due_ms, id));
        Ok(id)
    }

    /// Remove a timer. Returns whether it was still registered.
    pub fn cancel(&mut self, id: TimerId) -> bool {
        match self.timers.remove(&id) {
            Some(entry) => {
                self.queue.remove(&(entry.due_ms, id));
                true
            }
            None => false,
        }
    }

    /// Remove every timer.
    pub fn cancel_all(&mut self) {
        self.timers.clear();
        self.queue.clear();
    }

    /// Pop the earliest timer due at or before `deadline_ms`.
    ///
    /// Advances the virtual clock to the timer's due time. Repeating timers
    /// are re-queued one period later before being returned.
    pub fn pop_due(&mut self, deadline_ms: u64) -> Option<Fired<K>> {
        let &(due_ms, id) = self.queue.first()?;
        if due_ms > deadline_ms {
            return None;
        }
        self.queue.remove(&(due_ms, id));
        self.now_ms = self.now_ms.max(due_ms);

        let entry = self.timers.get_mut(&id)?;
        let kind = entry.kind.clone();
        match entry.period_ms {
            Some(period) => {
                entry.due_ms = due_ms.saturating_add(period);
                self.queue.insert((entry.due_ms, id));
            }
            None => {
                self.timers.remove(&id);
            }
        }

        Some(Fired {
            id,
            at_ms: due_ms,
            kind,
        })
    }

    /// Move the clock forward to `deadline_ms` once every due timer has
    /// been handled. Never moves backwards.
    pub fn settle(&mut self, deadline_ms: u64) {
        self.now_ms = self.now_ms.max(deadline_ms);
    }
}
