//! One-shot timers polled by the host.

use std::collections::BTreeMap;

use rustc_hash::FxHashMap;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TimerId(u64);

/// Tasks ordered by due time. Tasks due at the same millisecond fire in
/// scheduling order.
#[derive(Debug)]
pub struct TimerQueue<T> {
    next_id: u64,
    queue: BTreeMap<(u64, TimerId), T>,
    due_by_id: FxHashMap<TimerId, u64>,
}

impl<T> Default for TimerQueue<T> {
    fn default() -> Self {
        Self {
            next_id: 0,
            queue: BTreeMap::new(),
            due_by_id: FxHashMap::default(),
        }
    }
}

impl<T> TimerQueue<T> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn schedule(&mut self, due: u64, task: T) -> TimerId {
        let id = TimerId(self.next_id);
        self.next_id += 1;
        self.queue.insert((due, id), task);
        self.due_by_id.insert(id, due);
        id
    }

    pub fn cancel(&mut self, id: TimerId) -> Option<T> {
        let due = self.due_by_id.remove(&id)?;
        self.queue.remove(&(due, id))
    }

    /// Removes and returns the earliest task due at or before `now`.
    pub fn pop_due(&mut self, now: u64) -> Option<T> {
        let (&(due, id), _) = self.queue.first_key_value()?;
        if due > now {
            return None;
        }
        self.due_by_id.remove(&id);
        self.queue.remove(&(due, id))
    }

    pub fn next_deadline(&self) -> Option<u64> {
        self.queue.keys().next().map(|(due, _)| *due)
    }

    pub fn clear(&mut self) {
        self.queue.clear();
        self.due_by_id.clear();
    }

    pub fn len(&self) -> usize {
        self.queue.len()
    }

    pub fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }
}
