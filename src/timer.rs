//! Deferred work on a single logical clock
//!
//! Nothing here reads wall time. The owner moves the clock forward with
//! [`TimerQueue::pop_due`] / [`TimerQueue::set_now`], which makes every
//! timing-dependent behaviour reproducible in tests. Entries scheduled with a
//! zero delay run on the next drain, never inside the call that scheduled them.

/// Handle returned by [`TimerQueue::schedule`], used to cancel
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TimerId(u64);

#[derive(Debug)]
struct Entry<T> {
    id: TimerId,
    due_ms: u64,
    payload: T,
}

#[derive(Debug)]
pub struct TimerQueue<T> {
    now_ms: u64,
    next_id: u64,
    entries: Vec<Entry<T>>,
}

impl<T> Default for TimerQueue<T> {
    fn default() -> Self {
        Self {
            now_ms: 0,
            next_id: 0,
            entries: Vec::new(),
        }
    }
}

impl<T> TimerQueue<T> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn now_ms(&self) -> u64 {
        self.now_ms
    }

    /// Run `payload` once, `delay_ms` after the current logical time
    pub fn schedule(&mut self, delay_ms: u64, payload: T) -> TimerId {
        let id = TimerId(self.next_id);
        self.next_id += 1;
        self.entries.push(Entry {
            id,
            due_ms: self.now_ms.saturating_add(delay_ms),
            payload,
        });
        id
    }

    /// Drop a pending entry; false if it already ran or was cancelled
    pub fn cancel(&mut self, id: TimerId) -> bool {
        match self.entries.iter().position(|e| e.id == id) {
            Some(index) => {
                self.entries.remove(index);
                true
            }
            None => false,
        }
    }

    #[cfg(test)]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[cfg(test)]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Earliest deadline among pending entries
    pub fn next_deadline(&self) -> Option<u64> {
        self.entries.iter().map(|e| e.due_ms).min()
    }

    /// Remove and return the earliest entry due at or before `until_ms`
    /// The clock moves to that entry's deadline. Ties run in scheduling order.
    pub fn pop_due(&mut self, until_ms: u64) -> Option<(TimerId, T)> {
        let index = self
            .entries
            .iter()
            .enumerate()
            .filter(|(_, e)| e.due_ms <= until_ms)
            .min_by_key(|(_, e)| (e.due_ms, e.id))
            .map(|(i, _)| i)?;

        let entry = self.entries.remove(index);
        self.now_ms = self.now_ms.max(entry.due_ms);
        Some((entry.id, entry.payload))
    }

    /// Move the clock forward; never backwards
    pub fn set_now(&mut self, now_ms: u64) {
        self.now_ms = self.now_ms.max(now_ms);
    }
}
