use crate::timer::{TimerId, TimerQueue};

/// At most one pending flush; later submits only replace the pending value
///
/// The flush itself is a zero-delay entry on the owner's [`TimerQueue`]. When
/// the owner drains that entry it calls [`Coalescer::flush`] and applies the
/// returned value once.
#[derive(Debug)]
pub struct Coalescer<T> {
    pending: Option<T>,
    scheduled: Option<TimerId>,
}

impl<T> Default for Coalescer<T> {
    fn default() -> Self {
        Self {
            pending: None,
            scheduled: None,
        }
    }
}

impl<T> Coalescer<T> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store `value` for the next tick, scheduling `token` only if no flush is pending
    /// Returns true when a new flush was scheduled.
    pub fn submit<D>(&mut self, queue: &mut TimerQueue<D>, value: T, token: D) -> bool {
        self.pending = Some(value);
        if self.scheduled.is_some() {
            return false;
        }
        self.scheduled = Some(queue.schedule(0, token));
        true
    }

    /// Take the latest value for the flush identified by `id`
    /// A stale id (from a cancelled flush) yields nothing.
    pub fn flush(&mut self, id: TimerId) -> Option<T> {
        if self.scheduled != Some(id) {
            return None;
        }
        self.scheduled = None;
        self.pending.take()
    }

    /// Drop the pending value and its scheduled flush
    pub fn cancel<D>(&mut self, queue: &mut TimerQueue<D>) {
        if let Some(id) = self.scheduled.take() {
            queue.cancel(id);
        }
        self.pending = None;
    }

    #[cfg(test)]
    pub fn is_pending(&self) -> bool {
        self.scheduled.is_some()
    }

    #[cfg(test)]
    pub fn pending(&self) -> Option<&T> {
        self.pending.as_ref()
    }
}
