use tracing::debug;

use crate::constants::validation::MIN_LONG_PRESS_MS;
use crate::timer::{TimerId, TimerQueue};

/// Single-shot, cancellable timed action
///
/// Arming schedules one entry on the owner's queue; the owner reports the
/// entry back through [`LongPressTimer::fire`] when it comes due. Only the
/// most recent arm can fire, and only once.
#[derive(Debug, Default)]
pub struct LongPressTimer {
    armed: Option<TimerId>,
}

impl LongPressTimer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Schedule `payload` for `duration_ms` from now, replacing any earlier arm
    pub fn arm<D>(&mut self, queue: &mut TimerQueue<D>, duration_ms: u64, payload: D) {
        self.cancel(queue);
        let duration_ms = duration_ms.max(MIN_LONG_PRESS_MS as u64);
        self.armed = Some(queue.schedule(duration_ms, payload));
        debug!(duration_ms = duration_ms, "Long press armed");
    }

    /// Cancel the pending fire; true if something was actually cancelled
    pub fn cancel<D>(&mut self, queue: &mut TimerQueue<D>) -> bool {
        match self.armed.take() {
            Some(id) => {
                let cancelled = queue.cancel(id);
                if cancelled {
                    debug!("Long press cancelled");
                }
                cancelled
            }
            None => false,
        }
    }

    /// Called when `id` comes due; true means the action should run now
    pub fn fire(&mut self, id: TimerId) -> bool {
        if self.armed != Some(id) {
            return false;
        }
        self.armed = None;
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Clone, Copy, PartialEq)]
    struct Close;

    fn advance(queue: &mut TimerQueue<Close>, timer: &mut LongPressTimer, to_ms: u64) -> usize {
        let mut fires = 0;
        while let Some((id, Close)) = queue.pop_due(to_ms) {
            if timer.fire(id) {
                fires += 1;
            }
        }
        queue.set_now(to_ms);
        fires
    }

    #[test]
    fn test_cancel_just_before_deadline_prevents_fire() {
        let mut queue = TimerQueue::new();
        let mut timer = LongPressTimer::new();

        timer.arm(&mut queue, 600, Close);
        assert_eq!(advance(&mut queue, &mut timer, 599), 0);
        assert!(timer.cancel(&mut queue));
        assert_eq!(advance(&mut queue, &mut timer, 5_000), 0);
    }

    #[test]
    fn test_fires_exactly_once_at_deadline() {
        let mut queue = TimerQueue::new();
        let mut timer = LongPressTimer::new();

        timer.arm(&mut queue, 600, Close);
        assert_eq!(advance(&mut queue, &mut timer, 600), 1);
        assert_eq!(advance(&mut queue, &mut timer, 5_000), 0);
    }

    #[test]
    fn test_cancel_after_fire_is_noop() {
        let mut queue = TimerQueue::new();
        let mut timer = LongPressTimer::new();

        timer.arm(&mut queue, 100, Close);
        assert_eq!(advance(&mut queue, &mut timer, 100), 1);
        assert!(!timer.cancel(&mut queue));
        assert!(queue.is_empty());
    }

    #[test]
    fn test_rearm_replaces_previous() {
        let mut queue = TimerQueue::new();
        let mut timer = LongPressTimer::new();

        timer.arm(&mut queue, 100, Close);
        advance(&mut queue, &mut timer, 50);
        timer.arm(&mut queue, 100, Close);

        assert_eq!(queue.len(), 1);
        assert_eq!(advance(&mut queue, &mut timer, 149), 0);
        assert_eq!(advance(&mut queue, &mut timer, 150), 1);
    }

    #[test]
    fn test_zero_duration_is_clamped() {
        let mut queue = TimerQueue::new();
        let mut timer = LongPressTimer::new();

        timer.arm(&mut queue, 0, Close);
        assert_eq!(advance(&mut queue, &mut timer, 0), 0);
        assert_eq!(advance(&mut queue, &mut timer, 10), 1);
    }
}
