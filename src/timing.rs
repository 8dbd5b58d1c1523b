//! Rate limiting on top of the scheduler: trailing debounce over a quiet
//! window, and a one-per-frame throttle.

use crate::schedule::{FrameHandle, FrameQueue, FrameTarget, TimerHandle, TimerTarget, Timers};
use std::time::Duration;

/// Runs the action once, `window` after the last call in a burst.
#[derive(Debug)]
pub struct Debounce {
    window: Duration,
    target: TimerTarget,
    timer: Option<TimerHandle>,
}

impl Debounce {
    pub fn new(target: TimerTarget, window: Duration) -> Self {
        Self {
            window,
            target,
            timer: None,
        }
    }

    /// Restart the quiet period.
    pub fn call(&mut self, timers: &mut Timers, now: Duration) {
        if let Some(timer) = self.timer.take() {
            timers.clear(timer);
        }
        self.timer = Some(timers.set(self.target, now, self.window));
    }

    /// True when `handle` is the live timer; the caller should then run the
    /// debounced action.
    pub fn claim(&mut self, handle: TimerHandle) -> bool {
        if self.timer == Some(handle) {
            self.timer = None;
            true
        } else {
            false
        }
    }

    pub fn cancel(&mut self, timers: &mut Timers) {
        if let Some(timer) = self.timer.take() {
            timers.clear(timer);
        }
    }

    pub fn is_pending(&self) -> bool {
        self.timer.is_some()
    }
}

/// At most one update per rendered frame, however many triggers arrive.
#[derive(Debug)]
pub struct FrameThrottle {
    target: FrameTarget,
    pending: Option<FrameHandle>,
}

impl FrameThrottle {
    pub fn new(target: FrameTarget) -> Self {
        Self {
            target,
            pending: None,
        }
    }

    /// Request a frame unless one is already pending. Returns whether a new
    /// frame was requested.
    pub fn schedule(&mut self, frames: &mut FrameQueue) -> bool {
        if self.pending.is_some() {
            return false;
        }
        self.pending = Some(frames.request(self.target));
        true
    }

    pub fn claim(&mut self, handle: FrameHandle) -> bool {
        if self.pending == Some(handle) {
            self.pending = None;
            true
        } else {
            false
        }
    }

    pub fn is_pending(&self) -> bool {
        self.pending.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const fn ms(v: u64) -> Duration {
        Duration::from_millis(v)
    }

    #[test]
    fn burst_collapses_to_one_trailing_call() {
        let mut timers = Timers::new();
        let mut resize = Debounce::new(TimerTarget::ResizeSettled, ms(150));

        for t in [0, 40, 90, 140] {
            resize.call(&mut timers, ms(t));
        }
        assert_eq!(timers.len(), 1);
        assert!(timers.take_due(ms(289)).is_empty());

        let fired = timers.take_due(ms(290));
        assert_eq!(fired.len(), 1);
        assert!(resize.claim(fired[0].0));
        assert!(!resize.is_pending());
    }

    #[test]
    fn superseded_timer_is_not_claimed() {
        let mut timers = Timers::new();
        let mut resize = Debounce::new(TimerTarget::ResizeSettled, ms(150));
        resize.call(&mut timers, ms(0));
        let first = timers.next_due();
        resize.call(&mut timers, ms(100));
        assert_ne!(first, timers.next_due());

        let fired = timers.take_due(ms(250));
        assert_eq!(fired.len(), 1);
        assert!(resize.claim(fired[0].0));
    }

    #[test]
    fn cancel_drops_pending_call() {
        let mut timers = Timers::new();
        let mut resize = Debounce::new(TimerTarget::ResizeSettled, ms(150));
        resize.call(&mut timers, ms(0));
        resize.cancel(&mut timers);
        assert!(timers.is_empty());
        assert!(!resize.is_pending());
    }

    #[test]
    fn throttle_allows_one_frame_until_claimed() {
        let mut frames = FrameQueue::new();
        let mut scroll = FrameThrottle::new(FrameTarget::Nav);

        assert!(scroll.schedule(&mut frames));
        assert!(!scroll.schedule(&mut frames));
        assert!(!scroll.schedule(&mut frames));
        assert_eq!(frames.len(), 1);

        let (handle, _) = frames.take_pending()[0];
        assert!(scroll.claim(handle));
        assert!(scroll.schedule(&mut frames));
    }
}
