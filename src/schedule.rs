//! Explicit stand-ins for `requestAnimationFrame` and `setTimeout`.
//!
//! Callbacks are not closures: each request names the component that wants
//! it, and the driver dispatches due handles back to that component. Time is
//! always supplied by the caller as a `Duration` since page load.

use std::time::Duration;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct FrameHandle(u64);

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FrameTarget {
    Stars,
    Orbit,
    Nav,
}

/// Result of one animation tick.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Tick {
    Continue,
    Halt,
}

#[derive(Debug, Default)]
pub struct FrameQueue {
    next_id: u64,
    pending: Vec<(FrameHandle, FrameTarget)>,
}

impl FrameQueue {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn request(&mut self, target: FrameTarget) -> FrameHandle {
        self.next_id += 1;
        let handle = FrameHandle(self.next_id);
        self.pending.push((handle, target));
        handle
    }

    pub fn cancel(&mut self, handle: FrameHandle) -> bool {
        let before = self.pending.len();
        self.pending.retain(|(h, _)| *h != handle);
        self.pending.len() != before
    }

    /// Everything due on the next frame. Requests made while these are
    /// being handled land on the frame after.
    pub fn take_pending(&mut self) -> Vec<(FrameHandle, FrameTarget)> {
        std::mem::take(&mut self.pending)
    }

    pub fn pending_for(&self, target: FrameTarget) -> usize {
        self.pending.iter().filter(|(_, t)| *t == target).count()
    }

    pub fn len(&self) -> usize {
        self.pending.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }
}

/// A self-rescheduling animation loop with at most one frame in flight.
#[derive(Debug)]
pub struct FrameLoop {
    target: FrameTarget,
    handle: Option<FrameHandle>,
}

impl FrameLoop {
    pub fn new(target: FrameTarget) -> Self {
        Self {
            target,
            handle: None,
        }
    }

    pub fn is_running(&self) -> bool {
        self.handle.is_some()
    }

    /// Schedule the first frame. Returns false if a frame is already in
    /// flight, in which case nothing new is requested.
    pub fn start(&mut self, frames: &mut FrameQueue) -> bool {
        if self.handle.is_some() {
            return false;
        }
        self.handle = Some(frames.request(self.target));
        true
    }

    pub fn stop(&mut self, frames: &mut FrameQueue) -> bool {
        match self.handle.take() {
            Some(handle) => {
                frames.cancel(handle);
                true
            }
            None => false,
        }
    }

    /// Accept a fired frame. Only the currently live handle is accepted.
    pub fn claim(&mut self, handle: FrameHandle) -> bool {
        if self.handle == Some(handle) {
            self.handle = None;
            true
        } else {
            false
        }
    }

    /// Reschedule after a claimed tick unless the tick asked to halt.
    pub fn finish(&mut self, frames: &mut FrameQueue, tick: Tick) {
        if tick == Tick::Continue {
            self.start(frames);
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct TimerHandle(u64);

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TimerTarget {
    ResizeSettled,
    HoverSlowdown,
}

#[derive(Debug)]
struct Timer {
    handle: TimerHandle,
    target: TimerTarget,
    due: Duration,
}

#[derive(Debug, Default)]
pub struct Timers {
    next_id: u64,
    entries: Vec<Timer>,
}

impl Timers {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(&mut self, target: TimerTarget, now: Duration, delay: Duration) -> TimerHandle {
        self.next_id += 1;
        let handle = TimerHandle(self.next_id);
        self.entries.push(Timer {
            handle,
            target,
            due: now + delay,
        });
        handle
    }

    pub fn clear(&mut self, handle: TimerHandle) -> bool {
        let before = self.entries.len();
        self.entries.retain(|t| t.handle != handle);
        self.entries.len() != before
    }

    /// Remove and return every timer due at `now`, earliest first.
    pub fn take_due(&mut self, now: Duration) -> Vec<(TimerHandle, TimerTarget)> {
        let (mut due, rest): (Vec<Timer>, Vec<Timer>) =
            std::mem::take(&mut self.entries).into_iter().partition(|t| t.due <= now);
        self.entries = rest;
        due.sort_by_key(|t| (t.due, t.handle.0));
        due.into_iter().map(|t| (t.handle, t.target)).collect()
    }

    pub fn next_due(&self) -> Option<Duration> {
        self.entries.iter().map(|t| t.due).min()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const fn ms(v: u64) -> Duration {
        Duration::from_millis(v)
    }

    #[test]
    fn start_twice_keeps_a_single_frame() {
        let mut frames = FrameQueue::new();
        let mut stars = FrameLoop::new(FrameTarget::Stars);

        assert!(stars.start(&mut frames));
        assert!(!stars.start(&mut frames));
        assert_eq!(frames.pending_for(FrameTarget::Stars), 1);
    }

    #[test]
    fn stop_cancels_the_pending_frame() {
        let mut frames = FrameQueue::new();
        let mut orbit = FrameLoop::new(FrameTarget::Orbit);
        orbit.start(&mut frames);

        assert!(orbit.stop(&mut frames));
        assert!(frames.is_empty());
        assert!(!orbit.is_running());
        assert!(!orbit.stop(&mut frames));
    }

    #[test]
    fn claim_rejects_stale_handles() {
        let mut frames = FrameQueue::new();
        let mut stars = FrameLoop::new(FrameTarget::Stars);
        stars.start(&mut frames);
        let (stale, _) = frames.take_pending()[0];

        stars.stop(&mut frames);
        stars.start(&mut frames);
        assert!(!stars.claim(stale));
        assert!(stars.is_running());
    }

    #[test]
    fn halt_does_not_reschedule() {
        let mut frames = FrameQueue::new();
        let mut stars = FrameLoop::new(FrameTarget::Stars);
        stars.start(&mut frames);

        let (handle, _) = frames.take_pending()[0];
        assert!(stars.claim(handle));
        stars.finish(&mut frames, Tick::Continue);
        assert_eq!(frames.len(), 1);

        let (handle, _) = frames.take_pending()[0];
        assert!(stars.claim(handle));
        stars.finish(&mut frames, Tick::Halt);
        assert!(frames.is_empty());
        assert!(!stars.is_running());
    }

    #[test]
    fn timers_fire_in_due_order() {
        let mut timers = Timers::new();
        let late = timers.set(TimerTarget::HoverSlowdown, ms(0), ms(2000));
        let early = timers.set(TimerTarget::ResizeSettled, ms(10), ms(150));

        assert!(timers.take_due(ms(100)).is_empty());
        assert_eq!(timers.next_due(), Some(ms(160)));
        assert_eq!(
            timers.take_due(ms(5000)),
            vec![
                (early, TimerTarget::ResizeSettled),
                (late, TimerTarget::HoverSlowdown)
            ]
        );
        assert!(timers.is_empty());
    }

    #[test]
    fn cleared_timer_never_fires() {
        let mut timers = Timers::new();
        let handle = timers.set(TimerTarget::HoverSlowdown, ms(0), ms(2000));
        assert!(timers.clear(handle));
        assert!(timers.take_due(ms(10_000)).is_empty());
    }
}
