//! Task Scheduling
//!
//! Timers and animation frames behind a trait, so timing code runs the same
//! against the browser event loop and a virtual clock.

#[cfg(any(test, feature = "testing"))]
use std::cell::RefCell;
#[cfg(any(test, feature = "testing"))]
use std::rc::Rc;
use std::time::Duration;

use leptos::prelude::{request_animation_frame_with_handle, set_timeout_with_handle};

/// Source of time, timers and animation frames
pub trait Scheduler {
    /// Milliseconds since an arbitrary origin
    fn now(&self) -> f64;

    /// Run `task` once after `delay_ms`
    fn set_timeout(&self, delay_ms: u32, task: Box<dyn FnOnce()>) -> TaskHandle;

    /// Run `task` before the next repaint
    fn request_frame(&self, task: Box<dyn FnOnce()>) -> TaskHandle;
}

/// Cancels a scheduled task. Dropping the handle leaves the task scheduled.
#[must_use = "dropping a TaskHandle does not cancel the task"]
pub struct TaskHandle {
    cancel: Option<Box<dyn FnOnce()>>,
}

impl TaskHandle {
    pub fn new(cancel: impl FnOnce() + 'static) -> Self {
        Self {
            cancel: Some(Box::new(cancel)),
        }
    }

    /// Handle for a task that was never scheduled
    pub fn detached() -> Self {
        Self { cancel: None }
    }

    pub fn cancel(mut self) {
        if let Some(cancel) = self.cancel.take() {
            cancel();
        }
    }
}

impl std::fmt::Debug for TaskHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TaskHandle")
            .field("cancellable", &self.cancel.is_some())
            .finish()
    }
}

// ========================
// Browser
// ========================

/// Browser event loop: `setTimeout`, `requestAnimationFrame`, `performance.now()`
#[derive(Clone, Copy, Debug, Default)]
pub struct BrowserScheduler;

impl Scheduler for BrowserScheduler {
    fn now(&self) -> f64 {
        web_sys::window()
            .and_then(|w| w.performance())
            .map(|p| p.now())
            .unwrap_or(0.0)
    }

    fn set_timeout(&self, delay_ms: u32, task: Box<dyn FnOnce()>) -> TaskHandle {
        match set_timeout_with_handle(task, Duration::from_millis(delay_ms as u64)) {
            Ok(handle) => TaskHandle::new(move || handle.clear()),
            Err(e) => {
                tracing::warn!("setTimeout failed: {:?}", e);
                TaskHandle::detached()
            }
        }
    }

    fn request_frame(&self, task: Box<dyn FnOnce()>) -> TaskHandle {
        match request_animation_frame_with_handle(task) {
            Ok(handle) => TaskHandle::new(move || handle.cancel()),
            Err(e) => {
                tracing::warn!("requestAnimationFrame failed: {:?}", e);
                TaskHandle::detached()
            }
        }
    }
}

// ========================
// Virtual clock
// ========================

#[cfg(any(test, feature = "testing"))]
struct Timer {
    id: u64,
    due: f64,
    task: Box<dyn FnOnce()>,
}

#[cfg(any(test, feature = "testing"))]
#[derive(Default)]
struct ManualState {
    now: f64,
    next_id: u64,
    timers: Vec<Timer>,
    frames: Vec<(u64, Box<dyn FnOnce()>)>,
}

#[cfg(any(test, feature = "testing"))]
impl ManualState {
    fn allocate(&mut self) -> u64 {
        self.next_id += 1;
        self.next_id
    }
}

/// Scheduler driven by hand: time only moves on `advance` and `next_frame`
#[cfg(any(test, feature = "testing"))]
#[derive(Clone, Default)]
pub struct ManualScheduler {
    state: Rc<RefCell<ManualState>>,
}

#[cfg(any(test, feature = "testing"))]
impl ManualScheduler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Move the clock forward, firing due timers in order
    pub fn advance(&self, ms: f64) {
        let target = self.state.borrow().now + ms;
        loop {
            let next = {
                let mut state = self.state.borrow_mut();
                let due = state
                    .timers
                    .iter()
                    .enumerate()
                    .filter(|(_, t)| t.due <= target)
                    .min_by(|(_, a), (_, b)| a.due.total_cmp(&b.due).then(a.id.cmp(&b.id)))
                    .map(|(i, _)| i);
                due.map(|i| {
                    let timer = state.timers.remove(i);
                    state.now = timer.due;
                    timer.task
                })
            };
            match next {
                Some(task) => task(),
                None => break,
            }
        }
        self.state.borrow_mut().now = target;
    }

    /// Move the clock forward by `ms`, then run the frames queued so far
    pub fn next_frame(&self, ms: f64) {
        self.advance(ms);
        let frames = std::mem::take(&mut self.state.borrow_mut().frames);
        for (_, task) in frames {
            task();
        }
    }

    pub fn pending_timers(&self) -> usize {
        self.state.borrow().timers.len()
    }

    pub fn pending_frames(&self) -> usize {
        self.state.borrow().frames.len()
    }
}

#[cfg(any(test, feature = "testing"))]
impl Scheduler for ManualScheduler {
    fn now(&self) -> f64 {
        self.state.borrow().now
    }

    fn set_timeout(&self, delay_ms: u32, task: Box<dyn FnOnce()>) -> TaskHandle {
        let mut state = self.state.borrow_mut();
        let id = state.allocate();
        let due = state.now + delay_ms as f64;
        state.timers.push(Timer { id, due, task });

        let weak = Rc::downgrade(&self.state);
        TaskHandle::new(move || {
            if let Some(state) = weak.upgrade() {
                state.borrow_mut().timers.retain(|t| t.id != id);
            }
        })
    }

    fn request_frame(&self, task: Box<dyn FnOnce()>) -> TaskHandle {
        let mut state = self.state.borrow_mut();
        let id = state.allocate();
        state.frames.push((id, task));

        let weak = Rc::downgrade(&self.state);
        TaskHandle::new(move || {
            if let Some(state) = weak.upgrade() {
                state.borrow_mut().frames.retain(|(frame, _)| *frame != id);
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;

    #[test]
    fn test_timers_fire_in_order() {
        let scheduler = ManualScheduler::new();
        let log = Rc::new(RefCell::new(Vec::new()));

        for (delay, label) in [(30, "c"), (10, "a"), (20, "b")] {
            let log = log.clone();
            let _ = scheduler.set_timeout(delay, Box::new(move || log.borrow_mut().push(label)));
        }

        scheduler.advance(15.0);
        assert_eq!(*log.borrow(), vec!["a"]);
        scheduler.advance(20.0);
        assert_eq!(*log.borrow(), vec!["a", "b", "c"]);
        assert_eq!(scheduler.now(), 35.0);
    }

    #[test]
    fn test_cancelled_timer_does_not_fire() {
        let scheduler = ManualScheduler::new();
        let fired = Rc::new(Cell::new(false));
        let flag = fired.clone();

        let handle = scheduler.set_timeout(10, Box::new(move || flag.set(true)));
        handle.cancel();
        scheduler.advance(50.0);

        assert!(!fired.get());
        assert_eq!(scheduler.pending_timers(), 0);
    }

    #[test]
    fn test_frames_requested_during_frame_wait() {
        let scheduler = ManualScheduler::new();
        let count = Rc::new(Cell::new(0));

        let inner = scheduler.clone();
        let c = count.clone();
        let _ = scheduler.request_frame(Box::new(move || {
            c.set(c.get() + 1);
            let c = c.clone();
            let _ = inner.request_frame(Box::new(move || c.set(c.get() + 1)));
        }));

        scheduler.next_frame(16.0);
        assert_eq!(count.get(), 1);
        assert_eq!(scheduler.pending_frames(), 1);
        scheduler.next_frame(16.0);
        assert_eq!(count.get(), 2);
    }
}
