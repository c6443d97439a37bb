//! Performance Utilities
//!
//! Debounce, throttle and call timing on top of a `Scheduler`.

use std::cell::{Cell, RefCell};
use std::rc::Rc;

use crate::schedule::{Scheduler, TaskHandle};

struct DebounceInner<A> {
    scheduler: Rc<dyn Scheduler>,
    wait_ms: u32,
    func: Box<dyn Fn(A)>,
    pending: RefCell<Option<TaskHandle>>,
}

/// Calls `func` once input has been quiet for `wait_ms`, with the last argument
pub struct Debounce<A> {
    inner: Rc<DebounceInner<A>>,
}

impl<A> Clone for Debounce<A> {
    fn clone(&self) -> Self {
        Self {
            inner: self.inner.clone(),
        }
    }
}

impl<A: 'static> Debounce<A> {
    pub fn new(scheduler: Rc<dyn Scheduler>, wait_ms: u32, func: impl Fn(A) + 'static) -> Self {
        Self {
            inner: Rc::new(DebounceInner {
                scheduler,
                wait_ms,
                func: Box::new(func),
                pending: RefCell::new(None),
            }),
        }
    }

    pub fn call(&self, arg: A) {
        self.cancel();
        let inner = self.inner.clone();
        let handle = self.inner.scheduler.set_timeout(
            self.inner.wait_ms,
            Box::new(move || {
                inner.pending.borrow_mut().take();
                (inner.func)(arg);
            }),
        );
        *self.inner.pending.borrow_mut() = Some(handle);
    }

    /// Drop the pending call, if any
    pub fn cancel(&self) {
        let pending = self.inner.pending.borrow_mut().take();
        if let Some(pending) = pending {
            pending.cancel();
        }
    }

    pub fn is_pending(&self) -> bool {
        self.inner.pending.borrow().is_some()
    }
}

struct ThrottleInner<A> {
    scheduler: Rc<dyn Scheduler>,
    limit_ms: u32,
    func: Box<dyn Fn(A)>,
    blocked: Cell<bool>,
}

/// Calls `func` immediately, then ignores calls for `limit_ms`
pub struct Throttle<A> {
    inner: Rc<ThrottleInner<A>>,
}

impl<A> Clone for Throttle<A> {
    fn clone(&self) -> Self {
        Self {
            inner: self.inner.clone(),
        }
    }
}

impl<A: 'static> Throttle<A> {
    pub fn new(scheduler: Rc<dyn Scheduler>, limit_ms: u32, func: impl Fn(A) + 'static) -> Self {
        Self {
            inner: Rc::new(ThrottleInner {
                scheduler,
                limit_ms,
                func: Box::new(func),
                blocked: Cell::new(false),
            }),
        }
    }

    /// Returns whether `func` ran
    pub fn call(&self, arg: A) -> bool {
        if self.inner.blocked.get() {
            return false;
        }
        self.inner.blocked.set(true);
        (self.inner.func)(arg);

        let inner = self.inner.clone();
        let _reopen = self
            .inner
            .scheduler
            .set_timeout(self.inner.limit_ms, Box::new(move || inner.blocked.set(false)));
        true
    }
}

/// Run `func`, logging how long it took
pub fn measure<T>(clock: &dyn Scheduler, name: &str, func: impl FnOnce() -> T) -> T {
    let start = clock.now();
    let result = func();
    let elapsed = clock.now() - start;
    tracing::info!("{} took {} milliseconds", name, elapsed);
    result
}
