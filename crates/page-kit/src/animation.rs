//! Animation Utilities
//!
//! Frame-driven opacity fades with cancellable, awaitable handles, and
//! smooth window scrolling.

use std::cell::{Cell, RefCell};
use std::rc::Rc;

use futures::channel::oneshot;

use crate::dom::Dom;
use crate::schedule::{Scheduler, TaskHandle};

/// Default fade duration in milliseconds
pub const DEFAULT_FADE_MS: f64 = 300.0;

/// How an animation ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AnimationEnd {
    Completed,
    Cancelled,
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum Fade {
    In,
    Out,
}

struct Control {
    running: Cell<bool>,
    frame: RefCell<Option<TaskHandle>>,
    done: RefCell<Option<oneshot::Sender<AnimationEnd>>>,
}

impl Control {
    fn finish(&self, end: AnimationEnd) {
        self.running.set(false);
        if let Some(frame) = self.frame.borrow_mut().take() {
            frame.cancel();
        }
        if let Some(done) = self.done.borrow_mut().take() {
            let _ = done.send(end);
        }
    }
}

/// Handle to a running animation
pub struct Animation {
    control: Rc<Control>,
    done: oneshot::Receiver<AnimationEnd>,
}

impl Animation {
    pub fn is_running(&self) -> bool {
        self.control.running.get()
    }

    /// Stop at the current frame. The element keeps its current opacity.
    pub fn cancel(&self) {
        if self.is_running() {
            self.control.finish(AnimationEnd::Cancelled);
        }
    }

    /// Wait for the animation to complete or be cancelled
    pub async fn finished(self) -> AnimationEnd {
        self.done.await.unwrap_or(AnimationEnd::Cancelled)
    }
}

struct FadeTask<D: Dom> {
    dom: Rc<D>,
    scheduler: Rc<dyn Scheduler>,
    node: D::Node,
    duration: f64,
    fade: Fade,
    start: Cell<Option<f64>>,
    control: Rc<Control>,
}

impl<D: Dom + 'static> FadeTask<D> {
    fn step(self: Rc<Self>) {
        if !self.control.running.get() {
            return;
        }
        let now = self.scheduler.now();
        let start = match self.start.get() {
            Some(start) => start,
            None => {
                self.start.set(Some(now));
                now
            }
        };
        let progress = now - start;

        let t = if self.duration <= 0.0 {
            1.0
        } else {
            (progress / self.duration).min(1.0)
        };
        let opacity = match self.fade {
            Fade::In => t,
            Fade::Out => 1.0 - t,
        };
        self.dom.set_style(&self.node, "opacity", &opacity.to_string());

        if t < 1.0 {
            let next = self.clone();
            let handle = self.scheduler.request_frame(Box::new(move || next.step()));
            *self.control.frame.borrow_mut() = Some(handle);
        } else {
            if self.fade == Fade::Out {
                self.dom.set_style(&self.node, "display", "none");
            }
            self.control.frame.borrow_mut().take();
            self.control.finish(AnimationEnd::Completed);
        }
    }
}

fn start_fade<D: Dom + 'static>(
    dom: Rc<D>,
    scheduler: Rc<dyn Scheduler>,
    node: D::Node,
    duration_ms: f64,
    fade: Fade,
) -> Animation {
    let (tx, rx) = oneshot::channel();
    let control = Rc::new(Control {
        running: Cell::new(true),
        frame: RefCell::new(None),
        done: RefCell::new(Some(tx)),
    });

    let task = Rc::new(FadeTask {
        dom,
        scheduler: scheduler.clone(),
        node,
        duration: duration_ms,
        fade,
        start: Cell::new(None),
        control: control.clone(),
    });
    let handle = scheduler.request_frame(Box::new(move || task.step()));
    *control.frame.borrow_mut() = Some(handle);

    Animation { control, done: rx }
}

/// Show an element and raise its opacity from 0 to 1 over `duration_ms`
/// (`DEFAULT_FADE_MS` when `None`)
pub fn fade_in<D: Dom + 'static>(
    dom: Rc<D>,
    scheduler: Rc<dyn Scheduler>,
    node: &D::Node,
    duration_ms: Option<f64>,
) -> Animation {
    dom.set_style(node, "opacity", "0");
    dom.set_style(node, "display", "block");
    let duration = duration_ms.unwrap_or(DEFAULT_FADE_MS);
    start_fade(dom, scheduler, node.clone(), duration, Fade::In)
}

/// Lower opacity from 1 to 0 over `duration_ms` (`DEFAULT_FADE_MS` when
/// `None`), then hide the element
pub fn fade_out<D: Dom + 'static>(
    dom: Rc<D>,
    scheduler: Rc<dyn Scheduler>,
    node: &D::Node,
    duration_ms: Option<f64>,
) -> Animation {
    let duration = duration_ms.unwrap_or(DEFAULT_FADE_MS);
    start_fade(dom, scheduler, node.clone(), duration, Fade::Out)
}

/// Smoothly scroll the window so `node` sits `offset` pixels below the top
pub fn smooth_scroll_to<D: Dom + ?Sized>(dom: &D, node: Option<&D::Node>, offset: f64) {
    if let Some(node) = node {
        dom.scroll_to(dom.offset_top(node) - offset);
    }
}
