//! Page Kit
//!
//! Helpers for page scripts compiled to WASM:
//! - `dom`: the `Dom` capability and lookup/listener helpers
//! - `browser` / `memory`: live and headless `Dom` implementations
//!   (`memory`, `ManualScheduler` and `MemoryStore` need the `testing` feature)
//! - `schedule`: cancellable timers and animation frames
//! - `animation`: opacity fades and smooth scrolling
//! - `perf`: debounce, throttle, timing
//! - `form`: field validation and extraction
//! - `storage`: JSON values in `localStorage`

pub mod animation;
pub mod browser;
pub mod dom;
pub mod form;
#[cfg(any(test, feature = "testing"))]
pub mod memory;
pub mod perf;
pub mod schedule;
pub mod storage;

pub use animation::{fade_in, fade_out, smooth_scroll_to, Animation, AnimationEnd, DEFAULT_FADE_MS};
pub use browser::BrowserDom;
pub use dom::{add_event_listener_safe, element_by_id, toggle_class, Dom};
pub use form::{form_record, is_valid_email, reset_form, validate_required, FormRecord};
#[cfg(any(test, feature = "testing"))]
pub use memory::{MemoryDom, NodeId};
pub use perf::{measure, Debounce, Throttle};
pub use schedule::{BrowserScheduler, Scheduler, TaskHandle};
pub use storage::{BrowserStore, JsonStorage, KeyValueStore, StorageError};

#[cfg(any(test, feature = "testing"))]
pub use schedule::ManualScheduler;
#[cfg(any(test, feature = "testing"))]
pub use storage::MemoryStore;
