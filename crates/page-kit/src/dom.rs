//! DOM Access
//!
//! The `Dom` trait is the only way page code touches the document.
//! `BrowserDom` backs it with web-sys, `MemoryDom` with an in-memory tree.

use std::fmt::Debug;

use wasm_bindgen::closure::Closure;
use wasm_bindgen::JsCast;

/// Capability over a document and its window
pub trait Dom {
    /// Element handle
    type Node: Clone + PartialEq + Debug + 'static;

    fn get_element_by_id(&self, id: &str) -> Option<Self::Node>;

    /// First match in document order
    fn query_selector(&self, selector: &str) -> Option<Self::Node>;

    /// All matches in document order
    fn query_selector_all(&self, selector: &str) -> Vec<Self::Node>;

    fn inner_html(&self, node: &Self::Node) -> String;
    fn set_inner_html(&self, node: &Self::Node, html: &str);
    fn text_content(&self, node: &Self::Node) -> Option<String>;

    fn has_class(&self, node: &Self::Node, class: &str) -> bool;
    fn add_class(&self, node: &Self::Node, class: &str);
    fn remove_class(&self, node: &Self::Node, class: &str);

    /// Flip `class`, returning whether it is now present
    fn toggle_class(&self, node: &Self::Node, class: &str) -> bool;

    fn attribute(&self, node: &Self::Node, name: &str) -> Option<String>;

    /// True when `node` is `ancestor` or one of its descendants
    fn contains(&self, ancestor: &Self::Node, node: &Self::Node) -> bool;

    fn offset_top(&self, node: &Self::Node) -> f64;
    fn set_style(&self, node: &Self::Node, property: &str, value: &str);

    /// Current vertical scroll offset of the window
    fn scroll_y(&self) -> f64;

    /// Smoothly scroll `node` to the top of the viewport
    fn scroll_into_view(&self, node: &Self::Node);

    /// Smoothly scroll the window to `top`
    fn scroll_to(&self, top: f64);

    /// Named text fields of a form, in form order
    fn form_entries(&self, form: &Self::Node) -> Vec<(String, String)>;
    fn reset_form(&self, form: &Self::Node);

    /// Blocking user notification
    fn alert(&self, message: &str);
}

/// Look up an element by id, warning when it is absent
pub fn element_by_id<D: Dom + ?Sized>(dom: &D, id: &str) -> Option<D::Node> {
    let element = dom.get_element_by_id(id);
    if element.is_none() {
        tracing::warn!("Element with ID '{}' not found", id);
    }
    element
}

/// Toggle a class if the element exists
pub fn toggle_class<D: Dom + ?Sized>(dom: &D, node: Option<&D::Node>, class: &str) {
    if let Some(node) = node {
        dom.toggle_class(node, class);
    }
}

/// Attach a listener for the lifetime of the page.
///
/// Returns false, with a warning, when there is no target or no event name.
pub fn add_event_listener_safe<F>(target: Option<&web_sys::EventTarget>, event: &str, handler: F) -> bool
where
    F: FnMut(web_sys::Event) + 'static,
{
    let target = match target {
        Some(target) if !event.is_empty() => target,
        _ => {
            tracing::warn!("Invalid element or handler for event listener");
            return false;
        }
    };

    let callback = Closure::<dyn FnMut(web_sys::Event)>::new(handler);
    let attached = target
        .add_event_listener_with_callback(event, callback.as_ref().unchecked_ref())
        .is_ok();
    callback.forget();

    if !attached {
        tracing::warn!("Failed to attach '{}' listener", event);
    }
    attached
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::MemoryDom;

    #[test]
    fn test_element_by_id() {
        let dom = MemoryDom::new();
        let hero = dom.append(dom.root(), "section", &[("id", "hero")]);

        assert_eq!(element_by_id(&dom, "hero"), Some(hero));
        assert_eq!(element_by_id(&dom, "nope"), None);
    }

    #[test]
    fn test_toggle_class_skips_missing() {
        let dom = MemoryDom::new();
        let menu = dom.append(dom.root(), "ul", &[("class", "nav-menu")]);

        toggle_class(&dom, Some(&menu), "active");
        assert!(dom.has_class(&menu, "active"));
        toggle_class(&dom, None, "active");
        toggle_class(&dom, Some(&menu), "active");
        assert!(!dom.has_class(&menu, "active"));
    }

    #[test]
    fn test_add_event_listener_safe_rejects_missing_target() {
        assert!(!add_event_listener_safe(None, "click", |_| {}));
    }
}
