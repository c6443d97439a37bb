//! Scroll-Triggered Reveal
//!
//! Sections gain the `visible` class the first time enough of them enters
//! the viewport. Revealed sections are no longer observed.

use page_kit::{BrowserDom, Dom};
use wasm_bindgen::closure::Closure;
use wasm_bindgen::{JsCast, JsValue};
use web_sys::{Element, IntersectionObserver, IntersectionObserverEntry, IntersectionObserverInit};

use crate::config::SiteConfig;

pub const REVEAL_SELECTOR: &str = "section";
pub const VISIBLE_CLASS: &str = "visible";

/// One observer record
#[derive(Debug, Clone)]
pub struct Intersection<N> {
    pub target: N,
    pub is_intersecting: bool,
}

/// Reveal intersecting targets, returning the ones to stop observing
pub fn reveal_entries<D: Dom + ?Sized>(dom: &D, entries: &[Intersection<D::Node>]) -> Vec<D::Node> {
    entries
        .iter()
        .filter(|entry| entry.is_intersecting)
        .map(|entry| {
            dom.add_class(&entry.target, VISIBLE_CLASS);
            entry.target.clone()
        })
        .collect()
}

/// Observe every section on the page
pub fn observe_sections(dom: &BrowserDom, config: &SiteConfig) -> Option<IntersectionObserver> {
    let sections = dom.query_selector_all(REVEAL_SELECTOR);
    if sections.is_empty() {
        tracing::debug!("No sections to reveal");
        return None;
    }

    let page = dom.clone();
    let callback = Closure::<dyn FnMut(js_sys::Array, IntersectionObserver)>::new(
        move |records: js_sys::Array, observer: IntersectionObserver| {
            let entries: Vec<Intersection<Element>> = records
                .iter()
                .filter_map(|record| record.dyn_into::<IntersectionObserverEntry>().ok())
                .map(|entry| Intersection {
                    target: entry.target(),
                    is_intersecting: entry.is_intersecting(),
                })
                .collect();
            for revealed in reveal_entries(&page, &entries) {
                observer.unobserve(&revealed);
            }
        },
    );

    let init = IntersectionObserverInit::new();
    init.set_threshold(&JsValue::from_f64(config.reveal_threshold));
    init.set_root_margin(&config.reveal_root_margin);

    let observer = match IntersectionObserver::new_with_options(callback.as_ref().unchecked_ref(), &init) {
        Ok(observer) => observer,
        Err(e) => {
            tracing::warn!("IntersectionObserver unavailable, reveals disabled: {:?}", e);
            return None;
        }
    };
    callback.forget();

    for section in &sections {
        observer.observe(section);
    }
    tracing::debug!("Observing {} sections for reveal", sections.len());
    Some(observer)
}

#[cfg(test)]
mod tests {
    use super::*;
    use page_kit::MemoryDom;

    #[test]
    fn test_reveals_only_intersecting() {
        let dom = MemoryDom::new();
        let about = dom.append(dom.root(), "section", &[("id", "about")]);
        let services = dom.append(dom.root(), "section", &[("id", "services")]);

        let done = reveal_entries(
            &dom,
            &[
                Intersection { target: about, is_intersecting: true },
                Intersection { target: services, is_intersecting: false },
            ],
        );

        assert_eq!(done, vec![about]);
        assert!(dom.has_class(&about, VISIBLE_CLASS));
        assert!(!dom.has_class(&services, VISIBLE_CLASS));
    }

    #[test]
    fn test_reveal_is_idempotent_and_sticky() {
        let dom = MemoryDom::new();
        let hero = dom.append(dom.root(), "section", &[("id", "hero"), ("class", "hero")]);

        reveal_entries(&dom, &[Intersection { target: hero, is_intersecting: true }]);
        reveal_entries(&dom, &[Intersection { target: hero, is_intersecting: true }]);
        reveal_entries(&dom, &[Intersection { target: hero, is_intersecting: false }]);

        assert_eq!(dom.attribute(&hero, "class").as_deref(), Some("hero visible"));
    }
}
