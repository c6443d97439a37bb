//! Scroll Effects
//!
//! Navbar styling and active-link highlighting driven by the scroll offset.

use page_kit::Dom;

use crate::config::SiteConfig;

pub const NAVBAR_SELECTOR: &str = ".navbar";
pub const SCROLLED_CLASS: &str = "scrolled";
pub const SECTION_SELECTOR: &str = "section[id]";
pub const LINK_SELECTOR: &str = ".nav-link";
pub const ACTIVE_CLASS: &str = "active";

/// Toggle the navbar's `scrolled` style. Returns whether it is applied.
pub fn update_navbar<D: Dom + ?Sized>(dom: &D, threshold: f64) -> bool {
    let Some(navbar) = dom.query_selector(NAVBAR_SELECTOR) else {
        return false;
    };
    let scrolled = dom.scroll_y() > threshold;
    if scrolled {
        dom.add_class(&navbar, SCROLLED_CLASS);
    } else {
        dom.remove_class(&navbar, SCROLLED_CLASS);
    }
    scrolled
}

/// Id of the last section whose top, less `lookahead`, has been scrolled past
pub fn active_section<D: Dom + ?Sized>(dom: &D, scroll_y: f64, lookahead: f64) -> Option<String> {
    dom.query_selector_all(SECTION_SELECTOR)
        .iter()
        .filter(|section| scroll_y >= dom.offset_top(section) - lookahead)
        .last()
        .and_then(|section| dom.attribute(section, "id"))
}

/// Mark the nav link pointing at the active section
pub fn highlight_active_link<D: Dom + ?Sized>(dom: &D, lookahead: f64) -> Option<String> {
    let current = active_section(dom, dom.scroll_y(), lookahead);
    let target = current.as_ref().map(|id| format!("#{}", id));

    for link in dom.query_selector_all(LINK_SELECTOR) {
        dom.remove_class(&link, ACTIVE_CLASS);
        if target.is_some() && dom.attribute(&link, "href") == target {
            dom.add_class(&link, ACTIVE_CLASS);
        }
    }
    current
}

/// Everything a scroll event updates
pub fn on_scroll<D: Dom + ?Sized>(dom: &D, config: &SiteConfig) {
    update_navbar(dom, config.navbar_scroll_threshold);
    highlight_active_link(dom, config.section_lookahead);
}
