//! In-Page Navigation
//!
//! Clicks on `#fragment` links scroll the target section into view instead
//! of jumping, and close the mobile menu.

use page_kit::Dom;

use crate::menu::{Menu, MenuEvent};

/// Links whose clicks are routed through `follow_link`
pub const NAV_LINK_SELECTOR: &str = r##".nav-link, .btn[href^="#"], .footer-links a[href^="#"]"##;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NavOutcome {
    /// Not a fragment link; the browser handles it
    External,
    /// Fragment link whose target is not on the page
    Missing(String),
    /// Target scrolled into view
    Scrolled(String),
}

impl NavOutcome {
    pub fn prevents_default(&self) -> bool {
        !matches!(self, NavOutcome::External)
    }
}

/// Id named by a `#fragment` href
pub fn fragment_target(href: &str) -> Option<&str> {
    href.strip_prefix('#')
}

/// True when `node` is, or sits inside, a link handled by `follow_link`
pub fn is_nav_link<D: Dom + ?Sized>(dom: &D, node: &D::Node) -> bool {
    dom.query_selector_all(NAV_LINK_SELECTOR)
        .iter()
        .any(|link| dom.contains(link, node))
}

pub fn follow_link<D: Dom>(dom: &D, menu: Option<&Menu<D>>, link: &D::Node) -> NavOutcome {
    let Some(href) = dom.attribute(link, "href") else {
        return NavOutcome::External;
    };
    let Some(id) = fragment_target(&href) else {
        return NavOutcome::External;
    };

    let target = if id.is_empty() { None } else { dom.get_element_by_id(id) };
    match target {
        Some(target) => {
            dom.scroll_into_view(&target);
            if let Some(menu) = menu {
                menu.dispatch(MenuEvent::NavLinkClicked);
            }
            NavOutcome::Scrolled(id.to_string())
        }
        None => {
            tracing::debug!("No section for link {}", href);
            NavOutcome::Missing(id.to_string())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::menu::{MenuState, OPEN_CLASS};
    use page_kit::{MemoryDom, NodeId};
    use std::rc::Rc;

    struct Page {
        dom: Rc<MemoryDom>,
        about_link: NodeId,
        dead_link: NodeId,
        blog_link: NodeId,
        cta: NodeId,
        about: NodeId,
    }

    fn page() -> Page {
        let dom = Rc::new(MemoryDom::new());
        let nav = dom.append(dom.root(), "nav", &[("class", "navbar")]);
        dom.append(nav, "div", &[("class", "hamburger")]);
        let menu = dom.append(nav, "ul", &[("class", "nav-menu")]);
        let about_link = dom.append(menu, "a", &[("class", "nav-link"), ("href", "#about")]);
        let dead_link = dom.append(menu, "a", &[("class", "nav-link"), ("href", "#pricing")]);
        let blog_link = dom.append(menu, "a", &[("class", "nav-link"), ("href", "/blog")]);
        let hero = dom.append(dom.root(), "section", &[("id", "hero")]);
        let cta = dom.append(hero, "a", &[("class", "btn btn-primary"), ("href", "#about")]);
        let about = dom.append(dom.root(), "section", &[("id", "about")]);
        dom.set_offset_top(about, 800.0);
        Page {
            dom,
            about_link,
            dead_link,
            blog_link,
            cta,
            about,
        }
    }

    #[test]
    fn test_selector_covers_nav_and_buttons() {
        let p = page();
        let links = p.dom.query_selector_all(NAV_LINK_SELECTOR);
        assert_eq!(links, vec![p.about_link, p.dead_link, p.blog_link, p.cta]);
    }

    #[test]
    fn test_existing_target_scrolls_and_closes_menu() {
        let p = page();
        let menu = Menu::attach(p.dom.clone()).unwrap();
        menu.toggle();

        let outcome = follow_link(&*p.dom, Some(&menu), &p.about_link);

        assert_eq!(outcome, NavOutcome::Scrolled("about".to_string()));
        assert_eq!(p.dom.scrolled_into_view(), vec![p.about]);
        assert_eq!(p.dom.scroll_y(), 800.0);
        assert_eq!(menu.state(), MenuState::Closed);
    }

    #[test]
    fn test_missing_target_changes_nothing() {
        let p = page();
        let menu = Menu::attach(p.dom.clone()).unwrap();
        menu.toggle();

        let outcome = follow_link(&*p.dom, Some(&menu), &p.dead_link);

        assert_eq!(outcome, NavOutcome::Missing("pricing".to_string()));
        assert!(outcome.prevents_default());
        assert!(p.dom.scrolled_into_view().is_empty());
        assert_eq!(menu.state(), MenuState::Open);
        assert!(p.dom.has_class(menu.toggle_node(), OPEN_CLASS));
    }

    #[test]
    fn test_external_link_is_left_alone() {
        let p = page();
        let outcome = follow_link(&*p.dom, None, &p.blog_link);

        assert_eq!(outcome, NavOutcome::External);
        assert!(!outcome.prevents_default());
    }

    #[test]
    fn test_is_nav_link() {
        let p = page();
        let label = p.dom.append(p.cta, "span", &[]);

        assert!(is_nav_link(&*p.dom, &p.cta));
        assert!(is_nav_link(&*p.dom, &label));
        assert!(is_nav_link(&*p.dom, &p.blog_link));
        assert!(!is_nav_link(&*p.dom, &p.about));
    }

    #[test]
    fn test_works_without_menu() {
        let p = page();
        assert_eq!(
            follow_link(&*p.dom, None, &p.cta),
            NavOutcome::Scrolled("about".to_string())
        );
    }
}
