//! Mobile Menu
//!
//! Two-state menu driven by toggle clicks, outside clicks and nav link
//! clicks. The state is mirrored as the `active` class on the toggle button
//! and the menu panel.

use std::cell::Cell;
use std::rc::Rc;

use page_kit::Dom;

pub const TOGGLE_SELECTOR: &str = ".hamburger";
pub const PANEL_SELECTOR: &str = ".nav-menu";
pub const OPEN_CLASS: &str = "active";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MenuState {
    #[default]
    Closed,
    Open,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MenuEvent {
    Toggle,
    ClickOutside,
    NavLinkClicked,
}

impl MenuState {
    pub fn next(self, event: MenuEvent) -> MenuState {
        match (self, event) {
            (MenuState::Closed, MenuEvent::Toggle) => MenuState::Open,
            (MenuState::Closed, _) => MenuState::Closed,
            (MenuState::Open, _) => MenuState::Closed,
        }
    }

    pub fn is_open(self) -> bool {
        self == MenuState::Open
    }
}

pub struct Menu<D: Dom> {
    dom: Rc<D>,
    toggle: D::Node,
    panel: D::Node,
    state: Cell<MenuState>,
}

impl<D: Dom> Menu<D> {
    /// Find the toggle and panel and start closed. None if either is missing.
    pub fn attach(dom: Rc<D>) -> Option<Self> {
        let (Some(toggle), Some(panel)) = (dom.query_selector(TOGGLE_SELECTOR), dom.query_selector(PANEL_SELECTOR))
        else {
            tracing::warn!("Menu toggle or panel not found, mobile menu disabled");
            return None;
        };

        let menu = Self {
            dom,
            toggle,
            panel,
            state: Cell::new(MenuState::Closed),
        };
        menu.apply(MenuState::Closed);
        Some(menu)
    }

    pub fn state(&self) -> MenuState {
        self.state.get()
    }

    pub fn toggle_node(&self) -> &D::Node {
        &self.toggle
    }

    pub fn dispatch(&self, event: MenuEvent) -> MenuState {
        let current = self.state.get();
        let next = current.next(event);
        if next != current {
            tracing::debug!("Menu {:?} -> {:?} on {:?}", current, next, event);
            self.apply(next);
            self.state.set(next);
        }
        next
    }

    pub fn toggle(&self) -> MenuState {
        self.dispatch(MenuEvent::Toggle)
    }

    /// Close the menu when a click lands outside both toggle and panel
    pub fn handle_document_click(&self, target: Option<&D::Node>) -> MenuState {
        let inside = target.is_some_and(|node| {
            self.dom.contains(&self.toggle, node) || self.dom.contains(&self.panel, node)
        });
        if self.state.get().is_open() && !inside {
            self.dispatch(MenuEvent::ClickOutside)
        } else {
            self.state.get()
        }
    }

    fn apply(&self, state: MenuState) {
        for node in [&self.toggle, &self.panel] {
            if state.is_open() {
                self.dom.add_class(node, OPEN_CLASS);
            } else {
                self.dom.remove_class(node, OPEN_CLASS);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use page_kit::{MemoryDom, NodeId};

    struct Page {
        dom: Rc<MemoryDom>,
        toggle: NodeId,
        bar: NodeId,
        panel: NodeId,
        link: NodeId,
        hero: NodeId,
    }

    fn page() -> Page {
        let dom = Rc::new(MemoryDom::new());
        let nav = dom.append(dom.root(), "nav", &[("class", "navbar")]);
        let toggle = dom.append(nav, "div", &[("class", "hamburger")]);
        let bar = dom.append(toggle, "span", &[("class", "bar")]);
        let panel = dom.append(nav, "ul", &[("class", "nav-menu")]);
        let link = dom.append(panel, "a", &[("class", "nav-link"), ("href", "#about")]);
        let hero = dom.append(dom.root(), "section", &[("id", "hero")]);
        Page {
            dom,
            toggle,
            bar,
            panel,
            link,
            hero,
        }
    }

    #[test]
    fn test_transitions() {
        use MenuEvent::*;
        use MenuState::*;

        assert_eq!(Closed.next(Toggle), Open);
        assert_eq!(Open.next(Toggle), Closed);
        assert_eq!(Open.next(ClickOutside), Closed);
        assert_eq!(Open.next(NavLinkClicked), Closed);
        assert_eq!(Closed.next(ClickOutside), Closed);
        assert_eq!(Closed.next(NavLinkClicked), Closed);
    }

    #[test]
    fn test_toggle_parity() {
        let p = page();
        let menu = Menu::attach(p.dom.clone()).unwrap();
        assert_eq!(menu.state(), MenuState::Closed);

        for n in 1..=7 {
            menu.toggle();
            let open = n % 2 == 1;
            assert_eq!(menu.state().is_open(), open);
            assert_eq!(p.dom.has_class(&p.toggle, OPEN_CLASS), open);
            assert_eq!(p.dom.has_class(&p.panel, OPEN_CLASS), open);
        }
    }

    #[test]
    fn test_click_outside_closes() {
        let p = page();
        let menu = Menu::attach(p.dom.clone()).unwrap();

        menu.toggle();
        assert_eq!(menu.handle_document_click(Some(&p.link)), MenuState::Open);
        assert_eq!(menu.handle_document_click(Some(&p.bar)), MenuState::Open);
        assert_eq!(menu.handle_document_click(Some(&p.hero)), MenuState::Closed);
        assert!(!p.dom.has_class(&p.panel, OPEN_CLASS));
    }

    #[test]
    fn test_attach_requires_both_elements() {
        let dom = Rc::new(MemoryDom::new());
        dom.append(dom.root(), "div", &[("class", "hamburger")]);
        assert!(Menu::attach(dom).is_none());
    }

    #[test]
    fn test_attach_starts_closed() {
        let p = page();
        p.dom.add_class(&p.panel, OPEN_CLASS);

        let menu = Menu::attach(p.dom.clone()).unwrap();
        assert_eq!(menu.state(), MenuState::Closed);
        assert!(!p.dom.has_class(&p.panel, OPEN_CLASS));
    }
}
