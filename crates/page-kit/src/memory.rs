//! Headless DOM
//!
//! In-memory element tree implementing `Dom`. Supports the selector subset
//! page scripts use: tag, `#id`, `.class`, `[attr]`, `[attr="v"]`,
//! `[attr^="v"]`, descendant combinators and comma lists.

use std::cell::{Cell, RefCell};
use std::collections::BTreeMap;

use crate::dom::Dom;

/// Handle to a node of a `MemoryDom`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(usize);

#[derive(Debug, Default)]
struct MemoryNode {
    tag: String,
    parent: Option<NodeId>,
    children: Vec<NodeId>,
    attributes: BTreeMap<String, String>,
    classes: Vec<String>,
    inner_html: String,
    html_writes: usize,
    text: Option<String>,
    offset_top: f64,
    styles: BTreeMap<String, String>,
    fields: Vec<(String, String)>,
}

#[derive(Debug)]
pub struct MemoryDom {
    nodes: RefCell<Vec<MemoryNode>>,
    scroll_y: Cell<f64>,
    scrolled_into_view: RefCell<Vec<NodeId>>,
    window_scrolls: RefCell<Vec<f64>>,
    alerts: RefCell<Vec<String>>,
}

impl Default for MemoryDom {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryDom {
    pub fn new() -> Self {
        let root = MemoryNode {
            tag: "html".to_string(),
            ..Default::default()
        };
        Self {
            nodes: RefCell::new(vec![root]),
            scroll_y: Cell::new(0.0),
            scrolled_into_view: RefCell::new(Vec::new()),
            window_scrolls: RefCell::new(Vec::new()),
            alerts: RefCell::new(Vec::new()),
        }
    }

    pub fn root(&self) -> NodeId {
        NodeId(0)
    }

    /// Append an element. A `class` attribute is split into the class list.
    pub fn append(&self, parent: NodeId, tag: &str, attrs: &[(&str, &str)]) -> NodeId {
        let mut nodes = self.nodes.borrow_mut();
        let id = NodeId(nodes.len());
        let mut node = MemoryNode {
            tag: tag.to_ascii_lowercase(),
            parent: Some(parent),
            ..Default::default()
        };
        for (name, value) in attrs {
            if *name == "class" {
                node.classes = value.split_whitespace().map(str::to_string).collect();
            } else {
                node.attributes.insert(name.to_string(), value.to_string());
            }
        }
        nodes.push(node);
        nodes[parent.0].children.push(id);
        id
    }

    pub fn set_offset_top(&self, node: NodeId, top: f64) {
        self.nodes.borrow_mut()[node.0].offset_top = top;
    }

    pub fn set_scroll_y(&self, y: f64) {
        self.scroll_y.set(y);
    }

    pub fn set_text(&self, node: NodeId, text: &str) {
        self.nodes.borrow_mut()[node.0].text = Some(text.to_string());
    }

    /// Set a form field value, adding the field if needed
    pub fn set_field(&self, form: NodeId, name: &str, value: &str) {
        let mut nodes = self.nodes.borrow_mut();
        let fields = &mut nodes[form.0].fields;
        match fields.iter_mut().find(|(n, _)| n == name) {
            Some(field) => field.1 = value.to_string(),
            None => fields.push((name.to_string(), value.to_string())),
        }
    }

    pub fn field(&self, form: NodeId, name: &str) -> Option<String> {
        self.nodes.borrow()[form.0]
            .fields
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, v)| v.clone())
    }

    pub fn style(&self, node: NodeId, property: &str) -> Option<String> {
        self.nodes.borrow()[node.0].styles.get(property).cloned()
    }

    pub fn inner_html_writes(&self, node: NodeId) -> usize {
        self.nodes.borrow()[node.0].html_writes
    }

    pub fn scrolled_into_view(&self) -> Vec<NodeId> {
        self.scrolled_into_view.borrow().clone()
    }

    pub fn window_scrolls(&self) -> Vec<f64> {
        self.window_scrolls.borrow().clone()
    }

    pub fn alerts(&self) -> Vec<String> {
        self.alerts.borrow().clone()
    }

    /// Nodes in document order, root excluded
    fn document_order(&self) -> Vec<NodeId> {
        let nodes = self.nodes.borrow();
        let mut order = Vec::with_capacity(nodes.len());
        let mut stack: Vec<NodeId> = nodes[0].children.iter().rev().copied().collect();
        while let Some(id) = stack.pop() {
            order.push(id);
            stack.extend(nodes[id.0].children.iter().rev().copied());
        }
        order
    }

    fn matches(&self, id: NodeId, selector: &Selector) -> bool {
        let nodes = self.nodes.borrow();
        selector.chains.iter().any(|chain| matches_chain(&nodes, id, chain))
    }

    fn select(&self, selector: &str) -> Vec<NodeId> {
        let selector = Selector::parse(selector);
        self.document_order()
            .into_iter()
            .filter(|id| self.matches(*id, &selector))
            .collect()
    }
}

impl Dom for MemoryDom {
    type Node = NodeId;

    fn get_element_by_id(&self, id: &str) -> Option<NodeId> {
        let nodes = self.nodes.borrow();
        self.document_order()
            .into_iter()
            .find(|n| nodes[n.0].attributes.get("id").map(String::as_str) == Some(id))
    }

    fn query_selector(&self, selector: &str) -> Option<NodeId> {
        self.select(selector).into_iter().next()
    }

    fn query_selector_all(&self, selector: &str) -> Vec<NodeId> {
        self.select(selector)
    }

    fn inner_html(&self, node: &NodeId) -> String {
        self.nodes.borrow()[node.0].inner_html.clone()
    }

    fn set_inner_html(&self, node: &NodeId, html: &str) {
        let mut nodes = self.nodes.borrow_mut();
        let target = &mut nodes[node.0];
        target.inner_html = html.to_string();
        target.html_writes += 1;
    }

    fn text_content(&self, node: &NodeId) -> Option<String> {
        self.nodes.borrow()[node.0].text.clone()
    }

    fn has_class(&self, node: &NodeId, class: &str) -> bool {
        self.nodes.borrow()[node.0].classes.iter().any(|c| c == class)
    }

    fn add_class(&self, node: &NodeId, class: &str) {
        if !self.has_class(node, class) {
            self.nodes.borrow_mut()[node.0].classes.push(class.to_string());
        }
    }

    fn remove_class(&self, node: &NodeId, class: &str) {
        self.nodes.borrow_mut()[node.0].classes.retain(|c| c != class);
    }

    fn toggle_class(&self, node: &NodeId, class: &str) -> bool {
        if self.has_class(node, class) {
            self.remove_class(node, class);
            false
        } else {
            self.add_class(node, class);
            true
        }
    }

    fn attribute(&self, node: &NodeId, name: &str) -> Option<String> {
        let nodes = self.nodes.borrow();
        let target = &nodes[node.0];
        if name == "class" {
            return Some(target.classes.join(" "));
        }
        target.attributes.get(name).cloned()
    }

    fn contains(&self, ancestor: &NodeId, node: &NodeId) -> bool {
        let nodes = self.nodes.borrow();
        let mut current = Some(*node);
        while let Some(id) = current {
            if id == *ancestor {
                return true;
            }
            current = nodes[id.0].parent;
        }
        false
    }

    fn offset_top(&self, node: &NodeId) -> f64 {
        self.nodes.borrow()[node.0].offset_top
    }

    fn set_style(&self, node: &NodeId, property: &str, value: &str) {
        self.nodes.borrow_mut()[node.0]
            .styles
            .insert(property.to_string(), value.to_string());
    }

    fn scroll_y(&self) -> f64 {
        self.scroll_y.get()
    }

    fn scroll_into_view(&self, node: &NodeId) {
        self.scrolled_into_view.borrow_mut().push(*node);
        self.scroll_y.set(self.offset_top(node));
    }

    fn scroll_to(&self, top: f64) {
        self.window_scrolls.borrow_mut().push(top);
        self.scroll_y.set(top);
    }

    fn form_entries(&self, form: &NodeId) -> Vec<(String, String)> {
        self.nodes.borrow()[form.0].fields.clone()
    }

    fn reset_form(&self, form: &NodeId) {
        for field in self.nodes.borrow_mut()[form.0].fields.iter_mut() {
            field.1.clear();
        }
    }

    fn alert(&self, message: &str) {
        self.alerts.borrow_mut().push(message.to_string());
    }
}

// ========================
// Selectors
// ========================

#[derive(Debug)]
enum AttrTest {
    Present(String),
    Equals(String, String),
    Prefix(String, String),
}

#[derive(Debug, Default)]
struct Compound {
    tag: Option<String>,
    id: Option<String>,
    classes: Vec<String>,
    attrs: Vec<AttrTest>,
}

#[derive(Debug)]
struct Selector {
    /// Alternatives; each is a descendant chain, outermost first
    chains: Vec<Vec<Compound>>,
}

impl Selector {
    fn parse(src: &str) -> Self {
        let chains = src
            .split(',')
            .map(|alt| alt.split_whitespace().map(Compound::parse).collect::<Vec<_>>())
            .filter(|chain| !chain.is_empty())
            .collect();
        Self { chains }
    }
}

fn is_marker(c: char) -> bool {
    matches!(c, '.' | '#' | '[')
}

impl Compound {
    fn parse(src: &str) -> Self {
        let mut compound = Compound::default();
        let tag_end = src.find(is_marker).unwrap_or(src.len());
        if tag_end > 0 && &src[..tag_end] != "*" {
            compound.tag = Some(src[..tag_end].to_ascii_lowercase());
        }

        let mut rest = &src[tag_end..];
        while let Some(marker) = rest.chars().next() {
            if marker == '[' {
                let close = rest.find(']').unwrap_or(rest.len());
                compound.attrs.push(AttrTest::parse(&rest[1..close]));
                rest = rest.get(close + 1..).unwrap_or("");
            } else {
                let body = &rest[1..];
                let end = body.find(is_marker).unwrap_or(body.len());
                let name = body[..end].to_string();
                if marker == '.' {
                    compound.classes.push(name);
                } else {
                    compound.id = Some(name);
                }
                rest = &body[end..];
            }
        }
        compound
    }

    fn matches(&self, node: &MemoryNode) -> bool {
        if self.tag.as_deref().is_some_and(|tag| tag != node.tag) {
            return false;
        }
        if self.id.as_deref().is_some_and(|id| node.attributes.get("id").map(String::as_str) != Some(id)) {
            return false;
        }
        if !self.classes.iter().all(|c| node.classes.contains(c)) {
            return false;
        }
        self.attrs.iter().all(|test| test.matches(node))
    }
}

impl AttrTest {
    fn parse(body: &str) -> Self {
        let unquote = |v: &str| v.trim().trim_matches(|c: char| c == '"' || c == '\'').to_string();
        if let Some((name, value)) = body.split_once("^=") {
            AttrTest::Prefix(name.trim().to_string(), unquote(value))
        } else if let Some((name, value)) = body.split_once('=') {
            AttrTest::Equals(name.trim().to_string(), unquote(value))
        } else {
            AttrTest::Present(body.trim().to_string())
        }
    }

    fn matches(&self, node: &MemoryNode) -> bool {
        let value = |name: &str| -> Option<String> {
            if name == "class" {
                Some(node.classes.join(" "))
            } else {
                node.attributes.get(name).cloned()
            }
        };
        match self {
            AttrTest::Present(name) => value(name).is_some(),
            AttrTest::Equals(name, expected) => value(name).as_deref() == Some(expected.as_str()),
            AttrTest::Prefix(name, prefix) => value(name).is_some_and(|v| v.starts_with(prefix.as_str())),
        }
    }
}

fn matches_chain(nodes: &[MemoryNode], id: NodeId, chain: &[Compound]) -> bool {
    let Some((last, ancestors)) = chain.split_last() else {
        return false;
    };
    if !last.matches(&nodes[id.0]) {
        return false;
    }

    // Match remaining compounds against ancestors, innermost first
    let mut current = nodes[id.0].parent;
    for compound in ancestors.iter().rev() {
        loop {
            match current {
                Some(NodeId(0)) | None => return false,
                Some(ancestor) => {
                    current = nodes[ancestor.0].parent;
                    if compound.matches(&nodes[ancestor.0]) {
                        break;
                    }
                }
            }
        }
    }
    true
}
