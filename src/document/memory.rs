//! In-memory document tree.

use std::collections::BTreeMap;

use super::selector::{Matchable, Selector};
use super::{Document, NodeId, Rect, Viewport};

#[derive(Debug, Clone, Default)]
struct Element {
    tag: String,
    parent: Option<NodeId>,
    children: Vec<NodeId>,
    classes: Vec<String>,
    styles: BTreeMap<String, String>,
    attributes: BTreeMap<String, String>,
    text: String,
    rect: Rect,
}

impl Matchable for Element {
    fn tag(&self) -> &str {
        &self.tag
    }

    fn has_class(&self, class: &str) -> bool {
        self.classes.iter().any(|c| c == class)
    }

    fn attribute(&self, name: &str) -> Option<&str> {
        self.attributes.get(name).map(String::as_str)
    }
}

/// A [`Document`] held entirely in memory.
///
/// Node 0 is `<body>`. Elements are only reachable by queries once they are
/// attached below the body.
#[derive(Debug, Clone)]
pub struct MemoryDocument {
    nodes: Vec<Element>,
    viewport: Viewport,
}

impl Default for MemoryDocument {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryDocument {
    pub fn new() -> Self {
        Self {
            nodes: vec![Element {
                tag: "body".to_string(),
                ..Element::default()
            }],
            viewport: Viewport {
                scroll_y: 0.0,
                height: 800.0,
                document_height: 800.0,
            },
        }
    }

    /// A page with the standard loading screen markup:
    /// `.loading-screen > .loading-screen__progress + .loading-screen__percent`.
    pub fn with_loading_screen() -> Self {
        let mut doc = Self::new();
        let body = doc.body();
        let root = doc.append(body, "div", &["loading-screen"]);
        doc.append(root, "div", &["loading-screen__progress"]);
        doc.append(root, "span", &["loading-screen__percent"]);
        doc
    }

    /// Create an element with the given classes and attach it to `parent`.
    pub fn append(&mut self, parent: NodeId, tag: &str, classes: &[&str]) -> NodeId {
        let node = self.create_element(tag);
        for class in classes {
            self.add_class(node, class);
        }
        self.append_child(parent, node);
        node
    }

    pub fn set_viewport(&mut self, viewport: Viewport) {
        self.viewport = viewport;
    }

    pub fn scroll_to(&mut self, scroll_y: f64) {
        self.viewport.scroll_y = scroll_y;
    }

    pub fn set_rect(&mut self, node: NodeId, rect: Rect) {
        if let Some(el) = self.nodes.get_mut(node.0) {
            el.rect = rect;
        }
    }

    pub fn parent(&self, node: NodeId) -> Option<NodeId> {
        self.nodes.get(node.0).and_then(|el| el.parent)
    }

    pub fn children(&self, node: NodeId) -> &[NodeId] {
        self.nodes
            .get(node.0)
            .map(|el| el.children.as_slice())
            .unwrap_or(&[])
    }

    pub fn tag(&self, node: NodeId) -> Option<&str> {
        self.nodes.get(node.0).map(|el| el.tag.as_str())
    }

    /// Class names of `node` in insertion order.
    pub fn classes(&self, node: NodeId) -> Vec<String> {
        self.nodes
            .get(node.0)
            .map(|el| el.classes.clone())
            .unwrap_or_default()
    }

    fn descendants(&self, root: NodeId) -> Vec<NodeId> {
        let mut out = Vec::new();
        let mut stack: Vec<NodeId> = self.children(root).iter().rev().copied().collect();
        while let Some(node) = stack.pop() {
            out.push(node);
            stack.extend(self.children(node).iter().rev().copied());
        }
        out
    }

    fn matching(&self, root: NodeId, selector: &str) -> Vec<NodeId> {
        let Some(selector) = Selector::parse(selector) else {
            return Vec::new();
        };
        self.descendants(root)
            .into_iter()
            .filter(|node| selector.matches(&self.nodes[node.0]))
            .collect()
    }

    fn element_mut(&mut self, node: NodeId) -> Option<&mut Element> {
        self.nodes.get_mut(node.0)
    }
}

impl Document for MemoryDocument {
    fn body(&self) -> NodeId {
        NodeId(0)
    }

    fn query_all(&self, selector: &str) -> Vec<NodeId> {
        self.matching(self.body(), selector)
    }

    fn query_within(&self, root: NodeId, selector: &str) -> Option<NodeId> {
        self.matching(root, selector).into_iter().next()
    }

    fn query_all_within(&self, root: NodeId, selector: &str) -> Vec<NodeId> {
        self.matching(root, selector)
    }

    fn create_element(&mut self, tag: &str) -> NodeId {
        self.nodes.push(Element {
            tag: tag.to_ascii_lowercase(),
            ..Element::default()
        });
        NodeId(self.nodes.len() - 1)
    }

    fn append_child(&mut self, parent: NodeId, child: NodeId) {
        if parent == child || parent.0 >= self.nodes.len() || child.0 >= self.nodes.len() {
            return;
        }
        // Refuse to attach an ancestor below its own descendant.
        let mut cursor = Some(parent);
        while let Some(node) = cursor {
            if node == child {
                return;
            }
            cursor = self.nodes[node.0].parent;
        }
        if let Some(old_parent) = self.nodes[child.0].parent {
            self.nodes[old_parent.0].children.retain(|c| *c != child);
        }
        self.nodes[child.0].parent = Some(parent);
        self.nodes[parent.0].children.push(child);
    }

    fn add_class(&mut self, node: NodeId, class: &str) {
        if let Some(el) = self.element_mut(node) {
            if !el.classes.iter().any(|c| c == class) {
                el.classes.push(class.to_string());
            }
        }
    }

    fn remove_class(&mut self, node: NodeId, class: &str) {
        if let Some(el) = self.element_mut(node) {
            el.classes.retain(|c| c != class);
        }
    }

    fn has_class(&self, node: NodeId, class: &str) -> bool {
        self.nodes
            .get(node.0)
            .is_some_and(|el| el.classes.iter().any(|c| c == class))
    }

    fn set_style(&mut self, node: NodeId, property: &str, value: &str) {
        if let Some(el) = self.element_mut(node) {
            if value.is_empty() {
                el.styles.remove(property);
            } else {
                el.styles.insert(property.to_string(), value.to_string());
            }
        }
    }

    fn style(&self, node: NodeId, property: &str) -> Option<String> {
        self.nodes
            .get(node.0)
            .and_then(|el| el.styles.get(property).cloned())
    }

    fn set_text(&mut self, node: NodeId, text: &str) {
        if let Some(el) = self.element_mut(node) {
            el.text = text.to_string();
        }
    }

    fn text(&self, node: NodeId) -> String {
        self.nodes
            .get(node.0)
            .map(|el| el.text.clone())
            .unwrap_or_default()
    }

    fn attribute(&self, node: NodeId, name: &str) -> Option<String> {
        self.nodes
            .get(node.0)
            .and_then(|el| el.attributes.get(name).cloned())
    }

    fn set_attribute(&mut self, node: NodeId, name: &str, value: &str) {
        if let Some(el) = self.element_mut(node) {
            el.attributes.insert(name.to_string(), value.to_string());
        }
    }

    fn remove_attribute(&mut self, node: NodeId, name: &str) {
        if let Some(el) = self.element_mut(node) {
            el.attributes.remove(name);
        }
    }

    fn viewport(&self) -> Viewport {
        self.viewport
    }

    fn rect(&self, node: NodeId) -> Rect {
        self.nodes
            .get(node.0)
            .map(|el| el.rect)
            .unwrap_or_default()
    }
}
