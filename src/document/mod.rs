//! Render surface abstraction
//!
//! Every procedure that touches the page goes through the [`Document`] trait
//! instead of ambient globals, so the loading sequencer and the page effects
//! can be driven against an injected surface:
//! - Element lookup by a small selector subset
//! - Class list, inline style, text and attribute mutation
//! - Viewport and element geometry reads
//!
//! [`MemoryDocument`] is the in-process implementation used by the terminal
//! preview and the tests.

pub mod memory;
pub mod selector;

pub use memory::MemoryDocument;
pub use selector::Selector;

/// Opaque handle to an element owned by a [`Document`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(pub(crate) usize);

/// Bounding box of an element relative to the viewport, in CSS pixels.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Rect {
    pub top: f64,
    pub left: f64,
    pub width: f64,
    pub height: f64,
}

impl Rect {
    pub fn new(left: f64, top: f64, width: f64, height: f64) -> Self {
        Self {
            top,
            left,
            width,
            height,
        }
    }

    pub fn center_x(&self) -> f64 {
        self.left + self.width / 2.0
    }

    pub fn center_y(&self) -> f64 {
        self.top + self.height / 2.0
    }
}

/// Scroll and size state of the window.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Viewport {
    /// Vertical scroll offset (`window.scrollY`).
    pub scroll_y: f64,
    /// Height of the visible area.
    pub height: f64,
    /// Full scrollable height of the document.
    pub document_height: f64,
}

/// A mutable page the site runtime renders into.
///
/// Lookups that find nothing return `None`/empty and are never errors;
/// callers treat a missing element as "feature not applicable here".
pub trait Document {
    fn body(&self) -> NodeId;

    fn query_all(&self, selector: &str) -> Vec<NodeId>;

    fn query(&self, selector: &str) -> Option<NodeId> {
        self.query_all(selector).into_iter().next()
    }

    /// First descendant of `root` matching `selector`.
    fn query_within(&self, root: NodeId, selector: &str) -> Option<NodeId>;

    /// All descendants of `root` matching `selector`, in document order.
    fn query_all_within(&self, root: NodeId, selector: &str) -> Vec<NodeId>;

    /// Create a detached element. It is not visible to queries until appended.
    fn create_element(&mut self, tag: &str) -> NodeId;

    fn append_child(&mut self, parent: NodeId, child: NodeId);

    fn add_class(&mut self, node: NodeId, class: &str);
    fn remove_class(&mut self, node: NodeId, class: &str);
    fn has_class(&self, node: NodeId, class: &str) -> bool;

    /// Flip `class` on `node` and return whether it is now present.
    fn toggle_class(&mut self, node: NodeId, class: &str) -> bool {
        if self.has_class(node, class) {
            self.remove_class(node, class);
            false
        } else {
            self.add_class(node, class);
            true
        }
    }

    /// Set an inline style property. An empty value removes the property.
    fn set_style(&mut self, node: NodeId, property: &str, value: &str);
    fn style(&self, node: NodeId, property: &str) -> Option<String>;

    fn set_text(&mut self, node: NodeId, text: &str);
    fn text(&self, node: NodeId) -> String;

    fn attribute(&self, node: NodeId, name: &str) -> Option<String>;
    fn set_attribute(&mut self, node: NodeId, name: &str, value: &str);
    fn remove_attribute(&mut self, node: NodeId, name: &str);

    fn viewport(&self) -> Viewport;
    fn rect(&self, node: NodeId) -> Rect;
}

/// Parse a numeric data attribute, falling back to `default` when the
/// attribute is missing, malformed, non-finite or zero.
pub fn numeric_attribute<D: Document + ?Sized>(
    doc: &D,
    node: NodeId,
    name: &str,
    default: f64,
) -> f64 {
    doc.attribute(node, name)
        .and_then(|raw| parse_leading_number(&raw))
        .filter(|v| v.is_finite() && *v != 0.0)
        .unwrap_or(default)
}

/// Parse the leading numeric prefix of `raw` ("2.5s" -> 2.5), the way
/// browsers' `parseFloat` does.
fn parse_leading_number(raw: &str) -> Option<f64> {
    let trimmed = raw.trim_start();
    let mut end = 0;
    let mut seen_digit = false;
    let mut seen_dot = false;
    for (i, c) in trimmed.char_indices() {
        match c {
            '+' | '-' if i == 0 => {}
            '0'..='9' => seen_digit = true,
            '.' if !seen_dot => seen_dot = true,
            _ => break,
        }
        end = i + c.len_utf8();
    }
    if !seen_digit {
        return None;
    }
    trimmed[..end].parse().ok()
}
