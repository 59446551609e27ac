//! Pointer-driven effects. All of them are skipped on touch devices and under
//! reduced motion.

use super::{lerp, MotionPreference};
use crate::document::{Document, NodeId, Rect};

pub const CURSOR_FOLLOW_FACTOR: f64 = 0.12;
pub const MAX_TILT_DEG: f64 = 10.0;
pub const MAGNETIC_STRENGTH: f64 = 0.3;
pub const MAGNETIC_EASE: f64 = 0.15;
pub const MAGNETIC_SNAP: f64 = 0.1;

const TILT_TRANSITION: &str = "transform 0.4s cubic-bezier(0.22, 1, 0.36, 1)";

/// Selector for elements that enlarge the cursor on hover.
pub const INTERACTIVE_SELECTOR: &str = "a,button,.btn,input[type=\"submit\"],[role=\"button\"]";

// ---------------------------------------------------------------------------
// Custom cursor
// ---------------------------------------------------------------------------

/// A dot pinned to the pointer plus a ring that eases after it.
#[derive(Debug, Clone)]
pub struct CursorFollower {
    dot: NodeId,
    follower: NodeId,
    mouse: (f64, f64),
    position: (f64, f64),
}

impl CursorFollower {
    pub fn init<D: Document + ?Sized>(doc: &mut D, motion: MotionPreference) -> Option<Self> {
        if !motion.allows_pointer_effects() {
            return None;
        }
        let body = doc.body();
        let dot = doc.create_element("div");
        doc.add_class(dot, "cursor-dot");
        let follower = doc.create_element("div");
        doc.add_class(follower, "cursor-follower");
        for node in [dot, follower] {
            for (property, value) in [
                ("position", "fixed"),
                ("top", "0"),
                ("left", "0"),
                ("border-radius", "50%"),
                ("pointer-events", "none"),
                ("z-index", "10001"),
                ("transform", "translate(-50%, -50%)"),
            ] {
                doc.set_style(node, property, value);
            }
            doc.append_child(body, node);
        }
        doc.add_class(body, "has-custom-cursor");

        let cursor = Self {
            dot,
            follower,
            mouse: (0.0, 0.0),
            position: (0.0, 0.0),
        };
        cursor.set_hover(doc, false);
        Some(cursor)
    }

    pub fn dot(&self) -> NodeId {
        self.dot
    }

    pub fn follower(&self) -> NodeId {
        self.follower
    }

    pub fn follower_position(&self) -> (f64, f64) {
        self.position
    }

    pub fn on_move(&mut self, x: f64, y: f64) {
        self.mouse = (x, y);
    }

    /// Pointer entered or left an interactive element.
    pub fn set_hover<D: Document + ?Sized>(&self, doc: &mut D, hovering: bool) {
        let (dot_size, dot_color, ring_size, ring_border, ring_fill) = if hovering {
            (
                "10px",
                "rgba(255, 107, 0, 0.8)",
                "50px",
                "rgba(255, 107, 0, 0.3)",
                "rgba(255, 107, 0, 0.05)",
            )
        } else {
            ("6px", "#FF6B00", "36px", "rgba(255, 107, 0, 0.5)", "transparent")
        };
        doc.set_style(self.dot, "width", dot_size);
        doc.set_style(self.dot, "height", dot_size);
        doc.set_style(self.dot, "background", dot_color);
        doc.set_style(self.follower, "width", ring_size);
        doc.set_style(self.follower, "height", ring_size);
        doc.set_style(self.follower, "border-color", ring_border);
        doc.set_style(self.follower, "background", ring_fill);
    }

    /// Pointer moved over `target`. Returns whether it counts as interactive.
    pub fn on_over<D: Document + ?Sized>(&self, doc: &mut D, target: NodeId) -> bool {
        let hovering = doc.query_all(INTERACTIVE_SELECTOR).contains(&target);
        self.set_hover(doc, hovering);
        hovering
    }

    /// Per-frame update.
    pub fn frame<D: Document + ?Sized>(&mut self, doc: &mut D) {
        let (mx, my) = self.mouse;
        doc.set_style(self.dot, "left", &format!("{}px", mx));
        doc.set_style(self.dot, "top", &format!("{}px", my));

        self.position = (
            lerp(self.position.0, mx, CURSOR_FOLLOW_FACTOR),
            lerp(self.position.1, my, CURSOR_FOLLOW_FACTOR),
        );
        doc.set_style(self.follower, "left", &format!("{}px", self.position.0));
        doc.set_style(self.follower, "top", &format!("{}px", self.position.1));
    }
}

// ---------------------------------------------------------------------------
// Tilt cards
// ---------------------------------------------------------------------------

/// Rotation `(x_deg, y_deg)` for a pointer at `(x, y)` over `rect`.
///
/// The card leans away from the pointer: at its right edge it rotates
/// `+MAX_TILT_DEG` around Y, at its bottom edge `-MAX_TILT_DEG` around X.
pub fn tilt_angles(rect: &Rect, x: f64, y: f64) -> (f64, f64) {
    let half_w = rect.width / 2.0;
    let half_h = rect.height / 2.0;
    if half_w <= 0.0 || half_h <= 0.0 {
        return (0.0, 0.0);
    }
    let norm_x = (x - rect.left - half_w) / half_w;
    let norm_y = (y - rect.top - half_h) / half_h;
    (-norm_y * MAX_TILT_DEG, norm_x * MAX_TILT_DEG)
}

/// `.tilt-card` elements leaning toward the pointer.
#[derive(Debug, Clone)]
pub struct TiltCards {
    cards: Vec<NodeId>,
}

impl TiltCards {
    pub fn init<D: Document + ?Sized>(doc: &mut D, motion: MotionPreference) -> Option<Self> {
        if !motion.allows_pointer_effects() {
            return None;
        }
        let cards = doc.query_all(".tilt-card");
        if cards.is_empty() {
            return None;
        }
        for &card in &cards {
            doc.set_style(card, "transition", TILT_TRANSITION);
            doc.set_style(card, "will-change", "transform");
            doc.set_style(card, "transform-style", "preserve-3d");
        }
        Some(Self { cards })
    }

    pub fn cards(&self) -> &[NodeId] {
        &self.cards
    }

    pub fn on_move<D: Document + ?Sized>(&self, doc: &mut D, card: NodeId, x: f64, y: f64) {
        let (rx, ry) = tilt_angles(&doc.rect(card), x, y);
        doc.set_style(card, "transition", "none");
        doc.set_style(
            card,
            "transform",
            &format!(
                "perspective(800px) rotateX({}deg) rotateY({}deg) scale3d(1.02, 1.02, 1.02)",
                rx, ry
            ),
        );
    }

    pub fn on_leave<D: Document + ?Sized>(&self, doc: &mut D, card: NodeId) {
        doc.set_style(card, "transition", TILT_TRANSITION);
        doc.set_style(
            card,
            "transform",
            "perspective(800px) rotateX(0deg) rotateY(0deg) scale3d(1, 1, 1)",
        );
    }
}

// ---------------------------------------------------------------------------
// Magnetic buttons
// ---------------------------------------------------------------------------

/// A `.btn-magnetic` button pulled toward the pointer.
#[derive(Debug, Clone)]
pub struct MagneticButton {
    node: NodeId,
    current: (f64, f64),
    target: (f64, f64),
}

impl MagneticButton {
    pub fn init_all<D: Document + ?Sized>(doc: &mut D, motion: MotionPreference) -> Vec<Self> {
        if !motion.allows_pointer_effects() {
            return Vec::new();
        }
        doc.query_all(".btn-magnetic")
            .into_iter()
            .map(|node| {
                doc.set_style(node, "transition", "transform 0.3s cubic-bezier(0.22, 1, 0.36, 1)");
                doc.set_style(node, "will-change", "transform");
                Self {
                    node,
                    current: (0.0, 0.0),
                    target: (0.0, 0.0),
                }
            })
            .collect()
    }

    pub fn node(&self) -> NodeId {
        self.node
    }

    pub fn offset(&self) -> (f64, f64) {
        self.current
    }

    pub fn target(&self) -> (f64, f64) {
        self.target
    }

    pub fn on_move<D: Document + ?Sized>(&mut self, doc: &D, x: f64, y: f64) {
        let rect = doc.rect(self.node);
        self.target = (
            (x - rect.center_x()) * MAGNETIC_STRENGTH,
            (y - rect.center_y()) * MAGNETIC_STRENGTH,
        );
    }

    pub fn on_leave(&mut self) {
        self.target = (0.0, 0.0);
    }

    /// Ease one step toward the target. Returns `true` while more frames are
    /// needed; the final frame snaps exactly onto the target.
    pub fn frame<D: Document + ?Sized>(&mut self, doc: &mut D) -> bool {
        self.current = (
            lerp(self.current.0, self.target.0, MAGNETIC_EASE),
            lerp(self.current.1, self.target.1, MAGNETIC_EASE),
        );
        let moving = (self.current.0 - self.target.0).abs() > MAGNETIC_SNAP
            || (self.current.1 - self.target.1).abs() > MAGNETIC_SNAP;
        if !moving {
            self.current = self.target;
        }
        doc.set_style(
            self.node,
            "transform",
            &format!("translate({}px, {}px)", self.current.0, self.current.1),
        );
        moving
    }
}
