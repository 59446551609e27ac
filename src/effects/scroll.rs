//! Scroll-driven effects: header state, back-to-top button, reading progress
//! bar, parallax layers and reveal-on-enter animations for blocks and words.

use tracing::trace;

use super::{css_seconds, MotionPreference};
use crate::document::{numeric_attribute, Document, NodeId};

pub const HEADER_SCROLL_THRESHOLD: f64 = 50.0;
pub const PAGE_TOP_THRESHOLD: f64 = 500.0;
pub const DEFAULT_PARALLAX_SPEED: f64 = 0.3;
pub const STAGGER_STEP_SECS: f64 = 0.1;
pub const WORD_STAGGER_SECS: f64 = 0.04;

/// Classes that opt an element into reveal-on-enter.
pub const REVEAL_CLASSES: &[&str] = &[
    "fade-in",
    "fade-in-left",
    "fade-in-right",
    "scale-in",
    "blur-in",
    "rotate-in",
    "slide-up-big",
];

const VISIBLE_CLASS: &str = "visible";

fn reveal_selector() -> String {
    REVEAL_CLASSES
        .iter()
        .map(|class| format!(".{}", class))
        .collect::<Vec<_>>()
        .join(",")
}

/// Toggles `scrolled` on `.header` once the page moves past the threshold.
#[derive(Debug, Clone)]
pub struct HeaderScroll {
    header: NodeId,
}

impl HeaderScroll {
    pub fn init<D: Document + ?Sized>(doc: &mut D) -> Option<Self> {
        let effect = Self {
            header: doc.query(".header")?,
        };
        effect.on_scroll(doc);
        Some(effect)
    }

    pub fn on_scroll<D: Document + ?Sized>(&self, doc: &mut D) {
        if doc.viewport().scroll_y > HEADER_SCROLL_THRESHOLD {
            doc.add_class(self.header, "scrolled");
        } else {
            doc.remove_class(self.header, "scrolled");
        }
    }
}

/// How a programmatic scroll should move.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScrollBehavior {
    Smooth,
    Instant,
}

/// Back-to-top button shown after scrolling down far enough.
#[derive(Debug, Clone)]
pub struct PageTop {
    button: NodeId,
}

impl PageTop {
    pub fn init<D: Document + ?Sized>(doc: &mut D) -> Option<Self> {
        Some(Self {
            button: doc.query(".page-top")?,
        })
    }

    pub fn on_scroll<D: Document + ?Sized>(&self, doc: &mut D) {
        if doc.viewport().scroll_y > PAGE_TOP_THRESHOLD {
            doc.add_class(self.button, VISIBLE_CLASS);
        } else {
            doc.remove_class(self.button, VISIBLE_CLASS);
        }
    }

    /// Scroll target for a click: always the top, smooth unless motion is
    /// reduced.
    pub fn on_click(&self, motion: MotionPreference) -> (f64, ScrollBehavior) {
        let behavior = if motion.reduced_motion {
            ScrollBehavior::Instant
        } else {
            ScrollBehavior::Smooth
        };
        (0.0, behavior)
    }
}

/// Thin bar at the top of the page tracking how far the reader has scrolled.
#[derive(Debug, Clone)]
pub struct ScrollProgress {
    bar: NodeId,
}

impl ScrollProgress {
    /// Reuse an existing `.scroll-progress` element or create one.
    pub fn init<D: Document + ?Sized>(doc: &mut D) -> Self {
        let bar = match doc.query(".scroll-progress") {
            Some(bar) => bar,
            None => {
                let bar = doc.create_element("div");
                doc.add_class(bar, "scroll-progress");
                for (property, value) in [
                    ("position", "fixed"),
                    ("top", "0"),
                    ("left", "0"),
                    ("height", "3px"),
                    ("width", "0%"),
                    ("z-index", "10000"),
                    ("pointer-events", "none"),
                ] {
                    doc.set_style(bar, property, value);
                }
                let body = doc.body();
                doc.append_child(body, bar);
                bar
            }
        };
        let effect = Self { bar };
        effect.update(doc);
        effect
    }

    pub fn bar(&self) -> NodeId {
        self.bar
    }

    /// Recompute and render the progress percentage.
    pub fn update<D: Document + ?Sized>(&self, doc: &mut D) -> f64 {
        let progress = Self::percent(doc);
        let value = format!("{}%", progress);
        doc.set_style(self.bar, "width", &value);
        let body = doc.body();
        doc.set_style(body, "--scroll-progress", &value);
        progress
    }

    /// Scroll position as a percentage of the scrollable distance.
    pub fn percent<D: Document + ?Sized>(doc: &D) -> f64 {
        let viewport = doc.viewport();
        let scrollable = viewport.document_height - viewport.height;
        if scrollable > 0.0 {
            (viewport.scroll_y / scrollable * 100.0).clamp(0.0, 100.0)
        } else {
            0.0
        }
    }
}

/// `[data-parallax]` layers drifting relative to the viewport center.
#[derive(Debug, Clone)]
pub struct Parallax {
    elements: Vec<NodeId>,
}

impl Parallax {
    pub fn init<D: Document + ?Sized>(doc: &mut D, motion: MotionPreference) -> Option<Self> {
        if motion.reduced_motion {
            return None;
        }
        let elements = doc.query_all("[data-parallax]");
        if elements.is_empty() {
            return None;
        }
        let effect = Self { elements };
        effect.update(doc);
        Some(effect)
    }

    pub fn update<D: Document + ?Sized>(&self, doc: &mut D) {
        let half_viewport = doc.viewport().height / 2.0;
        for &el in &self.elements {
            let speed = numeric_attribute(doc, el, "data-speed", DEFAULT_PARALLAX_SPEED);
            let offset = (doc.rect(el).center_y() - half_viewport) * speed;
            doc.set_style(el, "transform", &format!("translate3d(0, {}px, 0)", offset));
        }
    }
}

/// Reveal-on-enter animations for elements carrying a reveal class.
#[derive(Debug, Clone)]
pub struct ScrollReveal {
    pending: Vec<NodeId>,
}

impl ScrollReveal {
    /// Apply per-element timing and start watching. Returns `None` when there
    /// is nothing left to reveal.
    pub fn init<D: Document + ?Sized>(doc: &mut D, motion: MotionPreference) -> Option<Self> {
        let selector = reveal_selector();
        let targets = doc.query_all(&selector);
        if targets.is_empty() {
            return None;
        }

        if motion.reduced_motion {
            for &el in &targets {
                doc.add_class(el, VISIBLE_CLASS);
            }
            return None;
        }

        for &el in &targets {
            if let Some(speed) = doc.attribute(el, "data-anim-speed") {
                doc.set_style(el, "transition-duration", &format!("{}s", speed));
            }
            if let Some(delay) = doc.attribute(el, "data-anim-delay") {
                doc.set_style(el, "transition-delay", &format!("{}s", delay));
            }
        }

        for parent in doc.query_all(".stagger-children") {
            let children = doc.query_all_within(parent, &selector);
            for (index, child) in children.into_iter().enumerate() {
                let explicit = doc.attribute(child, "data-anim-delay").is_some()
                    || doc.style(child, "transition-delay").is_some();
                if !explicit {
                    let secs = (index as f64 * STAGGER_STEP_SECS * 100.0).round() / 100.0;
                    doc.set_style(child, "transition-delay", &css_seconds(secs));
                }
            }
        }

        trace!(count = targets.len(), "Watching reveal targets");
        Some(Self { pending: targets })
    }

    /// Elements that have not entered the viewport yet.
    pub fn pending(&self) -> &[NodeId] {
        &self.pending
    }

    /// An element crossed into view. Each element is revealed once; returns
    /// whether this call revealed it.
    pub fn on_intersect<D: Document + ?Sized>(&mut self, doc: &mut D, node: NodeId) -> bool {
        let Some(pos) = self.pending.iter().position(|n| *n == node) else {
            return false;
        };
        self.pending.remove(pos);
        doc.add_class(node, VISIBLE_CLASS);
        true
    }

    pub fn is_done(&self) -> bool {
        self.pending.is_empty()
    }
}

/// `.text-reveal` headings whose words slide up one after another.
#[derive(Debug, Clone)]
pub struct TextReveal {
    pending: Vec<NodeId>,
}

impl TextReveal {
    /// Split each element's text into `.word-wrap > .word-inner` spans with
    /// a per-word delay. Under reduced motion the text is shown as is.
    pub fn init<D: Document + ?Sized>(doc: &mut D, motion: MotionPreference) -> Option<Self> {
        let elements = doc.query_all(".text-reveal");
        if elements.is_empty() {
            return None;
        }

        if motion.reduced_motion {
            for &el in &elements {
                doc.set_style(el, "opacity", "1");
            }
            return None;
        }

        for &el in &elements {
            let text = doc.text(el);
            let words: Vec<&str> = text.split_whitespace().collect();
            doc.set_text(el, "");
            for (index, word) in words.iter().enumerate() {
                let wrap = doc.create_element("span");
                doc.add_class(wrap, "word-wrap");
                let inner = doc.create_element("span");
                doc.add_class(inner, "word-inner");
                doc.set_text(inner, word);
                let secs = (index as f64 * WORD_STAGGER_SECS * 100.0).round() / 100.0;
                doc.set_style(inner, "transition-delay", &css_seconds(secs));
                doc.append_child(wrap, inner);
                doc.append_child(el, wrap);

                if index + 1 < words.len() {
                    let space = doc.create_element("span");
                    doc.set_text(space, "\u{a0}");
                    doc.append_child(el, space);
                }
            }
        }

        trace!(count = elements.len(), "Split text reveal targets");
        Some(Self { pending: elements })
    }

    pub fn pending(&self) -> &[NodeId] {
        &self.pending
    }

    /// The element crossed into view; reveals it once.
    pub fn on_intersect<D: Document + ?Sized>(&mut self, doc: &mut D, node: NodeId) -> bool {
        let Some(pos) = self.pending.iter().position(|n| *n == node) else {
            return false;
        };
        self.pending.remove(pos);
        doc.add_class(node, "revealed");
        true
    }
}
