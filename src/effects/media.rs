//! Media effects: lazy images, the hero background slideshow and the
//! typewriter headline.

use std::time::Duration;

use tracing::{debug, warn};

use super::MotionPreference;
use crate::document::{Document, NodeId};

pub const SLIDE_INTERVAL: Duration = Duration::from_millis(5000);
pub const TYPEWRITER_START_DELAY: Duration = Duration::from_millis(800);
pub const TYPEWRITER_CHAR_DELAY: Duration = Duration::from_millis(80);

const KEN_BURNS: &str = "kenBurns 5s ease-in-out forwards";

// ---------------------------------------------------------------------------
// Lazy images
// ---------------------------------------------------------------------------

/// Result of fetching a lazy image's real source.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadOutcome {
    Loaded,
    Failed,
}

/// Sources to fetch for an image that came into view.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageRequest {
    pub node: NodeId,
    pub src: String,
    pub srcset: Option<String>,
}

/// `img[data-src]` elements whose real source loads on first view.
#[derive(Debug, Clone)]
pub struct LazyImages {
    pending: Vec<NodeId>,
}

impl LazyImages {
    pub fn init<D: Document + ?Sized>(doc: &mut D) -> Option<Self> {
        let pending = doc.query_all("img[data-src]");
        if pending.is_empty() {
            return None;
        }
        Some(Self { pending })
    }

    pub fn pending(&self) -> &[NodeId] {
        &self.pending
    }

    /// An image entered the viewport. Returns what to fetch, once per image.
    pub fn on_intersect<D: Document + ?Sized>(
        &mut self,
        doc: &D,
        node: NodeId,
    ) -> Option<ImageRequest> {
        let pos = self.pending.iter().position(|n| *n == node)?;
        self.pending.remove(pos);
        Some(ImageRequest {
            node,
            src: doc.attribute(node, "data-src")?,
            srcset: doc.attribute(node, "data-srcset"),
        })
    }

    /// Apply the fetch result. A failed image is still marked loaded so it
    /// does not sit half-faded forever; it is not retried.
    pub fn complete<D: Document + ?Sized>(
        &self,
        doc: &mut D,
        request: &ImageRequest,
        outcome: LoadOutcome,
    ) {
        let node = request.node;
        match outcome {
            LoadOutcome::Loaded => {
                doc.set_attribute(node, "src", &request.src);
                doc.remove_attribute(node, "data-src");
                if let Some(srcset) = &request.srcset {
                    doc.set_attribute(node, "srcset", srcset);
                    doc.remove_attribute(node, "data-srcset");
                }
            }
            LoadOutcome::Failed => {
                warn!(src = %request.src, "Lazy image failed to load");
                doc.remove_attribute(node, "data-src");
            }
        }
        doc.add_class(node, "loaded");
    }
}

// ---------------------------------------------------------------------------
// Slideshow
// ---------------------------------------------------------------------------

/// Crossfading background slideshow on the `[data-slides]` hero.
#[derive(Debug, Clone)]
pub struct Slideshow {
    layers: [NodeId; 2],
    urls: Vec<String>,
    current: usize,
    active_layer: usize,
    animate: bool,
}

/// Split a `data-slides` value into URLs, dropping blank entries.
pub fn parse_slides(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|url| !url.is_empty())
        .map(str::to_string)
        .collect()
}

impl Slideshow {
    pub fn init<D: Document + ?Sized>(doc: &mut D, motion: MotionPreference) -> Option<Self> {
        let hero = doc.query("[data-slides]")?;
        let urls = parse_slides(&doc.attribute(hero, "data-slides")?);
        if urls.is_empty() {
            return None;
        }

        let container = doc.create_element("div");
        doc.add_class(container, "hero__slideshow");
        for (property, value) in [
            ("position", "absolute"),
            ("inset", "0"),
            ("z-index", "0"),
            ("overflow", "hidden"),
        ] {
            doc.set_style(container, property, value);
        }

        let mut layers = [container; 2];
        for (i, layer) in layers.iter_mut().enumerate() {
            let node = doc.create_element("div");
            doc.add_class(node, "hero__slide");
            doc.set_style(node, "position", "absolute");
            doc.set_style(node, "inset", "0");
            doc.set_style(node, "background-size", "cover");
            doc.set_style(node, "background-position", "center");
            doc.set_style(node, "transition", "opacity 1.5s ease-in-out");
            doc.set_style(node, "opacity", if i == 0 { "1" } else { "0" });
            doc.append_child(container, node);
            *layer = node;
        }
        doc.set_style(hero, "position", "relative");
        doc.append_child(hero, container);

        let animate = !motion.reduced_motion;
        doc.set_style(layers[0], "background-image", &format!("url(\"{}\")", urls[0]));
        if animate {
            doc.set_style(layers[0], "animation", KEN_BURNS);
        }
        debug!(slides = urls.len(), "Hero slideshow ready");

        Some(Self {
            layers,
            urls,
            current: 0,
            active_layer: 0,
            animate,
        })
    }

    /// Whether the slideshow has anything to rotate through.
    pub fn rotates(&self) -> bool {
        self.urls.len() > 1
    }

    pub fn current(&self) -> usize {
        self.current
    }

    pub fn active_layer(&self) -> NodeId {
        self.layers[self.active_layer]
    }

    /// Crossfade to the next slide. Returns the new slide index, or `None`
    /// for a single-image hero.
    pub fn advance<D: Document + ?Sized>(&mut self, doc: &mut D) -> Option<usize> {
        if !self.rotates() {
            return None;
        }
        self.current = (self.current + 1) % self.urls.len();
        let next = 1 - self.active_layer;
        let (incoming, outgoing) = (self.layers[next], self.layers[self.active_layer]);

        let image = format!("url(\"{}\")", self.urls[self.current]);
        doc.set_style(incoming, "background-image", &image);
        doc.set_style(incoming, "animation", if self.animate { KEN_BURNS } else { "none" });
        doc.set_style(incoming, "opacity", "1");
        doc.set_style(outgoing, "opacity", "0");

        self.active_layer = next;
        Some(self.current)
    }
}

// ---------------------------------------------------------------------------
// Typewriter
// ---------------------------------------------------------------------------

/// Types the `.typewriter` headline one character at a time.
#[derive(Debug, Clone)]
pub struct Typewriter {
    node: NodeId,
    chars: Vec<char>,
    typed: usize,
}

impl Typewriter {
    /// Clear the headline and prepare to type it. Under reduced motion the
    /// full text is written at once and no stepping is needed.
    pub fn init<D: Document + ?Sized>(doc: &mut D, motion: MotionPreference) -> Option<Self> {
        let node = doc.query(".typewriter")?;
        let text = doc
            .attribute(node, "data-text")
            .filter(|t| !t.is_empty())
            .unwrap_or_else(|| doc.text(node));
        doc.set_text(node, "");
        doc.set_style(node, "visibility", "visible");

        if motion.reduced_motion {
            doc.set_text(node, &text);
            return None;
        }

        Some(Self {
            node,
            chars: text.chars().collect(),
            typed: 0,
        })
    }

    /// Append the next character. Returns `true` while more remain.
    pub fn step<D: Document + ?Sized>(&mut self, doc: &mut D) -> bool {
        if self.typed < self.chars.len() {
            self.typed += 1;
            let shown: String = self.chars[..self.typed].iter().collect();
            doc.set_text(self.node, &shown);
        }
        !self.is_done()
    }

    pub fn is_done(&self) -> bool {
        self.typed >= self.chars.len()
    }
}
