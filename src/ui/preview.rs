//! Terminal mirror of the loading indicator.
//!
//! Wraps any [`Document`] and echoes changes to the indicator's fill width as
//! a text progress bar, so a loading run can be watched from the CLI.

use std::io::Write;

use tokio::sync::oneshot;

use super::style::SiteStyle;
use crate::document::{Document, NodeId, Rect, Viewport};

const ROOT_CLASS: &str = "loading-screen";
const FILL_CLASS: &str = "loading-screen__progress";
const FADE_OUT_CLASS: &str = "fade-out";
const BAR_WIDTH: usize = 30;

/// Render a percentage as a fixed-width bar: `[#####.....]  50%`.
pub fn render_bar(percent: u8, color: bool) -> String {
    let percent = percent.min(100);
    let filled = BAR_WIDTH * percent as usize / 100;
    let fill = "█".repeat(filled);
    let empty = "░".repeat(BAR_WIDTH - filled);
    if color {
        format!(
            "[{}{}] {:>3}%",
            fill.as_str().progress_fill(),
            empty.as_str().muted(),
            percent
        )
    } else {
        format!("[{}{}] {:>3}%", fill, empty, percent)
    }
}

/// Parse a `"42%"` width value.
fn parse_percent(value: &str) -> Option<u8> {
    let value: f64 = value.strip_suffix('%')?.trim().parse().ok()?;
    Some(value.clamp(0.0, 100.0) as u8)
}

/// A [`Document`] that forwards every call to `inner` and prints the
/// indicator's progress to `out`.
pub struct TerminalMirror<D, W> {
    inner: D,
    out: W,
    color: bool,
    last: Option<u8>,
    frames_drawn: usize,
    fade_out: Option<oneshot::Sender<()>>,
}

impl<D: Document, W: Write> TerminalMirror<D, W> {
    pub fn new(inner: D, out: W, color: bool) -> Self {
        Self {
            inner,
            out,
            color,
            last: None,
            frames_drawn: 0,
            fade_out: None,
        }
    }

    /// Signal `tx` when the indicator starts its exit transition, so a host
    /// can report the transition's end afterwards.
    pub fn notify_fade_out(&mut self, tx: oneshot::Sender<()>) {
        self.fade_out = Some(tx);
    }

    pub fn inner(&self) -> &D {
        &self.inner
    }

    pub fn inner_mut(&mut self) -> &mut D {
        &mut self.inner
    }

    /// Number of distinct progress values printed.
    pub fn frames_drawn(&self) -> usize {
        self.frames_drawn
    }

    pub fn last_percent(&self) -> Option<u8> {
        self.last
    }

    /// Finish the progress line and hand back the wrapped parts.
    pub fn into_parts(mut self) -> (D, W) {
        if self.last.is_some() {
            // Best effort; the terminal may already be gone.
            let _ = writeln!(self.out);
            let _ = self.out.flush();
        }
        (self.inner, self.out)
    }

    fn draw(&mut self, percent: u8) {
        if self.last == Some(percent) {
            return;
        }
        self.last = Some(percent);
        self.frames_drawn += 1;
        let _ = write!(self.out, "\r{}", render_bar(percent, self.color));
        let _ = self.out.flush();
    }
}

impl<D: Document, W: Write> Document for TerminalMirror<D, W> {
    fn body(&self) -> NodeId {
        self.inner.body()
    }

    fn query_all(&self, selector: &str) -> Vec<NodeId> {
        self.inner.query_all(selector)
    }

    fn query(&self, selector: &str) -> Option<NodeId> {
        self.inner.query(selector)
    }

    fn query_within(&self, root: NodeId, selector: &str) -> Option<NodeId> {
        self.inner.query_within(root, selector)
    }

    fn query_all_within(&self, root: NodeId, selector: &str) -> Vec<NodeId> {
        self.inner.query_all_within(root, selector)
    }

    fn create_element(&mut self, tag: &str) -> NodeId {
        self.inner.create_element(tag)
    }

    fn append_child(&mut self, parent: NodeId, child: NodeId) {
        self.inner.append_child(parent, child)
    }

    fn add_class(&mut self, node: NodeId, class: &str) {
        self.inner.add_class(node, class);
        if class == FADE_OUT_CLASS && self.inner.has_class(node, ROOT_CLASS) {
            if let Some(tx) = self.fade_out.take() {
                let _ = tx.send(());
            }
        }
    }

    fn remove_class(&mut self, node: NodeId, class: &str) {
        self.inner.remove_class(node, class)
    }

    fn has_class(&self, node: NodeId, class: &str) -> bool {
        self.inner.has_class(node, class)
    }

    fn set_style(&mut self, node: NodeId, property: &str, value: &str) {
        self.inner.set_style(node, property, value);
        if property == "width" && self.inner.has_class(node, FILL_CLASS) {
            if let Some(percent) = parse_percent(value) {
                self.draw(percent);
            }
        }
    }

    fn style(&self, node: NodeId, property: &str) -> Option<String> {
        self.inner.style(node, property)
    }

    fn set_text(&mut self, node: NodeId, text: &str) {
        self.inner.set_text(node, text)
    }

    fn text(&self, node: NodeId) -> String {
        self.inner.text(node)
    }

    fn attribute(&self, node: NodeId, name: &str) -> Option<String> {
        self.inner.attribute(node, name)
    }

    fn set_attribute(&mut self, node: NodeId, name: &str, value: &str) {
        self.inner.set_attribute(node, name, value)
    }

    fn remove_attribute(&mut self, node: NodeId, name: &str) {
        self.inner.remove_attribute(node, name)
    }

    fn viewport(&self) -> Viewport {
        self.inner.viewport()
    }

    fn rect(&self, node: NodeId) -> Rect {
        self.inner.rect(node)
    }
}
