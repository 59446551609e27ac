//! Count-up numbers driven by `[data-count]` attributes.

use std::time::Duration;

use super::MotionPreference;
use crate::document::{numeric_attribute, Document, NodeId};

pub const DEFAULT_COUNT_DURATION_MS: f64 = 2000.0;
const MAX_DECIMALS: f64 = 20.0;

/// Quartic ease-out: fast start, long gentle finish.
pub fn ease_out_quart(t: f64) -> f64 {
    1.0 - (1.0 - t).powi(4)
}

/// Format `value` with a fixed number of decimals and `,` thousands
/// separators (`1234567.891, 2` -> `1,234,567.89`).
pub fn format_number(value: f64, decimals: usize) -> String {
    let fixed = format!("{:.*}", decimals, value.abs());
    let (int_part, frac_part) = match fixed.split_once('.') {
        Some((int_part, frac_part)) => (int_part, Some(frac_part)),
        None => (fixed.as_str(), None),
    };

    let mut grouped = String::with_capacity(fixed.len() + int_part.len() / 3);
    for (i, digit) in int_part.chars().enumerate() {
        if i > 0 && (int_part.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(digit);
    }
    if let Some(frac_part) = frac_part {
        grouped.push('.');
        grouped.push_str(frac_part);
    }

    let is_zero = fixed.chars().all(|c| c == '0' || c == '.');
    if value.is_sign_negative() && !is_zero {
        grouped.insert(0, '-');
    }
    grouped
}

/// One animated counter.
#[derive(Debug, Clone, PartialEq)]
pub struct CountUp {
    node: NodeId,
    target: f64,
    prefix: String,
    suffix: String,
    decimals: usize,
    duration: Duration,
}

impl CountUp {
    /// Every `[data-count]` element on the page.
    pub fn init_all<D: Document + ?Sized>(doc: &mut D) -> Vec<Self> {
        doc.query_all("[data-count]")
            .into_iter()
            .map(|node| Self::from_element(&*doc, node))
            .collect()
    }

    /// Read the counter settings from the element's data attributes.
    pub fn from_element<D: Document + ?Sized>(doc: &D, node: NodeId) -> Self {
        let decimals = numeric_attribute(doc, node, "data-decimals", 0.0)
            .trunc()
            .clamp(0.0, MAX_DECIMALS) as usize;
        let duration_ms = numeric_attribute(
            doc,
            node,
            "data-duration",
            DEFAULT_COUNT_DURATION_MS,
        )
        .trunc();
        let duration_ms = if duration_ms > 0.0 {
            duration_ms
        } else {
            DEFAULT_COUNT_DURATION_MS
        };

        Self {
            node,
            target: numeric_attribute(doc, node, "data-count", 0.0),
            prefix: doc.attribute(node, "data-prefix").unwrap_or_default(),
            suffix: doc.attribute(node, "data-suffix").unwrap_or_default(),
            decimals,
            duration: Duration::from_millis(duration_ms as u64),
        }
    }

    pub fn node(&self) -> NodeId {
        self.node
    }

    pub fn target(&self) -> f64 {
        self.target
    }

    pub fn duration(&self) -> Duration {
        self.duration
    }

    /// Animated value `elapsed` after the counter came into view.
    pub fn value_at(&self, elapsed: Duration) -> f64 {
        let t = (elapsed.as_secs_f64() / self.duration.as_secs_f64()).min(1.0);
        ease_out_quart(t) * self.target
    }

    /// Text shown for a given value.
    pub fn label(&self, value: f64) -> String {
        format!(
            "{}{}{}",
            self.prefix,
            format_number(value, self.decimals),
            self.suffix
        )
    }

    /// Render the frame for `elapsed`. Returns `true` while the animation
    /// still has frames left.
    pub fn render<D: Document + ?Sized>(&self, doc: &mut D, elapsed: Duration) -> bool {
        if elapsed >= self.duration {
            self.finish(doc);
            return false;
        }
        doc.set_text(self.node, &self.label(self.value_at(elapsed)));
        true
    }

    /// Jump straight to the final value.
    pub fn finish<D: Document + ?Sized>(&self, doc: &mut D) {
        doc.set_text(self.node, &self.label(self.target));
    }

    /// The counter scrolled into view. Under reduced motion it shows the
    /// final value and needs no frames; returns whether frames should run.
    pub fn on_intersect<D: Document + ?Sized>(&self, doc: &mut D, motion: MotionPreference) -> bool {
        if motion.reduced_motion {
            self.finish(doc);
            return false;
        }
        self.render(doc, Duration::ZERO)
    }
}
