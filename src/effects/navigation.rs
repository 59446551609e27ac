//! Navigation widgets: mobile menu, portfolio filters, the detail modal,
//! in-page anchor scrolling and the page-leave transition.

use std::time::Duration;

use tracing::debug;

use super::scroll::ScrollBehavior;
use super::MotionPreference;
use crate::document::{Document, NodeId};

const ACTIVE_CLASS: &str = "active";

/// Fixed header height used when the page does not set `--header-height`.
pub const DEFAULT_HEADER_HEIGHT: f64 = 80.0;
/// Extra space left above an anchor target.
pub const ANCHOR_GAP: f64 = 20.0;
/// How far below the header a section must reach to count as current.
pub const SECTION_LOOKAHEAD: f64 = 100.0;
pub const PAGE_TRANSITION_DELAY: Duration = Duration::from_millis(300);

fn lock_scroll<D: Document + ?Sized>(doc: &mut D, locked: bool) {
    let body = doc.body();
    doc.set_style(body, "overflow", if locked { "hidden" } else { "" });
}

/// Hamburger-driven mobile navigation drawer.
#[derive(Debug, Clone)]
pub struct MobileNav {
    hamburger: NodeId,
    nav: NodeId,
}

impl MobileNav {
    pub fn init<D: Document + ?Sized>(doc: &mut D) -> Option<Self> {
        Some(Self {
            hamburger: doc.query(".hamburger")?,
            nav: doc.query(".mobile-nav")?,
        })
    }

    /// Hamburger clicked. Returns whether the drawer is now open.
    pub fn toggle<D: Document + ?Sized>(&self, doc: &mut D) -> bool {
        let open = doc.toggle_class(self.hamburger, ACTIVE_CLASS);
        if open {
            doc.add_class(self.nav, ACTIVE_CLASS);
        } else {
            doc.remove_class(self.nav, ACTIVE_CLASS);
        }
        lock_scroll(doc, open);
        doc.set_attribute(self.hamburger, "aria-expanded", if open { "true" } else { "false" });
        open
    }

    /// A drawer link was followed.
    pub fn close<D: Document + ?Sized>(&self, doc: &mut D) {
        doc.remove_class(self.hamburger, ACTIVE_CLASS);
        doc.remove_class(self.nav, ACTIVE_CLASS);
        lock_scroll(doc, false);
        doc.set_attribute(self.hamburger, "aria-expanded", "false");
    }

    pub fn is_open<D: Document + ?Sized>(&self, doc: &D) -> bool {
        doc.has_class(self.hamburger, ACTIVE_CLASS)
    }
}

/// `.filter-btn` buttons narrowing the `[data-category]` grid.
#[derive(Debug, Clone)]
pub struct FilterButtons {
    buttons: Vec<NodeId>,
    items: Vec<NodeId>,
}

impl FilterButtons {
    pub fn init<D: Document + ?Sized>(doc: &mut D) -> Option<Self> {
        let buttons = doc.query_all(".filter-btn");
        if buttons.is_empty() {
            return None;
        }
        Some(Self {
            buttons,
            items: doc.query_all("[data-category]"),
        })
    }

    pub fn buttons(&self) -> &[NodeId] {
        &self.buttons
    }

    /// Button clicked. Returns how many items remain shown.
    pub fn select<D: Document + ?Sized>(&self, doc: &mut D, button: NodeId) -> usize {
        for &b in &self.buttons {
            doc.remove_class(b, ACTIVE_CLASS);
        }
        doc.add_class(button, ACTIVE_CLASS);

        let filter = doc.attribute(button, "data-filter").unwrap_or_default();
        let mut shown = 0;
        for &item in &self.items {
            let category = doc.attribute(item, "data-category").unwrap_or_default();
            if filter == "all" || category == filter {
                doc.set_style(item, "display", "");
                // Restart the reveal transition.
                doc.remove_class(item, "visible");
                doc.add_class(item, "visible");
                shown += 1;
            } else {
                doc.set_style(item, "display", "none");
            }
        }
        shown
    }
}

/// Shared overlay that shows the details of a `[data-modal-id]` block.
#[derive(Debug, Clone)]
pub struct Modal {
    overlay: NodeId,
}

impl Modal {
    pub fn init<D: Document + ?Sized>(doc: &mut D) -> Option<Self> {
        Some(Self {
            overlay: doc.query(".modal-overlay")?,
        })
    }

    /// A `[data-modal-open]` trigger was clicked.
    pub fn open_from<D: Document + ?Sized>(&self, doc: &mut D, trigger: NodeId) {
        let id = doc.attribute(trigger, "data-modal-open").unwrap_or_default();
        self.open(doc, &id);
    }

    /// Fill the overlay from the content block with `data-modal-id = id` and
    /// show it. An unknown id still opens the overlay with its current content.
    pub fn open<D: Document + ?Sized>(&self, doc: &mut D, id: &str) {
        let selector = format!("[data-modal-id=\"{}\"]", id);
        if let Some(content) = doc.query(&selector) {
            if let Some(body) = doc.query_within(self.overlay, ".modal__body") {
                let text = doc.text(content);
                doc.set_text(body, &text);
            }
            if let Some(title) = doc.query_within(self.overlay, ".modal__title") {
                let text = doc.attribute(content, "data-modal-title").unwrap_or_default();
                doc.set_text(title, &text);
            }
        }
        doc.add_class(self.overlay, ACTIVE_CLASS);
        lock_scroll(doc, true);
    }

    pub fn close<D: Document + ?Sized>(&self, doc: &mut D) {
        doc.remove_class(self.overlay, ACTIVE_CLASS);
        lock_scroll(doc, false);
    }

    /// Keyboard handler; `Escape` closes.
    pub fn on_key<D: Document + ?Sized>(&self, doc: &mut D, key: &str) -> bool {
        if key == "Escape" {
            self.close(doc);
            return true;
        }
        false
    }

    /// Click handler; only a click on the backdrop itself closes.
    pub fn on_click<D: Document + ?Sized>(&self, doc: &mut D, target: NodeId) -> bool {
        if target == self.overlay {
            self.close(doc);
            return true;
        }
        false
    }

    pub fn is_open<D: Document + ?Sized>(&self, doc: &D) -> bool {
        doc.has_class(self.overlay, ACTIVE_CLASS)
    }
}

/// Anchor links that scroll below the fixed header, plus nav highlighting
/// for the section currently in view.
#[derive(Debug, Clone)]
pub struct SmoothScroll {
    anchors: Vec<NodeId>,
    sections: Vec<NodeId>,
    nav_links: Vec<NodeId>,
    header_height: f64,
}

impl SmoothScroll {
    pub fn init<D: Document + ?Sized>(doc: &mut D) -> Option<Self> {
        let anchors = doc.query_all("a[href^=\"#\"]");
        let sections = doc.query_all("section[id]");
        let nav_links = doc.query_all(".header__nav-link, .mobile-nav__link");
        if anchors.is_empty() && (sections.is_empty() || nav_links.is_empty()) {
            return None;
        }
        let body = doc.body();
        let header_height = doc
            .style(body, "--header-height")
            .and_then(|raw| raw.trim().trim_end_matches("px").parse::<f64>().ok())
            .filter(|h| h.is_finite() && *h > 0.0)
            .unwrap_or(DEFAULT_HEADER_HEIGHT);
        Some(Self {
            anchors,
            sections,
            nav_links,
            header_height,
        })
    }

    pub fn anchors(&self) -> &[NodeId] {
        &self.anchors
    }

    /// An anchor link was clicked. Returns where to scroll, or `None` when the
    /// link has no target on this page and the default action should run.
    pub fn on_click<D: Document + ?Sized>(
        &self,
        doc: &D,
        link: NodeId,
        motion: MotionPreference,
    ) -> Option<(f64, ScrollBehavior)> {
        let href = doc.attribute(link, "href")?;
        if href.is_empty() || href == "#" {
            return None;
        }
        let target = doc.query(&href)?;
        let top = doc.rect(target).top + doc.viewport().scroll_y - self.header_height - ANCHOR_GAP;
        let behavior = if motion.reduced_motion {
            ScrollBehavior::Instant
        } else {
            ScrollBehavior::Smooth
        };
        Some((top, behavior))
    }

    /// Mark the nav links pointing at the section under the header. Returns
    /// that section's id. Links are left alone when no section matches.
    pub fn highlight<D: Document + ?Sized>(&self, doc: &mut D) -> Option<String> {
        if self.sections.is_empty() || self.nav_links.is_empty() {
            return None;
        }
        let scroll_y = doc.viewport().scroll_y;
        let marker = scroll_y + self.header_height + SECTION_LOOKAHEAD;

        let mut active = None;
        for &section in &self.sections {
            let rect = doc.rect(section);
            let top = rect.top + scroll_y;
            if marker >= top && marker < top + rect.height {
                active = doc.attribute(section, "id");
            }
        }
        let id = active.filter(|id| !id.is_empty())?;

        let fragment = format!("#{}", id);
        for &link in &self.nav_links {
            let points_here = doc
                .attribute(link, "href")
                .is_some_and(|href| href.contains(&fragment));
            if points_here {
                doc.add_class(link, ACTIVE_CLASS);
            } else {
                doc.remove_class(link, ACTIVE_CLASS);
            }
        }
        Some(id)
    }
}

/// A page-leave the host should perform once the overlay has faded in.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Navigation {
    pub href: String,
    pub after: Duration,
}

/// `.page-transition` overlay covering the page while leaving it.
#[derive(Debug, Clone)]
pub struct PageTransition {
    overlay: NodeId,
}

impl PageTransition {
    /// Clears the overlay left over from the previous page.
    pub fn init<D: Document + ?Sized>(doc: &mut D) -> Option<Self> {
        let overlay = doc.query(".page-transition")?;
        doc.remove_class(overlay, ACTIVE_CLASS);
        Some(Self { overlay })
    }

    /// Whether following `link` leaves the page through the transition.
    /// In-page anchors, `mailto:`, `tel:` and new-tab links do not.
    pub fn handles<D: Document + ?Sized>(doc: &D, link: NodeId) -> bool {
        let Some(href) = doc.attribute(link, "href") else {
            return false;
        };
        let new_tab = doc.attribute(link, "target").as_deref() == Some("_blank");
        !href.is_empty()
            && !href.starts_with('#')
            && !href.starts_with("mailto")
            && !href.starts_with("tel")
            && !new_tab
    }

    /// A link was clicked. Shows the overlay and returns the navigation to
    /// run after [`PAGE_TRANSITION_DELAY`].
    pub fn on_click<D: Document + ?Sized>(&self, doc: &mut D, link: NodeId) -> Option<Navigation> {
        if !Self::handles(doc, link) {
            return None;
        }
        let href = doc.attribute(link, "href")?;
        doc.add_class(self.overlay, ACTIVE_CLASS);
        debug!(href = href.as_str(), "Leaving page");
        Some(Navigation {
            href,
            after: PAGE_TRANSITION_DELAY,
        })
    }

    pub fn is_active<D: Document + ?Sized>(&self, doc: &D) -> bool {
        doc.has_class(self.overlay, ACTIVE_CLASS)
    }
}
