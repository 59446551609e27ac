//! Page effects
//!
//! Decorative behaviors started once the loading sequence completes. Each
//! effect is independent: it locates its own elements, does nothing when they
//! are absent, and exposes plain handler methods (`on_scroll`, `frame`,
//! `on_intersect`...) that the host calls with the document handle.

pub mod counter;
pub mod media;
pub mod navigation;
pub mod particles;
pub mod pointer;
pub mod scroll;

use rand::Rng;
use tracing::debug;

use crate::document::Document;

pub use counter::{format_number, CountUp};
pub use media::{LazyImages, LoadOutcome, Slideshow, Typewriter};
pub use navigation::{FilterButtons, MobileNav, Modal, Navigation, PageTransition, SmoothScroll};
pub use particles::ParticleField;
pub use pointer::{CursorFollower, MagneticButton, TiltCards};
pub use scroll::{
    HeaderScroll, PageTop, Parallax, ScrollBehavior, ScrollProgress, ScrollReveal, TextReveal,
};

/// User/device traits the effects adapt to.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MotionPreference {
    /// `prefers-reduced-motion: reduce`
    pub reduced_motion: bool,
    /// Touch-capable device (no hover, no fine pointer)
    pub touch_device: bool,
}

impl MotionPreference {
    /// Pointer-driven effects only make sense with a mouse and motion allowed.
    pub fn allows_pointer_effects(&self) -> bool {
        !self.reduced_motion && !self.touch_device
    }
}

/// Linear interpolation from `start` toward `end` by `factor`.
pub fn lerp(start: f64, end: f64, factor: f64) -> f64 {
    start + (end - start) * factor
}

/// Seconds as a CSS time value (`0.3s`).
pub(crate) fn css_seconds(seconds: f64) -> String {
    format!("{}s", seconds)
}

/// Every effect that found something to drive on the page.
#[derive(Debug, Default)]
pub struct Effects {
    pub header: Option<HeaderScroll>,
    pub page_top: Option<PageTop>,
    pub scroll_progress: Option<ScrollProgress>,
    pub parallax: Option<Parallax>,
    pub reveal: Option<ScrollReveal>,
    pub text_reveal: Option<TextReveal>,
    pub smooth_scroll: Option<SmoothScroll>,
    pub page_transition: Option<PageTransition>,
    pub particles: Option<ParticleField>,
    pub counters: Vec<CountUp>,
    pub lazy_images: Option<LazyImages>,
    pub slideshow: Option<Slideshow>,
    pub typewriter: Option<Typewriter>,
    pub mobile_nav: Option<MobileNav>,
    pub filters: Option<FilterButtons>,
    pub modal: Option<Modal>,
    pub cursor: Option<CursorFollower>,
    pub tilt: Option<TiltCards>,
    pub magnetic: Vec<MagneticButton>,
}

impl Effects {
    /// Number of effects that attached to the page.
    pub fn active_count(&self) -> usize {
        [
            self.header.is_some(),
            self.page_top.is_some(),
            self.scroll_progress.is_some(),
            self.parallax.is_some(),
            self.reveal.is_some(),
            self.text_reveal.is_some(),
            self.smooth_scroll.is_some(),
            self.page_transition.is_some(),
            self.particles.is_some(),
            !self.counters.is_empty(),
            self.lazy_images.is_some(),
            self.slideshow.is_some(),
            self.typewriter.is_some(),
            self.mobile_nav.is_some(),
            self.filters.is_some(),
            self.modal.is_some(),
            self.cursor.is_some(),
            self.tilt.is_some(),
            !self.magnetic.is_empty(),
        ]
        .into_iter()
        .filter(|active| *active)
        .count()
    }

    /// Forward a scroll event to every scroll-driven effect.
    pub fn on_scroll<D: Document + ?Sized>(&self, doc: &mut D) {
        if let Some(header) = &self.header {
            header.on_scroll(doc);
        }
        if let Some(page_top) = &self.page_top {
            page_top.on_scroll(doc);
        }
        if let Some(progress) = &self.scroll_progress {
            progress.update(doc);
        }
        if let Some(parallax) = &self.parallax {
            parallax.update(doc);
        }
        if let Some(smooth) = &self.smooth_scroll {
            smooth.highlight(doc);
        }
    }
}

/// Start every page effect. Called once, after the loading sequence signals
/// completion. `rng` seeds the particle field.
pub fn init_all<D, R>(doc: &mut D, motion: MotionPreference, rng: &mut R) -> Effects
where
    D: Document + ?Sized,
    R: Rng,
{
    let effects = Effects {
        header: HeaderScroll::init(doc),
        reveal: ScrollReveal::init(doc, motion),
        page_top: PageTop::init(doc),
        page_transition: PageTransition::init(doc),
        counters: CountUp::init_all(doc),
        particles: ParticleField::init(doc, motion, rng),
        typewriter: Typewriter::init(doc, motion),
        mobile_nav: MobileNav::init(doc),
        filters: FilterButtons::init(doc),
        modal: Modal::init(doc),
        scroll_progress: Some(ScrollProgress::init(doc)),
        cursor: CursorFollower::init(doc, motion),
        slideshow: Slideshow::init(doc, motion),
        parallax: Parallax::init(doc, motion),
        text_reveal: TextReveal::init(doc, motion),
        tilt: TiltCards::init(doc, motion),
        magnetic: MagneticButton::init_all(doc, motion),
        lazy_images: LazyImages::init(doc),
        smooth_scroll: SmoothScroll::init(doc),
    };
    debug!(active = effects.active_count(), "Page effects initialized");
    effects
}
