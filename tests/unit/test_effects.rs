//! Unit tests for page effects started after loading
//!
//! Tests cover:
//! - `init_all` on a full landing page
//! - Reduced motion and touch devices
//! - Scroll fan-out and intersection handlers
//! - Anchor scrolling, page transitions and the particle field

use rand::rngs::StdRng;
use rand::SeedableRng;
use skyscope::document::{Document, MemoryDocument, NodeId, Rect, Viewport};
use skyscope::effects::{self, Effects, LoadOutcome, MotionPreference, ScrollBehavior};
use std::time::Duration;

fn start(doc: &mut MemoryDocument, motion: MotionPreference) -> Effects {
    effects::init_all(doc, motion, &mut StdRng::seed_from_u64(21))
}

struct Landing {
    doc: MemoryDocument,
    header: NodeId,
    page_top: NodeId,
    reveal: NodeId,
    counter: NodeId,
    image: NodeId,
    headline: NodeId,
    services_link: NodeId,
    services: NodeId,
    tagline: NodeId,
    overlay: NodeId,
    about_link: NodeId,
}

fn landing_page() -> Landing {
    let mut doc = MemoryDocument::new();
    doc.set_viewport(Viewport {
        scroll_y: 0.0,
        height: 800.0,
        document_height: 4800.0,
    });
    let body = doc.body();

    let header = doc.append(body, "header", &["header"]);
    let services_link = doc.append(header, "a", &["header__nav-link"]);
    doc.set_attribute(services_link, "href", "#services");
    let about_link = doc.append(header, "a", &["header__nav-link"]);
    doc.set_attribute(about_link, "href", "/about.html");
    let burger = doc.append(header, "button", &["hamburger"]);
    doc.set_attribute(burger, "aria-expanded", "false");
    doc.append(body, "nav", &["mobile-nav"]);

    let hero = doc.append(body, "section", &["hero"]);
    doc.set_attribute(hero, "data-slides", "/img/a.jpg,/img/b.jpg");
    let canvas = doc.append(hero, "canvas", &[]);
    doc.set_attribute(canvas, "id", "particle-canvas");
    doc.set_rect(canvas, Rect::new(0.0, 0.0, 1200.0, 800.0));
    let tagline = doc.append(hero, "p", &["text-reveal"]);
    doc.set_text(tagline, "Precision from above");
    let headline = doc.append(hero, "h1", &["typewriter"]);
    doc.set_attribute(headline, "data-text", "Eyes in the sky");
    let layer = doc.append(hero, "div", &[]);
    doc.set_attribute(layer, "data-parallax", "");
    doc.set_rect(layer, Rect::new(0.0, 200.0, 1200.0, 400.0));

    let stats = doc.append(body, "section", &["stagger-children"]);
    let reveal = doc.append(stats, "div", &["fade-in"]);
    let counter = doc.append(reveal, "span", &[]);
    doc.set_attribute(counter, "data-count", "1200");
    doc.set_attribute(counter, "data-suffix", "+");

    let services = doc.append(body, "section", &[]);
    doc.set_attribute(services, "id", "services");
    doc.set_rect(services, Rect::new(0.0, 1800.0, 1200.0, 900.0));
    let grid = doc.append(services, "div", &[]);
    let card = doc.append(grid, "article", &["tilt-card"]);
    doc.set_attribute(card, "data-category", "survey");
    let filter = doc.append(grid, "button", &["filter-btn"]);
    doc.set_attribute(filter, "data-filter", "survey");
    let image = doc.append(card, "img", &[]);
    doc.set_attribute(image, "data-src", "/img/survey.webp");

    let cta = doc.append(body, "a", &["btn", "btn-magnetic"]);
    doc.set_rect(cta, Rect::new(100.0, 700.0, 200.0, 50.0));
    let overlay = doc.append(body, "div", &["modal-overlay"]);
    doc.append(overlay, "h2", &["modal__title"]);
    let page_top = doc.append(body, "button", &["page-top"]);
    let overlay = doc.append(body, "div", &["page-transition", "active"]);

    Landing {
        doc,
        header,
        page_top,
        reveal,
        counter,
        image,
        headline,
        services_link,
        services,
        tagline,
        overlay,
        about_link,
    }
}

mod init_tests {
    use super::*;

    #[test]
    fn test_full_page_starts_every_effect() {
        let mut page = landing_page();
        let started = start(&mut page.doc, MotionPreference::default());
        assert_eq!(started.active_count(), 19);
        assert_eq!(started.counters.len(), 1);
        // 1200 x 800 canvas.
        assert_eq!(started.particles.as_ref().unwrap().particles().len(), 64);
        assert!(!page.doc.has_class(page.overlay, "active"));
        assert_eq!(
            page.doc.query_all_within(page.tagline, ".word-inner").len(),
            3
        );
        assert_eq!(started.magnetic.len(), 1);
        assert!(page.doc.query(".cursor-dot").is_some());
        assert!(page.doc.query(".hero__slide").is_some());
    }

    #[test]
    fn test_reduced_motion_page() {
        let mut page = landing_page();
        let motion = MotionPreference {
            reduced_motion: true,
            touch_device: false,
        };
        let started = start(&mut page.doc, motion);

        assert!(started.reveal.is_none());
        assert!(page.doc.has_class(page.reveal, "visible"));
        assert!(started.typewriter.is_none());
        assert_eq!(page.doc.text(page.headline), "Eyes in the sky");
        assert!(started.parallax.is_none());
        assert!(started.cursor.is_none());
        assert!(started.tilt.is_none());
        assert!(started.magnetic.is_empty());
        assert!(started.particles.is_none());
        assert!(started.text_reveal.is_none());
        assert_eq!(page.doc.style(page.tagline, "opacity").as_deref(), Some("1"));
        // Structure-only effects are unaffected.
        assert!(started.slideshow.is_some());
        assert!(started.mobile_nav.is_some());
        assert!(started.smooth_scroll.is_some());
        assert!(started.page_transition.is_some());
    }

    #[test]
    fn test_touch_device_keeps_scroll_effects() {
        let mut page = landing_page();
        let motion = MotionPreference {
            reduced_motion: false,
            touch_device: true,
        };
        let started = start(&mut page.doc, motion);
        assert!(started.cursor.is_none());
        assert!(started.parallax.is_some());
        assert!(started.reveal.is_some());
        assert!(page.doc.query(".cursor-dot").is_none());
    }
}

mod interaction_tests {
    use super::*;

    #[test]
    fn test_scroll_updates_header_page_top_and_progress() {
        let mut page = landing_page();
        let started = start(&mut page.doc, MotionPreference::default());

        page.doc.scroll_to(2000.0);
        started.on_scroll(&mut page.doc);
        assert!(page.doc.has_class(page.header, "scrolled"));
        assert!(page.doc.has_class(page.page_top, "visible"));
        let bar = page.doc.query(".scroll-progress").unwrap();
        assert_eq!(page.doc.style(bar, "width").as_deref(), Some("50%"));

        page.doc.scroll_to(10.0);
        started.on_scroll(&mut page.doc);
        assert!(!page.doc.has_class(page.header, "scrolled"));
        assert!(!page.doc.has_class(page.page_top, "visible"));
    }

    #[test]
    fn test_intersections_reveal_count_and_load() {
        let mut page = landing_page();
        let mut started = start(&mut page.doc, MotionPreference::default());

        let reveal = started.reveal.as_mut().unwrap();
        assert!(reveal.on_intersect(&mut page.doc, page.reveal));
        assert!(page.doc.has_class(page.reveal, "visible"));

        let counter = &started.counters[0];
        assert!(counter.on_intersect(&mut page.doc, MotionPreference::default()));
        assert!(!counter.render(&mut page.doc, Duration::from_secs(5)));
        assert_eq!(page.doc.text(page.counter), "1,200+");

        let lazy = started.lazy_images.as_mut().unwrap();
        let request = lazy.on_intersect(&page.doc, page.image).unwrap();
        lazy.complete(&mut page.doc, &request, LoadOutcome::Loaded);
        assert_eq!(
            page.doc.attribute(page.image, "src").as_deref(),
            Some("/img/survey.webp")
        );
        assert!(page.doc.has_class(page.image, "loaded"));
    }

    #[test]
    fn test_typewriter_and_slideshow_run_to_completion() {
        let mut page = landing_page();
        let mut started = start(&mut page.doc, MotionPreference::default());

        let writer = started.typewriter.as_mut().unwrap();
        let mut steps = 1;
        while writer.step(&mut page.doc) {
            steps += 1;
        }
        assert_eq!(steps, "Eyes in the sky".chars().count());
        assert_eq!(page.doc.text(page.headline), "Eyes in the sky");

        let show = started.slideshow.as_mut().unwrap();
        assert_eq!(show.advance(&mut page.doc), Some(1));
        assert_eq!(show.advance(&mut page.doc), Some(0));
    }

    #[test]
    fn test_anchor_scroll_and_nav_highlight() {
        let mut page = landing_page();
        let started = start(&mut page.doc, MotionPreference::default());
        let smooth = started.smooth_scroll.as_ref().unwrap();

        // Section sits 1800px below the top of the viewport.
        assert_eq!(
            smooth.on_click(&page.doc, page.services_link, MotionPreference::default()),
            Some((1700.0, ScrollBehavior::Smooth))
        );

        // Scrolled so the section is under the header; rects are viewport
        // relative.
        page.doc.scroll_to(1700.0);
        page.doc
            .set_rect(page.services, Rect::new(0.0, 100.0, 1200.0, 900.0));
        started.on_scroll(&mut page.doc);
        assert!(page.doc.has_class(page.services_link, "active"));
        assert!(!page.doc.has_class(page.about_link, "active"));
    }

    #[test]
    fn test_leaving_page_through_transition() {
        let mut page = landing_page();
        let started = start(&mut page.doc, MotionPreference::default());
        let transition = started.page_transition.as_ref().unwrap();

        assert!(transition.on_click(&mut page.doc, page.services_link).is_none());
        assert!(!page.doc.has_class(page.overlay, "active"));

        let nav = transition.on_click(&mut page.doc, page.about_link).unwrap();
        assert_eq!(nav.href, "/about.html");
        assert_eq!(nav.after, Duration::from_millis(300));
        assert!(page.doc.has_class(page.overlay, "active"));
    }

    #[test]
    fn test_text_reveal_and_particles_animate() {
        let mut page = landing_page();
        let mut started = start(&mut page.doc, MotionPreference::default());

        let words = started.text_reveal.as_mut().unwrap();
        assert!(words.on_intersect(&mut page.doc, page.tagline));
        assert!(page.doc.has_class(page.tagline, "revealed"));

        let field = started.particles.as_mut().unwrap();
        for _ in 0..600 {
            let links = field.frame();
            assert!(links.iter().all(|l| l.a < l.b && l.opacity > 0.0 && l.opacity <= 0.08));
        }
        for p in field.particles() {
            assert!((0.0..=1200.0).contains(&p.x));
            assert!((0.0..=800.0).contains(&p.y));
        }
    }

    #[test]
    fn test_modal_opens_block_with_comma_in_id() {
        let mut doc = MemoryDocument::new();
        let body = doc.body();
        let overlay = doc.append(body, "div", &["modal-overlay"]);
        let modal_body = doc.append(overlay, "div", &["modal__body"]);
        let content = doc.append(body, "template", &[]);
        doc.set_attribute(content, "data-modal-id", "roof, facade");
        doc.set_text(content, "Thermal imaging of roofs and facades.");
        let trigger = doc.append(body, "button", &[]);
        doc.set_attribute(trigger, "data-modal-open", "roof, facade");

        let started = start(&mut doc, MotionPreference::default());
        let modal = started.modal.as_ref().unwrap();
        modal.open_from(&mut doc, trigger);
        assert!(modal.is_open(&doc));
        assert_eq!(doc.text(modal_body), "Thermal imaging of roofs and facades.");
    }
}
