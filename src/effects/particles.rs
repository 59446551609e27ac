//! Drifting particle field behind the hero, with faint links between close
//! neighbours. The host draws; this module owns positions and link strengths.

use rand::Rng;
use tracing::trace;

use super::MotionPreference;
use crate::document::{Document, NodeId};

/// Canvas area, in square pixels, per particle.
pub const AREA_PER_PARTICLE: f64 = 15000.0;
/// Particles closer than this are linked.
pub const LINK_DISTANCE: f64 = 120.0;
/// Opacity of a link between two particles at the same spot.
pub const LINK_MAX_OPACITY: f64 = 0.08;

#[derive(Debug, Clone, PartialEq)]
pub struct Particle {
    pub x: f64,
    pub y: f64,
    pub size: f64,
    pub speed_x: f64,
    pub speed_y: f64,
    pub opacity: f64,
}

impl Particle {
    fn spawn<R: Rng>(rng: &mut R, width: f64, height: f64) -> Self {
        Self {
            x: rng.random::<f64>() * width,
            y: rng.random::<f64>() * height,
            size: rng.random::<f64>() * 2.0 + 0.5,
            speed_x: (rng.random::<f64>() - 0.5) * 0.5,
            speed_y: (rng.random::<f64>() - 0.5) * 0.5,
            opacity: rng.random::<f64>() * 0.5 + 0.1,
        }
    }

    /// Move one step, re-entering on the opposite edge when it leaves the
    /// canvas.
    fn drift(&mut self, width: f64, height: f64) {
        self.x += self.speed_x;
        self.y += self.speed_y;
        if self.x < 0.0 {
            self.x = width;
        } else if self.x > width {
            self.x = 0.0;
        }
        if self.y < 0.0 {
            self.y = height;
        } else if self.y > height {
            self.y = 0.0;
        }
    }
}

/// A line to draw between particles `a` and `b`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Link {
    pub a: usize,
    pub b: usize,
    pub opacity: f64,
}

/// Number of particles for a canvas of the given size.
pub fn particle_count(width: f64, height: f64) -> usize {
    if width <= 0.0 || height <= 0.0 {
        return 0;
    }
    (width * height / AREA_PER_PARTICLE).floor() as usize
}

/// Particle simulation bound to `#particle-canvas`.
#[derive(Debug, Clone)]
pub struct ParticleField {
    canvas: NodeId,
    width: f64,
    height: f64,
    particles: Vec<Particle>,
}

impl ParticleField {
    /// Skipped entirely when motion is reduced.
    pub fn init<D, R>(doc: &mut D, motion: MotionPreference, rng: &mut R) -> Option<Self>
    where
        D: Document + ?Sized,
        R: Rng,
    {
        if motion.reduced_motion {
            return None;
        }
        let canvas = doc.query("#particle-canvas")?;
        let mut field = Self {
            canvas,
            width: 0.0,
            height: 0.0,
            particles: Vec::new(),
        };
        field.resize(doc, rng);
        Some(field)
    }

    /// Match the canvas size and scatter a fresh set of particles.
    pub fn resize<D, R>(&mut self, doc: &mut D, rng: &mut R)
    where
        D: Document + ?Sized,
        R: Rng,
    {
        let rect = doc.rect(self.canvas);
        self.width = rect.width.max(0.0);
        self.height = rect.height.max(0.0);
        doc.set_attribute(self.canvas, "width", &self.width.to_string());
        doc.set_attribute(self.canvas, "height", &self.height.to_string());

        let count = particle_count(self.width, self.height);
        self.particles = (0..count)
            .map(|_| Particle::spawn(rng, self.width, self.height))
            .collect();
        trace!(count, width = self.width, height = self.height, "Particles scattered");
    }

    pub fn particles(&self) -> &[Particle] {
        &self.particles
    }

    /// Advance one animation frame and return the links to draw.
    pub fn frame(&mut self) -> Vec<Link> {
        for particle in &mut self.particles {
            particle.drift(self.width, self.height);
        }
        self.links()
    }

    /// Pairs closer than [`LINK_DISTANCE`], fading with distance.
    pub fn links(&self) -> Vec<Link> {
        let mut links = Vec::new();
        for (a, p) in self.particles.iter().enumerate() {
            for (offset, q) in self.particles[a + 1..].iter().enumerate() {
                let distance = (p.x - q.x).hypot(p.y - q.y);
                if distance < LINK_DISTANCE {
                    links.push(Link {
                        a,
                        b: a + 1 + offset,
                        opacity: LINK_MAX_OPACITY * (1.0 - distance / LINK_DISTANCE),
                    });
                }
            }
        }
        links
    }
}
