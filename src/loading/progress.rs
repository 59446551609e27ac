//! Progress state for the loading screen.
//!
//! Two drivers push `target` up (the simulated tick and the real load
//! signal), and the frame loop eases `current` toward it.

use rand::Rng;

use crate::config::LoadingConfig;

/// Value at which the sequence is complete.
pub const COMPLETE: f64 = 100.0;

/// Numeric knobs for [`ProgressState`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ProgressTuning {
    pub preload_cap: f64,
    pub increment_min: f64,
    pub increment_span: f64,
    pub smoothing: f64,
    pub snap_threshold: f64,
}

impl Default for ProgressTuning {
    fn default() -> Self {
        Self::from(&LoadingConfig::default())
    }
}

impl From<&LoadingConfig> for ProgressTuning {
    fn from(config: &LoadingConfig) -> Self {
        Self {
            preload_cap: config.preload_cap,
            increment_min: config.increment_min,
            increment_span: config.increment_span,
            smoothing: config.smoothing,
            snap_threshold: config.snap_threshold,
        }
    }
}

/// Displayed and target progress, both in `0.0..=100.0`.
///
/// `target` and `current` never decrease and `current` never passes
/// `target`.
#[derive(Debug, Clone)]
pub struct ProgressState {
    current: f64,
    target: f64,
    loaded: bool,
    tuning: ProgressTuning,
}

impl ProgressState {
    pub fn new(tuning: ProgressTuning) -> Self {
        Self {
            current: 0.0,
            target: 0.0,
            loaded: false,
            tuning,
        }
    }

    pub fn current(&self) -> f64 {
        self.current
    }

    pub fn target(&self) -> f64 {
        self.target
    }

    pub fn is_loaded(&self) -> bool {
        self.loaded
    }

    /// Advance the simulated target by a random increment, clamped to the
    /// pre-load cap. Returns whether `target` moved.
    ///
    /// No-op once the real load signal has been seen.
    pub fn simulate_tick<R: Rng>(&mut self, rng: &mut R) -> bool {
        if self.loaded || self.target >= self.tuning.preload_cap {
            return false;
        }
        let increment = if self.tuning.increment_span > 0.0 {
            self.tuning.increment_min + rng.random_range(0.0..self.tuning.increment_span)
        } else {
            self.tuning.increment_min
        };
        let next = (self.target + increment).min(self.tuning.preload_cap);
        let moved = next > self.target;
        self.target = next;
        moved
    }

    /// Record the real load signal. The target jumps to 100 regardless of the
    /// cap. Returns `true` only the first time.
    pub fn mark_loaded(&mut self) -> bool {
        if self.loaded {
            return false;
        }
        self.loaded = true;
        self.target = COMPLETE;
        true
    }

    /// One frame of exponential smoothing toward `target`, snapping once the
    /// gap is under the threshold. Returns the new `current`.
    pub fn ease(&mut self) -> f64 {
        self.current += (self.target - self.current) * self.tuning.smoothing;
        if (self.current - self.target).abs() < self.tuning.snap_threshold {
            self.current = self.target;
        }
        self.current
    }

    /// `current` rounded to the nearest whole percent.
    pub fn rounded(&self) -> u8 {
        self.current.round().clamp(0.0, COMPLETE) as u8
    }

    pub fn is_complete(&self) -> bool {
        self.rounded() >= 100
    }

    /// Upper bound on the frames [`ease`](Self::ease) needs to close a gap of
    /// `gap` percent under this tuning.
    pub fn frames_to_converge(&self, gap: f64) -> u32 {
        if gap < self.tuning.snap_threshold {
            return 1;
        }
        let k = self.tuning.smoothing;
        if k >= 1.0 {
            return 1;
        }
        // gap * (1 - k)^n < snap  =>  n > ln(snap / gap) / ln(1 - k)
        let n = (self.tuning.snap_threshold / gap).ln() / (1.0 - k).ln();
        n.ceil() as u32 + 1
    }
}
