//! Loading screen sequencer
//!
//! Drives the progress indicator from page start to the interactive state:
//! - Simulated progress on a fixed tick, capped until the page really loads
//! - Eased rendering every animation frame
//! - Exit transition with a fallback deadline
//! - Exactly-once completion callback
//!
//! The host feeds [`HostEvent`]s through a channel; timers come from tokio.

use rand::Rng;
use serde::Serialize;
use std::future::pending;
use tokio::sync::mpsc;
use tokio::time::{self, Instant, MissedTickBehavior};
use tracing::{debug, info, warn};

use super::latch::CompletionLatch;
use super::progress::{ProgressState, ProgressTuning};
use crate::config::LoadingConfig;
use crate::document::{Document, NodeId};
use crate::observability::telemetry::record_phase_transition;

pub const ROOT_SELECTOR: &str = ".loading-screen";
pub const FILL_SELECTOR: &str = ".loading-screen__progress";
pub const LABEL_SELECTOR: &str = ".loading-screen__percent";
pub const LOADED_CLASS: &str = "loaded";
pub const FADE_OUT_CLASS: &str = "fade-out";

/// One-shot notifications from the page host.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HostEvent {
    /// Every page resource has finished loading.
    Load,
    /// The indicator's exit transition finished.
    TransitionEnd,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Phase {
    Starting,
    Simulating,
    Converging,
    Dismissing,
    Completed,
}

impl Phase {
    pub fn as_str(&self) -> &'static str {
        match self {
            Phase::Starting => "starting",
            Phase::Simulating => "simulating",
            Phase::Converging => "converging",
            Phase::Dismissing => "dismissing",
            Phase::Completed => "completed",
        }
    }
}

impl std::fmt::Display for Phase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Which path finished the sequence.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CompletionPath {
    /// The document had no indicator; completed synchronously.
    NoIndicator,
    /// The exit transition reported its end.
    TransitionEnd,
    /// The exit transition never reported; the fallback deadline fired.
    FallbackTimeout,
}

/// Summary of one run.
#[derive(Debug, Clone, Serialize)]
pub struct SequenceReport {
    /// Animation frames processed.
    pub frames: u32,
    /// Simulated ticks that raised the target.
    pub ticks: u32,
    /// Whether `max_wait` forced the load signal.
    pub forced_load: bool,
    pub path: CompletionPath,
    /// Every phase entered, in order.
    pub phases: Vec<Phase>,
}

/// The indicator's nodes, located once at start.
#[derive(Debug, Clone, Copy)]
pub struct Indicator {
    pub root: NodeId,
    pub fill: Option<NodeId>,
    pub label: Option<NodeId>,
}

impl Indicator {
    pub fn locate<D: Document + ?Sized>(doc: &D) -> Option<Self> {
        let root = doc.query(ROOT_SELECTOR)?;
        Some(Self {
            root,
            fill: doc.query_within(root, FILL_SELECTOR),
            label: doc.query_within(root, LABEL_SELECTOR),
        })
    }

    /// Write `value` percent to whichever display surfaces exist.
    pub fn render<D: Document + ?Sized>(&self, doc: &mut D, value: u8) {
        let text = format!("{}%", value);
        if let Some(fill) = self.fill {
            doc.set_style(fill, "width", &text);
        }
        if let Some(label) = self.label {
            doc.set_text(label, &text);
        }
    }
}

struct PhaseLog {
    current: Phase,
    history: Vec<Phase>,
}

impl PhaseLog {
    fn new() -> Self {
        Self {
            current: Phase::Starting,
            history: vec![Phase::Starting],
        }
    }

    fn enter(&mut self, next: Phase) {
        if self.current == next || self.current == Phase::Completed {
            return;
        }
        record_phase_transition(self.current.as_str(), next.as_str());
        self.current = next;
        self.history.push(next);
    }
}

/// Loading screen progress controller.
pub struct LoadingSequencer<R> {
    config: LoadingConfig,
    rng: R,
}

impl<R: Rng> LoadingSequencer<R> {
    pub fn new(config: LoadingConfig, rng: R) -> Self {
        Self { config, rng }
    }

    /// Run the sequence to completion against `doc`.
    ///
    /// `on_complete` fires exactly once before this returns. When `doc` has
    /// no indicator, the future completes on its first poll without touching
    /// any timer.
    pub async fn run<D, F>(
        mut self,
        doc: &mut D,
        mut events: mpsc::Receiver<HostEvent>,
        on_complete: F,
    ) -> SequenceReport
    where
        D: Document + ?Sized,
        F: FnOnce(),
    {
        let latch = CompletionLatch::new(on_complete);
        let mut phases = PhaseLog::new();

        let Some(indicator) = Indicator::locate(doc) else {
            debug!("No loading indicator present; completing immediately");
            let body = doc.body();
            doc.add_class(body, LOADED_CLASS);
            latch.fire();
            phases.enter(Phase::Completed);
            return SequenceReport {
                frames: 0,
                ticks: 0,
                forced_load: false,
                path: CompletionPath::NoIndicator,
                phases: phases.history,
            };
        };

        let mut state = ProgressState::new(ProgressTuning::from(&self.config));
        phases.enter(Phase::Simulating);

        let start = Instant::now();
        let tick_every = self.config.tick_interval();
        let mut ticker = time::interval_at(start + tick_every, tick_every);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        let mut frames = time::interval(self.config.frame_interval());
        frames.set_missed_tick_behavior(MissedTickBehavior::Skip);
        let deadline = self.config.max_wait().map(|wait| start + wait);

        let mut events_open = true;
        let mut frame_count: u32 = 0;
        let mut tick_count: u32 = 0;
        let mut forced_load = false;
        let mut last_rendered: Option<u8> = None;

        loop {
            tokio::select! {
                biased;

                event = events.recv(), if events_open => match event {
                    Some(HostEvent::Load) => {
                        if state.mark_loaded() {
                            debug!(displayed = state.current(), "Page load signal received");
                            phases.enter(Phase::Converging);
                        }
                    }
                    // No listener is attached before the exit transition starts.
                    Some(HostEvent::TransitionEnd) => {}
                    None => events_open = false,
                },

                _ = sleep_until_opt(deadline), if deadline.is_some() && !state.is_loaded() => {
                    warn!(
                        max_wait_ms = self.config.max_wait_ms.unwrap_or_default(),
                        "Load signal never arrived; forcing completion"
                    );
                    state.mark_loaded();
                    forced_load = true;
                    phases.enter(Phase::Converging);
                }

                _ = ticker.tick(), if !state.is_loaded() => {
                    if state.simulate_tick(&mut self.rng) {
                        tick_count += 1;
                    }
                }

                _ = frames.tick() => {
                    state.ease();
                    frame_count += 1;
                    let rounded = state.rounded();
                    if last_rendered != Some(rounded) {
                        indicator.render(doc, rounded);
                        last_rendered = Some(rounded);
                    }
                    if rounded >= 100 {
                        break;
                    }
                }
            }
        }

        phases.enter(Phase::Dismissing);
        time::sleep(self.config.dismiss_delay()).await;

        // Events that arrived before the exit transition started are stale.
        while events_open {
            match events.try_recv() {
                Ok(_) => continue,
                Err(mpsc::error::TryRecvError::Empty) => break,
                Err(mpsc::error::TryRecvError::Disconnected) => events_open = false,
            }
        }
        doc.add_class(indicator.root, FADE_OUT_CLASS);

        let fallback = time::sleep(self.config.fallback_timeout());
        tokio::pin!(fallback);

        let path = loop {
            tokio::select! {
                biased;

                event = events.recv(), if events_open => match event {
                    Some(HostEvent::TransitionEnd) => break CompletionPath::TransitionEnd,
                    Some(HostEvent::Load) => {}
                    None => events_open = false,
                },

                _ = &mut fallback => break CompletionPath::FallbackTimeout,
            }
        };

        if path == CompletionPath::FallbackTimeout {
            debug!("Exit transition did not report; using fallback");
        }

        if !latch.is_fired() {
            doc.set_style(indicator.root, "display", "none");
            let body = doc.body();
            doc.add_class(body, LOADED_CLASS);
            latch.fire();
        }
        phases.enter(Phase::Completed);

        info!(
            frames = frame_count,
            ticks = tick_count,
            path = ?path,
            elapsed_ms = start.elapsed().as_millis() as u64,
            "Loading sequence complete"
        );

        SequenceReport {
            frames: frame_count,
            ticks: tick_count,
            forced_load,
            path,
            phases: phases.history,
        }
    }
}

async fn sleep_until_opt(deadline: Option<Instant>) {
    match deadline {
        Some(at) => time::sleep_until(at).await,
        None => pending().await,
    }
}
