//! Loading screen
//!
//! The one stateful piece of the site runtime. [`ProgressState`] holds the
//! chase between simulated and displayed progress, [`CompletionLatch`] keeps
//! the completion callback single-fire, and [`LoadingSequencer`] schedules
//! both against the host's timers and events.

pub mod latch;
pub mod progress;
pub mod sequencer;

pub use latch::CompletionLatch;
pub use progress::{ProgressState, ProgressTuning};
pub use sequencer::{CompletionPath, HostEvent, LoadingSequencer, Phase, SequenceReport};
