//! Unit tests for the loading sequencer
//!
//! Tests cover:
//! - Rendered progress never moves backwards and ends at 100%
//! - The exit transition reported by a host that watches for `fade-out`
//! - Exactly-once completion under every path

use rand::rngs::StdRng;
use rand::SeedableRng;
use skyscope::config::LoadingConfig;
use skyscope::document::{Document, MemoryDocument};
use skyscope::loading::{
    CompletionLatch, CompletionPath, HostEvent, LoadingSequencer, Phase, ProgressState,
    ProgressTuning,
};
use skyscope::ui::TerminalMirror;
use std::cell::Cell;
use std::time::Duration;
use tokio::sync::{mpsc, oneshot};
use tokio::time;

fn sequencer(seed: u64, config: LoadingConfig) -> LoadingSequencer<StdRng> {
    LoadingSequencer::new(config, StdRng::seed_from_u64(seed))
}

/// Percentages printed by the terminal mirror, in order.
fn drawn_percents(output: &[u8]) -> Vec<u8> {
    String::from_utf8_lossy(output)
        .split('\r')
        .filter_map(|frame| {
            let frame = frame.trim_end();
            let pct = frame.strip_suffix('%')?;
            pct.rsplit(' ').next()?.parse().ok()
        })
        .collect()
}

/// Host that loads after `load_after` and reports the transition end
/// `transition` after the indicator starts fading.
async fn host(
    events: mpsc::Sender<HostEvent>,
    fade_out: oneshot::Receiver<()>,
    load_after: Duration,
    transition: Duration,
) {
    time::sleep(load_after).await;
    if events.send(HostEvent::Load).await.is_err() {
        return;
    }
    if fade_out.await.is_ok() {
        time::sleep(transition).await;
        let _ = events.send(HostEvent::TransitionEnd).await;
    }
}

mod sequence_tests {
    use super::*;

    #[tokio::test(start_paused = true)]
    async fn test_rendered_progress_is_monotonic() {
        for seed in [1, 7, 99] {
            let mut mirror =
                TerminalMirror::new(MemoryDocument::with_loading_screen(), Vec::new(), false);
            let (fade_tx, fade_rx) = oneshot::channel();
            mirror.notify_fade_out(fade_tx);
            let (tx, rx) = mpsc::channel(4);
            let host = tokio::spawn(host(
                tx,
                fade_rx,
                Duration::from_millis(2500),
                Duration::from_millis(400),
            ));

            let report = sequencer(seed, LoadingConfig::default())
                .run(&mut mirror, rx, || {})
                .await;
            host.abort();
            assert_eq!(report.path, CompletionPath::TransitionEnd);

            let (_, output) = mirror.into_parts();
            let drawn = drawn_percents(&output);
            assert!(!drawn.is_empty());
            assert!(
                drawn.windows(2).all(|w| w[0] < w[1]),
                "seed {}: {:?}",
                seed,
                drawn
            );
            assert_eq!(drawn.last(), Some(&100));
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_transition_end_beats_fallback() {
        let mut mirror =
            TerminalMirror::new(MemoryDocument::with_loading_screen(), std::io::sink(), false);
        let (fade_tx, fade_rx) = oneshot::channel();
        mirror.notify_fade_out(fade_tx);
        let (tx, rx) = mpsc::channel(4);
        tokio::spawn(host(
            tx,
            fade_rx,
            Duration::from_millis(300),
            Duration::from_millis(600),
        ));

        let fired = Cell::new(0);
        let started = time::Instant::now();
        let report = sequencer(3, LoadingConfig::default())
            .run(&mut mirror, rx, || fired.set(fired.get() + 1))
            .await;

        assert_eq!(fired.get(), 1);
        assert_eq!(report.path, CompletionPath::TransitionEnd);
        assert_eq!(report.phases.last(), Some(&Phase::Completed));
        assert!(!report.forced_load);
        // Completed well before the fallback could have fired.
        assert!(started.elapsed() < Duration::from_secs(60));

        let page = mirror.inner();
        let root = page.query(".loading-screen").unwrap();
        assert_eq!(page.style(root, "display").as_deref(), Some("none"));
        assert!(page.has_class(page.body(), "loaded"));
    }

    #[tokio::test(start_paused = true)]
    async fn test_closed_channel_still_completes_after_load() {
        let mut page = MemoryDocument::with_loading_screen();
        let (tx, rx) = mpsc::channel(4);
        tx.send(HostEvent::Load).await.unwrap();
        drop(tx);

        let fired = Cell::new(false);
        let report = sequencer(5, LoadingConfig::default())
            .run(&mut page, rx, || fired.set(true))
            .await;

        assert!(fired.get());
        assert_eq!(report.path, CompletionPath::FallbackTimeout);
    }

    #[tokio::test(start_paused = true)]
    async fn test_without_load_signal_label_stays_at_cap() {
        let mut page = MemoryDocument::with_loading_screen();
        let label = page.query(".loading-screen__percent").unwrap();
        let (_tx, rx) = mpsc::channel::<HostEvent>(4);

        let fired = Cell::new(false);
        let run = sequencer(11, LoadingConfig::default()).run(&mut page, rx, || fired.set(true));
        assert!(time::timeout(Duration::from_secs(120), run).await.is_err());

        assert!(!fired.get());
        assert_eq!(page.text(label), "90%");
        assert!(!page.has_class(page.body(), "loaded"));
    }

    #[tokio::test(start_paused = true)]
    async fn test_custom_cap_respected() {
        let mut page = MemoryDocument::with_loading_screen();
        let label = page.query(".loading-screen__percent").unwrap();
        let (_tx, rx) = mpsc::channel::<HostEvent>(4);
        let config = LoadingConfig {
            preload_cap: 60.0,
            ..LoadingConfig::default()
        };

        let run = sequencer(11, config).run(&mut page, rx, || {});
        assert!(time::timeout(Duration::from_secs(60), run).await.is_err());
        assert_eq!(page.text(label), "60%");
    }
}

mod latch_tests {
    use super::*;

    #[test]
    fn test_latch_fires_once_across_paths() {
        let count = Cell::new(0);
        let latch = CompletionLatch::new(|| count.set(count.get() + 1));
        // Transition end and fallback racing.
        let winners = [latch.fire(), latch.fire()];
        assert_eq!(winners, [true, false]);
        assert_eq!(count.get(), 1);
    }
}

mod progress_tests {
    use super::*;

    #[test]
    fn test_ticks_never_pass_cap() {
        let mut state = ProgressState::new(ProgressTuning::default());
        let mut rng = StdRng::seed_from_u64(0);
        for _ in 0..100 {
            state.simulate_tick(&mut rng);
            assert!(state.target() <= 90.0);
        }
        assert_eq!(state.target(), 90.0);
        assert!(!state.simulate_tick(&mut rng));
    }

    #[test]
    fn test_load_overrides_cap_and_converges() {
        let mut state = ProgressState::new(ProgressTuning::default());
        assert!(state.mark_loaded());
        assert!(!state.mark_loaded());
        assert_eq!(state.target(), 100.0);

        let mut frames = 0;
        while !state.is_complete() {
            state.ease();
            frames += 1;
            assert!(frames < 1000);
        }
        assert_eq!(state.rounded(), 100);
        assert!(state.current() <= 100.0);
    }
}
