//! SkyScope command line
//!
//! - `serve`: run the Basic-Auth edge server in front of the static site
//! - `preview`: play the loading sequence in the terminal
//! - `check-auth`: run one request through the auth gate and report

use std::io::IsTerminal;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use rand::rngs::StdRng;
use rand::SeedableRng;
use tokio::sync::{mpsc, oneshot};
use tracing::info;

use crate::auth::server::EdgeServer;
use crate::auth::{BasicAuthGate, GateDecision};
use crate::config::Config;
use crate::document::{Document, MemoryDocument};
use crate::effects::{self, MotionPreference};
use crate::errors::SiteError;
use crate::loading::{HostEvent, LoadingSequencer, SequenceReport};
use crate::observability::telemetry::{init_tracing, init_tracing_verbose, redact_credentials};
use crate::ui::style::SiteStyle;
use crate::ui::TerminalMirror;

#[derive(Parser)]
#[command(name = "skyscope")]
#[command(about = "SkyScope site runtime: loading sequence preview and Basic-Auth edge gate")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Config file path
    #[arg(short, long, value_name = "FILE", global = true)]
    config: Option<String>,

    /// Verbose logging (debug level for this crate)
    #[arg(short = 'v', long, global = true)]
    verbose: bool,

    /// Disable colored output
    #[arg(long, global = true)]
    no_color: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Serve the site behind the Basic-Auth gate
    Serve {
        /// Override the bind address (host:port)
        #[arg(short, long)]
        bind: Option<String>,

        /// Override the static site directory
        #[arg(long, value_name = "DIR")]
        site_root: Option<String>,
    },

    /// Play the loading sequence against an in-memory page
    Preview {
        /// Deliver the page-load signal after this many milliseconds
        #[arg(long, value_name = "MS", default_value_t = 1500)]
        load_after_ms: u64,

        /// Never deliver the page-load signal
        #[arg(long)]
        no_load: bool,

        /// Length of the simulated exit transition
        #[arg(long, value_name = "MS", default_value = "500")]
        transition_ms: u64,

        /// Never report the exit transition's end (exercises the fallback)
        #[arg(long)]
        drop_transition_end: bool,

        /// Use a page without the loading indicator
        #[arg(long)]
        no_indicator: bool,

        /// Seed for the simulated progress increments
        #[arg(long)]
        seed: Option<u64>,

        /// Emulate prefers-reduced-motion for the page effects
        #[arg(long)]
        reduced_motion: bool,

        /// Print the run report as JSON
        #[arg(long)]
        json: bool,
    },

    /// Check one request against the auth gate
    CheckAuth {
        /// Request path
        #[arg(long, default_value = "/")]
        path: String,

        /// Raw Authorization header value
        #[arg(long)]
        header: Option<String>,

        /// Build a Basic header from user:password instead of --header
        #[arg(long, value_name = "USER:PASS", conflicts_with = "header")]
        user: Option<String>,
    },
}

pub async fn run() -> Result<()> {
    let cli = Cli::parse();

    if cli.verbose {
        init_tracing_verbose();
    } else {
        init_tracing();
    }

    if cli.no_color || std::env::var("NO_COLOR").is_ok() {
        colored::control::set_override(false);
    }

    let config = Config::load(cli.config.as_deref())?;

    match cli.command {
        Commands::Serve { bind, site_root } => serve(config, bind, site_root).await,
        Commands::Preview {
            load_after_ms,
            no_load,
            transition_ms,
            drop_transition_end,
            no_indicator,
            seed,
            reduced_motion,
            json,
        } => {
            let options = PreviewOptions {
                load_after: (!no_load).then(|| Duration::from_millis(load_after_ms)),
                transition: Duration::from_millis(transition_ms),
                drop_transition_end,
                with_indicator: !no_indicator,
                seed,
                motion: MotionPreference {
                    reduced_motion,
                    touch_device: false,
                },
            };
            let outcome = preview(&config, options).await?;
            print_preview(&outcome, json)
        }
        Commands::CheckAuth { path, header, user } => {
            let header = match user {
                Some(pair) => {
                    let (user, pass) = pair
                        .split_once(':')
                        .context("--user expects USER:PASS")?;
                    Some(crate::auth::basic_header(user, pass))
                }
                None => header,
            };
            check_auth(&config, &path, header.as_deref())
        }
    }
}

// ---------------------------------------------------------------------------
// serve
// ---------------------------------------------------------------------------

async fn serve(mut config: Config, bind: Option<String>, site_root: Option<String>) -> Result<()> {
    if let Some(bind) = bind {
        config.server.bind = bind;
    }
    if let Some(site_root) = site_root {
        config.server.site_root = site_root.into();
    }

    let gate = Arc::new(BasicAuthGate::from_config(&config.auth));
    let server = EdgeServer::start(&config.server, gate)
        .await
        .map_err(SiteError::from)?;

    println!(
        "{} http://{} {}",
        "Serving".headline(),
        server.local_addr(),
        format!("({})", config.server.site_root.display()).as_str().muted()
    );

    tokio::signal::ctrl_c()
        .await
        .context("Failed to listen for shutdown signal")?;
    info!("Shutdown requested");
    server.stop().await;
    Ok(())
}

// ---------------------------------------------------------------------------
// preview
// ---------------------------------------------------------------------------

/// How the simulated host behaves during a preview run.
#[derive(Debug, Clone)]
pub struct PreviewOptions {
    /// When to deliver the page-load signal; `None` never delivers it.
    pub load_after: Option<Duration>,
    /// Delay between the exit transition starting and its end being reported.
    pub transition: Duration,
    pub drop_transition_end: bool,
    pub with_indicator: bool,
    pub seed: Option<u64>,
    pub motion: MotionPreference,
}

impl Default for PreviewOptions {
    fn default() -> Self {
        Self {
            load_after: Some(Duration::from_millis(1500)),
            transition: Duration::from_millis(500),
            drop_transition_end: false,
            with_indicator: true,
            seed: None,
            motion: MotionPreference::default(),
        }
    }
}

/// Result of a preview run.
#[derive(Debug, serde::Serialize)]
pub struct PreviewOutcome {
    pub report: SequenceReport,
    pub callback_fired: bool,
    pub elapsed_ms: u64,
    pub effects_started: usize,
    pub body_loaded: bool,
}

/// Run the loading sequence against an in-memory page, mirroring progress to
/// stderr, then start the page effects.
pub async fn preview(config: &Config, options: PreviewOptions) -> Result<PreviewOutcome> {
    let page = if options.with_indicator {
        MemoryDocument::with_loading_screen()
    } else {
        MemoryDocument::new()
    };
    let color = std::io::stderr().is_terminal();
    let mut mirror = TerminalMirror::new(page, std::io::stderr(), color);

    let (fade_tx, fade_rx) = oneshot::channel();
    mirror.notify_fade_out(fade_tx);
    let (events_tx, events_rx) = mpsc::channel(4);
    let host = tokio::spawn(simulate_host(events_tx, fade_rx, options.clone()));

    let sequencer = LoadingSequencer::new(config.loading.clone(), seeded_rng(options.seed));

    let fired = AtomicBool::new(false);
    let started = tokio::time::Instant::now();
    let report = sequencer
        .run(&mut mirror, events_rx, || fired.store(true, Ordering::SeqCst))
        .await;
    let elapsed_ms = started.elapsed().as_millis() as u64;
    host.abort();

    let (mut page, _) = mirror.into_parts();
    let page_effects = effects::init_all(&mut page, options.motion, &mut seeded_rng(options.seed));
    let body = page.body();

    Ok(PreviewOutcome {
        report,
        callback_fired: fired.load(Ordering::SeqCst),
        elapsed_ms,
        effects_started: page_effects.active_count(),
        body_loaded: page.has_class(body, "loaded"),
    })
}

fn seeded_rng(seed: Option<u64>) -> StdRng {
    match seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_os_rng(),
    }
}

/// Stand-in for the browser: fires the load event on schedule and reports the
/// end of the exit transition once it has started.
async fn simulate_host(
    events: mpsc::Sender<HostEvent>,
    fade_out: oneshot::Receiver<()>,
    options: PreviewOptions,
) {
    if let Some(delay) = options.load_after {
        tokio::time::sleep(delay).await;
        if events.send(HostEvent::Load).await.is_err() {
            return;
        }
    }
    if options.drop_transition_end || fade_out.await.is_err() {
        return;
    }
    tokio::time::sleep(options.transition).await;
    let _ = events.send(HostEvent::TransitionEnd).await;
}

fn print_preview(outcome: &PreviewOutcome, json: bool) -> Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(outcome)?);
        return Ok(());
    }
    let report = &outcome.report;
    println!("{}", "Loading sequence complete".headline());
    println!("  path:      {:?}", report.path);
    println!("  frames:    {}", report.frames);
    println!("  ticks:     {}", report.ticks);
    println!("  forced:    {}", report.forced_load);
    println!("  elapsed:   {} ms", outcome.elapsed_ms);
    println!(
        "  phases:    {}",
        report
            .phases
            .iter()
            .map(|p| p.as_str())
            .collect::<Vec<_>>()
            .join(" -> ")
            .as_str()
            .muted()
    );
    println!("  effects:   {}", outcome.effects_started);
    Ok(())
}

// ---------------------------------------------------------------------------
// check-auth
// ---------------------------------------------------------------------------

fn check_auth(config: &Config, path: &str, header: Option<&str>) -> Result<()> {
    let gate = BasicAuthGate::from_config(&config.auth);
    let shown = header.map(redact_credentials);
    match gate.check(path, header) {
        GateDecision::Proceed => {
            println!("{} {}", "ALLOW".allowed(), path);
            Ok(())
        }
        GateDecision::Challenge(challenge) => {
            println!("{} {} {}", "DENY".denied(), challenge.status, path);
            println!("  WWW-Authenticate: {}", challenge.www_authenticate);
            if let Some(shown) = shown {
                println!("  {}", format!("Authorization: {}", shown).as_str().muted());
            }
            Err(SiteError::AccessDenied {
                path: path.to_string(),
            }
            .into())
        }
    }
}
