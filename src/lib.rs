//! SkyScope site runtime
//!
//! Runtime pieces of the SkyScope drone-services site:
//!
//! - **Loading**: progress indicator sequencer with an exactly-once
//!   completion callback
//! - **Effects**: scroll, counter, media, navigation, particle and pointer
//!   effects started after loading completes
//! - **Auth**: HTTP Basic-Auth edge gate and the axum static-file server
//!   behind it
//! - **Document**: the render surface every page procedure goes through
//!
//! # Quick Start
//!
//! ```ignore
//! use skyscope::config::Config;
//! use skyscope::document::MemoryDocument;
//! use skyscope::loading::{HostEvent, LoadingSequencer};
//!
//! let config = Config::load(None)?;
//! let mut page = MemoryDocument::with_loading_screen();
//! let (tx, rx) = tokio::sync::mpsc::channel(4);
//! tx.send(HostEvent::Load).await?;
//! let report = LoadingSequencer::new(config.loading, rand::rng())
//!     .run(&mut page, rx, || println!("ready"))
//!     .await;
//! ```

// ─── Page runtime ──────────────────────────────────────────────────
pub mod document;
pub mod effects;
pub mod loading;

// ─── Edge ──────────────────────────────────────────────────────────
pub mod auth;

// ─── Infrastructure ────────────────────────────────────────────────
pub mod cli;
pub mod config;
pub mod errors;
pub mod observability;
pub mod ui;

pub use config::Config;
pub use errors::{SiteError, EXIT_AUTH_DENIED, EXIT_CONFIG_ERROR, EXIT_SERVER_ERROR};
