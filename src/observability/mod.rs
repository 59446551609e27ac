//! Observability module
//!
//! Structured logging for the loading sequencer and the edge gate:
//! - Subscriber setup driven by `RUST_LOG` or `--verbose`
//! - Log-injection safe formatting of request data
//! - Credential redaction for `Authorization` headers

pub mod telemetry;
