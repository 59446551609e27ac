//! Telemetry & Observability
//!
//! Provides structured logging for the site runtime.
//! Features:
//! - Loading phase transition logging
//! - Per-request spans for the edge gate
//! - Configurable log levels via RUST_LOG
//! - Sanitizing and redaction helpers for untrusted request data

use regex::Regex;
use std::sync::OnceLock;
use tracing::{debug, info_span, Span};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Sanitize a string for safe log output by escaping control characters.
/// Prevents log injection where a client embeds newlines to forge log entries.
pub fn sanitize_for_log(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            '\x1b' => out.push_str("\\e"),
            '\x00' => out.push_str("\\0"),
            c if c.is_control() => out.push_str(&format!("\\u{:04x}", c as u32)),
            _ => out.push(c),
        }
    }
    out
}

static CREDENTIAL_PATTERNS: OnceLock<Vec<Regex>> = OnceLock::new();

fn credential_patterns() -> &'static Vec<Regex> {
    CREDENTIAL_PATTERNS.get_or_init(|| {
        vec![
            // Authorization header payloads: "Basic dXNlcjpwYXNz", "Bearer abc..."
            Regex::new(r"(?i)\b(basic|bearer|digest)\s+\S+").expect("invalid scheme regex"),
            // user:password@ in URLs
            Regex::new(r"://[^/\s:@]+:[^/\s@]+@").expect("invalid userinfo regex"),
        ]
    })
}

/// Redact credentials from a string before logging.
///
/// Keeps the auth scheme name so logs still show what kind of header was
/// sent, but never its payload.
pub fn redact_credentials(input: &str) -> String {
    let patterns = credential_patterns();
    let scheme_redacted = patterns[0].replace_all(input, "$1 [REDACTED]");
    patterns[1]
        .replace_all(&scheme_redacted, "://[REDACTED]@")
        .into_owned()
}

/// Initialize global tracing subscriber.
/// Only enables tracing if RUST_LOG is explicitly set, keeping CLI output clean.
pub fn init_tracing() {
    if let Ok(filter) = std::env::var("RUST_LOG") {
        init_tracing_with_filter(&filter);
    }
}

/// Initialize tracing for debug/verbose mode
pub fn init_tracing_verbose() {
    init_tracing_with_filter("skyscope=debug,info")
}

/// Initialize with custom filter string
pub fn init_tracing_with_filter(filter: &str) {
    use std::sync::Once;
    static INIT: Once = Once::new();

    INIT.call_once(|| {
        let fmt_layer = tracing_subscriber::fmt::layer()
            .with_target(false)
            .with_thread_ids(false)
            .with_thread_names(false)
            .with_file(false)
            .with_line_number(false)
            .with_level(true)
            .with_writer(std::io::stderr);

        let filter_layer = EnvFilter::try_new(filter).unwrap_or_else(|_| EnvFilter::new("warn"));

        let _ = tracing_subscriber::registry()
            .with(filter_layer)
            .with(fmt_layer)
            .try_init();
    });
}

/// Span for one request through the edge gate.
pub fn request_span(method: &str, path: &str) -> Span {
    let safe_method = sanitize_for_log(method);
    let safe_path = sanitize_for_log(path);
    info_span!(
        "edge.request",
        method = safe_method.as_str(),
        path = safe_path.as_str(),
        status = tracing::field::Empty,
    )
}

/// Record a loading sequencer phase transition
pub fn record_phase_transition(from: &str, to: &str) {
    debug!(from = from, to = to, "Loading phase transition");
}

/// Initialize tracing for tests with a simple subscriber
#[cfg(test)]
pub fn init_test_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_test_writer()
        .with_max_level(tracing::Level::DEBUG)
        .try_init();
}
