//! Basic-Auth edge gate
//!
//! Challenges every request outside an allow-list with HTTP Basic
//! authentication. Every failure (missing header, other scheme, undecodable
//! payload, wrong credentials) yields the same 401 challenge.
//!
//! Credential checks go through [`CredentialVerifier`] so the static pair can
//! be swapped for a real store without touching request handling.

pub mod server;

use base64::engine::general_purpose::STANDARD;
use base64::Engine;

use crate::config::AuthConfig;

pub const CHALLENGE_STATUS: u16 = 401;
pub const CHALLENGE_BODY: &str = "Authentication required";

/// Decides whether a username/password pair is acceptable.
pub trait CredentialVerifier: Send + Sync {
    fn verify(&self, username: &str, password: &str) -> bool;
}

/// A single hard-coded credential pair.
#[derive(Debug, Clone)]
pub struct StaticCredentials {
    username: String,
    password: String,
}

impl StaticCredentials {
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            password: password.into(),
        }
    }
}

impl CredentialVerifier for StaticCredentials {
    fn verify(&self, username: &str, password: &str) -> bool {
        username == self.username && password == self.password
    }
}

/// Paths the gate lets through without credentials.
///
/// A path bypasses the gate when, after its leading `/`, it starts with one
/// of the configured prefixes (framework assets, the favicon).
#[derive(Debug, Clone, Default)]
pub struct PathMatcher {
    bypass_prefixes: Vec<String>,
}

impl PathMatcher {
    pub fn new<I, S>(prefixes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            bypass_prefixes: prefixes
                .into_iter()
                .map(Into::into)
                .filter(|p: &String| !p.is_empty())
                .collect(),
        }
    }

    /// Whether `path` must pass the credential check.
    pub fn is_protected(&self, path: &str) -> bool {
        let path = path.split(['?', '#']).next().unwrap_or_default();
        let rest = path.strip_prefix('/').unwrap_or(path);
        !self
            .bypass_prefixes
            .iter()
            .any(|prefix| rest.starts_with(prefix.as_str()))
    }
}

/// The 401 response the gate answers with.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Challenge {
    pub status: u16,
    pub www_authenticate: String,
    pub body: &'static str,
}

impl Challenge {
    pub fn for_realm(realm: &str) -> Self {
        Self {
            status: CHALLENGE_STATUS,
            www_authenticate: format!("Basic realm=\"{}\"", realm),
            body: CHALLENGE_BODY,
        }
    }
}

/// Outcome of running a request through the gate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GateDecision {
    /// Let the request continue; the gate produces no response.
    Proceed,
    /// Answer with a 401 challenge.
    Challenge(Challenge),
}

impl GateDecision {
    pub fn is_proceed(&self) -> bool {
        matches!(self, GateDecision::Proceed)
    }
}

/// Basic-Auth middleware.
pub struct BasicAuthGate<V> {
    verifier: V,
    matcher: PathMatcher,
    challenge: Challenge,
}

impl BasicAuthGate<StaticCredentials> {
    pub fn from_config(config: &AuthConfig) -> Self {
        Self::new(
            StaticCredentials::new(&config.username, &config.password),
            PathMatcher::new(config.bypass_prefixes.iter().cloned()),
            &config.realm,
        )
    }
}

impl<V: CredentialVerifier> BasicAuthGate<V> {
    pub fn new(verifier: V, matcher: PathMatcher, realm: &str) -> Self {
        Self {
            verifier,
            matcher,
            challenge: Challenge::for_realm(realm),
        }
    }

    /// Check one request given its path and raw `Authorization` header.
    pub fn check(&self, path: &str, authorization: Option<&str>) -> GateDecision {
        if !self.matcher.is_protected(path) {
            return GateDecision::Proceed;
        }

        let accepted = authorization
            .and_then(parse_basic)
            .is_some_and(|(user, pass)| self.verifier.verify(&user, &pass));

        if accepted {
            GateDecision::Proceed
        } else {
            GateDecision::Challenge(self.challenge.clone())
        }
    }
}

/// Decode a `Basic <base64(user:pass)>` header value.
///
/// The scheme must be exactly `Basic`. The password is everything after the
/// first colon, so passwords may themselves contain colons.
pub fn parse_basic(header: &str) -> Option<(String, String)> {
    let (scheme, encoded) = header.trim().split_once(' ')?;
    if scheme != "Basic" {
        return None;
    }
    let decoded = STANDARD.decode(encoded.trim()).ok()?;
    let decoded = String::from_utf8(decoded).ok()?;
    let (user, pass) = decoded.split_once(':')?;
    Some((user.to_string(), pass.to_string()))
}

/// Encode credentials as a `Basic` header value.
pub fn basic_header(username: &str, password: &str) -> String {
    format!("Basic {}", STANDARD.encode(format!("{}:{}", username, password)))
}
