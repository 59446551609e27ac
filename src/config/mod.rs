//! Configuration Management
//!
//! Loads the site runtime configuration from TOML files.
//! Configuration includes:
//! - Loading sequencer timings and progress tuning
//! - Auth gate credentials, realm and allow-listed paths
//! - Edge server bind address and static site root

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

use crate::errors::ConfigError;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub loading: LoadingConfig,

    #[serde(default)]
    pub auth: AuthConfig,

    #[serde(default)]
    pub server: ServerConfig,
}

/// Loading screen timings and progress tuning
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct LoadingConfig {
    /// Period of the simulated progress tick
    #[serde(default = "default_tick_interval_ms")]
    pub tick_interval_ms: u64,
    /// Smallest simulated increment per tick
    #[serde(default = "default_increment_min")]
    pub increment_min: f64,
    /// Random span added on top of `increment_min`
    #[serde(default = "default_increment_span")]
    pub increment_span: f64,
    /// Ceiling for the simulated target while the page is still loading
    #[serde(default = "default_preload_cap")]
    pub preload_cap: f64,
    /// Fraction of the remaining gap closed per frame
    #[serde(default = "default_smoothing")]
    pub smoothing: f64,
    /// Gap under which the displayed value snaps to the target
    #[serde(default = "default_snap_threshold")]
    pub snap_threshold: f64,
    /// Animation frame period
    #[serde(default = "default_frame_interval_ms")]
    pub frame_interval_ms: u64,
    /// Pause between reaching 100% and starting the exit transition
    #[serde(default = "default_dismiss_delay_ms")]
    pub dismiss_delay_ms: u64,
    /// Completion deadline if the exit transition never reports its end
    #[serde(default = "default_fallback_timeout_ms")]
    pub fallback_timeout_ms: u64,
    /// Force the load signal after this long (unset = wait forever)
    #[serde(default)]
    pub max_wait_ms: Option<u64>,
}

impl Default for LoadingConfig {
    fn default() -> Self {
        Self {
            tick_interval_ms: default_tick_interval_ms(),
            increment_min: default_increment_min(),
            increment_span: default_increment_span(),
            preload_cap: default_preload_cap(),
            smoothing: default_smoothing(),
            snap_threshold: default_snap_threshold(),
            frame_interval_ms: default_frame_interval_ms(),
            dismiss_delay_ms: default_dismiss_delay_ms(),
            fallback_timeout_ms: default_fallback_timeout_ms(),
            max_wait_ms: None,
        }
    }
}

impl LoadingConfig {
    pub fn tick_interval(&self) -> Duration {
        Duration::from_millis(self.tick_interval_ms)
    }

    pub fn frame_interval(&self) -> Duration {
        Duration::from_millis(self.frame_interval_ms)
    }

    pub fn dismiss_delay(&self) -> Duration {
        Duration::from_millis(self.dismiss_delay_ms)
    }

    pub fn fallback_timeout(&self) -> Duration {
        Duration::from_millis(self.fallback_timeout_ms)
    }

    pub fn max_wait(&self) -> Option<Duration> {
        self.max_wait_ms.map(Duration::from_millis)
    }

    pub fn validate(&self) -> std::result::Result<(), ConfigError> {
        if self.tick_interval_ms == 0 {
            return Err(invalid("loading.tick_interval_ms", "must be greater than 0"));
        }
        if self.frame_interval_ms == 0 {
            return Err(invalid("loading.frame_interval_ms", "must be greater than 0"));
        }
        if !(self.increment_min >= 0.0 && self.increment_span >= 0.0) {
            return Err(invalid(
                "loading.increment_min",
                "increments must be non-negative",
            ));
        }
        if !(0.0..=99.0).contains(&self.preload_cap) {
            return Err(invalid("loading.preload_cap", "must be within 0..=99"));
        }
        if !(self.smoothing > 0.0 && self.smoothing <= 1.0) {
            return Err(invalid("loading.smoothing", "must be within (0, 1]"));
        }
        if !(self.snap_threshold > 0.0 && self.snap_threshold <= 0.5) {
            return Err(invalid("loading.snap_threshold", "must be within (0, 0.5]"));
        }
        if self.max_wait_ms == Some(0) {
            return Err(invalid("loading.max_wait_ms", "must be greater than 0 when set"));
        }
        Ok(())
    }
}

fn default_tick_interval_ms() -> u64 {
    150
}
fn default_increment_min() -> f64 {
    3.0
}
fn default_increment_span() -> f64 {
    12.0
}
fn default_preload_cap() -> f64 {
    90.0
}
fn default_smoothing() -> f64 {
    0.08
}
fn default_snap_threshold() -> f64 {
    0.5
}
fn default_frame_interval_ms() -> u64 {
    16
}
fn default_dismiss_delay_ms() -> u64 {
    300
}
fn default_fallback_timeout_ms() -> u64 {
    1200
}

/// Basic-Auth gate settings
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AuthConfig {
    #[serde(default = "default_username")]
    pub username: String,
    #[serde(default = "default_password")]
    pub password: String,
    #[serde(default = "default_realm")]
    pub realm: String,
    /// First path segments that bypass the gate
    #[serde(default = "default_bypass_prefixes")]
    pub bypass_prefixes: Vec<String>,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            username: default_username(),
            password: default_password(),
            realm: default_realm(),
            bypass_prefixes: default_bypass_prefixes(),
        }
    }
}

impl AuthConfig {
    pub fn validate(&self) -> std::result::Result<(), ConfigError> {
        if self.username.is_empty() {
            return Err(invalid("auth.username", "must not be empty"));
        }
        if self.username.contains(':') {
            return Err(invalid("auth.username", "must not contain ':'"));
        }
        if self.password.is_empty() {
            return Err(invalid("auth.password", "must not be empty"));
        }
        if self.realm.contains('"') {
            return Err(invalid("auth.realm", "must not contain '\"'"));
        }
        Ok(())
    }
}

fn default_username() -> String {
    "skyscope".to_string()
}
fn default_password() -> String {
    "drone2025".to_string()
}
fn default_realm() -> String {
    "SkyScope Drone Services".to_string()
}
fn default_bypass_prefixes() -> Vec<String> {
    vec!["_next".to_string(), "favicon.ico".to_string()]
}

/// Edge server settings
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ServerConfig {
    #[serde(default = "default_bind")]
    pub bind: String,
    #[serde(default = "default_site_root")]
    pub site_root: PathBuf,
    /// Largest request head accepted; larger heads get 431
    #[serde(default = "default_max_header_bytes")]
    pub max_header_bytes: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: default_bind(),
            site_root: default_site_root(),
            max_header_bytes: default_max_header_bytes(),
        }
    }
}

fn default_bind() -> String {
    "127.0.0.1:8080".to_string()
}
fn default_site_root() -> PathBuf {
    PathBuf::from("public")
}
fn default_max_header_bytes() -> usize {
    16 * 1024
}

fn invalid(field: &str, reason: &str) -> ConfigError {
    ConfigError::Invalid {
        field: field.to_string(),
        reason: reason.to_string(),
    }
}

impl Config {
    pub fn load(path: Option<&str>) -> Result<Self> {
        let mut config = match path {
            Some(p) => {
                let content =
                    std::fs::read_to_string(p).map_err(|e| ConfigError::Read {
                        path: PathBuf::from(p),
                        message: e.to_string(),
                    })?;
                Self::from_toml(&content)?
            }
            None => {
                let home_config = dirs::config_dir().map(|d| d.join("skyscope/config.toml"));

                let mut default_paths = vec![PathBuf::from("skyscope.toml")];
                if let Some(hc) = home_config {
                    default_paths.push(hc);
                }

                let mut loaded = None;
                for p in &default_paths {
                    if let Ok(content) = std::fs::read_to_string(p) {
                        tracing::debug!(path = %p.display(), "Loaded config file");
                        loaded = Some(Self::from_toml(&content)?);
                        break;
                    }
                }
                loaded.unwrap_or_else(|| {
                    tracing::debug!("No config file found, using defaults");
                    Self::default()
                })
            }
        };

        config.apply_env_overrides();
        config.validate()?;
        Ok(config)
    }

    pub fn from_toml(content: &str) -> Result<Self> {
        toml::from_str(content)
            .map_err(|e| ConfigError::Parse(e.to_string()))
            .context("Failed to parse config")
    }

    /// Override with `SKYSCOPE_*` environment variables
    pub fn apply_env_overrides(&mut self) {
        if let Ok(username) = std::env::var("SKYSCOPE_USERNAME") {
            self.auth.username = username;
        }
        if let Ok(password) = std::env::var("SKYSCOPE_PASSWORD") {
            self.auth.password = password;
        }
        if let Ok(realm) = std::env::var("SKYSCOPE_REALM") {
            self.auth.realm = realm;
        }
        if let Ok(bind) = std::env::var("SKYSCOPE_BIND") {
            self.server.bind = bind;
        }
        if let Ok(root) = std::env::var("SKYSCOPE_SITE_ROOT") {
            self.server.site_root = PathBuf::from(root);
        }
        if let Ok(raw) = std::env::var("SKYSCOPE_MAX_WAIT_MS") {
            match raw.parse::<u64>() {
                Ok(ms) => self.loading.max_wait_ms = Some(ms),
                Err(_) => tracing::warn!(value = %raw, "Ignoring malformed SKYSCOPE_MAX_WAIT_MS"),
            }
        }
    }

    pub fn validate(&self) -> std::result::Result<(), ConfigError> {
        self.loading.validate()?;
        self.auth.validate()?;
        if self.server.bind.trim().is_empty() {
            return Err(invalid("server.bind", "must not be empty"));
        }
        Ok(())
    }
}
