//! Unit tests for the config module
//!
//! Tests cover:
//! - Loading from an explicit file
//! - Parse and validation failures and their exit codes
//! - TOML round trip of the full config

use skyscope::config::{AuthConfig, Config, LoadingConfig};
use skyscope::errors::{get_exit_code, ConfigError, EXIT_CONFIG_ERROR};
use std::io::Write;
use std::time::Duration;
use tempfile::NamedTempFile;

fn write_config(content: &str) -> NamedTempFile {
    let mut file = NamedTempFile::new().unwrap();
    file.write_all(content.as_bytes()).unwrap();
    file
}

mod file_loading_tests {
    use super::*;

    #[test]
    fn test_load_explicit_file() {
        let file = write_config(
            r#"
            [loading]
            tick_interval_ms = 100
            max_wait_ms = 8000

            [auth]
            realm = "Staging"
            bypass_prefixes = ["_next", "favicon.ico", "robots.txt"]
            "#,
        );
        let config = Config::load(file.path().to_str()).unwrap();
        assert_eq!(config.loading.tick_interval(), Duration::from_millis(100));
        assert_eq!(config.loading.max_wait(), Some(Duration::from_millis(8000)));
        assert_eq!(config.auth.bypass_prefixes.len(), 3);
        assert_eq!(config.loading.preload_cap, 90.0);
    }

    #[test]
    fn test_missing_file_is_config_error() {
        let err = Config::load(Some("/definitely/not/here/skyscope.toml")).unwrap_err();
        assert!(matches!(
            err.downcast_ref::<ConfigError>(),
            Some(ConfigError::Read { .. })
        ));
        assert_eq!(get_exit_code(&err), EXIT_CONFIG_ERROR);
    }

    #[test]
    fn test_malformed_toml_is_config_error() {
        let file = write_config("[loading\ntick_interval_ms = ");
        let err = Config::load(file.path().to_str()).unwrap_err();
        assert_eq!(get_exit_code(&err), EXIT_CONFIG_ERROR);
    }

    #[test]
    fn test_invalid_values_rejected() {
        let file = write_config("[loading]\npreload_cap = 100.0\n");
        let err = Config::load(file.path().to_str()).unwrap_err();
        assert_eq!(get_exit_code(&err), EXIT_CONFIG_ERROR);
        assert!(format!("{:#}", err).contains("preload_cap"));
    }
}

mod validation_tests {
    use super::*;

    #[test]
    fn test_loading_defaults() {
        let loading = LoadingConfig::default();
        assert_eq!(loading.tick_interval_ms, 150);
        assert_eq!(loading.increment_min, 3.0);
        assert_eq!(loading.increment_span, 12.0);
        assert_eq!(loading.smoothing, 0.08);
        assert_eq!(loading.snap_threshold, 0.5);
        assert_eq!(loading.dismiss_delay(), Duration::from_millis(300));
        assert_eq!(loading.fallback_timeout(), Duration::from_millis(1200));
        assert!(loading.validate().is_ok());
    }

    #[test]
    fn test_loading_rejects_zero_intervals() {
        let loading = LoadingConfig {
            frame_interval_ms: 0,
            ..LoadingConfig::default()
        };
        assert!(loading.validate().is_err());

        let loading = LoadingConfig {
            max_wait_ms: Some(0),
            ..LoadingConfig::default()
        };
        assert!(loading.validate().is_err());
    }

    #[test]
    fn test_auth_rejects_unusable_credentials() {
        for auth in [
            AuthConfig {
                username: String::new(),
                ..AuthConfig::default()
            },
            AuthConfig {
                username: "a:b".into(),
                ..AuthConfig::default()
            },
            AuthConfig {
                password: String::new(),
                ..AuthConfig::default()
            },
            AuthConfig {
                realm: "bad\"realm".into(),
                ..AuthConfig::default()
            },
        ] {
            assert!(auth.validate().is_err(), "{:?}", auth);
        }
    }

    #[test]
    fn test_toml_round_trip() {
        let mut config = Config::default();
        config.loading.max_wait_ms = Some(5000);
        config.auth.realm = "Preview".into();
        let rendered = toml::to_string(&config).unwrap();
        let parsed = Config::from_toml(&rendered).unwrap();
        assert_eq!(parsed.loading, config.loading);
        assert_eq!(parsed.auth, config.auth);
        assert_eq!(parsed.server, config.server);
    }
}
