use std::path::PathBuf;
use thiserror::Error;

/// The central error type for the SkyScope site runtime.
///
/// Missing page elements and failed credential checks are deliberately not
/// represented here: the former are skipped and the latter become a 401.
#[derive(Error, Debug)]
pub enum SiteError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Server error: {0}")]
    Server(#[from] ServerError),

    #[error("Access denied for {path}")]
    AccessDenied { path: String },

    #[error("Internal error: {0}")]
    Internal(String),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read {path}: {message}")]
    Read { path: PathBuf, message: String },

    #[error("Failed to parse config: {0}")]
    Parse(String),

    #[error("Invalid value for {field}: {reason}")]
    Invalid { field: String, reason: String },
}

#[derive(Error, Debug)]
pub enum ServerError {
    #[error("Failed to bind {addr}: {message}")]
    Bind { addr: String, message: String },

    #[error("Site root {path} is not a directory")]
    SiteRoot { path: PathBuf },

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, SiteError>;

pub const EXIT_SUCCESS: u8 = 0;
pub const EXIT_ERROR: u8 = 1;
pub const EXIT_CONFIG_ERROR: u8 = 2;
pub const EXIT_SERVER_ERROR: u8 = 3;
pub const EXIT_AUTH_DENIED: u8 = 4;

/// Determine the appropriate process exit code for an error.
pub fn get_exit_code(e: &anyhow::Error) -> u8 {
    if let Some(site_err) = e.downcast_ref::<SiteError>() {
        return match site_err {
            SiteError::Config(_) => EXIT_CONFIG_ERROR,
            SiteError::Server(_) => EXIT_SERVER_ERROR,
            SiteError::AccessDenied { .. } => EXIT_AUTH_DENIED,
            _ => EXIT_ERROR,
        };
    }

    // Direct enum unwraps fallback
    if e.downcast_ref::<ConfigError>().is_some() {
        return EXIT_CONFIG_ERROR;
    }
    if e.downcast_ref::<ServerError>().is_some() {
        return EXIT_SERVER_ERROR;
    }

    // Errors wrapped with .context() keep the typed cause in the chain
    for cause in e.chain() {
        if cause.downcast_ref::<ConfigError>().is_some() {
            return EXIT_CONFIG_ERROR;
        }
        if cause.downcast_ref::<ServerError>().is_some() {
            return EXIT_SERVER_ERROR;
        }
    }

    EXIT_ERROR
}
