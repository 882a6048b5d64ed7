//! Paydesk client configuration.
//!
//! Points the client at the backend API and at the file the session is
//! persisted to. Defaults target a local development backend. Override via
//! environment variables or explicit construction for staging/testing.

use std::path::PathBuf;

use url::Url;

/// Default backend base URL.
pub const DEFAULT_API_URL: &str = "http://localhost:5000/api/";

/// Default request timeout in seconds.
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Configuration for connecting to the Paydesk backend.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PaydeskConfig {
    /// Base URL every endpoint path is resolved against. Always ends in `/`.
    pub api_url: Url,
    /// Request timeout in seconds.
    pub timeout_secs: u64,
    /// Where the signed-in session is persisted between runs.
    pub session_file: PathBuf,
}

impl PaydeskConfig {
    /// Load configuration from environment variables.
    ///
    /// Variables:
    /// - `PAYDESK_API_URL` (default: `http://localhost:5000/api/`)
    /// - `PAYDESK_TIMEOUT_SECS` (default: 30)
    /// - `PAYDESK_SESSION_FILE` (default: `$HOME/.paydesk/session.json`)
    pub fn from_env() -> Result<Self, ConfigError> {
        let raw_url =
            std::env::var("PAYDESK_API_URL").unwrap_or_else(|_| DEFAULT_API_URL.to_string());

        Ok(Self {
            api_url: parse_base_url("PAYDESK_API_URL", &raw_url)?,
            timeout_secs: std::env::var("PAYDESK_TIMEOUT_SECS")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(DEFAULT_TIMEOUT_SECS),
            session_file: std::env::var_os("PAYDESK_SESSION_FILE")
                .map(PathBuf::from)
                .unwrap_or_else(default_session_file),
        })
    }

    /// Create a configuration pointing at a local mock server (for testing).
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::InvalidUrl` if `api_url` cannot be parsed.
    pub fn local_mock(api_url: &str, session_file: impl Into<PathBuf>) -> Result<Self, ConfigError> {
        Ok(Self {
            api_url: parse_base_url("api_url", api_url)?,
            timeout_secs: 5,
            session_file: session_file.into(),
        })
    }
}

/// Parse a base URL and make sure relative paths resolve beneath it.
///
/// `Url::join` replaces the last path segment unless the base ends in `/`,
/// so `http://host/api` becomes `http://host/api/`.
pub(crate) fn parse_base_url(var: &str, raw: &str) -> Result<Url, ConfigError> {
    let mut url =
        Url::parse(raw).map_err(|e| ConfigError::InvalidUrl(var.to_string(), e.to_string()))?;
    if url.cannot_be_a_base() {
        return Err(ConfigError::InvalidUrl(
            var.to_string(),
            "URL cannot be used as a base".to_string(),
        ));
    }
    if !url.path().ends_with('/') {
        let path = format!("{}/", url.path());
        url.set_path(&path);
    }
    Ok(url)
}

fn default_session_file() -> PathBuf {
    match std::env::var_os("HOME") {
        Some(home) => PathBuf::from(home).join(".paydesk").join("session.json"),
        None => PathBuf::from(".paydesk-session.json"),
    }
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("invalid URL for {0}: {1}")]
    InvalidUrl(String, String),
}
