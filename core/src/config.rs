//! Client configuration: where the API lives, how long to wait for it, and
//! where the session token is kept.

use std::env;
use std::path::PathBuf;
use std::time::Duration;

use thiserror::Error;

/// Emulator loopback to the development server.
pub const DEFAULT_API_BASE_URL: &str = "http://10.0.2.2:5000";
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;
pub const DEFAULT_SESSION_NAMESPACE: &str = "AiSchoolPrefs";

pub const API_URL_ENV_VAR: &str = "AISCHOOL_API_URL";
pub const TIMEOUT_ENV_VAR: &str = "AISCHOOL_TIMEOUT_SECS";
pub const SESSION_DIR_ENV_VAR: &str = "AISCHOOL_SESSION_DIR";
pub const SESSION_NAMESPACE_ENV_VAR: &str = "AISCHOOL_SESSION_NAMESPACE";

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("{var} must be a positive number of seconds, got {value:?}")]
    InvalidTimeout { var: &'static str, value: String },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    pub base_url: String,
    pub connect_timeout: Duration,
    pub read_timeout: Duration,
    pub write_timeout: Duration,
    pub session_dir: PathBuf,
    pub session_namespace: String,
}

impl Default for ClientConfig {
    fn default() -> Self {
        let timeout = Duration::from_secs(DEFAULT_TIMEOUT_SECS);
        Self {
            base_url: DEFAULT_API_BASE_URL.to_string(),
            connect_timeout: timeout,
            read_timeout: timeout,
            write_timeout: timeout,
            session_dir: PathBuf::from("."),
            session_namespace: DEFAULT_SESSION_NAMESPACE.to_string(),
        }
    }
}

impl ClientConfig {
    /// Defaults overlaid with `AISCHOOL_*` environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let mut config = Self::default();
        if let Some(url) = lookup(API_URL_ENV_VAR) {
            config.base_url = url;
        }
        if let Some(raw) = lookup(TIMEOUT_ENV_VAR) {
            let secs = raw
                .trim()
                .parse::<u64>()
                .ok()
                .filter(|secs| *secs > 0)
                .ok_or_else(|| ConfigError::InvalidTimeout {
                    var: TIMEOUT_ENV_VAR,
                    value: raw.clone(),
                })?;
            config = config.with_timeout(Duration::from_secs(secs));
        }
        if let Some(dir) = lookup(SESSION_DIR_ENV_VAR) {
            config.session_dir = PathBuf::from(dir);
        }
        if let Some(namespace) = lookup(SESSION_NAMESPACE_ENV_VAR) {
            config.session_namespace = namespace;
        }
        Ok(config)
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    /// Use the same value for connect, read and write.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout = timeout;
        self.read_timeout = timeout;
        self.write_timeout = timeout;
        self
    }

    pub fn with_session_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.session_dir = dir.into();
        self
    }
}
