//! Local storage for the single access token.
//!
//! # Design
//! A session is one optional string. Presence means "logged in"; there is no
//! client-side expiry. Stores serialize access behind an `RwLock` so a
//! `load` never observes a half-applied `save` or `clear`. The last writer
//! wins.
//!
//! `FileSessionStore` mirrors a mobile settings namespace: one JSON object
//! per namespace, the token under `access_token`. Unrelated keys in the
//! same namespace are left untouched.

use std::collections::BTreeMap;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::{PoisonError, RwLock};

use serde_json::Value;
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::config::ClientConfig;

pub const TOKEN_KEY: &str = "access_token";

#[derive(Debug, Error)]
pub enum SessionError {
    #[error("session storage I/O failed at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("session storage at {path} is corrupt: {reason}")]
    Corrupt { path: PathBuf, reason: String },
}

pub trait SessionStore: Send + Sync {
    fn load(&self) -> Result<Option<String>, SessionError>;

    /// Replaces any stored token.
    fn save(&self, token: &str) -> Result<(), SessionError>;

    /// Removes the token. A no-op on an empty store.
    fn clear(&self) -> Result<(), SessionError>;

    fn is_logged_in(&self) -> Result<bool, SessionError> {
        Ok(self.load()?.is_some())
    }
}

/// Process-local store, for tests and hosts that persist the token themselves.
#[derive(Debug, Default)]
pub struct MemorySessionStore {
    token: RwLock<Option<String>>,
}

impl MemorySessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_token(token: impl Into<String>) -> Self {
        Self {
            token: RwLock::new(Some(token.into())),
        }
    }
}

impl SessionStore for MemorySessionStore {
    fn load(&self) -> Result<Option<String>, SessionError> {
        Ok(self
            .token
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone())
    }

    fn save(&self, token: &str) -> Result<(), SessionError> {
        *self.token.write().unwrap_or_else(PoisonError::into_inner) = Some(token.to_string());
        Ok(())
    }

    fn clear(&self) -> Result<(), SessionError> {
        *self.token.write().unwrap_or_else(PoisonError::into_inner) = None;
        Ok(())
    }
}

/// Settings-file store: `<dir>/<namespace>.json`.
#[derive(Debug)]
pub struct FileSessionStore {
    path: PathBuf,
    lock: RwLock<()>,
}

type Settings = BTreeMap<String, Value>;

impl FileSessionStore {
    pub fn new(dir: impl AsRef<Path>, namespace: &str) -> Self {
        Self {
            path: dir.as_ref().join(format!("{namespace}.json")),
            lock: RwLock::new(()),
        }
    }

    pub fn from_config(config: &ClientConfig) -> Self {
        Self::new(&config.session_dir, &config.session_namespace)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn read_settings(&self) -> Result<Option<Settings>, SessionError> {
        let raw = match fs::read_to_string(&self.path) {
            Ok(raw) => raw,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(None),
            Err(source) => {
                return Err(SessionError::Io {
                    path: self.path.clone(),
                    source,
                })
            }
        };
        serde_json::from_str(&raw)
            .map(Some)
            .map_err(|e| SessionError::Corrupt {
                path: self.path.clone(),
                reason: e.to_string(),
            })
    }

    /// Write to a sibling temp file, then rename over the target.
    fn write_settings(&self, settings: &Settings) -> Result<(), SessionError> {
        let io_err = |source| SessionError::Io {
            path: self.path.clone(),
            source,
        };
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent).map_err(io_err)?;
        }
        let raw = serde_json::to_string_pretty(settings).map_err(|e| SessionError::Corrupt {
            path: self.path.clone(),
            reason: e.to_string(),
        })?;
        let tmp = self.path.with_extension("json.tmp");
        fs::write(&tmp, raw).map_err(io_err)?;
        fs::rename(&tmp, &self.path).map_err(io_err)
    }

    fn remove_settings(&self) -> Result<(), SessionError> {
        match fs::remove_file(&self.path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
            Err(source) => Err(SessionError::Io {
                path: self.path.clone(),
                source,
            }),
        }
    }
}

impl SessionStore for FileSessionStore {
    fn load(&self) -> Result<Option<String>, SessionError> {
        let _guard = self.lock.read().unwrap_or_else(PoisonError::into_inner);
        let token = self
            .read_settings()?
            .and_then(|mut settings| settings.remove(TOKEN_KEY))
            .and_then(|value| match value {
                Value::String(token) if !token.is_empty() => Some(token),
                _ => None,
            });
        debug!(path = %self.path.display(), present = token.is_some(), "loaded session");
        Ok(token)
    }

    fn save(&self, token: &str) -> Result<(), SessionError> {
        let _guard = self.lock.write().unwrap_or_else(PoisonError::into_inner);
        let mut settings = match self.read_settings() {
            Ok(settings) => settings.unwrap_or_default(),
            Err(SessionError::Corrupt { reason, .. }) => {
                warn!(path = %self.path.display(), %reason, "replacing corrupt session settings");
                Settings::new()
            }
            Err(e) => return Err(e),
        };
        settings.insert(TOKEN_KEY.to_string(), Value::String(token.to_string()));
        self.write_settings(&settings)?;
        info!(path = %self.path.display(), "session saved");
        Ok(())
    }

    /// A corrupt settings file holds no trustworthy token; clearing drops it.
    fn clear(&self) -> Result<(), SessionError> {
        let _guard = self.lock.write().unwrap_or_else(PoisonError::into_inner);
        let mut settings = match self.read_settings() {
            Ok(Some(settings)) => settings,
            Ok(None) => return Ok(()),
            Err(SessionError::Corrupt { reason, .. }) => {
                warn!(path = %self.path.display(), %reason, "discarding corrupt session settings");
                self.remove_settings()?;
                info!(path = %self.path.display(), "session cleared");
                return Ok(());
            }
            Err(e) => return Err(e),
        };
        if settings.remove(TOKEN_KEY).is_none() {
            return Ok(());
        }
        if settings.is_empty() {
            self.remove_settings()?;
        } else {
            self.write_settings(&settings)?;
        }
        info!(path = %self.path.display(), "session cleared");
        Ok(())
    }
}
