//! Session-aware facade over `Api`.
//!
//! # Design
//! The API client never touches the session; this type is the one caller
//! that does. It owns every token lifecycle decision:
//! - login and registration success store the token,
//! - logout clears the store whatever the server says,
//! - an `Unauthorized` answer to any authenticated call clears the store,
//! - an authenticated call with no stored token fails as `Unauthorized`
//!   without touching the network.

use thiserror::Error;
use tracing::{info, warn};
use uuid::Uuid;

use crate::api::Api;
use crate::error::ApiError;
use crate::session::{SessionError, SessionStore};
use crate::transport::Transport;
use crate::types::{
    AuthGrant, ChildProfile, Credentials, Deletion, HealthStatus, ProfileList,
    RegistrationRequest, UserInfo,
};

#[derive(Debug, Error)]
pub enum AccountError {
    #[error(transparent)]
    Api(#[from] ApiError),

    #[error(transparent)]
    Session(#[from] SessionError),
}

impl AccountError {
    pub fn is_unauthorized(&self) -> bool {
        matches!(self, AccountError::Api(e) if e.is_unauthorized())
    }
}

pub struct Account<T, S> {
    api: Api<T>,
    store: S,
}

impl<T: Transport, S: SessionStore> Account<T, S> {
    pub fn new(api: Api<T>, store: S) -> Self {
        Self { api, store }
    }

    pub fn api(&self) -> &Api<T> {
        &self.api
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Whether a token survived from a previous run.
    pub fn restore(&self) -> Result<bool, AccountError> {
        Ok(self.store.is_logged_in()?)
    }

    pub fn health_check(&self) -> Result<HealthStatus, AccountError> {
        Ok(self.api.health_check()?)
    }

    pub fn register(&self, input: &RegistrationRequest) -> Result<AuthGrant, AccountError> {
        let grant = self.api.register(input)?;
        self.store.save(&grant.token)?;
        info!("registered and signed in");
        Ok(grant)
    }

    pub fn login(&self, input: &Credentials) -> Result<AuthGrant, AccountError> {
        let grant = self.api.login(input)?;
        self.store.save(&grant.token)?;
        info!("signed in");
        Ok(grant)
    }

    /// Best-effort server logout; the local session is cleared regardless.
    /// The returned value is the server's outcome, for display only. An
    /// unreadable store skips the server call.
    pub fn logout(&self) -> Result<Result<Option<String>, ApiError>, AccountError> {
        let outcome = match self.store.load() {
            Ok(Some(token)) => self.api.logout(&token),
            Ok(None) => Ok(None),
            Err(e) => {
                warn!(error = %e, "session unreadable; skipping server logout");
                Ok(None)
            }
        };
        if let Err(e) = &outcome {
            warn!(error = %e, "server logout failed; clearing local session anyway");
        }
        self.store.clear()?;
        info!("signed out");
        Ok(outcome)
    }

    pub fn current_user(&self) -> Result<UserInfo, AccountError> {
        self.authorized(|api, token| api.current_user(token))
    }

    pub fn list_profiles(&self) -> Result<ProfileList, AccountError> {
        self.authorized(|api, token| api.list_profiles(token))
    }

    pub fn create_profile(&self, input: &ChildProfile) -> Result<ChildProfile, AccountError> {
        self.authorized(|api, token| api.create_profile(token, input))
    }

    pub fn get_profile(&self, id: Uuid) -> Result<ChildProfile, AccountError> {
        self.authorized(|api, token| api.get_profile(token, id))
    }

    pub fn update_profile(&self, id: Uuid, input: &ChildProfile) -> Result<ChildProfile, AccountError> {
        self.authorized(|api, token| api.update_profile(token, id, input))
    }

    pub fn delete_profile(&self, id: Uuid) -> Result<Deletion, AccountError> {
        self.authorized(|api, token| api.delete_profile(token, id))
    }

    /// Run an authenticated call with the stored token and handle `Unauthorized`.
    fn authorized<R>(
        &self,
        call: impl FnOnce(&Api<T>, &str) -> Result<R, ApiError>,
    ) -> Result<R, AccountError> {
        let Some(token) = self.store.load()? else {
            return Err(ApiError::Unauthorized("not signed in".to_string()).into());
        };
        match call(&self.api, &token) {
            Err(e) if e.is_unauthorized() => {
                warn!(error = %e, "session rejected by server; signing out");
                if let Err(clear_err) = self.store.clear() {
                    warn!(error = %clear_err, "failed to clear rejected session");
                }
                Err(e.into())
            }
            other => Ok(other?),
        }
    }
}
