//! The JSON wrapper every endpoint answers with.
//!
//! The server fills whichever fields are relevant to the call. `Envelope`
//! is decoded once and then narrowed into the endpoint's result type by the
//! `into_*` methods, each of which fails with `ServerError` when the field
//! the endpoint promises is missing.

use serde::Deserialize;

use crate::error::ApiError;
use crate::types::{AuthGrant, ChildProfile, Deletion, HealthStatus, ProfileList, UserInfo};

#[derive(Debug, Default, Deserialize)]
pub(crate) struct Envelope {
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub token: Option<String>,
    #[serde(default)]
    pub user: Option<UserInfo>,
    #[serde(default)]
    pub profiles: Option<Vec<ChildProfile>>,
    #[serde(default)]
    pub profile: Option<ChildProfile>,
    #[serde(default)]
    pub count: Option<usize>,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub error: Option<String>,
}

impl Envelope {
    /// Decode a success body. An empty body decodes to an empty envelope.
    pub fn decode(status: u16, body: &str) -> Result<Self, ApiError> {
        if body.trim().is_empty() {
            return Ok(Self::default());
        }
        serde_json::from_str(body).map_err(|e| ApiError::malformed(status, e.to_string()))
    }

    pub fn into_health(self, status: u16) -> Result<HealthStatus, ApiError> {
        let message = self
            .message
            .ok_or_else(|| ApiError::malformed(status, "missing message"))?;
        Ok(HealthStatus {
            message,
            status: self.status,
        })
    }

    pub fn into_auth_grant(self, status: u16) -> Result<AuthGrant, ApiError> {
        let token = self
            .token
            .filter(|t| !t.is_empty())
            .ok_or_else(|| ApiError::malformed(status, "no token received"))?;
        Ok(AuthGrant {
            token,
            message: self.message,
            user: self.user,
        })
    }

    pub fn into_user(self, status: u16) -> Result<UserInfo, ApiError> {
        self.user
            .ok_or_else(|| ApiError::malformed(status, "missing user"))
    }

    pub fn into_profile_list(self) -> ProfileList {
        let profiles = self.profiles.unwrap_or_default();
        let count = self.count.unwrap_or(profiles.len());
        ProfileList { profiles, count }
    }

    pub fn into_profile(self, status: u16) -> Result<ChildProfile, ApiError> {
        self.profile
            .ok_or_else(|| ApiError::malformed(status, "missing profile"))
    }

    pub fn into_deletion(self) -> Deletion {
        Deletion {
            status: self.status,
            message: self.message,
        }
    }
}

/// Human-readable reason for a failed response: the body's `error`, then its
/// `message`, then the raw body, then a generic fallback.
pub(crate) fn failure_message(status: u16, body: &str) -> String {
    if let Ok(envelope) = serde_json::from_str::<Envelope>(body) {
        if let Some(text) = envelope.error.or(envelope.message) {
            return text;
        }
    }
    let trimmed = body.trim();
    if trimmed.is_empty() {
        format!("HTTP {status}")
    } else {
        trimmed.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_body_is_empty_envelope() {
        let envelope = Envelope::decode(200, "  ").unwrap();
        assert!(envelope.message.is_none());
        assert!(envelope.profiles.is_none());
    }

    #[test]
    fn non_json_body_is_server_error() {
        let err = Envelope::decode(200, "<html>").unwrap_err();
        assert!(matches!(err, ApiError::ServerError { status: 200, .. }));
    }

    #[test]
    fn auth_grant_requires_non_empty_token() {
        let envelope = Envelope::decode(200, r#"{"message":"Login successful","token":""}"#).unwrap();
        assert!(matches!(
            envelope.into_auth_grant(200),
            Err(ApiError::ServerError { .. })
        ));
    }

    #[test]
    fn absent_profiles_is_empty_list() {
        let list = Envelope::decode(200, r#"{"message":"ok"}"#)
            .unwrap()
            .into_profile_list();
        assert!(list.profiles.is_empty());
        assert_eq!(list.count, 0);
    }

    #[test]
    fn failure_message_prefers_error_field() {
        assert_eq!(
            failure_message(409, r#"{"error":"User with this email already exists"}"#),
            "User with this email already exists"
        );
        assert_eq!(failure_message(401, r#"{"message":"nope"}"#), "nope");
        assert_eq!(failure_message(502, "Bad Gateway"), "Bad Gateway");
        assert_eq!(failure_message(500, ""), "HTTP 500");
    }
}
