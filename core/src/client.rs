//! Stateless HTTP request builder and response parser for the AI School API.
//!
//! # Design
//! `ApiClient` holds only the API root and carries no mutable state between
//! calls. Each operation is split into a `build_*` method that produces an
//! `HttpRequest` and a `parse_*` method that consumes an `HttpResponse`.
//! Authenticated builders take the bearer token as an argument: the client
//! never reads or writes the session, so it stays a pure translator.

use serde::Serialize;
use tracing::debug;
use uuid::Uuid;

use crate::envelope::{failure_message, Envelope};
use crate::error::ApiError;
use crate::http::{HttpMethod, HttpRequest, HttpResponse};
use crate::types::{
    AuthGrant, ChildProfile, Credentials, Deletion, HealthStatus, ProfileList,
    RegistrationRequest, UserInfo,
};

/// Synchronous, stateless client for the AI School REST API.
#[derive(Debug, Clone)]
pub struct ApiClient {
    api_root: String,
}

impl ApiClient {
    /// `base_url` is the server origin, with or without a trailing `/api`.
    pub fn new(base_url: &str) -> Self {
        let trimmed = base_url.trim_end_matches('/');
        let api_root = if trimmed.ends_with("/api") {
            trimmed.to_string()
        } else {
            format!("{trimmed}/api")
        };
        Self { api_root }
    }

    pub fn api_root(&self) -> &str {
        &self.api_root
    }

    // -- builders ---------------------------------------------------------

    pub fn build_health_check(&self) -> HttpRequest {
        self.request(HttpMethod::Get, "health", Vec::new(), None)
    }

    pub fn build_register(&self, input: &RegistrationRequest) -> Result<HttpRequest, ApiError> {
        if let Some(field) = input.missing_field() {
            return Err(ApiError::local_validation(format!("{field} is required")));
        }
        let body = json_body(input)?;
        Ok(self.request(HttpMethod::Post, "auth/register", Vec::new(), Some(body)))
    }

    pub fn build_login(&self, input: &Credentials) -> Result<HttpRequest, ApiError> {
        if let Some(field) = input.missing_field() {
            return Err(ApiError::local_validation(format!("{field} is required")));
        }
        let body = json_body(input)?;
        Ok(self.request(HttpMethod::Post, "auth/login", Vec::new(), Some(body)))
    }

    pub fn build_current_user(&self, token: &str) -> Result<HttpRequest, ApiError> {
        let auth = bearer(token)?;
        Ok(self.request(HttpMethod::Get, "auth/user", auth, None))
    }

    pub fn build_logout(&self, token: &str) -> Result<HttpRequest, ApiError> {
        let auth = bearer(token)?;
        Ok(self.request(HttpMethod::Post, "auth/logout", auth, None))
    }

    pub fn build_list_profiles(&self, token: &str) -> Result<HttpRequest, ApiError> {
        let auth = bearer(token)?;
        Ok(self.request(HttpMethod::Get, "profiles", auth, None))
    }

    /// Any `id` on `input` is dropped; the server assigns it.
    pub fn build_create_profile(
        &self,
        token: &str,
        input: &ChildProfile,
    ) -> Result<HttpRequest, ApiError> {
        let auth = bearer(token)?;
        let body = if input.id.is_some() {
            json_body(&ChildProfile {
                id: None,
                ..input.clone()
            })?
        } else {
            json_body(input)?
        };
        Ok(self.request(HttpMethod::Post, "profiles", auth, Some(body)))
    }

    pub fn build_get_profile(&self, token: &str, id: Uuid) -> Result<HttpRequest, ApiError> {
        let auth = bearer(token)?;
        Ok(self.request(HttpMethod::Get, &format!("profiles/{id}"), auth, None))
    }

    pub fn build_update_profile(
        &self,
        token: &str,
        id: Uuid,
        input: &ChildProfile,
    ) -> Result<HttpRequest, ApiError> {
        let auth = bearer(token)?;
        let body = json_body(input)?;
        Ok(self.request(HttpMethod::Put, &format!("profiles/{id}"), auth, Some(body)))
    }

    pub fn build_delete_profile(&self, token: &str, id: Uuid) -> Result<HttpRequest, ApiError> {
        let auth = bearer(token)?;
        Ok(self.request(HttpMethod::Delete, &format!("profiles/{id}"), auth, None))
    }

    // -- parsers ----------------------------------------------------------

    pub fn parse_health_check(&self, response: HttpResponse) -> Result<HealthStatus, ApiError> {
        let status = response.status;
        success_envelope(&response)?.into_health(status)
    }

    pub fn parse_register(&self, response: HttpResponse) -> Result<AuthGrant, ApiError> {
        let status = response.status;
        success_envelope(&response)?.into_auth_grant(status)
    }

    pub fn parse_login(&self, response: HttpResponse) -> Result<AuthGrant, ApiError> {
        let status = response.status;
        success_envelope(&response)?.into_auth_grant(status)
    }

    pub fn parse_current_user(&self, response: HttpResponse) -> Result<UserInfo, ApiError> {
        let status = response.status;
        success_envelope(&response)?.into_user(status)
    }

    /// Returns the server's message, if any. Logout carries no other payload.
    pub fn parse_logout(&self, response: HttpResponse) -> Result<Option<String>, ApiError> {
        Ok(success_envelope(&response)?.message)
    }

    pub fn parse_list_profiles(&self, response: HttpResponse) -> Result<ProfileList, ApiError> {
        Ok(success_envelope(&response)?.into_profile_list())
    }

    /// The created profile must come back with its server-assigned id.
    pub fn parse_create_profile(&self, response: HttpResponse) -> Result<ChildProfile, ApiError> {
        let status = response.status;
        let profile = success_envelope(&response)?.into_profile(status)?;
        if profile.id.is_none() {
            return Err(ApiError::malformed(status, "created profile has no id"));
        }
        Ok(profile)
    }

    pub fn parse_get_profile(&self, response: HttpResponse) -> Result<ChildProfile, ApiError> {
        let status = response.status;
        success_envelope(&response)?.into_profile(status)
    }

    pub fn parse_update_profile(&self, response: HttpResponse) -> Result<ChildProfile, ApiError> {
        let status = response.status;
        success_envelope(&response)?.into_profile(status)
    }

    pub fn parse_delete_profile(&self, response: HttpResponse) -> Result<Deletion, ApiError> {
        Ok(success_envelope(&response)?.into_deletion())
    }

    fn request(
        &self,
        method: HttpMethod,
        endpoint: &str,
        mut headers: Vec<(String, String)>,
        body: Option<String>,
    ) -> HttpRequest {
        let path = format!("{}/{endpoint}", self.api_root);
        debug!(%method, %path, "built request");
        if body.is_some() {
            headers.push(("content-type".to_string(), "application/json".to_string()));
        }
        HttpRequest {
            method,
            path,
            headers,
            body,
        }
    }
}

fn bearer(token: &str) -> Result<Vec<(String, String)>, ApiError> {
    let token = token.trim();
    if token.is_empty() {
        return Err(ApiError::Unauthorized("no session token".to_string()));
    }
    Ok(vec![("authorization".to_string(), format!("Bearer {token}"))])
}

fn json_body<T: Serialize>(input: &T) -> Result<String, ApiError> {
    serde_json::to_string(input).map_err(|e| ApiError::Serialization(e.to_string()))
}

/// Map a non-2xx status to its `ApiError`, otherwise decode the envelope.
fn success_envelope(response: &HttpResponse) -> Result<Envelope, ApiError> {
    if !response.is_success() {
        let message = failure_message(response.status, &response.body);
        return Err(ApiError::from_status(response.status, message));
    }
    Envelope::decode(response.status, &response.body)
}
