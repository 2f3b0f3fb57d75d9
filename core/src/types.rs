//! Request models and typed results for the AI School API.
//!
//! # Design
//! Wire names are snake_case. Request bodies omit absent optional fields so
//! the server never sees explicit `null`s. Each endpoint gets its own result
//! type rather than one record with every field optional; the raw envelope
//! lives in `envelope` and is narrowed per endpoint.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Login payload. Never persisted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Credentials {
    pub email: String,
    pub password: String,
}

impl Credentials {
    pub fn new(email: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            email: email.into(),
            password: password.into(),
        }
    }

    /// Name of the first blank field, if any.
    pub fn missing_field(&self) -> Option<&'static str> {
        first_blank(&[("email", &self.email), ("password", &self.password)])
    }
}

/// Registration payload. Every field is required and must be non-blank.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegistrationRequest {
    pub email: String,
    pub password: String,
    pub full_name: String,
    pub phone_number: String,
}

impl RegistrationRequest {
    pub fn missing_field(&self) -> Option<&'static str> {
        first_blank(&[
            ("email", &self.email),
            ("password", &self.password),
            ("full_name", &self.full_name),
            ("phone_number", &self.phone_number),
        ])
    }
}

fn first_blank(fields: &[(&'static str, &String)]) -> Option<&'static str> {
    fields
        .iter()
        .find(|(_, value)| value.trim().is_empty())
        .map(|(name, _)| *name)
}

/// A child learner profile owned by one account.
///
/// `id` and `created_at` are assigned by the server; a profile built on the
/// client leaves them empty.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChildProfile {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<Uuid>,
    pub name: String,
    pub age: u32,
    #[serde(default)]
    pub grade: String,
    #[serde(default)]
    pub avatar: String,
    #[serde(default)]
    pub learning_goals: String,
    /// Opaque, server-managed.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub progress: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_activity: Option<String>,
}

impl ChildProfile {
    /// A fresh profile ready to submit to `create_profile`.
    pub fn new(
        name: impl Into<String>,
        age: u32,
        grade: impl Into<String>,
        avatar: impl Into<String>,
        learning_goals: impl Into<String>,
    ) -> Self {
        Self {
            id: None,
            name: name.into(),
            age,
            grade: grade.into(),
            avatar: avatar.into(),
            learning_goals: learning_goals.into(),
            progress: None,
            created_at: None,
            last_activity: None,
        }
    }
}

/// Account information returned by register, login and current-user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserInfo {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub email: String,
    #[serde(default)]
    pub full_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone_number: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_login: Option<String>,
}

/// Result of `health_check`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HealthStatus {
    pub message: String,
    pub status: Option<String>,
}

/// Result of `register` and `login`. `token` is never empty.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthGrant {
    pub token: String,
    pub message: Option<String>,
    pub user: Option<UserInfo>,
}

/// Result of `list_profiles`, in server order.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ProfileList {
    pub profiles: Vec<ChildProfile>,
    pub count: usize,
}

/// Result of `delete_profile`.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Deletion {
    pub status: Option<String>,
    pub message: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_profile_serializes_without_server_fields() {
        let profile = ChildProfile::new("Ada", 8, "3rd", "owl", "reading");
        let json = serde_json::to_value(&profile).unwrap();
        assert_eq!(json["name"], "Ada");
        assert_eq!(json["age"], 8);
        assert_eq!(json["learning_goals"], "reading");
        assert!(json.get("id").is_none());
        assert!(json.get("progress").is_none());
        assert!(json.get("created_at").is_none());
    }

    #[test]
    fn profile_defaults_missing_text_fields() {
        let profile: ChildProfile = serde_json::from_str(
            r#"{"id":"00000000-0000-0000-0000-000000000001","name":"Bo","age":5}"#,
        )
        .unwrap();
        assert_eq!(profile.grade, "");
        assert_eq!(profile.avatar, "");
        assert!(profile.last_activity.is_none());
    }

    #[test]
    fn profile_rejects_negative_age() {
        let result: Result<ChildProfile, _> = serde_json::from_str(r#"{"name":"Bo","age":-1}"#);
        assert!(result.is_err());
    }

    #[test]
    fn registration_reports_first_blank_field() {
        let request = RegistrationRequest {
            email: "a@b.com".to_string(),
            password: "secret".to_string(),
            full_name: "  ".to_string(),
            phone_number: String::new(),
        };
        assert_eq!(request.missing_field(), Some("full_name"));
    }

    #[test]
    fn complete_credentials_have_no_missing_field() {
        assert_eq!(Credentials::new("a@b.com", "secret").missing_field(), None);
        assert_eq!(Credentials::new("a@b.com", "").missing_field(), Some("password"));
    }

    #[test]
    fn user_info_uses_snake_case() {
        let user: UserInfo = serde_json::from_str(
            r#"{"email":"a@b.com","full_name":"A B","phone_number":"555","created_at":"2024-01-01T00:00:00"}"#,
        )
        .unwrap();
        assert_eq!(user.full_name, "A B");
        assert_eq!(user.phone_number.as_deref(), Some("555"));
    }
}
