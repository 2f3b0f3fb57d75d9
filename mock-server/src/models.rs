use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

use crate::error::AppError;

pub const MIN_AGE: u64 = 3;
pub const MAX_AGE: u64 = 18;
pub const MIN_PASSWORD_LEN: usize = 6;

#[derive(Clone, Debug)]
pub struct UserRecord {
    pub id: Uuid,
    pub email: String,
    pub password_hash: String,
    pub full_name: String,
    pub phone_number: Option<String>,
    pub created_at: String,
    pub last_login: Option<String>,
}

/// What the API reveals about an account.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct PublicUser {
    pub id: String,
    pub email: String,
    pub full_name: String,
    pub phone_number: Option<String>,
    pub created_at: String,
    pub last_login: Option<String>,
}

impl From<&UserRecord> for PublicUser {
    fn from(user: &UserRecord) -> Self {
        Self {
            id: user.id.to_string(),
            email: user.email.clone(),
            full_name: user.full_name.clone(),
            phone_number: user.phone_number.clone(),
            created_at: user.created_at.clone(),
            last_login: user.last_login.clone(),
        }
    }
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Profile {
    pub id: Uuid,
    #[serde(skip)]
    pub parent_id: Uuid,
    pub name: String,
    pub age: u32,
    pub grade: String,
    pub avatar: String,
    pub learning_goals: String,
    pub progress: String,
    pub created_at: String,
    pub last_activity: String,
    #[serde(skip)]
    pub is_active: bool,
}

#[derive(Debug, Default, Deserialize)]
pub struct RegisterBody {
    pub email: Option<String>,
    pub password: Option<String>,
    pub full_name: Option<String>,
    pub phone_number: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct LoginBody {
    pub email: Option<String>,
    pub password: Option<String>,
}

/// Create and update share one shape; `age` may arrive as a number or a
/// numeric string.
#[derive(Debug, Default, Deserialize)]
pub struct ProfileBody {
    pub name: Option<String>,
    pub age: Option<Value>,
    pub grade: Option<String>,
    pub avatar: Option<String>,
    pub learning_goals: Option<String>,
    pub progress: Option<String>,
}

pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

/// Non-blank value of a required text field.
pub fn required<'a>(value: &'a Option<String>, field: &str) -> Result<&'a str, AppError> {
    match value.as_deref().map(str::trim) {
        Some(v) if !v.is_empty() => Ok(v),
        _ => Err(AppError::BadRequest(format!("{field} is required"))),
    }
}

pub fn validate_email(email: &str) -> Result<(), AppError> {
    if email.contains('@') && email.contains('.') {
        Ok(())
    } else {
        Err(AppError::BadRequest("Invalid email format".to_string()))
    }
}

pub fn validate_password(password: &str) -> Result<(), AppError> {
    if password.chars().count() >= MIN_PASSWORD_LEN {
        Ok(())
    } else {
        Err(AppError::BadRequest(format!(
            "Password must be at least {MIN_PASSWORD_LEN} characters long"
        )))
    }
}

pub fn parse_age(raw: &Value) -> Result<u32, AppError> {
    let invalid = || AppError::BadRequest("Age must be a valid number".to_string());
    let age = match raw {
        Value::Number(n) => n.as_i64().ok_or_else(invalid)?,
        Value::String(s) => s.trim().parse::<i64>().map_err(|_| invalid())?,
        _ => return Err(invalid()),
    };
    if !(MIN_AGE as i64..=MAX_AGE as i64).contains(&age) {
        return Err(AppError::BadRequest(format!(
            "Age must be between {MIN_AGE} and {MAX_AGE}"
        )));
    }
    u32::try_from(age).map_err(|_| invalid())
}
