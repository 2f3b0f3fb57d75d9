use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, State};
use axum::http::{HeaderMap, StatusCode};
use axum::Json;
use serde_json::{json, Value};
use tracing::info;
use uuid::Uuid;

use crate::auth::{authenticate, create_token, hash_password, verify_password};
use crate::error::AppError;
use crate::models::{
    normalize_email, parse_age, required, validate_email, validate_password, LoginBody, Profile,
    ProfileBody, PublicUser, RegisterBody, UserRecord,
};
use crate::state::AppState;

type Reply = Result<(StatusCode, Json<Value>), AppError>;

fn now() -> String {
    chrono::Utc::now().to_rfc3339()
}

fn body<T>(payload: Result<Json<T>, JsonRejection>) -> Result<T, AppError> {
    payload
        .map(|Json(inner)| inner)
        .map_err(|rejection| AppError::BadRequest(rejection.body_text()))
}

fn profile_id(raw: &str) -> Result<Uuid, AppError> {
    Uuid::parse_str(raw).map_err(|_| profile_not_found())
}

fn profile_not_found() -> AppError {
    AppError::NotFound("Profile not found".to_string())
}

pub async fn health() -> Json<Value> {
    Json(json!({
        "status": "healthy",
        "message": "AI School Backend Server is running",
        "timestamp": now(),
    }))
}

pub async fn register(
    State(state): State<AppState>,
    payload: Result<Json<RegisterBody>, JsonRejection>,
) -> Reply {
    let input = body(payload)?;
    let email = normalize_email(required(&input.email, "email")?);
    required(&input.password, "password")?;
    let password = input.password.unwrap_or_default();
    let full_name = required(&input.full_name, "full_name")?.to_string();
    let phone_number = input
        .phone_number
        .map(|p| p.trim().to_string())
        .filter(|p| !p.is_empty());

    validate_email(&email)?;
    validate_password(&password)?;

    let password_hash = hash_password(&password)?;
    let user = {
        let mut db = state.db.write().await;
        if db.user_by_email(&email).is_some() {
            return Err(AppError::Conflict(
                "User with this email already exists".to_string(),
            ));
        }
        let user = UserRecord {
            id: Uuid::new_v4(),
            email,
            password_hash,
            full_name,
            phone_number,
            created_at: now(),
            last_login: None,
        };
        db.users.insert(user.id, user.clone());
        user
    };

    let token = create_token(user.id, &user.email, &state.config)?;
    info!(user_id = %user.id, "registered user");
    Ok((
        StatusCode::CREATED,
        Json(json!({
            "message": "User registered successfully",
            "token": token,
            "user": PublicUser::from(&user),
        })),
    ))
}

pub async fn login(
    State(state): State<AppState>,
    payload: Result<Json<LoginBody>, JsonRejection>,
) -> Reply {
    let input = body(payload)?;
    let (Ok(email), Ok(_)) = (
        required(&input.email, "email"),
        required(&input.password, "password"),
    ) else {
        return Err(AppError::BadRequest(
            "Email and password are required".to_string(),
        ));
    };
    let email = normalize_email(email);
    let password = input.password.unwrap_or_default();
    let rejected = || AppError::Unauthorized("Invalid email or password".to_string());

    let mut db = state.db.write().await;
    let user_id = db.user_by_email(&email).map(|u| u.id).ok_or_else(rejected)?;
    let user = db.users.get_mut(&user_id).ok_or_else(rejected)?;
    if !verify_password(&password, &user.password_hash)? {
        return Err(rejected());
    }
    user.last_login = Some(now());
    let public = PublicUser::from(&*user);
    drop(db);

    let token = create_token(user_id, &public.email, &state.config)?;
    info!(%user_id, "user signed in");
    Ok((
        StatusCode::OK,
        Json(json!({
            "message": "Login successful",
            "token": token,
            "user": public,
        })),
    ))
}

pub async fn current_user(State(state): State<AppState>, headers: HeaderMap) -> Reply {
    let claims = authenticate(&headers, &state.config)?;
    let db = state.db.read().await;
    let user = db
        .users
        .get(&claims.sub)
        .ok_or_else(|| AppError::NotFound("User not found".to_string()))?;
    Ok((StatusCode::OK, Json(json!({ "user": PublicUser::from(user) }))))
}

/// Tokens are stateless; the client forgets its own.
pub async fn logout() -> Json<Value> {
    Json(json!({ "message": "Logged out successfully" }))
}

pub async fn list_profiles(State(state): State<AppState>, headers: HeaderMap) -> Reply {
    let claims = authenticate(&headers, &state.config)?;
    let db = state.db.read().await;
    let profiles: Vec<&Profile> = db.active_profiles(claims.sub).collect();
    Ok((
        StatusCode::OK,
        Json(json!({ "count": profiles.len(), "profiles": profiles })),
    ))
}

pub async fn create_profile(
    State(state): State<AppState>,
    headers: HeaderMap,
    payload: Result<Json<ProfileBody>, JsonRejection>,
) -> Reply {
    let claims = authenticate(&headers, &state.config)?;
    let input = body(payload)?;
    let (Ok(name), Some(age)) = (required(&input.name, "name"), input.age.as_ref()) else {
        return Err(AppError::BadRequest("Name and age are required".to_string()));
    };
    let age = parse_age(age)?;

    let created = now();
    let profile = Profile {
        id: Uuid::new_v4(),
        parent_id: claims.sub,
        name: name.to_string(),
        age,
        grade: input.grade.unwrap_or_default().trim().to_string(),
        avatar: input
            .avatar
            .filter(|a| !a.trim().is_empty())
            .unwrap_or_else(|| "default".to_string()),
        learning_goals: input.learning_goals.unwrap_or_default().trim().to_string(),
        progress: "{}".to_string(),
        created_at: created.clone(),
        last_activity: created,
        is_active: true,
    };
    state.db.write().await.profiles.push(profile.clone());
    info!(profile_id = %profile.id, "created profile");
    Ok((
        StatusCode::CREATED,
        Json(json!({
            "message": "Kid profile created successfully",
            "profile": profile,
        })),
    ))
}

pub async fn get_profile(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(id): Path<String>,
) -> Reply {
    let claims = authenticate(&headers, &state.config)?;
    let id = profile_id(&id)?;
    let db = state.db.read().await;
    let profile = db
        .active_profiles(claims.sub)
        .find(|p| p.id == id)
        .ok_or_else(profile_not_found)?;
    Ok((StatusCode::OK, Json(json!({ "profile": profile }))))
}

pub async fn update_profile(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(id): Path<String>,
    payload: Result<Json<ProfileBody>, JsonRejection>,
) -> Reply {
    let claims = authenticate(&headers, &state.config)?;
    let id = profile_id(&id)?;
    let input = body(payload)?;
    let age = input.age.as_ref().map(parse_age).transpose()?;

    let mut db = state.db.write().await;
    let profile = db
        .active_profile_mut(claims.sub, id)
        .ok_or_else(profile_not_found)?;
    if let Some(name) = input.name.filter(|n| !n.trim().is_empty()) {
        profile.name = name.trim().to_string();
    }
    if let Some(age) = age {
        profile.age = age;
    }
    if let Some(grade) = input.grade {
        profile.grade = grade.trim().to_string();
    }
    if let Some(avatar) = input.avatar {
        profile.avatar = avatar;
    }
    if let Some(goals) = input.learning_goals {
        profile.learning_goals = goals.trim().to_string();
    }
    if let Some(progress) = input.progress {
        profile.progress = progress;
    }
    profile.last_activity = now();
    let updated = profile.clone();
    drop(db);

    info!(profile_id = %id, "updated profile");
    Ok((
        StatusCode::OK,
        Json(json!({
            "message": "Profile updated successfully",
            "profile": updated,
        })),
    ))
}

pub async fn delete_profile(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(id): Path<String>,
) -> Reply {
    let claims = authenticate(&headers, &state.config)?;
    let id = profile_id(&id)?;
    let mut db = state.db.write().await;
    let profile = db
        .active_profile_mut(claims.sub, id)
        .ok_or_else(profile_not_found)?;
    profile.is_active = false;
    drop(db);

    info!(profile_id = %id, "deleted profile");
    Ok((
        StatusCode::OK,
        Json(json!({
            "message": "Profile deleted successfully",
            "status": "deleted",
        })),
    ))
}

pub async fn not_found() -> AppError {
    AppError::NotFound("Endpoint not found".to_string())
}
