use axum::http::{self, Request, StatusCode};
use axum::Router;
use http_body_util::BodyExt;
use mock_server::{app, app_with_config, Config, Profile, PublicUser};
use serde_json::{json, Value};
use tower::ServiceExt;

async fn body_bytes(response: axum::response::Response) -> bytes::Bytes {
    response.into_body().collect().await.unwrap().to_bytes()
}

async fn send(app: &Router, request: Request<String>) -> (StatusCode, Value) {
    let resp = app.clone().oneshot(request).await.unwrap();
    let status = resp.status();
    let bytes = body_bytes(resp).await;
    let body = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, body)
}

fn request(method: &str, uri: &str, token: Option<&str>, body: Option<Value>) -> Request<String> {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(token) = token {
        builder = builder.header(http::header::AUTHORIZATION, format!("Bearer {token}"));
    }
    match body {
        Some(body) => builder
            .header(http::header::CONTENT_TYPE, "application/json")
            .body(body.to_string())
            .unwrap(),
        None => builder.body(String::new()).unwrap(),
    }
}

async fn register(app: &Router, email: &str) -> String {
    let (status, body) = send(
        app,
        request(
            "POST",
            "/api/auth/register",
            None,
            Some(json!({
                "email": email,
                "password": "secret1",
                "full_name": "Parent",
                "phone_number": "555-0100",
            })),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED, "{body}");
    body["token"].as_str().unwrap().to_string()
}

async fn create_profile(app: &Router, token: &str, name: &str, age: Value) -> Profile {
    let (status, body) = send(
        app,
        request(
            "POST",
            "/api/profiles",
            Some(token),
            Some(json!({ "name": name, "age": age, "grade": "2nd" })),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED, "{body}");
    serde_json::from_value(body["profile"].clone()).unwrap()
}

// --- health / fallback ---

#[tokio::test]
async fn health_reports_running() {
    let (status, body) = send(&app(), request("GET", "/api/health", None, None)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "healthy");
    assert_eq!(body["message"], "AI School Backend Server is running");
    assert!(body["timestamp"].is_string());
}

#[tokio::test]
async fn unknown_route_is_json_404() {
    let (status, body) = send(&app(), request("GET", "/api/nope", None, None)).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body, json!({ "error": "Endpoint not found" }));
}

// --- register ---

#[tokio::test]
async fn register_returns_token_and_user() {
    let app = app();
    let (status, body) = send(
        &app,
        request(
            "POST",
            "/api/auth/register",
            None,
            Some(json!({ "email": " Ann@Example.com ", "password": "secret1", "full_name": "Ann" })),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["message"], "User registered successfully");
    assert!(!body["token"].as_str().unwrap().is_empty());
    let user: PublicUser = serde_json::from_value(body["user"].clone()).unwrap();
    assert_eq!(user.email, "ann@example.com");
    assert_eq!(user.phone_number, None);
}

#[tokio::test]
async fn register_validation_failures() {
    let app = app();
    let cases = [
        (json!({ "password": "secret1", "full_name": "A" }), "email is required"),
        (json!({ "email": "a@b.com", "full_name": "A" }), "password is required"),
        (json!({ "email": "a@b.com", "password": "secret1" }), "full_name is required"),
        (json!({ "email": "ab.com", "password": "secret1", "full_name": "A" }), "Invalid email format"),
        (
            json!({ "email": "a@b.com", "password": "12345", "full_name": "A" }),
            "Password must be at least 6 characters long",
        ),
    ];
    for (input, message) in cases {
        let (status, body) = send(&app, request("POST", "/api/auth/register", None, Some(input))).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], message);
    }
}

#[tokio::test]
async fn register_duplicate_email_is_409() {
    let app = app();
    register(&app, "dup@example.com").await;
    let (status, body) = send(
        &app,
        request(
            "POST",
            "/api/auth/register",
            None,
            Some(json!({ "email": "DUP@example.com", "password": "other-pass", "full_name": "B" })),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["error"], "User with this email already exists");
    assert!(body.get("token").is_none());

    let login = |password: &str| {
        request(
            "POST",
            "/api/auth/login",
            None,
            Some(json!({ "email": "dup@example.com", "password": password })),
        )
    };
    let (status, _) = send(&app, login("other-pass")).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    let (status, body) = send(&app, login("secret1")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["user"]["full_name"], "Parent");
}

#[tokio::test]
async fn malformed_json_is_400() {
    let resp = app()
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/api/auth/login")
                .header(http::header::CONTENT_TYPE, "application/json")
                .body("{not json".to_string())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
}

// --- login / user / logout ---

#[tokio::test]
async fn login_and_fetch_current_user() {
    let app = app();
    register(&app, "kim@example.com").await;

    let (status, body) = send(
        &app,
        request(
            "POST",
            "/api/auth/login",
            None,
            Some(json!({ "email": "kim@example.com", "password": "secret1" })),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "Login successful");
    assert!(body["user"]["last_login"].is_string());
    let token = body["token"].as_str().unwrap().to_string();

    let (status, body) = send(&app, request("GET", "/api/auth/user", Some(&token), None)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["user"]["email"], "kim@example.com");
    assert_eq!(body["user"]["full_name"], "Parent");
}

#[tokio::test]
async fn login_rejections() {
    let app = app();
    register(&app, "kim@example.com").await;

    let (status, body) = send(
        &app,
        request("POST", "/api/auth/login", None, Some(json!({ "email": "kim@example.com" }))),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Email and password are required");

    for creds in [
        json!({ "email": "kim@example.com", "password": "wrong-pass" }),
        json!({ "email": "nobody@example.com", "password": "secret1" }),
    ] {
        let (status, body) = send(&app, request("POST", "/api/auth/login", None, Some(creds))).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(body["error"], "Invalid email or password");
    }
}

#[tokio::test]
async fn missing_or_bad_token_is_401() {
    let app = app();
    let (status, body) = send(&app, request("GET", "/api/auth/user", None, None)).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error"], "Authorization token required");

    let (status, body) = send(&app, request("GET", "/api/profiles", Some("garbage"), None)).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error"], "Invalid or expired token");
}

#[tokio::test]
async fn token_from_another_secret_is_rejected() {
    let issuer = app_with_config(Config {
        jwt_secret: "issuer-secret".to_string(),
        ..Config::default()
    });
    let token = register(&issuer, "x@example.com").await;
    let (status, _) = send(&app(), request("GET", "/api/auth/user", Some(&token), None)).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn logout_is_stateless() {
    let app = app();
    let token = register(&app, "out@example.com").await;
    let (status, body) = send(&app, request("POST", "/api/auth/logout", Some(&token), None)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "Logged out successfully");

    // the token itself stays valid until it expires
    let (status, _) = send(&app, request("GET", "/api/auth/user", Some(&token), None)).await;
    assert_eq!(status, StatusCode::OK);
}

// --- profiles ---

#[tokio::test]
async fn create_profile_defaults_and_validation() {
    let app = app();
    let token = register(&app, "p@example.com").await;

    let profile = create_profile(&app, &token, "Ada", json!("8")).await;
    assert_eq!(profile.age, 8);
    assert_eq!(profile.avatar, "default");
    assert_eq!(profile.progress, "{}");

    let cases = [
        (json!({ "age": 5 }), "Name and age are required"),
        (json!({ "name": "Bo" }), "Name and age are required"),
        (json!({ "name": "Bo", "age": 2 }), "Age must be between 3 and 18"),
        (json!({ "name": "Bo", "age": "five" }), "Age must be a valid number"),
    ];
    for (input, message) in cases {
        let (status, body) = send(&app, request("POST", "/api/profiles", Some(&token), Some(input))).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], message);
    }
}

#[tokio::test]
async fn profiles_are_scoped_to_owner() {
    let app = app();
    let alice = register(&app, "alice@example.com").await;
    let bob = register(&app, "bob@example.com").await;
    let profile = create_profile(&app, &alice, "Ada", json!(8)).await;

    let (status, body) = send(&app, request("GET", "/api/profiles", Some(&bob), None)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["count"], 0);

    let uri = format!("/api/profiles/{}", profile.id);
    let (status, body) = send(&app, request("GET", &uri, Some(&bob), None)).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], "Profile not found");
    let (status, _) = send(&app, request("DELETE", &uri, Some(&bob), None)).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn malformed_profile_id_is_404() {
    let app = app();
    let token = register(&app, "p@example.com").await;
    let (status, body) = send(&app, request("GET", "/api/profiles/not-a-uuid", Some(&token), None)).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], "Profile not found");
}

#[tokio::test]
async fn update_rejects_bad_age_and_keeps_profile() {
    let app = app();
    let token = register(&app, "p@example.com").await;
    let profile = create_profile(&app, &token, "Ada", json!(8)).await;
    let uri = format!("/api/profiles/{}", profile.id);

    let (status, body) = send(&app, request("PUT", &uri, Some(&token), Some(json!({ "age": 40 })))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Age must be between 3 and 18");

    let (_, body) = send(&app, request("GET", &uri, Some(&token), None)).await;
    assert_eq!(body["profile"]["age"], 8);
}

// --- full lifecycle ---

#[tokio::test]
async fn profile_lifecycle() {
    let app = app();
    let token = register(&app, "life@example.com").await;

    let first = create_profile(&app, &token, "Ada", json!(8)).await;
    let second = create_profile(&app, &token, "Bo", json!(5)).await;

    // list in creation order
    let (status, body) = send(&app, request("GET", "/api/profiles", Some(&token), None)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["count"], 2);
    let listed: Vec<Profile> = serde_json::from_value(body["profiles"].clone()).unwrap();
    assert_eq!(listed[0].id, first.id);
    assert_eq!(listed[1].id, second.id);

    // partial update merges
    let uri = format!("/api/profiles/{}", first.id);
    let (status, body) = send(
        &app,
        request(
            "PUT",
            &uri,
            Some(&token),
            Some(json!({ "age": 9, "progress": "{\"math\":3}" })),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "Profile updated successfully");
    let updated: Profile = serde_json::from_value(body["profile"].clone()).unwrap();
    assert_eq!(updated.name, "Ada");
    assert_eq!(updated.grade, "2nd");
    assert_eq!(updated.age, 9);
    assert_eq!(updated.progress, "{\"math\":3}");

    // soft delete
    let (status, body) = send(&app, request("DELETE", &uri, Some(&token), None)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "Profile deleted successfully");
    assert_eq!(body["status"], "deleted");

    let (status, _) = send(&app, request("GET", &uri, Some(&token), None)).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    let (status, _) = send(&app, request("DELETE", &uri, Some(&token), None)).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (_, body) = send(&app, request("GET", "/api/profiles", Some(&token), None)).await;
    assert_eq!(body["count"], 1);
    assert_eq!(body["profiles"][0]["name"], "Bo");
}
