//! In-memory stand-in for the AI School backend.
//!
//! Speaks the same JSON contract as the production server so the client can
//! be exercised end to end: argon2-hashed accounts, HS256 bearer tokens and
//! soft-deleted child profiles scoped to their owner.

pub mod auth;
pub mod config;
pub mod error;
pub mod models;
pub mod routes;
pub mod state;

use axum::routing::{get, post};
use axum::Router;
use tokio::net::TcpListener;

pub use config::Config;
pub use error::AppError;
pub use models::{Profile, PublicUser};
pub use state::AppState;

pub fn app() -> Router {
    app_with_config(Config::default())
}

pub fn app_with_config(config: Config) -> Router {
    Router::new()
        .route("/api/health", get(routes::health))
        .route("/api/auth/register", post(routes::register))
        .route("/api/auth/login", post(routes::login))
        .route("/api/auth/user", get(routes::current_user))
        .route("/api/auth/logout", post(routes::logout))
        .route(
            "/api/profiles",
            get(routes::list_profiles).post(routes::create_profile),
        )
        .route(
            "/api/profiles/{id}",
            get(routes::get_profile)
                .put(routes::update_profile)
                .delete(routes::delete_profile),
        )
        .fallback(routes::not_found)
        .with_state(AppState::new(config))
}

pub async fn run(listener: TcpListener) -> Result<(), std::io::Error> {
    run_with_config(listener, Config::default()).await
}

pub async fn run_with_config(listener: TcpListener, config: Config) -> Result<(), std::io::Error> {
    let app = app_with_config(config).layer(tower_http::trace::TraceLayer::new_for_http());
    axum::serve(listener, app).await
}
