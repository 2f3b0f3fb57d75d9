//! API client core for the AI School mobile app.
//!
//! # Overview
//! Builds `HttpRequest` values and parses `HttpResponse` values for the
//! `/api/` REST service (auth plus child learner profiles). The pure client
//! never does I/O and never touches the session; the layers above it do:
//!
//! - `ApiClient`: `build_*` / `parse_*` per endpoint (host-does-IO).
//! - `Transport` / `UreqTransport`: one blocking round-trip with timeouts.
//! - `Api`: client plus transport, one method per endpoint.
//! - `SessionStore`: the single persisted access token.
//! - `Account`: session-aware facade; owns when the user is signed out.
//! - `Dispatcher`: runs calls in the background with completion callbacks.
//!
//! # Design
//! - Every call resolves to one typed success or one `ApiError`; no retries.
//! - The response envelope is narrowed per endpoint into its own result type.
//! - Types use owned `String` / `Vec` fields to keep the FFI mapping simple.
//! - DTOs are defined independently from the mock-server crate; integration
//!   tests catch schema drift.

pub mod account;
pub mod api;
pub mod client;
pub mod config;
pub mod dispatch;
mod envelope;
pub mod error;
pub mod http;
pub mod session;
pub mod transport;
pub mod types;

pub use account::{Account, AccountError};
pub use api::Api;
pub use client::ApiClient;
pub use config::{ClientConfig, ConfigError};
pub use dispatch::Dispatcher;
pub use error::ApiError;
pub use http::{HttpMethod, HttpRequest, HttpResponse};
pub use session::{FileSessionStore, MemorySessionStore, SessionError, SessionStore};
pub use transport::{Transport, UreqTransport};
pub use types::{
    AuthGrant, ChildProfile, Credentials, Deletion, HealthStatus, ProfileList,
    RegistrationRequest, UserInfo,
};
