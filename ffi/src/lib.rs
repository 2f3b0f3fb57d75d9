//! C-ABI wrapper around `aischool-core`.
//!
//! # Overview
//! Exposes the AI School API through `extern "C"` functions so a mobile host
//! (or any language with a C FFI) can build requests, execute them on its own
//! HTTP stack, and parse the responses without linking to serde or ureq.
//! The persistent session store is exposed too, so the host keeps one token
//! file shared with Rust callers.
//!
//! # Design
//! - Every `extern "C"` function wraps its body in `catch_unwind` so panics
//!   never cross the FFI boundary.
//! - Per-operation `build_*` / `parse_*` mirrors the core API 1:1.
//! - A single `FfiApiResult` envelope with `FfiDataTag` + `void* data`
//!   conveys success payloads and errors uniformly.
//! - The caller owns all returned pointers and must call the matching
//!   `aischool_free_*` function to release them.

pub mod types;

use std::ffi::CStr;
use std::os::raw::c_char;
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::ptr;

use aischool_core::config::DEFAULT_SESSION_NAMESPACE;
use aischool_core::http::{HttpRequest, HttpResponse};
use aischool_core::types::{ChildProfile, Credentials, RegistrationRequest};
use aischool_core::{ApiClient, ApiError, FileSessionStore, SessionStore};
use uuid::Uuid;

use types::*;

/// Borrow a C string as UTF-8. `None` for null or invalid UTF-8.
unsafe fn read_str<'a>(s: *const c_char) -> Option<&'a str> {
    if s.is_null() {
        return None;
    }
    unsafe { CStr::from_ptr(s) }.to_str().ok()
}

/// Like `read_str`, but null reads as the empty string.
unsafe fn read_str_or_empty(s: *const c_char) -> String {
    unsafe { read_str(s) }.unwrap_or_default().to_string()
}

unsafe fn read_uuid(s: *const c_char) -> Option<Uuid> {
    unsafe { read_str(s) }.and_then(|s| Uuid::parse_str(s).ok())
}

/// Shared body of every `aischool_build_*`. On failure returns null and, when
/// `out_error` is non-null, writes why: `NullArg` for a null client or a
/// null/malformed argument, `Unauthorized` for a blank token,
/// `ValidationFailed` for a blank field. Writes `Ok` on success.
fn build_with(
    client: *const FfiApiClient,
    out_error: *mut FfiErrorCode,
    build: impl FnOnce(&ApiClient) -> Option<Result<HttpRequest, ApiError>>,
) -> *mut FfiHttpRequest {
    let (req, code) = catch_unwind(AssertUnwindSafe(|| {
        if client.is_null() {
            return (ptr::null_mut(), FfiErrorCode::NullArg);
        }
        let client = unsafe { &*client };
        match build(&client.inner) {
            Some(Ok(req)) => (FfiHttpRequest::from_core(req), FfiErrorCode::Ok),
            Some(Err(e)) => (ptr::null_mut(), FfiErrorCode::from(&e)),
            None => (ptr::null_mut(), FfiErrorCode::NullArg),
        }
    }))
    .unwrap_or((ptr::null_mut(), FfiErrorCode::Panic));
    if !out_error.is_null() {
        unsafe { *out_error = code };
    }
    req
}

/// Shared body of every `aischool_parse_*`.
fn parse_with<T>(
    op: &str,
    client: *const FfiApiClient,
    response: *const FfiHttpResponse,
    parse: impl FnOnce(&ApiClient, HttpResponse) -> Result<T, ApiError>,
    wrap: impl FnOnce(T) -> *mut FfiApiResult,
) -> *mut FfiApiResult {
    catch_unwind(AssertUnwindSafe(|| {
        if client.is_null() {
            return FfiApiResult::null_arg("client");
        }
        if response.is_null() {
            return FfiApiResult::null_arg("response");
        }
        let client = unsafe { &*client };
        let resp = unsafe { &*response };
        let core_resp = HttpResponse::new(resp.status, unsafe { read_str_or_empty(resp.body) });
        match parse(&client.inner, core_resp) {
            Ok(value) => wrap(value),
            Err(e) => FfiApiResult::from_error(e),
        }
    }))
    .unwrap_or_else(|_| FfiApiResult::panic(&format!("panic in aischool_parse_{op}")))
}

// ---------------------------------------------------------------------------
// Client lifecycle
// ---------------------------------------------------------------------------

/// Create a new `ApiClient` bound to `base_url` (the server origin; `/api`
/// is appended unless already present).
///
/// Returns null if `base_url` is null or not UTF-8.
/// The caller must free the returned pointer with `aischool_client_free`.
#[unsafe(no_mangle)]
pub extern "C" fn aischool_client_new(base_url: *const c_char) -> *mut FfiApiClient {
    catch_unwind(|| {
        let Some(url) = (unsafe { read_str(base_url) }) else {
            return ptr::null_mut();
        };
        Box::into_raw(Box::new(FfiApiClient {
            inner: ApiClient::new(url),
        }))
    })
    .unwrap_or(ptr::null_mut())
}

/// Free a client created by `aischool_client_new`. Safe to call with null.
#[unsafe(no_mangle)]
pub extern "C" fn aischool_client_free(client: *mut FfiApiClient) {
    if !client.is_null() {
        let _ = catch_unwind(|| {
            drop(unsafe { Box::from_raw(client) });
        });
    }
}

// ---------------------------------------------------------------------------
// Build request functions
// ---------------------------------------------------------------------------

#[unsafe(no_mangle)]
pub extern "C" fn aischool_build_health_check(
    client: *const FfiApiClient,
    out_error: *mut FfiErrorCode,
) -> *mut FfiHttpRequest {
    build_with(client, out_error, |c| Some(Ok(c.build_health_check())))
}

/// Returns null if any argument is null or any field is blank.
#[unsafe(no_mangle)]
pub extern "C" fn aischool_build_register(
    client: *const FfiApiClient,
    email: *const c_char,
    password: *const c_char,
    full_name: *const c_char,
    phone_number: *const c_char,
    out_error: *mut FfiErrorCode,
) -> *mut FfiHttpRequest {
    build_with(client, out_error, |c| {
        let input = RegistrationRequest {
            email: unsafe { read_str(email) }?.to_string(),
            password: unsafe { read_str(password) }?.to_string(),
            full_name: unsafe { read_str(full_name) }?.to_string(),
            phone_number: unsafe { read_str(phone_number) }?.to_string(),
        };
        Some(c.build_register(&input))
    })
}

#[unsafe(no_mangle)]
pub extern "C" fn aischool_build_login(
    client: *const FfiApiClient,
    email: *const c_char,
    password: *const c_char,
    out_error: *mut FfiErrorCode,
) -> *mut FfiHttpRequest {
    build_with(client, out_error, |c| {
        let input = Credentials::new(unsafe { read_str(email) }?, unsafe { read_str(password) }?);
        Some(c.build_login(&input))
    })
}

/// Returns null if `token` is null or blank.
#[unsafe(no_mangle)]
pub extern "C" fn aischool_build_current_user(
    client: *const FfiApiClient,
    token: *const c_char,
    out_error: *mut FfiErrorCode,
) -> *mut FfiHttpRequest {
    build_with(client, out_error, |c| Some(c.build_current_user(unsafe { read_str(token) }?)))
}

#[unsafe(no_mangle)]
pub extern "C" fn aischool_build_logout(
    client: *const FfiApiClient,
    token: *const c_char,
    out_error: *mut FfiErrorCode,
) -> *mut FfiHttpRequest {
    build_with(client, out_error, |c| Some(c.build_logout(unsafe { read_str(token) }?)))
}

#[unsafe(no_mangle)]
pub extern "C" fn aischool_build_list_profiles(
    client: *const FfiApiClient,
    token: *const c_char,
    out_error: *mut FfiErrorCode,
) -> *mut FfiHttpRequest {
    build_with(client, out_error, |c| Some(c.build_list_profiles(unsafe { read_str(token) }?)))
}

/// `grade`, `avatar` and `learning_goals` may be null (sent as empty).
#[unsafe(no_mangle)]
pub extern "C" fn aischool_build_create_profile(
    client: *const FfiApiClient,
    token: *const c_char,
    name: *const c_char,
    age: u32,
    grade: *const c_char,
    avatar: *const c_char,
    learning_goals: *const c_char,
    out_error: *mut FfiErrorCode,
) -> *mut FfiHttpRequest {
    build_with(client, out_error, |c| {
        let token = unsafe { read_str(token) }?;
        let input = ChildProfile::new(
            unsafe { read_str(name) }?,
            age,
            unsafe { read_str_or_empty(grade) },
            unsafe { read_str_or_empty(avatar) },
            unsafe { read_str_or_empty(learning_goals) },
        );
        Some(c.build_create_profile(token, &input))
    })
}

/// Returns null if `token` or `id` is null, or `id` is not a UUID.
#[unsafe(no_mangle)]
pub extern "C" fn aischool_build_get_profile(
    client: *const FfiApiClient,
    token: *const c_char,
    id: *const c_char,
    out_error: *mut FfiErrorCode,
) -> *mut FfiHttpRequest {
    build_with(client, out_error, |c| {
        Some(c.build_get_profile(unsafe { read_str(token) }?, unsafe { read_uuid(id) }?))
    })
}

/// Sends the full profile; the server merges it. `progress` may be null to
/// leave it untouched.
#[unsafe(no_mangle)]
pub extern "C" fn aischool_build_update_profile(
    client: *const FfiApiClient,
    token: *const c_char,
    id: *const c_char,
    name: *const c_char,
    age: u32,
    grade: *const c_char,
    avatar: *const c_char,
    learning_goals: *const c_char,
    progress: *const c_char,
    out_error: *mut FfiErrorCode,
) -> *mut FfiHttpRequest {
    build_with(client, out_error, |c| {
        let token = unsafe { read_str(token) }?;
        let id = unsafe { read_uuid(id) }?;
        let mut input = ChildProfile::new(
            unsafe { read_str(name) }?,
            age,
            unsafe { read_str_or_empty(grade) },
            unsafe { read_str_or_empty(avatar) },
            unsafe { read_str_or_empty(learning_goals) },
        );
        input.progress = unsafe { read_str(progress) }.map(str::to_string);
        Some(c.build_update_profile(token, id, &input))
    })
}

#[unsafe(no_mangle)]
pub extern "C" fn aischool_build_delete_profile(
    client: *const FfiApiClient,
    token: *const c_char,
    id: *const c_char,
    out_error: *mut FfiErrorCode,
) -> *mut FfiHttpRequest {
    build_with(client, out_error, |c| {
        Some(c.build_delete_profile(unsafe { read_str(token) }?, unsafe { read_uuid(id) }?))
    })
}

// ---------------------------------------------------------------------------
// Parse response functions
// ---------------------------------------------------------------------------

/// `data_tag = Message`: the server's status message.
#[unsafe(no_mangle)]
pub extern "C" fn aischool_parse_health_check(
    client: *const FfiApiClient,
    response: *const FfiHttpResponse,
) -> *mut FfiApiResult {
    parse_with("health_check", client, response, ApiClient::parse_health_check, |h| {
        FfiApiResult::ok_message(h.message)
    })
}

/// `data_tag = Auth`.
#[unsafe(no_mangle)]
pub extern "C" fn aischool_parse_register(
    client: *const FfiApiClient,
    response: *const FfiHttpResponse,
) -> *mut FfiApiResult {
    parse_with("register", client, response, ApiClient::parse_register, FfiApiResult::ok_auth)
}

/// `data_tag = Auth`.
#[unsafe(no_mangle)]
pub extern "C" fn aischool_parse_login(
    client: *const FfiApiClient,
    response: *const FfiHttpResponse,
) -> *mut FfiApiResult {
    parse_with("login", client, response, ApiClient::parse_login, FfiApiResult::ok_auth)
}

/// `data_tag = User`.
#[unsafe(no_mangle)]
pub extern "C" fn aischool_parse_current_user(
    client: *const FfiApiClient,
    response: *const FfiHttpResponse,
) -> *mut FfiApiResult {
    parse_with("current_user", client, response, ApiClient::parse_current_user, FfiApiResult::ok_user)
}

/// `data_tag = Message`, or `None` when the server sent no message.
#[unsafe(no_mangle)]
pub extern "C" fn aischool_parse_logout(
    client: *const FfiApiClient,
    response: *const FfiHttpResponse,
) -> *mut FfiApiResult {
    parse_with("logout", client, response, ApiClient::parse_logout, |message| {
        message.map_or_else(FfiApiResult::ok_empty, FfiApiResult::ok_message)
    })
}

/// `data_tag = ProfileList`.
#[unsafe(no_mangle)]
pub extern "C" fn aischool_parse_list_profiles(
    client: *const FfiApiClient,
    response: *const FfiHttpResponse,
) -> *mut FfiApiResult {
    parse_with(
        "list_profiles",
        client,
        response,
        ApiClient::parse_list_profiles,
        FfiApiResult::ok_profile_list,
    )
}

/// `data_tag = Profile`; `id` is always set.
#[unsafe(no_mangle)]
pub extern "C" fn aischool_parse_create_profile(
    client: *const FfiApiClient,
    response: *const FfiHttpResponse,
) -> *mut FfiApiResult {
    parse_with(
        "create_profile",
        client,
        response,
        ApiClient::parse_create_profile,
        FfiApiResult::ok_profile,
    )
}

/// `data_tag = Profile`.
#[unsafe(no_mangle)]
pub extern "C" fn aischool_parse_get_profile(
    client: *const FfiApiClient,
    response: *const FfiHttpResponse,
) -> *mut FfiApiResult {
    parse_with("get_profile", client, response, ApiClient::parse_get_profile, FfiApiResult::ok_profile)
}

/// `data_tag = Profile`.
#[unsafe(no_mangle)]
pub extern "C" fn aischool_parse_update_profile(
    client: *const FfiApiClient,
    response: *const FfiHttpResponse,
) -> *mut FfiApiResult {
    parse_with(
        "update_profile",
        client,
        response,
        ApiClient::parse_update_profile,
        FfiApiResult::ok_profile,
    )
}

/// `data_tag = Deletion`.
#[unsafe(no_mangle)]
pub extern "C" fn aischool_parse_delete_profile(
    client: *const FfiApiClient,
    response: *const FfiHttpResponse,
) -> *mut FfiApiResult {
    parse_with(
        "delete_profile",
        client,
        response,
        ApiClient::parse_delete_profile,
        FfiApiResult::ok_deletion,
    )
}

// ---------------------------------------------------------------------------
// Session store
// ---------------------------------------------------------------------------

/// Open the token store at `<dir>/<namespace>.json`. A null `namespace`
/// uses the app's default. Nothing is touched on disk until the first save.
///
/// Returns null if `dir` is null. Free with `aischool_session_free`.
#[unsafe(no_mangle)]
pub extern "C" fn aischool_session_open(
    dir: *const c_char,
    namespace: *const c_char,
) -> *mut FfiSessionStore {
    catch_unwind(|| {
        let Some(dir) = (unsafe { read_str(dir) }) else {
            return ptr::null_mut();
        };
        let namespace = unsafe { read_str(namespace) }.unwrap_or(DEFAULT_SESSION_NAMESPACE);
        Box::into_raw(Box::new(FfiSessionStore {
            inner: FileSessionStore::new(dir, namespace),
        }))
    })
    .unwrap_or(ptr::null_mut())
}

/// Write the stored token to `*out_token` (null when signed out). A non-null
/// token must be freed with `aischool_free_string`.
#[unsafe(no_mangle)]
pub extern "C" fn aischool_session_load(
    store: *const FfiSessionStore,
    out_token: *mut *mut c_char,
) -> FfiErrorCode {
    catch_unwind(|| {
        if store.is_null() || out_token.is_null() {
            return FfiErrorCode::NullArg;
        }
        let store = unsafe { &*store };
        match store.inner.load() {
            Ok(token) => {
                unsafe { *out_token = c_string_opt(token) };
                FfiErrorCode::Ok
            }
            Err(_) => {
                unsafe { *out_token = ptr::null_mut() };
                FfiErrorCode::Session
            }
        }
    })
    .unwrap_or(FfiErrorCode::Panic)
}

#[unsafe(no_mangle)]
pub extern "C" fn aischool_session_save(
    store: *const FfiSessionStore,
    token: *const c_char,
) -> FfiErrorCode {
    catch_unwind(|| {
        let Some(token) = (unsafe { read_str(token) }) else {
            return FfiErrorCode::NullArg;
        };
        if store.is_null() {
            return FfiErrorCode::NullArg;
        }
        let store = unsafe { &*store };
        match store.inner.save(token) {
            Ok(()) => FfiErrorCode::Ok,
            Err(_) => FfiErrorCode::Session,
        }
    })
    .unwrap_or(FfiErrorCode::Panic)
}

/// Forget the token. Clearing an empty store succeeds.
#[unsafe(no_mangle)]
pub extern "C" fn aischool_session_clear(store: *const FfiSessionStore) -> FfiErrorCode {
    catch_unwind(|| {
        if store.is_null() {
            return FfiErrorCode::NullArg;
        }
        let store = unsafe { &*store };
        match store.inner.clear() {
            Ok(()) => FfiErrorCode::Ok,
            Err(_) => FfiErrorCode::Session,
        }
    })
    .unwrap_or(FfiErrorCode::Panic)
}

/// Free a store handle. The token on disk is kept. Safe to call with null.
#[unsafe(no_mangle)]
pub extern "C" fn aischool_session_free(store: *mut FfiSessionStore) {
    if !store.is_null() {
        let _ = catch_unwind(|| {
            drop(unsafe { Box::from_raw(store) });
        });
    }
}

// ---------------------------------------------------------------------------
// Free functions
// ---------------------------------------------------------------------------

/// Free a request returned by any `aischool_build_*` function.
/// Safe to call with null.
#[unsafe(no_mangle)]
pub extern "C" fn aischool_free_request(req: *mut FfiHttpRequest) {
    if req.is_null() {
        return;
    }
    let _ = catch_unwind(|| unsafe { FfiHttpRequest::release(req) });
}

/// Free a result returned by any `aischool_parse_*` function.
/// Safe to call with null. Uses `data_tag` to determine what `data` points to.
#[unsafe(no_mangle)]
pub extern "C" fn aischool_free_result(result: *mut FfiApiResult) {
    if result.is_null() {
        return;
    }
    let _ = catch_unwind(|| unsafe { FfiApiResult::release(result) });
}

/// Free a C string allocated by this library. Safe to call with null.
#[unsafe(no_mangle)]
pub extern "C" fn aischool_free_string(s: *mut c_char) {
    if !s.is_null() {
        let _ = catch_unwind(|| unsafe { free_c_string(s) });
    }
}

// ---------------------------------------------------------------------------
// Unit tests
// ---------------------------------------------------------------------------
