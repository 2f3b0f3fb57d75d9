//! `#[repr(C)]` types for the FFI boundary.
//!
//! # Design
//! Each type mirrors a core type but uses C-compatible representations:
//! `*mut c_char` instead of `String` (null for an absent optional), raw
//! pointers instead of `Vec`, and tagged enums with explicit discriminants.
//! Conversions and the matching release helpers live here to keep `lib.rs`
//! focused on the `extern "C"` surface.

use std::ffi::{c_void, CString};
use std::os::raw::c_char;
use std::ptr;

use aischool_core::error::ApiError;
use aischool_core::http::HttpMethod;
use aischool_core::types::{AuthGrant, ChildProfile, Deletion, ProfileList, UserInfo};
use aischool_core::{ApiClient, FileSessionStore};

/// Opaque handle to an `ApiClient`. C callers receive a pointer to this
/// and pass it back into every build/parse function.
pub struct FfiApiClient {
    pub(crate) inner: ApiClient,
}

/// Opaque handle to the persistent session store.
pub struct FfiSessionStore {
    pub(crate) inner: FileSessionStore,
}

/// Heap-allocate `s` as a C string. Interior NULs are dropped.
pub(crate) fn c_string(s: impl Into<String>) -> *mut c_char {
    let mut s = s.into();
    s.retain(|c| c != '\0');
    CString::new(s).unwrap_or_default().into_raw()
}

pub(crate) fn c_string_opt(s: Option<String>) -> *mut c_char {
    s.map_or(ptr::null_mut(), c_string)
}

/// Release a string produced by `c_string`. Null is ignored.
pub(crate) unsafe fn free_c_string(s: *mut c_char) {
    if !s.is_null() {
        drop(unsafe { CString::from_raw(s) });
    }
}

/// Leak `items` as a C array; `(null, 0)` when empty.
fn into_raw_array<T>(items: Vec<T>) -> (*mut T, u32) {
    if items.is_empty() {
        return (ptr::null_mut(), 0);
    }
    let len = items.len() as u32;
    let mut boxed = items.into_boxed_slice();
    let ptr = boxed.as_mut_ptr();
    std::mem::forget(boxed);
    (ptr, len)
}

/// Reclaim an array produced by `into_raw_array`.
unsafe fn from_raw_array<T>(ptr: *mut T, len: u32) -> Vec<T> {
    if ptr.is_null() || len == 0 {
        return Vec::new();
    }
    let slice = unsafe { std::slice::from_raw_parts_mut(ptr, len as usize) };
    unsafe { Box::from_raw(slice as *mut [T]) }.into_vec()
}

// ---------------------------------------------------------------------------
// Request types
// ---------------------------------------------------------------------------

/// HTTP method as a C enum.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FfiHttpMethod {
    Get = 0,
    Post = 1,
    Put = 2,
    Delete = 3,
}

impl From<HttpMethod> for FfiHttpMethod {
    fn from(m: HttpMethod) -> Self {
        match m {
            HttpMethod::Get => FfiHttpMethod::Get,
            HttpMethod::Post => FfiHttpMethod::Post,
            HttpMethod::Put => FfiHttpMethod::Put,
            HttpMethod::Delete => FfiHttpMethod::Delete,
        }
    }
}

/// A single HTTP header as a key-value pair of C strings.
#[repr(C)]
pub struct FfiHeader {
    pub key: *mut c_char,
    pub value: *mut c_char,
}

/// An HTTP request described as C-compatible plain data.
///
/// Built by `aischool_build_*` functions. The host executes the request
/// and passes the response back through `aischool_parse_*`.
#[repr(C)]
pub struct FfiHttpRequest {
    pub method: FfiHttpMethod,
    pub path: *mut c_char,
    pub headers: *mut FfiHeader,
    pub headers_len: u32,
    pub body: *mut c_char,
}

impl FfiHttpRequest {
    pub(crate) fn from_core(req: aischool_core::HttpRequest) -> *mut Self {
        let headers: Vec<FfiHeader> = req
            .headers
            .into_iter()
            .map(|(key, value)| FfiHeader {
                key: c_string(key),
                value: c_string(value),
            })
            .collect();
        let (headers, headers_len) = into_raw_array(headers);

        Box::into_raw(Box::new(FfiHttpRequest {
            method: req.method.into(),
            path: c_string(req.path),
            headers,
            headers_len,
            body: c_string_opt(req.body),
        }))
    }

    pub(crate) unsafe fn release(req: *mut Self) {
        let req = unsafe { Box::from_raw(req) };
        unsafe {
            free_c_string(req.path);
            free_c_string(req.body);
            for header in from_raw_array(req.headers, req.headers_len) {
                free_c_string(header.key);
                free_c_string(header.value);
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Response input (caller-provided, not heap-allocated by us)
// ---------------------------------------------------------------------------

/// An HTTP response described as C-compatible plain data.
///
/// The host constructs this after executing a request and passes a pointer
/// to an `aischool_parse_*` function. The FFI layer reads but does not free
/// these fields. A null `body` is an empty body.
#[repr(C)]
pub struct FfiHttpResponse {
    pub status: u16,
    pub body: *const c_char,
}

// ---------------------------------------------------------------------------
// Result types
// ---------------------------------------------------------------------------

/// Error codes returned in `FfiApiResult` and by the session functions.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FfiErrorCode {
    Ok = 0,
    NetworkUnavailable = 1,
    Unauthorized = 2,
    Conflict = 3,
    NotFound = 4,
    ValidationFailed = 5,
    ServerError = 6,
    Serialization = 7,
    Session = 8,
    Panic = 9,
    NullArg = 10,
}

impl From<&ApiError> for FfiErrorCode {
    fn from(err: &ApiError) -> Self {
        match err {
            ApiError::NetworkUnavailable(_) => FfiErrorCode::NetworkUnavailable,
            ApiError::Unauthorized(_) => FfiErrorCode::Unauthorized,
            ApiError::Conflict(_) => FfiErrorCode::Conflict,
            ApiError::NotFound(_) => FfiErrorCode::NotFound,
            ApiError::ValidationFailed { .. } => FfiErrorCode::ValidationFailed,
            ApiError::ServerError { .. } => FfiErrorCode::ServerError,
            ApiError::Serialization(_) => FfiErrorCode::Serialization,
        }
    }
}

/// Tag that tells `aischool_free_result` what `FfiApiResult::data` points to.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FfiDataTag {
    None = 0,
    /// `data` is a `char*`.
    Message = 1,
    Auth = 2,
    User = 3,
    Profile = 4,
    ProfileList = 5,
    Deletion = 6,
}

#[repr(C)]
pub struct FfiUser {
    pub id: *mut c_char,
    pub email: *mut c_char,
    pub full_name: *mut c_char,
    pub phone_number: *mut c_char,
    pub created_at: *mut c_char,
    pub last_login: *mut c_char,
}

impl FfiUser {
    fn from_core(user: UserInfo) -> Self {
        Self {
            id: c_string_opt(user.id),
            email: c_string(user.email),
            full_name: c_string(user.full_name),
            phone_number: c_string_opt(user.phone_number),
            created_at: c_string_opt(user.created_at),
            last_login: c_string_opt(user.last_login),
        }
    }

    unsafe fn free_fields(&self) {
        unsafe {
            free_c_string(self.id);
            free_c_string(self.email);
            free_c_string(self.full_name);
            free_c_string(self.phone_number);
            free_c_string(self.created_at);
            free_c_string(self.last_login);
        }
    }
}

/// Register/login outcome. `user` is null when the server sent none.
#[repr(C)]
pub struct FfiAuth {
    pub token: *mut c_char,
    pub message: *mut c_char,
    pub user: *mut FfiUser,
}

/// A child profile. Server-assigned fields are null until assigned.
#[repr(C)]
pub struct FfiChildProfile {
    pub id: *mut c_char,
    pub name: *mut c_char,
    pub age: u32,
    pub grade: *mut c_char,
    pub avatar: *mut c_char,
    pub learning_goals: *mut c_char,
    pub progress: *mut c_char,
    pub created_at: *mut c_char,
    pub last_activity: *mut c_char,
}

impl FfiChildProfile {
    fn from_core(profile: ChildProfile) -> Self {
        Self {
            id: c_string_opt(profile.id.map(|id| id.to_string())),
            name: c_string(profile.name),
            age: profile.age,
            grade: c_string(profile.grade),
            avatar: c_string(profile.avatar),
            learning_goals: c_string(profile.learning_goals),
            progress: c_string_opt(profile.progress),
            created_at: c_string_opt(profile.created_at),
            last_activity: c_string_opt(profile.last_activity),
        }
    }

    unsafe fn free_fields(&self) {
        unsafe {
            free_c_string(self.id);
            free_c_string(self.name);
            free_c_string(self.grade);
            free_c_string(self.avatar);
            free_c_string(self.learning_goals);
            free_c_string(self.progress);
            free_c_string(self.created_at);
            free_c_string(self.last_activity);
        }
    }
}

/// Profiles in server order. `count` is the server's reported total.
#[repr(C)]
pub struct FfiProfileList {
    pub items: *mut FfiChildProfile,
    pub len: u32,
    pub count: u32,
}

#[repr(C)]
pub struct FfiDeletion {
    pub status: *mut c_char,
    pub message: *mut c_char,
}

/// Result envelope for all parse operations.
///
/// On success `error_code` is `Ok`, `error_message` is null, and `data`
/// points to the parsed payload (tagged by `data_tag`).
/// On failure `error_code` describes the category, `error_message` is a
/// human-readable C string, `http_status` is the status that produced it
/// (0 when none), and `data` is null.
#[repr(C)]
pub struct FfiApiResult {
    pub error_code: FfiErrorCode,
    pub error_message: *mut c_char,
    pub http_status: u16,
    pub data_tag: FfiDataTag,
    pub data: *mut c_void,
}

impl FfiApiResult {
    fn ok(data_tag: FfiDataTag, data: *mut c_void) -> *mut Self {
        Box::into_raw(Box::new(FfiApiResult {
            error_code: FfiErrorCode::Ok,
            error_message: ptr::null_mut(),
            http_status: 0,
            data_tag,
            data,
        }))
    }

    fn failure(error_code: FfiErrorCode, http_status: u16, message: String) -> *mut Self {
        Box::into_raw(Box::new(FfiApiResult {
            error_code,
            error_message: c_string(message),
            http_status,
            data_tag: FfiDataTag::None,
            data: ptr::null_mut(),
        }))
    }

    pub(crate) fn ok_empty() -> *mut Self {
        Self::ok(FfiDataTag::None, ptr::null_mut())
    }

    pub(crate) fn ok_message(message: String) -> *mut Self {
        Self::ok(FfiDataTag::Message, c_string(message).cast())
    }

    pub(crate) fn ok_auth(grant: AuthGrant) -> *mut Self {
        let user = grant
            .user
            .map_or(ptr::null_mut(), |u| Box::into_raw(Box::new(FfiUser::from_core(u))));
        let auth = Box::new(FfiAuth {
            token: c_string(grant.token),
            message: c_string_opt(grant.message),
            user,
        });
        Self::ok(FfiDataTag::Auth, Box::into_raw(auth).cast())
    }

    pub(crate) fn ok_user(user: UserInfo) -> *mut Self {
        let user = Box::new(FfiUser::from_core(user));
        Self::ok(FfiDataTag::User, Box::into_raw(user).cast())
    }

    pub(crate) fn ok_profile(profile: ChildProfile) -> *mut Self {
        let profile = Box::new(FfiChildProfile::from_core(profile));
        Self::ok(FfiDataTag::Profile, Box::into_raw(profile).cast())
    }

    pub(crate) fn ok_profile_list(list: ProfileList) -> *mut Self {
        let count = list.count as u32;
        let items: Vec<FfiChildProfile> = list
            .profiles
            .into_iter()
            .map(FfiChildProfile::from_core)
            .collect();
        let (items, len) = into_raw_array(items);
        let list = Box::new(FfiProfileList { items, len, count });
        Self::ok(FfiDataTag::ProfileList, Box::into_raw(list).cast())
    }

    pub(crate) fn ok_deletion(deletion: Deletion) -> *mut Self {
        let deletion = Box::new(FfiDeletion {
            status: c_string_opt(deletion.status),
            message: c_string_opt(deletion.message),
        });
        Self::ok(FfiDataTag::Deletion, Box::into_raw(deletion).cast())
    }

    pub(crate) fn from_error(err: ApiError) -> *mut Self {
        let code = FfiErrorCode::from(&err);
        let http_status = err.status().unwrap_or(0);
        let message = match &err {
            ApiError::NetworkUnavailable(m)
            | ApiError::Unauthorized(m)
            | ApiError::Conflict(m)
            | ApiError::NotFound(m)
            | ApiError::Serialization(m) => m.clone(),
            ApiError::ValidationFailed { message, .. } | ApiError::ServerError { message, .. } => {
                message.clone()
            }
        };
        Self::failure(code, http_status, message)
    }

    pub(crate) fn null_arg(name: &str) -> *mut Self {
        Self::failure(FfiErrorCode::NullArg, 0, format!("null argument: {name}"))
    }

    pub(crate) fn panic(msg: &str) -> *mut Self {
        Self::failure(FfiErrorCode::Panic, 0, msg.to_string())
    }

    /// Free the envelope and whatever `data_tag` says `data` holds.
    pub(crate) unsafe fn release(result: *mut Self) {
        let result = unsafe { Box::from_raw(result) };
        unsafe { free_c_string(result.error_message) };
        if result.data.is_null() {
            return;
        }
        unsafe {
            match result.data_tag {
                FfiDataTag::None => {}
                FfiDataTag::Message => free_c_string(result.data.cast()),
                FfiDataTag::Auth => {
                    let auth = Box::from_raw(result.data.cast::<FfiAuth>());
                    free_c_string(auth.token);
                    free_c_string(auth.message);
                    if !auth.user.is_null() {
                        Box::from_raw(auth.user).free_fields();
                    }
                }
                FfiDataTag::User => Box::from_raw(result.data.cast::<FfiUser>()).free_fields(),
                FfiDataTag::Profile => {
                    Box::from_raw(result.data.cast::<FfiChildProfile>()).free_fields()
                }
                FfiDataTag::ProfileList => {
                    let list = Box::from_raw(result.data.cast::<FfiProfileList>());
                    for item in from_raw_array(list.items, list.len) {
                        item.free_fields();
                    }
                }
                FfiDataTag::Deletion => {
                    let deletion = Box::from_raw(result.data.cast::<FfiDeletion>());
                    free_c_string(deletion.status);
                    free_c_string(deletion.message);
                }
            }
        }
    }
}
