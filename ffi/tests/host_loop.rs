//! Drive the C ABI the way a mobile host does: build a request, execute it
//! on the host's own HTTP stack (ureq here), hand the response back to parse.

use std::ffi::{CStr, CString};
use std::os::raw::c_char;
use std::ptr;

use aischool_ffi::types::{
    FfiApiClient, FfiApiResult, FfiAuth, FfiChildProfile, FfiDataTag, FfiErrorCode, FfiHttpMethod,
    FfiHttpRequest, FfiHttpResponse, FfiProfileList,
};
use aischool_ffi::*;

fn start_server() -> String {
    let std_listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = std_listener.local_addr().unwrap();
    std_listener.set_nonblocking(true).unwrap();

    std::thread::spawn(move || {
        let rt = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .unwrap();
        rt.block_on(async {
            let listener = tokio::net::TcpListener::from_std(std_listener).unwrap();
            mock_server::run(listener).await
        })
        .unwrap();
    });

    format!("http://{addr}")
}

fn text(s: *const c_char) -> String {
    unsafe { CStr::from_ptr(s) }.to_str().unwrap().to_string()
}

/// Execute an `FfiHttpRequest` and return the status and body, then free it.
///
/// Disables ureq's automatic status-code-as-error behavior so 4xx/5xx
/// responses come back as data for the parse functions to classify.
fn execute(req: *mut FfiHttpRequest) -> (u16, CString) {
    assert!(!req.is_null(), "build returned null");
    let agent = ureq::Agent::config_builder()
        .http_status_as_error(false)
        .build()
        .new_agent();

    let r = unsafe { &*req };
    let path = text(r.path);
    let headers: Vec<(String, String)> = if r.headers.is_null() {
        Vec::new()
    } else {
        unsafe { std::slice::from_raw_parts(r.headers, r.headers_len as usize) }
            .iter()
            .map(|h| (text(h.key), text(h.value)))
            .collect()
    };
    let body = (!r.body.is_null()).then(|| text(r.body));

    let mut response = match r.method {
        FfiHttpMethod::Get | FfiHttpMethod::Delete => {
            let mut builder = if r.method == FfiHttpMethod::Get {
                agent.get(&path)
            } else {
                agent.delete(&path)
            };
            for (k, v) in &headers {
                builder = builder.header(k.as_str(), v.as_str());
            }
            builder.call()
        }
        FfiHttpMethod::Post | FfiHttpMethod::Put => {
            let mut builder = if r.method == FfiHttpMethod::Post {
                agent.post(&path)
            } else {
                agent.put(&path)
            };
            for (k, v) in &headers {
                builder = builder.header(k.as_str(), v.as_str());
            }
            match &body {
                Some(b) => builder.send(b.as_bytes()),
                None => builder.send_empty(),
            }
        }
    }
    .expect("HTTP transport error");
    aischool_free_request(req);

    let status = response.status().as_u16();
    let body = response.body_mut().read_to_string().unwrap_or_default();
    (status, CString::new(body).unwrap())
}

fn roundtrip(
    req: *mut FfiHttpRequest,
    client: *const FfiApiClient,
    parse: extern "C" fn(*const FfiApiClient, *const FfiHttpResponse) -> *mut FfiApiResult,
) -> *mut FfiApiResult {
    let (status, body) = execute(req);
    let resp = FfiHttpResponse {
        status,
        body: body.as_ptr(),
    };
    parse(client, &resp)
}

#[test]
fn host_drives_full_lifecycle() {
    let base = CString::new(start_server()).unwrap();
    let client = aischool_client_new(base.as_ptr());
    assert!(!client.is_null());

    // health
    let result = roundtrip(aischool_build_health_check(client, ptr::null_mut()), client, aischool_parse_health_check);
    let r = unsafe { &*result };
    assert_eq!(r.error_code, FfiErrorCode::Ok);
    assert_eq!(text(r.data as *const c_char), "AI School Backend Server is running");
    aischool_free_result(result);

    // register and keep the token in the session store
    let email = CString::new("host@example.com").unwrap();
    let password = CString::new("secret1").unwrap();
    let name = CString::new("Host Parent").unwrap();
    let phone = CString::new("555-0100").unwrap();
    let req = aischool_build_register(client, email.as_ptr(), password.as_ptr(), name.as_ptr(), phone.as_ptr(), ptr::null_mut());
    let result = roundtrip(req, client, aischool_parse_register);
    let r = unsafe { &*result };
    assert_eq!(r.error_code, FfiErrorCode::Ok);
    assert_eq!(r.data_tag, FfiDataTag::Auth);
    let auth = unsafe { &*(r.data as *const FfiAuth) };
    let token = CString::new(text(auth.token)).unwrap();
    aischool_free_result(result);

    let dir = tempfile::tempdir().unwrap();
    let dir_c = CString::new(dir.path().to_str().unwrap()).unwrap();
    let store = aischool_session_open(dir_c.as_ptr(), ptr::null());
    assert_eq!(aischool_session_save(store, token.as_ptr()), FfiErrorCode::Ok);

    // registering twice conflicts
    let req = aischool_build_register(client, email.as_ptr(), password.as_ptr(), name.as_ptr(), phone.as_ptr(), ptr::null_mut());
    let result = roundtrip(req, client, aischool_parse_register);
    let r = unsafe { &*result };
    assert_eq!(r.error_code, FfiErrorCode::Conflict);
    assert_eq!(r.http_status, 409);
    aischool_free_result(result);

    // create a profile
    let child = CString::new("Ada").unwrap();
    let grade = CString::new("3rd").unwrap();
    let req = aischool_build_create_profile(
        client,
        token.as_ptr(),
        child.as_ptr(),
        8,
        grade.as_ptr(),
        ptr::null(),
        ptr::null(),
        ptr::null_mut(),
    );
    let result = roundtrip(req, client, aischool_parse_create_profile);
    let r = unsafe { &*result };
    assert_eq!(r.error_code, FfiErrorCode::Ok);
    let profile = unsafe { &*(r.data as *const FfiChildProfile) };
    let id = CString::new(text(profile.id)).unwrap();
    assert_eq!(text(profile.avatar), "default");
    aischool_free_result(result);

    // list shows it
    let result = roundtrip(aischool_build_list_profiles(client, token.as_ptr(), ptr::null_mut()), client, aischool_parse_list_profiles);
    let r = unsafe { &*result };
    let list = unsafe { &*(r.data as *const FfiProfileList) };
    assert_eq!(list.len, 1);
    assert_eq!(list.count, 1);
    aischool_free_result(result);

    // delete, then get is NotFound
    let req = aischool_build_delete_profile(client, token.as_ptr(), id.as_ptr(), ptr::null_mut());
    let result = roundtrip(req, client, aischool_parse_delete_profile);
    let r = unsafe { &*result };
    assert_eq!(r.data_tag, FfiDataTag::Deletion);
    aischool_free_result(result);

    let req = aischool_build_get_profile(client, token.as_ptr(), id.as_ptr(), ptr::null_mut());
    let result = roundtrip(req, client, aischool_parse_get_profile);
    let r = unsafe { &*result };
    assert_eq!(r.error_code, FfiErrorCode::NotFound);
    aischool_free_result(result);

    // logout and forget the token
    let result = roundtrip(aischool_build_logout(client, token.as_ptr(), ptr::null_mut()), client, aischool_parse_logout);
    let r = unsafe { &*result };
    assert_eq!(r.error_code, FfiErrorCode::Ok);
    aischool_free_result(result);
    assert_eq!(aischool_session_clear(store), FfiErrorCode::Ok);

    let mut stored: *mut c_char = ptr::null_mut();
    assert_eq!(aischool_session_load(store, &mut stored), FfiErrorCode::Ok);
    assert!(stored.is_null());

    aischool_session_free(store);
    aischool_client_free(client);
}

#[test]
fn host_sees_unauthorized_for_bad_token() {
    let base = CString::new(start_server()).unwrap();
    let client = aischool_client_new(base.as_ptr());
    let token = CString::new("forged").unwrap();

    let result = roundtrip(aischool_build_current_user(client, token.as_ptr(), ptr::null_mut()), client, aischool_parse_current_user);
    let r = unsafe { &*result };
    assert_eq!(r.error_code, FfiErrorCode::Unauthorized);
    assert_eq!(r.http_status, 401);
    assert_eq!(text(r.error_message), "Invalid or expired token");
    aischool_free_result(result);

    aischool_client_free(client);
}
