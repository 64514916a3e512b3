//! C-ABI wrapper around `cpv-core`.
//!
//! # Overview
//! Exposes receipt submission and cancellation through `extern "C"` functions
//! so any language with a C FFI can validate input, build HTTP requests, and
//! classify responses without linking an HTTP stack from Rust. The host
//! executes each request with its own HTTP client.
//!
//! # Design
//! - Every `extern "C"` function wraps its body in `catch_unwind` so panics
//!   never cross the FFI boundary.
//! - Fallible calls return one `FfiCpvResult` envelope whose `error_code`
//!   mirrors the five error kinds, so C callers branch on an integer instead
//!   of comparing error names.
//! - The C caller owns all returned pointers and must call the matching
//!   `cpv_free_*` function to release them.

pub mod types;

use std::ffi::{CStr, CString};
use std::os::raw::c_char;
use std::panic::catch_unwind;
use std::str::Utf8Error;

use cpv_core::config::{API_KEY_ENV, API_URL_ENV};
use cpv_core::{classify, ClientConfig, CpvClient, HttpResponse, Operation};

use types::*;

/// Borrow a C string as `&str`. Null reads as empty.
///
/// # Safety
/// `ptr` must be null or point to a NUL-terminated string that outlives the
/// returned reference.
unsafe fn str_arg<'a>(ptr: *const c_char) -> Result<&'a str, Utf8Error> {
    if ptr.is_null() {
        return Ok("");
    }
    unsafe { CStr::from_ptr(ptr) }.to_str()
}

/// Like `str_arg`, but null and empty read as `None`.
///
/// # Safety
/// Same contract as `str_arg`.
unsafe fn opt_string_arg(ptr: *const c_char) -> Result<Option<String>, Utf8Error> {
    let s = unsafe { str_arg(ptr) }?;
    Ok((!s.is_empty()).then(|| s.to_string()))
}

/// Read a response body. Null reads as empty; invalid UTF-8 is replaced.
///
/// # Safety
/// Same contract as `str_arg`.
unsafe fn body_arg(ptr: *const c_char) -> String {
    if ptr.is_null() {
        return String::new();
    }
    String::from_utf8_lossy(unsafe { CStr::from_ptr(ptr) }.to_bytes()).into_owned()
}

// ---------------------------------------------------------------------------
// Client lifecycle
// ---------------------------------------------------------------------------

/// Create a client. Null `api_key` / `base_url` fall back to `CPV_API_KEY` /
/// `CPV_API_URL`, then to the production endpoint for the URL.
///
/// On success `*out_client` receives a client the caller must free with
/// `cpv_client_free`. On failure `*out_client` is left untouched and the
/// result carries `Unauthorized` (no key) or `Validation` (malformed key).
#[unsafe(no_mangle)]
pub extern "C" fn cpv_client_new(
    api_key: *const c_char,
    base_url: *const c_char,
    out_client: *mut *mut FfiCpvClient,
) -> *mut FfiCpvResult {
    catch_unwind(|| {
        if out_client.is_null() {
            return FfiCpvResult::null_arg("out_client");
        }
        let Ok(explicit_key) = (unsafe { opt_string_arg(api_key) }) else {
            return FfiCpvResult::invalid_utf8("api_key");
        };
        let Ok(url) = (unsafe { opt_string_arg(base_url) }) else {
            return FfiCpvResult::invalid_utf8("base_url");
        };
        let url = url.or_else(|| std::env::var(API_URL_ENV).ok());
        let config = match ClientConfig::resolve(
            explicit_key.as_deref(),
            std::env::var(API_KEY_ENV).ok(),
            url,
        ) {
            Ok(config) => config,
            Err(e) => return FfiCpvResult::from_error(e, 0),
        };
        let client = Box::new(FfiCpvClient {
            inner: CpvClient::new(config),
        });
        unsafe { *out_client = Box::into_raw(client) };
        FfiCpvResult::ok_empty()
    })
    .unwrap_or_else(|_| FfiCpvResult::panic("panic in cpv_client_new"))
}

/// Free a client created by `cpv_client_new`. Safe to call with null.
#[unsafe(no_mangle)]
pub extern "C" fn cpv_client_free(client: *mut FfiCpvClient) {
    if !client.is_null() {
        let _ = catch_unwind(|| {
            drop(unsafe { Box::from_raw(client) });
        });
    }
}

// ---------------------------------------------------------------------------
// Build request functions
// ---------------------------------------------------------------------------

/// Validate a submission and build its upload request.
///
/// `xml` is the base64 receipt XML, `cpf` the customer CPF (punctuation
/// allowed). Null strings count as empty; strings that are not UTF-8 yield
/// `InvalidUtf8`. On success `*out_request` receives
/// a request the caller must free with `cpv_free_request`.
#[unsafe(no_mangle)]
pub extern "C" fn cpv_build_submit(
    client: *const FfiCpvClient,
    xml: *const c_char,
    cpf: *const c_char,
    out_request: *mut *mut FfiHttpRequest,
) -> *mut FfiCpvResult {
    catch_unwind(|| {
        if client.is_null() {
            return FfiCpvResult::null_arg("client");
        }
        if out_request.is_null() {
            return FfiCpvResult::null_arg("out_request");
        }
        let client = unsafe { &*client };
        let Ok(xml) = (unsafe { str_arg(xml) }) else {
            return FfiCpvResult::invalid_utf8("xml");
        };
        let Ok(cpf) = (unsafe { str_arg(cpf) }) else {
            return FfiCpvResult::invalid_utf8("cpf");
        };
        match client.inner.build_submit(xml, cpf) {
            Ok(req) => {
                unsafe { *out_request = FfiHttpRequest::from_core(req) };
                FfiCpvResult::ok_empty()
            }
            Err(e) => FfiCpvResult::from_error(e, 0),
        }
    })
    .unwrap_or_else(|_| FfiCpvResult::panic("panic in cpv_build_submit"))
}

/// Validate a receipt key and build its cancellation request.
///
/// A null `key` counts as empty.
#[unsafe(no_mangle)]
pub extern "C" fn cpv_build_cancel(
    client: *const FfiCpvClient,
    key: *const c_char,
    out_request: *mut *mut FfiHttpRequest,
) -> *mut FfiCpvResult {
    catch_unwind(|| {
        if client.is_null() {
            return FfiCpvResult::null_arg("client");
        }
        if out_request.is_null() {
            return FfiCpvResult::null_arg("out_request");
        }
        let client = unsafe { &*client };
        let Ok(key) = (unsafe { str_arg(key) }) else {
            return FfiCpvResult::invalid_utf8("key");
        };
        match client.inner.build_cancel(key) {
            Ok(req) => {
                unsafe { *out_request = FfiHttpRequest::from_core(req) };
                FfiCpvResult::ok_empty()
            }
            Err(e) => FfiCpvResult::from_error(e, 0),
        }
    })
    .unwrap_or_else(|_| FfiCpvResult::panic("panic in cpv_build_cancel"))
}

// ---------------------------------------------------------------------------
// Parse response functions
// ---------------------------------------------------------------------------

/// Convert an `FfiHttpResponse`; `None` when no response was received.
fn ffi_response_to_core(resp: &FfiHttpResponse) -> Option<HttpResponse> {
    if resp.status == 0 {
        return None;
    }
    let body = unsafe { body_arg(resp.body) };
    Some(HttpResponse::new(resp.status, body))
}

/// Parse the response of an upload request.
///
/// Returns `data_tag = Receipt` on success.
#[unsafe(no_mangle)]
pub extern "C" fn cpv_parse_submit(
    client: *const FfiCpvClient,
    response: *const FfiHttpResponse,
) -> *mut FfiCpvResult {
    catch_unwind(|| {
        if client.is_null() {
            return FfiCpvResult::null_arg("client");
        }
        if response.is_null() {
            return FfiCpvResult::null_arg("response");
        }
        let client = unsafe { &*client };
        let resp = unsafe { &*response };
        let Some(core_resp) = ffi_response_to_core(resp) else {
            return FfiCpvResult::from_error(classify(Operation::Submit, None), 0);
        };
        let status = core_resp.status;
        match client.inner.parse_submit(core_resp) {
            Ok(result) => FfiCpvResult::ok_receipt(result),
            Err(e) => FfiCpvResult::from_error(e, status),
        }
    })
    .unwrap_or_else(|_| FfiCpvResult::panic("panic in cpv_parse_submit"))
}

/// Parse the response of a cancellation request.
///
/// Returns `data_tag = None` on success.
#[unsafe(no_mangle)]
pub extern "C" fn cpv_parse_cancel(
    client: *const FfiCpvClient,
    response: *const FfiHttpResponse,
) -> *mut FfiCpvResult {
    catch_unwind(|| {
        if client.is_null() {
            return FfiCpvResult::null_arg("client");
        }
        if response.is_null() {
            return FfiCpvResult::null_arg("response");
        }
        let client = unsafe { &*client };
        let resp = unsafe { &*response };
        let Some(core_resp) = ffi_response_to_core(resp) else {
            return FfiCpvResult::from_error(classify(Operation::Cancel, None), 0);
        };
        let status = core_resp.status;
        match client.inner.parse_cancel(core_resp) {
            Ok(()) => FfiCpvResult::ok_empty(),
            Err(e) => FfiCpvResult::from_error(e, status),
        }
    })
    .unwrap_or_else(|_| FfiCpvResult::panic("panic in cpv_parse_cancel"))
}

// ---------------------------------------------------------------------------
// Free functions
// ---------------------------------------------------------------------------

/// Free an `FfiHttpRequest` returned through `cpv_build_*`. Safe to call with null.
#[unsafe(no_mangle)]
pub extern "C" fn cpv_free_request(req: *mut FfiHttpRequest) {
    if req.is_null() {
        return;
    }
    let _ = catch_unwind(|| {
        let req = unsafe { Box::from_raw(req) };
        free_c_string(req.url);
        free_c_string(req.body);
        if !req.headers.is_null() && req.headers_len > 0 {
            let headers = unsafe {
                Box::from_raw(std::ptr::slice_from_raw_parts_mut(
                    req.headers,
                    req.headers_len as usize,
                ))
            };
            for h in headers.iter() {
                free_c_string(h.key);
                free_c_string(h.value);
            }
        }
    });
}

/// Free an `FfiCpvResult`. Safe to call with null. Uses `data_tag` to
/// determine what `data` points to.
#[unsafe(no_mangle)]
pub extern "C" fn cpv_free_result(result: *mut FfiCpvResult) {
    if result.is_null() {
        return;
    }
    let _ = catch_unwind(|| {
        let result = unsafe { Box::from_raw(result) };
        free_c_string(result.error_message);
        if !result.data.is_null() {
            match result.data_tag {
                FfiDataTag::Receipt => {
                    let receipt = unsafe { Box::from_raw(result.data as *mut FfiReceipt) };
                    free_c_string(receipt.key);
                    free_c_string(receipt.print_mode_raw);
                    free_c_string(receipt.message);
                    free_c_string(receipt.json);
                }
                FfiDataTag::None => {}
            }
        }
    });
}

/// Free a C string allocated by this library. Safe to call with null.
#[unsafe(no_mangle)]
pub extern "C" fn cpv_free_string(s: *mut c_char) {
    if !s.is_null() {
        let _ = catch_unwind(|| free_c_string(s));
    }
}

fn free_c_string(s: *mut c_char) {
    if !s.is_null() {
        drop(unsafe { CString::from_raw(s) });
    }
}

// ---------------------------------------------------------------------------
// Unit tests
// ---------------------------------------------------------------------------
