//! `#[repr(C)]` types for the FFI boundary.
//!
//! # Design
//! Each type mirrors a core type but uses C-compatible representations:
//! `*mut c_char` instead of `String`, raw pointers instead of `Vec`, and
//! enums with explicit discriminants. Conversion functions live here to keep
//! `lib.rs` focused on the `extern "C"` surface.

use std::ffi::CString;
use std::os::raw::c_char;

use cpv_core::{CpvError, HttpMethod, HttpRequest, PrintMode, SubmitReceiptResult};

/// Opaque handle to a `CpvClient`. C callers receive a pointer to this and
/// pass it back into every FFI function.
pub struct FfiCpvClient {
    pub(crate) inner: cpv_core::CpvClient,
}

/// Heap-allocate a C string. Interior NULs yield an empty string.
pub(crate) fn to_c_string(s: impl Into<Vec<u8>>) -> *mut c_char {
    CString::new(s).unwrap_or_default().into_raw()
}

/// Like `to_c_string`, but `None` becomes null.
fn to_opt_c_string(s: Option<&str>) -> *mut c_char {
    s.map_or(std::ptr::null_mut(), |s| to_c_string(s))
}

// ---------------------------------------------------------------------------
// Request types
// ---------------------------------------------------------------------------

/// HTTP method as a C enum.
#[repr(C)]
pub enum FfiHttpMethod {
    Post = 0,
}

impl From<HttpMethod> for FfiHttpMethod {
    fn from(m: HttpMethod) -> Self {
        match m {
            HttpMethod::Post => FfiHttpMethod::Post,
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
/// Produced by `cpv_build_*`. The C caller executes the request and passes
/// the response back through `cpv_parse_*`.
#[repr(C)]
pub struct FfiHttpRequest {
    pub method: FfiHttpMethod,
    pub url: *mut c_char,
    pub headers: *mut FfiHeader,
    pub headers_len: u32,
    pub body: *mut c_char,
}

impl FfiHttpRequest {
    /// Convert a core `HttpRequest` into a heap-allocated `FfiHttpRequest`.
    pub(crate) fn from_core(req: HttpRequest) -> *mut Self {
        let url = to_c_string(req.url);
        let body = match req.body {
            Some(b) => to_c_string(b),
            None => std::ptr::null_mut(),
        };

        let headers_len = req.headers.len() as u32;
        let headers = if req.headers.is_empty() {
            std::ptr::null_mut()
        } else {
            let ffi_headers: Box<[FfiHeader]> = req
                .headers
                .into_iter()
                .map(|(k, v)| FfiHeader {
                    key: to_c_string(k),
                    value: to_c_string(v),
                })
                .collect();
            Box::into_raw(ffi_headers) as *mut FfiHeader
        };

        Box::into_raw(Box::new(FfiHttpRequest {
            method: req.method.into(),
            url,
            headers,
            headers_len,
            body,
        }))
    }
}

// ---------------------------------------------------------------------------
// Response input (caller-provided, not heap-allocated by us)
// ---------------------------------------------------------------------------

/// An HTTP response described as C-compatible plain data.
///
/// `status == 0` means no response was received (network failure or
/// timeout). The FFI layer reads but does not free these fields.
#[repr(C)]
pub struct FfiHttpResponse {
    pub status: u16,
    pub body: *const c_char,
}

// ---------------------------------------------------------------------------
// Result types
// ---------------------------------------------------------------------------

/// Error codes returned in `FfiCpvResult`.
#[repr(C)]
#[derive(Debug, PartialEq, Eq)]
pub enum FfiErrorCode {
    Ok = 0,
    Unauthorized = 1,
    NotFound = 2,
    Conflict = 3,
    Validation = 4,
    Unexpected = 5,
    Panic = 6,
    NullArg = 7,
    InvalidUtf8 = 8,
}

/// Tag that tells `cpv_free_result` what `FfiCpvResult::data` points to.
#[repr(C)]
#[derive(Debug, PartialEq, Eq)]
pub enum FfiDataTag {
    None = 0,
    Receipt = 1,
}

/// Print instruction for a submitted receipt.
#[repr(C)]
#[derive(Debug, PartialEq, Eq)]
pub enum FfiPrintMode {
    DoNotPrint = 0,
    Reduced = 1,
    /// Unknown to this library version; see `FfiReceipt::print_mode_raw`.
    Other = 2,
    /// The service sent no usable `impressao`.
    Missing = 3,
}

/// Successful submission exposed to C.
///
/// `key`, `print_mode_raw` and `message` are null when the service left the
/// field out or sent a non-string. `json` always holds the full body.
#[repr(C)]
pub struct FfiReceipt {
    pub key: *mut c_char,
    pub print_mode: FfiPrintMode,
    pub print_mode_raw: *mut c_char,
    pub message: *mut c_char,
    /// The service response body, re-serialized as JSON.
    pub json: *mut c_char,
}

impl FfiReceipt {
    fn from_core(result: SubmitReceiptResult) -> Self {
        let json = serde_json::to_string(result.as_json()).unwrap_or_default();
        let mode = result.print_mode();
        let print_mode = match &mode {
            Some(PrintMode::DoNotPrint) => FfiPrintMode::DoNotPrint,
            Some(PrintMode::Reduced) => FfiPrintMode::Reduced,
            Some(PrintMode::Other(_)) => FfiPrintMode::Other,
            None => FfiPrintMode::Missing,
        };
        FfiReceipt {
            key: to_opt_c_string(result.key()),
            print_mode,
            print_mode_raw: to_opt_c_string(mode.as_ref().map(PrintMode::as_str)),
            message: to_opt_c_string(result.message()),
            json: to_c_string(json),
        }
    }
}

/// Result envelope for every fallible operation.
///
/// On success `error_code` is `Ok`, `error_message` is null, and `data`
/// points to the payload tagged by `data_tag` (or is null).
/// On failure `error_code` names the kind, `error_message` holds the message
/// from the service or local validation (null when there is none), and
/// `http_status` is the status that was classified (0 when not applicable).
#[repr(C)]
pub struct FfiCpvResult {
    pub error_code: FfiErrorCode,
    pub error_message: *mut c_char,
    pub http_status: u16,
    pub data_tag: FfiDataTag,
    pub data: *mut std::ffi::c_void,
}

impl FfiCpvResult {
    fn boxed(error_code: FfiErrorCode, error_message: *mut c_char, http_status: u16) -> *mut Self {
        Box::into_raw(Box::new(FfiCpvResult {
            error_code,
            error_message,
            http_status,
            data_tag: FfiDataTag::None,
            data: std::ptr::null_mut(),
        }))
    }

    /// Build a success result with no payload.
    pub(crate) fn ok_empty() -> *mut Self {
        Self::boxed(FfiErrorCode::Ok, std::ptr::null_mut(), 0)
    }

    /// Build a success result carrying an `FfiReceipt`.
    pub(crate) fn ok_receipt(result: SubmitReceiptResult) -> *mut Self {
        let receipt = Box::new(FfiReceipt::from_core(result));
        Box::into_raw(Box::new(FfiCpvResult {
            error_code: FfiErrorCode::Ok,
            error_message: std::ptr::null_mut(),
            http_status: 0,
            data_tag: FfiDataTag::Receipt,
            data: Box::into_raw(receipt) as *mut std::ffi::c_void,
        }))
    }

    /// Build an error result from a `CpvError`.
    pub(crate) fn from_error(err: CpvError, http_status: u16) -> *mut Self {
        let error_code = match &err {
            CpvError::Unauthorized(_) => FfiErrorCode::Unauthorized,
            CpvError::NotFound(_) => FfiErrorCode::NotFound,
            CpvError::Conflict(_) => FfiErrorCode::Conflict,
            CpvError::Validation(_) => FfiErrorCode::Validation,
            CpvError::Unexpected(_) => FfiErrorCode::Unexpected,
        };
        let message = match err.message() {
            Some(m) => to_c_string(m),
            None => std::ptr::null_mut(),
        };
        Self::boxed(error_code, message, http_status)
    }

    /// Build an error result for a null argument.
    pub(crate) fn null_arg(name: &str) -> *mut Self {
        Self::boxed(FfiErrorCode::NullArg, to_c_string(format!("null argument: {name}")), 0)
    }

    /// Build an error result for a string argument that is not UTF-8.
    pub(crate) fn invalid_utf8(name: &str) -> *mut Self {
        Self::boxed(
            FfiErrorCode::InvalidUtf8,
            to_c_string(format!("argument is not valid UTF-8: {name}")),
            0,
        )
    }

    /// Build an error result for a caught panic.
    pub(crate) fn panic(msg: &str) -> *mut Self {
        Self::boxed(FfiErrorCode::Panic, to_c_string(msg), 0)
    }
}
