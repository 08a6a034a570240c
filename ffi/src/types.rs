//! `#[repr(C)]` types for the FFI boundary.
//!
//! # Design
//! Input types (`FfiRequestSpec`, `FfiHeaderRef`) borrow caller memory and
//! are never freed here. Output types (`FfiResponseResult`, `FfiHeaderList`)
//! are allocated by this library and released by the matching
//! `fetch_free_*` function. Header arrays are boxed slices so that the
//! pointer and length alone are enough to reclaim them.

use std::ffi::{CStr, CString};
use std::os::raw::c_char;

use fetch_core::{Headers, RequestSpec, ResponseResult};

/// Opaque handle to a `Fetcher`. C callers receive a pointer to this and
/// pass it back into `fetch_execute`.
pub struct FfiFetcher {
    pub(crate) inner: fetch_core::Fetcher,
}

// ---------------------------------------------------------------------------
// Request input (caller-provided, read but never freed by us)
// ---------------------------------------------------------------------------

/// A header pair supplied by the caller.
#[repr(C)]
pub struct FfiHeaderRef {
    pub key: *const c_char,
    pub value: *const c_char,
}

/// Description of one HTTP call.
///
/// `method` may be null (GET). `headers` may be null when `headers_len` is 0.
/// `body` may be null (no body).
#[repr(C)]
pub struct FfiRequestSpec {
    pub url: *const c_char,
    pub method: *const c_char,
    pub headers: *const FfiHeaderRef,
    pub headers_len: u32,
    pub body: *const c_char,
}

impl FfiRequestSpec {
    /// Copy the caller's data into a core `RequestSpec`.
    ///
    /// Returns `None` when `url` is null. Header entries with a null key or
    /// value are skipped.
    ///
    /// # Safety
    /// Every non-null pointer must reference a NUL-terminated string, and
    /// `headers` must point to at least `headers_len` entries.
    pub(crate) unsafe fn to_core(&self) -> Option<RequestSpec> {
        let url = read_str(self.url)?;
        let method = read_str(self.method).unwrap_or_else(|| "GET".to_string());

        let mut spec = RequestSpec::new(&method, &url);
        if !self.headers.is_null() {
            let pairs = std::slice::from_raw_parts(self.headers, self.headers_len as usize);
            for pair in pairs {
                if let (Some(key), Some(value)) = (read_str(pair.key), read_str(pair.value)) {
                    spec.headers.insert(key, value);
                }
            }
        }
        spec.body = read_str(self.body);
        Some(spec)
    }
}

/// Read a borrowed C string, replacing invalid UTF-8. Null gives `None`.
///
/// # Safety
/// `ptr` must be null or point to a NUL-terminated string.
pub(crate) unsafe fn read_str(ptr: *const c_char) -> Option<String> {
    if ptr.is_null() {
        return None;
    }
    Some(CStr::from_ptr(ptr).to_string_lossy().into_owned())
}

/// Hand a Rust string to C. Interior NUL bytes are dropped.
pub(crate) fn to_c_string(s: String) -> *mut c_char {
    let bytes: Vec<u8> = s.into_bytes().into_iter().filter(|b| *b != 0).collect();
    CString::new(bytes).unwrap_or_default().into_raw()
}

/// Free a string produced by `to_c_string`. Null is ignored.
pub(crate) fn free_c_string(s: *mut c_char) {
    if !s.is_null() {
        drop(unsafe { CString::from_raw(s) });
    }
}

// ---------------------------------------------------------------------------
// Output types (allocated here, freed by `fetch_free_*`)
// ---------------------------------------------------------------------------

/// A header pair owned by this library.
#[repr(C)]
pub struct FfiHeader {
    pub key: *mut c_char,
    pub value: *mut c_char,
}

/// A list of headers. `items` is null when `len` is 0.
#[repr(C)]
pub struct FfiHeaderList {
    pub items: *mut FfiHeader,
    pub len: u32,
}

impl FfiHeaderList {
    pub(crate) fn from_core(headers: Headers) -> Self {
        if headers.is_empty() {
            return FfiHeaderList {
                items: std::ptr::null_mut(),
                len: 0,
            };
        }
        let items: Box<[FfiHeader]> = headers
            .into_iter()
            .map(|(key, value)| FfiHeader {
                key: to_c_string(key),
                value: to_c_string(value),
            })
            .collect();
        let len = items.len() as u32;
        FfiHeaderList {
            items: Box::into_raw(items) as *mut FfiHeader,
            len,
        }
    }

    /// Release the items and their strings, leaving the list empty.
    pub(crate) fn release(&mut self) {
        if self.items.is_null() {
            return;
        }
        let slice = std::ptr::slice_from_raw_parts_mut(self.items, self.len as usize);
        let items = unsafe { Box::from_raw(slice) };
        for header in items.iter() {
            free_c_string(header.key);
            free_c_string(header.value);
        }
        self.items = std::ptr::null_mut();
        self.len = 0;
    }
}

/// Outcome of `fetch_execute`, flattened for C.
///
/// A completed exchange has `status >= 0`, `error` null and the remaining
/// fields filled; `json` is the body re-serialized as compact JSON, or null
/// when the body is not JSON. A failed exchange has `status == -1`, `ok`
/// false, `error` set and every other pointer null.
#[repr(C)]
pub struct FfiResponseResult {
    pub ok: bool,
    pub status: i32,
    pub status_text: *mut c_char,
    pub headers: FfiHeaderList,
    pub text: *mut c_char,
    pub json: *mut c_char,
    pub duration_ms: u64,
    pub size: u64,
    pub error: *mut c_char,
}

impl FfiResponseResult {
    pub(crate) fn from_core(result: ResponseResult) -> *mut Self {
        let ffi = match result {
            ResponseResult::Completed(response) => FfiResponseResult {
                ok: response.ok,
                status: i32::from(response.status),
                status_text: response
                    .status_text
                    .map(to_c_string)
                    .unwrap_or(std::ptr::null_mut()),
                headers: FfiHeaderList::from_core(response.headers),
                text: to_c_string(response.text),
                json: response
                    .json
                    .map(|value| to_c_string(value.to_string()))
                    .unwrap_or(std::ptr::null_mut()),
                duration_ms: response.duration_ms,
                size: response.size,
                error: std::ptr::null_mut(),
            },
            ResponseResult::Failed(failure) => Self::failed(failure.error, failure.duration_ms),
        };
        Box::into_raw(Box::new(ffi))
    }

    /// Failure result for an argument the caller left null.
    pub(crate) fn null_arg(name: &str) -> *mut Self {
        Box::into_raw(Box::new(Self::failed(format!("null argument: {name}"), 0)))
    }

    /// Failure result for a caught panic.
    pub(crate) fn panic(msg: &str) -> *mut Self {
        Box::into_raw(Box::new(Self::failed(msg.to_string(), 0)))
    }

    fn failed(error: String, duration_ms: u64) -> Self {
        FfiResponseResult {
            ok: false,
            status: -1,
            status_text: std::ptr::null_mut(),
            headers: FfiHeaderList {
                items: std::ptr::null_mut(),
                len: 0,
            },
            text: std::ptr::null_mut(),
            json: std::ptr::null_mut(),
            duration_ms,
            size: 0,
            error: to_c_string(error),
        }
    }
}
