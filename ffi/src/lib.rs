//! C-ABI wrapper around `fetch-core`.
//!
//! # Overview
//! Exposes request execution and header-text parsing through `extern "C"`
//! functions so any language with a C FFI can issue a normalized HTTP call
//! without linking against Rust's HTTP stack directly.
//!
//! # Design
//! - Every `extern "C"` function wraps its body in `catch_unwind` so panics
//!   never cross the FFI boundary.
//! - `fetch_execute` never returns null: a null argument or a caught panic
//!   becomes a failed `FfiResponseResult`, same as a transport failure.
//! - The C caller owns all returned pointers and must call the matching
//!   `fetch_free_*` function to release them.

pub mod types;

use std::os::raw::c_char;
use std::panic::{catch_unwind, AssertUnwindSafe};

use types::*;

// ---------------------------------------------------------------------------
// Fetcher lifecycle
// ---------------------------------------------------------------------------

/// Create a `Fetcher` with default settings.
///
/// Returns null if an internal panic occurs.
/// The caller must free the returned pointer with `fetch_fetcher_free`.
#[unsafe(no_mangle)]
pub extern "C" fn fetch_fetcher_new() -> *mut FfiFetcher {
    catch_unwind(|| {
        let fetcher = fetch_core::Fetcher::new();
        Box::into_raw(Box::new(FfiFetcher { inner: fetcher }))
    })
    .unwrap_or(std::ptr::null_mut())
}

/// Free a `Fetcher` created by `fetch_fetcher_new`. Safe to call with null.
#[unsafe(no_mangle)]
pub extern "C" fn fetch_fetcher_free(fetcher: *mut FfiFetcher) {
    if !fetcher.is_null() {
        let _ = catch_unwind(AssertUnwindSafe(|| {
            drop(unsafe { Box::from_raw(fetcher) });
        }));
    }
}

// ---------------------------------------------------------------------------
// Operations
// ---------------------------------------------------------------------------

/// Perform one HTTP call described by `spec`.
///
/// Blocks until the exchange completes or fails. Always returns a result;
/// free it with `fetch_free_result`.
#[unsafe(no_mangle)]
pub extern "C" fn fetch_execute(
    fetcher: *const FfiFetcher,
    spec: *const FfiRequestSpec,
) -> *mut FfiResponseResult {
    catch_unwind(AssertUnwindSafe(|| {
        if fetcher.is_null() {
            return FfiResponseResult::null_arg("fetcher");
        }
        if spec.is_null() {
            return FfiResponseResult::null_arg("spec");
        }
        let fetcher = unsafe { &*fetcher };
        let Some(spec) = (unsafe { (*spec).to_core() }) else {
            return FfiResponseResult::null_arg("url");
        };
        FfiResponseResult::from_core(fetcher.inner.execute(&spec))
    }))
    .unwrap_or_else(|_| {
        log::error!("panic caught in fetch_execute");
        FfiResponseResult::panic("panic in fetch_execute")
    })
}

/// Parse `Key: value` header text. Null or empty text gives an empty list.
///
/// Returns null only if an internal panic occurs.
/// Free the returned list with `fetch_free_headers`.
#[unsafe(no_mangle)]
pub extern "C" fn fetch_parse_headers(text: *const c_char) -> *mut FfiHeaderList {
    catch_unwind(|| {
        let text = unsafe { read_str(text) };
        let headers = fetch_core::parse_headers(text.as_deref());
        Box::into_raw(Box::new(FfiHeaderList::from_core(headers)))
    })
    .unwrap_or(std::ptr::null_mut())
}

// ---------------------------------------------------------------------------
// Free functions
// ---------------------------------------------------------------------------

/// Free an `FfiResponseResult` returned by `fetch_execute`.
/// Safe to call with null.
#[unsafe(no_mangle)]
pub extern "C" fn fetch_free_result(result: *mut FfiResponseResult) {
    if result.is_null() {
        return;
    }
    let _ = catch_unwind(|| {
        let mut result = unsafe { Box::from_raw(result) };
        free_c_string(result.status_text);
        free_c_string(result.text);
        free_c_string(result.json);
        free_c_string(result.error);
        result.headers.release();
    });
}

/// Free an `FfiHeaderList` returned by `fetch_parse_headers`.
/// Safe to call with null.
#[unsafe(no_mangle)]
pub extern "C" fn fetch_free_headers(list: *mut FfiHeaderList) {
    if list.is_null() {
        return;
    }
    let _ = catch_unwind(|| {
        let mut list = unsafe { Box::from_raw(list) };
        list.release();
    });
}

// ---------------------------------------------------------------------------
// Unit tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use std::ffi::{CStr, CString};
    use std::net::SocketAddr;

    fn start_server() -> SocketAddr {
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

        addr
    }

    fn spec(url: &CString) -> FfiRequestSpec {
        FfiRequestSpec {
            url: url.as_ptr(),
            method: std::ptr::null(),
            headers: std::ptr::null(),
            headers_len: 0,
            body: std::ptr::null(),
        }
    }

    fn str_of<'a>(ptr: *const c_char) -> &'a str {
        unsafe { CStr::from_ptr(ptr) }.to_str().unwrap()
    }

    fn header_pairs(list: &FfiHeaderList) -> Vec<(String, String)> {
        if list.items.is_null() {
            return Vec::new();
        }
        let items = unsafe { std::slice::from_raw_parts(list.items, list.len as usize) };
        items
            .iter()
            .map(|h| (str_of(h.key).to_string(), str_of(h.value).to_string()))
            .collect()
    }

    #[test]
    fn fetcher_new_and_free() {
        let fetcher = fetch_fetcher_new();
        assert!(!fetcher.is_null());
        fetch_fetcher_free(fetcher);
    }

    #[test]
    fn fetcher_free_null_is_safe() {
        fetch_fetcher_free(std::ptr::null_mut());
    }

    #[test]
    fn parse_headers_returns_pairs() {
        let text = CString::new("Content-Type: application/json\nX-Test: 1").unwrap();
        let list = fetch_parse_headers(text.as_ptr());
        assert!(!list.is_null());

        let pairs = header_pairs(unsafe { &*list });
        assert_eq!(
            pairs,
            vec![
                ("Content-Type".to_string(), "application/json".to_string()),
                ("X-Test".to_string(), "1".to_string()),
            ]
        );

        fetch_free_headers(list);
    }

    #[test]
    fn parse_headers_null_gives_empty_list() {
        let list = fetch_parse_headers(std::ptr::null());
        let list_ref = unsafe { &*list };
        assert_eq!(list_ref.len, 0);
        assert!(list_ref.items.is_null());
        fetch_free_headers(list);
    }

    #[test]
    fn parse_headers_last_write_wins() {
        let text = CString::new("A: 1\nbad line\nA: 2").unwrap();
        let list = fetch_parse_headers(text.as_ptr());
        let pairs = header_pairs(unsafe { &*list });
        assert_eq!(pairs, vec![("A".to_string(), "2".to_string())]);
        fetch_free_headers(list);
    }

    #[test]
    fn free_null_pointers_is_safe() {
        fetch_free_result(std::ptr::null_mut());
        fetch_free_headers(std::ptr::null_mut());
    }

    #[test]
    fn execute_null_fetcher_is_a_failure() {
        let url = CString::new("http://localhost:3000").unwrap();
        let spec = spec(&url);
        let result = fetch_execute(std::ptr::null(), &spec);
        let r = unsafe { &*result };
        assert!(!r.ok);
        assert_eq!(r.status, -1);
        assert_eq!(str_of(r.error), "null argument: fetcher");
        fetch_free_result(result);
    }

    #[test]
    fn execute_null_spec_and_url_are_failures() {
        let fetcher = fetch_fetcher_new();

        let result = fetch_execute(fetcher, std::ptr::null());
        assert_eq!(str_of(unsafe { &*result }.error), "null argument: spec");
        fetch_free_result(result);

        let spec = FfiRequestSpec {
            url: std::ptr::null(),
            method: std::ptr::null(),
            headers: std::ptr::null(),
            headers_len: 0,
            body: std::ptr::null(),
        };
        let result = fetch_execute(fetcher, &spec);
        assert_eq!(str_of(unsafe { &*result }.error), "null argument: url");
        fetch_free_result(result);

        fetch_fetcher_free(fetcher);
    }

    #[test]
    fn execute_unsupported_method_is_a_failure() {
        let fetcher = fetch_fetcher_new();
        let url = CString::new("http://127.0.0.1:9/").unwrap();
        let method = CString::new("BREW").unwrap();
        let mut spec = spec(&url);
        spec.method = method.as_ptr();

        let result = fetch_execute(fetcher, &spec);
        let r = unsafe { &*result };
        assert!(!r.ok);
        assert_eq!(r.status, -1);
        assert!(r.text.is_null());
        assert!(r.json.is_null());
        assert_eq!(r.headers.len, 0);
        assert_eq!(str_of(r.error), "unsupported HTTP method: BREW");

        fetch_free_result(result);
        fetch_fetcher_free(fetcher);
    }

    #[test]
    fn execute_json_route_fills_every_field() {
        let addr = start_server();
        let fetcher = fetch_fetcher_new();
        let url = CString::new(format!("http://{addr}/json")).unwrap();

        let result = fetch_execute(fetcher, &spec(&url));
        let r = unsafe { &*result };
        assert!(r.ok);
        assert_eq!(r.status, 200);
        assert_eq!(str_of(r.status_text), "OK");
        assert!(r.error.is_null());

        let text = str_of(r.text);
        assert_eq!(r.size, text.len() as u64);
        let json: serde_json::Value = serde_json::from_str(str_of(r.json)).unwrap();
        assert_eq!(json, serde_json::from_str::<serde_json::Value>(text).unwrap());

        let headers = header_pairs(&r.headers);
        assert!(headers.iter().any(|(k, _)| k == "content-type"));

        fetch_free_result(result);
        fetch_fetcher_free(fetcher);
    }

    #[test]
    fn execute_post_sends_body_and_headers() {
        let addr = start_server();
        let fetcher = fetch_fetcher_new();
        let url = CString::new(format!("http://{addr}/echo")).unwrap();
        let method = CString::new("post").unwrap();
        let body = CString::new("payload").unwrap();
        let key = CString::new("X-Trace").unwrap();
        let value = CString::new("abc").unwrap();
        let headers = [FfiHeaderRef {
            key: key.as_ptr(),
            value: value.as_ptr(),
        }];
        let spec = FfiRequestSpec {
            url: url.as_ptr(),
            method: method.as_ptr(),
            headers: headers.as_ptr(),
            headers_len: headers.len() as u32,
            body: body.as_ptr(),
        };

        let result = fetch_execute(fetcher, &spec);
        let r = unsafe { &*result };
        assert!(r.ok);
        let echo: mock_server::Echo = serde_json::from_str(str_of(r.text)).unwrap();
        assert_eq!(echo.method, "POST");
        assert_eq!(echo.body, "payload");
        assert_eq!(echo.headers["x-trace"], "abc");

        fetch_free_result(result);
        fetch_fetcher_free(fetcher);
    }

    #[test]
    fn execute_text_route_has_null_json() {
        let addr = start_server();
        let fetcher = fetch_fetcher_new();
        let url = CString::new(format!("http://{addr}/text")).unwrap();

        let result = fetch_execute(fetcher, &spec(&url));
        let r = unsafe { &*result };
        assert_eq!(str_of(r.text), "not json");
        assert!(r.json.is_null());

        fetch_free_result(result);
        fetch_fetcher_free(fetcher);
    }
}
