//! One-shot HTTP requests normalized into a uniform result record.
//!
//! # Overview
//! `Fetcher::execute` takes a `RequestSpec`, performs a single blocking HTTP
//! call and returns a `ResponseResult`. It never returns an error: a call
//! that cannot complete is a `Failed` result, and a completed call with any
//! status code is a `Completed` one. `parse_headers` turns `Key: value`
//! text into a header map, independent of the fetcher.
//!
//! # Design
//! - `Fetcher` holds only a transport agent and its `FetchConfig`; calls
//!   share no mutable state and may run concurrently.
//! - I/O and normalization are split: the transport yields a `RawResponse`,
//!   `normalize` turns it into a `CompletedResponse` without I/O.
//! - Degraded outcomes (non-JSON body, non-UTF-8 bytes) are `Option` fields
//!   or lossy decodes, never errors.
//! - No retries, no timeouts, no caching. Redirects follow the transport's
//!   default behavior up to `FetchConfig::max_redirects`.

pub mod config;
pub mod error;
pub mod fetcher;
pub mod headers;
pub mod http;
pub mod types;

pub use config::FetchConfig;
pub use error::FetchError;
pub use fetcher::{execute, normalize, Fetcher};
pub use headers::{parse_headers, Headers};
pub use http::{HttpMethod, RawResponse};
pub use types::{CompletedResponse, RequestSpec, ResponseResult, TransportFailure};
