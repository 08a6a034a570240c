//! Blocking HTTP executor that always answers with a `ResponseResult`.
//!
//! # Design
//! `execute` is split in two. `exchange` does the I/O and returns a
//! `RawResponse` or a `FetchError`, propagating with `?`. `normalize` is a
//! pure function from `RawResponse` to `CompletedResponse`, so decoding,
//! JSON detection and header folding are testable without a server. The
//! only place an error becomes data is the `Err` arm in `execute`.

use std::collections::btree_map::Entry;
use std::time::{Duration, Instant};

use ureq::http::Response;
use ureq::{Body, RequestBuilder};

use crate::config::FetchConfig;
use crate::error::FetchError;
use crate::headers::Headers;
use crate::http::{HttpMethod, RawResponse};
use crate::types::{CompletedResponse, RequestSpec, ResponseResult, TransportFailure};

/// Issues requests described by `RequestSpec`.
///
/// Holds a transport agent and its settings, nothing per-call. Clones share
/// the agent's connection state and can be used from several threads at
/// once.
#[derive(Clone)]
pub struct Fetcher {
    agent: ureq::Agent,
    config: FetchConfig,
}

impl Default for Fetcher {
    fn default() -> Self {
        Self::new()
    }
}

impl Fetcher {
    pub fn new() -> Self {
        Self::with_config(FetchConfig::default())
    }

    pub fn with_config(config: FetchConfig) -> Self {
        // Non-2xx responses are data here, not errors.
        let agent = ureq::Agent::config_builder()
            .http_status_as_error(false)
            .max_redirects(config.max_redirects)
            .build()
            .new_agent();
        Self { agent, config }
    }

    pub fn config(&self) -> &FetchConfig {
        &self.config
    }

    /// Perform one HTTP call.
    ///
    /// Never fails: an exchange that cannot complete comes back as
    /// `ResponseResult::Failed` with the error text and the time spent.
    /// Any status code, including 4xx and 5xx, is `Completed`.
    pub fn execute(&self, spec: &RequestSpec) -> ResponseResult {
        let started = Instant::now();
        match self.exchange(spec) {
            Ok(raw) => {
                let response = normalize(raw, started.elapsed());
                log::debug!(
                    "{} {} -> {} ({} bytes, {} ms)",
                    spec.method,
                    spec.url,
                    response.status,
                    response.size,
                    response.duration_ms
                );
                response.into()
            }
            Err(err) => {
                let failure = TransportFailure {
                    error: err.to_string(),
                    duration_ms: round_millis(started.elapsed()),
                };
                log::warn!("{} {} failed: {}", spec.method, spec.url, failure.error);
                failure.into()
            }
        }
    }

    fn exchange(&self, spec: &RequestSpec) -> Result<RawResponse, FetchError> {
        let method: HttpMethod = spec.method.parse()?;
        let body = spec
            .body
            .as_deref()
            .filter(|body| method.carries_body() && !body.is_empty());

        let mut response = self.send(method, spec, body)?;

        let status = response.status();
        let headers = response
            .headers()
            .iter()
            .map(|(name, value)| {
                (
                    name.as_str().to_string(),
                    String::from_utf8_lossy(value.as_bytes()).into_owned(),
                )
            })
            .collect();
        let body = response
            .body_mut()
            .with_config()
            .limit(self.config.max_body_bytes)
            .read_to_vec()?;

        Ok(RawResponse {
            status: status.as_u16(),
            status_text: status.canonical_reason().map(str::to_string),
            headers,
            body,
        })
    }

    fn send(
        &self,
        method: HttpMethod,
        spec: &RequestSpec,
        body: Option<&str>,
    ) -> Result<Response<Body>, ureq::Error> {
        let url = spec.url.as_str();
        let headers = &spec.headers;

        match method {
            HttpMethod::Get => with_headers(self.agent.get(url), headers).call(),
            HttpMethod::Head => with_headers(self.agent.head(url), headers).call(),
            HttpMethod::Options => with_headers(self.agent.options(url), headers).call(),
            HttpMethod::Trace => with_headers(self.agent.trace(url), headers).call(),
            HttpMethod::Post | HttpMethod::Put | HttpMethod::Patch => {
                let builder = match method {
                    HttpMethod::Post => self.agent.post(url),
                    HttpMethod::Put => self.agent.put(url),
                    _ => self.agent.patch(url),
                };
                let builder = with_headers(builder, headers);
                match body {
                    Some(body) => builder.send(body.as_bytes()),
                    None => builder.send_empty(),
                }
            }
            HttpMethod::Delete => {
                let builder = with_headers(self.agent.delete(url), headers);
                match body {
                    Some(body) => builder.force_send_body().send(body.as_bytes()),
                    None => builder.call(),
                }
            }
        }
    }
}

/// Execute `spec` with a default `Fetcher`.
pub fn execute(spec: &RequestSpec) -> ResponseResult {
    Fetcher::new().execute(spec)
}

/// Caller headers go out exactly as given; invalid names or values surface
/// as a transport error when the request is sent.
fn with_headers<B>(mut builder: RequestBuilder<B>, headers: &Headers) -> RequestBuilder<B> {
    for (name, value) in headers {
        builder = builder.header(name.as_str(), value.as_str());
    }
    builder
}

/// Turn a completed exchange into the caller-facing record.
///
/// The body is decoded as UTF-8 with invalid sequences replaced by U+FFFD,
/// and `size` is the byte length of the decoded text. `json` is `None`
/// whenever that text is not a JSON document; a number outside the `f64`
/// range, such as `1e400`, also gives `None` since it has no JSON value.
/// Header lines sharing a name are folded into one entry, joined with
/// `", "` in arrival order.
pub fn normalize(raw: RawResponse, elapsed: Duration) -> CompletedResponse {
    let text = match String::from_utf8(raw.body) {
        Ok(text) => text,
        Err(err) => String::from_utf8_lossy(err.as_bytes()).into_owned(),
    };
    let json = serde_json::from_str(&text).ok();

    let mut headers = Headers::new();
    for (name, value) in raw.headers {
        match headers.entry(name) {
            Entry::Occupied(mut joined) => {
                let joined = joined.get_mut();
                joined.push_str(", ");
                joined.push_str(&value);
            }
            Entry::Vacant(slot) => {
                slot.insert(value);
            }
        }
    }

    CompletedResponse {
        ok: (200..=299).contains(&raw.status),
        status: raw.status,
        status_text: raw.status_text,
        headers,
        size: text.len() as u64,
        text,
        json,
        duration_ms: round_millis(elapsed),
    }
}

fn round_millis(elapsed: Duration) -> u64 {
    (elapsed.as_secs_f64() * 1000.0).round() as u64
}
