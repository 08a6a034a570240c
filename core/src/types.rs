//! Request and result records.
//!
//! # Design
//! `RequestSpec` is what the caller hands in; `ResponseResult` is what always
//! comes back. The result is an enum rather than one record with many
//! nullable fields: a `Completed` exchange always has a status, headers and
//! text, while a `Failed` one only has an error and a duration. Serialization
//! flattens both variants back into the single camelCase record shape that
//! JSON consumers expect, with `ok` and `status` present in either case.

use serde::ser::SerializeStruct;
use serde::{Deserialize, Serialize, Serializer};

use crate::headers::Headers;

fn default_method() -> String {
    "GET".to_string()
}

/// Description of one HTTP call.
///
/// `method` is matched case-insensitively. `body` is only sent for POST,
/// PUT, PATCH and DELETE, and an empty body counts as no body.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RequestSpec {
    pub url: String,
    #[serde(default = "default_method")]
    pub method: String,
    #[serde(default)]
    pub headers: Headers,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub body: Option<String>,
}

impl RequestSpec {
    pub fn new(method: &str, url: &str) -> Self {
        Self {
            url: url.to_string(),
            method: method.to_string(),
            headers: Headers::new(),
            body: None,
        }
    }

    pub fn get(url: &str) -> Self {
        Self::new("GET", url)
    }

    pub fn header(mut self, name: &str, value: &str) -> Self {
        self.headers.insert(name.to_string(), value.to_string());
        self
    }

    pub fn headers(mut self, headers: Headers) -> Self {
        self.headers.extend(headers);
        self
    }

    pub fn body(mut self, body: impl Into<String>) -> Self {
        self.body = Some(body.into());
        self
    }
}

/// A finished HTTP exchange, whatever its status code.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CompletedResponse {
    /// Status is in `200..=299`.
    pub ok: bool,
    pub status: u16,
    pub status_text: Option<String>,
    pub headers: Headers,
    pub text: String,
    /// `None` when `text` is not a JSON document.
    pub json: Option<serde_json::Value>,
    #[serde(rename = "duration")]
    pub duration_ms: u64,
    /// Byte length of `text`.
    pub size: u64,
}

/// An exchange that never completed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransportFailure {
    pub error: String,
    pub duration_ms: u64,
}

impl Serialize for TransportFailure {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut record = serializer.serialize_struct("TransportFailure", 4)?;
        record.serialize_field("ok", &false)?;
        record.serialize_field("error", &self.error)?;
        record.serialize_field("duration", &self.duration_ms)?;
        record.serialize_field("status", &Option::<u16>::None)?;
        record.end()
    }
}

/// Outcome of one call to `Fetcher::execute`.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum ResponseResult {
    Completed(CompletedResponse),
    Failed(TransportFailure),
}

impl ResponseResult {
    pub fn ok(&self) -> bool {
        match self {
            ResponseResult::Completed(r) => r.ok,
            ResponseResult::Failed(_) => false,
        }
    }

    pub fn status(&self) -> Option<u16> {
        match self {
            ResponseResult::Completed(r) => Some(r.status),
            ResponseResult::Failed(_) => None,
        }
    }

    pub fn duration_ms(&self) -> u64 {
        match self {
            ResponseResult::Completed(r) => r.duration_ms,
            ResponseResult::Failed(f) => f.duration_ms,
        }
    }

    pub fn error(&self) -> Option<&str> {
        match self {
            ResponseResult::Completed(_) => None,
            ResponseResult::Failed(f) => Some(&f.error),
        }
    }

    pub fn status_text(&self) -> Option<&str> {
        self.completed().and_then(|r| r.status_text.as_deref())
    }

    pub fn headers(&self) -> Option<&Headers> {
        self.completed().map(|r| &r.headers)
    }

    pub fn text(&self) -> Option<&str> {
        self.completed().map(|r| r.text.as_str())
    }

    pub fn json(&self) -> Option<&serde_json::Value> {
        self.completed().and_then(|r| r.json.as_ref())
    }

    pub fn size(&self) -> Option<u64> {
        self.completed().map(|r| r.size)
    }

    pub(crate) fn completed(&self) -> Option<&CompletedResponse> {
        match self {
            ResponseResult::Completed(r) => Some(r),
            ResponseResult::Failed(_) => None,
        }
    }
}

impl From<CompletedResponse> for ResponseResult {
    fn from(response: CompletedResponse) -> Self {
        ResponseResult::Completed(response)
    }
}

impl From<TransportFailure> for ResponseResult {
    fn from(failure: TransportFailure) -> Self {
        ResponseResult::Failed(failure)
    }
}
