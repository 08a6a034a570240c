//! Transport settings for a `Fetcher`.

use serde::Deserialize;

fn default_max_redirects() -> u32 {
    10
}

fn default_max_body_bytes() -> u64 {
    u64::MAX
}

/// Settings applied to every request a `Fetcher` issues.
///
/// Missing fields take their defaults when deserialized, so `{}` is a valid
/// configuration. No timeout is applied; callers that need one bound the
/// call themselves.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct FetchConfig {
    /// Maximum number of redirects followed for one request.
    #[serde(default = "default_max_redirects")]
    pub max_redirects: u32,

    /// Response bodies longer than this fail the exchange.
    #[serde(default = "default_max_body_bytes")]
    pub max_body_bytes: u64,
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            max_redirects: default_max_redirects(),
            max_body_bytes: default_max_body_bytes(),
        }
    }
}
