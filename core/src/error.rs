//! Error types for the fetcher.
//!
//! # Design
//! `FetchError` only describes exchanges that could not complete. It never
//! leaves the crate as an `Err`: `Fetcher::execute` turns it into a
//! `TransportFailure` carrying the error's display text. Non-2xx statuses,
//! undecodable JSON and odd header bytes are not errors at all; they degrade
//! into fields of a `CompletedResponse`.

use thiserror::Error;

/// Reasons a request could not produce a completed HTTP exchange.
#[derive(Debug, Error)]
pub enum FetchError {
    /// The method string does not name a method the transport can issue.
    #[error("unsupported HTTP method: {0}")]
    UnsupportedMethod(String),

    /// DNS failure, refused connection, malformed URL, broken body stream.
    #[error(transparent)]
    Transport(#[from] ureq::Error),
}
