//! Error types for the API layer.
//!
//! Each crate in Hudpixel defines its own error enum. An `ApiError` always
//! means something went wrong talking to (or understanding) the remote
//! stats service, never a queueing problem.

use std::time::Duration;

/// Errors produced by an API call or by decoding its reply.
///
/// The request queue treats every variant the same way: as a failed
/// attempt. The first failure of an entry is retried, the second one
/// cancels it. Callers never see this type through a response handler,
/// they only see "no result".
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// The transport could not complete the request (connection refused,
    /// DNS failure, HTTP 5xx, and so on).
    #[error("request failed: {0}")]
    Request(String),

    /// The service answered, but with `success: false`.
    ///
    /// The inner string is the `cause` the service reported, e.g.
    /// "Invalid API key" or "Key throttle".
    #[error("request rejected: {0}")]
    Rejected(String),

    /// A reply or one of its elements did not match the expected shape.
    #[error("decode failed: {0}")]
    Decode(serde_json::Error),

    /// The attempt did not complete within the configured watchdog window.
    #[error("request timed out after {0:?}")]
    Timeout(Duration),

    /// The client answered a request with a reply of another kind.
    #[error("expected a {expected} reply, got {got}")]
    UnexpectedReply {
        expected: &'static str,
        got: &'static str,
    },
}
