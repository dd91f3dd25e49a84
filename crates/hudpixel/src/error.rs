//! Unified error type for Hudpixel.

use hudpixel_api::ApiError;
use hudpixel_queue::QueueError;

/// Top-level error that wraps all crate-specific errors.
///
/// The `#[from]` attribute on each wrapping variant lets `?` convert
/// sub-crate errors automatically.
#[derive(Debug, thiserror::Error)]
pub enum HudpixelError {
    /// Talking to (or understanding) the stats service failed.
    #[error(transparent)]
    Api(#[from] ApiError),

    /// The request queue refused a submission.
    #[error(transparent)]
    Queue(#[from] QueueError),

    /// [`StatsBuilder::start`](crate::StatsBuilder::start) was called
    /// outside a Tokio runtime.
    #[error("no Tokio runtime to run the request queue on")]
    NoRuntime,

    /// The configuration can't work, e.g. a zero request timeout.
    #[error("invalid configuration: {0}")]
    Config(String),

    /// The tracing subscriber could not be installed.
    #[error("logging setup failed: {0}")]
    Logging(String),
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use hudpixel_queue::RequestKind;

    use super::*;

    #[test]
    fn test_from_api_error() {
        let err = ApiError::Rejected("Invalid API key".into());
        let hudpixel_err: HudpixelError = err.into();
        assert!(matches!(hudpixel_err, HudpixelError::Api(_)));
        assert!(hudpixel_err.to_string().contains("Invalid API key"));
    }

    #[test]
    fn test_from_timeout_keeps_message() {
        let err = ApiError::Timeout(Duration::from_secs(3));
        let hudpixel_err: HudpixelError = err.into();
        assert_eq!(hudpixel_err.to_string(), "request timed out after 3s");
    }

    #[test]
    fn test_from_queue_error() {
        let err = QueueError::EmptySubject(RequestKind::Friend);
        let hudpixel_err: HudpixelError = err.into();
        assert!(matches!(hudpixel_err, HudpixelError::Queue(_)));
        assert_eq!(
            hudpixel_err.to_string(),
            "friend request needs a player name"
        );
    }
}
