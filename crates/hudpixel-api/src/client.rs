//! The remote stats client seam.
//!
//! Hudpixel doesn't talk HTTP itself. Whoever embeds it provides an
//! [`ApiClient`]: something that can perform the four stats requests and
//! hand back raw reply envelopes. Transport, API keys, and throttling
//! headers all live behind this trait.

use std::future::Future;

use crate::{ApiError, BoostersReply, FriendsReply, PlayerReply, SessionReply};

/// Performs requests against the remote stats service.
///
/// Every method issues exactly one remote call. Retrying is the request
/// queue's business; a client should report a failure as soon as it sees
/// one rather than retrying internally.
///
/// A `success: false` envelope may be returned as-is: the request queue
/// checks the flag before decoding. Calling
/// [`ApiReply::ensure_success`](crate::ApiReply::ensure_success) in the
/// client surfaces the rejection one step earlier.
///
/// # Example
///
/// ```rust
/// use hudpixel_api::{
///     ApiClient, ApiError, BoostersReply, FriendsReply, PlayerReply, SessionReply,
/// };
///
/// /// A client for a service that knows nobody.
/// struct EmptyClient;
///
/// impl ApiClient for EmptyClient {
///     async fn fetch_boosters(&self) -> Result<BoostersReply, ApiError> {
///         Ok(BoostersReply { success: true, ..Default::default() })
///     }
///
///     async fn fetch_session(&self, _subject: &str) -> Result<SessionReply, ApiError> {
///         Ok(SessionReply { success: true, ..Default::default() })
///     }
///
///     async fn fetch_friends(&self, _subject: &str) -> Result<FriendsReply, ApiError> {
///         Ok(FriendsReply { success: true, ..Default::default() })
///     }
///
///     async fn fetch_player(&self, _subject: &str) -> Result<PlayerReply, ApiError> {
///         Ok(PlayerReply { success: true, ..Default::default() })
///     }
/// }
/// ```
pub trait ApiClient: Send + Sync + 'static {
    /// Lists the currently active network boosters.
    fn fetch_boosters(
        &self,
    ) -> impl Future<Output = Result<BoostersReply, ApiError>> + Send;

    /// Looks up the game session `subject` is in.
    fn fetch_session(
        &self,
        subject: &str,
    ) -> impl Future<Output = Result<SessionReply, ApiError>> + Send;

    /// Lists the friendship records of `subject`.
    fn fetch_friends(
        &self,
        subject: &str,
    ) -> impl Future<Output = Result<FriendsReply, ApiError>> + Send;

    /// Fetches the profile of `subject`.
    fn fetch_player(
        &self,
        subject: &str,
    ) -> impl Future<Output = Result<PlayerReply, ApiError>> + Send;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ApiReply;

    /// Rejects everything, the way the service does with a revoked key.
    struct RevokedKeyClient;

    impl RevokedKeyClient {
        fn rejected<R: Default + ApiReply>(&self) -> Result<R, ApiError> {
            R::default().ensure_success()
        }
    }

    impl ApiClient for RevokedKeyClient {
        async fn fetch_boosters(&self) -> Result<BoostersReply, ApiError> {
            self.rejected()
        }

        async fn fetch_session(
            &self,
            _subject: &str,
        ) -> Result<SessionReply, ApiError> {
            self.rejected()
        }

        async fn fetch_friends(
            &self,
            _subject: &str,
        ) -> Result<FriendsReply, ApiError> {
            self.rejected()
        }

        async fn fetch_player(
            &self,
            _subject: &str,
        ) -> Result<PlayerReply, ApiError> {
            self.rejected()
        }
    }

    #[tokio::test]
    async fn test_client_surfaces_rejection_as_error() {
        let client = RevokedKeyClient;

        assert!(matches!(
            client.fetch_boosters().await,
            Err(ApiError::Rejected(_))
        ));
        assert!(matches!(
            client.fetch_player("Notch").await,
            Err(ApiError::Rejected(_))
        ));
    }

    #[test]
    fn test_client_futures_are_send() {
        fn assert_send<T: Send>(_: T) {}

        let client = RevokedKeyClient;
        assert_send(client.fetch_session("Notch"));
        assert_send(client.fetch_friends("Notch"));
    }
}
