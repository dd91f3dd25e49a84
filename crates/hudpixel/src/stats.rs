//! `StatsBuilder`: configures and starts the request queue.
//!
//! This is the entry point for an application embedding Hudpixel. It ties
//! together the remote client, the codec, and the queue configuration.

use std::time::Duration;

use hudpixel_api::{ApiClient, Codec, JsonCodec};
use hudpixel_queue::{QueueConfig, RequestQueue};

use crate::HudpixelError;

/// Builder for configuring and starting a request queue.
///
/// # Example
///
/// ```rust,no_run
/// # use hudpixel::prelude::*;
/// # async fn demo(client: impl ApiClient) -> Result<(), HudpixelError> {
/// use std::time::Duration;
///
/// let queue = StatsBuilder::new()
///     .request_timeout(Duration::from_secs(10))
///     .max_entry_age(Duration::from_secs(60))
///     .start(client)?;
///
/// let stats = queue.handle();
/// let friends = stats.fetch_friends("Notch").await?;
/// queue.shutdown().await;
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone, Default)]
pub struct StatsBuilder {
    config: QueueConfig,
}

impl StatsBuilder {
    /// Creates a builder with the default [`QueueConfig`].
    pub fn new() -> Self {
        Self::default()
    }

    /// Replaces the whole queue configuration.
    pub fn config(mut self, config: QueueConfig) -> Self {
        self.config = config;
        self
    }

    /// Sets the per-attempt watchdog.
    pub fn request_timeout(mut self, limit: Duration) -> Self {
        self.config.request_timeout = Some(limit);
        self
    }

    /// Lets attempts run for as long as the client takes.
    pub fn no_request_timeout(mut self) -> Self {
        self.config.request_timeout = None;
        self
    }

    /// Cancels entries that waited longer than `limit` for the run slot.
    pub fn max_entry_age(mut self, limit: Duration) -> Self {
        self.config.max_entry_age = Some(limit);
        self
    }

    /// Starts the queue with the JSON codec.
    ///
    /// # Errors
    /// See [`start_with_codec`](Self::start_with_codec).
    pub fn start<C: ApiClient>(
        self,
        client: C,
    ) -> Result<RequestQueue<C>, HudpixelError> {
        self.start_with_codec(client, JsonCodec)
    }

    /// Starts the queue on the current Tokio runtime.
    ///
    /// # Errors
    /// - [`HudpixelError::Config`] for a zero timeout or entry age.
    /// - [`HudpixelError::NoRuntime`] outside a Tokio runtime.
    pub fn start_with_codec<C: ApiClient, K: Codec>(
        self,
        client: C,
        codec: K,
    ) -> Result<RequestQueue<C, K>, HudpixelError> {
        if let Err(e) = validate(&self.config) {
            tracing::warn!(error = %e, config = ?self.config, "queue not started");
            return Err(e);
        }

        if tokio::runtime::Handle::try_current().is_err() {
            tracing::warn!("queue not started: no Tokio runtime");
            return Err(HudpixelError::NoRuntime);
        }

        Ok(RequestQueue::start(client, codec, self.config))
    }
}

fn validate(config: &QueueConfig) -> Result<(), HudpixelError> {
    if config.request_timeout == Some(Duration::ZERO) {
        return Err(HudpixelError::Config(
            "request_timeout must be positive".into(),
        ));
    }
    if config.max_entry_age == Some(Duration::ZERO) {
        return Err(HudpixelError::Config(
            "max_entry_age must be positive".into(),
        ));
    }
    Ok(())
}
