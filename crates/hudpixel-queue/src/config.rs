//! Queue configuration.

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Configuration for a [`RequestQueue`](crate::RequestQueue).
///
/// Embedders usually keep the defaults and override single fields:
///
/// ```rust
/// use std::time::Duration;
/// use hudpixel_queue::QueueConfig;
///
/// let config = QueueConfig {
///     max_entry_age: Some(Duration::from_secs(60)),
///     ..QueueConfig::default()
/// };
/// assert!(config.request_timeout.is_some());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct QueueConfig {
    /// Watchdog for a single remote attempt.
    ///
    /// An attempt still pending after this long counts as a failed
    /// attempt and goes through the usual retry-once path, so a hung
    /// transport can't hold the run slot forever. `None` disables it.
    pub request_timeout: Option<Duration>,

    /// Maximum time an entry may wait for the run slot.
    ///
    /// Checked when the entry reaches the front of the queue. An entry
    /// older than this is cancelled without issuing a remote call: its
    /// handler gets "no result". `None` keeps entries indefinitely.
    pub max_entry_age: Option<Duration>,
}

impl Default for QueueConfig {
    fn default() -> Self {
        Self {
            request_timeout: Some(Duration::from_secs(15)),
            max_entry_age: None,
        }
    }
}
