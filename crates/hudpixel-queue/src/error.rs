//! Error types for the queue layer.

use crate::RequestKind;

/// Errors returned when submitting to the queue.
///
/// Whenever one of these is returned for a submitted entry, that entry
/// has already been cancelled: its handler received "no result".
#[derive(Debug, thiserror::Error)]
pub enum QueueError {
    /// The queue has been shut down (or its actor is gone).
    #[error("request queue is closed")]
    Closed,

    /// A per-player request was submitted with a blank player name.
    #[error("{0} request needs a player name")]
    EmptySubject(RequestKind),
}
