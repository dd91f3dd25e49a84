//! Serialized request queue for the Hudpixel stats API.
//!
//! The stats service is rate limited, so Hudpixel never has more than one
//! request in flight. Callers submit [`QueueEntry`]s (or use the
//! `request_*` / `fetch_*` helpers on [`QueueHandle`]); the queue runs
//! them one at a time in admission order, retries a failed request once,
//! decodes the reply, and hands the typed result to the caller's handler.
//!
//! # Key types
//!
//! - [`RequestQueue`]: starts and shuts down the queue actor
//! - [`QueueHandle`]: submit entries, read stats
//! - [`QueueEntry`]: one request plus its [`ResponseHandler`]
//! - [`QueueConfig`]: per-attempt watchdog and staleness limit
//! - [`QueueStats`]: counters for submitted/attempted/failed entries
//!
//! # Guarantees
//!
//! Every accepted entry's handler is invoked exactly once: with a result,
//! or with `None` if the data is unavailable this time. The run slot is
//! released exactly once per entry, whichever way it ends.

mod config;
mod decode;
mod entry;
mod error;
mod handler;
mod queue;

pub use config::QueueConfig;
pub use decode::decode_reply;
pub use entry::{
    EntryId, FailureAction, MAX_ATTEMPTS, QueueEntry, Request, RequestKind,
    Response,
};
pub use error::QueueError;
pub use handler::{
    BoosterHandler, FriendHandler, PlayerHandler, ResponseHandler,
    SessionHandler,
};
pub use queue::{QueueHandle, QueueStats, RequestQueue};
