//! # Hudpixel
//!
//! Stats lookups for the Hudpixel HUD, without tripping the stats
//! service's rate limit.
//!
//! Every lookup (active boosters, a player's session, friends, or
//! profile) goes through one serialized request queue: one request in
//! flight, admission order kept, a failed request retried once. The
//! caller always hears back exactly once, with the data or with "no
//! result".
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use hudpixel::prelude::*;
//!
//! # async fn demo(client: impl ApiClient) -> Result<(), HudpixelError> {
//! hudpixel::logging::init("info")?;
//!
//! let queue = StatsBuilder::new().start(client)?;
//! let stats = queue.handle();
//!
//! stats.request_session("Notch", |session: Option<Session>| match session {
//!     Some(s) if s.is_active() => println!("playing {} on {}", s.game_type, s.server),
//!     Some(_) => println!("offline"),
//!     None => println!("unavailable"),
//! })?;
//!
//! queue.shutdown().await;
//! # Ok(())
//! # }
//! ```

mod error;
pub mod logging;
mod stats;

pub use error::HudpixelError;
pub use stats::StatsBuilder;

pub use hudpixel_api as api;
pub use hudpixel_queue as queue;

/// The types most applications need.
pub mod prelude {
    pub use crate::{HudpixelError, StatsBuilder};

    pub use hudpixel_api::{
        ApiClient, ApiError, ApiReply, Booster, BoostersReply, Codec, Friend,
        FriendsReply, JsonCodec, Player, PlayerReply, Reply, Session,
        SessionReply,
    };
    pub use hudpixel_queue::{
        EntryId, QueueConfig, QueueEntry, QueueError, QueueHandle, QueueStats,
        RequestKind, RequestQueue, ResponseHandler,
    };
}
