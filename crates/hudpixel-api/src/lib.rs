//! Stats API layer for Hudpixel.
//!
//! This crate defines what the request queue talks to and what it hands
//! back to callers:
//!
//! - **Representations** ([`Booster`], [`Session`], [`Friend`], [`Player`]):
//!   the typed records callers receive.
//! - **Replies** ([`BoostersReply`], [`SessionReply`], ..., [`Reply`]):
//!   raw envelopes as the service returns them.
//! - **Codec** ([`Codec`] trait, [`JsonCodec`]): maps raw elements onto
//!   representations.
//! - **Client** ([`ApiClient`] trait): the remote service itself.
//! - **Errors** ([`ApiError`]).
//!
//! # Architecture
//!
//! ```text
//! ApiClient (raw Reply) → Codec (representations) → request queue → caller
//! ```

mod client;
mod codec;
mod error;
mod reply;
mod types;

pub use client::ApiClient;
pub use codec::{Codec, JsonCodec};
pub use error::ApiError;
pub use reply::{
    ApiReply, BoostersReply, FriendsReply, PlayerReply, Reply, SessionReply,
};
pub use types::{Booster, Friend, Player, Session};
