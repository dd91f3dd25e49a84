//! Response handlers: how results get back to whoever asked.
//!
//! Each request kind has exactly one handler type. A handler is invoked
//! exactly once, with `Some(result)` on success or `None` when the data
//! is unavailable this time (the request failed twice, went stale, or the
//! queue shut down). Callers can't tell those causes apart, on purpose.
//!
//! Any `FnOnce(Option<T>) + Send + 'static` closure is a handler.

use hudpixel_api::{Booster, Friend, Player, Session};

/// A one-shot callback receiving the outcome of one request.
pub trait ResponseHandler<T>: Send + 'static {
    /// Delivers the outcome. Consumes the handler.
    fn respond(self: Box<Self>, result: Option<T>);
}

impl<T, F> ResponseHandler<T> for F
where
    F: FnOnce(Option<T>) + Send + 'static,
{
    fn respond(self: Box<Self>, result: Option<T>) {
        (*self)(result)
    }
}

/// Receives the active boosters, in reply order.
pub type BoosterHandler = Box<dyn ResponseHandler<Vec<Booster>>>;

/// Receives the session of the requested player.
pub type SessionHandler = Box<dyn ResponseHandler<Session>>;

/// Receives the friend records of the requested player, in reply order.
pub type FriendHandler = Box<dyn ResponseHandler<Vec<Friend>>>;

/// Receives the requested player's profile.
pub type PlayerHandler = Box<dyn ResponseHandler<Player>>;
