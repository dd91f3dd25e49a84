//! Raw reply envelopes, as the stats service returns them.
//!
//! Every reply carries `success` and, on failure, a `cause`. The payload
//! is kept as raw [`serde_json::Value`] elements here: turning those into
//! [`Booster`](crate::Booster), [`Session`](crate::Session), etc. is the
//! request queue's job, one element at a time.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::ApiError;

/// Common envelope accessors shared by all replies.
pub trait ApiReply: Sized {
    /// Short name of the reply kind, for logs and errors.
    const KIND: &'static str;

    /// Whether the service reported success.
    fn success(&self) -> bool;

    /// The failure cause the service reported, if any.
    fn cause(&self) -> Option<&str>;

    /// Converts `success: false` into [`ApiError::Rejected`].
    fn ensure_success(self) -> Result<Self, ApiError> {
        if self.success() {
            Ok(self)
        } else {
            let cause = self.cause().unwrap_or("unknown cause").to_string();
            Err(ApiError::Rejected(cause))
        }
    }
}

/// Reply to a boosters request: a list of booster elements.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct BoostersReply {
    pub success: bool,
    pub cause: Option<String>,
    pub boosters: Vec<Value>,
}

/// Reply to a session request. `session` is `null` when the player is
/// not in a game.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionReply {
    pub success: bool,
    pub cause: Option<String>,
    pub session: Option<Value>,
}

/// Reply to a friends request: a list of friendship records.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct FriendsReply {
    pub success: bool,
    pub cause: Option<String>,
    pub records: Vec<Value>,
}

/// Reply to a player request. `player` is `null` for names the service
/// has never seen.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct PlayerReply {
    pub success: bool,
    pub cause: Option<String>,
    pub player: Option<Value>,
}

impl ApiReply for BoostersReply {
    const KIND: &'static str = "boosters";

    fn success(&self) -> bool {
        self.success
    }

    fn cause(&self) -> Option<&str> {
        self.cause.as_deref()
    }
}

impl ApiReply for SessionReply {
    const KIND: &'static str = "session";

    fn success(&self) -> bool {
        self.success
    }

    fn cause(&self) -> Option<&str> {
        self.cause.as_deref()
    }
}

impl ApiReply for FriendsReply {
    const KIND: &'static str = "friends";

    fn success(&self) -> bool {
        self.success
    }

    fn cause(&self) -> Option<&str> {
        self.cause.as_deref()
    }
}

impl ApiReply for PlayerReply {
    const KIND: &'static str = "player";

    fn success(&self) -> bool {
        self.success
    }

    fn cause(&self) -> Option<&str> {
        self.cause.as_deref()
    }
}

// ---------------------------------------------------------------------------
// Reply: any of the four
// ---------------------------------------------------------------------------

/// A reply of any kind, as produced by an [`ApiClient`](crate::ApiClient).
#[derive(Debug, Clone, PartialEq)]
pub enum Reply {
    Boosters(BoostersReply),
    Session(SessionReply),
    Friends(FriendsReply),
    Player(PlayerReply),
}

impl Reply {
    /// Short name of the wrapped reply kind.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Boosters(_) => BoostersReply::KIND,
            Self::Session(_) => SessionReply::KIND,
            Self::Friends(_) => FriendsReply::KIND,
            Self::Player(_) => PlayerReply::KIND,
        }
    }

    /// [`ApiReply::ensure_success`] for whichever reply is wrapped.
    ///
    /// # Errors
    /// [`ApiError::Rejected`] if the service answered `success: false`.
    pub fn ensure_success(self) -> Result<Self, ApiError> {
        match self {
            Self::Boosters(reply) => reply.ensure_success().map(Self::Boosters),
            Self::Session(reply) => reply.ensure_success().map(Self::Session),
            Self::Friends(reply) => reply.ensure_success().map(Self::Friends),
            Self::Player(reply) => reply.ensure_success().map(Self::Player),
        }
    }
}

impl From<BoostersReply> for Reply {
    fn from(reply: BoostersReply) -> Self {
        Self::Boosters(reply)
    }
}

impl From<SessionReply> for Reply {
    fn from(reply: SessionReply) -> Self {
        Self::Session(reply)
    }
}

impl From<FriendsReply> for Reply {
    fn from(reply: FriendsReply) -> Self {
        Self::Friends(reply)
    }
}

impl From<PlayerReply> for Reply {
    fn from(reply: PlayerReply) -> Self {
        Self::Player(reply)
    }
}
