//! Queue entries: one pending request each.
//!
//! An entry owns exactly one response handler and the parameters of one
//! request. It knows how to issue its remote call, how to decode the
//! reply, and how to finish, either by delivering a result or by
//! cancelling. The entry never touches the run slot itself; the queue
//! releases the slot once the entry is consumed.
//!
//! ## Lifecycle
//!
//! ```text
//! Pending ──run()──→ Running ──complete()──→ (handler gets Some)
//!                       │
//!                  on_failure()
//!                       │ first failure: Retry
//!                       ▼
//!                    Running ──complete()──→ (handler gets Some)
//!                       │
//!                  on_failure()
//!                       │ second failure: Cancel
//!                       ▼
//!                    cancel() ──→ (handler gets None)
//! ```
//!
//! `complete` and `cancel` take `self` by value, so an entry can finish
//! at most once and can't be resubmitted afterwards.

use std::fmt;
use std::future::Future;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use hudpixel_api::{ApiClient, ApiError, Booster, Codec, Friend, Player, Reply, Session};
use tokio::time::Instant;

use crate::decode::decode_reply;
use crate::{
    BoosterHandler, FriendHandler, PlayerHandler, QueueError, ResponseHandler,
    SessionHandler,
};

/// Counter for generating unique entry IDs.
static NEXT_ENTRY_ID: AtomicU64 = AtomicU64::new(1);

/// How many remote calls one entry may make: the original and one retry.
pub const MAX_ATTEMPTS: u32 = 2;

// ---------------------------------------------------------------------------
// Identity and kind
// ---------------------------------------------------------------------------

/// A process-unique identifier for a queue entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct EntryId(pub u64);

impl fmt::Display for EntryId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "E-{}", self.0)
    }
}

/// The four request kinds the queue can carry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RequestKind {
    Booster,
    Session,
    Friend,
    Player,
}

impl RequestKind {
    /// Whether requests of this kind are about one specific player.
    pub fn needs_subject(self) -> bool {
        !matches!(self, Self::Booster)
    }
}

impl fmt::Display for RequestKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Booster => write!(f, "booster"),
            Self::Session => write!(f, "session"),
            Self::Friend => write!(f, "friend"),
            Self::Player => write!(f, "player"),
        }
    }
}

// ---------------------------------------------------------------------------
// Request and Response
// ---------------------------------------------------------------------------

/// What an entry asks for, together with who gets the answer.
///
/// The variant decides the kind, and each variant carries exactly the
/// handler type and parameters that kind needs.
pub enum Request {
    Boosters {
        handler: BoosterHandler,
    },
    Session {
        subject: String,
        handler: SessionHandler,
    },
    Friends {
        subject: String,
        handler: FriendHandler,
    },
    Player {
        subject: String,
        handler: PlayerHandler,
    },
}

impl Request {
    pub fn kind(&self) -> RequestKind {
        match self {
            Self::Boosters { .. } => RequestKind::Booster,
            Self::Session { .. } => RequestKind::Session,
            Self::Friends { .. } => RequestKind::Friend,
            Self::Player { .. } => RequestKind::Player,
        }
    }

    /// The player the request is about. `None` for boosters.
    pub fn subject(&self) -> Option<&str> {
        match self {
            Self::Boosters { .. } => None,
            Self::Session { subject, .. }
            | Self::Friends { subject, .. }
            | Self::Player { subject, .. } => Some(subject),
        }
    }

    /// Borrows just what the remote call needs, leaving the handler behind.
    fn target(&self) -> RemoteCall<'_> {
        match self {
            Self::Boosters { .. } => RemoteCall::Boosters,
            Self::Session { subject, .. } => RemoteCall::Session(subject),
            Self::Friends { subject, .. } => RemoteCall::Friends(subject),
            Self::Player { subject, .. } => RemoteCall::Player(subject),
        }
    }

    /// Invokes the handler with "no result".
    fn cancel(self) {
        match self {
            Self::Boosters { handler } => handler.respond(None),
            Self::Session { handler, .. } => handler.respond(None),
            Self::Friends { handler, .. } => handler.respond(None),
            Self::Player { handler, .. } => handler.respond(None),
        }
    }
}

impl fmt::Debug for Request {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Request")
            .field("kind", &self.kind())
            .field("subject", &self.subject())
            .finish_non_exhaustive()
    }
}

/// A decoded, stamped result, ready for the matching handler.
#[derive(Debug, Clone, PartialEq)]
pub enum Response {
    Boosters(Vec<Booster>),
    Session(Session),
    Friends(Vec<Friend>),
    Player(Player),
}

impl Response {
    pub fn kind(&self) -> RequestKind {
        match self {
            Self::Boosters(_) => RequestKind::Booster,
            Self::Session(_) => RequestKind::Session,
            Self::Friends(_) => RequestKind::Friend,
            Self::Player(_) => RequestKind::Player,
        }
    }
}

/// The remote call of a request, without its handler.
///
/// Handlers are `Send` but not `Sync`, so the in-flight future must not
/// hold a reference to the whole [`Request`].
#[derive(Debug, Clone, Copy)]
enum RemoteCall<'a> {
    Boosters,
    Session(&'a str),
    Friends(&'a str),
    Player(&'a str),
}

impl RemoteCall<'_> {
    async fn execute<C: ApiClient>(self, client: &C) -> Result<Reply, ApiError> {
        match self {
            Self::Boosters => client.fetch_boosters().await.map(Reply::from),
            Self::Session(subject) => {
                client.fetch_session(subject).await.map(Reply::from)
            }
            Self::Friends(subject) => {
                client.fetch_friends(subject).await.map(Reply::from)
            }
            Self::Player(subject) => {
                client.fetch_player(subject).await.map(Reply::from)
            }
        }
    }
}

// ---------------------------------------------------------------------------
// QueueEntry
// ---------------------------------------------------------------------------

/// What to do after a failed attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureAction {
    /// Run the same request again, immediately.
    Retry,
    /// Give up: cancel the entry.
    Cancel,
}

/// One pending request.
#[derive(Debug)]
pub struct QueueEntry {
    id: EntryId,
    request: Request,
    created_at: Instant,
    attempts: u32,
    retried: bool,
}

impl QueueEntry {
    /// Wraps a request into a new, pending entry.
    pub fn new(request: Request) -> Self {
        Self {
            id: EntryId(NEXT_ENTRY_ID.fetch_add(1, Ordering::Relaxed)),
            request,
            created_at: Instant::now(),
            attempts: 0,
            retried: false,
        }
    }

    /// An entry listing the active boosters.
    pub fn boosters(
        handler: impl ResponseHandler<Vec<Booster>>,
    ) -> Self {
        Self::new(Request::Boosters {
            handler: Box::new(handler),
        })
    }

    /// An entry looking up `subject`'s current session.
    pub fn session(
        subject: impl Into<String>,
        handler: impl ResponseHandler<Session>,
    ) -> Self {
        Self::new(Request::Session {
            subject: subject.into(),
            handler: Box::new(handler),
        })
    }

    /// An entry listing `subject`'s friends.
    pub fn friends(
        subject: impl Into<String>,
        handler: impl ResponseHandler<Vec<Friend>>,
    ) -> Self {
        Self::new(Request::Friends {
            subject: subject.into(),
            handler: Box::new(handler),
        })
    }

    /// An entry fetching `subject`'s profile.
    pub fn player(
        subject: impl Into<String>,
        handler: impl ResponseHandler<Player>,
    ) -> Self {
        Self::new(Request::Player {
            subject: subject.into(),
            handler: Box::new(handler),
        })
    }

    pub fn id(&self) -> EntryId {
        self.id
    }

    pub fn kind(&self) -> RequestKind {
        self.request.kind()
    }

    pub fn subject(&self) -> Option<&str> {
        self.request.subject()
    }

    /// When the entry was constructed.
    pub fn created_at(&self) -> Instant {
        self.created_at
    }

    /// How long the entry has existed.
    pub fn age(&self) -> Duration {
        self.created_at.elapsed()
    }

    /// Number of remote calls issued so far.
    pub fn attempts(&self) -> u32 {
        self.attempts
    }

    /// Whether the entry already used its one retry.
    pub fn retried(&self) -> bool {
        self.retried
    }

    /// Checks that a per-player request actually names a player.
    pub fn validate(&self) -> Result<(), QueueError> {
        match self.subject() {
            Some(subject) if subject.trim().is_empty() => {
                Err(QueueError::EmptySubject(self.kind()))
            }
            _ => Ok(()),
        }
    }

    /// Issues this entry's remote call.
    ///
    /// Each call counts as one attempt. The returned future borrows only
    /// the player name, never the handler.
    pub fn run<'a, C: ApiClient>(
        &'a mut self,
        client: &'a C,
    ) -> impl Future<Output = Result<Reply, ApiError>> + Send + 'a {
        self.attempts += 1;
        self.request.target().execute(client)
    }

    /// Decodes a successful reply into this entry's [`Response`].
    ///
    /// # Errors
    /// Returns [`ApiError::Decode`] for malformed elements and
    /// [`ApiError::UnexpectedReply`] if `reply` is of another kind.
    pub fn decode<K: Codec>(
        &self,
        reply: Reply,
        codec: &K,
    ) -> Result<Response, ApiError> {
        decode_reply(codec, self.kind(), self.subject(), reply)
    }

    /// Records a failed attempt and decides what happens next.
    ///
    /// The first failure flips `retried` and asks for a retry, any later
    /// failure asks for cancellation.
    pub fn on_failure(&mut self) -> FailureAction {
        if self.retried {
            FailureAction::Cancel
        } else {
            self.retried = true;
            FailureAction::Retry
        }
    }

    /// Delivers a decoded result to the handler.
    pub fn complete(self, response: Response) {
        let id = self.id;
        match (self.request, response) {
            (Request::Boosters { handler }, Response::Boosters(boosters)) => {
                handler.respond(Some(boosters))
            }
            (Request::Session { handler, .. }, Response::Session(session)) => {
                handler.respond(Some(session))
            }
            (Request::Friends { handler, .. }, Response::Friends(friends)) => {
                handler.respond(Some(friends))
            }
            (Request::Player { handler, .. }, Response::Player(player)) => {
                handler.respond(Some(player))
            }
            (request, response) => {
                tracing::error!(
                    entry_id = %id,
                    kind = %request.kind(),
                    response = %response.kind(),
                    "response does not match request, cancelling"
                );
                request.cancel();
            }
        }
    }

    /// Invokes the handler with "no result".
    pub fn cancel(self) {
        self.request.cancel();
    }
}
