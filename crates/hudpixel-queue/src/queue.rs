//! The request queue: one run slot shared by every caller.
//!
//! The queue runs as an actor, an isolated Tokio task that owns the list
//! of waiting entries and the run slot. Everything that touches either
//! goes through its command channel, so admission, release, and starting
//! the next entry never race each other.
//!
//! ```text
//!  callers ──enqueue──→ [ actor: pending FIFO + run slot ] ──spawn──→ driver task
//!                               ↑                                       │
//!                               └────────────── unlock ─────────────────┘
//! ```
//!
//! The driver task executes one entry: up to two remote calls, decoding,
//! and exactly one handler invocation. It owns the entry through a
//! `RunningEntry` guard. Dropping the guard cancels an entry that never
//! finished and sends the unlock, so the slot comes back exactly once even
//! if the task is torn down mid-call.
//!
//! Only the guard can release the slot: the unlock carries a `Slot` whose
//! generation the actor hands out privately when the entry starts.

use std::collections::VecDeque;
use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use hudpixel_api::{
    ApiClient, ApiError, Booster, Codec, Friend, JsonCodec, Player, Session,
};
use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;
use tracing::Instrument;

use crate::{
    EntryId, FailureAction, QueueConfig, QueueEntry, QueueError,
    ResponseHandler, Response,
};

/// Commands sent to the queue actor through its channel.
pub(crate) enum QueueCommand {
    /// Admit an entry to the back of the queue.
    Enqueue(QueueEntry),

    /// The entry holding `slot` has finished.
    Unlock { slot: Slot },

    /// Stop admitting, cancel everything waiting, and exit.
    Shutdown,
}

/// Proof of holding the run slot.
///
/// The generation is private to this module, so an [`EntryId`] alone is
/// not enough to release a slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct Slot {
    id: EntryId,
    generation: u64,
}

// ---------------------------------------------------------------------------
// Stats
// ---------------------------------------------------------------------------

/// A snapshot of the queue's counters.
///
/// Once the queue is idle, every accepted entry is accounted for exactly
/// once: `submitted == completed + cancelled + expired`. Every entry that
/// reached the run slot released it exactly once, counted in `released`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct QueueStats {
    /// Entries accepted by [`QueueHandle::enqueue`].
    pub submitted: u64,
    /// Remote calls issued, retries included.
    pub attempts: u64,
    /// Failed attempts reported through [`QueueHandle::report_failure`].
    pub failures: u64,
    /// Entries whose handler received a result.
    pub completed: u64,
    /// Entries whose handler received "no result" after failing twice
    /// or because the queue shut down.
    pub cancelled: u64,
    /// Entries cancelled for waiting longer than `max_entry_age`.
    pub expired: u64,
    /// Run-slot releases, one per entry that held the slot.
    pub released: u64,
}

#[derive(Default)]
struct Counters {
    submitted: AtomicU64,
    attempts: AtomicU64,
    failures: AtomicU64,
    completed: AtomicU64,
    cancelled: AtomicU64,
    expired: AtomicU64,
    released: AtomicU64,
}

impl Counters {
    fn bump(counter: &AtomicU64) {
        counter.fetch_add(1, Ordering::Relaxed);
    }

    fn snapshot(&self) -> QueueStats {
        QueueStats {
            submitted: self.submitted.load(Ordering::Relaxed),
            attempts: self.attempts.load(Ordering::Relaxed),
            failures: self.failures.load(Ordering::Relaxed),
            completed: self.completed.load(Ordering::Relaxed),
            cancelled: self.cancelled.load(Ordering::Relaxed),
            expired: self.expired.load(Ordering::Relaxed),
            released: self.released.load(Ordering::Relaxed),
        }
    }
}

/// State shared by the actor, every handle, and every driver task.
/// Immutable after start, apart from the atomic counters.
struct Shared<C, K> {
    client: C,
    codec: K,
    config: QueueConfig,
    counters: Counters,
}

// ---------------------------------------------------------------------------
// QueueHandle
// ---------------------------------------------------------------------------

/// Handle to a running request queue.
///
/// Cheap to clone: an `Arc` and a channel sender. Hand one to every
/// component that needs stats data.
pub struct QueueHandle<C, K = JsonCodec> {
    shared: Arc<Shared<C, K>>,
    sender: mpsc::UnboundedSender<QueueCommand>,
}

impl<C, K> Clone for QueueHandle<C, K> {
    fn clone(&self) -> Self {
        Self {
            shared: Arc::clone(&self.shared),
            sender: self.sender.clone(),
        }
    }
}

impl<C: ApiClient, K: Codec> QueueHandle<C, K> {
    /// Submits an entry. Returns immediately.
    ///
    /// The entry runs as soon as the run slot is free and everything
    /// admitted before it has finished.
    ///
    /// # Errors
    /// - [`QueueError::EmptySubject`] for a per-player entry without a name.
    /// - [`QueueError::Closed`] if the queue has shut down.
    ///
    /// In both cases the entry's handler has already received "no result".
    pub fn enqueue(&self, entry: QueueEntry) -> Result<EntryId, QueueError> {
        if let Err(e) = entry.validate() {
            tracing::warn!(entry_id = %entry.id(), error = %e, "entry rejected");
            cancel_entry(entry);
            return Err(e);
        }

        let id = entry.id();
        // Counted before the send so a snapshot never shows an entry
        // finishing before it was submitted.
        let submitted = &self.shared.counters.submitted;
        Counters::bump(submitted);
        if let Err(mpsc::error::SendError(command)) =
            self.sender.send(QueueCommand::Enqueue(entry))
        {
            submitted.fetch_sub(1, Ordering::Relaxed);
            tracing::debug!(entry_id = %id, "queue closed, cancelling entry");
            if let QueueCommand::Enqueue(entry) = command {
                cancel_entry(entry);
            }
            return Err(QueueError::Closed);
        }

        Ok(id)
    }

    /// Releases `slot` so the next entry can start.
    fn release(&self, slot: Slot) {
        Counters::bump(&self.shared.counters.released);
        // A closed channel means the queue is gone and there is no slot to free.
        let _ = self.sender.send(QueueCommand::Unlock { slot });
    }

    /// Records a failed attempt. Purely informational: whether the entry
    /// retries is decided by the entry itself.
    pub fn report_failure(&self, cause: &ApiError, was_retry: bool) {
        Counters::bump(&self.shared.counters.failures);
        if was_retry {
            tracing::error!(error = %cause, "request failed on retry, giving up");
        } else {
            tracing::warn!(error = %cause, "request failed, retrying once");
        }
    }

    /// The shared remote client.
    pub fn client(&self) -> &C {
        &self.shared.client
    }

    /// The shared codec.
    pub fn codec(&self) -> &K {
        &self.shared.codec
    }

    pub fn config(&self) -> &QueueConfig {
        &self.shared.config
    }

    /// Current counter values.
    pub fn stats(&self) -> QueueStats {
        self.shared.counters.snapshot()
    }

    /// Returns `true` once the queue no longer accepts entries.
    pub fn is_closed(&self) -> bool {
        self.sender.is_closed()
    }

    // -- Submissions, one per request kind --

    /// Requests the active boosters.
    pub fn request_boosters(
        &self,
        handler: impl ResponseHandler<Vec<Booster>>,
    ) -> Result<EntryId, QueueError> {
        self.enqueue(QueueEntry::boosters(handler))
    }

    /// Requests the session `subject` is in.
    pub fn request_session(
        &self,
        subject: impl Into<String>,
        handler: impl ResponseHandler<Session>,
    ) -> Result<EntryId, QueueError> {
        self.enqueue(QueueEntry::session(subject, handler))
    }

    /// Requests the friend records of `subject`.
    pub fn request_friends(
        &self,
        subject: impl Into<String>,
        handler: impl ResponseHandler<Vec<Friend>>,
    ) -> Result<EntryId, QueueError> {
        self.enqueue(QueueEntry::friends(subject, handler))
    }

    /// Requests the profile of `subject`.
    pub fn request_player(
        &self,
        subject: impl Into<String>,
        handler: impl ResponseHandler<Player>,
    ) -> Result<EntryId, QueueError> {
        self.enqueue(QueueEntry::player(subject, handler))
    }

    // -- Awaitable variants --

    /// Like [`request_boosters`](Self::request_boosters), but waits for
    /// the outcome. `Ok(None)` means the data is unavailable this time.
    pub async fn fetch_boosters(
        &self,
    ) -> Result<Option<Vec<Booster>>, QueueError> {
        let (tx, rx) = oneshot::channel();
        self.request_boosters(move |result: Option<Vec<Booster>>| {
            let _ = tx.send(result);
        })?;
        Ok(rx.await.ok().flatten())
    }

    /// Awaitable [`request_session`](Self::request_session).
    pub async fn fetch_session(
        &self,
        subject: impl Into<String>,
    ) -> Result<Option<Session>, QueueError> {
        let (tx, rx) = oneshot::channel();
        self.request_session(subject, move |result: Option<Session>| {
            let _ = tx.send(result);
        })?;
        Ok(rx.await.ok().flatten())
    }

    /// Awaitable [`request_friends`](Self::request_friends).
    pub async fn fetch_friends(
        &self,
        subject: impl Into<String>,
    ) -> Result<Option<Vec<Friend>>, QueueError> {
        let (tx, rx) = oneshot::channel();
        self.request_friends(subject, move |result: Option<Vec<Friend>>| {
            let _ = tx.send(result);
        })?;
        Ok(rx.await.ok().flatten())
    }

    /// Awaitable [`request_player`](Self::request_player).
    pub async fn fetch_player(
        &self,
        subject: impl Into<String>,
    ) -> Result<Option<Player>, QueueError> {
        let (tx, rx) = oneshot::channel();
        self.request_player(subject, move |result: Option<Player>| {
            let _ = tx.send(result);
        })?;
        Ok(rx.await.ok().flatten())
    }
}

// ---------------------------------------------------------------------------
// RequestQueue
// ---------------------------------------------------------------------------

/// An explicitly started request queue.
///
/// Create one at application start, pass [`QueueHandle`]s to whatever
/// needs stats data, and call [`shutdown`](Self::shutdown) when done.
///
/// ```rust,no_run
/// # use hudpixel_api::ApiClient;
/// # async fn demo(client: impl ApiClient) {
/// use hudpixel_queue::RequestQueue;
///
/// let queue = RequestQueue::new(client);
/// let stats = queue.handle();
///
/// if let Ok(Some(player)) = stats.fetch_player("Notch").await {
///     println!("{} has {} karma", player.displayname, player.karma);
/// }
///
/// queue.shutdown().await;
/// # }
/// ```
pub struct RequestQueue<C, K = JsonCodec> {
    handle: QueueHandle<C, K>,
    actor: JoinHandle<()>,
}

impl<C: ApiClient> RequestQueue<C, JsonCodec> {
    /// Starts a queue with the JSON codec and default configuration.
    ///
    /// Must be called from within a Tokio runtime.
    pub fn new(client: C) -> Self {
        Self::start(client, JsonCodec, QueueConfig::default())
    }
}

impl<C: ApiClient, K: Codec> RequestQueue<C, K> {
    /// Starts the queue actor on the current Tokio runtime.
    pub fn start(client: C, codec: K, config: QueueConfig) -> Self {
        let (sender, receiver) = mpsc::unbounded_channel();

        let shared = Arc::new(Shared {
            client,
            codec,
            config,
            counters: Counters::default(),
        });

        tracing::info!(
            request_timeout = ?shared.config.request_timeout,
            max_entry_age = ?shared.config.max_entry_age,
            "request queue started"
        );

        let actor = QueueActor {
            shared: Arc::clone(&shared),
            sender: sender.downgrade(),
            receiver,
            pending: VecDeque::new(),
            running: None,
            driver: None,
            next_generation: 0,
        };
        let actor = tokio::spawn(actor.run());

        Self {
            handle: QueueHandle { shared, sender },
            actor,
        }
    }

    /// Returns a new handle to this queue.
    pub fn handle(&self) -> QueueHandle<C, K> {
        self.handle.clone()
    }

    /// Shuts the queue down.
    ///
    /// Entries still waiting are cancelled (their handlers get "no
    /// result"). The entry holding the run slot, if any, finishes
    /// normally; this returns once its handler has run. With
    /// `request_timeout` disabled, that wait is as long as the client's.
    pub async fn shutdown(self) {
        // If the send fails the actor has already exited.
        let _ = self.handle.sender.send(QueueCommand::Shutdown);
        if let Err(e) = self.actor.await {
            tracing::error!(error = %e, "request queue actor failed");
        }
    }
}

// ---------------------------------------------------------------------------
// Actor
// ---------------------------------------------------------------------------

/// The internal queue state. Runs inside a Tokio task.
struct QueueActor<C: ApiClient, K: Codec> {
    shared: Arc<Shared<C, K>>,
    /// Weak, so the actor alone doesn't keep its own channel open.
    sender: mpsc::WeakUnboundedSender<QueueCommand>,
    receiver: mpsc::UnboundedReceiver<QueueCommand>,
    pending: VecDeque<QueueEntry>,
    /// The slot handed to the running entry, if any.
    running: Option<Slot>,
    /// Driver task of the most recently started entry.
    driver: Option<JoinHandle<()>>,
    next_generation: u64,
}

impl<C: ApiClient, K: Codec> QueueActor<C, K> {
    /// Processes commands until shutdown or until every handle is gone.
    async fn run(mut self) {
        while let Some(command) = self.receiver.recv().await {
            match command {
                QueueCommand::Enqueue(entry) => {
                    tracing::debug!(
                        entry_id = %entry.id(),
                        kind = %entry.kind(),
                        subject = ?entry.subject(),
                        waiting = self.pending.len(),
                        "entry admitted"
                    );
                    self.pending.push_back(entry);
                    self.advance();
                }
                QueueCommand::Unlock { slot } => self.handle_unlock(slot),
                QueueCommand::Shutdown => {
                    tracing::info!("request queue shutting down");
                    self.receiver.close();
                    break;
                }
            }
        }

        // Entries that raced the shutdown are still buffered.
        while let Ok(command) = self.receiver.try_recv() {
            if let QueueCommand::Enqueue(entry) = command {
                self.pending.push_back(entry);
            }
        }

        let cancelled = self.cancel_pending();

        if let Some(driver) = self.driver.take() {
            if let Err(e) = driver.await {
                tracing::error!(error = %e, "entry driver task failed");
            }
        }

        tracing::info!(cancelled, "request queue stopped");
    }

    /// Cancels every waiting entry. Returns how many there were.
    fn cancel_pending(&mut self) -> usize {
        let cancelled = self.pending.len();
        for entry in self.pending.drain(..) {
            Counters::bump(&self.shared.counters.cancelled);
            cancel_entry(entry);
        }
        cancelled
    }

    fn handle_unlock(&mut self, slot: Slot) {
        if self.running != Some(slot) {
            tracing::warn!(
                entry_id = %slot.id,
                running = ?self.running.map(|s| s.id),
                "unlock from an entry that does not hold the run slot"
            );
            return;
        }

        self.running = None;
        tracing::debug!(entry_id = %slot.id, "run slot released");
        self.advance();
    }

    /// Starts the next waiting entry if the run slot is free.
    ///
    /// Stale entries at the front are cancelled on the way.
    fn advance(&mut self) {
        if self.running.is_some() {
            return;
        }

        while let Some(entry) = self.pending.pop_front() {
            if let Some(max_age) = self.shared.config.max_entry_age {
                let age = entry.age();
                if age > max_age {
                    tracing::warn!(
                        entry_id = %entry.id(),
                        kind = %entry.kind(),
                        age = ?age,
                        "entry went stale while waiting, cancelling"
                    );
                    Counters::bump(&self.shared.counters.expired);
                    cancel_entry(entry);
                    continue;
                }
            }

            let Some(sender) = self.sender.upgrade() else {
                // Every handle is gone; nobody could release the slot.
                Counters::bump(&self.shared.counters.cancelled);
                cancel_entry(entry);
                continue;
            };

            let slot = Slot {
                id: entry.id(),
                generation: self.next_generation,
            };
            self.next_generation += 1;
            let span = tracing::debug_span!(
                "queue_entry",
                entry_id = %slot.id,
                kind = %entry.kind(),
                subject = ?entry.subject(),
            );
            let handle = QueueHandle {
                shared: Arc::clone(&self.shared),
                sender,
            };

            self.running = Some(slot);
            let running = RunningEntry {
                entry: Some(entry),
                slot,
                queue: handle,
            };
            self.driver = Some(tokio::spawn(running.drive().instrument(span)));
            return;
        }
    }
}

// ---------------------------------------------------------------------------
// Driver
// ---------------------------------------------------------------------------

/// Entries left waiting when the actor is dropped without a shutdown,
/// e.g. because the runtime went away.
impl<C: ApiClient, K: Codec> Drop for QueueActor<C, K> {
    fn drop(&mut self) {
        let cancelled = self.cancel_pending();
        if cancelled > 0 {
            tracing::warn!(cancelled, "request queue dropped with entries waiting");
        }
    }
}

/// The entry holding the run slot, owned by its driver task.
///
/// `entry` is taken out once the handler has been invoked. Dropping the
/// guard cancels an entry that is still here and releases the slot.
struct RunningEntry<C: ApiClient, K: Codec> {
    entry: Option<QueueEntry>,
    slot: Slot,
    queue: QueueHandle<C, K>,
}

impl<C: ApiClient, K: Codec> RunningEntry<C, K> {
    /// Executes the entry to completion.
    async fn drive(mut self) {
        let shared = Arc::clone(&self.queue.shared);
        let counters = &shared.counters;

        while let Some(entry) = self.entry.as_mut() {
            Counters::bump(&counters.attempts);
            tracing::debug!(attempt = entry.attempts() + 1, "issuing remote call");

            match attempt(entry, &shared).await {
                Ok(response) => {
                    if let Some(entry) = self.entry.take() {
                        Counters::bump(&counters.completed);
                        let id = entry.id();
                        respond_contained(id, || entry.complete(response));
                    }
                }
                Err(cause) => {
                    self.queue.report_failure(&cause, entry.retried());
                    if entry.on_failure() == FailureAction::Cancel {
                        if let Some(entry) = self.entry.take() {
                            Counters::bump(&counters.cancelled);
                            cancel_entry(entry);
                        }
                    }
                }
            }
        }
    }
}

impl<C: ApiClient, K: Codec> Drop for RunningEntry<C, K> {
    fn drop(&mut self) {
        if let Some(entry) = self.entry.take() {
            tracing::warn!(
                entry_id = %entry.id(),
                "entry dropped before finishing, cancelling"
            );
            Counters::bump(&self.queue.shared.counters.cancelled);
            cancel_entry(entry);
        }
        self.queue.release(self.slot);
    }
}

/// One remote call plus decoding, under the configured watchdog.
async fn attempt<C: ApiClient, K: Codec>(
    entry: &mut QueueEntry,
    shared: &Shared<C, K>,
) -> Result<Response, ApiError> {
    let call = entry.run(&shared.client);
    let reply = match shared.config.request_timeout {
        Some(limit) => tokio::time::timeout(limit, call)
            .await
            .map_err(|_| ApiError::Timeout(limit))??,
        None => call.await?,
    };
    entry.decode(reply, &shared.codec)
}

/// Cancels an entry, containing a handler panic.
fn cancel_entry(entry: QueueEntry) {
    let id = entry.id();
    respond_contained(id, || entry.cancel());
}

/// Runs a handler invocation so that a panicking handler can't take the
/// actor, a driver, or a submitting caller down with it.
fn respond_contained(id: EntryId, respond: impl FnOnce()) {
    if panic::catch_unwind(AssertUnwindSafe(respond)).is_err() {
        tracing::error!(entry_id = %id, "response handler panicked");
    }
}
