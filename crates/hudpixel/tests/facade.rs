//! End-to-end tests through the facade crate.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use hudpixel::prelude::*;
use serde_json::json;

/// Answers from fixed envelopes; the first `flaky` calls fail.
struct FixtureClient {
    flaky: AtomicUsize,
}

impl FixtureClient {
    fn new(flaky: usize) -> Self {
        Self {
            flaky: AtomicUsize::new(flaky),
        }
    }

    fn check(&self) -> Result<(), ApiError> {
        let left = self.flaky.load(Ordering::SeqCst);
        if left > 0 {
            self.flaky.store(left - 1, Ordering::SeqCst);
            return Err(ApiError::Request("503 Service Unavailable".into()));
        }
        Ok(())
    }

    fn envelope<R: ApiReply + serde::de::DeserializeOwned>(
        &self,
        body: serde_json::Value,
    ) -> Result<R, ApiError> {
        self.check()?;
        let bytes = serde_json::to_vec(&body)
            .map_err(|e| ApiError::Request(e.to_string()))?;
        let reply: R = JsonCodec.decode_reply(&bytes)?;
        reply.ensure_success()
    }
}

impl ApiClient for FixtureClient {
    async fn fetch_boosters(&self) -> Result<BoostersReply, ApiError> {
        self.envelope(json!({
            "success": true,
            "boosters": [{ "_id": "b1", "purchaser": "Notch", "amount": 2 }]
        }))
    }

    async fn fetch_session(
        &self,
        _subject: &str,
    ) -> Result<SessionReply, ApiError> {
        self.envelope(json!({ "success": true, "session": null }))
    }

    async fn fetch_friends(
        &self,
        _subject: &str,
    ) -> Result<FriendsReply, ApiError> {
        self.envelope(json!({ "success": false, "cause": "Invalid API key" }))
    }

    async fn fetch_player(
        &self,
        subject: &str,
    ) -> Result<PlayerReply, ApiError> {
        self.envelope(json!({
            "success": true,
            "player": { "displayname": subject, "networkExp": 1500.5 }
        }))
    }
}

#[tokio::test(start_paused = true)]
async fn test_builder_starts_working_queue() {
    let queue = StatsBuilder::new()
        .request_timeout(Duration::from_secs(2))
        .start(FixtureClient::new(1))
        .unwrap();
    let stats = queue.handle();

    let player = stats.fetch_player("Notch").await.unwrap().unwrap();
    assert_eq!(player.displayname, "Notch");
    assert_eq!(player.network_exp, 1500.5);

    let boosters = stats.fetch_boosters().await.unwrap().unwrap();
    assert_eq!(boosters[0].purchaser, "Notch");

    let session = stats.fetch_session("Notch").await.unwrap().unwrap();
    assert_eq!(session.session_owner, "Notch");
    assert!(!session.is_active());

    let snapshot = stats.stats();
    assert_eq!(snapshot.submitted, 3);
    assert_eq!(snapshot.attempts, 4, "first player call was retried");
    assert_eq!(snapshot.completed, 3);

    queue.shutdown().await;
}

#[tokio::test(start_paused = true)]
async fn test_rejected_key_yields_no_result() {
    let queue = StatsBuilder::new().start(FixtureClient::new(0)).unwrap();
    let stats = queue.handle();

    let friends = stats.fetch_friends("Notch").await.unwrap();
    assert!(friends.is_none());
    assert_eq!(stats.stats().cancelled, 1);

    queue.shutdown().await;
}

#[tokio::test(start_paused = true)]
async fn test_queue_errors_convert_with_question_mark() {
    async fn lookup(
        stats: &QueueHandle<FixtureClient>,
    ) -> Result<Option<Player>, HudpixelError> {
        Ok(stats.fetch_player("").await?)
    }

    let queue = StatsBuilder::new().start(FixtureClient::new(0)).unwrap();
    let result = lookup(&queue.handle()).await;

    assert!(matches!(
        result,
        Err(HudpixelError::Queue(QueueError::EmptySubject(
            RequestKind::Player
        )))
    ));
    queue.shutdown().await;
}

#[test]
fn test_start_outside_runtime_fails() {
    let result = StatsBuilder::new().start(FixtureClient::new(0));
    assert!(matches!(result, Err(HudpixelError::NoRuntime)));
}

#[test]
fn test_zero_timeout_fails() {
    let result = StatsBuilder::new()
        .request_timeout(Duration::ZERO)
        .start(FixtureClient::new(0));
    assert!(matches!(result, Err(HudpixelError::Config(_))));
}
