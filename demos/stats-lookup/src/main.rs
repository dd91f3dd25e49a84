use std::time::Duration;

use hudpixel::prelude::*;
use rand::Rng;
use serde::de::DeserializeOwned;
use serde_json::{Value, json};

// ---------------------------------------------------------------------------
// Fixture service
// ---------------------------------------------------------------------------

/// Stands in for the stats service: canned replies, some latency, and a
/// chance that any call fails.
struct FixtureClient {
    failure_rate: f64,
    latency: Duration,
}

impl FixtureClient {
    async fn answer<R: ApiReply + DeserializeOwned>(
        &self,
        body: Value,
    ) -> Result<R, ApiError> {
        tokio::time::sleep(self.latency).await;

        if rand::rng().random_bool(self.failure_rate) {
            return Err(ApiError::Request("connection reset by peer".into()));
        }

        let bytes = serde_json::to_vec(&body)
            .map_err(|e| ApiError::Request(e.to_string()))?;
        let reply: R = JsonCodec.decode_reply(&bytes)?;
        reply.ensure_success()
    }
}

impl ApiClient for FixtureClient {
    async fn fetch_boosters(&self) -> Result<BoostersReply, ApiError> {
        self.answer(json!({
            "success": true,
            "boosters": [
                { "_id": "5a1", "purchaser": "Notch", "amount": 3, "gameType": 3, "length": 3600 },
                { "_id": "5a2", "purchaser": "jeb_", "amount": 2, "gameType": 24, "length": 1800 }
            ]
        }))
        .await
    }

    async fn fetch_session(
        &self,
        subject: &str,
    ) -> Result<SessionReply, ApiError> {
        let session = if subject.eq_ignore_ascii_case("notch") {
            json!({ "gameType": "WALLS3", "server": "mini12B", "players": ["Notch", "jeb_"] })
        } else {
            Value::Null
        };
        self.answer(json!({ "success": true, "session": session }))
            .await
    }

    async fn fetch_friends(
        &self,
        subject: &str,
    ) -> Result<FriendsReply, ApiError> {
        self.answer(json!({
            "success": true,
            "records": [
                { "sender": subject, "receiver": "jeb_", "started": 1_400_000_000_000_i64 },
                { "sender": "Dinnerbone", "receiver": subject, "started": 1_450_000_000_000_i64 }
            ]
        }))
        .await
    }

    async fn fetch_player(
        &self,
        subject: &str,
    ) -> Result<PlayerReply, ApiError> {
        self.answer(json!({
            "success": true,
            "player": {
                "displayname": subject,
                "rank": "ADMIN",
                "karma": 1_337,
                "networkExp": 250_000.0,
                "mostRecentGameType": "WALLS3"
            }
        }))
        .await
    }
}

// ---------------------------------------------------------------------------
// Main
// ---------------------------------------------------------------------------

#[tokio::main]
async fn main() -> Result<(), HudpixelError> {
    hudpixel::logging::init("stats_lookup=info,hudpixel_queue=info,warn")?;

    let names: Vec<String> = std::env::args().skip(1).collect();
    let names = if names.is_empty() {
        vec!["Notch".to_string(), "jeb_".to_string()]
    } else {
        names
    };

    let client = FixtureClient {
        failure_rate: 0.3,
        latency: Duration::from_millis(150),
    };
    let queue = StatsBuilder::new()
        .request_timeout(Duration::from_secs(2))
        .max_entry_age(Duration::from_secs(30))
        .start(client)?;
    let stats = queue.handle();

    // Callback style: fire and forget, the queue reports back later.
    stats.request_boosters(|boosters: Option<Vec<Booster>>| match boosters {
        Some(boosters) => {
            for b in boosters {
                println!(
                    "booster {}: x{} by {} on game {}",
                    b.id, b.amount, b.purchaser, b.game_type
                );
            }
        }
        None => println!("boosters unavailable"),
    })?;

    // Awaitable style, one lookup after another.
    for name in &names {
        match stats.fetch_player(name.as_str()).await? {
            Some(p) => println!(
                "{}: rank {}, karma {}, last played {}",
                p.displayname,
                p.rank.as_deref().unwrap_or("none"),
                p.karma,
                p.most_recent_game_type.as_deref().unwrap_or("nothing"),
            ),
            None => println!("{name}: profile unavailable"),
        }

        match stats.fetch_session(name.as_str()).await? {
            Some(s) if s.is_active() => println!(
                "{}: in {} on {} with {} players",
                s.session_owner,
                s.game_type,
                s.server,
                s.players.len()
            ),
            Some(s) => println!("{}: not in a game", s.session_owner),
            None => println!("{name}: session unavailable"),
        }

        match stats.fetch_friends(name.as_str()).await? {
            Some(friends) => {
                let others: Vec<_> =
                    friends.iter().map(|f| f.other_party()).collect();
                println!("{name}: friends with {}", others.join(", "));
            }
            None => println!("{name}: friends unavailable"),
        }
    }

    let snapshot = stats.stats();
    tracing::info!(
        submitted = snapshot.submitted,
        attempts = snapshot.attempts,
        failures = snapshot.failures,
        completed = snapshot.completed,
        cancelled = snapshot.cancelled,
        "lookups finished"
    );

    queue.shutdown().await;
    Ok(())
}
