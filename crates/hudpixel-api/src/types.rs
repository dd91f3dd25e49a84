//! Domain representations decoded from stats API replies.
//!
//! These are plain value records. The service speaks camelCase JSON, so
//! every struct renames its fields, and every struct is `#[serde(default)]`:
//! a field the service leaves out decodes to its zero value instead of
//! failing the whole reply.
//!
//! Two fields are not part of any reply and are filled in locally after
//! decoding: [`Session::session_owner`] and [`Friend::player`]. Both carry
//! the name the request was made for.

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Booster
// ---------------------------------------------------------------------------

/// A network booster: a coin multiplier someone bought for one game.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Booster {
    #[serde(rename = "_id")]
    pub id: String,

    /// UUID of the player who bought the booster.
    pub purchaser_uuid: String,

    /// Display name of the buyer, when the service includes it.
    pub purchaser: String,

    /// Coin multiplier.
    pub amount: f64,

    /// Full duration in seconds.
    pub original_length: i64,

    /// Seconds left.
    pub length: i64,

    /// Numeric game type the booster applies to.
    pub game_type: i64,

    /// Activation time, epoch milliseconds.
    pub date_activated: i64,
}

// ---------------------------------------------------------------------------
// Session
// ---------------------------------------------------------------------------

/// The game session a player is currently in.
///
/// An all-zero session with only `session_owner` set means the player is
/// not in a game right now (or is offline).
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Session {
    #[serde(rename = "_id")]
    pub id: String,

    /// Game type name, e.g. `"WALLS3"`.
    pub game_type: String,

    /// Server the session is hosted on.
    pub server: String,

    /// Names of everyone in the session.
    pub players: Vec<String>,

    /// The player this session was requested for. Set locally.
    pub session_owner: String,
}

impl Session {
    /// Returns `true` if the reply actually described a session.
    pub fn is_active(&self) -> bool {
        !self.server.is_empty() || !self.game_type.is_empty()
    }
}

// ---------------------------------------------------------------------------
// Friend
// ---------------------------------------------------------------------------

/// One friendship link of a player.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Friend {
    #[serde(rename = "_id")]
    pub id: String,

    /// Who sent the friend request.
    #[serde(alias = "uuidSender")]
    pub sender: String,

    /// Who accepted it.
    #[serde(alias = "uuidReceiver")]
    pub receiver: String,

    /// When the friendship started, epoch milliseconds.
    pub started: i64,

    /// The player whose friend list this record came from. Set locally.
    pub player: String,
}

impl Friend {
    /// The side of the link that isn't [`Friend::player`].
    ///
    /// Player names compare case-insensitively.
    pub fn other_party(&self) -> &str {
        if self.sender.eq_ignore_ascii_case(&self.player) {
            &self.receiver
        } else {
            &self.sender
        }
    }
}

// ---------------------------------------------------------------------------
// Player
// ---------------------------------------------------------------------------

/// A player profile.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Player {
    pub uuid: String,

    /// The service sends this field all lowercase.
    pub displayname: String,

    /// Staff or special rank, if any.
    pub rank: Option<String>,

    /// Purchased rank package, e.g. `"VIP_PLUS"`.
    pub package_rank: Option<String>,

    pub network_exp: f64,

    pub karma: i64,

    /// Epoch milliseconds.
    pub first_login: i64,

    /// Epoch milliseconds.
    pub last_login: i64,

    pub most_recent_game_type: Option<String>,
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn test_booster_decodes_camel_case_fields() {
        let booster: Booster = serde_json::from_value(json!({
            "_id": "b1",
            "purchaserUuid": "abc",
            "amount": 3,
            "originalLength": 3600,
            "length": 1800,
            "gameType": 24,
            "dateActivated": 1_430_000_000_000_i64
        }))
        .unwrap();

        assert_eq!(booster.id, "b1");
        assert_eq!(booster.purchaser_uuid, "abc");
        assert_eq!(booster.amount, 3.0);
        assert_eq!(booster.original_length, 3600);
        assert_eq!(booster.length, 1800);
        assert_eq!(booster.game_type, 24);
        assert!(booster.purchaser.is_empty());
    }

    #[test]
    fn test_session_missing_fields_are_zero() {
        let session: Session =
            serde_json::from_value(json!({ "server": "mini12" })).unwrap();

        assert_eq!(session.server, "mini12");
        assert!(session.game_type.is_empty());
        assert!(session.players.is_empty());
        assert!(session.session_owner.is_empty());
        assert!(session.is_active());
    }

    #[test]
    fn test_default_session_is_inactive() {
        assert!(!Session::default().is_active());
    }

    #[test]
    fn test_friend_accepts_uuid_aliases() {
        let friend: Friend = serde_json::from_value(json!({
            "uuidSender": "a",
            "uuidReceiver": "b",
            "started": 7
        }))
        .unwrap();

        assert_eq!(friend.sender, "a");
        assert_eq!(friend.receiver, "b");
        assert_eq!(friend.started, 7);
    }

    #[test]
    fn test_friend_other_party() {
        let mut friend = Friend {
            sender: "Notch".into(),
            receiver: "jeb_".into(),
            ..Friend::default()
        };

        friend.player = "notch".into();
        assert_eq!(friend.other_party(), "jeb_");

        friend.player = "jeb_".into();
        assert_eq!(friend.other_party(), "Notch");
    }

    #[test]
    fn test_player_displayname_and_options() {
        let player: Player = serde_json::from_value(json!({
            "displayname": "Notch",
            "packageRank": "MVP",
            "networkExp": 1250.5,
            "lastLogin": 99
        }))
        .unwrap();

        assert_eq!(player.displayname, "Notch");
        assert_eq!(player.package_rank.as_deref(), Some("MVP"));
        assert_eq!(player.rank, None);
        assert_eq!(player.network_exp, 1250.5);
        assert_eq!(player.last_login, 99);
    }
}
