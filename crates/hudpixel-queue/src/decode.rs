//! Maps raw replies onto stamped domain representations.
//!
//! | Kind    | Reply payload         | Result                                   |
//! |---------|-----------------------|------------------------------------------|
//! | Booster | list of elements      | each decoded, reply order kept           |
//! | Session | one element or `null` | decoded or default, `session_owner` set  |
//! | Friend  | list of elements      | each decoded, `player` set on each       |
//! | Player  | one element or `null` | decoded or default, nothing stamped      |
//!
//! A missing single element is not an error: the caller gets a
//! default-valued record, never "no result". A `success: false` reply or
//! a malformed element is an error, and the queue treats it like a failed
//! remote call.

use hudpixel_api::{ApiError, ApiReply, Codec, Friend, Player, Reply, Session};
use serde_json::Value;

use crate::{RequestKind, Response};

/// Decodes `reply` for a request of `kind` about `subject`.
///
/// # Errors
/// - [`ApiError::Rejected`] if the service answered `success: false`.
/// - [`ApiError::Decode`] if an element doesn't fit its representation.
/// - [`ApiError::UnexpectedReply`] if `reply` is not of `kind`.
pub fn decode_reply<K: Codec>(
    codec: &K,
    kind: RequestKind,
    subject: Option<&str>,
    reply: Reply,
) -> Result<Response, ApiError> {
    let subject = subject.unwrap_or_default();
    let reply = reply.ensure_success()?;

    match (kind, reply) {
        (RequestKind::Booster, Reply::Boosters(reply)) => reply
            .boosters
            .iter()
            .map(|element| codec.decode_element(element))
            .collect::<Result<Vec<_>, _>>()
            .map(Response::Boosters),

        (RequestKind::Session, Reply::Session(reply)) => {
            let mut session: Session =
                decode_optional(codec, reply.session.as_ref())?;
            session.session_owner = subject.to_string();
            Ok(Response::Session(session))
        }

        (RequestKind::Friend, Reply::Friends(reply)) => reply
            .records
            .iter()
            .map(|element| {
                let mut friend: Friend = codec.decode_element(element)?;
                friend.player = subject.to_string();
                Ok(friend)
            })
            .collect::<Result<Vec<_>, ApiError>>()
            .map(Response::Friends),

        (RequestKind::Player, Reply::Player(reply)) => {
            let player: Player = decode_optional(codec, reply.player.as_ref())?;
            Ok(Response::Player(player))
        }

        (kind, reply) => Err(ApiError::UnexpectedReply {
            expected: expected_reply(kind),
            got: reply.kind(),
        }),
    }
}

/// Decodes a single nested element, defaulting when it is absent or `null`.
fn decode_optional<K: Codec, T: serde::de::DeserializeOwned + Default>(
    codec: &K,
    element: Option<&Value>,
) -> Result<T, ApiError> {
    match element {
        None | Some(Value::Null) => Ok(T::default()),
        Some(element) => codec.decode_element(element),
    }
}

fn expected_reply(kind: RequestKind) -> &'static str {
    match kind {
        RequestKind::Booster => hudpixel_api::BoostersReply::KIND,
        RequestKind::Session => hudpixel_api::SessionReply::KIND,
        RequestKind::Friend => hudpixel_api::FriendsReply::KIND,
        RequestKind::Player => hudpixel_api::PlayerReply::KIND,
    }
}

#[cfg(test)]
mod tests {
    use hudpixel_api::{
        BoostersReply, FriendsReply, JsonCodec, PlayerReply, SessionReply,
    };
    use serde_json::json;

    use super::*;

    fn decode(
        kind: RequestKind,
        subject: Option<&str>,
        reply: impl Into<Reply>,
    ) -> Result<Response, ApiError> {
        decode_reply(&JsonCodec, kind, subject, reply.into())
    }

    #[test]
    fn test_boosters_keep_reply_order() {
        let reply = BoostersReply {
            success: true,
            cause: None,
            boosters: vec![
                json!({ "_id": "first", "amount": 2 }),
                json!({ "_id": "second", "amount": 3 }),
                json!({ "_id": "third" }),
            ],
        };

        let Response::Boosters(boosters) =
            decode(RequestKind::Booster, None, reply).unwrap()
        else {
            panic!("expected boosters");
        };

        let ids: Vec<_> = boosters.iter().map(|b| b.id.as_str()).collect();
        assert_eq!(ids, ["first", "second", "third"]);
        assert_eq!(boosters[1].amount, 3.0);
    }

    #[test]
    fn test_empty_booster_list() {
        let reply = BoostersReply {
            success: true,
            ..BoostersReply::default()
        };
        let response = decode(RequestKind::Booster, None, reply).unwrap();
        assert_eq!(response, Response::Boosters(Vec::new()));
    }

    #[test]
    fn test_session_is_stamped_with_subject() {
        let reply = SessionReply {
            success: true,
            cause: None,
            session: Some(json!({
                "gameType": "WALLS3",
                "server": "mini42",
                "players": ["Notch", "jeb_"]
            })),
        };

        let Response::Session(session) =
            decode(RequestKind::Session, Some("Notch"), reply).unwrap()
        else {
            panic!("expected session");
        };

        assert_eq!(session.game_type, "WALLS3");
        assert_eq!(session.players, ["Notch", "jeb_"]);
        assert_eq!(session.session_owner, "Notch");
    }

    #[test]
    fn test_absent_session_defaults_with_owner_only() {
        let reply = SessionReply {
            success: true,
            ..SessionReply::default()
        };

        let response =
            decode(RequestKind::Session, Some("Notch"), reply).unwrap();

        assert_eq!(
            response,
            Response::Session(Session {
                session_owner: "Notch".into(),
                ..Session::default()
            })
        );
    }

    #[test]
    fn test_null_session_defaults_with_owner_only() {
        let reply = SessionReply {
            success: true,
            cause: None,
            session: Some(Value::Null),
        };

        let Response::Session(session) =
            decode(RequestKind::Session, Some("Dinnerbone"), reply).unwrap()
        else {
            panic!("expected session");
        };
        assert_eq!(session.session_owner, "Dinnerbone");
        assert!(!session.is_active());
    }

    #[test]
    fn test_friends_are_stamped_and_ordered() {
        let reply = FriendsReply {
            success: true,
            cause: None,
            records: vec![
                json!({ "sender": "Notch", "receiver": "a" }),
                json!({ "sender": "b", "receiver": "Notch" }),
            ],
        };

        let Response::Friends(friends) =
            decode(RequestKind::Friend, Some("Notch"), reply).unwrap()
        else {
            panic!("expected friends");
        };

        assert_eq!(friends.len(), 2);
        assert!(friends.iter().all(|f| f.player == "Notch"));
        assert_eq!(friends[0].other_party(), "a");
        assert_eq!(friends[1].other_party(), "b");
    }

    #[test]
    fn test_player_is_not_stamped() {
        let reply = PlayerReply {
            success: true,
            cause: None,
            player: Some(json!({ "displayname": "Notch" })),
        };

        let Response::Player(player) =
            decode(RequestKind::Player, Some("notch"), reply).unwrap()
        else {
            panic!("expected player");
        };
        assert_eq!(player.displayname, "Notch");
    }

    #[test]
    fn test_absent_player_defaults() {
        let reply = PlayerReply {
            success: true,
            ..PlayerReply::default()
        };
        let response =
            decode(RequestKind::Player, Some("nobody"), reply).unwrap();
        assert_eq!(response, Response::Player(Player::default()));
    }

    #[test]
    fn test_one_malformed_element_fails_the_whole_list() {
        let reply = FriendsReply {
            success: true,
            cause: None,
            records: vec![json!({ "sender": "a" }), json!("garbage")],
        };

        let result = decode(RequestKind::Friend, Some("Notch"), reply);
        assert!(matches!(result, Err(ApiError::Decode(_))));
    }

    #[test]
    fn test_mismatched_reply_kind() {
        let reply = PlayerReply {
            success: true,
            ..PlayerReply::default()
        };
        let result = decode(RequestKind::Session, Some("Notch"), reply);

        assert!(matches!(
            result,
            Err(ApiError::UnexpectedReply {
                expected: "session",
                got: "player"
            })
        ));
    }

    #[test]
    fn test_rejected_reply_is_an_error() {
        let reply = SessionReply {
            success: false,
            cause: Some("Key throttle".into()),
            session: None,
        };

        let result = decode(RequestKind::Session, Some("Notch"), reply);
        assert!(matches!(result, Err(ApiError::Rejected(ref c)) if c == "Key throttle"));
    }
}
