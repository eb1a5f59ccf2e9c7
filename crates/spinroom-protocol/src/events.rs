//! Events exchanged over the persistent connection.
//!
//! Every frame is a JSON object tagged by a `type` field, with the
//! remaining fields in camelCase — the shape browser clients already
//! speak:
//!
//! ```text
//! {"type":"join_room","roomId":"ab12cd34","name":"Ben","userId":"u-2"}
//! {"type":"participants_update","participants":[{"id":"u-1","name":"Ada"}]}
//! ```

use serde::{Deserialize, Serialize};

use crate::{Participant, ParticipantId, RoomId};

/// Client → server events.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case", rename_all_fields = "camelCase")]
pub enum ClientEvent {
    /// Enter a room, either as a fresh participant or as a reconnection
    /// (when `user_id` matches a participant inside its grace period).
    /// `owner_token` is only meaningful when `name` is the owner's name.
    JoinRoom {
        room_id: RoomId,
        name: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        owner_token: Option<String>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        user_id: Option<ParticipantId>,
    },

    /// Ask for the authoritative participant list. Clients poll this on
    /// an interval to correct drift; the answer is always the full
    /// snapshot, never a delta.
    RequestParticipants { room_id: RoomId },

    /// Owner-only: start the spin. The token proves possession of the
    /// room-owner credential handed out at creation.
    StartRoulette {
        room_id: RoomId,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        owner_token: Option<String>,
    },

    /// Explicit departure. Unlike a dropped connection, this removes the
    /// participant immediately with no grace period.
    LeaveRoom { room_id: RoomId },
}

/// Server → client events.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case", rename_all_fields = "camelCase")]
pub enum ServerEvent {
    /// Individual ack to a successful join, carrying the resolved
    /// participant record (the client learns its server-side id here).
    Joined { participant: Participant },

    /// Full participant list in join order, broadcast to the whole room.
    ParticipantsUpdate { participants: Vec<Participant> },

    /// A join attempt failed. Sent to the requester only.
    JoinError { message: String },

    /// The spin is about to happen — start the wheel animation now.
    RouletteStart,

    /// The winner, announced to the whole room exactly once.
    RouletteResult { participant: Participant },

    /// A start attempt failed. Sent to the requester only.
    RouletteError { message: String },

    /// The room has already spun; new joins are no longer accepted.
    RoomExpired { message: String },
}

#[cfg(test)]
mod tests {
    //! The wire shapes are a contract with deployed clients, so these
    //! tests pin the exact JSON rather than round-tripping blindly.

    use super::*;

    #[test]
    fn test_join_room_json_shape() {
        let ev = ClientEvent::JoinRoom {
            room_id: RoomId::from("ab12cd34"),
            name: "Ben".into(),
            owner_token: None,
            user_id: Some(ParticipantId::from("u-2")),
        };
        let json: serde_json::Value = serde_json::to_value(&ev).unwrap();

        assert_eq!(json["type"], "join_room");
        assert_eq!(json["roomId"], "ab12cd34");
        assert_eq!(json["name"], "Ben");
        assert_eq!(json["userId"], "u-2");
        // Absent optionals are omitted, not null.
        assert!(json.get("ownerToken").is_none());
    }

    #[test]
    fn test_join_room_parses_without_optionals() {
        let ev: ClientEvent = serde_json::from_str(
            r#"{"type":"join_room","roomId":"r1","name":"Ada"}"#,
        )
        .unwrap();
        assert_eq!(
            ev,
            ClientEvent::JoinRoom {
                room_id: RoomId::from("r1"),
                name: "Ada".into(),
                owner_token: None,
                user_id: None,
            }
        );
    }

    #[test]
    fn test_start_roulette_json_shape() {
        let ev = ClientEvent::StartRoulette {
            room_id: RoomId::from("r1"),
            owner_token: Some("deadbeef".into()),
        };
        let json: serde_json::Value = serde_json::to_value(&ev).unwrap();
        assert_eq!(json["type"], "start_roulette");
        assert_eq!(json["ownerToken"], "deadbeef");
    }

    #[test]
    fn test_roulette_start_is_bare_tag() {
        // Unit variant → just the tag, no payload fields.
        let json = serde_json::to_string(&ServerEvent::RouletteStart).unwrap();
        assert_eq!(json, r#"{"type":"roulette_start"}"#);
    }

    #[test]
    fn test_participants_update_json_shape() {
        let ev = ServerEvent::ParticipantsUpdate {
            participants: vec![
                Participant::new(ParticipantId::from("u-1"), "Ada"),
                Participant::new(ParticipantId::from("u-2"), "Ben"),
            ],
        };
        let json: serde_json::Value = serde_json::to_value(&ev).unwrap();
        assert_eq!(json["type"], "participants_update");
        assert_eq!(json["participants"][0]["name"], "Ada");
        assert_eq!(json["participants"][1]["name"], "Ben");
    }

    #[test]
    fn test_roulette_result_json_shape() {
        let ev = ServerEvent::RouletteResult {
            participant: Participant::new(ParticipantId::from("u-2"), "Ben"),
        };
        let json: serde_json::Value = serde_json::to_value(&ev).unwrap();
        assert_eq!(json["type"], "roulette_result");
        assert_eq!(json["participant"]["id"], "u-2");
    }

    #[test]
    fn test_room_expired_json_shape() {
        let ev = ServerEvent::RoomExpired {
            message: "invite link has expired".into(),
        };
        let json: serde_json::Value = serde_json::to_value(&ev).unwrap();
        assert_eq!(json["type"], "room_expired");
        assert_eq!(json["message"], "invite link has expired");
    }
}
