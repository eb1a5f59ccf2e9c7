//! Identity types shared by every layer.
//!
//! Both ids are opaque strings on the wire. Room ids are short (8 hex
//! chars of a v4 uuid) because they end up in shareable links; participant
//! ids are full uuids generated either by the client (so they survive
//! page reloads) or by the server when the client supplies none.

use serde::{Deserialize, Serialize};
use std::fmt;

/// A unique, unguessable identifier for a room.
///
/// `#[serde(transparent)]` makes `RoomId("ab12cd34")` serialize as the
/// plain string `"ab12cd34"`, which is what clients put in invite links.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RoomId(pub String);

impl fmt::Display for RoomId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for RoomId {
    fn from(s: &str) -> Self {
        RoomId(s.to_owned())
    }
}

/// A stable identity for a participant within a room.
///
/// This is what survives a page reload: the client stores its id per
/// (room, name) pair and presents it on every join, which is how the
/// server recognizes a reconnection.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ParticipantId(pub String);

impl fmt::Display for ParticipantId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for ParticipantId {
    fn from(s: &str) -> Self {
        ParticipantId(s.to_owned())
    }
}

/// One entry in a room's wheel.
///
/// Order matters: the participant list is broadcast in join order, the
/// client renders the wheel in that order, and the drawn index refers to
/// it. Two lists with the same members in a different order are NOT
/// equivalent.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Participant {
    pub id: ParticipantId,
    pub name: String,
}

impl Participant {
    pub fn new(id: ParticipantId, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
        }
    }
}
