//! Error types for the room layer.

use spinroom_protocol::RoomId;

/// Errors that can occur during room operations.
///
/// These map one-to-one onto what the client is told: HTTP status codes
/// on the one-shot surface, `join_error` / `roulette_error` /
/// `room_expired` events on the connection surface.
#[derive(Debug, thiserror::Error)]
pub enum RoomError {
    /// The owner name was blank (empty after trimming).
    #[error("owner name must not be blank")]
    InvalidName,

    /// The room does not exist (never created, or already evicted).
    #[error("room {0} not found")]
    NotFound(RoomId),

    /// The room has already spun — its invite link no longer admits
    /// new participants.
    #[error("the invite link has expired")]
    Expired(RoomId),

    /// Another participant already uses this name (case-insensitive).
    #[error("a participant named \"{0}\" is already in the room")]
    NameTaken(String),

    /// The caller is not the room owner, or presented a token that does
    /// not match the stored one.
    #[error("only the room owner may do that")]
    Unauthorized,

    /// Starting the roulette requires at least `needed` participants.
    #[error("at least {needed} participants are required to spin, the room has {have}")]
    InsufficientParticipants { needed: usize, have: usize },

    /// The roulette was already started for this room.
    #[error("the roulette has already been started")]
    AlreadyStarted(RoomId),

    /// A programming-invariant guard: an operation was attempted out of
    /// order (e.g., recording a winner before the room started).
    #[error("invalid room state transition: {0}")]
    InvalidTransition(String),
}
