//! A single room: owner, participants, and spin state.
//!
//! `Room` enforces its own invariants; the store and protocol layers
//! never touch the fields directly. The invariants:
//!
//! - the owner is a participant for as long as the room exists
//! - `started` flips false → true exactly once and never reverts
//! - a winner is recorded at most once, and only after `started`
//! - participant order is join order with the owner first — this order
//!   is the wheel order the drawn index refers to, so it is a contract

use std::time::{Duration, Instant};

use rand::Rng;
use serde::Serialize;
use spinroom_protocol::{Participant, ParticipantId, RoomId};
use uuid::Uuid;

use crate::RoomError;

/// One roulette session.
pub struct Room {
    id: RoomId,
    owner_name: String,
    owner_id: ParticipantId,
    owner_token: String,
    participants: Vec<Participant>,
    started: bool,
    selected: Option<Participant>,
    created_at: Instant,
}

/// The projection of a room that is safe to hand to any client.
///
/// Never carries `owner_token` or `owner_id` — possession of the token
/// is the only owner credential, so it must not leak through the read
/// surface.
#[derive(Debug, Clone, Serialize)]
pub struct RoomView {
    pub id: RoomId,
    pub owner: String,
    pub participants: Vec<Participant>,
    pub started: bool,
}

impl Room {
    /// Creates a room with the owner as its sole participant.
    ///
    /// Generates the owner's stable participant id and the owner token
    /// (a random 128-bit hex secret; possession of it is what proves
    /// ownership later).
    pub(crate) fn new(id: RoomId, owner_name: String) -> Self {
        let owner_id = ParticipantId(Uuid::new_v4().to_string());
        let owner = Participant::new(owner_id.clone(), owner_name.clone());
        Self {
            id,
            owner_name,
            owner_id,
            owner_token: generate_token(),
            participants: vec![owner],
            started: false,
            selected: None,
            created_at: Instant::now(),
        }
    }

    pub fn id(&self) -> &RoomId {
        &self.id
    }

    pub fn owner_name(&self) -> &str {
        &self.owner_name
    }

    pub fn owner_id(&self) -> &ParticipantId {
        &self.owner_id
    }

    pub(crate) fn owner_token(&self) -> &str {
        &self.owner_token
    }

    /// Returns `true` if `token` matches the stored owner credential.
    pub fn verify_token(&self, token: Option<&str>) -> bool {
        token.is_some_and(|t| t == self.owner_token)
    }

    /// Owner detection is by exact display name; authorization is then
    /// settled by the token, never by the name alone.
    pub fn is_owner_name(&self, name: &str) -> bool {
        self.owner_name == name
    }

    /// Participants in wheel order (join order, owner first).
    pub fn participants(&self) -> &[Participant] {
        &self.participants
    }

    pub fn participant(&self, id: &ParticipantId) -> Option<&Participant> {
        self.participants.iter().find(|p| &p.id == id)
    }

    pub fn participant_count(&self) -> usize {
        self.participants.len()
    }

    pub fn is_empty(&self) -> bool {
        self.participants.is_empty()
    }

    pub fn started(&self) -> bool {
        self.started
    }

    pub fn selected(&self) -> Option<&Participant> {
        self.selected.as_ref()
    }

    /// Time since the room was created, for staleness sweeps.
    pub fn age(&self) -> Duration {
        self.created_at.elapsed()
    }

    /// Adds a participant, or resolves the owner's record.
    ///
    /// `as_owner` is decided by the caller (name match plus a verified
    /// token); the room itself only enforces list rules. An owner join
    /// resolves to the existing owner record — or restores it at the
    /// head of the wheel if a missed grace period removed it — and is
    /// allowed even after the spin, since the owner already is a
    /// participant.
    ///
    /// # Errors
    /// - [`RoomError::Expired`] if the room already spun (non-owner)
    /// - [`RoomError::NameTaken`] on a case-insensitive collision with
    ///   any existing participant or the owner's name
    pub fn add(
        &mut self,
        name: &str,
        supplied_id: Option<ParticipantId>,
        as_owner: bool,
    ) -> Result<Participant, RoomError> {
        if as_owner {
            if let Some(owner) = self.participant(&self.owner_id) {
                return Ok(owner.clone());
            }
            let owner = Participant::new(self.owner_id.clone(), self.owner_name.clone());
            self.participants.insert(0, owner.clone());
            return Ok(owner);
        }

        if self.started {
            return Err(RoomError::Expired(self.id.clone()));
        }

        let lowered = name.to_lowercase();
        let collides = self.owner_name.to_lowercase() == lowered
            || self
                .participants
                .iter()
                .any(|p| p.name.to_lowercase() == lowered);
        if collides {
            return Err(RoomError::NameTaken(name.to_owned()));
        }

        let id = supplied_id.unwrap_or_else(|| ParticipantId(Uuid::new_v4().to_string()));
        let participant = Participant::new(id, name);
        self.participants.push(participant.clone());
        Ok(participant)
    }

    /// Removes a participant by identity. Returns `true` if they were
    /// present; a no-op otherwise.
    pub fn remove(&mut self, id: &ParticipantId) -> bool {
        let before = self.participants.len();
        self.participants.retain(|p| &p.id != id);
        self.participants.len() < before
    }

    /// Flips `started` — once.
    ///
    /// # Errors
    /// [`RoomError::AlreadyStarted`] on a second call; `started` never
    /// reverts.
    pub fn mark_started(&mut self) -> Result<(), RoomError> {
        if self.started {
            return Err(RoomError::AlreadyStarted(self.id.clone()));
        }
        self.started = true;
        Ok(())
    }

    /// Records the winner, exactly once, only after [`mark_started`].
    ///
    /// [`mark_started`]: Room::mark_started
    ///
    /// # Errors
    /// [`RoomError::InvalidTransition`] when called before start or a
    /// second time.
    pub fn record_winner(&mut self, winner: Participant) -> Result<(), RoomError> {
        if !self.started {
            return Err(RoomError::InvalidTransition(
                "winner recorded before the room started".into(),
            ));
        }
        if self.selected.is_some() {
            return Err(RoomError::InvalidTransition(
                "winner already recorded".into(),
            ));
        }
        self.selected = Some(winner);
        Ok(())
    }

    pub fn view(&self) -> RoomView {
        RoomView {
            id: self.id.clone(),
            owner: self.owner_name.clone(),
            participants: self.participants.clone(),
            started: self.started,
        }
    }
}

/// Generates a random 32-character hex string (128 bits of entropy).
///
/// Guessing a valid token is computationally infeasible, which is the
/// entire authorization model for owner privileges.
fn generate_token() -> String {
    let mut rng = rand::rng();
    let bytes: [u8; 16] = rng.random();
    bytes.iter().map(|b| format!("{b:02x}")).collect()
}
