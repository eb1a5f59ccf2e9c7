//! The room store: owns every live room.
//!
//! This is the single authority for room state. Higher layers never hold
//! a `Room` directly — they name rooms by id and go through the store,
//! which is what lets the store enforce the invariants in one place.
//!
//! # Concurrency note
//!
//! `RoomStore` is NOT thread-safe by itself — it uses a plain `HashMap`,
//! not a concurrent one. This is intentional: the store lives inside the
//! server's single state mutex, and every mutation happens under that
//! lock without crossing an `.await`. Keeping the store synchronous
//! avoids hidden locking and makes "no two mutations for the same room
//! interleave" trivially true.

use std::collections::HashMap;
use std::time::Duration;

use spinroom_protocol::{Participant, ParticipantId, RoomId};
use uuid::Uuid;

use crate::{Room, RoomError, RoomView};

/// What `create_room` hands back to the caller: the shareable room id
/// and the owner credential. The token is returned exactly once, here.
#[derive(Debug, Clone)]
pub struct CreatedRoom {
    pub room_id: RoomId,
    pub owner_token: String,
}

/// The set of live rooms and all mutations on them.
#[derive(Default)]
pub struct RoomStore {
    rooms: HashMap<RoomId, Room>,
}

impl RoomStore {
    /// Creates a new, empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a room owned by `owner_name` and returns its id and the
    /// owner token.
    ///
    /// # Errors
    /// Returns [`RoomError::InvalidName`] if the name is blank after
    /// trimming.
    pub fn create_room(&mut self, owner_name: &str) -> Result<CreatedRoom, RoomError> {
        let owner_name = owner_name.trim();
        if owner_name.is_empty() {
            return Err(RoomError::InvalidName);
        }

        let room_id = loop {
            let candidate = generate_room_id();
            if !self.rooms.contains_key(&candidate) {
                break candidate;
            }
        };

        let room = Room::new(room_id.clone(), owner_name.to_owned());
        let created = CreatedRoom {
            room_id: room_id.clone(),
            owner_token: room.owner_token().to_owned(),
        };
        self.rooms.insert(room_id.clone(), room);

        tracing::info!(%room_id, owner = owner_name, "room created");
        Ok(created)
    }

    /// The credential-free projection served on the read surface.
    ///
    /// # Errors
    /// [`RoomError::NotFound`] if the room does not exist.
    pub fn view(&self, room_id: &RoomId) -> Result<RoomView, RoomError> {
        Ok(self.room(room_id)?.view())
    }

    /// Looks up a room.
    ///
    /// # Errors
    /// [`RoomError::NotFound`] if the room does not exist.
    pub fn room(&self, room_id: &RoomId) -> Result<&Room, RoomError> {
        self.rooms
            .get(room_id)
            .ok_or_else(|| RoomError::NotFound(room_id.clone()))
    }

    fn room_mut(&mut self, room_id: &RoomId) -> Result<&mut Room, RoomError> {
        self.rooms
            .get_mut(room_id)
            .ok_or_else(|| RoomError::NotFound(room_id.clone()))
    }

    pub fn contains(&self, room_id: &RoomId) -> bool {
        self.rooms.contains_key(room_id)
    }

    /// Adds a participant to a room (see [`Room::add`] for the rules).
    pub fn add_participant(
        &mut self,
        room_id: &RoomId,
        name: &str,
        supplied_id: Option<ParticipantId>,
        as_owner: bool,
    ) -> Result<Participant, RoomError> {
        let participant = self.room_mut(room_id)?.add(name, supplied_id, as_owner)?;
        tracing::info!(
            %room_id,
            participant_id = %participant.id,
            name = %participant.name,
            as_owner,
            "participant added"
        );
        Ok(participant)
    }

    /// Removes a participant by identity. No-op (returns `false`) if the
    /// room or the participant is already gone — removal races with
    /// eviction and must stay idempotent.
    pub fn remove_participant(&mut self, room_id: &RoomId, id: &ParticipantId) -> bool {
        let Some(room) = self.rooms.get_mut(room_id) else {
            return false;
        };
        let removed = room.remove(id);
        if removed {
            tracing::info!(%room_id, participant_id = %id, "participant removed");
        }
        removed
    }

    /// Checks the owner credential for a room.
    ///
    /// # Errors
    /// [`RoomError::NotFound`] / [`RoomError::Unauthorized`].
    pub fn verify_owner(&self, room_id: &RoomId, token: Option<&str>) -> Result<(), RoomError> {
        if self.room(room_id)?.verify_token(token) {
            Ok(())
        } else {
            Err(RoomError::Unauthorized)
        }
    }

    /// Marks a room as started (monotonic; see [`Room::mark_started`]).
    pub fn mark_started(&mut self, room_id: &RoomId) -> Result<(), RoomError> {
        self.room_mut(room_id)?.mark_started()?;
        tracing::info!(%room_id, "roulette started");
        Ok(())
    }

    /// Records the winner for a started room.
    pub fn record_winner(
        &mut self,
        room_id: &RoomId,
        winner: Participant,
    ) -> Result<(), RoomError> {
        let name = winner.name.clone();
        self.room_mut(room_id)?.record_winner(winner)?;
        tracing::info!(%room_id, winner = %name, "winner recorded");
        Ok(())
    }

    /// Evicts the room if it has no participants left. Returns `true`
    /// if the room was deleted.
    pub fn delete_if_empty(&mut self, room_id: &RoomId) -> bool {
        let empty = self
            .rooms
            .get(room_id)
            .is_some_and(|room| room.is_empty());
        if empty {
            self.rooms.remove(room_id);
            tracing::info!(%room_id, "room evicted (no participants)");
        }
        empty
    }

    /// Ids of rooms older than `max_age`, for the janitor sweep.
    pub fn stale_rooms(&self, max_age: Duration) -> Vec<RoomId> {
        self.rooms
            .values()
            .filter(|room| room.age() > max_age)
            .map(|room| room.id().clone())
            .collect()
    }

    /// Deletes a room unconditionally. Returns `true` if it existed.
    pub fn delete(&mut self, room_id: &RoomId) -> bool {
        let existed = self.rooms.remove(room_id).is_some();
        if existed {
            tracing::info!(%room_id, "room deleted");
        }
        existed
    }

    /// Returns the number of live rooms.
    pub fn len(&self) -> usize {
        self.rooms.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rooms.is_empty()
    }
}

/// Room ids are the first 8 hex chars of a v4 uuid — short enough for a
/// shareable link, random enough to be unguessable at this scale.
fn generate_room_id() -> RoomId {
    let hex = Uuid::new_v4().simple().to_string();
    RoomId(hex[..8].to_owned())
}

// =========================================================================
// Tests
// =========================================================================

#[cfg(test)]
mod tests {
    //! Unit tests for `RoomStore`, following the naming convention
    //! `test_{function}_{scenario}_{expected}`.

    use super::*;

    fn store_with_room(owner: &str) -> (RoomStore, CreatedRoom) {
        let mut store = RoomStore::new();
        let created = store.create_room(owner).expect("create should succeed");
        (store, created)
    }

    // =====================================================================
    // create_room()
    // =====================================================================

    #[test]
    fn test_create_room_returns_id_and_token() {
        let (store, created) = store_with_room("Ada");

        assert_eq!(created.room_id.0.len(), 8);
        assert_eq!(created.owner_token.len(), 32);
        assert!(store.contains(&created.room_id));
    }

    #[test]
    fn test_create_room_blank_name_returns_invalid_name() {
        let mut store = RoomStore::new();
        assert!(matches!(store.create_room(""), Err(RoomError::InvalidName)));
        assert!(matches!(
            store.create_room("   "),
            Err(RoomError::InvalidName)
        ));
        assert!(store.is_empty());
    }

    #[test]
    fn test_create_room_trims_owner_name() {
        let (store, created) = store_with_room("  Ada  ");
        let view = store.view(&created.room_id).unwrap();
        assert_eq!(view.owner, "Ada");
    }

    #[test]
    fn test_create_room_seeds_owner_as_sole_participant() {
        let (store, created) = store_with_room("Ada");
        let view = store.view(&created.room_id).unwrap();
        assert_eq!(view.participants.len(), 1);
        assert_eq!(view.participants[0].name, "Ada");
        assert!(!view.started);
    }

    #[test]
    fn test_create_room_ids_are_unique() {
        let mut store = RoomStore::new();
        let a = store.create_room("Ada").unwrap();
        let b = store.create_room("Ben").unwrap();
        assert_ne!(a.room_id, b.room_id);
        assert_ne!(a.owner_token, b.owner_token);
    }

    // =====================================================================
    // view()
    // =====================================================================

    #[test]
    fn test_view_unknown_room_returns_not_found() {
        let store = RoomStore::new();
        let result = store.view(&RoomId::from("nope"));
        assert!(matches!(result, Err(RoomError::NotFound(r)) if r.0 == "nope"));
    }

    // =====================================================================
    // add_participant()
    // =====================================================================

    #[test]
    fn test_add_participant_appends_in_join_order() {
        let (mut store, created) = store_with_room("Ada");
        store
            .add_participant(&created.room_id, "Ben", None, false)
            .unwrap();
        store
            .add_participant(&created.room_id, "Cleo", None, false)
            .unwrap();

        let view = store.view(&created.room_id).unwrap();
        let names: Vec<&str> =
            view.participants.iter().map(|p| p.name.as_str()).collect();
        assert_eq!(names, ["Ada", "Ben", "Cleo"]);
    }

    #[test]
    fn test_add_participant_unknown_room_returns_not_found() {
        let mut store = RoomStore::new();
        let result = store.add_participant(&RoomId::from("nope"), "Ben", None, false);
        assert!(matches!(result, Err(RoomError::NotFound(_))));
    }

    #[test]
    fn test_add_participant_to_started_room_returns_expired() {
        let (mut store, created) = store_with_room("Ada");
        store
            .add_participant(&created.room_id, "Ben", None, false)
            .unwrap();
        store.mark_started(&created.room_id).unwrap();

        let result = store.add_participant(&created.room_id, "Cleo", None, false);
        assert!(matches!(result, Err(RoomError::Expired(_))));
    }

    #[test]
    fn test_add_participant_duplicate_name_leaves_list_unchanged() {
        let (mut store, created) = store_with_room("Ada");
        store
            .add_participant(&created.room_id, "Ben", None, false)
            .unwrap();

        let result = store.add_participant(&created.room_id, "ben", None, false);

        assert!(matches!(result, Err(RoomError::NameTaken(_))));
        assert_eq!(store.view(&created.room_id).unwrap().participants.len(), 2);
    }

    // =====================================================================
    // verify_owner()
    // =====================================================================

    #[test]
    fn test_verify_owner_accepts_issued_token() {
        let (store, created) = store_with_room("Ada");
        assert!(
            store
                .verify_owner(&created.room_id, Some(&created.owner_token))
                .is_ok()
        );
    }

    #[test]
    fn test_verify_owner_rejects_wrong_or_missing_token() {
        let (store, created) = store_with_room("Ada");
        assert!(matches!(
            store.verify_owner(&created.room_id, Some("deadbeef")),
            Err(RoomError::Unauthorized)
        ));
        assert!(matches!(
            store.verify_owner(&created.room_id, None),
            Err(RoomError::Unauthorized)
        ));
    }

    // =====================================================================
    // remove_participant() / delete_if_empty()
    // =====================================================================

    #[test]
    fn test_remove_participant_decreases_count_by_one() {
        let (mut store, created) = store_with_room("Ada");
        let ben = store
            .add_participant(&created.room_id, "Ben", None, false)
            .unwrap();

        assert!(store.remove_participant(&created.room_id, &ben.id));

        let view = store.view(&created.room_id).unwrap();
        assert_eq!(view.participants.len(), 1);
        assert_eq!(view.participants[0].name, "Ada");
    }

    #[test]
    fn test_remove_participant_twice_is_noop() {
        let (mut store, created) = store_with_room("Ada");
        let ben = store
            .add_participant(&created.room_id, "Ben", None, false)
            .unwrap();

        assert!(store.remove_participant(&created.room_id, &ben.id));
        assert!(!store.remove_participant(&created.room_id, &ben.id));
    }

    #[test]
    fn test_remove_participant_from_deleted_room_is_noop() {
        let (mut store, created) = store_with_room("Ada");
        let owner_id = store.view(&created.room_id).unwrap().participants[0]
            .id
            .clone();
        store.delete(&created.room_id);

        assert!(!store.remove_participant(&created.room_id, &owner_id));
    }

    #[test]
    fn test_delete_if_empty_keeps_populated_room() {
        let (mut store, created) = store_with_room("Ada");
        assert!(!store.delete_if_empty(&created.room_id));
        assert!(store.contains(&created.room_id));
    }

    #[test]
    fn test_delete_if_empty_evicts_drained_room() {
        let (mut store, created) = store_with_room("Ada");
        let owner_id = store.view(&created.room_id).unwrap().participants[0]
            .id
            .clone();
        store.remove_participant(&created.room_id, &owner_id);

        assert!(store.delete_if_empty(&created.room_id));
        assert!(!store.contains(&created.room_id));
    }

    // =====================================================================
    // mark_started() / record_winner()
    // =====================================================================

    #[test]
    fn test_record_winner_after_start_sets_selection_once() {
        let (mut store, created) = store_with_room("Ada");
        let ben = store
            .add_participant(&created.room_id, "Ben", None, false)
            .unwrap();
        store.mark_started(&created.room_id).unwrap();
        store.record_winner(&created.room_id, ben.clone()).unwrap();

        assert_eq!(
            store.room(&created.room_id).unwrap().selected(),
            Some(&ben)
        );
        assert!(matches!(
            store.record_winner(&created.room_id, ben),
            Err(RoomError::InvalidTransition(_))
        ));
    }

    #[test]
    fn test_record_winner_before_start_returns_invalid_transition() {
        let (mut store, created) = store_with_room("Ada");
        let owner = store.view(&created.room_id).unwrap().participants[0].clone();
        assert!(matches!(
            store.record_winner(&created.room_id, owner),
            Err(RoomError::InvalidTransition(_))
        ));
    }

    // =====================================================================
    // stale_rooms() / delete()
    // =====================================================================

    #[test]
    fn test_stale_rooms_with_zero_max_age_reports_everything() {
        let (store, created) = store_with_room("Ada");
        let stale = store.stale_rooms(Duration::ZERO);
        assert_eq!(stale, vec![created.room_id]);
    }

    #[test]
    fn test_stale_rooms_with_long_max_age_reports_nothing() {
        let (store, _) = store_with_room("Ada");
        assert!(store.stale_rooms(Duration::from_secs(3600)).is_empty());
    }

    #[test]
    fn test_delete_unknown_room_returns_false() {
        let mut store = RoomStore::new();
        assert!(!store.delete(&RoomId::from("nope")));
    }

    // =====================================================================
    // Reconnection-shaped sequences
    // =====================================================================

    #[test]
    fn test_same_identity_rejoin_preserves_record_and_order() {
        // A reconnection never goes through add_participant — the
        // protocol restores the existing record — so removal followed by
        // nothing must leave everyone else's order intact.
        let (mut store, created) = store_with_room("Ada");
        let ben = store
            .add_participant(&created.room_id, "Ben", None, false)
            .unwrap();
        store
            .add_participant(&created.room_id, "Cleo", None, false)
            .unwrap();

        let before = store.view(&created.room_id).unwrap().participants;
        let restored = store
            .room(&created.room_id)
            .unwrap()
            .participant(&ben.id)
            .cloned();

        assert_eq!(restored.as_ref(), Some(&ben));
        assert_eq!(store.view(&created.room_id).unwrap().participants, before);
    }
}
