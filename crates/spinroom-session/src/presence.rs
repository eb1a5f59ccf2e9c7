//! The presence tracker: who is connected, and who is on the way out.
//!
//! # Concurrency note
//!
//! Like the room store, `PresenceTracker` is a plain map guarded by the
//! server's single state mutex, not a concurrent structure. Arming and
//! cancelling timers happens under that lock; the timers themselves run
//! as independent tasks and re-enter through the lock when they fire.

use std::collections::HashMap;
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

use spinroom_protocol::{ParticipantId, RoomId, ServerEvent};
use tokio::sync::mpsc;

use crate::GraceTimer;

/// Counter for generating unique connection IDs.
static NEXT_CONNECTION_ID: AtomicU64 = AtomicU64::new(1);

/// A process-local identifier for one physical connection.
///
/// Never on the wire — a reconnecting client gets a fresh one, which is
/// exactly why participant identity is tracked separately.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ConnectionId(u64);

impl ConnectionId {
    /// Allocates the next connection id.
    pub fn next() -> Self {
        Self(NEXT_CONNECTION_ID.fetch_add(1, Ordering::Relaxed))
    }
}

impl fmt::Display for ConnectionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "C-{}", self.0)
    }
}

/// Channel for delivering outbound events to one connection's writer task.
pub type EventSender = mpsc::UnboundedSender<ServerEvent>;

/// What a live connection is bound to.
#[derive(Debug, Clone)]
pub struct Binding {
    pub room_id: RoomId,
    pub participant_id: ParticipantId,
    pub sender: EventSender,
}

/// A participant whose connection dropped and whose grace timer is
/// running. At most one of these exists per participant.
struct PendingDisconnect {
    room_id: RoomId,
    timer: GraceTimer,
}

/// Tracks connection bindings and pending disconnects.
#[derive(Default)]
pub struct PresenceTracker {
    bindings: HashMap<ConnectionId, Binding>,
    pending: HashMap<ParticipantId, PendingDisconnect>,
}

impl PresenceTracker {
    /// Creates a new, empty tracker.
    pub fn new() -> Self {
        Self::default()
    }

    /// Binds a connection to a (room, participant) pair, replacing any
    /// stale binding for the same connection.
    pub fn bind(
        &mut self,
        conn_id: ConnectionId,
        room_id: RoomId,
        participant_id: ParticipantId,
        sender: EventSender,
    ) {
        tracing::debug!(%conn_id, %room_id, %participant_id, "presence bound");
        self.bindings.insert(
            conn_id,
            Binding {
                room_id,
                participant_id,
                sender,
            },
        );
    }

    /// Removes and returns the binding for a connection, if any.
    pub fn unbind(&mut self, conn_id: ConnectionId) -> Option<Binding> {
        let binding = self.bindings.remove(&conn_id);
        if let Some(b) = &binding {
            tracing::debug!(%conn_id, participant_id = %b.participant_id, "presence unbound");
        }
        binding
    }

    /// Looks up the binding for a connection.
    pub fn binding(&self, conn_id: ConnectionId) -> Option<&Binding> {
        self.bindings.get(&conn_id)
    }

    /// Senders for every connection currently bound to `room_id` — the
    /// broadcast set at this instant.
    pub fn senders_for_room<'a>(
        &'a self,
        room_id: &'a RoomId,
    ) -> impl Iterator<Item = &'a EventSender> {
        self.bindings
            .values()
            .filter(move |b| &b.room_id == room_id)
            .map(|b| &b.sender)
    }

    /// Arms the grace timer for a participant. If a timer is somehow
    /// already running for them, it is cancelled first — one timer per
    /// participant, always.
    pub fn arm_grace(&mut self, participant_id: ParticipantId, room_id: RoomId, timer: GraceTimer) {
        tracing::info!(%participant_id, %room_id, "grace period started");
        if let Some(prev) = self.pending.insert(
            participant_id,
            PendingDisconnect { room_id, timer },
        ) {
            prev.timer.cancel();
        }
    }

    /// Cancels a participant's pending disconnect. Returns `true` if a
    /// timer was found and cancelled — the reconnection succeeded in
    /// time.
    pub fn cancel_grace(&mut self, participant_id: &ParticipantId) -> bool {
        match self.pending.remove(participant_id) {
            Some(pd) => {
                pd.timer.cancel();
                tracing::info!(%participant_id, "grace period cancelled (reconnected)");
                true
            }
            None => false,
        }
    }

    /// Returns `true` if a grace timer is running for this participant.
    pub fn has_pending(&self, participant_id: &ParticipantId) -> bool {
        self.pending.contains_key(participant_id)
    }

    /// The expiry path's idempotent claim: removes and returns the
    /// pending entry, or `None` if a concurrent cancel (or purge) got
    /// there first — in which case the caller must do nothing.
    pub fn take_pending(&mut self, participant_id: &ParticipantId) -> Option<RoomId> {
        self.pending
            .remove(participant_id)
            .map(|pd| pd.room_id)
    }

    /// Drops every binding and pending timer for a room. Used when a
    /// room is deleted out from under its connections.
    pub fn purge_room(&mut self, room_id: &RoomId) {
        self.bindings.retain(|_, b| &b.room_id != room_id);

        let doomed: Vec<ParticipantId> = self
            .pending
            .iter()
            .filter(|(_, pd)| &pd.room_id == room_id)
            .map(|(pid, _)| pid.clone())
            .collect();
        for pid in doomed {
            if let Some(pd) = self.pending.remove(&pid) {
                pd.timer.cancel();
            }
        }
        tracing::debug!(%room_id, "presence purged");
    }

    /// Returns the number of live bindings.
    pub fn len(&self) -> usize {
        self.bindings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bindings.is_empty()
    }
}

// =========================================================================
// Tests
// =========================================================================
