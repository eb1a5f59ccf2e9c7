//! Shared server state.
//!
//! All mutable state — the room store and the presence tracker — lives
//! behind one `Mutex`. The rule that makes this safe and simple: no task
//! ever holds the lock across an `.await`. Every handler locks, mutates,
//! collects the events to send, unlocks, and only then touches channels
//! or sleeps. Timers and the spin delay re-enter through a fresh lock
//! and re-validate what they find.

use std::sync::Mutex;

use spinroom_protocol::{RoomId, ServerEvent};
use spinroom_room::RoomStore;
use spinroom_session::PresenceTracker;

use crate::config::ServerConfig;

/// Everything guarded by the state mutex.
#[derive(Default)]
pub struct Core {
    pub rooms: RoomStore,
    pub presence: PresenceTracker,
}

impl Core {
    /// Sends an event to every connection bound to `room_id`.
    ///
    /// A send only fails when the receiving connection's writer task is
    /// already gone, and that connection is about to be unbound anyway,
    /// so failures are ignored.
    pub fn broadcast(&self, room_id: &RoomId, event: &ServerEvent) {
        for sender in self.presence.senders_for_room(room_id) {
            let _ = sender.send(event.clone());
        }
    }

    /// Broadcasts the current participant list for `room_id`. No-op if
    /// the room is gone.
    pub fn broadcast_participants(&self, room_id: &RoomId) {
        if let Ok(room) = self.rooms.room(room_id) {
            self.broadcast(
                room_id,
                &ServerEvent::ParticipantsUpdate {
                    participants: room.participants().to_vec(),
                },
            );
        }
    }
}

/// The state handle shared by every connection, the HTTP surface, and
/// the janitor.
pub struct AppState {
    pub core: Mutex<Core>,
    pub config: ServerConfig,
}

impl AppState {
    pub fn new(config: ServerConfig) -> Self {
        Self {
            core: Mutex::new(Core::default()),
            config,
        }
    }

    /// Locks the core. Poisoning means a panic while mutating shared
    /// state; nothing useful can continue from there, so propagating the
    /// panic is the right call.
    pub fn lock(&self) -> std::sync::MutexGuard<'_, Core> {
        self.core.lock().expect("state mutex poisoned")
    }
}
