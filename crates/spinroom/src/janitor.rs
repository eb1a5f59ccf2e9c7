//! Periodic deletion of aged-out rooms.
//!
//! Rooms live for a bounded wall-clock time regardless of activity. The
//! janitor does not push anything to connected clients — they learn the
//! room is gone on their next interaction, which answers `room_expired`.

use std::sync::Arc;

use tokio::task::JoinHandle;

use crate::state::AppState;

/// Spawns the sweep loop. The returned handle is aborted on shutdown.
pub fn spawn(state: Arc<AppState>) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(state.config.sweep_interval);
        // The first tick completes immediately; skip it so a sweep never
        // runs at startup against an empty store.
        interval.tick().await;
        loop {
            interval.tick().await;
            sweep(&state);
        }
    })
}

/// One sweep: deletes every room older than the configured maximum age
/// and purges its presence state.
pub fn sweep(state: &AppState) {
    let mut core = state.lock();
    let stale = core.rooms.stale_rooms(state.config.room_max_age);
    if stale.is_empty() {
        return;
    }

    tracing::info!(count = stale.len(), "sweeping stale rooms");
    for room_id in stale {
        core.rooms.delete(&room_id);
        core.presence.purge_room(&room_id);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ServerConfig;
    use std::time::Duration;

    #[test]
    fn test_sweep_deletes_only_stale_rooms() {
        let state = AppState::new(ServerConfig {
            room_max_age: Duration::ZERO,
            ..ServerConfig::default()
        });
        let created = {
            let mut core = state.lock();
            core.rooms.create_room("Ada").unwrap()
        };

        sweep(&state);

        assert!(!state.lock().rooms.contains(&created.room_id));
    }

    #[test]
    fn test_sweep_keeps_fresh_rooms() {
        let state = AppState::new(ServerConfig::default());
        let created = {
            let mut core = state.lock();
            core.rooms.create_room("Ada").unwrap()
        };

        sweep(&state);

        assert!(state.lock().rooms.contains(&created.room_id));
    }
}
