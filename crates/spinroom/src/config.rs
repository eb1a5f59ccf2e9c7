//! Server timing knobs.

use std::time::Duration;

/// Timing and threshold configuration for the server.
///
/// Tests shrink these to milliseconds; production runs the defaults.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// How long a dropped connection may stay away before its
    /// participant is removed.
    pub disconnect_grace: Duration,
    /// Delay between the start announcement and the result, so clients
    /// can animate the wheel.
    pub spin_delay: Duration,
    /// Minimum participant count required to start a spin.
    pub min_participants: usize,
    /// Rooms older than this are deleted by the janitor.
    pub room_max_age: Duration,
    /// How often the janitor sweeps.
    pub sweep_interval: Duration,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            disconnect_grace: Duration::from_secs(30),
            spin_delay: Duration::from_millis(500),
            min_participants: 2,
            room_max_age: Duration::from_secs(24 * 60 * 60),
            sweep_interval: Duration::from_secs(60 * 60),
        }
    }
}
