//! The Spinroom server: HTTP surface, event connections, and the room
//! janitor, glued over the protocol, room, and session crates.
//!
//! # Layout
//!
//! - [`config`] — timing knobs ([`ServerConfig`])
//! - [`state`] — the single shared state mutex ([`AppState`])
//! - [`http`] — room creation, the room view, health
//! - [`handler`] — the per-connection event loop
//! - [`janitor`] — periodic deletion of aged-out rooms
//! - [`server`] — router assembly and the run loop

pub mod config;
pub mod handler;
pub mod http;
pub mod janitor;
pub mod server;
pub mod state;

pub use config::ServerConfig;
pub use server::SpinroomServer;
pub use state::AppState;
