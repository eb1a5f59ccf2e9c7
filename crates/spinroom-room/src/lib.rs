//! Room state management for Spinroom.
//!
//! This crate owns every room and enforces its invariants: the owner is
//! a participant for as long as the room exists, `started` only ever
//! flips false → true, and a winner is recorded at most once, only after
//! the room has started.
//!
//! # Key types
//!
//! - [`RoomStore`] — the set of live rooms and all mutations on them
//! - [`Room`] — one session: owner, participants, spin state
//! - [`RoomView`] — the safe-to-serve projection (no credentials)
//! - [`RoomError`] — everything that can go wrong
//! - [`select::draw`] — the uniform winner draw

mod error;
mod room;
pub mod select;
mod store;

pub use error::RoomError;
pub use room::{Room, RoomView};
pub use store::{CreatedRoom, RoomStore};
