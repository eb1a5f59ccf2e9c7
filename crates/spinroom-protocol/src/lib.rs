//! Wire protocol for Spinroom.
//!
//! This crate defines the "language" that clients and the server speak:
//!
//! - **Types** ([`RoomId`], [`ParticipantId`], [`Participant`]) — the
//!   identities that travel on the wire.
//! - **Events** ([`ClientEvent`], [`ServerEvent`]) — the messages
//!   exchanged over the persistent connection.
//! - **Codec** ([`JsonCodec`]) — how events are converted to/from JSON
//!   text frames.
//! - **Errors** ([`ProtocolError`]) — what can go wrong while encoding
//!   or decoding.
//!
//! The protocol layer is pure data. It doesn't know about connections,
//! rooms, or timers — it only knows the shapes of the messages.

mod codec;
mod error;
mod events;
mod types;

pub use codec::JsonCodec;
pub use error::ProtocolError;
pub use events::{ClientEvent, ServerEvent};
pub use types::{Participant, ParticipantId, RoomId};
