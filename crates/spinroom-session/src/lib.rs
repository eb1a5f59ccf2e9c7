//! Connection presence for Spinroom.
//!
//! A participant's identity lives in the room store; what lives here is
//! the *transient* association between a physical connection and a
//! (room, participant) pair, plus the grace period that lets a dropped
//! connection come back before the participant is removed.
//!
//! # Key types
//!
//! - [`PresenceTracker`] — connection → binding map and pending
//!   disconnects
//! - [`Binding`] — room, participant, and the outbound event channel
//! - [`GraceTimer`] — a one-shot, cancellable timer (handle + cancel,
//!   never a bare fire-and-forget callback)

mod grace;
mod presence;

pub use grace::GraceTimer;
pub use presence::{Binding, ConnectionId, EventSender, PresenceTracker};
