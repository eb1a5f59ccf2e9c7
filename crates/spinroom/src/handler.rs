//! The event-connection handler: one task pair per WebSocket.
//!
//! Each connection gets a reader (this task) and a writer task fed by an
//! unbounded channel. Dispatch functions are synchronous: they lock the
//! state, mutate, queue outbound events on senders, and return — the
//! lock is never held across an `.await`. The two timed paths (the spin
//! delay and the disconnect grace) run as separate tasks that re-lock
//! and re-validate when they wake.

use std::sync::Arc;

use axum::extract::ws::{Message, WebSocket};
use axum::extract::{State, WebSocketUpgrade};
use axum::response::Response;
use futures_util::{SinkExt, StreamExt};
use spinroom_protocol::{ClientEvent, JsonCodec, ParticipantId, RoomId, ServerEvent};
use spinroom_room::{RoomError, select};
use spinroom_session::{ConnectionId, EventSender, GraceTimer};
use tokio::sync::mpsc;

use crate::state::AppState;

/// `GET /ws` — upgrades to the event connection.
pub async fn ws_upgrade(
    State(state): State<Arc<AppState>>,
    ws: WebSocketUpgrade,
) -> Response {
    ws.on_upgrade(move |socket| handle_socket(state, socket))
}

/// Runs one connection to completion.
pub async fn handle_socket(state: Arc<AppState>, socket: WebSocket) {
    let conn_id = ConnectionId::next();
    let codec = JsonCodec;
    let (mut sink, mut stream) = socket.split();
    let (tx, mut rx) = mpsc::unbounded_channel::<ServerEvent>();

    tracing::debug!(%conn_id, "connection opened");

    let writer = tokio::spawn(async move {
        while let Some(event) = rx.recv().await {
            let frame = match codec.encode(&event) {
                Ok(frame) => frame,
                Err(err) => {
                    tracing::error!(%err, "failed to encode outbound event");
                    continue;
                }
            };
            if sink.send(Message::Text(frame.into())).await.is_err() {
                break;
            }
        }
    });

    while let Some(msg) = stream.next().await {
        match msg {
            Ok(Message::Text(text)) => match codec.decode::<ClientEvent>(&text) {
                Ok(event) => dispatch(&state, conn_id, &tx, event),
                Err(err) => {
                    tracing::debug!(%conn_id, %err, "ignoring malformed frame");
                }
            },
            Ok(Message::Close(_)) | Err(_) => break,
            // Pings are answered by the ws layer; binary frames are not
            // part of the protocol.
            Ok(_) => {}
        }
    }

    writer.abort();
    handle_disconnect(&state, conn_id);
    tracing::debug!(%conn_id, "connection closed");
}

fn dispatch(state: &Arc<AppState>, conn_id: ConnectionId, tx: &EventSender, event: ClientEvent) {
    match event {
        ClientEvent::JoinRoom {
            room_id,
            name,
            owner_token,
            user_id,
        } => handle_join(state, conn_id, tx, room_id, name, owner_token, user_id),
        ClientEvent::RequestParticipants { room_id } => {
            handle_request_participants(state, tx, &room_id);
        }
        ClientEvent::StartRoulette {
            room_id,
            owner_token,
        } => handle_start(state, conn_id, tx, room_id, owner_token),
        ClientEvent::LeaveRoom { room_id } => handle_leave(state, conn_id, &room_id),
    }
}

/// Joining resolves, in order: room existence, reconnection inside the
/// grace period, owner authorization, then a fresh add. The `joined` ack
/// goes to the requester; the participant list goes to the whole room.
fn handle_join(
    state: &Arc<AppState>,
    conn_id: ConnectionId,
    tx: &EventSender,
    room_id: RoomId,
    name: String,
    owner_token: Option<String>,
    user_id: Option<ParticipantId>,
) {
    let mut core = state.lock();

    let (owner_name_match, token_ok) = match core.rooms.room(&room_id) {
        Ok(room) => (
            room.is_owner_name(&name),
            room.verify_token(owner_token.as_deref()),
        ),
        Err(err) => {
            let _ = tx.send(ServerEvent::JoinError {
                message: err.to_string(),
            });
            return;
        }
    };

    // Reconnection: same identity, back within the grace period. The
    // existing record is restored untouched, wheel order included.
    if let Some(uid) = &user_id {
        if core.presence.has_pending(uid) {
            let participant = core
                .rooms
                .room(&room_id)
                .ok()
                .and_then(|room| room.participant(uid))
                .cloned();
            if let Some(participant) = participant {
                core.presence.cancel_grace(uid);
                core.presence
                    .bind(conn_id, room_id.clone(), participant.id.clone(), tx.clone());
                let _ = tx.send(ServerEvent::Joined {
                    participant: participant.clone(),
                });
                core.broadcast_participants(&room_id);
                tracing::info!(%conn_id, %room_id, participant_id = %participant.id, "reconnected");
                return;
            }
        }
    }

    // Claiming the owner's name, or presenting a token at all, requires
    // the token to actually match.
    if (owner_name_match || owner_token.is_some()) && !token_ok {
        let _ = tx.send(ServerEvent::JoinError {
            message: RoomError::Unauthorized.to_string(),
        });
        return;
    }
    let as_owner = owner_name_match && token_ok;

    match core.rooms.add_participant(&room_id, &name, user_id, as_owner) {
        Ok(participant) => {
            core.presence
                .bind(conn_id, room_id.clone(), participant.id.clone(), tx.clone());
            let _ = tx.send(ServerEvent::Joined { participant });
            core.broadcast_participants(&room_id);
        }
        Err(err @ RoomError::Expired(_)) => {
            let _ = tx.send(ServerEvent::RoomExpired {
                message: err.to_string(),
            });
        }
        Err(err) => {
            let _ = tx.send(ServerEvent::JoinError {
                message: err.to_string(),
            });
        }
    }
}

/// Resync re-broadcasts the authoritative full snapshot to the room.
/// An unknown room answers the requester only — this is how idle
/// clients learn the janitor took their room.
fn handle_request_participants(state: &Arc<AppState>, tx: &EventSender, room_id: &RoomId) {
    let core = state.lock();
    if core.rooms.contains(room_id) {
        core.broadcast_participants(room_id);
    } else {
        let _ = tx.send(ServerEvent::JoinError {
            message: RoomError::NotFound(room_id.clone()).to_string(),
        });
    }
}

/// Validates the start, announces it, and schedules the draw.
///
/// The preconditions and the `roulette_start` broadcast happen under one
/// lock acquisition, so two concurrent starts cannot both announce. The
/// draw itself runs after the spin delay and re-validates: the wheel it
/// draws over is the participant list at draw time, not announce time.
fn handle_start(
    state: &Arc<AppState>,
    conn_id: ConnectionId,
    tx: &EventSender,
    room_id: RoomId,
    owner_token: Option<String>,
) {
    let core = state.lock();

    let result = (|| -> Result<(), RoomError> {
        let room = core.rooms.room(&room_id)?;
        if room.started() {
            return Err(RoomError::AlreadyStarted(room_id.clone()));
        }
        core.rooms.verify_owner(&room_id, owner_token.as_deref())?;
        // The token is the credential, but the requester must also be
        // bound into the room as its owner — a token replayed from an
        // unjoined connection is refused.
        let is_bound_owner = core
            .presence
            .binding(conn_id)
            .is_some_and(|b| b.room_id == room_id && &b.participant_id == room.owner_id());
        if !is_bound_owner {
            return Err(RoomError::Unauthorized);
        }
        let have = room.participant_count();
        if have < state.config.min_participants {
            return Err(RoomError::InsufficientParticipants {
                needed: state.config.min_participants,
                have,
            });
        }
        Ok(())
    })();

    if let Err(err) = result {
        let _ = tx.send(ServerEvent::RouletteError {
            message: err.to_string(),
        });
        return;
    }

    core.broadcast(&room_id, &ServerEvent::RouletteStart);
    drop(core);

    let state = Arc::clone(state);
    tokio::spawn(async move {
        tokio::time::sleep(state.config.spin_delay).await;
        finish_roulette(&state, &room_id);
    });
}

/// The delayed half of the spin. Re-validates after the sleep: the room
/// may have been deleted, or a racing start may have finished first.
/// `started` and the winner are set under the same lock acquisition, so
/// a started room always has a result.
fn finish_roulette(state: &Arc<AppState>, room_id: &RoomId) {
    let mut core = state.lock();

    let winner = {
        let Ok(room) = core.rooms.room(room_id) else {
            tracing::debug!(%room_id, "room gone before the draw");
            return;
        };
        if room.started() {
            tracing::debug!(%room_id, "racing start already finished");
            return;
        }
        let index = match select::draw(room.participant_count()) {
            Ok(index) => index,
            Err(err) => {
                tracing::warn!(%room_id, %err, "draw failed");
                return;
            }
        };
        room.participants()[index].clone()
    };

    if let Err(err) = core.rooms.mark_started(room_id) {
        tracing::error!(%room_id, %err, "failed to mark room started");
        return;
    }
    if let Err(err) = core.rooms.record_winner(room_id, winner.clone()) {
        tracing::error!(%room_id, %err, "failed to record winner");
        return;
    }
    core.broadcast(
        room_id,
        &ServerEvent::RouletteResult {
            participant: winner,
        },
    );
}

/// Explicit departure: immediate removal, no grace period.
fn handle_leave(state: &Arc<AppState>, conn_id: ConnectionId, _room_id: &RoomId) {
    let mut core = state.lock();
    let Some(binding) = core.presence.unbind(conn_id) else {
        return;
    };

    core.presence.cancel_grace(&binding.participant_id);
    core.rooms
        .remove_participant(&binding.room_id, &binding.participant_id);
    if core.rooms.delete_if_empty(&binding.room_id) {
        core.presence.purge_room(&binding.room_id);
    } else {
        core.broadcast_participants(&binding.room_id);
    }
}

/// A dropped connection starts the grace period instead of removing the
/// participant; [`expire_participant`] runs if nobody reclaims the
/// identity in time.
fn handle_disconnect(state: &Arc<AppState>, conn_id: ConnectionId) {
    let mut core = state.lock();
    let Some(binding) = core.presence.unbind(conn_id) else {
        return;
    };

    // Only worth a timer if the participant is still in a live room.
    let still_present = core
        .rooms
        .room(&binding.room_id)
        .is_ok_and(|room| room.participant(&binding.participant_id).is_some());
    if !still_present {
        return;
    }

    let timer_state = Arc::clone(state);
    let timer_pid = binding.participant_id.clone();
    let timer = GraceTimer::arm(state.config.disconnect_grace, async move {
        expire_participant(&timer_state, &timer_pid);
    });
    core.presence
        .arm_grace(binding.participant_id, binding.room_id, timer);
}

/// The grace timer's expiry path. `take_pending` is the idempotent
/// claim: if a reconnection cancelled the timer between the wake-up and
/// this lock, the claim comes up empty and nothing happens.
fn expire_participant(state: &Arc<AppState>, participant_id: &ParticipantId) {
    let mut core = state.lock();
    let Some(room_id) = core.presence.take_pending(participant_id) else {
        return;
    };

    tracing::info!(%participant_id, %room_id, "grace period expired, removing participant");
    core.rooms.remove_participant(&room_id, participant_id);
    if core.rooms.delete_if_empty(&room_id) {
        core.presence.purge_room(&room_id);
    } else {
        core.broadcast_participants(&room_id);
    }
}
