//! The one-shot HTTP surface: room creation, the room view, and health.
//!
//! Everything stateful happens on the event connection; these endpoints
//! exist so a plain `fetch` can create a room and render an invite page
//! before any connection is opened.

use std::sync::Arc;

use axum::Json;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::{Deserialize, Serialize};
use spinroom_protocol::RoomId;
use spinroom_room::RoomError;

use crate::state::AppState;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateRoomRequest {
    pub owner_name: String,
}

/// The only response that ever carries the owner token.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateRoomResponse {
    pub room_id: RoomId,
    pub owner_token: String,
}

#[derive(Debug, Serialize)]
struct ErrorBody {
    error: String,
}

fn error_response(status: StatusCode, err: &RoomError) -> Response {
    (
        status,
        Json(ErrorBody {
            error: err.to_string(),
        }),
    )
        .into_response()
}

/// `POST /rooms` — creates a room and returns the id plus the owner
/// token. The token is never retrievable again.
pub async fn create_room(
    State(state): State<Arc<AppState>>,
    Json(req): Json<CreateRoomRequest>,
) -> Response {
    let mut core = state.lock();
    match core.rooms.create_room(&req.owner_name) {
        Ok(created) => (
            StatusCode::CREATED,
            Json(CreateRoomResponse {
                room_id: created.room_id,
                owner_token: created.owner_token,
            }),
        )
            .into_response(),
        Err(err) => error_response(StatusCode::BAD_REQUEST, &err),
    }
}

/// `GET /rooms/{room_id}` — the credential-free room view, for
/// rendering the invite page. No token required.
pub async fn room_view(
    State(state): State<Arc<AppState>>,
    Path(room_id): Path<RoomId>,
) -> Response {
    let core = state.lock();
    match core.rooms.view(&room_id) {
        Ok(view) => Json(view).into_response(),
        Err(err) => error_response(StatusCode::NOT_FOUND, &err),
    }
}

/// `GET /health` — liveness for load balancers.
pub async fn health() -> Json<serde_json::Value> {
    Json(serde_json::json!({ "status": "ok" }))
}
