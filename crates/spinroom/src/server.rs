//! Router assembly and the server entry point.

use std::io;
use std::net::SocketAddr;
use std::sync::Arc;

use axum::Router;
use axum::routing::{any, get, post};
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;

use crate::config::ServerConfig;
use crate::state::AppState;
use crate::{handler, http, janitor};

/// Builds the full route table over a shared state handle.
pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/health", get(http::health))
        .route("/rooms", post(http::create_room))
        .route("/rooms/{room_id}", get(http::room_view))
        .route("/ws", any(handler::ws_upgrade))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// A bound, not-yet-running server.
///
/// Binding and running are split so tests can bind port 0 and read the
/// assigned address before the accept loop starts.
pub struct SpinroomServer {
    listener: TcpListener,
    state: Arc<AppState>,
}

impl SpinroomServer {
    /// Binds the listener.
    pub async fn bind(addr: SocketAddr, config: ServerConfig) -> io::Result<Self> {
        let listener = TcpListener::bind(addr).await?;
        Ok(Self {
            listener,
            state: Arc::new(AppState::new(config)),
        })
    }

    /// The bound address (useful after binding port 0).
    pub fn local_addr(&self) -> io::Result<SocketAddr> {
        self.listener.local_addr()
    }

    pub fn state(&self) -> Arc<AppState> {
        Arc::clone(&self.state)
    }

    /// Serves until the process is stopped.
    pub async fn run(self) -> io::Result<()> {
        let sweeper = janitor::spawn(Arc::clone(&self.state));
        let addr = self.local_addr()?;
        tracing::info!(%addr, "listening");

        let app = router(self.state);
        let result = axum::serve(self.listener, app).await;
        sweeper.abort();
        result
    }
}
