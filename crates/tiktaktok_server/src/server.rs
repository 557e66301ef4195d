//! HTTP shell: one WebSocket route on an axum router.

use crate::config::ServerConfig;
use crate::transport::handle_socket;
use axum::Router;
use axum::body::Body;
use axum::extract::{State, WebSocketUpgrade};
use axum::http::Request;
use axum::response::Response;
use axum::routing::get;
use derive_getters::Getters;
use std::future::Future;
use std::sync::Arc;
use tiktaktok_game::{GameFactory, Matchmaker};
use tokio::net::TcpListener;
use tower::ServiceBuilder;
use tracing::{debug, info, instrument};

/// State shared by every connection.
#[derive(Debug, Clone, Getters)]
pub struct AppState {
    /// The single matchmaker.
    matchmaker: Arc<Matchmaker>,
    /// Effective configuration.
    config: Arc<ServerConfig>,
}

impl AppState {
    /// Builds fresh state around `config`.
    pub fn new(config: ServerConfig) -> Self {
        Self {
            matchmaker: Arc::new(Matchmaker::new(Arc::new(GameFactory::new()))),
            config: Arc::new(config),
        }
    }
}

/// Router exposing the WebSocket endpoint at the configured path.
pub fn router(state: AppState) -> Router {
    let path = state.config.ws_path().clone();
    Router::new()
        .route(&path, get(upgrade))
        .layer(ServiceBuilder::new().map_request(|req: Request<Body>| {
            info!(
                method = %req.method(),
                uri = %req.uri(),
                "Incoming HTTP request"
            );
            req
        }))
        .with_state(state)
}

async fn upgrade(ws: WebSocketUpgrade, State(state): State<AppState>) -> Response {
    let limit = *state.config.max_message_bytes();
    debug!(limit, "Upgrading to WebSocket");
    ws.max_message_size(limit)
        .on_upgrade(move |socket| handle_socket(socket, state))
}

/// Serves on `listener` until `shutdown` completes.
#[instrument(skip_all, fields(addr = ?listener.local_addr().ok()))]
pub async fn serve(
    listener: TcpListener,
    state: AppState,
    shutdown: impl Future<Output = ()> + Send + 'static,
) -> std::io::Result<()> {
    info!(path = %state.config.ws_path(), "Accepting WebSocket connections");
    axum::serve(listener, router(state))
        .with_graceful_shutdown(shutdown)
        .await?;
    info!("Server stopped");
    Ok(())
}
