//! axum WebSocket adapter.

use crate::connection::{Connection, Frame, FrameSource, Outbound, Outbox};
use crate::error::ConnectionError;
use crate::protocol::encode_server_event;
use crate::server::AppState;
use crate::session::serve_connection;
use async_trait::async_trait;
use axum::extract::ws::{Message, WebSocket};
use futures::stream::{SplitSink, SplitStream};
use futures::{SinkExt, StreamExt};
use std::sync::Arc;
use tokio::sync::mpsc;
use tracing::{debug, info, instrument, trace, warn};

/// Read half of an upgraded socket as a [`FrameSource`].
///
/// axum joins fragments before handing messages over, so every text frame
/// arrives complete. Ping and pong are answered by axum and skipped here.
pub struct WsFrames {
    stream: SplitStream<WebSocket>,
}

impl WsFrames {
    /// Wraps the read half of a socket.
    pub fn new(stream: SplitStream<WebSocket>) -> Self {
        Self { stream }
    }
}

#[async_trait]
impl FrameSource for WsFrames {
    async fn next_frame(&mut self) -> Option<Result<Frame, ConnectionError>> {
        loop {
            let message = match self.stream.next().await? {
                Ok(message) => message,
                Err(e) => return Some(Err(ConnectionError::transport(e))),
            };
            let frame = match message {
                Message::Text(text) => Frame::text(text.as_str()),
                Message::Binary(bytes) => {
                    trace!(len = bytes.len(), "Binary frame");
                    Frame::Binary
                }
                Message::Ping(_) | Message::Pong(_) => {
                    trace!("Keep-alive frame");
                    continue;
                }
                Message::Close(close) => {
                    debug!(?close, "Close frame received");
                    Frame::Close
                }
            };
            return Some(Ok(frame));
        }
    }
}

/// Drains an outbox into the write half of a socket.
///
/// Stops after sending a close frame or when the socket refuses a write.
#[instrument(skip_all)]
pub async fn pump_outbox(
    mut sink: SplitSink<WebSocket, Message>,
    mut rx: mpsc::UnboundedReceiver<Outbound>,
) {
    while let Some(outbound) = rx.recv().await {
        match outbound {
            Outbound::Event(event) => {
                let text = match encode_server_event(&event) {
                    Ok(text) => text,
                    Err(e) => {
                        warn!(error = %e, "Dropping unencodable event");
                        continue;
                    }
                };
                if let Err(e) = sink.send(Message::Text(text.into())).await {
                    debug!(error = %e, "Socket refused write");
                    break;
                }
            }
            Outbound::Close => {
                if let Err(e) = sink.send(Message::Close(None)).await {
                    debug!(error = %e, "Close frame not sent");
                }
                break;
            }
        }
    }
    debug!("Writer finished");
}

/// Serves one upgraded socket until it closes.
#[instrument(skip_all)]
pub async fn handle_socket(socket: WebSocket, state: AppState) {
    let (sink, stream) = socket.split();
    let (outbox, rx) = Outbox::channel();
    let writer = tokio::spawn(pump_outbox(sink, rx));

    let connection = Connection::new(
        WsFrames::new(stream),
        outbox,
        *state.config().max_message_bytes(),
    );
    let player_id = state.matchmaker().factory().next_player_id();
    if let Err(e) = serve_connection(connection, Arc::clone(state.matchmaker()), player_id).await {
        info!(player_id, error = %e, "Connection ended with error");
    }

    if let Err(e) = writer.await {
        warn!(error = %e, "Writer task failed");
    }
}
