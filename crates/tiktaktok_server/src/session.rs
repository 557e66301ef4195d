//! Player session: one connection's view of matchmaking and its game.
//!
//! The session decodes each inbound message, turns it into exactly one
//! engine call, and forgets its game on reassignment or disconnect. Events
//! reach the client through the sink the session registered when it became
//! ready; the session never forwards anything itself.

use crate::connection::{Connection, FrameSource};
use crate::error::{ConnectionError, ProtocolError};
use crate::protocol::decode_client_event;
use std::sync::Arc;
use tiktaktok_game::{
    Assignment, ClientEvent, ErrorEvent, ErrorKind, EventSink, GameId, Matchmaker, MoveRejection,
    PlayerHandle, PlayerId, lock,
};
use tracing::{debug, info, instrument, warn};

/// State of one connected client.
#[derive(Debug)]
pub struct PlayerSession {
    player_id: PlayerId,
    sink: Arc<dyn EventSink>,
    matchmaker: Arc<Matchmaker>,
    seat: Option<Assignment>,
}

impl PlayerSession {
    /// Creates a session that has not declared itself ready yet.
    pub fn new(player_id: PlayerId, sink: Arc<dyn EventSink>, matchmaker: Arc<Matchmaker>) -> Self {
        Self {
            player_id,
            sink,
            matchmaker,
            seat: None,
        }
    }

    /// ID used for every player this session creates.
    pub fn player_id(&self) -> PlayerId {
        self.player_id
    }

    /// Game the session is seated in.
    pub fn game_id(&self) -> Option<GameId> {
        self.seat.as_ref().map(|seat| seat.game_id)
    }

    /// Current player handle, once ready.
    pub fn player(&self) -> Option<&PlayerHandle> {
        self.seat.as_ref().map(|seat| &seat.player)
    }

    /// Decodes and dispatches one complete message.
    ///
    /// An unknown tag is reported to the client as `unknownMessageType`.
    /// Any decode failure is returned so the caller can log it; none of
    /// them end the session.
    #[instrument(skip(self, text), fields(player_id = self.player_id))]
    pub fn handle_text(&mut self, text: &str) -> Result<(), ProtocolError> {
        match decode_client_event(text) {
            Ok(event) => {
                self.dispatch(event);
                Ok(())
            }
            Err(e) => {
                if let ProtocolError::UnknownMessageType { tag } = &e {
                    warn!(%tag, "Unknown message type");
                    self.send_error(ErrorKind::UnknownMessageType, e.to_string());
                }
                Err(e)
            }
        }
    }

    /// Routes a decoded request to the engine.
    pub fn dispatch(&mut self, event: ClientEvent) {
        match event {
            ClientEvent::Move(mv) => self.on_move(mv.cell),
            ClientEvent::ChatMessage(chat) => self.on_chat(&chat.message),
            ClientEvent::PlayerReady(ready) => self.on_ready(&ready.player_name),
        }
    }

    fn on_move(&self, cell: i64) {
        let Some(seat) = &self.seat else {
            debug!(cell, "Move before matchmaking");
            self.send_error(ErrorKind::IncorrectMove, MoveRejection::NotStarted.to_string());
            return;
        };
        if let Err(rejection) = lock(&seat.game).make_move(self.player_id, cell) {
            debug!(%rejection, cell, "Move refused");
        }
    }

    fn on_chat(&self, text: &str) {
        let Some(seat) = &self.seat else {
            debug!("Dropping chat before matchmaking");
            return;
        };
        lock(&seat.game).chat_message(self.player_id, text);
    }

    fn on_ready(&mut self, name: &str) {
        let current = self.seat.as_ref().map(|seat| &seat.game);
        match self
            .matchmaker
            .player_ready(self.player_id, name, Arc::clone(&self.sink), current)
        {
            Ok(assignment) => {
                info!(game_id = assignment.game_id, "Session seated");
                self.seat = Some(assignment);
            }
            Err(e) => debug!(error = %e, "Ready refused"),
        }
    }

    /// Leaves the current game, if any.
    ///
    /// Safe to call more than once.
    #[instrument(skip(self), fields(player_id = self.player_id))]
    pub fn disconnect(&mut self) {
        let Some(seat) = self.seat.take() else {
            debug!("Disconnect without a game");
            return;
        };
        lock(&seat.game).player_disconnected(self.player_id);
        info!(game_id = seat.game_id, "Session left game");
    }

    fn send_error(&self, kind: ErrorKind, message: String) {
        self.sink.send_event(ErrorEvent::new(kind, message).into());
    }
}

/// Runs one connection until the peer leaves.
///
/// Ends on close, transport end, or a fatal protocol error. Either way the
/// player leaves its game and the writer is told to close.
#[instrument(skip(connection, matchmaker))]
pub async fn serve_connection<S: FrameSource>(
    mut connection: Connection<S>,
    matchmaker: Arc<Matchmaker>,
    player_id: PlayerId,
) -> Result<(), ConnectionError> {
    info!("Connection opened");
    let sink: Arc<dyn EventSink> = Arc::new(connection.outbox().clone());
    let mut session = PlayerSession::new(player_id, sink, matchmaker);

    let result = loop {
        match connection.receive().await {
            Ok(Some(text)) => {
                if let Err(e) = session.handle_text(&text) {
                    warn!(error = %e, "Discarding message");
                }
            }
            Ok(None) => break Ok(()),
            Err(e) if e.is_fatal() => {
                warn!(error = %e, "Dropping connection");
                break Err(e);
            }
            Err(e) => warn!(error = %e, "Discarding message"),
        }
    };

    session.disconnect();
    connection.outbox().close();
    info!("Connection closed");
    result
}
