//! Transport-agnostic connection: frames in, complete messages out.
//!
//! A [`FrameSource`] yields raw frames from some transport. [`Connection`]
//! reassembles fragmented text into whole messages and enforces the size
//! limit. Outgoing events go through an [`Outbox`], an unbounded queue a
//! writer task drains, so game code never waits on a socket.

use crate::error::{ConnectionError, ProtocolError};
use async_trait::async_trait;
use tiktaktok_game::{EventSink, ServerEvent};
use tokio::sync::mpsc;
use tracing::{debug, instrument, trace, warn};

/// One frame as delivered by a transport.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Frame {
    /// Text data, possibly one fragment of a larger message.
    Text {
        /// Raw bytes of this fragment.
        payload: Vec<u8>,
        /// Whether this fragment completes the message.
        end_of_message: bool,
    },
    /// Binary data. Not part of the protocol.
    Binary,
    /// Peer started the close handshake.
    Close,
}

impl Frame {
    /// A complete text message in one frame.
    pub fn text(text: impl Into<String>) -> Self {
        Frame::Text {
            payload: text.into().into_bytes(),
            end_of_message: true,
        }
    }

    /// One fragment of a text message.
    pub fn fragment(payload: impl Into<Vec<u8>>, end_of_message: bool) -> Self {
        Frame::Text {
            payload: payload.into(),
            end_of_message,
        }
    }
}

/// Something that produces frames from a peer.
///
/// `None` means the transport is gone and nothing more will arrive.
#[async_trait]
pub trait FrameSource: Send {
    /// Waits for the next frame.
    async fn next_frame(&mut self) -> Option<Result<Frame, ConnectionError>>;
}

/// Joins text fragments into whole messages.
#[derive(Debug)]
pub struct MessageAssembler {
    buffer: Vec<u8>,
    limit: usize,
}

impl MessageAssembler {
    /// Creates an assembler rejecting messages over `limit` bytes.
    pub fn new(limit: usize) -> Self {
        Self {
            buffer: Vec::new(),
            limit,
        }
    }

    /// Appends a fragment. Returns the whole message once `end_of_message`
    /// arrives.
    pub fn push(
        &mut self,
        payload: &[u8],
        end_of_message: bool,
    ) -> Result<Option<Vec<u8>>, ProtocolError> {
        if self.buffer.len() + payload.len() > self.limit {
            self.buffer.clear();
            return Err(ProtocolError::MessageTooLarge { limit: self.limit });
        }
        self.buffer.extend_from_slice(payload);
        if !end_of_message {
            trace!(buffered = self.buffer.len(), "Waiting for more fragments");
            return Ok(None);
        }
        Ok(Some(std::mem::take(&mut self.buffer)))
    }
}

/// Item queued for a connection's writer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outbound {
    /// Encode and send.
    Event(ServerEvent),
    /// Send a close frame and stop writing.
    Close,
}

/// Sending half of a connection's outgoing queue.
#[derive(Debug, Clone)]
pub struct Outbox {
    tx: mpsc::UnboundedSender<Outbound>,
}

impl Outbox {
    /// Creates an outbox and the receiver its writer drains.
    pub fn channel() -> (Self, mpsc::UnboundedReceiver<Outbound>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self { tx }, rx)
    }

    /// Asks the writer to close the connection.
    pub fn close(&self) {
        if self.tx.send(Outbound::Close).is_err() {
            trace!("Writer already gone");
        }
    }

    /// Whether the writer has stopped.
    pub fn is_closed(&self) -> bool {
        self.tx.is_closed()
    }
}

impl EventSink for Outbox {
    fn send_event(&self, event: ServerEvent) {
        if self.tx.send(Outbound::Event(event)).is_err() {
            debug!("Dropping event for closed connection");
        }
    }
}

/// A peer connection yielding complete text messages.
#[derive(Debug)]
pub struct Connection<S> {
    source: S,
    assembler: MessageAssembler,
    outbox: Outbox,
}

impl<S: FrameSource> Connection<S> {
    /// Wraps `source`, replying through `outbox`.
    pub fn new(source: S, outbox: Outbox, max_message_bytes: usize) -> Self {
        Self {
            source,
            assembler: MessageAssembler::new(max_message_bytes),
            outbox,
        }
    }

    /// Outgoing queue of this connection.
    pub fn outbox(&self) -> &Outbox {
        &self.outbox
    }

    /// Waits for the next complete text message.
    ///
    /// Returns `Ok(None)` once the peer closed or the transport ended. A
    /// close frame also queues our half of the close handshake. Errors
    /// that are not [fatal](ConnectionError::is_fatal) concern a single
    /// message; the caller may keep receiving.
    #[instrument(level = "trace", skip(self))]
    pub async fn receive(&mut self) -> Result<Option<String>, ConnectionError> {
        loop {
            let Some(frame) = self.source.next_frame().await else {
                debug!("Transport ended");
                return Ok(None);
            };

            match frame? {
                Frame::Text {
                    payload,
                    end_of_message,
                } => {
                    let Some(bytes) = self.assembler.push(&payload, end_of_message)? else {
                        continue;
                    };
                    return String::from_utf8(bytes)
                        .map(Some)
                        .map_err(|_| ProtocolError::InvalidUtf8.into());
                }
                Frame::Binary => {
                    warn!("Binary frame received");
                    return Err(ProtocolError::UnsupportedFrame { kind: "binary" }.into());
                }
                Frame::Close => {
                    debug!("Peer requested close");
                    self.outbox.close();
                    return Ok(None);
                }
            }
        }
    }
}
