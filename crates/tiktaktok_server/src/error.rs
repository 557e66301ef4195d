//! Error types for the wire protocol and connections.

use crate::protocol::EventType;
use derive_more::{Display, From};

/// Failure to turn wire bytes into a domain event or back.
#[derive(Debug, Clone, PartialEq, Eq, Display)]
pub enum ProtocolError {
    /// Outer envelope is not `{eventType, eventData}`.
    #[display("Malformed envelope: {reason}")]
    MalformedEnvelope {
        /// Parser message.
        reason: String,
    },
    /// Tag is not an inbound event.
    #[display("Unknown message type: {tag}")]
    UnknownMessageType {
        /// Tag as received.
        tag: String,
    },
    /// Inner payload does not match the tag's shape.
    #[display("Malformed {tag} payload: {reason}")]
    MalformedPayload {
        /// Resolved tag.
        tag: EventType,
        /// Parser message.
        reason: String,
    },
    /// Serializer refused an outbound event.
    #[display("Failed to encode {tag}: {reason}")]
    Encode {
        /// Tag being encoded.
        tag: EventType,
        /// Serializer message.
        reason: String,
    },
    /// Reassembled text is not UTF-8.
    #[display("Message is not valid UTF-8")]
    InvalidUtf8,
    /// Frame type that carries no domain payload.
    #[display("Unsupported {kind} frame")]
    UnsupportedFrame {
        /// Frame kind, e.g. `binary`.
        kind: &'static str,
    },
    /// Reassembled message grew past the configured limit.
    #[display("Message exceeds {limit} bytes")]
    MessageTooLarge {
        /// Limit in bytes.
        limit: usize,
    },
}

impl std::error::Error for ProtocolError {}

impl ProtocolError {
    /// Whether the connection must be dropped.
    ///
    /// Everything else discards one message and keeps reading.
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            ProtocolError::UnsupportedFrame { .. } | ProtocolError::MessageTooLarge { .. }
        )
    }
}

/// Failure on a single connection.
#[derive(Debug, Clone, PartialEq, Eq, Display, From)]
pub enum ConnectionError {
    /// The transport failed to deliver a frame.
    #[display("Transport error: {reason}")]
    #[from(skip)]
    Transport {
        /// Transport message.
        reason: String,
    },
    /// The peer broke the protocol.
    #[display("{_0}")]
    Protocol(ProtocolError),
}

impl std::error::Error for ConnectionError {}

impl ConnectionError {
    /// Wraps a transport failure.
    pub fn transport(reason: impl ToString) -> Self {
        ConnectionError::Transport {
            reason: reason.to_string(),
        }
    }

    /// Whether the receive loop must stop.
    pub fn is_fatal(&self) -> bool {
        match self {
            ConnectionError::Transport { .. } => true,
            ConnectionError::Protocol(e) => e.is_fatal(),
        }
    }
}
