//! Envelope codec for the WebSocket protocol.
//!
//! Every message is a JSON envelope `{eventType, eventData}` whose
//! `eventData` is itself a JSON document encoded as a string. The outer
//! layer never looks inside the payload; the tag alone selects its shape.

use crate::error::ProtocolError;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use tiktaktok_game::{
    ChatBroadcast, ChatMessage, ClientEvent, ErrorEvent, Move, NextMove, PlayerLeft, PlayerMoved,
    PlayerReady, ServerEvent, SetMark, StatusChanged,
};
use tracing::{instrument, trace};

/// Tag naming the payload carried by an envelope.
///
/// Parsing ignores ASCII case; browsers in the wild send `Move` and
/// `PlayerReady`.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    strum::Display,
    strum::EnumString,
    strum::EnumIter,
)]
#[strum(serialize_all = "camelCase", ascii_case_insensitive)]
pub enum EventType {
    /// Request-scoped failure.
    Error,
    /// Chat, both directions.
    ChatMessage,
    /// Game status change.
    Status,
    /// Reserved. Never sent; the end of a game travels as `status`.
    EndOfGame,
    /// Turn change.
    NextMove,
    /// Move request inbound, move broadcast outbound.
    Move,
    /// Mark assignment.
    SetMark,
    /// Ready notification.
    PlayerReady,
    /// Departure notice.
    #[strum(serialize = "playerLeaved")]
    PlayerLeft,
}

impl EventType {
    /// Whether clients may send this tag.
    pub fn is_inbound(self) -> bool {
        matches!(
            self,
            EventType::Move | EventType::ChatMessage | EventType::PlayerReady
        )
    }

    /// Tag for an outbound event.
    pub fn of_server_event(event: &ServerEvent) -> Self {
        match event {
            ServerEvent::Error(_) => EventType::Error,
            ServerEvent::SetMark(_) => EventType::SetMark,
            ServerEvent::Status(_) => EventType::Status,
            ServerEvent::Move(_) => EventType::Move,
            ServerEvent::NextMove(_) => EventType::NextMove,
            ServerEvent::ChatMessage(_) => EventType::ChatMessage,
            ServerEvent::PlayerLeft(_) => EventType::PlayerLeft,
        }
    }

    /// Tag for an inbound event.
    pub fn of_client_event(event: &ClientEvent) -> Self {
        match event {
            ClientEvent::Move(_) => EventType::Move,
            ClientEvent::ChatMessage(_) => EventType::ChatMessage,
            ClientEvent::PlayerReady(_) => EventType::PlayerReady,
        }
    }
}

/// Outer frame of every message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Envelope {
    /// Tag as sent. Kept raw so unknown tags can be reported verbatim.
    pub event_type: String,
    /// Payload, JSON encoded as a string.
    pub event_data: String,
}

impl Envelope {
    /// Parses the outer envelope only.
    pub fn parse(text: &str) -> Result<Self, ProtocolError> {
        serde_json::from_str(text).map_err(|e| ProtocolError::MalformedEnvelope {
            reason: e.to_string(),
        })
    }

    /// Parses the payload as `T`.
    fn payload<T: DeserializeOwned>(&self, tag: EventType) -> Result<T, ProtocolError> {
        serde_json::from_str(&self.event_data).map_err(|e| ProtocolError::MalformedPayload {
            tag,
            reason: e.to_string(),
        })
    }

    /// Resolves the tag against the full table.
    fn tag(&self) -> Result<EventType, ProtocolError> {
        EventType::from_str(&self.event_type).map_err(|_| ProtocolError::UnknownMessageType {
            tag: self.event_type.clone(),
        })
    }
}

/// Encodes `payload` under `tag`, nesting the payload as a string.
fn encode<T: Serialize>(tag: EventType, payload: &T) -> Result<String, ProtocolError> {
    let to_encode_error = |e: serde_json::Error| ProtocolError::Encode {
        tag,
        reason: e.to_string(),
    };
    let envelope = Envelope {
        event_type: tag.to_string(),
        event_data: serde_json::to_string(payload).map_err(to_encode_error)?,
    };
    serde_json::to_string(&envelope).map_err(to_encode_error)
}

/// Encodes an event for a client.
#[instrument(level = "trace", skip(event))]
pub fn encode_server_event(event: &ServerEvent) -> Result<String, ProtocolError> {
    let tag = EventType::of_server_event(event);
    trace!(%tag, "Encoding server event");
    match event {
        ServerEvent::Error(e) => encode(tag, e),
        ServerEvent::SetMark(e) => encode(tag, e),
        ServerEvent::Status(e) => encode(tag, e),
        ServerEvent::Move(e) => encode(tag, e),
        ServerEvent::NextMove(e) => encode(tag, e),
        ServerEvent::ChatMessage(e) => encode(tag, e),
        ServerEvent::PlayerLeft(e) => encode(tag, e),
    }
}

/// Decodes a message from a client.
///
/// Only `move`, `chatMessage` and `playerReady` are accepted; every other
/// tag, known or not, fails with [`ProtocolError::UnknownMessageType`].
#[instrument(level = "trace", skip(text))]
pub fn decode_client_event(text: &str) -> Result<ClientEvent, ProtocolError> {
    let envelope = Envelope::parse(text)?;
    let tag = envelope.tag()?;
    match tag {
        EventType::Move => envelope.payload::<Move>(tag).map(ClientEvent::Move),
        EventType::ChatMessage => envelope
            .payload::<ChatMessage>(tag)
            .map(ClientEvent::ChatMessage),
        EventType::PlayerReady => envelope
            .payload::<PlayerReady>(tag)
            .map(ClientEvent::PlayerReady),
        _ => Err(ProtocolError::UnknownMessageType {
            tag: envelope.event_type,
        }),
    }
}

/// Encodes a client request. Used by client code and tests.
pub fn encode_client_event(event: &ClientEvent) -> Result<String, ProtocolError> {
    let tag = EventType::of_client_event(event);
    match event {
        ClientEvent::Move(e) => encode(tag, e),
        ClientEvent::ChatMessage(e) => encode(tag, e),
        ClientEvent::PlayerReady(e) => encode(tag, e),
    }
}

/// Decodes a message as a client would see it.
pub fn decode_server_event(text: &str) -> Result<ServerEvent, ProtocolError> {
    let envelope = Envelope::parse(text)?;
    let tag = envelope.tag()?;
    match tag {
        EventType::Error => envelope.payload::<ErrorEvent>(tag).map(Into::into),
        EventType::SetMark => envelope.payload::<SetMark>(tag).map(Into::into),
        EventType::Status => envelope.payload::<StatusChanged>(tag).map(Into::into),
        EventType::Move => envelope.payload::<PlayerMoved>(tag).map(Into::into),
        EventType::NextMove => envelope.payload::<NextMove>(tag).map(Into::into),
        EventType::ChatMessage => envelope.payload::<ChatBroadcast>(tag).map(Into::into),
        EventType::PlayerLeft => envelope.payload::<PlayerLeft>(tag).map(Into::into),
        EventType::EndOfGame | EventType::PlayerReady => Err(ProtocolError::UnknownMessageType {
            tag: envelope.event_type,
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::{Value, json};
    use std::collections::HashSet;
    use strum::IntoEnumIterator;
    use tiktaktok_game::Mark;

    fn envelope(tag: &str, data: Value) -> String {
        json!({"eventType": tag, "eventData": data.to_string()}).to_string()
    }

    #[test]
    fn test_tag_table() {
        let tags: Vec<String> = EventType::iter().map(|t| t.to_string()).collect();
        assert_eq!(
            tags,
            [
                "error",
                "chatMessage",
                "status",
                "endOfGame",
                "nextMove",
                "move",
                "setMark",
                "playerReady",
                "playerLeaved"
            ]
        );
        assert_eq!(tags.iter().collect::<HashSet<_>>().len(), tags.len());
    }

    #[test]
    fn test_tags_parse_case_insensitively() {
        assert_eq!(EventType::from_str("Move"), Ok(EventType::Move));
        assert_eq!(EventType::from_str("PLAYERREADY"), Ok(EventType::PlayerReady));
        assert_eq!(EventType::from_str("playerleaved"), Ok(EventType::PlayerLeft));
        assert!(EventType::from_str("playerLeft").is_err());
    }

    #[test]
    fn test_only_three_tags_are_inbound() {
        let inbound: Vec<EventType> = EventType::iter().filter(|t| t.is_inbound()).collect();
        assert_eq!(
            inbound,
            [EventType::ChatMessage, EventType::Move, EventType::PlayerReady]
        );
    }

    #[test]
    fn test_payload_is_double_encoded() {
        let text = encode_server_event(&NextMove::new(Mark::O).into()).unwrap();
        let outer: Value = serde_json::from_str(&text).unwrap();
        assert_eq!(outer["eventType"], "nextMove");
        let inner = outer["eventData"].as_str().unwrap();
        assert_eq!(serde_json::from_str::<Value>(inner).unwrap(), json!({"mark": "o"}));
    }

    #[test]
    fn test_decodes_browser_messages() {
        let mv = decode_client_event(&envelope("Move", json!({"cell": 4, "mark": "x"}))).unwrap();
        assert_eq!(mv, ClientEvent::Move(Move::new(4)));

        let ready = decode_client_event(&envelope(
            "PlayerReady",
            json!({"playerName": "ann"}),
        ))
        .unwrap();
        assert_eq!(ready, ClientEvent::PlayerReady(PlayerReady::new("ann")));

        let chat =
            decode_client_event(&envelope("ChatMessage", json!({"message": "hi"}))).unwrap();
        assert_eq!(chat, ClientEvent::ChatMessage(ChatMessage::new("hi")));
    }

    #[test]
    fn test_client_events_survive_the_codec() {
        for event in [
            ClientEvent::Move(Move::new(8)),
            ClientEvent::ChatMessage(ChatMessage::new("good game")),
            ClientEvent::PlayerReady(PlayerReady::new("bob")),
        ] {
            let text = encode_client_event(&event).unwrap();
            assert_eq!(decode_client_event(&text).unwrap(), event);
        }
    }

    #[test]
    fn test_outbound_tags_are_unknown_inbound() {
        for tag in ["status", "setMark", "endOfGame", "playerLeaved", "error", "nonsense"] {
            let err = decode_client_event(&envelope(tag, json!({}))).unwrap_err();
            assert_eq!(
                err,
                ProtocolError::UnknownMessageType {
                    tag: tag.to_string()
                }
            );
        }
    }

    #[test]
    fn test_malformed_input() {
        assert!(matches!(
            decode_client_event("not json"),
            Err(ProtocolError::MalformedEnvelope { .. })
        ));
        assert!(matches!(
            decode_client_event(r#"{"eventType": "move"}"#),
            Err(ProtocolError::MalformedEnvelope { .. })
        ));
        assert!(matches!(
            decode_client_event(&envelope("move", json!({"cell": "four"}))),
            Err(ProtocolError::MalformedPayload {
                tag: EventType::Move,
                ..
            })
        ));
        // eventData must be a string, not an inline object.
        assert!(matches!(
            decode_client_event(r#"{"eventType": "move", "eventData": {"cell": 1}}"#),
            Err(ProtocolError::MalformedEnvelope { .. })
        ));
    }

    #[test]
    fn test_server_events_decode_for_clients() {
        let event: ServerEvent = PlayerMoved::new(Mark::X, 2).into();
        let text = encode_server_event(&event).unwrap();
        assert_eq!(decode_server_event(&text).unwrap(), event);

        let left: ServerEvent = PlayerLeft::new("ann").into();
        let text = encode_server_event(&left).unwrap();
        assert!(text.contains(r#""eventType":"playerLeaved""#));
        assert_eq!(decode_server_event(&text).unwrap(), left);
    }
}
