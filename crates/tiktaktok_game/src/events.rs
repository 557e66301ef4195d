//! Domain events exchanged between sessions and games.
//!
//! Field names follow the wire format (camelCase). Tags are not part of
//! these types; the protocol layer maps each variant to its tag.

use crate::{GameResult, GameStatus, Mark};
use derive_new::new;
use serde::{Deserialize, Deserializer, Serialize};

// ─────────────────────────────────────────────────────────────
//  Inbound (client -> server)
// ─────────────────────────────────────────────────────────────

/// Request to place the sender's mark.
///
/// The cell is signed so that out-of-range requests reach move
/// validation instead of failing to decode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, new)]
#[serde(rename_all = "camelCase")]
pub struct Move {
    /// Target cell, expected in 0..=8.
    pub cell: i64,
}

/// Chat text typed by a player.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, new)]
#[serde(rename_all = "camelCase")]
pub struct ChatMessage {
    /// Message body.
    #[new(into)]
    pub message: String,
}

/// Player declares a display name and asks to be matched.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, new)]
#[serde(rename_all = "camelCase")]
pub struct PlayerReady {
    /// Freeform display name. A missing or `null` name reads as empty
    /// and is refused by the matchmaker.
    #[new(into)]
    #[serde(default, deserialize_with = "null_as_empty")]
    pub player_name: String,
}

fn null_as_empty<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<String>::deserialize(deserializer)?.unwrap_or_default())
}

/// Everything a client may send.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ClientEvent {
    /// Place a mark.
    Move(Move),
    /// Say something to the opponent.
    ChatMessage(ChatMessage),
    /// Join matchmaking.
    PlayerReady(PlayerReady),
}

// ─────────────────────────────────────────────────────────────
//  Outbound (server -> client)
// ─────────────────────────────────────────────────────────────

/// Category of a request-scoped failure reported to the client.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ErrorKind {
    /// Move rejected by the game.
    IncorrectMove,
    /// Ready request carried unusable data.
    InvalidPlayerData,
    /// Envelope tag is not an inbound event.
    UnknownMessageType,
}

/// Failure report, delivered only to the offending client.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, new)]
#[serde(rename_all = "camelCase")]
pub struct ErrorEvent {
    /// Failure category.
    pub error_type: ErrorKind,
    /// Human-readable explanation.
    #[new(into)]
    pub message: String,
}

/// Tells a client which mark it plays.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, new)]
#[serde(rename_all = "camelCase")]
pub struct SetMark {
    /// Assigned mark.
    pub mark: Mark,
}

/// A mark was written to the board.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, new)]
#[serde(rename_all = "camelCase")]
pub struct PlayerMoved {
    /// Mark of the mover.
    pub mark: Mark,
    /// Cell written.
    pub cell: usize,
}

/// Whose turn it is now.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, new)]
#[serde(rename_all = "camelCase")]
pub struct NextMove {
    /// Mark allowed to move.
    pub mark: Mark,
}

/// Chat relayed to both players.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, new)]
#[serde(rename_all = "camelCase")]
pub struct ChatBroadcast {
    /// Display name of the author.
    #[new(into)]
    pub sender_name: String,
    /// Message body.
    #[new(into)]
    pub message: String,
}

/// A player left the game.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, new)]
#[serde(rename_all = "camelCase")]
pub struct PlayerLeft {
    /// Display name of the departed player.
    #[new(into)]
    pub name: String,
}

/// One seat in the roster announced at start.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, new)]
#[serde(rename_all = "camelCase")]
pub struct RosterEntry {
    /// Display name.
    #[new(into)]
    pub name: String,
    /// Assigned mark.
    pub mark: Mark,
}

/// Why a game was aborted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum AbortReason {
    /// A player's connection went away mid-game.
    PlayerDisconnected,
}

/// Detail attached to an aborted status.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, new)]
#[serde(rename_all = "camelCase")]
pub struct GameAborted {
    /// Cause.
    pub reason: AbortReason,
    /// Name of the departed player.
    #[new(into)]
    pub details: String,
}

/// Status-specific payload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum StatusDetail {
    /// Seats in join order, sent with `started`.
    Roster(Vec<RosterEntry>),
    /// Final verdict, sent with `finnished`.
    Result(GameResult),
    /// Cause, sent with `aborted`.
    Aborted(GameAborted),
}

/// A game changed status.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StatusChanged {
    /// New status.
    pub game_status: GameStatus,
    /// Variant-specific detail, `null` while waiting.
    pub status_object: Option<StatusDetail>,
}

impl StatusChanged {
    /// Waiting for an opponent.
    pub fn waiting() -> Self {
        Self {
            game_status: GameStatus::WaitingForSecondPlayer,
            status_object: None,
        }
    }

    /// Game started with the given roster.
    pub fn started(roster: Vec<RosterEntry>) -> Self {
        Self {
            game_status: GameStatus::Started,
            status_object: Some(StatusDetail::Roster(roster)),
        }
    }

    /// Game ended with a winner or a draw.
    pub fn finished(result: GameResult) -> Self {
        Self {
            game_status: GameStatus::Finished,
            status_object: Some(StatusDetail::Result(result)),
        }
    }

    /// Game aborted.
    pub fn aborted(aborted: GameAborted) -> Self {
        Self {
            game_status: GameStatus::Aborted,
            status_object: Some(StatusDetail::Aborted(aborted)),
        }
    }
}

/// Everything the server may push to a client.
#[derive(Debug, Clone, PartialEq, Eq, derive_more::From)]
pub enum ServerEvent {
    /// Request-scoped failure.
    Error(ErrorEvent),
    /// Mark assignment.
    SetMark(SetMark),
    /// Status change.
    Status(StatusChanged),
    /// Board write.
    Move(PlayerMoved),
    /// Turn change.
    NextMove(NextMove),
    /// Relayed chat.
    ChatMessage(ChatBroadcast),
    /// Departure notice.
    PlayerLeft(PlayerLeft),
}
