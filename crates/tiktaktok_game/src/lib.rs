//! Tic-tac-toe engine for two remote players.
//!
//! # Architecture
//!
//! - **Rules**: pure win/draw verdict for a board and the mark that moved
//! - **Game**: state machine owning the board and up to two players
//! - **Player**: seated identity plus the [`EventSink`] its events go to
//! - **Factory**: builds players and games, hands out IDs
//! - **Matchmaker**: pairs ready players, holds the single waiting game
//!
//! Nothing here knows about sockets. Sessions feed requests in and
//! receive [`ServerEvent`]s through their sink.

#![warn(missing_docs)]
#![forbid(unsafe_code)]

mod events;
mod factory;
mod game;
mod matchmaker;
mod player;
pub mod rules;
mod types;

pub use events::{
    AbortReason, ChatBroadcast, ChatMessage, ClientEvent, ErrorEvent, ErrorKind, GameAborted,
    Move, NextMove, PlayerLeft, PlayerMoved, PlayerReady, RosterEntry, ServerEvent, SetMark,
    StatusChanged, StatusDetail,
};
pub use factory::GameFactory;
pub use game::{Game, GameId, MAX_PLAYERS, MoveRejection, SharedGame, lock};
pub use matchmaker::{Assignment, JoinError, Matchmaker};
pub use player::{EventSink, Player, PlayerHandle, PlayerId};
pub use rules::{GameResult, check_grid};
pub use types::{Board, BoardError, CELL_COUNT, GameStatus, Mark};
