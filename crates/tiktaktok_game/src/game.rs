//! Authoritative game state machine.
//!
//! A [`Game`] owns one board and up to two players. Every side effect is
//! an event pushed to the seated players' sinks; the engine never touches
//! a transport.

use crate::events::{
    AbortReason, ChatBroadcast, ErrorKind, GameAborted, NextMove, PlayerLeft, PlayerMoved,
    RosterEntry, ServerEvent, StatusChanged,
};
use crate::player::{PlayerHandle, PlayerId};
use crate::rules::{GameResult, check_grid};
use crate::{Board, GameStatus, Mark};
use derive_more::Display;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tracing::{debug, info, instrument, warn};

/// Unique identifier for a game.
pub type GameId = u64;

/// A game reachable from several sessions.
pub type SharedGame = Arc<Mutex<Game>>;

/// Seats per game.
pub const MAX_PLAYERS: usize = 2;

/// Locks a shared game.
///
/// Engine calls never panic while holding the lock, so a poisoned mutex
/// still holds consistent state and is recovered.
pub fn lock(game: &SharedGame) -> MutexGuard<'_, Game> {
    game.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Why a move was refused.
///
/// The display text is what the requester sees.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
pub enum MoveRejection {
    /// Still waiting for the second player.
    #[display("Game has not started yet")]
    NotStarted,
    /// Finished or aborted.
    #[display("Cannot move: the game is already over")]
    GameOver,
    /// The other mark is due.
    #[display("Another player's turn")]
    NotYourTurn,
    /// Cell outside 0..=8.
    #[display("Move outside the grid")]
    OutsideGrid,
    /// Cell already holds a mark.
    #[display("Cell is already taken")]
    CellTaken,
    /// Requester has no seat in this game.
    #[display("Player is not part of this game")]
    NotSeated,
}

impl std::error::Error for MoveRejection {}

/// One tic-tac-toe match between two players.
#[derive(Debug)]
pub struct Game {
    id: GameId,
    board: Board,
    players: Vec<PlayerHandle>,
    status: GameStatus,
    turn: Mark,
}

impl Game {
    /// Creates an empty game waiting for players.
    #[instrument]
    pub fn new(id: GameId) -> Self {
        info!(game_id = id, "Creating new game");
        Self {
            id,
            board: Board::new(),
            players: Vec::with_capacity(MAX_PLAYERS),
            status: GameStatus::WaitingForSecondPlayer,
            turn: Mark::Nothing,
        }
    }

    /// Wraps the game for sharing between sessions.
    pub fn into_shared(self) -> SharedGame {
        Arc::new(Mutex::new(self))
    }

    /// Game ID.
    pub fn id(&self) -> GameId {
        self.id
    }

    /// Current board.
    pub fn board(&self) -> &Board {
        &self.board
    }

    /// Current status.
    pub fn status(&self) -> GameStatus {
        self.status
    }

    /// Mark allowed to move, `Nothing` before start.
    pub fn turn(&self) -> Mark {
        self.turn
    }

    /// Seated players in join order.
    pub fn players(&self) -> &[PlayerHandle] {
        &self.players
    }

    /// Names of the seated players in join order.
    pub fn player_names(&self) -> Vec<&str> {
        self.players.iter().map(|player| player.name()).collect()
    }

    /// Whether the player holds a seat.
    pub fn contains(&self, player_id: PlayerId) -> bool {
        self.seat(player_id).is_some()
    }

    /// Seats a player. Starts the game when the second seat fills.
    ///
    /// Returns `false` and changes nothing when the game is full.
    #[instrument(skip(self, player), fields(game_id = self.id, player_id = player.id()))]
    pub fn add_player(&mut self, player: PlayerHandle) -> bool {
        if self.players.len() >= MAX_PLAYERS {
            warn!("Game already has 2 players");
            return false;
        }

        info!(name = %player.name(), "Seating player");
        self.players.push(player);

        if self.players.len() == MAX_PLAYERS {
            self.start();
        } else {
            self.change_status(StatusChanged::waiting());
        }
        true
    }

    /// Flips the coin for marks and opens the first turn.
    fn start(&mut self) {
        let first = if rand::random_bool(0.5) { Mark::X } else { Mark::O };
        let marks = [first, first.opponent()];
        for (player, mark) in self.players.iter().zip(marks) {
            player.assign_mark(mark);
        }

        self.turn = Mark::X;

        let roster = self
            .players
            .iter()
            .map(|player| RosterEntry::new(player.name(), player.mark()))
            .collect();
        info!(game_id = self.id, ?roster, "Game started");
        self.change_status(StatusChanged::started(roster));
        self.broadcast(NextMove::new(self.turn).into());
    }

    /// Applies a move for the given player.
    ///
    /// A rejected move changes nothing and is reported to the requester
    /// alone as `incorrectMove`. An accepted move is broadcast, then either
    /// ends the game or hands the turn over.
    #[instrument(skip(self), fields(game_id = self.id))]
    pub fn make_move(&mut self, player_id: PlayerId, cell: i64) -> Result<GameResult, MoveRejection> {
        let Some(player) = self.seat(player_id).cloned() else {
            warn!("Move from player without a seat");
            return Err(MoveRejection::NotSeated);
        };

        let cell = match self.validate_move(player.mark(), cell) {
            Ok(cell) => cell,
            Err(rejection) => {
                warn!(%rejection, "Move rejected");
                player.send_error(ErrorKind::IncorrectMove, rejection.to_string());
                return Err(rejection);
            }
        };

        if let Err(e) = self.board.place(cell, self.turn) {
            // validate_move already checked range and occupancy
            warn!(error = %e, "Board refused validated move");
            player.send_error(ErrorKind::IncorrectMove, MoveRejection::CellTaken.to_string());
            return Err(MoveRejection::CellTaken);
        }
        debug!(cell, mark = ?self.turn, "Mark placed");
        self.broadcast(PlayerMoved::new(self.turn, cell).into());

        let result = check_grid(&self.board, self.turn);
        if result.is_terminal() {
            info!(?result, board = %self.board.display(), "Game finished");
            self.change_status(StatusChanged::finished(result));
        } else {
            self.turn = self.turn.opponent();
            self.broadcast(NextMove::new(self.turn).into());
        }
        Ok(result)
    }

    fn validate_move(&self, mark: Mark, cell: i64) -> Result<usize, MoveRejection> {
        match self.status {
            GameStatus::WaitingForSecondPlayer => return Err(MoveRejection::NotStarted),
            GameStatus::Finished | GameStatus::Aborted => return Err(MoveRejection::GameOver),
            GameStatus::Started => {}
        }
        if mark != self.turn {
            return Err(MoveRejection::NotYourTurn);
        }
        let cell = usize::try_from(cell)
            .ok()
            .filter(|&cell| self.board.get(cell).is_some())
            .ok_or(MoveRejection::OutsideGrid)?;
        if !self.board.is_empty(cell) {
            return Err(MoveRejection::CellTaken);
        }
        Ok(cell)
    }

    /// Removes a departing player.
    ///
    /// The remaining player is told who left. A started game is aborted;
    /// a waiting or finished one is not. Returns `false` if the player had
    /// no seat.
    #[instrument(skip(self), fields(game_id = self.id))]
    pub fn player_disconnected(&mut self, player_id: PlayerId) -> bool {
        let Some(index) = self.players.iter().position(|p| p.id() == player_id) else {
            debug!("Player already gone");
            return false;
        };
        let player = self.players.remove(index);
        info!(name = %player.name(), status = ?self.status, "Player left game");

        self.broadcast(PlayerLeft::new(player.name()).into());

        if self.status == GameStatus::Started {
            self.change_status(StatusChanged::aborted(GameAborted::new(
                AbortReason::PlayerDisconnected,
                player.name(),
            )));
        }
        true
    }

    /// Relays chat from a seated player to everyone, whatever the status.
    ///
    /// Returns `false` if the sender has no seat.
    #[instrument(skip(self, text), fields(game_id = self.id))]
    pub fn chat_message(&self, player_id: PlayerId, text: &str) -> bool {
        let Some(player) = self.seat(player_id) else {
            debug!("Chat from player without a seat");
            return false;
        };
        self.broadcast(ChatBroadcast::new(player.name(), text).into());
        true
    }

    fn seat(&self, player_id: PlayerId) -> Option<&PlayerHandle> {
        self.players.iter().find(|player| player.id() == player_id)
    }

    fn change_status(&mut self, change: StatusChanged) {
        let next = change.game_status;
        if !self.status.can_transition_to(next) {
            warn!(from = ?self.status, to = ?next, "Ignoring backward status change");
            return;
        }
        debug!(from = ?self.status, to = ?next, "Status changed");
        self.status = next;
        self.broadcast(change.into());
    }

    fn broadcast(&self, event: ServerEvent) {
        for player in &self.players {
            player.send(event.clone());
        }
    }
}
