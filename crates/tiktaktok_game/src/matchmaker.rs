//! Pairing of ready players into games.
//!
//! The matchmaker holds the only process-wide mutable state: the single
//! waiting game. One mutex guards it, and it is held only for
//! find-or-create, seat, and clear-if-started. Lock order is always
//! matchmaker first, then game; engine code holding a game lock never
//! reaches back into the matchmaker.

use crate::events::ErrorKind;
use crate::factory::GameFactory;
use crate::game::{GameId, SharedGame, lock};
use crate::player::{EventSink, PlayerHandle, PlayerId};
use crate::{ErrorEvent, GameStatus};
use derive_more::Display;
use std::sync::{Arc, Mutex, PoisonError};
use tracing::{debug, info, instrument, warn};

/// Why a ready notification did not lead to a seat.
///
/// The display text is what the requester sees.
#[derive(Debug, Clone, PartialEq, Eq, Display)]
pub enum JoinError {
    /// Name blank after trimming.
    #[display("Name cannot be empty")]
    InvalidName,
    /// Session still seated in a live game.
    #[display("Player is already in a game")]
    AlreadyInGame {
        /// The live game.
        game_id: GameId,
    },
}

impl std::error::Error for JoinError {}

/// Where a ready player was seated.
#[derive(Debug, Clone)]
pub struct Assignment {
    /// Seated player handle.
    pub player: PlayerHandle,
    /// The game holding the seat.
    pub game: SharedGame,
    /// ID of that game.
    pub game_id: GameId,
}

/// Pairs the first two ready players into a game.
#[derive(Debug)]
pub struct Matchmaker {
    factory: Arc<GameFactory>,
    /// The one game with a free seat, if any.
    waiting: Mutex<Option<SharedGame>>,
}

impl Matchmaker {
    /// Creates a matchmaker building games with `factory`.
    pub fn new(factory: Arc<GameFactory>) -> Self {
        Self {
            factory,
            waiting: Mutex::new(None),
        }
    }

    /// Factory used for players and games.
    pub fn factory(&self) -> &Arc<GameFactory> {
        &self.factory
    }

    /// ID of the game currently waiting for an opponent.
    pub fn waiting_game_id(&self) -> Option<GameId> {
        let waiting = self.waiting.lock().unwrap_or_else(PoisonError::into_inner);
        waiting.as_ref().map(|game| lock(game).id())
    }

    /// Handles a ready notification from a session.
    ///
    /// Validation failures are reported to `sink` as `invalidPlayerData`
    /// and leave shared state untouched. If the session's `current` game is
    /// over, the player leaves it before being matched again.
    #[instrument(skip(self, name, sink, current), fields(name = %name))]
    pub fn player_ready(
        &self,
        player_id: PlayerId,
        name: &str,
        sink: Arc<dyn EventSink>,
        current: Option<&SharedGame>,
    ) -> Result<Assignment, JoinError> {
        let name = name.trim();
        if name.is_empty() {
            warn!("Rejecting empty player name");
            return Err(reject(sink.as_ref(), JoinError::InvalidName));
        }

        if let Some(previous) = current {
            let mut previous = lock(previous);
            if !previous.status().is_terminal() {
                warn!(game_id = previous.id(), "Player is already in a live game");
                let error = JoinError::AlreadyInGame {
                    game_id: previous.id(),
                };
                return Err(reject(sink.as_ref(), error));
            }
            debug!(game_id = previous.id(), "Leaving finished game");
            previous.player_disconnected(player_id);
        }

        let player = self.factory.create_player(player_id, name, sink);

        let mut waiting = self.waiting.lock().unwrap_or_else(PoisonError::into_inner);
        let game = waiting
            .get_or_insert_with(|| self.factory.create_game())
            .clone();

        let (game_id, status) = {
            let mut seated = lock(&game);
            seated.add_player(player.clone());
            (seated.id(), seated.status())
        };

        if status == GameStatus::Started {
            *waiting = None;
        }
        drop(waiting);

        info!(game_id, ?status, "Player matched");
        Ok(Assignment {
            player,
            game,
            game_id,
        })
    }
}

fn reject(sink: &dyn EventSink, error: JoinError) -> JoinError {
    sink.send_event(ErrorEvent::new(ErrorKind::InvalidPlayerData, error.to_string()).into());
    error
}
