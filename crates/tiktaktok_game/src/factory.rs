//! Construction of players and games.

use crate::game::{Game, GameId, SharedGame};
use crate::player::{EventSink, Player, PlayerHandle, PlayerId};
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use tracing::instrument;

/// Builds wired players and games and hands out their IDs.
#[derive(Debug, Default)]
pub struct GameFactory {
    next_game_id: AtomicU64,
    next_player_id: AtomicU64,
}

impl GameFactory {
    /// Creates a factory whose IDs start at 1.
    pub fn new() -> Self {
        Self::default()
    }

    /// Reserves an ID for a newly accepted connection.
    pub fn next_player_id(&self) -> PlayerId {
        self.next_player_id.fetch_add(1, Ordering::Relaxed) + 1
    }

    /// Creates a player whose events go to `sink`.
    #[instrument(skip(self, name, sink), fields(name = %name.as_ref()))]
    pub fn create_player(
        &self,
        id: PlayerId,
        name: impl AsRef<str>,
        sink: Arc<dyn EventSink>,
    ) -> PlayerHandle {
        Arc::new(Player::new(id, name.as_ref(), sink))
    }

    /// Creates an empty shared game.
    #[instrument(skip(self))]
    pub fn create_game(&self) -> SharedGame {
        let id: GameId = self.next_game_id.fetch_add(1, Ordering::Relaxed) + 1;
        Game::new(id).into_shared()
    }
}
