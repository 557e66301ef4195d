//! Shared helpers for engine tests.

#![allow(dead_code)]

use std::sync::{Arc, Mutex};
use tiktaktok_game::{
    EventSink, Game, GameFactory, GameStatus, Mark, PlayerHandle, ServerEvent, StatusChanged,
};

/// Sink that keeps every event it receives.
#[derive(Debug, Default)]
pub struct RecordingSink {
    events: Mutex<Vec<ServerEvent>>,
}

impl RecordingSink {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// Drains the recorded events.
    pub fn take(&self) -> Vec<ServerEvent> {
        std::mem::take(&mut *self.events.lock().unwrap())
    }
}

impl EventSink for RecordingSink {
    fn send_event(&self, event: ServerEvent) {
        self.events.lock().unwrap().push(event);
    }
}

/// A seated player and what it received.
pub struct Seat {
    pub player: PlayerHandle,
    pub sink: Arc<RecordingSink>,
}

impl Seat {
    pub fn new(factory: &GameFactory, name: &str) -> Self {
        let sink = RecordingSink::new();
        let player = factory.create_player(factory.next_player_id(), name, sink.clone());
        Self { player, sink }
    }

    pub fn id(&self) -> u64 {
        self.player.id()
    }
}

/// A started game with seats ordered as (X, O). Recorded events are cleared.
pub fn started_game() -> (Game, Seat, Seat) {
    let factory = GameFactory::new();
    let mut game = Game::new(1);
    let ann = Seat::new(&factory, "ann");
    let bob = Seat::new(&factory, "bob");
    game.add_player(ann.player.clone());
    game.add_player(bob.player.clone());
    assert_eq!(game.status(), GameStatus::Started);
    ann.sink.take();
    bob.sink.take();

    if ann.player.mark() == Mark::X {
        (game, ann, bob)
    } else {
        (game, bob, ann)
    }
}

/// Status changes among `events`.
pub fn statuses(events: &[ServerEvent]) -> Vec<StatusChanged> {
    events
        .iter()
        .filter_map(|event| match event {
            ServerEvent::Status(status) => Some(status.clone()),
            _ => None,
        })
        .collect()
}
