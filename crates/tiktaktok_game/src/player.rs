//! Players seated in a game and the sink their events flow into.

use crate::events::{ErrorEvent, ErrorKind, ServerEvent, SetMark};
use crate::Mark;
use std::fmt;
use std::sync::{Arc, OnceLock};
use tracing::{debug, instrument, warn};

/// Unique identifier for a connected player.
pub type PlayerId = u64;

/// Shared handle to a seated player.
pub type PlayerHandle = Arc<Player>;

/// Destination for events addressed to one player.
///
/// Delivery is fire-and-forget: implementations must not block and must
/// not report failures back to the caller. A dead transport shows up
/// later as a disconnect.
pub trait EventSink: Send + Sync + fmt::Debug {
    /// Queues an event for delivery.
    fn send_event(&self, event: ServerEvent);
}

/// A player taking part in one game.
///
/// Created by the game factory when a session becomes ready. The mark is
/// written once, when the game starts.
#[derive(Debug)]
pub struct Player {
    id: PlayerId,
    name: String,
    mark: OnceLock<Mark>,
    sink: Arc<dyn EventSink>,
}

impl Player {
    /// Creates a player with no mark yet.
    pub fn new(id: PlayerId, name: impl Into<String>, sink: Arc<dyn EventSink>) -> Self {
        Self {
            id,
            name: name.into(),
            mark: OnceLock::new(),
            sink,
        }
    }

    /// Player's unique ID.
    pub fn id(&self) -> PlayerId {
        self.id
    }

    /// Display name given at ready time.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Assigned mark, or `Mark::Nothing` before the game starts.
    pub fn mark(&self) -> Mark {
        self.mark.get().copied().unwrap_or_default()
    }

    /// Assigns the player's mark and pushes `setMark` to the client.
    ///
    /// Returns `false` without sending anything if a mark was already set.
    #[instrument(skip(self), fields(player_id = self.id))]
    pub fn assign_mark(&self, mark: Mark) -> bool {
        if self.mark.set(mark).is_err() {
            warn!(current = ?self.mark(), "Mark already assigned");
            return false;
        }
        debug!("Mark assigned");
        self.send(SetMark::new(mark).into());
        true
    }

    /// Queues an event for this player.
    pub fn send(&self, event: ServerEvent) {
        self.sink.send_event(event);
    }

    /// Reports a request-scoped failure to this player only.
    pub fn send_error(&self, kind: ErrorKind, message: impl Into<String>) {
        self.send(ErrorEvent::new(kind, message).into());
    }
}
