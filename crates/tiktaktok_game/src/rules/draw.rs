//! Draw detection for tic-tac-toe.

use crate::{Board, Mark};
use tracing::instrument;

/// Checks if every cell holds a mark.
///
/// A full board with no winner is a draw.
#[instrument(skip(board))]
pub fn is_full(board: &Board) -> bool {
    board.cells().iter().all(|&cell| cell != Mark::Nothing)
}
