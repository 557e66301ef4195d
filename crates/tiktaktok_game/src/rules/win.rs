//! Win detection for tic-tac-toe.

use crate::{Board, Mark};
use tracing::instrument;

/// All winning lines in search order: rows, columns, then diagonals.
///
/// Each line lists its cells in ascending order.
pub const LINES: [[usize; 3]; 8] = [
    // Rows
    [0, 1, 2],
    [3, 4, 5],
    [6, 7, 8],
    // Columns
    [0, 3, 6],
    [1, 4, 7],
    [2, 5, 8],
    // Diagonals
    [0, 4, 8],
    [2, 4, 6],
];

/// Returns the first line fully held by `mark`, if any.
///
/// Only `mark` is considered, so a move can never complete the
/// opponent's line. `Mark::Nothing` never wins.
#[instrument(skip(board))]
pub fn winning_line(board: &Board, mark: Mark) -> Option<[usize; 3]> {
    if mark == Mark::Nothing {
        return None;
    }

    LINES
        .iter()
        .copied()
        .find(|line| line.iter().all(|&cell| board.get(cell) == Some(mark)))
}
