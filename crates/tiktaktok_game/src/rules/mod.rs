//! Game rules for tic-tac-toe.
//!
//! Pure functions evaluating a board after a move. The game engine calls
//! [`check_grid`] with the mark that just moved and acts on the verdict.

pub mod draw;
pub mod win;

pub use draw::is_full;
pub use win::{LINES, winning_line};

use crate::{Board, Mark};
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};

/// Verdict of the rules checker.
///
/// Either a winner with its line, a draw, or neither while play continues.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GameResult {
    is_draw: bool,
    winner: Option<Mark>,
    winning_cells: Option<[usize; 3]>,
}

impl GameResult {
    /// `mark` holds the three `cells`.
    pub fn win(cells: [usize; 3], mark: Mark) -> Self {
        Self {
            is_draw: false,
            winner: Some(mark),
            winning_cells: Some(cells),
        }
    }

    /// Board full, nobody won.
    pub fn draw() -> Self {
        Self {
            is_draw: true,
            winner: None,
            winning_cells: None,
        }
    }

    /// Game goes on.
    pub fn undecided() -> Self {
        Self {
            is_draw: false,
            winner: None,
            winning_cells: None,
        }
    }

    /// Whether the board filled up without a winner.
    pub fn is_draw(&self) -> bool {
        self.is_draw
    }

    /// The winning mark, if any.
    pub fn winner(&self) -> Option<Mark> {
        self.winner
    }

    /// The winning line in ascending order, if any.
    pub fn winning_cells(&self) -> Option<[usize; 3]> {
        self.winning_cells
    }

    /// Whether the game ends with this result.
    pub fn is_terminal(&self) -> bool {
        self.is_draw || self.winning_cells.is_some()
    }
}

/// Evaluates `board` after `mark` has moved.
#[instrument(skip(board))]
pub fn check_grid(board: &Board, mark: Mark) -> GameResult {
    let result = match winning_line(board, mark) {
        Some(cells) => GameResult::win(cells, mark),
        None if is_full(board) => GameResult::draw(),
        None => GameResult::undecided(),
    };
    debug!(?result, "Checked grid");
    result
}
