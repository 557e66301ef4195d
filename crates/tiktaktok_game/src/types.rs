//! Core domain types for tic-tac-toe.

use derive_more::Display;
use serde::{Deserialize, Serialize};
use tracing::instrument;

/// Number of cells on the board.
pub const CELL_COUNT: usize = 9;

/// A player's symbol, or the absence of one on an empty cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Mark {
    /// Empty cell, or a player that has not been assigned a mark yet.
    #[default]
    Nothing,
    /// Player X (always moves first).
    X,
    /// Player O.
    O,
}

impl Mark {
    /// Returns the opposing mark. `Nothing` has no opponent.
    pub fn opponent(self) -> Self {
        match self {
            Mark::X => Mark::O,
            Mark::O => Mark::X,
            Mark::Nothing => Mark::Nothing,
        }
    }
}

/// Errors raised when writing to the board.
#[derive(Debug, Clone, PartialEq, Eq, Display)]
pub enum BoardError {
    /// Cell index outside 0..=8.
    #[display("Cell {cell} is outside the grid")]
    OutOfRange {
        /// Offending index.
        cell: usize,
    },
    /// Cell already holds a mark.
    #[display("Cell {cell} is already taken")]
    Occupied {
        /// Offending index.
        cell: usize,
    },
    /// Attempt to write `Mark::Nothing`.
    #[display("Cannot place an empty mark")]
    EmptyMark,
}

impl std::error::Error for BoardError {}

/// 3x3 tic-tac-toe board.
///
/// Cells are stored in row-major order (0-8). A cell goes from
/// [`Mark::Nothing`] to `X` or `O` at most once and never reverts.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
pub struct Board {
    cells: [Mark; CELL_COUNT],
}

impl Board {
    /// Creates a new empty board.
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a board from explicit cell contents.
    pub fn from_cells(cells: [Mark; CELL_COUNT]) -> Self {
        Self { cells }
    }

    /// Gets the mark at the given cell (0-8).
    pub fn get(&self, cell: usize) -> Option<Mark> {
        self.cells.get(cell).copied()
    }

    /// Checks if a cell is empty. Out-of-range cells are never empty.
    pub fn is_empty(&self, cell: usize) -> bool {
        matches!(self.get(cell), Some(Mark::Nothing))
    }

    /// Places a mark into an empty cell.
    #[instrument(skip(self))]
    pub fn place(&mut self, cell: usize, mark: Mark) -> Result<(), BoardError> {
        if mark == Mark::Nothing {
            return Err(BoardError::EmptyMark);
        }
        match self.cells.get_mut(cell) {
            None => Err(BoardError::OutOfRange { cell }),
            Some(slot) if *slot != Mark::Nothing => Err(BoardError::Occupied { cell }),
            Some(slot) => {
                *slot = mark;
                Ok(())
            }
        }
    }

    /// Returns all cells.
    pub fn cells(&self) -> &[Mark; CELL_COUNT] {
        &self.cells
    }

    /// Formats the board as a human-readable string.
    pub fn display(&self) -> String {
        let mut result = String::new();
        for row in 0..3 {
            for col in 0..3 {
                let cell = row * 3 + col;
                let symbol = match self.cells[cell] {
                    Mark::Nothing => (cell + 1).to_string(),
                    Mark::X => "X".to_string(),
                    Mark::O => "O".to_string(),
                };
                result.push_str(&symbol);
                if col < 2 {
                    result.push('|');
                }
            }
            if row < 2 {
                result.push_str("\n-+-+-\n");
            }
        }
        result
    }
}

/// Lifecycle of a game.
///
/// Transitions only move forward:
/// `WaitingForSecondPlayer -> Started -> {Finished, Aborted}`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum GameStatus {
    /// One seat is still free.
    #[default]
    WaitingForSecondPlayer,
    /// Both seats taken, moves accepted.
    Started,
    /// Someone won or the board filled up.
    // The browser client matches on this spelling.
    #[serde(rename = "finnished")]
    Finished,
    /// A player left mid-game.
    Aborted,
}

impl GameStatus {
    /// Finished and aborted games accept nothing further.
    pub fn is_terminal(self) -> bool {
        matches!(self, GameStatus::Finished | GameStatus::Aborted)
    }

    /// Whether moving from `self` to `next` respects the lifecycle order.
    pub fn can_transition_to(self, next: GameStatus) -> bool {
        use GameStatus::*;
        matches!(
            (self, next),
            (WaitingForSecondPlayer, WaitingForSecondPlayer)
                | (WaitingForSecondPlayer, Started)
                | (Started, Finished)
                | (Started, Aborted)
        )
    }
}
