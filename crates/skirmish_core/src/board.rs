//! The 5x5 board and its occupants.

use crate::types::{BOARD_SIZE, Kind, Occupant, Player, Position};
use serde::{Deserialize, Serialize};
use tracing::instrument;

/// A single cell: empty or holding one occupant.
pub type Cell = Option<Occupant>;

/// 5x5 grid of cells, row-major.
///
/// On the wire this is `Cell[5][5]`, each cell a token string or `null`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Board {
    cells: [[Cell; BOARD_SIZE]; BOARD_SIZE],
}

/// Back-rank order, left to right, used by [`Board::standard`].
const BACK_RANK: [Kind; BOARD_SIZE] = [Kind::Pawn1, Kind::Pawn2, Kind::Hero1, Kind::Hero2, Kind::Pawn3];

impl Board {
    /// Creates a board with no occupants.
    pub fn empty() -> Self {
        Self {
            cells: [[None; BOARD_SIZE]; BOARD_SIZE],
        }
    }

    /// Creates the opening layout: player A on row A, player B on row E.
    #[instrument]
    pub fn standard() -> Self {
        let mut board = Self::empty();
        for (col, kind) in BACK_RANK.iter().enumerate() {
            board.cells[0][col] = Some(Occupant::new(Player::A, *kind));
            board.cells[BOARD_SIZE - 1][col] = Some(Occupant::new(Player::B, *kind));
        }
        board
    }

    /// Gets the cell at the given position.
    pub fn get(&self, pos: Position) -> Cell {
        self.cells[pos.row()][pos.col()]
    }

    /// Sets the cell at the given position, returning what was there.
    pub fn set(&mut self, pos: Position, cell: Cell) -> Cell {
        std::mem::replace(&mut self.cells[pos.row()][pos.col()], cell)
    }

    /// Checks if a cell is empty.
    pub fn is_empty(&self, pos: Position) -> bool {
        self.get(pos).is_none()
    }

    /// Finds the position of an occupant, scanning row-major.
    pub fn find(&self, occupant: Occupant) -> Option<Position> {
        Position::all().find(|pos| self.get(*pos) == Some(occupant))
    }

    /// Moves whatever stands on `from` to `to`, leaving `from` empty.
    ///
    /// Returns the occupant that stood on `to` (a capture), if any.
    pub fn relocate(&mut self, from: Position, to: Position) -> Cell {
        let moving = self.set(from, None);
        self.set(to, moving)
    }

    /// Iterates over occupied cells in row-major order.
    pub fn occupants(&self) -> impl Iterator<Item = (Position, Occupant)> + '_ {
        Position::all().filter_map(|pos| self.get(pos).map(|occupant| (pos, occupant)))
    }

    /// Counts the characters a player still has on the board.
    pub fn count_for(&self, player: Player) -> usize {
        self.occupants()
            .filter(|(_, occupant)| occupant.is_owned_by(player))
            .count()
    }

    /// Formats the board as a human-readable grid with labels.
    pub fn display(&self) -> String {
        let mut result = String::from("   ");
        for col in 1..=BOARD_SIZE {
            result.push_str(&format!(" {col:^3}"));
        }
        for row in 0..BOARD_SIZE {
            result.push('\n');
            result.push(char::from(b'A' + row as u8));
            result.push_str("  ");
            for col in 0..BOARD_SIZE {
                let symbol = match self.cells[row][col] {
                    Some(occupant) => occupant.to_string(),
                    None => ".".to_string(),
                };
                result.push_str(&format!(" {symbol:^3}"));
            }
        }
        result
    }
}

impl Default for Board {
    fn default() -> Self {
        Self::empty()
    }
}

impl std::fmt::Display for Board {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.display())
    }
}
