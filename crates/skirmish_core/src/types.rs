//! Core domain types: players, character kinds, occupants and positions.

use derive_more::{Display, Error};
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// Width and height of the square board.
pub const BOARD_SIZE: usize = 5;

/// One of the two sides of a match.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, strum::EnumIter,
)]
pub enum Player {
    /// Player A (moves first, starts on row A).
    A,
    /// Player B (starts on row E).
    B,
}

impl Player {
    /// Returns the opponent player.
    pub fn opponent(self) -> Self {
        match self {
            Player::A => Player::B,
            Player::B => Player::A,
        }
    }

    /// The letter used as the first character of an occupant token.
    pub fn letter(self) -> char {
        match self {
            Player::A => 'A',
            Player::B => 'B',
        }
    }

    fn from_letter(letter: char) -> Option<Self> {
        match letter {
            'A' => Some(Player::A),
            'B' => Some(Player::B),
            _ => None,
        }
    }
}

/// Movement class of a character.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, strum::EnumIter,
)]
pub enum Kind {
    /// First pawn: one orthogonal step.
    Pawn1,
    /// Second pawn: one orthogonal step.
    Pawn2,
    /// Third pawn: one orthogonal step.
    Pawn3,
    /// Two orthogonal steps.
    Hero1,
    /// One diagonal step.
    Hero2,
}

impl Kind {
    /// Two-character code used on the wire (`P1`, `P2`, `P3`, `H1`, `H2`).
    pub fn code(self) -> &'static str {
        match self {
            Kind::Pawn1 => "P1",
            Kind::Pawn2 => "P2",
            Kind::Pawn3 => "P3",
            Kind::Hero1 => "H1",
            Kind::Hero2 => "H2",
        }
    }

    /// Parses a wire code back into a kind.
    pub fn from_code(code: &str) -> Option<Self> {
        match code {
            "P1" => Some(Kind::Pawn1),
            "P2" => Some(Kind::Pawn2),
            "P3" => Some(Kind::Pawn3),
            "H1" => Some(Kind::Hero1),
            "H2" => Some(Kind::Hero2),
            _ => None,
        }
    }

    /// Whether this kind moves like a pawn.
    pub fn is_pawn(self) -> bool {
        matches!(self, Kind::Pawn1 | Kind::Pawn2 | Kind::Pawn3)
    }
}

/// A character placed on the board.
///
/// Serialized as its 3-character token, e.g. `"AP1"` or `"BH2"`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Occupant {
    owner: Player,
    kind: Kind,
}

impl Occupant {
    /// Creates a new occupant.
    pub fn new(owner: Player, kind: Kind) -> Self {
        Self { owner, kind }
    }

    /// The player this character belongs to.
    pub fn owner(&self) -> Player {
        self.owner
    }

    /// The movement class of this character.
    pub fn kind(&self) -> Kind {
        self.kind
    }

    /// Whether this character belongs to `player`.
    pub fn is_owned_by(&self, player: Player) -> bool {
        self.owner == player
    }
}

impl std::fmt::Display for Occupant {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}{}", self.owner.letter(), self.kind.code())
    }
}

/// Error parsing an occupant token.
#[derive(Debug, Clone, PartialEq, Eq, Display, Error)]
#[display("invalid character token {token:?}")]
pub struct TokenError {
    /// The rejected token.
    pub token: String,
}

impl FromStr for Occupant {
    type Err = TokenError;

    fn from_str(token: &str) -> Result<Self, Self::Err> {
        let mut chars = token.chars();
        let owner = chars.next().and_then(Player::from_letter);
        let kind = Kind::from_code(chars.as_str());
        match (owner, kind) {
            (Some(owner), Some(kind)) => Ok(Self::new(owner, kind)),
            _ => Err(TokenError {
                token: token.to_string(),
            }),
        }
    }
}

impl TryFrom<String> for Occupant {
    type Error = TokenError;

    fn try_from(token: String) -> Result<Self, Self::Error> {
        token.parse()
    }
}

impl From<Occupant> for String {
    fn from(occupant: Occupant) -> Self {
        occupant.to_string()
    }
}

/// A cell coordinate, always inside the board.
///
/// Displays as its label (`A1` .. `E5`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Position {
    row: u8,
    col: u8,
}

/// Error constructing a position outside the board.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, Error)]
#[display("position ({row}, {col}) is outside the 5x5 board")]
pub struct PositionError {
    /// Requested row.
    pub row: usize,
    /// Requested column.
    pub col: usize,
}

impl Position {
    /// Creates a position, rejecting coordinates outside the board.
    pub fn new(row: usize, col: usize) -> Result<Self, PositionError> {
        if row >= BOARD_SIZE || col >= BOARD_SIZE {
            return Err(PositionError { row, col });
        }
        Ok(Self {
            row: row as u8,
            col: col as u8,
        })
    }

    /// Row index (0 = row A).
    pub fn row(&self) -> usize {
        self.row as usize
    }

    /// Column index (0 = column 1).
    pub fn col(&self) -> usize {
        self.col as usize
    }

    /// All 25 positions in row-major order.
    pub fn all() -> impl Iterator<Item = Position> {
        (0..BOARD_SIZE).flat_map(|row| {
            (0..BOARD_SIZE).map(move |col| Position {
                row: row as u8,
                col: col as u8,
            })
        })
    }
}

impl std::fmt::Display for Position {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&crate::notation::label(*self))
    }
}
