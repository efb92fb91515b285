//! Move history built from distributed `move` messages.

use crate::types::{Occupant, Player, Position};
use derive_getters::Getters;
use derive_new::new;

/// One distributed move, rendered as
/// `Player {mover} moved {character} from {from} to {to}`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Getters, new)]
pub struct HistoryEntry {
    /// The player who made the move.
    mover: Player,
    /// The moved character.
    character: Occupant,
    /// Source cell.
    from: Position,
    /// Destination cell.
    to: Position,
}

impl std::fmt::Display for HistoryEntry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "Player {} moved {} from {} to {}",
            self.mover, self.character, self.from, self.to
        )
    }
}

/// Append-only move log, oldest first.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MoveHistory {
    entries: Vec<HistoryEntry>,
}

impl MoveHistory {
    /// Appends an entry.
    pub fn push(&mut self, entry: HistoryEntry) {
        self.entries.push(entry);
    }

    /// All entries.
    pub fn entries(&self) -> &[HistoryEntry] {
        &self.entries
    }

    /// Entries rendered as text.
    pub fn lines(&self) -> Vec<String> {
        self.entries.iter().map(ToString::to_string).collect()
    }

    /// Number of recorded moves.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether no move has been recorded.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Kind;

    #[test]
    fn test_entry_text() {
        let entry = HistoryEntry::new(
            Player::B,
            Occupant::new(Player::B, Kind::Pawn2),
            Position::new(4, 1).unwrap(),
            Position::new(3, 1).unwrap(),
        );
        assert_eq!(entry.to_string(), "Player B moved BP2 from E2 to D2");
        assert_eq!(*entry.mover(), Player::B);
    }
}
