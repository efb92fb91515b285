//! Row-letter / column-number labels for board positions.
//!
//! `(0, 0)` is `A1`, `(4, 4)` is `E5`. Move history text is built from these
//! labels, so both peers must produce them identically.

use crate::types::{BOARD_SIZE, Position};

/// Returns the label for a position: row letter followed by 1-based column.
pub fn label(position: Position) -> String {
    let row = char::from(b'A' + position.row() as u8);
    format!("{}{}", row, position.col() + 1)
}

/// Parses a label such as `c4` or `C4` back into a position.
///
/// Returns `None` for anything that is not a label of an on-board cell.
pub fn parse_label(text: &str) -> Option<Position> {
    let text = text.trim();
    let mut chars = text.chars();
    let row_letter = chars.next()?.to_ascii_uppercase();
    if !row_letter.is_ascii_uppercase() {
        return None;
    }
    let digits = chars.as_str();
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    let col: usize = digits.parse().ok()?;
    let row = (row_letter as u8 - b'A') as usize;
    if col == 0 || col > BOARD_SIZE {
        return None;
    }
    Position::new(row, col - 1).ok()
}
