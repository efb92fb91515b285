//! Exhaustive checks of the movement rules and board notation.

use skirmish_core::{BOARD_SIZE, Kind, Position, is_legal, label, parse_label};
use strum::IntoEnumIterator;

#[test]
fn test_legality_matches_delta_table() {
    for kind in Kind::iter() {
        for from in Position::all() {
            for to in Position::all() {
                let dr = from.row().abs_diff(to.row());
                let dc = from.col().abs_diff(to.col());
                let expected = match kind {
                    Kind::Pawn1 | Kind::Pawn2 | Kind::Pawn3 => dr + dc == 1,
                    Kind::Hero1 => (dr, dc) == (2, 0) || (dr, dc) == (0, 2),
                    Kind::Hero2 => dr == 1 && dc == 1,
                };
                assert_eq!(is_legal(kind, from, to), expected, "{kind} {from} -> {to}");
            }
        }
    }
}

#[test]
fn test_legality_is_symmetric() {
    for kind in Kind::iter() {
        for from in Position::all() {
            for to in Position::all() {
                assert_eq!(is_legal(kind, from, to), is_legal(kind, to, from));
            }
        }
    }
}

#[test]
fn test_no_kind_may_stay_in_place() {
    for kind in Kind::iter() {
        for pos in Position::all() {
            assert!(!is_legal(kind, pos, pos));
        }
    }
}

#[test]
fn test_label_round_trip_on_every_cell() {
    let mut seen = std::collections::HashSet::new();
    for pos in Position::all() {
        let text = label(pos);
        assert_eq!(text.len(), 2);
        assert_eq!(parse_label(&text), Some(pos));
        assert_eq!(parse_label(&text.to_lowercase()), Some(pos));
        assert!(seen.insert(text));
    }
    assert_eq!(seen.len(), BOARD_SIZE * BOARD_SIZE);
}
