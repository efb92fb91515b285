//! Tests for selection, move attempts and turn alternation.

use skirmish_core::{
    Board, ClickOutcome, GameState, Kind, NoticeKind, OCCUPIED_OWN_TEXT, Occupant, Player,
    Position, TurnController, illegal_move_text, parse_label,
};

fn at(label: &str) -> Position {
    parse_label(label).unwrap()
}

fn opening() -> (GameState, TurnController) {
    (
        GameState::with_board(Board::standard(), Player::A),
        TurnController::new(),
    )
}

#[test]
fn test_pawn_step_applies_and_passes_turn() {
    let (mut state, mut controller) = opening();
    let pawn = Occupant::new(Player::A, Kind::Pawn1);

    assert_eq!(controller.click(&mut state, at("A1")), ClickOutcome::Selected(pawn));
    let ClickOutcome::Moved(applied) = controller.click(&mut state, at("B1")) else {
        panic!("expected a move");
    };

    assert_eq!(applied.mover, Player::A);
    assert_eq!(applied.captured, None);
    assert_eq!(state.board().get(at("B1")), Some(pawn));
    assert!(state.board().is_empty(at("A1")));
    assert_eq!(state.current_player(), Player::B);
    assert_eq!(state.notice(), None);
    assert_eq!(controller.selection(), None);

    let payload = applied.payload(*state.board());
    assert_eq!(payload.current_player, Player::A);
    assert_eq!(payload.board_state, *state.board());
}

#[test]
fn test_illegal_step_sets_notice_and_keeps_turn() {
    let (mut state, mut controller) = opening();
    let before = *state.board();
    let pawn = Occupant::new(Player::A, Kind::Pawn1);

    controller.click(&mut state, at("A1"));
    let outcome = controller.click(&mut state, at("C1"));

    let ClickOutcome::Rejected(notice) = outcome else {
        panic!("expected rejection");
    };
    assert_eq!(notice.kind(), NoticeKind::IllegalMove);
    assert_eq!(notice.text(), illegal_move_text(pawn));
    assert_eq!(notice.text(), "Nahh.. you made a wrong move for AP1");
    assert_eq!(state.notice(), Some(&notice));
    assert_eq!(*state.board(), before);
    assert_eq!(state.current_player(), Player::A);
    assert_eq!(controller.selection(), None);
}

#[test]
fn test_own_occupied_destination_is_refused() {
    let (mut state, mut controller) = opening();
    let before = *state.board();

    controller.click(&mut state, at("A1"));
    let ClickOutcome::Rejected(notice) = controller.click(&mut state, at("A2")) else {
        panic!("expected rejection");
    };

    assert_eq!(notice.kind(), NoticeKind::OccupiedConflict);
    assert_eq!(notice.text(), OCCUPIED_OWN_TEXT);
    assert_eq!(*state.board(), before);
    assert_eq!(state.current_player(), Player::A);
    assert_eq!(controller.selection(), None);
}

#[test]
fn test_selecting_clears_notice() {
    let (mut state, mut controller) = opening();
    controller.click(&mut state, at("A1"));
    controller.click(&mut state, at("A2"));
    assert!(state.notice().is_some());

    controller.click(&mut state, at("A3"));
    assert_eq!(state.notice(), None);
}

#[test]
fn test_hero2_captures_diagonally() {
    let mut board = Board::empty();
    let hero = Occupant::new(Player::A, Kind::Hero2);
    let victim = Occupant::new(Player::B, Kind::Pawn3);
    board.set(at("B2"), Some(hero));
    board.set(at("C3"), Some(victim));
    let mut state = GameState::with_board(board, Player::A);
    let mut controller = TurnController::new();

    controller.click(&mut state, at("B2"));
    let ClickOutcome::Moved(applied) = controller.click(&mut state, at("C3")) else {
        panic!("expected a capture");
    };

    assert_eq!(applied.captured, Some(victim));
    assert_eq!(state.board().get(at("C3")), Some(hero));
    assert_eq!(state.board().find(victim), None);
    assert_eq!(state.board().count_for(Player::B), 0);
}

#[test]
fn test_turns_alternate_across_moves() {
    let (mut state, mut controller) = opening();

    controller.click(&mut state, at("A1"));
    controller.click(&mut state, at("B1"));
    assert_eq!(state.current_player(), Player::B);

    // A's characters are no longer selectable.
    assert_eq!(controller.click(&mut state, at("B1")), ClickOutcome::Ignored);

    controller.click(&mut state, at("E3"));
    controller.click(&mut state, at("C3"));
    assert_eq!(state.current_player(), Player::A);
    assert_eq!(
        state.board().get(at("C3")),
        Some(Occupant::new(Player::B, Kind::Hero1))
    );
}

#[test]
fn test_clicking_selected_cell_again_is_illegal() {
    let (mut state, mut controller) = opening();
    controller.click(&mut state, at("A4"));
    let outcome = controller.click(&mut state, at("A4"));
    assert!(matches!(outcome, ClickOutcome::Rejected(n) if n.kind() == NoticeKind::IllegalMove));
}
