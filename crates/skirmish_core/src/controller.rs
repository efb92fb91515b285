//! Turn and ownership controller: selection and local move attempts.

use crate::board::Board;
use crate::protocol::MovePayload;
use crate::rules;
use crate::state::{GameState, Notice, NoticeKind};
use crate::types::{Occupant, Player, Position};
use tracing::{debug, info, instrument};

/// Notice shown when moving onto one of your own characters.
pub const OCCUPIED_OWN_TEXT: &str = "You are not eligible to move to the occupied cell of your own";

/// Notice shown when a step breaks the character's movement rule.
pub fn illegal_move_text(character: Occupant) -> String {
    format!("Nahh.. you made a wrong move for {character}")
}

/// A move accepted and applied locally.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AppliedMove {
    /// The moved character.
    pub occupant: Occupant,
    /// Source cell.
    pub from: Position,
    /// Destination cell.
    pub to: Position,
    /// Player who moved (current player before the toggle).
    pub mover: Player,
    /// Opponent character removed from the destination, if any.
    pub captured: Option<Occupant>,
}

impl AppliedMove {
    /// The `move` payload for this move, carrying the resulting board.
    pub fn payload(&self, board: Board) -> MovePayload {
        MovePayload::new(self.occupant, self.from, self.to, board, self.mover)
    }
}

/// Result of a cell click.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ClickOutcome {
    /// Nothing happened.
    Ignored,
    /// A character of the current player was selected.
    Selected(Occupant),
    /// A move attempt was refused; the notice has been set on the state.
    Rejected(Notice),
    /// A move was applied and the turn passed.
    Moved(AppliedMove),
}

/// Holds the selection between clicks.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TurnController {
    selection: Option<Occupant>,
}

impl TurnController {
    /// Creates a controller with nothing selected.
    pub fn new() -> Self {
        Self::default()
    }

    /// The selected character, if any.
    pub fn selection(&self) -> Option<Occupant> {
        self.selection
    }

    /// Handles a click on `at`.
    ///
    /// Without a selection this selects a character of the current player.
    /// With a selection it is a move attempt, and the selection is cleared
    /// whatever the outcome.
    #[instrument(skip(self, state), fields(player = %state.current_player()))]
    pub fn click(&mut self, state: &mut GameState, at: Position) -> ClickOutcome {
        match self.selection.take() {
            None => self.select(state, at),
            Some(selected) => Self::attempt(state, selected, at),
        }
    }

    /// Drops a selection the state no longer supports.
    ///
    /// Called after remote updates: the selected character may have been
    /// captured, or the turn may have changed hands.
    pub fn reconcile(&mut self, state: &GameState) {
        if let Some(selected) = self.selection {
            let stale = !selected.is_owned_by(state.current_player())
                || state.board().find(selected).is_none();
            if stale {
                debug!(%selected, "Dropping stale selection");
                self.selection = None;
            }
        }
    }

    fn select(&mut self, state: &mut GameState, at: Position) -> ClickOutcome {
        match state.board().get(at) {
            Some(occupant) if occupant.is_owned_by(state.current_player()) => {
                debug!(%occupant, %at, "Selected character");
                self.selection = Some(occupant);
                state.clear_notice();
                ClickOutcome::Selected(occupant)
            }
            _ => ClickOutcome::Ignored,
        }
    }

    fn attempt(state: &mut GameState, selected: Occupant, to: Position) -> ClickOutcome {
        let Some(from) = state.board().find(selected) else {
            debug!(%selected, "Selected character is no longer on the board");
            return ClickOutcome::Ignored;
        };

        if !rules::is_legal(selected.kind(), from, to) {
            let notice = Notice::new(illegal_move_text(selected), NoticeKind::IllegalMove);
            debug!(%selected, %from, %to, "Illegal step");
            state.set_notice(notice.clone());
            return ClickOutcome::Rejected(notice);
        }

        let mover = state.current_player();
        if state.board().get(to).is_some_and(|o| o.is_owned_by(mover)) {
            let notice = Notice::new(OCCUPIED_OWN_TEXT, NoticeKind::OccupiedConflict);
            debug!(%selected, %to, "Destination holds own character");
            state.set_notice(notice.clone());
            return ClickOutcome::Rejected(notice);
        }

        let captured = state.board_mut().relocate(from, to);
        state.pass_turn();
        state.clear_notice();
        info!(%selected, %from, %to, captured = ?captured, "Applied local move");
        ClickOutcome::Moved(AppliedMove {
            occupant: selected,
            from,
            to,
            mover,
            captured,
        })
    }
}
