//! Contract-based validation of moves.
//!
//! Two checks exist. [`AuthoritativeMove`] validates a client's move against
//! the relay's own board and turn. [`RemoteMoveContract`] validates a
//! distributed move payload on its own terms, for clients that do not trust
//! the sender.

use crate::board::Board;
use crate::invariants::{BoardInvariants, InvariantSet, describe};
use crate::protocol::{BoardSync, MovePayload};
use crate::rules;
use crate::types::{Occupant, Player, Position, PositionError};
use derive_more::{Display, Error};
use tracing::{instrument, warn};

/// Why a move was refused.
#[derive(Debug, Clone, PartialEq, Eq, Display, Error)]
pub enum MoveRejection {
    /// A coordinate lies outside the board.
    #[display("{_0}")]
    OffBoard(PositionError),
    /// The character does not stand on the claimed source cell.
    #[display("{character} is not at {from}")]
    NotAtSource {
        /// Claimed character.
        character: Occupant,
        /// Claimed source cell.
        from: Position,
    },
    /// The character belongs to the player who is not on turn.
    #[display("it is player {current}'s turn, {character} cannot move")]
    NotYourTurn {
        /// The player on turn.
        current: Player,
        /// Claimed character.
        character: Occupant,
    },
    /// The step does not match the character's movement rule.
    #[display("{character} cannot move from {from} to {to}")]
    IllegalStep {
        /// Moved character.
        character: Occupant,
        /// Source cell.
        from: Position,
        /// Destination cell.
        to: Position,
    },
    /// The destination holds one of the mover's own characters.
    #[display("{to} holds {occupant}, a character of the same player")]
    OwnPieceAtTarget {
        /// Destination cell.
        to: Position,
        /// The character standing there.
        occupant: Occupant,
    },
    /// The payload board does not show the character on the destination.
    #[display("board does not show {character} at {to}")]
    BoardMismatch {
        /// Moved character.
        character: Occupant,
        /// Destination cell.
        to: Position,
    },
    /// The payload board still holds something on the source cell.
    #[display("board still holds a character at {from}")]
    SourceNotVacated {
        /// Source cell.
        from: Position,
    },
    /// A board invariant failed.
    #[display("board is inconsistent: {_0}")]
    Inconsistent(#[error(not(source))] String),
}

impl From<PositionError> for MoveRejection {
    fn from(err: PositionError) -> Self {
        Self::OffBoard(err)
    }
}

/// Preconditions and postconditions for a state transition.
pub trait Contract<S, A> {
    /// Checks preconditions before applying the action.
    fn pre(state: &S, action: &A) -> Result<(), MoveRejection>;

    /// Checks postconditions after applying the action.
    fn post(before: &S, after: &S) -> Result<(), MoveRejection>;
}

/// Precondition: the character stands on the claimed source cell.
pub struct AtSource;

impl AtSource {
    /// Checks the board at `from`.
    #[instrument(skip(board))]
    pub fn check(board: &Board, character: Occupant, from: Position) -> Result<(), MoveRejection> {
        if board.get(from) == Some(character) {
            Ok(())
        } else {
            Err(MoveRejection::NotAtSource { character, from })
        }
    }
}

/// Precondition: the character belongs to the player on turn.
pub struct OnTurn;

impl OnTurn {
    /// Checks ownership against `current`.
    #[instrument]
    pub fn check(current: Player, character: Occupant) -> Result<(), MoveRejection> {
        if character.is_owned_by(current) {
            Ok(())
        } else {
            Err(MoveRejection::NotYourTurn { current, character })
        }
    }
}

/// Precondition: the step is geometrically legal for the character's kind.
pub struct LegalStep;

impl LegalStep {
    /// Checks the movement rule.
    #[instrument]
    pub fn check(character: Occupant, from: Position, to: Position) -> Result<(), MoveRejection> {
        if rules::is_legal(character.kind(), from, to) {
            Ok(())
        } else {
            Err(MoveRejection::IllegalStep {
                character,
                from,
                to,
            })
        }
    }
}

/// Precondition: the destination does not hold one of the mover's characters.
pub struct TargetNotOwn;

impl TargetNotOwn {
    /// Checks the board at `to`.
    #[instrument(skip(board))]
    pub fn check(board: &Board, mover: Player, to: Position) -> Result<(), MoveRejection> {
        match board.get(to) {
            Some(occupant) if occupant.is_owned_by(mover) => {
                Err(MoveRejection::OwnPieceAtTarget { to, occupant })
            }
            _ => Ok(()),
        }
    }
}

/// Checks every board invariant.
pub struct BoardConsistent;

impl BoardConsistent {
    /// Runs [`BoardInvariants`] over `board`.
    pub fn check(board: &Board) -> Result<(), MoveRejection> {
        BoardInvariants::check_all(board)
            .map_err(|violations| MoveRejection::Inconsistent(describe(&violations)))
    }
}

/// A client move validated against the relay's authoritative state.
///
/// Preconditions:
/// - the character stands on `(fromX, fromY)`
/// - it belongs to the player on turn
/// - the step is legal for its kind
/// - the destination does not hold one of the mover's characters
///
/// Postconditions:
/// - board invariants hold
/// - the turn passed to the opponent
pub struct AuthoritativeMove;

impl Contract<BoardSync, MovePayload> for AuthoritativeMove {
    fn pre(state: &BoardSync, payload: &MovePayload) -> Result<(), MoveRejection> {
        let (from, to) = (payload.from()?, payload.to()?);
        AtSource::check(&state.board_state, payload.character, from)?;
        OnTurn::check(state.current_player, payload.character)?;
        LegalStep::check(payload.character, from, to)?;
        TargetNotOwn::check(&state.board_state, state.current_player, to)?;
        Ok(())
    }

    fn post(before: &BoardSync, after: &BoardSync) -> Result<(), MoveRejection> {
        BoardConsistent::check(&after.board_state)?;
        if after.current_player != before.current_player.opponent() {
            return Err(MoveRejection::Inconsistent(
                "turn did not pass to the opponent".to_string(),
            ));
        }
        Ok(())
    }
}

/// Applies a client move to the authoritative state.
///
/// On success the state holds the new board and the opponent is on turn; the
/// returned payload carries that board and the post-toggle current player,
/// ready to broadcast. On failure the state is unchanged.
#[instrument(skip(state, payload), fields(character = %payload.character))]
pub fn arbitrate(state: &mut BoardSync, payload: &MovePayload) -> Result<MovePayload, MoveRejection> {
    AuthoritativeMove::pre(state, payload)?;
    let (from, to) = (payload.from()?, payload.to()?);

    let mut next = state.clone();
    next.board_state.relocate(from, to);
    next.current_player = state.current_player.opponent();
    AuthoritativeMove::post(state, &next)?;

    *state = next;
    Ok(MovePayload::new(
        payload.character,
        from,
        to,
        state.board_state,
        state.current_player,
    ))
}

/// Self-consistency of a distributed move payload.
///
/// The payload's `currentPlayer` names the player to move next, so the
/// character must belong to its opponent. The step must be legal, and the
/// payload board must show the character on the destination with the source
/// vacated.
pub struct RemoteMoveContract;

impl RemoteMoveContract {
    /// Validates `payload` without reference to local state.
    #[instrument(skip(payload), fields(character = %payload.character))]
    pub fn check(payload: &MovePayload) -> Result<(), MoveRejection> {
        let result = Self::check_inner(payload);
        if let Err(reason) = &result {
            warn!(%reason, "Remote move payload failed verification");
        }
        result
    }

    fn check_inner(payload: &MovePayload) -> Result<(), MoveRejection> {
        let (from, to) = (payload.from()?, payload.to()?);
        let character = payload.character;
        OnTurn::check(payload.current_player.opponent(), character)?;
        LegalStep::check(character, from, to)?;
        if payload.board_state.get(to) != Some(character) {
            return Err(MoveRejection::BoardMismatch { character, to });
        }
        if !payload.board_state.is_empty(from) {
            return Err(MoveRejection::SourceNotVacated { from });
        }
        BoardConsistent::check(&payload.board_state)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Kind;

    fn pos(row: usize, col: usize) -> Position {
        Position::new(row, col).unwrap()
    }

    fn opening() -> BoardSync {
        BoardSync {
            board_state: Board::standard(),
            current_player: Player::A,
        }
    }

    fn attempt(character: Occupant, from: Position, to: Position) -> MovePayload {
        MovePayload::new(character, from, to, Board::empty(), Player::A)
    }

    #[test]
    fn test_arbitrate_applies_and_toggles() {
        let mut state = opening();
        let pawn = Occupant::new(Player::A, Kind::Pawn1);
        let out = arbitrate(&mut state, &attempt(pawn, pos(0, 0), pos(1, 0))).unwrap();

        assert_eq!(state.current_player, Player::B);
        assert_eq!(state.board_state.get(pos(1, 0)), Some(pawn));
        assert!(state.board_state.is_empty(pos(0, 0)));
        assert_eq!(out.current_player, Player::B);
        assert_eq!(out.board_state, state.board_state);
        assert!(RemoteMoveContract::check(&out).is_ok());
    }

    #[test]
    fn test_arbitrate_refuses_out_of_turn() {
        let mut state = opening();
        let pawn = Occupant::new(Player::B, Kind::Pawn1);
        let err = arbitrate(&mut state, &attempt(pawn, pos(4, 0), pos(3, 0))).unwrap_err();
        assert!(matches!(err, MoveRejection::NotYourTurn { current: Player::A, .. }));
        assert_eq!(state, opening());
    }

    #[test]
    fn test_arbitrate_refuses_own_target() {
        let mut state = opening();
        let hero = Occupant::new(Player::A, Kind::Hero1);
        let err = arbitrate(&mut state, &attempt(hero, pos(0, 2), pos(0, 0))).unwrap_err();
        assert!(matches!(err, MoveRejection::OwnPieceAtTarget { .. }));
    }

    #[test]
    fn test_arbitrate_refuses_wrong_source_and_off_board() {
        let mut state = opening();
        let pawn = Occupant::new(Player::A, Kind::Pawn2);
        let err = arbitrate(&mut state, &attempt(pawn, pos(0, 0), pos(1, 0))).unwrap_err();
        assert!(matches!(err, MoveRejection::NotAtSource { .. }));

        let mut payload = attempt(pawn, pos(0, 1), pos(1, 1));
        payload.to_x = 9;
        assert!(matches!(
            arbitrate(&mut state, &payload),
            Err(MoveRejection::OffBoard(_))
        ));
    }

    #[test]
    fn test_remote_contract_rejects_stale_board() {
        let pawn = Occupant::new(Player::A, Kind::Pawn1);
        let payload = MovePayload::new(pawn, pos(0, 0), pos(1, 0), Board::standard(), Player::B);
        assert_eq!(
            RemoteMoveContract::check(&payload),
            Err(MoveRejection::BoardMismatch {
                character: pawn,
                to: pos(1, 0)
            })
        );
    }
}
