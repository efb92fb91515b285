//! Board invariants.
//!
//! Checked by the relay after every authoritative move and by clients when
//! verifying a remote move payload.

use crate::board::Board;
use crate::types::Occupant;
use std::collections::HashSet;
use tracing::warn;

/// A logical property that must hold for a given state.
pub trait Invariant<S> {
    /// Checks if the invariant holds for the given state.
    fn holds(state: &S) -> bool;

    /// Human-readable description of the invariant.
    fn description() -> &'static str;
}

/// Violation of an invariant.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InvariantViolation {
    /// Description of the violated invariant.
    pub description: String,
}

impl InvariantViolation {
    /// Creates a new invariant violation.
    pub fn new(description: impl Into<String>) -> Self {
        Self {
            description: description.into(),
        }
    }
}

/// A set of invariants checked together.
pub trait InvariantSet<S> {
    /// Checks every invariant, collecting all violations.
    fn check_all(state: &S) -> Result<(), Vec<InvariantViolation>>;
}

impl<S, I1, I2> InvariantSet<S> for (I1, I2)
where
    I1: Invariant<S>,
    I2: Invariant<S>,
{
    fn check_all(state: &S) -> Result<(), Vec<InvariantViolation>> {
        let mut violations = Vec::new();
        if !I1::holds(state) {
            violations.push(InvariantViolation::new(I1::description()));
        }
        if !I2::holds(state) {
            violations.push(InvariantViolation::new(I2::description()));
        }
        if violations.is_empty() {
            Ok(())
        } else {
            Err(violations)
        }
    }
}

/// No character identity appears in two cells.
pub struct UniqueOccupants;

impl Invariant<Board> for UniqueOccupants {
    fn holds(board: &Board) -> bool {
        let mut seen: HashSet<Occupant> = HashSet::new();
        for (position, occupant) in board.occupants() {
            if !seen.insert(occupant) {
                warn!(%occupant, %position, "Character appears twice on the board");
                return false;
            }
        }
        true
    }

    fn description() -> &'static str {
        "every character occupies at most one cell"
    }
}

/// The board holds at least one character.
///
/// There is no terminal state, so a board that lost every character can only
/// come from a corrupted payload.
pub struct NotEmpty;

impl Invariant<Board> for NotEmpty {
    fn holds(board: &Board) -> bool {
        board.occupants().next().is_some()
    }

    fn description() -> &'static str {
        "the board holds at least one character"
    }
}

/// All board invariants.
pub type BoardInvariants = (UniqueOccupants, NotEmpty);

/// Joins violation descriptions into one line.
pub fn describe(violations: &[InvariantViolation]) -> String {
    violations
        .iter()
        .map(|v| v.description.as_str())
        .collect::<Vec<_>>()
        .join("; ")
}
