//! Movement rules per character kind.
//!
//! The check is purely geometric. It does not look at occupancy, path
//! obstruction or board edges; those are separate checks (see
//! [`crate::controller`] and [`crate::contracts`]).

use crate::types::{Kind, Position};
use tracing::instrument;

/// Decides whether `kind` may step from `from` to `to`.
///
/// | Kind  | (|Δrow|, |Δcol|)    |
/// |-------|---------------------|
/// | Pawn  | (1, 0) or (0, 1)    |
/// | Hero1 | (2, 0) or (0, 2)    |
/// | Hero2 | (1, 1)              |
#[instrument(level = "trace")]
pub fn is_legal(kind: Kind, from: Position, to: Position) -> bool {
    let delta = (from.row().abs_diff(to.row()), from.col().abs_diff(to.col()));
    match kind {
        Kind::Pawn1 | Kind::Pawn2 | Kind::Pawn3 => matches!(delta, (1, 0) | (0, 1)),
        Kind::Hero1 => matches!(delta, (2, 0) | (0, 2)),
        Kind::Hero2 => delta == (1, 1),
    }
}

/// All destinations `kind` could legally step to from `from`, ignoring occupancy.
pub fn reachable(kind: Kind, from: Position) -> Vec<Position> {
    Position::all().filter(|to| is_legal(kind, from, *to)).collect()
}
