//! Game logic and wire protocol for skirmish, a two-player duel on a 5x5 grid.
//!
//! Two clients join a room on a relay. Each holds its own [`GameState`],
//! applies local moves optimistically through the [`TurnController`], and
//! reconciles with the relay's broadcasts through the [`GameSession`]
//! reducer. Nothing here performs I/O.
//!
//! # Example
//!
//! ```
//! use skirmish_core::{Event, GameSession, ClientMessage, parse_label};
//!
//! let mut session = GameSession::new(true);
//! let a1 = parse_label("A1").unwrap();
//! let b1 = parse_label("B1").unwrap();
//! assert!(session.apply(Event::LocalClick(a1)).is_none());
//! let sent = session.apply(Event::LocalClick(b1));
//! assert!(matches!(sent, Some(ClientMessage::Move(_))));
//! ```

#![warn(missing_docs)]

mod board;
mod chat;
mod contracts;
mod controller;
mod history;
mod invariants;
mod notation;
mod protocol;
mod room;
mod rules;
mod session;
mod state;
mod types;

pub use board::{Board, Cell};
pub use chat::{ChatLine, ChatLog, compose as compose_chat};
pub use contracts::{
    AtSource, AuthoritativeMove, BoardConsistent, Contract, LegalStep, MoveRejection, OnTurn,
    RemoteMoveContract, TargetNotOwn, arbitrate,
};
pub use controller::{
    AppliedMove, ClickOutcome, OCCUPIED_OWN_TEXT, TurnController, illegal_move_text,
};
pub use history::{HistoryEntry, MoveHistory};
pub use invariants::{
    BoardInvariants, Invariant, InvariantSet, InvariantViolation, NotEmpty, UniqueOccupants,
};
pub use notation::{label, parse_label};
pub use protocol::{BoardSync, ClientMessage, MovePayload, ProtocolError, ServerMessage};
pub use room::{MAX_GENERATED_ROOM, MAX_ROOM_ID_LEN, RoomId, RoomIdError};
pub use rules::{is_legal, reachable};
pub use session::{ConnectionStatus, Event, GameSession};
pub use state::{GameState, Notice, NoticeKind};
pub use types::{BOARD_SIZE, Kind, Occupant, Player, Position, PositionError, TokenError};
