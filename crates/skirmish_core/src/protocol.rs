//! Wire protocol between clients and the room relay.
//!
//! Messages are JSON objects discriminated by a `type` field. The one
//! exception is the relay's failure report, which is `{"error": "..."}` with
//! no `type`. Decoding dispatches on `type` first and only falls back to the
//! `error` field when no known `type` is present.

use crate::board::Board;
use crate::chat::ChatLine;
use crate::history::HistoryEntry;
use crate::types::{Occupant, Player, Position, PositionError};
use derive_more::{Display, Error};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::instrument;

/// Payload of a `move` message.
///
/// `X` coordinates are rows and `Y` coordinates columns. When sent by a client,
/// `current_player` is the mover; when broadcast by the relay it is the player
/// to move next.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MovePayload {
    /// Token of the moved character.
    pub character: Occupant,
    /// Source row.
    pub from_x: u8,
    /// Source column.
    pub from_y: u8,
    /// Destination row.
    pub to_x: u8,
    /// Destination column.
    pub to_y: u8,
    /// Full board after the move.
    pub board_state: Board,
    /// See the type-level docs.
    pub current_player: Player,
}

impl MovePayload {
    /// Builds a payload for a move from `from` to `to`.
    pub fn new(
        character: Occupant,
        from: Position,
        to: Position,
        board_state: Board,
        current_player: Player,
    ) -> Self {
        Self {
            character,
            from_x: from.row() as u8,
            from_y: from.col() as u8,
            to_x: to.row() as u8,
            to_y: to.col() as u8,
            board_state,
            current_player,
        }
    }

    /// Source position, if on the board.
    pub fn from(&self) -> Result<Position, PositionError> {
        Position::new(self.from_x as usize, self.from_y as usize)
    }

    /// Destination position, if on the board.
    pub fn to(&self) -> Result<Position, PositionError> {
        Position::new(self.to_x as usize, self.to_y as usize)
    }

    /// History entry for a relay-distributed payload.
    ///
    /// The payload's `current_player` is the player to move *after* the move,
    /// so the mover is its opponent.
    pub fn history_entry(&self) -> Result<HistoryEntry, PositionError> {
        Ok(HistoryEntry::new(
            self.current_player.opponent(),
            self.character,
            self.from()?,
            self.to()?,
        ))
    }
}

/// Payload of a `boardState` resync.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BoardSync {
    /// Full board.
    pub board_state: Board,
    /// Player to move.
    pub current_player: Player,
}

/// Message sent by a client to the relay.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum ClientMessage {
    /// A locally accepted move.
    Move(MovePayload),
    /// A chat line; the relay attaches the sender id.
    Chat {
        /// Message text.
        message: String,
    },
}

impl ClientMessage {
    /// Serializes to a JSON text frame.
    pub fn encode(&self) -> Result<String, ProtocolError> {
        Ok(serde_json::to_string(self)?)
    }

    /// Parses a JSON text frame.
    #[instrument(level = "debug", skip(text), fields(len = text.len()))]
    pub fn decode(text: &str) -> Result<Self, ProtocolError> {
        Ok(serde_json::from_str(text)?)
    }
}

/// Message sent by the relay to a client.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ServerMessage {
    /// Full resync of board and turn.
    BoardState(BoardSync),
    /// A distributed move.
    Move(MovePayload),
    /// A chat line with the sender id.
    Chat(ChatLine),
    /// A relay-side failure report.
    Error(String),
}

#[derive(Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
enum Tagged {
    BoardState(BoardSync),
    Move(MovePayload),
    Chat(ChatLine),
}

#[derive(Serialize)]
struct ErrorReport<'a> {
    error: &'a str,
}

const KNOWN_TYPES: [&str; 3] = ["boardState", "move", "chat"];

impl ServerMessage {
    /// Serializes to a JSON text frame.
    pub fn encode(&self) -> Result<String, ProtocolError> {
        let text = match self {
            ServerMessage::BoardState(sync) => {
                serde_json::to_string(&Tagged::BoardState(sync.clone()))?
            }
            ServerMessage::Move(payload) => serde_json::to_string(&Tagged::Move(payload.clone()))?,
            ServerMessage::Chat(line) => serde_json::to_string(&Tagged::Chat(line.clone()))?,
            ServerMessage::Error(error) => serde_json::to_string(&ErrorReport { error })?,
        };
        Ok(text)
    }

    /// Parses a JSON text frame.
    ///
    /// # Errors
    ///
    /// `ProtocolError::Json` when the frame is not JSON or a known `type` has a
    /// malformed body; `ProtocolError::Unrecognized` when neither a known
    /// `type` nor an `error` string is present.
    #[instrument(level = "debug", skip(text), fields(len = text.len()))]
    pub fn decode(text: &str) -> Result<Self, ProtocolError> {
        let value: Value = serde_json::from_str(text)?;
        let tag = value.get("type").and_then(Value::as_str);
        if tag.is_some_and(|tag| KNOWN_TYPES.contains(&tag)) {
            let tagged: Tagged = serde_json::from_value(value)?;
            return Ok(match tagged {
                Tagged::BoardState(sync) => ServerMessage::BoardState(sync),
                Tagged::Move(payload) => ServerMessage::Move(payload),
                Tagged::Chat(line) => ServerMessage::Chat(line),
            });
        }
        match value.get("error").and_then(Value::as_str) {
            Some(error) => Ok(ServerMessage::Error(error.to_string())),
            None => Err(ProtocolError::Unrecognized {
                tag: tag.map(str::to_string),
            }),
        }
    }
}

/// Failure to encode or decode a protocol message.
#[derive(Debug, Display, Error)]
pub enum ProtocolError {
    /// Not JSON, or a known message type with a malformed body.
    #[display("malformed message: {_0}")]
    Json(serde_json::Error),
    /// Valid JSON that matches no known message shape.
    #[display("unrecognized message shape (type: {tag:?})")]
    Unrecognized {
        /// The `type` field, if there was one.
        #[error(not(source))]
        tag: Option<String>,
    },
}

impl From<serde_json::Error> for ProtocolError {
    fn from(err: serde_json::Error) -> Self {
        Self::Json(err)
    }
}
