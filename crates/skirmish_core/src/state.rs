//! Per-client game state: board, turn, transient notice and chat log.

use crate::board::Board;
use crate::chat::ChatLog;
use crate::types::Player;
use serde::{Deserialize, Serialize};

/// Classification of a transient user-facing message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, strum::Display)]
#[serde(rename_all = "kebab-case")]
#[strum(serialize_all = "kebab-case")]
pub enum NoticeKind {
    /// Informational (also used for relayed errors).
    Normal,
    /// Tried to move onto one of your own characters.
    OccupiedConflict,
    /// The step does not match the character's movement rule.
    IllegalMove,
}

/// A transient message shown to the local player.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Notice {
    text: String,
    kind: NoticeKind,
}

impl Notice {
    /// Creates a new notice.
    pub fn new(text: impl Into<String>, kind: NoticeKind) -> Self {
        Self {
            text: text.into(),
            kind,
        }
    }

    /// The message text.
    pub fn text(&self) -> &str {
        &self.text
    }

    /// The message classification.
    pub fn kind(&self) -> NoticeKind {
        self.kind
    }
}

impl std::fmt::Display for Notice {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{}] {}", self.kind, self.text)
    }
}

/// Game state held independently by each client.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GameState {
    board: Board,
    current_player: Player,
    notice: Option<Notice>,
    chat: ChatLog,
}

impl GameState {
    /// Creates a state with an empty board and player A to move.
    pub fn new() -> Self {
        Self::with_board(Board::empty(), Player::A)
    }

    /// Creates a state from an externally supplied layout.
    pub fn with_board(board: Board, current_player: Player) -> Self {
        Self {
            board,
            current_player,
            notice: None,
            chat: ChatLog::default(),
        }
    }

    /// Returns the board.
    pub fn board(&self) -> &Board {
        &self.board
    }

    /// Returns the player whose turn it is.
    pub fn current_player(&self) -> Player {
        self.current_player
    }

    /// Returns the pending notice, if any.
    pub fn notice(&self) -> Option<&Notice> {
        self.notice.as_ref()
    }

    /// Returns the chat log.
    pub fn chat(&self) -> &ChatLog {
        &self.chat
    }

    pub(crate) fn board_mut(&mut self) -> &mut Board {
        &mut self.board
    }

    /// Replaces board and turn wholesale (remote resync or move).
    pub(crate) fn replace(&mut self, board: Board, current_player: Player) {
        self.board = board;
        self.current_player = current_player;
    }

    pub(crate) fn pass_turn(&mut self) {
        self.current_player = self.current_player.opponent();
    }

    pub(crate) fn set_notice(&mut self, notice: Notice) {
        self.notice = Some(notice);
    }

    pub(crate) fn clear_notice(&mut self) {
        self.notice = None;
    }

    pub(crate) fn chat_mut(&mut self) -> &mut ChatLog {
        &mut self.chat
    }
}

impl Default for GameState {
    fn default() -> Self {
        Self::new()
    }
}
