//! The per-client session reducer.
//!
//! Every input (a local click, a chat submission, an inbound protocol message,
//! a transport lifecycle change) is an [`Event`]. [`GameSession::apply`] maps
//! each event to one deterministic transition and returns the message to send,
//! if any. The reducer performs no I/O; the client's synchronizer owns the
//! transport and feeds events in.

use crate::board::Board;
use crate::chat::{self, ChatLine};
use crate::contracts::RemoteMoveContract;
use crate::controller::{ClickOutcome, TurnController};
use crate::history::MoveHistory;
use crate::protocol::{BoardSync, ClientMessage, MovePayload, ServerMessage};
use crate::room::RoomId;
use crate::state::{GameState, Notice, NoticeKind};
use crate::types::{Occupant, Player, Position};
use tracing::{debug, error, info, instrument, warn};

/// Connection state of the session's transport.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum ConnectionStatus {
    /// No transport.
    #[default]
    Disconnected,
    /// A transport for the room is being opened.
    Connecting(RoomId),
    /// The transport for the room is open.
    Connected(RoomId),
}

impl ConnectionStatus {
    /// The room the session is bound to, if any.
    pub fn room(&self) -> Option<&RoomId> {
        match self {
            ConnectionStatus::Disconnected => None,
            ConnectionStatus::Connecting(room) | ConnectionStatus::Connected(room) => Some(room),
        }
    }

    /// Whether messages can be sent.
    pub fn is_live(&self) -> bool {
        matches!(self, ConnectionStatus::Connected(_))
    }
}

impl std::fmt::Display for ConnectionStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConnectionStatus::Disconnected => f.write_str("disconnected"),
            ConnectionStatus::Connecting(room) => write!(f, "connecting to room {room}"),
            ConnectionStatus::Connected(room) => write!(f, "connected to room {room}"),
        }
    }
}

/// An input to the session reducer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Event {
    /// The local player clicked a cell.
    LocalClick(Position),
    /// The local player submitted a chat line.
    ChatSubmitted(String),
    /// The relay resynced board and turn.
    RemoteBoardState(BoardSync),
    /// The relay distributed a move.
    RemoteMove(MovePayload),
    /// The relay distributed a chat line.
    RemoteChat(ChatLine),
    /// The relay reported a failure.
    RemoteError(String),
    /// A transport is being opened for the room.
    RoomBound(RoomId),
    /// The transport opened.
    TransportOpened,
    /// The transport closed, locally or remotely.
    TransportClosed,
    /// The transport failed.
    TransportError(String),
}

impl From<ServerMessage> for Event {
    fn from(message: ServerMessage) -> Self {
        match message {
            ServerMessage::BoardState(sync) => Event::RemoteBoardState(sync),
            ServerMessage::Move(payload) => Event::RemoteMove(payload),
            ServerMessage::Chat(line) => Event::RemoteChat(line),
            ServerMessage::Error(error) => Event::RemoteError(error),
        }
    }
}

/// One client's view of a match.
#[derive(Debug, Clone)]
pub struct GameSession {
    state: GameState,
    controller: TurnController,
    history: MoveHistory,
    status: ConnectionStatus,
    verify_remote_moves: bool,
}

impl GameSession {
    /// Creates a disconnected session showing the opening layout.
    ///
    /// With `verify_remote_moves` set, inbound move payloads are checked for
    /// consistency before they are applied.
    pub fn new(verify_remote_moves: bool) -> Self {
        Self {
            state: GameState::with_board(Board::standard(), Player::A),
            controller: TurnController::new(),
            history: MoveHistory::default(),
            status: ConnectionStatus::Disconnected,
            verify_remote_moves,
        }
    }

    /// Game state (board, turn, notice, chat).
    pub fn state(&self) -> &GameState {
        &self.state
    }

    /// Distributed moves received so far.
    pub fn history(&self) -> &MoveHistory {
        &self.history
    }

    /// Transport status.
    pub fn status(&self) -> &ConnectionStatus {
        &self.status
    }

    /// The selected character, if any.
    pub fn selection(&self) -> Option<Occupant> {
        self.controller.selection()
    }

    /// Applies one event and returns the message to send, if any.
    #[instrument(skip(self, event), fields(status = %self.status))]
    pub fn apply(&mut self, event: Event) -> Option<ClientMessage> {
        match event {
            Event::LocalClick(at) => self.local_click(at),
            Event::ChatSubmitted(text) => chat::compose(&text, self.status.is_live()),
            Event::RemoteBoardState(sync) => {
                debug!(current_player = %sync.current_player, "Applying board resync");
                self.state.replace(sync.board_state, sync.current_player);
                self.controller.reconcile(&self.state);
                None
            }
            Event::RemoteMove(payload) => {
                self.remote_move(payload);
                None
            }
            Event::RemoteChat(line) => {
                debug!(player_id = %line.player_id, "Received chat line");
                self.state.chat_mut().push(&line);
                None
            }
            Event::RemoteError(text) => {
                warn!(error = %text, "Relay reported an error");
                self.state.set_notice(Notice::new(text, NoticeKind::Normal));
                None
            }
            Event::RoomBound(room) => {
                info!(room_id = %room, "Binding session to room");
                self.status = ConnectionStatus::Connecting(room);
                None
            }
            Event::TransportOpened => {
                if let ConnectionStatus::Connecting(room) = &self.status {
                    info!(room_id = %room, "Connected");
                    self.status = ConnectionStatus::Connected(room.clone());
                } else {
                    warn!("Transport opened without a pending room");
                }
                None
            }
            Event::TransportClosed => {
                info!("Transport closed");
                self.status = ConnectionStatus::Disconnected;
                None
            }
            Event::TransportError(reason) => {
                error!(%reason, "Transport failed");
                self.status = ConnectionStatus::Disconnected;
                self.state.set_notice(Notice::new(
                    format!("Connection lost: {reason}"),
                    NoticeKind::Normal,
                ));
                None
            }
        }
    }

    fn local_click(&mut self, at: Position) -> Option<ClientMessage> {
        match self.controller.click(&mut self.state, at) {
            ClickOutcome::Moved(applied) => {
                Some(ClientMessage::Move(applied.payload(*self.state.board())))
            }
            ClickOutcome::Ignored | ClickOutcome::Selected(_) | ClickOutcome::Rejected(_) => None,
        }
    }

    fn remote_move(&mut self, payload: MovePayload) {
        if self.verify_remote_moves {
            if let Err(reason) = RemoteMoveContract::check(&payload) {
                self.state.set_notice(Notice::new(
                    format!("Rejected move from relay: {reason}"),
                    NoticeKind::IllegalMove,
                ));
                return;
            }
        }
        let entry = match payload.history_entry() {
            Ok(entry) => entry,
            Err(err) => {
                warn!(%err, "Dropping move with off-board coordinates");
                return;
            }
        };
        info!(%entry, "Applying distributed move");
        self.state.replace(payload.board_state, payload.current_player);
        self.history.push(entry);
        self.controller.reconcile(&self.state);
    }
}

impl Default for GameSession {
    fn default() -> Self {
        Self::new(true)
    }
}
