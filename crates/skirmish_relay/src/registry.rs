//! Rooms and their members.
//!
//! Each room owns the authoritative board and turn for its match. Members are
//! represented by the sending half of their connection's outbound channel, so
//! all fan-out happens under the registry lock without awaiting.

use derive_more::{Display, Error};
use skirmish_core::{
    Board, BoardSync, ChatLine, ClientMessage, MovePayload, Player, RoomId, ServerMessage,
    arbitrate,
};
use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tokio::sync::mpsc::UnboundedSender;
use tracing::{debug, info, instrument, warn};

/// Relay-assigned member id, `player-1`, `player-2`, ...
pub type MemberId = String;

/// Outbound channel of one connection.
pub type MemberTx = UnboundedSender<ServerMessage>;

/// Why a join was refused.
#[derive(Debug, Clone, PartialEq, Eq, Display, Error)]
pub enum RelayRejection {
    /// The room already has its full complement of members.
    #[display("room {room} is full")]
    RoomFull {
        /// The requested room.
        #[error(not(source))]
        room: RoomId,
    },
}

#[derive(Debug)]
struct Member {
    id: MemberId,
    tx: MemberTx,
}

/// A match in progress.
#[derive(Debug)]
struct Room {
    state: BoardSync,
    members: Vec<Member>,
    joined: usize,
}

impl Room {
    fn new() -> Self {
        Self {
            state: BoardSync {
                board_state: Board::standard(),
                current_player: Player::A,
            },
            members: Vec::new(),
            joined: 0,
        }
    }

    fn broadcast(&self, message: &ServerMessage) {
        for member in &self.members {
            if member.tx.send(message.clone()).is_err() {
                debug!(member = %member.id, "Member channel closed during broadcast");
            }
        }
    }

    fn send_to(&self, member_id: &str, message: ServerMessage) {
        if let Some(member) = self.members.iter().find(|m| m.id == member_id) {
            if member.tx.send(message).is_err() {
                debug!(member = %member.id, "Member channel closed");
            }
        }
    }
}

/// All live rooms, keyed by id.
#[derive(Debug, Clone)]
pub struct RoomRegistry {
    rooms: Arc<Mutex<HashMap<RoomId, Room>>>,
    max_members: usize,
}

impl RoomRegistry {
    /// Creates an empty registry admitting `max_members` per room.
    #[instrument]
    pub fn new(max_members: usize) -> Self {
        info!("Creating room registry");
        Self {
            rooms: Arc::new(Mutex::new(HashMap::new())),
            max_members,
        }
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<RoomId, Room>> {
        self.rooms.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Adds a member to `room`, creating the room on first join.
    ///
    /// The new member is sent the room's current board and turn.
    #[instrument(skip(self, tx), fields(room_id = %room))]
    pub fn join(&self, room: &RoomId, tx: MemberTx) -> Result<MemberId, RelayRejection> {
        let mut rooms = self.lock();
        let entry = rooms.entry(room.clone()).or_insert_with(|| {
            info!("Creating room with the standard layout");
            Room::new()
        });
        if entry.members.len() >= self.max_members {
            warn!(members = entry.members.len(), "Room is full");
            return Err(RelayRejection::RoomFull { room: room.clone() });
        }

        entry.joined += 1;
        let id = format!("player-{}", entry.joined);
        if tx.send(ServerMessage::BoardState(entry.state.clone())).is_err() {
            debug!(member = %id, "Member channel closed before initial sync");
        }
        entry.members.push(Member { id: id.clone(), tx });
        info!(member = %id, members = entry.members.len(), "Member joined");
        Ok(id)
    }

    /// Removes a member, dropping the room once it is empty.
    #[instrument(skip(self), fields(room_id = %room))]
    pub fn leave(&self, room: &RoomId, member: &str) {
        let mut rooms = self.lock();
        let Some(entry) = rooms.get_mut(room) else {
            debug!("Leave for unknown room");
            return;
        };
        entry.members.retain(|m| m.id != member);
        info!(member, remaining = entry.members.len(), "Member left");
        if entry.members.is_empty() {
            rooms.remove(room);
            info!("Dropped empty room");
        }
    }

    /// Routes a decoded message from `member`.
    #[instrument(skip(self, message), fields(room_id = %room))]
    pub fn handle(&self, room: &RoomId, member: &str, message: ClientMessage) {
        let mut rooms = self.lock();
        let Some(entry) = rooms.get_mut(room) else {
            warn!(member, "Message for unknown room");
            return;
        };
        match message {
            ClientMessage::Move(payload) => Self::handle_move(entry, member, &payload),
            ClientMessage::Chat { message } => {
                debug!(member, "Broadcasting chat line");
                entry.broadcast(&ServerMessage::Chat(ChatLine::new(
                    member.to_string(),
                    message,
                )));
            }
        }
    }

    fn handle_move(entry: &mut Room, member: &str, payload: &MovePayload) {
        match arbitrate(&mut entry.state, payload) {
            Ok(applied) => {
                info!(
                    member,
                    character = %applied.character,
                    next = %applied.current_player,
                    "Broadcasting move"
                );
                entry.broadcast(&ServerMessage::Move(applied));
            }
            Err(reason) => {
                warn!(member, %reason, "Refused move");
                entry.send_to(member, ServerMessage::Error(reason.to_string()));
                entry.send_to(member, ServerMessage::BoardState(entry.state.clone()));
            }
        }
    }

    /// Current board and turn of `room`, if it exists.
    pub fn snapshot(&self, room: &RoomId) -> Option<BoardSync> {
        self.lock().get(room).map(|entry| entry.state.clone())
    }

    /// Number of members in `room` (zero if it does not exist).
    pub fn member_count(&self, room: &RoomId) -> usize {
        self.lock().get(room).map_or(0, |entry| entry.members.len())
    }

    /// Number of live rooms.
    pub fn room_count(&self) -> usize {
        self.lock().len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use skirmish_core::{Kind, Occupant, Position};
    use tokio::sync::mpsc::{UnboundedReceiver, unbounded_channel};

    fn room(id: &str) -> RoomId {
        id.parse().unwrap()
    }

    fn drain(rx: &mut UnboundedReceiver<ServerMessage>) -> Vec<ServerMessage> {
        let mut out = Vec::new();
        while let Ok(msg) = rx.try_recv() {
            out.push(msg);
        }
        out
    }

    fn pawn_step() -> ClientMessage {
        ClientMessage::Move(MovePayload::new(
            Occupant::new(Player::A, Kind::Pawn1),
            Position::new(0, 0).unwrap(),
            Position::new(1, 0).unwrap(),
            Board::empty(),
            Player::A,
        ))
    }

    #[test]
    fn test_join_sends_standard_layout_and_assigns_ids() {
        let registry = RoomRegistry::new(2);
        let (tx1, mut rx1) = unbounded_channel();
        let (tx2, _rx2) = unbounded_channel();

        assert_eq!(registry.join(&room("9"), tx1).unwrap(), "player-1");
        assert_eq!(registry.join(&room("9"), tx2).unwrap(), "player-2");

        let sent = drain(&mut rx1);
        assert_eq!(
            sent,
            vec![ServerMessage::BoardState(BoardSync {
                board_state: Board::standard(),
                current_player: Player::A,
            })]
        );
    }

    #[test]
    fn test_third_member_refused() {
        let registry = RoomRegistry::new(2);
        for _ in 0..2 {
            let (tx, _rx) = unbounded_channel();
            registry.join(&room("r"), tx).unwrap();
        }
        let (tx, _rx) = unbounded_channel();
        let err = registry.join(&room("r"), tx).unwrap_err();
        assert_eq!(err.to_string(), "room r is full");
        assert_eq!(registry.member_count(&room("r")), 2);
    }

    #[test]
    fn test_room_dropped_when_empty() {
        let registry = RoomRegistry::new(2);
        let (tx, _rx) = unbounded_channel();
        let id = registry.join(&room("x"), tx).unwrap();
        assert_eq!(registry.room_count(), 1);
        registry.leave(&room("x"), &id);
        assert_eq!(registry.room_count(), 0);
        assert!(registry.snapshot(&room("x")).is_none());
    }

    #[test]
    fn test_move_broadcast_to_all_members() {
        let registry = RoomRegistry::new(2);
        let (tx1, mut rx1) = unbounded_channel();
        let (tx2, mut rx2) = unbounded_channel();
        let a = registry.join(&room("m"), tx1).unwrap();
        registry.join(&room("m"), tx2).unwrap();
        drain(&mut rx1);
        drain(&mut rx2);

        registry.handle(&room("m"), &a, pawn_step());

        for rx in [&mut rx1, &mut rx2] {
            let sent = drain(rx);
            assert_eq!(sent.len(), 1);
            let ServerMessage::Move(payload) = &sent[0] else {
                panic!("expected move broadcast");
            };
            assert_eq!(payload.current_player, Player::B);
        }
        assert_eq!(
            registry.snapshot(&room("m")).unwrap().current_player,
            Player::B
        );
    }

    #[test]
    fn test_refused_move_answers_sender_only() {
        let registry = RoomRegistry::new(2);
        let (tx1, mut rx1) = unbounded_channel();
        let (tx2, mut rx2) = unbounded_channel();
        let a = registry.join(&room("m"), tx1).unwrap();
        registry.join(&room("m"), tx2).unwrap();
        registry.handle(&room("m"), &a, pawn_step());
        drain(&mut rx1);
        drain(&mut rx2);

        // Same member tries again out of turn.
        let again = ClientMessage::Move(MovePayload::new(
            Occupant::new(Player::A, Kind::Pawn1),
            Position::new(1, 0).unwrap(),
            Position::new(2, 0).unwrap(),
            Board::empty(),
            Player::A,
        ));
        registry.handle(&room("m"), &a, again);

        let sent = drain(&mut rx1);
        assert_eq!(sent.len(), 2);
        assert!(matches!(&sent[0], ServerMessage::Error(text) if text.contains("turn")));
        assert!(matches!(&sent[1], ServerMessage::BoardState(sync) if sync.current_player == Player::B));
        assert!(drain(&mut rx2).is_empty());
    }
}
