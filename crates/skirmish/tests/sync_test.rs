//! Synchronizer tests over the in-memory transport.

use skirmish::{Inbound, MemoryConnector, SessionSynchronizer};
use skirmish_core::{
    Board, BoardSync, ClientMessage, ConnectionStatus, Event, Kind, MovePayload, Occupant, Player,
    RoomId, ServerMessage, parse_label,
};

fn room(id: &str) -> RoomId {
    id.parse().unwrap()
}

fn click(label: &str) -> Event {
    Event::LocalClick(parse_label(label).unwrap())
}

#[tokio::test]
async fn test_bind_room_connects() {
    let connector = MemoryConnector::new();
    let _peer = connector.prepare();
    let mut sync = SessionSynchronizer::new(connector.clone(), true);

    sync.bind_room(room("42")).await.unwrap();

    assert!(sync.is_bound());
    assert_eq!(
        sync.session().status(),
        &ConnectionStatus::Connected(room("42"))
    );
    assert_eq!(connector.rooms(), vec![room("42")]);
}

#[tokio::test]
async fn test_changing_room_closes_old_transport() {
    let connector = MemoryConnector::new();
    let first = connector.prepare();
    let _second = connector.prepare();
    let mut sync = SessionSynchronizer::new(connector.clone(), true);

    sync.bind_room(room("1")).await.unwrap();
    assert!(!first.is_closed());
    sync.bind_room(room("2")).await.unwrap();

    assert!(first.is_closed());
    assert_eq!(connector.rooms(), vec![room("1"), room("2")]);
    assert_eq!(sync.session().status().room(), Some(&room("2")));
}

#[tokio::test]
async fn test_failed_connect_leaves_session_disconnected() {
    let connector = MemoryConnector::new();
    let mut sync = SessionSynchronizer::new(connector, true);

    assert!(sync.bind_room(room("9")).await.is_err());
    assert_eq!(sync.session().status(), &ConnectionStatus::Disconnected);
    assert!(sync.session().state().notice().is_some());
}

#[tokio::test]
async fn test_local_move_is_sent() {
    let connector = MemoryConnector::new();
    let mut peer = connector.prepare();
    let mut sync = SessionSynchronizer::new(connector, true);
    sync.bind_room(room("5")).await.unwrap();

    sync.dispatch(click("A1")).await;
    assert_eq!(peer.try_next(), None);
    sync.dispatch(click("B1")).await;

    let text = peer.next().await.unwrap();
    let ClientMessage::Move(payload) = ClientMessage::decode(&text).unwrap() else {
        panic!("expected move");
    };
    assert_eq!(payload.character, Occupant::new(Player::A, Kind::Pawn1));
    assert_eq!(payload.current_player, Player::A);
}

#[tokio::test]
async fn test_chat_is_sent_verbatim_and_blank_is_not() {
    let connector = MemoryConnector::new();
    let mut peer = connector.prepare();
    let mut sync = SessionSynchronizer::new(connector, true);
    sync.bind_room(room("5")).await.unwrap();

    sync.dispatch(Event::ChatSubmitted("   ".into())).await;
    sync.dispatch(Event::ChatSubmitted(" hi ".into())).await;

    let text = peer.next().await.unwrap();
    assert_eq!(text, r#"{"type":"chat","message":" hi "}"#);
    assert_eq!(peer.try_next(), None);
}

#[tokio::test]
async fn test_move_without_transport_is_dropped() {
    let mut sync = SessionSynchronizer::new(MemoryConnector::new(), true);
    sync.dispatch(click("A1")).await;
    sync.dispatch(click("B1")).await;
    assert_eq!(sync.session().state().current_player(), Player::B);
}

#[tokio::test]
async fn test_inbound_messages_are_applied() {
    let connector = MemoryConnector::new();
    let peer = connector.prepare();
    let mut sync = SessionSynchronizer::new(connector, true);
    sync.bind_room(room("5")).await.unwrap();

    let mut board = Board::standard();
    board.relocate(parse_label("E2").unwrap(), parse_label("D2").unwrap());
    let sync_msg = ServerMessage::BoardState(BoardSync {
        board_state: board,
        current_player: Player::A,
    });
    peer.push(sync_msg.encode().unwrap());
    assert_eq!(sync.pump().await, Inbound::Applied(sync_msg));
    assert_eq!(*sync.session().state().board(), board);

    peer.push(r#"{"type":"chat","playerId":"player-2","message":"hey"}"#);
    assert!(matches!(sync.pump().await, Inbound::Applied(ServerMessage::Chat(_))));
    assert_eq!(sync.session().state().chat().lines(), ["player-2: hey"]);
}

#[tokio::test]
async fn test_unknown_message_is_dropped_without_state_change() {
    let connector = MemoryConnector::new();
    let peer = connector.prepare();
    let mut sync = SessionSynchronizer::new(connector, true);
    sync.bind_room(room("5")).await.unwrap();
    let before = sync.session().state().clone();

    peer.push(r#"{"type":"ping"}"#);
    peer.push("not json");
    assert_eq!(sync.pump().await, Inbound::Dropped);
    assert_eq!(sync.pump().await, Inbound::Dropped);
    assert_eq!(sync.session().state(), &before);
    assert!(sync.session().status().is_live());
}

#[tokio::test]
async fn test_remote_move_appends_history() {
    let connector = MemoryConnector::new();
    let peer = connector.prepare();
    let mut sync = SessionSynchronizer::new(connector, true);
    sync.bind_room(room("5")).await.unwrap();

    let from = parse_label("E4").unwrap();
    let to = parse_label("D3").unwrap();
    let mut board = Board::standard();
    board.relocate(from, to);
    let payload = MovePayload::new(
        Occupant::new(Player::B, Kind::Hero2),
        from,
        to,
        board,
        Player::A,
    );
    peer.push(ServerMessage::Move(payload).encode().unwrap());
    sync.pump().await;

    assert_eq!(
        sync.session().history().lines(),
        vec!["Player B moved BH2 from E4 to D3".to_string()]
    );
}

#[tokio::test]
async fn test_peer_hangup_disconnects() {
    let connector = MemoryConnector::new();
    let peer = connector.prepare();
    let mut sync = SessionSynchronizer::new(connector, true);
    sync.bind_room(room("5")).await.unwrap();

    drop(peer);
    assert_eq!(sync.pump().await, Inbound::Disconnected);
    assert!(!sync.is_bound());
    assert_eq!(sync.session().status(), &ConnectionStatus::Disconnected);
}
