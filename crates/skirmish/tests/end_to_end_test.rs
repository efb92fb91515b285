//! Two clients playing through a real relay on localhost.

use skirmish::{Inbound, SessionSynchronizer, WsConnector};
use skirmish_core::{Board, Event, Player, RoomId, ServerMessage, parse_label};
use skirmish_relay::{RelayConfig, RelayServer};
use std::time::Duration;
use tokio::time::timeout;

async fn start_relay() -> String {
    let server = RelayServer::bind(&RelayConfig::default().with_port(0))
        .await
        .unwrap();
    let addr = server.local_addr().unwrap();
    tokio::spawn(server.run());
    format!("ws://{addr}")
}

async fn pump(sync: &mut SessionSynchronizer<WsConnector>) -> Inbound {
    timeout(Duration::from_secs(5), sync.pump()).await.unwrap()
}

async fn join(base: &str, room: &RoomId) -> SessionSynchronizer<WsConnector> {
    let mut sync = SessionSynchronizer::new(WsConnector::new(base), true);
    sync.bind_room(room.clone()).await.unwrap();
    assert!(matches!(
        pump(&mut sync).await,
        Inbound::Applied(ServerMessage::BoardState(_))
    ));
    sync
}

fn click(label: &str) -> Event {
    Event::LocalClick(parse_label(label).unwrap())
}

#[tokio::test]
async fn test_two_clients_converge_after_move() {
    let base = start_relay().await;
    let room: RoomId = "2718".parse().unwrap();
    let mut alice = join(&base, &room).await;
    let mut bob = join(&base, &room).await;

    alice.dispatch(click("A3")).await;
    alice.dispatch(click("C3")).await;

    assert!(matches!(pump(&mut alice).await, Inbound::Applied(ServerMessage::Move(_))));
    assert!(matches!(pump(&mut bob).await, Inbound::Applied(ServerMessage::Move(_))));

    for sync in [&alice, &bob] {
        let session = sync.session();
        assert_eq!(session.state().current_player(), Player::B);
        assert_eq!(
            session.history().lines(),
            vec!["Player A moved AH1 from A3 to C3".to_string()]
        );
    }
    assert_eq!(alice.session().state().board(), bob.session().state().board());
    assert_ne!(*bob.session().state().board(), Board::standard());

    // Bob answers; chat flows both ways.
    bob.dispatch(click("E4")).await;
    bob.dispatch(click("D3")).await;
    bob.dispatch(Event::ChatSubmitted("your move".into())).await;
    for sync in [&mut alice, &mut bob] {
        pump(sync).await;
        pump(sync).await;
    }
    for sync in [&alice, &bob] {
        assert_eq!(sync.session().state().current_player(), Player::A);
        assert_eq!(sync.session().history().len(), 2);
        assert_eq!(sync.session().state().chat().lines(), ["player-2: your move"]);
    }

    alice.close().await;
    bob.close().await;
}

#[tokio::test]
async fn test_third_client_is_turned_away() {
    let base = start_relay().await;
    let room: RoomId = "full-house".parse().unwrap();
    let _alice = join(&base, &room).await;
    let _bob = join(&base, &room).await;

    let mut carol = SessionSynchronizer::new(WsConnector::new(base.as_str()), true);
    carol.bind_room(room.clone()).await.unwrap();

    assert_eq!(
        pump(&mut carol).await,
        Inbound::Applied(ServerMessage::Error("room full-house is full".to_string()))
    );
    assert_eq!(
        carol.session().state().notice().map(|n| n.text()),
        Some("room full-house is full")
    );
    assert_eq!(pump(&mut carol).await, Inbound::Disconnected);
    assert!(!carol.session().status().is_live());
}
