//! HTTP and WebSocket surface of the relay.

use crate::config::RelayConfig;
use crate::registry::RoomRegistry;
use axum::Router;
use axum::extract::ws::{Message, WebSocket, WebSocketUpgrade};
use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use futures::{SinkExt, StreamExt};
use serde::Deserialize;
use skirmish_core::{ClientMessage, RoomId, ServerMessage};
use std::future::Future;
use std::net::SocketAddr;
use tokio::net::TcpListener;
use tokio::sync::mpsc;
use tracing::{debug, error, info, instrument, warn};

/// Reply to a text frame that is not a client message.
pub const UNRECOGNIZED: &str = "unrecognized message";

#[derive(Debug, Deserialize)]
struct JoinQuery {
    #[serde(rename = "roomId")]
    room_id: String,
}

/// Builds the relay router: `GET /?roomId=<id>` (WebSocket) and `GET /healthz`.
pub fn router(registry: RoomRegistry) -> Router {
    Router::new()
        .route("/", get(ws_handler))
        .route("/healthz", get(healthz))
        .with_state(registry)
}

async fn healthz() -> &'static str {
    "ok"
}

async fn ws_handler(
    State(registry): State<RoomRegistry>,
    Query(JoinQuery { room_id }): Query<JoinQuery>,
    ws: WebSocketUpgrade,
) -> Response {
    let room: RoomId = match room_id.parse() {
        Ok(room) => room,
        Err(err) => {
            warn!(room_id, error = %err, "Rejecting join with invalid room id");
            return (StatusCode::BAD_REQUEST, err.to_string()).into_response();
        }
    };
    ws.on_upgrade(move |socket| handle_socket(socket, registry, room))
}

#[instrument(skip(socket, registry), fields(room_id = %room))]
async fn handle_socket(socket: WebSocket, registry: RoomRegistry, room: RoomId) {
    let (mut sink, mut stream) = socket.split();
    let (tx, mut rx) = mpsc::unbounded_channel::<ServerMessage>();

    let member = match registry.join(&room, tx.clone()) {
        Ok(member) => member,
        Err(rejection) => {
            if let Ok(text) = ServerMessage::Error(rejection.to_string()).encode() {
                let _ = sink.send(Message::Text(text.into())).await;
            }
            let _ = sink.send(Message::Close(None)).await;
            return;
        }
    };

    let writer = tokio::spawn(async move {
        while let Some(message) = rx.recv().await {
            let text = match message.encode() {
                Ok(text) => text,
                Err(err) => {
                    error!(error = %err, "Failed to encode outbound message");
                    continue;
                }
            };
            if sink.send(Message::Text(text.into())).await.is_err() {
                break;
            }
        }
        let _ = sink.close().await;
    });

    while let Some(frame) = stream.next().await {
        match frame {
            Ok(Message::Text(text)) => match ClientMessage::decode(text.as_str()) {
                Ok(message) => registry.handle(&room, &member, message),
                Err(err) => {
                    warn!(member = %member, error = %err, "Undecodable frame");
                    let _ = tx.send(ServerMessage::Error(UNRECOGNIZED.to_string()));
                }
            },
            Ok(Message::Close(_)) => break,
            Ok(Message::Binary(_)) => debug!(member = %member, "Ignoring binary frame"),
            Ok(_) => {}
            Err(err) => {
                debug!(member = %member, error = %err, "Socket error");
                break;
            }
        }
    }

    registry.leave(&room, &member);
    drop(tx);
    let _ = writer.await;
}

/// A bound relay, ready to serve.
pub struct RelayServer {
    listener: TcpListener,
    registry: RoomRegistry,
}

impl RelayServer {
    /// Binds the configured address.
    #[instrument(skip(config), fields(addr = %config.bind_addr()))]
    pub async fn bind(config: &RelayConfig) -> std::io::Result<Self> {
        let listener = TcpListener::bind(config.bind_addr()).await?;
        info!("Relay listening");
        Ok(Self {
            listener,
            registry: RoomRegistry::new(*config.max_members()),
        })
    }

    /// The bound address (useful when the configured port was `0`).
    pub fn local_addr(&self) -> std::io::Result<SocketAddr> {
        self.listener.local_addr()
    }

    /// A handle to the room registry.
    pub fn registry(&self) -> RoomRegistry {
        self.registry.clone()
    }

    /// Serves until the process ends.
    pub async fn run(self) -> std::io::Result<()> {
        axum::serve(self.listener, router(self.registry)).await
    }

    /// Serves until `shutdown` completes.
    pub async fn run_until<F>(self, shutdown: F) -> std::io::Result<()>
    where
        F: Future<Output = ()> + Send + 'static,
    {
        axum::serve(self.listener, router(self.registry))
            .with_graceful_shutdown(shutdown)
            .await
    }
}
