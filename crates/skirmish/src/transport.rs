//! Message transports between a client and the relay.
//!
//! A [`Transport`] carries JSON text frames for exactly one room. A
//! [`Connector`] opens transports; the synchronizer asks it for a new one
//! whenever the room changes.

use async_trait::async_trait;
use derive_more::{Display, Error};
use futures::{SinkExt, StreamExt};
use skirmish_core::RoomId;
use std::collections::VecDeque;
use std::sync::{Arc, Mutex, PoisonError};
use tokio::net::TcpStream;
use tokio::sync::mpsc::{UnboundedReceiver, UnboundedSender, unbounded_channel};
use tokio_tungstenite::tungstenite::{self, Message};
use tokio_tungstenite::{MaybeTlsStream, WebSocketStream, connect_async};
use tracing::{debug, info, instrument};
use url::Url;

/// Transport failure.
#[derive(Debug, Display, Error)]
pub enum TransportError {
    /// The relay URL could not be parsed.
    #[display("invalid relay url: {_0}")]
    Url(url::ParseError),
    /// The WebSocket layer failed.
    #[display("websocket error: {_0}")]
    WebSocket(tungstenite::Error),
    /// The transport was already closed.
    #[display("transport closed")]
    Closed,
    /// No transport could be produced for the room.
    #[display("cannot connect to room {room}")]
    Unavailable {
        /// The requested room.
        #[error(not(source))]
        room: RoomId,
    },
}

impl From<url::ParseError> for TransportError {
    fn from(err: url::ParseError) -> Self {
        Self::Url(err)
    }
}

impl From<tungstenite::Error> for TransportError {
    fn from(err: tungstenite::Error) -> Self {
        Self::WebSocket(err)
    }
}

/// A bidirectional text channel bound to one room.
#[async_trait]
pub trait Transport: Send {
    /// Sends one text frame.
    async fn send(&mut self, text: String) -> Result<(), TransportError>;

    /// Waits for the next inbound text frame. `None` once the peer has closed.
    async fn recv(&mut self) -> Option<Result<String, TransportError>>;

    /// Closes the transport.
    async fn close(&mut self) -> Result<(), TransportError>;
}

/// Opens transports for rooms.
#[async_trait]
pub trait Connector: Send + Sync {
    /// Opens a transport for `room`.
    async fn connect(&self, room: &RoomId) -> Result<Box<dyn Transport>, TransportError>;
}

/// Builds `<base>/?roomId=<room>`.
pub fn join_url(base: &str, room: &RoomId) -> Result<Url, TransportError> {
    let mut url = Url::parse(base)?;
    url.query_pairs_mut().clear().append_pair("roomId", room.as_str());
    Ok(url)
}

type WsStream = WebSocketStream<MaybeTlsStream<TcpStream>>;

/// WebSocket transport.
pub struct WsTransport {
    stream: WsStream,
}

#[async_trait]
impl Transport for WsTransport {
    async fn send(&mut self, text: String) -> Result<(), TransportError> {
        self.stream.send(Message::text(text)).await?;
        Ok(())
    }

    async fn recv(&mut self) -> Option<Result<String, TransportError>> {
        while let Some(frame) = self.stream.next().await {
            match frame {
                Ok(Message::Text(text)) => return Some(Ok(text.as_str().to_string())),
                Ok(Message::Close(_)) => return None,
                Ok(Message::Binary(_)) => debug!("Ignoring binary frame"),
                Ok(_) => {}
                Err(err) => return Some(Err(err.into())),
            }
        }
        None
    }

    async fn close(&mut self) -> Result<(), TransportError> {
        match self.stream.close(None).await {
            Ok(()) | Err(tungstenite::Error::ConnectionClosed) => Ok(()),
            Err(err) => Err(err.into()),
        }
    }
}

/// Opens [`WsTransport`]s against a relay base URL such as `ws://localhost:8081`.
#[derive(Debug, Clone)]
pub struct WsConnector {
    base_url: String,
}

impl WsConnector {
    /// Creates a connector for `base_url`.
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
        }
    }
}

#[async_trait]
impl Connector for WsConnector {
    #[instrument(skip(self), fields(room_id = %room, base = %self.base_url))]
    async fn connect(&self, room: &RoomId) -> Result<Box<dyn Transport>, TransportError> {
        let url = join_url(&self.base_url, room)?;
        let (stream, _) = connect_async(url.as_str()).await?;
        info!("WebSocket connected");
        Ok(Box::new(WsTransport { stream }))
    }
}

/// In-memory transport. The other end is a [`MemoryPeer`].
pub struct MemoryTransport {
    outbound: Option<UnboundedSender<String>>,
    inbound: UnboundedReceiver<String>,
}

/// Test-side end of a [`MemoryTransport`], playing the relay.
pub struct MemoryPeer {
    to_client: UnboundedSender<String>,
    from_client: UnboundedReceiver<String>,
}

impl MemoryTransport {
    /// Creates a connected transport and peer.
    pub fn pair() -> (MemoryTransport, MemoryPeer) {
        let (to_client, inbound) = unbounded_channel();
        let (outbound, from_client) = unbounded_channel();
        (
            MemoryTransport {
                outbound: Some(outbound),
                inbound,
            },
            MemoryPeer {
                to_client,
                from_client,
            },
        )
    }
}

#[async_trait]
impl Transport for MemoryTransport {
    async fn send(&mut self, text: String) -> Result<(), TransportError> {
        let tx = self.outbound.as_ref().ok_or(TransportError::Closed)?;
        tx.send(text).map_err(|_| TransportError::Closed)
    }

    async fn recv(&mut self) -> Option<Result<String, TransportError>> {
        self.inbound.recv().await.map(Ok)
    }

    async fn close(&mut self) -> Result<(), TransportError> {
        self.outbound = None;
        self.inbound.close();
        Ok(())
    }
}

impl MemoryPeer {
    /// Delivers a frame to the client. Returns `false` if the client closed.
    pub fn push(&self, text: impl Into<String>) -> bool {
        self.to_client.send(text.into()).is_ok()
    }

    /// Waits for the next frame sent by the client; `None` once it closed.
    pub async fn next(&mut self) -> Option<String> {
        self.from_client.recv().await
    }

    /// A frame already sent by the client, without waiting.
    pub fn try_next(&mut self) -> Option<String> {
        self.from_client.try_recv().ok()
    }

    /// Whether the client has closed its end.
    pub fn is_closed(&self) -> bool {
        self.to_client.is_closed()
    }
}

/// Hands out prepared [`MemoryTransport`]s in order and records each room.
#[derive(Clone, Default)]
pub struct MemoryConnector {
    ready: Arc<Mutex<VecDeque<MemoryTransport>>>,
    rooms: Arc<Mutex<Vec<RoomId>>>,
}

impl MemoryConnector {
    /// Creates a connector with nothing prepared.
    pub fn new() -> Self {
        Self::default()
    }

    /// Prepares a transport for the next connect and returns its peer.
    pub fn prepare(&self) -> MemoryPeer {
        let (transport, peer) = MemoryTransport::pair();
        self.ready
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push_back(transport);
        peer
    }

    /// Rooms connected to so far, in order.
    pub fn rooms(&self) -> Vec<RoomId> {
        self.rooms
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

#[async_trait]
impl Connector for MemoryConnector {
    async fn connect(&self, room: &RoomId) -> Result<Box<dyn Transport>, TransportError> {
        self.rooms
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(room.clone());
        let next = self
            .ready
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .pop_front();
        match next {
            Some(transport) => Ok(Box::new(transport)),
            None => Err(TransportError::Unavailable { room: room.clone() }),
        }
    }
}
