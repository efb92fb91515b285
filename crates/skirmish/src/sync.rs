//! Session synchronizer: couples the session reducer to a transport.
//!
//! The synchronizer owns at most one transport, bound to the session's room.
//! Local events go through the reducer and any resulting message is sent;
//! inbound frames are decoded and fed back in as events. Undecodable frames
//! are logged and dropped without touching state.

use crate::transport::{Connector, Transport, TransportError};
use skirmish_core::{ClientMessage, Event, GameSession, RoomId, ServerMessage};
use tracing::{debug, instrument, warn};

/// What an inbound frame did to the session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Inbound {
    /// A message was applied.
    Applied(ServerMessage),
    /// The frame was not a known message and was dropped.
    Dropped,
    /// The transport closed or failed; the session is disconnected.
    Disconnected,
}

/// Drives a [`GameSession`] over transports from a [`Connector`].
pub struct SessionSynchronizer<C> {
    session: GameSession,
    connector: C,
    transport: Option<Box<dyn Transport>>,
}

impl<C: Connector> SessionSynchronizer<C> {
    /// Creates a disconnected synchronizer.
    pub fn new(connector: C, verify_remote_moves: bool) -> Self {
        Self {
            session: GameSession::new(verify_remote_moves),
            connector,
            transport: None,
        }
    }

    /// The session state.
    pub fn session(&self) -> &GameSession {
        &self.session
    }

    /// Whether a transport is bound.
    pub fn is_bound(&self) -> bool {
        self.transport.is_some()
    }

    /// Binds the session to `room`, closing any previous transport first.
    #[instrument(skip(self), fields(room_id = %room))]
    pub async fn bind_room(&mut self, room: RoomId) -> Result<(), TransportError> {
        self.close().await;
        self.session.apply(Event::RoomBound(room.clone()));
        match self.connector.connect(&room).await {
            Ok(transport) => {
                self.transport = Some(transport);
                self.session.apply(Event::TransportOpened);
                Ok(())
            }
            Err(err) => {
                self.session.apply(Event::TransportError(err.to_string()));
                Err(err)
            }
        }
    }

    /// Closes the bound transport, if any.
    pub async fn close(&mut self) {
        if let Some(mut transport) = self.transport.take() {
            if let Err(err) = transport.close().await {
                debug!(error = %err, "Error while closing transport");
            }
            self.session.apply(Event::TransportClosed);
        }
    }

    /// Applies a local event and sends the resulting message, if any.
    #[instrument(skip(self, event))]
    pub async fn dispatch(&mut self, event: Event) {
        let Some(message) = self.session.apply(event) else {
            return;
        };
        self.send(&message).await;
    }

    async fn send(&mut self, message: &ClientMessage) {
        let Some(transport) = self.transport.as_mut() else {
            debug!("No transport bound, dropping outbound message");
            return;
        };
        let text = match message.encode() {
            Ok(text) => text,
            Err(err) => {
                warn!(error = %err, "Failed to encode outbound message");
                return;
            }
        };
        let sent = transport.send(text).await;
        if let Err(err) = sent {
            self.fail(err);
        }
    }

    fn fail(&mut self, err: TransportError) {
        self.transport = None;
        self.session.apply(Event::TransportError(err.to_string()));
    }

    /// Waits for the next inbound frame. Pends forever when unbound.
    pub async fn next_frame(&mut self) -> Option<Result<String, TransportError>> {
        match self.transport.as_mut() {
            Some(transport) => transport.recv().await,
            None => std::future::pending().await,
        }
    }

    /// Feeds a frame obtained from [`Self::next_frame`] into the session.
    #[instrument(skip(self, frame))]
    pub fn receive(&mut self, frame: Option<Result<String, TransportError>>) -> Inbound {
        match frame {
            Some(Ok(text)) => match ServerMessage::decode(&text) {
                Ok(message) => {
                    debug!(?message, "Inbound message");
                    self.session.apply(Event::from(message.clone()));
                    Inbound::Applied(message)
                }
                Err(err) => {
                    warn!(error = %err, "Dropping undecodable message");
                    Inbound::Dropped
                }
            },
            Some(Err(err)) => {
                self.fail(err);
                Inbound::Disconnected
            }
            None => {
                self.transport = None;
                self.session.apply(Event::TransportClosed);
                Inbound::Disconnected
            }
        }
    }

    /// Waits for one inbound frame and applies it.
    pub async fn pump(&mut self) -> Inbound {
        let frame = self.next_frame().await;
        self.receive(frame)
    }
}
