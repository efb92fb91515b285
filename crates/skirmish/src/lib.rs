//! Console client for skirmish.
//!
//! # Architecture
//!
//! - **Transport**: WebSocket to the relay, or an in-memory pair for tests
//! - **Synchronizer**: owns the transport and feeds the session reducer
//! - **Console**: parses commands from stdin and renders the board
//!
//! # Example
//!
//! ```no_run
//! use skirmish::{SessionSynchronizer, WsConnector, generate_room_id};
//!
//! # async fn example() -> anyhow::Result<()> {
//! let mut sync = SessionSynchronizer::new(WsConnector::new("ws://localhost:8081"), true);
//! sync.bind_room(generate_room_id()).await?;
//! let stdin = tokio::io::BufReader::new(tokio::io::stdin());
//! skirmish::run_console(&mut sync, stdin, &mut std::io::stdout()).await?;
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]

mod config;
mod console;
mod room;
mod sync;
mod transport;

pub use config::{ClientConfig, ConfigError};
pub use console::{
    Command, CommandError, RULES, parse_command, render_chat, render_history, render_view,
    run as run_console,
};
pub use room::generate_room_id;
pub use sync::{Inbound, SessionSynchronizer};
pub use transport::{
    Connector, MemoryConnector, MemoryPeer, MemoryTransport, Transport, TransportError,
    WsConnector, WsTransport, join_url,
};
