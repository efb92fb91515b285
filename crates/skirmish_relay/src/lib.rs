//! Room relay for skirmish.
//!
//! Clients connect with `ws://host:port/?roomId=<id>`. The relay keeps the
//! authoritative board of every room, validates each move against it, and
//! fans moves and chat lines out to every member of the room.

#![warn(missing_docs)]

mod config;
mod registry;
mod server;

pub use config::{ConfigError, RelayConfig};
pub use registry::{MemberId, MemberTx, RelayRejection, RoomRegistry};
pub use server::{RelayServer, UNRECOGNIZED, router};
