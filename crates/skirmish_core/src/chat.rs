//! Chat channel: outbound composition and the inbound line log.
//!
//! Chat is independent of game state. Sender identity is attached by the
//! relay, so outbound messages carry only the text.

use crate::protocol::ClientMessage;
use derive_new::new;
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};

/// A chat line as distributed by the relay.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, new)]
#[serde(rename_all = "camelCase")]
pub struct ChatLine {
    /// Relay-assigned id of the sender.
    pub player_id: String,
    /// Message text, verbatim.
    pub message: String,
}

impl std::fmt::Display for ChatLine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.player_id, self.message)
    }
}

/// Received chat lines in arrival order. Unbounded, no de-duplication.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ChatLog {
    lines: Vec<String>,
}

impl ChatLog {
    /// Appends a received line.
    pub fn push(&mut self, line: &ChatLine) {
        self.lines.push(line.to_string());
    }

    /// Rendered lines, oldest first.
    pub fn lines(&self) -> &[String] {
        &self.lines
    }

    /// Number of lines received.
    pub fn len(&self) -> usize {
        self.lines.len()
    }

    /// Whether nothing has been received yet.
    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }
}

/// Builds the outbound chat message for `text`.
///
/// Returns `None` when the text is blank or there is no live transport.
#[instrument(skip(text), fields(len = text.len()))]
pub fn compose(text: &str, live: bool) -> Option<ClientMessage> {
    if text.trim().is_empty() {
        debug!("Ignoring blank chat message");
        return None;
    }
    if !live {
        debug!("Ignoring chat message without a live transport");
        return None;
    }
    Some(ClientMessage::Chat {
        message: text.to_string(),
    })
}
