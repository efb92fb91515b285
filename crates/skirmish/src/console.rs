//! Line-oriented console driver.
//!
//! Reads commands from an async line source, drives the synchronizer, and
//! writes the view after every command or inbound message.

use crate::sync::{Inbound, SessionSynchronizer};
use crate::transport::Connector;
use derive_more::{Display, Error};
use skirmish_core::{
    Event, GameSession, Position, RoomId, RoomIdError, ServerMessage, label, parse_label,
    reachable,
};
use std::io::Write;
use tokio::io::{AsyncBufRead, AsyncBufReadExt};
use tracing::{info, instrument, warn};

/// Rules shown by `help`.
pub const RULES: &str = "\
Player A starts on row A, player B on row E. Player A moves first.
Pawns (P1, P2, P3) step one cell up, down, left or right.
Hero1 (H1) jumps exactly two cells in a straight line.
Hero2 (H2) steps one cell diagonally.
Moving onto an opponent's character captures it.";

const COMMANDS: &str = "\
Commands:
  <cell>        select a character or move the selection, e.g. b3
  say <text>    send a chat message
  room <id>     join another room
  board         show the board
  history       show the move history
  chat          show the chat log
  help          show rules and commands
  quit          leave";

/// A parsed console command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Click a cell.
    Click(Position),
    /// Send a chat message, verbatim.
    Say(String),
    /// Switch rooms.
    Room(RoomId),
    /// Print the board.
    Board,
    /// Print the move history.
    History,
    /// Print the chat log.
    Chat,
    /// Print rules and commands.
    Help,
    /// Leave.
    Quit,
}

/// Why a line is not a command.
#[derive(Debug, Clone, PartialEq, Eq, Display, Error)]
pub enum CommandError {
    /// Not a command or a cell label.
    #[display("unknown command {_0:?} (type help)")]
    Unknown(#[error(not(source))] String),
    /// `room` with a bad id.
    #[display("{_0}")]
    BadRoom(RoomIdError),
    /// `room` without an id.
    #[display("room needs an id")]
    MissingRoom,
}

/// Parses one input line. Blank lines yield `Ok(None)`.
pub fn parse_command(line: &str) -> Result<Option<Command>, CommandError> {
    let trimmed = line.trim();
    if trimmed.is_empty() {
        return Ok(None);
    }
    let (word, rest) = match trimmed.split_once(char::is_whitespace) {
        Some((word, rest)) => (word, rest),
        None => (trimmed, ""),
    };
    let command = match word.to_ascii_lowercase().as_str() {
        "say" => {
            // Keep the text exactly as typed after the first separator.
            let start = line.find(word).map_or(0, |i| i + word.len() + 1);
            let text = line.get(start..).unwrap_or("").trim_end_matches(['\r', '\n']);
            Command::Say(text.to_string())
        }
        "room" => {
            if rest.trim().is_empty() {
                return Err(CommandError::MissingRoom);
            }
            Command::Room(rest.parse().map_err(CommandError::BadRoom)?)
        }
        "board" => Command::Board,
        "history" => Command::History,
        "chat" => Command::Chat,
        "help" | "?" => Command::Help,
        "quit" | "exit" => Command::Quit,
        _ => match parse_label(trimmed) {
            Some(position) => Command::Click(position),
            None => return Err(CommandError::Unknown(trimmed.to_string())),
        },
    };
    Ok(Some(command))
}

/// Board, turn, selection hint and notice.
pub fn render_view(session: &GameSession) -> String {
    let state = session.state();
    let mut out = format!("[{}]\n{}\n", session.status(), state.board());
    out.push_str(&format!("Player {} to move", state.current_player()));
    if let Some(selected) = session.selection() {
        if let Some(from) = state.board().find(selected) {
            let targets: Vec<String> = reachable(selected.kind(), from)
                .into_iter()
                .map(label)
                .collect();
            out.push_str(&format!(
                "\nSelected {selected} at {from}, reachable: {}",
                targets.join(" ")
            ));
        }
    }
    if let Some(notice) = state.notice() {
        out.push('\n');
        out.push_str(&notice.to_string());
    }
    out
}

/// Move history, one entry per line.
pub fn render_history(session: &GameSession) -> String {
    if session.history().is_empty() {
        return "No moves yet.".to_string();
    }
    session.history().lines().join("\n")
}

/// Chat log, one line per message.
pub fn render_chat(session: &GameSession) -> String {
    if session.state().chat().is_empty() {
        return "No chat yet.".to_string();
    }
    session.state().chat().lines().join("\n")
}

/// Runs the console until `quit`, end of input or an unrecoverable I/O error.
///
/// The transport is closed on every exit path.
#[instrument(skip_all)]
pub async fn run<C, R, W>(
    sync: &mut SessionSynchronizer<C>,
    input: R,
    out: &mut W,
) -> anyhow::Result<()>
where
    C: Connector,
    R: AsyncBufRead + Unpin,
    W: Write,
{
    let result = drive(sync, input, out).await;
    sync.close().await;
    info!("Console session ended");
    result
}

async fn drive<C, R, W>(sync: &mut SessionSynchronizer<C>, input: R, out: &mut W) -> anyhow::Result<()>
where
    C: Connector,
    R: AsyncBufRead + Unpin,
    W: Write,
{
    let mut lines = input.lines();
    writeln!(out, "{}", render_view(sync.session()))?;
    loop {
        tokio::select! {
            line = lines.next_line() => {
                let Some(line) = line? else {
                    return Ok(());
                };
                match parse_command(&line) {
                    Ok(None) => {}
                    Ok(Some(Command::Quit)) => return Ok(()),
                    Ok(Some(command)) => execute(sync, command, out).await?,
                    Err(err) => writeln!(out, "{err}")?,
                }
            }
            frame = sync.next_frame() => {
                match sync.receive(frame) {
                    Inbound::Applied(ServerMessage::Chat(line)) => writeln!(out, "{line}")?,
                    Inbound::Applied(_) => writeln!(out, "{}", render_view(sync.session()))?,
                    Inbound::Dropped => {}
                    Inbound::Disconnected => {
                        writeln!(out, "{}", render_view(sync.session()))?;
                        writeln!(out, "Disconnected. Use `room <id>` to join again.")?;
                    }
                }
            }
        }
        out.flush()?;
    }
}

async fn execute<C, W>(sync: &mut SessionSynchronizer<C>, command: Command, out: &mut W) -> anyhow::Result<()>
where
    C: Connector,
    W: Write,
{
    match command {
        Command::Click(position) => {
            sync.dispatch(Event::LocalClick(position)).await;
            writeln!(out, "{}", render_view(sync.session()))?;
        }
        Command::Say(text) => {
            if !sync.session().status().is_live() {
                writeln!(out, "Not connected, message not sent.")?;
            }
            sync.dispatch(Event::ChatSubmitted(text)).await;
        }
        Command::Room(room) => {
            if let Err(err) = sync.bind_room(room.clone()).await {
                warn!(room_id = %room, error = %err, "Could not join room");
            }
            writeln!(out, "{}", render_view(sync.session()))?;
        }
        Command::Board => writeln!(out, "{}", render_view(sync.session()))?,
        Command::History => writeln!(out, "{}", render_history(sync.session()))?,
        Command::Chat => writeln!(out, "{}", render_chat(sync.session()))?,
        Command::Help => writeln!(out, "{RULES}\n\n{COMMANDS}")?,
        Command::Quit => {}
    }
    Ok(())
}
