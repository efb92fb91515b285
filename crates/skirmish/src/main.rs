//! Skirmish - unified CLI
//!
//! `skirmish relay` runs the room relay, `skirmish play` the console client.

#![warn(missing_docs)]

mod cli;

use anyhow::{Context, Result};
use clap::Parser;
use cli::{Cli, Command};
use skirmish::{ClientConfig, SessionSynchronizer, WsConnector, generate_room_id, run_console};
use skirmish_core::RoomId;
use skirmish_relay::{RelayConfig, RelayServer};
use std::path::PathBuf;
use tracing::{info, instrument};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    let cli = Cli::parse();

    match cli.command {
        Command::Relay { host, port } => run_relay(cli.config, host, port).await,
        Command::Play {
            relay,
            room,
            create,
            no_verify,
        } => run_play(cli.config, relay, room, create, no_verify).await,
    }
}

/// Installs a stderr subscriber, honouring `RUST_LOG` over `default`.
fn init_tracing(default: &str) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

/// Run the room relay until Ctrl-C.
#[instrument(skip_all)]
async fn run_relay(config: Option<PathBuf>, host: Option<String>, port: Option<u16>) -> Result<()> {
    init_tracing("info,skirmish=debug");

    let mut relay_config = match config {
        Some(path) => RelayConfig::from_file(&path)
            .with_context(|| format!("loading relay config {}", path.display()))?,
        None => RelayConfig::default(),
    };
    if let Some(host) = host {
        relay_config = relay_config.with_host(host);
    }
    if let Some(port) = port {
        relay_config = relay_config.with_port(port);
    }

    let server = RelayServer::bind(&relay_config)
        .await
        .with_context(|| format!("binding {}", relay_config.bind_addr()))?;
    info!(addr = %server.local_addr()?, "Relay ready, clients join with ?roomId=<id>");

    server
        .run_until(async {
            let _ = tokio::signal::ctrl_c().await;
            info!("Shutting down relay");
        })
        .await?;
    Ok(())
}

/// Run the console client.
#[instrument(skip_all)]
async fn run_play(
    config: Option<PathBuf>,
    relay: Option<String>,
    room: Option<String>,
    create: bool,
    no_verify: bool,
) -> Result<()> {
    init_tracing("warn");

    let mut client_config = match config {
        Some(path) => ClientConfig::from_file(&path)
            .with_context(|| format!("loading client config {}", path.display()))?,
        None => ClientConfig::default(),
    };
    if let Some(relay) = relay {
        client_config = client_config.with_relay_url(relay)?;
    }
    if no_verify {
        client_config = client_config.with_verify_remote_moves(false);
    }

    let room: Option<RoomId> = match (room, create) {
        (Some(room), _) => Some(room.parse::<RoomId>().context("invalid --room")?),
        (None, true) => Some(generate_room_id()),
        (None, false) => None,
    };

    let connector = WsConnector::new(client_config.relay_url().clone());
    let mut sync = SessionSynchronizer::new(connector, *client_config.verify_remote_moves());

    println!("{}\n", skirmish::RULES);
    match room {
        Some(room) => {
            println!("Room {room}. Share this id with your opponent.");
            sync.bind_room(room)
                .await
                .with_context(|| format!("connecting to {}", client_config.relay_url()))?;
        }
        None => println!("No room yet. Type `room <id>` to join one."),
    }

    let stdin = tokio::io::BufReader::new(tokio::io::stdin());
    run_console(&mut sync, stdin, &mut std::io::stdout()).await
}
