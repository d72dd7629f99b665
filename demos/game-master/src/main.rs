//! Runs a Minima server and reads operator commands from stdin.
//!
//! Usage: `game-master [port] [max_connections]` (defaults 5000 and 20).
//! Set `RUST_LOG` to change log verbosity.

mod console;

use minima::prelude::*;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing_subscriber::EnvFilter;

use crate::console::{Command, HELP};

const DEFAULT_PORT: u16 = 5000;
const DEFAULT_MAX_CONNECTIONS: usize = 20;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    let mut args = std::env::args().skip(1);
    let port: u16 = match args.next() {
        Some(p) => p.parse()?,
        None => DEFAULT_PORT,
    };
    let max_connections: usize = match args.next() {
        Some(n) => n.parse()?,
        None => DEFAULT_MAX_CONNECTIONS,
    };

    let server = MinimaServer::builder()
        .bind(&format!("0.0.0.0:{port}"))
        .max_connections(max_connections)
        .build()
        .await?;
    let gm = server.game_master();
    eprintln!("minima listening on {}", server.local_addr()?);
    tokio::spawn(async move {
        if let Err(e) = server.run().await {
            tracing::error!(error = %e, "server stopped");
        }
    });

    eprintln!("{HELP}");
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await? {
        if line.trim().is_empty() {
            continue;
        }
        match line.parse::<Command>() {
            Ok(Command::Quit) => break,
            Ok(command) => {
                if let Err(e) = execute(&gm, command).await {
                    eprintln!("error: {e}");
                }
            }
            Err(e) => eprintln!("{e}"),
        }
    }
    Ok(())
}

async fn execute(gm: &GameMaster, command: Command) -> Result<(), Box<dyn std::error::Error>> {
    match command {
        Command::Start(settings) => {
            gm.start(settings).await?;
            println!("game started: {}", settings.setup());
        }
        Command::Advance => {
            gm.advance().await?;
            println!("{}", gm.status().await.phase);
        }
        Command::Reveal => gm.reveal().await?,
        Command::Finish => {
            let forced = gm.force_finish().await?;
            println!("forced {} player(s)", forced.len());
        }
        Command::Reset { keep } => gm.reset(!keep).await,
        Command::Players => {
            for p in gm.players().await {
                let name = p.name.as_deref().unwrap_or("-");
                let tag = if p.in_game { " (in game)" } else { "" };
                println!("{} {name}{tag}", p.player_id);
            }
        }
        Command::Status => println!("{}", serde_json::to_string_pretty(&gm.status().await)?),
        Command::Standings => println!("{}", serde_json::to_string_pretty(&gm.standings().await)?),
        Command::Minimum => match gm.current_minimum().await {
            Some(min) => println!("true minimum: f({}) = {:.6}", min.point, min.value),
            None => println!("no round in progress"),
        },
        Command::Help => println!("{HELP}"),
        Command::Quit => {}
    }
    Ok(())
}
