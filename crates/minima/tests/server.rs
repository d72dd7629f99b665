//! End-to-end tests: a real server on a loopback port, raw TCP clients.

use std::time::Duration;

use minima::prelude::*;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader, Lines};
use tokio::net::TcpStream;
use tokio::net::tcp::{OwnedReadHalf, OwnedWriteHalf};

const TIMEOUT: Duration = Duration::from_secs(5);

// =========================================================================
// Helpers
// =========================================================================

struct Client {
    lines: Lines<BufReader<OwnedReadHalf>>,
    writer: OwnedWriteHalf,
}

impl Client {
    async fn connect(addr: &str) -> Self {
        let stream = TcpStream::connect(addr).await.expect("connect");
        let (read, writer) = stream.into_split();
        Self {
            lines: BufReader::new(read).lines(),
            writer,
        }
    }

    async fn send(&mut self, line: &str) {
        self.writer.write_all(line.as_bytes()).await.expect("write");
        self.writer.write_all(b"\n").await.expect("write");
    }

    async fn recv(&mut self) -> Option<String> {
        tokio::time::timeout(TIMEOUT, self.lines.next_line())
            .await
            .expect("timed out waiting for a line")
            .expect("read")
    }

    async fn expect(&mut self, line: &str) {
        assert_eq!(self.recv().await.as_deref(), Some(line));
    }

    /// Registers a name and joins the lobby.
    async fn enter(addr: &str, name: &str) -> Self {
        let mut client = Self::connect(addr).await;
        client.send(&format!("USERNAME {name}")).await;
        client.expect("USERNAME ok").await;
        client.send("GAME").await;
        client.expect("GAME ok").await;
        client
    }
}

async fn start_server(max_connections: usize) -> (String, GameMaster) {
    let server = MinimaServer::builder()
        .bind("127.0.0.1:0")
        .max_connections(max_connections)
        .base_seed(42)
        .build()
        .await
        .expect("build");
    let addr = server.local_addr().expect("addr").to_string();
    let gm = server.game_master();
    tokio::spawn(server.run());
    (addr, gm)
}

/// Polls until the game reaches `phase`.
async fn wait_for_phase(gm: &GameMaster, phase: GamePhase) {
    let deadline = tokio::time::Instant::now() + TIMEOUT;
    while gm.status().await.phase != phase {
        assert!(tokio::time::Instant::now() < deadline, "never reached {phase}");
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
}

fn easy(rounds: usize) -> GameSettings {
    GameSettings {
        difficulty: Difficulty::Easy,
        rounds,
        ..Default::default()
    }
}

// =========================================================================
// Protocol errors and registration
// =========================================================================

#[tokio::test]
async fn test_username_registration() {
    let (addr, _gm) = start_server(8).await;
    let mut alice = Client::connect(&addr).await;
    let mut other = Client::connect(&addr).await;

    alice.send("USERNAME alice").await;
    alice.expect("USERNAME ok").await;
    other.send("USERNAME alice").await;
    other.expect("USERNAME taken").await;
    other.send("USERNAME bob").await;
    other.expect("USERNAME ok").await;
}

#[tokio::test]
async fn test_malformed_lines_get_errors_and_keep_connection() {
    let (addr, _gm) = start_server(8).await;
    let mut client = Client::connect(&addr).await;

    client.send("DANCE").await;
    client.expect("ERROR unknown").await;
    client.send("GAME").await;
    client.expect("ERROR username required").await;
    client.send("SCORE abc").await;
    client.expect("ERROR invalid score").await;
    client.send("SCORE 1.5").await;
    client.expect("ERROR game not started").await;

    client.send("USERNAME still_here").await;
    client.expect("USERNAME ok").await;
}

#[tokio::test]
async fn test_legacy_quoted_lines_are_accepted() {
    let (addr, _gm) = start_server(8).await;
    let mut client = Client::connect(&addr).await;
    client.send("C\"USERNAME carol\"").await;
    client.expect("USERNAME ok").await;
    client.send("\"GAME\"").await;
    client.expect("GAME ok").await;
}

#[tokio::test]
async fn test_connection_cap() {
    let (addr, gm) = start_server(1).await;
    let _first = Client::enter(&addr, "first").await;

    let mut second = Client::connect(&addr).await;
    second.expect("ERROR server full").await;
    assert_eq!(second.recv().await, None);
    assert_eq!(gm.players().await.len(), 1);
}

#[tokio::test]
async fn test_long_line_gets_error_and_connection_survives() {
    let server = MinimaServer::builder()
        .bind("127.0.0.1:0")
        .max_line(64)
        .build()
        .await
        .expect("build");
    let addr = server.local_addr().expect("addr").to_string();
    tokio::spawn(server.run());

    let mut client = Client::connect(&addr).await;
    client.send(&format!("USERNAME {}", "x".repeat(500))).await;
    client.expect("ERROR line too long").await;
    client.send("USERNAME dave").await;
    client.expect("USERNAME ok").await;
}

#[tokio::test]
async fn test_client_that_never_reads_is_dropped() {
    let (addr, gm) = start_server(8).await;
    let mut stream = TcpStream::connect(&addr).await.expect("connect");
    let deadline = tokio::time::Instant::now() + TIMEOUT;
    while gm.players().await.is_empty() {
        assert!(tokio::time::Instant::now() < deadline, "never admitted");
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    let chunk = "DANCE\n".repeat(1000);

    // Every line earns an `ERROR unknown` reply that is never read. Once
    // the socket buffers and the outbound queue fill, the server hangs up.
    let flood = async {
        loop {
            if stream.write_all(chunk.as_bytes()).await.is_err() {
                break;
            }
            if gm.players().await.is_empty() {
                break;
            }
        }
    };
    tokio::time::timeout(Duration::from_secs(60), flood)
        .await
        .expect("server never dropped the client");
    assert!(gm.players().await.is_empty());
}

// =========================================================================
// Game flow
// =========================================================================

#[tokio::test]
async fn test_full_two_round_game() {
    let (addr, gm) = start_server(8).await;
    let mut alice = Client::enter(&addr, "alice").await;
    let mut bob = Client::enter(&addr, "bob").await;

    gm.start(easy(2)).await.unwrap();
    let seed = gm.status().await.seed.unwrap();
    for client in [&mut alice, &mut bob] {
        client.expect("GAME start 2 1 easy 10 0.5 (-6, 6)").await;
        client.expect(&format!("FUNC {seed}")).await;
    }

    // Late joiners are turned away while the game runs.
    let mut late = Client::connect(&addr).await;
    late.send("USERNAME late").await;
    late.expect("USERNAME ok").await;
    late.send("GAME").await;
    late.expect("GAME unavailable").await;

    alice.send("SCORE -1.5 0.25").await;
    bob.send("SCORE 2 -3").await;
    wait_for_phase(&gm, GamePhase::RoundComplete { round: 0 }).await;

    gm.reveal().await.unwrap();
    for client in [&mut alice, &mut bob] {
        client.expect("REVEAL alice|0.25|-1.500000 bob|-3|2.000000").await;
    }

    gm.advance().await.unwrap();
    let next_seed = gm.status().await.seed.unwrap();
    for client in [&mut alice, &mut bob] {
        client.expect(&format!("FUNC {next_seed}")).await;
    }

    alice.send("SCORE 3").await;
    bob.send("SCORE 1").await;
    wait_for_phase(&gm, GamePhase::RoundComplete { round: 1 }).await;

    gm.advance().await.unwrap();
    for client in [&mut alice, &mut bob] {
        client.expect("GAME over").await;
    }

    let standings = gm.standings().await;
    assert!(standings.frozen);
    let totals: Vec<(String, u32)> = standings
        .entries
        .iter()
        .map(|s| (s.name.clone(), s.total))
        .collect();
    assert_eq!(totals, vec![("alice".to_string(), 3), ("bob".to_string(), 3)]);
}

#[tokio::test]
async fn test_seed_rebuilds_same_function_on_client() {
    let (addr, gm) = start_server(8).await;
    let mut alice = Client::enter(&addr, "alice").await;

    gm.start(easy(1)).await.unwrap();
    alice.recv().await;
    let line = alice.recv().await.unwrap();
    let seed: u64 = line.strip_prefix("FUNC ").unwrap().parse().unwrap();

    let local = HiddenFunction::generate(seed, Difficulty::Easy, Domain::default(), Dimension::One);
    assert_eq!(Some(local.true_minimum()), gm.current_minimum().await);
}

#[tokio::test]
async fn test_resume_after_game_command() {
    let (addr, gm) = start_server(8).await;
    let mut alice = Client::enter(&addr, "alice").await;
    gm.start(easy(1)).await.unwrap();
    alice.recv().await;
    let func = alice.recv().await.unwrap();

    alice.send("GAME").await;
    alice.expect("GAME start 1 1 easy 10 0.5 (-6, 6)").await;
    alice.expect(&func).await;
}

#[tokio::test]
async fn test_disconnect_mid_round_completes_it() {
    let (addr, gm) = start_server(8).await;
    let mut a = Client::enter(&addr, "a").await;
    let mut b = Client::enter(&addr, "b").await;
    let c = Client::enter(&addr, "c").await;

    gm.start(easy(1)).await.unwrap();
    a.send("SCORE 1").await;
    b.send("SCORE 2").await;
    // Make sure both scores are in before the third player leaves.
    let deadline = tokio::time::Instant::now() + TIMEOUT;
    while gm.status().await.roster.iter().filter(|r| r.submitted).count() < 2 {
        assert!(tokio::time::Instant::now() < deadline);
        tokio::time::sleep(Duration::from_millis(10)).await;
    }

    drop(c);
    wait_for_phase(&gm, GamePhase::RoundComplete { round: 0 }).await;
    assert_eq!(gm.status().await.roster.len(), 2);
}

#[tokio::test]
async fn test_force_finish_and_reset() {
    let (addr, gm) = start_server(8).await;
    let mut a = Client::enter(&addr, "a").await;
    let _b = Client::enter(&addr, "b").await;

    gm.start(easy(3)).await.unwrap();
    a.recv().await;
    a.recv().await;
    a.send("SCORE 0.5").await;
    let deadline = tokio::time::Instant::now() + TIMEOUT;
    while !gm.status().await.roster[0].submitted {
        assert!(tokio::time::Instant::now() < deadline);
        tokio::time::sleep(Duration::from_millis(10)).await;
    }

    let forced = gm.force_finish().await.unwrap();
    assert_eq!(forced.len(), 1);
    assert_eq!(gm.status().await.phase, GamePhase::RoundComplete { round: 0 });

    gm.reset(false).await;
    a.expect("GAME over").await;
    let status = gm.status().await;
    assert_eq!(status.phase, GamePhase::WaitingForPlayers);
    assert_eq!(status.roster.len(), 2);
    assert!(gm.standings().await.frozen);
}

#[tokio::test]
async fn test_start_with_empty_roster_fails() {
    let (_addr, gm) = start_server(8).await;
    let err = gm.start(GameSettings::default()).await.unwrap_err();
    assert!(matches!(err, MinimaError::Game(GameError::EmptyRoster)));
}
