//! The lobby: player registry and game session behind one lock.
//!
//! Every client command and every operator action runs as one synchronous
//! method on [`Lobby`] while the caller holds the server's mutex. Replies
//! and broadcasts are pushed onto bounded per-connection queues, never
//! written to sockets here, so holding the lock never waits on a slow
//! client. A player whose queue overflows is removed as if it had left.

use minima_game::{GameError, GameSession, GameSettings, GameStatus, Standings};
use minima_landscape::Minimum;
use minima_protocol::{ClientCommand, Outbound, PlayerId, ServerMessage};
use minima_session::{Outbox, PlayerRegistry, RegistryConfig, SessionError};
use serde::Serialize;

/// A connected player as listed for the operator.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PlayerInfo {
    pub player_id: PlayerId,
    pub name: Option<String>,
    pub in_game: bool,
}

/// All mutable server state.
#[derive(Debug)]
pub struct Lobby {
    registry: PlayerRegistry,
    game: GameSession,
}

impl Lobby {
    pub fn new(max_connections: usize, base_seed: Option<u64>) -> Self {
        Self {
            registry: PlayerRegistry::new(RegistryConfig { max_connections }),
            game: GameSession::new(base_seed),
        }
    }

    // -----------------------------------------------------------------------
    // Connection lifecycle
    // -----------------------------------------------------------------------

    /// Admits a new connection, subject to the connection cap.
    pub fn connect(&mut self, player: PlayerId, outbox: Outbox) -> Result<(), SessionError> {
        self.registry.connect(player, outbox)
    }

    /// Removes a departed player from the game and the registry.
    ///
    /// Other players are not told; a departure only shrinks the roster.
    pub fn disconnect(&mut self, player: PlayerId) {
        if self.game.remove_player(player) {
            tracing::info!(%player, phase = %self.game.phase(), "player removed from game");
        }
        if let Err(e) = self.registry.disconnect(player) {
            tracing::debug!(%player, error = %e, "disconnect of unknown session");
        }
    }

    // -----------------------------------------------------------------------
    // Client commands
    // -----------------------------------------------------------------------

    /// Applies one decoded client command and queues the replies.
    pub fn handle_command(&mut self, player: PlayerId, command: ClientCommand) {
        match command {
            ClientCommand::Username(name) => self.register(player, &name),
            ClientCommand::Game => match self.registry.name(player) {
                Some(name) => {
                    let name = name.to_string();
                    let out = self.game.join(player, &name);
                    self.deliver(out);
                }
                None => self.reply_error(player, GameError::NotRegistered(player).wire_reason()),
            },
            ClientCommand::Score { value, position } => {
                match self.game.submit_score(player, value, position) {
                    Ok(true) => {
                        tracing::info!(phase = %self.game.phase(), "all scores in");
                    }
                    Ok(false) => {}
                    Err(e) => {
                        tracing::warn!(%player, error = %e, "score rejected");
                        self.reply_error(player, e.wire_reason());
                    }
                }
            }
        }
    }

    fn register(&mut self, player: PlayerId, name: &str) {
        let reply = match self.registry.register_name(player, name) {
            Ok(_) => {
                self.game.rename(player, name);
                ServerMessage::UsernameOk
            }
            Err(SessionError::NameTaken(_)) => ServerMessage::UsernameTaken,
            Err(e) => {
                tracing::debug!(%player, error = %e, "username refused");
                ServerMessage::Error("invalid username".into())
            }
        };
        self.send(player, reply);
    }

    /// Queues `ERROR <reason>` for one player.
    pub fn reply_error(&mut self, player: PlayerId, reason: &str) {
        self.send(player, ServerMessage::Error(reason.to_string()));
    }

    fn send(&mut self, player: PlayerId, message: ServerMessage) {
        match self.registry.send(player, message) {
            Ok(()) => {}
            Err(SessionError::Overflow(_)) => self.drop_unresponsive(player),
            Err(e) => tracing::debug!(%player, error = %e, "reply dropped"),
        }
    }

    // -----------------------------------------------------------------------
    // Operator actions
    // -----------------------------------------------------------------------

    pub fn start(&mut self, settings: GameSettings) -> Result<(), GameError> {
        let out = self.game.start(settings)?;
        self.deliver(out);
        Ok(())
    }

    pub fn advance(&mut self) -> Result<(), GameError> {
        let out = self.game.advance()?;
        self.deliver(out);
        Ok(())
    }

    pub fn reveal(&mut self) -> Result<(), GameError> {
        let out = self.game.reveal()?;
        self.deliver(out);
        Ok(())
    }

    pub fn force_finish(&mut self) -> Result<Vec<PlayerId>, GameError> {
        self.game.force_finish()
    }

    pub fn reset(&mut self, kick: bool) {
        let out = self.game.reset(kick);
        self.deliver(out);
    }

    fn deliver(&mut self, out: Vec<Outbound>) {
        for player in self.registry.deliver(out) {
            self.drop_unresponsive(player);
        }
    }

    /// The connection's handler sees the overflow signal and closes the
    /// socket; the lobby forgets the player right away.
    fn drop_unresponsive(&mut self, player: PlayerId) {
        tracing::warn!(%player, "outbound queue full, dropping player");
        self.disconnect(player);
    }

    // -----------------------------------------------------------------------
    // Queries
    // -----------------------------------------------------------------------

    pub fn players(&self) -> Vec<PlayerInfo> {
        self.registry
            .player_ids()
            .into_iter()
            .map(|player_id| PlayerInfo {
                player_id,
                name: self.registry.name(player_id).map(str::to_string),
                in_game: self.game.contains(player_id),
            })
            .collect()
    }

    pub fn standings(&self) -> Standings {
        self.game.standings()
    }

    pub fn status(&self) -> GameStatus {
        self.game.status()
    }

    pub fn current_minimum(&self) -> Option<Minimum> {
        self.game.current_minimum()
    }

    pub fn game(&self) -> &GameSession {
        &self.game
    }

    pub fn connections(&self) -> usize {
        self.registry.len()
    }
}
