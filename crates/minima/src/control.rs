//! The operator's control surface.
//!
//! [`GameMaster`] takes the same lobby lock as the connection handlers, so
//! an operator action never interleaves with a half-applied client command.

use std::sync::Arc;

use minima_game::{GameSettings, GameStatus, Standings};
use minima_landscape::Minimum;
use minima_protocol::PlayerId;
use tokio::sync::Mutex;

use crate::{Lobby, MinimaError, PlayerInfo};

/// Cloneable handle for privileged game operations.
#[derive(Clone)]
pub struct GameMaster {
    lobby: Arc<Mutex<Lobby>>,
}

impl GameMaster {
    pub(crate) fn new(lobby: Arc<Mutex<Lobby>>) -> Self {
        Self { lobby }
    }

    /// Starts a game for everyone who has sent `GAME`.
    pub async fn start(&self, settings: GameSettings) -> Result<(), MinimaError> {
        Ok(self.lobby.lock().await.start(settings)?)
    }

    /// Moves to the next round, or ends the game after the last one.
    pub async fn advance(&self) -> Result<(), MinimaError> {
        Ok(self.lobby.lock().await.advance()?)
    }

    /// Shows every player's final position and score for the round.
    pub async fn reveal(&self) -> Result<(), MinimaError> {
        Ok(self.lobby.lock().await.reveal()?)
    }

    /// Completes the round for players who have not submitted.
    pub async fn force_finish(&self) -> Result<Vec<PlayerId>, MinimaError> {
        Ok(self.lobby.lock().await.force_finish()?)
    }

    /// Ends any running game. `kick` also empties the roster.
    pub async fn reset(&self, kick: bool) {
        self.lobby.lock().await.reset(kick);
    }

    pub async fn players(&self) -> Vec<PlayerInfo> {
        self.lobby.lock().await.players()
    }

    pub async fn standings(&self) -> Standings {
        self.lobby.lock().await.standings()
    }

    pub async fn status(&self) -> GameStatus {
        self.lobby.lock().await.status()
    }

    /// True minimum of the current round. Never sent to players.
    pub async fn current_minimum(&self) -> Option<Minimum> {
        self.lobby.lock().await.current_minimum()
    }
}
