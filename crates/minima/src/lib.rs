//! # Minima
//!
//! Multiplayer function-minimization game server.
//!
//! Players connect over TCP, pick a username and join the lobby. The
//! operator starts a game; each round every player receives the seed of a
//! hidden landscape, explores it locally and reports the lowest value they
//! found. Lower scores earn more rank points.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use minima::prelude::*;
//!
//! # async fn demo() -> Result<(), MinimaError> {
//! let server = MinimaServer::builder().bind("0.0.0.0:5000").build().await?;
//! let gm = server.game_master();
//! tokio::spawn(server.run());
//!
//! // ... once players have sent GAME:
//! gm.start(GameSettings { rounds: 3, ..Default::default() }).await?;
//! # Ok(())
//! # }
//! ```

mod control;
mod error;
mod handler;
mod lobby;
mod server;

pub use control::GameMaster;
pub use error::MinimaError;
pub use lobby::{Lobby, PlayerInfo};
pub use server::{MinimaServer, MinimaServerBuilder, ServerConfig};

pub mod prelude {
    pub use crate::{GameMaster, MinimaError, MinimaServer, MinimaServerBuilder, ServerConfig};
    pub use minima_game::{GameError, GamePhase, GameSettings, GameStatus, Standings};
    pub use minima_landscape::{Difficulty, Dimension, Domain, HiddenFunction, Point};
    pub use minima_protocol::{ClientCommand, PlayerId, ServerMessage};
}
