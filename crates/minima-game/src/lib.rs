//! Round orchestration for Minima.
//!
//! One [`GameSession`] owns the roster, the per-round hidden functions, the
//! submission map and the [`Leaderboard`]. Every transition is a plain
//! synchronous method that returns the messages it wants delivered as
//! [`Outbound`](minima_protocol::Outbound) values; the caller holds the
//! lock and hands delivery to per-connection queues.
//!
//! # Key types
//!
//! - [`GameSession`]: the round lifecycle state machine
//! - [`GamePhase`]: `WaitingForPlayers → InProgress → RoundComplete`
//! - [`GameSettings`]: parameters for one game
//! - [`Leaderboard`]: raw scores, rank points, frozen snapshot

mod config;
mod error;
mod game;
mod leaderboard;

pub use config::{GamePhase, GameSettings};
pub use error::GameError;
pub use game::{GameSession, GameStatus, RosterEntry, Standing, Standings};
pub use leaderboard::Leaderboard;
