//! Error types for the game layer.

use minima_landscape::Dimension;
use minima_protocol::PlayerId;

use crate::GamePhase;

/// Errors from game-session transitions.
///
/// None of these are fatal: the session is left exactly as it was.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum GameError {
    /// The operation is not allowed in the current phase.
    #[error("cannot {operation} while {phase}")]
    InvalidState {
        operation: &'static str,
        phase: GamePhase,
    },

    /// `start` was called with nobody on the roster.
    #[error("cannot start a game with an empty roster")]
    EmptyRoster,

    /// The player is not on the roster of the running game.
    #[error("player {0} is not in the game")]
    NotInGame(PlayerId),

    /// The player has not registered a username yet.
    #[error("player {0} has no username")]
    NotRegistered(PlayerId),

    /// Game settings failed validation.
    #[error("invalid game settings: {0}")]
    InvalidSettings(String),

    /// A submitted position has the wrong number of coordinates.
    #[error("position is {actual}D but the game is {expected}D")]
    PositionMismatch {
        expected: Dimension,
        actual: Dimension,
    },
}

impl GameError {
    /// Short reason sent back to a client as `ERROR <reason>`.
    pub fn wire_reason(&self) -> &'static str {
        match self {
            Self::InvalidState {
                phase: GamePhase::WaitingForPlayers,
                ..
            } => "game not started",
            Self::InvalidState { .. } => "invalid state",
            Self::EmptyRoster => "empty roster",
            Self::NotInGame(_) => "not in game",
            Self::NotRegistered(_) => "username required",
            Self::InvalidSettings(_) => "invalid settings",
            Self::PositionMismatch { .. } => "invalid position",
        }
    }
}
