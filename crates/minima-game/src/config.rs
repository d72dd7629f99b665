//! Game settings and the round state machine's phases.

use std::fmt;

use minima_landscape::{Difficulty, Dimension, Domain};
use minima_protocol::GameSetup;
use serde::{Deserialize, Serialize};

use crate::GameError;

// ---------------------------------------------------------------------------
// GameSettings
// ---------------------------------------------------------------------------

/// Parameters for one game, chosen by the operator at `start`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GameSettings {
    pub dim: Dimension,
    pub difficulty: Difficulty,
    /// Interval applied to every axis.
    pub domain: Domain,
    pub rounds: usize,
    /// Moves each player gets per round. Enforced client side.
    pub steps: u32,
    /// Radius revealed around a player's position. Rendering only.
    pub reveal_radius: f64,
}

impl Default for GameSettings {
    fn default() -> Self {
        Self {
            dim: Dimension::One,
            difficulty: Difficulty::Medium,
            domain: Domain::default(),
            rounds: 1,
            steps: 10,
            reveal_radius: 0.5,
        }
    }
}

impl GameSettings {
    pub fn validate(&self) -> Result<(), GameError> {
        if self.rounds == 0 {
            return Err(GameError::InvalidSettings("rounds must be at least 1".into()));
        }
        if self.steps == 0 {
            return Err(GameError::InvalidSettings("steps must be at least 1".into()));
        }
        if !(self.reveal_radius.is_finite() && self.reveal_radius > 0.0) {
            return Err(GameError::InvalidSettings(format!(
                "reveal radius must be positive, got {}",
                self.reveal_radius
            )));
        }
        Ok(())
    }

    /// The `GAME start` announcement for these settings.
    pub fn setup(&self) -> GameSetup {
        GameSetup {
            rounds: self.rounds,
            dim: self.dim,
            difficulty: self.difficulty,
            steps: self.steps,
            reveal_radius: self.reveal_radius,
            domain: self.domain,
        }
    }
}

// ---------------------------------------------------------------------------
// GamePhase
// ---------------------------------------------------------------------------

/// Where the session is in its lifecycle.
///
/// ```text
/// WaitingForPlayers → InProgress(0) → RoundComplete(0) → InProgress(1) → ...
///        ↑                                   │
///        └──── last advance(), reset(), or an empty roster
/// ```
///
/// A round never completes on a timer. It waits for every roster member
/// to submit, or for the operator to force it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "phase", rename_all = "snake_case")]
pub enum GamePhase {
    WaitingForPlayers,
    InProgress { round: usize },
    RoundComplete { round: usize },
}

impl GamePhase {
    /// Whether `GAME` adds new players to the roster.
    pub fn is_joinable(&self) -> bool {
        matches!(self, Self::WaitingForPlayers)
    }

    pub fn is_started(&self) -> bool {
        !self.is_joinable()
    }

    /// Current round index, if a game is running.
    pub fn round(&self) -> Option<usize> {
        match self {
            Self::WaitingForPlayers => None,
            Self::InProgress { round } | Self::RoundComplete { round } => Some(*round),
        }
    }
}

impl fmt::Display for GamePhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::WaitingForPlayers => write!(f, "waiting for players"),
            Self::InProgress { round } => write!(f, "round {round} in progress"),
            Self::RoundComplete { round } => write!(f, "round {round} complete"),
        }
    }
}
