//! Error types for the session layer.

use minima_protocol::PlayerId;

/// Errors that can occur while tracking connected players.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum SessionError {
    /// Another connected player already uses this name.
    #[error("username {0:?} is already taken")]
    NameTaken(String),

    /// The name is empty, too long, or contains a reserved character.
    #[error("invalid username {0:?}")]
    InvalidName(String),

    /// No session exists for the given player.
    #[error("session not found for player {0}")]
    NotFound(PlayerId),

    /// The player already has a session.
    #[error("player {0} already has an active session")]
    AlreadyConnected(PlayerId),

    /// The player's outbound queue is full; the message was dropped.
    #[error("outbound queue full for player {0}")]
    Overflow(PlayerId),

    /// The player's outbound queue has no receiver any more.
    #[error("outbound queue closed for player {0}")]
    Closed(PlayerId),

    /// The server is at its connection limit.
    #[error("server full ({0} connections)")]
    Full(usize),
}
