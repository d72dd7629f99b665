//! Unified error type for the Minima server.

use minima_game::GameError;
use minima_landscape::LandscapeError;
use minima_protocol::ProtocolError;
use minima_session::SessionError;
use minima_transport::TransportError;

/// Top-level error that wraps all crate-specific errors.
///
/// The `#[from]` attribute on each variant lets `?` convert layer errors
/// automatically.
#[derive(Debug, thiserror::Error)]
pub enum MinimaError {
    /// Socket accept, read, or write failed.
    #[error(transparent)]
    Transport(#[from] TransportError),

    /// A line could not be decoded.
    #[error(transparent)]
    Protocol(#[from] ProtocolError),

    /// Registry refused a connection or a name.
    #[error(transparent)]
    Session(#[from] SessionError),

    /// A game transition was rejected.
    #[error(transparent)]
    Game(#[from] GameError),

    /// Bad domain, point, or difficulty.
    #[error(transparent)]
    Landscape(#[from] LandscapeError),
}
