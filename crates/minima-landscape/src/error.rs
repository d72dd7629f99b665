//! Error types for the landscape layer.

use crate::{Dimension, Domain};

/// Errors that can occur while building or probing a landscape.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum LandscapeError {
    /// A coordinate lies outside the function's domain.
    #[error("coordinate {value} is outside the domain {domain}")]
    OutOfDomain { value: f64, domain: Domain },

    /// The point has a different dimensionality than the function.
    #[error("expected a {expected} point, got a {actual} point")]
    DimensionMismatch {
        expected: Dimension,
        actual: Dimension,
    },

    /// Domain bounds are not finite or not strictly increasing.
    #[error("invalid domain: {0}")]
    InvalidDomain(String),

    /// Difficulty name is not one of the three presets.
    #[error("unknown difficulty: {0}")]
    UnknownDifficulty(String),

    /// Dimensionality other than 1 or 2.
    #[error("invalid dimension: {0}")]
    InvalidDimension(String),

    /// A point string that is neither `x` nor `x,y`.
    #[error("invalid point: {0}")]
    InvalidPoint(String),
}
