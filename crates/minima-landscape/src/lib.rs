//! Hidden objective landscapes for Minima.
//!
//! A landscape is fully determined by `(seed, difficulty, domain,
//! dimension)`. The server only ever ships the seed; clients rebuild the
//! same function locally with this crate.
//!
//! # Key types
//!
//! - [`HiddenFunction`]: a generated landscape plus its true minimum
//! - [`FunctionGenerator`]: one function per round, seeds derived on demand
//! - [`Difficulty`]: the three static presets
//! - [`Domain`], [`Point`], [`Dimension`]: geometry and wire formats

mod difficulty;
mod error;
mod function;
mod generator;
mod geometry;
mod rng;
pub mod search;
mod surface;

pub use difficulty::{Difficulty, Preset};
pub use error::LandscapeError;
pub use function::{Evaluation, HiddenFunction};
pub use generator::FunctionGenerator;
pub use geometry::{Dimension, Domain, Point};
pub use rng::SeedRng;
pub use search::Minimum;
pub use surface::{Bump, CrossWave, Landscape, Polynomial, Surface, Wave};
