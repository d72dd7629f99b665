//! Produces the sequence of hidden functions for a game.

use crate::{Difficulty, Dimension, Domain, HiddenFunction, SeedRng};

/// Round seeds are drawn from `[0, 2^31)`.
const SEED_BITS: u32 = 31;

/// Generates one [`HiddenFunction`] per round.
///
/// Round seeds come from an internal deterministic stream, so a generator
/// built with an explicit base seed reproduces a whole game.
#[derive(Debug, Clone)]
pub struct FunctionGenerator {
    dim: Dimension,
    difficulty: Difficulty,
    domain: Domain,
    base_seed: u64,
    rng: SeedRng,
}

impl FunctionGenerator {
    /// Creates a generator. `None` draws the base seed from OS entropy.
    pub fn new(
        dim: Dimension,
        difficulty: Difficulty,
        domain: Domain,
        base_seed: Option<u64>,
    ) -> Self {
        let base_seed = base_seed.unwrap_or_else(rand::random);
        tracing::debug!(base_seed, %dim, %difficulty, "function generator ready");
        Self {
            dim,
            difficulty,
            domain,
            base_seed,
            rng: SeedRng::new(base_seed),
        }
    }

    /// Next derived round seed.
    pub fn next_seed(&mut self) -> u64 {
        self.rng.next_u64() >> (64 - SEED_BITS)
    }

    /// Builds a function from `seed`, or from the next derived seed.
    pub fn generate(&mut self, seed: Option<u64>) -> HiddenFunction {
        let seed = seed.unwrap_or_else(|| self.next_seed());
        HiddenFunction::generate(seed, self.difficulty, self.domain, self.dim)
    }

    /// `rounds` functions with derived seeds.
    pub fn generate_rounds(&mut self, rounds: usize) -> Vec<HiddenFunction> {
        (0..rounds).map(|_| self.generate(None)).collect()
    }

    pub fn base_seed(&self) -> u64 {
        self.base_seed
    }

    pub fn dimension(&self) -> Dimension {
        self.dim
    }

    pub fn difficulty(&self) -> Difficulty {
        self.difficulty
    }

    pub fn domain(&self) -> Domain {
        self.domain
    }
}
