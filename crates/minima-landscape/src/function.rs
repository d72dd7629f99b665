//! The hidden objective function players try to minimize.

use serde::{Deserialize, Serialize};

use crate::search::global_minimum;
use crate::{Difficulty, Dimension, Domain, Landscape, LandscapeError, Minimum, Point};

/// One recorded probe of a hidden function.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Evaluation {
    pub point: Point,
    pub value: f64,
}

/// A seed-determined landscape with a precomputed true minimum.
///
/// The structure and true minimum are a pure function of
/// `(seed, difficulty, domain, dimension)`. The evaluation history is
/// bookkeeping for introspection only; scores never read it.
#[derive(Debug, Clone)]
pub struct HiddenFunction {
    seed: u64,
    difficulty: Difficulty,
    domain: Domain,
    landscape: Landscape,
    true_minimum: Minimum,
    history: Vec<Evaluation>,
    best: Option<Evaluation>,
}

impl HiddenFunction {
    /// Builds the function for the given inputs. Never fails.
    pub fn generate(seed: u64, difficulty: Difficulty, domain: Domain, dim: Dimension) -> Self {
        let landscape = Landscape::build(seed, difficulty, &domain, dim);
        let true_minimum = global_minimum(&landscape, &domain);
        tracing::debug!(
            seed,
            %difficulty,
            %domain,
            %dim,
            minimum = true_minimum.value,
            "hidden function generated"
        );
        Self {
            seed,
            difficulty,
            domain,
            landscape,
            true_minimum,
            history: Vec::new(),
            best: None,
        }
    }

    /// Evaluates at `point`, recording the probe and updating the running best.
    ///
    /// # Errors
    /// [`LandscapeError::DimensionMismatch`] or [`LandscapeError::OutOfDomain`].
    /// A failed call leaves history and best untouched.
    pub fn evaluate(&mut self, point: Point) -> Result<f64, LandscapeError> {
        let value = self.value_at(&point)?;
        let probe = Evaluation { point, value };
        self.history.push(probe);
        if self.best.is_none_or(|b| value < b.value) {
            self.best = Some(probe);
        }
        Ok(value)
    }

    /// Checked evaluation without any tracking.
    pub fn value_at(&self, point: &Point) -> Result<f64, LandscapeError> {
        self.check(point)?;
        Ok(self.landscape.value(point))
    }

    fn check(&self, point: &Point) -> Result<(), LandscapeError> {
        let expected = self.dimension();
        if point.dimension() != expected {
            return Err(LandscapeError::DimensionMismatch {
                expected,
                actual: point.dimension(),
            });
        }
        let coords: &[f64] = match point {
            Point::X(x) => &[*x],
            Point::XY(x, y) => &[*x, *y],
        };
        match coords.iter().find(|c| !self.domain.contains(**c)) {
            Some(&value) => Err(LandscapeError::OutOfDomain {
                value,
                domain: self.domain,
            }),
            None => Ok(()),
        }
    }

    /// Clears history and best, e.g. before handing the function to a new player.
    pub fn reset_history(&mut self) {
        self.history.clear();
        self.best = None;
    }

    pub fn seed(&self) -> u64 {
        self.seed
    }

    pub fn difficulty(&self) -> Difficulty {
        self.difficulty
    }

    pub fn domain(&self) -> Domain {
        self.domain
    }

    pub fn dimension(&self) -> Dimension {
        self.landscape.dimension()
    }

    /// Generated structure: base polynomial(s), noise terms, bumps.
    pub fn landscape(&self) -> &Landscape {
        &self.landscape
    }

    pub fn true_minimum(&self) -> Minimum {
        self.true_minimum
    }

    pub fn history(&self) -> &[Evaluation] {
        &self.history
    }

    pub fn eval_count(&self) -> usize {
        self.history.len()
    }

    /// Lowest value evaluated so far.
    pub fn best(&self) -> Option<Evaluation> {
        self.best
    }
}
