//! Landscape building blocks and the seeded construction procedure.
//!
//! A landscape is a normalized even-degree polynomial base (one per axis in
//! 2D, summed), plus oscillating noise terms, plus signed Gaussian bumps.

use std::f64::consts::TAU;

use crate::{Difficulty, Dimension, Domain, Point, Preset, SeedRng};

/// Target value span of each normalized base polynomial.
const POLY_SPAN: f64 = 10.0;
/// Samples used to measure the polynomial span.
const SPAN_SAMPLES: usize = 1000;
/// Gaussian bump width range, in domain units.
const BUMP_WIDTH: (f64, f64) = (0.3, 1.5);

// ---------------------------------------------------------------------------
// Polynomial
// ---------------------------------------------------------------------------

/// Polynomial stored highest-degree coefficient first.
#[derive(Debug, Clone, PartialEq)]
pub struct Polynomial {
    coeffs: Vec<f64>,
}

impl Polynomial {
    /// Monic polynomial `(x - r0)(x - r1)...`.
    pub fn from_roots(roots: &[f64]) -> Self {
        let mut coeffs = vec![1.0];
        for &r in roots {
            let mut next = vec![0.0; coeffs.len() + 1];
            for (i, c) in coeffs.iter().enumerate() {
                next[i] += c;
                next[i + 1] -= c * r;
            }
            coeffs = next;
        }
        Self { coeffs }
    }

    /// Horner evaluation.
    pub fn eval(&self, x: f64) -> f64 {
        self.coeffs.iter().fold(0.0, |acc, c| acc * x + c)
    }

    pub fn degree(&self) -> usize {
        self.coeffs.len().saturating_sub(1)
    }

    pub fn coefficients(&self) -> &[f64] {
        &self.coeffs
    }

    fn scale(&mut self, factor: f64) {
        for c in &mut self.coeffs {
            *c *= factor;
        }
    }
}

// ---------------------------------------------------------------------------
// Noise and bumps
// ---------------------------------------------------------------------------

/// `amplitude * cos(frequency * x + phase)`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Wave {
    pub amplitude: f64,
    pub frequency: f64,
    pub phase: f64,
}

impl Wave {
    pub fn eval(&self, x: f64) -> f64 {
        self.amplitude * (self.frequency * x + self.phase).cos()
    }
}

/// Product of two independent cosines, one per axis. Produces grid-like
/// ridges with many local minima.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CrossWave {
    pub amplitude: f64,
    pub frequency_x: f64,
    pub phase_x: f64,
    pub frequency_y: f64,
    pub phase_y: f64,
}

impl CrossWave {
    pub fn eval(&self, x: f64, y: f64) -> f64 {
        self.amplitude
            * (self.frequency_x * x + self.phase_x).cos()
            * (self.frequency_y * y + self.phase_y).cos()
    }
}

/// Signed Gaussian. Negative amplitude digs a pit, positive raises a hill.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bump {
    pub amplitude: f64,
    pub center: Point,
    pub width: f64,
}

impl Bump {
    pub fn eval(&self, at: &Point) -> f64 {
        let d2 = at.distance_sq(&self.center);
        self.amplitude * (-d2 / (2.0 * self.width * self.width)).exp()
    }
}

// ---------------------------------------------------------------------------
// Landscape
// ---------------------------------------------------------------------------

/// Base curve or surface plus its noise terms.
#[derive(Debug, Clone, PartialEq)]
pub enum Surface {
    Curve {
        poly: Polynomial,
        waves: Vec<Wave>,
    },
    Field {
        poly_x: Polynomial,
        poly_y: Polynomial,
        waves: Vec<CrossWave>,
    },
}

/// The complete generated structure of a hidden function.
#[derive(Debug, Clone, PartialEq)]
pub struct Landscape {
    pub surface: Surface,
    pub bumps: Vec<Bump>,
}

impl Landscape {
    /// Builds the landscape for `(seed, difficulty, domain, dim)`.
    ///
    /// The draw order is part of the format: changing it changes every
    /// landscape a seed produces.
    pub fn build(
        seed: u64,
        difficulty: Difficulty,
        domain: &Domain,
        dim: Dimension,
    ) -> Self {
        let preset = difficulty.preset();
        let mut rng = SeedRng::new(seed);

        let surface = match dim {
            Dimension::One => {
                let poly = base_polynomial(&mut rng, preset, domain);
                let count = rng.int_inclusive(preset.noise_count.0, preset.noise_count.1);
                let waves = (0..count).map(|_| draw_wave(&mut rng, preset)).collect();
                Surface::Curve { poly, waves }
            }
            Dimension::Two => {
                let poly_x = base_polynomial(&mut rng, preset, domain);
                let poly_y = base_polynomial(&mut rng, preset, domain);
                let count = rng.int_inclusive(preset.noise_count.0, preset.noise_count.1);
                let waves = (0..count)
                    .map(|_| {
                        let x = draw_wave(&mut rng, preset);
                        let (frequency_y, phase_y) = draw_frequency_phase(&mut rng, preset);
                        CrossWave {
                            amplitude: x.amplitude,
                            frequency_x: x.frequency,
                            phase_x: x.phase,
                            frequency_y,
                            phase_y,
                        }
                    })
                    .collect();
                Surface::Field { poly_x, poly_y, waves }
            }
        };

        let count = rng.int_inclusive(preset.bump_count.0, preset.bump_count.1);
        let bumps = (0..count)
            .map(|_| draw_bump(&mut rng, preset, domain, dim))
            .collect();

        Self { surface, bumps }
    }

    pub fn dimension(&self) -> Dimension {
        match self.surface {
            Surface::Curve { .. } => Dimension::One,
            Surface::Field { .. } => Dimension::Two,
        }
    }

    /// Raw value at `at`. No domain check; a 1D landscape reads only `x`.
    pub fn value(&self, at: &Point) -> f64 {
        let base = match (&self.surface, at) {
            (Surface::Curve { poly, waves }, p) => {
                let x = p.x();
                poly.eval(x) + waves.iter().map(|w| w.eval(x)).sum::<f64>()
            }
            (Surface::Field { poly_x, poly_y, waves }, Point::XY(x, y)) => {
                poly_x.eval(*x)
                    + poly_y.eval(*y)
                    + waves.iter().map(|w| w.eval(*x, *y)).sum::<f64>()
            }
            (Surface::Field { poly_x, poly_y, waves }, Point::X(x)) => {
                poly_x.eval(*x)
                    + poly_y.eval(0.0)
                    + waves.iter().map(|w| w.eval(*x, 0.0)).sum::<f64>()
            }
        };
        base + self.bumps.iter().map(|b| b.eval(at)).sum::<f64>()
    }
}

fn base_polynomial(rng: &mut SeedRng, preset: &Preset, domain: &Domain) -> Polynomial {
    let degrees = preset.even_degrees();
    let degree = rng.choose(&degrees).copied().unwrap_or(preset.degree.0);
    let roots: Vec<f64> = (0..degree)
        .map(|_| rng.uniform(domain.lo(), domain.hi()))
        .collect();

    let mut poly = Polynomial::from_roots(&roots);
    let (min, max) = domain
        .linspace(SPAN_SAMPLES)
        .into_iter()
        .map(|x| poly.eval(x))
        .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), y| (lo.min(y), hi.max(y)));
    let span = max - min;
    if span > 0.0 {
        poly.scale(POLY_SPAN / span);
    }
    poly.scale(1.0 / preset.poly_scale);
    poly
}

fn draw_frequency_phase(rng: &mut SeedRng, preset: &Preset) -> (f64, f64) {
    let frequency = rng.uniform(preset.noise_frequency.0, preset.noise_frequency.1);
    let phase = rng.uniform(0.0, TAU);
    (frequency, phase)
}

fn draw_wave(rng: &mut SeedRng, preset: &Preset) -> Wave {
    let amplitude = rng.uniform(preset.noise_amplitude.0, preset.noise_amplitude.1);
    let (frequency, phase) = draw_frequency_phase(rng, preset);
    Wave { amplitude, frequency, phase }
}

fn draw_bump(rng: &mut SeedRng, preset: &Preset, domain: &Domain, dim: Dimension) -> Bump {
    let magnitude = rng.uniform(preset.bump_amplitude.0, preset.bump_amplitude.1);
    let sign = rng.sign();
    let center = match dim {
        Dimension::One => Point::X(rng.uniform(domain.lo(), domain.hi())),
        Dimension::Two => {
            let x = rng.uniform(domain.lo(), domain.hi());
            let y = rng.uniform(domain.lo(), domain.hi());
            Point::XY(x, y)
        }
    };
    let width = rng.uniform(BUMP_WIDTH.0, BUMP_WIDTH.1);
    Bump {
        amplitude: sign * magnitude,
        center,
        width,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_roots_expands_product() {
        // (x - 1)(x + 2) = x^2 + x - 2
        let p = Polynomial::from_roots(&[1.0, -2.0]);
        assert_eq!(p.coefficients(), &[1.0, 1.0, -2.0]);
        assert_eq!(p.eval(1.0), 0.0);
        assert_eq!(p.eval(-2.0), 0.0);
        assert_eq!(p.degree(), 2);
    }

    #[test]
    fn test_base_polynomial_span_is_normalized() {
        let domain = Domain::default();
        for difficulty in Difficulty::ALL {
            let preset = difficulty.preset();
            let mut rng = SeedRng::new(42);
            let poly = base_polynomial(&mut rng, preset, &domain);
            assert_eq!(poly.degree() % 2, 0);

            let ys: Vec<f64> = domain
                .linspace(SPAN_SAMPLES)
                .iter()
                .map(|x| poly.eval(*x))
                .collect();
            let span = ys.iter().cloned().fold(f64::NEG_INFINITY, f64::max)
                - ys.iter().cloned().fold(f64::INFINITY, f64::min);
            let expected = POLY_SPAN / preset.poly_scale;
            assert!((span - expected).abs() < 1e-6, "span {span} vs {expected}");
        }
    }

    #[test]
    fn test_bump_sign_controls_pit_or_hill() {
        let pit = Bump {
            amplitude: -2.0,
            center: Point::X(0.0),
            width: 0.5,
        };
        let hill = Bump {
            amplitude: 2.0,
            center: Point::X(0.0),
            width: 0.5,
        };
        assert_eq!(pit.eval(&Point::X(0.0)), -2.0);
        assert_eq!(hill.eval(&Point::X(0.0)), 2.0);
        assert!(hill.eval(&Point::X(3.0)) < 1e-6);
    }

    #[test]
    fn test_build_respects_preset_counts() {
        let domain = Domain::default();
        for seed in 0..50 {
            let l = Landscape::build(seed, Difficulty::Hard, &domain, Dimension::Two);
            let preset = Difficulty::Hard.preset();
            assert!((preset.bump_count.0..=preset.bump_count.1).contains(&(l.bumps.len() as u32)));
            match &l.surface {
                Surface::Field { waves, .. } => {
                    let noise = preset.noise_count.0..=preset.noise_count.1;
                    assert!(noise.contains(&(waves.len() as u32)));
                }
                Surface::Curve { .. } => panic!("expected a 2D field"),
            }
            for b in &l.bumps {
                assert!(domain.contains(b.center.x()));
                assert!(b.amplitude.abs() >= preset.bump_amplitude.0);
            }
        }
    }

    #[test]
    fn test_build_dimension_matches_request() {
        let domain = Domain::default();
        let one = Landscape::build(1, Difficulty::Easy, &domain, Dimension::One);
        let two = Landscape::build(1, Difficulty::Easy, &domain, Dimension::Two);
        assert_eq!(one.dimension(), Dimension::One);
        assert_eq!(two.dimension(), Dimension::Two);
    }
}
