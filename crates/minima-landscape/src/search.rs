//! Global minimum search over a generated landscape.
//!
//! The landscape has many local minima, so a single local search is not
//! trustworthy. We sample a dense grid, keep the lowest samples as seeds,
//! refine each with a bounded local minimizer, and keep the best result.

use serde::{Deserialize, Serialize};

use crate::{Dimension, Domain, Landscape, Point};

/// Grid resolution for 1D landscapes.
pub const GRID_1D: usize = 10_000;
/// Grid resolution per axis for 2D landscapes.
pub const GRID_2D: usize = 200;
/// Lowest grid samples refined locally.
pub const CANDIDATES: usize = 20;
/// Half-width of the 1D refinement bracket.
const REFINE_RADIUS_1D: f64 = 0.1;
const BRENT_XATOL: f64 = 1e-5;
const BRENT_MAX_EVALS: usize = 500;
const SIMPLEX_MAX_ITERS: usize = 400;
const SIMPLEX_FTOL: f64 = 1e-10;
const SIMPLEX_XTOL: f64 = 1e-9;

/// Location and value of a landscape's global minimum.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Minimum {
    pub point: Point,
    pub value: f64,
}

/// Grid-seeded, locally refined global minimum of `landscape` on `domain`.
pub fn global_minimum(landscape: &Landscape, domain: &Domain) -> Minimum {
    let samples = grid_samples(landscape, domain);
    let candidates = lowest(&samples, CANDIDATES);

    let Some(&first) = candidates.first() else {
        let point = Point::center(landscape.dimension(), domain);
        return Minimum {
            point,
            value: landscape.value(&point),
        };
    };
    let mut best = first;

    for seed in candidates {
        let refined = match (landscape.dimension(), seed.point) {
            (Dimension::One, p) => {
                let x = p.x();
                let lo = domain.clamp(x - REFINE_RADIUS_1D);
                let hi = domain.clamp(x + REFINE_RADIUS_1D);
                let (x, value) = bounded_scalar_minimize(
                    |x| landscape.value(&Point::X(x)),
                    lo,
                    hi,
                    BRENT_XATOL,
                    BRENT_MAX_EVALS,
                );
                Minimum {
                    point: Point::X(x),
                    value,
                }
            }
            (Dimension::Two, p) => {
                let start = match p {
                    Point::XY(x, y) => [x, y],
                    Point::X(x) => [x, domain.center()],
                };
                let step = domain.width() / (GRID_2D - 1) as f64;
                let ([x, y], value) = box_simplex_minimize(
                    |x, y| landscape.value(&Point::XY(x, y)),
                    start,
                    step,
                    domain,
                );
                Minimum {
                    point: Point::XY(x, y),
                    value,
                }
            }
        };
        if refined.value < best.value {
            best = refined;
        }
    }

    tracing::trace!(point = %best.point, value = best.value, "true minimum located");
    best
}

fn grid_samples(landscape: &Landscape, domain: &Domain) -> Vec<Minimum> {
    match landscape.dimension() {
        Dimension::One => domain
            .linspace(GRID_1D)
            .into_iter()
            .map(|x| {
                let point = Point::X(x);
                Minimum {
                    point,
                    value: landscape.value(&point),
                }
            })
            .collect(),
        Dimension::Two => {
            let axis = domain.linspace(GRID_2D);
            let mut out = Vec::with_capacity(GRID_2D * GRID_2D);
            for &x in &axis {
                for &y in &axis {
                    let point = Point::XY(x, y);
                    out.push(Minimum {
                        point,
                        value: landscape.value(&point),
                    });
                }
            }
            out
        }
    }
}

/// The `k` lowest samples, lowest first. Ties keep grid order.
fn lowest(samples: &[Minimum], k: usize) -> Vec<Minimum> {
    let mut sorted = samples.to_vec();
    sorted.sort_by(|a, b| a.value.total_cmp(&b.value));
    sorted.truncate(k);
    sorted
}

/// Brent's bounded scalar minimization on `[lo, hi]`.
///
/// Golden-section steps with parabolic interpolation when it is safe.
/// Returns `(x, f(x))`.
pub fn bounded_scalar_minimize(
    f: impl Fn(f64) -> f64,
    lo: f64,
    hi: f64,
    xatol: f64,
    max_evals: usize,
) -> (f64, f64) {
    const GOLDEN: f64 = 0.381_966_011_250_105_1; // (3 - sqrt 5) / 2
    let sqrt_eps = f64::EPSILON.sqrt();

    let (mut a, mut b) = (lo, hi);
    let mut fulc = a + GOLDEN * (b - a);
    let mut nfc = fulc;
    let mut xf = fulc;
    let mut rat: f64 = 0.0;
    let mut e: f64 = 0.0;
    let mut fx = f(xf);
    let mut evals = 1;
    let mut ffulc = fx;
    let mut fnfc = fx;
    let mut xm = 0.5 * (a + b);
    let mut tol1 = sqrt_eps * xf.abs() + xatol / 3.0;
    let mut tol2 = 2.0 * tol1;

    while (xf - xm).abs() > tol2 - 0.5 * (b - a) {
        let mut golden_step = true;

        if e.abs() > tol1 {
            golden_step = false;
            let mut r = (xf - nfc) * (fx - ffulc);
            let mut q = (xf - fulc) * (fx - fnfc);
            let mut p = (xf - fulc) * q - (xf - nfc) * r;
            q = 2.0 * (q - r);
            if q > 0.0 {
                p = -p;
            }
            q = q.abs();
            r = e;
            e = rat;

            if p.abs() < (0.5 * q * r).abs() && p > q * (a - xf) && p < q * (b - xf) {
                rat = p / q;
                let x = xf + rat;
                if (x - a) < tol2 || (b - x) < tol2 {
                    let si = if xm - xf >= 0.0 { 1.0 } else { -1.0 };
                    rat = tol1 * si;
                }
            } else {
                golden_step = true;
            }
        }

        if golden_step {
            e = if xf >= xm { a - xf } else { b - xf };
            rat = GOLDEN * e;
        }

        let si = if rat >= 0.0 { 1.0 } else { -1.0 };
        let x = xf + si * rat.abs().max(tol1);
        let fu = f(x);
        evals += 1;

        if fu <= fx {
            if x >= xf {
                a = xf;
            } else {
                b = xf;
            }
            fulc = nfc;
            ffulc = fnfc;
            nfc = xf;
            fnfc = fx;
            xf = x;
            fx = fu;
        } else {
            if x < xf {
                a = x;
            } else {
                b = x;
            }
            if fu <= fnfc || nfc == xf {
                fulc = nfc;
                ffulc = fnfc;
                nfc = x;
                fnfc = fu;
            } else if fu <= ffulc || fulc == xf || fulc == nfc {
                fulc = x;
                ffulc = fu;
            }
        }

        xm = 0.5 * (a + b);
        tol1 = sqrt_eps * xf.abs() + xatol / 3.0;
        tol2 = 2.0 * tol1;

        if evals >= max_evals {
            break;
        }
    }

    (xf, fx)
}

/// Nelder-Mead on a 2D box. Every vertex is clamped into `domain`.
pub fn box_simplex_minimize(
    f: impl Fn(f64, f64) -> f64,
    start: [f64; 2],
    step: f64,
    domain: &Domain,
) -> ([f64; 2], f64) {
    let clamp = |p: [f64; 2]| [domain.clamp(p[0]), domain.clamp(p[1])];
    let eval = |p: [f64; 2]| f(p[0], p[1]);
    // Step away from the nearer edge so the initial simplex is not degenerate.
    let offset = |v: f64| if v + step > domain.hi() { -step } else { step };

    let s0 = clamp(start);
    let s1 = clamp([s0[0] + offset(s0[0]), s0[1]]);
    let s2 = clamp([s0[0], s0[1] + offset(s0[1])]);
    let mut simplex = [(s0, eval(s0)), (s1, eval(s1)), (s2, eval(s2))];

    for _ in 0..SIMPLEX_MAX_ITERS {
        simplex.sort_by(|a, b| a.1.total_cmp(&b.1));
        let (best, f_best) = simplex[0];
        let (_, f_second) = simplex[1];
        let (worst, f_worst) = simplex[2];

        let spread = simplex
            .iter()
            .map(|(p, _)| (p[0] - best[0]).abs().max((p[1] - best[1]).abs()))
            .fold(0.0, f64::max);
        if (f_worst - f_best).abs() <= SIMPLEX_FTOL && spread <= SIMPLEX_XTOL {
            break;
        }

        let c = [
            (simplex[0].0[0] + simplex[1].0[0]) / 2.0,
            (simplex[0].0[1] + simplex[1].0[1]) / 2.0,
        ];
        let along = |t: f64, towards: [f64; 2]| {
            clamp([c[0] + t * (towards[0] - c[0]), c[1] + t * (towards[1] - c[1])])
        };

        let xr = along(-1.0, worst);
        let fr = eval(xr);

        if fr < f_best {
            let xe = along(-2.0, worst);
            let fe = eval(xe);
            simplex[2] = if fe < fr { (xe, fe) } else { (xr, fr) };
        } else if fr < f_second {
            simplex[2] = (xr, fr);
        } else {
            let xc = if fr < f_worst { along(-0.5, worst) } else { along(0.5, worst) };
            let fc = eval(xc);
            if fc < fr.min(f_worst) {
                simplex[2] = (xc, fc);
            } else {
                for v in simplex.iter_mut().skip(1) {
                    let p = clamp([
                        best[0] + 0.5 * (v.0[0] - best[0]),
                        best[1] + 0.5 * (v.0[1] - best[1]),
                    ]);
                    *v = (p, eval(p));
                }
            }
        }
    }

    simplex.sort_by(|a, b| a.1.total_cmp(&b.1));
    simplex[0]
}
