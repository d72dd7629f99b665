//! Dimensions, domains, and points.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::LandscapeError;

// ---------------------------------------------------------------------------
// Dimension
// ---------------------------------------------------------------------------

/// Number of axes a landscape spans.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Dimension {
    /// A curve `f(x)`.
    One,
    /// A surface `f(x, y)`.
    Two,
}

impl Dimension {
    /// Numeric axis count.
    pub fn axes(self) -> usize {
        match self {
            Self::One => 1,
            Self::Two => 2,
        }
    }
}

impl fmt::Display for Dimension {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.axes())
    }
}

impl TryFrom<u8> for Dimension {
    type Error = LandscapeError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            1 => Ok(Self::One),
            2 => Ok(Self::Two),
            other => Err(LandscapeError::InvalidDimension(other.to_string())),
        }
    }
}

impl FromStr for Dimension {
    type Err = LandscapeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let n: u8 = s
            .trim()
            .parse()
            .map_err(|_| LandscapeError::InvalidDimension(s.to_string()))?;
        Self::try_from(n)
    }
}

// ---------------------------------------------------------------------------
// Domain
// ---------------------------------------------------------------------------

/// Closed interval `[lo, hi]` applied to every axis.
///
/// Displays as `(lo, hi)`, which is also the wire format. Deserializing
/// goes through [`Domain::new`], so the bounds are checked there too.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "DomainBounds")]
pub struct Domain {
    lo: f64,
    hi: f64,
}

/// Unchecked serde shape of [`Domain`].
#[derive(Deserialize)]
struct DomainBounds {
    lo: f64,
    hi: f64,
}

impl TryFrom<DomainBounds> for Domain {
    type Error = LandscapeError;

    fn try_from(bounds: DomainBounds) -> Result<Self, Self::Error> {
        Self::new(bounds.lo, bounds.hi)
    }
}

impl Domain {
    /// Creates a domain. Bounds must be finite with `lo < hi`.
    pub fn new(lo: f64, hi: f64) -> Result<Self, LandscapeError> {
        if !lo.is_finite() || !hi.is_finite() || lo >= hi {
            return Err(LandscapeError::InvalidDomain(format!("({lo}, {hi})")));
        }
        Ok(Self { lo, hi })
    }

    pub fn lo(&self) -> f64 {
        self.lo
    }

    pub fn hi(&self) -> f64 {
        self.hi
    }

    pub fn width(&self) -> f64 {
        self.hi - self.lo
    }

    pub fn center(&self) -> f64 {
        (self.lo + self.hi) / 2.0
    }

    /// `true` if `value` lies inside the closed interval.
    pub fn contains(&self, value: f64) -> bool {
        value >= self.lo && value <= self.hi
    }

    /// Clamps `value` into the interval.
    pub fn clamp(&self, value: f64) -> f64 {
        value.clamp(self.lo, self.hi)
    }

    /// `n` evenly spaced samples from `lo` to `hi` inclusive.
    pub fn linspace(&self, n: usize) -> Vec<f64> {
        match n {
            0 => Vec::new(),
            1 => vec![self.lo],
            _ => {
                let step = self.width() / (n - 1) as f64;
                (0..n).map(|i| self.lo + step * i as f64).collect()
            }
        }
    }
}

impl Default for Domain {
    fn default() -> Self {
        Self { lo: -6.0, hi: 6.0 }
    }
}

impl fmt::Display for Domain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.lo, self.hi)
    }
}

impl FromStr for Domain {
    type Err = LandscapeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || LandscapeError::InvalidDomain(s.to_string());
        let inner = s
            .trim()
            .strip_prefix('(')
            .and_then(|rest| rest.strip_suffix(')'))
            .ok_or_else(invalid)?;
        let (lo, hi) = inner.split_once(',').ok_or_else(invalid)?;
        let lo: f64 = lo.trim().parse().map_err(|_| invalid())?;
        let hi: f64 = hi.trim().parse().map_err(|_| invalid())?;
        Self::new(lo, hi)
    }
}

// ---------------------------------------------------------------------------
// Point
// ---------------------------------------------------------------------------

/// A location in a 1D or 2D landscape.
///
/// Wire format: `x` for 1D, `x,y` for 2D.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum Point {
    X(f64),
    XY(f64, f64),
}

impl Point {
    pub fn dimension(&self) -> Dimension {
        match self {
            Self::X(_) => Dimension::One,
            Self::XY(..) => Dimension::Two,
        }
    }

    /// Squared Euclidean distance. Mixed dimensions compare on `x` only.
    pub fn distance_sq(&self, other: &Point) -> f64 {
        match (self, other) {
            (Self::XY(x1, y1), Self::XY(x2, y2)) => {
                (x1 - x2).powi(2) + (y1 - y2).powi(2)
            }
            _ => (self.x() - other.x()).powi(2),
        }
    }

    pub fn x(&self) -> f64 {
        match self {
            Self::X(x) | Self::XY(x, _) => *x,
        }
    }

    /// Center of `domain` in the given dimensionality.
    pub fn center(dim: Dimension, domain: &Domain) -> Self {
        let c = domain.center();
        match dim {
            Dimension::One => Self::X(c),
            Dimension::Two => Self::XY(c, c),
        }
    }
}

impl fmt::Display for Point {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::X(x) => write!(f, "{x}"),
            Self::XY(x, y) => write!(f, "{x},{y}"),
        }
    }
}

impl FromStr for Point {
    type Err = LandscapeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || LandscapeError::InvalidPoint(s.to_string());
        let coord = |t: &str| -> Result<f64, LandscapeError> {
            let v: f64 = t.trim().parse().map_err(|_| invalid())?;
            if v.is_finite() { Ok(v) } else { Err(invalid()) }
        };
        match s.split_once(',') {
            None => Ok(Self::X(coord(s)?)),
            Some((x, y)) => Ok(Self::XY(coord(x)?, coord(y)?)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dimension_parse_and_display() {
        assert_eq!("1".parse::<Dimension>().unwrap(), Dimension::One);
        assert_eq!("2".parse::<Dimension>().unwrap(), Dimension::Two);
        assert!("3".parse::<Dimension>().is_err());
        assert!("x".parse::<Dimension>().is_err());
        assert_eq!(Dimension::Two.to_string(), "2");
    }

    #[test]
    fn test_domain_rejects_bad_bounds() {
        assert!(Domain::new(1.0, 1.0).is_err());
        assert!(Domain::new(2.0, -2.0).is_err());
        assert!(Domain::new(f64::NAN, 1.0).is_err());
        assert!(Domain::new(0.0, f64::INFINITY).is_err());
    }

    #[test]
    fn test_domain_wire_format() {
        let d = Domain::default();
        assert_eq!(d.to_string(), "(-6, 6)");
        assert_eq!("(-6, 6)".parse::<Domain>().unwrap(), d);
        assert_eq!(
            "(-2.5,4)".parse::<Domain>().unwrap(),
            Domain::new(-2.5, 4.0).unwrap()
        );
        assert!("-6, 6".parse::<Domain>().is_err());
        assert!("(6, -6)".parse::<Domain>().is_err());
    }

    #[test]
    fn test_domain_deserialize_checks_bounds() {
        let d: Domain = serde_json::from_str(r#"{"lo":-2.0,"hi":3.0}"#).unwrap();
        assert_eq!(d, Domain::new(-2.0, 3.0).unwrap());
        assert_eq!(serde_json::to_string(&d).unwrap(), r#"{"lo":-2.0,"hi":3.0}"#);

        assert!(serde_json::from_str::<Domain>(r#"{"lo":6.0,"hi":-6.0}"#).is_err());
        assert!(serde_json::from_str::<Domain>(r#"{"lo":1.0,"hi":1.0}"#).is_err());
    }

    #[test]
    fn test_domain_contains_is_closed() {
        let d = Domain::default();
        assert!(d.contains(-6.0));
        assert!(d.contains(6.0));
        assert!(!d.contains(6.000_001));
    }

    #[test]
    fn test_linspace_endpoints() {
        let xs = Domain::default().linspace(5);
        assert_eq!(xs, vec![-6.0, -3.0, 0.0, 3.0, 6.0]);
        assert!(Domain::default().linspace(0).is_empty());
    }

    #[test]
    fn test_point_wire_format() {
        assert_eq!("1.5".parse::<Point>().unwrap(), Point::X(1.5));
        assert_eq!("1.5,-2".parse::<Point>().unwrap(), Point::XY(1.5, -2.0));
        assert_eq!(Point::XY(0.25, -1.0).to_string(), "0.25,-1");
        assert!("abc".parse::<Point>().is_err());
        assert!("1,nan".parse::<Point>().is_err());
        assert!("1,2,3".parse::<Point>().is_err());
    }

    #[test]
    fn test_point_distance() {
        let a = Point::XY(0.0, 0.0);
        let b = Point::XY(3.0, 4.0);
        assert_eq!(a.distance_sq(&b), 25.0);
        assert_eq!(Point::X(1.0).distance_sq(&Point::X(-1.0)), 4.0);
    }
}
