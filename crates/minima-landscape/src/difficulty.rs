//! Difficulty presets.
//!
//! Each preset bounds the random draws that shape a landscape. The tables
//! are static; nothing adjusts them at runtime.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::LandscapeError;

/// One of the three fixed difficulty levels.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default,
)]
#[serde(rename_all = "lowercase")]
pub enum Difficulty {
    Easy,
    #[default]
    Medium,
    Hard,
}

/// Ranges that drive landscape construction. All ranges are inclusive.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Preset {
    /// Polynomial degree range; only even degrees inside it are used.
    pub degree: (u32, u32),
    /// Divisor applied after span normalization.
    pub poly_scale: f64,
    pub noise_count: (u32, u32),
    pub noise_amplitude: (f64, f64),
    pub noise_frequency: (f64, f64),
    pub bump_count: (u32, u32),
    pub bump_amplitude: (f64, f64),
}

const EASY: Preset = Preset {
    degree: (2, 4),
    poly_scale: 1.0,
    noise_count: (1, 1),
    noise_amplitude: (0.1, 0.5),
    noise_frequency: (1.0, 4.0),
    bump_count: (0, 1),
    bump_amplitude: (0.5, 2.0),
};

const MEDIUM: Preset = Preset {
    degree: (4, 6),
    poly_scale: 3.0,
    noise_count: (1, 3),
    noise_amplitude: (0.3, 1.5),
    noise_frequency: (3.0, 10.0),
    bump_count: (1, 3),
    bump_amplitude: (1.0, 4.0),
};

const HARD: Preset = Preset {
    degree: (4, 6),
    poly_scale: 6.0,
    noise_count: (2, 5),
    noise_amplitude: (0.5, 2.5),
    noise_frequency: (5.0, 15.0),
    bump_count: (3, 7),
    bump_amplitude: (2.0, 6.0),
};

impl Difficulty {
    /// All presets, easiest first.
    pub const ALL: [Difficulty; 3] = [Self::Easy, Self::Medium, Self::Hard];

    pub fn preset(self) -> &'static Preset {
        match self {
            Self::Easy => &EASY,
            Self::Medium => &MEDIUM,
            Self::Hard => &HARD,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Easy => "easy",
            Self::Medium => "medium",
            Self::Hard => "hard",
        }
    }
}

impl Preset {
    /// Even degrees inside the degree range.
    pub fn even_degrees(&self) -> Vec<u32> {
        (self.degree.0..=self.degree.1)
            .filter(|d| d % 2 == 0)
            .collect()
    }
}

impl fmt::Display for Difficulty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Difficulty {
    type Err = LandscapeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "easy" => Ok(Self::Easy),
            "medium" => Ok(Self::Medium),
            "hard" => Ok(Self::Hard),
            _ => Err(LandscapeError::UnknownDifficulty(s.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_difficulty_round_trips_through_str() {
        for d in Difficulty::ALL {
            assert_eq!(d.to_string().parse::<Difficulty>().unwrap(), d);
        }
        assert_eq!("HARD".parse::<Difficulty>().unwrap(), Difficulty::Hard);
        assert!("nightmare".parse::<Difficulty>().is_err());
    }

    #[test]
    fn test_even_degrees() {
        assert_eq!(Difficulty::Easy.preset().even_degrees(), vec![2, 4]);
        assert_eq!(Difficulty::Hard.preset().even_degrees(), vec![4, 6]);
    }

    #[test]
    fn test_presets_grow_harder() {
        let easy = Difficulty::Easy.preset();
        let hard = Difficulty::Hard.preset();
        assert!(hard.poly_scale > easy.poly_scale);
        assert!(hard.bump_count.1 > easy.bump_count.1);
        assert!(hard.noise_frequency.1 > easy.noise_frequency.1);
    }

    #[test]
    fn test_default_is_medium() {
        assert_eq!(Difficulty::default(), Difficulty::Medium);
    }
}
