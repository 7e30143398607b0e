//! Tag color generation.
//!
//! Two strategies: a uniformly random 24-bit color, or a pick from a fixed
//! palette by index. Both always yield a `#RRGGBB` string.

use rand::Rng;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// Predefined palette for tags.
pub const PALETTE: [&str; 8] = [
    "#3B82F6", // blue
    "#10B981", // green
    "#F59E0B", // amber
    "#EF4444", // red
    "#8B5CF6", // violet
    "#EC4899", // pink
    "#06B6D4", // cyan
    "#84CC16", // lime
];

/// How a color is chosen for a tag created without one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ColorStrategy {
    #[default]
    Random,
    Palette,
}

impl ColorStrategy {
    /// Pick a color. `index` is only used by the palette strategy.
    #[must_use]
    pub fn pick(self, index: i64) -> String {
        match self {
            Self::Random => random_color(),
            Self::Palette => palette_color(index).to_string(),
        }
    }
}

impl FromStr for ColorStrategy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "random" => Ok(Self::Random),
            "palette" => Ok(Self::Palette),
            other => Err(format!("unknown tag color strategy '{other}' (expected random or palette)")),
        }
    }
}

/// Generate a random color as upper-case `#RRGGBB`.
#[must_use]
pub fn random_color() -> String {
    let mut rng = rand::rng();
    let value: u32 = rng.random_range(0..=0x00FF_FFFF);
    format!("#{value:06X}")
}

/// Pick a palette color. Any index is valid; it wraps modulo the palette size.
#[must_use]
pub fn palette_color(index: i64) -> &'static str {
    #[allow(clippy::cast_possible_wrap, clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    let slot = index.rem_euclid(PALETTE.len() as i64) as usize;
    PALETTE[slot]
}
