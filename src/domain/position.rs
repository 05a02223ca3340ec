//! Per-bar position state.

use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub enum Position {
    #[default]
    Flat,
    Long,
}

impl Position {
    /// Fraction of capital exposed to the price move: 0 flat, 1 long.
    pub fn exposure(self) -> f64 {
        match self {
            Position::Flat => 0.0,
            Position::Long => 1.0,
        }
    }

    pub fn is_long(self) -> bool {
        self == Position::Long
    }
}

impl From<bool> for Position {
    fn from(long: bool) -> Self {
        if long { Position::Long } else { Position::Flat }
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Position::Flat => f.write_str("flat"),
            Position::Long => f.write_str("long"),
        }
    }
}
