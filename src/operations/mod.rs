/// Transformer differential protection (function 87).
pub mod differential;
/// Directional overcurrent polarization (function 67).
pub mod directional;
/// Distance protection (function 21): quadrilateral operating regions.
pub mod distance;
/// Time-overcurrent protection (function 51).
pub mod overcurrent;

pub use distance::Direction;

use serde::{Deserialize, Serialize};

/// One of the three phases of a three-phase system.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Phase {
    A,
    B,
    C,
}

impl Phase {
    pub const ALL: [Phase; 3] = [Phase::A, Phase::B, Phase::C];

    /// Position in `[a, b, c]` arrays.
    #[must_use]
    pub fn index(self) -> usize {
        match self {
            Self::A => 0,
            Self::B => 1,
            Self::C => 2,
        }
    }

    /// Lower-case letter used in phasor names (`Va`, `Ib`, ...).
    #[must_use]
    pub fn letter(self) -> char {
        match self {
            Self::A => 'a',
            Self::B => 'b',
            Self::C => 'c',
        }
    }
}
