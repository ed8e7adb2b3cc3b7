use serde::{Deserialize, Serialize};

use crate::math::phasor::PhasorInput;

/// Direction a zone (or a directional element) looks into.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    #[default]
    #[serde(alias = "frente")]
    Forward,
    #[serde(alias = "reverso")]
    Reverse,
}

impl Direction {
    /// Angular offset applied to supervision rays: 0° forward, 180° reverse.
    #[must_use]
    pub fn offset_deg(self) -> f64 {
        match self {
            Self::Forward => 0.0,
            Self::Reverse => 180.0,
        }
    }

    /// `+1` forward, `-1` reverse.
    #[must_use]
    pub fn sign(self) -> f64 {
        match self {
            Self::Forward => 1.0,
            Self::Reverse => -1.0,
        }
    }
}

/// Directional supervision shared by all zones.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DirectionalSupervision {
    /// Centre angle of the phase-fault supervision wedge (degrees).
    pub phase_angle: f64,
    /// Full opening of the phase-fault wedge (degrees).
    pub phase_amplitude: f64,
    pub ground_angle: f64,
    pub ground_amplitude: f64,
}

impl Default for DirectionalSupervision {
    fn default() -> Self {
        Self {
            phase_angle: 45.0,
            phase_amplitude: 170.0,
            ground_angle: 45.0,
            ground_amplitude: 170.0,
        }
    }
}

/// Quadrilateral reach settings of one fault loop (ohms, degrees).
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct LoopSettings {
    pub enabled: bool,
    pub resistive_reach: f64,
    pub forward_reach: f64,
    pub reverse_reach: f64,
    pub blinder_angle: f64,
    /// Tilt of the reactive reach line. Only honoured on zone 1.
    pub tilt: Option<f64>,
}

/// Ground-loop settings: reaches plus the residual compensation factor `kn`.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct GroundLoopSettings {
    #[serde(flatten)]
    pub reach: LoopSettings,
    /// Zero-sequence compensation factor `kn` in polar form.
    pub kn: PhasorInput,
}

/// Settings of one distance zone.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ZoneSettings {
    /// Zone number, 1 to 5.
    pub number: u8,
    #[serde(default)]
    pub direction: Direction,
    /// Line (characteristic) angle in degrees.
    pub characteristic_angle: f64,
    #[serde(default)]
    pub phase: LoopSettings,
    #[serde(default)]
    pub ground: GroundLoopSettings,
}
