use serde::{Deserialize, Serialize};
use tracing::debug;

use super::{Direction, Phase};
use crate::math::phasor::{Phasor, PhasorInput};
use crate::math::{normalize_deg, Point2, TOLERANCE};

/// Phase rotation of the system.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum PhaseSequence {
    #[default]
    #[serde(rename = "ABC")]
    Abc,
    #[serde(rename = "ACB")]
    Acb,
}

impl PhaseSequence {
    /// Voltage pair `(minuend, subtrahend)` polarizing the current of `phase`.
    #[must_use]
    pub fn polarizing_pair(self, phase: Phase) -> (Phase, Phase) {
        let (x, y) = match phase {
            Phase::A => (Phase::B, Phase::C),
            Phase::B => (Phase::C, Phase::A),
            Phase::C => (Phase::A, Phase::B),
        };
        match self {
            Self::Abc => (x, y),
            Self::Acb => (y, x),
        }
    }
}

/// Settings of a directional element together with the measured phasors.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DirectionalSettings {
    #[serde(default)]
    pub sequence: PhaseSequence,
    /// Characteristic (relay) angle in degrees.
    pub characteristic_angle: f64,
    /// Full opening of the trip region in degrees.
    pub amplitude: f64,
    #[serde(default)]
    pub direction: Direction,
    /// `Ia`, `Ib`, `Ic`.
    pub currents: [PhasorInput; 3],
    /// `Va`, `Vb`, `Vc`.
    pub voltages: [PhasorInput; 3],
}

/// Angular trip region `[min, max]` in degrees, both ends in `[0, 360)`.
///
/// `min > max` means the region wraps across 0°.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct TripRegion {
    pub min: f64,
    pub max: f64,
    pub amplitude: f64,
}

impl TripRegion {
    /// Region of width `amplitude` centred on `center`.
    #[must_use]
    pub fn centered(center: f64, amplitude: f64) -> Self {
        Self {
            min: normalize_deg(center - amplitude / 2.0),
            max: normalize_deg(center + amplitude / 2.0),
            amplitude,
        }
    }

    #[must_use]
    pub fn wraps(&self) -> bool {
        self.max < self.min
    }

    /// Whether `angle` (any range) falls inside the region, ends included.
    #[must_use]
    pub fn contains(&self, angle: f64) -> bool {
        if self.amplitude >= 360.0 {
            return true;
        }
        let a = normalize_deg(angle);
        if self.wraps() {
            a >= self.min || a <= self.max
        } else {
            a >= self.min && a <= self.max
        }
    }

    /// Sector outline on the unit circle: origin, arc sampled every
    /// `step_deg` from `min` through `max` (continuing past 0° when the
    /// region wraps), the exact end point, and back to the origin.
    ///
    /// `step_deg` is clamped to `[MIN_SECTOR_STEP_DEG, 360]`. An amplitude
    /// of 360° or more yields the full circle.
    #[must_use]
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss, clippy::cast_precision_loss)]
    pub fn sector_points(&self, step_deg: f64) -> Vec<Point2> {
        let step = step_deg.max(MIN_SECTOR_STEP_DEG).min(360.0);
        let end = if self.amplitude >= 360.0 {
            self.min + 360.0
        } else if self.wraps() {
            self.max + 360.0
        } else {
            self.max
        };
        let count = ((end - self.min) / step).floor() as usize;

        let mut points = Vec::with_capacity(count + 4);
        points.push(Point2::origin());
        points.extend((0..=count).map(|i| unit_point(self.min + step * i as f64)));
        let end_point = unit_point(end);
        if !points.last().is_some_and(|p| (p - end_point).norm() <= TOLERANCE) {
            points.push(end_point);
        }
        points.push(Point2::origin());
        points
    }
}

/// Finest arc step accepted by [`TripRegion::sector_points`], in degrees.
pub const MIN_SECTOR_STEP_DEG: f64 = 0.1;

fn unit_point(angle_deg: f64) -> Point2 {
    let (sin, cos) = angle_deg.to_radians().sin_cos();
    Point2::new(cos, sin)
}

/// Polarization and trip region of one phase.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PhaseDirection {
    pub phase: Phase,
    /// Polarizing voltage, already rotated for reverse elements.
    pub polarizing: Phasor,
    /// How the polarizing voltage was formed, e.g. `"Vb - Vc + 180°"`.
    pub formula: String,
    pub max_torque_angle: f64,
    pub region: TripRegion,
    pub current: Phasor,
    /// Whether the current angle lies in the trip region.
    pub current_in_region: bool,
}

/// Computes per-phase polarizing voltages and trip regions.
pub struct DirectionalPolarization {
    settings: DirectionalSettings,
}

impl DirectionalPolarization {
    /// Creates a new `DirectionalPolarization`.
    #[must_use]
    pub fn new(settings: DirectionalSettings) -> Self {
        Self { settings }
    }

    /// Evaluates all three phases.
    #[must_use]
    pub fn execute(&self) -> [PhaseDirection; 3] {
        Phase::ALL.map(|phase| self.phase(phase))
    }

    fn phase(&self, phase: Phase) -> PhaseDirection {
        let s = &self.settings;
        let voltage = |p: Phase| s.voltages[p.index()].to_phasor();

        let (x, y) = s.sequence.polarizing_pair(phase);
        let mut polarizing = voltage(x) - voltage(y);
        let mut formula = format!("V{} - V{}", x.letter(), y.letter());
        if s.direction == Direction::Reverse {
            polarizing = polarizing.rotate(180.0);
            formula.push_str(" + 180°");
        }

        let max_torque_angle = normalize_deg(polarizing.angle_deg() + 90.0 - s.characteristic_angle);
        let region = TripRegion::centered(max_torque_angle, s.amplitude);
        let current = s.currents[phase.index()].to_phasor();
        let current_in_region = region.contains(current.angle_deg());
        debug!(?phase, max_torque_angle, current_in_region, "phase polarized");

        PhaseDirection {
            phase,
            polarizing,
            formula,
            max_torque_angle,
            region,
            current,
            current_in_region,
        }
    }
}
