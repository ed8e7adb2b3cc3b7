use serde::Serialize;
use tracing::{debug, warn};

use super::settings::{Direction, DirectionalSupervision, LoopSettings, ZoneSettings};
use crate::math::phasor::{Phasor, PhasorInput};
use crate::math::{PolarLine, TOLERANCE};

/// Fault loop a region is computed for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum FaultKind {
    Phase,
    Ground,
}

/// Homopolar compensation angle `α = arg(1 + kn)` in degrees.
///
/// When `1 + kn` vanishes (`kn = 1∠180°`) the argument is undefined; this
/// returns `0°`, the `atan2(0, 0)` value.
#[must_use]
pub fn homopolar_alpha(kn: PhasorInput) -> f64 {
    let sum = Phasor::new(1.0, 0.0) + kn.to_phasor();
    if sum.magnitude() < TOLERANCE {
        return 0.0;
    }
    sum.signed_angle_deg()
}

/// Everything needed to lay out the six boundary lines of one fault loop.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct LoopGeometry {
    pub kind: FaultKind,
    pub supervision_angle: f64,
    pub supervision_amplitude: f64,
    pub resistive_reach: f64,
    pub forward_reach: f64,
    pub reverse_reach: f64,
    pub blinder_angle: f64,
    pub characteristic_angle: f64,
    pub tilt: Option<f64>,
    /// Homopolar compensation angle; 0 for phase loops.
    pub alpha: f64,
}

impl LoopGeometry {
    /// Phase-fault loop of a zone.
    #[must_use]
    pub fn phase(zone: &ZoneSettings, supervision: &DirectionalSupervision) -> Self {
        Self::from_loop(
            FaultKind::Phase,
            zone,
            &zone.phase,
            supervision.phase_angle,
            supervision.phase_amplitude,
            0.0,
        )
    }

    /// Ground-fault loop of a zone, with `α` derived from the zone's `kn`.
    #[must_use]
    pub fn ground(zone: &ZoneSettings, supervision: &DirectionalSupervision) -> Self {
        let alpha = homopolar_alpha(zone.ground.kn);
        debug!(zone = zone.number, alpha, "homopolar compensation angle");
        Self::from_loop(
            FaultKind::Ground,
            zone,
            &zone.ground.reach,
            supervision.ground_angle,
            supervision.ground_amplitude,
            alpha,
        )
    }

    fn from_loop(
        kind: FaultKind,
        zone: &ZoneSettings,
        settings: &LoopSettings,
        supervision_angle: f64,
        supervision_amplitude: f64,
        alpha: f64,
    ) -> Self {
        let tilt = if zone.number == 1 {
            settings.tilt
        } else {
            if settings.tilt.is_some() {
                debug!(zone = zone.number, "tilt ignored outside zone 1");
            }
            None
        };
        Self {
            kind,
            supervision_angle,
            supervision_amplitude,
            resistive_reach: settings.resistive_reach,
            forward_reach: settings.forward_reach,
            reverse_reach: settings.reverse_reach,
            blinder_angle: settings.blinder_angle,
            characteristic_angle: zone.characteristic_angle,
            tilt,
            alpha,
        }
    }

    /// Inclinations of the two supervision rays `(r1, r6)` for `direction`.
    #[must_use]
    pub fn supervision_thetas(&self, direction: Direction) -> (f64, f64) {
        let base = self.supervision_angle - self.alpha + direction.offset_deg();
        let half = self.supervision_amplitude / 2.0;
        (base - half, base + half)
    }

    /// The six boundary lines `r1`…`r6` for `direction`, sides unassigned.
    ///
    /// - `r1`, `r6`: supervision rays through the origin.
    /// - `r2`: reactive limit on the near side of the origin (offset by the
    ///   opposite-direction reach), inclined by `−α`.
    /// - `r3`: resistive blinder through `(±R, 0)`.
    /// - `r4`: reactive reach, tilted on zone 1, inclined by `−α` on ground loops.
    /// - `r5`: vertical resistive limit through `(∓R, 0)`.
    #[must_use]
    pub fn polar_lines(&self, direction: Direction) -> [PolarLine; 6] {
        let s = direction.sign();
        let (theta1, theta6) = self.supervision_thetas(direction);
        let (reach, offset_reach) = match direction {
            Direction::Forward => (self.forward_reach, self.reverse_reach),
            Direction::Reverse => (self.reverse_reach, self.forward_reach),
        };

        let theta2 = -self.alpha;
        let theta4 = self.tilt.unwrap_or(0.0) - self.alpha;

        [
            PolarLine::new("r1", 0.0, 0.0, theta1),
            PolarLine::new("r2", 0.0, -s * self.reach_offset(offset_reach, theta2), theta2),
            PolarLine::new("r3", s * self.resistive_reach, 0.0, self.blinder_angle),
            PolarLine::new("r4", 0.0, s * self.reach_offset(reach, theta4), theta4),
            PolarLine::new("r5", -s * self.resistive_reach, 0.0, 90.0),
            PolarLine::new("r6", 0.0, 0.0, theta6),
        ]
    }

    /// X-axis intercept of a line inclined by `theta_deg` that crosses the
    /// characteristic line at reactance `reach`:
    /// `reach · (1 − tan θ / tan φ)`.
    fn reach_offset(&self, reach: f64, theta_deg: f64) -> f64 {
        let tan_theta = theta_deg.to_radians().tan();
        if tan_theta.abs() < TOLERANCE {
            return reach;
        }
        let tan_char = self.characteristic_angle.to_radians().tan();
        if tan_char.abs() < TOLERANCE || !tan_char.is_finite() {
            warn!(
                characteristic_angle = self.characteristic_angle,
                "characteristic angle too flat for reach correction; using plain reach"
            );
            return reach;
        }
        reach * (1.0 - tan_theta / tan_char)
    }
}

#[cfg(test)]
mod tests {
    use approx::assert_abs_diff_eq;

    use super::*;
    use crate::operations::distance::settings::GroundLoopSettings;

    fn zone(number: u8, tilt: Option<f64>) -> ZoneSettings {
        let reach = LoopSettings {
            enabled: true,
            resistive_reach: 10.0,
            forward_reach: 8.0,
            reverse_reach: 2.0,
            blinder_angle: 75.0,
            tilt,
        };
        ZoneSettings {
            number,
            direction: Direction::Forward,
            characteristic_angle: 75.0,
            phase: reach,
            ground: GroundLoopSettings {
                reach,
                kn: PhasorInput::new(0.5, 0.0),
            },
        }
    }

    #[test]
    fn alpha_of_zero_kn_is_zero() {
        assert_abs_diff_eq!(homopolar_alpha(PhasorInput::new(0.0, 0.0)), 0.0);
    }

    #[test]
    fn alpha_of_cancelling_kn_is_zero() {
        assert_abs_diff_eq!(homopolar_alpha(PhasorInput::new(1.0, 180.0)), 0.0);
    }

    #[test]
    fn alpha_of_quadrature_kn() {
        // 1 + j → 45°.
        assert_abs_diff_eq!(homopolar_alpha(PhasorInput::new(1.0, 90.0)), 45.0, epsilon = 1e-9);
    }

    #[test]
    fn phase_forward_lines() {
        let geom = LoopGeometry::phase(&zone(2, None), &DirectionalSupervision::default());
        let lines = geom.polar_lines(Direction::Forward);
        let names: Vec<_> = lines.iter().map(|l| l.name).collect();
        assert_eq!(names, ["r1", "r2", "r3", "r4", "r5", "r6"]);
        assert_abs_diff_eq!(lines[0].theta_deg, -40.0);
        assert_abs_diff_eq!(lines[5].theta_deg, 130.0);
        assert_abs_diff_eq!(lines[1].x0, -2.0);
        assert_abs_diff_eq!(lines[2].r0, 10.0);
        assert_abs_diff_eq!(lines[3].x0, 8.0);
        assert_abs_diff_eq!(lines[3].theta_deg, 0.0);
        assert_abs_diff_eq!(lines[4].r0, -10.0);
        assert_abs_diff_eq!(lines[4].theta_deg, 90.0);
    }

    #[test]
    fn phase_reverse_lines_are_mirrored() {
        let geom = LoopGeometry::phase(&zone(2, None), &DirectionalSupervision::default());
        let lines = geom.polar_lines(Direction::Reverse);
        assert_abs_diff_eq!(lines[0].theta_deg, 140.0);
        assert_abs_diff_eq!(lines[5].theta_deg, 310.0);
        assert_abs_diff_eq!(lines[1].x0, 8.0);
        assert_abs_diff_eq!(lines[2].r0, -10.0);
        assert_abs_diff_eq!(lines[3].x0, -2.0);
        assert_abs_diff_eq!(lines[4].r0, 10.0);
    }

    #[test]
    fn tilt_only_on_zone_one() {
        let sup = DirectionalSupervision::default();
        let z1 = LoopGeometry::phase(&zone(1, Some(-5.0)), &sup);
        let z2 = LoopGeometry::phase(&zone(2, Some(-5.0)), &sup);
        assert_eq!(z1.tilt, Some(-5.0));
        assert_eq!(z2.tilt, None);

        let r4 = z1.polar_lines(Direction::Forward)[3];
        let expected = 8.0 * (1.0 + 5f64.to_radians().tan() / 75f64.to_radians().tan());
        assert_abs_diff_eq!(r4.x0, expected, epsilon = 1e-12);
        assert_abs_diff_eq!(r4.theta_deg, -5.0);
    }

    #[test]
    fn tilted_reach_line_crosses_characteristic_at_reach() {
        let sup = DirectionalSupervision::default();
        let geom = LoopGeometry::phase(&zone(1, Some(-7.0)), &sup);
        let r4 = geom.polar_lines(Direction::Forward)[3].to_line();
        let on_char = crate::math::Point2::new(8.0 / 75f64.to_radians().tan(), 8.0);
        assert_abs_diff_eq!(r4.eval(&on_char), 0.0, epsilon = 1e-9);
    }

    #[test]
    fn ground_lines_rotate_by_alpha() {
        let mut z = zone(3, None);
        z.ground.kn = PhasorInput::new(1.0, 90.0);
        let geom = LoopGeometry::ground(&z, &DirectionalSupervision::default());
        assert_abs_diff_eq!(geom.alpha, 45.0, epsilon = 1e-9);

        let lines = geom.polar_lines(Direction::Forward);
        assert_abs_diff_eq!(lines[0].theta_deg, -85.0, epsilon = 1e-9);
        assert_abs_diff_eq!(lines[5].theta_deg, 85.0, epsilon = 1e-9);
        assert_abs_diff_eq!(lines[1].theta_deg, -45.0, epsilon = 1e-9);
        assert_abs_diff_eq!(lines[3].theta_deg, -45.0, epsilon = 1e-9);

        let tan_char = 75f64.to_radians().tan();
        assert_abs_diff_eq!(lines[1].x0, -2.0 * (1.0 + 1.0 / tan_char), epsilon = 1e-9);
        assert_abs_diff_eq!(lines[3].x0, 8.0 * (1.0 + 1.0 / tan_char), epsilon = 1e-9);
    }
}
