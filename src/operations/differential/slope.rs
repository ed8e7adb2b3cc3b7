use serde::{Deserialize, Serialize};

use crate::math::Point2;

/// Dual-slope restraint characteristic, in multiples of tap.
///
/// Flat at `sensitivity` up to `inflection1`, then rising with `slope1` (%)
/// up to `inflection2`, then with `slope2` (%).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DualSlope {
    pub sensitivity: f64,
    pub inflection1: f64,
    pub inflection2: f64,
    pub slope1: f64,
    pub slope2: f64,
}

impl Default for DualSlope {
    fn default() -> Self {
        Self {
            sensitivity: 0.3,
            inflection1: 1.5,
            inflection2: 5.0,
            slope1: 25.0,
            slope2: 50.0,
        }
    }
}

impl DualSlope {
    /// Differential current needed to operate at `restraint`.
    #[must_use]
    pub fn threshold(&self, restraint: f64) -> f64 {
        let s1 = self.slope1 / 100.0;
        let s2 = self.slope2 / 100.0;
        if restraint <= self.inflection1 {
            self.sensitivity
        } else if restraint <= self.inflection2 {
            self.sensitivity + s1 * (restraint - self.inflection1)
        } else {
            self.sensitivity
                + s1 * (self.inflection2 - self.inflection1)
                + s2 * (restraint - self.inflection2)
        }
    }

    /// Whether `(restraint, differential)` lies strictly above the curve.
    #[must_use]
    pub fn operates(&self, restraint: f64, differential: f64) -> bool {
        differential > self.threshold(restraint)
    }

    /// Corner points of the curve from zero restraint to `max_restraint`,
    /// as `(restraint, differential)`.
    #[must_use]
    pub fn curve_points(&self, max_restraint: f64) -> Vec<Point2> {
        let mut points: Vec<Point2> = [0.0, self.inflection1, self.inflection2]
            .into_iter()
            .filter(|&x| x < max_restraint)
            .map(|x| Point2::new(x, self.threshold(x)))
            .collect();
        points.push(Point2::new(max_restraint, self.threshold(max_restraint)));
        points
    }
}
