use std::ops::{Add, Mul, Neg, Sub};

use num_complex::Complex64;
use serde::{Deserialize, Serialize};

use super::normalize_deg;

/// A phasor given as magnitude and angle in degrees, as entered by a user.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct PhasorInput {
    pub magnitude: f64,
    /// Angle in degrees.
    pub angle: f64,
}

impl PhasorInput {
    #[must_use]
    pub fn new(magnitude: f64, angle: f64) -> Self {
        Self { magnitude, angle }
    }

    /// Rectangular form.
    #[must_use]
    pub fn to_phasor(self) -> Phasor {
        Phasor::from_polar(self.magnitude, self.angle)
    }
}

/// A complex phasor in rectangular form with degree-based polar helpers.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Phasor(pub Complex64);

impl Phasor {
    pub const ZERO: Self = Self(Complex64::new(0.0, 0.0));

    #[must_use]
    pub fn new(re: f64, im: f64) -> Self {
        Self(Complex64::new(re, im))
    }

    /// Builds a phasor from magnitude and angle in degrees.
    #[must_use]
    pub fn from_polar(magnitude: f64, angle_deg: f64) -> Self {
        Self(Complex64::from_polar(magnitude, angle_deg.to_radians()))
    }

    #[must_use]
    pub fn re(&self) -> f64 {
        self.0.re
    }

    #[must_use]
    pub fn im(&self) -> f64 {
        self.0.im
    }

    #[must_use]
    pub fn magnitude(&self) -> f64 {
        self.0.norm()
    }

    /// Angle in degrees, normalized to `[0, 360)`. The zero phasor has angle 0.
    #[must_use]
    pub fn angle_deg(&self) -> f64 {
        normalize_deg(self.signed_angle_deg())
    }

    /// Angle in degrees as returned by `atan2`, in `(-180, 180]`.
    #[must_use]
    pub fn signed_angle_deg(&self) -> f64 {
        self.0.im.atan2(self.0.re).to_degrees()
    }

    /// Rotates the phasor counter-clockwise by `angle_deg`.
    #[must_use]
    pub fn rotate(&self, angle_deg: f64) -> Self {
        Self(self.0 * Complex64::from_polar(1.0, angle_deg.to_radians()))
    }

    /// Multiplies by a real factor.
    #[must_use]
    pub fn scale(&self, factor: f64) -> Self {
        Self(self.0 * factor)
    }
}

impl Add for Phasor {
    type Output = Phasor;
    fn add(self, rhs: Phasor) -> Phasor {
        Phasor(self.0 + rhs.0)
    }
}

impl Sub for Phasor {
    type Output = Phasor;
    fn sub(self, rhs: Phasor) -> Phasor {
        Phasor(self.0 - rhs.0)
    }
}

impl Neg for Phasor {
    type Output = Phasor;
    fn neg(self) -> Phasor {
        Phasor(-self.0)
    }
}

impl Mul<f64> for Phasor {
    type Output = Phasor;
    fn mul(self, rhs: f64) -> Phasor {
        self.scale(rhs)
    }
}

impl std::iter::Sum for Phasor {
    fn sum<I: Iterator<Item = Phasor>>(iter: I) -> Phasor {
        iter.fold(Phasor::ZERO, Add::add)
    }
}

impl std::fmt::Display for Phasor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:.2} ∠ {:.2}°", self.magnitude(), self.angle_deg())
    }
}
