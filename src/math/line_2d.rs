use serde::Serialize;

use super::{Point2, TOLERANCE};

/// An infinite line in canonical form `a·R + b·X + c = 0`.
///
/// Lines built through [`Line::from_polar`] have `(a, b)` of unit length, so
/// [`Line::eval`] returns the signed distance of a point to the line.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Line {
    pub a: f64,
    pub b: f64,
    pub c: f64,
}

impl Line {
    /// Creates a line from raw coefficients (not normalized).
    #[must_use]
    pub fn new(a: f64, b: f64, c: f64) -> Self {
        Self { a, b, c }
    }

    /// Converts a line through `(r0, x0)` with inclination `theta_deg` into
    /// canonical form.
    ///
    /// Uses `a = -sin θ`, `b = cos θ`, `c = sin θ·R0 − cos θ·X0`, then divides
    /// by `hypot(a, b)`. The raw coefficients are kept if the norm is zero.
    #[must_use]
    pub fn from_polar(r0: f64, x0: f64, theta_deg: f64) -> Self {
        let (sin, cos) = theta_deg.to_radians().sin_cos();
        let a = -sin;
        let b = cos;
        let c = sin * r0 - cos * x0;
        let norm = a.hypot(b);
        if norm > 0.0 {
            Self::new(a / norm, b / norm, c / norm)
        } else {
            Self::new(a, b, c)
        }
    }

    /// Evaluates `a·R + b·X + c` at `p`.
    #[must_use]
    pub fn eval(&self, p: &Point2) -> f64 {
        self.a * p.x + self.b * p.y + self.c
    }

    /// Returns `true` if `(a, b)` is (numerically) the null direction.
    #[must_use]
    pub fn is_degenerate(&self) -> bool {
        self.a.hypot(self.b) < TOLERANCE
    }
}

/// Which side of a line a half-plane keeps.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum KeepSide {
    /// Keeps points where `a·R + b·X + c ≥ 0`.
    Left,
    /// Keeps points where `a·R + b·X + c ≤ 0`.
    Right,
}

impl KeepSide {
    /// Whether a line-equation value lies on the kept side, within `TOLERANCE`.
    #[must_use]
    pub fn keeps(self, value: f64) -> bool {
        match self {
            Self::Left => value >= -TOLERANCE,
            Self::Right => value <= TOLERANCE,
        }
    }
}

/// A named boundary line in polar-anchor form: passes through `(r0, x0)`
/// with inclination `theta_deg`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct PolarLine {
    pub name: &'static str,
    pub r0: f64,
    pub x0: f64,
    pub theta_deg: f64,
    /// Side to keep. `None` until side selection has run; clipping treats
    /// `None` as [`KeepSide::Left`].
    pub keep_side: Option<KeepSide>,
}

impl PolarLine {
    /// Creates a polar line with no side assigned yet.
    #[must_use]
    pub fn new(name: &'static str, r0: f64, x0: f64, theta_deg: f64) -> Self {
        Self {
            name,
            r0,
            x0,
            theta_deg,
            keep_side: None,
        }
    }

    /// Returns a copy with the given side assigned.
    #[must_use]
    pub fn with_side(mut self, side: KeepSide) -> Self {
        self.keep_side = Some(side);
        self
    }

    /// Canonical form of this line.
    #[must_use]
    pub fn to_line(&self) -> Line {
        Line::from_polar(self.r0, self.x0, self.theta_deg)
    }

    /// The side to keep when clipping.
    #[must_use]
    pub fn side(&self) -> KeepSide {
        self.keep_side.unwrap_or(KeepSide::Left)
    }
}
