pub mod intersect_2d;
pub mod line_2d;
pub mod phasor;
pub mod polygon_2d;

pub use line_2d::{KeepSide, Line, PolarLine};
pub use phasor::{Phasor, PhasorInput};

/// Point in the resistance–reactance plane (`x` = R, `y` = X).
pub type Point2 = nalgebra::Point2<f64>;

/// Global geometric tolerance for floating-point comparisons.
pub const TOLERANCE: f64 = 1e-10;

/// Normalizes an angle in degrees to `[0, 360)`.
#[must_use]
pub fn normalize_deg(angle: f64) -> f64 {
    let a = angle.rem_euclid(360.0);
    // rem_euclid can round up to exactly 360 for tiny negative inputs.
    if a >= 360.0 {
        0.0
    } else {
        a
    }
}

/// Signed smallest angular difference from `a` to `b`, in `(-180, 180]` degrees.
#[must_use]
pub fn signed_smallest_delta_deg(a: f64, b: f64) -> f64 {
    let mut d = normalize_deg(b) - normalize_deg(a);
    if d > 180.0 {
        d -= 360.0;
    }
    if d <= -180.0 {
        d += 360.0;
    }
    d
}

#[cfg(test)]
mod tests {
    use approx::assert_abs_diff_eq;

    use super::*;

    #[test]
    fn normalize_wraps_into_range() {
        assert_abs_diff_eq!(normalize_deg(370.0), 10.0, epsilon = 1e-12);
        assert_abs_diff_eq!(normalize_deg(-30.0), 330.0, epsilon = 1e-12);
        assert_abs_diff_eq!(normalize_deg(720.0), 0.0, epsilon = 1e-12);
        assert!(normalize_deg(-1e-18) < 360.0);
    }

    #[test]
    fn smallest_delta_picks_short_way() {
        assert_abs_diff_eq!(signed_smallest_delta_deg(350.0, 10.0), 20.0, epsilon = 1e-12);
        assert_abs_diff_eq!(signed_smallest_delta_deg(10.0, 350.0), -20.0, epsilon = 1e-12);
        assert_abs_diff_eq!(signed_smallest_delta_deg(0.0, 180.0), 180.0, epsilon = 1e-12);
        assert_abs_diff_eq!(signed_smallest_delta_deg(180.0, 0.0), 180.0, epsilon = 1e-12);
    }
}
