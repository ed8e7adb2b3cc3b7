use serde::Serialize;
use tracing::{debug, warn};

use super::polar_lines::LoopGeometry;
use super::settings::Direction;
use crate::error::GeometryError;
use crate::math::intersect_2d::clip_line_to_box;
use crate::math::polygon_2d::{build_region_from_polar_lines, convex_contains, Bounds};
use crate::math::{signed_smallest_delta_deg, KeepSide, Point2, PolarLine, TOLERANCE};

/// Fraction of the bounds span at which the anchor is placed.
const ANCHOR_FRACTION: f64 = 0.01;

/// Below this, the anchor is considered to lie on a line.
const ON_LINE_EPS: f64 = 1e-12;

/// Tie-break offset applied to an anchor lying on a line.
const ANCHOR_NUDGE: (f64, f64) = (1e-6, 2e-6);

/// Bounds expansion factor relative to the reaches.
const BOUNDS_MARGIN: f64 = 1.5;

/// A point inside the supervision wedge spanned by `theta1` and `theta6`.
///
/// The point sits on the bisector of the smallest signed turn from `theta1`
/// to `theta6`, at 1% of the larger bounds side from the origin.
#[must_use]
pub fn compute_anchor(theta1: f64, theta6: f64, bounds: &Bounds) -> Point2 {
    let bisector = theta1 + signed_smallest_delta_deg(theta1, theta6) / 2.0;
    let radius = ANCHOR_FRACTION * bounds.span();
    let (sin, cos) = bisector.to_radians().sin_cos();
    Point2::new(radius * cos, radius * sin)
}

/// Assigns each line the side that contains `anchor`.
///
/// A line evaluating to `≥ 0` at the anchor keeps [`KeepSide::Left`],
/// otherwise [`KeepSide::Right`]. An anchor lying on a line is nudged by a
/// fixed offset before testing that line.
#[must_use]
pub fn auto_sides(lines: &[PolarLine], anchor: Point2) -> Vec<PolarLine> {
    lines
        .iter()
        .map(|polar| {
            let line = polar.to_line();
            let mut value = line.eval(&anchor);
            if value.abs() < ON_LINE_EPS {
                let nudged = Point2::new(anchor.x + ANCHOR_NUDGE.0, anchor.y + ANCHOR_NUDGE.1);
                value = line.eval(&nudged);
            }
            let side = if value >= 0.0 {
                KeepSide::Left
            } else {
                KeepSide::Right
            };
            debug!(line = polar.name, ?side, "side selected");
            polar.with_side(side)
        })
        .collect()
}

/// Working box for a loop: `1.5×` the resistive reach on both sides, and
/// from `1.5×` the reverse reach below the origin to `1.5×` the forward reach
/// above it. A reach of (nearly) zero counts as 1.
#[must_use]
pub fn zone_bounds(geometry: &LoopGeometry) -> Bounds {
    let nonzero = |v: f64| if v.abs() < TOLERANCE { 1.0 } else { v.abs() };
    let r = BOUNDS_MARGIN * nonzero(geometry.resistive_reach);
    Bounds::new(
        -r,
        r,
        -BOUNDS_MARGIN * nonzero(geometry.reverse_reach),
        BOUNDS_MARGIN * nonzero(geometry.forward_reach),
    )
}

/// Visible part of a boundary line inside the working box.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct LineSegment {
    pub name: &'static str,
    pub start: Point2,
    pub end: Point2,
}

/// Operating region of one fault loop in one direction.
#[derive(Debug, Clone, Serialize)]
pub struct Region {
    /// Vertices in counter-clockwise order around the centroid.
    pub polygon: Vec<Point2>,
    /// Boundary lines with their selected sides.
    pub lines: Vec<PolarLine>,
    pub anchor: Point2,
    pub bounds: Bounds,
    /// Visible segments of the lines that took part in the clip.
    pub segments: Vec<LineSegment>,
    /// Set when the polygon has fewer than 3 vertices.
    pub warning: Option<GeometryError>,
}

impl Region {
    /// Clips `bounds` by lines whose sides are already assigned.
    #[must_use]
    pub fn from_sided_lines(lines: Vec<PolarLine>, anchor: Point2, bounds: Bounds) -> Self {
        let clipped = build_region_from_polar_lines(&lines, &bounds);

        let segments = clipped
            .used_lines
            .iter()
            .filter_map(|polar| {
                clip_line_to_box(&polar.to_line(), &bounds).map(|[start, end]| LineSegment {
                    name: polar.name,
                    start,
                    end,
                })
            })
            .collect();

        let warning = if clipped.polygon.len() < 3 {
            let message = format!(
                "region has {} vertices after {} of {} clips",
                clipped.polygon.len(),
                clipped.used_lines.len(),
                lines.len()
            );
            warn!(%message, "degenerate operating region");
            Some(GeometryError::Degenerate(message))
        } else {
            None
        };

        Self {
            polygon: clipped.polygon,
            lines,
            anchor,
            bounds,
            segments,
            warning,
        }
    }

    /// Whether the impedance `z = R + jX` lies inside (or on) the region.
    #[must_use]
    pub fn contains(&self, z: &Point2) -> bool {
        convex_contains(&self.polygon, z)
    }

    #[must_use]
    pub fn is_degenerate(&self) -> bool {
        self.warning.is_some()
    }
}

/// Builds the quadrilateral operating region of one fault loop.
pub struct RegionBuilder {
    geometry: LoopGeometry,
    direction: Direction,
}

impl RegionBuilder {
    /// Creates a new `RegionBuilder` for `geometry` looking into `direction`.
    #[must_use]
    pub fn new(geometry: LoopGeometry, direction: Direction) -> Self {
        Self {
            geometry,
            direction,
        }
    }

    /// Lays out the six lines, picks the anchor and sides, and clips.
    ///
    /// Never fails: a degenerate region is returned with
    /// [`Region::warning`] set.
    #[must_use]
    pub fn execute(&self) -> Region {
        let bounds = zone_bounds(&self.geometry);
        let (theta1, theta6) = self.geometry.supervision_thetas(self.direction);
        let anchor = compute_anchor(theta1, theta6, &bounds);
        debug!(
            kind = ?self.geometry.kind,
            direction = ?self.direction,
            anchor_r = anchor.x,
            anchor_x = anchor.y,
            "anchor computed"
        );

        let lines = auto_sides(&self.geometry.polar_lines(self.direction), anchor);
        Region::from_sided_lines(lines, anchor, bounds)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use approx::assert_abs_diff_eq;

    use super::*;
    use crate::math::polygon_2d::signed_area_2d;
    use crate::math::PhasorInput;
    use crate::operations::distance::settings::{
        DirectionalSupervision, GroundLoopSettings, LoopSettings, ZoneSettings,
    };

    fn zone(blinder_angle: f64) -> ZoneSettings {
        let reach = LoopSettings {
            enabled: true,
            resistive_reach: 10.0,
            forward_reach: 8.0,
            reverse_reach: 2.0,
            blinder_angle,
            tilt: None,
        };
        ZoneSettings {
            number: 2,
            direction: Direction::Forward,
            characteristic_angle: 75.0,
            phase: reach,
            ground: GroundLoopSettings {
                reach,
                kn: PhasorInput::default(),
            },
        }
    }

    fn has_vertex(region: &Region, r: f64, x: f64) -> bool {
        region
            .polygon
            .iter()
            .any(|p| (p.x - r).abs() < 1e-2 && (p.y - x).abs() < 1e-2)
    }

    #[test]
    fn anchor_on_bisector() {
        let bounds = Bounds::new(-15.0, 15.0, -3.0, 12.0);
        let anchor = compute_anchor(-40.0, 130.0, &bounds);
        let expected = 0.3 * 45f64.to_radians().cos();
        assert_abs_diff_eq!(anchor.x, expected, epsilon = 1e-12);
        assert_abs_diff_eq!(anchor.y, expected, epsilon = 1e-12);
    }

    #[test]
    fn anchor_across_wraparound() {
        let bounds = Bounds::new(-1.0, 1.0, -1.0, 1.0);
        let anchor = compute_anchor(170.0, -170.0, &bounds);
        assert_abs_diff_eq!(anchor.x, -0.02, epsilon = 1e-12);
        assert_abs_diff_eq!(anchor.y, 0.0, epsilon = 1e-12);
    }

    #[test]
    fn sides_follow_anchor() {
        let lines = [
            PolarLine::new("h", 0.0, 0.0, 0.0),
            PolarLine::new("v", 0.0, 0.0, 90.0),
        ];
        let sided = auto_sides(&lines, Point2::new(1.0, 1.0));
        assert_eq!(sided[0].keep_side, Some(KeepSide::Left));
        assert_eq!(sided[1].keep_side, Some(KeepSide::Right));
    }

    #[test]
    fn anchor_on_line_is_nudged() {
        let lines = [
            PolarLine::new("h", 0.0, 0.0, 0.0),
            PolarLine::new("v", 0.0, 0.0, 90.0),
        ];
        let sided = auto_sides(&lines, Point2::origin());
        // Nudge (1e-6, 2e-6): above the horizontal, right of the vertical.
        assert_eq!(sided[0].keep_side, Some(KeepSide::Left));
        assert_eq!(sided[1].keep_side, Some(KeepSide::Right));
    }

    #[test]
    fn bounds_use_fallback_for_zero_reach() {
        let mut z = zone(90.0);
        z.phase.resistive_reach = 0.0;
        z.phase.reverse_reach = 0.0;
        let geom = LoopGeometry::phase(&z, &DirectionalSupervision::default());
        let b = zone_bounds(&geom);
        assert_abs_diff_eq!(b.r_min, -1.5);
        assert_abs_diff_eq!(b.r_max, 1.5);
        assert_abs_diff_eq!(b.x_min, -1.5);
        assert_abs_diff_eq!(b.x_max, 12.0);
    }

    #[test]
    fn forward_phase_region_with_vertical_blinder() {
        let geom = LoopGeometry::phase(&zone(90.0), &DirectionalSupervision::default());
        let region = RegionBuilder::new(geom, Direction::Forward).execute();

        assert!(region.warning.is_none());
        assert_eq!(region.polygon.len(), 5);
        assert!(signed_area_2d(&region.polygon) > 0.0);
        for p in &region.polygon {
            assert!(p.x >= -10.0 - 1e-9 && p.x <= 10.0 + 1e-9, "R out of reach: {p}");
            assert!(p.y >= -2.0 - 1e-9 && p.y <= 8.0 + 1e-9, "X out of reach: {p}");
        }
        assert!(has_vertex(&region, 0.0, 0.0));
        assert!(has_vertex(&region, 2.38, -2.0));
        assert!(has_vertex(&region, 10.0, -2.0));
        assert!(has_vertex(&region, 10.0, 8.0));
        assert!(has_vertex(&region, -6.71, 8.0));

        assert!(region.contains(&Point2::new(5.0, 3.0)));
        assert!(!region.contains(&Point2::new(-5.0, -1.0)));
        assert_eq!(region.segments.len(), 6);
    }

    #[test]
    fn reverse_phase_region_points_backwards() {
        let geom = LoopGeometry::phase(&zone(90.0), &DirectionalSupervision::default());
        let region = RegionBuilder::new(geom, Direction::Reverse).execute();

        assert!(region.warning.is_none());
        assert!(region.contains(&Point2::new(-5.0, 0.0)));
        assert!(!region.contains(&Point2::new(5.0, 3.0)));
        for p in &region.polygon {
            assert!(p.x >= -10.0 - 1e-9 && p.x <= 10.0 + 1e-9);
            assert!(p.y >= -2.0 - 1e-9 && p.y <= 8.0 + 1e-9);
        }
    }

    #[test]
    fn horizontal_blinder_keeps_reactance_band() {
        let geom = LoopGeometry::phase(&zone(0.0), &DirectionalSupervision::default());
        let region = RegionBuilder::new(geom, Direction::Forward).execute();

        assert!(region.warning.is_none());
        assert!(region.polygon.len() >= 3);
        for p in &region.polygon {
            assert!(p.y >= -2.0 - 1e-9 && p.y <= 8.0 + 1e-9);
        }
        assert!(region.contains(&Point2::new(10.0, 0.0)));
    }

    #[test]
    fn contradictory_lines_warn() {
        let lines = vec![
            PolarLine::new("low", 0.0, 1.0, 0.0).with_side(KeepSide::Right),
            PolarLine::new("high", 0.0, 2.0, 0.0).with_side(KeepSide::Left),
        ];
        let bounds = Bounds::new(-5.0, 5.0, -5.0, 5.0);
        let region = Region::from_sided_lines(lines, Point2::origin(), bounds);
        assert!(region.polygon.is_empty());
        assert!(region.is_degenerate());
        assert!(matches!(region.warning, Some(GeometryError::Degenerate(_))));
        assert!(!region.contains(&Point2::origin()));
    }
}
