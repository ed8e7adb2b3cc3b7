use serde::Serialize;
use tracing::debug;

use super::intersect_2d::intersect_segment_with_line;
use super::{KeepSide, Line, Point2, PolarLine, TOLERANCE};

/// Points closer than this are merged by [`dedup_collinear`].
const DEDUP_DIST: f64 = 1e-9;

/// Cross products below this mark three points as collinear.
const COLLINEAR_CROSS: f64 = 1e-12;

/// An axis-aligned box in the R-X plane.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Bounds {
    pub r_min: f64,
    pub r_max: f64,
    pub x_min: f64,
    pub x_max: f64,
}

impl Bounds {
    /// Creates a new box.
    #[must_use]
    pub fn new(r_min: f64, r_max: f64, x_min: f64, x_max: f64) -> Self {
        Self {
            r_min,
            r_max,
            x_min,
            x_max,
        }
    }

    /// The box as a counter-clockwise rectangle, starting at `(r_min, x_min)`.
    #[must_use]
    pub fn to_polygon(&self) -> Vec<Point2> {
        vec![
            Point2::new(self.r_min, self.x_min),
            Point2::new(self.r_max, self.x_min),
            Point2::new(self.r_max, self.x_max),
            Point2::new(self.r_min, self.x_max),
        ]
    }

    /// The larger of the two side lengths.
    #[must_use]
    pub fn span(&self) -> f64 {
        (self.r_max - self.r_min).max(self.x_max - self.x_min)
    }

    /// Whether `p` lies inside the box, with `eps` slack on every side.
    #[must_use]
    pub fn contains_eps(&self, p: &Point2, eps: f64) -> bool {
        p.x >= self.r_min - eps
            && p.x <= self.r_max + eps
            && p.y >= self.x_min - eps
            && p.y <= self.x_max + eps
    }
}

/// Computes the signed area of a polygon (shoelace formula).
///
/// Positive for counter-clockwise, negative for clockwise.
#[must_use]
pub fn signed_area_2d(points: &[Point2]) -> f64 {
    let n = points.len();
    if n < 3 {
        return 0.0;
    }
    let mut sum = 0.0;
    for i in 0..n {
        let j = (i + 1) % n;
        sum += points[i].x * points[j].y - points[j].x * points[i].y;
    }
    sum * 0.5
}

/// Vertex average of a polygon. `None` for an empty polygon.
#[must_use]
pub fn centroid(points: &[Point2]) -> Option<Point2> {
    if points.is_empty() {
        return None;
    }
    #[allow(clippy::cast_precision_loss)]
    let n = points.len() as f64;
    let (sx, sy) = points
        .iter()
        .fold((0.0, 0.0), |(sx, sy), p| (sx + p.x, sy + p.y));
    Some(Point2::new(sx / n, sy / n))
}

/// Sorts points counter-clockwise by their angle around the vertex centroid.
///
/// The sort is stable: points at the same angle keep their input order.
pub fn sort_by_centroid_angle(points: &mut [Point2]) {
    let Some(c) = centroid(points) else {
        return;
    };
    points.sort_by(|p, q| {
        let ap = (p.y - c.y).atan2(p.x - c.x);
        let aq = (q.y - c.y).atan2(q.x - c.x);
        ap.total_cmp(&aq)
    });
}

/// Removes consecutive near-duplicate points, then points lying on the line
/// through their two neighbours (cyclic).
///
/// Never reduces the polygon below 2 points.
#[must_use]
pub fn dedup_collinear(points: &[Point2]) -> Vec<Point2> {
    if points.len() <= 2 {
        return points.to_vec();
    }

    let mut uniq: Vec<Point2> = Vec::with_capacity(points.len());
    for p in points {
        if uniq.last().is_none_or(|q| (p - q).norm() > DEDUP_DIST) {
            uniq.push(*p);
        }
    }
    // Closing edge.
    while uniq.len() > 2 && (uniq[uniq.len() - 1] - uniq[0]).norm() <= DEDUP_DIST {
        uniq.pop();
    }

    while uniq.len() > 2 {
        let n = uniq.len();
        let collinear = (0..n).find(|&i| {
            let a = uniq[(i + n - 1) % n];
            let b = uniq[i];
            let c = uniq[(i + 1) % n];
            let v1 = b - a;
            let v2 = c - b;
            (v1.x * v2.y - v1.y * v2.x).abs() <= COLLINEAR_CROSS
        });
        match collinear {
            Some(i) => {
                uniq.remove(i);
            }
            None => break,
        }
    }
    uniq
}

/// Clips a polygon against a half-plane (one Sutherland–Hodgman pass).
///
/// For each cyclic edge `A → B`:
/// - both inside: emit `B`
/// - leaving: emit the boundary crossing
/// - entering: emit the crossing, then `B`
/// - both outside: emit nothing
///
/// The result is cleaned with [`dedup_collinear`]. An empty input gives an
/// empty output.
#[must_use]
pub fn clip_polygon_with_half_plane(points: &[Point2], line: &Line, keep: KeepSide) -> Vec<Point2> {
    if points.is_empty() {
        return Vec::new();
    }

    let n = points.len();
    let mut out = Vec::with_capacity(n + 1);
    for i in 0..n {
        let a = &points[i];
        let b = &points[(i + 1) % n];
        let a_in = keep.keeps(line.eval(a));
        let b_in = keep.keeps(line.eval(b));

        match (a_in, b_in) {
            (true, true) => out.push(*b),
            (true, false) => out.extend(intersect_segment_with_line(a, b, line)),
            (false, true) => {
                out.extend(intersect_segment_with_line(a, b, line));
                out.push(*b);
            }
            (false, false) => {}
        }
    }

    dedup_collinear(&out)
}

/// Result of clipping a bounding box by a sequence of polar lines.
#[derive(Debug, Clone, Default, Serialize)]
pub struct ClippedRegion {
    /// Region vertices, sorted counter-clockwise around their centroid.
    /// Empty if some clip removed everything.
    pub polygon: Vec<Point2>,
    /// The lines applied before the region vanished (all of them on success).
    pub used_lines: Vec<PolarLine>,
}

/// Builds a convex region by successive half-plane clips of `bounds`.
///
/// Each line is converted to canonical form and clipped on its assigned
/// side. If a clip empties the polygon the remaining lines are skipped and
/// an empty polygon is returned together with the lines used so far.
#[must_use]
pub fn build_region_from_polar_lines(lines: &[PolarLine], bounds: &Bounds) -> ClippedRegion {
    let mut polygon = bounds.to_polygon();
    let mut used_lines = Vec::with_capacity(lines.len());

    for polar in lines {
        let clipped = clip_polygon_with_half_plane(&polygon, &polar.to_line(), polar.side());
        debug!(
            line = polar.name,
            side = ?polar.side(),
            vertices = clipped.len(),
            "clipped region"
        );
        if clipped.is_empty() {
            return ClippedRegion {
                polygon: Vec::new(),
                used_lines,
            };
        }
        polygon = clipped;
        used_lines.push(*polar);
    }

    sort_by_centroid_angle(&mut polygon);
    ClippedRegion {
        polygon,
        used_lines,
    }
}

/// Whether `p` lies inside (or on) a convex counter-clockwise polygon.
///
/// Polygons with fewer than 3 vertices contain nothing.
#[must_use]
pub fn convex_contains(points: &[Point2], p: &Point2) -> bool {
    let n = points.len();
    if n < 3 {
        return false;
    }
    (0..n).all(|i| {
        let a = points[i];
        let b = points[(i + 1) % n];
        let edge = b - a;
        let to_p = p - a;
        let scale = edge.norm().max(1.0);
        edge.x * to_p.y - edge.y * to_p.x >= -TOLERANCE * scale
    })
}
