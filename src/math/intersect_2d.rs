use super::polygon_2d::Bounds;
use super::{Line, Point2, TOLERANCE};

/// Distance under which two box-edge hits count as the same point (a corner).
const BOX_HIT_DEDUP: f64 = 1e-7;

/// Intersection of two canonical lines by Cramer's rule.
///
/// Returns `None` when `|det| < TOLERANCE` (parallel or coincident lines).
#[must_use]
pub fn intersect_lines(l1: &Line, l2: &Line) -> Option<Point2> {
    let det = l1.a * l2.b - l2.a * l1.b;
    if det.abs() < TOLERANCE {
        return None;
    }
    let r = (l1.b * l2.c - l2.b * l1.c) / det;
    let x = (l2.a * l1.c - l1.a * l2.c) / det;
    Some(Point2::new(r, x))
}

/// Intersection of segment `a → b` with an infinite line.
///
/// Interpolates with `t = f(a) / (f(a) − f(b))` where `f` is the line
/// equation. Returns `None` if the segment is parallel to the line or `t`
/// falls outside `[0, 1]` (with `TOLERANCE` slack on both ends).
#[must_use]
pub fn intersect_segment_with_line(a: &Point2, b: &Point2, line: &Line) -> Option<Point2> {
    let fa = line.eval(a);
    let fb = line.eval(b);
    let denom = fa - fb;
    if denom.abs() < TOLERANCE {
        return None;
    }
    let t = fa / denom;
    if !(-TOLERANCE..=1.0 + TOLERANCE).contains(&t) {
        return None;
    }
    Some(a + (b - a) * t)
}

/// Visible segment of a line inside an axis-aligned box.
///
/// Intersects the line with the four box edges, keeps hits on the box,
/// merges near-duplicates (corners), and returns the two lexicographically
/// extreme points. Returns `None` if the line misses the box or only
/// touches it at one point.
#[must_use]
pub fn clip_line_to_box(line: &Line, bounds: &Bounds) -> Option<[Point2; 2]> {
    let edges = [
        Line::new(1.0, 0.0, -bounds.r_min),
        Line::new(1.0, 0.0, -bounds.r_max),
        Line::new(0.0, 1.0, -bounds.x_min),
        Line::new(0.0, 1.0, -bounds.x_max),
    ];

    let mut hits: Vec<Point2> = Vec::with_capacity(4);
    for edge in &edges {
        let Some(p) = intersect_lines(line, edge) else {
            continue;
        };
        if !bounds.contains_eps(&p, TOLERANCE) {
            continue;
        }
        if hits.iter().all(|q| (p - q).norm() >= BOX_HIT_DEDUP) {
            hits.push(p);
        }
    }

    if hits.len() < 2 {
        return None;
    }
    hits.sort_by(|p, q| p.x.total_cmp(&q.x).then(p.y.total_cmp(&q.y)));
    Some([hits[0], hits[hits.len() - 1]])
}
