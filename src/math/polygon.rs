//! Planar polygon helpers used by the obstacle field.

use super::{direction, rot90, Point2d, Vector2d};
use cgmath::prelude::*;

/// Offset vertices are never pushed further than this multiple of the radius,
/// which keeps very sharp corners from producing far-flung nodes.
const MITRE_LIMIT: f64 = 4.0;

/// Computes the signed area of a polygon.
/// Positive for counter-clockwise winding.
pub fn signed_area(polygon: &[Point2d]) -> f64 {
    let n = polygon.len();
    let twice: f64 = (0..n)
        .map(|i| {
            let (a, b) = (polygon[i], polygon[(i + 1) % n]);
            a.x * b.y - b.x * a.y
        })
        .sum();
    0.5 * twice
}

/// Returns true if `point` lies strictly inside the polygon (even-odd rule).
pub fn point_in_polygon(point: Point2d, polygon: &[Point2d]) -> bool {
    let n = polygon.len();
    let mut inside = false;
    let mut j = n.wrapping_sub(1);
    for i in 0..n {
        let (a, b) = (polygon[i], polygon[j]);
        if (a.y > point.y) != (b.y > point.y) {
            let x = a.x + (point.y - a.y) / (b.y - a.y) * (b.x - a.x);
            if point.x < x {
                inside = !inside;
            }
        }
        j = i;
    }
    inside
}

/// The orientation of the triangle `a`, `b`, `c`.
fn orient(a: Point2d, b: Point2d, c: Point2d) -> f64 {
    (b - a).perp_dot(c - a)
}

/// Returns true if the open segments `ab` and `cd` properly cross.
/// Segments which merely touch at an end point or run collinear do not count.
pub fn segments_cross(a: Point2d, b: Point2d, c: Point2d, d: Point2d) -> bool {
    const EPS: f64 = 1e-9;
    let (d1, d2) = (orient(a, b, c), orient(a, b, d));
    let (d3, d4) = (orient(c, d, a), orient(c, d, b));
    ((d1 > EPS && d2 < -EPS) || (d1 < -EPS && d2 > EPS))
        && ((d3 > EPS && d4 < -EPS) || (d3 < -EPS && d4 > EPS))
}

/// The distance from `point` to the closed segment `ab`.
pub fn distance_to_segment(point: Point2d, a: Point2d, b: Point2d) -> f64 {
    let ab = b - a;
    let len2 = ab.magnitude2();
    let t = if len2 > 0.0 {
        ((point - a).dot(ab) / len2).clamp(0.0, 1.0)
    } else {
        0.0
    };
    point.distance(a + ab * t)
}

/// Returns true if the segment `ab` passes through the interior of the polygon.
/// Segments running along the boundary do not count.
pub fn segment_enters_polygon(a: Point2d, b: Point2d, polygon: &[Point2d]) -> bool {
    const EPS: f64 = 1e-7;
    let n = polygon.len();
    let crosses = (0..n).any(|i| segments_cross(a, b, polygon[i], polygon[(i + 1) % n]));
    let mid = a.midpoint(b);
    crosses
        || (point_in_polygon(mid, polygon)
            && (0..n).all(|i| distance_to_segment(mid, polygon[i], polygon[(i + 1) % n]) > EPS))
}

/// Pushes every vertex of the polygon outwards by `radius` using a mitred offset.
/// The winding of the input polygon is preserved.
pub fn offset_polygon(polygon: &[Point2d], radius: f64) -> Vec<Point2d> {
    let n = polygon.len();
    if n < 3 {
        return polygon.to_vec();
    }
    // Outward normals are clockwise of the edge for CCW polygons
    let sign = if signed_area(polygon) >= 0.0 { -1.0 } else { 1.0 };
    let normal = |a: Point2d, b: Point2d| -> Vector2d {
        direction(b - a)
            .map(|t| sign * rot90(t))
            .unwrap_or_else(Vector2d::zero)
    };

    (0..n)
        .map(|i| {
            let prev = polygon[(i + n - 1) % n];
            let curr = polygon[i];
            let next = polygon[(i + 1) % n];
            let n_in = normal(prev, curr);
            let n_out = normal(curr, next);
            match direction(n_in + n_out) {
                Some(bisector) => {
                    let cos = bisector.dot(n_out).max(1.0 / MITRE_LIMIT);
                    curr + bisector * (radius / cos)
                }
                None => curr + n_out * radius,
            }
        })
        .collect()
}
