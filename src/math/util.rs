use super::{Point2d, Vector2d};
use cgmath::prelude::*;

/// Vectors shorter than this are treated as having no direction.
const MIN_DIRECTION_LEN: f64 = 1e-9;

/// Rotates a vector 90 degrees counter-clockwise.
pub fn rot90(vec: Vector2d) -> Vector2d {
    Vector2d::new(-vec.y, vec.x)
}

/// Normalises a vector, returning `None` if it is too short
/// (or too corrupt) to have a meaningful direction.
pub fn direction(vec: Vector2d) -> Option<Vector2d> {
    let mag = vec.magnitude();
    if mag.is_finite() && mag > MIN_DIRECTION_LEN {
        Some(vec / mag)
    } else {
        None
    }
}

/// Scales `vec` down so that its magnitude does not exceed `max`.
/// Vectors already within the limit are returned untouched.
pub fn clamp_magnitude(vec: Vector2d, max: f64) -> Vector2d {
    let mag2 = vec.magnitude2();
    if mag2 > max * max {
        vec * (max / mag2.sqrt())
    } else {
        vec
    }
}

/// Whether both coordinates of the point are finite.
pub fn is_finite_point(point: Point2d) -> bool {
    point.x.is_finite() && point.y.is_finite()
}

/// Whether both components of the vector are finite.
pub fn is_finite_vector(vec: Vector2d) -> bool {
    vec.x.is_finite() && vec.y.is_finite()
}

#[cfg(test)]
mod test {
    use super::*;
    use assert_approx_eq::assert_approx_eq;

    #[test]
    fn clamp_only_shrinks() {
        let v = clamp_magnitude(Vector2d::new(30.0, 40.0), 10.0);
        assert_approx_eq!(v.magnitude(), 10.0);
        assert_approx_eq!(v.x, 6.0);

        let v = Vector2d::new(0.3, 0.4);
        assert_eq!(clamp_magnitude(v, 10.0), v);
    }

    #[test]
    fn degenerate_direction() {
        assert!(direction(Vector2d::new(0.0, 0.0)).is_none());
        assert!(direction(Vector2d::new(f64::NAN, 1.0)).is_none());
        let dir = direction(Vector2d::new(0.0, -3.0)).unwrap();
        assert_approx_eq!(dir.y, -1.0);
    }
}
