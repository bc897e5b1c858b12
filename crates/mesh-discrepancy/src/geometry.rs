//! Point and vector primitives used by the discrepancy search.

use nalgebra::{Point3, Vector3};

/// Euclidean distance between two points.
#[inline]
pub fn distance(p1: &Point3<f64>, p2: &Point3<f64>) -> f64 {
    (p2 - p1).norm()
}

/// Angle between two vectors, in degrees within [0, 180].
///
/// If either vector has zero length the angle is reported as 0.0
/// instead of NaN. Coincident probe and target points therefore never pass
/// an angular threshold of one degree or more.
///
/// # Example
///
/// ```
/// use mesh_discrepancy::geometry::angle_between;
/// use nalgebra::Vector3;
///
/// let a = angle_between(&Vector3::x(), &Vector3::y());
/// assert!((a - 90.0).abs() < 1e-12);
/// assert_eq!(angle_between(&Vector3::x(), &Vector3::zeros()), 0.0);
/// ```
#[inline]
pub fn angle_between(v1: &Vector3<f64>, v2: &Vector3<f64>) -> f64 {
    let (n1, n2) = (v1.norm(), v2.norm());
    if n1 == 0.0 || n2 == 0.0 {
        return 0.0;
    }

    // Rounding can push the cosine slightly outside [-1, 1]
    // Dividing each vector first keeps tiny inputs out of the subnormal range
    let cos_theta = (v1 / n1).dot(&(v2 / n2)).clamp(-1.0, 1.0);
    cos_theta.acos().to_degrees()
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_distance() {
        let a = Point3::new(0.0, 0.0, 0.0);
        let b = Point3::new(3.0, 4.0, 12.0);
        assert_relative_eq!(distance(&a, &b), 13.0);
        assert_relative_eq!(distance(&b, &a), 13.0);
        assert_eq!(distance(&a, &a), 0.0);
    }

    #[test]
    fn test_angle_orthogonal_and_opposite() {
        assert_relative_eq!(angle_between(&Vector3::z(), &Vector3::x()), 90.0, epsilon = 1e-12);
        assert_relative_eq!(angle_between(&Vector3::z(), &-Vector3::z()), 180.0, epsilon = 1e-12);
        assert_relative_eq!(angle_between(&Vector3::z(), &(Vector3::z() * 7.0)), 0.0, epsilon = 1e-6);
    }

    #[test]
    fn test_angle_ignores_magnitude() {
        let a = angle_between(&Vector3::new(1.0, 1.0, 0.0), &Vector3::x());
        let b = angle_between(&Vector3::new(10.0, 10.0, 0.0), &(Vector3::x() * 0.001));
        assert_relative_eq!(a, 45.0, epsilon = 1e-10);
        assert_relative_eq!(b, 45.0, epsilon = 1e-10);
    }

    #[test]
    fn test_zero_vector_angle_is_zero_not_nan() {
        let coincident = Point3::new(1.0, 2.0, 3.0) - Point3::new(1.0, 2.0, 3.0);
        let angle = angle_between(&Vector3::z(), &coincident);
        assert!(!angle.is_nan());
        assert_eq!(angle, 0.0);

        assert_eq!(angle_between(&Vector3::zeros(), &Vector3::x()), 0.0);
    }

    #[test]
    fn test_short_vectors_keep_their_angle() {
        let a = Vector3::new(1e-8, 0.0, 0.0);
        let b = Vector3::new(0.0, 1e-8, 0.0);
        assert_relative_eq!(angle_between(&a, &b), 90.0, epsilon = 1e-9);

        let tiny = Vector3::new(0.0, 3e-12, 3e-12);
        assert_relative_eq!(angle_between(&Vector3::z(), &tiny), 45.0, epsilon = 1e-9);
    }

    #[test]
    fn test_nearly_parallel_does_not_produce_nan() {
        let v = Vector3::new(0.1, 0.2, 0.3);
        let angle = angle_between(&v, &(v * 3.0));
        assert!(angle.is_finite());
        assert!(angle < 1e-5);
    }
}
