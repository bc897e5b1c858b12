//! World placement of a mesh as a 4x4 affine matrix.

use nalgebra::{Matrix3, Matrix4, Point3, Vector3};

/// A 3D affine transformation represented as a 4x4 matrix.
///
/// This is the object-to-world matrix of a placed mesh. Points are
/// transformed with the full matrix. Normals use the inverse transpose of the
/// upper 3x3 block, so they stay perpendicular to the surface under
/// non-uniform scale.
///
/// # Example
///
/// ```
/// use mesh_discrepancy::Transform3D;
/// use nalgebra::Point3;
///
/// let placement = Transform3D::uniform_scale(2.0).then(&Transform3D::translation(1.0, 0.0, 0.0));
/// let p = placement.transform_point(&Point3::new(1.0, 1.0, 1.0));
/// assert_eq!(p, Point3::new(3.0, 2.0, 2.0));
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Transform3D {
    matrix: Matrix4<f64>,
    /// Inverse transpose of the linear part, `None` if singular.
    normal_matrix: Option<Matrix3<f64>>,
}

impl Default for Transform3D {
    fn default() -> Self {
        Self::identity()
    }
}

impl Transform3D {
    /// Create a transformation from a 4x4 matrix.
    pub fn from_matrix(matrix: Matrix4<f64>) -> Self {
        let linear: Matrix3<f64> = matrix.fixed_view::<3, 3>(0, 0).into_owned();
        Self {
            matrix,
            normal_matrix: linear.try_inverse().map(|inv| inv.transpose()),
        }
    }

    /// The identity transformation.
    pub fn identity() -> Self {
        Self::from_matrix(Matrix4::identity())
    }

    /// Create a translation.
    pub fn translation(tx: f64, ty: f64, tz: f64) -> Self {
        Self::from_matrix(Matrix4::new_translation(&Vector3::new(tx, ty, tz)))
    }

    /// Create a uniform scaling about the origin.
    pub fn uniform_scale(factor: f64) -> Self {
        Self::scale(factor, factor, factor)
    }

    /// Create a non-uniform scaling about the origin.
    pub fn scale(sx: f64, sy: f64, sz: f64) -> Self {
        Self::from_matrix(Matrix4::new_nonuniform_scaling(&Vector3::new(sx, sy, sz)))
    }

    /// Rotation around the X axis, angle in radians.
    pub fn rotation_x(angle: f64) -> Self {
        Self::from_matrix(Matrix4::from_scaled_axis(Vector3::x() * angle))
    }

    /// Rotation around the Y axis, angle in radians.
    pub fn rotation_y(angle: f64) -> Self {
        Self::from_matrix(Matrix4::from_scaled_axis(Vector3::y() * angle))
    }

    /// Rotation around the Z axis, angle in radians.
    pub fn rotation_z(angle: f64) -> Self {
        Self::from_matrix(Matrix4::from_scaled_axis(Vector3::z() * angle))
    }

    /// The underlying 4x4 matrix.
    pub fn matrix(&self) -> &Matrix4<f64> {
        &self.matrix
    }

    /// Check whether this is exactly the identity.
    pub fn is_identity(&self) -> bool {
        self.matrix == Matrix4::identity()
    }

    /// Compose this transformation with another: applies `self` first, then `other`.
    pub fn then(&self, other: &Self) -> Self {
        Self::from_matrix(other.matrix * self.matrix)
    }

    /// Transform a point (applies translation).
    #[inline]
    pub fn transform_point(&self, point: &Point3<f64>) -> Point3<f64> {
        self.matrix.transform_point(point)
    }

    /// Transform a normal with the inverse transpose and renormalize.
    ///
    /// Returns the zero vector for a zero normal. A singular placement (zero
    /// scale on some axis) leaves the normal untransformed.
    #[inline]
    pub fn transform_normal(&self, normal: &Vector3<f64>) -> Vector3<f64> {
        let transformed = match &self.normal_matrix {
            Some(m) => m * normal,
            None => *normal,
        };
        transformed
            .try_normalize(f64::EPSILON)
            .unwrap_or_else(Vector3::zeros)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use std::f64::consts::FRAC_PI_2;

    #[test]
    fn test_identity() {
        let t = Transform3D::identity();
        assert!(t.is_identity());
        let p = Point3::new(1.0, 2.0, 3.0);
        assert_eq!(t.transform_point(&p), p);
        assert_relative_eq!(t.transform_normal(&Vector3::y()), Vector3::y());
    }

    #[test]
    fn test_translation_moves_points_not_normals() {
        let t = Transform3D::translation(10.0, 20.0, 30.0);
        let p = t.transform_point(&Point3::new(1.0, 2.0, 3.0));
        assert_relative_eq!(p, Point3::new(11.0, 22.0, 33.0));
        assert_relative_eq!(t.transform_normal(&Vector3::x()), Vector3::x());
    }

    #[test]
    fn test_rotation_z_rotates_normal() {
        let t = Transform3D::rotation_z(FRAC_PI_2);
        let n = t.transform_normal(&Vector3::x());
        assert_relative_eq!(n, Vector3::y(), epsilon = 1e-12);
        let p = t.transform_point(&Point3::new(1.0, 0.0, 0.0));
        assert_relative_eq!(p, Point3::new(0.0, 1.0, 0.0), epsilon = 1e-12);
    }

    #[test]
    fn test_non_uniform_scale_keeps_normal_perpendicular() {
        // Plane x + y = 1 has normal (1, 1, 0) / sqrt(2)
        let t = Transform3D::scale(2.0, 1.0, 1.0);
        let a = t.transform_point(&Point3::new(1.0, 0.0, 0.0));
        let b = t.transform_point(&Point3::new(0.0, 1.0, 0.0));
        let tangent = b - a;

        let n = t.transform_normal(&Vector3::new(1.0, 1.0, 0.0).normalize());
        assert_relative_eq!(n.norm(), 1.0, epsilon = 1e-12);
        assert_relative_eq!(n.dot(&tangent), 0.0, epsilon = 1e-12);
    }

    #[test]
    fn test_then_composes_in_order() {
        let t = Transform3D::translation(1.0, 0.0, 0.0).then(&Transform3D::uniform_scale(2.0));
        let p = t.transform_point(&Point3::origin());
        assert_relative_eq!(p, Point3::new(2.0, 0.0, 0.0));
    }

    #[test]
    fn test_singular_scale_leaves_normal() {
        let t = Transform3D::scale(1.0, 1.0, 0.0);
        assert_relative_eq!(t.transform_normal(&Vector3::z()), Vector3::z());
        assert_eq!(t.transform_normal(&Vector3::zeros()), Vector3::zeros());
    }
}
