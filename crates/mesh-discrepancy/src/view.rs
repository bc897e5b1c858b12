//! Read-only world-space access to mesh vertices.
//!
//! The discrepancy engine only needs vertex positions and normals in world
//! space. [`MeshView`] is that narrow interface; [`PlacedMesh`] implements
//! it for an in-memory [`Mesh`] with an object-to-world [`Transform3D`].

use nalgebra::{Point3, Vector3};
use serde::{Deserialize, Serialize};

use crate::transform::Transform3D;
use crate::types::Mesh;

/// Ordered, read-only access to a mesh's vertices in world space.
///
/// Indices run from `0` to `vertex_count() - 1` and must keep their order for
/// the duration of a computation.
pub trait MeshView: Sync {
    /// Number of vertices.
    fn vertex_count(&self) -> usize;

    /// World-space position of vertex `index`.
    fn world_position(&self, index: usize) -> Point3<f64>;

    /// World-space normal of vertex `index`.
    ///
    /// Vertices without a normal return the zero vector.
    fn world_normal(&self, index: usize) -> Vector3<f64>;
}

/// Which space vertex normals are measured in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NormalSpace {
    /// Transform normals by the inverse transpose of the world matrix.
    #[default]
    World,
    /// Use the stored local-space normal as is, even when the mesh is
    /// rotated or scaled. Positions are still placed in world space.
    Local,
}

/// A mesh borrowed together with its world placement.
#[derive(Debug, Clone, Copy)]
pub struct PlacedMesh<'a> {
    mesh: &'a Mesh,
    transform: Transform3D,
    normal_space: NormalSpace,
}

impl<'a> PlacedMesh<'a> {
    /// Place a mesh with the given world transform.
    pub fn new(mesh: &'a Mesh, transform: Transform3D) -> Self {
        Self {
            mesh,
            transform,
            normal_space: NormalSpace::default(),
        }
    }

    /// View a mesh at the world origin.
    pub fn identity(mesh: &'a Mesh) -> Self {
        Self::new(mesh, Transform3D::identity())
    }

    /// Select the space normals are measured in.
    pub fn with_normal_space(mut self, normal_space: NormalSpace) -> Self {
        self.normal_space = normal_space;
        self
    }

    /// The underlying mesh.
    pub fn mesh(&self) -> &'a Mesh {
        self.mesh
    }

    /// The world transform.
    pub fn transform(&self) -> &Transform3D {
        &self.transform
    }
}

impl MeshView for PlacedMesh<'_> {
    #[inline]
    fn vertex_count(&self) -> usize {
        self.mesh.vertex_count()
    }

    #[inline]
    fn world_position(&self, index: usize) -> Point3<f64> {
        self.transform
            .transform_point(&self.mesh.vertices[index].position)
    }

    #[inline]
    fn world_normal(&self, index: usize) -> Vector3<f64> {
        let Some(normal) = self.mesh.vertices[index].normal else {
            return Vector3::zeros();
        };
        match self.normal_space {
            NormalSpace::World => self.transform.transform_normal(&normal),
            NormalSpace::Local => normal,
        }
    }
}

impl MeshView for Mesh {
    #[inline]
    fn vertex_count(&self) -> usize {
        self.vertices.len()
    }

    #[inline]
    fn world_position(&self, index: usize) -> Point3<f64> {
        self.vertices[index].position
    }

    #[inline]
    fn world_normal(&self, index: usize) -> Vector3<f64> {
        self.vertices[index].normal.unwrap_or_else(Vector3::zeros)
    }
}
