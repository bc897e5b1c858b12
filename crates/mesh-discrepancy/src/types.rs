//! Core mesh data types.

use nalgebra::{Point3, Vector3};
use tracing::debug;

/// RGB color with 8-bit components.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VertexColor {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl VertexColor {
    /// Create a new color from RGB components.
    #[inline]
    pub fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// Create a color from floating point values in [0, 1] range.
    #[inline]
    pub fn from_float(r: f64, g: f64, b: f64) -> Self {
        Self {
            r: (r.clamp(0.0, 1.0) * 255.0).round() as u8,
            g: (g.clamp(0.0, 1.0) * 255.0).round() as u8,
            b: (b.clamp(0.0, 1.0) * 255.0).round() as u8,
        }
    }
}

/// A vertex in the mesh.
///
/// Positions and normals are in the mesh's local space. World placement is
/// applied by [`PlacedMesh`](crate::view::PlacedMesh).
#[derive(Debug, Clone)]
pub struct Vertex {
    /// 3D position.
    pub position: Point3<f64>,

    /// Unit normal vector, loaded from file or computed from adjacent faces.
    pub normal: Option<Vector3<f64>>,

    /// Vertex color (RGB), used for heat-map export.
    pub color: Option<VertexColor>,
}

impl Vertex {
    /// Create a new vertex with only position set.
    #[inline]
    pub fn new(position: Point3<f64>) -> Self {
        Self {
            position,
            normal: None,
            color: None,
        }
    }

    /// Create a vertex from raw coordinates.
    #[inline]
    pub fn from_coords(x: f64, y: f64, z: f64) -> Self {
        Self::new(Point3::new(x, y, z))
    }

    /// Create a vertex with position and normal.
    #[inline]
    pub fn with_normal(position: Point3<f64>, normal: Vector3<f64>) -> Self {
        Self {
            position,
            normal: Some(normal),
            color: None,
        }
    }
}

/// A triangle mesh with indexed vertices and faces.
#[derive(Debug, Clone)]
pub struct Mesh {
    /// Vertex data.
    pub vertices: Vec<Vertex>,

    /// Triangle faces as indices into the vertex array.
    /// Each face is [v0, v1, v2] with counter-clockwise winding.
    pub faces: Vec<[u32; 3]>,
}

impl Mesh {
    /// Create a new empty mesh.
    pub fn new() -> Self {
        Self {
            vertices: Vec::new(),
            faces: Vec::new(),
        }
    }

    /// Create a mesh with pre-allocated capacity.
    pub fn with_capacity(vertex_count: usize, face_count: usize) -> Self {
        Self {
            vertices: Vec::with_capacity(vertex_count),
            faces: Vec::with_capacity(face_count),
        }
    }

    /// Number of vertices in the mesh.
    #[inline]
    pub fn vertex_count(&self) -> usize {
        self.vertices.len()
    }

    /// Number of faces (triangles) in the mesh.
    #[inline]
    pub fn face_count(&self) -> usize {
        self.faces.len()
    }

    /// Check if mesh has no vertices.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.vertices.is_empty()
    }

    /// Check if the mesh is polygonal (has at least one face).
    ///
    /// Vertex-only data such as point clouds is not polygonal.
    #[inline]
    pub fn is_polygonal(&self) -> bool {
        !self.faces.is_empty()
    }

    /// Check if any vertex carries a normal.
    pub fn has_normals(&self) -> bool {
        self.vertices.iter().any(|v| v.normal.is_some())
    }

    /// Compute the axis-aligned bounding box.
    /// Returns (min_corner, max_corner) or None if mesh is empty.
    pub fn bounds(&self) -> Option<(Point3<f64>, Point3<f64>)> {
        let first = self.vertices.first()?;
        let mut min = first.position;
        let mut max = first.position;

        for vertex in &self.vertices[1..] {
            let p = &vertex.position;
            min.x = min.x.min(p.x);
            min.y = min.y.min(p.y);
            min.z = min.z.min(p.z);
            max.x = max.x.max(p.x);
            max.y = max.y.max(p.y);
            max.z = max.z.max(p.z);
        }

        Some((min, max))
    }

    /// Recompute all vertex normals from adjacent faces.
    ///
    /// Face normals are accumulated unnormalized, so larger faces weigh more.
    /// Vertices not referenced by any non-degenerate face end up with no normal.
    pub fn compute_vertex_normals(&mut self) {
        let mut normal_accum = vec![Vector3::zeros(); self.vertices.len()];

        for &[i0, i1, i2] in &self.faces {
            let (i0, i1, i2) = (i0 as usize, i1 as usize, i2 as usize);
            if i0 >= self.vertices.len() || i1 >= self.vertices.len() || i2 >= self.vertices.len()
            {
                continue;
            }
            let tri = Triangle::new(
                self.vertices[i0].position,
                self.vertices[i1].position,
                self.vertices[i2].position,
            );

            // Length = 2 * area
            let weighted_normal = tri.normal_unnormalized();
            normal_accum[i0] += weighted_normal;
            normal_accum[i1] += weighted_normal;
            normal_accum[i2] += weighted_normal;
        }

        // Any non-zero accumulation is a valid direction, even on sub-millimetre faces
        for (vertex, accum) in self.vertices.iter_mut().zip(normal_accum) {
            vertex.normal = accum.try_normalize(0.0);
        }

        debug!(
            vertices = self.vertices.len(),
            "Computed vertex normals from faces"
        );
    }

    /// Compute vertex normals only if the mesh carries none.
    ///
    /// Returns `true` if normals were computed.
    pub fn ensure_normals(&mut self) -> bool {
        if self.has_normals() {
            return false;
        }
        self.compute_vertex_normals();
        true
    }
}

impl Default for Mesh {
    fn default() -> Self {
        Self::new()
    }
}

/// A triangle with concrete vertex positions.
///
/// Winding is counter-clockwise when viewed from the front (normal points
/// toward viewer).
#[derive(Debug, Clone, Copy)]
pub struct Triangle {
    pub v0: Point3<f64>,
    pub v1: Point3<f64>,
    pub v2: Point3<f64>,
}

impl Triangle {
    /// Create a new triangle from three points.
    #[inline]
    pub fn new(v0: Point3<f64>, v1: Point3<f64>, v2: Point3<f64>) -> Self {
        Self { v0, v1, v2 }
    }

    /// Compute the (unnormalized) face normal via cross product.
    /// The direction follows the right-hand rule with CCW winding.
    #[inline]
    pub fn normal_unnormalized(&self) -> Vector3<f64> {
        let e1 = self.v1 - self.v0;
        let e2 = self.v2 - self.v0;
        e1.cross(&e2)
    }
}
