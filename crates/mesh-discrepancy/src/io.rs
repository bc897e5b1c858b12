//! Mesh file I/O for STL, OBJ and PLY.
//!
//! Loading accepts all three formats. Saving supports OBJ and PLY, the two
//! that carry per-vertex colours for heat-map export.
//!
//! Loaded meshes are validated: coordinates must be finite and faces must
//! reference existing vertices. A file with vertices but no faces loads as a
//! point cloud.

use std::fs::File;
use std::io::{BufReader, BufWriter, Write};
use std::path::Path;

use nalgebra::Vector3;
use ply_rs::ply::Property;
use tracing::{debug, info, warn};

use crate::error::{MeshError, MeshResult};
use crate::tracing_ext::{log_io_operation, log_mesh_stats};
use crate::types::{Mesh, Vertex, VertexColor};

/// Supported mesh file formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MeshFormat {
    Stl,
    Obj,
    Ply,
}

impl MeshFormat {
    /// Detect format from file extension.
    pub fn from_path(path: &Path) -> Option<Self> {
        path.extension()
            .and_then(|ext| ext.to_str())
            .map(|ext| ext.to_lowercase())
            .and_then(|ext| match ext.as_str() {
                "stl" => Some(MeshFormat::Stl),
                "obj" => Some(MeshFormat::Obj),
                "ply" => Some(MeshFormat::Ply),
                _ => None,
            })
    }

    /// Short display name.
    pub fn name(&self) -> &'static str {
        match self {
            MeshFormat::Stl => "STL",
            MeshFormat::Obj => "OBJ",
            MeshFormat::Ply => "PLY",
        }
    }

    /// Whether the format stores per-vertex colours.
    pub fn supports_vertex_colors(&self) -> bool {
        !matches!(self, MeshFormat::Stl)
    }
}

fn unsupported(path: &Path) -> MeshError {
    MeshError::unsupported_format(path.extension().and_then(|e| e.to_str()).map(String::from))
}

/// Load a mesh from file, auto-detecting format from extension.
pub fn load_mesh(path: &Path) -> MeshResult<Mesh> {
    let format = MeshFormat::from_path(path).ok_or_else(|| unsupported(path))?;

    debug!(target: "mesh_discrepancy::io", path = %path.display(), format = format.name(), "Loading mesh");

    let loaded = match format {
        MeshFormat::Stl => load_stl(path),
        MeshFormat::Obj => load_obj(path),
        MeshFormat::Ply => load_ply(path),
    }
    .and_then(|mesh| {
        validate_loaded(&mesh)?;
        Ok(mesh)
    });
    log_io_operation("load", path, Some(format.name()), loaded.is_ok());

    let mesh = loaded?;
    info!(
        target: "mesh_discrepancy::io",
        vertices = mesh.vertex_count(),
        faces = mesh.face_count(),
        normals = mesh.has_normals(),
        "Loaded mesh"
    );
    log_mesh_stats(&mesh, "loaded");

    if !mesh.is_polygonal() {
        warn!(
            target: "mesh_discrepancy::io",
            path = %path.display(),
            "File has no faces, loaded as point cloud"
        );
    }

    Ok(mesh)
}

/// Reject meshes with no vertices, non-finite coordinates or out-of-range
/// face indices.
fn validate_loaded(mesh: &Mesh) -> MeshResult<()> {
    if mesh.vertices.is_empty() {
        return Err(MeshError::empty_mesh("file contains no vertices"));
    }

    for (vertex_index, vertex) in mesh.vertices.iter().enumerate() {
        let p = vertex.position;
        for (coordinate, value) in [("x", p.x), ("y", p.y), ("z", p.z)] {
            if !value.is_finite() {
                return Err(MeshError::InvalidCoordinate {
                    vertex_index,
                    coordinate,
                    value,
                });
            }
        }
    }

    let vertex_count = mesh.vertices.len();
    for (face_index, face) in mesh.faces.iter().enumerate() {
        if let Some(&vertex_index) = face.iter().find(|&&i| i as usize >= vertex_count) {
            return Err(MeshError::InvalidVertexIndex {
                face_index,
                vertex_index,
                vertex_count,
            });
        }
    }

    Ok(())
}

/// Load mesh from STL file (binary or ASCII).
fn load_stl(path: &Path) -> MeshResult<Mesh> {
    let file = File::open(path).map_err(|e| MeshError::io_read(path, e))?;
    let mut reader = BufReader::new(file);

    let stl = stl_io::read_stl(&mut reader).map_err(|e| MeshError::parse_error(path, e.to_string()))?;

    let mut mesh = Mesh::with_capacity(stl.vertices.len(), stl.faces.len());

    // stl_io::Vertex is Vector<f32> with .0 being [f32; 3]
    for v in &stl.vertices {
        mesh.vertices
            .push(Vertex::from_coords(v.0[0] as f64, v.0[1] as f64, v.0[2] as f64));
    }

    for face in &stl.faces {
        let [a, b, c] = face.vertices;
        // Skip degenerate triangles
        if a != b && b != c && a != c {
            mesh.faces.push([a as u32, b as u32, c as u32]);
        }
    }

    debug!(
        target: "mesh_discrepancy::io",
        vertices = mesh.vertices.len(),
        faces = mesh.faces.len(),
        skipped = stl.faces.len() - mesh.faces.len(),
        "STL converted"
    );

    Ok(mesh)
}

/// Load mesh from OBJ file, merging all models.
fn load_obj(path: &Path) -> MeshResult<Mesh> {
    let (models, _materials) = tobj::load_obj(
        path,
        &tobj::LoadOptions {
            triangulate: true,
            single_index: true,
            ..Default::default()
        },
    )
    .map_err(|e| MeshError::parse_error(path, e.to_string()))?;

    if models.is_empty() {
        return Err(MeshError::empty_mesh("OBJ file contains no models"));
    }

    let mut mesh = Mesh::new();

    for model in &models {
        let obj_mesh = &model.mesh;
        let vertex_offset = mesh.vertices.len() as u32;
        let vertex_total = obj_mesh.positions.len() / 3;
        // With single_index, normals and colours line up with positions
        let has_normals = obj_mesh.normals.len() == obj_mesh.positions.len();
        let has_colors = obj_mesh.vertex_color.len() == obj_mesh.positions.len();

        for i in 0..vertex_total {
            let p = &obj_mesh.positions[i * 3..i * 3 + 3];
            let mut vertex = Vertex::from_coords(p[0] as f64, p[1] as f64, p[2] as f64);
            if has_normals {
                let n = &obj_mesh.normals[i * 3..i * 3 + 3];
                vertex.normal = Some(Vector3::new(n[0] as f64, n[1] as f64, n[2] as f64));
            }
            if has_colors {
                let c = &obj_mesh.vertex_color[i * 3..i * 3 + 3];
                vertex.color = Some(VertexColor::from_float(c[0] as f64, c[1] as f64, c[2] as f64));
            }
            mesh.vertices.push(vertex);
        }

        // Indices are per-model
        for chunk in obj_mesh.indices.chunks_exact(3) {
            mesh.faces.push([
                chunk[0] + vertex_offset,
                chunk[1] + vertex_offset,
                chunk[2] + vertex_offset,
            ]);
        }

        debug!(target: "mesh_discrepancy::io", model = %model.name, vertices = vertex_total, "OBJ model loaded");
    }

    Ok(mesh)
}

/// Load mesh from PLY file (ASCII, binary little- or big-endian).
///
/// Expects `vertex` elements with `x`, `y`, `z` and optionally `nx`, `ny`,
/// `nz` and `red`, `green`, `blue`. Faces come from a `vertex_indices` (or
/// `vertex_index`) list; polygons are fan-triangulated. A file without a
/// `face` element loads as a point cloud.
fn load_ply(path: &Path) -> MeshResult<Mesh> {
    use ply_rs::parser::Parser;

    let file = File::open(path).map_err(|e| MeshError::io_read(path, e))?;
    let mut reader = BufReader::new(file);

    let parser = Parser::<ply_rs::ply::DefaultElement>::new();
    let ply = parser
        .read_ply(&mut reader)
        .map_err(|e| MeshError::parse_error(path, format!("PLY parse error: {:?}", e)))?;

    let mut mesh = Mesh::new();

    if let Some(vertices) = ply.payload.get("vertex") {
        mesh.vertices.reserve(vertices.len());
        for element in vertices {
            let x = get_ply_float(element.get("x"), "x", path)?;
            let y = get_ply_float(element.get("y"), "y", path)?;
            let z = get_ply_float(element.get("z"), "z", path)?;
            let mut vertex = Vertex::from_coords(x, y, z);

            if let (Some(nx), Some(ny), Some(nz)) = (
                ply_float(element.get("nx")),
                ply_float(element.get("ny")),
                ply_float(element.get("nz")),
            ) {
                vertex.normal = Some(Vector3::new(nx, ny, nz));
            }

            if let (Some(r), Some(g), Some(b)) = (
                ply_u8(element.get("red")),
                ply_u8(element.get("green")),
                ply_u8(element.get("blue")),
            ) {
                vertex.color = Some(VertexColor::new(r, g, b));
            }

            mesh.vertices.push(vertex);
        }
    }

    if let Some(faces) = ply.payload.get("face") {
        for element in faces {
            let polygon = element
                .get("vertex_indices")
                .or_else(|| element.get("vertex_index"))
                .and_then(ply_index_list);

            if let Some(polygon) = polygon {
                // Fan triangulation
                for i in 1..polygon.len().saturating_sub(1) {
                    mesh.faces.push([polygon[0], polygon[i], polygon[i + 1]]);
                }
            }
        }
    }

    debug!(
        target: "mesh_discrepancy::io",
        vertices = mesh.vertices.len(),
        faces = mesh.faces.len(),
        "PLY loaded"
    );

    Ok(mesh)
}

/// Extract a required float from a PLY property.
fn get_ply_float(prop: Option<&Property>, name: &str, path: &Path) -> MeshResult<f64> {
    ply_float(prop).ok_or_else(|| {
        MeshError::parse_error(path, format!("Missing or invalid PLY property: {}", name))
    })
}

fn ply_float(prop: Option<&Property>) -> Option<f64> {
    match prop? {
        Property::Float(v) => Some(*v as f64),
        Property::Double(v) => Some(*v),
        Property::Int(v) => Some(*v as f64),
        Property::UInt(v) => Some(*v as f64),
        Property::Short(v) => Some(*v as f64),
        Property::UShort(v) => Some(*v as f64),
        Property::Char(v) => Some(*v as f64),
        Property::UChar(v) => Some(*v as f64),
        _ => None,
    }
}

fn ply_u8(prop: Option<&Property>) -> Option<u8> {
    match prop? {
        Property::UChar(v) => Some(*v),
        Property::Char(v) => Some((*v).max(0) as u8),
        Property::UShort(v) => Some((*v).min(255) as u8),
        Property::Short(v) => Some((*v).clamp(0, 255) as u8),
        Property::UInt(v) => Some((*v).min(255) as u8),
        Property::Int(v) => Some((*v).clamp(0, 255) as u8),
        Property::Float(v) => Some((v * 255.0).clamp(0.0, 255.0).round() as u8),
        Property::Double(v) => Some((v * 255.0).clamp(0.0, 255.0).round() as u8),
        _ => None,
    }
}

/// Negative indices map to `u32::MAX` so validation reports them.
fn ply_index_list(prop: &Property) -> Option<Vec<u32>> {
    fn signed(i: i64) -> u32 {
        u32::try_from(i).unwrap_or(u32::MAX)
    }
    match prop {
        Property::ListInt(v) => Some(v.iter().map(|&i| signed(i as i64)).collect()),
        Property::ListUInt(v) => Some(v.clone()),
        Property::ListShort(v) => Some(v.iter().map(|&i| signed(i as i64)).collect()),
        Property::ListUShort(v) => Some(v.iter().map(|&i| i as u32).collect()),
        Property::ListChar(v) => Some(v.iter().map(|&i| signed(i as i64)).collect()),
        Property::ListUChar(v) => Some(v.iter().map(|&i| i as u32).collect()),
        _ => None,
    }
}

/// Save mesh to file, auto-detecting format from extension.
///
/// Only OBJ and PLY are supported for writing.
pub fn save_mesh(mesh: &Mesh, path: &Path) -> MeshResult<()> {
    let format = MeshFormat::from_path(path).ok_or_else(|| unsupported(path))?;

    let saved = match format {
        MeshFormat::Obj => save_obj(mesh, path),
        MeshFormat::Ply => save_ply(mesh, path),
        MeshFormat::Stl => Err(unsupported(path)),
    };
    log_io_operation("save", path, Some(format.name()), saved.is_ok());
    saved
}

/// Save mesh to OBJ file (ASCII).
///
/// Vertex colours are written as `v x y z r g b`, a widely read extension.
/// Vertex indices are preserved exactly.
pub fn save_obj(mesh: &Mesh, path: &Path) -> MeshResult<()> {
    let file = File::create(path).map_err(|e| MeshError::io_write(path, e))?;
    let mut writer = BufWriter::new(file);

    write_obj(mesh, &mut writer)
        .and_then(|()| writer.flush())
        .map_err(|e| MeshError::io_write(path, e))?;

    debug!(
        target: "mesh_discrepancy::io",
        vertices = mesh.vertices.len(),
        faces = mesh.faces.len(),
        "OBJ written"
    );
    Ok(())
}

fn write_obj<W: Write>(mesh: &Mesh, writer: &mut W) -> std::io::Result<()> {
    writeln!(writer, "# OBJ file exported by mesh-discrepancy")?;
    writeln!(writer, "# Vertices: {}", mesh.vertices.len())?;
    writeln!(writer, "# Faces: {}", mesh.faces.len())?;
    writeln!(writer)?;

    let has_normals = mesh.has_normals();
    let has_colors = mesh.vertices.iter().any(|v| v.color.is_some());

    for v in &mesh.vertices {
        let p = v.position;
        if has_colors {
            let c = v.color.unwrap_or(VertexColor::new(255, 255, 255));
            writeln!(
                writer,
                "v {:.6} {:.6} {:.6} {:.4} {:.4} {:.4}",
                p.x,
                p.y,
                p.z,
                c.r as f64 / 255.0,
                c.g as f64 / 255.0,
                c.b as f64 / 255.0
            )?;
        } else {
            writeln!(writer, "v {:.6} {:.6} {:.6}", p.x, p.y, p.z)?;
        }
    }

    if has_normals {
        writeln!(writer)?;
        for v in &mesh.vertices {
            // Zero normal keeps index correspondence for vertices without one
            let n = v.normal.unwrap_or_else(Vector3::zeros);
            writeln!(writer, "vn {:.6} {:.6} {:.6}", n.x, n.y, n.z)?;
        }
    }

    writeln!(writer)?;
    for face in &mesh.faces {
        // OBJ uses 1-based indexing
        let [i0, i1, i2] = face.map(|i| i + 1);
        if has_normals {
            writeln!(writer, "f {i0}//{i0} {i1}//{i1} {i2}//{i2}")?;
        } else {
            writeln!(writer, "f {i0} {i1} {i2}")?;
        }
    }

    Ok(())
}

/// Save mesh to ASCII PLY file.
pub fn save_ply(mesh: &Mesh, path: &Path) -> MeshResult<()> {
    write_ply(mesh, path, ply_rs::ply::Encoding::Ascii)
}

/// Save mesh to binary little-endian PLY file.
pub fn save_ply_binary(mesh: &Mesh, path: &Path) -> MeshResult<()> {
    write_ply(mesh, path, ply_rs::ply::Encoding::BinaryLittleEndian)
}

fn write_ply(mesh: &Mesh, path: &Path, encoding: ply_rs::ply::Encoding) -> MeshResult<()> {
    use ply_rs::ply::{
        Addable, DefaultElement, ElementDef, Ply, PropertyDef, PropertyType, ScalarType,
    };
    use ply_rs::writer::Writer;

    let to_io = |details: String| std::io::Error::other(details);

    let encoding_name = format!("{:?}", encoding);
    let mut ply = Ply::<DefaultElement>::new();
    ply.header.encoding = encoding;

    let has_normals = mesh.has_normals();
    let has_colors = mesh.vertices.iter().any(|v| v.color.is_some());

    let scalar = |name: &str, ty: ScalarType| PropertyDef::new(name.to_string(), PropertyType::Scalar(ty));

    let mut vertex_def = ElementDef::new("vertex".to_string());
    for axis in ["x", "y", "z"] {
        vertex_def.properties.add(scalar(axis, ScalarType::Float));
    }
    if has_normals {
        for axis in ["nx", "ny", "nz"] {
            vertex_def.properties.add(scalar(axis, ScalarType::Float));
        }
    }
    if has_colors {
        for channel in ["red", "green", "blue"] {
            vertex_def.properties.add(scalar(channel, ScalarType::UChar));
        }
    }
    ply.header.elements.add(vertex_def);

    let mut face_def = ElementDef::new("face".to_string());
    face_def.properties.add(PropertyDef::new(
        "vertex_indices".to_string(),
        PropertyType::List(ScalarType::UChar, ScalarType::Int),
    ));
    ply.header.elements.add(face_def);

    let vertices_payload: Vec<DefaultElement> = mesh
        .vertices
        .iter()
        .map(|v| {
            let mut element = DefaultElement::new();
            element.insert("x".to_string(), Property::Float(v.position.x as f32));
            element.insert("y".to_string(), Property::Float(v.position.y as f32));
            element.insert("z".to_string(), Property::Float(v.position.z as f32));
            if has_normals {
                let n = v.normal.unwrap_or_else(Vector3::zeros);
                element.insert("nx".to_string(), Property::Float(n.x as f32));
                element.insert("ny".to_string(), Property::Float(n.y as f32));
                element.insert("nz".to_string(), Property::Float(n.z as f32));
            }
            if has_colors {
                let c = v.color.unwrap_or(VertexColor::new(255, 255, 255));
                element.insert("red".to_string(), Property::UChar(c.r));
                element.insert("green".to_string(), Property::UChar(c.g));
                element.insert("blue".to_string(), Property::UChar(c.b));
            }
            element
        })
        .collect();
    ply.payload.insert("vertex".to_string(), vertices_payload);

    let faces_payload: Vec<DefaultElement> = mesh
        .faces
        .iter()
        .map(|face| {
            let mut element = DefaultElement::new();
            element.insert(
                "vertex_indices".to_string(),
                Property::ListInt(face.iter().map(|&i| i as i32).collect()),
            );
            element
        })
        .collect();
    ply.payload.insert("face".to_string(), faces_payload);

    // Header counts must match payload
    ply.make_consistent().map_err(|e| {
        MeshError::io_write(path, to_io(format!("PLY consistency error: {:?}", e)))
    })?;

    let file = File::create(path).map_err(|e| MeshError::io_write(path, e))?;
    let mut writer = BufWriter::new(file);

    Writer::new()
        .write_ply(&mut writer, &mut ply)
        .map_err(|e| MeshError::io_write(path, to_io(format!("PLY write error: {:?}", e))))?;
    writer.flush().map_err(|e| MeshError::io_write(path, e))?;

    debug!(
        target: "mesh_discrepancy::io",
        vertices = mesh.vertices.len(),
        faces = mesh.faces.len(),
        encoding = %encoding_name,
        "PLY written"
    );
    Ok(())
}

impl Mesh {
    /// Load a mesh from file. See [`load_mesh`].
    pub fn load(path: impl AsRef<Path>) -> MeshResult<Self> {
        load_mesh(path.as_ref())
    }

    /// Save a mesh to file. See [`save_mesh`].
    pub fn save(&self, path: impl AsRef<Path>) -> MeshResult<()> {
        save_mesh(self, path.as_ref())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorCode;
    use nalgebra::Point3;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn create_test_stl() -> NamedTempFile {
        let mut file = NamedTempFile::with_suffix(".stl").unwrap();

        // ASCII STL with a single triangle
        writeln!(file, "solid test").unwrap();
        writeln!(file, "  facet normal 0 0 1").unwrap();
        writeln!(file, "    outer loop").unwrap();
        writeln!(file, "      vertex 0 0 0").unwrap();
        writeln!(file, "      vertex 1 0 0").unwrap();
        writeln!(file, "      vertex 0 1 0").unwrap();
        writeln!(file, "    endloop").unwrap();
        writeln!(file, "  endfacet").unwrap();
        writeln!(file, "endsolid test").unwrap();

        file
    }

    fn create_ply(body: &[&str]) -> NamedTempFile {
        let mut file = NamedTempFile::with_suffix(".ply").unwrap();
        for line in body {
            writeln!(file, "{}", line).unwrap();
        }
        file
    }

    fn triangle_with_attributes() -> Mesh {
        let mut mesh = Mesh::new();
        let corners = [(0.0, 0.0, 0.0), (0.5, 0.0, 0.0), (0.0, 0.5, 0.0)];
        let colors = [
            VertexColor::new(255, 0, 0),
            VertexColor::new(0, 255, 0),
            VertexColor::new(0, 0, 255),
        ];
        for ((x, y, z), color) in corners.into_iter().zip(colors) {
            let mut v = Vertex::with_normal(Point3::new(x, y, z), Vector3::z());
            v.color = Some(color);
            mesh.vertices.push(v);
        }
        mesh.faces.push([0, 1, 2]);
        mesh
    }

    #[test]
    fn test_format_detection() {
        assert_eq!(MeshFormat::from_path(Path::new("test.stl")), Some(MeshFormat::Stl));
        assert_eq!(MeshFormat::from_path(Path::new("test.STL")), Some(MeshFormat::Stl));
        assert_eq!(MeshFormat::from_path(Path::new("test.obj")), Some(MeshFormat::Obj));
        assert_eq!(MeshFormat::from_path(Path::new("test.PLY")), Some(MeshFormat::Ply));
        assert_eq!(MeshFormat::from_path(Path::new("test.3mf")), None);
        assert_eq!(MeshFormat::from_path(Path::new("noext")), None);
        assert!(!MeshFormat::Stl.supports_vertex_colors());
        assert!(MeshFormat::Ply.supports_vertex_colors());
    }

    #[test]
    fn test_load_stl() {
        let file = create_test_stl();
        let mesh = load_mesh(file.path()).expect("should load");

        assert_eq!(mesh.vertex_count(), 3);
        assert_eq!(mesh.face_count(), 1);
        assert!(!mesh.has_normals());

        let (min, max) = mesh.bounds().unwrap();
        assert_eq!(min, Point3::new(0.0, 0.0, 0.0));
        assert_eq!(max, Point3::new(1.0, 1.0, 0.0));
    }

    #[test]
    fn test_load_ply_ascii_quad_is_triangulated() {
        let file = create_ply(&[
            "ply",
            "format ascii 1.0",
            "element vertex 4",
            "property float x",
            "property float y",
            "property float z",
            "element face 1",
            "property list uchar int vertex_indices",
            "end_header",
            "0 0 0",
            "1 0 0",
            "1 1 0",
            "0 1 0",
            "4 0 1 2 3",
        ]);
        let mesh = load_mesh(file.path()).expect("should load PLY");

        assert_eq!(mesh.vertex_count(), 4);
        assert_eq!(mesh.faces, vec![[0, 1, 2], [0, 2, 3]]);
    }

    #[test]
    fn test_ply_without_faces_is_point_cloud() {
        let file = create_ply(&[
            "ply",
            "format ascii 1.0",
            "element vertex 2",
            "property float x",
            "property float y",
            "property float z",
            "end_header",
            "0 0 0",
            "1 2 3",
        ]);
        let mesh = load_mesh(file.path()).expect("point clouds load");
        assert_eq!(mesh.vertex_count(), 2);
        assert!(!mesh.is_polygonal());
    }

    #[test]
    fn test_ply_bad_index_is_rejected() {
        let file = create_ply(&[
            "ply",
            "format ascii 1.0",
            "element vertex 3",
            "property float x",
            "property float y",
            "property float z",
            "element face 1",
            "property list uchar int vertex_indices",
            "end_header",
            "0 0 0",
            "1 0 0",
            "0 1 0",
            "3 0 1 7",
        ]);
        let err = load_mesh(file.path()).unwrap_err();
        assert_eq!(err.code(), ErrorCode::InvalidVertexIndex);
    }

    #[test]
    fn test_validate_rejects_non_finite_and_empty() {
        let mut mesh = Mesh::new();
        assert_eq!(validate_loaded(&mesh).unwrap_err().code(), ErrorCode::EmptyMesh);

        mesh.vertices.push(Vertex::from_coords(0.0, f64::NAN, 0.0));
        match validate_loaded(&mesh) {
            Err(MeshError::InvalidCoordinate {
                vertex_index,
                coordinate,
                ..
            }) => {
                assert_eq!(vertex_index, 0);
                assert_eq!(coordinate, "y");
            }
            other => panic!("Expected InvalidCoordinate, got {:?}", other),
        }
    }

    #[test]
    fn test_save_and_reload_ply_with_normals_and_colors() {
        let mesh = triangle_with_attributes();

        for binary in [false, true] {
            let file = NamedTempFile::with_suffix(".ply").unwrap();
            if binary {
                save_ply_binary(&mesh, file.path()).expect("should save binary PLY");
            } else {
                save_mesh(&mesh, file.path()).expect("should save PLY");
            }
            let reloaded = load_mesh(file.path()).expect("should reload PLY");

            assert_eq!(reloaded.vertex_count(), 3);
            assert_eq!(reloaded.faces, mesh.faces);
            for (orig, loaded) in mesh.vertices.iter().zip(&reloaded.vertices) {
                assert!((orig.position - loaded.position).norm() < 1e-6);
                assert_eq!(loaded.normal, Some(Vector3::z()));
                assert_eq!(loaded.color, orig.color);
            }
        }
    }

    #[test]
    fn test_save_and_reload_obj_preserves_indices_and_normals() {
        let mut mesh = Mesh::new();
        for i in 0..6 {
            mesh.vertices.push(Vertex::with_normal(
                Point3::new(i as f64 * 0.1, (i % 2) as f64 * 0.2, 0.0),
                Vector3::z(),
            ));
        }
        mesh.faces.push([0, 1, 2]);
        mesh.faces.push([3, 4, 5]);
        mesh.faces.push([0, 5, 3]);

        let file = NamedTempFile::with_suffix(".obj").unwrap();
        save_obj(&mesh, file.path()).expect("should save");
        let reloaded = load_mesh(file.path()).expect("should reload");

        assert_eq!(reloaded.vertex_count(), 6);
        assert_eq!(reloaded.faces, mesh.faces);
        for (orig, loaded) in mesh.vertices.iter().zip(&reloaded.vertices) {
            assert!((orig.position - loaded.position).norm() < 1e-5);
            let n = loaded.normal.expect("normal should survive");
            assert!((n - Vector3::z()).norm() < 1e-6);
        }
    }

    #[test]
    fn test_save_stl_is_unsupported() {
        let file = NamedTempFile::with_suffix(".stl").unwrap();
        let err = save_mesh(&triangle_with_attributes(), file.path()).unwrap_err();
        assert_eq!(err.code(), ErrorCode::UnsupportedFormat);
    }

    #[test]
    fn test_missing_file_and_unknown_extension() {
        let err = load_mesh(Path::new("/nonexistent/mesh.ply")).unwrap_err();
        assert_eq!(err.code(), ErrorCode::IoRead);

        let err = load_mesh(Path::new("mesh.xyz")).unwrap_err();
        assert_eq!(err.code(), ErrorCode::UnsupportedFormat);
    }
}
