//! Surface discrepancy between two versions of the same mesh.
//!
//! Given a high-poly reference and a low-poly reconstruction (or any two
//! meshes of the same object), this crate measures, for every vertex of the
//! sparser mesh, the distance to the nearest vertex of the denser mesh that
//! lies off the vertex normal by more than a small angle. The per-vertex
//! distances are summarised (min, max, mean, population standard deviation)
//! and mapped to weights in [0.01, 1.0] for display as a heat map.
//!
//! # Features
//!
//! - **Discrepancy engine**: adaptive angular-threshold nearest-distance search
//!   over world-space vertices, parallel with rayon
//! - **Weight mapping**: distance thresholds to paint weights, written through
//!   the [`WeightSink`] trait
//! - **Model check**: selection validation, report with status, heat-map colours
//! - **File I/O**: load STL, OBJ and PLY; save OBJ and PLY with vertex colours
//! - **Configuration**: TOML/JSON via [`CheckConfig`]
//!
//! # Units
//!
//! Distances are reported in the units of the input, which the thresholds
//! assume to be metres (defaults 0.01 and 0.05).
//!
//! # Quick Start
//!
//! ```no_run
//! use mesh_discrepancy::{CheckConfig, Mesh, SceneObject, run_model_check};
//!
//! let mut reference = Mesh::load("reference.ply").unwrap();
//! let mut retopo = Mesh::load("retopo.obj").unwrap();
//! reference.ensure_normals();
//! retopo.ensure_normals();
//!
//! let selection = [
//!     SceneObject::from_mesh("reference", reference),
//!     SceneObject::from_mesh("retopo", retopo),
//! ];
//! let outcome = run_model_check(&selection, &CheckConfig::default());
//! println!("{}", outcome.report);
//! ```
//!
//! # Lower-level API
//!
//! ```
//! use mesh_discrepancy::{
//!     DiscrepancyParams, Mesh, MissingDistancePolicy, PlacedMesh, ThresholdConfig, Transform3D,
//!     Vertex, build_weight_map, compute_discrepancy,
//! };
//! use nalgebra::{Point3, Vector3};
//!
//! let mut low = Mesh::new();
//! low.vertices.push(Vertex::with_normal(Point3::origin(), Vector3::z()));
//!
//! let mut high = Mesh::new();
//! high.vertices.push(Vertex::from_coords(0.03, 0.0, 0.0));
//! high.vertices.push(Vertex::from_coords(0.0, 0.03, 0.0));
//!
//! let result = compute_discrepancy(
//!     &PlacedMesh::identity(&low),
//!     &PlacedMesh::new(&high, Transform3D::translation(0.0, 0.0, 0.001)),
//!     &DiscrepancyParams::default(),
//! );
//! let weights = build_weight_map(
//!     &result.field,
//!     &ThresholdConfig::default(),
//!     MissingDistancePolicy::Skip,
//! );
//! assert_eq!(weights.len(), 1);
//! ```

mod error;
mod types;

pub mod config;
pub mod discrepancy;
pub mod geometry;
pub mod heatmap;
pub mod io;
pub mod report;
pub mod selection;
pub mod tracing_ext;
pub mod transform;
pub mod view;
pub mod weight;

// Core types
pub use error::{ErrorCode, MeshError, MeshLocation, MeshResult, RecoverySuggestion};
pub use types::{Mesh, Triangle, Vertex, VertexColor};

// Geometry and placement
pub use transform::Transform3D;
pub use view::{MeshView, NormalSpace, PlacedMesh};

// Engine
pub use discrepancy::{
    DiscrepancyParams, DiscrepancyResult, DistanceField, ProbeSide, Summary, compute_discrepancy,
    compute_distances_at,
};

// Weights and presentation
pub use heatmap::{UNPAINTED, paint_heatmap, weight_to_color};
pub use report::{DiscrepancyReport, Status};
pub use weight::{
    MissingDistancePolicy, ThresholdConfig, ThresholdWarning, VertexGroup, WeightMap, WeightSink,
    build_weight_map, map_to_weight,
};

// Model check
pub use config::CheckConfig;
pub use selection::{
    ModelCheckOutcome, ObjectKind, SELECTION_MESSAGE, SceneObject, run_model_check,
    validate_selection,
};

// I/O
pub use io::{MeshFormat, load_mesh, save_mesh, save_obj, save_ply, save_ply_binary};

// Tracing
pub use tracing_ext::OperationTimer;
