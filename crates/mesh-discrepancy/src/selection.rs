//! The model-check operation on a selection of scene objects.
//!
//! A check takes exactly two polygonal meshes. The selection is validated
//! first; a failed precondition becomes an error [`Status`](crate::report::Status) in the report
//! rather than a hard failure, and no computation runs.

use tracing::{info, warn};

use crate::config::CheckConfig;
use crate::discrepancy::{DiscrepancyResult, ProbeSide, compute_discrepancy};
use crate::error::{MeshError, MeshResult};
use crate::report::DiscrepancyReport;
use crate::transform::Transform3D;
use crate::types::Mesh;
use crate::view::PlacedMesh;
use crate::weight::{WeightMap, build_weight_map};

/// Message shown when the selection is not two polygonal meshes.
pub const SELECTION_MESSAGE: &str = "Exactly two objects must be selected and both must be meshes.";

/// What kind of data an object holds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ObjectKind {
    /// Polygonal mesh with faces.
    Mesh,
    /// Vertices only.
    PointCloud,
    /// Anything else (curves, empties, lights).
    Other,
}

/// A named object with its world placement.
#[derive(Debug, Clone)]
pub struct SceneObject {
    pub name: String,
    pub kind: ObjectKind,
    pub mesh: Mesh,
    pub transform: Transform3D,
}

impl SceneObject {
    /// Wrap a loaded mesh. It is a [`ObjectKind::Mesh`] if it has faces and
    /// a [`ObjectKind::PointCloud`] otherwise.
    pub fn from_mesh(name: impl Into<String>, mesh: Mesh) -> Self {
        let kind = if mesh.is_polygonal() {
            ObjectKind::Mesh
        } else {
            ObjectKind::PointCloud
        };
        Self {
            name: name.into(),
            kind,
            mesh,
            transform: Transform3D::identity(),
        }
    }

    /// An object of an arbitrary kind with no geometry.
    pub fn other(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            kind: ObjectKind::Other,
            mesh: Mesh::new(),
            transform: Transform3D::identity(),
        }
    }

    /// Set the world transform.
    pub fn with_transform(mut self, transform: Transform3D) -> Self {
        self.transform = transform;
        self
    }

    /// Check whether this object can take part in a model check.
    pub fn is_mesh(&self) -> bool {
        self.kind == ObjectKind::Mesh
    }
}

/// Check that the selection holds exactly two meshes and return them.
///
/// The first and last selected objects are used, in selection order.
pub fn validate_selection(objects: &[SceneObject]) -> MeshResult<(&SceneObject, &SceneObject)> {
    match objects {
        [a, b] if a.is_mesh() && b.is_mesh() => Ok((a, b)),
        _ => Err(MeshError::precondition(SELECTION_MESSAGE)),
    }
}

/// Everything a model check produces.
#[derive(Debug, Clone)]
pub struct ModelCheckOutcome {
    /// Summary and status for display.
    pub report: DiscrepancyReport,
    /// Weights keyed by probe-mesh vertex index. Empty on error.
    pub weights: WeightMap,
    /// The full engine result, `None` if the selection was rejected.
    pub result: Option<DiscrepancyResult>,
}

impl ModelCheckOutcome {
    fn rejected(reason: String) -> Self {
        Self {
            report: DiscrepancyReport::error(reason),
            weights: WeightMap::new(),
            result: None,
        }
    }

    /// Which selected object was the probe.
    pub fn probe_side(&self) -> Option<ProbeSide> {
        self.result.as_ref().map(|r| r.probe)
    }

    /// The selected object the weights belong to.
    pub fn probe_object<'a>(&self, objects: &'a [SceneObject]) -> Option<&'a SceneObject> {
        match self.probe_side()? {
            ProbeSide::First => objects.first(),
            ProbeSide::Second => objects.last(),
        }
    }
}

/// Run a model check on a selection.
///
/// Validates the selection, measures the discrepancy in world space, maps
/// distances to weights and packages the report. Threshold problems are
/// logged as warnings and do not stop the mapping.
pub fn run_model_check(objects: &[SceneObject], config: &CheckConfig) -> ModelCheckOutcome {
    let (a, b) = match validate_selection(objects) {
        Ok(pair) => pair,
        Err(err) => {
            warn!(selected = objects.len(), "{}", err);
            return ModelCheckOutcome::rejected(err.to_string());
        }
    };

    info!(first = %a.name, second = %b.name, "Running model check");

    let view_a = PlacedMesh::new(&a.mesh, a.transform).with_normal_space(config.normal_space);
    let view_b = PlacedMesh::new(&b.mesh, b.transform).with_normal_space(config.normal_space);
    let result = compute_discrepancy(&view_a, &view_b, &config.engine);

    if let Err(warning) = config.thresholds.validate() {
        warn!(%warning, "Threshold configuration is degenerate, mapping anyway");
    }
    if let Err(warning) = config.missing.validate() {
        warn!(%warning, "Missing-distance weight adjusted");
    }
    let weights = build_weight_map(&result.field, &config.thresholds, config.missing);

    ModelCheckOutcome {
        report: DiscrepancyReport::from_result(&result),
        weights,
        result: Some(result),
    }
}
