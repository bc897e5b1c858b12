//! Directional nearest-surface distance between two meshes.
//!
//! # Algorithm
//!
//! The mesh with fewer vertices becomes the *probe*; the other one is the
//! *target*. For every probe vertex we look at all target vertices and keep
//! the closest one whose offset direction deviates from the probe vertex
//! normal by more than an angular threshold. Targets lying almost exactly
//! along the normal are skipped, as are coincident points.
//!
//! The threshold starts at 1 degree. If a whole pass finds no target for any
//! probe vertex, the threshold is raised by one degree and the pass repeats,
//! up to 15 degrees. The first pass that measures at least one vertex is
//! accepted.
//!
//! The search is brute force, O(probe x target) per pass. Each pass runs in
//! parallel over probe vertices with rayon.

use nalgebra::{Point3, Vector3};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::geometry::{angle_between, distance};
use crate::tracing_ext::{OperationTimer, log_pass};
use crate::types::Mesh;
use crate::view::{MeshView, PlacedMesh};

/// Per-probe-vertex distances, indexed by probe vertex.
///
/// `None` means no target vertex qualified for that vertex in the accepted
/// pass.
pub type DistanceField = Vec<Option<f64>>;

/// Parameters for the angular search.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DiscrepancyParams {
    /// First angular threshold in degrees.
    pub start_angle_deg: u32,
    /// Increment between passes in degrees. Zero is treated as one.
    pub angle_step_deg: u32,
    /// Last threshold that is still tried, inclusive.
    pub max_angle_deg: u32,
    /// Run each pass on the rayon thread pool.
    pub parallel: bool,
}

impl Default for DiscrepancyParams {
    fn default() -> Self {
        Self {
            start_angle_deg: 1,
            angle_step_deg: 1,
            max_angle_deg: 15,
            parallel: true,
        }
    }
}

impl DiscrepancyParams {
    /// Default search, evaluated on the calling thread.
    pub fn sequential() -> Self {
        Self {
            parallel: false,
            ..Default::default()
        }
    }

    /// Number of passes run when no pass finds anything.
    pub fn max_passes(&self) -> u32 {
        if self.start_angle_deg > self.max_angle_deg {
            return 0;
        }
        (self.max_angle_deg - self.start_angle_deg) / self.step() + 1
    }

    fn step(&self) -> u32 {
        self.angle_step_deg.max(1)
    }
}

/// Which argument of [`compute_discrepancy`] was used as the probe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProbeSide {
    /// The first argument (also chosen on a vertex-count tie).
    First,
    /// The second argument.
    Second,
}

/// Summary statistics over the measured distances.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Summary {
    /// Smallest distance.
    pub min: f64,
    /// Largest distance.
    pub max: f64,
    /// Arithmetic mean.
    pub mean: f64,
    /// Population standard deviation (divides by N).
    pub std_dev: f64,
    /// Number of distances the statistics were taken over.
    pub sample_count: usize,
}

impl Summary {
    /// Compute the summary of a set of distances.
    ///
    /// An empty slice gives an all-zero summary.
    pub fn from_distances(distances: &[f64]) -> Self {
        if distances.is_empty() {
            return Self::default();
        }

        let n = distances.len() as f64;
        let min = distances.iter().copied().fold(f64::INFINITY, f64::min);
        let max = distances.iter().copied().fold(f64::NEG_INFINITY, f64::max);
        let mean = distances.iter().sum::<f64>() / n;
        let variance = distances.iter().map(|d| (d - mean).powi(2)).sum::<f64>() / n;

        Self {
            min,
            max,
            mean,
            std_dev: variance.sqrt(),
            sample_count: distances.len(),
        }
    }

    /// Check whether any distance was measured.
    pub fn is_empty(&self) -> bool {
        self.sample_count == 0
    }
}

/// Result of a discrepancy check.
#[derive(Debug, Clone)]
pub struct DiscrepancyResult {
    /// Distance per probe vertex.
    pub field: DistanceField,
    /// Statistics over the measured entries of `field`.
    pub summary: Summary,
    /// Which input acted as the probe.
    pub probe: ProbeSide,
    /// Vertex count of the probe mesh.
    pub probe_vertex_count: usize,
    /// Vertex count of the target mesh.
    pub target_vertex_count: usize,
    /// Threshold of the accepted pass, `None` if every pass came up empty.
    pub angle_threshold: Option<u32>,
    /// Number of passes that were run.
    pub passes: u32,
}

impl DiscrepancyResult {
    fn empty(probe: ProbeSide, probe_vertex_count: usize, target_vertex_count: usize) -> Self {
        Self {
            field: vec![None; probe_vertex_count],
            summary: Summary::default(),
            probe,
            probe_vertex_count,
            target_vertex_count,
            angle_threshold: None,
            passes: 0,
        }
    }

    /// Number of probe vertices that received a distance.
    pub fn measured_count(&self) -> usize {
        self.field.iter().filter(|d| d.is_some()).count()
    }

    /// Check whether the search ran out of thresholds without measuring.
    pub fn is_exhausted(&self) -> bool {
        self.angle_threshold.is_none()
    }

    /// Iterate over `(probe_vertex_index, distance)` for measured vertices.
    pub fn measured(&self) -> impl Iterator<Item = (usize, f64)> + '_ {
        self.field
            .iter()
            .enumerate()
            .filter_map(|(i, d)| d.map(|d| (i, d)))
    }
}

impl std::fmt::Display for DiscrepancyResult {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "Discrepancy Analysis:")?;
        writeln!(f, "  Probe vertices: {}", self.probe_vertex_count)?;
        writeln!(f, "  Target vertices: {}", self.target_vertex_count)?;
        writeln!(f, "  Measured vertices: {}", self.measured_count())?;
        match self.angle_threshold {
            Some(t) => writeln!(f, "  Angle threshold: {} deg ({} passes)", t, self.passes)?,
            None => writeln!(f, "  Angle threshold: none ({} passes)", self.passes)?,
        }
        writeln!(f, "  Min distance: {:.4}", self.summary.min)?;
        writeln!(f, "  Max distance: {:.4}", self.summary.max)?;
        writeln!(f, "  Mean distance: {:.4}", self.summary.mean)?;
        writeln!(f, "  Std deviation: {:.4}", self.summary.std_dev)?;
        Ok(())
    }
}

/// Compute the directional discrepancy between two meshes.
///
/// The mesh with fewer vertices is the probe. On a tie `a` is the probe. The
/// returned field is indexed by probe vertex. This never fails: empty inputs
/// give an empty or all-`None` field with a zero summary.
///
/// # Example
///
/// ```
/// use mesh_discrepancy::{DiscrepancyParams, Mesh, Vertex, compute_discrepancy};
/// use nalgebra::{Point3, Vector3};
///
/// let mut probe = Mesh::new();
/// probe
///     .vertices
///     .push(Vertex::with_normal(Point3::origin(), Vector3::z()));
///
/// let mut target = Mesh::new();
/// target.vertices.push(Vertex::from_coords(0.02, 0.0, 0.0));
/// target.vertices.push(Vertex::from_coords(0.0, 0.0, 0.5));
///
/// let result = compute_discrepancy(&probe, &target, &DiscrepancyParams::default());
/// assert_eq!(result.angle_threshold, Some(1));
/// assert!((result.summary.max - 0.02).abs() < 1e-12);
/// ```
pub fn compute_discrepancy<A, B>(a: &A, b: &B, params: &DiscrepancyParams) -> DiscrepancyResult
where
    A: MeshView,
    B: MeshView,
{
    if b.vertex_count() < a.vertex_count() {
        run_search(b, a, ProbeSide::Second, params)
    } else {
        run_search(a, b, ProbeSide::First, params)
    }
}

fn run_search<P, T>(probe: &P, target: &T, side: ProbeSide, params: &DiscrepancyParams) -> DiscrepancyResult
where
    P: MeshView,
    T: MeshView,
{
    let probe_count = probe.vertex_count();
    let target_count = target.vertex_count();

    if probe_count == 0 {
        info!(
            target: "mesh_discrepancy::engine",
            target_vertices = target_count,
            "Probe mesh has no vertices, nothing to measure"
        );
        return DiscrepancyResult::empty(side, 0, target_count);
    }

    let _timer = OperationTimer::with_context("compute_discrepancy", probe_count, target_count);
    info!(
        target: "mesh_discrepancy::engine",
        probe = ?side,
        probe_vertices = probe_count,
        target_vertices = target_count,
        start_deg = params.start_angle_deg,
        max_deg = params.max_angle_deg,
        "Starting discrepancy check"
    );

    let probe_points = world_samples(probe);
    let target_points = world_positions(target);

    let mut result = DiscrepancyResult::empty(side, probe_count, target_count);
    let mut threshold = params.start_angle_deg;

    while threshold <= params.max_angle_deg {
        let field = probe_pass(&probe_points, &target_points, f64::from(threshold), params.parallel);
        result.passes += 1;

        let found = field.iter().filter(|d| d.is_some()).count();
        log_pass(threshold, found, probe_count);

        if found > 0 {
            let distances: Vec<f64> = field.iter().flatten().copied().collect();
            result.summary = Summary::from_distances(&distances);
            result.field = field;
            result.angle_threshold = Some(threshold);
            break;
        }

        threshold = match threshold.checked_add(params.step()) {
            Some(t) => t,
            None => break,
        };
    }

    if result.is_exhausted() {
        warn!(
            target: "mesh_discrepancy::engine",
            passes = result.passes,
            max_deg = params.max_angle_deg,
            "No target vertex qualified at any threshold"
        );
    } else {
        info!(
            target: "mesh_discrepancy::engine",
            threshold_deg = result.angle_threshold,
            measured = result.summary.sample_count,
            mean = format!("{:.4}", result.summary.mean),
            max = format!("{:.4}", result.summary.max),
            "Discrepancy check complete"
        );
    }

    result
}

/// Run a single pass at a fixed angular threshold in degrees.
///
/// `probe` is always the probing side here; no vertex-count swap happens.
pub fn compute_distances_at<P, T>(probe: &P, target: &T, threshold_deg: f64, parallel: bool) -> DistanceField
where
    P: MeshView,
    T: MeshView,
{
    let probe_points = world_samples(probe);
    let target_points = world_positions(target);
    probe_pass(&probe_points, &target_points, threshold_deg, parallel)
}

fn world_samples<V: MeshView>(view: &V) -> Vec<(Point3<f64>, Vector3<f64>)> {
    (0..view.vertex_count())
        .map(|i| (view.world_position(i), view.world_normal(i)))
        .collect()
}

fn world_positions<V: MeshView>(view: &V) -> Vec<Point3<f64>> {
    (0..view.vertex_count()).map(|i| view.world_position(i)).collect()
}

fn probe_pass(
    probe: &[(Point3<f64>, Vector3<f64>)],
    target: &[Point3<f64>],
    threshold_deg: f64,
    parallel: bool,
) -> DistanceField {
    let nearest = |&(position, normal): &(Point3<f64>, Vector3<f64>)| {
        nearest_off_axis(&position, &normal, target, threshold_deg)
    };

    if parallel {
        probe.par_iter().map(nearest).collect()
    } else {
        probe.iter().map(nearest).collect()
    }
}

/// Closest target whose direction from `position` is more than
/// `threshold_deg` away from `normal`.
fn nearest_off_axis(
    position: &Point3<f64>,
    normal: &Vector3<f64>,
    target: &[Point3<f64>],
    threshold_deg: f64,
) -> Option<f64> {
    target
        .iter()
        .filter(|t| angle_between(normal, &(*t - position)) > threshold_deg)
        .map(|t| distance(position, t))
        .min_by(f64::total_cmp)
}

impl Mesh {
    /// Compute the discrepancy against another mesh, both at the origin.
    ///
    /// See [`compute_discrepancy`].
    pub fn discrepancy_to(&self, other: &Mesh) -> DiscrepancyResult {
        compute_discrepancy(
            &PlacedMesh::identity(self),
            &PlacedMesh::identity(other),
            &DiscrepancyParams::default(),
        )
    }
}
