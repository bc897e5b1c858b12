//! Mapping distances to per-vertex paint weights.
//!
//! Distances at or below the minimum threshold map to 0.01 (effectively
//! unpainted). Distances above the maximum map to 1.0. Everything between is
//! interpolated linearly into [0.01, 0.91]; the jump from 0.91 to 1.0 past the
//! maximum makes out-of-tolerance vertices stand out.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::discrepancy::DistanceField;

/// Weight assigned at or below the minimum threshold.
pub const MIN_WEIGHT: f64 = 0.01;

/// Weight assigned above the maximum threshold.
pub const MAX_WEIGHT: f64 = 1.0;

/// Width of the interpolated band.
const RAMP_SPAN: f64 = 0.9;

/// Default name of the vertex group receiving the weights.
pub const DEFAULT_GROUP_NAME: &str = "ModelChecker_Weight";

/// Distance thresholds in metres.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ThresholdConfig {
    /// Distances at or below this map to the minimum weight.
    pub min: f64,
    /// Distances above this map to the maximum weight.
    pub max: f64,
}

impl Default for ThresholdConfig {
    fn default() -> Self {
        Self {
            min: 0.01, // 1cm
            max: 0.05, // 5cm
        }
    }
}

/// A threshold configuration that is usable but probably not intended.
#[derive(Debug, Clone, Copy, PartialEq, thiserror::Error)]
pub enum ThresholdWarning {
    /// `min >= max`. Only the two saturated weights will occur.
    #[error("min threshold {min} is not below max threshold {max}")]
    Inverted { min: f64, max: f64 },
    /// A threshold is NaN or infinite.
    #[error("threshold is not finite (min {min}, max {max})")]
    NonFinite { min: f64, max: f64 },
    /// The sentinel weight is NaN or outside [0, 1].
    #[error("sentinel weight {weight} is outside [0, 1]")]
    SentinelOutOfRange { weight: f64 },
}

impl ThresholdConfig {
    /// Create a threshold pair.
    pub fn new(min: f64, max: f64) -> Self {
        Self { min, max }
    }

    /// Report a configuration that would give a degenerate mapping.
    ///
    /// This is advisory; [`map_to_weight`] still runs on any input.
    pub fn validate(&self) -> Result<(), ThresholdWarning> {
        if !self.min.is_finite() || !self.max.is_finite() {
            return Err(ThresholdWarning::NonFinite {
                min: self.min,
                max: self.max,
            });
        }
        if self.min >= self.max {
            return Err(ThresholdWarning::Inverted {
                min: self.min,
                max: self.max,
            });
        }
        Ok(())
    }
}

/// Map a distance to a weight in [0.01, 1.0].
///
/// The comparisons run in a fixed order (`> max`, then `<= min`), so an
/// inverted configuration never reaches the division.
///
/// # Example
///
/// ```
/// use mesh_discrepancy::{ThresholdConfig, map_to_weight};
///
/// let t = ThresholdConfig::default();
/// assert_eq!(map_to_weight(0.06, &t), 1.0);
/// assert_eq!(map_to_weight(0.005, &t), 0.01);
/// assert!((map_to_weight(0.03, &t) - 0.46).abs() < 1e-12);
/// ```
#[inline]
pub fn map_to_weight(distance: f64, thresholds: &ThresholdConfig) -> f64 {
    if distance > thresholds.max {
        MAX_WEIGHT
    } else if distance <= thresholds.min {
        MIN_WEIGHT
    } else {
        MIN_WEIGHT + (distance - thresholds.min) / (thresholds.max - thresholds.min) * RAMP_SPAN
    }
}

/// What to do with probe vertices that received no distance.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(tag = "mode", content = "weight", rename_all = "snake_case")]
pub enum MissingDistancePolicy {
    /// Leave the vertex out of the weight map.
    #[default]
    Skip,
    /// Assign a fixed weight.
    ///
    /// Values outside [0, 1] are clamped when the map is built. A non-finite
    /// sentinel assigns nothing.
    Sentinel(f64),
}

impl MissingDistancePolicy {
    /// Report a sentinel that cannot be written as is.
    pub fn validate(&self) -> Result<(), ThresholdWarning> {
        match *self {
            Self::Sentinel(weight) if !(0.0..=1.0).contains(&weight) => {
                Err(ThresholdWarning::SentinelOutOfRange { weight })
            }
            _ => Ok(()),
        }
    }

    /// The weight an unmeasured vertex receives, if any.
    pub fn missing_weight(&self) -> Option<f64> {
        match *self {
            Self::Skip => None,
            Self::Sentinel(weight) if weight.is_finite() => Some(weight.clamp(0.0, 1.0)),
            Self::Sentinel(_) => None,
        }
    }
}

/// Receives weights for mesh vertices.
///
/// Each call replaces any weight previously assigned to the vertex.
pub trait WeightSink {
    fn assign(&mut self, vertex_index: usize, weight: f64);
}

/// Ordered per-vertex weights for the probe mesh.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct WeightMap {
    entries: Vec<(usize, f64)>,
}

impl WeightMap {
    /// Create an empty weight map.
    pub fn new() -> Self {
        Self::default()
    }

    /// Weight of a vertex, if it has one.
    pub fn get(&self, vertex_index: usize) -> Option<f64> {
        self.entries
            .binary_search_by_key(&vertex_index, |&(i, _)| i)
            .ok()
            .map(|pos| self.entries[pos].1)
    }

    /// Number of weighted vertices.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Check whether no vertex has a weight.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterate over `(vertex_index, weight)` in ascending vertex order.
    pub fn iter(&self) -> impl Iterator<Item = (usize, f64)> + '_ {
        self.entries.iter().copied()
    }

    /// Write every weight into a sink.
    pub fn apply_to<S: WeightSink + ?Sized>(&self, sink: &mut S) {
        for &(index, weight) in &self.entries {
            sink.assign(index, weight);
        }
    }
}

/// Build the weight map for a distance field.
pub fn build_weight_map(
    field: &DistanceField,
    thresholds: &ThresholdConfig,
    policy: MissingDistancePolicy,
) -> WeightMap {
    let missing = policy.missing_weight();
    let entries: Vec<(usize, f64)> = field
        .iter()
        .enumerate()
        .filter_map(|(index, distance)| match distance {
            Some(d) => Some((index, map_to_weight(*d, thresholds))),
            None => missing.map(|w| (index, w)),
        })
        .collect();

    debug!(
        target: "mesh_discrepancy::weight",
        weighted = entries.len(),
        skipped = field.len() - entries.len(),
        "Built weight map"
    );

    WeightMap { entries }
}

/// In-memory named vertex group, the reference [`WeightSink`].
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct VertexGroup {
    /// Group name.
    pub name: String,
    /// Weight per vertex, `None` for vertices not in the group.
    pub weights: Vec<Option<f64>>,
}

impl VertexGroup {
    /// Create an empty group for a mesh with `vertex_count` vertices.
    pub fn new(name: impl Into<String>, vertex_count: usize) -> Self {
        Self {
            name: name.into(),
            weights: vec![None; vertex_count],
        }
    }

    /// Create the default `ModelChecker_Weight` group.
    pub fn model_checker(vertex_count: usize) -> Self {
        Self::new(DEFAULT_GROUP_NAME, vertex_count)
    }

    /// Weight of a vertex, if assigned.
    pub fn weight(&self, vertex_index: usize) -> Option<f64> {
        self.weights.get(vertex_index).copied().flatten()
    }

    /// Number of vertices with a weight.
    pub fn assigned_count(&self) -> usize {
        self.weights.iter().filter(|w| w.is_some()).count()
    }
}

impl WeightSink for VertexGroup {
    fn assign(&mut self, vertex_index: usize, weight: f64) {
        if vertex_index >= self.weights.len() {
            self.weights.resize(vertex_index + 1, None);
        }
        self.weights[vertex_index] = Some(weight);
    }
}
