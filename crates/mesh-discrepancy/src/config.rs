//! Serializable settings for a model check.
//!
//! # Example TOML
//!
//! ```toml
//! normal_space = "world"
//!
//! [thresholds]
//! min = 0.005
//! max = 0.02
//!
//! [engine]
//! max_angle_deg = 10
//! parallel = true
//!
//! [missing]
//! mode = "sentinel"
//! weight = 0.0
//! ```
//!
//! Every key is optional; missing keys take their defaults.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::discrepancy::DiscrepancyParams;
use crate::error::{MeshError, MeshResult};
use crate::view::NormalSpace;
use crate::weight::{MissingDistancePolicy, ThresholdConfig};

/// All knobs of a model check.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct CheckConfig {
    /// Distance thresholds for the weight mapping.
    pub thresholds: ThresholdConfig,
    /// Angular search parameters.
    pub engine: DiscrepancyParams,
    /// Space in which vertex normals are measured.
    pub normal_space: NormalSpace,
    /// Handling of probe vertices without a distance.
    pub missing: MissingDistancePolicy,
}

impl CheckConfig {
    /// Default configuration with custom thresholds.
    pub fn with_thresholds(min: f64, max: f64) -> Self {
        Self {
            thresholds: ThresholdConfig::new(min, max),
            ..Default::default()
        }
    }

    /// Load configuration from a TOML string.
    pub fn from_toml(toml_str: &str) -> MeshResult<Self> {
        toml::from_str(toml_str).map_err(|e| MeshError::config(format!("TOML parse error: {e}")))
    }

    /// Load configuration from a TOML file.
    pub fn from_toml_file(path: impl AsRef<Path>) -> MeshResult<Self> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path).map_err(|e| MeshError::io_read(path, e))?;
        Self::from_toml(&contents)
    }

    /// Serialize to a TOML string.
    pub fn to_toml(&self) -> MeshResult<String> {
        toml::to_string_pretty(self)
            .map_err(|e| MeshError::config(format!("TOML serialize error: {e}")))
    }

    /// Load configuration from a JSON string.
    pub fn from_json(json_str: &str) -> MeshResult<Self> {
        serde_json::from_str(json_str)
            .map_err(|e| MeshError::config(format!("JSON parse error: {e}")))
    }

    /// Serialize to a JSON string.
    pub fn to_json(&self) -> MeshResult<String> {
        serde_json::to_string_pretty(self)
            .map_err(|e| MeshError::config(format!("JSON serialize error: {e}")))
    }
}
