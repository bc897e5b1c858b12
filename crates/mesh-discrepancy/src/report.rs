//! Presentation-ready result of a model check.

use serde::Serialize;

use crate::discrepancy::{DiscrepancyResult, Summary};

/// Notification text shown when the check ran.
pub const NO_ERROR: &str = "none";

/// Outcome of the last check.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
#[serde(tag = "state", content = "reason", rename_all = "snake_case")]
pub enum Status {
    /// The computation ran.
    #[default]
    Ok,
    /// The computation did not run; the string explains why.
    Error(String),
}

impl Status {
    /// Check whether this is `Status::Ok`.
    pub fn is_ok(&self) -> bool {
        matches!(self, Status::Ok)
    }

    /// The error notification line: the reason, or `none`.
    pub fn notification(&self) -> &str {
        match self {
            Status::Ok => NO_ERROR,
            Status::Error(reason) => reason,
        }
    }
}

/// Summary statistics plus status, as shown to the user.
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct DiscrepancyReport {
    /// Distance statistics in metres.
    pub summary: Summary,
    /// Whether the check ran.
    pub status: Status,
    /// Threshold of the accepted pass.
    pub angle_threshold: Option<u32>,
    /// Number of threshold passes run.
    pub passes: u32,
    /// Vertex count of the probe mesh.
    pub probe_vertices: usize,
    /// Number of probe vertices that received a distance.
    pub measured_vertices: usize,
}

impl DiscrepancyReport {
    /// Report for a completed computation.
    pub fn from_result(result: &DiscrepancyResult) -> Self {
        Self {
            summary: result.summary,
            status: Status::Ok,
            angle_threshold: result.angle_threshold,
            passes: result.passes,
            probe_vertices: result.probe_vertex_count,
            measured_vertices: result.measured_count(),
        }
    }

    /// Report for a check that did not run.
    pub fn error(reason: impl Into<String>) -> Self {
        Self {
            status: Status::Error(reason.into()),
            ..Default::default()
        }
    }
}

impl std::fmt::Display for DiscrepancyReport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "Min distance: {:.4} in meters", self.summary.min)?;
        writeln!(f, "Max distance: {:.4} in meters", self.summary.max)?;
        writeln!(f, "Average distance: {:.4} in meters", self.summary.mean)?;
        writeln!(f, "Standard deviation: {:.4} in meters", self.summary.std_dev)?;
        writeln!(f, "Error notification: {}", self.status.notification())?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::discrepancy::ProbeSide;

    fn sample_result() -> DiscrepancyResult {
        DiscrepancyResult {
            field: vec![Some(0.1), None, Some(0.2), Some(0.3)],
            summary: Summary::from_distances(&[0.1, 0.2, 0.3]),
            probe: ProbeSide::First,
            probe_vertex_count: 4,
            target_vertex_count: 10,
            angle_threshold: Some(1),
            passes: 1,
        }
    }

    #[test]
    fn test_from_result() {
        let report = DiscrepancyReport::from_result(&sample_result());
        assert!(report.status.is_ok());
        assert_eq!(report.measured_vertices, 3);
        assert_eq!(report.probe_vertices, 4);
        assert_eq!(report.angle_threshold, Some(1));
    }

    #[test]
    fn test_display_four_decimals() {
        let report = DiscrepancyReport::from_result(&sample_result());
        let text = report.to_string();
        assert!(text.contains("Min distance: 0.1000 in meters"));
        assert!(text.contains("Max distance: 0.3000 in meters"));
        assert!(text.contains("Average distance: 0.2000 in meters"));
        assert!(text.contains("Standard deviation: 0.0816 in meters"));
        assert!(text.contains("Error notification: none"));
    }

    #[test]
    fn test_error_report() {
        let report = DiscrepancyReport::error("something went wrong");
        assert_eq!(report.summary, Summary::default());
        assert_eq!(report.status.notification(), "something went wrong");
        assert!(!report.status.is_ok());
        assert!(report.to_string().contains("Min distance: 0.0000 in meters"));
    }

    #[test]
    fn test_json_shape() {
        let json = serde_json::to_value(DiscrepancyReport::error("bad")).unwrap();
        assert_eq!(json["status"]["state"], "error");
        assert_eq!(json["status"]["reason"], "bad");
        assert_eq!(json["summary"]["mean"], 0.0);

        let ok = serde_json::to_value(DiscrepancyReport::default()).unwrap();
        assert_eq!(ok["status"]["state"], "ok");
    }
}
