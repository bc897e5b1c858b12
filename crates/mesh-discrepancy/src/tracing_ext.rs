//! Tracing helpers for discrepancy checks.
//!
//! Library code logs through the `tracing` facade and never installs a
//! subscriber. Targets follow the module that emits them:
//!
//! - `mesh_discrepancy::timing`: operation start and elapsed time
//! - `mesh_discrepancy::engine`: per-pass progress of the angular search
//! - `mesh_discrepancy::mesh_state`: mesh dimensions at debug level
//! - `mesh_discrepancy::io`: file loads and saves
//!
//! # Usage
//!
//! ```rust,ignore
//! use tracing_subscriber::{fmt, prelude::*, EnvFilter};
//!
//! tracing_subscriber::registry()
//!     .with(fmt::layer())
//!     .with(EnvFilter::from_default_env())
//!     .init();
//!
//! // RUST_LOG=mesh_discrepancy=debug shows every threshold pass
//! ```

use std::time::Instant;
use tracing::{Span, debug, info, warn};

use crate::types::Mesh;

/// A performance timer that logs duration on drop.
///
/// ```rust,ignore
/// use mesh_discrepancy::tracing_ext::OperationTimer;
///
/// fn check(probe_vertices: usize, target_vertices: usize) {
///     let _timer = OperationTimer::with_context("check", probe_vertices, target_vertices);
///     // ... do work ...
/// } // logs elapsed_ms here, inside the operation span
/// ```
pub struct OperationTimer {
    name: &'static str,
    start: Instant,
    span: Span,
}

impl OperationTimer {
    /// Create a timer carrying the probe and target sizes of a check.
    pub fn with_context(name: &'static str, probe_vertices: usize, target_vertices: usize) -> Self {
        let span = tracing::info_span!(
            "mesh_operation",
            operation = name,
            probe_vertices = probe_vertices,
            target_vertices = target_vertices
        );
        debug!(
            target: "mesh_discrepancy::timing",
            operation = name,
            probe_vertices = probe_vertices,
            target_vertices = target_vertices,
            "Starting operation"
        );
        Self {
            name,
            start: Instant::now(),
            span,
        }
    }

    /// Get the elapsed time.
    pub fn elapsed_ms(&self) -> f64 {
        self.start.elapsed().as_secs_f64() * 1000.0
    }
}

impl Drop for OperationTimer {
    fn drop(&mut self) {
        let elapsed_ms = self.elapsed_ms();
        self.span.in_scope(|| {
            info!(
                target: "mesh_discrepancy::timing",
                operation = self.name,
                elapsed_ms = format!("{:.2}", elapsed_ms),
                "Operation completed"
            );
        });
    }
}

/// Log mesh statistics at debug level.
pub fn log_mesh_stats(mesh: &Mesh, context: &str) {
    let (min_bounds, max_bounds) = match mesh.bounds() {
        Some(b) => b,
        None => {
            debug!(target: "mesh_discrepancy::mesh_state", context = context, "Mesh is empty");
            return;
        }
    };
    let dims = max_bounds - min_bounds;

    debug!(
        target: "mesh_discrepancy::mesh_state",
        context = context,
        vertices = mesh.vertex_count(),
        faces = mesh.face_count(),
        has_normals = mesh.has_normals(),
        dimensions = format!("{:.4} x {:.4} x {:.4}", dims.x, dims.y, dims.z),
        "Mesh state"
    );
}

/// Log one pass of the angular search.
pub fn log_pass(threshold_deg: u32, found: usize, probe_vertices: usize) {
    debug!(
        target: "mesh_discrepancy::engine",
        threshold_deg = threshold_deg,
        found = found,
        probe_vertices = probe_vertices,
        "Threshold pass finished"
    );
}

/// Log a file I/O operation.
pub fn log_io_operation(
    operation: &str,
    path: &std::path::Path,
    format: Option<&str>,
    success: bool,
) {
    if success {
        info!(
            target: "mesh_discrepancy::io",
            operation = operation,
            path = path.display().to_string(),
            format = format.unwrap_or("auto"),
            "I/O operation completed"
        );
    } else {
        warn!(
            target: "mesh_discrepancy::io",
            operation = operation,
            path = path.display().to_string(),
            format = format.unwrap_or("auto"),
            "I/O operation failed"
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Vertex;

    #[test]
    fn test_operation_timer() {
        let timer = OperationTimer::with_context("test_operation", 3, 4);
        std::thread::sleep(std::time::Duration::from_millis(10));
        assert!(timer.elapsed_ms() >= 10.0);
    }

    #[test]
    fn test_log_mesh_stats() {
        // Just verify neither branch panics
        let mut mesh = Mesh::new();
        log_mesh_stats(&mesh, "empty");
        mesh.vertices.push(Vertex::from_coords(0.0, 0.0, 0.0));
        mesh.vertices.push(Vertex::from_coords(1.0, 2.0, 3.0));
        log_mesh_stats(&mesh, "two points");
        log_pass(1, 0, 2);
        log_io_operation("load", std::path::Path::new("a.ply"), Some("PLY"), false);
    }
}
