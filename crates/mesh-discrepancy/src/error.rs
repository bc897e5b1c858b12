//! Error types for discrepancy checking with rich diagnostics.
//!
//! This module provides error handling with:
//! - Machine-readable error codes for programmatic handling
//! - Context about which file, vertex or face caused the failure
//! - Recovery suggestions for common issues
//! - Terminal display via miette
//!
//! # Error Codes
//!
//! Each error has a unique code in the format `MESH-XXXX`:
//! - `MESH-1xxx`: I/O errors (file reading, writing, parsing)
//! - `MESH-2xxx`: Validation errors (coordinates, indices, empty input)
//! - `MESH-4xxx`: Format errors (unsupported extensions)
//! - `MESH-5xxx`: Check errors (selection preconditions, configuration)
//!
//! The discrepancy engine itself never fails. Degenerate input degrades to an
//! empty distance field and a zero summary. Only loading, configuration and
//! the selection precondition produce errors.
//!
//! # Example
//!
//! ```
//! use mesh_discrepancy::{ErrorCode, MeshError};
//!
//! let err = MeshError::precondition("only one object selected");
//! assert_eq!(err.code(), ErrorCode::Precondition);
//! assert_eq!(err.code().as_str(), "MESH-5001");
//! ```

use miette::Diagnostic;
use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for mesh operations.
pub type MeshResult<T> = Result<T, MeshError>;

/// Machine-readable error codes.
///
/// Codes follow the pattern `MESH-XXXX` where:
/// - 1xxx = I/O errors
/// - 2xxx = Validation errors
/// - 4xxx = Format errors
/// - 5xxx = Check errors
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCode {
    // I/O errors (1xxx)
    /// MESH-1001: Failed to read file
    IoRead = 1001,
    /// MESH-1002: Failed to write file
    IoWrite = 1002,
    /// MESH-1003: Failed to parse file format
    ParseError = 1003,

    // Validation errors (2xxx)
    /// MESH-2001: Face references invalid vertex index
    InvalidVertexIndex = 2001,
    /// MESH-2002: Vertex has NaN or Infinity coordinate
    InvalidCoordinate = 2002,
    /// MESH-2003: Mesh has no vertices
    EmptyMesh = 2003,

    // Format errors (4xxx)
    /// MESH-4001: Unsupported file format
    UnsupportedFormat = 4001,

    // Check errors (5xxx)
    /// MESH-5001: Selection does not contain exactly two polygonal meshes
    Precondition = 5001,
    /// MESH-5002: Configuration could not be parsed or serialized
    Config = 5002,
}

impl ErrorCode {
    /// Returns the error code as a string in the format `MESH-XXXX`.
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorCode::IoRead => "MESH-1001",
            ErrorCode::IoWrite => "MESH-1002",
            ErrorCode::ParseError => "MESH-1003",
            ErrorCode::InvalidVertexIndex => "MESH-2001",
            ErrorCode::InvalidCoordinate => "MESH-2002",
            ErrorCode::EmptyMesh => "MESH-2003",
            ErrorCode::UnsupportedFormat => "MESH-4001",
            ErrorCode::Precondition => "MESH-5001",
            ErrorCode::Config => "MESH-5002",
        }
    }
}

impl std::fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Recovery suggestions for mesh errors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RecoverySuggestion {
    /// Re-export the file from the original software with different settings.
    ReexportFile { format: Option<String> },
    /// Use a different file format.
    UseDifferentFormat { suggested: Vec<String> },
    /// Check the original mesh for issues.
    CheckSourceMesh { checks: Vec<String> },
    /// Change which objects are passed to the check.
    FixSelection { description: String },
    /// Adjust parameters for the operation.
    AdjustParameters { parameters: Vec<(String, String)> },
}

impl std::fmt::Display for RecoverySuggestion {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RecoverySuggestion::ReexportFile { format } => {
                if let Some(fmt) = format {
                    write!(
                        f,
                        "Try re-exporting the mesh as {} from the original software",
                        fmt
                    )
                } else {
                    write!(f, "Try re-exporting the mesh from the original software")
                }
            }
            RecoverySuggestion::UseDifferentFormat { suggested } => {
                write!(f, "Try using a different format: {}", suggested.join(", "))
            }
            RecoverySuggestion::CheckSourceMesh { checks } => {
                write!(f, "Check the source mesh for: {}", checks.join(", "))
            }
            RecoverySuggestion::FixSelection { description } => {
                write!(f, "{}", description)
            }
            RecoverySuggestion::AdjustParameters { parameters } => {
                let params: Vec<String> = parameters
                    .iter()
                    .map(|(k, v)| format!("{} = {}", k, v))
                    .collect();
                write!(f, "Try adjusting: {}", params.join(", "))
            }
        }
    }
}

/// Location information for mesh errors.
#[derive(Debug, Clone)]
pub enum MeshLocation {
    /// Error at a specific vertex.
    Vertex { index: usize },
    /// Error at a specific face.
    Face { index: usize },
    /// Error in a file.
    File { path: PathBuf },
}

impl std::fmt::Display for MeshLocation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            MeshLocation::Vertex { index } => write!(f, "vertex {}", index),
            MeshLocation::Face { index } => write!(f, "face {}", index),
            MeshLocation::File { path } => write!(f, "{}", path.display()),
        }
    }
}

/// Errors that can occur while loading meshes or preparing a check.
#[derive(Debug, Error, Diagnostic)]
pub enum MeshError {
    /// Error reading from a file.
    #[error("failed to read mesh from {path}")]
    #[diagnostic(
        code(mesh::io::read),
        help("Check that the file exists and is readable. Try: ls -la {}", path.display())
    )]
    IoRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Error writing to a file.
    #[error("failed to write mesh to {path}")]
    #[diagnostic(
        code(mesh::io::write),
        help("Check that the directory exists and is writable")
    )]
    IoWrite {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Error parsing mesh file format.
    #[error("failed to parse mesh from {path}: {details}")]
    #[diagnostic(
        code(mesh::parse::error),
        help(
            "The file may be corrupted or in an unsupported format variant. Try re-exporting from the original software."
        )
    )]
    ParseError { path: PathBuf, details: String },

    /// Unsupported file format.
    #[error("unsupported mesh format: {extension:?}")]
    #[diagnostic(code(mesh::format::unsupported), help("Supported formats: STL, OBJ, PLY"))]
    UnsupportedFormat { extension: Option<String> },

    /// Empty mesh (no vertices).
    #[error("mesh is empty: {details}")]
    #[diagnostic(
        code(mesh::validation::empty),
        help("The mesh must have at least one vertex. Check that the file was exported correctly.")
    )]
    EmptyMesh { details: String },

    /// Invalid vertex index in face data.
    #[error(
        "invalid vertex index: face {face_index} references vertex {vertex_index}, but mesh only has {vertex_count} vertices"
    )]
    #[diagnostic(
        code(mesh::validation::vertex_index),
        help("Check the mesh export settings; faces must reference existing vertices.")
    )]
    InvalidVertexIndex {
        face_index: usize,
        vertex_index: u32,
        vertex_count: usize,
    },

    /// Invalid coordinate value (NaN or Infinity).
    #[error("invalid coordinate at vertex {vertex_index}: {coordinate} is {value}")]
    #[diagnostic(
        code(mesh::validation::coordinate),
        help(
            "Check for numerical issues in the source data. This often happens with very small or very large values."
        )
    )]
    InvalidCoordinate {
        vertex_index: usize,
        coordinate: &'static str,
        value: f64,
    },

    /// The selection handed to the check is not exactly two polygonal meshes.
    #[error("{details}")]
    #[diagnostic(
        code(mesh::check::precondition),
        help("Pass exactly two inputs, and make sure both contain faces.")
    )]
    Precondition { details: String },

    /// Configuration could not be parsed or serialized.
    #[error("invalid configuration: {details}")]
    #[diagnostic(
        code(mesh::check::config),
        help("Check the configuration file against `mesh check --help` for valid keys.")
    )]
    Config { details: String },
}

impl MeshError {
    /// Returns the machine-readable error code.
    pub fn code(&self) -> ErrorCode {
        match self {
            MeshError::IoRead { .. } => ErrorCode::IoRead,
            MeshError::IoWrite { .. } => ErrorCode::IoWrite,
            MeshError::ParseError { .. } => ErrorCode::ParseError,
            MeshError::UnsupportedFormat { .. } => ErrorCode::UnsupportedFormat,
            MeshError::EmptyMesh { .. } => ErrorCode::EmptyMesh,
            MeshError::InvalidVertexIndex { .. } => ErrorCode::InvalidVertexIndex,
            MeshError::InvalidCoordinate { .. } => ErrorCode::InvalidCoordinate,
            MeshError::Precondition { .. } => ErrorCode::Precondition,
            MeshError::Config { .. } => ErrorCode::Config,
        }
    }

    /// Returns a recovery suggestion for this error.
    pub fn recovery_suggestion(&self) -> RecoverySuggestion {
        match self {
            MeshError::IoRead { .. } => RecoverySuggestion::CheckSourceMesh {
                checks: vec!["file exists".into(), "file permissions".into()],
            },
            MeshError::IoWrite { .. } => RecoverySuggestion::CheckSourceMesh {
                checks: vec!["directory exists".into(), "write permissions".into()],
            },
            MeshError::ParseError { .. } => RecoverySuggestion::ReexportFile {
                format: Some("binary STL or OBJ".into()),
            },
            MeshError::UnsupportedFormat { .. } => RecoverySuggestion::UseDifferentFormat {
                suggested: vec!["STL".into(), "OBJ".into(), "PLY".into()],
            },
            MeshError::EmptyMesh { .. } => RecoverySuggestion::CheckSourceMesh {
                checks: vec!["mesh has geometry".into(), "correct export settings".into()],
            },
            MeshError::InvalidVertexIndex { .. } => RecoverySuggestion::ReexportFile { format: None },
            MeshError::InvalidCoordinate { .. } => RecoverySuggestion::CheckSourceMesh {
                checks: vec!["coordinate values".into(), "export precision".into()],
            },
            MeshError::Precondition { .. } => RecoverySuggestion::FixSelection {
                description: "Select exactly two objects, both polygonal meshes".into(),
            },
            MeshError::Config { .. } => RecoverySuggestion::AdjustParameters {
                parameters: vec![
                    ("min_threshold".into(), "a finite value in metres".into()),
                    ("max_threshold".into(), "greater than min_threshold".into()),
                ],
            },
        }
    }

    /// Returns location information if available.
    pub fn location(&self) -> Option<MeshLocation> {
        match self {
            MeshError::InvalidVertexIndex { face_index, .. } => {
                Some(MeshLocation::Face { index: *face_index })
            }
            MeshError::InvalidCoordinate { vertex_index, .. } => Some(MeshLocation::Vertex {
                index: *vertex_index,
            }),
            MeshError::ParseError { path, .. }
            | MeshError::IoRead { path, .. }
            | MeshError::IoWrite { path, .. } => Some(MeshLocation::File { path: path.clone() }),
            _ => None,
        }
    }

    // Constructor helpers for common error patterns

    /// Create an IoRead error.
    pub fn io_read(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        MeshError::IoRead {
            path: path.into(),
            source,
        }
    }

    /// Create an IoWrite error.
    pub fn io_write(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        MeshError::IoWrite {
            path: path.into(),
            source,
        }
    }

    /// Create a ParseError.
    pub fn parse_error(path: impl Into<PathBuf>, details: impl Into<String>) -> Self {
        MeshError::ParseError {
            path: path.into(),
            details: details.into(),
        }
    }

    /// Create an EmptyMesh error.
    pub fn empty_mesh(details: impl Into<String>) -> Self {
        MeshError::EmptyMesh {
            details: details.into(),
        }
    }

    /// Create a Precondition error.
    pub fn precondition(details: impl Into<String>) -> Self {
        MeshError::Precondition {
            details: details.into(),
        }
    }

    /// Create a Config error.
    pub fn config(details: impl Into<String>) -> Self {
        MeshError::Config {
            details: details.into(),
        }
    }

    /// Create an UnsupportedFormat error.
    pub fn unsupported_format(extension: Option<String>) -> Self {
        MeshError::UnsupportedFormat { extension }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_codes() {
        let err = MeshError::InvalidVertexIndex {
            face_index: 5,
            vertex_index: 100,
            vertex_count: 50,
        };
        assert_eq!(err.code(), ErrorCode::InvalidVertexIndex);
        assert_eq!(err.code().as_str(), "MESH-2001");

        assert_eq!(MeshError::config("bad").code().as_str(), "MESH-5002");
    }

    #[test]
    fn test_precondition_display_is_bare_message() {
        let err = MeshError::precondition("Exactly two objects must be selected.");
        assert_eq!(format!("{}", err), "Exactly two objects must be selected.");
        match err.recovery_suggestion() {
            RecoverySuggestion::FixSelection { description } => {
                assert!(description.contains("two objects"));
            }
            other => panic!("Expected FixSelection suggestion, got {:?}", other),
        }
    }

    #[test]
    fn test_location_info() {
        let err = MeshError::InvalidCoordinate {
            vertex_index: 7,
            coordinate: "y",
            value: f64::NAN,
        };
        match err.location() {
            Some(MeshLocation::Vertex { index }) => assert_eq!(index, 7),
            other => panic!("Expected Vertex location, got {:?}", other),
        }

        let err = MeshError::parse_error("model.ply", "truncated header");
        assert!(matches!(err.location(), Some(MeshLocation::File { .. })));
        assert!(MeshError::precondition("x").location().is_none());
    }

    #[test]
    fn test_error_display() {
        let err = MeshError::InvalidVertexIndex {
            face_index: 5,
            vertex_index: 100,
            vertex_count: 50,
        };
        let display = format!("{}", err);
        assert!(display.contains("face 5"));
        assert!(display.contains("vertex 100"));
        assert!(display.contains("50 vertices"));
    }
}
