//! MeshGenError: Unified error type for sdf-mesh public APIs
//!
//! Only configuration problems are reported through this type. Everything that
//! can go wrong numerically inside the relaxation loop (empty triangulations,
//! vanishing gradients, collapsed bars) is handled locally so the loop keeps
//! running.

use thiserror::Error;

/// Unified error type for mesh generation.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum MeshGenError {
    /// Bounding box has a non-finite bound or an empty/inverted interval.
    #[error("Invalid bounding box on axis {axis}: [{min}, {max}]")]
    InvalidBoundingBox { axis: usize, min: f64, max: f64 },
    /// Only planar and volumetric meshes are supported.
    #[error("Unsupported dimension {0} (expected 2 or 3)")]
    UnsupportedDimension(usize),
    /// A coordinate tuple does not match the embedding dimension.
    #[error("Dimension mismatch for {what}: expected {expected}, got {got}")]
    DimensionMismatch {
        what: String,
        expected: usize,
        got: usize,
    },
    /// A scalar parameter is out of range.
    #[error("Invalid parameter `{name}`: {reason}")]
    InvalidParameter { name: &'static str, reason: String },
    /// Two fixed points share the same coordinates.
    #[error("Fixed point {index} duplicates fixed point {first}")]
    DuplicateFixedPoint { index: usize, first: usize },
    /// A triangulation method name could not be parsed.
    #[error("Unknown triangulation method `{0}` (expected `hull` or `exact`)")]
    UnknownMethod(String),
}

impl MeshGenError {
    pub(crate) fn invalid_parameter(name: &'static str, reason: impl Into<String>) -> Self {
        MeshGenError::InvalidParameter {
            name,
            reason: reason.into(),
        }
    }
}
