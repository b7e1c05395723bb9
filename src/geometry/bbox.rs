//! Axis-aligned domain bounds.

use crate::mesh_error::MeshGenError;
use serde::{Deserialize, Serialize};

/// Axis-aligned bounding box stored as one `(min, max)` pair per axis.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct BoundingBox {
    bounds: Vec<(f64, f64)>,
}

impl BoundingBox {
    /// Validated box from `(min, max)` pairs. Only 2D and 3D boxes are accepted.
    pub fn new(bounds: Vec<(f64, f64)>) -> Result<Self, MeshGenError> {
        let bbox = Self { bounds };
        bbox.validate()?;
        Ok(bbox)
    }

    /// Box from a flat `[x0, x1, y0, y1, (z0, z1)]` slice.
    pub fn from_flat(flat: &[f64]) -> Result<Self, MeshGenError> {
        if flat.len() % 2 != 0 {
            return Err(MeshGenError::DimensionMismatch {
                what: "flat bounding box".into(),
                expected: 2 * (flat.len() / 2 + 1),
                got: flat.len(),
            });
        }
        Self::new(flat.chunks_exact(2).map(|c| (c[0], c[1])).collect())
    }

    /// Number of axes.
    #[inline]
    pub fn dim(&self) -> usize {
        self.bounds.len()
    }

    /// `(min, max)` of every axis.
    #[inline]
    pub fn bounds(&self) -> &[(f64, f64)] {
        &self.bounds
    }

    /// Largest side length.
    pub fn max_extent(&self) -> f64 {
        self.bounds
            .iter()
            .map(|&(lo, hi)| hi - lo)
            .fold(0.0, f64::max)
    }

    /// Re-check the invariants; deserialised boxes bypass [`BoundingBox::new`].
    pub fn validate(&self) -> Result<(), MeshGenError> {
        let dim = self.bounds.len();
        if !(2..=3).contains(&dim) {
            return Err(MeshGenError::UnsupportedDimension(dim));
        }
        for (axis, &(min, max)) in self.bounds.iter().enumerate() {
            if !min.is_finite() || !max.is_finite() || min >= max {
                return Err(MeshGenError::InvalidBoundingBox { axis, min, max });
            }
        }
        Ok(())
    }
}
