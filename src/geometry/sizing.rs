//! The sizing/geometry provider consumed by the mesh generator.
//!
//! A provider answers two batched questions about a [`PointSet`]: how far each
//! point is from the domain boundary (negative inside) and what edge length the
//! mesh should have there. Both calls return one value per input point, in the
//! input order.

use crate::data::point_set::PointSet;
use crate::geometry::bbox::BoundingBox;
use crate::mesh_error::MeshGenError;

/// Domain description: signed distance, target size, minimum size and bounds.
pub trait SizingFunction {
    /// Signed distance of every point (negative inside, zero on the boundary).
    fn signed_distance(&self, points: &PointSet) -> Vec<f64>;

    /// Desired local edge length at every point.
    fn target_size(&self, points: &PointSet) -> Vec<f64>;

    /// Smallest edge length requested anywhere in the domain.
    fn minimum_size(&self) -> f64;

    /// Bounding box enclosing the domain.
    fn bbox(&self) -> &BoundingBox;

    /// Embedding dimension, taken from the bounding box.
    fn dim(&self) -> usize {
        self.bbox().dim()
    }
}

type PointFn = Box<dyn Fn(&[f64]) -> f64 + Send + Sync>;

/// [`SizingFunction`] assembled from per-point closures.
///
/// ```rust
/// use sdf_mesh::geometry::{BoundingBox, Domain, sdf};
///
/// let disk = Domain::uniform(
///     BoundingBox::new(vec![(-1.0, 1.0), (-1.0, 1.0)])?,
///     0.2,
///     |p| sdf::ball(p, &[0.0, 0.0], 1.0),
/// )?;
/// # Ok::<(), sdf_mesh::mesh_error::MeshGenError>(())
/// ```
pub struct Domain {
    bbox: BoundingBox,
    hmin: f64,
    fd: PointFn,
    fh: PointFn,
}

impl Domain {
    /// Domain with a spatially varying size field. `hmin` must be the minimum
    /// of `fh` over the domain.
    pub fn new<D, H>(bbox: BoundingBox, hmin: f64, fd: D, fh: H) -> Result<Self, MeshGenError>
    where
        D: Fn(&[f64]) -> f64 + Send + Sync + 'static,
        H: Fn(&[f64]) -> f64 + Send + Sync + 'static,
    {
        bbox.validate()?;
        if !(hmin.is_finite() && hmin > 0.0) {
            return Err(MeshGenError::invalid_parameter(
                "hmin",
                format!("must be positive and finite, got {hmin}"),
            ));
        }
        Ok(Self {
            bbox,
            hmin,
            fd: Box::new(fd),
            fh: Box::new(fh),
        })
    }

    /// Domain with a constant size field `h`.
    pub fn uniform<D>(bbox: BoundingBox, h: f64, fd: D) -> Result<Self, MeshGenError>
    where
        D: Fn(&[f64]) -> f64 + Send + Sync + 'static,
    {
        Self::new(bbox, h, fd, move |_| h)
    }
}

impl std::fmt::Debug for Domain {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Domain")
            .field("bbox", &self.bbox)
            .field("hmin", &self.hmin)
            .finish_non_exhaustive()
    }
}

impl SizingFunction for Domain {
    fn signed_distance(&self, points: &PointSet) -> Vec<f64> {
        points.iter().map(|p| (self.fd)(p)).collect()
    }

    fn target_size(&self, points: &PointSet) -> Vec<f64> {
        points.iter().map(|p| (self.fh)(p)).collect()
    }

    fn minimum_size(&self) -> f64 {
        self.hmin
    }

    fn bbox(&self) -> &BoundingBox {
        &self.bbox
    }
}
