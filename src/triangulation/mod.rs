//! Pluggable Delaunay triangulation backends.
//!
//! The relaxation engine only needs one capability from a backend: given a
//! point set, return the simplices of (a) Delaunay triangulation as zero-based
//! index tuples. Two implementations are provided:
//!
//! - [`LiftedHullTriangulator`]: lifts the points onto a paraboloid one
//!   dimension up, builds the convex hull there and keeps the lower facets.
//!   Always available.
//! - `ExactTriangulator`: Bowyer–Watson insertion on exact adaptive
//!   predicates. Compiled only with the `exact-predicates` feature.
//!
//! Backends never panic on degenerate input (too few points, collinear or
//! coplanar sets); they return an empty list instead.

#[cfg(feature = "exact-predicates")]
pub mod exact;
pub mod lifted_hull;

#[cfg(feature = "exact-predicates")]
pub use exact::ExactTriangulator;
pub use lifted_hull::LiftedHullTriangulator;

use crate::data::point_set::PointSet;
use crate::geometry::quality::simplex_volume;
use crate::mesh_error::MeshGenError;
#[cfg(not(feature = "exact-predicates"))]
use once_cell::sync::OnceCell;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// A Delaunay triangulation capability.
pub trait Triangulator {
    /// Simplices (`dim + 1` indices each) covering the convex hull of `points`.
    ///
    /// Input points are expected to be pairwise distinct.
    fn triangulate(&self, points: &PointSet) -> Vec<Vec<usize>>;

    /// Short human-readable backend name for progress output.
    fn name(&self) -> &'static str;
}

/// Selector for the built-in backends.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TriangulationMethod {
    /// Convex hull of the lifted point set.
    #[default]
    Hull,
    /// Exact-predicate Bowyer–Watson.
    Exact,
}

impl TriangulationMethod {
    /// Whether this backend was compiled in.
    pub fn is_available(self) -> bool {
        match self {
            TriangulationMethod::Hull => true,
            TriangulationMethod::Exact => cfg!(feature = "exact-predicates"),
        }
    }

    /// Resolve the selector into a backend, falling back to the hull backend
    /// when the exact one is not compiled in.
    pub fn backend(self) -> Box<dyn Triangulator> {
        match self {
            TriangulationMethod::Hull => Box::new(LiftedHullTriangulator::default()),
            #[cfg(feature = "exact-predicates")]
            TriangulationMethod::Exact => Box::new(ExactTriangulator),
            #[cfg(not(feature = "exact-predicates"))]
            TriangulationMethod::Exact => {
                static FALLBACK_NOTICE: OnceCell<()> = OnceCell::new();
                FALLBACK_NOTICE.get_or_init(|| {
                    log::info!(
                        "Exact-predicate triangulation not compiled in (enable the \
                         `exact-predicates` feature for enhanced robustness); \
                         using the lifted convex hull instead."
                    );
                });
                Box::new(LiftedHullTriangulator::default())
            }
        }
    }
}

impl fmt::Display for TriangulationMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TriangulationMethod::Hull => f.write_str("hull"),
            TriangulationMethod::Exact => f.write_str("exact"),
        }
    }
}

impl FromStr for TriangulationMethod {
    type Err = MeshGenError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "hull" => Ok(TriangulationMethod::Hull),
            "exact" => Ok(TriangulationMethod::Exact),
            _ => Err(MeshGenError::UnknownMethod(s.to_string())),
        }
    }
}

/// Reorder a simplex so that its signed area/volume is non-negative.
pub(crate) fn orient_positive(points: &PointSet, mut cell: Vec<usize>) -> Vec<usize> {
    if simplex_volume(points, &cell) < 0.0 {
        cell.swap(0, 1);
    }
    cell
}
