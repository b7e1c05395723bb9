//! Geometry utilities for sdf-mesh.
//!
//! This module holds the domain description consumed by the generator
//! ([`SizingFunction`], [`BoundingBox`]), a handful of signed-distance
//! primitives, and post-hoc simplex quality metrics.

pub mod bbox;
pub mod quality;
pub mod sdf;
pub mod sizing;

pub use bbox::BoundingBox;
pub use sizing::{Domain, SizingFunction};
