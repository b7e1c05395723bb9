#![cfg_attr(docsrs, feature(doc_cfg))]
//! # sdf-mesh
//!
//! sdf-mesh generates unstructured triangle (2D) and tetrahedral (3D) meshes
//! from an implicit domain description: a signed distance function that is
//! negative inside the domain and a sizing function giving the desired local
//! edge length. Vertices are treated as the nodes of a truss whose bars want to
//! be slightly longer than the target size; the truss is relaxed towards force
//! equilibrium while escaped vertices are projected back onto the boundary.
//!
//! ## Features
//! - Batched [`SizingFunction`](geometry::SizingFunction) provider trait and a
//!   closure-based [`Domain`](geometry::Domain)
//! - Signed distance primitives and boolean combinators in [`geometry::sdf`]
//! - Pluggable Delaunay backends behind the [`Triangulator`](triangulation::Triangulator) trait
//! - Optional exact adaptive predicates (`exact-predicates` feature)
//! - Radius-ratio quality diagnostics in [`geometry::quality`]
//!
//! ## Determinism
//!
//! The only randomized step, rejection sampling of the initial points, draws from a
//! `SmallRng` seeded from [`BuildOptions::seed`](mesh_generation::BuildOptions).
//! With a fixed seed the same input yields bit-identical meshes. Unit tests fix
//! seeds explicitly.
//!
//! ## Usage
//!
//! ```toml
//! [dependencies]
//! sdf-mesh = "0.1"
//! # Optional features:
//! # features = ["exact-predicates"]
//! ```
//!
//! ```rust
//! use sdf_mesh::prelude::*;
//!
//! let disk = Domain::uniform(
//!     BoundingBox::new(vec![(-1.0, 1.0), (-1.0, 1.0)])?,
//!     0.3,
//!     |p| sdf::ball(p, &[0.0, 0.0], 1.0),
//! )?;
//! let mesh = MeshGenerator::new(disk, TriangulationMethod::Hull).build(&BuildOptions {
//!     seed: Some(42),
//!     ..Default::default()
//! })?;
//! println!("{} vertices, {} triangles", mesh.points.len(), mesh.cells.len());
//! # Ok::<(), MeshGenError>(())
//! ```
//!
//! Logging goes through the `log` facade; install any logger to see progress.

pub mod algs;
pub mod data;
pub mod geometry;
pub mod mesh_error;
pub mod mesh_generation;
pub mod triangulation;

/// A convenient prelude to import the most-used traits & types:
pub mod prelude {
    pub use crate::data::point_set::PointSet;
    pub use crate::geometry::bbox::BoundingBox;
    pub use crate::geometry::quality::{QualitySummary, mesh_quality};
    pub use crate::geometry::sdf;
    pub use crate::geometry::sizing::{Domain, SizingFunction};
    pub use crate::mesh_error::MeshGenError;
    pub use crate::mesh_generation::{
        BuildOptions, GeneratedMesh, IterationStats, MeshGenerator, RelaxationObserver,
        RelaxationParams, RelaxationReport, Termination,
    };
    pub use crate::triangulation::{LiftedHullTriangulator, TriangulationMethod, Triangulator};
}
