//! Unstructured simplex mesh generation by force-equilibrium relaxation.
//!
//! [`MeshGenerator`] seeds points over the bounding box of a
//! [`SizingFunction`], then alternates between
//!
//! 1. Delaunay retriangulation (only when points moved more than `ttol * h0`
//!    since the last one),
//! 2. a repulsive spring step along the triangulation edges,
//! 3. projection of escaped points back onto the boundary,
//!
//! until the interior displacement drops below `ptol * h0` or the iteration
//! budget runs out.
//!
//! ```rust
//! use sdf_mesh::geometry::{BoundingBox, Domain, sdf};
//! use sdf_mesh::mesh_generation::{BuildOptions, MeshGenerator};
//! use sdf_mesh::triangulation::TriangulationMethod;
//!
//! let domain = Domain::uniform(
//!     BoundingBox::new(vec![(0.0, 1.0), (0.0, 1.0)])?,
//!     0.25,
//!     |p| sdf::rectangle(p, 0.0, 1.0, 0.0, 1.0),
//! )?;
//! let mesh = MeshGenerator::new(domain, TriangulationMethod::Hull)
//!     .build(&BuildOptions { seed: Some(1), ..Default::default() })?;
//! assert!(!mesh.cells.is_empty());
//! # Ok::<(), sdf_mesh::mesh_error::MeshGenError>(())
//! ```

pub mod options;
pub mod report;

pub use options::{BuildOptions, RelaxationParams};
pub use report::{IterationStats, RelaxationObserver, RelaxationReport, Termination};

use crate::algs::assembly::{assemble_bar_forces, clear_fixed};
use crate::algs::bars::{Bar, extract_bars, interior_simplices};
use crate::algs::forces::{bar_forces, default_l0mult};
use crate::algs::projection::project_to_boundary;
use crate::algs::seeding::seed_points;
use crate::data::point_set::{PointSet, bit_key};
use crate::geometry::SizingFunction;
use crate::geometry::quality::mesh_quality;
use crate::mesh_error::MeshGenError;
use crate::triangulation::{TriangulationMethod, Triangulator};
use hashbrown::HashMap;
use rand::SeedableRng;
use rand::rngs::SmallRng;
use std::time::Instant;

/// Output of a generation run.
#[derive(Debug, Clone)]
pub struct GeneratedMesh {
    /// Final vertex positions; the fixed points come first.
    pub points: PointSet,
    /// Simplices of the last triangulation, positively oriented.
    pub cells: Vec<Vec<usize>>,
    pub report: RelaxationReport,
}

/// Relaxation-based mesh generator over a sizing/geometry provider.
pub struct MeshGenerator<S> {
    sizing: S,
    backend: Box<dyn Triangulator>,
    params: RelaxationParams,
}

impl<S: SizingFunction> MeshGenerator<S> {
    /// Generator using one of the built-in triangulation backends.
    pub fn new(sizing: S, method: TriangulationMethod) -> Self {
        Self::with_backend(sizing, method.backend())
    }

    /// Generator using a caller-supplied triangulation backend.
    pub fn with_backend(sizing: S, backend: Box<dyn Triangulator>) -> Self {
        Self {
            sizing,
            backend,
            params: RelaxationParams::default(),
        }
    }

    /// Override the relaxation constants.
    pub fn with_params(mut self, params: RelaxationParams) -> Self {
        self.params = params;
        self
    }

    pub fn sizing(&self) -> &S {
        &self.sizing
    }

    pub fn params(&self) -> &RelaxationParams {
        &self.params
    }

    pub fn build(&self, opts: &BuildOptions) -> Result<GeneratedMesh, MeshGenError> {
        self.build_with_observer(opts, &mut ())
    }

    /// Run the relaxation, reporting progress to `observer`.
    pub fn build_with_observer(
        &self,
        opts: &BuildOptions,
        observer: &mut dyn RelaxationObserver,
    ) -> Result<GeneratedMesh, MeshGenError> {
        let bbox = self.sizing.bbox();
        bbox.validate()?;
        let dim = bbox.dim();
        let h0 = self.sizing.minimum_size();
        if !(h0.is_finite() && h0 > 0.0) {
            return Err(MeshGenError::invalid_parameter(
                "h0",
                format!("minimum size must be positive and finite, got {h0}"),
            ));
        }
        self.params.validate()?;
        opts.validate()?;
        let fixed = fixed_point_set(dim, &opts.fixed_points)?;
        let nfix = fixed.len();

        let RelaxationParams {
            ptol,
            ttol,
            deltat,
            geps_factor,
            l0mult,
        } = self.params;
        let geps = geps_factor * h0;
        let deps = f64::EPSILON.sqrt() * h0;
        let l0mult = l0mult.unwrap_or_else(|| default_l0mult(dim));

        let mut rng = match opts.seed {
            Some(seed) => SmallRng::seed_from_u64(seed),
            None => SmallRng::from_entropy(),
        };
        let mut p = seed_points(&self.sizing, h0, geps, &fixed, &mut rng);
        log::info!(
            "meshgen: dim={dim} h0={h0} backend={} seeded {} points ({nfix} fixed)",
            self.backend.name(),
            p.len()
        );

        let mut p_old: Option<PointSet> = None;
        let mut cells: Vec<Vec<usize>> = Vec::new();
        let mut bars: Vec<Bar> = Vec::new();
        let mut retriangulations = 0;
        let mut history = Vec::with_capacity(opts.max_iter);
        let mut maxdp = 0.0;
        let mut termination = Termination::MaxIterations;

        for iteration in 0..opts.max_iter {
            let started = Instant::now();

            let moved = p_old
                .as_ref()
                .and_then(|old| p.max_displacement(old))
                .map(|dp| dp / h0);
            let retriangulate = moved.is_none_or(|m| m > ttol);
            if retriangulate {
                let removed = p.dedup_exact();
                if removed > 0 {
                    log::debug!("iteration {iteration}: dropped {removed} duplicate points");
                }
                p_old = Some(p.clone());
                let raw = self.backend.triangulate(&p);
                cells = interior_simplices(&self.sizing, &p, raw, geps);
                bars = extract_bars(&cells);
                retriangulations += 1;
                if opts.plot && iteration % opts.nscreen == 0 {
                    observer.on_retriangulation(iteration, &p, &cells);
                }
            }

            // bars may be stale; the scale still follows the current positions
            let forces = bar_forces(&self.sizing, &p, &bars, l0mult);
            let mut ftot = assemble_bar_forces(p.len(), dim, &bars, &forces.vectors);
            clear_fixed(&mut ftot, dim, nfix);

            let free = nfix * dim;
            for (x, f) in p.as_flat_mut()[free..].iter_mut().zip(&ftot[free..]) {
                *x += deltat * f;
            }

            let d = project_to_boundary(&self.sizing, &mut p, nfix, deps);

            maxdp = deltat * interior_force_norm(&ftot, dim, &d, geps);

            let stats = IterationStats {
                iteration,
                max_displacement: maxdp,
                num_points: p.len(),
                num_cells: cells.len(),
                retriangulated: retriangulate,
                length_scale: forces.scale,
                elapsed: started.elapsed(),
            };
            if iteration % opts.nscreen == 0 {
                log::info!(
                    "iteration {iteration}: maxdp={maxdp:.3e} points={} cells={}",
                    stats.num_points,
                    stats.num_cells
                );
            }
            log::debug!("iteration {iteration} took {:?}", stats.elapsed);
            observer.on_iteration(&stats, &p);
            history.push(stats);

            if maxdp < ptol * h0 {
                termination = Termination::Converged;
                break;
            }
            if iteration == opts.max_iter - 1 {
                log::warn!(
                    "meshgen: iteration budget of {} exhausted (maxdp={maxdp:.3e})",
                    opts.max_iter
                );
            }
        }

        match mesh_quality(&p, &cells) {
            Some(q) => log::info!(
                "meshgen: {} points, {} cells, radius ratio min={:.3} mean={:.3}",
                p.len(),
                cells.len(),
                q.min,
                q.mean
            ),
            None => log::info!("meshgen: {} points, no cells", p.len()),
        }

        let report = RelaxationReport {
            iterations: history.len(),
            retriangulations,
            max_displacement: maxdp,
            termination,
            backend: self.backend.name(),
            history,
        };
        Ok(GeneratedMesh {
            points: p,
            cells,
            report,
        })
    }
}

impl<S: std::fmt::Debug> std::fmt::Debug for MeshGenerator<S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MeshGenerator")
            .field("sizing", &self.sizing)
            .field("backend", &self.backend.name())
            .field("params", &self.params)
            .finish()
    }
}

/// Validate the caller's fixed points: dimension, finiteness and uniqueness.
fn fixed_point_set(dim: usize, rows: &[Vec<f64>]) -> Result<PointSet, MeshGenError> {
    let fixed = PointSet::from_rows(dim, rows)?;
    let mut seen: HashMap<Vec<u64>, usize> = HashMap::with_capacity(fixed.len());
    for (index, p) in fixed.iter().enumerate() {
        if p.iter().any(|x| !x.is_finite()) {
            return Err(MeshGenError::invalid_parameter(
                "fixed_points",
                format!("point {index} has a non-finite coordinate"),
            ));
        }
        if let Some(&first) = seen.get(&bit_key(p)) {
            return Err(MeshGenError::DuplicateFixedPoint { index, first });
        }
        seen.insert(bit_key(p), index);
    }
    Ok(fixed)
}

/// Largest force norm over points deeper than `geps` inside the domain, or
/// zero when there are none.
fn interior_force_norm(ftot: &[f64], dim: usize, d: &[f64], geps: f64) -> f64 {
    ftot.chunks_exact(dim)
        .zip(d)
        .filter(|&(_, &d)| d < -geps)
        .map(|(f, _)| f.iter().map(|x| x * x).sum::<f64>().sqrt())
        .fold(0.0, f64::max)
}
