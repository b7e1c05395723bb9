//! Run diagnostics and the observer hook.

use crate::data::point_set::PointSet;
use std::time::Duration;

/// Why the relaxation loop stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Termination {
    /// Interior displacement fell below `ptol * h0`.
    Converged,
    /// The iteration budget ran out first.
    MaxIterations,
}

/// Snapshot of one iteration.
#[derive(Debug, Clone, PartialEq)]
pub struct IterationStats {
    pub iteration: usize,
    /// `deltat * max |F|` over interior points.
    pub max_displacement: f64,
    pub num_points: usize,
    pub num_cells: usize,
    pub retriangulated: bool,
    /// Factor `l0mult * (ΣL^d / Σh^d)^(1/d)` used for this iteration's rest
    /// lengths; zero when there were no bars.
    pub length_scale: f64,
    pub elapsed: Duration,
}

/// Summary of a finished run.
#[derive(Debug, Clone, PartialEq)]
pub struct RelaxationReport {
    /// Number of iterations executed.
    pub iterations: usize,
    pub retriangulations: usize,
    /// Interior displacement of the last iteration.
    pub max_displacement: f64,
    pub termination: Termination,
    /// Name of the triangulation backend that was used.
    pub backend: &'static str,
    pub history: Vec<IterationStats>,
}

impl RelaxationReport {
    pub fn converged(&self) -> bool {
        self.termination == Termination::Converged
    }
}

/// Receives progress from the relaxation loop.
///
/// Both methods default to no-ops; `()` is the silent observer.
pub trait RelaxationObserver {
    /// Called once per iteration after projection.
    fn on_iteration(&mut self, _stats: &IterationStats, _points: &PointSet) {}

    /// Called after a retriangulation when plotting is enabled and the
    /// iteration is a multiple of `nscreen`.
    fn on_retriangulation(&mut self, _iteration: usize, _points: &PointSet, _cells: &[Vec<usize>]) {
    }
}

impl RelaxationObserver for () {}
