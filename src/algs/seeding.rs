//! Initial point distribution: lattice seeding plus rejection sampling.
//!
//! The lattice covers the bounding box at spacing `h0`; lattice points outside
//! the domain (beyond `geps`) are dropped and the survivors are thinned with
//! probability `(r_min / r_i)^dim`, so regions asking for large elements start
//! sparse while the finest regions keep the full lattice density.

use crate::data::point_set::PointSet;
use crate::geometry::SizingFunction;
use crate::geometry::bbox::BoundingBox;
use rand::Rng;

/// Slack used when counting lattice nodes so a far edge at `min + k*h0` is
/// not lost to rounding.
const LATTICE_SLACK: f64 = 1e-9;

/// Regular lattice over `bbox` at spacing `h0`, first axis varying slowest.
pub fn lattice(bbox: &BoundingBox, h0: f64) -> PointSet {
    let dim = bbox.dim();
    let counts: Vec<usize> = bbox
        .bounds()
        .iter()
        .map(|&(lo, hi)| ((hi - lo) / h0 + LATTICE_SLACK).floor() as usize + 1)
        .collect();
    let total: usize = counts.iter().product();
    let mut out = PointSet::with_capacity(dim, total);
    let mut idx = vec![0usize; dim];
    let mut p = vec![0.0; dim];
    for _ in 0..total {
        for k in 0..dim {
            p[k] = bbox.bounds()[k].0 + idx[k] as f64 * h0;
        }
        out.push(&p);
        // odometer increment, last axis fastest
        for k in (0..dim).rev() {
            idx[k] += 1;
            if idx[k] < counts[k] {
                break;
            }
            idx[k] = 0;
        }
    }
    out
}

/// Seed the initial point set: fixed points first, then the retained lattice.
pub fn seed_points<F, R>(sizing: &F, h0: f64, geps: f64, fixed: &PointSet, rng: &mut R) -> PointSet
where
    F: SizingFunction + ?Sized,
    R: Rng + ?Sized,
{
    let dim = sizing.dim();
    let mut candidates = lattice(sizing.bbox(), h0);
    let lattice_len = candidates.len();

    let d = sizing.signed_distance(&candidates);
    candidates.retain_by_index(|i| d[i] < geps);

    let r0 = sizing.target_size(&candidates);
    let r_min = r0.iter().copied().fold(f64::INFINITY, f64::min);
    let keep: Vec<bool> = r0
        .iter()
        .map(|&r| rng.r#gen::<f64>() < (r_min / r).powi(dim as i32))
        .collect();
    candidates.retain_by_index(|i| keep[i]);

    log::debug!(
        "seeding: {lattice_len} lattice points, {} retained after rejection",
        candidates.len()
    );

    let mut out = PointSet::with_capacity(dim, fixed.len() + candidates.len());
    out.extend_from(fixed);
    out.extend_from(&candidates);
    out
}
