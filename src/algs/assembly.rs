//! Force assembly: scatter-add of per-bar force vectors into per-vertex
//! accumulators.
//!
//! The accumulator is a flat `n * dim` buffer laid out like
//! [`PointSet`](crate::data::point_set::PointSet). Each bar adds its vector at
//! its first endpoint and subtracts it at the second, so the total over all
//! vertices is zero before any constraints are applied.

use crate::algs::bars::Bar;

/// Accumulate `bar_forces` (one `dim`-vector per bar, row-major) into a zeroed
/// `n * dim` vertex buffer.
pub fn assemble_bar_forces(n: usize, dim: usize, bars: &[Bar], bar_forces: &[f64]) -> Vec<f64> {
    debug_assert_eq!(bar_forces.len(), bars.len() * dim);
    let mut total = vec![0.0; n * dim];
    for (&[a, b], f) in bars.iter().zip(bar_forces.chunks_exact(dim.max(1))) {
        for k in 0..dim {
            total[a * dim + k] += f[k];
            total[b * dim + k] -= f[k];
        }
    }
    total
}

/// Zero the accumulators of the first `nfix` vertices.
#[inline]
pub fn clear_fixed(total: &mut [f64], dim: usize, nfix: usize) {
    let end = (nfix * dim).min(total.len());
    total[..end].iter_mut().for_each(|x| *x = 0.0);
}
