//! Bar forces for the spring relaxation.
//!
//! Each bar is a spring that only pushes: its rest length is the local target
//! size, scaled so that the rest lengths overshoot the current total edge
//! measure by `l0mult`. Forces come back as one `dim`-vector per bar, ready
//! for [`assemble_bar_forces`](crate::algs::assembly::assemble_bar_forces).

use crate::algs::bars::Bar;
use crate::data::point_set::PointSet;
use crate::geometry::SizingFunction;

/// Default rest-length overshoot for the given dimension, `1 + 0.4/2^(dim-1)`.
#[inline]
pub fn default_l0mult(dim: usize) -> f64 {
    1.0 + 0.4 / 2f64.powi(dim as i32 - 1)
}

/// Midpoints of all bars.
pub fn midpoints(points: &PointSet, bars: &[Bar]) -> PointSet {
    let dim = points.dim();
    let mut out = PointSet::with_capacity(dim, bars.len());
    let mut m = vec![0.0; dim];
    for &[a, b] in bars {
        for ((m, x), y) in m.iter_mut().zip(points.point(a)).zip(points.point(b)) {
            *m = 0.5 * (x + y);
        }
        out.push(&m);
    }
    out
}

/// Factor `l0mult * (ΣL^d / Σh^d)^(1/d)` turning target sizes into rest
/// lengths; zero when `Σh^d` is not positive.
pub fn length_scale(lengths: &[f64], hbars: &[f64], dim: usize, l0mult: f64) -> f64 {
    let d = dim as i32;
    let sum_l: f64 = lengths.iter().map(|l| l.powi(d)).sum();
    let sum_h: f64 = hbars.iter().map(|h| h.powi(d)).sum();
    if !(sum_h > 0.0) {
        return 0.0;
    }
    l0mult * (sum_l / sum_h).powf(1.0 / dim as f64)
}

/// Rest lengths `L0 = h * l0mult * (ΣL^d / Σh^d)^(1/d)`.
pub fn rest_lengths(lengths: &[f64], hbars: &[f64], dim: usize, l0mult: f64) -> Vec<f64> {
    let scale = length_scale(lengths, hbars, dim, l0mult);
    hbars.iter().map(|h| h * scale).collect()
}

/// Per-bar force vectors together with the length scale they were built with.
#[derive(Debug, Clone, PartialEq)]
pub struct BarForces {
    /// Row-major `bars.len() * dim`.
    pub vectors: Vec<f64>,
    pub scale: f64,
}

/// Repulsive force vector of every bar.
///
/// The vector for bar `[a, b]` points from `b` to `a` with magnitude
/// `max(L0 - L, 0)`. Zero-length bars get a zero vector.
pub fn bar_forces<F>(sizing: &F, points: &PointSet, bars: &[Bar], l0mult: f64) -> BarForces
where
    F: SizingFunction + ?Sized,
{
    let dim = points.dim();
    if bars.is_empty() {
        return BarForces {
            vectors: Vec::new(),
            scale: 0.0,
        };
    }

    let mut barvec = Vec::with_capacity(bars.len() * dim);
    let mut lengths = Vec::with_capacity(bars.len());
    for &[a, b] in bars {
        let (pa, pb) = (points.point(a), points.point(b));
        let mut l2 = 0.0;
        for k in 0..dim {
            let v = pa[k] - pb[k];
            l2 += v * v;
            barvec.push(v);
        }
        lengths.push(l2.sqrt());
    }

    let hbars = sizing.target_size(&midpoints(points, bars));
    let scale = length_scale(&lengths, &hbars, dim, l0mult);

    for (i, (&l, &h)) in lengths.iter().zip(&hbars).enumerate() {
        let l0 = h * scale;
        let v = &mut barvec[i * dim..(i + 1) * dim];
        let f = (l0 - l).max(0.0);
        if l > 0.0 && f > 0.0 {
            let s = f / l;
            v.iter_mut().for_each(|x| *x *= s);
        } else {
            v.iter_mut().for_each(|x| *x = 0.0);
        }
    }
    BarForces {
        vectors: barvec,
        scale,
    }
}
