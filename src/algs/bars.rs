//! Simplex filtering and bar (edge) extraction.
//! All output vectors are **sorted & deduplicated** for deterministic behaviour.

use crate::data::point_set::PointSet;
use crate::geometry::SizingFunction;
use itertools::Itertools;

/// An undirected edge `[a, b]` with `a < b`.
pub type Bar = [usize; 2];

/// Centroids of the given simplices, one row per simplex.
pub fn centroids(points: &PointSet, cells: &[Vec<usize>]) -> PointSet {
    let dim = points.dim();
    let mut out = PointSet::with_capacity(dim, cells.len());
    let mut c = vec![0.0; dim];
    for cell in cells {
        c.iter_mut().for_each(|x| *x = 0.0);
        for &v in cell {
            for (acc, x) in c.iter_mut().zip(points.point(v)) {
                *acc += x;
            }
        }
        let inv = 1.0 / cell.len() as f64;
        c.iter_mut().for_each(|x| *x *= inv);
        out.push(&c);
    }
    out
}

/// Keep only the simplices whose centroid lies deeper than `geps` inside the
/// domain. This removes the triangles spanning concave parts of the convex
/// hull and slivers along the boundary.
pub fn interior_simplices<F>(
    sizing: &F,
    points: &PointSet,
    cells: Vec<Vec<usize>>,
    geps: f64,
) -> Vec<Vec<usize>>
where
    F: SizingFunction + ?Sized,
{
    if cells.is_empty() {
        return cells;
    }
    let d = sizing.signed_distance(&centroids(points, &cells));
    cells
        .into_iter()
        .zip(d)
        .filter_map(|(cell, d)| (d < -geps).then_some(cell))
        .collect()
}

/// Unique undirected edges of all simplices, sorted lexicographically.
pub fn extract_bars(cells: &[Vec<usize>]) -> Vec<Bar> {
    let mut bars: Vec<Bar> = cells
        .iter()
        .flat_map(|cell| {
            cell.iter()
                .tuple_combinations()
                .filter(|(a, b)| a != b)
                .map(|(&a, &b)| if a < b { [a, b] } else { [b, a] })
        })
        .collect();
    bars.sort_unstable();
    bars.dedup();
    bars
}
