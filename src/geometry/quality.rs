//! Simplex quality diagnostics on generated meshes.
//!
//! # Coordinate layout
//! Points come from a [`PointSet`] of dimension **2** or **3**. Planar points
//! are embedded in 3D with `z = 0` before evaluation, so every routine works on
//! `[f64; 3]` tuples internally.
//!
//! # Supported cells
//! - **Triangle**: `[v0, v1, v2]`; positive volume when counter-clockwise.
//! - **Tetrahedron**: `[v0, v1, v2, v3]`; positive volume when `v3` lies on the
//!   side of `(v0, v1, v2)` that makes `(v1-v0) · ((v2-v0) × (v3-v0))` positive.
//!
//! Quality is the normalised radius ratio `dim * r_in / r_circ`, which is `1`
//! for an equilateral simplex and tends to `0` as the simplex flattens.
//!
//! # Examples
//! ```rust
//! use sdf_mesh::data::point_set::PointSet;
//! use sdf_mesh::geometry::quality::{mesh_quality, simplex_volume};
//!
//! let pts = PointSet::from_rows(2, &[[0.0, 0.0], [1.0, 0.0], [0.0, 1.0]])?;
//! assert_eq!(simplex_volume(&pts, &[0, 1, 2]), 0.5);
//! let summary = mesh_quality(&pts, &[vec![0, 1, 2]]).unwrap();
//! assert!(summary.min > 0.8 && summary.min < 0.9);
//! # Ok::<(), sdf_mesh::mesh_error::MeshGenError>(())
//! ```

use crate::data::point_set::PointSet;

const EPS: f64 = 1e-14;

/// Aggregate quality over a list of simplices.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct QualitySummary {
    /// Worst radius ratio.
    pub min: f64,
    /// Mean radius ratio.
    pub mean: f64,
    /// Number of simplices with (numerically) zero volume.
    pub degenerate: usize,
}

/// Signed area (2D) or signed volume (3D) of a simplex.
///
/// Returns `0.0` for index tuples that do not match the point dimension.
pub fn simplex_volume(points: &PointSet, cell: &[usize]) -> f64 {
    match (points.dim(), cell.len()) {
        (2, 3) => {
            let v = gather(points, cell);
            signed_area_xy(v[0], v[1], v[2])
        }
        (3, 4) => {
            let v = gather(points, cell);
            signed_volume(v[0], v[1], v[2], v[3])
        }
        _ => 0.0,
    }
}

/// Normalised radius ratio of a simplex, in `[0, 1]`.
pub fn radius_ratio(points: &PointSet, cell: &[usize]) -> f64 {
    match (points.dim(), cell.len()) {
        (2, 3) => triangle_radius_ratio(&gather(points, cell)),
        (3, 4) => tetra_radius_ratio(&gather(points, cell)),
        _ => 0.0,
    }
}

/// Quality summary for a mesh; `None` when there are no cells.
pub fn mesh_quality(points: &PointSet, cells: &[Vec<usize>]) -> Option<QualitySummary> {
    if cells.is_empty() {
        return None;
    }
    let mut min = f64::INFINITY;
    let mut sum = 0.0;
    let mut degenerate = 0;
    for cell in cells {
        let q = radius_ratio(points, cell);
        if q <= EPS {
            degenerate += 1;
        }
        min = min.min(q);
        sum += q;
    }
    Some(QualitySummary {
        min,
        mean: sum / cells.len() as f64,
        degenerate,
    })
}

fn gather(points: &PointSet, cell: &[usize]) -> Vec<[f64; 3]> {
    cell.iter()
        .map(|&i| {
            let p = points.point(i);
            if p.len() == 2 {
                [p[0], p[1], 0.0]
            } else {
                [p[0], p[1], p[2]]
            }
        })
        .collect()
}

fn triangle_radius_ratio(v: &[[f64; 3]]) -> f64 {
    let area = signed_area_xy(v[0], v[1], v[2]).abs();
    let a = norm(sub(v[1], v[0]));
    let b = norm(sub(v[2], v[1]));
    let c = norm(sub(v[0], v[2]));
    if area <= EPS || a * b * c <= EPS {
        return 0.0;
    }
    let r_in = 2.0 * area / (a + b + c);
    let r_circ = a * b * c / (4.0 * area);
    2.0 * r_in / r_circ
}

fn tetra_radius_ratio(v: &[[f64; 3]]) -> f64 {
    let volume = signed_volume(v[0], v[1], v[2], v[3]).abs();
    if volume <= EPS {
        return 0.0;
    }
    let faces = [[1, 2, 3], [0, 2, 3], [0, 1, 3], [0, 1, 2]];
    let surface: f64 = faces
        .iter()
        .map(|f| 0.5 * norm(cross(sub(v[f[1]], v[f[0]]), sub(v[f[2]], v[f[0]]))))
        .sum();
    let r_in = 3.0 * volume / surface;

    let (b, c, d) = (sub(v[1], v[0]), sub(v[2], v[0]), sub(v[3], v[0]));
    let mat = [
        2.0 * b[0], 2.0 * b[1], 2.0 * b[2],
        2.0 * c[0], 2.0 * c[1], 2.0 * c[2],
        2.0 * d[0], 2.0 * d[1], 2.0 * d[2],
    ];
    let Some(inv) = invert_3x3(mat) else {
        return 0.0;
    };
    let rhs = [dot(b, b), dot(c, c), dot(d, d)];
    let center = [
        inv[0] * rhs[0] + inv[1] * rhs[1] + inv[2] * rhs[2],
        inv[3] * rhs[0] + inv[4] * rhs[1] + inv[5] * rhs[2],
        inv[6] * rhs[0] + inv[7] * rhs[1] + inv[8] * rhs[2],
    ];
    let r_circ = norm(center);
    3.0 * r_in / r_circ
}

fn signed_area_xy(a: [f64; 3], b: [f64; 3], c: [f64; 3]) -> f64 {
    let abx = b[0] - a[0];
    let aby = b[1] - a[1];
    let acx = c[0] - a[0];
    let acy = c[1] - a[1];
    0.5 * (abx * acy - aby * acx)
}

fn signed_volume(a: [f64; 3], b: [f64; 3], c: [f64; 3], d: [f64; 3]) -> f64 {
    let ab = sub(b, a);
    let ac = sub(c, a);
    let ad = sub(d, a);
    dot(ab, cross(ac, ad)) / 6.0
}

fn sub(a: [f64; 3], b: [f64; 3]) -> [f64; 3] {
    [a[0] - b[0], a[1] - b[1], a[2] - b[2]]
}

fn dot(a: [f64; 3], b: [f64; 3]) -> f64 {
    a[0] * b[0] + a[1] * b[1] + a[2] * b[2]
}

fn cross(a: [f64; 3], b: [f64; 3]) -> [f64; 3] {
    [
        a[1] * b[2] - a[2] * b[1],
        a[2] * b[0] - a[0] * b[2],
        a[0] * b[1] - a[1] * b[0],
    ]
}

fn norm(a: [f64; 3]) -> f64 {
    dot(a, a).sqrt()
}

fn invert_3x3(mat: [f64; 9]) -> Option<[f64; 9]> {
    let det = mat[0] * (mat[4] * mat[8] - mat[5] * mat[7])
        - mat[1] * (mat[3] * mat[8] - mat[5] * mat[6])
        + mat[2] * (mat[3] * mat[7] - mat[4] * mat[6]);
    if det.abs() <= EPS {
        return None;
    }
    let inv_det = 1.0 / det;
    Some([
        (mat[4] * mat[8] - mat[5] * mat[7]) * inv_det,
        (mat[2] * mat[7] - mat[1] * mat[8]) * inv_det,
        (mat[1] * mat[5] - mat[2] * mat[4]) * inv_det,
        (mat[5] * mat[6] - mat[3] * mat[8]) * inv_det,
        (mat[0] * mat[8] - mat[2] * mat[6]) * inv_det,
        (mat[2] * mat[3] - mat[0] * mat[5]) * inv_det,
        (mat[3] * mat[7] - mat[4] * mat[6]) * inv_det,
        (mat[1] * mat[6] - mat[0] * mat[7]) * inv_det,
        (mat[0] * mat[4] - mat[1] * mat[3]) * inv_det,
    ])
}
