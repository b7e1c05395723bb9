//! Bowyer–Watson Delaunay triangulation on exact adaptive predicates.
//!
//! Orientation and in-circle/in-sphere decisions go through Shewchuk's
//! adaptive-precision predicates from the `robust` crate, so the cavity of a
//! new point is always computed consistently, even for the cocircular lattice
//! the generator starts from.
//!
//! The convex hull is closed with *ghost* simplices: every hull facet is paired
//! with a symbolic vertex at infinity. A point conflicts with a ghost simplex
//! when it lies strictly beyond the hull facet, or on the facet's plane inside
//! its circumcircle. No finite enclosing simplex is used, so every simplex of
//! the Delaunay triangulation of the hull survives.

use super::{Triangulator, orient_positive};
use crate::data::point_set::PointSet;
use hashbrown::HashMap;
use robust::{Coord, Coord3D, incircle, insphere, orient2d, orient3d};

/// Symbolic vertex at infinity; always stored last in a ghost simplex.
const GHOST: usize = usize::MAX;

/// Exact-predicate Bowyer–Watson backend.
#[derive(Clone, Copy, Debug, Default)]
pub struct ExactTriangulator;

impl Triangulator for ExactTriangulator {
    fn triangulate(&self, points: &PointSet) -> Vec<Vec<usize>> {
        let dim = points.dim();
        let n = points.len();
        if !(2..=3).contains(&dim) || n < dim + 1 {
            return Vec::new();
        }
        let coords: Vec<[f64; 3]> = points
            .iter()
            .map(|p| {
                let mut c = [0.0; 3];
                c[..dim].copy_from_slice(p);
                c
            })
            .collect();
        if coords.iter().flatten().any(|x| !x.is_finite()) {
            return Vec::new();
        }
        let Some(anchors) = initial_simplex(&coords, dim) else {
            log::debug!("exact: degenerate input ({n} points), no simplices");
            return Vec::new();
        };

        let mut dt = Delaunay {
            coords: &coords,
            dim,
            cells: vec![anchors.clone()],
            anchors,
        };
        for skip in 0..=dim {
            let mut ghost = face_key(&dt.anchors, skip);
            ghost.push(GHOST);
            dt.cells.push(ghost);
        }
        let mut is_anchor = vec![false; n];
        for &a in &dt.anchors {
            is_anchor[a] = true;
        }
        for p in (0..n).filter(|&p| !is_anchor[p]) {
            dt.insert(p);
        }

        dt.cells
            .into_iter()
            .filter(|c| c.last() != Some(&GHOST))
            .filter(|c| orientation(&coords, dim, c) != 0.0)
            .map(|c| orient_positive(points, c))
            .collect()
    }

    fn name(&self) -> &'static str {
        "exact"
    }
}

struct Delaunay<'a> {
    coords: &'a [[f64; 3]],
    dim: usize,
    /// Vertices of the first simplex; every hull facet leaves at least one of
    /// them strictly on its inner side.
    anchors: Vec<usize>,
    cells: Vec<Vec<usize>>,
}

impl Delaunay<'_> {
    fn insert(&mut self, p: usize) {
        let bad: Vec<bool> = self.cells.iter().map(|c| self.conflicts(c, p)).collect();
        if !bad.iter().any(|&b| b) {
            // duplicate of an existing vertex
            return;
        }

        // Cavity boundary faces belong to exactly one bad cell
        let mut face_count: HashMap<Vec<usize>, u32> = HashMap::new();
        for (c, _) in self.cells.iter().zip(&bad).filter(|(_, b)| **b) {
            for skip in 0..c.len() {
                *face_count.entry(face_key(c, skip)).or_insert(0) += 1;
            }
        }
        let mut fresh = Vec::new();
        for (c, _) in self.cells.iter().zip(&bad).filter(|(_, b)| **b) {
            for skip in 0..c.len() {
                let key = face_key(c, skip);
                if face_count[&key] != 1 {
                    continue;
                }
                let mut cell = key;
                if cell.last() == Some(&GHOST) {
                    cell.pop();
                    cell.push(p);
                    cell.push(GHOST);
                } else {
                    cell.push(p);
                }
                fresh.push(cell);
            }
        }

        let old = std::mem::take(&mut self.cells);
        self.cells = old
            .into_iter()
            .zip(bad)
            .filter_map(|(c, b)| (!b).then_some(c))
            .collect();
        self.cells.extend(fresh);
    }

    fn conflicts(&self, cell: &[usize], p: usize) -> bool {
        match cell.split_last() {
            Some((&GHOST, facet)) => self.beyond_hull_facet(facet, p),
            _ => in_circumsphere(self.coords, self.dim, cell, p),
        }
    }

    /// Conflict test for the ghost simplex over a hull facet.
    fn beyond_hull_facet(&self, facet: &[usize], p: usize) -> bool {
        let with = |q: usize| {
            let mut cell = facet.to_vec();
            cell.push(q);
            cell
        };
        let Some((inner, anchor)) = self.anchors.iter().find_map(|&a| {
            let o = orientation(self.coords, self.dim, &with(a));
            (o != 0.0).then_some((o, a))
        }) else {
            return false;
        };
        let side = orientation(self.coords, self.dim, &with(p));
        if side != 0.0 {
            return side.signum() != inner.signum();
        }
        // On the facet plane: any sphere through the facet and an off-plane
        // point meets that plane in the facet's circumcircle.
        in_circumsphere(self.coords, self.dim, &with(anchor), p)
    }
}

/// First `dim + 1` affinely independent points, found with exact predicates.
fn initial_simplex(coords: &[[f64; 3]], dim: usize) -> Option<Vec<usize>> {
    let a = 0;
    let b = (1..coords.len()).find(|&i| coords[i] != coords[a])?;
    let c = (0..coords.len()).find(|&i| !collinear(coords[a], coords[b], coords[i]))?;
    if dim == 2 {
        return Some(vec![a, b, c]);
    }
    let d = (0..coords.len()).find(|&i| orientation(coords, dim, &[a, b, c, i]) != 0.0)?;
    Some(vec![a, b, c, d])
}

/// Exact collinearity: all three axis-plane projections are collinear.
fn collinear(a: [f64; 3], b: [f64; 3], c: [f64; 3]) -> bool {
    [(0, 1), (1, 2), (0, 2)].iter().all(|&(i, j)| {
        let pr = |v: [f64; 3]| Coord { x: v[i], y: v[j] };
        orient2d(pr(a), pr(b), pr(c)) == 0.0
    })
}

fn in_circumsphere(coords: &[[f64; 3]], dim: usize, cell: &[usize], p: usize) -> bool {
    let orient = orientation(coords, dim, cell);
    if orient == 0.0 {
        return false;
    }
    let q = coords[p];
    let side = if dim == 2 {
        let [a, b, c] = [cell[0], cell[1], cell[2]].map(|i| xy(coords[i]));
        incircle(a, b, c, xy(q))
    } else {
        let [a, b, c, d] = [cell[0], cell[1], cell[2], cell[3]].map(|i| xyz(coords[i]));
        insphere(a, b, c, d, xyz(q))
    };
    side * orient.signum() > 0.0
}

fn orientation(coords: &[[f64; 3]], dim: usize, cell: &[usize]) -> f64 {
    if dim == 2 {
        orient2d(xy(coords[cell[0]]), xy(coords[cell[1]]), xy(coords[cell[2]]))
    } else {
        orient3d(
            xyz(coords[cell[0]]),
            xyz(coords[cell[1]]),
            xyz(coords[cell[2]]),
            xyz(coords[cell[3]]),
        )
    }
}

fn face_key(cell: &[usize], skip: usize) -> Vec<usize> {
    let mut key: Vec<usize> = cell
        .iter()
        .enumerate()
        .filter(|&(k, _)| k != skip)
        .map(|(_, &v)| v)
        .collect();
    key.sort_unstable();
    key
}

#[inline]
fn xy(c: [f64; 3]) -> Coord<f64> {
    Coord { x: c[0], y: c[1] }
}

#[inline]
fn xyz(c: [f64; 3]) -> Coord3D<f64> {
    Coord3D {
        x: c[0],
        y: c[1],
        z: c[2],
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::quality::simplex_volume;
    use approx::assert_relative_eq;
    use rand::rngs::SmallRng;
    use rand::{Rng, SeedableRng};

    /// Unit box corners followed by `n` random interior points.
    fn box_with_interior(dim: usize, n: usize, seed: u64) -> PointSet {
        let mut rng = SmallRng::seed_from_u64(seed);
        let mut pts = PointSet::new(dim);
        for mask in 0..(1usize << dim) {
            let corner: Vec<f64> = (0..dim).map(|k| ((mask >> k) & 1) as f64).collect();
            pts.push(&corner);
        }
        for _ in 0..n {
            let p: Vec<f64> = (0..dim).map(|_| rng.r#gen::<f64>()).collect();
            pts.push(&p);
        }
        pts
    }

    #[test]
    fn square_and_split_tetrahedron() {
        let square =
            PointSet::from_rows(2, &[[0.0, 0.0], [1.0, 0.0], [1.0, 1.0], [0.0, 1.0]]).unwrap();
        let cells = ExactTriangulator.triangulate(&square);
        assert_eq!(cells.len(), 2);
        let area: f64 = cells.iter().map(|c| simplex_volume(&square, c)).sum();
        assert_relative_eq!(area, 1.0, epsilon = 1e-12);

        let tet = PointSet::from_rows(
            3,
            &[
                [0.0, 0.0, 0.0],
                [1.0, 0.0, 0.0],
                [0.0, 1.0, 0.0],
                [0.0, 0.0, 1.0],
                [0.2, 0.2, 0.2],
            ],
        )
        .unwrap();
        let cells = ExactTriangulator.triangulate(&tet);
        assert_eq!(cells.len(), 4);
        let volume: f64 = cells.iter().map(|c| simplex_volume(&tet, c)).sum();
        assert_relative_eq!(volume, 1.0 / 6.0, epsilon = 1e-12);
        assert!(cells.iter().all(|c| simplex_volume(&tet, c) > 0.0));
    }

    #[test]
    fn hull_is_tiled_in_the_plane() {
        let pts = box_with_interior(2, 500, 3);
        let cells = ExactTriangulator.triangulate(&pts);
        // 2n - 2 - h with the four corners on the hull
        assert_eq!(cells.len(), 2 * pts.len() - 2 - 4);
        let area: f64 = cells.iter().map(|c| simplex_volume(&pts, c)).sum();
        assert_relative_eq!(area, 1.0, epsilon = 1e-12);
    }

    #[test]
    fn hull_is_tiled_in_space() {
        let pts = box_with_interior(3, 200, 8);
        let cells = ExactTriangulator.triangulate(&pts);
        assert!(cells.iter().all(|c| simplex_volume(&pts, c) > 0.0));
        let volume: f64 = cells.iter().map(|c| simplex_volume(&pts, c)).sum();
        assert_relative_eq!(volume, 1.0, epsilon = 1e-12);
    }

    #[test]
    fn collinear_hull_points_are_kept() {
        // five points on the bottom edge, one apex
        let pts = PointSet::from_rows(
            2,
            &[[0.0, 0.0], [0.25, 0.0], [0.5, 0.0], [0.75, 0.0], [1.0, 0.0], [0.5, 1.0]],
        )
        .unwrap();
        let cells = ExactTriangulator.triangulate(&pts);
        assert_eq!(cells.len(), 4);
        let area: f64 = cells.iter().map(|c| simplex_volume(&pts, c)).sum();
        assert_relative_eq!(area, 0.5, epsilon = 1e-12);
    }

    #[test]
    fn collinear_points_yield_nothing() {
        let pts = PointSet::from_rows(2, &[[0.0, 0.0], [1.0, 0.0], [2.0, 0.0]]).unwrap();
        assert!(ExactTriangulator.triangulate(&pts).is_empty());
    }
}
