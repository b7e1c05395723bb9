//! # Lifted convex hull triangulation
//!
//! Delaunay triangulation through the classic lifting map: every point `x`
//! becomes `(x, |x|^2)` one dimension up, the convex hull of the lifted set is
//! built by beneath-beyond insertion, and the facets whose outward normal
//! points downwards project back onto the Delaunay simplices.
//!
//! ## Algorithm Steps
//!
//! 1. Normalise the points into `[-1, 1]^dim` and lift them; a tiny
//!    deterministic joggle is added to every lifted height so cocircular
//!    (cospherical) configurations such as the seeding lattice resolve into
//!    one valid triangulation instead of flat facets.
//! 2. Append an apex high above the centroid. It only ever touches upper
//!    facets, but lets `dim + 1` input points form a full hull simplex.
//! 3. Pick `dim + 2` affinely independent lifted points greedily (farthest
//!    from the current affine span) as the initial hull simplex.
//! 4. Insert the remaining points in a fixed shuffled order. A conflict graph
//!    (facet to pending points that see it, and back) hands each insertion its
//!    visible facets directly; the horizon is found through the ridge
//!    adjacency, and a new facet only tests the pending points of the two
//!    facets that met at its horizon ridge.
//! 5. Report the lower facets, oriented positively in the input space.
//!
//! Collinear (2D) or coplanar (3D) inputs have no full-dimensional hull and
//! yield an empty triangulation.

use super::{Triangulator, orient_positive};
use crate::data::point_set::PointSet;
use hashbrown::{HashMap, HashSet};
use rand::rngs::SmallRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};

const JOGGLE_SEED: u64 = 0x00d1_57ee;
const INSERTION_SEED: u64 = 0x0bad_5eed;
const DEFAULT_JOGGLE: f64 = 1e-10;
/// Minimal distance from the current affine span for an initial vertex.
const SPAN_TOL: f64 = 1e-10;
/// Signed distance above which a point sees a facet (normalised units).
const PLANE_TOL: f64 = 1e-14;

/// Convex-hull based Delaunay backend.
#[derive(Clone, Copy, Debug)]
pub struct LiftedHullTriangulator {
    joggle: f64,
}

impl Default for LiftedHullTriangulator {
    fn default() -> Self {
        Self {
            joggle: DEFAULT_JOGGLE,
        }
    }
}

impl LiftedHullTriangulator {
    /// Backend with a custom joggle amplitude (in normalised lifted units).
    /// `0.0` disables joggling.
    pub fn with_joggle(joggle: f64) -> Self {
        Self {
            joggle: joggle.max(0.0),
        }
    }
}

impl Triangulator for LiftedHullTriangulator {
    fn triangulate(&self, points: &PointSet) -> Vec<Vec<usize>> {
        let dim = points.dim();
        let n = points.len();
        if !(2..=3).contains(&dim) || n < dim + 1 {
            return Vec::new();
        }
        let Some(lifted) = lift(points, self.joggle) else {
            return Vec::new();
        };
        let apex = n;
        let Some(hull) = Hull::build(&lifted) else {
            log::debug!("lifted hull: degenerate input ({n} points), no simplices");
            return Vec::new();
        };
        hull.alive()
            .filter(|f| f.is_lower() && !f.vertices.contains(&apex))
            .map(|f| orient_positive(points, f.vertices.clone()))
            .collect()
    }

    fn name(&self) -> &'static str {
        "hull"
    }
}

/// Normalised, lifted copy of `points` plus the apex as the last entry.
fn lift(points: &PointSet, joggle: f64) -> Option<Vec<Vec<f64>>> {
    let dim = points.dim();
    let mut lo = vec![f64::INFINITY; dim];
    let mut hi = vec![f64::NEG_INFINITY; dim];
    for p in points.iter() {
        for k in 0..dim {
            lo[k] = lo[k].min(p[k]);
            hi[k] = hi[k].max(p[k]);
        }
    }
    let half = (0..dim).map(|k| 0.5 * (hi[k] - lo[k])).fold(0.0, f64::max);
    if !(half.is_finite() && half > 0.0) {
        return None;
    }
    let mid: Vec<f64> = (0..dim).map(|k| 0.5 * (hi[k] + lo[k])).collect();

    let mut rng = SmallRng::seed_from_u64(JOGGLE_SEED);
    let mut lifted = Vec::with_capacity(points.len() + 1);
    let mut centroid = vec![0.0; dim];
    let mut top = f64::NEG_INFINITY;
    for p in points.iter() {
        let mut q: Vec<f64> = (0..dim).map(|k| (p[k] - mid[k]) / half).collect();
        let height = q.iter().map(|x| x * x).sum::<f64>() + joggle * rng.r#gen::<f64>();
        for k in 0..dim {
            centroid[k] += q[k];
        }
        top = top.max(height);
        q.push(height);
        lifted.push(q);
    }
    let inv = 1.0 / points.len() as f64;
    let mut apex: Vec<f64> = centroid.iter().map(|c| c * inv).collect();
    apex.push(top + 1.0);
    lifted.push(apex);
    Some(lifted)
}

/// A hull facet with its (unnormalised) outward normal and the pending
/// points that see it.
#[derive(Debug, Clone)]
struct Facet {
    vertices: Vec<usize>,
    normal: Vec<f64>,
    norm: f64,
    origin: Vec<f64>,
    conflicts: Vec<usize>,
    alive: bool,
}

impl Facet {
    fn new(vertices: Vec<usize>, pts: &[Vec<f64>]) -> Self {
        let origin = pts[vertices[0]].clone();
        let normal = facet_normal(pts, &vertices);
        let norm = dot(&normal, &normal).sqrt();
        Self {
            vertices,
            normal,
            norm,
            origin,
            conflicts: Vec::new(),
            alive: true,
        }
    }

    /// Facet with its normal pointing away from `interior`.
    fn outward(mut vertices: Vec<usize>, pts: &[Vec<f64>], interior: &[f64]) -> Self {
        let facet = Self::new(vertices.clone(), pts);
        if facet.signed_distance(interior) > 0.0 {
            vertices.swap(0, 1);
            Self::new(vertices, pts)
        } else {
            facet
        }
    }

    /// Signed distance of `q` from the facet hyperplane; positive outside.
    fn signed_distance(&self, q: &[f64]) -> f64 {
        if self.norm == 0.0 {
            return 0.0;
        }
        let d: f64 = self
            .normal
            .iter()
            .zip(q.iter().zip(&self.origin))
            .map(|(n, (x, o))| n * (x - o))
            .sum();
        d / self.norm
    }

    fn sees(&self, q: &[f64]) -> bool {
        self.signed_distance(q) > PLANE_TOL
    }

    fn is_lower(&self) -> bool {
        let last = self.normal[self.normal.len() - 1];
        self.norm > 0.0 && last < -PLANE_TOL * self.norm
    }
}

/// Unused slot of a ridge entry.
const NO_FACET: usize = usize::MAX;

/// Incremental hull with a conflict graph: every facet lists the pending
/// points that see it and every pending point lists the facets it sees, so an
/// insertion only touches its visible region and the horizon around it.
struct Hull<'a> {
    pts: &'a [Vec<f64>],
    interior: Vec<f64>,
    /// Alive and retired facets; ids are indices.
    facets: Vec<Facet>,
    /// Sorted ridge vertices to the (at most two) alive facets sharing it.
    ridges: HashMap<Vec<usize>, [usize; 2]>,
    /// Facet ids seen by each point; may contain retired facets.
    point_conflicts: Vec<Vec<usize>>,
    inserted: Vec<bool>,
    pending: Vec<usize>,
}

impl<'a> Hull<'a> {
    fn build(pts: &'a [Vec<f64>]) -> Option<Self> {
        let mut hull = Self::start(pts)?;
        for p in std::mem::take(&mut hull.pending) {
            hull.insert(p);
        }
        Some(hull)
    }

    /// Initial simplex with complete conflict lists; every other point is
    /// left in `pending` in a fixed shuffled order.
    fn start(pts: &'a [Vec<f64>]) -> Option<Self> {
        let simplex = initial_simplex(pts)?;
        let space = pts[0].len();
        let mut interior = vec![0.0; space];
        for &v in &simplex {
            for k in 0..space {
                interior[k] += pts[v][k];
            }
        }
        for c in &mut interior {
            *c /= simplex.len() as f64;
        }

        let mut inserted = vec![false; pts.len()];
        for &v in &simplex {
            inserted[v] = true;
        }
        let mut pending: Vec<usize> = (0..pts.len()).filter(|&i| !inserted[i]).collect();
        pending.shuffle(&mut SmallRng::seed_from_u64(INSERTION_SEED));

        let mut hull = Self {
            pts,
            interior,
            facets: Vec::with_capacity(4 * pts.len()),
            ridges: HashMap::with_capacity(4 * pts.len()),
            point_conflicts: vec![Vec::new(); pts.len()],
            inserted,
            pending,
        };
        for skip in 0..simplex.len() {
            let mut facet = Facet::outward(without(&simplex, skip), pts, &hull.interior);
            facet.conflicts = hull
                .pending
                .iter()
                .copied()
                .filter(|&q| facet.sees(&pts[q]))
                .collect();
            hull.add_facet(facet);
        }
        Some(hull)
    }

    /// Add point `p` to the hull. Points that see no facet are ignored.
    fn insert(&mut self, p: usize) -> bool {
        self.inserted[p] = true;
        let visible: HashSet<usize> = std::mem::take(&mut self.point_conflicts[p])
            .into_iter()
            .filter(|&f| self.facets[f].alive)
            .collect();
        if visible.is_empty() {
            return false;
        }

        // Horizon ridges separate a visible facet from a hidden one
        let mut horizon = Vec::new();
        for &v in &visible {
            let verts = &self.facets[v].vertices;
            for skip in 0..verts.len() {
                let key = ridge_key(verts, skip);
                if let Some(h) = self.across(&key, v) {
                    if !visible.contains(&h) {
                        horizon.push((without(verts, skip), v, h));
                    }
                }
            }
        }
        horizon.sort_unstable();

        for &v in &visible {
            self.retire(v);
        }
        for (mut verts, v, h) in horizon {
            let mut candidates: Vec<usize> = self.facets[v]
                .conflicts
                .iter()
                .chain(&self.facets[h].conflicts)
                .copied()
                .filter(|&q| !self.inserted[q])
                .collect();
            candidates.sort_unstable();
            candidates.dedup();

            verts.push(p);
            let mut facet = Facet::outward(verts, self.pts, &self.interior);
            facet.conflicts = candidates
                .into_iter()
                .filter(|&q| facet.sees(&self.pts[q]))
                .collect();
            self.add_facet(facet);
        }
        for &v in &visible {
            self.facets[v].conflicts = Vec::new();
        }
        true
    }

    fn add_facet(&mut self, facet: Facet) {
        let id = self.facets.len();
        for &q in &facet.conflicts {
            self.point_conflicts[q].push(id);
        }
        for skip in 0..facet.vertices.len() {
            let slots = self
                .ridges
                .entry(ridge_key(&facet.vertices, skip))
                .or_insert([NO_FACET; 2]);
            if slots[0] == NO_FACET {
                slots[0] = id;
            } else {
                slots[1] = id;
            }
        }
        self.facets.push(facet);
    }

    /// Mark facet `f` dead and detach it from its ridges. Its conflict list
    /// stays until the insertion has seeded the new facets from it.
    fn retire(&mut self, f: usize) {
        self.facets[f].alive = false;
        for skip in 0..self.facets[f].vertices.len() {
            let key = ridge_key(&self.facets[f].vertices, skip);
            if let Some(slots) = self.ridges.get_mut(&key) {
                for s in slots.iter_mut().filter(|s| **s == f) {
                    *s = NO_FACET;
                }
                if slots.iter().all(|&s| s == NO_FACET) {
                    self.ridges.remove(&key);
                }
            }
        }
    }

    /// The other facet on ridge `key`.
    fn across(&self, key: &[usize], f: usize) -> Option<usize> {
        let slots = self.ridges.get(key)?;
        slots
            .iter()
            .copied()
            .find(|&s| s != f && s != NO_FACET)
    }

    fn alive(&self) -> impl Iterator<Item = &Facet> {
        self.facets.iter().filter(|f| f.alive)
    }
}

/// Greedy choice of `space + 1` affinely independent points.
fn initial_simplex(pts: &[Vec<f64>]) -> Option<Vec<usize>> {
    let space = pts.first()?.len();
    if pts.len() < space + 1 {
        return None;
    }
    let first = (0..pts.len()).min_by(|&a, &b| pts[a][0].total_cmp(&pts[b][0]))?;
    let mut chosen = vec![first];
    let mut basis: Vec<Vec<f64>> = Vec::with_capacity(space);
    while chosen.len() < space + 1 {
        let origin = &pts[chosen[0]];
        let mut best: Option<(usize, Vec<f64>, f64)> = None;
        for (i, p) in pts.iter().enumerate() {
            if chosen.contains(&i) {
                continue;
            }
            let mut r: Vec<f64> = p.iter().zip(origin).map(|(a, b)| a - b).collect();
            for b in &basis {
                let proj = dot(&r, b);
                for (x, y) in r.iter_mut().zip(b) {
                    *x -= proj * y;
                }
            }
            let len = dot(&r, &r).sqrt();
            if best.as_ref().is_none_or(|(_, _, d)| len > *d) {
                best = Some((i, r, len));
            }
        }
        let (i, r, len) = best?;
        if len < SPAN_TOL {
            return None;
        }
        basis.push(r.into_iter().map(|x| x / len).collect());
        chosen.push(i);
    }
    Some(chosen)
}

/// Outward normal candidate of the hyperplane through `verts` (generalised
/// cross product of the edge vectors).
fn facet_normal(pts: &[Vec<f64>], verts: &[usize]) -> Vec<f64> {
    let space = pts[verts[0]].len();
    let origin = &pts[verts[0]];
    let edges: Vec<Vec<f64>> = verts[1..]
        .iter()
        .map(|&v| pts[v].iter().zip(origin).map(|(a, b)| a - b).collect())
        .collect();
    (0..space)
        .map(|col| {
            let minor: Vec<Vec<f64>> = edges
                .iter()
                .map(|e| {
                    e.iter()
                        .enumerate()
                        .filter(|&(k, _)| k != col)
                        .map(|(_, &x)| x)
                        .collect()
                })
                .collect();
            let sign = if (space - 1 + col) % 2 == 0 { 1.0 } else { -1.0 };
            sign * det(&minor)
        })
        .collect()
}

/// Determinant of a small square matrix given by rows.
fn det(m: &[Vec<f64>]) -> f64 {
    match m.len() {
        0 => 1.0,
        1 => m[0][0],
        2 => m[0][0] * m[1][1] - m[0][1] * m[1][0],
        3 => {
            m[0][0] * (m[1][1] * m[2][2] - m[1][2] * m[2][1])
                - m[0][1] * (m[1][0] * m[2][2] - m[1][2] * m[2][0])
                + m[0][2] * (m[1][0] * m[2][1] - m[1][1] * m[2][0])
        }
        n => {
            // Laplace expansion along the first row
            (0..n)
                .map(|col| {
                    let minor: Vec<Vec<f64>> = m[1..]
                        .iter()
                        .map(|row| {
                            row.iter()
                                .enumerate()
                                .filter(|&(k, _)| k != col)
                                .map(|(_, &x)| x)
                                .collect()
                        })
                        .collect();
                    let sign = if col % 2 == 0 { 1.0 } else { -1.0 };
                    sign * m[0][col] * det(&minor)
                })
                .sum()
        }
    }
}

fn ridge_key(vertices: &[usize], skip: usize) -> Vec<usize> {
    let mut key = without(vertices, skip);
    key.sort_unstable();
    key
}

fn without(vertices: &[usize], skip: usize) -> Vec<usize> {
    vertices
        .iter()
        .enumerate()
        .filter(|&(k, _)| k != skip)
        .map(|(_, &v)| v)
        .collect()
}

fn dot(a: &[f64], b: &[f64]) -> f64 {
    a.iter().zip(b).map(|(x, y)| x * y).sum()
}
