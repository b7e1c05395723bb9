//! Flat coordinate storage for mesh vertices.
//!
//! Points are stored row-major in a single `Vec<f64>` with an attached
//! embedding dimension, so every batch handed to a sizing function or a
//! triangulation backend is one contiguous buffer.

use crate::mesh_error::MeshGenError;
use hashbrown::HashSet;

/// Ordered set of `dim`-dimensional points.
#[derive(Clone, Debug, PartialEq, Default)]
pub struct PointSet {
    dim: usize,
    coords: Vec<f64>,
}

impl PointSet {
    /// Empty point set of the given dimension.
    #[inline]
    pub fn new(dim: usize) -> Self {
        Self {
            dim,
            coords: Vec::new(),
        }
    }

    /// Empty point set with room for `n` points.
    #[inline]
    pub fn with_capacity(dim: usize, n: usize) -> Self {
        Self {
            dim,
            coords: Vec::with_capacity(n * dim),
        }
    }

    /// Wrap a flat row-major buffer.
    pub fn from_flat(dim: usize, coords: Vec<f64>) -> Result<Self, MeshGenError> {
        if dim == 0 || coords.len() % dim != 0 {
            return Err(MeshGenError::DimensionMismatch {
                what: "flat coordinate buffer".into(),
                expected: dim,
                got: coords.len(),
            });
        }
        Ok(Self { dim, coords })
    }

    /// Build from one coordinate tuple per point, validating every row.
    pub fn from_rows<R: AsRef<[f64]>>(dim: usize, rows: &[R]) -> Result<Self, MeshGenError> {
        let mut out = Self::with_capacity(dim, rows.len());
        for (idx, row) in rows.iter().enumerate() {
            let row = row.as_ref();
            if row.len() != dim {
                return Err(MeshGenError::DimensionMismatch {
                    what: format!("point {idx}"),
                    expected: dim,
                    got: row.len(),
                });
            }
            out.coords.extend_from_slice(row);
        }
        Ok(out)
    }

    /// Embedding dimension.
    #[inline]
    pub fn dim(&self) -> usize {
        self.dim
    }

    /// Number of points.
    #[inline]
    pub fn len(&self) -> usize {
        if self.dim == 0 {
            0
        } else {
            self.coords.len() / self.dim
        }
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.coords.is_empty()
    }

    /// Coordinates of point `i`.
    #[inline]
    pub fn point(&self, i: usize) -> &[f64] {
        &self.coords[i * self.dim..(i + 1) * self.dim]
    }

    /// Mutable coordinates of point `i`.
    #[inline]
    pub fn point_mut(&mut self, i: usize) -> &mut [f64] {
        &mut self.coords[i * self.dim..(i + 1) * self.dim]
    }

    /// Append a point. The slice must have length `dim`.
    #[inline]
    pub fn push(&mut self, p: &[f64]) {
        debug_assert_eq!(p.len(), self.dim);
        self.coords.extend_from_slice(p);
    }

    /// Append every point of `other`.
    pub fn extend_from(&mut self, other: &PointSet) {
        debug_assert_eq!(other.dim, self.dim);
        self.coords.extend_from_slice(&other.coords);
    }

    /// Iterate over points in order.
    pub fn iter(&self) -> impl ExactSizeIterator<Item = &[f64]> + '_ {
        // chunks_exact panics on a zero chunk size
        self.coords.chunks_exact(self.dim.max(1))
    }

    /// Underlying row-major buffer.
    #[inline]
    pub fn as_flat(&self) -> &[f64] {
        &self.coords
    }

    /// Mutable row-major buffer.
    #[inline]
    pub fn as_flat_mut(&mut self) -> &mut [f64] {
        &mut self.coords
    }

    /// Copy the points selected by `indices`, in that order.
    pub fn select(&self, indices: &[usize]) -> PointSet {
        let mut out = Self::with_capacity(self.dim, indices.len());
        for &i in indices {
            out.push(self.point(i));
        }
        out
    }

    /// Keep only the points for which `keep` returns true (by index).
    pub fn retain_by_index(&mut self, mut keep: impl FnMut(usize) -> bool) {
        let dim = self.dim;
        let mut write = 0;
        for read in 0..self.len() {
            if keep(read) {
                if write != read {
                    self.coords
                        .copy_within(read * dim..(read + 1) * dim, write * dim);
                }
                write += 1;
            }
        }
        self.coords.truncate(write * dim);
    }

    /// Remove exact duplicate points, keeping the first occurrence of each.
    ///
    /// Coordinates are compared bitwise after mapping `-0.0` to `0.0`, so the
    /// relative order of the survivors (and thus any fixed-point prefix) is
    /// preserved. Returns the number of removed points.
    pub fn dedup_exact(&mut self) -> usize {
        let before = self.len();
        let mut seen: HashSet<Vec<u64>> = HashSet::with_capacity(before);
        let keys: Vec<Vec<u64>> = self.iter().map(bit_key).collect();
        let mut keep = Vec::with_capacity(before);
        for key in keys {
            keep.push(seen.insert(key));
        }
        self.retain_by_index(|i| keep[i]);
        before - self.len()
    }

    /// Largest Euclidean distance between corresponding points of `self` and
    /// `other`. Returns `None` when the sets differ in size or dimension.
    pub fn max_displacement(&self, other: &PointSet) -> Option<f64> {
        if self.dim != other.dim || self.len() != other.len() {
            return None;
        }
        Some(
            self.iter()
                .zip(other.iter())
                .map(|(a, b)| distance(a, b))
                .fold(0.0, f64::max),
        )
    }
}

/// Bitwise hash key for a coordinate tuple, with signed zeros unified.
pub(crate) fn bit_key(p: &[f64]) -> Vec<u64> {
    p.iter()
        .map(|&x| if x == 0.0 { 0.0f64.to_bits() } else { x.to_bits() })
        .collect()
}

/// Euclidean distance between two coordinate tuples.
#[inline]
pub fn distance(a: &[f64], b: &[f64]) -> f64 {
    a.iter()
        .zip(b)
        .map(|(x, y)| (x - y) * (x - y))
        .sum::<f64>()
        .sqrt()
}
