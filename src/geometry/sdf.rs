//! Signed-distance primitives and set combinators.
//!
//! All functions take a single coordinate tuple; wrap them in a closure and
//! hand them to [`Domain`](crate::geometry::Domain) to get a batched provider.
//! The box functions are exact inside and only a lower bound of the true
//! distance near corners outside, which is all the projection step needs.

/// Rectangle `[x1, x2] × [y1, y2]`.
#[inline]
pub fn rectangle(p: &[f64], x1: f64, x2: f64, y1: f64, y2: f64) -> f64 {
    -(-y1 + p[1]).min(y2 - p[1]).min(-x1 + p[0]).min(x2 - p[0])
}

/// Block `[x1, x2] × [y1, y2] × [z1, z2]`.
#[inline]
pub fn block(p: &[f64], x1: f64, x2: f64, y1: f64, y2: f64, z1: f64, z2: f64) -> f64 {
    -(-z1 + p[2])
        .min(z2 - p[2])
        .min(-y1 + p[1])
        .min(y2 - p[1])
        .min(-x1 + p[0])
        .min(x2 - p[0])
}

/// Disk or ball of radius `r` around `center` (any dimension).
#[inline]
pub fn ball(p: &[f64], center: &[f64], r: f64) -> f64 {
    crate::data::point_set::distance(p, center) - r
}

#[inline]
pub fn union(d1: f64, d2: f64) -> f64 {
    d1.min(d2)
}

#[inline]
pub fn intersection(d1: f64, d2: f64) -> f64 {
    d1.max(d2)
}

/// Points of the first region that are not in the second.
#[inline]
pub fn difference(d1: f64, d2: f64) -> f64 {
    d1.max(-d2)
}
