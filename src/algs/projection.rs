//! Boundary projection.
//!
//! Free points that drifted outside the domain are moved back along the
//! numerical gradient of the signed distance. The gradient is a forward
//! difference, evaluated with one batched distance call per axis.

use crate::data::point_set::PointSet;
use crate::geometry::SizingFunction;

/// Project every free point (`index >= nfix`) with positive signed distance
/// back onto the boundary. Returns the signed distances from *before* the
/// projection.
pub fn project_to_boundary<F>(sizing: &F, points: &mut PointSet, nfix: usize, deps: f64) -> Vec<f64>
where
    F: SizingFunction + ?Sized,
{
    let d = sizing.signed_distance(points);
    let outside: Vec<usize> = (nfix..points.len()).filter(|&i| d[i] > 0.0).collect();
    if outside.is_empty() {
        return d;
    }

    let dim = points.dim();
    let base = points.select(&outside);
    let mut grad = vec![0.0; outside.len() * dim];
    for k in 0..dim {
        let mut shifted = base.clone();
        for i in 0..shifted.len() {
            shifted.point_mut(i)[k] += deps;
        }
        let ds = sizing.signed_distance(&shifted);
        for (j, (&i, dk)) in outside.iter().zip(ds).enumerate() {
            grad[j * dim + k] = (dk - d[i]) / deps;
        }
    }

    for (j, &i) in outside.iter().enumerate() {
        let g = &grad[j * dim..(j + 1) * dim];
        let g2 = g.iter().map(|x| x * x).sum::<f64>().max(deps);
        for (x, gk) in points.point_mut(i).iter_mut().zip(g) {
            *x -= d[i] * gk / g2;
        }
    }
    d
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::{BoundingBox, Domain, sdf};
    use approx::assert_relative_eq;

    fn disk() -> Domain {
        Domain::uniform(
            BoundingBox::new(vec![(-1.0, 1.0), (-1.0, 1.0)]).unwrap(),
            0.1,
            |p| sdf::ball(p, &[0.0, 0.0], 1.0),
        )
        .unwrap()
    }

    #[test]
    fn outside_point_lands_on_circle() {
        let mut pts = PointSet::from_rows(2, &[[1.3, 0.4], [0.2, 0.1]]).unwrap();
        let d = project_to_boundary(&disk(), &mut pts, 0, 1e-8);
        assert!(d[0] > 0.0 && d[1] < 0.0);
        let r = pts.point(0).iter().map(|x| x * x).sum::<f64>().sqrt();
        assert_relative_eq!(r, 1.0, epsilon = 1e-6);
        assert_eq!(pts.point(1), &[0.2, 0.1]);
    }

    #[test]
    fn fixed_points_are_never_projected() {
        let mut pts = PointSet::from_rows(2, &[[2.0, 0.0], [2.0, 0.0]]).unwrap();
        project_to_boundary(&disk(), &mut pts, 1, 1e-8);
        assert_eq!(pts.point(0), &[2.0, 0.0]);
        assert_relative_eq!(pts.point(1)[0], 1.0, epsilon = 1e-6);
    }

    #[test]
    fn flat_distance_field_leaves_points_finite() {
        // constant distance outside x > 2: zero gradient there
        let plateau = Domain::uniform(
            BoundingBox::new(vec![(-3.0, 3.0), (-3.0, 3.0)]).unwrap(),
            0.1,
            |p| if p[0] > 2.0 { 1.0 } else { sdf::ball(p, &[0.0, 0.0], 1.0) },
        )
        .unwrap();
        let mut pts = PointSet::from_rows(2, &[[3.0, 0.0], [2.5, 0.5]]).unwrap();
        let d = project_to_boundary(&plateau, &mut pts, 0, 1e-8);
        assert_eq!(d, vec![1.0, 1.0]);
        assert!(pts.as_flat().iter().all(|x| x.is_finite()));
        assert_eq!(pts.point(0), &[3.0, 0.0]);
        assert_eq!(pts.point(1), &[2.5, 0.5]);
    }

    #[test]
    fn shallow_gradient_step_is_bounded_by_deps() {
        let deps = 1e-8;
        let shallow = Domain::uniform(
            BoundingBox::new(vec![(-3.0, 3.0), (-3.0, 3.0)]).unwrap(),
            0.1,
            |p| 1.0 + 1e-6 * p[0],
        )
        .unwrap();
        let mut pts = PointSet::from_rows(2, &[[0.0, 0.0]]).unwrap();
        project_to_boundary(&shallow, &mut pts, 0, deps);
        // |g|^2 = 1e-12 is clamped to deps, so the step is d * g / deps = 100
        assert_relative_eq!(pts.point(0)[0], -100.0, max_relative = 0.05);
        assert_eq!(pts.point(0)[1], 0.0);
    }
}
