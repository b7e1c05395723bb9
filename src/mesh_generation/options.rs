//! Configuration for [`MeshGenerator`](super::MeshGenerator).

use crate::mesh_error::MeshGenError;
use serde::{Deserialize, Serialize};

/// Per-run options.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BuildOptions {
    /// Vertices that are kept at their exact coordinates. They form the first
    /// entries of the output point set, in the given order.
    pub fixed_points: Vec<Vec<f64>>,
    /// Iteration budget; the loop runs at most this many iterations.
    pub max_iter: usize,
    /// Progress and visualization cadence, in iterations.
    pub nscreen: usize,
    /// Hand every `nscreen`-th retriangulation to the observer.
    pub plot: bool,
    /// Seed for the rejection-sampling RNG. `None` draws one from entropy.
    pub seed: Option<u64>,
}

impl Default for BuildOptions {
    fn default() -> Self {
        Self {
            fixed_points: Vec::new(),
            max_iter: 10,
            nscreen: 5,
            plot: false,
            seed: None,
        }
    }
}

impl BuildOptions {
    pub(crate) fn validate(&self) -> Result<(), MeshGenError> {
        if self.max_iter == 0 {
            return Err(MeshGenError::invalid_parameter(
                "max_iter",
                "at least one iteration is required",
            ));
        }
        if self.nscreen == 0 {
            return Err(MeshGenError::invalid_parameter("nscreen", "must be at least 1"));
        }
        Ok(())
    }
}

/// Numerical constants of the relaxation. The defaults work for most domains.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RelaxationParams {
    /// Convergence threshold on the interior displacement, relative to `h0`.
    pub ptol: f64,
    /// Retriangulation threshold on the displacement since the last
    /// triangulation, relative to `h0`.
    pub ttol: f64,
    /// Pseudo time step of the force update.
    pub deltat: f64,
    /// Boundary tolerance `geps` as a multiple of `h0`.
    pub geps_factor: f64,
    /// Rest-length overshoot. Derived from the dimension when `None`.
    pub l0mult: Option<f64>,
}

impl Default for RelaxationParams {
    fn default() -> Self {
        Self {
            ptol: 0.001,
            ttol: 0.1,
            deltat: 0.1,
            geps_factor: 0.1,
            l0mult: None,
        }
    }
}

impl RelaxationParams {
    pub(crate) fn validate(&self) -> Result<(), MeshGenError> {
        let scalars = [
            ("ptol", self.ptol),
            ("ttol", self.ttol),
            ("deltat", self.deltat),
            ("geps_factor", self.geps_factor),
        ];
        for (name, value) in scalars
            .into_iter()
            .chain(self.l0mult.map(|m| ("l0mult", m)))
        {
            if !(value.is_finite() && value > 0.0) {
                return Err(MeshGenError::invalid_parameter(
                    name,
                    format!("must be positive and finite, got {value}"),
                ));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        assert!(BuildOptions::default().validate().is_ok());
        assert!(RelaxationParams::default().validate().is_ok());
    }

    #[test]
    fn zero_budget_is_rejected() {
        let opts = BuildOptions {
            max_iter: 0,
            ..Default::default()
        };
        assert!(matches!(
            opts.validate(),
            Err(MeshGenError::InvalidParameter { name: "max_iter", .. })
        ));
    }

    #[test]
    fn negative_tolerance_is_rejected() {
        let params = RelaxationParams {
            ttol: -1.0,
            ..Default::default()
        };
        assert!(matches!(
            params.validate(),
            Err(MeshGenError::InvalidParameter { name: "ttol", .. })
        ));
        let params = RelaxationParams {
            l0mult: Some(f64::NAN),
            ..Default::default()
        };
        assert!(params.validate().is_err());
    }
}
