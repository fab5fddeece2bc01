//! Boundary root-search between an interior and an exterior point.
//!
//! The ESH strategy places hyperplanes at the feasible-set boundary rather
//! than at the (exterior) candidate point. The boundary is located by a
//! bracketed bisection on the scalar function
//! `h(lambda) = max violation at interior + lambda * (exterior - interior)`.

use crate::model::ProblemModel;
use crate::settings::RootSearchSettings;

/// Result of a boundary search.
#[derive(Debug, Clone)]
pub struct RootSearchOutcome {
    /// The located boundary point, on the feasible side within tolerance.
    pub boundary: Vec<f64>,

    /// The matching point just on the infeasible side of the bracket.
    pub exterior: Vec<f64>,

    /// Final lambda of the boundary point, in [0, 1].
    pub lambda: f64,

    /// Max violation at the boundary point.
    pub violation: f64,
}

/// Bracketed bisection root-search along a segment.
pub struct RootSearch<'a> {
    problem: &'a dyn ProblemModel,
    settings: RootSearchSettings,
}

impl<'a> RootSearch<'a> {
    /// Create a search over the given problem.
    pub fn new(problem: &'a dyn ProblemModel, settings: RootSearchSettings) -> Self {
        Self { problem, settings }
    }

    fn point_at(interior: &[f64], exterior: &[f64], lambda: f64) -> Vec<f64> {
        interior
            .iter()
            .zip(exterior)
            .map(|(&a, &b)| a + lambda * (b - a))
            .collect()
    }

    fn max_violation(&self, constraints: &[usize], point: &[f64]) -> f64 {
        constraints
            .iter()
            .map(|&c| self.problem.evaluate(c, point))
            .fold(f64::NEG_INFINITY, f64::max)
    }

    /// Locate the boundary point between `interior` (violation <= 0) and
    /// `exterior` (violation > 0) with respect to the given constraints.
    ///
    /// The search is deterministic: repeated calls with the same inputs
    /// return the same point. If the exterior point is already feasible it
    /// is returned unchanged; if the interior point is infeasible a warning
    /// is logged and the interior point is returned as-is.
    pub fn find_boundary(
        &self,
        interior: &[f64],
        exterior: &[f64],
        constraints: &[usize],
    ) -> RootSearchOutcome {
        let h_exterior = self.max_violation(constraints, exterior);
        if h_exterior <= self.settings.violation_tolerance {
            // Nothing to bracket; the candidate is already inside.
            return RootSearchOutcome {
                boundary: exterior.to_vec(),
                exterior: exterior.to_vec(),
                lambda: 1.0,
                violation: h_exterior,
            };
        }

        let h_interior = self.max_violation(constraints, interior);
        if h_interior > self.settings.violation_tolerance {
            log::warn!(
                "root-search interior point is numerically infeasible (violation {:.3e}); returning it unchanged",
                h_interior
            );
            return RootSearchOutcome {
                boundary: interior.to_vec(),
                exterior: exterior.to_vec(),
                lambda: 0.0,
                violation: h_interior,
            };
        }

        // Invariant: h(lo) <= tol < h(hi).
        let mut lo = 0.0_f64;
        let mut hi = 1.0_f64;
        let mut h_lo = h_interior;

        for _ in 0..self.settings.max_iterations {
            if hi - lo <= self.settings.lambda_tolerance {
                break;
            }

            let mid = 0.5 * (lo + hi);
            let h_mid = self.max_violation(constraints, &Self::point_at(interior, exterior, mid));

            if h_mid <= 0.0 {
                lo = mid;
                h_lo = h_mid;
                if h_mid.abs() <= self.settings.violation_tolerance {
                    break;
                }
            } else {
                hi = mid;
            }
        }

        RootSearchOutcome {
            boundary: Self::point_at(interior, exterior, lo),
            exterior: Self::point_at(interior, exterior, hi),
            lambda: lo,
            violation: h_lo,
        }
    }
}
