//! Dual and primal bound tracking.
//!
//! The tracker owns the canonical best-known dual bound (certified bound on
//! the optimum) and primal bound (best feasible objective). Other components
//! only propose candidates; an update is accepted only if it strictly
//! improves the bound for the configured direction.

use crate::model::{DualSolution, ObjectiveSense, PrimalSolution};

/// Denominator guard for the relative gap.
const REL_GAP_EPS: f64 = 1e-10;

/// Tracks the best known dual and primal bounds and decides convergence.
#[derive(Debug, Clone)]
pub struct BoundTracker {
    sense: ObjectiveSense,

    /// Best certified bound on the optimum.
    dual_bound: f64,

    /// Best feasible objective value found.
    primal_bound: f64,

    /// Absolute gap tolerance.
    gap_abs_tol: f64,

    /// Relative gap tolerance.
    gap_rel_tol: f64,

    /// Accepted dual solutions, append-only.
    dual_history: Vec<DualSolution>,

    /// Accepted primal solutions, append-only.
    primal_history: Vec<PrimalSolution>,
}

impl BoundTracker {
    /// Create a tracker with no known bounds.
    pub fn new(sense: ObjectiveSense, gap_abs_tol: f64, gap_rel_tol: f64) -> Self {
        // The dual bound starts at the worst value for the *opposite* side:
        // for minimization the dual bound climbs up from -inf toward the
        // optimum while the primal bound descends from +inf.
        let (dual_bound, primal_bound) = match sense {
            ObjectiveSense::Minimize => (f64::NEG_INFINITY, f64::INFINITY),
            ObjectiveSense::Maximize => (f64::INFINITY, f64::NEG_INFINITY),
        };

        Self {
            sense,
            dual_bound,
            primal_bound,
            gap_abs_tol,
            gap_rel_tol,
            dual_history: Vec::new(),
            primal_history: Vec::new(),
        }
    }

    /// Optimization direction.
    pub fn sense(&self) -> ObjectiveSense {
        self.sense
    }

    /// Best known dual bound.
    pub fn dual_bound(&self) -> f64 {
        self.dual_bound
    }

    /// Best known primal bound.
    pub fn primal_bound(&self) -> f64 {
        self.primal_bound
    }

    /// Whether any feasible incumbent has been accepted.
    pub fn has_primal_solution(&self) -> bool {
        !self.primal_history.is_empty()
    }

    /// The best accepted incumbent, if any.
    pub fn best_primal_solution(&self) -> Option<&PrimalSolution> {
        self.primal_history.last()
    }

    /// Propose a dual bound candidate.
    ///
    /// Returns true if the candidate improved the tracked bound. A dual
    /// bound moving past the primal bound indicates an unsound cut or a
    /// numerical problem and is reported, not silently absorbed.
    pub fn update_dual(&mut self, candidate: DualSolution) -> bool {
        // The dual bound improves toward the optimum, i.e. in the direction
        // opposite to the primal improvement direction.
        let improves = match self.sense {
            ObjectiveSense::Minimize => candidate.objective_value > self.dual_bound,
            ObjectiveSense::Maximize => candidate.objective_value < self.dual_bound,
        };

        if !improves {
            return false;
        }

        let crosses = match self.sense {
            ObjectiveSense::Minimize => candidate.objective_value > self.primal_bound + self.gap_abs_tol,
            ObjectiveSense::Maximize => candidate.objective_value < self.primal_bound - self.gap_abs_tol,
        };

        if crosses && self.has_primal_solution() {
            log::warn!(
                "dual bound candidate {:.8e} crosses primal bound {:.8e}; accepting but this indicates a cut-soundness or numerical problem",
                candidate.objective_value,
                self.primal_bound
            );
        }

        self.dual_bound = candidate.objective_value;
        self.dual_history.push(candidate);
        true
    }

    /// Propose a primal (incumbent) candidate.
    ///
    /// Returns true if the candidate improved the tracked bound.
    pub fn update_primal(&mut self, candidate: PrimalSolution) -> bool {
        if !self.sense.is_better(candidate.objective_value, self.primal_bound) {
            return false;
        }

        self.primal_bound = candidate.objective_value;
        self.primal_history.push(candidate);
        true
    }

    /// Absolute objective gap.
    pub fn absolute_gap(&self) -> f64 {
        if self.dual_bound.is_infinite() || self.primal_bound.is_infinite() {
            return f64::INFINITY;
        }
        (self.primal_bound - self.dual_bound).abs()
    }

    /// Relative objective gap.
    pub fn relative_gap(&self) -> f64 {
        let abs = self.absolute_gap();
        if abs.is_infinite() {
            return f64::INFINITY;
        }
        abs / (REL_GAP_EPS + self.primal_bound.abs())
    }

    /// Whether the absolute gap tolerance is met.
    pub fn is_absolute_gap_met(&self) -> bool {
        self.absolute_gap() <= self.gap_abs_tol
    }

    /// Whether the relative gap tolerance is met.
    pub fn is_relative_gap_met(&self) -> bool {
        self.relative_gap() <= self.gap_rel_tol
    }

    /// Whether either gap tolerance is met.
    pub fn is_gap_met(&self) -> bool {
        self.is_absolute_gap_met() || self.is_relative_gap_met()
    }

    /// Number of accepted dual updates.
    pub fn dual_updates(&self) -> usize {
        self.dual_history.len()
    }

    /// Number of accepted primal updates.
    pub fn primal_updates(&self) -> usize {
        self.primal_history.len()
    }
}
