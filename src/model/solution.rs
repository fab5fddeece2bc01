//! Solution point and bound-candidate records.

use super::ConstraintViolation;

/// A candidate point pulled from the subsolver.
#[derive(Debug, Clone)]
pub struct SolutionPoint {
    /// Variable values.
    pub point: Vec<f64>,

    /// True objective value at the point.
    pub objective_value: f64,

    /// Most violated nonlinear constraint at the point, if any exist.
    pub max_deviation: Option<ConstraintViolation>,

    /// Controller iteration in which the point was found.
    pub iter_found: u64,
}

impl SolutionPoint {
    /// Whether the point satisfies all nonlinear constraints within `tol`.
    pub fn is_nonlinearly_feasible(&self, tol: f64) -> bool {
        self.max_deviation.map_or(true, |dev| dev.value <= tol)
    }
}

/// Where a dual bound candidate came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DualBoundSource {
    /// Optimal value of an LP-relaxed iteration.
    RelaxedSolution,

    /// Proven optimal value of a MIP relaxation solve.
    MipOptimal,

    /// Best-possible bound reported by the subsolver mid-search.
    SubsolverBound,

    /// Bound derived from an objective-epigraph root-search.
    ObjectiveRootSearch,
}

/// Where a primal (incumbent) candidate came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PrimalSource {
    /// A pool solution of a MIP relaxation solve.
    MipSolutionPool,

    /// The optimal solution of a MIP relaxation solve.
    MipOptimal,

    /// An incumbent reported through the lazy-constraint callback.
    LazyConstraintCallback,

    /// A boundary point located by root-search that is feasible for the
    /// full nonlinear model.
    RootSearch,

    /// A point polished by the fixed-integer NLP subsolver.
    NlpPolish,
}

/// A dual bound candidate. The point may be empty for bound-only updates
/// (e.g. the subsolver's best-possible bound without a matching solution).
#[derive(Debug, Clone)]
pub struct DualSolution {
    /// Point attaining the bound, when one exists.
    pub point: Option<Vec<f64>>,

    /// Provenance.
    pub source: DualBoundSource,

    /// The certified bound value.
    pub objective_value: f64,

    /// Controller iteration in which the bound was found.
    pub iter_found: u64,
}

/// A primal (feasible incumbent) candidate.
#[derive(Debug, Clone)]
pub struct PrimalSolution {
    /// The feasible point.
    pub point: Vec<f64>,

    /// Provenance.
    pub source: PrimalSource,

    /// True objective value at the point.
    pub objective_value: f64,

    /// Controller iteration in which the point was found.
    pub iter_found: u64,

    /// Most violated nonlinear constraint at acceptance time.
    pub max_deviation: Option<ConstraintViolation>,
}
