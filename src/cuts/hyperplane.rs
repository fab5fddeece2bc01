//! Hyperplane records and the registry of generated cuts.

use std::collections::HashMap;

use crate::model::ProblemModel;

/// What a hyperplane linearizes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CutTarget {
    /// A nonlinear constraint, by index.
    Constraint(usize),

    /// The nonlinear objective's epigraph against the auxiliary objective
    /// variable.
    Objective,
}

/// Where the generating point of a hyperplane came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HyperplaneSource {
    /// Solution of an LP-relaxed iteration.
    LpRelaxedSolutionPoint,

    /// Optimal solution of a MIP relaxation solve.
    MipOptimalSolutionPoint,

    /// Pool solution of a MIP relaxation solve.
    MipSolutionPoolSolutionPoint,

    /// Candidate delivered through the lazy-constraint callback.
    LazyConstraintCallback,

    /// Boundary point of an objective-direction root-search.
    ObjectiveRootSearch,
}

/// A cut candidate: a linearization point for one target, not yet turned
/// into a row. Consumed exactly once by the relaxation manager.
#[derive(Debug, Clone)]
pub struct Hyperplane {
    /// What is being linearized.
    pub target: CutTarget,

    /// The linearization point.
    pub generated_point: Vec<f64>,

    /// Provenance of the point.
    pub source: HyperplaneSource,
}

/// Bookkeeping record of a cut that reached the relaxation.
#[derive(Debug, Clone)]
pub struct GeneratedHyperplane {
    /// Row index in the live relaxation; None for lazy rows, whose index
    /// inside the in-progress search is not observable.
    pub row: Option<usize>,

    /// What was linearized.
    pub target: CutTarget,

    /// The linearization point.
    pub generated_point: Vec<f64>,

    /// Provenance.
    pub source: HyperplaneSource,

    /// Iteration in which the row was created.
    pub generated_iter: u64,

    /// Whether the row was injected lazily into an in-progress search.
    pub is_lazy: bool,

    /// Bookkeeping flag; rows are relaxed by repair, never deleted, since
    /// the subsolver does not support row deletion mid-solve.
    pub is_removed: bool,

    /// Whether the source constraint is known convex. Nonconvex-sourced rows
    /// are the ones eligible for infeasibility repair.
    pub is_source_convex: bool,
}

/// Append-only arena of generated hyperplanes.
///
/// Entry ids are never reused within one relaxation lifetime; entries backed
/// by a relaxation row are additionally indexed by that row.
#[derive(Debug, Default)]
pub struct HyperplaneRegistry {
    entries: Vec<GeneratedHyperplane>,

    /// Parallel active flags; an entry flagged removed stays in the arena.
    active: Vec<bool>,

    /// Relaxation row index -> entry id.
    by_row: HashMap<usize, usize>,
}

impl HyperplaneRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a generated hyperplane, returning its entry id.
    pub fn record(&mut self, hyperplane: GeneratedHyperplane) -> usize {
        let id = self.entries.len();
        if let Some(row) = hyperplane.row {
            self.by_row.insert(row, id);
        }
        self.entries.push(hyperplane);
        self.active.push(true);
        id
    }

    /// Look up the record backing a relaxation row.
    pub fn by_row(&self, row: usize) -> Option<&GeneratedHyperplane> {
        self.by_row.get(&row).map(|&id| &self.entries[id])
    }

    /// Flag a row's record as removed. The arena entry survives.
    pub fn mark_removed(&mut self, row: usize) {
        if let Some(&id) = self.by_row.get(&row) {
            self.entries[id].is_removed = true;
            self.active[id] = false;
        }
    }

    /// All records, in creation order.
    pub fn iter(&self) -> impl Iterator<Item = &GeneratedHyperplane> {
        self.entries.iter()
    }

    /// Records still flagged active.
    pub fn active(&self) -> impl Iterator<Item = &GeneratedHyperplane> {
        self.entries
            .iter()
            .zip(&self.active)
            .filter(|(_, &a)| a)
            .map(|(e, _)| e)
    }

    /// Total records.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether no hyperplane has been generated yet.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Build the row terms for a hyperplane: the gradient of the target at the
/// generated point, plus the constant term.
///
/// For a constraint g(x) <= 0 linearized at p the cut is
/// `grad(p) · x <= grad(p) · p - g(p)`; returned as `(terms, constant)` with
/// `constant = g(p) - grad(p) · p`, so the row reads `terms · x <= -constant`.
/// For the objective epigraph f(x) <= mu the auxiliary objective variable
/// enters the terms with coefficient -1.
///
/// Returns None when the gradient is empty (nothing to cut with).
pub fn create_hyperplane_terms(
    problem: &dyn ProblemModel,
    hyperplane: &Hyperplane,
) -> Option<(Vec<(usize, f64)>, f64)> {
    let point = &hyperplane.generated_point;

    let (mut terms, value) = match hyperplane.target {
        CutTarget::Constraint(c) => (problem.gradient(c, point), problem.evaluate(c, point)),
        CutTarget::Objective => {
            let aux = problem.auxiliary_objective_variable()?;
            let mut terms = problem.objective_gradient(point);
            terms.push((aux, -1.0));
            let mu = point.get(aux).copied().unwrap_or(0.0);
            (terms, problem.objective_value(point) - mu)
        }
    };

    if terms.is_empty() {
        return None;
    }

    let mut constant = value;
    for &(index, coefficient) in &terms {
        constant -= coefficient * point.get(index).copied().unwrap_or(0.0);
    }

    terms.retain(|&(_, coefficient)| coefficient != 0.0);
    if terms.is_empty() {
        return None;
    }

    Some((terms, constant))
}

/// Whether every coefficient and the constant are finite. A hyperplane
/// failing this must never reach the subsolver.
pub fn terms_are_finite(terms: &[(usize, f64)], constant: f64) -> bool {
    constant.is_finite() && terms.iter().all(|&(_, v)| v.is_finite())
}
