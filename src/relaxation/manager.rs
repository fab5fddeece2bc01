//! Ownership of the subsolver instance and the rows added to it.

use std::path::Path;

use crate::cuts::{
    create_hyperplane_terms, terms_are_finite, GeneratedHyperplane, Hyperplane,
    HyperplaneRegistry,
};
use crate::error::{DualError, DualResult};
use crate::model::{ObjectiveSense, ProblemModel, VarType, Variable};
use crate::subsolver::{LazyRow, RowSense, Subsolver};

/// Owns the subsolver and every row the engine has added to it.
///
/// The manager is the only writer of the relaxation: hyperplane rows, the
/// objective cutoff row and integer cuts all pass through it so the registry
/// stays consistent with the subsolver's row indices. Rows are never deleted;
/// repair relaxes their bounds instead.
pub struct RelaxationManager {
    subsolver: Box<dyn Subsolver>,
    registry: HyperplaneRegistry,

    /// Rows present before any engine-added cut.
    num_original_rows: usize,

    objective_terms: Vec<(usize, f64)>,
    objective_constant: f64,
    sense: ObjectiveSense,
    cutoff_tolerance: f64,

    cutoff_row: Option<usize>,
    integer_cut_rows: Vec<usize>,
    hyperplane_rows_added: usize,
}

impl RelaxationManager {
    /// Take ownership of a subsolver already loaded with the problem's
    /// variables and linear constraints.
    pub fn new(subsolver: Box<dyn Subsolver>, sense: ObjectiveSense, cutoff_tolerance: f64) -> Self {
        let num_original_rows = subsolver.num_rows();
        Self {
            subsolver,
            registry: HyperplaneRegistry::new(),
            num_original_rows,
            objective_terms: Vec::new(),
            objective_constant: 0.0,
            sense,
            cutoff_tolerance,
            cutoff_row: None,
            integer_cut_rows: Vec::new(),
            hyperplane_rows_added: 0,
        }
    }

    /// Immutable access to the subsolver.
    pub fn subsolver(&self) -> &dyn Subsolver {
        self.subsolver.as_ref()
    }

    /// Mutable access to the subsolver.
    pub fn subsolver_mut(&mut self) -> &mut dyn Subsolver {
        self.subsolver.as_mut()
    }

    /// The registry of generated hyperplanes.
    pub fn registry(&self) -> &HyperplaneRegistry {
        &self.registry
    }

    /// Rows present before any engine-added cut.
    pub fn num_original_rows(&self) -> usize {
        self.num_original_rows
    }

    /// Hyperplane rows added so far (eager rows only).
    pub fn num_hyperplane_rows(&self) -> usize {
        self.hyperplane_rows_added
    }

    /// Integer cuts added so far.
    pub fn num_integer_cuts(&self) -> usize {
        self.integer_cut_rows.len()
    }

    /// Whether the objective cutoff row exists.
    pub fn has_cutoff_row(&self) -> bool {
        self.cutoff_row.is_some()
    }

    /// Set the relaxation's linear objective. The terms are retained for the
    /// objective cutoff row.
    pub fn set_objective(&mut self, terms: Vec<(usize, f64)>, constant: f64) {
        self.subsolver
            .set_objective(&terms, constant, self.sense == ObjectiveSense::Minimize);
        self.objective_terms = terms;
        self.objective_constant = constant;
    }

    /// Add a hyperplane as an eager row `terms · x <= -constant`.
    ///
    /// Returns false (without touching the subsolver) when the candidate
    /// degenerates: empty gradient, or non-finite coefficients.
    pub fn add_hyperplane(
        &mut self,
        problem: &dyn ProblemModel,
        hyperplane: Hyperplane,
        iteration: u64,
    ) -> DualResult<bool> {
        let (terms, constant) = match create_hyperplane_terms(problem, &hyperplane) {
            Some(tc) => tc,
            None => {
                log::debug!("hyperplane with empty gradient discarded");
                return Ok(false);
            }
        };

        if !terms_are_finite(&terms, constant) {
            log::warn!(
                "hyperplane for {:?} has non-finite coefficients, discarded",
                hyperplane.target
            );
            return Ok(false);
        }

        let name = format!("HP_{}", self.hyperplane_rows_added);
        let row = self
            .subsolver
            .add_linear_constraint(&terms, -constant, &name, RowSense::LessOrEqual);
        self.hyperplane_rows_added += 1;

        let is_source_convex = match hyperplane.target {
            crate::cuts::CutTarget::Constraint(c) => problem.is_convex_source(c),
            crate::cuts::CutTarget::Objective => true,
        };

        self.registry.record(GeneratedHyperplane {
            row: Some(row),
            target: hyperplane.target,
            generated_point: hyperplane.generated_point,
            source: hyperplane.source,
            generated_iter: iteration,
            is_lazy: false,
            is_removed: false,
            is_source_convex,
        });

        Ok(true)
    }

    /// Merge records of hyperplanes that were injected lazily during a
    /// callback-driven solve.
    pub fn record_lazy(&mut self, records: Vec<GeneratedHyperplane>) {
        for record in records {
            self.registry.record(record);
        }
    }

    /// Create or tighten the objective cutoff row so the search only accepts
    /// solutions strictly better than `primal_bound`.
    ///
    /// The row is created once and only its bound moves afterwards, and only
    /// in the tightening direction, so a stale bound can never loosen it.
    pub fn update_cutoff(&mut self, primal_bound: f64) {
        if !primal_bound.is_finite() || self.objective_terms.is_empty() {
            return;
        }

        // Both senses are expressed as a <= row; maximization negates the
        // objective terms once at row creation.
        let rhs = match self.sense {
            ObjectiveSense::Minimize => {
                primal_bound + self.cutoff_tolerance - self.objective_constant
            }
            ObjectiveSense::Maximize => {
                -(primal_bound - self.cutoff_tolerance) + self.objective_constant
            }
        };

        match self.cutoff_row {
            Some(row) => {
                if rhs < self.subsolver.row_upper(row) {
                    log::debug!("cutoff tightened to {:.6e}", primal_bound);
                    self.subsolver.set_row_upper(row, rhs);
                }
            }
            None => {
                let terms: Vec<(usize, f64)> = match self.sense {
                    ObjectiveSense::Minimize => self.objective_terms.clone(),
                    ObjectiveSense::Maximize => self
                        .objective_terms
                        .iter()
                        .map(|&(i, c)| (i, -c))
                        .collect(),
                };
                let row =
                    self.subsolver
                        .add_linear_constraint(&terms, rhs, "CUTOFF_C", RowSense::LessOrEqual);
                log::debug!("cutoff row created at {:.6e}", primal_bound);
                self.cutoff_row = Some(row);
            }
        }
    }

    /// Forbid one integer assignment: for a binary support,
    /// `sum(x at 1) - sum(x at 0) <= |ones| - 1`.
    ///
    /// Only binary discrete variables are supported; an assignment touching
    /// a general-integer variable is skipped with a warning.
    pub fn add_integer_cut(&mut self, point: &[f64], variables: &[Variable]) -> DualResult<bool> {
        let mut terms = Vec::new();
        let mut ones = 0usize;

        for v in variables {
            if !v.var_type.is_discrete() {
                continue;
            }
            if v.var_type != VarType::Binary {
                log::warn!(
                    "integer cut skipped: variable {} is discrete but not binary",
                    v.name
                );
                return Ok(false);
            }

            let value = point.get(v.index).copied().ok_or_else(|| {
                DualError::Internal(format!("point has no entry for variable {}", v.index))
            })?;

            if value > 0.5 {
                terms.push((v.index, 1.0));
                ones += 1;
            } else {
                terms.push((v.index, -1.0));
            }
        }

        if terms.is_empty() {
            return Ok(false);
        }

        let name = format!("IC_{}", self.integer_cut_rows.len());
        let rhs = ones as f64 - 1.0;
        let row = self
            .subsolver
            .add_linear_constraint(&terms, rhs, &name, RowSense::LessOrEqual);
        self.integer_cut_rows.push(row);
        Ok(true)
    }

    /// Whether a row may be relaxed by infeasibility repair: an engine-added
    /// hyperplane row from a nonconvex source. Original rows, the cutoff row
    /// and integer cuts are never repaired.
    pub fn is_repairable_row(&self, row: usize) -> bool {
        if row < self.num_original_rows
            || self.cutoff_row == Some(row)
            || self.integer_cut_rows.contains(&row)
        {
            return false;
        }
        match self.registry.by_row(row) {
            Some(record) => !record.is_source_convex && !record.is_removed,
            None => false,
        }
    }

    /// Permanently relax a row's bound by `amount` and retire its registry
    /// record.
    pub fn relax_row(&mut self, row: usize, amount: f64) {
        let rhs = self.subsolver.row_upper(row);
        self.subsolver.set_row_upper(row, rhs + amount);
        self.registry.mark_removed(row);
    }

    /// Fix a variable to a value. No-op when already fixed there.
    pub fn fix_variable(&mut self, index: usize, value: f64) {
        let (lower, upper) = self.subsolver.variable_bounds(index);
        if lower == value && upper == value {
            return;
        }
        self.subsolver.set_variable_bounds(index, value, value);
    }

    /// Update a variable's bounds. No-op when unchanged.
    pub fn update_variable_bounds(&mut self, index: usize, lower: f64, upper: f64) {
        if self.subsolver.variable_bounds(index) == (lower, upper) {
            return;
        }
        self.subsolver.set_variable_bounds(index, lower, upper);
    }

    /// Dump the live relaxation to a file.
    pub fn write_problem(&self, path: &Path) -> DualResult<()> {
        self.subsolver.write_problem(path)
    }
}

/// Build the lazy-row form of a hyperplane together with its registry
/// record. Free-standing so the callback handler can use it without holding
/// the manager; the records it produces are merged back through
/// [`RelaxationManager::record_lazy`] after the solve returns.
///
/// None when the candidate degenerates (empty gradient or non-finite
/// coefficients), mirroring [`RelaxationManager::add_hyperplane`].
pub fn build_lazy_row(
    problem: &dyn ProblemModel,
    hyperplane: &Hyperplane,
    iteration: u64,
) -> Option<(LazyRow, GeneratedHyperplane)> {
    let (terms, constant) = create_hyperplane_terms(problem, hyperplane)?;
    if !terms_are_finite(&terms, constant) {
        log::warn!(
            "lazy hyperplane for {:?} has non-finite coefficients, discarded",
            hyperplane.target
        );
        return None;
    }

    let is_source_convex = match hyperplane.target {
        crate::cuts::CutTarget::Constraint(c) => problem.is_convex_source(c),
        crate::cuts::CutTarget::Objective => true,
    };

    let row = LazyRow {
        terms,
        rhs: -constant,
    };
    let record = GeneratedHyperplane {
        row: None,
        target: hyperplane.target,
        generated_point: hyperplane.generated_point.clone(),
        source: hyperplane.source,
        generated_iter: iteration,
        is_lazy: true,
        is_removed: false,
        is_source_convex,
    };
    Some((row, record))
}
