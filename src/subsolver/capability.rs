//! Abstract mixed-integer subsolver capability.
//!
//! The engine owns the evolving relaxation but never implements a MIP/LP
//! solver itself; a backend (Cbc, Gurobi, CPLEX, ...) is wrapped behind this
//! trait and selected at configuration time. There is no shared state between
//! backends beyond the trait contract.

use std::path::Path;

use crate::error::DualResult;
use crate::model::VarType;
use crate::subsolver::CallbackHandler;

/// Status reported by a relaxation solve.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubsolverStatus {
    /// Proven optimal for the current relaxation.
    Optimal,

    /// Feasible solution found, optimality not proven.
    Feasible,

    /// Relaxation proven infeasible.
    Infeasible,

    /// Relaxation proven unbounded.
    Unbounded,

    /// Stopped at the solution limit.
    SolutionLimit,

    /// Stopped at the time limit.
    TimeLimit,

    /// Stopped at the node limit.
    NodeLimit,

    /// Search aborted on request.
    Abort,

    /// Internal solver failure.
    Error,
}

impl SubsolverStatus {
    /// Whether the solver stopped at a user limit with usable partial state.
    pub fn is_limit(&self) -> bool {
        matches!(
            self,
            SubsolverStatus::SolutionLimit | SubsolverStatus::TimeLimit | SubsolverStatus::NodeLimit
        )
    }

    /// Whether at least one solution may be available.
    pub fn may_have_solution(&self) -> bool {
        matches!(
            self,
            SubsolverStatus::Optimal | SubsolverStatus::Feasible
        ) || self.is_limit()
    }
}

/// Direction of a linear row.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RowSense {
    /// terms · x <= rhs
    LessOrEqual,

    /// terms · x >= rhs
    GreaterOrEqual,
}

/// Per-solve resource limits.
#[derive(Debug, Clone, Copy, Default)]
pub struct SolveLimits {
    /// Wall-clock limit in milliseconds.
    pub time_ms: Option<u64>,

    /// Branch-and-bound node limit.
    pub nodes: Option<u64>,

    /// Stop after this many improving solutions.
    pub solutions: Option<u64>,
}

/// Capability over an external mixed-integer/linear solver.
///
/// Row and column indices are stable for the life of the instance: adding a
/// row never removes or renumbers an existing one. Mutations are safe between
/// solves but not concurrently with one; during a callback-driven solve the
/// only permitted mutation channel is the [`CallbackResponse`] returned from
/// the handler.
pub trait Subsolver {
    /// Add a variable, returning its column index.
    fn add_variable(&mut self, name: &str, var_type: VarType, lower: f64, upper: f64) -> usize;

    /// Add a linear row, returning its row index.
    fn add_linear_constraint(
        &mut self,
        terms: &[(usize, f64)],
        rhs: f64,
        name: &str,
        sense: RowSense,
    ) -> usize;

    /// Add a column participating in the given rows, returning its index.
    /// Used by infeasibility repair to introduce penalized slack columns.
    fn add_column(
        &mut self,
        objective_coefficient: f64,
        rows: &[(usize, f64)],
        lower: f64,
        upper: f64,
    ) -> usize;

    /// Current upper bound (rhs) of a row.
    fn row_upper(&self, row: usize) -> f64;

    /// Replace the upper bound (rhs) of a row.
    fn set_row_upper(&mut self, row: usize, rhs: f64);

    /// Number of rows currently in the relaxation.
    fn num_rows(&self) -> usize;

    /// Number of columns currently in the relaxation.
    fn num_variables(&self) -> usize;

    /// Current bounds of a variable.
    fn variable_bounds(&self, index: usize) -> (f64, f64);

    /// Replace the bounds of a variable.
    fn set_variable_bounds(&mut self, index: usize, lower: f64, upper: f64);

    /// Set the linear objective.
    fn set_objective(&mut self, terms: &[(usize, f64)], constant: f64, minimize: bool);

    /// Solve the current relaxation within the given limits.
    fn solve(&mut self, limits: &SolveLimits) -> SubsolverStatus;

    /// Solve with a reentrant callback. The handler may be invoked from the
    /// solver's worker threads; the solver executes the commands carried by
    /// each [`CallbackResponse`] (lazy row injection, cutoff update, abort)
    /// through its own thread-safe primitives.
    ///
    /// Backends without callback support fall back to a plain solve.
    fn solve_with_callback(
        &mut self,
        limits: &SolveLimits,
        handler: &dyn CallbackHandler,
    ) -> SubsolverStatus {
        let _ = handler;
        self.solve(limits)
    }

    /// Whether the backend can inject lazy rows from a callback.
    fn supports_lazy_rows(&self) -> bool {
        false
    }

    /// Maximum worker threads the backend supports.
    fn max_threads(&self) -> usize {
        1
    }

    /// Set the number of worker threads.
    fn set_threads(&mut self, threads: usize) {
        let _ = threads;
    }

    /// Number of solutions available after the last solve.
    fn num_solutions(&self) -> usize;

    /// Fetch a solution by pool index (0 = best).
    fn solution(&self, index: usize) -> Vec<f64>;

    /// Objective value of a pooled solution in the relaxation.
    fn objective_value(&self, index: usize) -> f64;

    /// Best-possible (dual) objective bound of the last solve.
    fn dual_bound(&self) -> f64;

    /// Nodes explored during the last solve.
    fn explored_nodes(&self) -> u64 {
        0
    }

    /// Open nodes remaining after the last solve.
    fn open_nodes(&self) -> u64 {
        0
    }

    /// Set the objective cutoff for subsequent solves.
    fn set_cutoff(&mut self, value: f64) {
        let _ = value;
    }

    /// Provide a warm-start assignment for the next solve.
    fn set_mip_start(&mut self, assignment: &[(usize, f64)]);

    /// Drop all pending warm starts.
    fn clear_mip_starts(&mut self);

    /// Clone the live relaxation. Infeasibility repair solves on the clone so
    /// the original relaxation is untouched when repair fails.
    fn clone_boxed(&self) -> Box<dyn Subsolver>;

    /// Write the current relaxation to a named file as an opaque text dump.
    fn write_problem(&self, path: &Path) -> DualResult<()> {
        let _ = path;
        Ok(())
    }
}
