//! Shared solve state: bounds, iteration history and run statistics.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use crate::bounds::BoundTracker;
use crate::iteration::IterationHistory;
use crate::model::PrimalSolution;
use crate::settings::DualSettings;

/// Terminal status of a dual solve.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DualStatus {
    /// The gap tolerance was met.
    Optimal,

    /// The relaxation (with all generated cuts) is infeasible, and repair
    /// could not restore it. For a convex problem this proves the original
    /// problem infeasible.
    Infeasible,

    /// The relaxation stayed unbounded even after confining sentinel-bounded
    /// variables.
    Unbounded,

    /// Stopped at the iteration limit.
    IterationLimit,

    /// Stopped at the time limit.
    TimeLimit,

    /// Aborted on request.
    Aborted,

    /// The subsolver failed.
    Error,
}

impl DualStatus {
    /// Whether the reported bounds are meaningful (the run terminated
    /// normally or at a limit rather than by failure).
    pub fn has_valid_bounds(&self) -> bool {
        !matches!(self, DualStatus::Error)
    }
}

/// Counters accumulated over a solve.
#[derive(Debug, Clone, Copy, Default)]
pub struct SolveStatistics {
    /// Relaxation solves performed.
    pub subsolver_solves: u64,

    /// Eager hyperplane rows added.
    pub hyperplanes_added: u64,

    /// Lazy hyperplane rows injected through callbacks.
    pub lazy_hyperplanes_added: u64,

    /// Hyperplane candidates discarded before reaching the subsolver
    /// (empty gradient or non-finite coefficients).
    pub hyperplanes_rejected: u64,

    /// Callback events handled during lazy solves.
    pub callback_events: u64,

    /// Integer cuts added.
    pub integer_cuts_added: u64,

    /// Infeasibility repairs that relaxed at least one row.
    pub repairs_performed: u64,

    /// Unbounded relaxations resolved by temporary bound confinement.
    pub unbounded_resolutions: u64,

    /// Total branch-and-bound nodes explored, when reported.
    pub explored_nodes: u64,

    /// Wall-clock time of the solve, milliseconds.
    pub total_time_ms: u64,
}

/// Result of a dual solve.
#[derive(Debug)]
pub struct DualOutcome {
    /// Terminal status.
    pub status: DualStatus,

    /// Best certified dual bound.
    pub dual_bound: f64,

    /// Best feasible objective value.
    pub primal_bound: f64,

    /// |primal - dual| at termination.
    pub absolute_gap: f64,

    /// Absolute gap scaled by the primal bound magnitude.
    pub relative_gap: f64,

    /// Best incumbent, when one was found.
    pub best_solution: Option<PrimalSolution>,

    /// Controller iterations performed.
    pub iterations: u64,

    /// Run counters.
    pub statistics: SolveStatistics,
}

impl DualOutcome {
    /// Whether a feasible incumbent was found.
    pub fn has_solution(&self) -> bool {
        self.best_solution.is_some()
    }
}

/// Mutable state threaded through one solve.
pub struct SolveContext {
    /// Engine settings, fixed for the solve.
    pub settings: DualSettings,

    /// Canonical dual/primal bounds.
    pub bounds: BoundTracker,

    /// Iteration records.
    pub iterations: IterationHistory,

    /// Run counters.
    pub statistics: SolveStatistics,

    abort: Arc<AtomicBool>,
}

impl SolveContext {
    /// Create the state for one solve.
    pub fn new(settings: DualSettings, bounds: BoundTracker) -> Self {
        Self {
            settings,
            bounds,
            iterations: IterationHistory::new(),
            statistics: SolveStatistics::default(),
            abort: Arc::new(AtomicBool::new(false)),
        }
    }

    /// A handle that can request an abort from another thread.
    pub fn abort_handle(&self) -> Arc<AtomicBool> {
        Arc::clone(&self.abort)
    }

    /// Whether an abort has been requested.
    pub fn abort_requested(&self) -> bool {
        self.abort.load(Ordering::Relaxed)
    }

    /// Request the solve stop at the next safe point.
    pub fn request_abort(&self) {
        self.abort.store(true, Ordering::Relaxed);
    }
}
