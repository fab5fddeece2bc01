//! Controller iteration records.

use crate::subsolver::SubsolverStatus;

/// One pass of the iteration controller.
///
/// Iterations are append-only: the callback path creates a fresh record when
/// the current one is already finalized, it never overwrites one.
#[derive(Debug, Clone)]
pub struct Iteration {
    /// 1-based iteration number.
    pub number: u64,

    /// Relaxation solve status, once known.
    pub solve_status: Option<SubsolverStatus>,

    /// (dual bound, primal bound) snapshot at finalization.
    pub objective_bounds: (f64, f64),

    /// Relaxation objective value of the iteration's best candidate.
    pub objective_value: f64,

    /// Eager hyperplanes added this iteration.
    pub hyperplanes_added: usize,

    /// Lazy hyperplanes injected from node-relaxation callbacks this
    /// iteration.
    pub relaxed_lazy_hyperplanes_added: usize,

    /// Integer cuts added this iteration.
    pub integer_cuts_added: usize,

    /// Whether the iteration's relaxation solve and cut step completed.
    pub is_solved: bool,

    /// Whether infeasibility (or dual-unboundedness) repair ran.
    pub infeasibility_repair_performed: bool,

    /// Nodes explored by the subsolver during this iteration, when reported.
    pub explored_nodes: u64,

    /// Open nodes remaining in the subsolver, when reported.
    pub open_nodes: u64,
}

impl Iteration {
    fn new(number: u64) -> Self {
        Self {
            number,
            solve_status: None,
            objective_bounds: (f64::NEG_INFINITY, f64::INFINITY),
            objective_value: f64::NAN,
            hyperplanes_added: 0,
            relaxed_lazy_hyperplanes_added: 0,
            integer_cuts_added: 0,
            is_solved: false,
            infeasibility_repair_performed: false,
            explored_nodes: 0,
            open_nodes: 0,
        }
    }
}

/// Ordered, append-only iteration sequence.
#[derive(Debug, Default)]
pub struct IterationHistory {
    iterations: Vec<Iteration>,
}

impl IterationHistory {
    /// Create an empty history.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append and return a new iteration.
    pub fn create(&mut self) -> &mut Iteration {
        let number = self.iterations.len() as u64 + 1;
        self.iterations.push(Iteration::new(number));
        self.iterations.last_mut().unwrap()
    }

    /// The current (latest) iteration, creating the first one if needed.
    pub fn current_mut(&mut self) -> &mut Iteration {
        if self.iterations.is_empty() {
            return self.create();
        }
        self.iterations.last_mut().unwrap()
    }

    /// The current (latest) iteration.
    pub fn current(&self) -> Option<&Iteration> {
        self.iterations.last()
    }

    /// If the current iteration is already finalized, start a new one.
    /// Used by the callback path so candidates never overwrite a record.
    pub fn current_unsolved_mut(&mut self) -> &mut Iteration {
        let needs_new = self.iterations.last().map_or(true, |it| it.is_solved);
        if needs_new {
            self.create()
        } else {
            self.iterations.last_mut().unwrap()
        }
    }

    /// Number of iterations so far.
    pub fn len(&self) -> usize {
        self.iterations.len()
    }

    /// Whether no iteration exists yet.
    pub fn is_empty(&self) -> bool {
        self.iterations.is_empty()
    }

    /// All iterations in order.
    pub fn iter(&self) -> impl Iterator<Item = &Iteration> {
        self.iterations.iter()
    }
}
