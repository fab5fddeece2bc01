//! Message-passing boundary between the subsolver's search and the engine.
//!
//! The subsolver posts typed events from inside its branch-and-bound search;
//! the engine's handler answers with typed commands. Handlers may be invoked
//! reentrantly from parallel worker threads, so implementations guard their
//! mutable state with a single lock.

/// An event posted by the subsolver's search.
#[derive(Debug, Clone)]
pub enum CallbackEvent {
    /// A new integer-feasible incumbent was found.
    NewIncumbent {
        /// The incumbent point in relaxation space.
        point: Vec<f64>,

        /// Its relaxation objective value.
        objective: f64,
    },

    /// The search's best-possible objective bound improved.
    NewDualBound {
        /// The new bound.
        bound: f64,
    },

    /// A node LP relaxation was solved to optimality.
    NodeRelaxationSolved {
        /// The node-relaxation point.
        point: Vec<f64>,
    },

    /// Periodic progress report.
    NodeInfo {
        /// Nodes explored so far.
        explored: u64,

        /// Open nodes remaining.
        open: u64,
    },
}

/// A lazy row command: terms · x <= rhs, injected into the live search.
#[derive(Debug, Clone)]
pub struct LazyRow {
    /// Sparse row coefficients.
    pub terms: Vec<(usize, f64)>,

    /// Right-hand side.
    pub rhs: f64,
}

/// Commands returned to the subsolver from a callback invocation.
#[derive(Debug, Clone, Default)]
pub struct CallbackResponse {
    /// Rows to inject lazily into the in-progress search.
    pub lazy_rows: Vec<LazyRow>,

    /// New objective cutoff, when the incumbent improved.
    pub cutoff: Option<f64>,

    /// Request the search halt at the next safe point. Partial results
    /// (incumbent, bound) remain valid.
    pub abort: bool,
}

impl CallbackResponse {
    /// No action.
    pub fn none() -> Self {
        Self::default()
    }

    /// Abort the search.
    pub fn abort() -> Self {
        Self {
            abort: true,
            ..Self::default()
        }
    }

    /// Whether the response carries no command at all.
    pub fn is_empty(&self) -> bool {
        self.lazy_rows.is_empty() && self.cutoff.is_none() && !self.abort
    }
}

/// Handler for subsolver events. Must be callable from multiple threads.
pub trait CallbackHandler: Sync {
    /// Process one event and answer with commands.
    fn on_event(&self, event: CallbackEvent) -> CallbackResponse;
}

impl<F> CallbackHandler for F
where
    F: Fn(CallbackEvent) -> CallbackResponse + Sync,
{
    fn on_event(&self, event: CallbackEvent) -> CallbackResponse {
        self(event)
    }
}
