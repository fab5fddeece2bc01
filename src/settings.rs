//! Configuration settings for the dual engine.

/// Hyperplane cut strategy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CutStrategy {
    /// Extended supporting hyperplanes: linearize at the boundary point found
    /// by root-search between an interior point and the candidate.
    #[default]
    Esh,

    /// Extended cutting planes: linearize directly at the candidate point.
    Ecp,
}

/// How the controller interacts with the subsolver.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SolveMode {
    /// Solve the relaxation to completion (or a limit), pull candidates,
    /// add cuts eagerly, re-solve.
    #[default]
    Polling,

    /// Let the subsolver's own branch-and-bound invoke the engine through a
    /// callback and inject cuts as lazy rows without restarting the search.
    LazyCallback,
}

/// Settings for the 1-D boundary root-search.
#[derive(Debug, Clone)]
pub struct RootSearchSettings {
    /// Maximum bisection iterations.
    pub max_iterations: usize,

    /// Terminate when the bracket width falls below this.
    pub lambda_tolerance: f64,

    /// Terminate when the violation magnitude falls below this.
    pub violation_tolerance: f64,
}

impl Default for RootSearchSettings {
    fn default() -> Self {
        Self {
            max_iterations: 100,
            lambda_tolerance: 1e-6,
            violation_tolerance: 1e-8,
        }
    }
}

/// Dual engine settings.
#[derive(Debug, Clone)]
pub struct DualSettings {
    // === Termination criteria ===
    /// Maximum number of controller iterations.
    pub max_iterations: u64,

    /// Time limit in milliseconds (None = unlimited).
    pub time_limit_ms: Option<u64>,

    /// Absolute objective gap tolerance.
    /// Stop when |primal - dual| <= gap_abs_tol.
    pub gap_abs_tol: f64,

    /// Relative objective gap tolerance.
    /// Stop when |primal - dual| / (1e-10 + |primal|) <= gap_rel_tol.
    pub gap_rel_tol: f64,

    /// A point is nonlinearly feasible if its largest normalized constraint
    /// violation is at most this.
    pub constraint_tolerance: f64,

    // === Cut generation ===
    /// Cut strategy (ESH or ECP).
    pub cut_strategy: CutStrategy,

    /// Maximum hyperplanes generated per iteration.
    pub max_hyperplanes_per_iteration: usize,

    /// Keep every constraint whose violation is at least this fraction of the
    /// most violated one when selecting cut candidates. Zero keeps every
    /// violated constraint.
    pub constraint_selection_factor: f64,

    /// Maximum lazy hyperplanes injected per iteration from node-relaxation
    /// callbacks.
    pub max_lazy_hyperplanes: usize,

    /// Forbid revisiting integer assignments that turned out nonlinearly
    /// infeasible by adding no-good cuts.
    pub use_integer_cuts: bool,

    /// Root-search settings.
    pub rootsearch: RootSearchSettings,

    // === Subsolver interaction ===
    /// How the controller drives the subsolver.
    pub mode: SolveMode,

    /// Offset applied to the primal bound when tightening the cutoff.
    pub cutoff_tolerance: f64,

    /// Number of solutions fetched from the subsolver's pool per solve.
    pub solution_pool_capacity: usize,

    /// Node limit per relaxation solve (None = unlimited).
    pub node_limit: Option<u64>,

    /// Solution limit per relaxation solve (None = unlimited).
    pub solution_limit: Option<u64>,

    /// Requested subsolver threads. Clamped to what the subsolver supports.
    pub threads: usize,

    // === Output ===
    /// Print progress information.
    pub verbose: bool,

    /// Log frequency (log every N iterations).
    pub log_freq: u64,
}

impl Default for DualSettings {
    fn default() -> Self {
        Self {
            max_iterations: 2000,
            time_limit_ms: None,
            gap_abs_tol: 1e-3,
            gap_rel_tol: 1e-3,
            constraint_tolerance: 1e-8,

            cut_strategy: CutStrategy::default(),
            max_hyperplanes_per_iteration: 200,
            constraint_selection_factor: 0.0,
            max_lazy_hyperplanes: 50,
            use_integer_cuts: false,
            rootsearch: RootSearchSettings::default(),

            mode: SolveMode::default(),
            cutoff_tolerance: 1e-6,
            solution_pool_capacity: 10,
            node_limit: None,
            solution_limit: None,
            threads: 1,

            verbose: false,
            log_freq: 10,
        }
    }
}

impl DualSettings {
    /// Create settings with verbose output enabled.
    pub fn verbose() -> Self {
        let mut s = Self::default();
        s.verbose = true;
        s.log_freq = 1;
        s
    }

    /// Set time limit in seconds.
    pub fn with_time_limit(mut self, seconds: f64) -> Self {
        self.time_limit_ms = Some((seconds * 1000.0) as u64);
        self
    }

    /// Set maximum controller iterations.
    pub fn with_max_iterations(mut self, iterations: u64) -> Self {
        self.max_iterations = iterations;
        self
    }

    /// Set relative gap tolerance.
    pub fn with_gap_tol(mut self, tol: f64) -> Self {
        self.gap_rel_tol = tol;
        self
    }

    /// Set the cut strategy.
    pub fn with_cut_strategy(mut self, strategy: CutStrategy) -> Self {
        self.cut_strategy = strategy;
        self
    }

    /// Set the solve mode.
    pub fn with_mode(mut self, mode: SolveMode) -> Self {
        self.mode = mode;
        self
    }
}
