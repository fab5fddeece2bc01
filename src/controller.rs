//! The iteration controller driving the cutting-plane loop.
//!
//! One controller instance performs one solve: it drives the subsolver over
//! the evolving relaxation, extracts candidate points, generates supporting
//! hyperplanes, maintains the cutoff and integer cuts, and terminates when
//! the objective gap closes or a limit is reached.

use std::mem;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Instant;

use crate::bounds::BoundTracker;
use crate::context::{DualOutcome, DualStatus, SolveContext};
use crate::cuts::{GeneratedHyperplane, HyperplaneGenerator, HyperplaneSource};
use crate::error::{DualError, DualResult};
use crate::model::{
    ConstraintViolation, DualBoundSource, DualSolution, ObjectiveSense, PrimalSolution,
    PrimalSource, ProblemModel, SolutionPoint,
};
use crate::polish::NlpPolisher;
use crate::relaxation::{
    build_lazy_row, repair_infeasibility, resolve_dual_unbounded, RelaxationManager,
};
use crate::settings::{DualSettings, SolveMode};
use crate::subsolver::{CallbackEvent, CallbackResponse, SolveLimits, Subsolver, SubsolverStatus};

/// A discrete variable is integral if it sits within this of an integer.
const INTEGRALITY_TOLERANCE: f64 = 1e-6;

/// Whether every discrete variable of the problem is integral at `point`.
fn point_is_integer_feasible(problem: &dyn ProblemModel, point: &[f64]) -> bool {
    problem
        .variables()
        .iter()
        .filter(|v| v.var_type.is_discrete())
        .all(|v| {
            point
                .get(v.index)
                .map_or(false, |&x| (x - x.round()).abs() <= INTEGRALITY_TOLERANCE)
        })
}

/// Drives one dual solve over a problem and a subsolver.
pub struct DualController<'p> {
    problem: &'p dyn ProblemModel,
    manager: RelaxationManager,
    generator: HyperplaneGenerator,
    context: SolveContext,
    polisher: Option<Box<dyn NlpPolisher>>,
    start: Instant,
}

impl<'p> DualController<'p> {
    /// Create a controller over a subsolver already loaded with the
    /// problem's variables and linear constraints.
    ///
    /// The requested thread count is clamped to what the subsolver supports,
    /// and the lazy-callback mode degrades to polling (with a logged notice)
    /// when the backend cannot inject lazy rows.
    pub fn new(
        problem: &'p dyn ProblemModel,
        subsolver: Box<dyn Subsolver>,
        mut settings: DualSettings,
    ) -> DualResult<Self> {
        if problem.variables().is_empty() {
            return Err(DualError::InvalidProblem("problem has no variables".into()));
        }
        for v in problem.variables() {
            if v.lower > v.upper {
                return Err(DualError::InvalidProblem(format!(
                    "variable {} has crossed bounds [{}, {}]",
                    v.name, v.lower, v.upper
                )));
            }
        }
        if subsolver.num_variables() < problem.variables().len() {
            return Err(DualError::InvalidProblem(format!(
                "subsolver has {} columns for {} problem variables",
                subsolver.num_variables(),
                problem.variables().len()
            )));
        }

        let mut subsolver = subsolver;
        let threads = settings.threads.clamp(1, subsolver.max_threads());
        if threads != settings.threads {
            log::info!(
                "thread count clamped from {} to {} (subsolver limit)",
                settings.threads,
                threads
            );
            settings.threads = threads;
        }
        subsolver.set_threads(threads);

        if settings.mode == SolveMode::LazyCallback && !subsolver.supports_lazy_rows() {
            log::warn!("subsolver cannot inject lazy rows, falling back to polling mode");
            settings.mode = SolveMode::Polling;
        }

        let sense = problem.sense();
        let manager = RelaxationManager::new(subsolver, sense, settings.cutoff_tolerance);
        let generator = HyperplaneGenerator::new(&settings);
        let bounds = BoundTracker::new(sense, settings.gap_abs_tol, settings.gap_rel_tol);
        let context = SolveContext::new(settings, bounds);

        Ok(Self {
            problem,
            manager,
            generator,
            context,
            polisher: None,
            start: Instant::now(),
        })
    }

    /// Set the relaxation's linear objective. Required before solving: the
    /// objective cutoff row is built from these terms.
    pub fn set_objective(&mut self, terms: Vec<(usize, f64)>, constant: f64) {
        self.manager.set_objective(terms, constant);
    }

    /// Attach a fixed-integer NLP polisher for new incumbents.
    pub fn set_polisher(&mut self, polisher: Box<dyn NlpPolisher>) {
        self.polisher = Some(polisher);
    }

    /// Offer an interior point for the ESH root-search.
    pub fn offer_interior_point(&mut self, point: &[f64]) -> bool {
        self.generator.offer_interior_point(self.problem, point)
    }

    /// A handle that aborts the solve from another thread.
    pub fn abort_handle(&self) -> Arc<AtomicBool> {
        self.context.abort_handle()
    }

    /// The solve state, for inspection.
    pub fn context(&self) -> &SolveContext {
        &self.context
    }

    /// The relaxation manager, for inspection.
    pub fn relaxation(&self) -> &RelaxationManager {
        &self.manager
    }

    /// Run the cutting-plane loop to termination.
    pub fn solve(&mut self) -> DualResult<DualOutcome> {
        self.start = Instant::now();
        let settings = &self.context.settings;
        log::info!(
            "dual solve started: {:?} cuts, {:?} mode, gap tolerance {:.1e}/{:.1e}",
            settings.cut_strategy,
            settings.mode,
            settings.gap_abs_tol,
            settings.gap_rel_tol
        );

        let status = loop {
            if self.context.abort_requested() {
                break DualStatus::Aborted;
            }
            if self.context.bounds.is_gap_met() {
                break DualStatus::Optimal;
            }
            if self.context.iterations.len() as u64 >= self.context.settings.max_iterations {
                break DualStatus::IterationLimit;
            }
            if let Some(limit) = self.context.settings.time_limit_ms {
                if self.start.elapsed().as_millis() as u64 >= limit {
                    break DualStatus::TimeLimit;
                }
            }

            if let Some(terminal) = self.iterate()? {
                break terminal;
            }
        };

        self.context.statistics.total_time_ms = self.start.elapsed().as_millis() as u64;
        log::info!(
            "dual solve finished: {:?} after {} iteration(s), dual {:.8e}, primal {:.8e}",
            status,
            self.context.iterations.len(),
            self.context.bounds.dual_bound(),
            self.context.bounds.primal_bound()
        );

        Ok(DualOutcome {
            status,
            dual_bound: self.context.bounds.dual_bound(),
            primal_bound: self.context.bounds.primal_bound(),
            absolute_gap: self.context.bounds.absolute_gap(),
            relative_gap: self.context.bounds.relative_gap(),
            best_solution: self.context.bounds.best_primal_solution().cloned(),
            iterations: self.context.iterations.len() as u64,
            statistics: self.context.statistics,
        })
    }

    /// One controller iteration. `Ok(Some(status))` terminates the loop.
    fn iterate(&mut self) -> DualResult<Option<DualStatus>> {
        let iter_number = self.context.iterations.create().number;
        let limits = self.per_solve_limits();

        let mut status = match self.context.settings.mode {
            SolveMode::Polling => self.manager.subsolver_mut().solve(&limits),
            SolveMode::LazyCallback => self.solve_with_callback(iter_number, &limits),
        };
        self.context.statistics.subsolver_solves += 1;

        if status == SubsolverStatus::Unbounded {
            self.context.statistics.unbounded_resolutions += 1;
            self.context
                .iterations
                .current_mut()
                .infeasibility_repair_performed = true;
            status = resolve_dual_unbounded(&mut self.manager, self.problem.variables(), &limits);
            self.context.statistics.subsolver_solves += 1;
            if status == SubsolverStatus::Unbounded {
                self.finalize_iteration(status);
                return Ok(Some(DualStatus::Unbounded));
            }
        }

        match status {
            SubsolverStatus::Infeasible => {
                if repair_infeasibility(&mut self.manager, &limits)?.is_some() {
                    self.context.statistics.repairs_performed += 1;
                    let it = self.context.iterations.current_mut();
                    it.infeasibility_repair_performed = true;
                    self.finalize_iteration(status);
                    return Ok(None);
                }
                self.finalize_iteration(status);
                if self.context.bounds.has_primal_solution() {
                    // With valid cuts, an incumbent plus an infeasible
                    // relaxation means the cutoff excluded everything
                    // better: the incumbent is optimal and the gap closes.
                    // An incumbent always implies a cutoff, either the
                    // cutoff row or a native one set during a callback
                    // solve, so the incumbent is the condition to test.
                    let primal = self.context.bounds.primal_bound();
                    self.context.bounds.update_dual(DualSolution {
                        point: None,
                        source: DualBoundSource::MipOptimal,
                        objective_value: primal,
                        iter_found: iter_number,
                    });
                    return Ok(Some(DualStatus::Optimal));
                }
                Ok(Some(DualStatus::Infeasible))
            }
            SubsolverStatus::Error => {
                self.finalize_iteration(status);
                Ok(Some(DualStatus::Error))
            }
            SubsolverStatus::Abort => {
                self.finalize_iteration(status);
                // The callback path aborts the search itself once the gap
                // closes; that is a normal termination, not a user abort.
                if self.context.bounds.is_gap_met() {
                    Ok(Some(DualStatus::Optimal))
                } else {
                    Ok(Some(DualStatus::Aborted))
                }
            }
            SubsolverStatus::Optimal
            | SubsolverStatus::Feasible
            | SubsolverStatus::SolutionLimit
            | SubsolverStatus::TimeLimit
            | SubsolverStatus::NodeLimit => {
                let progress = self.process_solutions(status, iter_number)?;
                self.finalize_iteration(status);
                if !progress && !self.context.bounds.is_gap_met() && !status.is_limit() {
                    log::warn!(
                        "iteration {} made no progress (no cut, no bound improvement), stopping",
                        iter_number
                    );
                    return Ok(Some(DualStatus::Error));
                }
                Ok(None)
            }
            SubsolverStatus::Unbounded => Ok(Some(DualStatus::Unbounded)),
        }
    }

    /// Pull candidate points from the last solve, update bounds, and add
    /// cuts for the infeasible ones. Returns whether anything moved.
    fn process_solutions(&mut self, status: SubsolverStatus, iter: u64) -> DualResult<bool> {
        let sub = self.manager.subsolver();
        let count = sub
            .num_solutions()
            .min(self.context.settings.solution_pool_capacity);
        if count == 0 {
            log::warn!("solver reported {:?} but returned no solution", status);
            return Ok(false);
        }

        let points: Vec<Vec<f64>> = (0..count).map(|i| sub.solution(i)).collect();
        let relaxation_objective = sub.objective_value(0);
        let dual_candidate = if status == SubsolverStatus::Optimal {
            Some((relaxation_objective, DualBoundSource::MipOptimal))
        } else {
            let bound = sub.dual_bound();
            bound
                .is_finite()
                .then_some((bound, DualBoundSource::SubsolverBound))
        };
        let explored = sub.explored_nodes();
        let open = sub.open_nodes();

        self.context.statistics.explored_nodes += explored;
        {
            let it = self.context.iterations.current_mut();
            it.explored_nodes = explored;
            it.open_nodes = open;
            it.objective_value = relaxation_objective;
        }

        let mut progress = false;
        if let Some((value, source)) = dual_candidate {
            progress |= self.context.bounds.update_dual(DualSolution {
                point: (source == DualBoundSource::MipOptimal).then(|| points[0].clone()),
                source,
                objective_value: value,
                iter_found: iter,
            });
        }

        let mut cut_budget = self.context.settings.max_hyperplanes_per_iteration;
        let mut hyperplanes_added = 0usize;
        let mut hyperplanes_rejected = 0u64;
        let mut integer_cuts_added = 0usize;

        for (i, point) in points.iter().enumerate() {
            let candidate = self.evaluate_point(point, iter);

            if candidate.is_nonlinearly_feasible(self.context.settings.constraint_tolerance) {
                let source = if i == 0 && status == SubsolverStatus::Optimal {
                    PrimalSource::MipOptimal
                } else {
                    PrimalSource::MipSolutionPool
                };
                progress |= self.accept_primal(candidate, source);
                self.generator.offer_interior_point(self.problem, point);
                continue;
            }

            if cut_budget > 0 {
                let source = if i == 0 {
                    HyperplaneSource::MipOptimalSolutionPoint
                } else {
                    HyperplaneSource::MipSolutionPoolSolutionPoint
                };
                let cuts = self.generator.generate(self.problem, point, source, cut_budget);

                for boundary in &cuts.feasible_points {
                    if point_is_integer_feasible(self.problem, boundary) {
                        let candidate = self.evaluate_point(boundary, iter);
                        progress |= self.accept_primal(candidate, PrimalSource::RootSearch);
                    }
                }

                for hp in cuts.hyperplanes {
                    if cut_budget == 0 {
                        break;
                    }
                    if self.manager.add_hyperplane(self.problem, hp, iter)? {
                        hyperplanes_added += 1;
                        cut_budget -= 1;
                    } else {
                        hyperplanes_rejected += 1;
                    }
                }
            }

            // Forbid revisiting the first (best) infeasible assignment.
            if i == 0
                && self.context.settings.use_integer_cuts
                && self
                    .manager
                    .add_integer_cut(point, self.problem.variables())?
            {
                integer_cuts_added += 1;
            }
        }

        self.context.statistics.hyperplanes_added += hyperplanes_added as u64;
        self.context.statistics.hyperplanes_rejected += hyperplanes_rejected;
        self.context.statistics.integer_cuts_added += integer_cuts_added as u64;
        {
            let it = self.context.iterations.current_mut();
            it.hyperplanes_added += hyperplanes_added;
            it.integer_cuts_added += integer_cuts_added;
        }

        progress |= hyperplanes_added > 0 || integer_cuts_added > 0;
        Ok(progress)
    }

    /// True objective and worst nonlinear violation at a point.
    fn evaluate_point(&self, point: &[f64], iter: u64) -> SolutionPoint {
        SolutionPoint {
            point: point.to_vec(),
            objective_value: self.problem.objective_value(point),
            max_deviation: self.problem.max_deviation(point),
            iter_found: iter,
        }
    }

    /// Accept a candidate as incumbent when it is integral, nonlinearly
    /// feasible and strictly better. Tightens the cutoff and polishes on
    /// improvement.
    fn accept_primal(&mut self, candidate: SolutionPoint, source: PrimalSource) -> bool {
        if !candidate.is_nonlinearly_feasible(self.context.settings.constraint_tolerance)
            || !point_is_integer_feasible(self.problem, &candidate.point)
        {
            return false;
        }

        let accepted = self.context.bounds.update_primal(PrimalSolution {
            point: candidate.point.clone(),
            source,
            objective_value: candidate.objective_value,
            iter_found: candidate.iter_found,
            max_deviation: candidate.max_deviation,
        });

        if accepted {
            self.manager.update_cutoff(self.context.bounds.primal_bound());
            self.warm_start(&candidate.point);
            self.try_polish(&candidate);
        }
        accepted
    }

    /// Hand the incumbent to the subsolver as the warm start for the next
    /// relaxation solve.
    fn warm_start(&mut self, point: &[f64]) {
        let assignment: Vec<(usize, f64)> =
            point.iter().copied().enumerate().collect();
        let sub = self.manager.subsolver_mut();
        sub.clear_mip_starts();
        sub.set_mip_start(&assignment);
    }

    /// Run the NLP polisher on a fresh incumbent, if one is attached.
    fn try_polish(&mut self, incumbent: &SolutionPoint) {
        let Some(mut polisher) = self.polisher.take() else {
            return;
        };

        match polisher.polish(self.problem, &incumbent.point) {
            Ok(Some(point)) => {
                let polished = self.evaluate_point(&point, incumbent.iter_found);
                if polished
                    .is_nonlinearly_feasible(self.context.settings.constraint_tolerance)
                    && point_is_integer_feasible(self.problem, &polished.point)
                    && self.context.bounds.update_primal(PrimalSolution {
                        point: polished.point.clone(),
                        source: PrimalSource::NlpPolish,
                        objective_value: polished.objective_value,
                        iter_found: polished.iter_found,
                        max_deviation: polished.max_deviation,
                    })
                {
                    self.manager.update_cutoff(self.context.bounds.primal_bound());
                }
            }
            Ok(None) => {}
            Err(err) => log::warn!("incumbent polish failed: {}", err),
        }

        self.polisher = Some(polisher);
    }

    /// Per-solve limits from the settings and the remaining wall clock.
    fn per_solve_limits(&self) -> SolveLimits {
        let time_ms = self.context.settings.time_limit_ms.map(|limit| {
            limit.saturating_sub(self.start.elapsed().as_millis() as u64).max(1)
        });
        SolveLimits {
            time_ms,
            nodes: self.context.settings.node_limit,
            solutions: self.context.settings.solution_limit,
        }
    }

    /// Finalize the current iteration record and log progress.
    fn finalize_iteration(&mut self, status: SubsolverStatus) {
        let dual = self.context.bounds.dual_bound();
        let primal = self.context.bounds.primal_bound();
        let gap = self.context.bounds.relative_gap();
        let log_freq = self.context.settings.log_freq.max(1);
        let verbose = self.context.settings.verbose;

        let it = self.context.iterations.current_mut();
        it.solve_status = Some(status);
        it.objective_bounds = (dual, primal);
        it.is_solved = true;

        if verbose && it.number % log_freq == 0 {
            log::info!(
                "iter {:>4}  {:?}  dual {:>14.6e}  primal {:>14.6e}  gap {:>9.2e}  cuts {:>3}",
                it.number,
                status,
                dual,
                primal,
                gap,
                it.hyperplanes_added + it.relaxed_lazy_hyperplanes_added
            );
        }
    }

    /// Callback-driven solve: the handler answers subsolver events with lazy
    /// rows, cutoff updates and abort requests, all behind one lock.
    fn solve_with_callback(&mut self, iter: u64, limits: &SolveLimits) -> SubsolverStatus {
        let settings = self.context.settings.clone();
        let generator = mem::replace(&mut self.generator, HyperplaneGenerator::new(&settings));

        let state = Mutex::new(LazyState {
            generator,
            pending: Vec::new(),
            incumbents: Vec::new(),
            lazy_added: 0,
            rejected: 0,
            events: 0,
            primal_bound: self.context.bounds.primal_bound(),
            dual_bound: self.context.bounds.dual_bound(),
            explored: 0,
            open: 0,
            iteration: iter,
        });

        let problem = self.problem;
        let sense = self.problem.sense();
        let abort = self.context.abort_handle();

        let handler = |event: CallbackEvent| -> CallbackResponse {
            let mut guard = match state.lock() {
                Ok(g) => g,
                Err(poisoned) => poisoned.into_inner(),
            };
            guard.on_event(problem, &settings, sense, &abort, event)
        };

        let status = self
            .manager
            .subsolver_mut()
            .solve_with_callback(limits, &handler);

        let lazy = match state.into_inner() {
            Ok(s) => s,
            Err(poisoned) => poisoned.into_inner(),
        };
        self.generator = lazy.generator;

        let lazy_count = lazy.pending.len();
        self.manager.record_lazy(lazy.pending);
        self.context.statistics.lazy_hyperplanes_added += lazy_count as u64;
        self.context.statistics.hyperplanes_rejected += lazy.rejected;
        self.context.statistics.callback_events += lazy.events;
        {
            let it = self.context.iterations.current_unsolved_mut();
            it.relaxed_lazy_hyperplanes_added = lazy_count;
            it.explored_nodes = lazy.explored;
            it.open_nodes = lazy.open;
        }

        for incumbent in lazy.incumbents {
            if self.context.bounds.update_primal(incumbent) {
                self.manager.update_cutoff(self.context.bounds.primal_bound());
            }
        }
        if lazy.dual_bound.is_finite() {
            self.context.bounds.update_dual(DualSolution {
                point: None,
                source: DualBoundSource::SubsolverBound,
                objective_value: lazy.dual_bound,
                iter_found: iter,
            });
        }

        status
    }
}

/// Handler state for one callback-driven solve. Lives behind a single lock
/// because the subsolver may post events from parallel worker threads.
struct LazyState {
    generator: HyperplaneGenerator,

    /// Registry records for injected lazy rows, merged after the solve.
    pending: Vec<GeneratedHyperplane>,

    /// Feasible incumbents discovered during the solve.
    incumbents: Vec<PrimalSolution>,

    lazy_added: usize,
    rejected: u64,
    events: u64,
    primal_bound: f64,
    dual_bound: f64,
    explored: u64,
    open: u64,
    iteration: u64,
}

impl LazyState {
    fn on_event(
        &mut self,
        problem: &dyn ProblemModel,
        settings: &DualSettings,
        sense: ObjectiveSense,
        abort: &AtomicBool,
        event: CallbackEvent,
    ) -> CallbackResponse {
        self.events += 1;
        if abort.load(Ordering::Relaxed) {
            return CallbackResponse::abort();
        }

        match event {
            CallbackEvent::NewIncumbent { point, objective } => {
                let deviation = problem.max_deviation(&point);
                let feasible =
                    deviation.map_or(true, |d| d.value <= settings.constraint_tolerance);

                if !feasible {
                    log::debug!(
                        "callback incumbent at relaxation objective {:.6e} violates nonlinear constraints",
                        objective
                    );
                    return self.cut_response(problem, settings, sense, &point);
                }

                self.incumbent_response(problem, settings, sense, point, deviation)
            }
            CallbackEvent::NewDualBound { bound } => {
                let improves = bound.is_finite()
                    && match sense {
                        ObjectiveSense::Minimize => bound > self.dual_bound,
                        ObjectiveSense::Maximize => bound < self.dual_bound,
                    };
                if improves {
                    self.dual_bound = bound;
                }
                if self.gap_met(settings) {
                    CallbackResponse::abort()
                } else {
                    CallbackResponse::none()
                }
            }
            CallbackEvent::NodeRelaxationSolved { point } => {
                let feasible = problem
                    .max_deviation(&point)
                    .map_or(true, |d| d.value <= settings.constraint_tolerance);
                if feasible {
                    self.generator.offer_interior_point(problem, &point);
                    CallbackResponse::none()
                } else {
                    self.cut_response(problem, settings, sense, &point)
                }
            }
            CallbackEvent::NodeInfo { explored, open } => {
                self.explored = explored;
                self.open = open;
                CallbackResponse::none()
            }
        }
    }

    /// A nonlinearly feasible incumbent: accept it only when it strictly
    /// improves on the best objective recorded so far, then tighten the
    /// cutoff and abort early if the gap is closed.
    fn incumbent_response(
        &mut self,
        problem: &dyn ProblemModel,
        settings: &DualSettings,
        sense: ObjectiveSense,
        point: Vec<f64>,
        deviation: Option<ConstraintViolation>,
    ) -> CallbackResponse {
        let objective = problem.objective_value(&point);
        if !sense.is_better(objective, self.primal_bound) {
            return CallbackResponse::none();
        }

        self.primal_bound = objective;
        self.incumbents.push(PrimalSolution {
            point,
            source: PrimalSource::LazyConstraintCallback,
            objective_value: objective,
            iter_found: self.iteration,
            max_deviation: deviation,
        });

        let cutoff = match sense {
            ObjectiveSense::Minimize => objective + settings.cutoff_tolerance,
            ObjectiveSense::Maximize => objective - settings.cutoff_tolerance,
        };
        CallbackResponse {
            lazy_rows: Vec::new(),
            cutoff: Some(cutoff),
            abort: self.gap_met(settings),
        }
    }

    /// Cut an infeasible callback point, within the lazy budget. Boundary
    /// points found by the root-search along the way are feasible; when they
    /// are also integral they become incumbents.
    fn cut_response(
        &mut self,
        problem: &dyn ProblemModel,
        settings: &DualSettings,
        sense: ObjectiveSense,
        point: &[f64],
    ) -> CallbackResponse {
        if self.lazy_added >= settings.max_lazy_hyperplanes {
            return CallbackResponse::none();
        }
        let budget = settings.max_lazy_hyperplanes - self.lazy_added;

        let cuts = self.generator.generate(
            problem,
            point,
            HyperplaneSource::LazyConstraintCallback,
            budget,
        );

        let mut cutoff = None;
        for boundary in &cuts.feasible_points {
            if !point_is_integer_feasible(problem, boundary) {
                continue;
            }
            let objective = problem.objective_value(boundary);
            if sense.is_better(objective, self.primal_bound) {
                self.primal_bound = objective;
                self.incumbents.push(PrimalSolution {
                    point: boundary.clone(),
                    source: PrimalSource::RootSearch,
                    objective_value: objective,
                    iter_found: self.iteration,
                    max_deviation: problem.max_deviation(boundary),
                });
                cutoff = Some(match sense {
                    ObjectiveSense::Minimize => objective + settings.cutoff_tolerance,
                    ObjectiveSense::Maximize => objective - settings.cutoff_tolerance,
                });
            }
        }

        let mut rows = Vec::new();
        for hp in &cuts.hyperplanes {
            match build_lazy_row(problem, hp, self.iteration) {
                Some((row, record)) => {
                    rows.push(row);
                    self.pending.push(record);
                    self.lazy_added += 1;
                }
                None => self.rejected += 1,
            }
        }

        CallbackResponse {
            lazy_rows: rows,
            cutoff,
            abort: self.gap_met(settings),
        }
    }

    fn gap_met(&self, settings: &DualSettings) -> bool {
        if !self.primal_bound.is_finite() || !self.dual_bound.is_finite() {
            return false;
        }
        let abs = (self.primal_bound - self.dual_bound).abs();
        abs <= settings.gap_abs_tol || abs / (1e-10 + self.primal_bound.abs()) <= settings.gap_rel_tol
    }
}
