//! End-to-end tests of the polling-mode cutting-plane loop.

mod common;

use common::{init_logging, BinaryDiskProblem, DiskProblem, PolyLp};
use polycut::model::{ObjectiveSense, ProblemModel, VarType, Variable};
use polycut::subsolver::Subsolver;
use polycut::{CutStrategy, DualController, DualSettings, DualStatus};

const SQRT2: f64 = std::f64::consts::SQRT_2;

#[test]
fn test_esh_converges_on_disk() {
    init_logging();
    let problem = DiskProblem::new([1.0, 1.0], ObjectiveSense::Minimize);
    let mut controller = DualController::new(
        &problem,
        Box::new(problem.subsolver()),
        DualSettings::default().with_cut_strategy(CutStrategy::Esh),
    )
    .unwrap();
    controller.set_objective(problem.objective_terms(), 0.0);
    assert!(controller.offer_interior_point(&[0.0, 0.0]));

    let outcome = controller.solve().unwrap();

    // min x + y over the disk of radius 2: optimum -2*sqrt(2) at (-r, -r)
    assert_eq!(outcome.status, DualStatus::Optimal);
    assert!((outcome.primal_bound - (-2.0 * SQRT2)).abs() < 1e-2);
    assert!(outcome.dual_bound <= outcome.primal_bound + 1e-3);
    assert!(outcome.absolute_gap <= 1e-3 || outcome.relative_gap <= 1e-3);
    assert!(outcome.statistics.hyperplanes_added > 0);
    assert_eq!(outcome.statistics.hyperplanes_rejected, 0);

    let best = outcome.best_solution.unwrap();
    assert!((best.point[0] + SQRT2).abs() < 1e-2);
    assert!((best.point[1] + SQRT2).abs() < 1e-2);
}

#[test]
fn test_esh_converges_with_skewed_objective() {
    init_logging();
    let problem = DiskProblem::new([1.0, 2.0], ObjectiveSense::Minimize);
    let mut controller = DualController::new(
        &problem,
        Box::new(problem.subsolver()),
        DualSettings::default().with_cut_strategy(CutStrategy::Esh),
    )
    .unwrap();
    controller.set_objective(problem.objective_terms(), 0.0);
    controller.offer_interior_point(&[0.0, 0.0]);

    let outcome = controller.solve().unwrap();

    // Optimum is -2 * ||(1, 2)|| = -2 * sqrt(5)
    let expected = -2.0 * 5.0_f64.sqrt();
    assert_eq!(outcome.status, DualStatus::Optimal);
    assert!((outcome.primal_bound - expected).abs() < 5e-2);
    assert!(outcome.dual_bound <= outcome.primal_bound + 1e-3);
}

#[test]
fn test_ecp_converges_without_interior_point() {
    init_logging();
    let problem = DiskProblem::new([1.0, 1.0], ObjectiveSense::Minimize);
    let mut settings = DualSettings::default()
        .with_cut_strategy(CutStrategy::Ecp)
        .with_max_iterations(500);
    // ECP candidates approach the boundary from outside; a softer
    // feasibility tolerance lets them become incumbents.
    settings.constraint_tolerance = 1e-4;

    let mut controller =
        DualController::new(&problem, Box::new(problem.subsolver()), settings).unwrap();
    controller.set_objective(problem.objective_terms(), 0.0);

    let outcome = controller.solve().unwrap();

    assert_eq!(outcome.status, DualStatus::Optimal);
    assert!((outcome.primal_bound - (-2.0 * SQRT2)).abs() < 1e-2);
    assert!(outcome.statistics.hyperplanes_added > 1);
}

#[test]
fn test_maximization_sense() {
    init_logging();
    let problem = DiskProblem::new([1.0, 1.0], ObjectiveSense::Maximize);
    let mut controller = DualController::new(
        &problem,
        Box::new(problem.subsolver()),
        DualSettings::default().with_cut_strategy(CutStrategy::Esh),
    )
    .unwrap();
    controller.set_objective(problem.objective_terms(), 0.0);
    controller.offer_interior_point(&[0.0, 0.0]);

    let outcome = controller.solve().unwrap();

    assert_eq!(outcome.status, DualStatus::Optimal);
    assert!((outcome.primal_bound - 2.0 * SQRT2).abs() < 1e-2);
    // For maximization the dual bound descends toward the optimum
    assert!(outcome.dual_bound >= outcome.primal_bound - 1e-3);
}

#[test]
fn test_binary_variable_with_nonlinear_constraint() {
    init_logging();
    let problem = BinaryDiskProblem::new();
    let mut controller = DualController::new(
        &problem,
        Box::new(problem.subsolver()),
        DualSettings::default().with_cut_strategy(CutStrategy::Esh),
    )
    .unwrap();
    controller.set_objective(problem.objective_terms(), 0.0);
    controller.offer_interior_point(&[0.0, 0.0]);

    let outcome = controller.solve().unwrap();

    // y binary: optimum is (-2, 0) with objective -2
    assert_eq!(outcome.status, DualStatus::Optimal);
    assert!((outcome.primal_bound - (-2.0)).abs() < 1e-3);

    let best = outcome.best_solution.unwrap();
    assert!((best.point[0] + 2.0).abs() < 1e-3);
    assert!(best.point[1].abs() < 1e-6);
}

/// Two binaries with x + y - 1.5 <= 0 as the nonlinear constraint and
/// objective -(x + y): the assignment (1, 1) must be cut away.
struct ForbiddenPair {
    vars: Vec<Variable>,
}

impl ForbiddenPair {
    fn new() -> Self {
        Self {
            vars: vec![
                Variable::new(0, "x", VarType::Binary, 0.0, 1.0),
                Variable::new(1, "y", VarType::Binary, 0.0, 1.0),
            ],
        }
    }
}

impl ProblemModel for ForbiddenPair {
    fn variables(&self) -> &[Variable] {
        &self.vars
    }
    fn num_nonlinear_constraints(&self) -> usize {
        1
    }
    fn evaluate(&self, _constraint: usize, point: &[f64]) -> f64 {
        point[0] + point[1] - 1.5
    }
    fn gradient(&self, _constraint: usize, _point: &[f64]) -> Vec<(usize, f64)> {
        vec![(0, 1.0), (1, 1.0)]
    }
    fn is_convex_source(&self, _constraint: usize) -> bool {
        true
    }
    fn objective_value(&self, point: &[f64]) -> f64 {
        -(point[0] + point[1])
    }
    fn sense(&self) -> ObjectiveSense {
        ObjectiveSense::Minimize
    }
}

#[test]
fn test_integer_cut_excludes_infeasible_assignment() {
    init_logging();
    let problem = ForbiddenPair::new();
    let mut lp = PolyLp::new();
    for v in problem.variables() {
        lp.add_variable(&v.name, v.var_type, v.lower, v.upper);
    }

    let mut settings = DualSettings::default().with_cut_strategy(CutStrategy::Ecp);
    settings.use_integer_cuts = true;

    let mut controller = DualController::new(&problem, Box::new(lp), settings).unwrap();
    controller.set_objective(vec![(0, -1.0), (1, -1.0)], 0.0);

    let outcome = controller.solve().unwrap();

    assert_eq!(outcome.status, DualStatus::Optimal);
    // (1, 1) is excluded; the best remaining assignment has objective -1
    assert!((outcome.primal_bound - (-1.0)).abs() < 1e-6);
    assert!(outcome.statistics.integer_cuts_added >= 1);

    let best = outcome.best_solution.unwrap();
    assert!((best.point[0] + best.point[1] - 1.0).abs() < 1e-6);
}

/// One variable in [0, 3] with x + 5 <= 0: no feasible point exists, and a
/// single cut proves it.
struct HalfLine {
    vars: Vec<Variable>,
}

impl ProblemModel for HalfLine {
    fn variables(&self) -> &[Variable] {
        &self.vars
    }
    fn num_nonlinear_constraints(&self) -> usize {
        1
    }
    fn evaluate(&self, _constraint: usize, point: &[f64]) -> f64 {
        point[0] + 5.0
    }
    fn gradient(&self, _constraint: usize, _point: &[f64]) -> Vec<(usize, f64)> {
        vec![(0, 1.0)]
    }
    fn is_convex_source(&self, _constraint: usize) -> bool {
        true
    }
    fn objective_value(&self, point: &[f64]) -> f64 {
        point[0]
    }
}

#[test]
fn test_infeasible_problem_detected() {
    init_logging();
    let problem = HalfLine {
        vars: vec![Variable::new(0, "x", VarType::Continuous, 0.0, 3.0)],
    };
    let mut lp = PolyLp::new();
    lp.add_variable("x", VarType::Continuous, 0.0, 3.0);

    let mut controller = DualController::new(
        &problem,
        Box::new(lp),
        DualSettings::default().with_cut_strategy(CutStrategy::Ecp),
    )
    .unwrap();
    controller.set_objective(vec![(0, 1.0)], 0.0);

    let outcome = controller.solve().unwrap();

    assert_eq!(outcome.status, DualStatus::Infeasible);
    assert!(!outcome.has_solution());
}

/// Polisher that returns the known optimum of the min x + y disk problem.
struct ExactDiskPolisher;

impl polycut::polish::NlpPolisher for ExactDiskPolisher {
    fn polish(
        &mut self,
        _problem: &dyn ProblemModel,
        _incumbent: &[f64],
    ) -> polycut::DualResult<Option<Vec<f64>>> {
        Ok(Some(vec![-SQRT2, -SQRT2]))
    }
}

#[test]
fn test_polisher_refines_incumbent() {
    init_logging();
    let problem = DiskProblem::new([1.0, 1.0], ObjectiveSense::Minimize);
    let mut controller = DualController::new(
        &problem,
        Box::new(problem.subsolver()),
        DualSettings::default().with_cut_strategy(CutStrategy::Esh),
    )
    .unwrap();
    controller.set_objective(problem.objective_terms(), 0.0);
    controller.offer_interior_point(&[0.0, 0.0]);
    controller.set_polisher(Box::new(ExactDiskPolisher));

    let outcome = controller.solve().unwrap();

    assert_eq!(outcome.status, DualStatus::Optimal);
    let best = outcome.best_solution.unwrap();
    assert_eq!(best.source, polycut::model::PrimalSource::NlpPolish);
    assert!((best.objective_value - (-2.0 * SQRT2)).abs() < 1e-9);
}

#[test]
fn test_iteration_limit_reports_partial_bounds() {
    init_logging();
    let problem = DiskProblem::new([1.0, 1.0], ObjectiveSense::Minimize);
    let mut controller = DualController::new(
        &problem,
        Box::new(problem.subsolver()),
        DualSettings::default()
            .with_cut_strategy(CutStrategy::Esh)
            .with_max_iterations(1),
    )
    .unwrap();
    controller.set_objective(problem.objective_terms(), 0.0);
    controller.offer_interior_point(&[0.0, 0.0]);

    let outcome = controller.solve().unwrap();

    assert_eq!(outcome.status, DualStatus::IterationLimit);
    assert_eq!(outcome.iterations, 1);
    // The root-search already delivered a feasible incumbent
    assert!(outcome.has_solution());
    assert!(outcome.dual_bound.is_finite());
    assert!(outcome.dual_bound <= outcome.primal_bound);
}

#[test]
fn test_cutoff_row_tightens_with_incumbents() {
    init_logging();
    let problem = DiskProblem::new([1.0, 1.0], ObjectiveSense::Minimize);
    let mut controller = DualController::new(
        &problem,
        Box::new(problem.subsolver()),
        DualSettings::default().with_cut_strategy(CutStrategy::Esh),
    )
    .unwrap();
    controller.set_objective(problem.objective_terms(), 0.0);
    controller.offer_interior_point(&[0.0, 0.0]);

    let outcome = controller.solve().unwrap();
    assert_eq!(outcome.status, DualStatus::Optimal);
    assert!(controller.relaxation().has_cutoff_row());
}

#[test]
fn test_registry_tracks_generated_rows() {
    init_logging();
    let problem = DiskProblem::new([1.0, 1.0], ObjectiveSense::Minimize);
    let mut controller = DualController::new(
        &problem,
        Box::new(problem.subsolver()),
        DualSettings::default().with_cut_strategy(CutStrategy::Esh),
    )
    .unwrap();
    controller.set_objective(problem.objective_terms(), 0.0);
    controller.offer_interior_point(&[0.0, 0.0]);

    let outcome = controller.solve().unwrap();
    assert_eq!(outcome.status, DualStatus::Optimal);

    let registry = controller.relaxation().registry();
    assert_eq!(registry.len() as u64, outcome.statistics.hyperplanes_added);
    // Every eager record is backed by a live row and a convex source
    for record in registry.iter() {
        assert!(record.row.is_some());
        assert!(!record.is_lazy);
        assert!(record.is_source_convex);
    }
}
