//! Shared test fixtures: a small exact MIP backend and nonlinear problems.
//!
//! `PolyLp` solves the relaxation exactly by enumerating integer
//! assignments and the vertices of the remaining (at most 2-dimensional)
//! continuous polytope. Slow but exact, which is what the engine tests
//! need: every status and bound it reports is trustworthy.

use std::path::Path;

use polycut::error::DualResult;
use polycut::model::{ObjectiveSense, ProblemModel, VarType, Variable};
use polycut::subsolver::{
    CallbackEvent, CallbackHandler, RowSense, SolveLimits, Subsolver, SubsolverStatus,
};

/// Route engine logs to the test harness when RUST_LOG is set.
pub fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

const FEAS_TOL: f64 = 1e-7;

#[derive(Clone)]
struct Col {
    var_type: VarType,
    lower: f64,
    upper: f64,
}

#[derive(Clone)]
struct Row {
    terms: Vec<(usize, f64)>,
    /// Normalized to terms . x <= rhs.
    rhs: f64,
}

/// Exact enumerating solver over box + linear rows.
#[derive(Clone, Default)]
pub struct PolyLp {
    cols: Vec<Col>,
    rows: Vec<Row>,
    objective: Vec<(usize, f64)>,
    objective_constant: f64,
    minimize: bool,
    cutoff: Option<f64>,
    pool: Vec<(Vec<f64>, f64)>,
    bound: f64,
    callback_rounds: u64,
}

impl PolyLp {
    pub fn new() -> Self {
        Self {
            minimize: true,
            bound: f64::NAN,
            ..Self::default()
        }
    }

    fn objective_at(&self, point: &[f64]) -> f64 {
        self.objective_constant
            + self
                .objective
                .iter()
                .map(|&(i, c)| c * point[i])
                .sum::<f64>()
    }

    fn row_satisfied(&self, row: &Row, point: &[f64]) -> bool {
        let lhs: f64 = row.terms.iter().map(|&(i, c)| c * point[i]).sum();
        lhs <= row.rhs + FEAS_TOL
    }

    fn point_feasible(&self, point: &[f64]) -> bool {
        for (i, col) in self.cols.iter().enumerate() {
            if point[i] < col.lower - FEAS_TOL || point[i] > col.upper + FEAS_TOL {
                return false;
            }
        }
        self.rows.iter().all(|r| self.row_satisfied(r, point))
    }

    /// Enumerate the feasible vertices for one fixed integer assignment.
    fn assignment_candidates(&self, fixed: &[(usize, f64)]) -> Vec<Vec<f64>> {
        let continuous: Vec<usize> = self
            .cols
            .iter()
            .enumerate()
            .filter(|(_, c)| !c.var_type.is_discrete())
            .map(|(i, _)| i)
            .collect();
        assert!(
            continuous.len() <= 2,
            "PolyLp only handles up to 2 continuous variables"
        );

        let mut base = vec![0.0; self.cols.len()];
        for &(i, v) in fixed {
            base[i] = v;
        }

        // Every row restricted to the continuous subspace, plus the box.
        let mut lines: Vec<(Vec<f64>, f64)> = Vec::new();
        for row in &self.rows {
            let mut coeff = vec![0.0; continuous.len()];
            let mut rhs = row.rhs;
            for &(i, c) in &row.terms {
                if let Some(k) = continuous.iter().position(|&j| j == i) {
                    coeff[k] = c;
                } else {
                    rhs -= c * base[i];
                }
            }
            lines.push((coeff, rhs));
        }
        for (k, &i) in continuous.iter().enumerate() {
            let mut lo = vec![0.0; continuous.len()];
            lo[k] = -1.0;
            lines.push((lo, -self.cols[i].lower));
            let mut hi = vec![0.0; continuous.len()];
            hi[k] = 1.0;
            lines.push((hi, self.cols[i].upper));
        }

        let mut points = Vec::new();
        match continuous.len() {
            0 => points.push(base),
            1 => {
                let i = continuous[0];
                let (mut lo, mut hi) = (self.cols[i].lower, self.cols[i].upper);
                for (coeff, rhs) in &lines {
                    let a = coeff[0];
                    if a > FEAS_TOL {
                        hi = hi.min(rhs / a);
                    } else if a < -FEAS_TOL {
                        lo = lo.max(rhs / a);
                    } else if *rhs < -FEAS_TOL {
                        return Vec::new();
                    }
                }
                if lo > hi + FEAS_TOL {
                    return Vec::new();
                }
                for v in [lo, hi] {
                    let mut p = base.clone();
                    p[i] = v;
                    points.push(p);
                }
            }
            _ => {
                let (i, j) = (continuous[0], continuous[1]);
                for a in 0..lines.len() {
                    for b in (a + 1)..lines.len() {
                        let (ca, ra) = &lines[a];
                        let (cb, rb) = &lines[b];
                        let det = ca[0] * cb[1] - ca[1] * cb[0];
                        if det.abs() < 1e-10 {
                            continue;
                        }
                        let x = (ra * cb[1] - ca[1] * rb) / det;
                        let y = (ca[0] * rb - ra * cb[0]) / det;
                        let mut p = base.clone();
                        p[i] = x;
                        p[j] = y;
                        points.push(p);
                    }
                }
            }
        }

        points.retain(|p| self.point_feasible(p));
        points
    }

    fn integer_assignments(&self) -> Vec<Vec<(usize, f64)>> {
        let mut assignments = vec![Vec::new()];
        for (i, col) in self.cols.iter().enumerate() {
            if !col.var_type.is_discrete() {
                continue;
            }
            let lo = col.lower.ceil() as i64;
            let hi = col.upper.floor() as i64;
            let mut next = Vec::new();
            for a in &assignments {
                for v in lo..=hi {
                    let mut a = a.clone();
                    a.push((i, v as f64));
                    next.push(a);
                }
            }
            assignments = next;
        }
        assignments
    }
}

impl Subsolver for PolyLp {
    fn add_variable(&mut self, _name: &str, var_type: VarType, lower: f64, upper: f64) -> usize {
        self.cols.push(Col {
            var_type,
            lower,
            upper,
        });
        self.cols.len() - 1
    }

    fn add_linear_constraint(
        &mut self,
        terms: &[(usize, f64)],
        rhs: f64,
        _name: &str,
        sense: RowSense,
    ) -> usize {
        let row = match sense {
            RowSense::LessOrEqual => Row {
                terms: terms.to_vec(),
                rhs,
            },
            RowSense::GreaterOrEqual => Row {
                terms: terms.iter().map(|&(i, c)| (i, -c)).collect(),
                rhs: -rhs,
            },
        };
        self.rows.push(row);
        self.rows.len() - 1
    }

    fn add_column(
        &mut self,
        objective_coefficient: f64,
        rows: &[(usize, f64)],
        lower: f64,
        upper: f64,
    ) -> usize {
        let index = self.cols.len();
        self.cols.push(Col {
            var_type: VarType::Continuous,
            lower,
            upper,
        });
        for &(row, coefficient) in rows {
            self.rows[row].terms.push((index, coefficient));
        }
        self.objective.push((index, objective_coefficient));
        index
    }

    fn row_upper(&self, row: usize) -> f64 {
        self.rows[row].rhs
    }

    fn set_row_upper(&mut self, row: usize, rhs: f64) {
        self.rows[row].rhs = rhs;
    }

    fn num_rows(&self) -> usize {
        self.rows.len()
    }

    fn num_variables(&self) -> usize {
        self.cols.len()
    }

    fn variable_bounds(&self, index: usize) -> (f64, f64) {
        (self.cols[index].lower, self.cols[index].upper)
    }

    fn set_variable_bounds(&mut self, index: usize, lower: f64, upper: f64) {
        self.cols[index].lower = lower;
        self.cols[index].upper = upper;
    }

    fn set_objective(&mut self, terms: &[(usize, f64)], constant: f64, minimize: bool) {
        self.objective = terms.to_vec();
        self.objective_constant = constant;
        self.minimize = minimize;
    }

    fn solve(&mut self, _limits: &SolveLimits) -> SubsolverStatus {
        let mut candidates: Vec<(Vec<f64>, f64)> = Vec::new();
        for assignment in self.integer_assignments() {
            for point in self.assignment_candidates(&assignment) {
                let objective = self.objective_at(&point);
                candidates.push((point, objective));
            }
        }

        if let Some(cutoff) = self.cutoff {
            candidates.retain(|(_, obj)| {
                if self.minimize {
                    *obj <= cutoff + FEAS_TOL
                } else {
                    *obj >= cutoff - FEAS_TOL
                }
            });
        }

        if candidates.is_empty() {
            self.pool.clear();
            return SubsolverStatus::Infeasible;
        }

        candidates.sort_by(|a, b| {
            if self.minimize {
                a.1.partial_cmp(&b.1).unwrap()
            } else {
                b.1.partial_cmp(&a.1).unwrap()
            }
        });
        candidates.dedup_by(|a, b| {
            a.0.iter()
                .zip(&b.0)
                .all(|(x, y)| (x - y).abs() < 1e-9)
        });

        self.bound = candidates[0].1;
        self.pool = candidates;
        SubsolverStatus::Optimal
    }

    fn solve_with_callback(
        &mut self,
        limits: &SolveLimits,
        handler: &dyn CallbackHandler,
    ) -> SubsolverStatus {
        for round in 0..1000 {
            self.callback_rounds = round + 1;
            let status = self.solve(limits);
            if status != SubsolverStatus::Optimal {
                return status;
            }

            let (point, objective) = self.pool[0].clone();
            let bound_response = handler.on_event(CallbackEvent::NewDualBound { bound: self.bound });
            let incumbent_response = handler.on_event(CallbackEvent::NewIncumbent { point, objective });
            handler.on_event(CallbackEvent::NodeInfo {
                explored: round + 1,
                open: 0,
            });

            let mut rows_added = false;
            for row in bound_response
                .lazy_rows
                .iter()
                .chain(&incumbent_response.lazy_rows)
            {
                self.rows.push(Row {
                    terms: row.terms.clone(),
                    rhs: row.rhs,
                });
                rows_added = true;
            }
            if let Some(cutoff) = incumbent_response.cutoff.or(bound_response.cutoff) {
                self.cutoff = Some(cutoff);
            }

            if bound_response.abort || incumbent_response.abort {
                return SubsolverStatus::Abort;
            }
            if !rows_added {
                return SubsolverStatus::Optimal;
            }
        }
        SubsolverStatus::Error
    }

    fn supports_lazy_rows(&self) -> bool {
        true
    }

    fn explored_nodes(&self) -> u64 {
        self.callback_rounds
    }

    fn num_solutions(&self) -> usize {
        self.pool.len()
    }

    fn solution(&self, index: usize) -> Vec<f64> {
        self.pool[index].0.clone()
    }

    fn objective_value(&self, index: usize) -> f64 {
        self.pool[index].1
    }

    fn dual_bound(&self) -> f64 {
        self.bound
    }

    fn set_cutoff(&mut self, value: f64) {
        self.cutoff = Some(value);
    }

    fn set_mip_start(&mut self, _assignment: &[(usize, f64)]) {}

    fn clear_mip_starts(&mut self) {}

    fn clone_boxed(&self) -> Box<dyn Subsolver> {
        Box::new(self.clone())
    }

    fn write_problem(&self, _path: &Path) -> DualResult<()> {
        Ok(())
    }
}

/// min (or max) c . (x, y) over the disk x^2 + y^2 <= 4, box [-3, 3]^2.
pub struct DiskProblem {
    vars: Vec<Variable>,
    objective: [f64; 2],
    sense: ObjectiveSense,
}

impl DiskProblem {
    pub fn new(objective: [f64; 2], sense: ObjectiveSense) -> Self {
        Self {
            vars: vec![
                Variable::new(0, "x", VarType::Continuous, -3.0, 3.0),
                Variable::new(1, "y", VarType::Continuous, -3.0, 3.0),
            ],
            objective,
            sense,
        }
    }

    /// A subsolver loaded with this problem's box and objective.
    pub fn subsolver(&self) -> PolyLp {
        let mut lp = PolyLp::new();
        for v in &self.vars {
            lp.add_variable(&v.name, v.var_type, v.lower, v.upper);
        }
        lp
    }

    pub fn objective_terms(&self) -> Vec<(usize, f64)> {
        vec![(0, self.objective[0]), (1, self.objective[1])]
    }
}

impl ProblemModel for DiskProblem {
    fn variables(&self) -> &[Variable] {
        &self.vars
    }

    fn num_nonlinear_constraints(&self) -> usize {
        1
    }

    fn evaluate(&self, _constraint: usize, point: &[f64]) -> f64 {
        point[0] * point[0] + point[1] * point[1] - 4.0
    }

    fn gradient(&self, _constraint: usize, point: &[f64]) -> Vec<(usize, f64)> {
        vec![(0, 2.0 * point[0]), (1, 2.0 * point[1])]
    }

    fn is_convex_source(&self, _constraint: usize) -> bool {
        true
    }

    fn objective_value(&self, point: &[f64]) -> f64 {
        self.objective[0] * point[0] + self.objective[1] * point[1]
    }

    fn sense(&self) -> ObjectiveSense {
        self.sense
    }
}

/// min x + y over the disk x^2 + y^2 <= 4 with y binary.
/// Optimum is (-2, 0) with objective -2.
pub struct BinaryDiskProblem {
    vars: Vec<Variable>,
}

impl BinaryDiskProblem {
    pub fn new() -> Self {
        Self {
            vars: vec![
                Variable::new(0, "x", VarType::Continuous, -3.0, 3.0),
                Variable::new(1, "y", VarType::Binary, 0.0, 1.0),
            ],
        }
    }

    pub fn subsolver(&self) -> PolyLp {
        let mut lp = PolyLp::new();
        for v in &self.vars {
            lp.add_variable(&v.name, v.var_type, v.lower, v.upper);
        }
        lp
    }

    pub fn objective_terms(&self) -> Vec<(usize, f64)> {
        vec![(0, 1.0), (1, 1.0)]
    }
}

impl ProblemModel for BinaryDiskProblem {
    fn variables(&self) -> &[Variable] {
        &self.vars
    }

    fn num_nonlinear_constraints(&self) -> usize {
        1
    }

    fn evaluate(&self, _constraint: usize, point: &[f64]) -> f64 {
        point[0] * point[0] + point[1] * point[1] - 4.0
    }

    fn gradient(&self, _constraint: usize, point: &[f64]) -> Vec<(usize, f64)> {
        vec![(0, 2.0 * point[0]), (1, 2.0 * point[1])]
    }

    fn is_convex_source(&self, _constraint: usize) -> bool {
        true
    }

    fn objective_value(&self, point: &[f64]) -> f64 {
        point[0] + point[1]
    }

    fn sense(&self) -> ObjectiveSense {
        ObjectiveSense::Minimize
    }
}
