//! Problem model capability.
//!
//! The engine never evaluates nonlinear expressions itself; it consumes a
//! [`ProblemModel`] that exposes normalized constraint violations and sparse
//! gradients at a point. The modeling system behind it (expression trees,
//! automatic differentiation) is outside this crate.

/// Sentinel for "no bound". Variable bounds are clamped to ±this value before
/// they reach the subsolver.
pub const UNBOUNDED_BOUND: f64 = 1e50;

/// Variable type in the mixed-integer model.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VarType {
    /// Continuous variable.
    Continuous,

    /// General integer variable.
    Integer,

    /// Binary variable (integer in [0, 1]).
    Binary,

    /// Semicontinuous variable (zero or within its bounds).
    SemiContinuous,
}

impl VarType {
    /// Whether the subsolver must treat the variable as discrete.
    pub fn is_discrete(&self) -> bool {
        !matches!(self, VarType::Continuous)
    }
}

/// Optimization direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ObjectiveSense {
    /// Minimize the objective.
    #[default]
    Minimize,

    /// Maximize the objective.
    Maximize,
}

impl ObjectiveSense {
    /// True if `candidate` is a strictly better objective value than
    /// `incumbent` for this direction.
    pub fn is_better(&self, candidate: f64, incumbent: f64) -> bool {
        match self {
            ObjectiveSense::Minimize => candidate < incumbent,
            ObjectiveSense::Maximize => candidate > incumbent,
        }
    }

    /// Worst possible objective value for this direction.
    pub fn worst(&self) -> f64 {
        match self {
            ObjectiveSense::Minimize => f64::INFINITY,
            ObjectiveSense::Maximize => f64::NEG_INFINITY,
        }
    }
}

/// A variable in the problem definition.
#[derive(Debug, Clone)]
pub struct Variable {
    /// Column index.
    pub index: usize,

    /// Name, forwarded to the subsolver.
    pub name: String,

    /// Variable type.
    pub var_type: VarType,

    /// Lower bound (clamped to -[`UNBOUNDED_BOUND`]).
    pub lower: f64,

    /// Upper bound (clamped to [`UNBOUNDED_BOUND`]).
    pub upper: f64,
}

impl Variable {
    /// Create a variable with bounds clamped to the unbounded sentinel.
    pub fn new(index: usize, name: impl Into<String>, var_type: VarType, lower: f64, upper: f64) -> Self {
        Self {
            index,
            name: name.into(),
            var_type,
            lower: lower.max(-UNBOUNDED_BOUND),
            upper: upper.min(UNBOUNDED_BOUND),
        }
    }

    /// Whether either bound sits at the unbounded sentinel.
    pub fn is_dual_unbounded(&self) -> bool {
        self.lower <= -UNBOUNDED_BOUND || self.upper >= UNBOUNDED_BOUND
    }
}

/// A constraint index paired with its normalized violation at some point.
/// Positive values mean the point is infeasible for that constraint.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ConstraintViolation {
    /// Nonlinear constraint index.
    pub constraint: usize,

    /// Normalized violation value.
    pub value: f64,
}

/// Capability over the true nonlinear model.
///
/// `evaluate` returns the normalized violation g(x) of a constraint written
/// as g(x) <= 0, so feasible points report values <= 0. `gradient` returns
/// the sparse gradient of g at the point.
pub trait ProblemModel: Send + Sync {
    /// Variable definitions, indexed by column.
    fn variables(&self) -> &[Variable];

    /// Number of nonlinear constraints.
    fn num_nonlinear_constraints(&self) -> usize;

    /// Normalized violation of a nonlinear constraint at a point.
    fn evaluate(&self, constraint: usize, point: &[f64]) -> f64;

    /// Sparse gradient of a nonlinear constraint at a point.
    fn gradient(&self, constraint: usize, point: &[f64]) -> Vec<(usize, f64)>;

    /// The nonlinear constraints most violated at `point`, in decreasing
    /// violation order. `selection_factor` in [0, 1] keeps every constraint
    /// whose violation is at least that fraction of the maximum violation;
    /// zero keeps every violated constraint.
    fn most_deviating_constraints(
        &self,
        point: &[f64],
        selection_factor: f64,
    ) -> Vec<ConstraintViolation> {
        let mut all: Vec<ConstraintViolation> = (0..self.num_nonlinear_constraints())
            .map(|c| ConstraintViolation {
                constraint: c,
                value: self.evaluate(c, point),
            })
            .collect();

        all.sort_by(|a, b| b.value.partial_cmp(&a.value).unwrap_or(std::cmp::Ordering::Equal));

        let max = match all.first() {
            Some(first) => first.value,
            None => return all,
        };

        if max <= 0.0 {
            all.truncate(1);
            return all;
        }

        let threshold = selection_factor.clamp(0.0, 1.0) * max;
        all.retain(|cv| cv.value >= threshold && cv.value > 0.0);

        if all.is_empty() {
            all.push(ConstraintViolation { constraint: 0, value: max });
        }

        all
    }

    /// The single most violated nonlinear constraint at `point`.
    fn max_deviation(&self, point: &[f64]) -> Option<ConstraintViolation> {
        (0..self.num_nonlinear_constraints())
            .map(|c| ConstraintViolation {
                constraint: c,
                value: self.evaluate(c, point),
            })
            .max_by(|a, b| a.value.partial_cmp(&b.value).unwrap_or(std::cmp::Ordering::Equal))
    }

    /// Whether the constraint is known convex. Cuts from nonconvex sources
    /// may be unsound and are eligible for infeasibility repair.
    fn is_convex_source(&self, constraint: usize) -> bool;

    /// True objective value at a point.
    fn objective_value(&self, point: &[f64]) -> f64;

    /// Optimization direction.
    fn sense(&self) -> ObjectiveSense {
        ObjectiveSense::Minimize
    }

    /// Whether the objective is nonlinear beyond quadratic, requiring
    /// epigraph cuts against an auxiliary objective variable.
    fn objective_is_nonlinear(&self) -> bool {
        false
    }

    /// Sparse gradient of a nonlinear objective at a point.
    fn objective_gradient(&self, _point: &[f64]) -> Vec<(usize, f64)> {
        Vec::new()
    }

    /// Column index of the auxiliary objective variable in the relaxation,
    /// when the objective is reformulated as an epigraph.
    fn auxiliary_objective_variable(&self) -> Option<usize> {
        None
    }
}
