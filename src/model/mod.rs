//! Problem model capability and solution records.

mod problem;
mod solution;

pub use problem::{
    ConstraintViolation, ObjectiveSense, ProblemModel, VarType, Variable, UNBOUNDED_BOUND,
};
pub use solution::{
    DualBoundSource, DualSolution, PrimalSolution, PrimalSource, SolutionPoint,
};
