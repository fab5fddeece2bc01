//! The evolving polyhedral relaxation and its repair machinery.

mod manager;
mod repair;

pub use manager::{build_lazy_row, RelaxationManager};
pub use repair::{repair_infeasibility, resolve_dual_unbounded, RepairOutcome};
