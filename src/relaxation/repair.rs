//! Infeasibility repair for the polyhedral relaxation.
//!
//! Cuts generated from nonconvex sources can overcut and leave the
//! relaxation infeasible even though the true problem is not. Repair solves
//! a slack-penalized copy of the relaxation and permanently relaxes the
//! offending rows in the original.

use crate::error::DualResult;
use crate::model::{Variable, UNBOUNDED_BOUND};
use crate::relaxation::RelaxationManager;
use crate::subsolver::{SolveLimits, SubsolverStatus};

/// Safety margin applied on top of the slack actually used by the repair
/// solution, so the relaxed row does not sit exactly at the repair point.
const RELAXATION_FACTOR: f64 = 1.5;

/// Slack below this is treated as numerical noise.
const SLACK_TOLERANCE: f64 = 1e-9;

/// Divisor taming the unbounded sentinel into usable temporary bounds.
const UNBOUNDED_TIGHTEN_DIVISOR: f64 = 1e30;

/// Rows relaxed by one repair pass.
#[derive(Debug, Clone)]
pub struct RepairOutcome {
    /// Row indices whose bounds were permanently relaxed.
    pub repaired_rows: Vec<usize>,
}

/// Attempt to restore feasibility by relaxing repairable rows.
///
/// A penalized slack column is attached to every repairable row in a clone
/// of the relaxation; the penalty `1 / (row_index + 1)` prefers relaxing
/// later (more recently generated) rows. If the slack-relaxed clone solves,
/// each row whose slack was actually used is relaxed in the original by
/// [`RELAXATION_FACTOR`] times that slack and retired from the registry.
///
/// Returns `Ok(None)` when nothing was repairable or the repair solve
/// failed; the original relaxation is untouched in that case.
pub fn repair_infeasibility(
    manager: &mut RelaxationManager,
    limits: &SolveLimits,
) -> DualResult<Option<RepairOutcome>> {
    let eligible: Vec<usize> = (0..manager.subsolver().num_rows())
        .filter(|&row| manager.is_repairable_row(row))
        .collect();

    if eligible.is_empty() {
        log::debug!("no repairable rows in infeasible relaxation");
        return Ok(None);
    }

    let mut relaxed = manager.subsolver().clone_boxed();
    let mut slack_columns = Vec::with_capacity(eligible.len());
    for &row in &eligible {
        let penalty = 1.0 / (row as f64 + 1.0);
        let column = relaxed.add_column(penalty, &[(row, -1.0)], 0.0, UNBOUNDED_BOUND);
        slack_columns.push((row, column));
    }

    let status = relaxed.solve(limits);
    if !status.may_have_solution() || relaxed.num_solutions() == 0 {
        log::warn!("infeasibility repair solve ended with {:?}", status);
        return Ok(None);
    }

    let solution = relaxed.solution(0);
    let mut repaired_rows = Vec::new();
    for (row, column) in slack_columns {
        let slack = solution.get(column).copied().unwrap_or(0.0);
        if slack > SLACK_TOLERANCE {
            manager.relax_row(row, RELAXATION_FACTOR * slack);
            repaired_rows.push(row);
        }
    }

    if repaired_rows.is_empty() {
        log::debug!("repair solve used no slack, relaxation left unchanged");
        return Ok(None);
    }

    log::info!("repaired infeasibility by relaxing {} row(s)", repaired_rows.len());
    Ok(Some(RepairOutcome { repaired_rows }))
}

/// Re-solve an unbounded relaxation with the dual-unbounded variables
/// temporarily confined, then restore their bounds.
///
/// A relaxation with too few cuts can be unbounded even though the true
/// problem is not; confining the offending variables lets the solve produce
/// a point to cut at. The returned status is that of the confined solve.
pub fn resolve_dual_unbounded(
    manager: &mut RelaxationManager,
    variables: &[Variable],
    limits: &SolveLimits,
) -> SubsolverStatus {
    let confined = UNBOUNDED_BOUND / UNBOUNDED_TIGHTEN_DIVISOR;

    let mut saved = Vec::new();
    for v in variables {
        if !v.is_dual_unbounded() {
            continue;
        }
        let (lower, upper) = manager.subsolver().variable_bounds(v.index);
        saved.push((v.index, lower, upper));
        manager
            .subsolver_mut()
            .set_variable_bounds(v.index, lower.max(-confined), upper.min(confined));
    }

    if saved.is_empty() {
        log::warn!("relaxation unbounded but no variable has sentinel bounds");
        return SubsolverStatus::Unbounded;
    }

    log::info!(
        "relaxation unbounded, re-solving with {} variable(s) confined to ±{:.1e}",
        saved.len(),
        confined
    );
    let status = manager.subsolver_mut().solve(limits);

    for (index, lower, upper) in saved {
        manager.subsolver_mut().set_variable_bounds(index, lower, upper);
    }

    status
}
