//! Fixed-integer NLP polishing of incumbents.

use crate::error::DualResult;
use crate::model::ProblemModel;

/// Capability over a continuous NLP subsolver used to polish incumbents.
///
/// Given an incumbent of the relaxation, the polisher solves the continuous
/// problem with every discrete variable fixed to the incumbent's value and
/// returns the resulting point, which may improve on the incumbent's
/// objective while staying nonlinearly feasible.
pub trait NlpPolisher {
    /// Polish one incumbent. `Ok(None)` means the NLP solve found nothing
    /// usable; that is not an error.
    fn polish(
        &mut self,
        problem: &dyn ProblemModel,
        incumbent: &[f64],
    ) -> DualResult<Option<Vec<f64>>>;
}
