//! Selection of linearization points for supporting-hyperplane cuts.

use crate::cuts::hyperplane::{CutTarget, Hyperplane, HyperplaneSource};
use crate::cuts::rootsearch::RootSearch;
use crate::model::ProblemModel;
use crate::settings::{CutStrategy, DualSettings, RootSearchSettings};

/// Counters kept across the generator's lifetime.
#[derive(Debug, Clone, Copy, Default)]
pub struct GeneratorStats {
    /// Hyperplane candidates produced.
    pub hyperplanes_generated: u64,

    /// Boundary root-searches performed.
    pub rootsearches: u64,

    /// Candidate points skipped because no constraint was violated.
    pub feasible_points_skipped: u64,

    /// Calls that fell back to direct linearization because no interior
    /// point was available yet.
    pub ecp_fallbacks: u64,
}

/// Output of one generator call.
#[derive(Debug, Default)]
pub struct GeneratedCuts {
    /// Cut candidates, ready for the relaxation manager.
    pub hyperplanes: Vec<Hyperplane>,

    /// Nonlinearly feasible points discovered along the way (root-search
    /// boundary points). Candidates for the primal bound when they also
    /// satisfy integrality.
    pub feasible_points: Vec<Vec<f64>>,
}

/// Produces hyperplane candidates from relaxation solution points.
///
/// With the ESH strategy the generator keeps an interior point and
/// linearizes at the boundary found by root-search toward each candidate;
/// with ECP it linearizes at the candidate directly. ESH degrades to ECP
/// until an interior point has been provided.
pub struct HyperplaneGenerator {
    strategy: CutStrategy,
    rootsearch: RootSearchSettings,
    selection_factor: f64,
    constraint_tolerance: f64,
    interior: Option<Vec<f64>>,
    interior_quality: f64,
    warned_no_interior: bool,
    stats: GeneratorStats,
}

impl HyperplaneGenerator {
    /// Create a generator from engine settings.
    pub fn new(settings: &DualSettings) -> Self {
        Self {
            strategy: settings.cut_strategy,
            rootsearch: settings.rootsearch.clone(),
            selection_factor: settings.constraint_selection_factor,
            constraint_tolerance: settings.constraint_tolerance,
            interior: None,
            interior_quality: f64::INFINITY,
            warned_no_interior: false,
            stats: GeneratorStats::default(),
        }
    }

    /// Counters so far.
    pub fn stats(&self) -> GeneratorStats {
        self.stats
    }

    /// Whether an interior point is available for root-searches.
    pub fn has_interior_point(&self) -> bool {
        self.interior.is_some()
    }

    /// Offer a point as the interior anchor for root-searches. Kept only if
    /// it is strictly feasible and deeper inside the feasible set than the
    /// current anchor (smaller maximum violation).
    pub fn offer_interior_point(&mut self, problem: &dyn ProblemModel, point: &[f64]) -> bool {
        let quality = match problem.max_deviation(point) {
            Some(dev) => dev.value,
            None => return false,
        };

        if quality >= 0.0 || quality >= self.interior_quality {
            return false;
        }

        log::debug!("interior point updated, max violation {:.3e}", quality);
        self.interior = Some(point.to_vec());
        self.interior_quality = quality;
        true
    }

    /// Generate up to `max_cuts` hyperplane candidates from one solution
    /// point of the relaxation.
    pub fn generate(
        &mut self,
        problem: &dyn ProblemModel,
        point: &[f64],
        source: HyperplaneSource,
        max_cuts: usize,
    ) -> GeneratedCuts {
        let mut out = GeneratedCuts::default();
        if max_cuts == 0 {
            return out;
        }

        let mut deviating = problem.most_deviating_constraints(point, self.selection_factor);
        deviating.retain(|cv| cv.value > self.constraint_tolerance);

        if deviating.is_empty() {
            self.stats.feasible_points_skipped += 1;
            log::debug!("candidate point satisfies all nonlinear constraints, no cut generated");
            self.maybe_objective_cut(problem, point, source, &mut out);
            return out;
        }

        deviating.truncate(max_cuts);

        let generation_point = match self.linearization_point(problem, point, &deviating) {
            Some(boundary) => {
                out.feasible_points.push(boundary.clone());
                boundary
            }
            None => point.to_vec(),
        };

        for cv in &deviating {
            out.hyperplanes.push(Hyperplane {
                target: CutTarget::Constraint(cv.constraint),
                generated_point: generation_point.clone(),
                source,
            });
            self.stats.hyperplanes_generated += 1;
        }

        self.maybe_objective_cut(problem, point, source, &mut out);
        out
    }

    /// For ESH, root-search toward the candidate over the violated
    /// constraints; None means "linearize at the candidate itself".
    fn linearization_point(
        &mut self,
        problem: &dyn ProblemModel,
        point: &[f64],
        deviating: &[crate::model::ConstraintViolation],
    ) -> Option<Vec<f64>> {
        if self.strategy != CutStrategy::Esh {
            return None;
        }

        let interior = match &self.interior {
            Some(p) => p.clone(),
            None => {
                if !self.warned_no_interior {
                    log::warn!(
                        "no interior point available, linearizing at candidate points until one is found"
                    );
                    self.warned_no_interior = true;
                }
                self.stats.ecp_fallbacks += 1;
                return None;
            }
        };

        let constraints: Vec<usize> = deviating.iter().map(|cv| cv.constraint).collect();
        let search = RootSearch::new(problem, self.rootsearch.clone());
        self.stats.rootsearches += 1;

        let outcome = search.find_boundary(&interior, point, &constraints);
        if outcome.lambda == 0.0 && outcome.violation > self.rootsearch.violation_tolerance {
            // Interior anchor went stale; drop it and cut at the candidate.
            self.interior = None;
            self.interior_quality = f64::INFINITY;
            self.stats.ecp_fallbacks += 1;
            return None;
        }

        Some(outcome.boundary)
    }

    fn maybe_objective_cut(
        &mut self,
        problem: &dyn ProblemModel,
        point: &[f64],
        source: HyperplaneSource,
        out: &mut GeneratedCuts,
    ) {
        if !problem.objective_is_nonlinear() || problem.auxiliary_objective_variable().is_none() {
            return;
        }

        // Epigraph cut f(p) + grad f(p) · (x - p) <= mu; supporting for a
        // convex objective regardless of where p sits, so always cut at the
        // candidate itself.
        out.hyperplanes.push(Hyperplane {
            target: CutTarget::Objective,
            generated_point: point.to_vec(),
            source,
        });
        self.stats.hyperplanes_generated += 1;
    }
}
