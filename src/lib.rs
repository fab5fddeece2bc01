//! Polycut: a supporting-hyperplane dual engine for mixed-integer
//! nonlinear programs
//!
//! The engine builds a tightening polyhedral relaxation of a MINLP and
//! drives an external mixed-integer subsolver over it:
//!
//! - **ESH cuts**: supporting hyperplanes placed at the feasible-set
//!   boundary located by root-search from an interior point
//! - **ECP cuts**: cutting planes placed directly at candidate points
//! - **Polling and lazy-callback modes**: re-solve after each batch of
//!   cuts, or inject cuts into the subsolver's live branch-and-bound
//!   search through a callback
//! - **Bound management**: certified dual bound, feasible primal bound,
//!   cutoff tightening and no-good integer cuts
//! - **Infeasibility repair**: slack-penalized relaxation of cuts from
//!   nonconvex sources, so overcutting never ends a solve prematurely
//!
//! # Example
//!
//! ```ignore
//! use polycut::{DualController, DualSettings, CutStrategy};
//!
//! // problem: your ProblemModel over the nonlinear constraints
//! // subsolver: a MIP backend loaded with the linear part
//!
//! let settings = DualSettings::default()
//!     .with_cut_strategy(CutStrategy::Esh)
//!     .with_gap_tol(1e-4);
//!
//! let mut controller = DualController::new(&problem, subsolver, settings)?;
//! controller.set_objective(objective_terms, 0.0);
//! let outcome = controller.solve()?;
//!
//! println!("Status: {:?}", outcome.status);
//! println!("Bounds: [{}, {}]", outcome.dual_bound, outcome.primal_bound);
//! ```
//!
//! The algorithm follows the extended supporting hyperplane and extended
//! cutting plane methods for convex MINLP; nonconvex sources are handled
//! cautiously through repairable cuts.

#![warn(clippy::all)]

pub mod bounds;
pub mod context;
pub mod controller;
pub mod cuts;
pub mod error;
pub mod iteration;
pub mod model;
pub mod polish;
pub mod relaxation;
pub mod settings;
pub mod subsolver;

pub use context::{DualOutcome, DualStatus, SolveStatistics};
pub use controller::DualController;
pub use error::{DualError, DualResult};
pub use settings::{CutStrategy, DualSettings, RootSearchSettings, SolveMode};
