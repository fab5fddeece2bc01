//! Hyperplane cut generation for the polyhedral relaxation.
//!
//! This module provides:
//! - Hyperplane records and the append-only registry of generated cuts
//! - ESH/ECP linearization point selection
//! - The 1-D boundary root-search used by the ESH strategy

mod generator;
mod hyperplane;
mod rootsearch;

pub use generator::{GeneratedCuts, GeneratorStats, HyperplaneGenerator};
pub use hyperplane::{
    create_hyperplane_terms, terms_are_finite, CutTarget, GeneratedHyperplane, Hyperplane,
    HyperplaneRegistry, HyperplaneSource,
};
pub use rootsearch::{RootSearch, RootSearchOutcome};
