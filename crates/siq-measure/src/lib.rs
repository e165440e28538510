//! # siq-measure
//!
//! The probability-measure computation engine for stochastic inverse
//! problems.
//!
//! Given parameter samples, their forward-model outputs, and a target density
//! on the data domain, the `prob_*` operations compute a discretized
//! probability measure on the parameter domain that conserves probability
//! under the (generally many-to-one) forward map. Approximate Voronoi cells
//! around the parameter samples stand in for explicit geometry, with cell
//! volumes estimated by Monte Carlo emulation or, for regular grids,
//! computed exactly.
//!
//! See [`prob::prob_emulated`], [`prob::prob`], and [`prob::prob_mc`].

#![warn(missing_docs)]
#![warn(clippy::all)]

/// Density-weight resolution at the engine boundary.
pub mod density;
/// The three measure variants and their shared aggregation contract.
pub mod prob;

pub use density::{DensityInput, DensityWeights};
pub use prob::{
    DEFAULT_EMULATION_COUNT, EmulationInput, InverseProblem, prob, prob_emulated, prob_mc,
};
