//! # siq-core
//!
//! Core types and errors for stochastic inverse quantification.
//!
//! This crate holds the value types shared across the workspace:
//! - [`Domain`]: bounded axis-aligned hyperrectangle (parameter or data space)
//! - [`SampleSet`] / [`EmulationSet`]: ordered point sets in flat row-major storage
//! - [`ProbabilityMeasure`]: the discretized inverse measure, the pipeline's output
//! - [`Error`] / [`Result`]: the validation error kinds raised before any computation
//!
//! Higher layers (`siq-sample`, `siq-spatial`, `siq-measure`) depend on this
//! crate only; nothing here performs I/O or owns mutable global state.

#![warn(missing_docs)]
#![warn(clippy::all)]

/// Error kinds and the shared `Result` alias.
pub mod error;
/// Density trait resolved at the measure boundary.
pub mod traits;
/// Domains, sample/emulation sets, and the output measure.
pub mod types;

pub use error::{Error, Result};
pub use traits::Density;
pub use types::{Domain, EmulationSet, ProbabilityMeasure, SampleSet};
